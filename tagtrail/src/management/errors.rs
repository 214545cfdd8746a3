// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use std::error::Error;
use std::fmt;

/// Rejected caller input. The caller may retry with corrected input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for ValidationError {}

/// Failure of a tag operation. Storage errors are carried as the storage
/// collaborator reported them.
#[derive(Debug)]
pub enum TagError<E> {
    Validation(ValidationError),
    Storage(E),
}

impl<E> TagError<E> {
    pub fn is_validation(&self) -> bool {
        matches!(self, TagError::Validation(_))
    }
}

impl<E> From<ValidationError> for TagError<E> {
    fn from(err: ValidationError) -> Self {
        TagError::Validation(err)
    }
}

impl<E: fmt::Display> fmt::Display for TagError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagError::Validation(err) => write!(f, "{}", err),
            TagError::Storage(err) => write!(f, "tag storage failed: {}", err),
        }
    }
}

impl<E: Error + 'static> Error for TagError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TagError::Validation(err) => Some(err),
            TagError::Storage(err) => Some(err),
        }
    }
}
