// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

mod finder;
mod slug;
mod store;

pub use finder::TagFinder;
pub use slug::{TagNameSanitizer, slugify};
pub use store::{CommittedTag, TAGS_FILE_NAME, TagStore, TagStoreError, TagStoreErrorKind};

use crate::management::errors::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MAX_TAG_KEY_CHARS: usize = 250;
const MIN_LOCALE_CHARS: usize = 2;
const MAX_LOCALE_CHARS: usize = 35;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Locale(String);

impl Locale {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        let len = trimmed.chars().count();
        if !(MIN_LOCALE_CHARS..=MAX_LOCALE_CHARS).contains(&len) {
            return Err(ValidationError::new(format!(
                "Locale must be {} to {} characters",
                MIN_LOCALE_CHARS, MAX_LOCALE_CHARS
            )));
        }
        if !trimmed.starts_with(|c: char| c.is_ascii_alphabetic())
            || !trimmed
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ValidationError::new(format!(
                "Locale '{}' contains invalid characters",
                trimmed
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Locale {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Locale> for String {
    fn from(locale: Locale) -> Self {
        locale.0
    }
}

/// Canonical slug of a tag. Unique across all tags, whatever their parent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TagKey(String);

impl TagKey {
    /// Accepts an already canonical key, as read back from storage or typed
    /// on the command line. Display names go through [`slugify`] instead.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        validate_tag_key(raw)?;
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TagKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for TagKey {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        validate_tag_key(&value)?;
        Ok(Self(value))
    }
}

impl From<TagKey> for String {
    fn from(key: TagKey) -> Self {
        key.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub key: TagKey,
    pub name: String,
    pub parent: Option<TagKey>,
    /// Ordering among siblings sharing `parent`; not unique across parents.
    pub position: i64,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TagLabel {
    pub tag: TagKey,
    pub locale: Locale,
    pub text: String,
}

/// A pending mutation held by a [`UnitOfWork`] until it is flushed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StagedChange {
    Tag(Tag),
    Label(TagLabel),
}

/// Lookups the tag finder needs from storage. Implementations only report
/// committed state.
pub trait TagRepository {
    type Error: std::error::Error + 'static;

    fn find_by_key(&self, key: &TagKey) -> Result<Option<Tag>, Self::Error>;

    /// Highest position among the children of `parent` (root tags when
    /// `None`), or 0 when there are none.
    fn find_max_position(&self, parent: Option<&TagKey>) -> Result<i64, Self::Error>;

    fn find_default_locale(&self) -> Result<Locale, Self::Error>;
}

pub trait UnitOfWork: TagRepository {
    /// Queues a change. Nothing is committed until the owner flushes.
    fn stage(&mut self, change: StagedChange) -> Result<(), Self::Error>;
}

pub(crate) fn validate_tag_key(key: &str) -> Result<(), ValidationError> {
    if key.is_empty() {
        return Err(ValidationError::new("empty tag name"));
    }
    if key.chars().count() > MAX_TAG_KEY_CHARS {
        return Err(ValidationError::new("tag name too long"));
    }
    if !key
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        || key.starts_with('-')
        || key.ends_with('-')
    {
        return Err(ValidationError::new(format!(
            "Tag key '{}' contains invalid characters",
            key
        )));
    }
    Ok(())
}
