// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::management::tags::Locale;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentId(pub u64);

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", content_id_hex(*self))
    }
}

impl TryFrom<String> for ContentId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        parse_content_id_hex(&value)
    }
}

impl From<ContentId> for String {
    fn from(id: ContentId) -> Self {
        content_id_hex(id)
    }
}

/// Localized source of a content node. `owner` is the node whose visibility
/// decides whether the source may be shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceRecord {
    pub owner: ContentId,
    pub locale: Locale,
    pub title: String,
    #[serde(default)]
    pub alias: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContentNode {
    pub id: ContentId,
    #[serde(default)]
    pub parent: Option<ContentId>,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default = "default_true")]
    pub reachable: bool,
    #[serde(default)]
    pub source: Option<SourceRecord>,
}

impl ContentNode {
    pub fn new(id: ContentId) -> Self {
        Self {
            id,
            parent: None,
            visible: true,
            reachable: true,
            source: None,
        }
    }

    pub fn with_parent(mut self, parent: ContentId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_source(mut self, source: SourceRecord) -> Self {
        self.source = Some(source);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn unreachable(mut self) -> Self {
        self.reachable = false;
        self
    }
}

fn default_true() -> bool {
    true
}

pub fn content_id_hex(id: ContentId) -> String {
    format!("{:016x}", id.0)
}

pub fn parse_content_id_hex(raw: &str) -> Result<ContentId, String> {
    let trimmed = raw.trim();
    if trimmed.len() != 16 {
        return Err("content id must be 16 hex chars".to_string());
    }
    if !trimmed.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return Err("content id must be hex".to_string());
    }
    let value =
        u64::from_str_radix(trimmed, 16).map_err(|_| "content id parse failed".to_string())?;
    Ok(ContentId(value))
}
