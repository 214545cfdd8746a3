// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::finder::TagFinder;
use super::{Locale, StagedChange, Tag, TagKey, TagLabel, TagRepository, UnitOfWork};
use crate::management::errors::TagError;
use crate::management::yaml_store;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

pub const TAGS_FILE_NAME: &str = "tags.yaml";
const MAX_TAG_COUNT: usize = 10000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagStoreErrorKind {
    Storage,
    Invalid,
    KeyConflict,
    LabelConflict,
}

#[derive(Debug)]
pub struct TagStoreError {
    kind: TagStoreErrorKind,
    message: String,
}

impl TagStoreError {
    fn new(kind: TagStoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> TagStoreErrorKind {
        self.kind
    }
}

impl fmt::Display for TagStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for TagStoreError {}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct TagRecord {
    name: String,
    #[serde(default)]
    parent: Option<TagKey>,
    position: i64,
    #[serde(default = "default_visible")]
    visible: bool,
}

impl TagRecord {
    fn to_tag(&self, key: &TagKey) -> Tag {
        Tag {
            key: key.clone(),
            name: self.name.clone(),
            parent: self.parent.clone(),
            position: self.position,
            visible: self.visible,
        }
    }
}

impl From<&Tag> for TagRecord {
    fn from(tag: &Tag) -> Self {
        Self {
            name: tag.name.clone(),
            parent: tag.parent.clone(),
            position: tag.position,
            visible: tag.visible,
        }
    }
}

fn default_visible() -> bool {
    true
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct TagDocument {
    #[serde(default)]
    tags: BTreeMap<TagKey, TagRecord>,
    #[serde(default)]
    labels: Vec<TagLabel>,
}

/// Result of [`TagStore::find_or_create_committed`]. `created` is set only
/// when this call's own tag was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedTag {
    pub tag: Tag,
    pub created: bool,
}

/// Tags and labels kept in `tags.yaml`, with a unit of work on top.
///
/// Lookups see committed state only. [`TagStore::flush`] re-reads the file,
/// applies the staged changes and writes the result atomically; it is the
/// point where key and label uniqueness are enforced.
pub struct TagStore {
    tags_file: PathBuf,
    default_locale: Locale,
    committed: TagDocument,
    pending: Vec<StagedChange>,
}

impl TagStore {
    pub fn open(state_sys_dir: &Path, default_locale: Locale) -> Result<Self, TagStoreError> {
        let tags_file = state_sys_dir.join(TAGS_FILE_NAME);
        let committed = Self::load_from_disk(&tags_file)?;
        log::debug!(
            "Loaded {} tags from {}",
            committed.tags.len(),
            tags_file.display()
        );
        Ok(Self {
            tags_file,
            default_locale,
            committed,
            pending: Vec::new(),
        })
    }

    pub fn tags_file(&self) -> &Path {
        &self.tags_file
    }

    pub fn get(&self, key: &TagKey) -> Option<Tag> {
        self.committed.tags.get(key).map(|record| record.to_tag(key))
    }

    /// Committed tags ordered by parent, then position, then key.
    pub fn list(&self) -> Vec<Tag> {
        let mut tags: Vec<Tag> = self
            .committed
            .tags
            .iter()
            .map(|(key, record)| record.to_tag(key))
            .collect();
        tags.sort_by(|left, right| {
            left.parent
                .cmp(&right.parent)
                .then_with(|| left.position.cmp(&right.position))
                .then_with(|| left.key.cmp(&right.key))
        });
        tags
    }

    pub fn labels_for(&self, key: &TagKey) -> Vec<TagLabel> {
        self.committed
            .labels
            .iter()
            .filter(|label| &label.tag == key)
            .cloned()
            .collect()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Drops staged changes, returning how many there were.
    pub fn discard(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        dropped
    }

    pub fn reload(&mut self) -> Result<(), TagStoreError> {
        self.committed = Self::load_from_disk(&self.tags_file)?;
        Ok(())
    }

    /// Commits staged changes. On error nothing is written and the staged
    /// changes are kept, so the caller can inspect or discard them.
    pub fn flush(&mut self) -> Result<usize, TagStoreError> {
        self.commit(false)
    }

    /// Find-or-create that commits immediately. If another writer committed
    /// the same key between lookup and flush, the staged tag is dropped and
    /// the committed one is returned. Changes staged before the call are
    /// flushed first; on any other failure this call's changes are discarded.
    ///
    /// Without a position hint the new tag is placed after the siblings
    /// found in the file at commit time, not those of the snapshot read for
    /// the lookup.
    pub fn find_or_create_committed(
        &mut self,
        name: &str,
        locale: Option<&Locale>,
        parent: Option<&Tag>,
        hint_position: i64,
    ) -> Result<CommittedTag, TagError<TagStoreError>> {
        self.flush().map_err(TagError::Storage)?;
        self.reload().map_err(TagError::Storage)?;
        let tag = TagFinder::new(self).find_or_create(name, locale, parent, hint_position)?;
        self.commit_found(tag, hint_position)
    }

    fn commit_found(
        &mut self,
        tag: Tag,
        hint_position: i64,
    ) -> Result<CommittedTag, TagError<TagStoreError>> {
        if self.pending.is_empty() {
            return Ok(CommittedTag {
                tag,
                created: false,
            });
        }
        match self.commit(hint_position <= 0) {
            Ok(_) => {
                let tag = self.get(&tag.key).unwrap_or(tag);
                Ok(CommittedTag { tag, created: true })
            }
            Err(err) if err.kind() == TagStoreErrorKind::KeyConflict => {
                log::warn!("Tag '{}' was created concurrently, re-fetching", tag.key);
                self.discard();
                self.reload().map_err(TagError::Storage)?;
                let tag = self.get(&tag.key).ok_or(TagError::Storage(err))?;
                Ok(CommittedTag {
                    tag,
                    created: false,
                })
            }
            Err(err) => {
                let dropped = self.discard();
                log::warn!("Dropped {} staged tag changes after failed commit", dropped);
                Err(TagError::Storage(err))
            }
        }
    }

    /// Re-reads the file, applies the staged changes and writes the result.
    /// With `reseat_positions`, a staged tag whose position is already taken
    /// among its siblings on disk moves to one past the highest of them.
    fn commit(&mut self, reseat_positions: bool) -> Result<usize, TagStoreError> {
        if self.pending.is_empty() {
            return Ok(0);
        }
        let mut document = Self::load_from_disk(&self.tags_file)?;
        for change in &self.pending {
            match change {
                StagedChange::Tag(tag) if reseat_positions => {
                    let mut tag = tag.clone();
                    tag.position = reseated_position(&document, &tag)?;
                    apply_change(&mut document, &StagedChange::Tag(tag))?;
                }
                _ => apply_change(&mut document, change)?,
            }
        }
        validate_document(&document)?;
        Self::write_tags_file(&self.tags_file, &document)?;

        let flushed = self.pending.len();
        self.pending.clear();
        self.committed = document;
        log::info!(
            "Committed {} tag changes to {}",
            flushed,
            self.tags_file.display()
        );
        Ok(flushed)
    }

    fn load_from_disk(tags_file: &Path) -> Result<TagDocument, TagStoreError> {
        let raw: Option<TagDocument> = yaml_store::read_yaml_file(tags_file, "tags")
            .map_err(|err| TagStoreError::new(TagStoreErrorKind::Storage, err.to_string()))?;
        let document = raw.unwrap_or_default();
        validate_document(&document)?;
        Ok(document)
    }

    fn write_tags_file(tags_file: &Path, document: &TagDocument) -> Result<(), TagStoreError> {
        yaml_store::write_yaml_file(tags_file, "tags", document)
            .map_err(|err| TagStoreError::new(TagStoreErrorKind::Storage, err.to_string()))
    }
}

impl TagRepository for TagStore {
    type Error = TagStoreError;

    fn find_by_key(&self, key: &TagKey) -> Result<Option<Tag>, Self::Error> {
        Ok(self.get(key))
    }

    fn find_max_position(&self, parent: Option<&TagKey>) -> Result<i64, Self::Error> {
        Ok(self
            .committed
            .tags
            .values()
            .filter(|record| record.parent.as_ref() == parent)
            .map(|record| record.position)
            .max()
            .unwrap_or(0))
    }

    fn find_default_locale(&self) -> Result<Locale, Self::Error> {
        Ok(self.default_locale.clone())
    }
}

impl UnitOfWork for TagStore {
    fn stage(&mut self, change: StagedChange) -> Result<(), Self::Error> {
        self.pending.push(change);
        Ok(())
    }
}

fn apply_change(document: &mut TagDocument, change: &StagedChange) -> Result<(), TagStoreError> {
    match change {
        StagedChange::Tag(tag) => {
            if document.tags.contains_key(&tag.key) {
                return Err(TagStoreError::new(
                    TagStoreErrorKind::KeyConflict,
                    format!("Tag '{}' already exists", tag.key),
                ));
            }
            document.tags.insert(tag.key.clone(), TagRecord::from(tag));
        }
        StagedChange::Label(label) => {
            if document
                .labels
                .iter()
                .any(|existing| existing.tag == label.tag && existing.locale == label.locale)
            {
                return Err(TagStoreError::new(
                    TagStoreErrorKind::LabelConflict,
                    format!(
                        "Tag '{}' already has a {} label",
                        label.tag, label.locale
                    ),
                ));
            }
            document.labels.push(label.clone());
        }
    }
    Ok(())
}

fn reseated_position(document: &TagDocument, tag: &Tag) -> Result<i64, TagStoreError> {
    let highest = document
        .tags
        .values()
        .filter(|record| record.parent == tag.parent)
        .map(|record| record.position)
        .max()
        .unwrap_or(0);
    if tag.position > highest {
        return Ok(tag.position);
    }
    highest.checked_add(1).ok_or_else(|| {
        TagStoreError::new(
            TagStoreErrorKind::Invalid,
            format!("Tag '{}' position out of range", tag.key),
        )
    })
}

fn validate_document(document: &TagDocument) -> Result<(), TagStoreError> {
    if document.tags.len() > MAX_TAG_COUNT {
        return Err(TagStoreError::new(
            TagStoreErrorKind::Invalid,
            format!("Tags must be at most {} entries", MAX_TAG_COUNT),
        ));
    }
    for (key, record) in &document.tags {
        if let Some(parent) = &record.parent
            && !document.tags.contains_key(parent)
        {
            return Err(TagStoreError::new(
                TagStoreErrorKind::Invalid,
                format!("Tag '{}' references unknown parent '{}'", key, parent),
            ));
        }
    }
    let mut seen = BTreeSet::new();
    for label in &document.labels {
        if !document.tags.contains_key(&label.tag) {
            return Err(TagStoreError::new(
                TagStoreErrorKind::Invalid,
                format!("Label references unknown tag '{}'", label.tag),
            ));
        }
        if !seen.insert((&label.tag, &label.locale)) {
            return Err(TagStoreError::new(
                TagStoreErrorKind::LabelConflict,
                format!(
                    "Tag '{}' has more than one {} label",
                    label.tag, label.locale
                ),
            ));
        }
    }
    Ok(())
}
