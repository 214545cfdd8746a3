// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::slug::{TagNameSanitizer, slugify};
use super::{Locale, StagedChange, Tag, TagKey, TagLabel, UnitOfWork, validate_tag_key};
use crate::management::errors::{TagError, ValidationError};
use std::collections::HashMap;

struct TagCandidate {
    key: TagKey,
    name: String,
}

/// Looks tags up by canonical key and stages new ones when missing.
///
/// Nothing is committed here; the owner of the unit of work flushes. Single
/// calls read sibling positions from committed state, so two new tags created
/// under one parent without a flush in between get the same position. Use
/// [`TagFinder::find_or_create_many`] when creating several tags at once.
pub struct TagFinder<'a, S: ?Sized> {
    storage: &'a mut S,
    sanitizer: TagNameSanitizer,
}

impl<'a, S: UnitOfWork + ?Sized> TagFinder<'a, S> {
    pub fn new(storage: &'a mut S) -> Self {
        Self {
            storage,
            sanitizer: TagNameSanitizer::new(),
        }
    }

    /// Returns the tag whose key matches `name`, or stages a new tag and its
    /// label. An existing tag is returned untouched, whatever `locale` and
    /// `parent` say. A `hint_position` above zero is used as the seed instead
    /// of the highest sibling position; the new tag sits one past the seed.
    pub fn find_or_create(
        &mut self,
        name: &str,
        locale: Option<&Locale>,
        parent: Option<&Tag>,
        hint_position: i64,
    ) -> Result<Tag, TagError<S::Error>> {
        let candidate = self.prepare(name)?;
        if let Some(existing) = self
            .storage
            .find_by_key(&candidate.key)
            .map_err(TagError::Storage)?
        {
            log::debug!("Tag '{}' already exists", existing.key);
            return Ok(existing);
        }

        let locale = self.resolve_locale(locale)?;
        let parent_key = parent.map(|parent| parent.key.clone());
        let seed = if hint_position <= 0 {
            self.storage
                .find_max_position(parent_key.as_ref())
                .map_err(TagError::Storage)?
        } else {
            hint_position
        };
        let position = next_position(seed)?;
        self.stage_new(candidate, parent_key, position, &locale)
    }

    /// Batch form of [`TagFinder::find_or_create`] for tags sharing one
    /// parent. The sibling position is read once and handed out in order, and
    /// names that collapse to the same key inside the batch yield one tag.
    /// Every name is validated before anything is staged.
    pub fn find_or_create_many<I, N>(
        &mut self,
        names: I,
        locale: Option<&Locale>,
        parent: Option<&Tag>,
    ) -> Result<Vec<Tag>, TagError<S::Error>>
    where
        I: IntoIterator<Item = N>,
        N: AsRef<str>,
    {
        let candidates = names
            .into_iter()
            .map(|name| self.prepare(name.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        let parent_key = parent.map(|parent| parent.key.clone());

        let mut resolved: HashMap<TagKey, Tag> = HashMap::new();
        let mut tags = Vec::with_capacity(candidates.len());
        let mut batch_locale: Option<Locale> = None;
        let mut next: Option<i64> = None;

        for candidate in candidates {
            if let Some(tag) = resolved.get(&candidate.key) {
                tags.push(tag.clone());
                continue;
            }
            if let Some(existing) = self
                .storage
                .find_by_key(&candidate.key)
                .map_err(TagError::Storage)?
            {
                resolved.insert(existing.key.clone(), existing.clone());
                tags.push(existing);
                continue;
            }

            let locale = match &batch_locale {
                Some(locale) => locale.clone(),
                None => {
                    let locale = self.resolve_locale(locale)?;
                    batch_locale = Some(locale.clone());
                    locale
                }
            };
            let position = match next {
                Some(position) => position,
                None => next_position(
                    self.storage
                        .find_max_position(parent_key.as_ref())
                        .map_err(TagError::Storage)?,
                )?,
            };
            next = Some(next_position(position)?);

            let tag = self.stage_new(candidate, parent_key.clone(), position, &locale)?;
            resolved.insert(tag.key.clone(), tag.clone());
            tags.push(tag);
        }

        Ok(tags)
    }

    fn prepare(&self, name: &str) -> Result<TagCandidate, ValidationError> {
        let name = self.sanitizer.clean(name);
        let key = slugify(&name);
        validate_tag_key(&key)?;
        Ok(TagCandidate {
            key: TagKey(key),
            name,
        })
    }

    fn resolve_locale(&self, locale: Option<&Locale>) -> Result<Locale, TagError<S::Error>> {
        match locale {
            Some(locale) => Ok(locale.clone()),
            None => self
                .storage
                .find_default_locale()
                .map_err(TagError::Storage),
        }
    }

    fn stage_new(
        &mut self,
        candidate: TagCandidate,
        parent: Option<TagKey>,
        position: i64,
        locale: &Locale,
    ) -> Result<Tag, TagError<S::Error>> {
        let tag = Tag {
            key: candidate.key,
            name: candidate.name,
            parent,
            position,
            visible: true,
        };
        self.storage
            .stage(StagedChange::Tag(tag.clone()))
            .map_err(TagError::Storage)?;
        self.storage
            .stage(StagedChange::Label(TagLabel {
                tag: tag.key.clone(),
                locale: locale.clone(),
                text: tag.name.clone(),
            }))
            .map_err(TagError::Storage)?;
        log::debug!(
            "Staged tag '{}' at position {} with {} label",
            tag.key,
            tag.position,
            locale
        );
        Ok(tag)
    }
}

fn next_position(seed: i64) -> Result<i64, ValidationError> {
    seed.checked_add(1)
        .ok_or_else(|| ValidationError::new("tag position out of range"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::management::tags::TagRepository;
    use std::collections::BTreeMap;
    use std::fmt;

    #[derive(Debug)]
    struct MemoryError;

    impl fmt::Display for MemoryError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "memory storage offline")
        }
    }

    impl std::error::Error for MemoryError {}

    #[derive(Default)]
    struct MemoryStorage {
        committed: BTreeMap<TagKey, Tag>,
        staged: Vec<StagedChange>,
        offline: bool,
    }

    impl MemoryStorage {
        fn with_tags(tags: Vec<Tag>) -> Self {
            Self {
                committed: tags.into_iter().map(|tag| (tag.key.clone(), tag)).collect(),
                ..Self::default()
            }
        }

        fn flush(&mut self) {
            for change in self.staged.drain(..) {
                if let StagedChange::Tag(tag) = change {
                    self.committed.insert(tag.key.clone(), tag);
                }
            }
        }

        fn staged_labels(&self) -> Vec<&TagLabel> {
            self.staged
                .iter()
                .filter_map(|change| match change {
                    StagedChange::Label(label) => Some(label),
                    StagedChange::Tag(_) => None,
                })
                .collect()
        }
    }

    impl TagRepository for MemoryStorage {
        type Error = MemoryError;

        fn find_by_key(&self, key: &TagKey) -> Result<Option<Tag>, Self::Error> {
            if self.offline {
                return Err(MemoryError);
            }
            Ok(self.committed.get(key).cloned())
        }

        fn find_max_position(&self, parent: Option<&TagKey>) -> Result<i64, Self::Error> {
            Ok(self
                .committed
                .values()
                .filter(|tag| tag.parent.as_ref() == parent)
                .map(|tag| tag.position)
                .max()
                .unwrap_or(0))
        }

        fn find_default_locale(&self) -> Result<Locale, Self::Error> {
            Ok(Locale::parse("en").unwrap())
        }
    }

    impl UnitOfWork for MemoryStorage {
        fn stage(&mut self, change: StagedChange) -> Result<(), Self::Error> {
            self.staged.push(change);
            Ok(())
        }
    }

    fn tag(key: &str, parent: Option<&str>, position: i64) -> Tag {
        Tag {
            key: TagKey::parse(key).unwrap(),
            name: key.to_string(),
            parent: parent.map(|parent| TagKey::parse(parent).unwrap()),
            position,
            visible: true,
        }
    }

    #[test]
    fn creates_tag_and_default_locale_label() {
        let mut storage = MemoryStorage::default();
        let created = TagFinder::new(&mut storage)
            .find_or_create("Hello World", None, None, 0)
            .unwrap();

        assert_eq!(created, tag("hello-world", None, 1).renamed("Hello World"));
        assert_eq!(storage.staged.len(), 2);
        let labels = storage.staged_labels();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].locale.as_str(), "en");
        assert_eq!(labels[0].text, "Hello World");
        assert_eq!(labels[0].tag.as_str(), "hello-world");
    }

    #[test]
    fn existing_key_is_returned_unchanged() {
        let existing = tag("hello-world", None, 7).renamed("Hello World");
        let mut storage = MemoryStorage::with_tags(vec![existing.clone()]);
        let other_parent = tag("news", None, 1);
        let german = Locale::parse("de").unwrap();

        let found = TagFinder::new(&mut storage)
            .find_or_create("  HELLO   world!! ", Some(&german), Some(&other_parent), 3)
            .unwrap();

        assert_eq!(found, existing);
        assert!(storage.staged.is_empty());
    }

    #[test]
    fn blank_names_are_rejected() {
        let mut storage = MemoryStorage::default();
        let mut finder = TagFinder::new(&mut storage);
        for name in ["", "   ", "<b></b>", "!!!"] {
            match finder.find_or_create(name, None, None, 0) {
                Err(TagError::Validation(err)) => assert_eq!(err.message(), "empty tag name"),
                other => panic!("Expected validation error for {:?}, got {:?}", name, other),
            }
        }
        assert!(storage.staged.is_empty());
    }

    #[test]
    fn oversized_keys_are_rejected() {
        let mut storage = MemoryStorage::default();
        let mut finder = TagFinder::new(&mut storage);
        let err = finder
            .find_or_create(&"a".repeat(251), None, None, 0)
            .unwrap_err();
        match err {
            TagError::Validation(err) => assert_eq!(err.message(), "tag name too long"),
            other => panic!("Expected validation error, got {:?}", other),
        }
        assert!(finder.find_or_create(&"a".repeat(250), None, None, 0).is_ok());
    }

    #[test]
    fn position_follows_siblings_of_the_parent() {
        let news = tag("news", None, 1);
        let mut storage = MemoryStorage::with_tags(vec![
            news.clone(),
            tag("alerts", Some("news"), 4),
            tag("sports", None, 9),
        ]);
        let created = TagFinder::new(&mut storage)
            .find_or_create("Weather", None, Some(&news), 0)
            .unwrap();

        assert_eq!(created.position, 5);
        assert_eq!(created.parent, Some(news.key));
    }

    #[test]
    fn positive_hint_seeds_the_position() {
        let mut storage = MemoryStorage::with_tags(vec![tag("sports", None, 9)]);
        let created = TagFinder::new(&mut storage)
            .find_or_create("Weather", None, None, 20)
            .unwrap();
        assert_eq!(created.position, 21);
    }

    #[test]
    fn explicit_locale_is_used_for_the_label() {
        let mut storage = MemoryStorage::default();
        let french = Locale::parse("fr").unwrap();
        TagFinder::new(&mut storage)
            .find_or_create("Actualités", Some(&french), None, 0)
            .unwrap();
        let labels = storage.staged_labels();
        assert_eq!(labels[0].locale, french);
        assert_eq!(labels[0].text, "Actualités");
        assert_eq!(labels[0].tag.as_str(), "actualites");
    }

    #[test]
    fn unflushed_creations_share_a_position() {
        let mut storage = MemoryStorage::default();
        let mut finder = TagFinder::new(&mut storage);
        let first = finder.find_or_create("One", None, None, 0).unwrap();
        let second = finder.find_or_create("Two", None, None, 0).unwrap();
        assert_eq!(first.position, second.position);

        storage.flush();
        let third = TagFinder::new(&mut storage)
            .find_or_create("Three", None, None, 0)
            .unwrap();
        assert_eq!(third.position, 2);
    }

    #[test]
    fn batch_allocates_consecutive_positions() {
        let mut storage = MemoryStorage::with_tags(vec![tag("existing", None, 3)]);
        let tags = TagFinder::new(&mut storage)
            .find_or_create_many(["One", "Existing", "Two", "one!"], None, None)
            .unwrap();

        let positions: Vec<i64> = tags.iter().map(|tag| tag.position).collect();
        assert_eq!(positions, vec![4, 3, 5, 4]);
        assert_eq!(tags[0], tags[3]);
        assert_eq!(storage.staged_labels().len(), 2);
    }

    #[test]
    fn batch_validates_before_staging() {
        let mut storage = MemoryStorage::default();
        let result = TagFinder::new(&mut storage).find_or_create_many(["Good", "  "], None, None);
        assert!(result.unwrap_err().is_validation());
        assert!(storage.staged.is_empty());
    }

    #[test]
    fn storage_errors_propagate() {
        let mut storage = MemoryStorage {
            offline: true,
            ..MemoryStorage::default()
        };
        let err = TagFinder::new(&mut storage)
            .find_or_create("Hello", None, None, 0)
            .unwrap_err();
        assert!(matches!(err, TagError::Storage(MemoryError)));
    }

    impl Tag {
        fn renamed(mut self, name: &str) -> Self {
            self.name = name.to_string();
            self
        }
    }
}
