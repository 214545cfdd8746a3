// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use std::collections::HashSet;

const SEPARATOR: char = '-';

/// Reduces user supplied tag names to plain text: markup and comments are
/// dropped, script and style bodies removed, entities decoded.
pub struct TagNameSanitizer {
    cleaner: ammonia::Builder<'static>,
}

impl TagNameSanitizer {
    pub fn new() -> Self {
        let mut cleaner = ammonia::Builder::empty();
        cleaner
            .strip_comments(true)
            .clean_content_tags(HashSet::from(["script", "style"]));
        Self { cleaner }
    }

    pub fn clean(&self, raw: &str) -> String {
        let text = self.cleaner.clean(raw).to_string();
        decode_text_entities(&text).trim().to_string()
    }
}

impl Default for TagNameSanitizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Lowercase ASCII slug with runs of anything else collapsed into a single
/// `-`. Non-ASCII text is transliterated first; characters with no ASCII
/// spelling act as separators.
pub fn slugify(raw: &str) -> String {
    let ascii = deunicode::deunicode_with_tofu(raw, " ");
    let mut slug = String::with_capacity(ascii.len());
    let mut pending_separator = false;
    for ch in ascii.chars() {
        let lower = ch.to_ascii_lowercase();
        if lower.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push(SEPARATOR);
            }
            pending_separator = false;
            slug.push(lower);
        } else {
            pending_separator = true;
        }
    }
    slug
}

fn decode_text_entities(input: &str) -> String {
    input
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
