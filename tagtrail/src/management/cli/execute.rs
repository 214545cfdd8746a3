// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::{CliCommand, CliError};
use crate::config::{Config, ValidatedConfig};
use crate::content::{ContentId, ContentTreeStore};
use crate::management::errors::TagError;
use crate::management::tags::{Locale, TagKey, TagStore, TagStoreError};
use crate::public::{BreadcrumbResolver, BreadcrumbTrail, render_breadcrumbs_html};
use crate::runtime_paths::RuntimePaths;
use std::io::Write;
use std::path::Path;

const NO_TRAIL: &str = "no trail";
const ROOT_TRAIL: &str = "(root)";

pub fn execute(
    runtime_root: &Path,
    command: CliCommand,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let config = Config::load_and_validate(runtime_root)
        .map_err(|err| CliError::runtime(err.to_string()))?;
    let paths =
        RuntimePaths::from_root(runtime_root).map_err(|err| CliError::runtime(err.to_string()))?;

    match command {
        CliCommand::TagAdd {
            name,
            parent,
            locale,
            position,
        } => tag_add(&paths, &config, out, &name, parent, locale, position),
        CliCommand::TagList => tag_list(&paths, &config, out),
        CliCommand::TagShow { key } => tag_show(&paths, &config, out, &key),
        CliCommand::TrailShow { id } => trail_show(&paths, &config, out, id),
        CliCommand::TrailHtml { id } => trail_html(&paths, &config, out, id),
    }
}

fn open_tags(paths: &RuntimePaths, config: &ValidatedConfig) -> Result<TagStore, CliError> {
    TagStore::open(&paths.state_sys_dir, config.default_locale.clone())
        .map_err(|err| CliError::runtime(err.to_string()))
}

fn tag_add(
    paths: &RuntimePaths,
    config: &ValidatedConfig,
    out: &mut dyn Write,
    name: &str,
    parent: Option<TagKey>,
    locale: Option<Locale>,
    position: i64,
) -> Result<(), CliError> {
    let mut store = open_tags(paths, config)?;
    let parent = match parent {
        Some(key) => Some(
            store
                .get(&key)
                .ok_or_else(|| CliError::runtime(format!("Parent tag '{}' not found", key)))?,
        ),
        None => None,
    };
    let committed = store
        .find_or_create_committed(name, locale.as_ref(), parent.as_ref(), position)
        .map_err(tag_error)?;
    let tag = committed.tag;
    if committed.created {
        write_line(out, &format!("created {} at {}", tag.key, tag.position))
    } else {
        write_line(out, &format!("exists {}", tag.key))
    }
}

fn tag_list(
    paths: &RuntimePaths,
    config: &ValidatedConfig,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let store = open_tags(paths, config)?;
    for tag in store.list() {
        let parent = tag.parent.as_ref().map(TagKey::as_str).unwrap_or("-");
        write_line(
            out,
            &format!("{}\t{}\t{}\t{}", tag.key, parent, tag.position, tag.name),
        )?;
    }
    Ok(())
}

fn tag_show(
    paths: &RuntimePaths,
    config: &ValidatedConfig,
    out: &mut dyn Write,
    key: &TagKey,
) -> Result<(), CliError> {
    let store = open_tags(paths, config)?;
    let tag = store
        .get(key)
        .ok_or_else(|| CliError::runtime(format!("Tag '{}' not found", key)))?;
    write_line(out, &format!("key: {}", tag.key))?;
    write_line(out, &format!("name: {}", tag.name))?;
    write_line(
        out,
        &format!(
            "parent: {}",
            tag.parent.as_ref().map(TagKey::as_str).unwrap_or("-")
        ),
    )?;
    write_line(out, &format!("position: {}", tag.position))?;
    write_line(out, &format!("visible: {}", tag.visible))?;
    for label in store.labels_for(key) {
        write_line(out, &format!("label[{}]: {}", label.locale, label.text))?;
    }
    Ok(())
}

fn resolve_trail(
    tree: &ContentTreeStore,
    config: &ValidatedConfig,
    id: ContentId,
) -> Result<Option<BreadcrumbTrail>, CliError> {
    BreadcrumbResolver::new(tree)
        .with_max_depth(config.breadcrumb_max_depth)
        .resolve_id(id)
        .map_err(|err| CliError::runtime(err.to_string()))
}

fn load_tree(paths: &RuntimePaths) -> Result<ContentTreeStore, CliError> {
    ContentTreeStore::load(&paths.content_tree_file)
        .map_err(|err| CliError::runtime(err.to_string()))
}

fn trail_show(
    paths: &RuntimePaths,
    config: &ValidatedConfig,
    out: &mut dyn Write,
    id: ContentId,
) -> Result<(), CliError> {
    let tree = load_tree(paths)?;
    match resolve_trail(&tree, config, id)? {
        None => write_line(out, NO_TRAIL),
        Some(trail) if trail.is_empty() => write_line(out, ROOT_TRAIL),
        Some(trail) => write_line(out, &trail.titles().join(" > ")),
    }
}

fn trail_html(
    paths: &RuntimePaths,
    config: &ValidatedConfig,
    out: &mut dyn Write,
    id: ContentId,
) -> Result<(), CliError> {
    let tree = load_tree(paths)?;
    let Some(trail) = resolve_trail(&tree, config, id)? else {
        return write_line(out, NO_TRAIL);
    };
    let current_title = tree
        .get(id)
        .and_then(|node| node.source.as_ref())
        .map(|source| source.title.as_str());
    write_line(out, &render_breadcrumbs_html(&trail, current_title))
}

fn tag_error(err: TagError<TagStoreError>) -> CliError {
    match err {
        TagError::Validation(err) => CliError::usage(err.to_string()),
        TagError::Storage(err) => CliError::runtime(err.to_string()),
    }
}

fn write_line(out: &mut dyn Write, line: &str) -> Result<(), CliError> {
    writeln!(out, "{}", line)
        .map_err(|err| CliError::runtime(format!("Failed to write output: {}", err)))
}
