// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::config::{CONFIG_FILE_NAME, ConfigError};
use crate::management::tags::TAGS_FILE_NAME;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONTENT_TREE_FILE_NAME: &str = "content.yaml";

#[derive(Debug, Clone)]
pub struct RuntimePaths {
    pub root: PathBuf,
    pub config_file: PathBuf,
    pub content_dir: PathBuf,
    pub content_tree_file: PathBuf,
    pub state_dir: PathBuf,
    pub state_sys_dir: PathBuf,
    pub tags_file: PathBuf,
}

impl RuntimePaths {
    /// Resolves the runtime layout under `root`, creating the content and
    /// state directories when they are missing.
    pub fn from_root(root: &Path) -> Result<Self, ConfigError> {
        let root_path = if root.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            root.to_path_buf()
        };
        ensure_dir_exists(&root_path)?;
        let root = canonicalize(&root_path, "runtime root")?;

        let content_dir = root.join("content");
        let state_dir = root.join("state");
        let state_sys_dir = state_dir.join("sys");
        ensure_dir_exists(&content_dir)?;
        ensure_dir_exists(&state_sys_dir)?;

        Ok(Self {
            config_file: root.join(CONFIG_FILE_NAME),
            content_tree_file: content_dir.join(CONTENT_TREE_FILE_NAME),
            tags_file: state_sys_dir.join(TAGS_FILE_NAME),
            content_dir,
            state_dir,
            state_sys_dir,
            root,
        })
    }
}

fn ensure_dir_exists(path: &Path) -> Result<(), ConfigError> {
    if path.is_dir() {
        return Ok(());
    }
    if path.exists() {
        return Err(ConfigError::ValidationError(format!(
            "Expected a directory at '{}'",
            path.display()
        )));
    }
    fs::create_dir_all(path).map_err(|e| {
        ConfigError::ValidationError(format!(
            "Failed to create directory '{}': {}",
            path.display(),
            e
        ))
    })
}

fn canonicalize(path: &Path, label: &str) -> Result<PathBuf, ConfigError> {
    path.canonicalize().map_err(|e| {
        ConfigError::ValidationError(format!(
            "Failed to canonicalize {} '{}': {}",
            label,
            path.display(),
            e
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::test_fixtures::TestFixtureRoot;

    #[test]
    fn layout_is_created_under_root() {
        let fixture = TestFixtureRoot::new_unique("runtime-paths").unwrap();
        let paths = RuntimePaths::from_root(fixture.path()).unwrap();
        assert!(paths.content_dir.is_dir());
        assert!(paths.state_sys_dir.is_dir());
        assert!(paths.tags_file.ends_with("state/sys/tags.yaml"));
        assert!(paths.content_tree_file.ends_with("content/content.yaml"));
    }

    #[test]
    fn file_in_place_of_directory_is_rejected() {
        let fixture = TestFixtureRoot::new_unique("runtime-paths-file").unwrap();
        std::fs::write(fixture.path().join("content"), "not a dir").unwrap();
        assert!(RuntimePaths::from_root(fixture.path()).is_err());
    }
}
