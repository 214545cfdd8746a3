// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::error::Error;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

const MAX_TEMP_ATTEMPTS: u32 = 100;

#[derive(Debug)]
pub(crate) struct YamlStoreError {
    message: String,
}

impl YamlStoreError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for YamlStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for YamlStoreError {}

/// Reads a YAML document. A missing or blank file is `Ok(None)`.
pub(crate) fn read_yaml_file<T: DeserializeOwned>(
    path: &Path,
    label: &str,
) -> Result<Option<T>, YamlStoreError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(YamlStoreError::new(format!(
                "Failed to read {} file {}: {}",
                label,
                path.display(),
                err
            )));
        }
    };
    if content.trim().is_empty() {
        return Ok(None);
    }
    serde_yaml::from_str(&content).map(Some).map_err(|err| {
        YamlStoreError::new(format!(
            "Failed to parse {} file {}: {}",
            label,
            path.display(),
            err
        ))
    })
}

/// Replaces `path` with the serialized value through a synced temp file in
/// the same directory, keeping the old file's permissions.
pub(crate) fn write_yaml_file<T: Serialize>(
    path: &Path,
    label: &str,
    value: &T,
) -> Result<(), YamlStoreError> {
    let content = serde_yaml::to_string(value)
        .map_err(|err| YamlStoreError::new(format!("Failed to serialize {}: {}", label, err)))?;
    let parent = path
        .parent()
        .ok_or_else(|| YamlStoreError::new(format!("{} file path has no parent", label)))?;
    if !parent.as_os_str().is_empty() {
        fs::create_dir_all(parent).map_err(|err| {
            YamlStoreError::new(format!("Failed to create {} directory: {}", label, err))
        })?;
    }
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| YamlStoreError::new(format!("{} file name is not valid UTF-8", label)))?;

    let mut temp = TempFile::create(parent, file_name, label)?;
    #[cfg(unix)]
    if let Ok(metadata) = fs::metadata(path) {
        fs::set_permissions(&temp.path, metadata.permissions()).map_err(|err| {
            YamlStoreError::new(format!(
                "Failed to copy {} file permissions: {}",
                label, err
            ))
        })?;
    }
    temp.file
        .write_all(content.as_bytes())
        .and_then(|_| temp.file.sync_all())
        .map_err(|err| YamlStoreError::new(format!("Failed to write {} file: {}", label, err)))?;
    temp.persist(path, label)?;

    #[cfg(unix)]
    if let Err(err) = fs::File::open(parent).and_then(|dir| dir.sync_all()) {
        log::warn!("Syncing {} directory failed: {}", label, err);
    }
    Ok(())
}

/// Temp file that removes itself unless it was renamed into place.
struct TempFile {
    file: fs::File,
    path: PathBuf,
    persisted: bool,
}

impl TempFile {
    fn create(parent: &Path, file_name: &str, label: &str) -> Result<Self, YamlStoreError> {
        for attempt in 0..MAX_TEMP_ATTEMPTS {
            let path = parent.join(format!(
                ".{}.tmp.{}.{}",
                file_name,
                std::process::id(),
                attempt
            ));
            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
            {
                Ok(file) => {
                    return Ok(Self {
                        file,
                        path,
                        persisted: false,
                    });
                }
                Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(err) => {
                    return Err(YamlStoreError::new(format!(
                        "Failed to create temp {} file: {}",
                        label, err
                    )));
                }
            }
        }
        Err(YamlStoreError::new(format!(
            "Failed to create temp {} file after {} attempts",
            label, MAX_TEMP_ATTEMPTS
        )))
    }

    fn persist(mut self, target: &Path, label: &str) -> Result<(), YamlStoreError> {
        fs::rename(&self.path, target).map_err(|err| {
            YamlStoreError::new(format!("Failed to replace {} file: {}", label, err))
        })?;
        self.persisted = true;
        Ok(())
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        if !self.persisted {
            let _ = fs::remove_file(&self.path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::test_fixtures::TestFixtureRoot;
    use std::collections::BTreeMap;

    #[test]
    fn missing_and_blank_files_read_as_none() {
        let fixture = TestFixtureRoot::new_unique("yaml-missing").unwrap();
        let path = fixture.path().join("absent.yaml");
        let value: Option<BTreeMap<String, u32>> = read_yaml_file(&path, "test").unwrap();
        assert!(value.is_none());

        std::fs::write(&path, "  \n").unwrap();
        let value: Option<BTreeMap<String, u32>> = read_yaml_file(&path, "test").unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn write_replaces_file_and_leaves_no_temp() {
        let fixture = TestFixtureRoot::new_unique("yaml-write").unwrap();
        let path = fixture.path().join("nested").join("values.yaml");
        let mut values = BTreeMap::new();
        values.insert("alpha".to_string(), 1u32);
        write_yaml_file(&path, "values", &values).unwrap();
        values.insert("beta".to_string(), 2u32);
        write_yaml_file(&path, "values", &values).unwrap();

        let loaded: BTreeMap<String, u32> = read_yaml_file(&path, "values").unwrap().unwrap();
        assert_eq!(loaded, values);
        let leftovers = std::fs::read_dir(path.parent().unwrap())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_name().to_string_lossy().contains(".tmp."))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn parse_errors_name_the_file() {
        let fixture = TestFixtureRoot::new_unique("yaml-invalid").unwrap();
        let path = fixture.path().join("broken.yaml");
        std::fs::write(&path, "alpha: [unclosed").unwrap();
        let err = read_yaml_file::<BTreeMap<String, u32>>(&path, "broken").unwrap_err();
        assert!(err.to_string().contains("broken.yaml"));
    }
}
