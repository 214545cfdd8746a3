// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::management::tags::Locale;
use crate::public::breadcrumbs::DEFAULT_MAX_DEPTH;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const CONFIG_FILE_NAME: &str = "config.yaml";
const MAX_BREADCRUMB_DEPTH: usize = 4096;

#[derive(Debug)]
pub enum ConfigError {
    LoadError(String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::LoadError(msg) => write!(f, "Configuration load error: {}", msg),
            ConfigError::ValidationError(msg) => {
                write!(f, "Configuration validation error: {}", msg)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct TagsConfig {
    #[serde(default = "default_locale")]
    pub default_locale: String,
}

impl Default for TagsConfig {
    fn default() -> Self {
        Self {
            default_locale: default_locale(),
        }
    }
}

fn default_locale() -> String {
    "en".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct BreadcrumbsConfig {
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for BreadcrumbsConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
        }
    }
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub tags: TagsConfig,
    #[serde(default)]
    pub breadcrumbs: BreadcrumbsConfig,
}

/// Config after validation, with parsed values in place of raw strings.
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    pub log_level: LevelFilter,
    pub default_locale: Locale,
    pub breadcrumb_max_depth: usize,
}

impl Config {
    /// Reads `config.yaml` from `root`. A missing file yields the defaults.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let config_path = root.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            return Ok(Self::default());
        }
        let config_content = fs::read_to_string(&config_path).map_err(|e| {
            ConfigError::LoadError(format!(
                "Failed to read config file '{}': {}",
                config_path.display(),
                e
            ))
        })?;
        if config_content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&config_content).map_err(|e| {
            ConfigError::LoadError(format!(
                "Failed to parse config file '{}': {}",
                config_path.display(),
                e
            ))
        })
    }

    pub fn load_and_validate(root: &Path) -> Result<ValidatedConfig, ConfigError> {
        Self::load(root)?.validate()
    }

    pub fn validate(&self) -> Result<ValidatedConfig, ConfigError> {
        let log_level = parse_log_level(&self.logging.level)?;

        let default_locale = Locale::parse(&self.tags.default_locale).map_err(|err| {
            ConfigError::ValidationError(format!("tags.default_locale: {}", err))
        })?;

        let max_depth = self.breadcrumbs.max_depth;
        if max_depth == 0 || max_depth > MAX_BREADCRUMB_DEPTH {
            return Err(ConfigError::ValidationError(format!(
                "breadcrumbs.max_depth must be between 1 and {}, got: {}",
                MAX_BREADCRUMB_DEPTH, max_depth
            )));
        }

        Ok(ValidatedConfig {
            log_level,
            default_locale,
            breadcrumb_max_depth: max_depth,
        })
    }
}

fn parse_log_level(raw: &str) -> Result<LevelFilter, ConfigError> {
    match raw.trim().to_lowercase().as_str() {
        "off" => Ok(LevelFilter::Off),
        "trace" => Ok(LevelFilter::Trace),
        "debug" => Ok(LevelFilter::Debug),
        "info" => Ok(LevelFilter::Info),
        "warn" => Ok(LevelFilter::Warn),
        "error" => Ok(LevelFilter::Error),
        other => Err(ConfigError::ValidationError(format!(
            "logging.level '{}' is not one of off, error, warn, info, debug, trace",
            other
        ))),
    }
}
