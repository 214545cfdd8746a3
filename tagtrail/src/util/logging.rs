// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use env_logger::Logger;
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;

/// Rewrites the level of records whose target starts with `target_prefix`.
#[derive(Debug, Clone)]
pub struct LevelRemap {
    pub target_prefix: &'static str,
    pub from: Level,
    pub to: Level,
}

/// The markup sanitizer parses tag names with html5ever, which is chatty at
/// debug level.
pub const DEFAULT_REMAPS: &[LevelRemap] = &[
    LevelRemap {
        target_prefix: "html5ever",
        from: Level::Debug,
        to: Level::Trace,
    },
    LevelRemap {
        target_prefix: "ammonia",
        from: Level::Debug,
        to: Level::Trace,
    },
];

struct RemappingLogger {
    inner: Logger,
    remaps: Vec<LevelRemap>,
}

impl RemappingLogger {
    fn level_for(&self, target: &str, level: Level) -> Level {
        self.remaps
            .iter()
            .find(|remap| remap.from == level && target.starts_with(remap.target_prefix))
            .map(|remap| remap.to)
            .unwrap_or(level)
    }
}

impl Log for RemappingLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        let remapped = Metadata::builder()
            .level(self.level_for(metadata.target(), metadata.level()))
            .target(metadata.target())
            .build();
        self.inner.enabled(&remapped)
    }

    fn log(&self, record: &Record) {
        let level = self.level_for(record.target(), record.level());
        if level == record.level() {
            self.inner.log(record);
            return;
        }
        self.inner.log(
            &Record::builder()
                .level(level)
                .target(record.target())
                .args(*record.args())
                .module_path(record.module_path())
                .file(record.file())
                .line(record.line())
                .build(),
        );
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

/// Builds the stderr logger used by the CLI. `RUST_LOG` still applies on
/// top of `level`.
pub fn build_logger(level: LevelFilter) -> Logger {
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] {}: {}",
                chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f UTC"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .build()
}

pub fn init_logger(logger: Logger, remaps: &[LevelRemap]) -> Result<(), SetLoggerError> {
    let max_level = logger.filter();
    log::set_boxed_logger(Box::new(RemappingLogger {
        inner: logger,
        remaps: remaps.to_vec(),
    }))?;
    log::set_max_level(max_level);
    Ok(())
}
