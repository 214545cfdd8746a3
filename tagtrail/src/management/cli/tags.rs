// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::management::cli::parse_utils::{next_value, parse_required_arg, reject_extra_args};
use crate::management::cli::{CliCommand, CliError, CommandSpec, DomainSpec};
use crate::management::tags::{Locale, TagKey};

pub fn domain() -> DomainSpec {
    DomainSpec {
        name: "tag",
        aliases: &["t"],
        commands: vec![
            CommandSpec {
                name: "add",
                aliases: &[],
                usage: &["tag add <name> [--parent <key>] [--locale <locale>] [--position <n>]"],
                parser: parse_add,
            },
            CommandSpec {
                name: "list",
                aliases: &["ls"],
                usage: &["tag list"],
                parser: parse_list,
            },
            CommandSpec {
                name: "show",
                aliases: &[],
                usage: &["tag show <key>"],
                parser: parse_show,
            },
        ],
    }
}

fn parse_add(args: &[String]) -> Result<CliCommand, CliError> {
    let (name, rest) = parse_required_arg(args, "tag name")?;
    let mut parent = None;
    let mut locale = None;
    let mut position = 0;

    let mut idx = 0;
    while idx < rest.len() {
        match rest[idx].as_str() {
            "--parent" => {
                idx += 1;
                parent = Some(parse_key(next_value(rest, &mut idx, "--parent")?)?);
            }
            "--locale" => {
                idx += 1;
                let raw = next_value(rest, &mut idx, "--locale")?;
                locale = Some(Locale::parse(raw).map_err(|err| CliError::usage(err.to_string()))?);
            }
            "--position" => {
                idx += 1;
                let raw = next_value(rest, &mut idx, "--position")?;
                position = raw.parse::<i64>().map_err(|_| {
                    CliError::usage(format!("--position expects an integer, got '{}'", raw))
                })?;
            }
            other => {
                return Err(CliError::usage(format!("Unknown tag add option '{}'", other)));
            }
        }
    }

    Ok(CliCommand::TagAdd {
        name: name.to_string(),
        parent,
        locale,
        position,
    })
}

fn parse_list(args: &[String]) -> Result<CliCommand, CliError> {
    reject_extra_args(args)?;
    Ok(CliCommand::TagList)
}

fn parse_show(args: &[String]) -> Result<CliCommand, CliError> {
    let (raw, rest) = parse_required_arg(args, "tag key")?;
    reject_extra_args(rest)?;
    Ok(CliCommand::TagShow {
        key: parse_key(raw)?,
    })
}

fn parse_key(raw: &str) -> Result<TagKey, CliError> {
    TagKey::parse(raw).map_err(|err| CliError::usage(format!("Invalid tag key: {}", err)))
}
