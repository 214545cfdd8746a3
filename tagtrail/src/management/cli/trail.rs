// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::management::cli::parse_utils::{
    parse_content_id_arg, parse_required_arg, reject_extra_args,
};
use crate::management::cli::{CliCommand, CliError, CommandSpec, DomainSpec};

pub fn domain() -> DomainSpec {
    DomainSpec {
        name: "trail",
        aliases: &["breadcrumbs"],
        commands: vec![
            CommandSpec {
                name: "show",
                aliases: &[],
                usage: &["trail show <content-id>"],
                parser: parse_show,
            },
            CommandSpec {
                name: "html",
                aliases: &[],
                usage: &["trail html <content-id>"],
                parser: parse_html,
            },
        ],
    }
}

fn parse_show(args: &[String]) -> Result<CliCommand, CliError> {
    let (raw, rest) = parse_required_arg(args, "content id")?;
    reject_extra_args(rest)?;
    Ok(CliCommand::TrailShow {
        id: parse_content_id_arg(raw)?,
    })
}

fn parse_html(args: &[String]) -> Result<CliCommand, CliError> {
    let (raw, rest) = parse_required_arg(args, "content id")?;
    reject_extra_args(rest)?;
    Ok(CliCommand::TrailHtml {
        id: parse_content_id_arg(raw)?,
    })
}
