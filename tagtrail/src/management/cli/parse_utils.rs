// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::CliError;
use crate::content::{ContentId, parse_content_id_hex};

pub(crate) fn parse_required_arg<'a>(
    args: &'a [String],
    label: &str,
) -> Result<(&'a str, &'a [String]), CliError> {
    match args.split_first() {
        Some((first, rest)) => Ok((first.as_str(), rest)),
        None => Err(CliError::usage(format!("Missing {}", label))),
    }
}

pub(crate) fn next_value<'a>(
    args: &'a [String],
    idx: &mut usize,
    flag: &str,
) -> Result<&'a str, CliError> {
    let value = args
        .get(*idx)
        .ok_or_else(|| CliError::usage(format!("{} requires a value", flag)))?;
    *idx += 1;
    Ok(value.as_str())
}

pub(crate) fn reject_extra_args(args: &[String]) -> Result<(), CliError> {
    match args.first() {
        Some(extra) => Err(CliError::usage(format!("Unexpected argument '{}'", extra))),
        None => Ok(()),
    }
}

pub(crate) fn parse_content_id_arg(raw: &str) -> Result<ContentId, CliError> {
    parse_content_id_hex(raw).map_err(|err| CliError::usage(format!("Invalid content id: {}", err)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_value_advances_past_the_value() {
        let args: Vec<String> = vec!["--locale".into(), "de".into()];
        let mut idx = 1;
        assert_eq!(next_value(&args, &mut idx, "--locale").unwrap(), "de");
        assert_eq!(idx, 2);
        assert!(next_value(&args, &mut idx, "--locale").is_err());
    }

    #[test]
    fn content_ids_must_be_hex() {
        assert_eq!(
            parse_content_id_arg("000000000000002a").unwrap(),
            ContentId(42)
        );
        assert_eq!(
            parse_content_id_arg("zz").unwrap_err().exit_code(),
            2
        );
    }
}
