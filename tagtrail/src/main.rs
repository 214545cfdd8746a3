// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use log::LevelFilter;
use std::path::PathBuf;
use tagtrail::config::Config;
use tagtrail::management::cli;
use tagtrail::util::{DEFAULT_REMAPS, build_logger, init_logger};

const USAGE_EXIT_CODE: i32 = 2;

fn main() {
    let exit_code = run();
    std::process::exit(exit_code);
}

fn run() -> i32 {
    let parsed_args = match parse_args_from(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(error) => {
            eprintln!("❌ Invalid command line arguments: {}", error);
            eprintln!("❌ Use -h to list the available commands.");
            return USAGE_EXIT_CODE;
        }
    };

    let tokens = match parsed_args.mode {
        RunMode::Help => {
            print!("{}", cli::help_text());
            return 0;
        }
        RunMode::Cli(tokens) => tokens,
    };

    // Config errors are reported by the command itself; logging falls back
    // to info so that report is still visible.
    let log_level = Config::load_and_validate(&parsed_args.runtime_root)
        .map(|config| config.log_level)
        .unwrap_or(LevelFilter::Info);
    if let Err(error) = init_logger(build_logger(log_level), DEFAULT_REMAPS) {
        eprintln!("❌ Failed to initialize logging: {}", error);
        return 1;
    }
    log::debug!("Runtime root: {}", parsed_args.runtime_root.display());

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    cli::run_cli(&parsed_args.runtime_root, &tokens, &mut out)
}

#[derive(Debug)]
enum RunMode {
    Cli(Vec<String>),
    Help,
}

#[derive(Debug)]
struct ParsedArgs {
    runtime_root: PathBuf,
    mode: RunMode,
}

fn parse_args_from<I>(args: I) -> Result<ParsedArgs, String>
where
    I: IntoIterator<Item = String>,
{
    let args: Vec<String> = args.into_iter().collect();
    if args.iter().any(|arg| is_help_flag(arg)) {
        return Ok(ParsedArgs {
            runtime_root: PathBuf::from("."),
            mode: RunMode::Help,
        });
    }

    let mut args = args.into_iter();
    let mut runtime_root = PathBuf::from(".");
    let mut cli_tokens = Vec::new();

    while let Some(arg) = args.next() {
        if arg == "--" {
            continue;
        } else if arg == "-C" {
            let value = args
                .next()
                .ok_or_else(|| "Missing value for -C".to_string())?;
            runtime_root = PathBuf::from(value);
        } else {
            cli_tokens.push(arg);
        }
    }

    if cli_tokens.len() == 1 && cli_tokens[0].eq_ignore_ascii_case("help") {
        return Ok(ParsedArgs {
            runtime_root,
            mode: RunMode::Help,
        });
    }
    if cli_tokens.is_empty() {
        return Err("Missing command".to_string());
    }

    Ok(ParsedArgs {
        runtime_root: make_runtime_root_absolute(runtime_root)?,
        mode: RunMode::Cli(cli_tokens),
    })
}

fn is_help_flag(arg: &str) -> bool {
    arg == "-h" || arg == "--help"
}

fn make_runtime_root_absolute(runtime_root: PathBuf) -> Result<PathBuf, String> {
    if runtime_root.is_absolute() {
        return Ok(runtime_root);
    }
    let current_dir = std::env::current_dir()
        .map_err(|error| format!("Failed to resolve current directory: {}", error))?;
    Ok(current_dir.join(runtime_root))
}
