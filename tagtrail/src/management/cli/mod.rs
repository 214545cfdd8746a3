// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

mod execute;
pub(crate) mod parse_utils;
pub mod tags;
pub mod trail;

pub use execute::execute;

use crate::content::ContentId;
use crate::management::tags::{Locale, TagKey};
use std::collections::BTreeSet;
use std::fmt;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliErrorKind {
    Usage,
    Runtime,
}

#[derive(Debug, Clone)]
pub struct CliError {
    kind: CliErrorKind,
    message: String,
}

impl CliError {
    pub fn usage(message: impl Into<String>) -> Self {
        Self {
            kind: CliErrorKind::Usage,
            message: message.into(),
        }
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Self {
            kind: CliErrorKind::Runtime,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> CliErrorKind {
        self.kind
    }

    pub fn exit_code(&self) -> i32 {
        match self.kind {
            CliErrorKind::Usage => 2,
            CliErrorKind::Runtime => 1,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// A fully parsed command line, ready to run against a runtime root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    TagAdd {
        name: String,
        parent: Option<TagKey>,
        locale: Option<Locale>,
        position: i64,
    },
    TagList,
    TagShow {
        key: TagKey,
    },
    TrailShow {
        id: ContentId,
    },
    TrailHtml {
        id: ContentId,
    },
}

pub struct CliRegistry {
    domains: Vec<DomainSpec>,
    names: BTreeSet<String>,
}

impl Default for CliRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CliRegistry {
    pub fn new() -> Self {
        Self {
            domains: Vec::new(),
            names: BTreeSet::new(),
        }
    }

    pub fn register_domain(&mut self, domain: DomainSpec) -> Result<(), CliError> {
        for name in domain.all_names() {
            if !self.names.insert(name.to_ascii_lowercase()) {
                return Err(CliError::usage(format!(
                    "Duplicate domain name or alias '{}'",
                    name
                )));
            }
        }
        let mut seen = BTreeSet::new();
        for command in &domain.commands {
            for name in command.all_names() {
                if !seen.insert(name.to_ascii_lowercase()) {
                    return Err(CliError::usage(format!(
                        "Duplicate command name or alias '{}' in domain '{}'",
                        name, domain.name
                    )));
                }
            }
        }
        self.domains.push(domain);
        Ok(())
    }

    pub fn resolve_command(&self, tokens: &[String]) -> Result<CliCommand, CliError> {
        let Some((domain_token, rest)) = tokens.split_first() else {
            return Err(CliError::usage("Missing command domain"));
        };
        let domain = resolve_named(domain_token, &self.domains, "domain")?;
        let Some((command_token, args)) = rest.split_first() else {
            return Err(CliError::usage(format!(
                "Missing command for domain '{}'",
                domain.name
            )));
        };
        let command = resolve_named(command_token, &domain.commands, "command")?;
        (command.parser)(args)
    }
}

pub struct DomainSpec {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub commands: Vec<CommandSpec>,
}

pub struct CommandSpec {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub usage: &'static [&'static str],
    pub parser: fn(&[String]) -> Result<CliCommand, CliError>,
}

trait Named {
    fn name(&self) -> &'static str;
    fn aliases(&self) -> &'static [&'static str];

    fn all_names(&self) -> Vec<&'static str> {
        std::iter::once(self.name())
            .chain(self.aliases().iter().copied())
            .collect()
    }

    fn matches_exact(&self, token: &str) -> bool {
        self.all_names()
            .iter()
            .any(|name| name.eq_ignore_ascii_case(token))
    }

    fn matches_prefix(&self, token: &str) -> bool {
        let token = token.to_ascii_lowercase();
        self.all_names()
            .iter()
            .any(|name| name.to_ascii_lowercase().starts_with(&token))
    }
}

impl Named for DomainSpec {
    fn name(&self) -> &'static str {
        self.name
    }

    fn aliases(&self) -> &'static [&'static str] {
        self.aliases
    }
}

impl Named for CommandSpec {
    fn name(&self) -> &'static str {
        self.name
    }

    fn aliases(&self) -> &'static [&'static str] {
        self.aliases
    }
}

/// Exact names and aliases win; otherwise a prefix must match exactly one
/// entry.
fn resolve_named<'a, T: Named>(token: &str, items: &'a [T], kind: &str) -> Result<&'a T, CliError> {
    if let Some(item) = items.iter().find(|item| item.matches_exact(token)) {
        return Ok(item);
    }
    let matched: Vec<&T> = items
        .iter()
        .filter(|item| item.matches_prefix(token))
        .collect();
    match matched.as_slice() {
        [item] => Ok(*item),
        [] => Err(CliError::usage(format!("Unknown {} '{}'", kind, token))),
        many => {
            let mut names: Vec<&str> = many.iter().map(|item| item.name()).collect();
            names.sort();
            Err(CliError::usage(format!(
                "Ambiguous {} prefix '{}': {}",
                kind,
                token,
                names.join(", ")
            )))
        }
    }
}

pub fn build_registry() -> Result<CliRegistry, CliError> {
    let mut registry = CliRegistry::new();
    registry.register_domain(tags::domain())?;
    registry.register_domain(trail::domain())?;
    Ok(registry)
}

pub fn help_text() -> String {
    let registry = match build_registry() {
        Ok(registry) => registry,
        Err(err) => return format!("Failed to build CLI registry: {}", err),
    };

    let mut lines = vec![
        "Usage:".to_string(),
        "  tagtrail [options] <domain> <command> [args]".to_string(),
        "  tagtrail help".to_string(),
        String::new(),
        "Options:".to_string(),
        "  -C <root>   Set the runtime root (default: .).".to_string(),
        "  -h, --help  Show this help.".to_string(),
        String::new(),
        "Domains and commands:".to_string(),
    ];
    for domain in &registry.domains {
        lines.push(format!("  {}{}", domain.name, format_aliases(domain.aliases)));
        for command in &domain.commands {
            lines.push(format!(
                "    {}{}",
                command.name,
                format_aliases(command.aliases)
            ));
            lines.extend(command.usage.iter().map(|usage| format!("      {}", usage)));
        }
    }
    lines.push(String::new());
    lines.push("Notes:".to_string());
    lines.push(
        "  Domains and commands are case-insensitive and accept unambiguous prefixes.".to_string(),
    );

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Parses and runs one command, writing its output to `out` and errors to
/// stderr. Returns the process exit code.
pub fn run_cli(runtime_root: &Path, tokens: &[String], out: &mut dyn Write) -> i32 {
    let result = build_registry()
        .and_then(|registry| registry.resolve_command(tokens))
        .and_then(|command| execute(runtime_root, command, out));
    match result {
        Ok(()) => 0,
        Err(err) => {
            log::debug!("Command failed: {}", err);
            eprintln!("{}", err);
            err.exit_code()
        }
    }
}

fn format_aliases(aliases: &[&str]) -> String {
    if aliases.is_empty() {
        String::new()
    } else {
        format!(" (aliases: {})", aliases.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|token| token.to_string()).collect()
    }

    #[test]
    fn resolves_exact_alias_and_prefix() {
        let registry = build_registry().unwrap();
        assert_eq!(
            registry.resolve_command(&tokens(&["tag", "list"])).unwrap(),
            CliCommand::TagList
        );
        assert_eq!(
            registry.resolve_command(&tokens(&["T", "LI"])).unwrap(),
            CliCommand::TagList
        );
        assert_eq!(
            registry
                .resolve_command(&tokens(&["tr", "sh", "00000000000000ff"]))
                .unwrap(),
            CliCommand::TrailShow {
                id: ContentId(0xff)
            }
        );
    }

    #[test]
    fn missing_pieces_are_usage_errors() {
        let registry = build_registry().unwrap();
        let err = registry.resolve_command(&[]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        let err = registry.resolve_command(&tokens(&["tag"])).unwrap_err();
        assert!(err.to_string().contains("Missing command"));
        let err = registry
            .resolve_command(&tokens(&["nope", "list"]))
            .unwrap_err();
        assert!(err.to_string().contains("Unknown domain"));
    }

    #[test]
    fn ambiguous_prefix_lists_candidates() {
        let mut registry = CliRegistry::new();
        registry
            .register_domain(DomainSpec {
                name: "alpha",
                aliases: &[],
                commands: vec![
                    CommandSpec {
                        name: "list",
                        aliases: &[],
                        usage: &["alpha list"],
                        parser: |_args| Ok(CliCommand::TagList),
                    },
                    CommandSpec {
                        name: "link",
                        aliases: &[],
                        usage: &["alpha link"],
                        parser: |_args| Ok(CliCommand::TagList),
                    },
                ],
            })
            .unwrap();
        let err = registry
            .resolve_command(&tokens(&["alpha", "li"]))
            .unwrap_err();
        assert_eq!(err.to_string(), "Ambiguous command prefix 'li': link, list");
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut registry = CliRegistry::new();
        registry.register_domain(tags::domain()).unwrap();
        assert!(registry.register_domain(tags::domain()).is_err());

        let mut registry = CliRegistry::new();
        let err = registry
            .register_domain(DomainSpec {
                name: "beta",
                aliases: &[],
                commands: vec![
                    CommandSpec {
                        name: "show",
                        aliases: &["s"],
                        usage: &[],
                        parser: |_args| Ok(CliCommand::TagList),
                    },
                    CommandSpec {
                        name: "s",
                        aliases: &[],
                        usage: &[],
                        parser: |_args| Ok(CliCommand::TagList),
                    },
                ],
            })
            .unwrap_err();
        assert!(err.to_string().contains("Duplicate command"));
    }

    #[test]
    fn help_lists_every_domain() {
        let help = help_text();
        assert!(help.contains("tag add <name>"));
        assert!(help.contains("trail show <content-id>"));
        assert!(help.contains("-C <root>"));
    }
}
