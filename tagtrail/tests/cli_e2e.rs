// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use std::path::Path;
use std::process::Command;
use tagtrail::management::tags::{Locale, TagKey, TagStore};
use tagtrail::util::test_fixtures::TestFixtureRoot;

const CONTENT_TREE: &str = r#"nodes:
  - id: "0000000000000001"
    source:
      owner: "0000000000000001"
      locale: en
      title: Home
      alias: index
  - id: "0000000000000002"
    parent: "0000000000000001"
    source:
      owner: "0000000000000002"
      locale: en
      title: Guides & Tips
      alias: guides
  - id: "0000000000000003"
    parent: "0000000000000002"
    source:
      owner: "0000000000000003"
      locale: en
      title: Install
      alias: guides/install
"#;

fn run_cli(root: &Path, args: &[&str]) -> std::process::Output {
    let binary = env!("CARGO_BIN_EXE_tagtrail");
    Command::new(binary)
        .arg("-C")
        .arg(root)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("run tagtrail cli")
}

fn stdout_of(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn open_store(root: &Path) -> TagStore {
    TagStore::open(
        &root.join("state").join("sys"),
        Locale::parse("en").unwrap(),
    )
    .expect("open tag store")
}

#[test]
fn cli_tag_add_list_show() {
    let fixture = TestFixtureRoot::new_unique("cli-tags").unwrap();
    fixture.init_runtime_layout().unwrap();

    let output = run_cli(fixture.path(), &["tag", "add", "Programming"]);
    assert!(output.status.success());
    assert_eq!(stdout_of(&output), "created programming at 1\n");

    let output = run_cli(
        fixture.path(),
        &[
            "tag",
            "add",
            "Rust <em>Lang</em>",
            "--parent",
            "programming",
            "--locale",
            "de",
        ],
    );
    assert!(output.status.success());
    assert_eq!(stdout_of(&output), "created rust-lang at 1\n");

    let output = run_cli(fixture.path(), &["tag", "add", "RUST LANG"]);
    assert!(output.status.success());
    assert_eq!(stdout_of(&output), "exists rust-lang\n");

    let store = open_store(fixture.path());
    let tag = store.get(&TagKey::parse("rust-lang").unwrap()).expect("tag present");
    assert_eq!(tag.name, "Rust Lang");
    assert_eq!(tag.parent, Some(TagKey::parse("programming").unwrap()));
    let labels = store.labels_for(&tag.key);
    assert_eq!(labels.len(), 1);
    assert_eq!(labels[0].locale.as_str(), "de");

    let output = run_cli(fixture.path(), &["t", "ls"]);
    assert!(output.status.success());
    let stdout = stdout_of(&output);
    assert!(stdout.contains("programming\t-\t1\tProgramming"));
    assert!(stdout.contains("rust-lang\tprogramming\t1\tRust Lang"));

    let output = run_cli(fixture.path(), &["tag", "show", "rust-lang"]);
    assert!(output.status.success());
    assert!(stdout_of(&output).contains("label[de]: Rust Lang"));
}

#[test]
fn cli_tag_add_position_hint() {
    let fixture = TestFixtureRoot::new_unique("cli-tags-hint").unwrap();
    let output = run_cli(fixture.path(), &["tag", "add", "First", "--position", "10"]);
    assert_eq!(stdout_of(&output), "created first at 11\n");
    let output = run_cli(fixture.path(), &["tag", "add", "Second"]);
    assert_eq!(stdout_of(&output), "created second at 12\n");
}

#[test]
fn cli_exit_codes() {
    let fixture = TestFixtureRoot::new_unique("cli-exit-codes").unwrap();

    let output = run_cli(fixture.path(), &["tag", "frobnicate"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unknown command"));

    let output = run_cli(fixture.path(), &["tag", "add", "   "]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("empty tag name"));

    let output = run_cli(fixture.path(), &["tag", "add", "child", "--parent", "ghost"]);
    assert_eq!(output.status.code(), Some(1));

    let output = run_cli(fixture.path(), &["tag", "show", "ghost"]);
    assert_eq!(output.status.code(), Some(1));

    let output = run_cli(fixture.path(), &[]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn cli_help_lists_domains() {
    let fixture = TestFixtureRoot::new_unique("cli-help").unwrap();
    let output = run_cli(fixture.path(), &["help"]);
    assert!(output.status.success());
    let stdout = stdout_of(&output);
    assert!(stdout.contains("tag add <name>"));
    assert!(stdout.contains("trail html <content-id>"));
}

#[test]
fn cli_trail_show_and_html() {
    let fixture = TestFixtureRoot::new_unique("cli-trail").unwrap();
    fixture.init_runtime_layout().unwrap();
    std::fs::write(fixture.content_dir().join("content.yaml"), CONTENT_TREE).unwrap();

    let output = run_cli(fixture.path(), &["trail", "show", "0000000000000003"]);
    assert!(output.status.success());
    assert_eq!(stdout_of(&output), "Home > Guides & Tips\n");

    let output = run_cli(fixture.path(), &["trail", "show", "00000000000000ff"]);
    assert!(output.status.success());
    assert_eq!(stdout_of(&output), "no trail\n");

    let output = run_cli(fixture.path(), &["trail", "html", "0000000000000003"]);
    assert!(output.status.success());
    let stdout = stdout_of(&output);
    assert!(stdout.contains("<a href=\"/guides\">Guides &amp; Tips</a>"));
    assert!(stdout.contains("<span>Install</span>"));

    let output = run_cli(fixture.path(), &["trail", "show", "3"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn cli_trail_respects_configured_depth() {
    let fixture = TestFixtureRoot::new_unique("cli-trail-depth").unwrap();
    fixture.init_runtime_layout().unwrap();
    fixture.write_config("breadcrumbs:\n  max_depth: 1\n").unwrap();
    std::fs::write(fixture.content_dir().join("content.yaml"), CONTENT_TREE).unwrap();

    let output = run_cli(fixture.path(), &["trail", "show", "0000000000000003"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("0000000000000003"));
}
