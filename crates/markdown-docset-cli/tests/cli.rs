use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn setup_file(dir: &Path, relative: &str, contents: &str) {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent directory");
    }
    fs::write(&path, contents).expect("write file");
}

fn docset() -> Command {
    Command::cargo_bin("markdown-docset").expect("binary")
}

#[test]
fn split_reports_created_files() {
    let temp = TempDir::new().expect("tempdir");
    setup_file(
        temp.path(),
        "guide.md",
        "# Guide\n## Install\nRun it\n## Usage\nUse it\n",
    );

    docset()
        .current_dir(temp.path())
        .args(["split", "guide.md", "--output-dir", "parts", "--index"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created: parts/install.md"))
        .stdout(predicate::str::contains("Created: parts/usage.md"))
        .stdout(predicate::str::contains("Created: parts/index.md"))
        .stdout(predicate::str::contains("Split guide.md into 2 files"));

    let install = fs::read_to_string(temp.path().join("parts/install.md")).expect("read");
    assert!(install.contains("→ [Next: Usage](usage.md)"));
    assert!(install.contains("↑ [Index](index.md)"));
}

#[test]
fn split_by_lines_without_navigation() {
    let temp = TempDir::new().expect("tempdir");
    setup_file(temp.path(), "notes.md", "a\nb\nc\n");

    docset()
        .current_dir(temp.path())
        .args([
            "split",
            "notes.md",
            "--by-lines",
            "--lines-per-file",
            "2",
            "--no-navigation",
            "--prefix",
            "notes-",
        ])
        .assert()
        .success();

    let first = fs::read_to_string(temp.path().join("notes-part-1.md")).expect("read");
    assert_eq!(first, "a\nb");
    let second = fs::read_to_string(temp.path().join("notes-part-2.md")).expect("read");
    assert_eq!(second, "c\n");
}

#[test]
fn split_methods_are_mutually_exclusive() {
    let temp = TempDir::new().expect("tempdir");
    setup_file(temp.path(), "guide.md", "## A\n");

    docset()
        .current_dir(temp.path())
        .args(["split", "guide.md", "--by-lines", "--by-size"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn split_missing_input_exits_not_found() {
    let temp = TempDir::new().expect("tempdir");

    docset()
        .current_dir(temp.path())
        .args(["split", "absent.md"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error: input file absent.md does not exist"));
}

#[test]
fn invalid_header_level_is_a_config_error() {
    let temp = TempDir::new().expect("tempdir");
    setup_file(temp.path(), "guide.md", "## A\n");

    docset()
        .current_dir(temp.path())
        .args(["split", "guide.md", "--header-level", "7"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("header level must be between 1 and 6"));
}

#[test]
fn merge_writes_output_and_reports_count() {
    let temp = TempDir::new().expect("tempdir");
    setup_file(temp.path(), "docs/b.md", "# B\n");
    setup_file(temp.path(), "docs/a.md", "# A\n");
    setup_file(temp.path(), "docs/draft.md", "# Draft\n");

    docset()
        .current_dir(temp.path())
        .args(["merge", "docs", "--output", "all.md", "--exclude", "draft*", "--no-summary"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Merged 2 documents into all.md"));

    let merged = fs::read_to_string(temp.path().join("all.md")).expect("read");
    assert!(merged.contains("## Document: a.md"));
    assert!(!merged.contains("draft.md"));
    assert!(!merged.contains("## Summary"));
    assert!(merged.find("a.md").expect("a") < merged.find("## Document: b.md").expect("b"));
}

#[test]
fn merge_uses_config_file_defaults() {
    let temp = TempDir::new().expect("tempdir");
    setup_file(temp.path(), "docs/a.md", "# A\n");
    setup_file(
        temp.path(),
        ".markdown-docset.toml",
        "[merge]\noutput = \"build/combined.md\"\ntoc = false\n",
    );

    docset()
        .current_dir(temp.path())
        .args(["merge", "docs"])
        .assert()
        .success();

    let merged = fs::read_to_string(temp.path().join("build/combined.md")).expect("read");
    assert!(!merged.contains("## Table of Contents"));
    assert!(merged.contains("## Document: a.md"));
}

#[test]
fn merge_without_matches_exits_not_found() {
    let temp = TempDir::new().expect("tempdir");
    setup_file(temp.path(), "docs/readme.txt", "text\n");

    docset()
        .current_dir(temp.path())
        .args(["merge", "docs"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error: no files found matching pattern *.md"));

    assert!(!temp.path().join("merged-docs.md").exists());
}

#[test]
fn invalid_config_file_exits_with_config_code() {
    let temp = TempDir::new().expect("tempdir");
    setup_file(temp.path(), "docs/a.md", "# A\n");
    setup_file(temp.path(), "bad.toml", "[split]\nmethod = \"paragraphs\"\n");

    docset()
        .current_dir(temp.path())
        .args(["--config", "bad.toml", "merge", "docs"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("unknown split method 'paragraphs'"));
}

#[test]
fn template_generates_named_file() {
    let temp = TempDir::new().expect("tempdir");

    docset()
        .current_dir(temp.path())
        .args(["template", "api", "users"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated template:"));

    let body = fs::read_to_string(temp.path().join(".claude/templates/users-endpoint.md"))
        .expect("read template");
    assert!(body.starts_with("# users API Endpoint"));
}

#[test]
fn unknown_template_lists_available_kinds() {
    let temp = TempDir::new().expect("tempdir");

    docset()
        .current_dir(temp.path())
        .args(["template", "widget"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("available: api, screen, feature"));
}

#[test]
fn init_scaffolds_named_project() {
    let temp = TempDir::new().expect("tempdir");

    docset()
        .current_dir(temp.path())
        .args(["init", "atlas"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Initializing Claude documentation structure for 'atlas'...",
        ))
        .stdout(predicate::str::contains("Created directory: specs"))
        .stdout(predicate::str::contains("Created: .claude/debug-log.md"));

    let claude = fs::read_to_string(temp.path().join("CLAUDE.md")).expect("read");
    assert!(claude.starts_with("# atlas\n"));
    assert!(temp.path().join("specs/api.md").is_file());
}

#[test]
fn init_keeps_existing_claude_md() {
    let temp = TempDir::new().expect("tempdir");
    setup_file(temp.path(), "project/CLAUDE.md", "# Mine\n");

    docset()
        .current_dir(temp.path())
        .args(["init", "--root", "project"])
        .assert()
        .success()
        .stdout(predicate::str::contains("for 'project'..."))
        .stdout(predicate::str::contains("CLAUDE.md already exists, skipping..."));

    let claude = fs::read_to_string(temp.path().join("project/CLAUDE.md")).expect("read");
    assert_eq!(claude, "# Mine\n");
}

#[test]
fn validate_reports_missing_structure() {
    let temp = TempDir::new().expect("tempdir");
    setup_file(temp.path(), "docs/readme.md", "# Readme\n");

    docset()
        .current_dir(temp.path())
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("❌ Issues found:"))
        .stdout(predicate::str::contains(
            "  - Missing CLAUDE.md file (main project context)",
        ))
        .stdout(predicate::str::contains("💡 Recommendations:"))
        .stdout(predicate::str::contains("Scanned 1 markdown files"));
}

#[test]
fn validate_accepts_complete_structure() {
    let temp = TempDir::new().expect("tempdir");

    docset()
        .current_dir(temp.path())
        .args(["init", "atlas"])
        .assert()
        .success();
    fs::create_dir_all(temp.path().join(".claude/prompts")).expect("prompts");
    fs::create_dir_all(temp.path().join(".claude/templates")).expect("templates");

    docset()
        .current_dir(temp.path())
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("✅ Documentation structure looks good!"))
        .stdout(predicate::str::contains("Scanned 8 markdown files"));
}

#[test]
fn validate_missing_directory_exits_not_found() {
    let temp = TempDir::new().expect("tempdir");

    docset()
        .current_dir(temp.path())
        .args(["validate", "absent"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("does not exist"));
}
