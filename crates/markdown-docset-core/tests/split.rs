use std::fs;

use markdown_docset_core::{split, DocsetError, ExitCode, SplitMethod};
use markdown_docset_test_support::{file_names, split_builder, write_fixture};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const GUIDE: &str = "# Guide\nIntro text\n## Install\nRun it\n## Usage\nUse it\n";

#[test]
fn headers_split_writes_linked_sections() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_fixture(temp.path(), "guide.md", GUIDE);
    let out = temp.path().join("out");

    let policy = split_builder(&out).build().expect("policy");
    let outcome = split(&input, &policy).expect("split");

    assert_eq!(outcome.written.len(), 2);
    assert_eq!(outcome.index, None);
    assert_eq!(file_names(&out), ["install.md", "usage.md"]);

    let install = fs::read_to_string(out.join("install.md")).expect("read install");
    assert_eq!(
        install,
        "---\n## Navigation\n\n→ [Next: Usage](usage.md)\n\n---\n\n## Install\nRun it"
    );

    let usage = fs::read_to_string(out.join("usage.md")).expect("read usage");
    assert_eq!(
        usage,
        "---\n## Navigation\n\n← [Previous: Install](install.md)\n\n---\n\n## Usage\nUse it\n"
    );
}

#[test]
fn output_defaults_to_input_directory() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_fixture(temp.path(), "docs/guide.md", GUIDE);

    let policy = markdown_docset_test_support::test_config()
        .split
        .policy_builder()
        .add_navigation(false)
        .build()
        .expect("policy");
    let outcome = split(&input, &policy).expect("split");

    assert_eq!(outcome.output_dir, temp.path().join("docs"));
    assert_eq!(
        file_names(&temp.path().join("docs")),
        ["guide.md", "install.md", "usage.md"]
    );
    let usage = fs::read_to_string(temp.path().join("docs/usage.md")).expect("read");
    assert_eq!(usage, "## Usage\nUse it\n");
}

#[test]
fn index_and_prefix_are_applied() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_fixture(temp.path(), "guide.md", GUIDE);
    let out = temp.path().join("out");

    let policy = split_builder(&out)
        .filename_prefix("guide-")
        .write_index(true)
        .build()
        .expect("policy");
    let outcome = split(&input, &policy).expect("split");

    assert_eq!(outcome.index, Some(out.join("guide-index.md")));
    assert_eq!(
        file_names(&out),
        ["guide-index.md", "guide-install.md", "guide-usage.md"]
    );

    let index = fs::read_to_string(out.join("guide-index.md")).expect("read index");
    assert_eq!(
        index,
        "# guide - Split Documentation\n\n\
This document has been split into the following sections:\n\n\
1. [Install](guide-install.md)\n\
2. [Usage](guide-usage.md)\n\n\
---\n\n\
*Split from: guide.md*\n"
    );

    let install = fs::read_to_string(out.join("guide-install.md")).expect("read");
    assert!(install.contains("↑ [Index](guide-index.md)\n"));
}

#[test]
fn section_cap_drops_trailing_sections() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_fixture(temp.path(), "g.md", "## A\n## B\n## C\n");
    let out = temp.path().join("out");

    let policy = split_builder(&out).max_sections(2).build().expect("policy");
    let outcome = split(&input, &policy).expect("split");

    assert_eq!(outcome.dropped, 1);
    assert_eq!(file_names(&out), ["a.md", "b.md"]);
}

#[test]
fn document_without_headings_writes_nothing() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_fixture(temp.path(), "plain.md", "just text\nno headings\n");
    let out = temp.path().join("out");

    let policy = split_builder(&out).build().expect("policy");
    let outcome = split(&input, &policy).expect("split");

    assert!(outcome.written.is_empty());
    assert!(out.is_dir());
    assert!(file_names(&out).is_empty());
}

#[test]
fn lines_split_ignores_section_cap() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_fixture(temp.path(), "n.md", "1\n2\n3\n4\n5");
    let out = temp.path().join("out");

    let policy = split_builder(&out)
        .method(SplitMethod::Lines)
        .lines_per_file(2)
        .max_sections(1)
        .add_navigation(false)
        .build()
        .expect("policy");
    let outcome = split(&input, &policy).expect("split");

    assert_eq!(outcome.written.len(), 3);
    assert_eq!(file_names(&out), ["part-1.md", "part-2.md", "part-3.md"]);
    assert_eq!(fs::read_to_string(out.join("part-3.md")).expect("read"), "5");
}

#[test]
fn size_split_respects_budget() {
    let temp = TempDir::new().expect("tempdir");
    let line = "x".repeat(399);
    let content = format!("{line}\n{line}\n{line}\n");
    let input = write_fixture(temp.path(), "big.md", &content);
    let out = temp.path().join("out");

    let policy = split_builder(&out)
        .method(SplitMethod::Size)
        .max_size_kb(1)
        .add_navigation(false)
        .build()
        .expect("policy");
    split(&input, &policy).expect("split");

    assert_eq!(file_names(&out), ["part-1.md", "part-2.md"]);
    let first = fs::read_to_string(out.join("part-1.md")).expect("read");
    assert_eq!(first, format!("{line}\n{line}"));
}

#[test]
fn missing_input_is_not_found() {
    let temp = TempDir::new().expect("tempdir");
    let policy = split_builder(temp.path()).build().expect("policy");

    let err = split(&temp.path().join("missing.md"), &policy).unwrap_err();
    assert!(matches!(err, DocsetError::NotFound(_)));
    assert_eq!(err.exit_code(), ExitCode::NotFound);
}

#[test]
fn sections_never_overwrite_the_input() {
    let temp = TempDir::new().expect("tempdir");
    let source = "## Guide\nbody\n## Other\nx\n";
    let input = write_fixture(temp.path(), "guide.md", source);

    let policy = markdown_docset_test_support::test_config()
        .split
        .policy_builder()
        .add_navigation(false)
        .build()
        .expect("policy");
    split(&input, &policy).expect("split");

    assert_eq!(fs::read_to_string(&input).expect("read input"), source);
    assert_eq!(file_names(temp.path()), ["guide-2.md", "guide.md", "other.md"]);
    assert_eq!(
        fs::read_to_string(temp.path().join("guide-2.md")).expect("read"),
        "## Guide\nbody"
    );
}

#[test]
fn separate_output_directory_keeps_plain_names() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_fixture(temp.path(), "guide.md", "## Guide\nbody\n");
    let out = temp.path().join("out");

    let policy = split_builder(&out).build().expect("policy");
    split(&input, &policy).expect("split");

    assert_eq!(file_names(&out), ["guide.md"]);
}

#[test]
fn index_named_like_the_input_is_refused() {
    let temp = TempDir::new().expect("tempdir");
    let source = "## A\nx\n";
    let input = write_fixture(temp.path(), "index.md", source);

    let policy = markdown_docset_test_support::test_config()
        .split
        .policy_builder()
        .write_index(true)
        .build()
        .expect("policy");
    let err = split(&input, &policy).unwrap_err();

    assert_eq!(err.exit_code(), ExitCode::Io);
    assert_eq!(fs::read_to_string(&input).expect("read input"), source);
    assert_eq!(file_names(temp.path()), ["index.md"]);
}
