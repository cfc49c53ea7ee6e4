//! Shared test harness utilities for markdown-docset crates.

use std::fs;
use std::path::{Path, PathBuf};

use markdown_docset_config::{Config, MergePolicyBuilder, SplitPolicyBuilder};

/// Returns a baseline configuration for tests.
pub fn test_config() -> Config {
    Config::builtin()
}

/// Split builder seeded from the built-in defaults, writing into `output_dir`.
pub fn split_builder(output_dir: &Path) -> SplitPolicyBuilder {
    test_config().split.policy_builder().output_dir(output_dir)
}

/// Merge builder seeded from the built-in defaults.
pub fn merge_builder(input_dir: &Path, output_file: &Path) -> MergePolicyBuilder {
    test_config()
        .merge
        .policy_builder(input_dir)
        .output_file(output_file)
}

/// Write `contents` to `root/relative`, creating parent directories.
pub fn write_fixture(root: &Path, relative: &str, contents: &str) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create fixture dir");
    }
    fs::write(&path, contents).expect("write fixture");
    path
}

/// Sorted file names directly inside `dir`.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("read fixture dir")
        .filter_map(Result::ok)
        .filter(|entry| entry.path().is_file())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
