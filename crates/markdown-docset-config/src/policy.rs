//! Immutable policies consumed by the split and merge operations.
//!
//! Policies are assembled once through a builder and validated on `build`.
//! After that they only expose accessors, so an operation's output is a pure
//! function of the policy value it was handed.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::pattern::{Pattern, PatternList};
use crate::ConfigError;

pub const DEFAULT_HEADER_LEVEL: usize = 2;
pub const DEFAULT_LINES_PER_FILE: usize = 200;
pub const DEFAULT_MAX_SIZE_KB: u64 = 100;
pub const DEFAULT_MAX_SECTIONS: usize = 10;
pub const DEFAULT_MERGE_OUTPUT: &str = "merged-docs.md";
pub const DEFAULT_MERGE_PATTERN: &str = "*.md";

/// Algorithm used to partition a document.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum SplitMethod {
    #[default]
    Headers,
    Lines,
    Size,
}

impl SplitMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            SplitMethod::Headers => "headers",
            SplitMethod::Lines => "lines",
            SplitMethod::Size => "size",
        }
    }
}

impl fmt::Display for SplitMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SplitMethod {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "headers" | "by-headers" => Ok(SplitMethod::Headers),
            "lines" | "by-lines" => Ok(SplitMethod::Lines),
            "size" | "by-size" => Ok(SplitMethod::Size),
            other => Err(ConfigError::UnknownSplitMethod(other.to_owned())),
        }
    }
}

/// Validated split configuration.
#[derive(Clone, Debug)]
pub struct SplitPolicy {
    method: SplitMethod,
    header_level: usize,
    lines_per_file: usize,
    max_size_kb: u64,
    max_sections: usize,
    output_dir: Option<PathBuf>,
    filename_prefix: String,
    add_navigation: bool,
    write_index: bool,
}

impl SplitPolicy {
    pub fn builder() -> SplitPolicyBuilder {
        SplitPolicyBuilder::default()
    }

    pub fn method(&self) -> SplitMethod {
        self.method
    }

    pub fn header_level(&self) -> usize {
        self.header_level
    }

    pub fn lines_per_file(&self) -> usize {
        self.lines_per_file
    }

    pub fn max_size_kb(&self) -> u64 {
        self.max_size_kb
    }

    /// Byte cap applied by the size splitter.
    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_kb.saturating_mul(1024)
    }

    pub fn max_sections(&self) -> usize {
        self.max_sections
    }

    pub fn output_dir(&self) -> Option<&Path> {
        self.output_dir.as_deref()
    }

    pub fn filename_prefix(&self) -> &str {
        &self.filename_prefix
    }

    pub fn add_navigation(&self) -> bool {
        self.add_navigation
    }

    pub fn write_index(&self) -> bool {
        self.write_index
    }
}

impl Default for SplitPolicy {
    fn default() -> Self {
        SplitPolicy {
            method: SplitMethod::Headers,
            header_level: DEFAULT_HEADER_LEVEL,
            lines_per_file: DEFAULT_LINES_PER_FILE,
            max_size_kb: DEFAULT_MAX_SIZE_KB,
            max_sections: DEFAULT_MAX_SECTIONS,
            output_dir: None,
            filename_prefix: String::new(),
            add_navigation: true,
            write_index: false,
        }
    }
}

/// Builder for [`SplitPolicy`].
#[derive(Clone, Debug, Default)]
pub struct SplitPolicyBuilder {
    policy: SplitPolicy,
}

impl SplitPolicyBuilder {
    pub fn method(mut self, method: SplitMethod) -> Self {
        self.policy.method = method;
        self
    }

    pub fn header_level(mut self, level: usize) -> Self {
        self.policy.header_level = level;
        self
    }

    pub fn lines_per_file(mut self, lines: usize) -> Self {
        self.policy.lines_per_file = lines;
        self
    }

    pub fn max_size_kb(mut self, kb: u64) -> Self {
        self.policy.max_size_kb = kb;
        self
    }

    pub fn max_sections(mut self, max: usize) -> Self {
        self.policy.max_sections = max;
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.policy.output_dir = Some(dir.into());
        self
    }

    pub fn filename_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.policy.filename_prefix = prefix.into();
        self
    }

    pub fn add_navigation(mut self, enabled: bool) -> Self {
        self.policy.add_navigation = enabled;
        self
    }

    pub fn write_index(mut self, enabled: bool) -> Self {
        self.policy.write_index = enabled;
        self
    }

    pub fn build(self) -> Result<SplitPolicy, ConfigError> {
        let policy = self.policy;
        check_split_limits(
            policy.header_level,
            policy.lines_per_file,
            policy.max_size_kb,
            policy.max_sections,
        )
        .map_err(ConfigError::InvalidPolicy)?;
        Ok(policy)
    }
}

/// Shared numeric validation for split settings, used by the builder and the
/// config file loader.
pub(crate) fn check_split_limits(
    header_level: usize,
    lines_per_file: usize,
    max_size_kb: u64,
    max_sections: usize,
) -> Result<(), String> {
    if !(1..=6).contains(&header_level) {
        return Err(format!(
            "header level must be between 1 and 6 (got {header_level})"
        ));
    }
    if lines_per_file == 0 {
        return Err("lines per file must be greater than 0".to_owned());
    }
    if max_size_kb == 0 {
        return Err("max size must be greater than 0 KB".to_owned());
    }
    if max_sections == 0 {
        return Err("max sections must be greater than 0".to_owned());
    }
    Ok(())
}

/// Validated merge configuration.
#[derive(Clone, Debug)]
pub struct MergePolicy {
    input_dir: PathBuf,
    output_file: PathBuf,
    pattern: Pattern,
    exclude: PatternList,
    recursive: bool,
    add_toc: bool,
    add_dividers: bool,
    preserve_structure: bool,
    add_summary: bool,
    optimize_for_claude: bool,
}

impl MergePolicy {
    pub fn builder(input_dir: impl Into<PathBuf>) -> MergePolicyBuilder {
        MergePolicyBuilder::new(input_dir)
    }

    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    pub fn output_file(&self) -> &Path {
        &self.output_file
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn recursive(&self) -> bool {
        self.recursive
    }

    pub fn add_toc(&self) -> bool {
        self.add_toc
    }

    pub fn add_dividers(&self) -> bool {
        self.add_dividers
    }

    pub fn preserve_structure(&self) -> bool {
        self.preserve_structure
    }

    pub fn add_summary(&self) -> bool {
        self.add_summary
    }

    pub fn optimize_for_claude(&self) -> bool {
        self.optimize_for_claude
    }

    /// True when `name` (a base name) is selected by the pattern and not excluded.
    pub fn selects(&self, name: &str) -> bool {
        self.pattern.is_match(name) && !self.exclude.matches_any(name)
    }
}

/// Builder for [`MergePolicy`]. Glob strings are compiled on `build`.
#[derive(Clone, Debug)]
pub struct MergePolicyBuilder {
    input_dir: PathBuf,
    output_file: PathBuf,
    pattern: String,
    exclude: Vec<String>,
    recursive: bool,
    add_toc: bool,
    add_dividers: bool,
    preserve_structure: bool,
    add_summary: bool,
    optimize_for_claude: bool,
}

impl MergePolicyBuilder {
    pub fn new(input_dir: impl Into<PathBuf>) -> Self {
        MergePolicyBuilder {
            input_dir: input_dir.into(),
            output_file: PathBuf::from(DEFAULT_MERGE_OUTPUT),
            pattern: DEFAULT_MERGE_PATTERN.to_owned(),
            exclude: Vec::new(),
            recursive: false,
            add_toc: true,
            add_dividers: true,
            preserve_structure: true,
            add_summary: true,
            optimize_for_claude: true,
        }
    }

    pub fn output_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_file = path.into();
        self
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }

    pub fn exclude<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude = patterns.into_iter().map(Into::into).collect();
        self
    }

    pub fn recursive(mut self, enabled: bool) -> Self {
        self.recursive = enabled;
        self
    }

    pub fn add_toc(mut self, enabled: bool) -> Self {
        self.add_toc = enabled;
        self
    }

    pub fn add_dividers(mut self, enabled: bool) -> Self {
        self.add_dividers = enabled;
        self
    }

    pub fn preserve_structure(mut self, enabled: bool) -> Self {
        self.preserve_structure = enabled;
        self
    }

    pub fn add_summary(mut self, enabled: bool) -> Self {
        self.add_summary = enabled;
        self
    }

    pub fn optimize_for_claude(mut self, enabled: bool) -> Self {
        self.optimize_for_claude = enabled;
        self
    }

    pub fn build(self) -> Result<MergePolicy, ConfigError> {
        let pattern = compile(self.pattern)?;
        let exclude = self
            .exclude
            .into_iter()
            .map(compile)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(MergePolicy {
            input_dir: self.input_dir,
            output_file: self.output_file,
            pattern,
            exclude: PatternList::new(exclude),
            recursive: self.recursive,
            add_toc: self.add_toc,
            add_dividers: self.add_dividers,
            preserve_structure: self.preserve_structure,
            add_summary: self.add_summary,
            optimize_for_claude: self.optimize_for_claude,
        })
    }
}

fn compile(value: String) -> Result<Pattern, ConfigError> {
    Pattern::new(value.clone()).map_err(|err| ConfigError::InvalidPattern {
        pattern: value,
        message: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_defaults_match_documented_values() {
        let policy = SplitPolicy::builder().build().unwrap();
        assert_eq!(policy.method(), SplitMethod::Headers);
        assert_eq!(policy.header_level(), 2);
        assert_eq!(policy.lines_per_file(), 200);
        assert_eq!(policy.max_size_bytes(), 100 * 1024);
        assert_eq!(policy.max_sections(), 10);
        assert!(policy.add_navigation());
        assert!(!policy.write_index());
        assert!(policy.output_dir().is_none());
    }

    #[test]
    fn split_builder_rejects_out_of_range_values() {
        let err = SplitPolicy::builder().header_level(7).build().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPolicy(_)));
        assert!(SplitPolicy::builder().lines_per_file(0).build().is_err());
        assert!(SplitPolicy::builder().max_size_kb(0).build().is_err());
        assert!(SplitPolicy::builder().max_sections(0).build().is_err());
    }

    #[test]
    fn split_method_parses_names() {
        assert_eq!("lines".parse::<SplitMethod>().unwrap(), SplitMethod::Lines);
        assert_eq!("Size".parse::<SplitMethod>().unwrap(), SplitMethod::Size);
        let err = "paragraphs".parse::<SplitMethod>().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownSplitMethod(name) if name == "paragraphs"));
    }

    #[test]
    fn merge_policy_selects_by_pattern_and_exclude() {
        let policy = MergePolicy::builder("docs")
            .exclude(["draft-*.md"])
            .build()
            .unwrap();
        assert!(policy.selects("intro.md"));
        assert!(!policy.selects("draft-intro.md"));
        assert!(!policy.selects("notes.txt"));
        assert_eq!(policy.output_file(), Path::new("merged-docs.md"));
        assert!(policy.add_toc() && policy.add_summary() && policy.preserve_structure());
    }

    #[test]
    fn merge_builder_reports_invalid_glob() {
        let err = MergePolicy::builder("docs").pattern("[md").build().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPattern { pattern, .. } if pattern == "[md"));
    }
}
