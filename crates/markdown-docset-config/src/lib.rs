//! Configuration primitives and loader for the markdown-docset toolkit.
//!
//! Split and merge defaults resolve through a precedence stack:
//! override flag → working directory → git root → built-in defaults.
//! The resolved values seed the policy builders in [`policy`]; the CLI layers
//! its own flags on top before calling `build`.

use std::env;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

pub mod pattern;
pub mod policy;

pub use pattern::{Pattern, PatternList};
pub use policy::{
    MergePolicy, MergePolicyBuilder, SplitMethod, SplitPolicy, SplitPolicyBuilder,
    DEFAULT_HEADER_LEVEL, DEFAULT_LINES_PER_FILE, DEFAULT_MAX_SECTIONS, DEFAULT_MAX_SIZE_KB,
    DEFAULT_MERGE_OUTPUT, DEFAULT_MERGE_PATTERN,
};

pub const CONFIG_FILE_NAME: &str = ".markdown-docset.toml";

/// Complete configuration resolved from defaults and on-disk overrides.
#[derive(Clone, Debug)]
pub struct Config {
    pub split: SplitDefaults,
    pub merge: MergeDefaults,
    pub sources: ConfigSources,
}

/// Split settings applied when the caller does not override them.
#[derive(Clone, Debug)]
pub struct SplitDefaults {
    pub method: SplitMethod,
    pub header_level: usize,
    pub lines_per_file: usize,
    pub max_size_kb: u64,
    pub max_sections: usize,
    pub prefix: String,
    pub navigation: bool,
    pub index: bool,
}

impl SplitDefaults {
    /// Seed a policy builder with these defaults.
    pub fn policy_builder(&self) -> SplitPolicyBuilder {
        SplitPolicy::builder()
            .method(self.method)
            .header_level(self.header_level)
            .lines_per_file(self.lines_per_file)
            .max_size_kb(self.max_size_kb)
            .max_sections(self.max_sections)
            .filename_prefix(self.prefix.clone())
            .add_navigation(self.navigation)
            .write_index(self.index)
    }
}

/// Merge settings applied when the caller does not override them.
#[derive(Clone, Debug)]
pub struct MergeDefaults {
    pub output: PathBuf,
    pub pattern: String,
    pub exclude: Vec<String>,
    pub recursive: bool,
    pub toc: bool,
    pub dividers: bool,
    pub preserve_structure: bool,
    pub summary: bool,
    pub optimize_for_claude: bool,
}

impl MergeDefaults {
    /// Seed a policy builder for `input_dir` with these defaults.
    pub fn policy_builder(&self, input_dir: impl Into<PathBuf>) -> MergePolicyBuilder {
        MergePolicy::builder(input_dir)
            .output_file(self.output.clone())
            .pattern(self.pattern.clone())
            .exclude(self.exclude.clone())
            .recursive(self.recursive)
            .add_toc(self.toc)
            .add_dividers(self.dividers)
            .preserve_structure(self.preserve_structure)
            .add_summary(self.summary)
            .optimize_for_claude(self.optimize_for_claude)
    }
}

/// Provenance information for resolved configuration.
#[derive(Clone, Debug)]
pub struct ConfigSources {
    pub working_directory: PathBuf,
    pub layers: Vec<ConfigSource>,
}

/// Specific layer of configuration (default/git/local/override).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConfigSource {
    pub kind: ConfigSourceKind,
    pub path: Option<PathBuf>,
    pub base_dir: PathBuf,
}

impl ConfigSource {
    fn default(base_dir: PathBuf) -> Self {
        ConfigSource {
            kind: ConfigSourceKind::Default,
            path: None,
            base_dir,
        }
    }

    fn for_file(kind: ConfigSourceKind, path: PathBuf) -> Self {
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        ConfigSource {
            kind,
            path: Some(path),
            base_dir,
        }
    }

    fn describe(&self) -> String {
        match (&self.kind, &self.path) {
            (ConfigSourceKind::Default, _) => "built-in defaults".to_owned(),
            (kind, Some(path)) => format!("{} at {}", kind, path.display()),
            (kind, None) => kind.to_string(),
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// Kinds of configuration sources, ordered from lowest to highest precedence.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConfigSourceKind {
    Default,
    GitRoot,
    Local,
    Override,
}

impl fmt::Display for ConfigSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConfigSourceKind::Default => "defaults",
            ConfigSourceKind::GitRoot => "git-root config",
            ConfigSourceKind::Local => "local config",
            ConfigSourceKind::Override => "override config",
        };
        f.write_str(label)
    }
}

/// Loader options, typically supplied by the CLI layer.
#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub override_path: Option<PathBuf>,
    pub working_dir: Option<PathBuf>,
}

impl LoadOptions {
    pub fn with_override_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.override_path = Some(path.into());
        self
    }

    pub fn with_working_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(path.into());
        self
    }
}

/// Errors surfaced while loading configuration or building policies.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to resolve working directory {attempted}: {source}")]
    WorkingDirectory {
        attempted: PathBuf,
        source: io::Error,
    },
    #[error("override config {path} not found")]
    OverrideNotFound { path: PathBuf },
    #[error("failed to read config {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("configuration validation failed:\n{0}")]
    Validation(ConfigValidationErrors),
    #[error("unknown split method '{0}' (expected headers, lines or size)")]
    UnknownSplitMethod(String),
    #[error("unknown template type '{name}' (available: {available})")]
    UnknownTemplate { name: String, available: String },
    #[error("invalid glob pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
    #[error("invalid policy: {0}")]
    InvalidPolicy(String),
}

impl Config {
    /// Loads configuration using the precedence rules and returns typed settings.
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let working_dir = resolve_working_dir(options.working_dir)?;
        let override_path = options
            .override_path
            .map(|path| make_absolute(&path, &working_dir));

        if let Some(path) = &override_path {
            if !path.exists() {
                return Err(ConfigError::OverrideNotFound { path: path.clone() });
            }
        }

        let default_source = ConfigSource::default(working_dir.clone());
        let mut merged = PartialConfig::default();
        merged.merge(defaults_layer(default_source.clone()));

        let mut source_layers = vec![default_source];

        let git_root = find_git_root(&working_dir);
        let git_config_path = git_root.as_ref().map(|root| root.join(CONFIG_FILE_NAME));
        let local_config_path = working_dir.join(CONFIG_FILE_NAME);

        if let Some(path) = git_config_path.as_ref() {
            if path.exists() && Some(path) != override_path.as_ref() && path != &local_config_path {
                let source = ConfigSource::for_file(ConfigSourceKind::GitRoot, path.clone());
                merged.merge(load_layer(path, source.clone())?);
                source_layers.push(source);
            }
        }

        if local_config_path.exists() && Some(&local_config_path) != override_path.as_ref() {
            let source = ConfigSource::for_file(ConfigSourceKind::Local, local_config_path.clone());
            merged.merge(load_layer(&local_config_path, source.clone())?);
            source_layers.push(source);
        }

        if let Some(path) = override_path {
            let source = ConfigSource::for_file(ConfigSourceKind::Override, path.clone());
            merged.merge(load_layer(&path, source.clone())?);
            source_layers.push(source);
        }

        let (split, merge) = merged.finalize().map_err(ConfigError::Validation)?;
        Ok(Config {
            split,
            merge,
            sources: ConfigSources {
                working_directory: working_dir,
                layers: source_layers,
            },
        })
    }

    /// Built-in defaults only, without touching the filesystem.
    pub fn builtin() -> Self {
        let working_dir = PathBuf::from(".");
        let mut merged = PartialConfig::default();
        merged.merge(defaults_layer(ConfigSource::default(working_dir.clone())));
        let (split, merge) = merged
            .finalize()
            .unwrap_or_else(|err| panic!("built-in defaults are invalid: {err}"));
        Config {
            split,
            merge,
            sources: ConfigSources {
                working_directory: working_dir.clone(),
                layers: vec![ConfigSource::default(working_dir)],
            },
        }
    }
}

fn resolve_working_dir(override_dir: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
    match override_dir {
        Some(path) => fs::canonicalize(&path).map_err(|source| ConfigError::WorkingDirectory {
            attempted: path,
            source,
        }),
        None => env::current_dir().map_err(|source| ConfigError::WorkingDirectory {
            attempted: PathBuf::from("."),
            source,
        }),
    }
}

fn make_absolute(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

fn load_layer(path: &Path, source: ConfigSource) -> Result<PartialConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.into(),
        source,
    })?;
    let raw: RawConfig = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.into(),
        source,
    })?;
    Ok(raw.into_partial(source))
}

fn defaults_layer(source: ConfigSource) -> PartialConfig {
    let split = SplitPartial {
        method: Some(Located::new("headers".into(), source.clone())),
        header_level: Some(Located::new(DEFAULT_HEADER_LEVEL, source.clone())),
        lines_per_file: Some(Located::new(DEFAULT_LINES_PER_FILE, source.clone())),
        max_size_kb: Some(Located::new(DEFAULT_MAX_SIZE_KB, source.clone())),
        max_sections: Some(Located::new(DEFAULT_MAX_SECTIONS, source.clone())),
        prefix: Some(Located::new(String::new(), source.clone())),
        navigation: Some(Located::new(true, source.clone())),
        index: Some(Located::new(false, source.clone())),
    };

    let merge = MergePartial {
        output: Some(Located::new(
            PathBuf::from(DEFAULT_MERGE_OUTPUT),
            source.clone(),
        )),
        pattern: Some(Located::new(DEFAULT_MERGE_PATTERN.into(), source.clone())),
        exclude: Some(Located::new(Vec::new(), source.clone())),
        recursive: Some(Located::new(false, source.clone())),
        toc: Some(Located::new(true, source.clone())),
        dividers: Some(Located::new(true, source.clone())),
        preserve_structure: Some(Located::new(true, source.clone())),
        summary: Some(Located::new(true, source.clone())),
        optimize_for_claude: Some(Located::new(true, source)),
    };

    PartialConfig {
        split: Some(split),
        merge: Some(merge),
    }
}

fn find_git_root(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);
    while let Some(dir) = current {
        if dir.join(".git").exists() {
            return Some(dir.to_path_buf());
        }
        current = dir.parent();
    }
    None
}

#[derive(Clone, Debug, Default)]
struct PartialConfig {
    split: Option<SplitPartial>,
    merge: Option<MergePartial>,
}

impl PartialConfig {
    fn merge(&mut self, mut other: PartialConfig) {
        if let Some(other_split) = other.split.take() {
            match &mut self.split {
                Some(split) => split.merge(other_split),
                None => self.split = Some(other_split),
            }
        }

        if let Some(other_merge) = other.merge.take() {
            match &mut self.merge {
                Some(merge) => merge.merge(other_merge),
                None => self.merge = Some(other_merge),
            }
        }
    }

    fn finalize(self) -> Result<(SplitDefaults, MergeDefaults), ConfigValidationErrors> {
        let mut errors = Vec::new();
        let split = self.split.unwrap_or_default().finalize(&mut errors);
        let merge = self.merge.unwrap_or_default().finalize(&mut errors);

        match (split, merge) {
            (Some(split), Some(merge)) if errors.is_empty() => Ok((split, merge)),
            _ => Err(ConfigValidationErrors(errors)),
        }
    }
}

#[derive(Clone, Debug, Default)]
struct SplitPartial {
    method: Option<Located<String>>,
    header_level: Option<Located<usize>>,
    lines_per_file: Option<Located<usize>>,
    max_size_kb: Option<Located<u64>>,
    max_sections: Option<Located<usize>>,
    prefix: Option<Located<String>>,
    navigation: Option<Located<bool>>,
    index: Option<Located<bool>>,
}

impl SplitPartial {
    fn merge(&mut self, other: SplitPartial) {
        if other.method.is_some() {
            self.method = other.method;
        }
        if other.header_level.is_some() {
            self.header_level = other.header_level;
        }
        if other.lines_per_file.is_some() {
            self.lines_per_file = other.lines_per_file;
        }
        if other.max_size_kb.is_some() {
            self.max_size_kb = other.max_size_kb;
        }
        if other.max_sections.is_some() {
            self.max_sections = other.max_sections;
        }
        if other.prefix.is_some() {
            self.prefix = other.prefix;
        }
        if other.navigation.is_some() {
            self.navigation = other.navigation;
        }
        if other.index.is_some() {
            self.index = other.index;
        }
    }

    fn finalize(self, errors: &mut Vec<ConfigValidationError>) -> Option<SplitDefaults> {
        let method_loc = self.method?;
        let method = match method_loc.value.parse::<SplitMethod>() {
            Ok(method) => method,
            Err(err) => {
                errors.push(
                    ConfigValidationError::new(Some(method_loc.source), err.to_string())
                        .with_context("split.method"),
                );
                return None;
            }
        };

        let header_level = self.header_level?;
        let lines_per_file = self.lines_per_file?;
        let max_size_kb = self.max_size_kb?;
        let max_sections = self.max_sections?;

        if let Err(message) = policy::check_split_limits(
            header_level.value,
            lines_per_file.value,
            max_size_kb.value,
            max_sections.value,
        ) {
            // Report against the most recent layer that touched the split table.
            let source = [
                &header_level.source,
                &lines_per_file.source,
                &max_size_kb.source,
                &max_sections.source,
            ]
            .into_iter()
            .max_by_key(|source| source.kind as u8)
            .cloned();
            errors.push(ConfigValidationError::new(source, message).with_context("split"));
            return None;
        }

        Some(SplitDefaults {
            method,
            header_level: header_level.value,
            lines_per_file: lines_per_file.value,
            max_size_kb: max_size_kb.value,
            max_sections: max_sections.value,
            prefix: self.prefix.map(|loc| loc.value).unwrap_or_default(),
            navigation: self.navigation.map(|loc| loc.value).unwrap_or(true),
            index: self.index.map(|loc| loc.value).unwrap_or(false),
        })
    }
}

#[derive(Clone, Debug, Default)]
struct MergePartial {
    output: Option<Located<PathBuf>>,
    pattern: Option<Located<String>>,
    exclude: Option<Located<Vec<String>>>,
    recursive: Option<Located<bool>>,
    toc: Option<Located<bool>>,
    dividers: Option<Located<bool>>,
    preserve_structure: Option<Located<bool>>,
    summary: Option<Located<bool>>,
    optimize_for_claude: Option<Located<bool>>,
}

impl MergePartial {
    fn merge(&mut self, other: MergePartial) {
        if other.output.is_some() {
            self.output = other.output;
        }
        if other.pattern.is_some() {
            self.pattern = other.pattern;
        }
        if other.exclude.is_some() {
            self.exclude = other.exclude;
        }
        if other.recursive.is_some() {
            self.recursive = other.recursive;
        }
        if other.toc.is_some() {
            self.toc = other.toc;
        }
        if other.dividers.is_some() {
            self.dividers = other.dividers;
        }
        if other.preserve_structure.is_some() {
            self.preserve_structure = other.preserve_structure;
        }
        if other.summary.is_some() {
            self.summary = other.summary;
        }
        if other.optimize_for_claude.is_some() {
            self.optimize_for_claude = other.optimize_for_claude;
        }
    }

    fn finalize(self, errors: &mut Vec<ConfigValidationError>) -> Option<MergeDefaults> {
        let output = self.output.as_ref().map(resolve_path)?;
        let pattern = self.pattern?;
        let exclude = self.exclude.unwrap_or_default();

        let mut valid = check_glob(&pattern.value, &pattern.source, "merge.pattern", errors);
        for value in &exclude.value {
            valid &= check_glob(value, &exclude.source, "merge.exclude", errors);
        }
        if !valid {
            return None;
        }

        let flag = |loc: Option<Located<bool>>, default: bool| loc.map_or(default, |l| l.value);
        Some(MergeDefaults {
            output,
            pattern: pattern.value,
            exclude: exclude.value,
            recursive: flag(self.recursive, false),
            toc: flag(self.toc, true),
            dividers: flag(self.dividers, true),
            preserve_structure: flag(self.preserve_structure, true),
            summary: flag(self.summary, true),
            optimize_for_claude: flag(self.optimize_for_claude, true),
        })
    }
}

fn check_glob(
    value: &str,
    source: &ConfigSource,
    context: &str,
    errors: &mut Vec<ConfigValidationError>,
) -> bool {
    match Pattern::new(value) {
        Ok(_) => true,
        Err(err) => {
            errors.push(
                ConfigValidationError::new(
                    Some(source.clone()),
                    format!("invalid glob pattern '{value}': {err}"),
                )
                .with_context(context),
            );
            false
        }
    }
}

#[derive(Clone, Debug)]
struct Located<T> {
    value: T,
    source: ConfigSource,
}

impl<T> Located<T> {
    fn new(value: T, source: ConfigSource) -> Self {
        Located { value, source }
    }
}

impl Default for Located<Vec<String>> {
    fn default() -> Self {
        Located::new(Vec::new(), ConfigSource::default(PathBuf::from(".")))
    }
}

/// Relative paths from a config file are anchored at that file's directory;
/// built-in defaults stay relative so they follow the caller's working directory.
fn resolve_path(located: &Located<PathBuf>) -> PathBuf {
    let path = &located.value;
    if path.is_absolute() || located.source.kind == ConfigSourceKind::Default {
        path.clone()
    } else {
        located.source.base_dir.join(path)
    }
}

/// Container for validation failures, formatted as a bullet list.
#[derive(Debug)]
pub struct ConfigValidationErrors(pub Vec<ConfigValidationError>);

impl fmt::Display for ConfigValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, err) in self.0.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "- {err}")?;
        }
        Ok(())
    }
}

impl ConfigValidationErrors {
    pub fn iter(&self) -> impl Iterator<Item = &ConfigValidationError> {
        self.0.iter()
    }
}

/// Validation failure with optional provenance.
#[derive(Clone, Debug)]
pub struct ConfigValidationError {
    pub source: Option<ConfigSource>,
    pub message: String,
    pub context: Option<String>,
}

impl ConfigValidationError {
    fn new(source: Option<ConfigSource>, message: String) -> Self {
        ConfigValidationError {
            source,
            message,
            context: None,
        }
    }

    fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(context) = &self.context {
            write!(f, "{}: {}", context, self.message)?;
        } else {
            write!(f, "{}", self.message)?;
        }
        if let Some(source) = &self.source {
            write!(f, " ({})", source.describe())?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    split: Option<RawSplit>,
    #[serde(default)]
    merge: Option<RawMerge>,
}

impl RawConfig {
    fn into_partial(self, source: ConfigSource) -> PartialConfig {
        PartialConfig {
            split: self.split.map(|split| split.into_partial(source.clone())),
            merge: self.merge.map(|merge| merge.into_partial(source)),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSplit {
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    header_level: Option<usize>,
    #[serde(default)]
    lines_per_file: Option<usize>,
    #[serde(default)]
    max_size_kb: Option<u64>,
    #[serde(default)]
    max_sections: Option<usize>,
    #[serde(default)]
    prefix: Option<String>,
    #[serde(default)]
    navigation: Option<bool>,
    #[serde(default)]
    index: Option<bool>,
}

impl RawSplit {
    fn into_partial(self, source: ConfigSource) -> SplitPartial {
        let locate = |value| Located::new(value, source.clone());
        SplitPartial {
            method: self.method.map(|value| Located::new(value, source.clone())),
            header_level: self.header_level.map(|value| Located::new(value, source.clone())),
            lines_per_file: self
                .lines_per_file
                .map(|value| Located::new(value, source.clone())),
            max_size_kb: self.max_size_kb.map(|value| Located::new(value, source.clone())),
            max_sections: self
                .max_sections
                .map(|value| Located::new(value, source.clone())),
            prefix: self.prefix.map(|value| Located::new(value, source.clone())),
            navigation: self.navigation.map(locate),
            index: self.index.map(locate),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawMerge {
    #[serde(default)]
    output: Option<PathBuf>,
    #[serde(default)]
    pattern: Option<String>,
    #[serde(default)]
    exclude: Option<Vec<String>>,
    #[serde(default)]
    recursive: Option<bool>,
    #[serde(default)]
    toc: Option<bool>,
    #[serde(default)]
    dividers: Option<bool>,
    #[serde(default)]
    preserve_structure: Option<bool>,
    #[serde(default)]
    summary: Option<bool>,
    #[serde(default)]
    optimize_for_claude: Option<bool>,
}

impl RawMerge {
    fn into_partial(self, source: ConfigSource) -> MergePartial {
        let locate = |value| Located::new(value, source.clone());
        MergePartial {
            output: self.output.map(|value| Located::new(value, source.clone())),
            pattern: self.pattern.map(|value| Located::new(value, source.clone())),
            exclude: self.exclude.map(|value| Located::new(value, source.clone())),
            recursive: self.recursive.map(locate),
            toc: self.toc.map(locate),
            dividers: self.dividers.map(locate),
            preserve_structure: self.preserve_structure.map(locate),
            summary: self.summary.map(locate),
            optimize_for_claude: self.optimize_for_claude.map(locate),
        }
    }
}
