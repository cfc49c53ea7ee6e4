//! Documentation scaffolds written under `.claude/templates/`.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use markdown_docset_config::ConfigError;

use crate::error::DocsetResult;
use crate::fs;

pub const TEMPLATES_DIR: &str = ".claude/templates";

const API_BODY: &str = include_str!("../templates/api-endpoint.md");
const SCREEN_BODY: &str = include_str!("../templates/screen-spec.md");
const FEATURE_BODY: &str = include_str!("../templates/feature-spec.md");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    Api,
    Screen,
    Feature,
}

impl TemplateKind {
    pub const ALL: [TemplateKind; 3] = [TemplateKind::Api, TemplateKind::Screen, TemplateKind::Feature];

    pub fn as_str(self) -> &'static str {
        match self {
            TemplateKind::Api => "api",
            TemplateKind::Screen => "screen",
            TemplateKind::Feature => "feature",
        }
    }

    pub fn default_filename(self) -> &'static str {
        match self {
            TemplateKind::Api => "api-endpoint.md",
            TemplateKind::Screen => "screen-spec.md",
            TemplateKind::Feature => "feature-spec.md",
        }
    }

    /// Filename for a template named `name`: the kind's leading segment is
    /// replaced, so `api-endpoint.md` becomes `<name>-endpoint.md`.
    pub fn filename_for(self, name: &str) -> String {
        let default = self.default_filename();
        match default.strip_prefix(self.as_str()) {
            Some(rest) => format!("{name}{rest}"),
            None => default.to_string(),
        }
    }

    pub fn default_name(self) -> String {
        format!("example-{}", self.as_str())
    }

    /// Template body with every `{name}` placeholder substituted.
    pub fn render(self, name: &str) -> String {
        let body = match self {
            TemplateKind::Api => API_BODY,
            TemplateKind::Screen => SCREEN_BODY,
            TemplateKind::Feature => FEATURE_BODY,
        };
        body.replace("{name}", name)
    }

    fn available() -> String {
        Self::ALL
            .iter()
            .map(|kind| kind.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateKind {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "api" => Ok(TemplateKind::Api),
            "screen" => Ok(TemplateKind::Screen),
            "feature" => Ok(TemplateKind::Feature),
            _ => Err(ConfigError::UnknownTemplate {
                name: value.to_string(),
                available: Self::available(),
            }),
        }
    }
}

/// Render a template and write it under `<root>/.claude/templates/`.
///
/// An existing file with the same name is overwritten. Returns the written path.
pub fn generate_template(kind: TemplateKind, name: Option<&str>, root: &Path) -> DocsetResult<PathBuf> {
    let name = match name.map(str::trim).filter(|name| !name.is_empty()) {
        Some(name) => name.to_string(),
        None => kind.default_name(),
    };

    let path = root.join(TEMPLATES_DIR).join(kind.filename_for(&name));
    fs::write_file(&path, &kind.render(&name))?;
    tracing::info!(kind = %kind, path = %path.display(), "generated template");
    Ok(path)
}
