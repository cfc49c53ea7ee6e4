//! Project documentation skeleton written by `init`.

use std::path::{Path, PathBuf};

use crate::error::{DocsetError, DocsetResult};
use crate::fs;

/// Directories created before any file is written.
pub const SCAFFOLD_DIRS: [&str; 2] = ["specs", ".claude"];

/// One file of the documentation skeleton.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaffoldFile {
    ClaudeMd,
    SpecsApi,
    SpecsScreens,
    Context,
    ProjectKnowledge,
    ProjectImprovements,
    CommonPatterns,
    DebugLog,
}

impl ScaffoldFile {
    /// Every skeleton file, in the order they are written.
    pub const ALL: [ScaffoldFile; 8] = [
        ScaffoldFile::ClaudeMd,
        ScaffoldFile::SpecsApi,
        ScaffoldFile::SpecsScreens,
        ScaffoldFile::Context,
        ScaffoldFile::ProjectKnowledge,
        ScaffoldFile::ProjectImprovements,
        ScaffoldFile::CommonPatterns,
        ScaffoldFile::DebugLog,
    ];

    /// Location relative to the project root.
    pub fn relative_path(self) -> &'static str {
        match self {
            ScaffoldFile::ClaudeMd => "CLAUDE.md",
            ScaffoldFile::SpecsApi => "specs/api.md",
            ScaffoldFile::SpecsScreens => "specs/screens.md",
            ScaffoldFile::Context => ".claude/context.md",
            ScaffoldFile::ProjectKnowledge => ".claude/project-knowledge.md",
            ScaffoldFile::ProjectImprovements => ".claude/project-improvements.md",
            ScaffoldFile::CommonPatterns => ".claude/common-patterns.md",
            ScaffoldFile::DebugLog => ".claude/debug-log.md",
        }
    }

    fn body(self) -> &'static str {
        match self {
            ScaffoldFile::ClaudeMd => include_str!("../templates/init/claude.md"),
            ScaffoldFile::SpecsApi => include_str!("../templates/init/specs-api.md"),
            ScaffoldFile::SpecsScreens => include_str!("../templates/init/specs-screens.md"),
            ScaffoldFile::Context => include_str!("../templates/init/context.md"),
            ScaffoldFile::ProjectKnowledge => include_str!("../templates/init/project-knowledge.md"),
            ScaffoldFile::ProjectImprovements => {
                include_str!("../templates/init/project-improvements.md")
            }
            ScaffoldFile::CommonPatterns => include_str!("../templates/init/common-patterns.md"),
            ScaffoldFile::DebugLog => include_str!("../templates/init/debug-log.md"),
        }
    }

    /// File body with `{project_name}` substituted.
    pub fn render(self, project_name: &str) -> String {
        self.body().replace("{project_name}", project_name)
    }
}

/// What `init_project` did. Paths are relative to the project root.
#[derive(Debug, Clone, Default)]
pub struct InitOutcome {
    pub directories: Vec<PathBuf>,
    pub created: Vec<PathBuf>,
    /// Files left untouched because they already existed.
    pub skipped: Vec<PathBuf>,
}

/// Lay down the documentation skeleton under `root`.
///
/// Existing files are never overwritten.
pub fn init_project(root: &Path, project_name: &str) -> DocsetResult<InitOutcome> {
    let mut outcome = InitOutcome::default();

    for dir in SCAFFOLD_DIRS {
        let path = root.join(dir);
        if !exists(&path)? {
            fs::ensure_dir(&path)?;
            outcome.directories.push(PathBuf::from(dir));
        }
    }

    for file in ScaffoldFile::ALL {
        let relative = PathBuf::from(file.relative_path());
        let path = root.join(&relative);
        if exists(&path)? {
            tracing::debug!(file = %path.display(), "already present, skipping");
            outcome.skipped.push(relative);
            continue;
        }
        fs::write_file(&path, &file.render(project_name))?;
        outcome.created.push(relative);
    }

    tracing::info!(
        project = project_name,
        created = outcome.created.len(),
        skipped = outcome.skipped.len(),
        "initialized documentation structure"
    );
    Ok(outcome)
}

fn exists(path: &Path) -> DocsetResult<bool> {
    path.try_exists().map_err(|err| DocsetError::io(path, err))
}
