//! Structural checks for a project's documentation layout.

use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use crate::error::{DocsetError, DocsetResult};

/// `CLAUDE.md` files shorter than this many bytes earn a recommendation.
pub const MIN_CLAUDE_MD_BYTES: u64 = 200;

/// Findings from `validate_structure`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructureReport {
    /// Problems that leave the documentation incomplete.
    pub issues: Vec<String>,
    pub recommendations: Vec<String>,
    /// Markdown files anywhere below the validated directory.
    pub markdown_files: usize,
}

impl StructureReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty() && self.recommendations.is_empty()
    }
}

/// Check `dir` for the expected `CLAUDE.md`, `specs/` and `.claude/` layout.
pub fn validate_structure(dir: &Path) -> DocsetResult<StructureReport> {
    if !dir.is_dir() {
        return Err(DocsetError::NotFound(format!(
            "directory {} does not exist",
            dir.display()
        )));
    }

    let mut report = StructureReport::default();
    check_claude_md(dir, &mut report)?;
    check_specs(dir, &mut report)?;
    check_claude_dir(dir, &mut report);

    report.markdown_files = WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| {
            entry
                .file_name()
                .to_string_lossy()
                .to_lowercase()
                .ends_with(".md")
        })
        .count();

    tracing::debug!(
        issues = report.issues.len(),
        recommendations = report.recommendations.len(),
        markdown_files = report.markdown_files,
        "validated documentation structure"
    );
    Ok(report)
}

fn check_claude_md(dir: &Path, report: &mut StructureReport) -> DocsetResult<()> {
    let path = dir.join("CLAUDE.md");
    if !path.exists() {
        report
            .issues
            .push("Missing CLAUDE.md file (main project context)".to_string());
        return Ok(());
    }

    let bytes = fs::read(&path).map_err(|err| DocsetError::io(&path, err))?;
    if (bytes.len() as u64) < MIN_CLAUDE_MD_BYTES {
        report.recommendations.push(
            "CLAUDE.md seems quite short - consider adding more project context".to_string(),
        );
    }
    if !String::from_utf8_lossy(&bytes).contains("Project Overview") {
        report
            .recommendations
            .push("Consider adding a 'Project Overview' section to CLAUDE.md".to_string());
    }
    Ok(())
}

fn check_specs(dir: &Path, report: &mut StructureReport) -> DocsetResult<()> {
    let specs = dir.join("specs");
    if !specs.exists() {
        report
            .recommendations
            .push("Consider creating a 'specs/' directory for detailed specifications".to_string());
        return Ok(());
    }

    let mut has_markdown = false;
    for entry in fs::read_dir(&specs).map_err(|err| DocsetError::io(&specs, err))? {
        let entry = entry.map_err(|err| DocsetError::io(&specs, err))?;
        if entry.file_name().to_string_lossy().ends_with(".md") {
            has_markdown = true;
            break;
        }
    }
    if !has_markdown {
        report
            .recommendations
            .push("specs/ directory exists but contains no markdown files".to_string());
    }
    Ok(())
}

fn check_claude_dir(dir: &Path, report: &mut StructureReport) {
    let claude = dir.join(".claude");
    if !claude.exists() {
        report
            .recommendations
            .push("Consider creating a '.claude/' directory for Claude-specific assets".to_string());
        return;
    }

    if !claude.join("prompts").exists() {
        report
            .recommendations
            .push("Consider creating '.claude/prompts/' for reusable prompts".to_string());
    }
    if !claude.join("templates").exists() {
        report
            .recommendations
            .push("Consider creating '.claude/templates/' for documentation templates".to_string());
    }
}
