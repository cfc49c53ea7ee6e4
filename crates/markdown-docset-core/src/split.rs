//! Split one Markdown document into a series of linked section files.
//!
//! Three partitioning strategies are available (headings, fixed line windows
//! and byte budgets). Planning is pure; [`split`] adds the filesystem side.

use std::fmt::Write as _;
use std::io;
use std::path::{Path, PathBuf};

use markdown_docset_config::{SplitMethod, SplitPolicy};
use regex::Regex;

use crate::document::{disambiguate_filenames, Section};
use crate::error::{DocsetError, DocsetResult};
use crate::fs;

/// Result of a split run.
#[derive(Debug, Clone)]
pub struct SplitOutcome {
    pub output_dir: PathBuf,
    /// Section files in emission order.
    pub written: Vec<PathBuf>,
    pub index: Option<PathBuf>,
    /// Sections dropped by the `max_sections` cap.
    pub dropped: usize,
}

/// Sections computed for one document, before anything touches the disk.
#[derive(Debug, Clone)]
pub struct SectionPlan {
    pub sections: Vec<Section>,
    pub dropped: usize,
}

/// Split the file at `input` according to `policy`.
///
/// The output directory (the input's directory unless overridden) is created
/// if needed. The first failed write aborts the run; files already written
/// stay on disk.
pub fn split(input: &Path, policy: &SplitPolicy) -> DocsetResult<SplitOutcome> {
    let content = fs::read_input(input)?;

    let output_dir = match policy.output_dir() {
        Some(dir) => dir.to_path_buf(),
        None => input
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    };
    fs::ensure_dir(&output_dir)?;

    let input_name = input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned());
    let reserved: Vec<&str> = match input_name.as_deref() {
        Some(name) if same_directory(input, &output_dir)? => vec![name],
        _ => Vec::new(),
    };

    let index_name = index_filename(policy);
    if let Some(name) = index_name.as_deref().filter(|name| reserved.contains(name)) {
        return Err(DocsetError::io(
            output_dir.join(name),
            io::Error::new(
                io::ErrorKind::AlreadyExists,
                "index file would overwrite the input",
            ),
        ));
    }

    let SectionPlan { sections, dropped } = plan_sections_reserving(&content, policy, &reserved);

    let mut written = Vec::with_capacity(sections.len());
    for position in 0..sections.len() {
        let rendered = render_section(
            &sections,
            position,
            policy.add_navigation(),
            index_name.as_deref(),
        );
        let path = output_dir.join(&sections[position].filename);
        fs::write_file(&path, &rendered)?;
        tracing::debug!(file = %path.display(), title = %sections[position].title, "wrote section");
        written.push(path);
    }

    let index = match index_name {
        Some(name) => {
            let path = output_dir.join(name);
            fs::write_file(&path, &render_index(input, &sections))?;
            Some(path)
        }
        None => None,
    };

    tracing::info!(
        input = %input.display(),
        method = %policy.method(),
        sections = written.len(),
        "split complete"
    );

    Ok(SplitOutcome {
        output_dir,
        written,
        index,
        dropped,
    })
}

/// True when `input` lives directly inside `output_dir`.
fn same_directory(input: &Path, output_dir: &Path) -> DocsetResult<bool> {
    let input = std::fs::canonicalize(input).map_err(|err| DocsetError::io(input, err))?;
    let output_dir =
        std::fs::canonicalize(output_dir).map_err(|err| DocsetError::io(output_dir, err))?;
    Ok(input.parent() == Some(output_dir.as_path()))
}

/// Partition `content` per the policy, apply the section cap and make
/// filenames unique.
pub fn plan_sections(content: &str, policy: &SplitPolicy) -> SectionPlan {
    plan_sections_reserving(content, policy, &[])
}

/// Like [`plan_sections`], but section filenames also steer clear of
/// `reserved` (the input document when it shares the output directory).
pub fn plan_sections_reserving(
    content: &str,
    policy: &SplitPolicy,
    reserved: &[&str],
) -> SectionPlan {
    let prefix = policy.filename_prefix();
    let mut sections = match policy.method() {
        SplitMethod::Headers => sections_by_headers(content, policy.header_level(), prefix),
        SplitMethod::Lines => sections_by_lines(content, policy.lines_per_file(), prefix),
        SplitMethod::Size => sections_by_size(content, policy.max_size_bytes(), prefix),
    };

    let mut dropped = 0;
    if policy.method() == SplitMethod::Headers && sections.len() > policy.max_sections() {
        dropped = sections.len() - policy.max_sections();
        tracing::warn!(
            found = sections.len(),
            kept = policy.max_sections(),
            "section count exceeds cap, trailing sections dropped"
        );
        sections.truncate(policy.max_sections());
    }

    let index_name = index_filename(policy);
    let taken: Vec<&str> = index_name
        .as_deref()
        .into_iter()
        .chain(reserved.iter().copied())
        .collect();
    disambiguate_filenames(&mut sections, &taken);

    SectionPlan { sections, dropped }
}

/// One section per heading of exactly `level` `#` characters (clamped to 1..=6).
///
/// Each section runs from its heading line up to the next matching heading.
/// Text before the first matching heading is discarded.
pub fn sections_by_headers(content: &str, level: usize, prefix: &str) -> Vec<Section> {
    let heading = heading_pattern(level);
    let mut sections = Vec::new();
    let mut current: Option<(String, Vec<&str>)> = None;

    for line in content.split('\n') {
        if let Some(caps) = heading.captures(line) {
            if let Some((title, lines)) = current.take() {
                sections.push(Section::new(title, lines.join("\n"), prefix));
            }
            let title = caps[1].trim().to_string();
            tracing::debug!(title = %title, "section boundary");
            current = Some((title, vec![line]));
        } else if let Some((_, lines)) = current.as_mut() {
            lines.push(line);
        }
    }

    if let Some((title, lines)) = current {
        sections.push(Section::new(title, lines.join("\n"), prefix));
    }

    sections
}

fn heading_pattern(level: usize) -> Regex {
    let level = level.clamp(1, 6);
    Regex::new(&format!(r"^#{{{level}}}(?-u:\s)+(.+)")).expect("valid regex")
}

/// Consecutive windows of `lines_per_file` lines, titled `Part N`.
pub fn sections_by_lines(content: &str, lines_per_file: usize, prefix: &str) -> Vec<Section> {
    let lines: Vec<&str> = content.split('\n').collect();
    lines
        .chunks(lines_per_file.max(1))
        .enumerate()
        .map(|(idx, window)| Section::new(part_title(idx), window.join("\n"), prefix))
        .collect()
}

/// Accumulate lines until the next one would push the section past
/// `max_bytes` (each line counts its length plus one for the newline).
///
/// A single line longer than the cap still forms a section on its own.
pub fn sections_by_size(content: &str, max_bytes: u64, prefix: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_size = 0u64;

    for line in content.lines() {
        let line_size = line.len() as u64 + 1;
        if current_size + line_size > max_bytes && !current.is_empty() {
            sections.push(Section::new(
                part_title(sections.len()),
                current.join("\n"),
                prefix,
            ));
            current.clear();
            current_size = 0;
        }
        current.push(line);
        current_size += line_size;
    }

    if !current.is_empty() {
        sections.push(Section::new(
            part_title(sections.len()),
            current.join("\n"),
            prefix,
        ));
    }

    sections
}

fn part_title(idx: usize) -> String {
    format!("Part {}", idx + 1)
}

fn index_filename(policy: &SplitPolicy) -> Option<String> {
    policy
        .write_index()
        .then(|| format!("{}index.md", policy.filename_prefix()))
}

/// Render the section at `position`, optionally prefixed with a navigation
/// block linking to its neighbours (and the index file, when one exists).
pub fn render_section(
    sections: &[Section],
    position: usize,
    navigation: bool,
    index_file: Option<&str>,
) -> String {
    let section = &sections[position];
    if !navigation {
        return section.content.clone();
    }

    let mut out = String::with_capacity(section.content.len() + 128);
    out.push_str("---\n");
    out.push_str("## Navigation\n\n");

    if let Some(previous) = position.checked_sub(1).and_then(|idx| sections.get(idx)) {
        let _ = writeln!(
            out,
            "← [Previous: {}]({})",
            previous.title, previous.filename
        );
    }
    if let Some(index) = index_file {
        let _ = writeln!(out, "↑ [Index]({index})");
    }
    if let Some(next) = sections.get(position + 1) {
        let _ = writeln!(out, "→ [Next: {}]({})", next.title, next.filename);
    }

    out.push_str("\n---\n\n");
    out.push_str(&section.content);
    out
}

fn render_index(input: &Path, sections: &[Section]) -> String {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut out = format!("# {stem} - Split Documentation\n\n");
    out.push_str("This document has been split into the following sections:\n\n");
    for (idx, section) in sections.iter().enumerate() {
        let _ = writeln!(out, "{}. [{}]({})", idx + 1, section.title, section.filename);
    }
    let _ = write!(out, "\n---\n\n*Split from: {name}*\n");
    out
}
