//! Section and document values shared by the splitter and the merger.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::error::{DocsetError, DocsetResult};

/// Filename stem used when a title sanitises to nothing.
const FALLBACK_STEM: &str = "section";

/// One chunk of a split document, destined for its own file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    pub filename: String,
    pub content: String,
}

impl Section {
    pub fn new(title: impl Into<String>, content: impl Into<String>, prefix: &str) -> Self {
        let title = title.into();
        let filename = section_filename(&title, prefix);
        Section {
            title,
            filename,
            content: content.into(),
        }
    }
}

/// Derive a filename from a section title.
///
/// The title is lower-cased, stripped of everything except ASCII letters,
/// digits, whitespace and hyphens, whitespace runs become single hyphens and
/// leading/trailing hyphens are trimmed. `prefix` is prepended verbatim.
pub fn section_filename(title: &str, prefix: &str) -> String {
    let lowered = title.to_lowercase();
    let mut stem = String::with_capacity(lowered.len());
    let mut in_whitespace = false;

    for ch in lowered.chars() {
        if ch.is_ascii_whitespace() {
            if !in_whitespace {
                stem.push('-');
                in_whitespace = true;
            }
            continue;
        }
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-' {
            stem.push(ch);
            in_whitespace = false;
        }
    }

    let stem = stem.trim_matches('-');
    let stem = if stem.is_empty() { FALLBACK_STEM } else { stem };
    format!("{prefix}{stem}.md")
}

/// Give repeated filenames a numeric suffix (`notes.md`, `notes-2.md`, ...).
///
/// `reserved` names are treated as already taken. Returns how many sections
/// were renamed.
pub(crate) fn disambiguate_filenames(sections: &mut [Section], reserved: &[&str]) -> usize {
    let mut taken: HashSet<String> = reserved.iter().map(|name| name.to_string()).collect();
    let mut renamed = 0usize;

    for section in sections.iter_mut() {
        if taken.insert(section.filename.clone()) {
            continue;
        }

        let stem = section
            .filename
            .strip_suffix(".md")
            .unwrap_or(&section.filename)
            .to_string();
        let mut counter = 2usize;
        let candidate = loop {
            let candidate = format!("{stem}-{counter}.md");
            if !taken.contains(&candidate) {
                break candidate;
            }
            counter += 1;
        };

        tracing::warn!(
            title = %section.title,
            original = %section.filename,
            renamed = %candidate,
            "section filename collision"
        );
        taken.insert(candidate.clone());
        section.filename = candidate;
        renamed += 1;
    }

    renamed
}

/// One input file of a merge, read once and never mutated.
#[derive(Debug, Clone)]
pub struct Document {
    pub filename: String,
    pub source_path: PathBuf,
    pub content: String,
    pub size_bytes: u64,
    pub modified: DateTime<Local>,
}

impl Document {
    /// Read `path` fully along with its size and modification time.
    pub fn read(path: &Path) -> DocsetResult<Self> {
        let bytes = fs::read(path).map_err(|err| DocsetError::io(path, err))?;
        let metadata = fs::metadata(path).map_err(|err| DocsetError::io(path, err))?;
        let modified = metadata
            .modified()
            .map_err(|err| DocsetError::io(path, err))?;

        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Document {
            filename,
            source_path: path.to_path_buf(),
            content: String::from_utf8_lossy(&bytes).into_owned(),
            size_bytes: metadata.len(),
            modified: DateTime::<Local>::from(modified),
        })
    }

    /// Extension including the leading dot, or `None` when the name has none.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.filename)
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filenames_are_sanitised() {
        assert_eq!(section_filename("Getting Started", ""), "getting-started.md");
        assert_eq!(section_filename("  API: v2 (beta)!  ", ""), "api-v2-beta.md");
        assert_eq!(section_filename("Part 1", "guide-"), "guide-part-1.md");
        assert_eq!(section_filename("a - b", ""), "a---b.md");
        assert_eq!(section_filename("Café Menu", ""), "caf-menu.md");
    }

    #[test]
    fn empty_stem_falls_back() {
        assert_eq!(section_filename("???", ""), "section.md");
        assert_eq!(section_filename("---", "x-"), "x-section.md");
    }

    #[test]
    fn duplicate_filenames_receive_suffixes() {
        let mut sections = vec![
            Section::new("Notes", "## Notes\none", ""),
            Section::new("Setup", "## Setup", ""),
            Section::new("Notes", "## Notes\ntwo", ""),
            Section::new("notes!", "## notes!\nthree", ""),
        ];

        let renamed = disambiguate_filenames(&mut sections, &[]);

        assert_eq!(renamed, 2);
        let names: Vec<_> = sections.iter().map(|s| s.filename.as_str()).collect();
        assert_eq!(names, ["notes.md", "setup.md", "notes-2.md", "notes-3.md"]);
    }

    #[test]
    fn reserved_names_are_never_reused() {
        let mut sections = vec![Section::new("Index", "## Index", "")];
        disambiguate_filenames(&mut sections, &["index.md"]);
        assert_eq!(sections[0].filename, "index-2.md");
    }

    #[test]
    fn extension_includes_dot() {
        let doc = Document {
            filename: "guide.md".into(),
            source_path: PathBuf::from("docs/guide.md"),
            content: String::new(),
            size_bytes: 0,
            modified: Local::now(),
        };
        assert_eq!(doc.extension().as_deref(), Some(".md"));

        let bare = Document {
            filename: "LICENSE".into(),
            ..doc
        };
        assert_eq!(bare.extension(), None);
    }
}
