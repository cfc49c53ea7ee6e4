//! Merge a directory of Markdown documents into one consolidated file.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs as std_fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use markdown_docset_config::MergePolicy;
use walkdir::WalkDir;

use crate::document::Document;
use crate::error::{DocsetError, DocsetResult};
use crate::fs;
use crate::links::{rewrite_relative_links, strip_front_matter};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const LARGE_DOCUMENT_BYTES: u64 = 50 * 1024;

/// Result of a merge run.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub output_file: PathBuf,
    pub documents: usize,
    pub bytes_written: usize,
}

/// Discover, read, order and concatenate the documents selected by `policy`.
///
/// Fails with `NotFound` when nothing matches; any read error aborts before
/// the output file is touched.
pub fn merge(policy: &MergePolicy) -> DocsetResult<MergeOutcome> {
    let files = discover(policy)?;
    if files.is_empty() {
        return Err(DocsetError::NotFound(format!(
            "no files found matching pattern {} in {}",
            policy.pattern().original(),
            policy.input_dir().display()
        )));
    }

    let mut documents = files
        .iter()
        .map(|path| Document::read(path))
        .collect::<DocsetResult<Vec<_>>>()?;
    sort_documents(&mut documents);

    let rendered = render_merged(&documents, policy, Local::now());
    fs::write_file(policy.output_file(), &rendered)?;

    tracing::info!(
        documents = documents.len(),
        output = %policy.output_file().display(),
        "merge complete"
    );

    Ok(MergeOutcome {
        output_file: policy.output_file().to_path_buf(),
        documents: documents.len(),
        bytes_written: rendered.len(),
    })
}

/// Collect files under the input directory whose base names the policy selects.
///
/// Recursive discovery walks the whole tree; otherwise only the top level is
/// listed. Matching directories are skipped. A matching entry that cannot be
/// stat'ed (a dangling symlink, say) aborts discovery with an I/O error.
pub fn discover(policy: &MergePolicy) -> DocsetResult<Vec<PathBuf>> {
    let input_dir = policy.input_dir();
    if !input_dir.is_dir() {
        return Err(DocsetError::NotFound(format!(
            "input directory {} does not exist",
            input_dir.display()
        )));
    }

    let mut files = Vec::new();
    if policy.recursive() {
        for entry in WalkDir::new(input_dir).sort_by_file_name() {
            let entry = entry.map_err(|err| {
                let path = err
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| input_dir.to_path_buf());
                DocsetError::io(path, err.into())
            })?;
            consider(policy, entry.path(), &mut files)?;
        }
    } else {
        let entries =
            std_fs::read_dir(input_dir).map_err(|err| DocsetError::io(input_dir, err))?;
        for entry in entries {
            let entry = entry.map_err(|err| DocsetError::io(input_dir, err))?;
            consider(policy, &entry.path(), &mut files)?;
        }
    }

    Ok(files)
}

fn consider(policy: &MergePolicy, path: &Path, files: &mut Vec<PathBuf>) -> DocsetResult<()> {
    let Some(name) = path.file_name().map(|name| name.to_string_lossy()) else {
        return Ok(());
    };
    if !policy.selects(&name) {
        return Ok(());
    }

    let metadata = std_fs::metadata(path).map_err(|err| DocsetError::io(path, err))?;
    if metadata.is_dir() {
        return Ok(());
    }

    tracing::debug!(file = %path.display(), "matched document");
    files.push(path.to_path_buf());
    Ok(())
}

/// Order documents by filename; ties keep discovery order.
pub fn sort_documents(documents: &mut [Document]) {
    documents.sort_by(|a, b| a.filename.cmp(&b.filename));
}

/// Render the merged output for already-sorted `documents`.
pub fn render_merged(
    documents: &[Document],
    policy: &MergePolicy,
    generated_at: DateTime<Local>,
) -> String {
    let mut out = String::new();

    out.push_str("# Merged Documentation\n\n");
    let _ = writeln!(out, "Generated on: {}", generated_at.format(TIMESTAMP_FORMAT));
    let _ = writeln!(out, "Source directory: {}", policy.input_dir().display());
    let _ = writeln!(out, "Total documents: {}\n", documents.len());

    if policy.add_toc() {
        render_toc(&mut out, documents);
    }
    if policy.add_summary() {
        render_summary(&mut out, documents);
    }
    if policy.optimize_for_claude() {
        render_optimization_notes(&mut out, documents);
    }

    for (idx, doc) in documents.iter().enumerate() {
        if policy.add_dividers() {
            out.push_str("---\n\n");
        }
        let _ = writeln!(out, "## Document: {}\n", doc.filename);

        if policy.preserve_structure() {
            let _ = writeln!(out, "**File:** `{}`", doc.source_path.display());
            let _ = writeln!(out, "**Size:** {} bytes", doc.size_bytes);
            let _ = writeln!(out, "**Modified:** {}\n", doc.modified.format(TIMESTAMP_FORMAT));
        }

        out.push_str(&process_content(&doc.content, policy));
        out.push('\n');
        if idx + 1 < documents.len() {
            out.push('\n');
        }
    }

    out
}

/// Strip front matter, re-anchor relative links (when structure is preserved)
/// and trim surrounding whitespace.
pub fn process_content(content: &str, policy: &MergePolicy) -> String {
    let body = strip_front_matter(content);
    if policy.preserve_structure() {
        rewrite_relative_links(body, policy.input_dir())
            .trim()
            .to_string()
    } else {
        body.trim().to_string()
    }
}

/// Anchor slug for a document heading: lower-cased, spaces to hyphens, then
/// everything outside `[a-z0-9-]` removed.
pub fn document_anchor(filename: &str) -> String {
    filename
        .to_lowercase()
        .replace(' ', "-")
        .chars()
        .filter(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || *ch == '-')
        .collect()
}

fn render_toc(out: &mut String, documents: &[Document]) {
    out.push_str("## Table of Contents\n\n");
    for (idx, doc) in documents.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. [{}](#document-{})",
            idx + 1,
            doc.filename,
            document_anchor(&doc.filename)
        );
    }
    out.push('\n');
}

fn render_summary(out: &mut String, documents: &[Document]) {
    let total: u64 = documents.iter().map(|doc| doc.size_bytes).sum();
    let average = total.checked_div(documents.len() as u64).unwrap_or(0);

    out.push_str("## Summary\n\n");
    let _ = writeln!(out, "- Total files: {}", documents.len());
    let _ = writeln!(out, "- Total size: {}", format_bytes(total));
    let _ = writeln!(out, "- Average size: {}", format_bytes(average));

    let mut extensions: BTreeMap<String, usize> = BTreeMap::new();
    for doc in documents {
        let ext = doc.extension().unwrap_or_else(|| "no extension".to_string());
        *extensions.entry(ext).or_default() += 1;
    }
    if extensions.len() > 1 {
        out.push_str("- File types:\n");
        for (ext, count) in &extensions {
            let _ = writeln!(out, "  - {ext}: {count} files");
        }
    }

    out.push('\n');
}

fn render_optimization_notes(out: &mut String, documents: &[Document]) {
    out.push_str("## Claude Code Optimization\n\n");
    out.push_str(
        "This merged document has been optimized for Claude Code with the following features:\n\n",
    );
    out.push_str("- **Structured organization:** Documents are clearly separated and labeled\n");
    out.push_str("- **Navigation aids:** Table of contents and file metadata included\n");
    out.push_str("- **Context preservation:** Original file paths and structure maintained\n");
    out.push_str("- **Link processing:** Internal links updated for merged context\n");
    out.push_str(
        "- **Size awareness:** Large documents split appropriately for Claude's context window\n\n",
    );

    let large = documents
        .iter()
        .filter(|doc| doc.size_bytes > LARGE_DOCUMENT_BYTES)
        .count();
    if large > 0 {
        let _ = writeln!(
            out,
            "⚠️  **Note:** {large} documents are larger than 50KB. Consider splitting them for better Claude Code performance.\n"
        );
    }
}

/// Human-readable size using base-1024 units.
pub fn format_bytes(bytes: u64) -> String {
    const UNIT: u64 = 1024;
    const PREFIXES: [char; 6] = ['K', 'M', 'G', 'T', 'P', 'E'];

    if bytes < UNIT {
        return format!("{bytes} B");
    }

    let mut div = UNIT;
    let mut exp = 0usize;
    let mut n = bytes / UNIT;
    while n >= UNIT {
        div *= UNIT;
        exp += 1;
        n /= UNIT;
    }

    format!("{:.1} {}B", bytes as f64 / div as f64, PREFIXES[exp])
}
