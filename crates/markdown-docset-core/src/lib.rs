//! Transformation engine for Markdown documentation sets.
//!
//! The splitter partitions one document into linked section files; the merger
//! folds a directory of documents into one consolidated file. Both operate on
//! lines and regular expressions rather than a Markdown AST, so headings inside
//! fenced code blocks still count as headings.

pub mod document;
pub mod error;
pub mod fs;
pub mod links;
pub mod merge;
pub mod scaffold;
pub mod split;
pub mod templates;
pub mod validate;

pub use document::{section_filename, Document, Section};
pub use error::{DocsetError, DocsetResult, ExitCode};
pub use markdown_docset_config::{MergePolicy, SplitMethod, SplitPolicy};
pub use merge::{format_bytes, merge, render_merged, MergeOutcome};
pub use scaffold::{init_project, InitOutcome, ScaffoldFile};
pub use split::{plan_sections, render_section, split, SplitOutcome};
pub use templates::{generate_template, TemplateKind};
pub use validate::{validate_structure, StructureReport};
