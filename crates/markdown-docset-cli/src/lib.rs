use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{ArgAction, ArgGroup, Args, Parser, Subcommand};
use markdown_docset_config::{Config, LoadOptions, SplitMethod};
use markdown_docset_core::{
    generate_template, init_project, merge, split, validate_structure, DocsetError, InitOutcome,
    MergeOutcome, SplitOutcome, StructureReport, TemplateKind,
};

/// Entry point for CLI execution. Returns the desired exit code.
pub fn run() -> Result<i32> {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(()) => Ok(0),
        Err(err) => match err.downcast::<DocsetError>() {
            Ok(err) => {
                eprintln!("Error: {err}");
                Ok(err.exit_code() as i32)
            }
            Err(other) => Err(other),
        },
    }
}

fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Split(args) => handle_split(&load_config(cli.config.as_deref())?, args),
        Command::Merge(args) => handle_merge(&load_config(cli.config.as_deref())?, args),
        Command::Template(args) => handle_template(args),
        Command::Init(args) => handle_init(args),
        Command::Validate(args) => handle_validate(args),
    }
}

fn load_config(override_path: Option<&Path>) -> Result<Config, DocsetError> {
    let mut options = LoadOptions::default();
    if let Some(path) = override_path {
        options = options.with_override_path(path);
    }
    let config = Config::load(options)?;
    for layer in &config.sources.layers {
        tracing::debug!(source = %layer, "config layer");
    }
    Ok(config)
}

fn handle_split(config: &Config, args: SplitArgs) -> Result<()> {
    let SplitArgs {
        input,
        output_dir,
        prefix,
        by_headers,
        by_lines,
        by_size,
        max_sections,
        header_level,
        lines_per_file,
        max_size_kb,
        no_navigation,
        index,
    } = args;

    let mut builder = config.split.policy_builder();
    if by_headers {
        builder = builder.method(SplitMethod::Headers);
    } else if by_lines {
        builder = builder.method(SplitMethod::Lines);
    } else if by_size {
        builder = builder.method(SplitMethod::Size);
    }
    if let Some(dir) = output_dir {
        builder = builder.output_dir(dir);
    }
    if let Some(prefix) = prefix {
        builder = builder.filename_prefix(prefix);
    }
    if let Some(max) = max_sections {
        builder = builder.max_sections(max);
    }
    if let Some(level) = header_level {
        builder = builder.header_level(level);
    }
    if let Some(lines) = lines_per_file {
        builder = builder.lines_per_file(lines);
    }
    if let Some(kb) = max_size_kb {
        builder = builder.max_size_kb(kb);
    }
    if no_navigation {
        builder = builder.add_navigation(false);
    }
    if index {
        builder = builder.write_index(true);
    }

    let policy = builder.build().map_err(DocsetError::from)?;
    let SplitOutcome {
        written,
        index,
        dropped,
        ..
    } = split(&input, &policy)?;

    let mut stdout = io::stdout().lock();
    for path in written.iter().chain(index.iter()) {
        writeln!(stdout, "Created: {}", path.display())?;
    }
    if dropped > 0 {
        writeln!(
            stdout,
            "Skipped {dropped} sections beyond the limit of {}",
            policy.max_sections()
        )?;
    }
    writeln!(
        stdout,
        "Split {} into {} files",
        input.display(),
        written.len()
    )?;
    Ok(())
}

fn handle_merge(config: &Config, args: MergeArgs) -> Result<()> {
    let MergeArgs {
        input_dir,
        output,
        pattern,
        exclude,
        recursive,
        no_toc,
        no_dividers,
        no_structure,
        no_summary,
        no_claude_optimization,
    } = args;

    let mut excludes = config.merge.exclude.clone();
    excludes.extend(exclude);

    let mut builder = config.merge.policy_builder(input_dir).exclude(excludes);
    if let Some(output) = output {
        builder = builder.output_file(output);
    }
    if let Some(pattern) = pattern {
        builder = builder.pattern(pattern);
    }
    if recursive {
        builder = builder.recursive(true);
    }
    if no_toc {
        builder = builder.add_toc(false);
    }
    if no_dividers {
        builder = builder.add_dividers(false);
    }
    if no_structure {
        builder = builder.preserve_structure(false);
    }
    if no_summary {
        builder = builder.add_summary(false);
    }
    if no_claude_optimization {
        builder = builder.optimize_for_claude(false);
    }

    let policy = builder.build().map_err(DocsetError::from)?;
    let MergeOutcome {
        output_file,
        documents,
        ..
    } = merge(&policy)?;

    writeln!(
        io::stdout().lock(),
        "Merged {documents} documents into {}",
        output_file.display()
    )?;
    Ok(())
}

fn handle_template(args: TemplateArgs) -> Result<()> {
    let TemplateArgs { kind, name, root } = args;

    let kind: TemplateKind = kind.parse().map_err(DocsetError::from)?;
    let path = generate_template(kind, name.as_deref(), &root)?;

    writeln!(io::stdout().lock(), "Generated template: {}", path.display())?;
    Ok(())
}

fn handle_init(args: InitArgs) -> Result<()> {
    let InitArgs { project_name, root } = args;

    let project_name = project_name.unwrap_or_else(|| default_project_name(&root));
    let mut stdout = io::stdout().lock();
    writeln!(
        stdout,
        "Initializing Claude documentation structure for '{project_name}'..."
    )?;

    let InitOutcome {
        directories,
        created,
        skipped,
    } = init_project(&root, &project_name)?;

    for dir in &directories {
        writeln!(stdout, "Created directory: {}", dir.display())?;
    }
    for path in &created {
        writeln!(stdout, "Created: {}", path.display())?;
    }
    for path in &skipped {
        writeln!(stdout, "{} already exists, skipping...", path.display())?;
    }

    writeln!(stdout)?;
    writeln!(stdout, "Documentation structure initialized!")?;
    writeln!(stdout)?;
    writeln!(stdout, "Next steps:")?;
    writeln!(stdout, "1. Edit CLAUDE.md with your project-specific information")?;
    writeln!(stdout, "2. Fill in the .claude/ files with project context")?;
    writeln!(stdout, "3. Add detailed specifications to the specs/ directory")?;
    writeln!(
        stdout,
        "4. Run 'markdown-docset validate' to check the structure"
    )?;
    Ok(())
}

/// Base name of the canonical root, or `project` when there is none.
fn default_project_name(root: &Path) -> String {
    root.canonicalize()
        .ok()
        .and_then(|path| path.file_name().map(|name| name.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "project".to_string())
}

fn handle_validate(args: ValidateArgs) -> Result<()> {
    let ValidateArgs { directory } = args;

    let StructureReport {
        issues,
        recommendations,
        markdown_files,
    } = validate_structure(&directory)?;

    let mut stdout = io::stdout().lock();
    writeln!(
        stdout,
        "Validating documentation structure in: {}",
        directory.display()
    )?;

    if !issues.is_empty() {
        writeln!(stdout, "\n❌ Issues found:")?;
        for issue in &issues {
            writeln!(stdout, "  - {issue}")?;
        }
    }
    if !recommendations.is_empty() {
        writeln!(stdout, "\n💡 Recommendations:")?;
        for recommendation in &recommendations {
            writeln!(stdout, "  - {recommendation}")?;
        }
    }
    if issues.is_empty() && recommendations.is_empty() {
        writeln!(stdout, "\n✅ Documentation structure looks good!")?;
    }

    writeln!(stdout, "\nScanned {markdown_files} markdown files")?;
    Ok(())
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Split and merge Markdown documentation sets",
    propagate_version = true
)]
struct Cli {
    /// Use this config file instead of discovering .markdown-docset.toml
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Split one document into linked section files
    Split(SplitArgs),
    /// Merge a directory of documents into one file
    Merge(MergeArgs),
    /// Generate a documentation template (api, screen, feature)
    Template(TemplateArgs),
    /// Create CLAUDE.md, specs/ and .claude/ documentation files
    Init(InitArgs),
    /// Check a project's documentation layout
    Validate(ValidateArgs),
}

#[derive(Args)]
#[command(group(ArgGroup::new("method").args(["by_headers", "by_lines", "by_size"])))]
struct SplitArgs {
    /// Markdown file to split
    #[arg(value_name = "INPUT")]
    input: PathBuf,
    /// Output directory (defaults to the input's directory)
    #[arg(long = "output-dir", value_name = "DIR")]
    output_dir: Option<PathBuf>,
    /// Filename prefix for generated sections
    #[arg(long)]
    prefix: Option<String>,
    /// Split by headers (default)
    #[arg(long = "by-headers")]
    by_headers: bool,
    /// Split by line count
    #[arg(long = "by-lines")]
    by_lines: bool,
    /// Split by file size
    #[arg(long = "by-size")]
    by_size: bool,
    /// Maximum number of sections (headers mode)
    #[arg(long = "max-sections", value_name = "N")]
    max_sections: Option<usize>,
    /// Header level to split on
    #[arg(long = "header-level", value_name = "N")]
    header_level: Option<usize>,
    /// Lines per file (lines mode)
    #[arg(long = "lines-per-file", value_name = "N")]
    lines_per_file: Option<usize>,
    /// Maximum file size in KB (size mode)
    #[arg(long = "max-size-kb", value_name = "N")]
    max_size_kb: Option<u64>,
    /// Skip navigation links
    #[arg(long = "no-navigation")]
    no_navigation: bool,
    /// Also write an index file listing every section
    #[arg(long)]
    index: bool,
}

#[derive(Args)]
struct MergeArgs {
    /// Directory containing the documents to merge
    #[arg(value_name = "INPUT_DIR")]
    input_dir: PathBuf,
    /// Output file
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,
    /// Glob matched against file names
    #[arg(long, value_name = "GLOB")]
    pattern: Option<String>,
    /// Glob of file names to skip (repeatable)
    #[arg(long, value_name = "GLOB", action = ArgAction::Append, value_delimiter = ',')]
    exclude: Vec<String>,
    /// Search subdirectories
    #[arg(long)]
    recursive: bool,
    /// Skip the table of contents
    #[arg(long = "no-toc")]
    no_toc: bool,
    /// Skip section dividers
    #[arg(long = "no-dividers")]
    no_dividers: bool,
    /// Skip metadata blocks and link processing
    #[arg(long = "no-structure")]
    no_structure: bool,
    /// Skip the summary section
    #[arg(long = "no-summary")]
    no_summary: bool,
    /// Skip the optimization notes
    #[arg(long = "no-claude-optimization")]
    no_claude_optimization: bool,
}

#[derive(Args)]
struct TemplateArgs {
    /// Template kind: api, screen or feature
    #[arg(value_name = "KIND")]
    kind: String,
    /// Name substituted into the template
    #[arg(value_name = "NAME")]
    name: Option<String>,
    /// Project root that receives .claude/templates/
    #[arg(long, value_name = "DIR", default_value = ".")]
    root: PathBuf,
}

#[derive(Args)]
struct InitArgs {
    /// Project name (defaults to the root directory's name)
    #[arg(value_name = "PROJECT_NAME")]
    project_name: Option<String>,
    /// Project root to initialize
    #[arg(long, value_name = "DIR", default_value = ".")]
    root: PathBuf,
}

#[derive(Args)]
struct ValidateArgs {
    /// Project directory to check
    #[arg(value_name = "DIRECTORY", default_value = ".")]
    directory: PathBuf,
}
