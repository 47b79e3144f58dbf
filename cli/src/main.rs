//! offerdoc CLI - build and edit versioned proposal documents

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use offerdoc::edit::{CellOverwrite, Marker, TotalsSpec};
use offerdoc::render::{DocumentStats, JsonFormat, TextOptions};
use offerdoc::version::{next_after, next_path};
use offerdoc::{
    Document, EditPlan, EditReport, PdfOptions, ProposalSpec, RowSelector, SaveOptions,
};

#[derive(Parser)]
#[command(name = "offerdoc")]
#[command(author = "offerdoc contributors")]
#[command(version)]
#[command(about = "Build and edit versioned commercial proposals (DOCX/PDF)", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a proposal from a TOML script
    Generate {
        /// Proposal script
        #[arg(value_name = "SPEC")]
        spec: PathBuf,

        /// Extension of the generated file when no output is given
        #[arg(long, default_value = "docx", value_name = "EXT")]
        format: String,

        #[command(flatten)]
        save: SaveArgs,
    },

    /// Replace literal text everywhere
    Replace {
        /// Document to edit
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Replacement pair, may be repeated
        #[arg(short, long = "replace", num_args = 2, value_names = ["OLD", "NEW"], required = true)]
        replace: Vec<String>,

        /// Only replace inside rows matching this marker ("A&B" requires both, "\&" is "&")
        #[arg(long, value_name = "MARKER")]
        rows: Option<String>,

        #[command(flatten)]
        save: SaveArgs,
    },

    /// Delete table rows containing a marker
    DeleteRows {
        /// Document to edit
        #[arg(value_name = "FILE")]
        input: PathBuf,

        #[command(flatten)]
        rows: RowArgs,

        #[command(flatten)]
        save: SaveArgs,
    },

    /// Overwrite cells whose whole text equals a value
    SetCell {
        /// Document to edit
        #[arg(value_name = "FILE")]
        input: PathBuf,

        #[command(flatten)]
        rows: RowArgs,

        /// Exact current cell text
        #[arg(long, value_name = "TEXT")]
        equals: String,

        /// New cell text
        #[arg(long, value_name = "TEXT")]
        to: String,

        #[command(flatten)]
        save: SaveArgs,
    },

    /// Re-sum amount columns into total rows
    Recalc {
        /// Document to edit
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Grid column holding amounts (0-based, default: last cell)
        #[arg(long, value_name = "N")]
        column: Option<usize>,

        /// Only this body table (0-based)
        #[arg(long, value_name = "N")]
        table: Option<usize>,

        #[command(flatten)]
        save: SaveArgs,
    },

    /// Check that a document contains a marker
    Verify {
        /// Document to check
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Literal to look for
        #[arg(value_name = "MARKER")]
        marker: String,

        /// Paragraphs to echo from the match
        #[arg(long, default_value = "0", value_name = "N")]
        echo: usize,
    },

    /// Apply an edit plan
    Apply {
        /// Plan file (TOML)
        #[arg(value_name = "PLAN")]
        plan: PathBuf,

        /// Document to edit (overrides the plan)
        #[arg(short, long, value_name = "FILE")]
        input: Option<PathBuf>,

        #[command(flatten)]
        save: SaveArgs,
    },

    /// Print the document text or JSON tree
    Dump {
        /// Document to read
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output the JSON tree
        #[arg(long)]
        json: bool,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        /// Prefix paragraphs and rows with their indices
        #[arg(long)]
        indices: bool,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Show document information
    Info {
        /// Document to read
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Print the next free versioned name
    NextVersion {
        /// Existing versioned file, or a directory with --stem
        #[arg(value_name = "PATH")]
        path: PathBuf,

        /// Name stem to look for in a directory
        #[arg(long)]
        stem: Option<String>,

        /// Extension to look for in a directory
        #[arg(long, default_value = "docx", value_name = "EXT")]
        ext: String,
    },

    /// Show version information
    Version,
}

/// Row selection shared by row-oriented commands.
#[derive(Args)]
struct RowArgs {
    /// Row marker, may be repeated; "A&B" requires both fragments, "\&" is a literal "&"
    #[arg(short, long = "marker", value_name = "MARKER", required = true)]
    markers: Vec<String>,

    /// Only this body table (0-based)
    #[arg(long, value_name = "N")]
    table: Option<usize>,

    /// Only cells covering this grid column (0-based)
    #[arg(long, value_name = "N")]
    column: Option<usize>,

    /// Fail unless exactly one row matches
    #[arg(long)]
    unique: bool,
}

impl RowArgs {
    fn selector(&self) -> RowSelector {
        let mut selector =
            RowSelector::any_of(self.markers.iter().map(|m| Marker::parse(m)).collect());
        selector.table = self.table;
        selector.column = self.column;
        selector.unique = self.unique;
        selector
    }
}

/// Output options shared by commands that write a document.
#[derive(Args)]
struct SaveArgs {
    /// Output file (default: next version of the input name)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Replace an existing output file
    #[arg(long)]
    overwrite: bool,

    /// Directory with DejaVuSans.ttf and DejaVuSans-Bold.ttf for PDF output
    #[arg(long, value_name = "DIR", env = "OFFERDOC_FONT_DIR")]
    font_dir: Option<PathBuf>,

    /// Running header for PDF pages
    #[arg(long, value_name = "TEXT")]
    header: Option<String>,

    /// Use "title | subject" as the PDF running header
    #[arg(long)]
    running_header: bool,
}

impl SaveArgs {
    fn options(&self) -> SaveOptions {
        let mut pdf = PdfOptions::new().with_metadata_header(self.running_header);
        if let Some(dir) = &self.font_dir {
            pdf = pdf.with_font_dir(dir);
        }
        if let Some(header) = &self.header {
            pdf = pdf.with_header(header);
        }
        SaveOptions::new()
            .with_overwrite(self.overwrite)
            .with_pdf_options(pdf)
    }

    fn output_for(&self, input: &Path) -> offerdoc::Result<PathBuf> {
        match &self.output {
            Some(path) => Ok(path.clone()),
            None => next_after(input),
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate { spec, format, save } => cmd_generate(&spec, &format, &save),
        Commands::Replace {
            input,
            replace,
            rows,
            save,
        } => cmd_replace(&input, &replace, rows.as_deref(), &save),
        Commands::DeleteRows { input, rows, save } => cmd_delete_rows(&input, &rows, &save),
        Commands::SetCell {
            input,
            rows,
            equals,
            to,
            save,
        } => cmd_set_cell(&input, &rows, &equals, &to, &save),
        Commands::Recalc {
            input,
            column,
            table,
            save,
        } => cmd_recalc(&input, column, table, &save),
        Commands::Verify {
            input,
            marker,
            echo,
        } => cmd_verify(&input, &marker, echo),
        Commands::Apply { plan, input, save } => cmd_apply(&plan, input, &save),
        Commands::Dump {
            input,
            json,
            compact,
            indices,
            output,
        } => cmd_dump(&input, json, compact, indices, output.as_deref()),
        Commands::Info { input } => cmd_info(&input),
        Commands::NextVersion { path, stem, ext } => {
            cmd_next_version(&path, stem.as_deref(), &ext)
        }
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn print_report(report: &EditReport) {
    for change in &report.changes {
        if change.is_modification() {
            println!("  {} {}", "✓".green(), change);
        } else {
            println!("  {} {}", "!".yellow(), change);
        }
    }
}

/// Save an edited document and report where it went.
fn finish(
    doc: &mut Document,
    input: &Path,
    report: &EditReport,
    save: &SaveArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    print_report(report);
    let output = save.output_for(input)?;
    log::info!(
        "{} -> {}: {} change(s)",
        input.display(),
        output.display(),
        report.modifications()
    );
    offerdoc::save(doc, &output, &save.options())?;
    println!(
        "{} {} ({} change(s))",
        "Document saved to".green(),
        output.display(),
        report.modifications()
    );
    Ok(())
}

fn cmd_generate(
    spec: &Path,
    format: &str,
    save: &SaveArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let script = ProposalSpec::from_file(spec)?;
    let output = match &save.output {
        Some(path) => path.clone(),
        None => {
            let dir = spec
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let stem = spec
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "Commercial_Proposal".to_string());
            next_path(dir, &stem, format)?
        }
    };

    log::info!("generating {} from {}", output.display(), spec.display());
    let mut doc = script.build();
    offerdoc::save(&mut doc, &output, &save.options())?;

    let stats = DocumentStats::collect(&doc);
    println!(
        "{} {} ({} paragraphs, {} tables)",
        "Document saved to".green(),
        output.display(),
        stats.paragraph_count,
        stats.table_count
    );
    Ok(())
}

fn cmd_replace(
    input: &Path,
    pairs: &[String],
    rows: Option<&str>,
    save: &SaveArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut doc = offerdoc::open(input)?;
    let mut report = EditReport::new();

    for pair in pairs.chunks_exact(2) {
        let (from, to) = (&pair[0], &pair[1]);
        let step = match rows {
            Some(marker) => {
                let selector = RowSelector::any_of(vec![Marker::parse(marker)]);
                offerdoc::edit::replace_in_rows(&mut doc, &selector, from, to)?
            }
            None => offerdoc::edit::replace_text(&mut doc, from, to)?,
        };
        report.merge(step);
    }

    finish(&mut doc, input, &report, save)
}

fn cmd_delete_rows(
    input: &Path,
    rows: &RowArgs,
    save: &SaveArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut doc = offerdoc::open(input)?;
    let report = offerdoc::edit::delete_rows(&mut doc, &rows.selector())?;
    finish(&mut doc, input, &report, save)
}

fn cmd_set_cell(
    input: &Path,
    rows: &RowArgs,
    equals: &str,
    to: &str,
    save: &SaveArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut doc = offerdoc::open(input)?;
    let report = CellOverwrite::new(rows.selector(), equals, to).apply(&mut doc)?;
    finish(&mut doc, input, &report, save)
}

fn cmd_recalc(
    input: &Path,
    column: Option<usize>,
    table: Option<usize>,
    save: &SaveArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut doc = offerdoc::open(input)?;
    let spec = TotalsSpec {
        column,
        table,
        ..TotalsSpec::default()
    };
    let report = offerdoc::edit::recalculate_totals(&mut doc, &spec)?;
    finish(&mut doc, input, &report, save)
}

fn cmd_verify(input: &Path, marker: &str, echo: usize) -> Result<(), Box<dyn std::error::Error>> {
    let outcome = offerdoc::verify_file(input, marker, echo)?;

    match outcome.paragraph_index {
        Some(index) => {
            println!(
                "{} {:?} found in paragraph {}",
                "✓".green().bold(),
                marker,
                index + 1
            );
            for line in &outcome.context {
                println!("  {} {}", "│".dimmed(), line);
            }
            Ok(())
        }
        None => {
            println!("{} {:?} not found", "✗".red().bold(), marker);
            std::process::exit(1);
        }
    }
}

fn cmd_apply(
    plan_path: &Path,
    input: Option<PathBuf>,
    save: &SaveArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut plan = EditPlan::from_file(plan_path)?;
    if input.is_some() {
        plan.input = input;
    }
    if let Some(output) = &save.output {
        plan.output = Some(output.clone());
    }
    let input = plan
        .input
        .clone()
        .ok_or("plan has no input document; pass --input")?;
    if plan.output.is_none() {
        plan.next_version = true;
    }
    let output = plan.output_path()?;
    log::debug!(
        "applying {} step(s) from {} to {}",
        plan.steps.len(),
        plan_path.display(),
        input.display()
    );

    let mut doc = offerdoc::open(&input)?;

    let pb = ProgressBar::new(plan.steps.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    let result = plan.apply_with(&mut doc, |i, step| {
        pb.set_position(i as u64);
        pb.set_message(step.describe());
    });
    let report = match result {
        Ok(report) => {
            pb.finish_with_message("Done!");
            report
        }
        Err(e) => {
            pb.abandon_with_message("Failed");
            return Err(e.into());
        }
    };

    print_report(&report.edits);
    for outcome in &report.verifications {
        let mark = if outcome.found {
            "✓".green()
        } else {
            "✗".red()
        };
        println!("  {} verify {:?}", mark, outcome.marker);
        for line in &outcome.context {
            println!("    {} {}", "│".dimmed(), line);
        }
    }

    let options = save.options().with_overwrite(save.overwrite || plan.overwrite);
    offerdoc::save(&mut doc, &output, &options)?;
    println!("{} {}", "Document saved to".green(), output.display());
    Ok(())
}

fn cmd_dump(
    input: &Path,
    json: bool,
    compact: bool,
    indices: bool,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let doc = offerdoc::open(input)?;

    let content = if json {
        let format = if compact {
            JsonFormat::Compact
        } else {
            JsonFormat::Pretty
        };
        offerdoc::render::to_json(&doc, format)?
    } else {
        offerdoc::render::to_text(&doc, &TextOptions::new().with_indices(indices))?
    };

    if let Some(path) = output {
        fs::write(path, &content)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", content);
    }

    Ok(())
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let format = offerdoc::detect_format_from_path(input)?;
    let doc = offerdoc::open(input)?;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Format".bold(), format);

    if let Some(ref title) = doc.metadata.title {
        println!("{}: {}", "Title".bold(), title);
    }
    if let Some(ref subject) = doc.metadata.subject {
        println!("{}: {}", "Subject".bold(), subject);
    }
    if let Some(ref author) = doc.metadata.author {
        println!("{}: {}", "Author".bold(), author);
    }
    if let Some(revision) = doc.metadata.revision {
        println!("{}: {}", "Revision".bold(), revision);
    }
    if let Some(ref created) = doc.metadata.created {
        println!("{}: {}", "Created".bold(), created);
    }
    if let Some(ref modified) = doc.metadata.modified {
        println!("{}: {}", "Modified".bold(), modified);
    }

    println!();
    println!("{}", "Content Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    let stats = DocumentStats::collect(&doc);
    println!("{}: {}", "Paragraphs".bold(), stats.paragraph_count);
    println!("{}: {}", "Headings".bold(), stats.heading_count);
    println!("{}: {}", "Tables".bold(), stats.table_count);
    println!("{}: {}", "Rows".bold(), stats.row_count);
    println!("{}: {}", "Page breaks".bold(), stats.page_break_count);
    println!("{}: {}", "Words".bold(), stats.word_count);
    println!("{}: {}", "Characters".bold(), stats.char_count);

    for (i, total) in offerdoc::render::total_amounts(&doc).iter().enumerate() {
        println!("{} {}: {}", "Total".bold(), i + 1, total);
    }

    Ok(())
}

fn cmd_next_version(
    path: &Path,
    stem: Option<&str>,
    ext: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let next = match stem {
        Some(stem) => next_path(path, stem, ext)?,
        None => next_after(path)?,
    };
    println!("{}", next.display());
    Ok(())
}

fn cmd_version() {
    println!("{} {}", "offerdoc".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Versioned proposal builder and editor");
    println!();
    println!("License: MIT");
}
