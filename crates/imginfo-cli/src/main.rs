//! imginfo - Image inventory tool
//!
//! Scans a directory for raster images and reports format, dimensions,
//! color depth, DPI, compression and file size for each file.

mod output;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use imginfo_core::{
    scan_directory, CancelToken, ExtractionPipeline, ImageRecord, ScanConfig, Summary,
    DEFAULT_MAX_FILES,
};
use output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "imginfo")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory to scan recursively
    dir: PathBuf,

    /// Only show files whose name contains this text (case-insensitive)
    #[arg(short, long)]
    filter: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Stop collecting after this many files
    #[arg(long, default_value_t = DEFAULT_MAX_FILES)]
    max_files: usize,

    #[arg(long, default_value_t = false)]
    follow_links: bool,

    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = ScanConfig::new()
        .with_max_files(args.max_files)
        .with_follow_links(args.follow_links);

    let inventory = scan_directory(&args.dir, &config)
        .with_context(|| format!("Failed to scan {}", args.dir.display()))?;
    if inventory.is_empty() {
        anyhow::bail!("No images found in {}", args.dir.display());
    }
    if inventory.truncated {
        tracing::warn!(
            "More than {} images found; only the first {} are processed",
            config.max_files,
            config.max_files
        );
    }

    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || handler_token.cancel())
        .context("Failed to set Ctrl+C handler")?;

    let pb = ProgressBar::new(inventory.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .context("Invalid progress bar template")?
            .progress_chars("##-"),
    );

    let pipeline = ExtractionPipeline::with_cancel_token(cancel);
    let outcome = pipeline.run_with_progress(&inventory.paths, |done, _, record| {
        pb.set_position(done as u64);
        pb.set_message(record.filename.clone());
    });
    pb.finish_and_clear();

    if outcome.cancelled {
        eprintln!(
            "Scan cancelled: reporting {} of {} files",
            outcome.records.len(),
            inventory.len()
        );
    }

    let summary = outcome.summary();
    let shown = output::filter_records(&outcome.records, args.filter.as_deref());

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            write_report(
                args.format,
                &shown,
                &summary,
                inventory.truncated,
                outcome.cancelled,
                &mut writer,
            )?;
            writer
                .flush()
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Report written to {}", path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            write_report(
                args.format,
                &shown,
                &summary,
                inventory.truncated,
                outcome.cancelled,
                &mut writer,
            )?;
        }
    }

    if args.format != OutputFormat::Table || args.output.is_some() {
        eprintln!("{}", output::render_summary(&summary));
    }

    Ok(())
}

fn write_report<W: Write>(
    format: OutputFormat,
    records: &[&ImageRecord],
    summary: &Summary,
    truncated: bool,
    cancelled: bool,
    writer: &mut W,
) -> Result<()> {
    match format {
        OutputFormat::Table => {
            writeln!(writer, "{}", output::render_summary(summary))?;
            writeln!(writer)?;
            write!(writer, "{}", output::render_table(records))?;
        }
        OutputFormat::Csv => {
            output::write_csv(records, writer)?;
        }
        OutputFormat::Json => {
            output::write_json(records, summary, truncated, cancelled, writer)?;
        }
    }
    Ok(())
}
