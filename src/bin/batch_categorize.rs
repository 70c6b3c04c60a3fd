//! Batch categorization bridge
//!
//! Reads a pending-tasks JSON file dropped by the spreadsheet side,
//! categorizes every task against the provided labels, and writes a results
//! JSON the spreadsheet can import back.

use anyhow::{Context, Result};
use clap::Parser;
use snippet_tools::bridge;
use snippet_tools::categorize::tfidf::DEFAULT_CONFIDENCE_THRESHOLD;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "batch-categorize")]
#[command(about = "Categorize a pending-tasks file and write the results file", long_about = None)]
struct Cli {
    /// Tasks JSON (availableCategories + tasks)
    #[arg(short, long)]
    input: PathBuf,

    /// Results JSON to write
    #[arg(short, long)]
    output: PathBuf,

    /// Confidence below which a task is marked Needs Review
    #[arg(long, default_value_t = DEFAULT_CONFIDENCE_THRESHOLD)]
    threshold: f32,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    println!("Reading tasks: {}", cli.input.display());
    let report = bridge::run_batch(&cli.input, &cli.output, cli.threshold)
        .context("Batch categorization failed")?;

    if !report.spreadsheet_name.is_empty() {
        println!("Spreadsheet: {}", report.spreadsheet_name);
    }
    println!("Categories: {}", report.category_count);
    println!("Processed: {}", report.total_processed);
    println!("  High confidence (>=60%): {}", report.high_confidence);
    println!("  Low confidence (<30%): {}", report.low_confidence);
    println!("  Average confidence: {:.1}%", report.average_confidence * 100.0);
    println!("Wrote {}", cli.output.display());

    Ok(())
}
