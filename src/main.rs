use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

use snippet_tools::analytics::{percent_bar, CatalogStats};
use snippet_tools::backup::{self, BackupConfig};
use snippet_tools::categorize::{
    suggest_by_rules, BayesCategorizer, BayesConfig, SimilarityCategorizer,
};
use snippet_tools::dedupe::{self, ConflictKind, DedupeConfig};
use snippet_tools::model::{main_category_names, Catalog, NEEDS_REVIEW, UNCATEGORIZED};
use snippet_tools::quality::QualityReport;
use snippet_tools::store;
use snippet_tools::xlsx;

#[derive(Parser)]
#[command(name = "snippet-tools")]
#[command(about = "Analyze, categorize and back up text-expander snippet catalogs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the catalog overview dashboard
    Stats {
        /// Catalog CSV file
        catalog: PathBuf,
    },

    /// Score data quality and print fix recommendations
    Quality {
        /// Catalog CSV file
        catalog: PathBuf,
    },

    /// Find exact duplicates, name conflicts and near-duplicates
    Dupes {
        /// Catalog CSV file
        catalog: PathBuf,

        /// Minimum similarity (0-100) for the fuzzy scan
        #[arg(long, default_value_t = 85)]
        threshold: u8,

        /// Largest number of rows the fuzzy scan compares
        #[arg(long, default_value_t = 500)]
        sample: usize,

        /// Directory to export the CSV reports into
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// Suggest categories for catalog rows
    Categorize {
        /// Catalog CSV file
        catalog: PathBuf,

        /// Which engine produces the suggestions
        #[arg(long, value_enum, default_value_t = Engine::Rules)]
        engine: Engine,

        /// Only apply suggestions at or above this confidence
        #[arg(long, default_value_t = 0.7)]
        min_confidence: f32,

        /// Write accepted suggestions back to the catalog file
        #[arg(long)]
        apply: bool,

        /// Write a review CSV of every suggestion
        #[arg(long)]
        preview: Option<PathBuf>,
    },

    /// Back up a catalog into a directory
    Backup {
        /// Catalog CSV file
        catalog: PathBuf,

        /// Backup directory
        #[arg(long, env = "SNIPPET_BACKUP_DIR")]
        dir: PathBuf,

        /// How many backups to keep
        #[arg(long, default_value_t = backup::DEFAULT_KEEP)]
        keep: usize,

        /// Skip the sibling CSV copy
        #[arg(long)]
        no_csv: bool,
    },

    /// List the backups in a directory
    Backups {
        /// Backup directory
        #[arg(long, env = "SNIPPET_BACKUP_DIR")]
        dir: PathBuf,
    },

    /// Verify a backup file's checksum
    Verify {
        /// Backup JSON file
        backup: PathBuf,
    },

    /// Compare a catalog against its newest backup
    Diff {
        /// Catalog CSV file
        catalog: PathBuf,

        /// Backup directory
        #[arg(long, env = "SNIPPET_BACKUP_DIR")]
        dir: PathBuf,
    },

    /// Restore a catalog file from a backup (a safety backup is made first)
    Restore {
        /// Backup JSON file
        backup: PathBuf,

        /// Catalog CSV file to overwrite
        #[arg(long)]
        catalog: PathBuf,

        /// Skip the safety backup of the current catalog
        #[arg(long)]
        no_safety: bool,
    },

    /// Download a publicly viewable Google Sheet as a catalog CSV
    Fetch {
        /// Sheet URL (the normal browser URL)
        url: String,

        /// Output catalog CSV
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Export the audit workbook (catalog, quality, duplicates)
    Export {
        /// Catalog CSV file
        catalog: PathBuf,

        /// Output XLSX file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Check a catalog file for structural problems
    Validate {
        /// Catalog CSV file
        catalog: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Engine {
    /// Pattern rules over content and description
    Rules,
    /// TF-IDF similarity against the category labels
    Tfidf,
    /// Naive Bayes trained on already-categorized rows
    Bayes,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Stats { catalog } => stats(&catalog)?,
        Commands::Quality { catalog } => quality(&catalog)?,
        Commands::Dupes {
            catalog,
            threshold,
            sample,
            export,
        } => dupes(&catalog, threshold, sample, export.as_deref())?,
        Commands::Categorize {
            catalog,
            engine,
            min_confidence,
            apply,
            preview,
        } => categorize(&catalog, engine, min_confidence, apply, preview.as_deref())?,
        Commands::Backup {
            catalog,
            dir,
            keep,
            no_csv,
        } => backup_catalog(&catalog, &dir, keep, no_csv)?,
        Commands::Backups { dir } => list_backups(&dir)?,
        Commands::Verify { backup } => verify(&backup)?,
        Commands::Diff { catalog, dir } => diff(&catalog, &dir)?,
        Commands::Restore {
            backup,
            catalog,
            no_safety,
        } => restore(&backup, &catalog, no_safety)?,
        Commands::Fetch { url, output } => fetch(&url, &output)?,
        Commands::Export { catalog, output } => export(&catalog, &output)?,
        Commands::Validate { catalog } => validate(&catalog)?,
    }

    Ok(())
}

fn load_catalog(path: &Path) -> Result<Catalog> {
    println!("Reading catalog: {}", path.display());
    let catalog = store::read_catalog_file(path).context("Failed to read catalog")?;
    println!("Loaded {} snippets, {} columns", catalog.len(), catalog.headers.len());
    Ok(catalog)
}

fn section(title: &str) {
    println!();
    println!("{}", title);
    println!("{}", "-".repeat(title.len()));
}

fn stats(path: &Path) -> Result<()> {
    let catalog = load_catalog(path)?;
    let stats = CatalogStats::compute(&catalog);

    section("Overview");
    println!("  Rows: {}", stats.total_rows);
    println!("  Columns: {}", stats.column_count);
    println!("  Unique names: {}", stats.unique_names);
    println!("  Unique content: {}", stats.unique_content);

    section("Categories");
    for (label, count) in &stats.category_distribution {
        let pct = stats.percent(*count);
        println!(
            "  {:35} {} {:5} ({:5.1}%)",
            label,
            percent_bar(pct, 20),
            count,
            pct
        );
    }

    section("Languages");
    for (label, count) in &stats.language_distribution {
        let pct = stats.percent(*count);
        println!(
            "  {:20} {} {:5} ({:5.1}%)",
            label,
            percent_bar(pct, 20),
            count,
            pct
        );
    }

    section("Content length");
    println!("  Mean: {:.1} chars", stats.length.mean);
    println!("  Median: {:.1} chars", stats.length.median);
    println!("  Min: {} chars", stats.length.min);
    println!("  Max: {} chars", stats.length.max);
    if !stats.length.very_short.is_empty() {
        println!("  Very short (<3 chars): {}", stats.length.very_short.len());
        for (row, name, content) in stats.length.very_short.iter().take(5) {
            println!("    Row {}: '{}' -> '{}'", row, name, content);
        }
    }
    if !stats.length.very_long.is_empty() {
        println!("  Long (>1000 chars): {}", stats.length.very_long.len());
        for (row, name, len) in stats.length.very_long.iter().take(5) {
            println!("    Row {}: '{}' ({} chars)", row, name, len);
        }
    }

    if !stats.top_tags.is_empty() {
        section("Top tags");
        for (tag, count) in &stats.top_tags {
            println!("  {:20} {}", tag, count);
        }
    }

    section("Length by category");
    for (label, mean, count) in &stats.length_by_category {
        println!("  {:35} {:7.1} chars avg over {} rows", label, mean, count);
    }

    Ok(())
}

fn quality(path: &Path) -> Result<()> {
    let catalog = load_catalog(path)?;
    let report = QualityReport::analyze(&catalog);

    section("Core fields");
    for fill in &report.core_fills {
        println!(
            "  [{:4}] {:15} {}/{} ({:.1}% filled)",
            fill.status.marker(),
            fill.field,
            fill.filled,
            fill.total,
            fill.rate
        );
    }

    if report.enhanced_fills.is_empty() {
        println!("\nEnhanced fields not yet added (run categorize --apply first)");
    } else {
        section("Enhanced fields");
        for fill in &report.enhanced_fills {
            println!(
                "  [{:4}] {:15} {}/{} ({:.1}% filled)",
                fill.status.marker(),
                fill.field,
                fill.filled,
                fill.total,
                fill.rate
            );
        }
    }

    if !report.missing.is_empty() {
        section("Missing fields");
        for missing in &report.missing {
            println!("  {}: {} missing ({})", missing.field, missing.count, missing.impact);
            if missing.count <= 5 {
                for row in &missing.rows {
                    println!("    Row {}", row);
                }
            }
        }
    }

    if !report.length.very_short.is_empty() || !report.length.very_long.is_empty() {
        section("Length outliers");
        for (row, name, content) in report.length.very_short.iter().take(5) {
            println!("  Row {}: '{}' is very short ('{}')", row, name, content);
        }
        for (row, name, len) in report.length.very_long.iter().take(5) {
            println!("  Row {}: '{}' is {} chars long", row, name, len);
        }
    }

    section("Quality score");
    for (dimension, score) in &report.score.dimensions {
        println!(
            "  {:15} {} {:5.1}%",
            dimension,
            percent_bar(*score, 20),
            score
        );
    }
    println!();
    println!(
        "  Overall: {:.1}% - {}",
        report.score.overall, report.score.grade
    );

    if report.recommendations.is_empty() {
        println!("\nNo critical issues found");
    } else {
        section("Recommendations");
        for (i, rec) in report.recommendations.iter().enumerate() {
            println!("  {}. [{}] {}", i + 1, rec.priority, rec.issue);
            println!("     Action: {}", rec.action);
            println!("     Impact: {}", rec.impact);
        }
    }

    Ok(())
}

fn dupes(path: &Path, threshold: u8, sample: usize, export: Option<&Path>) -> Result<()> {
    let catalog = load_catalog(path)?;
    let config = DedupeConfig {
        threshold,
        sample_cap: sample,
    };
    let report = dedupe::analyze(&catalog, &config);

    section("Exact duplicates");
    println!("  Unique content: {}/{}", catalog.unique_content_count(), catalog.len());
    if report.exact.is_empty() {
        println!("  No exact duplicates found");
    } else {
        println!("  Duplicate groups: {}", report.exact.len());
        for group in report.exact.iter().take(20) {
            println!(
                "  '{}' appears {} times:",
                group.content_preview,
                group.members.len()
            );
            for (row, name) in &group.members {
                println!("    Row {}: {}", row, name);
            }
        }
    }

    section("Similar content");
    println!(
        "  Scanned {} rows at threshold {}%{}",
        report.scanned_rows,
        threshold,
        if report.sampled { " (sampled)" } else { "" }
    );
    if report.similar.is_empty() {
        println!("  No suspicious similarities found");
    } else {
        println!("  Similar pairs: {}", report.similar.len());
        for (label, count) in dedupe::similarity_buckets(&report.similar) {
            println!("    {}: {}", label, count);
        }
        for pair in report.similar.iter().take(15) {
            println!("  {}% similar:", pair.score);
            println!("    Row {}: '{}' -> {}", pair.row_a, pair.name_a, pair.preview_a);
            println!("    Row {}: '{}' -> {}", pair.row_b, pair.name_b, pair.preview_b);
        }
    }

    section("Name conflicts");
    if report.conflicts.is_empty() {
        println!("  All snippet names are unique");
    } else {
        for conflict in report.conflicts.iter().take(20) {
            let kind = match conflict.kind {
                ConflictKind::NameAndContent => "same content (true duplicate)",
                ConflictKind::NameOnly => "different content (naming conflict)",
            };
            println!(
                "  '{}' appears {} times, {}:",
                conflict.name,
                conflict.members.len(),
                kind
            );
            for (row, preview) in &conflict.members {
                println!("    Row {}: {}", row, preview);
            }
        }
    }

    if report.recommendations.is_empty() {
        println!("\nNo cleanup needed");
    } else {
        section("Cleanup recommendations");
        for (i, advice) in report.recommendations.iter().enumerate() {
            println!("  {}. [{}] {}", i + 1, advice.priority, advice.issue);
            println!("     Action: {}", advice.action);
        }
    }

    if let Some(dir) = export {
        let written = dedupe::export_reports(&report, dir).context("Failed to export reports")?;
        println!();
        for path in written {
            println!("Wrote {}", path.display());
        }
    }

    Ok(())
}

/// One suggestion line for the preview CSV and the apply pass
struct SuggestionRow {
    index: usize,
    main: String,
    sub: String,
    confidence: f32,
}

fn categorize(
    path: &Path,
    engine: Engine,
    min_confidence: f32,
    apply: bool,
    preview: Option<&Path>,
) -> Result<()> {
    let mut catalog = load_catalog(path)?;

    let suggestions = match engine {
        Engine::Rules => categorize_rules(&catalog),
        Engine::Tfidf => categorize_tfidf(&catalog)?,
        Engine::Bayes => categorize_bayes(&catalog)?,
    };

    // Distribution of suggested main categories
    section("Suggested categories");
    let mut counts: Vec<(String, usize)> = Vec::new();
    for suggestion in &suggestions {
        match counts.iter_mut().find(|(c, _)| c == &suggestion.main) {
            Some((_, n)) => *n += 1,
            None => counts.push((suggestion.main.clone(), 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    for (label, count) in &counts {
        println!("  {:35} {}", label, count);
    }

    let needs_review = suggestions
        .iter()
        .filter(|s| s.confidence < snippet_tools::categorize::REVIEW_CONFIDENCE)
        .count();
    println!();
    println!("  Suggestions: {}", suggestions.len());
    println!("  Needing manual review (<50% confidence): {}", needs_review);

    if let Some(preview_path) = preview {
        write_preview(&catalog, &suggestions, preview_path)?;
        println!("Wrote preview {}", preview_path.display());
    }

    if apply {
        let mut applied = 0;
        for suggestion in &suggestions {
            if suggestion.confidence < min_confidence
                || suggestion.main == NEEDS_REVIEW
                || suggestion.main == UNCATEGORIZED
            {
                continue;
            }
            let row = &mut catalog.rows[suggestion.index];
            row.main_category = suggestion.main.clone();
            if !suggestion.sub.is_empty() {
                row.subcategory = suggestion.sub.clone();
            }
            applied += 1;
        }
        catalog.ensure_category_columns();
        store::write_catalog_file(&catalog, path).context("Failed to write catalog")?;
        println!();
        println!(
            "Applied {} suggestions at >= {:.0}% confidence to {}",
            applied,
            min_confidence * 100.0,
            path.display()
        );
    } else {
        println!();
        println!("Dry run - pass --apply to write categories back to the catalog");
    }

    Ok(())
}

fn categorize_rules(catalog: &Catalog) -> Vec<SuggestionRow> {
    catalog
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let suggestion = suggest_by_rules(&row.content, &row.description);
            SuggestionRow {
                index: i,
                main: suggestion.main,
                sub: suggestion.sub,
                confidence: suggestion.confidence,
            }
        })
        .collect()
}

fn categorize_tfidf(catalog: &Catalog) -> Result<Vec<SuggestionRow>> {
    let labels: Vec<String> = main_category_names()
        .into_iter()
        .map(String::from)
        .collect();
    let categorizer = SimilarityCategorizer::new(labels)?;

    Ok(catalog
        .uncategorized_indices()
        .into_iter()
        .map(|i| {
            let row = &catalog.rows[i];
            let answer = categorizer.categorize(&row.content, &row.description);
            SuggestionRow {
                index: i,
                main: answer.category,
                sub: String::new(),
                confidence: answer.confidence,
            }
        })
        .collect())
}

fn categorize_bayes(catalog: &Catalog) -> Result<Vec<SuggestionRow>> {
    let (model, summary) = BayesCategorizer::train(catalog, &BayesConfig::default())?;

    section("Training");
    for (class, count) in &summary.class_counts {
        println!("  {:35} {}", class, count);
    }
    for (class, count) in &summary.excluded {
        println!("  {:35} {} (excluded, too few samples)", class, count);
    }
    println!("  Training rows: {}", summary.training_rows);
    if let Some(accuracy) = summary.holdout_accuracy {
        println!(
            "  Holdout accuracy: {:.1}% over {} rows",
            accuracy * 100.0,
            summary.holdout_size
        );
    }

    let predictions = model.predict_catalog(catalog);

    let high = predictions.iter().filter(|p| p.confidence >= 0.8).count();
    let medium = predictions
        .iter()
        .filter(|p| p.confidence >= 0.5 && p.confidence < 0.8)
        .count();
    let low = predictions.iter().filter(|p| p.confidence < 0.5).count();
    section("Predictions");
    println!("  High confidence (>=80%): {}", high);
    println!("  Medium confidence (50-80%): {}", medium);
    println!("  Low confidence (<50%): {}", low);
    for prediction in predictions.iter().take(15) {
        println!(
            "  Row {}: {:25} -> {:30} ({:.1}%)",
            prediction.row,
            prediction.name,
            prediction.category,
            prediction.confidence * 100.0
        );
    }

    Ok(predictions
        .into_iter()
        .map(|p| SuggestionRow {
            index: p.row - 2,
            main: p.category,
            sub: String::new(),
            confidence: p.confidence,
        })
        .collect())
}

fn write_preview(
    catalog: &Catalog,
    suggestions: &[SuggestionRow],
    path: &Path,
) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("Failed to write preview")?;
    writer.write_record([
        "row",
        "snippet_name",
        "content_preview",
        "current_description",
        "suggested_main_category",
        "suggested_subcategory",
        "confidence",
    ])?;
    for suggestion in suggestions {
        let row = &catalog.rows[suggestion.index];
        writer.write_record([
            &Catalog::row_number(suggestion.index).to_string(),
            &row.name,
            &row.content_preview(50),
            &row.description,
            &suggestion.main,
            &suggestion.sub,
            &format!("{:.2}", suggestion.confidence),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn backup_catalog(path: &Path, dir: &Path, keep: usize, no_csv: bool) -> Result<()> {
    let catalog = load_catalog(path)?;

    let config = BackupConfig {
        dir: dir.to_path_buf(),
        keep,
        write_csv: !no_csv,
        ..BackupConfig::new(dir)
    };
    let backup_path = backup::create_backup(&catalog, &config, &path.display().to_string())
        .context("Failed to create backup")?;
    let size_kb = std::fs::metadata(&backup_path)
        .map(|m| m.len() as f64 / 1024.0)
        .unwrap_or(0.0);

    let document = backup::read_backup(&backup_path)?;
    println!();
    println!("Backup complete");
    println!("  File: {}", backup_path.display());
    println!("  Rows: {}", document.metadata.row_count);
    println!("  Checksum: {}...", &document.metadata.checksum[..16]);
    println!("  Size: {:.2} KB", size_kb);

    Ok(())
}

fn list_backups(dir: &Path) -> Result<()> {
    let backups = backup::list_backups(dir, backup::DEFAULT_PREFIX)?;

    if backups.is_empty() {
        println!("No backups found in {}", dir.display());
        return Ok(());
    }

    println!("Backups in {}:", dir.display());
    println!("{:<3} {:<22} {:<8} {:<10} {}", "#", "Date", "Rows", "Checksum", "Filename");
    for (i, summary) in backups.iter().enumerate() {
        let date = summary.created_at.chars().take(19).collect::<String>();
        println!(
            "{:<3} {:<22} {:<8} {:<10} {}",
            i + 1,
            date,
            summary.row_count,
            &summary.checksum[..8.min(summary.checksum.len())],
            summary.file_name
        );
    }

    let newest = &backups[0];
    let age_days = (chrono::Utc::now().naive_utc() - newest.stamp).num_days();
    match age_days {
        0 => println!("\nLatest backup: today"),
        1 => println!("\nLatest backup: yesterday"),
        n => {
            println!("\nLatest backup: {} days ago", n);
            if n > 7 {
                println!("Consider creating a fresh backup");
            }
        }
    }

    Ok(())
}

fn verify(path: &Path) -> Result<()> {
    let document = backup::verify_backup(path).context("Backup verification failed")?;
    println!("Integrity verified: checksum matches");
    println!("  Created: {}", document.metadata.created_at);
    println!("  Rows: {}", document.metadata.row_count);
    println!("  Checksum: {}...", &document.metadata.checksum[..16]);
    Ok(())
}

fn diff(path: &Path, dir: &Path) -> Result<()> {
    let catalog = load_catalog(path)?;

    match backup::detect_changes(&catalog, dir, backup::DEFAULT_PREFIX)? {
        None => {
            println!("No backups found in {} - create one first", dir.display());
        }
        Some(report) => {
            println!("Comparing against {}", report.backup_name);
            println!("  Backup rows: {}", report.backup_rows);
            println!("  Current rows: {}", report.current_rows);
            if report.changed {
                if report.added_rows > 0 {
                    println!("  Added rows: {}", report.added_rows);
                }
                if report.removed_rows > 0 {
                    println!("  Removed rows: {}", report.removed_rows);
                }
                println!("Changes detected - consider creating a backup");
            } else {
                println!("No changes since the last backup");
            }
        }
    }

    Ok(())
}

fn restore(backup_path: &Path, catalog_path: &Path, no_safety: bool) -> Result<()> {
    let safety_config = if no_safety {
        None
    } else {
        let dir = backup_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        Some(BackupConfig::new(dir))
    };

    println!("Restoring {} from {}", catalog_path.display(), backup_path.display());
    let report = backup::restore_backup(backup_path, catalog_path, safety_config.as_ref())
        .context("Restore failed")?;

    if let Some(safety) = &report.safety_backup {
        println!("Safety backup of the previous contents: {}", safety.display());
    }
    println!("Restored {} rows from backup dated {}", report.restored_rows, report.backup_created_at);
    if !report.row_count_verified {
        println!("Warning: restored row count differs from the backup metadata");
    }

    Ok(())
}

fn fetch(url: &str, output: &Path) -> Result<()> {
    println!("Fetching sheet: {}", url);
    let catalog = store::fetch_catalog(url).context("Failed to fetch sheet")?;
    println!("Downloaded {} rows, {} columns", catalog.len(), catalog.headers.len());

    store::write_catalog_file(&catalog, output).context("Failed to write catalog")?;
    println!("Wrote {}", output.display());
    Ok(())
}

fn export(path: &Path, output: &Path) -> Result<()> {
    let catalog = load_catalog(path)?;
    let quality = QualityReport::analyze(&catalog);
    let report = dedupe::analyze(&catalog, &DedupeConfig::default());

    xlsx::write_audit_workbook(&catalog, &quality, &report, output)
        .context("Failed to write workbook")?;
    println!("Wrote {}", output.display());
    Ok(())
}

fn validate(path: &Path) -> Result<()> {
    let catalog = load_catalog(path)?;

    let mut issues = Vec::new();

    let mut seen = std::collections::HashSet::new();
    for header in &catalog.headers {
        if !seen.insert(header) {
            issues.push(format!("duplicate column header '{}'", header));
        }
    }

    for (i, row) in catalog.rows.iter().enumerate() {
        if row.name.is_empty() {
            issues.push(format!("Row {}: empty snippet name", Catalog::row_number(i)));
        }
        if row.content.is_empty() {
            issues.push(format!("Row {}: empty content", Catalog::row_number(i)));
        }
        if row.content_chars() > snippet_tools::quality::MAX_VALID_CONTENT_CHARS {
            issues.push(format!(
                "Row {}: content longer than {} chars",
                Catalog::row_number(i),
                snippet_tools::quality::MAX_VALID_CONTENT_CHARS
            ));
        }
    }

    if issues.is_empty() {
        println!("Catalog is valid");
        println!("  No issues found");
    } else {
        println!("Issues found:");
        for issue in &issues {
            println!("  - {}", issue);
        }
    }

    Ok(())
}
