//! Catalog overview statistics
//!
//! Everything the stats dashboard prints: distributions, content length
//! figures, and tag frequency.

use crate::model::{Catalog, Snippet};
use std::collections::HashMap;

/// Content shorter than this is suspicious
pub const VERY_SHORT_CHARS: usize = 3;
/// Content longer than this is flagged as bulky
pub const LONG_CONTENT_CHARS: usize = 1000;
/// How many tags the frequency table reports
pub const TOP_TAG_COUNT: usize = 15;

/// Placeholder shown for rows without a value
pub const EMPTY_LABEL: &str = "(empty)";
pub const UNCATEGORIZED_LABEL: &str = "(uncategorized)";

/// Content length summary plus the outliers at both ends
#[derive(Debug, Clone, Default)]
pub struct LengthStats {
    pub mean: f64,
    pub median: f64,
    pub min: usize,
    pub max: usize,
    /// (row number, name, content) for entries under VERY_SHORT_CHARS
    pub very_short: Vec<(usize, String, String)>,
    /// (row number, name, length) for entries over LONG_CONTENT_CHARS
    pub very_long: Vec<(usize, String, usize)>,
}

/// The full overview computed for the stats dashboard
#[derive(Debug, Clone, Default)]
pub struct CatalogStats {
    pub total_rows: usize,
    pub column_count: usize,
    pub unique_names: usize,
    pub unique_content: usize,
    /// (label, count) sorted by count descending
    pub category_distribution: Vec<(String, usize)>,
    pub language_distribution: Vec<(String, usize)>,
    pub length: LengthStats,
    pub top_tags: Vec<(String, usize)>,
    /// (category, mean content length, row count)
    pub length_by_category: Vec<(String, f64, usize)>,
}

impl CatalogStats {
    pub fn compute(catalog: &Catalog) -> Self {
        CatalogStats {
            total_rows: catalog.len(),
            column_count: catalog.headers.len(),
            unique_names: catalog.unique_name_count(),
            unique_content: catalog.unique_content_count(),
            category_distribution: distribution(catalog, |r| {
                label_or(&r.main_category, UNCATEGORIZED_LABEL)
            }),
            language_distribution: distribution(catalog, |r| label_or(&r.language, EMPTY_LABEL)),
            length: length_stats(catalog),
            top_tags: tag_frequency(catalog, TOP_TAG_COUNT),
            length_by_category: length_by_category(catalog),
        }
    }

    /// Percentage of rows for a count in this catalog
    pub fn percent(&self, count: usize) -> f64 {
        if self.total_rows == 0 {
            0.0
        } else {
            count as f64 / self.total_rows as f64 * 100.0
        }
    }
}

fn label_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() {
        fallback
    } else {
        value
    }
}

/// Count rows by a label, sorted by count descending (label ascending on ties)
fn distribution<'a, F>(catalog: &'a Catalog, label: F) -> Vec<(String, usize)>
where
    F: Fn(&'a Snippet) -> &'a str,
{
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for row in &catalog.rows {
        *counts.entry(label(row)).or_insert(0) += 1;
    }
    let mut entries: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries
}

/// Content length summary for a catalog
pub fn length_stats(catalog: &Catalog) -> LengthStats {
    if catalog.is_empty() {
        return LengthStats::default();
    }

    let mut lengths: Vec<usize> = catalog.rows.iter().map(Snippet::content_chars).collect();
    let sum: usize = lengths.iter().sum();
    let mean = sum as f64 / lengths.len() as f64;
    let min = *lengths.iter().min().unwrap_or(&0);
    let max = *lengths.iter().max().unwrap_or(&0);

    lengths.sort_unstable();
    let mid = lengths.len() / 2;
    let median = if lengths.len() % 2 == 0 {
        (lengths[mid - 1] + lengths[mid]) as f64 / 2.0
    } else {
        lengths[mid] as f64
    };

    let mut very_short = Vec::new();
    let mut very_long = Vec::new();
    for (i, row) in catalog.rows.iter().enumerate() {
        let len = row.content_chars();
        if len < VERY_SHORT_CHARS {
            very_short.push((Catalog::row_number(i), row.name.clone(), row.content.clone()));
        } else if len > LONG_CONTENT_CHARS {
            very_long.push((Catalog::row_number(i), row.name.clone(), len));
        }
    }

    LengthStats {
        mean,
        median,
        min,
        max,
        very_short,
        very_long,
    }
}

/// Most common tags across the comma-separated tag column
pub fn tag_frequency(catalog: &Catalog, top: usize) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for row in &catalog.rows {
        for tag in row.tag_list() {
            *counts.entry(tag.to_lowercase()).or_insert(0) += 1;
        }
    }
    let mut entries: Vec<(String, usize)> = counts.into_iter().collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries.truncate(top);
    entries
}

fn length_by_category(catalog: &Catalog) -> Vec<(String, f64, usize)> {
    let mut sums: HashMap<&str, (usize, usize)> = HashMap::new();
    for row in &catalog.rows {
        let label = label_or(&row.main_category, UNCATEGORIZED_LABEL);
        let entry = sums.entry(label).or_insert((0, 0));
        entry.0 += row.content_chars();
        entry.1 += 1;
    }
    let mut entries: Vec<(String, f64, usize)> = sums
        .into_iter()
        .map(|(label, (sum, count))| (label.to_string(), sum as f64 / count as f64, count))
        .collect();
    entries.sort_by(|a, b| b.2.cmp(&a.2).then_with(|| a.0.cmp(&b.0)));
    entries
}

/// Text bar for percentage displays, e.g. "████░░░░░░"
pub fn percent_bar(pct: f64, width: usize) -> String {
    let filled = ((pct / 100.0) * width as f64).round() as usize;
    let filled = filled.min(width);
    let mut bar = "\u{2588}".repeat(filled);
    bar.push_str(&"\u{2591}".repeat(width - filled));
    bar
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Snippet;

    fn sample() -> Catalog {
        Catalog::with_rows(vec![
            Snippet::new("omw", "on my way")
                .with_language("English")
                .with_tags("greeting, casual"),
            Snippet::new("hb", "\u{2764}").with_tags("hearts"),
            Snippet::new("long", &"x".repeat(1200)).with_language("English"),
            Snippet::new("dup", "on my way").with_tags("Greeting"),
        ])
    }

    #[test]
    fn test_compute_totals() {
        let stats = CatalogStats::compute(&sample());
        assert_eq!(stats.total_rows, 4);
        assert_eq!(stats.unique_names, 4);
        assert_eq!(stats.unique_content, 3);
    }

    #[test]
    fn test_language_distribution_labels_empty() {
        let stats = CatalogStats::compute(&sample());
        // Ties sort by label, so "(empty)" lands before "English"
        assert_eq!(
            stats.language_distribution,
            vec![("(empty)".to_string(), 2), ("English".to_string(), 2)]
        );
    }

    #[test]
    fn test_length_stats_flags_outliers() {
        let stats = CatalogStats::compute(&sample());
        assert_eq!(stats.length.min, 1);
        assert_eq!(stats.length.max, 1200);
        assert_eq!(stats.length.very_short.len(), 1);
        assert_eq!(stats.length.very_short[0].0, 3); // row number of "hb"
        assert_eq!(stats.length.very_long.len(), 1);
        assert_eq!(stats.length.very_long[0].2, 1200);
    }

    #[test]
    fn test_tag_frequency_is_case_insensitive() {
        let tags = tag_frequency(&sample(), 10);
        assert_eq!(tags[0], ("greeting".to_string(), 2));
    }

    #[test]
    fn test_empty_catalog_is_quiet() {
        let stats = CatalogStats::compute(&Catalog::new());
        assert_eq!(stats.total_rows, 0);
        assert_eq!(stats.length.mean, 0.0);
        assert!(stats.category_distribution.is_empty());
        assert_eq!(stats.percent(0), 0.0);
    }

    #[test]
    fn test_percent_bar() {
        assert_eq!(percent_bar(50.0, 10), "\u{2588}\u{2588}\u{2588}\u{2588}\u{2588}\u{2591}\u{2591}\u{2591}\u{2591}\u{2591}");
        assert_eq!(percent_bar(0.0, 4), "\u{2591}\u{2591}\u{2591}\u{2591}");
        assert_eq!(percent_bar(150.0, 4), "\u{2588}\u{2588}\u{2588}\u{2588}");
    }
}
