//! Duplicate and similarity analysis
//!
//! Three passes over the catalog: exact content duplicates, snippet-name
//! conflicts, and a fuzzy pairwise scan for near-duplicates. The fuzzy pass
//! is O(n^2), so large catalogs are scanned through a deterministic stride
//! sample and the pair loop runs on the rayon pool.

use crate::error::Result;
use crate::model::{truncate_chars, Catalog};
use crate::quality::Priority;
use fuzzywuzzy::fuzz;
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const PREVIEW_CHARS: usize = 40;

#[derive(Debug, Clone, Copy)]
pub struct DedupeConfig {
    /// Minimum fuzz ratio (0-100) for a pair to be reported
    pub threshold: u8,
    /// Largest number of rows the fuzzy pass will compare
    pub sample_cap: usize,
}

impl Default for DedupeConfig {
    fn default() -> Self {
        DedupeConfig {
            threshold: 85,
            sample_cap: 500,
        }
    }
}

/// Rows sharing identical content
#[derive(Debug, Clone)]
pub struct DuplicateGroup {
    pub content_preview: String,
    /// (row number, snippet name) per member
    pub members: Vec<(usize, String)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// Same name, same content: a true duplicate
    NameAndContent,
    /// Same name, different content: a naming conflict
    NameOnly,
}

/// Rows sharing a snippet name
#[derive(Debug, Clone)]
pub struct NameConflict {
    pub name: String,
    pub kind: ConflictKind,
    /// (row number, content preview) per member
    pub members: Vec<(usize, String)>,
}

/// A near-duplicate pair found by the fuzzy scan
#[derive(Debug, Clone)]
pub struct SimilarPair {
    pub score: u8,
    pub row_a: usize,
    pub name_a: String,
    pub preview_a: String,
    pub row_b: usize,
    pub name_b: String,
    pub preview_b: String,
}

#[derive(Debug, Clone)]
pub struct CleanupAdvice {
    pub priority: Priority,
    pub issue: String,
    pub action: String,
}

/// Combined result of all three passes
#[derive(Debug, Clone)]
pub struct DedupeReport {
    pub exact: Vec<DuplicateGroup>,
    pub conflicts: Vec<NameConflict>,
    pub similar: Vec<SimilarPair>,
    /// Rows actually compared by the fuzzy pass
    pub scanned_rows: usize,
    /// True when the fuzzy pass ran on a sample, not the full catalog
    pub sampled: bool,
    pub recommendations: Vec<CleanupAdvice>,
}

pub fn analyze(catalog: &Catalog, config: &DedupeConfig) -> DedupeReport {
    let exact = exact_duplicates(catalog);
    let conflicts = name_conflicts(catalog);
    let (similar, scanned_rows, sampled) = similar_pairs(catalog, config);
    let recommendations = cleanup_recommendations(&exact, &conflicts, &similar);

    DedupeReport {
        exact,
        conflicts,
        similar,
        scanned_rows,
        sampled,
        recommendations,
    }
}

/// Group rows by identical content; only groups with more than one member
pub fn exact_duplicates(catalog: &Catalog) -> Vec<DuplicateGroup> {
    let mut groups: HashMap<&str, Vec<usize>> = HashMap::new();
    for (i, row) in catalog.rows.iter().enumerate() {
        groups.entry(&row.content).or_default().push(i);
    }

    let mut result: Vec<DuplicateGroup> = groups
        .into_iter()
        .filter(|(_, indices)| indices.len() > 1)
        .map(|(content, indices)| DuplicateGroup {
            content_preview: truncate_chars(content, PREVIEW_CHARS),
            members: indices
                .iter()
                .map(|&i| (Catalog::row_number(i), catalog.rows[i].name.clone()))
                .collect(),
        })
        .collect();
    result.sort_by_key(|g| g.members[0].0);
    result
}

/// Group rows by identical snippet name; only conflicting groups
pub fn name_conflicts(catalog: &Catalog) -> Vec<NameConflict> {
    let mut groups: HashMap<&str, Vec<usize>> = HashMap::new();
    for (i, row) in catalog.rows.iter().enumerate() {
        if !row.name.is_empty() {
            groups.entry(&row.name).or_default().push(i);
        }
    }

    let mut result: Vec<NameConflict> = groups
        .into_iter()
        .filter(|(_, indices)| indices.len() > 1)
        .map(|(name, indices)| {
            let mut contents: Vec<&str> = indices
                .iter()
                .map(|&i| catalog.rows[i].content.as_str())
                .collect();
            contents.sort_unstable();
            contents.dedup();
            let kind = if contents.len() == 1 {
                ConflictKind::NameAndContent
            } else {
                ConflictKind::NameOnly
            };
            NameConflict {
                name: name.to_string(),
                kind,
                members: indices
                    .iter()
                    .map(|&i| {
                        (
                            Catalog::row_number(i),
                            catalog.rows[i].content_preview(PREVIEW_CHARS),
                        )
                    })
                    .collect(),
            }
        })
        .collect();
    result.sort_by_key(|c| c.members[0].0);
    result
}

/// Pairwise fuzzy scan; returns (pairs sorted by score desc, rows scanned,
/// whether sampling kicked in)
pub fn similar_pairs(
    catalog: &Catalog,
    config: &DedupeConfig,
) -> (Vec<SimilarPair>, usize, bool) {
    let indices = sample_indices(catalog.len(), config.sample_cap);
    let sampled = indices.len() < catalog.len();
    if sampled {
        log::debug!(
            "fuzzy scan sampling {} of {} rows",
            indices.len(),
            catalog.len()
        );
    }

    let threshold = config.threshold;
    let mut pairs: Vec<SimilarPair> = indices
        .par_iter()
        .enumerate()
        .flat_map_iter(|(pos, &i)| {
            let a = &catalog.rows[i];
            indices[pos + 1..].iter().filter_map(move |&j| {
                let b = &catalog.rows[j];
                // Identical content belongs to the exact pass
                if a.content == b.content {
                    return None;
                }
                let score = fuzz::ratio(&a.content, &b.content);
                if score >= threshold {
                    Some(SimilarPair {
                        score,
                        row_a: Catalog::row_number(i),
                        name_a: a.name.clone(),
                        preview_a: a.content_preview(PREVIEW_CHARS),
                        row_b: Catalog::row_number(j),
                        name_b: b.name.clone(),
                        preview_b: b.content_preview(PREVIEW_CHARS),
                    })
                } else {
                    None
                }
            })
        })
        .collect();

    pairs.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.row_a.cmp(&b.row_a)));
    (pairs, indices.len(), sampled)
}

/// Deterministic stride sample: every k-th row so runs are reproducible
fn sample_indices(len: usize, cap: usize) -> Vec<usize> {
    if len <= cap || cap == 0 {
        return (0..len).collect();
    }
    let stride = len.div_ceil(cap);
    (0..len).step_by(stride).take(cap).collect()
}

/// Bucket the pair scores for the summary (85-89, 90-94, 95-99)
pub fn similarity_buckets(pairs: &[SimilarPair]) -> Vec<(&'static str, usize)> {
    let buckets = [("85-89%", 85..90), ("90-94%", 90..95), ("95-99%", 95..100)];
    buckets
        .into_iter()
        .map(|(label, range)| {
            let count = pairs
                .iter()
                .filter(|p| range.contains(&(p.score as usize)))
                .count();
            (label, count)
        })
        .filter(|(_, count)| *count > 0)
        .collect()
}

fn cleanup_recommendations(
    exact: &[DuplicateGroup],
    conflicts: &[NameConflict],
    similar: &[SimilarPair],
) -> Vec<CleanupAdvice> {
    let mut advice = Vec::new();

    if !exact.is_empty() {
        let rows: usize = exact.iter().map(|g| g.members.len()).sum();
        advice.push(CleanupAdvice {
            priority: Priority::High,
            issue: format!("{} exact duplicate rows in {} groups", rows, exact.len()),
            action: "delete duplicate rows, keep one copy each".to_string(),
        });
    }

    let very_similar = similar.iter().filter(|p| p.score >= 95).count();
    if very_similar > 0 {
        advice.push(CleanupAdvice {
            priority: Priority::Medium,
            issue: format!("{} pairs with 95%+ similarity", very_similar),
            action: "review and merge or differentiate these snippets".to_string(),
        });
    }

    let name_only = conflicts
        .iter()
        .filter(|c| c.kind == ConflictKind::NameOnly)
        .count();
    if name_only > 0 {
        advice.push(CleanupAdvice {
            priority: Priority::Medium,
            issue: format!("{} snippet names used for different content", name_only),
            action: "rename to distinguish, or merge if the contents should match".to_string(),
        });
    }

    advice
}

/// Export the three reports as CSV files into a directory
///
/// Writes exact_duplicates.csv, similar_pairs.csv and duplicate_names.csv,
/// skipping files whose report is empty. Returns the paths written.
pub fn export_reports(report: &DedupeReport, dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::new();

    if !report.exact.is_empty() {
        let path = dir.join("exact_duplicates.csv");
        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record(["content_preview", "snippet_name", "row", "duplicate_count"])?;
        for group in &report.exact {
            for (row, name) in &group.members {
                writer.write_record([
                    group.content_preview.clone(),
                    name.clone(),
                    row.to_string(),
                    group.members.len().to_string(),
                ])?;
            }
        }
        writer.flush()?;
        written.push(path);
    }

    if !report.similar.is_empty() {
        let path = dir.join("similar_pairs.csv");
        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record([
            "similarity", "row_a", "snippet_a", "content_a", "row_b", "snippet_b", "content_b",
        ])?;
        for pair in &report.similar {
            writer.write_record([
                pair.score.to_string(),
                pair.row_a.to_string(),
                pair.name_a.clone(),
                pair.preview_a.clone(),
                pair.row_b.to_string(),
                pair.name_b.clone(),
                pair.preview_b.clone(),
            ])?;
        }
        writer.flush()?;
        written.push(path);
    }

    if !report.conflicts.is_empty() {
        let path = dir.join("duplicate_names.csv");
        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record(["snippet_name", "row", "content_preview", "duplicate_type"])?;
        for conflict in &report.conflicts {
            let kind = match conflict.kind {
                ConflictKind::NameAndContent => "name_and_content",
                ConflictKind::NameOnly => "name_only",
            };
            for (row, preview) in &conflict.members {
                writer.write_record([
                    conflict.name.clone(),
                    row.to_string(),
                    preview.clone(),
                    kind.to_string(),
                ])?;
            }
        }
        writer.flush()?;
        written.push(path);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Snippet;

    fn sample() -> Catalog {
        Catalog::with_rows(vec![
            Snippet::new("omw", "on my way"),
            Snippet::new("omw2", "on my way"),
            Snippet::new("omw", "on my way!"),
            Snippet::new("heart", "\u{2764}"),
        ])
    }

    #[test]
    fn test_exact_duplicates() {
        let groups = exact_duplicates(&sample());
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].members.len(), 2);
        assert_eq!(groups[0].members[0].0, 2);
        assert_eq!(groups[0].members[1].0, 3);
    }

    #[test]
    fn test_name_conflicts_classification() {
        let conflicts = name_conflicts(&sample());
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].name, "omw");
        assert_eq!(conflicts[0].kind, ConflictKind::NameOnly);

        let true_dup = Catalog::with_rows(vec![
            Snippet::new("x", "same"),
            Snippet::new("x", "same"),
        ]);
        let conflicts = name_conflicts(&true_dup);
        assert_eq!(conflicts[0].kind, ConflictKind::NameAndContent);
    }

    #[test]
    fn test_similar_pairs_skip_exact_matches() {
        let (pairs, scanned, sampled) = similar_pairs(&sample(), &DedupeConfig::default());
        assert_eq!(scanned, 4);
        assert!(!sampled);
        // Both "on my way" copies pair with "on my way!"; the identical pair
        // is left to the exact pass
        assert_eq!(pairs.len(), 2);
        assert!(pairs.iter().all(|p| p.score >= 85));
        assert_eq!((pairs[0].row_a, pairs[0].row_b), (2, 4));
        assert_eq!((pairs[1].row_a, pairs[1].row_b), (3, 4));
    }

    #[test]
    fn test_similar_pairs_threshold() {
        let config = DedupeConfig {
            threshold: 100,
            ..Default::default()
        };
        let (pairs, _, _) = similar_pairs(&sample(), &config);
        assert!(pairs.is_empty());
    }

    #[test]
    fn test_sample_indices_stride() {
        assert_eq!(sample_indices(4, 500).len(), 4);
        let sampled = sample_indices(1000, 500);
        assert_eq!(sampled.len(), 500);
        assert_eq!(sampled[0], 0);
        assert_eq!(sampled[1], 2);
        // Deterministic: same input, same sample
        assert_eq!(sampled, sample_indices(1000, 500));
    }

    #[test]
    fn test_similarity_buckets() {
        let mut pairs = Vec::new();
        for score in [85u8, 88, 92, 99] {
            pairs.push(SimilarPair {
                score,
                row_a: 2,
                name_a: String::new(),
                preview_a: String::new(),
                row_b: 3,
                name_b: String::new(),
                preview_b: String::new(),
            });
        }
        let buckets = similarity_buckets(&pairs);
        assert_eq!(buckets, vec![("85-89%", 2), ("90-94%", 1), ("95-99%", 1)]);
    }

    #[test]
    fn test_recommendations() {
        let report = analyze(&sample(), &DedupeConfig::default());
        assert!(report
            .recommendations
            .iter()
            .any(|a| a.priority == Priority::High));
        assert!(report
            .recommendations
            .iter()
            .any(|a| a.issue.contains("names used for different content")));
    }

    #[test]
    fn test_export_reports() {
        let dir = tempfile::tempdir().unwrap();
        let report = analyze(&sample(), &DedupeConfig::default());
        let written = export_reports(&report, dir.path()).unwrap();
        assert_eq!(written.len(), 3);
        let exact = std::fs::read_to_string(dir.path().join("exact_duplicates.csv")).unwrap();
        assert!(exact.contains("on my way"));
    }

    #[test]
    fn test_empty_catalog() {
        let report = analyze(&Catalog::new(), &DedupeConfig::default());
        assert!(report.exact.is_empty());
        assert!(report.similar.is_empty());
        assert!(report.recommendations.is_empty());
    }
}
