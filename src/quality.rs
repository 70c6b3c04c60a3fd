//! Data-quality scoring for a snippet catalog
//!
//! Produces field fill rates, a missing-data report, a 0-100 quality score
//! across several dimensions, and prioritized fix recommendations.

use crate::analytics::{length_stats, LengthStats};
use crate::model::{
    Catalog, COL_CONTENT, COL_DESCRIPTION, COL_LANGUAGE, COL_MAIN_CATEGORY, COL_NAME,
    COL_SUBCATEGORY, COL_TAGS, CORE_COLUMNS,
};
use std::fmt;

/// Content longer than this fails the validity check
pub const MAX_VALID_CONTENT_CHARS: usize = 10_000;
/// How many offending row numbers a missing-field entry keeps
const MISSING_ROW_SAMPLE: usize = 10;

/// Extra columns the fill report covers when present
const ENHANCED_COLUMNS: [&str; 5] = [
    COL_MAIN_CATEGORY,
    COL_SUBCATEGORY,
    "FontStyle",
    "Platform",
    "UsageFrequency",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::High => write!(f, "HIGH"),
            Priority::Medium => write!(f, "MEDIUM"),
            Priority::Low => write!(f, "LOW"),
        }
    }
}

/// An actionable fix suggestion
#[derive(Debug, Clone)]
pub struct Recommendation {
    pub priority: Priority,
    pub issue: String,
    pub action: String,
    pub impact: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillStatus {
    Good,
    Fair,
    Poor,
    Bad,
}

impl FillStatus {
    pub fn from_rate(rate: f64) -> Self {
        if rate >= 90.0 {
            FillStatus::Good
        } else if rate >= 70.0 {
            FillStatus::Fair
        } else if rate >= 50.0 {
            FillStatus::Poor
        } else {
            FillStatus::Bad
        }
    }

    pub fn marker(&self) -> &'static str {
        match self {
            FillStatus::Good => "ok",
            FillStatus::Fair => "warn",
            FillStatus::Poor => "poor",
            FillStatus::Bad => "bad",
        }
    }
}

/// Fill rate for one column
#[derive(Debug, Clone)]
pub struct FieldFill {
    pub field: String,
    pub filled: usize,
    pub total: usize,
    pub rate: f64,
    pub status: FillStatus,
}

/// Rows missing a critical field
#[derive(Debug, Clone)]
pub struct MissingField {
    pub field: String,
    pub count: usize,
    pub impact: String,
    /// First few offending spreadsheet row numbers
    pub rows: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grade {
    Excellent,
    Great,
    Good,
    Fair,
    NeedsWork,
}

impl Grade {
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            Grade::Excellent
        } else if score >= 80.0 {
            Grade::Great
        } else if score >= 70.0 {
            Grade::Good
        } else if score >= 60.0 {
            Grade::Fair
        } else {
            Grade::NeedsWork
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Grade::Excellent => write!(f, "EXCELLENT"),
            Grade::Great => write!(f, "GREAT"),
            Grade::Good => write!(f, "GOOD"),
            Grade::Fair => write!(f, "FAIR"),
            Grade::NeedsWork => write!(f, "NEEDS WORK"),
        }
    }
}

/// Per-dimension scores and the overall grade
#[derive(Debug, Clone)]
pub struct QualityScore {
    /// (dimension name, 0-100 score)
    pub dimensions: Vec<(String, f64)>,
    pub overall: f64,
    pub grade: Grade,
}

/// Everything the quality command reports
#[derive(Debug, Clone)]
pub struct QualityReport {
    pub total_rows: usize,
    pub core_fills: Vec<FieldFill>,
    pub enhanced_fills: Vec<FieldFill>,
    pub missing: Vec<MissingField>,
    pub length: LengthStats,
    pub score: QualityScore,
    pub recommendations: Vec<Recommendation>,
}

impl QualityReport {
    pub fn analyze(catalog: &Catalog) -> Self {
        QualityReport {
            total_rows: catalog.len(),
            core_fills: fill_rates(catalog, &CORE_COLUMNS),
            enhanced_fills: fill_rates(
                catalog,
                &ENHANCED_COLUMNS
                    .iter()
                    .copied()
                    .filter(|c| catalog.has_column(c))
                    .collect::<Vec<_>>(),
            ),
            missing: missing_fields(catalog),
            length: length_stats(catalog),
            score: quality_score(catalog),
            recommendations: recommendations(catalog),
        }
    }
}

fn fill_rates(catalog: &Catalog, columns: &[&str]) -> Vec<FieldFill> {
    columns
        .iter()
        .map(|col| {
            let filled = catalog.filled_count(col);
            let rate = catalog.fill_rate(col);
            FieldFill {
                field: col.to_string(),
                filled,
                total: catalog.len(),
                rate,
                status: FillStatus::from_rate(rate),
            }
        })
        .collect()
}

fn missing_fields(catalog: &Catalog) -> Vec<MissingField> {
    let critical: [(&str, &str); 5] = [
        (COL_NAME, "no snippet name - cannot identify the shortcut"),
        (COL_CONTENT, "no content - the shortcut expands to nothing"),
        (COL_DESCRIPTION, "no description - harder to categorize"),
        (COL_LANGUAGE, "no language - filtering limited"),
        (COL_TAGS, "no tags - search limited"),
    ];

    let mut report = Vec::new();
    for (field, impact) in critical {
        let mut rows = Vec::new();
        let mut count = 0;
        for (i, row) in catalog.rows.iter().enumerate() {
            if row.get(field).is_some_and(str::is_empty) {
                count += 1;
                if rows.len() < MISSING_ROW_SAMPLE {
                    rows.push(Catalog::row_number(i));
                }
            }
        }
        if count > 0 {
            report.push(MissingField {
                field: field.to_string(),
                count,
                impact: impact.to_string(),
                rows,
            });
        }
    }
    report
}

fn quality_score(catalog: &Catalog) -> QualityScore {
    let mut dimensions = Vec::new();
    let total = catalog.len();

    // Completeness: mean fill rate of the scoreable core fields
    let score_fields = [COL_NAME, COL_CONTENT, COL_DESCRIPTION, COL_LANGUAGE, COL_TAGS];
    let completeness = if total == 0 {
        0.0
    } else {
        score_fields.iter().map(|f| catalog.fill_rate(f)).sum::<f64>() / score_fields.len() as f64
    };
    dimensions.push(("Completeness".to_string(), completeness));

    // Uniqueness: distinct content over total rows
    let uniqueness = if total == 0 {
        0.0
    } else {
        catalog.unique_content_count() as f64 / total as f64 * 100.0
    };
    dimensions.push(("Uniqueness".to_string(), uniqueness));

    // Validity: content length within sane bounds
    let validity = if total == 0 {
        0.0
    } else {
        let valid = catalog
            .rows
            .iter()
            .filter(|r| {
                let len = r.content_chars();
                len >= 1 && len <= MAX_VALID_CONTENT_CHARS
            })
            .count();
        valid as f64 / total as f64 * 100.0
    };
    dimensions.push(("Validity".to_string(), validity));

    // Categorization coverage, only once the column exists
    if catalog.has_column(COL_MAIN_CATEGORY) {
        let categorized = if total == 0 {
            0.0
        } else {
            catalog.filled_count(COL_MAIN_CATEGORY) as f64 / total as f64 * 100.0
        };
        dimensions.push(("Categorized".to_string(), categorized));
    }

    let overall = if dimensions.is_empty() {
        0.0
    } else {
        dimensions.iter().map(|(_, s)| s).sum::<f64>() / dimensions.len() as f64
    };

    QualityScore {
        dimensions,
        overall,
        grade: Grade::from_score(overall),
    }
}

fn recommendations(catalog: &Catalog) -> Vec<Recommendation> {
    let mut recs = Vec::new();
    let total = catalog.len();
    if total == 0 {
        return recs;
    }

    let missing_desc = total - catalog.filled_count(COL_DESCRIPTION);
    if missing_desc > 0 {
        recs.push(Recommendation {
            priority: Priority::High,
            issue: format!("{} snippets missing descriptions", missing_desc),
            action: "run the categorizer or add descriptions by hand".to_string(),
            impact: "improves filtering and searchability".to_string(),
        });
    }

    let missing_tags = total - catalog.filled_count(COL_TAGS);
    if missing_tags > 0 {
        let pct = missing_tags as f64 / total as f64 * 100.0;
        let priority = if pct > 50.0 {
            Priority::High
        } else if pct > 20.0 {
            Priority::Medium
        } else {
            Priority::Low
        };
        recs.push(Recommendation {
            priority,
            issue: format!("{} snippets missing tags ({:.1}%)", missing_tags, pct),
            action: "add tags to the affected rows".to_string(),
            impact: "improves search".to_string(),
        });
    }

    let missing_lang = total - catalog.filled_count(COL_LANGUAGE);
    if missing_lang > 0 {
        recs.push(Recommendation {
            priority: Priority::Medium,
            issue: format!("{} snippets missing language", missing_lang),
            action: "fill in the Language column".to_string(),
            impact: "enables language-based filtering".to_string(),
        });
    }

    if catalog.has_column(COL_MAIN_CATEGORY) {
        let missing_cat = total - catalog.filled_count(COL_MAIN_CATEGORY);
        if missing_cat > 0 {
            recs.push(Recommendation {
                priority: Priority::High,
                issue: format!("{} snippets uncategorized", missing_cat),
                action: "re-run categorize and review low-confidence rows".to_string(),
                impact: "required for category-based filtering".to_string(),
            });
        }
    } else {
        recs.push(Recommendation {
            priority: Priority::High,
            issue: "MainCategory column not yet added".to_string(),
            action: "run categorize --apply to create it".to_string(),
            impact: "required for category-based filtering".to_string(),
        });
    }

    recs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Snippet;

    fn full_row(name: &str) -> Snippet {
        Snippet::new(name, "content")
            .with_description("desc")
            .with_language("English")
            .with_tags("tag")
    }

    #[test]
    fn test_fill_status_bands() {
        assert_eq!(FillStatus::from_rate(95.0), FillStatus::Good);
        assert_eq!(FillStatus::from_rate(90.0), FillStatus::Good);
        assert_eq!(FillStatus::from_rate(75.0), FillStatus::Fair);
        assert_eq!(FillStatus::from_rate(55.0), FillStatus::Poor);
        assert_eq!(FillStatus::from_rate(10.0), FillStatus::Bad);
    }

    #[test]
    fn test_grade_bands() {
        assert_eq!(Grade::from_score(95.0), Grade::Excellent);
        assert_eq!(Grade::from_score(85.0), Grade::Great);
        assert_eq!(Grade::from_score(75.0), Grade::Good);
        assert_eq!(Grade::from_score(65.0), Grade::Fair);
        assert_eq!(Grade::from_score(30.0), Grade::NeedsWork);
    }

    #[test]
    fn test_perfect_catalog_scores_high() {
        let catalog = Catalog::with_rows(vec![full_row("a"), full_row("b")]);
        let report = QualityReport::analyze(&catalog);
        // Content is identical across rows, so uniqueness drags the mean
        assert_eq!(report.score.dimensions.len(), 3);
        assert!(report.score.dimensions[0].1 > 99.0); // completeness
        assert_eq!(report.score.dimensions[1].1, 50.0); // uniqueness
        assert_eq!(report.score.dimensions[2].1, 100.0); // validity
        assert!(report.missing.is_empty());
    }

    #[test]
    fn test_missing_fields_report_rows() {
        let catalog = Catalog::with_rows(vec![
            full_row("a"),
            Snippet::new("", "content"),
            Snippet::new("c", ""),
        ]);
        let report = QualityReport::analyze(&catalog);
        let name_entry = report
            .missing
            .iter()
            .find(|m| m.field == COL_NAME)
            .unwrap();
        assert_eq!(name_entry.count, 1);
        assert_eq!(name_entry.rows, vec![3]);
        let content_entry = report
            .missing
            .iter()
            .find(|m| m.field == COL_CONTENT)
            .unwrap();
        assert_eq!(content_entry.rows, vec![4]);
    }

    #[test]
    fn test_categorized_dimension_needs_column() {
        let mut catalog = Catalog::with_rows(vec![full_row("a")]);
        let without = quality_score(&catalog);
        assert!(without.dimensions.iter().all(|(n, _)| n != "Categorized"));

        catalog.ensure_category_columns();
        catalog.rows[0].main_category = "Text Formatting".to_string();
        let with = quality_score(&catalog);
        let cat = with
            .dimensions
            .iter()
            .find(|(n, _)| n == "Categorized")
            .unwrap();
        assert_eq!(cat.1, 100.0);
    }

    #[test]
    fn test_recommendations_for_sparse_catalog() {
        let catalog = Catalog::with_rows(vec![Snippet::new("a", "b"), Snippet::new("c", "d")]);
        let recs = recommendations(&catalog);
        // Missing descriptions, tags (100% -> High), language, and no category column
        assert_eq!(recs.len(), 4);
        assert!(recs.iter().all(|r| r.priority != Priority::Low));
        assert!(recs
            .iter()
            .any(|r| r.issue.contains("MainCategory column not yet added")));
    }

    #[test]
    fn test_empty_catalog_scores_zero() {
        let report = QualityReport::analyze(&Catalog::new());
        assert_eq!(report.score.overall, 0.0);
        assert_eq!(report.score.grade, Grade::NeedsWork);
        assert!(report.recommendations.is_empty());
    }
}
