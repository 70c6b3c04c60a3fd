use super::snippet::{Snippet, CATEGORY_COLUMNS, CORE_COLUMNS};

/// A loaded snippet catalog: ordered rows plus the column order they
/// arrived with, so writes round-trip the original layout
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub rows: Vec<Snippet>,
    pub headers: Vec<String>,
}

impl Catalog {
    /// An empty catalog with the standard column set
    pub fn new() -> Self {
        Catalog {
            rows: Vec::new(),
            headers: CORE_COLUMNS.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn with_rows(rows: Vec<Snippet>) -> Self {
        let mut catalog = Catalog::new();
        catalog.rows = rows;
        catalog
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h == name)
    }

    /// Spreadsheet row number for a data row index (1-based, after the
    /// header row)
    pub fn row_number(index: usize) -> usize {
        index + 2
    }

    /// Append MainCategory/Subcategory headers when absent, in that order
    pub fn ensure_category_columns(&mut self) {
        for col in CATEGORY_COLUMNS {
            if !self.has_column(col) {
                self.headers.push(col.to_string());
            }
        }
    }

    /// Count of rows with a non-empty value in the given column
    pub fn filled_count(&self, column: &str) -> usize {
        self.rows
            .iter()
            .filter(|r| r.get(column).is_some_and(|v| !v.is_empty()))
            .count()
    }

    /// Fraction of rows with a non-empty value in the given column,
    /// as a percentage. Empty catalogs score 0.
    pub fn fill_rate(&self, column: &str) -> f64 {
        if self.rows.is_empty() {
            return 0.0;
        }
        self.filled_count(column) as f64 / self.rows.len() as f64 * 100.0
    }

    /// Indices of rows with an assigned category
    pub fn categorized_indices(&self) -> Vec<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_categorized())
            .map(|(i, _)| i)
            .collect()
    }

    /// Indices of rows still waiting for a category
    pub fn uncategorized_indices(&self) -> Vec<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, r)| !r.is_categorized())
            .map(|(i, _)| i)
            .collect()
    }

    /// Distinct content values
    pub fn unique_content_count(&self) -> usize {
        let mut seen = std::collections::HashSet::new();
        self.rows.iter().filter(|r| seen.insert(&r.content)).count()
    }

    /// Distinct snippet names
    pub fn unique_name_count(&self) -> usize {
        let mut seen = std::collections::HashSet::new();
        self.rows.iter().filter(|r| seen.insert(&r.name)).count()
    }
}
