use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::category::UNCATEGORIZED;

/// Column header for the snippet trigger name
pub const COL_NAME: &str = "Snippet Name";
/// Column header for the expansion text
pub const COL_CONTENT: &str = "Content";
pub const COL_APPLICATION: &str = "Application";
pub const COL_DESCRIPTION: &str = "Description";
pub const COL_LANGUAGE: &str = "Language";
pub const COL_TAGS: &str = "Tags";
pub const COL_MAIN_CATEGORY: &str = "MainCategory";
pub const COL_SUBCATEGORY: &str = "Subcategory";

/// The core catalog columns every export carries
pub const CORE_COLUMNS: [&str; 6] = [
    COL_NAME,
    COL_CONTENT,
    COL_APPLICATION,
    COL_DESCRIPTION,
    COL_LANGUAGE,
    COL_TAGS,
];

/// Columns added by the categorization tools
pub const CATEGORY_COLUMNS: [&str; 2] = [COL_MAIN_CATEGORY, COL_SUBCATEGORY];

/// One row of the snippet catalog
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snippet {
    #[serde(rename = "Snippet Name", default)]
    pub name: String,
    #[serde(rename = "Content", default)]
    pub content: String,
    #[serde(rename = "Application", default)]
    pub application: String,
    #[serde(rename = "Description", default)]
    pub description: String,
    #[serde(rename = "Language", default)]
    pub language: String,
    #[serde(rename = "Tags", default)]
    pub tags: String,
    #[serde(rename = "MainCategory", default)]
    pub main_category: String,
    #[serde(rename = "Subcategory", default)]
    pub subcategory: String,

    /// Any catalog columns beyond the known set, preserved verbatim
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl Snippet {
    pub fn new(name: &str, content: &str) -> Self {
        Snippet {
            name: name.to_string(),
            content: content.to_string(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn with_language(mut self, language: &str) -> Self {
        self.language = language.to_string();
        self
    }

    pub fn with_tags(mut self, tags: &str) -> Self {
        self.tags = tags.to_string();
        self
    }

    pub fn with_category(mut self, main: &str, sub: &str) -> Self {
        self.main_category = main.to_string();
        self.subcategory = sub.to_string();
        self
    }

    /// Read a field by its column header
    pub fn get(&self, column: &str) -> Option<&str> {
        match column {
            COL_NAME => Some(&self.name),
            COL_CONTENT => Some(&self.content),
            COL_APPLICATION => Some(&self.application),
            COL_DESCRIPTION => Some(&self.description),
            COL_LANGUAGE => Some(&self.language),
            COL_TAGS => Some(&self.tags),
            COL_MAIN_CATEGORY => Some(&self.main_category),
            COL_SUBCATEGORY => Some(&self.subcategory),
            _ => self.extra.get(column).map(String::as_str),
        }
    }

    /// Write a field by its column header
    pub fn set(&mut self, column: &str, value: &str) {
        match column {
            COL_NAME => self.name = value.to_string(),
            COL_CONTENT => self.content = value.to_string(),
            COL_APPLICATION => self.application = value.to_string(),
            COL_DESCRIPTION => self.description = value.to_string(),
            COL_LANGUAGE => self.language = value.to_string(),
            COL_TAGS => self.tags = value.to_string(),
            COL_MAIN_CATEGORY => self.main_category = value.to_string(),
            COL_SUBCATEGORY => self.subcategory = value.to_string(),
            _ => {
                self.extra.insert(column.to_string(), value.to_string());
            }
        }
    }

    /// Content + name + description + tags, the feature text used by the
    /// learned categorizer
    pub fn combined_text(&self) -> String {
        let mut text = String::new();
        for part in [&self.content, &self.name, &self.description, &self.tags] {
            if !part.is_empty() {
                if !text.is_empty() {
                    text.push(' ');
                }
                text.push_str(part);
            }
        }
        text
    }

    /// Tags split on commas, trimmed, empties removed
    pub fn tag_list(&self) -> Vec<&str> {
        self.tags
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect()
    }

    pub fn content_chars(&self) -> usize {
        self.content.chars().count()
    }

    /// True when a real category has been assigned
    pub fn is_categorized(&self) -> bool {
        !self.main_category.is_empty() && self.main_category != UNCATEGORIZED
    }

    /// Content truncated for display
    pub fn content_preview(&self, max_chars: usize) -> String {
        truncate_chars(&self.content, max_chars)
    }
}

impl fmt::Display for Snippet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.name, self.content_preview(40))
    }
}

/// Truncate on a char boundary, appending "..." when anything was cut
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let cut: String = s.chars().take(max_chars).collect();
    format!("{}...", cut)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set_known_columns() {
        let mut snippet = Snippet::new("brb", "be right back");
        snippet.set(COL_LANGUAGE, "English");
        assert_eq!(snippet.get(COL_NAME), Some("brb"));
        assert_eq!(snippet.get(COL_CONTENT), Some("be right back"));
        assert_eq!(snippet.get(COL_LANGUAGE), Some("English"));
        assert_eq!(snippet.get(COL_MAIN_CATEGORY), Some(""));
    }

    #[test]
    fn test_get_set_extra_column() {
        let mut snippet = Snippet::new("sig", "Best regards");
        snippet.set("Platform", "macOS");
        assert_eq!(snippet.get("Platform"), Some("macOS"));
        assert_eq!(snippet.get("Unknown"), None);
    }

    #[test]
    fn test_combined_text_skips_empty_fields() {
        let snippet = Snippet::new("hi", "hello there").with_tags("greeting, casual");
        assert_eq!(snippet.combined_text(), "hello there hi greeting, casual");
    }

    #[test]
    fn test_tag_list() {
        let snippet = Snippet::new("x", "y").with_tags("one, two , ,three");
        assert_eq!(snippet.tag_list(), vec!["one", "two", "three"]);
        assert!(Snippet::new("x", "y").tag_list().is_empty());
    }

    #[test]
    fn test_is_categorized() {
        assert!(!Snippet::new("a", "b").is_categorized());
        assert!(!Snippet::new("a", "b")
            .with_category(UNCATEGORIZED, "")
            .is_categorized());
        assert!(Snippet::new("a", "b")
            .with_category("Dates & Time", "Months (English)")
            .is_categorized());
    }

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("abcdef", 3), "abc...");
        // Multi-byte chars must not be split
        assert_eq!(truncate_chars("日本語テスト", 2), "日本...");
    }
}
