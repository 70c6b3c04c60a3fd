use std::fmt;

/// Sentinel for rows no tool has categorized yet
pub const UNCATEGORIZED: &str = "Uncategorized";
/// Sentinel for rows scored below the confidence threshold
pub const NEEDS_REVIEW: &str = "Needs Review";

/// A main category and its fixed subcategories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryGroup {
    pub name: &'static str,
    pub subcategories: &'static [&'static str],
}

/// The catalog's category scheme: 10 main categories with fixed subcategories
pub const CATEGORY_SCHEME: [CategoryGroup; 10] = [
    CategoryGroup {
        name: "Text Formatting",
        subcategories: &["Strikethrough", "Underline", "Bold", "Italic", "Mixed Styles"],
    },
    CategoryGroup {
        name: "Symbols & Special Characters",
        subcategories: &[
            "Arrows",
            "Mathematical",
            "Currency",
            "Punctuation",
            "Technical",
            "Miscellaneous Symbols",
        ],
    },
    CategoryGroup {
        name: "Emojis & Emoticons",
        subcategories: &[
            "Smileys & People",
            "Animals & Nature",
            "Food & Drink",
            "Activities",
            "Travel & Places",
            "Objects",
            "Symbols",
            "Flags",
            "Kaomoji",
            "ASCII Art",
        ],
    },
    CategoryGroup {
        name: "Dates & Time",
        subcategories: &[
            "Months (English)",
            "Months (Spanish)",
            "Days of Week",
            "Time Formats",
            "Date Patterns",
            "Seasons",
            "Holidays",
        ],
    },
    CategoryGroup {
        name: "Numbers & Counting",
        subcategories: &[
            "Cardinal Numbers",
            "Ordinal Numbers",
            "Roman Numerals",
            "Fractions",
            "Number Blocks",
            "Counters",
        ],
    },
    CategoryGroup {
        name: "Communication & Greetings",
        subcategories: &[
            "Greetings",
            "Farewells",
            "Common Phrases",
            "Email Templates",
            "Social Media",
        ],
    },
    CategoryGroup {
        name: "Contact & Personal Info",
        subcategories: &[
            "Email Addresses",
            "Phone Numbers",
            "Addresses",
            "Signatures",
            "URLs",
        ],
    },
    CategoryGroup {
        name: "Decorative Elements",
        subcategories: &[
            "Borders",
            "Dividers",
            "Bullets",
            "Stars & Sparkles",
            "Hearts",
            "Flowers",
        ],
    },
    CategoryGroup {
        name: "Color Indicators",
        subcategories: &["Color Blocks", "Colored Circles", "Gradients", "Rainbow"],
    },
    CategoryGroup {
        name: "Status & Labels",
        subcategories: &[
            "Priority Markers",
            "Status Icons",
            "Checkboxes",
            "Tags",
            "Badges",
        ],
    },
];

/// Names of all main categories, in scheme order
pub fn main_category_names() -> Vec<&'static str> {
    CATEGORY_SCHEME.iter().map(|g| g.name).collect()
}

/// Look up a main category's subcategories
pub fn subcategories_of(main: &str) -> Option<&'static [&'static str]> {
    CATEGORY_SCHEME
        .iter()
        .find(|g| g.name == main)
        .map(|g| g.subcategories)
}

/// True when the label is one of the scheme's main categories
pub fn is_known_main_category(label: &str) -> bool {
    CATEGORY_SCHEME.iter().any(|g| g.name == label)
}

impl fmt::Display for CategoryGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} subcategories)",
            self.name,
            self.subcategories.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_shape() {
        assert_eq!(CATEGORY_SCHEME.len(), 10);
        let total: usize = CATEGORY_SCHEME.iter().map(|g| g.subcategories.len()).sum();
        assert_eq!(total, 59);
    }

    #[test]
    fn test_subcategory_lookup() {
        let subs = subcategories_of("Dates & Time").unwrap();
        assert!(subs.contains(&"Months (Spanish)"));
        assert!(subcategories_of("Nonexistent").is_none());
    }

    #[test]
    fn test_known_main_category() {
        assert!(is_known_main_category("Text Formatting"));
        assert!(!is_known_main_category(NEEDS_REVIEW));
    }
}
