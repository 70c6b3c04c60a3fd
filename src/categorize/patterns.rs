//! Rule-based category detection
//!
//! A priority-ordered table of Unicode-range and keyword patterns. The first
//! matching rule wins; rules carry a fixed confidence reflecting how
//! distinctive the pattern is. Falls back to a low-confidence Status & Labels
//! suggestion that downstream tooling treats as "review me".

use super::Suggestion;
use lazy_static::lazy_static;
use regex::Regex;

struct Rule {
    main: &'static str,
    sub: &'static str,
    confidence: f32,
    pattern: Regex,
}

impl Rule {
    fn new(main: &'static str, sub: &'static str, confidence: f32, pattern: &str) -> Self {
        Rule {
            main,
            sub,
            confidence,
            // Table patterns are fixed strings; a bad one is a programmer error
            pattern: Regex::new(pattern).expect("invalid rule pattern"),
        }
    }
}

lazy_static! {
    /// Content rules in priority order: emoji, kaomoji, dates, numbers,
    /// symbols, then decorative font ranges
    static ref CONTENT_RULES: Vec<Rule> = build_content_rules();
}

fn build_content_rules() -> Vec<Rule> {
    let emojis = "Emojis & Emoticons";
    let dates = "Dates & Time";
    let numbers = "Numbers & Counting";
    let symbols = "Symbols & Special Characters";
    let decorative = "Decorative Elements";
    let formatting = "Text Formatting";

    vec![
        // Emoji blocks by subcategory
        Rule::new(emojis, "Smileys & People", 0.90, "[\u{1F600}-\u{1F64F}\u{1F466}-\u{1F469}]"),
        Rule::new(emojis, "Animals & Nature", 0.90, "[\u{1F400}-\u{1F4FF}\u{1F980}-\u{1F9FF}]"),
        Rule::new(emojis, "Food & Drink", 0.90, "[\u{1F32D}-\u{1F37F}]"),
        Rule::new(emojis, "Activities", 0.90, "[\u{1F3A0}-\u{1F3FF}]"),
        Rule::new(emojis, "Travel & Places", 0.90, "[\u{1F680}-\u{1F6FF}]"),
        Rule::new(emojis, "Objects", 0.90, "[\u{1F4A0}-\u{1F4FF}]"),
        Rule::new(emojis, "Symbols", 0.90, "[\u{2702}-\u{27B0}]"),
        Rule::new(emojis, "Flags", 0.90, "[\u{1F1E0}-\u{1F1FF}]"),
        // Kaomoji: famous faces, table flips, symbol faces, short
        // parentheticals with at least one non-ASCII char
        Rule::new(emojis, "Kaomoji", 0.85, r"ಠ_ಠ|ʕ•ᴥ•ʔ|¯\\_\(ツ\)_/¯"),
        Rule::new(emojis, "Kaomoji", 0.85, r"\(╯°□°\)╯"),
        Rule::new(
            emojis,
            "Kaomoji",
            0.85,
            "\\([^)]*[\u{3040}-\u{30FF}\u{4E00}-\u{9FFF}\u{0E00}-\u{0E7F}\u{0300}-\u{036F}][^)]*\\)",
        ),
        Rule::new(
            emojis,
            "Kaomoji",
            0.85,
            "\\([◕◉●○◎★☆♥♡♠♣♦◆■□▲△▼▽][_\\-\\^oO0.\u{3000}‿]+[◕◉●○◎★☆♥♡♠♣♦◆■□▲△▼▽]\\)",
        ),
        Rule::new(emojis, "Kaomoji", 0.85, "[(（][^()（）]{0,7}[^\\x00-\\x7F][^()（）]{0,7}[)）]"),
        Rule::new(emojis, "Kaomoji", 0.85, r"[\^_~-][_oO.]\S{0,3}[\^_~-]"),
        Rule::new(emojis, "Kaomoji", 0.85, "[>＞][_.\\-][<＜]"),
        // Dates and times
        Rule::new(
            dates,
            "Months (English)",
            0.85,
            r"(?i)\b(january|february|march|april|may|june|july|august|september|october|november|december)\b",
        ),
        Rule::new(
            dates,
            "Months (Spanish)",
            0.85,
            r"(?i)\b(enero|febrero|marzo|abril|mayo|junio|julio|agosto|septiembre|octubre|noviembre|diciembre)\b",
        ),
        Rule::new(
            dates,
            "Days of Week",
            0.85,
            r"(?i)\b(monday|tuesday|wednesday|thursday|friday|saturday|sunday|lunes|martes|miércoles|jueves|viernes|sábado|domingo)\b",
        ),
        Rule::new(dates, "Date Patterns", 0.85, r"\d{1,2}[/\-.]\d{1,2}([/\-.]\d{2,4})?"),
        Rule::new(dates, "Time Formats", 0.85, r"\d{1,2}:\d{2}(\s?[AaPp][Mm])?"),
        // Numbers
        Rule::new(numbers, "Number Blocks", 0.80, "[0-9][\u{20E3}\u{FE0F}]"),
        Rule::new(numbers, "Roman Numerals", 0.80, r"\b[IVXLCDM]{2,}\b"),
        Rule::new(numbers, "Ordinal Numbers", 0.80, r"(?i)\b\d+(st|nd|rd|th)\b"),
        Rule::new(numbers, "Fractions", 0.80, "[½¼¾⅓⅔⅕⅖⅗⅘⅙⅚⅛⅜⅝⅞]"),
        // Symbol classes
        Rule::new(symbols, "Arrows", 0.80, "[←→↑↓↔↕↖↗↘↙⇐⇒⇑⇓⇔⇕➔➜➡➢➣➤]"),
        Rule::new(symbols, "Mathematical", 0.80, "[±×÷≠≈≤≥∞∑∏√∫∂∇∈∉∪∩⊂⊃⊆⊇∧∨¬∀∃]"),
        Rule::new(symbols, "Currency", 0.80, "[$€£¥₹₽₿¢₩₪]"),
        Rule::new(decorative, "Stars & Sparkles", 0.80, "[★☆✦✧✨✩✪✫✬✭✮✯⭐🌟💫]"),
        Rule::new(decorative, "Hearts", 0.80, "[♥♡❤❥❦❧💕💖💗💘💙💚💛💜🖤🤍🤎💝💞💟❣]"),
        // Mathematical-alphanumeric font blocks used for styled text
        Rule::new(formatting, "Bold", 0.85, "[\u{1D400}-\u{1D433}]"),
        Rule::new(formatting, "Italic", 0.85, "[\u{1D434}-\u{1D467}]"),
        Rule::new(formatting, "Script", 0.85, "[\u{1D49C}-\u{1D4CF}]"),
        Rule::new(formatting, "Fraktur", 0.85, "[\u{1D504}-\u{1D537}]"),
        Rule::new(formatting, "Double-Struck", 0.85, "[\u{1D538}-\u{1D56B}]"),
        Rule::new(formatting, "Monospace", 0.85, "[\u{1D670}-\u{1D6A3}]"),
    ]
}

/// Keyword hints looked up in the (lowercased) description, tried in order
const DESCRIPTION_RULES: [(&str, &str, &str, f32); 12] = [
    ("greeting", "Communication & Greetings", "Greetings", 0.70),
    ("email", "Contact & Personal Info", "Email Addresses", 0.70),
    ("signature", "Contact & Personal Info", "Signatures", 0.70),
    ("border", "Decorative Elements", "Borders", 0.70),
    ("divider", "Decorative Elements", "Dividers", 0.70),
    ("date", "Dates & Time", "Date Patterns", 0.60),
    ("month", "Dates & Time", "Months (English)", 0.60),
    ("number", "Numbers & Counting", "Cardinal Numbers", 0.60),
    ("symbol", "Symbols & Special Characters", "Miscellaneous Symbols", 0.60),
    ("zodiac", "Symbols & Special Characters", "Miscellaneous Symbols", 0.70),
    ("kaomoji", "Emojis & Emoticons", "Kaomoji", 0.80),
    ("emoticon", "Emojis & Emoticons", "Kaomoji", 0.70),
];

/// Suggest a category for a snippet's content and description
pub fn suggest(content: &str, description: &str) -> Suggestion {
    for rule in CONTENT_RULES.iter() {
        if rule.pattern.is_match(content) {
            return Suggestion::new(rule.main, rule.sub, rule.confidence);
        }
    }

    let desc_lower = description.to_lowercase();
    if !desc_lower.is_empty() {
        for (keyword, main, sub, confidence) in DESCRIPTION_RULES {
            if desc_lower.contains(keyword) {
                return Suggestion::new(main, sub, confidence);
            }
        }
    }

    // Nothing matched: park it under a generic label at review confidence
    Suggestion::new("Status & Labels", "Tags", 0.30)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn main_and_sub(content: &str, description: &str) -> (String, String) {
        let s = suggest(content, description);
        (s.main, s.sub)
    }

    #[test]
    fn test_emoji_detection() {
        assert_eq!(
            main_and_sub("😀", ""),
            ("Emojis & Emoticons".into(), "Smileys & People".into())
        );
        assert_eq!(
            main_and_sub("🦀 crab", ""),
            ("Emojis & Emoticons".into(), "Animals & Nature".into())
        );
        assert_eq!(
            main_and_sub("🚀", ""),
            ("Emojis & Emoticons".into(), "Travel & Places".into())
        );
    }

    #[test]
    fn test_kaomoji_detection() {
        assert_eq!(main_and_sub("(◕‿◕)", "").1, "Kaomoji");
        assert_eq!(main_and_sub("ಠ_ಠ", "").1, "Kaomoji");
        assert_eq!(main_and_sub("^_^", "").1, "Kaomoji");
        assert_eq!(main_and_sub(">_<", "").1, "Kaomoji");
    }

    #[test]
    fn test_date_detection() {
        assert_eq!(
            main_and_sub("January", ""),
            ("Dates & Time".into(), "Months (English)".into())
        );
        assert_eq!(main_and_sub("miércoles", "").1, "Days of Week");
        assert_eq!(main_and_sub("12/25/2024", "").1, "Date Patterns");
        assert_eq!(main_and_sub("3:30 PM", "").1, "Time Formats");
    }

    #[test]
    fn test_number_detection() {
        assert_eq!(main_and_sub("XIV", "").1, "Roman Numerals");
        assert_eq!(main_and_sub("2nd place", "").1, "Ordinal Numbers");
        assert_eq!(main_and_sub("½ cup", "").1, "Fractions");
    }

    #[test]
    fn test_symbol_detection() {
        assert_eq!(
            main_and_sub("→", ""),
            ("Symbols & Special Characters".into(), "Arrows".into())
        );
        assert_eq!(main_and_sub("≤", "").1, "Mathematical");
        assert_eq!(main_and_sub("€", "").1, "Currency");
        assert_eq!(
            main_and_sub("★★★", ""),
            ("Decorative Elements".into(), "Stars & Sparkles".into())
        );
    }

    #[test]
    fn test_styled_font_detection() {
        // "𝐇𝐞𝐥𝐥𝐨" in mathematical bold
        assert_eq!(
            main_and_sub("\u{1D407}\u{1D41E}\u{1D425}\u{1D425}\u{1D428}", ""),
            ("Text Formatting".into(), "Bold".into())
        );
        // Double-struck 𝕳 is a Fraktur-bold letter
        assert_eq!(main_and_sub("\u{1D546}", "").0, "Text Formatting");
    }

    #[test]
    fn test_description_keywords() {
        assert_eq!(
            main_and_sub("Hello World", "a friendly greeting"),
            ("Communication & Greetings".into(), "Greetings".into())
        );
        assert_eq!(main_and_sub("foo", "zodiac sign").1, "Miscellaneous Symbols");
    }

    #[test]
    fn test_content_beats_description() {
        // Content pattern wins even when the description also matches
        assert_eq!(main_and_sub("😀", "greeting").1, "Smileys & People");
    }

    #[test]
    fn test_fallback_needs_review() {
        let s = suggest("plain text", "");
        assert_eq!(s.main, "Status & Labels");
        assert_eq!(s.sub, "Tags");
        assert!(s.needs_review());
        assert!(suggest("", "").needs_review());
    }

    #[test]
    fn test_confidence_ordering() {
        assert!(suggest("😀", "").confidence > suggest("XIV", "").confidence);
    }
}
