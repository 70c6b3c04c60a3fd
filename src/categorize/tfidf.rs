//! TF-IDF + cosine-similarity categorization
//!
//! Scores a snippet's text against a set of category labels. The corpus for
//! each call is the combined input plus every label, so scores are relative
//! to the label vocabulary rather than a pre-trained model.

use crate::error::{Result, SnippetError};
use crate::model::{NEEDS_REVIEW, UNCATEGORIZED};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Best match below this becomes a "Needs Review" answer
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.15;
/// Vocabulary cap when scoring against labels
pub const DEFAULT_MAX_FEATURES: usize = 500;
/// How many runner-up categories a match keeps
const ALTERNATIVE_COUNT: usize = 3;

/// Words too common to carry any signal
const STOP_WORDS: [&str; 88] = [
    "a", "about", "above", "after", "again", "all", "also", "an", "and", "any", "are", "as", "at",
    "be", "because", "been", "before", "being", "below", "between", "both", "but", "by", "can",
    "did", "do", "does", "down", "during", "each", "few", "for", "from", "further", "had", "has",
    "have", "having", "he", "her", "here", "him", "his", "how", "if", "in", "into", "is", "it",
    "its", "just", "me", "more", "most", "my", "no", "nor", "not", "now", "of", "off", "on",
    "once", "only", "or", "other", "our", "out", "over", "own", "same", "she", "should", "so",
    "some", "such", "than", "that", "the", "their", "them", "then", "there", "these", "they",
    "this", "those", "to",
];

/// Lowercased word tokens of two or more chars, stop words removed
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= 2)
        .map(str::to_lowercase)
        .filter(|w| !STOP_WORDS.contains(&w.as_str()))
        .collect()
}

/// Unigrams plus adjacent bigrams ("dates time")
pub fn terms(text: &str) -> Vec<String> {
    let tokens = tokenize(text);
    let mut terms = tokens.clone();
    for pair in tokens.windows(2) {
        terms.push(format!("{} {}", pair[0], pair[1]));
    }
    terms
}

/// A fitted TF-IDF weighting over a small corpus
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    vocab: HashMap<String, usize>,
    idf: Vec<f32>,
}

impl TfidfVectorizer {
    /// Fit on tokenized documents, keeping the most frequent terms when the
    /// vocabulary exceeds `max_features`
    pub fn fit(documents: &[Vec<String>], max_features: usize) -> Self {
        let mut doc_freq: HashMap<&str, usize> = HashMap::new();
        for doc in documents {
            let mut seen: Vec<&str> = doc.iter().map(String::as_str).collect();
            seen.sort_unstable();
            seen.dedup();
            for term in seen {
                *doc_freq.entry(term).or_insert(0) += 1;
            }
        }

        let mut ranked: Vec<(&str, usize)> = doc_freq.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(max_features);

        let n_docs = documents.len() as f32;
        let mut vocab = HashMap::with_capacity(ranked.len());
        let mut idf = Vec::with_capacity(ranked.len());
        for (i, (term, df)) in ranked.into_iter().enumerate() {
            vocab.insert(term.to_string(), i);
            // Smoothed idf, never zero so every known term counts a little
            idf.push(((1.0 + n_docs) / (1.0 + df as f32)).ln() + 1.0);
        }

        TfidfVectorizer { vocab, idf }
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocab.len()
    }

    /// Raw term counts over the fitted vocabulary
    pub fn count_vector(&self, terms: &[String]) -> Vec<f32> {
        let mut counts = vec![0.0; self.vocab.len()];
        for term in terms {
            if let Some(&i) = self.vocab.get(term) {
                counts[i] += 1.0;
            }
        }
        counts
    }

    /// L2-normalized tf-idf vector
    pub fn transform(&self, terms: &[String]) -> Vec<f32> {
        let mut vector = self.count_vector(terms);
        for (i, value) in vector.iter_mut().enumerate() {
            *value *= self.idf[i];
        }
        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut vector {
                *value /= norm;
            }
        }
        vector
    }
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|v| v * v).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// A runner-up category and its score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alternative {
    pub category: String,
    pub confidence: f32,
}

/// The categorizer's answer for one input
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatch {
    pub category: String,
    pub confidence: f32,
    pub alternatives: Vec<Alternative>,
}

/// Scores free text against a fixed set of category labels
#[derive(Debug, Clone)]
pub struct SimilarityCategorizer {
    categories: Vec<String>,
    threshold: f32,
    max_features: usize,
}

impl SimilarityCategorizer {
    pub fn new(categories: Vec<String>) -> Result<Self> {
        let categories: Vec<String> = categories
            .into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();
        if categories.is_empty() {
            return Err(SnippetError::Categorize("no categories provided".into()));
        }
        Ok(SimilarityCategorizer {
            categories,
            threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            max_features: DEFAULT_MAX_FEATURES,
        })
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Categorize text (plus an optional description) against the labels
    pub fn categorize(&self, text: &str, description: &str) -> SimilarityMatch {
        let combined = format!("{} {}", text, description);
        let combined = combined.trim();
        if combined.is_empty() {
            return SimilarityMatch {
                category: UNCATEGORIZED.to_string(),
                confidence: 0.0,
                alternatives: Vec::new(),
            };
        }

        // Corpus: the input document plus one document per label
        let mut documents = Vec::with_capacity(self.categories.len() + 1);
        documents.push(terms(combined));
        for category in &self.categories {
            documents.push(terms(category));
        }

        let vectorizer = TfidfVectorizer::fit(&documents, self.max_features);
        let input_vector = vectorizer.transform(&documents[0]);

        let mut scored: Vec<Alternative> = self
            .categories
            .iter()
            .zip(&documents[1..])
            .map(|(category, doc)| Alternative {
                category: category.clone(),
                confidence: cosine_similarity(&input_vector, &vectorizer.transform(doc)),
            })
            .filter(|alt| alt.confidence > 0.0)
            .collect();
        scored.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(ALTERNATIVE_COUNT);

        if scored.is_empty() {
            return SimilarityMatch {
                category: NEEDS_REVIEW.to_string(),
                confidence: 0.0,
                alternatives: Vec::new(),
            };
        }

        let best = scored[0].clone();
        if best.confidence < self.threshold {
            return SimilarityMatch {
                category: NEEDS_REVIEW.to_string(),
                confidence: best.confidence,
                alternatives: scored,
            };
        }

        SimilarityMatch {
            category: best.category,
            confidence: best.confidence,
            alternatives: scored.into_iter().skip(1).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> Vec<String> {
        vec![
            "Dates & Time".to_string(),
            "Communication & Greetings".to_string(),
            "Contact & Personal Info".to_string(),
        ]
    }

    #[test]
    fn test_tokenize_drops_stop_words_and_short_tokens() {
        assert_eq!(
            tokenize("The quick brown fox, a fox!"),
            vec!["quick", "brown", "fox", "fox"]
        );
        assert!(tokenize("a of to").is_empty());
    }

    #[test]
    fn test_terms_include_bigrams() {
        let t = terms("dates and time");
        assert!(t.contains(&"dates".to_string()));
        assert!(t.contains(&"dates time".to_string()));
    }

    #[test]
    fn test_vectorizer_caps_vocabulary() {
        let docs = vec![terms("alpha beta gamma"), terms("alpha delta epsilon")];
        let vectorizer = TfidfVectorizer::fit(&docs, 3);
        assert_eq!(vectorizer.vocabulary_len(), 3);
    }

    #[test]
    fn test_cosine_similarity_bounds() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert!((cosine_similarity(&[1.0, 2.0], &[1.0, 2.0]) - 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn test_rejects_empty_category_list() {
        assert!(SimilarityCategorizer::new(vec![]).is_err());
        assert!(SimilarityCategorizer::new(vec!["  ".to_string()]).is_err());
    }

    #[test]
    fn test_matches_obvious_label() {
        let categorizer = SimilarityCategorizer::new(labels()).unwrap();
        let result = categorizer.categorize("meeting dates and time slots", "");
        assert_eq!(result.category, "Dates & Time");
        assert!(result.confidence > 0.15);
        assert!(result.alternatives.len() <= 2);
    }

    #[test]
    fn test_description_contributes() {
        let categorizer = SimilarityCategorizer::new(labels()).unwrap();
        let result = categorizer.categorize("hw", "greetings and communication phrases");
        assert_eq!(result.category, "Communication & Greetings");
    }

    #[test]
    fn test_empty_input_is_uncategorized() {
        let categorizer = SimilarityCategorizer::new(labels()).unwrap();
        let result = categorizer.categorize("", "  ");
        assert_eq!(result.category, UNCATEGORIZED);
        assert_eq!(result.confidence, 0.0);
        assert!(result.alternatives.is_empty());
    }

    #[test]
    fn test_no_overlap_needs_review() {
        let categorizer = SimilarityCategorizer::new(labels()).unwrap();
        let result = categorizer.categorize("zzzz qqqq xxxx", "");
        assert_eq!(result.category, NEEDS_REVIEW);
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn test_threshold_forces_review() {
        let categorizer = SimilarityCategorizer::new(labels())
            .unwrap()
            .with_threshold(0.99);
        let result = categorizer.categorize("meeting dates and time slots", "");
        assert_eq!(result.category, NEEDS_REVIEW);
        assert!(result.confidence > 0.0);
        assert!(!result.alternatives.is_empty());
    }

    #[test]
    fn test_deterministic() {
        let categorizer = SimilarityCategorizer::new(labels()).unwrap();
        let a = categorizer.categorize("january schedule", "");
        let b = categorizer.categorize("january schedule", "");
        assert_eq!(a, b);
    }
}
