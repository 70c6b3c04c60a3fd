//! Category suggestion engines
//!
//! Three ways to label a snippet, in increasing order of sophistication:
//! pattern rules over the content, TF-IDF similarity against category
//! labels, and a Naive Bayes model trained on already-categorized rows.

pub mod bayes;
pub mod patterns;
pub mod tfidf;

pub use bayes::{BayesCategorizer, BayesConfig, TrainingSummary};
pub use patterns::suggest as suggest_by_rules;
pub use tfidf::{SimilarityCategorizer, SimilarityMatch};

/// Suggestions scoring below this need a human look
pub const REVIEW_CONFIDENCE: f32 = 0.5;

/// A main/sub category pair with the engine's confidence in it
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub main: String,
    pub sub: String,
    pub confidence: f32,
}

impl Suggestion {
    pub fn new(main: &str, sub: &str, confidence: f32) -> Self {
        Suggestion {
            main: main.to_string(),
            sub: sub.to_string(),
            confidence,
        }
    }

    pub fn needs_review(&self) -> bool {
        self.confidence < REVIEW_CONFIDENCE
    }
}
