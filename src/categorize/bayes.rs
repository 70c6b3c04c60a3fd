//! Multinomial Naive Bayes categorization
//!
//! Learns from the rows a human (or an earlier tool run) already
//! categorized, then predicts labels for the rest. Features are the same
//! TF-IDF terms the similarity categorizer uses; training needs a handful of
//! rows per class before a category participates.

use super::tfidf::{terms, TfidfVectorizer};
use crate::error::{Result, SnippetError};
use crate::model::{Catalog, Snippet};

#[derive(Debug, Clone, Copy)]
pub struct BayesConfig {
    /// Minimum categorized rows before training is attempted
    pub min_training_rows: usize,
    /// Classes with fewer samples are left out of the model
    pub min_samples_per_class: usize,
    /// Additive smoothing
    pub alpha: f32,
    /// Vocabulary cap for the feature space
    pub max_features: usize,
}

impl Default for BayesConfig {
    fn default() -> Self {
        BayesConfig {
            min_training_rows: 10,
            min_samples_per_class: 5,
            alpha: 0.1,
            max_features: 5000,
        }
    }
}

/// What training saw and how well the holdout went
#[derive(Debug, Clone)]
pub struct TrainingSummary {
    /// (class, sample count) for classes in the model
    pub class_counts: Vec<(String, usize)>,
    /// (class, sample count) for classes excluded as too small
    pub excluded: Vec<(String, usize)>,
    pub training_rows: usize,
    pub holdout_size: usize,
    /// Fraction of holdout rows predicted correctly, when a holdout existed
    pub holdout_accuracy: Option<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub category: String,
    pub confidence: f32,
}

/// A prediction tied back to its catalog row
#[derive(Debug, Clone)]
pub struct RowPrediction {
    pub row: usize,
    pub name: String,
    pub content_preview: String,
    pub category: String,
    pub confidence: f32,
}

/// A trained multinomial Naive Bayes model
#[derive(Debug, Clone)]
pub struct BayesCategorizer {
    vectorizer: TfidfVectorizer,
    classes: Vec<String>,
    class_log_prior: Vec<f32>,
    feature_log_prob: Vec<Vec<f32>>,
}

impl BayesCategorizer {
    /// Train on the categorized rows of a catalog
    ///
    /// Rows are split into a deterministic holdout (every 5th row) used only
    /// for the accuracy figure; the returned model is fitted on the rest.
    pub fn train(catalog: &Catalog, config: &BayesConfig) -> Result<(Self, TrainingSummary)> {
        let samples: Vec<(&Snippet, String)> = catalog
            .rows
            .iter()
            .filter(|r| r.is_categorized())
            .map(|r| (r, r.combined_text()))
            .collect();

        if samples.len() < config.min_training_rows {
            return Err(SnippetError::Training(format!(
                "need at least {} categorized rows to train, found {}",
                config.min_training_rows,
                samples.len()
            )));
        }

        // Count samples per class, in first-seen order
        let mut class_counts: Vec<(String, usize)> = Vec::new();
        for (snippet, _) in &samples {
            match class_counts
                .iter_mut()
                .find(|(c, _)| c == &snippet.main_category)
            {
                Some((_, n)) => *n += 1,
                None => class_counts.push((snippet.main_category.clone(), 1)),
            }
        }

        let (included, excluded): (Vec<(String, usize)>, Vec<(String, usize)>) = class_counts
            .into_iter()
            .partition(|(_, n)| *n >= config.min_samples_per_class);

        if included.len() < 2 {
            return Err(SnippetError::Training(format!(
                "need at least 2 categories with {}+ samples each, found {}",
                config.min_samples_per_class,
                included.len()
            )));
        }

        let usable: Vec<(&str, &str)> = samples
            .iter()
            .filter(|(s, _)| included.iter().any(|(c, _)| c == &s.main_category))
            .map(|(s, text)| (s.main_category.as_str(), text.as_str()))
            .collect();

        // Every 5th usable row becomes holdout, the rest train the model
        let mut train_set = Vec::new();
        let mut holdout = Vec::new();
        for (i, sample) in usable.iter().enumerate() {
            if i % 5 == 0 {
                holdout.push(*sample);
            } else {
                train_set.push(*sample);
            }
        }

        let model = Self::fit(&train_set, config)?;

        let holdout_accuracy = if holdout.is_empty() {
            None
        } else {
            let correct = holdout
                .iter()
                .filter(|(label, text)| model.predict(text).category == *label)
                .count();
            Some(correct as f32 / holdout.len() as f32)
        };

        let summary = TrainingSummary {
            class_counts: included,
            excluded,
            training_rows: train_set.len(),
            holdout_size: holdout.len(),
            holdout_accuracy,
        };
        log::debug!(
            "trained on {} rows, {} classes, holdout accuracy {:?}",
            summary.training_rows,
            summary.class_counts.len(),
            summary.holdout_accuracy
        );
        Ok((model, summary))
    }

    fn fit(train_set: &[(&str, &str)], config: &BayesConfig) -> Result<Self> {
        if train_set.is_empty() {
            return Err(SnippetError::Training("empty training split".into()));
        }

        let documents: Vec<Vec<String>> = train_set.iter().map(|(_, text)| terms(text)).collect();
        let vectorizer = TfidfVectorizer::fit(&documents, config.max_features);
        let n_features = vectorizer.vocabulary_len();

        let mut classes: Vec<String> = Vec::new();
        for (label, _) in train_set {
            if !classes.iter().any(|c| c == label) {
                classes.push(label.to_string());
            }
        }

        // Accumulate tf-idf mass per class and feature
        let mut feature_sums = vec![vec![0.0f32; n_features]; classes.len()];
        let mut class_rows = vec![0usize; classes.len()];
        for ((label, _), doc) in train_set.iter().zip(&documents) {
            let class = classes.iter().position(|c| c == label).unwrap();
            class_rows[class] += 1;
            for (f, value) in vectorizer.transform(doc).into_iter().enumerate() {
                feature_sums[class][f] += value;
            }
        }

        let total_rows = train_set.len() as f32;
        let class_log_prior: Vec<f32> = class_rows
            .iter()
            .map(|&n| (n as f32 / total_rows).ln())
            .collect();

        let feature_log_prob: Vec<Vec<f32>> = feature_sums
            .iter()
            .map(|sums| {
                let total: f32 = sums.iter().sum();
                let denominator = total + config.alpha * n_features as f32;
                sums.iter()
                    .map(|&s| ((s + config.alpha) / denominator).ln())
                    .collect()
            })
            .collect();

        Ok(BayesCategorizer {
            vectorizer,
            classes,
            class_log_prior,
            feature_log_prob,
        })
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Predict the class of one text, with a posterior confidence
    pub fn predict(&self, text: &str) -> Prediction {
        let features = self.vectorizer.transform(&terms(text));

        let joints: Vec<f32> = self
            .classes
            .iter()
            .enumerate()
            .map(|(c, _)| {
                let likelihood: f32 = features
                    .iter()
                    .zip(&self.feature_log_prob[c])
                    .map(|(x, lp)| x * lp)
                    .sum();
                self.class_log_prior[c] + likelihood
            })
            .collect();

        // Normalize via log-sum-exp so confidences behave like probabilities
        let max = joints.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let sum: f32 = joints.iter().map(|j| (j - max).exp()).sum();
        let best = joints
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(i, _)| i)
            .unwrap_or(0);

        Prediction {
            category: self.classes[best].clone(),
            confidence: (joints[best] - max).exp() / sum,
        }
    }

    /// Predict every uncategorized row, sorted by confidence descending
    pub fn predict_catalog(&self, catalog: &Catalog) -> Vec<RowPrediction> {
        let mut predictions: Vec<RowPrediction> = catalog
            .uncategorized_indices()
            .into_iter()
            .map(|i| {
                let row = &catalog.rows[i];
                let prediction = self.predict(&row.combined_text());
                RowPrediction {
                    row: Catalog::row_number(i),
                    name: row.name.clone(),
                    content_preview: row.content_preview(30),
                    category: prediction.category,
                    confidence: prediction.confidence,
                }
            })
            .collect();
        predictions.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        predictions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Snippet;

    fn training_catalog() -> Catalog {
        let mut rows = Vec::new();
        let months = ["january", "february", "march", "april", "may", "june"];
        for (i, month) in months.iter().enumerate() {
            rows.push(
                Snippet::new(&format!("m{}", i), &format!("{} calendar month", month))
                    .with_category("Dates & Time", "Months (English)"),
            );
        }
        let decorations = [
            "star border line",
            "sparkle divider line",
            "star sparkle row",
            "border sparkle stars",
            "line of stars",
            "divider with stars",
        ];
        for (i, deco) in decorations.iter().enumerate() {
            rows.push(
                Snippet::new(&format!("d{}", i), deco)
                    .with_category("Decorative Elements", "Borders"),
            );
        }
        // Rows awaiting prediction
        rows.push(Snippet::new("new1", "october calendar month"));
        rows.push(Snippet::new("new2", "row of sparkle stars"));
        Catalog::with_rows(rows)
    }

    #[test]
    fn test_training_summary() {
        let (_, summary) =
            BayesCategorizer::train(&training_catalog(), &BayesConfig::default()).unwrap();
        assert_eq!(summary.class_counts.len(), 2);
        assert!(summary.excluded.is_empty());
        assert_eq!(summary.training_rows + summary.holdout_size, 12);
        assert!(summary.holdout_accuracy.is_some());
    }

    #[test]
    fn test_predictions_follow_training_data() {
        let catalog = training_catalog();
        let (model, _) = BayesCategorizer::train(&catalog, &BayesConfig::default()).unwrap();

        assert_eq!(
            model.predict("december calendar month").category,
            "Dates & Time"
        );
        assert_eq!(
            model.predict("sparkle stars divider").category,
            "Decorative Elements"
        );

        let prediction = model.predict("december calendar month");
        assert!(prediction.confidence > 0.5);
        assert!(prediction.confidence <= 1.0);
    }

    #[test]
    fn test_predict_catalog_covers_uncategorized_rows() {
        let catalog = training_catalog();
        let (model, _) = BayesCategorizer::train(&catalog, &BayesConfig::default()).unwrap();
        let predictions = model.predict_catalog(&catalog);
        assert_eq!(predictions.len(), 2);
        // Sorted by confidence, both rows present
        let names: Vec<&str> = predictions.iter().map(|p| p.name.as_str()).collect();
        assert!(names.contains(&"new1"));
        assert!(names.contains(&"new2"));
        assert!(predictions[0].confidence >= predictions[1].confidence);
    }

    #[test]
    fn test_too_few_rows_is_an_error() {
        let catalog = Catalog::with_rows(vec![
            Snippet::new("a", "x").with_category("One", "s"),
            Snippet::new("b", "y").with_category("Two", "s"),
        ]);
        let result = BayesCategorizer::train(&catalog, &BayesConfig::default());
        assert!(matches!(result, Err(SnippetError::Training(_))));
    }

    #[test]
    fn test_single_class_is_an_error() {
        let rows: Vec<Snippet> = (0..12)
            .map(|i| {
                Snippet::new(&format!("s{}", i), "same thing").with_category("Only", "sub")
            })
            .collect();
        let result = BayesCategorizer::train(&Catalog::with_rows(rows), &BayesConfig::default());
        assert!(matches!(result, Err(SnippetError::Training(_))));
    }

    #[test]
    fn test_small_classes_are_excluded() {
        let mut catalog = training_catalog();
        catalog
            .rows
            .push(Snippet::new("odd", "lone sample").with_category("Tiny Class", "sub"));
        let (model, summary) =
            BayesCategorizer::train(&catalog, &BayesConfig::default()).unwrap();
        assert_eq!(summary.excluded, vec![("Tiny Class".to_string(), 1)]);
        assert!(!model.classes().iter().any(|c| c == "Tiny Class"));
    }
}
