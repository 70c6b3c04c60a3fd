//! Batch categorization over a file handshake
//!
//! The spreadsheet side drops a tasks file (available categories plus rows
//! to label); this side runs the similarity categorizer over every task and
//! writes a results file it can import back. A fatal failure still produces
//! an output file carrying the error, so the other side never waits on
//! silence.

use crate::categorize::tfidf::{Alternative, SimilarityCategorizer};
use crate::error::{Result, SnippetError};
use crate::model::truncate_chars;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Results at or above this confidence count as solid
pub const HIGH_CONFIDENCE: f32 = 0.6;
/// Results below this confidence count as weak
pub const LOW_CONFIDENCE: f32 = 0.3;

const TEXT_ECHO_CHARS: usize = 100;
const RESULT_ALTERNATIVES: usize = 2;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeInput {
    #[serde(default)]
    pub spreadsheet_name: Option<String>,
    #[serde(default)]
    pub spreadsheet_id: Option<String>,
    pub available_categories: Vec<String>,
    pub tasks: Vec<BridgeTask>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeTask {
    pub row_id: u64,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeStats {
    pub high_confidence: usize,
    pub low_confidence: usize,
    pub errors: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeResult {
    pub row_id: u64,
    pub original_text: String,
    pub suggested_category: String,
    pub confidence: f32,
    pub alternatives: Vec<Alternative>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeOutput {
    pub processed_at: String,
    pub source_spreadsheet: String,
    pub total_processed: usize,
    pub stats: BridgeStats,
    pub results: Vec<BridgeResult>,
}

/// Summary handed back to the caller for printing
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub spreadsheet_name: String,
    pub category_count: usize,
    pub total_processed: usize,
    pub high_confidence: usize,
    pub low_confidence: usize,
    pub average_confidence: f32,
}

/// Run the batch and write the results file
pub fn process_batch(input_path: &Path, output_path: &Path, threshold: f32) -> Result<BatchReport> {
    let file = std::fs::File::open(input_path).map_err(|e| {
        SnippetError::Bridge(format!("cannot open {}: {}", input_path.display(), e))
    })?;
    let input: BridgeInput = serde_json::from_reader(file)
        .map_err(|e| SnippetError::Bridge(format!("invalid tasks file: {}", e)))?;

    let categorizer =
        SimilarityCategorizer::new(input.available_categories.clone())?.with_threshold(threshold);

    let mut results = Vec::with_capacity(input.tasks.len());
    let mut high_confidence = 0;
    let mut low_confidence = 0;
    let mut confidence_sum = 0.0;

    for task in &input.tasks {
        let answer = categorizer.categorize(&task.text, &task.description);

        if answer.confidence >= HIGH_CONFIDENCE {
            high_confidence += 1;
        } else if answer.confidence < LOW_CONFIDENCE {
            low_confidence += 1;
        }
        confidence_sum += answer.confidence;

        let mut alternatives = answer.alternatives;
        alternatives.truncate(RESULT_ALTERNATIVES);
        results.push(BridgeResult {
            row_id: task.row_id,
            original_text: truncate_chars(&task.text, TEXT_ECHO_CHARS),
            suggested_category: answer.category,
            confidence: round4(answer.confidence),
            alternatives,
        });
    }

    let total_processed = results.len();
    let output = BridgeOutput {
        processed_at: Utc::now().to_rfc3339(),
        source_spreadsheet: input.spreadsheet_id.clone().unwrap_or_default(),
        total_processed,
        stats: BridgeStats {
            high_confidence,
            low_confidence,
            errors: 0,
        },
        results,
    };

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file = std::fs::File::create(output_path)?;
    serde_json::to_writer_pretty(file, &output)?;

    Ok(BatchReport {
        spreadsheet_name: input.spreadsheet_name.unwrap_or_default(),
        category_count: categorizer.categories().len(),
        total_processed,
        high_confidence,
        low_confidence,
        average_confidence: if total_processed == 0 {
            0.0
        } else {
            confidence_sum / total_processed as f32
        },
    })
}

/// Like `process_batch`, but a failure still writes an error document to
/// the output path so the importing side sees what happened
pub fn run_batch(input_path: &Path, output_path: &Path, threshold: f32) -> Result<BatchReport> {
    match process_batch(input_path, output_path, threshold) {
        Ok(report) => Ok(report),
        Err(e) => {
            let error_doc = serde_json::json!({
                "error": e.to_string(),
                "timestamp": Utc::now().to_rfc3339(),
            });
            if let Ok(file) = std::fs::File::create(output_path) {
                let _ = serde_json::to_writer_pretty(file, &error_doc);
            }
            Err(e)
        }
    }
}

fn round4(value: f32) -> f32 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_input(dir: &Path, body: &str) -> std::path::PathBuf {
        let path = dir.join("pending_tasks.json");
        std::fs::write(&path, body).unwrap();
        path
    }

    const TASKS: &str = r#"{
        "spreadsheetName": "Shortcuts",
        "spreadsheetId": "sheet-123",
        "availableCategories": ["Dates & Time", "Communication & Greetings"],
        "tasks": [
            {"rowId": 2, "text": "meeting dates and time slots"},
            {"rowId": 3, "text": "zzzz", "description": ""}
        ]
    }"#;

    #[test]
    fn test_process_batch_writes_results() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path(), TASKS);
        let output = dir.path().join("results_latest.json");

        let report = process_batch(&input, &output, 0.15).unwrap();
        assert_eq!(report.total_processed, 2);
        assert_eq!(report.spreadsheet_name, "Shortcuts");
        assert_eq!(report.low_confidence, 1);

        let body = std::fs::read_to_string(&output).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed["sourceSpreadsheet"], "sheet-123");
        assert_eq!(parsed["totalProcessed"], 2);
        assert_eq!(parsed["results"][0]["rowId"], 2);
        assert_eq!(parsed["results"][0]["suggestedCategory"], "Dates & Time");
        assert_eq!(parsed["results"][1]["suggestedCategory"], "Needs Review");
        assert!(parsed["stats"]["lowConfidence"].as_u64().unwrap() >= 1);
    }

    #[test]
    fn test_missing_keys_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path(), r#"{"tasks": []}"#);
        let output = dir.path().join("out.json");

        let result = process_batch(&input, &output, 0.15);
        assert!(matches!(result, Err(SnippetError::Bridge(_))));
    }

    #[test]
    fn test_run_batch_writes_error_document() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path(), "not json");
        let output = dir.path().join("out.json");

        assert!(run_batch(&input, &output, 0.15).is_err());

        let body = std::fs::read_to_string(&output).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert!(parsed["error"].as_str().unwrap().contains("invalid tasks file"));
        assert!(parsed["timestamp"].is_string());
    }

    #[test]
    fn test_confidence_rounding() {
        assert_eq!(round4(0.123456), 0.1235);
        assert_eq!(round4(0.0), 0.0);
    }
}
