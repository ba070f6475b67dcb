//! TOML submission batch parser.
//!
//! Loads submission batches from TOML files and validates them.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::EvaluationRequest;

/// Intermediate TOML structure for parsing batch files.
#[derive(Debug, Deserialize)]
struct TomlBatchFile {
    batch: TomlBatchHeader,
    #[serde(default)]
    submissions: Vec<TomlSubmission>,
}

#[derive(Debug, Deserialize)]
struct TomlBatchHeader {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    default_word_limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct TomlSubmission {
    #[serde(default)]
    id: Option<String>,
    question: String,
    answer: String,
    #[serde(default)]
    topic: Option<String>,
    #[serde(default)]
    word_limit: Option<u32>,
}

/// One submission from a batch file. The id is optional in the file; the
/// caller assigns one before building requests.
#[derive(Debug, Clone)]
pub struct BatchSubmission {
    pub id: Option<String>,
    pub question: String,
    pub answer: String,
    pub topic: Option<String>,
    pub word_limit: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct SubmissionBatch {
    pub name: String,
    pub description: String,
    pub submissions: Vec<BatchSubmission>,
}

impl SubmissionBatch {
    /// Build evaluation requests, calling `id_gen` for submissions that
    /// did not carry an id of their own.
    pub fn into_requests(self, mut id_gen: impl FnMut() -> String) -> Vec<EvaluationRequest> {
        self.submissions
            .into_iter()
            .map(|s| EvaluationRequest {
                submission_id: s.id.unwrap_or_else(&mut id_gen),
                question_text: s.question,
                answer_text: s.answer,
                topic_hint: s.topic,
                word_limit: s.word_limit,
            })
            .collect()
    }
}

/// Parse a single TOML file into a `SubmissionBatch`.
pub fn parse_batch(path: &Path) -> Result<SubmissionBatch> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read batch file: {}", path.display()))?;

    parse_batch_str(&content, path)
}

/// Parse a TOML string into a `SubmissionBatch` (useful for testing).
pub fn parse_batch_str(content: &str, source_path: &Path) -> Result<SubmissionBatch> {
    let parsed: TomlBatchFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let default_word_limit = parsed.batch.default_word_limit;
    let submissions = parsed
        .submissions
        .into_iter()
        .map(|s| BatchSubmission {
            id: s.id,
            question: s.question,
            answer: s.answer,
            topic: s.topic,
            word_limit: s.word_limit.or(default_word_limit),
        })
        .collect();

    Ok(SubmissionBatch {
        name: parsed.batch.name,
        description: parsed.batch.description,
        submissions,
    })
}

/// A warning from batch validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The submission id (if it carried one).
    pub submission_id: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Validate a batch for common issues.
pub fn validate_batch(batch: &SubmissionBatch) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    // Check for duplicate submission ids
    let mut seen_ids = std::collections::HashSet::new();
    for submission in &batch.submissions {
        if let Some(id) = &submission.id {
            if !seen_ids.insert(id) {
                warnings.push(ValidationWarning {
                    submission_id: Some(id.clone()),
                    message: format!("duplicate submission id: {id}"),
                });
            }
        }
    }

    // Check for blank questions and answers
    for submission in &batch.submissions {
        if submission.question.trim().is_empty() {
            warnings.push(ValidationWarning {
                submission_id: submission.id.clone(),
                message: "question is empty".into(),
            });
        }
        if submission.answer.trim().is_empty() {
            warnings.push(ValidationWarning {
                submission_id: submission.id.clone(),
                message: "answer is empty".into(),
            });
        }
    }

    if batch.submissions.is_empty() {
        warnings.push(ValidationWarning {
            submission_id: None,
            message: "batch contains no submissions".into(),
        });
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const VALID_TOML: &str = r#"
[batch]
name = "Polity Mock Test 3"
description = "Answers collected on 2026-08-12"
default_word_limit = 250

[[submissions]]
id = "sub-001"
question = "Discuss the evolving role of the Finance Commission in fiscal federalism."
answer = """
In India, the Finance Commission mediates the vertical and horizontal
devolution of taxes. However, cesses and surcharges erode the divisible
pool. In conclusion, a predictable devolution formula is the way forward.
"""
topic = "fiscal federalism"

[[submissions]]
question = "Examine the significance of Article 21."
answer = "Article 21 guarantees life and personal liberty."
word_limit = 150
"#;

    #[test]
    fn parse_valid_toml() {
        let batch = parse_batch_str(VALID_TOML, &PathBuf::from("test.toml")).unwrap();
        assert_eq!(batch.name, "Polity Mock Test 3");
        assert_eq!(batch.submissions.len(), 2);
        assert_eq!(batch.submissions[0].id.as_deref(), Some("sub-001"));
        assert_eq!(batch.submissions[0].topic.as_deref(), Some("fiscal federalism"));
        // header default applies only where the submission is silent
        assert_eq!(batch.submissions[0].word_limit, Some(250));
        assert_eq!(batch.submissions[1].word_limit, Some(150));
    }

    #[test]
    fn into_requests_assigns_missing_ids() {
        let batch = parse_batch_str(VALID_TOML, &PathBuf::from("test.toml")).unwrap();
        let mut counter = 0;
        let requests = batch.into_requests(|| {
            counter += 1;
            format!("generated-{counter}")
        });
        assert_eq!(requests[0].submission_id, "sub-001");
        assert_eq!(requests[1].submission_id, "generated-1");
        assert!(requests.iter().all(|r| r.validate().is_ok()));
    }

    #[test]
    fn validate_duplicate_ids() {
        let toml = r#"
[batch]
name = "Dupes"

[[submissions]]
id = "same"
question = "First question?"
answer = "First answer."

[[submissions]]
id = "same"
question = "Second question?"
answer = "Second answer."
"#;
        let batch = parse_batch_str(toml, &PathBuf::from("test.toml")).unwrap();
        let warnings = validate_batch(&batch);
        assert!(warnings.iter().any(|w| w.message.contains("duplicate")));
    }

    #[test]
    fn validate_blank_fields_and_empty_batch() {
        let toml = r#"
[batch]
name = "Blanks"

[[submissions]]
question = "   "
answer = ""
"#;
        let batch = parse_batch_str(toml, &PathBuf::from("test.toml")).unwrap();
        let warnings = validate_batch(&batch);
        assert!(warnings.iter().any(|w| w.message.contains("question is empty")));
        assert!(warnings.iter().any(|w| w.message.contains("answer is empty")));

        let empty = parse_batch_str("[batch]\nname = \"Empty\"\n", &PathBuf::from("e.toml")).unwrap();
        assert!(validate_batch(&empty)
            .iter()
            .any(|w| w.message.contains("no submissions")));
    }

    #[test]
    fn parse_malformed_toml() {
        let bad = "this is not [valid toml }{";
        assert!(parse_batch_str(bad, &PathBuf::from("bad.toml")).is_err());
    }

    #[test]
    fn parse_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("batch.toml");
        std::fs::write(&file_path, VALID_TOML).unwrap();

        let batch = parse_batch(&file_path).unwrap();
        assert_eq!(batch.submissions.len(), 2);
    }
}
