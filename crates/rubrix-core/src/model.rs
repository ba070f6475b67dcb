//! Core data model types for rubrix.
//!
//! These are the fundamental types that the entire rubrix system uses to
//! represent evaluation requests, rubric scores, feedback, and results.
//! JSON field names follow the persisted wire format (`submission_id`,
//! `content_score`, `processing_time_seconds`, …).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::EvalError;

/// The fixed rubric weights. A system constant, not user-configurable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RubricWeights {
    pub content: f64,
    pub structure: f64,
    pub language: f64,
    pub evidence: f64,
}

/// Content 40%, structure 30%, language 20%, supporting evidence 10%.
pub const RUBRIC_WEIGHTS: RubricWeights = RubricWeights {
    content: 0.40,
    structure: 0.30,
    language: 0.20,
    evidence: 0.10,
};

/// An evaluation request for one submitted answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationRequest {
    /// Identifier of the submission being evaluated. Upserts are keyed on it.
    pub submission_id: String,
    /// The exam question.
    pub question_text: String,
    /// The candidate's free-text answer.
    pub answer_text: String,
    /// Optional topic used to filter reference retrieval.
    #[serde(default)]
    pub topic_hint: Option<String>,
    /// Optional word limit the answer was written against.
    #[serde(default)]
    pub word_limit: Option<u32>,
}

impl EvaluationRequest {
    /// Rejects requests with a missing or blank question/answer before any
    /// scoring begins.
    pub fn validate(&self) -> Result<(), EvalError> {
        if self.submission_id.trim().is_empty() {
            return Err(EvalError::InvalidRequest(
                "missing required field: submission_id".into(),
            ));
        }
        if self.question_text.trim().is_empty() {
            return Err(EvalError::InvalidRequest(
                "missing required field: question_text".into(),
            ));
        }
        if self.answer_text.trim().is_empty() {
            return Err(EvalError::InvalidRequest(
                "missing required field: answer_text".into(),
            ));
        }
        Ok(())
    }
}

/// Clamp a raw score into the rubric's [0, 10] interval.
///
/// NaN clamps to the lower bound so a component score is never NaN.
pub fn clamp_score(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 10.0)
    }
}

/// Round to one decimal place, matching the persisted score precision.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// The four rubric component scores, each guaranteed to lie in [0, 10].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComponentScores {
    pub content: f64,
    pub structure: f64,
    pub language: f64,
    pub evidence: f64,
}

impl ComponentScores {
    /// Build component scores, clamping every field into [0, 10].
    pub fn clamped(content: f64, structure: f64, language: f64, evidence: f64) -> Self {
        Self {
            content: clamp_score(content),
            structure: clamp_score(structure),
            language: clamp_score(language),
            evidence: clamp_score(evidence),
        }
    }

    /// Unweighted sum of the four components, in [0, 40].
    pub fn total(&self) -> f64 {
        self.content + self.structure + self.language + self.evidence
    }

    /// Weighted sum scaled to [0, 100].
    pub fn weighted_percentage(&self) -> f64 {
        (self.content * RUBRIC_WEIGHTS.content
            + self.structure * RUBRIC_WEIGHTS.structure
            + self.language * RUBRIC_WEIGHTS.language
            + self.evidence * RUBRIC_WEIGHTS.evidence)
            * 10.0
    }
}

/// Itemized feedback, one list per rubric dimension plus flat lists of
/// suggestions and key points the answer missed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    #[serde(default)]
    pub content: Vec<String>,
    #[serde(default)]
    pub structure: Vec<String>,
    #[serde(default)]
    pub language: Vec<String>,
    #[serde(default)]
    pub evidence: Vec<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub key_points_missed: Vec<String>,
}

/// The output of one scorer path: clamped component scores, derived totals,
/// and the feedback that goes with them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RubricScores {
    pub content_score: f64,
    pub structure_score: f64,
    pub language_score: f64,
    pub evidence_score: f64,
    /// Sum of the four components, in [0, 40].
    pub total_score: f64,
    /// Weighted sum scaled to [0, 100].
    pub weighted_percentage: f64,
    pub feedback: Feedback,
}

impl RubricScores {
    /// Derive totals from already-clamped components. Totals are always
    /// computed here from the fixed weights, never taken from a model.
    ///
    /// Components are rounded to one decimal first and the totals derived
    /// from the rounded values, so the reported total always equals the sum
    /// of the reported components.
    pub fn from_components(scores: ComponentScores, feedback: Feedback) -> Self {
        let rounded = ComponentScores {
            content: round1(scores.content),
            structure: round1(scores.structure),
            language: round1(scores.language),
            evidence: round1(scores.evidence),
        };
        Self {
            content_score: rounded.content,
            structure_score: rounded.structure,
            language_score: rounded.language,
            evidence_score: rounded.evidence,
            total_score: round1(rounded.total()),
            weighted_percentage: round1(rounded.weighted_percentage()),
            feedback,
        }
    }
}

/// Which path produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScorerPath {
    AiPrimary,
    AiSecondary,
    HeuristicFallback,
}

impl fmt::Display for ScorerPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScorerPath::AiPrimary => write!(f, "ai-primary"),
            ScorerPath::AiSecondary => write!(f, "ai-secondary"),
            ScorerPath::HeuristicFallback => write!(f, "heuristic-fallback"),
        }
    }
}

impl FromStr for ScorerPath {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ai-primary" => Ok(ScorerPath::AiPrimary),
            "ai-secondary" => Ok(ScorerPath::AiSecondary),
            "heuristic-fallback" => Ok(ScorerPath::HeuristicFallback),
            other => Err(format!("unknown scorer path: {other}")),
        }
    }
}

/// Lifecycle status of a submission, as written to the persistence
/// collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Processing,
    Completed,
    Failed,
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionStatus::Processing => write!(f, "processing"),
            SubmissionStatus::Completed => write!(f, "completed"),
            SubmissionStatus::Failed => write!(f, "failed"),
        }
    }
}

/// A completed evaluation. Constructed once per request, immutable after
/// construction, and upserted keyed by `submission_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub submission_id: String,
    #[serde(flatten)]
    pub scores: RubricScores,
    pub scorer_path: ScorerPath,
    /// Wall-clock seconds from request start to result construction.
    pub processing_time_seconds: f64,
    pub completed_at: DateTime<Utc>,
}

/// The engine's boundary response. HTTP status mapping belongs to the
/// routing layer; the engine only reports success, the evaluation, and an
/// error string with best-effort timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<EvaluationResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub processing_time_seconds: f64,
}

impl EvaluationResponse {
    pub fn completed(evaluation: EvaluationResult) -> Self {
        let processing_time_seconds = evaluation.processing_time_seconds;
        Self {
            success: true,
            evaluation: Some(evaluation),
            error: None,
            processing_time_seconds,
        }
    }

    pub fn failed(error: impl Into<String>, processing_time_seconds: f64) -> Self {
        Self {
            success: false,
            evaluation: None,
            error: Some(error.into()),
            processing_time_seconds,
        }
    }
}

/// The working inputs of one scoring pass, borrowed from the orchestrator.
/// Request-scoped: built per evaluation and discarded with it.
#[derive(Debug, Clone, Copy)]
pub struct ScoringInputs<'a> {
    pub question_text: &'a str,
    pub answer_text: &'a str,
    /// Concatenated retrieved reference snippets; may be empty.
    pub reference_context: &'a str,
    /// Key concepts extracted from the question.
    pub concepts: &'a [String],
}
