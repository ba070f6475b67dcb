//! Collaborator trait definitions.
//!
//! These async traits are the engine's only view of the outside world: the
//! AI chat backends, the reference retrieval service, and the persistence
//! layer. Implementations live in the `rubrix-providers` crate; tests
//! substitute fakes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::model::{EvaluationResult, SubmissionStatus};

// ---------------------------------------------------------------------------
// Chat backend trait
// ---------------------------------------------------------------------------

/// A chat-completion AI backend. Primary and secondary backends implement
/// the same trait and are distinguished only by `id()`.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Backend identifier used in logs and routing decisions
    /// (e.g. "primary", "secondary").
    fn id(&self) -> &str;

    /// Complete a chat prompt, returning the raw model text.
    async fn complete(&self, request: &CompletionRequest) -> anyhow::Result<CompletionResponse>;
}

/// Request to complete a chat prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// The user-role prompt.
    pub prompt: String,
    /// Optional system prompt override.
    #[serde(default)]
    pub system_prompt: Option<String>,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f64,
}

/// Response from a chat completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// The raw response text.
    pub text: String,
    /// Model that actually produced the response.
    pub model: String,
    /// Latency in milliseconds.
    pub latency_ms: u64,
}

/// Default system prompt for the evaluation backends.
pub const EXAMINER_SYSTEM_PROMPT: &str = "You are an expert exam examiner. Always return valid JSON only, no markdown or explanation.";

// ---------------------------------------------------------------------------
// Retrieval trait
// ---------------------------------------------------------------------------

/// The reference retrieval collaborator: a ranked text lookup.
///
/// Errors from implementations are swallowed by the context fetcher and
/// treated as "no context" — retrieval must never fail an evaluation.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Search for up to `top_k` topically relevant snippets.
    async fn search(&self, query: &str, top_k: usize) -> anyhow::Result<Vec<Snippet>>;
}

/// A retrieved reference snippet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snippet {
    pub content: String,
}

// ---------------------------------------------------------------------------
// Persistence trait
// ---------------------------------------------------------------------------

/// The persistence collaborator. Upserts are last-write-wins keyed by
/// submission id, so re-evaluating a submission overwrites rather than
/// duplicates.
#[async_trait]
pub trait EvaluationStore: Send + Sync {
    async fn upsert_evaluation(
        &self,
        submission_id: &str,
        result: &EvaluationResult,
    ) -> anyhow::Result<()>;

    async fn update_submission_status(
        &self,
        submission_id: &str,
        status: SubmissionStatus,
    ) -> anyhow::Result<()>;
}
