//! Evaluation error types.
//!
//! Most failures inside the scoring pipeline are recovered locally (next
//! backend, then the heuristic fallback). The variants here classify what
//! went wrong so the router and the orchestrator can decide without string
//! matching.

use thiserror::Error;

/// Errors that can occur while evaluating a submission.
#[derive(Debug, Error)]
pub enum EvalError {
    /// The request failed validation before any scoring began.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The model output could not be parsed into the expected score shape.
    #[error("malformed model response: {0}")]
    MalformedResponse(String),

    /// An AI backend call failed or timed out.
    #[error("backend '{backend}' failed: {reason}")]
    BackendFailure { backend: String, reason: String },

    /// The whole evaluation exceeded its wall-clock budget.
    #[error("evaluation deadline exceeded after {0}s")]
    DeadlineExceeded(u64),

    /// The persistence collaborator failed. This is the only error class
    /// that actually fails an evaluation from the caller's perspective.
    #[error("persistence failure: {0}")]
    Store(String),
}

impl EvalError {
    /// Returns `true` if this error can be recovered by advancing the
    /// scoring pipeline (next backend, then heuristic fallback).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EvalError::MalformedResponse(_)
                | EvalError::BackendFailure { .. }
                | EvalError::DeadlineExceeded(_)
        )
    }
}
