//! Backend fallback chain for the AI scorer path.
//!
//! One prompt is built per submission and replayed unchanged down the
//! chain: primary backend, then secondary, then the deterministic
//! heuristic. Every transition is logged with its cause; the chain as a
//! whole cannot fail because the heuristic always produces a score.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::ai::{build_evaluation_prompt, parse_ai_response};
use crate::error::EvalError;
use crate::heuristic;
use crate::model::{RubricScores, ScorerPath, ScoringInputs};
use crate::traits::{ChatBackend, CompletionRequest, EXAMINER_SYSTEM_PROMPT};

pub struct ModelRouter {
    primary: Arc<dyn ChatBackend>,
    secondary: Option<Arc<dyn ChatBackend>>,
    per_call_timeout: Duration,
    max_tokens: u32,
    temperature: f64,
}

impl ModelRouter {
    pub fn new(
        primary: Arc<dyn ChatBackend>,
        secondary: Option<Arc<dyn ChatBackend>>,
        per_call_timeout: Duration,
        max_tokens: u32,
        temperature: f64,
    ) -> Self {
        Self {
            primary,
            secondary,
            per_call_timeout,
            max_tokens,
            temperature,
        }
    }

    async fn try_backend(
        &self,
        backend: &dyn ChatBackend,
        prompt: &str,
    ) -> Result<RubricScores, EvalError> {
        let request = CompletionRequest {
            prompt: prompt.to_string(),
            system_prompt: Some(EXAMINER_SYSTEM_PROMPT.to_string()),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response = tokio::time::timeout(self.per_call_timeout, backend.complete(&request))
            .await
            .map_err(|_| EvalError::BackendFailure {
                backend: backend.id().to_string(),
                reason: format!("no completion within {}s", self.per_call_timeout.as_secs()),
            })?
            .map_err(|e| EvalError::BackendFailure {
                backend: backend.id().to_string(),
                reason: e.to_string(),
            })?;

        info!(
            backend = backend.id(),
            model = %response.model,
            latency_ms = response.latency_ms,
            "backend completion received"
        );
        parse_ai_response(&response.text)
    }

    /// Score the submission, advancing through the chain on any failure.
    /// Returns the scores together with the path that produced them.
    pub async fn score(
        &self,
        inputs: &ScoringInputs<'_>,
        word_limit: Option<u32>,
    ) -> (RubricScores, ScorerPath) {
        let prompt = build_evaluation_prompt(inputs, word_limit);

        match self.try_backend(self.primary.as_ref(), &prompt).await {
            Ok(scores) => return (scores, ScorerPath::AiPrimary),
            Err(e) => {
                warn!(backend = self.primary.id(), error = %e, "primary backend failed");
            }
        }

        if let Some(secondary) = &self.secondary {
            match self.try_backend(secondary.as_ref(), &prompt).await {
                Ok(scores) => return (scores, ScorerPath::AiSecondary),
                Err(e) => {
                    warn!(backend = secondary.id(), error = %e, "secondary backend failed");
                }
            }
        }

        warn!("all AI backends exhausted, using heuristic scorer");
        (heuristic::score(inputs), ScorerPath::HeuristicFallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crate::traits::CompletionResponse;

    const GOOD_JSON: &str =
        r#"{"content": 8, "structure": 7, "language": 7, "evidence": 5, "suggestions": ["keep going"]}"#;

    struct Scripted {
        id: &'static str,
        reply: Result<&'static str, &'static str>,
    }

    #[async_trait]
    impl ChatBackend for Scripted {
        fn id(&self) -> &str {
            self.id
        }

        async fn complete(&self, _request: &CompletionRequest) -> anyhow::Result<CompletionResponse> {
            match self.reply {
                Ok(text) => Ok(CompletionResponse {
                    text: text.to_string(),
                    model: format!("{}-model", self.id),
                    latency_ms: 3,
                }),
                Err(msg) => anyhow::bail!("{msg}"),
            }
        }
    }

    struct Hanging;

    #[async_trait]
    impl ChatBackend for Hanging {
        fn id(&self) -> &str {
            "hanging"
        }

        async fn complete(&self, _request: &CompletionRequest) -> anyhow::Result<CompletionResponse> {
            futures::future::pending().await
        }
    }

    fn inputs() -> ScoringInputs<'static> {
        ScoringInputs {
            question_text: "Discuss the separation of powers.",
            answer_text: "The separation of powers divides the state into branches.",
            reference_context: "",
            concepts: &[],
        }
    }

    fn router(
        primary: Arc<dyn ChatBackend>,
        secondary: Option<Arc<dyn ChatBackend>>,
    ) -> ModelRouter {
        ModelRouter::new(primary, secondary, Duration::from_millis(50), 1500, 0.3)
    }

    #[tokio::test]
    async fn healthy_primary_short_circuits() {
        let r = router(
            Arc::new(Scripted { id: "p", reply: Ok(GOOD_JSON) }),
            Some(Arc::new(Scripted { id: "s", reply: Err("never called") })),
        );
        let (scores, path) = r.score(&inputs(), None).await;
        assert_eq!(path, ScorerPath::AiPrimary);
        assert_eq!(scores.content_score, 8.0);
    }

    #[tokio::test]
    async fn failed_primary_advances_to_secondary() {
        let r = router(
            Arc::new(Scripted { id: "p", reply: Err("503") }),
            Some(Arc::new(Scripted { id: "s", reply: Ok(GOOD_JSON) })),
        );
        let (_, path) = r.score(&inputs(), None).await;
        assert_eq!(path, ScorerPath::AiSecondary);
    }

    #[tokio::test]
    async fn malformed_primary_advances_to_secondary() {
        let r = router(
            Arc::new(Scripted { id: "p", reply: Ok("sorry, no JSON from me") }),
            Some(Arc::new(Scripted { id: "s", reply: Ok(GOOD_JSON) })),
        );
        let (_, path) = r.score(&inputs(), None).await;
        assert_eq!(path, ScorerPath::AiSecondary);
    }

    #[tokio::test]
    async fn hanging_backends_fall_through_to_heuristic() {
        let r = router(Arc::new(Hanging), Some(Arc::new(Hanging)));
        let (scores, path) = r.score(&inputs(), None).await;
        assert_eq!(path, ScorerPath::HeuristicFallback);
        assert!((0.0..=40.0).contains(&scores.total_score));
    }

    #[tokio::test]
    async fn no_secondary_goes_straight_to_heuristic() {
        let r = router(Arc::new(Scripted { id: "p", reply: Err("down") }), None);
        let (_, path) = r.score(&inputs(), None).await;
        assert_eq!(path, ScorerPath::HeuristicFallback);
    }
}
