//! Evaluation engine: one submission in, one graded response out.
//!
//! The pipeline (concept extraction, retrieval, scoring) races a hard
//! wall-clock deadline. If the deadline fires the engine degrades to the
//! heuristic scorer instead of returning an error, so a submission that
//! validates always comes back graded.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::concepts::extract_key_concepts;
use crate::context::fetch_reference_context;
use crate::error::EvalError;
use crate::heuristic;
use crate::model::{
    EvaluationRequest, EvaluationResponse, EvaluationResult, RubricScores, ScorerPath,
    ScoringInputs, SubmissionStatus,
};
use crate::router::ModelRouter;
use crate::traits::{ChatBackend, EvaluationStore, Retriever};

#[derive(Debug, Clone)]
pub struct EvalEngineConfig {
    /// Wall-clock budget for the whole pipeline.
    pub deadline: Duration,
    /// Budget for a single backend call, spent inside the deadline.
    pub backend_timeout: Duration,
    pub retrieval_top_k: usize,
    pub max_context_chars: usize,
    pub max_tokens: u32,
    pub temperature: f64,
    pub parallelism: usize,
}

impl Default for EvalEngineConfig {
    fn default() -> Self {
        Self {
            deadline: Duration::from_secs(30),
            backend_timeout: Duration::from_secs(25),
            retrieval_top_k: 5,
            max_context_chars: 3000,
            max_tokens: 1500,
            temperature: 0.3,
            parallelism: 4,
        }
    }
}

pub struct EvalEngine {
    router: ModelRouter,
    retriever: Arc<dyn Retriever>,
    store: Arc<dyn EvaluationStore>,
    config: EvalEngineConfig,
}

impl EvalEngine {
    pub fn new(
        primary: Arc<dyn ChatBackend>,
        secondary: Option<Arc<dyn ChatBackend>>,
        retriever: Arc<dyn Retriever>,
        store: Arc<dyn EvaluationStore>,
        config: EvalEngineConfig,
    ) -> Self {
        let router = ModelRouter::new(
            primary,
            secondary,
            config.backend_timeout,
            config.max_tokens,
            config.temperature,
        );
        Self {
            router,
            retriever,
            store,
            config,
        }
    }

    async fn run_pipeline(&self, request: &EvaluationRequest) -> (RubricScores, ScorerPath) {
        let concepts = extract_key_concepts(&request.question_text);
        let reference_context = fetch_reference_context(
            self.retriever.as_ref(),
            request.topic_hint.as_deref(),
            &request.question_text,
            self.config.retrieval_top_k,
            self.config.max_context_chars,
        )
        .await;

        let inputs = ScoringInputs {
            question_text: &request.question_text,
            answer_text: &request.answer_text,
            reference_context: &reference_context,
            concepts: &concepts,
        };
        self.router.score(&inputs, request.word_limit).await
    }

    /// Evaluate one submission end to end.
    ///
    /// Only an invalid request or a persistence failure produces a failed
    /// response; scorer and retrieval trouble degrade through the fallback
    /// chain instead.
    pub async fn evaluate(&self, request: &EvaluationRequest) -> EvaluationResponse {
        let started = Instant::now();

        if let Err(e) = request.validate() {
            return EvaluationResponse::failed(e.to_string(), started.elapsed().as_secs_f64());
        }

        info!(submission_id = %request.submission_id, "evaluation started");
        if let Err(e) = self
            .store
            .update_submission_status(&request.submission_id, SubmissionStatus::Processing)
            .await
        {
            warn!(submission_id = %request.submission_id, error = %e, "could not mark submission processing");
        }

        let (scores, scorer_path) =
            match tokio::time::timeout(self.config.deadline, self.run_pipeline(request)).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    let cause = EvalError::DeadlineExceeded(self.config.deadline.as_secs());
                    warn!(
                        submission_id = %request.submission_id,
                        error = %cause,
                        "pipeline deadline exceeded, scoring heuristically"
                    );
                    let inputs = ScoringInputs {
                        question_text: &request.question_text,
                        answer_text: &request.answer_text,
                        reference_context: "",
                        concepts: &[],
                    };
                    (heuristic::score(&inputs), ScorerPath::HeuristicFallback)
                }
            };

        let result = EvaluationResult {
            submission_id: request.submission_id.clone(),
            scores,
            scorer_path,
            processing_time_seconds: started.elapsed().as_secs_f64(),
            completed_at: chrono::Utc::now(),
        };

        if let Err(e) = self.store.upsert_evaluation(&request.submission_id, &result).await {
            warn!(submission_id = %request.submission_id, error = %e, "failed to persist evaluation");
            if let Err(e) = self
                .store
                .update_submission_status(&request.submission_id, SubmissionStatus::Failed)
                .await
            {
                warn!(submission_id = %request.submission_id, error = %e, "could not mark submission failed");
            }
            let store_err = EvalError::Store(e.to_string());
            return EvaluationResponse::failed(
                store_err.to_string(),
                started.elapsed().as_secs_f64(),
            );
        }

        if let Err(e) = self
            .store
            .update_submission_status(&request.submission_id, SubmissionStatus::Completed)
            .await
        {
            warn!(submission_id = %request.submission_id, error = %e, "could not mark submission completed");
        }

        info!(
            submission_id = %request.submission_id,
            scorer_path = %scorer_path,
            total = result.scores.total_score,
            elapsed_secs = result.processing_time_seconds,
            "evaluation completed"
        );
        EvaluationResponse::completed(result)
    }

    /// Evaluate a batch with bounded concurrency. Responses come back in
    /// the order of the input slice regardless of completion order.
    pub async fn evaluate_many(&self, requests: &[EvaluationRequest]) -> Vec<EvaluationResponse> {
        let semaphore = Arc::new(Semaphore::new(self.config.parallelism.max(1)));
        let mut tasks = FuturesUnordered::new();
        for (idx, request) in requests.iter().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            tasks.push(async move {
                let _permit = semaphore.acquire().await.ok();
                (idx, self.evaluate(request).await)
            });
        }

        let mut responses: Vec<Option<EvaluationResponse>> =
            requests.iter().map(|_| None).collect();
        while let Some((idx, response)) = tasks.next().await {
            responses[idx] = Some(response);
        }
        responses.into_iter().flatten().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    use crate::traits::{CompletionRequest, CompletionResponse, Snippet};

    const GOOD_JSON: &str =
        r#"{"content": 8, "structure": 7, "language": 7, "evidence": 5, "suggestions": ["practice"]}"#;

    struct FixedBackend(&'static str);

    #[async_trait]
    impl ChatBackend for FixedBackend {
        fn id(&self) -> &str {
            "fixed"
        }

        async fn complete(&self, _request: &CompletionRequest) -> anyhow::Result<CompletionResponse> {
            Ok(CompletionResponse {
                text: self.0.to_string(),
                model: "fixed-model".to_string(),
                latency_ms: 1,
            })
        }
    }

    struct HangingBackend;

    #[async_trait]
    impl ChatBackend for HangingBackend {
        fn id(&self) -> &str {
            "hanging"
        }

        async fn complete(&self, _request: &CompletionRequest) -> anyhow::Result<CompletionResponse> {
            futures::future::pending().await
        }
    }

    struct NoRetrieval;

    #[async_trait]
    impl Retriever for NoRetrieval {
        async fn search(&self, _query: &str, _top_k: usize) -> anyhow::Result<Vec<Snippet>> {
            Ok(Vec::new())
        }
    }

    #[derive(Default)]
    struct RecordingStore {
        statuses: Mutex<Vec<(String, SubmissionStatus)>>,
        evaluations: Mutex<Vec<String>>,
        fail_upsert: bool,
    }

    #[async_trait]
    impl EvaluationStore for RecordingStore {
        async fn upsert_evaluation(
            &self,
            submission_id: &str,
            _result: &EvaluationResult,
        ) -> anyhow::Result<()> {
            if self.fail_upsert {
                anyhow::bail!("database unavailable");
            }
            self.evaluations.lock().unwrap().push(submission_id.to_string());
            Ok(())
        }

        async fn update_submission_status(
            &self,
            submission_id: &str,
            status: SubmissionStatus,
        ) -> anyhow::Result<()> {
            self.statuses
                .lock()
                .unwrap()
                .push((submission_id.to_string(), status));
            Ok(())
        }
    }

    fn request(id: &str) -> EvaluationRequest {
        EvaluationRequest {
            submission_id: id.to_string(),
            question_text: "Discuss the separation of powers in India.".to_string(),
            answer_text: "In India, the Constitution divides power between organs. \
                          However, judicial review blurs the line. In conclusion, \
                          checks and balances matter more than strict separation."
                .to_string(),
            topic_hint: None,
            word_limit: Some(250),
        }
    }

    fn engine_with(
        backend: Arc<dyn ChatBackend>,
        store: Arc<RecordingStore>,
        config: EvalEngineConfig,
    ) -> EvalEngine {
        EvalEngine::new(backend, None, Arc::new(NoRetrieval), store, config)
    }

    #[tokio::test]
    async fn happy_path_completes_and_persists() {
        let store = Arc::new(RecordingStore::default());
        let engine = engine_with(
            Arc::new(FixedBackend(GOOD_JSON)),
            Arc::clone(&store),
            EvalEngineConfig::default(),
        );

        let response = engine.evaluate(&request("sub-1")).await;
        assert!(response.success);
        let evaluation = response.evaluation.unwrap();
        assert_eq!(evaluation.scorer_path, ScorerPath::AiPrimary);
        assert_eq!(evaluation.scores.total_score, 27.0);

        assert_eq!(store.evaluations.lock().unwrap().as_slice(), ["sub-1"]);
        let statuses = store.statuses.lock().unwrap();
        assert_eq!(
            statuses.as_slice(),
            [
                ("sub-1".to_string(), SubmissionStatus::Processing),
                ("sub-1".to_string(), SubmissionStatus::Completed),
            ]
        );
    }

    #[tokio::test]
    async fn invalid_request_fails_without_touching_store() {
        let store = Arc::new(RecordingStore::default());
        let engine = engine_with(
            Arc::new(FixedBackend(GOOD_JSON)),
            Arc::clone(&store),
            EvalEngineConfig::default(),
        );

        let mut bad = request("sub-2");
        bad.answer_text = "   ".to_string();
        let response = engine.evaluate(&bad).await;
        assert!(!response.success);
        assert!(response.evaluation.is_none());
        assert!(response.error.unwrap().contains("invalid request"));
        assert!(store.statuses.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_degrades_to_heuristic() {
        let store = Arc::new(RecordingStore::default());
        let config = EvalEngineConfig {
            deadline: Duration::from_millis(100),
            backend_timeout: Duration::from_secs(25),
            ..EvalEngineConfig::default()
        };
        let engine = engine_with(Arc::new(HangingBackend), Arc::clone(&store), config);

        let response = engine.evaluate(&request("sub-3")).await;
        assert!(response.success, "deadline must degrade, not fail");
        let evaluation = response.evaluation.unwrap();
        assert_eq!(evaluation.scorer_path, ScorerPath::HeuristicFallback);
        assert_eq!(store.evaluations.lock().unwrap().as_slice(), ["sub-3"]);
    }

    #[tokio::test]
    async fn persistence_failure_marks_submission_failed() {
        let store = Arc::new(RecordingStore {
            fail_upsert: true,
            ..RecordingStore::default()
        });
        let engine = engine_with(
            Arc::new(FixedBackend(GOOD_JSON)),
            Arc::clone(&store),
            EvalEngineConfig::default(),
        );

        let response = engine.evaluate(&request("sub-4")).await;
        assert!(!response.success);
        assert!(response.error.unwrap().contains("database unavailable"));
        let statuses = store.statuses.lock().unwrap();
        assert_eq!(statuses.last().unwrap().1, SubmissionStatus::Failed);
    }

    #[tokio::test]
    async fn batch_preserves_input_order() {
        let store = Arc::new(RecordingStore::default());
        let engine = engine_with(
            Arc::new(FixedBackend(GOOD_JSON)),
            Arc::clone(&store),
            EvalEngineConfig {
                parallelism: 2,
                ..EvalEngineConfig::default()
            },
        );

        let requests: Vec<_> = (0..5).map(|i| request(&format!("sub-{i}"))).collect();
        let responses = engine.evaluate_many(&requests).await;
        assert_eq!(responses.len(), 5);
        for (i, response) in responses.iter().enumerate() {
            let evaluation = response.evaluation.as_ref().unwrap();
            assert_eq!(evaluation.submission_id, format!("sub-{i}"));
        }
    }
}
