//! Evaluation persistence backends.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Context;
use async_trait::async_trait;
use tracing::debug;

use rubrix_core::model::{EvaluationResult, SubmissionStatus};
use rubrix_core::traits::EvaluationStore;

/// In-memory store. Used by tests and by one-shot CLI runs where the
/// result goes to stdout anyway.
#[derive(Default)]
pub struct MemoryStore {
    evaluations: Mutex<HashMap<String, EvaluationResult>>,
    statuses: Mutex<HashMap<String, SubmissionStatus>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn evaluation(&self, submission_id: &str) -> Option<EvaluationResult> {
        self.evaluations
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(submission_id)
            .cloned()
    }

    pub fn status(&self, submission_id: &str) -> Option<SubmissionStatus> {
        self.statuses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(submission_id)
            .copied()
    }

    pub fn len(&self) -> usize {
        self.evaluations.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl EvaluationStore for MemoryStore {
    async fn upsert_evaluation(
        &self,
        submission_id: &str,
        result: &EvaluationResult,
    ) -> anyhow::Result<()> {
        self.evaluations
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(submission_id.to_string(), result.clone());
        Ok(())
    }

    async fn update_submission_status(
        &self,
        submission_id: &str,
        status: SubmissionStatus,
    ) -> anyhow::Result<()> {
        self.statuses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(submission_id.to_string(), status);
        Ok(())
    }
}

/// Store that writes each evaluation as `<submission_id>.json` under a
/// directory, with a sibling `<submission_id>.status` file. Re-running a
/// submission overwrites both.
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create output directory: {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn evaluation_path(&self, submission_id: &str) -> PathBuf {
        self.dir.join(format!("{submission_id}.json"))
    }

    fn status_path(&self, submission_id: &str) -> PathBuf {
        self.dir.join(format!("{submission_id}.status"))
    }

    pub fn load_evaluation(&self, submission_id: &str) -> anyhow::Result<EvaluationResult> {
        let path = self.evaluation_path(submission_id);
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read evaluation: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse evaluation: {}", path.display()))
    }
}

#[async_trait]
impl EvaluationStore for JsonFileStore {
    async fn upsert_evaluation(
        &self,
        submission_id: &str,
        result: &EvaluationResult,
    ) -> anyhow::Result<()> {
        let path = self.evaluation_path(submission_id);
        let json = serde_json::to_string_pretty(result)?;
        std::fs::write(&path, json)
            .with_context(|| format!("failed to write evaluation: {}", path.display()))?;
        debug!(submission_id, path = %path.display(), "evaluation written");
        Ok(())
    }

    async fn update_submission_status(
        &self,
        submission_id: &str,
        status: SubmissionStatus,
    ) -> anyhow::Result<()> {
        let path = self.status_path(submission_id);
        std::fs::write(&path, status.to_string())
            .with_context(|| format!("failed to write status: {}", path.display()))?;
        Ok(())
    }
}
