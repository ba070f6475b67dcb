//! Mock backends for testing the engine without real API calls.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use rubrix_core::traits::{
    ChatBackend, CompletionRequest, CompletionResponse, Retriever, Snippet,
};

/// What a scripted backend does with each call.
#[derive(Debug, Clone)]
pub enum Script {
    /// Return this completion text.
    Reply(String),
    /// Fail with this error message.
    Fail(String),
    /// Never complete, so a caller-side timeout fires.
    Hang,
}

/// A scripted chat backend. Records calls so tests can assert how far the
/// fallback chain advanced.
pub struct MockChatBackend {
    id: String,
    script: Script,
    call_count: AtomicU32,
    last_prompt: Mutex<Option<String>>,
}

impl MockChatBackend {
    pub fn new(id: &str, script: Script) -> Self {
        Self {
            id: id.to_string(),
            script,
            call_count: AtomicU32::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    /// A backend that always returns the same completion.
    pub fn replying(id: &str, text: &str) -> Self {
        Self::new(id, Script::Reply(text.to_string()))
    }

    /// A backend that always fails.
    pub fn failing(id: &str, message: &str) -> Self {
        Self::new(id, Script::Fail(message.to_string()))
    }

    /// A backend that never answers.
    pub fn hanging(id: &str) -> Self {
        Self::new(id, Script::Hang)
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl ChatBackend for MockChatBackend {
    fn id(&self) -> &str {
        &self.id
    }

    async fn complete(&self, request: &CompletionRequest) -> anyhow::Result<CompletionResponse> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self.last_prompt.lock().unwrap_or_else(|e| e.into_inner()) =
            Some(request.prompt.clone());

        match &self.script {
            Script::Reply(text) => Ok(CompletionResponse {
                text: text.clone(),
                model: format!("{}-mock", self.id),
                latency_ms: 1,
            }),
            Script::Fail(message) => anyhow::bail!("{message}"),
            Script::Hang => futures::future::pending().await,
        }
    }
}

/// Retriever returning a fixed set of snippets.
pub struct StaticRetriever {
    snippets: Vec<String>,
}

impl StaticRetriever {
    pub fn new(snippets: Vec<String>) -> Self {
        Self { snippets }
    }

    pub fn empty() -> Self {
        Self { snippets: Vec::new() }
    }
}

#[async_trait]
impl Retriever for StaticRetriever {
    async fn search(&self, _query: &str, top_k: usize) -> anyhow::Result<Vec<Snippet>> {
        Ok(self
            .snippets
            .iter()
            .take(top_k)
            .map(|content| Snippet {
                content: content.clone(),
            })
            .collect())
    }
}

/// Retriever that always fails, for exercising the degraded path.
pub struct FailingRetriever;

#[async_trait]
impl Retriever for FailingRetriever {
    async fn search(&self, _query: &str, _top_k: usize) -> anyhow::Result<Vec<Snippet>> {
        anyhow::bail!("retrieval backend unavailable")
    }
}
