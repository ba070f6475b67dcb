//! Reference context assembly from the retrieval backend.
//!
//! Retrieval is strictly best-effort: any failure degrades to an empty
//! context and the evaluation proceeds without reference material.

use tracing::{debug, warn};

use crate::concepts::question_keywords;
use crate::traits::Retriever;

/// Derive the retrieval query: an explicit topic hint wins, otherwise the
/// question's keywords, otherwise the raw question text.
fn retrieval_query(topic_hint: Option<&str>, question_text: &str) -> String {
    if let Some(topic) = topic_hint {
        let topic = topic.trim();
        if !topic.is_empty() {
            return topic.to_string();
        }
    }
    let keywords = question_keywords(question_text);
    if keywords.is_empty() {
        question_text.trim().to_string()
    } else {
        keywords.join(" ")
    }
}

/// Truncate to at most `char_budget` characters without splitting a char.
fn truncate_chars(text: String, char_budget: usize) -> String {
    match text.char_indices().nth(char_budget) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text,
    }
}

/// Fetch up to `top_k` snippets for the submission and join them into a
/// single context block capped at `char_budget` characters. Never fails;
/// a retriever error or an empty result set yields an empty string.
pub async fn fetch_reference_context(
    retriever: &dyn Retriever,
    topic_hint: Option<&str>,
    question_text: &str,
    top_k: usize,
    char_budget: usize,
) -> String {
    let query = retrieval_query(topic_hint, question_text);

    let snippets = match retriever.search(&query, top_k).await {
        Ok(snippets) => snippets,
        Err(e) => {
            warn!(error = %e, "reference retrieval failed, continuing without context");
            return String::new();
        }
    };

    if snippets.is_empty() {
        debug!(%query, "no reference material found");
        return String::new();
    }

    debug!(%query, count = snippets.len(), "retrieved reference snippets");
    let joined = snippets
        .into_iter()
        .map(|s| s.content)
        .collect::<Vec<_>>()
        .join("\n\n");
    truncate_chars(joined, char_budget)
}
