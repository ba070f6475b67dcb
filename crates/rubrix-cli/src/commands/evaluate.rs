//! The `rubrix evaluate` command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use rubrix_core::model::EvaluationRequest;
use rubrix_core::traits::EvaluationStore;
use rubrix_providers::config::load_config_from;
use rubrix_providers::store::{JsonFileStore, MemoryStore};

use super::{build_engine, print_score_table};

#[allow(clippy::too_many_arguments)]
pub async fn execute(
    question: String,
    answer: Option<String>,
    answer_file: Option<PathBuf>,
    id: Option<String>,
    topic: Option<String>,
    word_limit: Option<u32>,
    offline: bool,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let answer_text = match (answer, answer_file) {
        (Some(text), None) => text,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read answer file: {}", path.display()))?,
        (None, None) => anyhow::bail!("provide --answer or --answer-file"),
        (Some(_), Some(_)) => unreachable!("clap rejects this combination"),
    };

    let config = load_config_from(config_path.as_deref())?;

    let store: Arc<dyn EvaluationStore> = match &output {
        Some(dir) => Arc::new(JsonFileStore::new(dir.clone())?),
        None => Arc::new(MemoryStore::new()),
    };
    let engine = build_engine(&config, offline, store)?;

    let request = EvaluationRequest {
        submission_id: id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
        question_text: question,
        answer_text,
        topic_hint: topic,
        word_limit,
    };

    let response = engine.evaluate(&request).await;

    print_score_table(std::slice::from_ref(&response));
    println!("{}", serde_json::to_string_pretty(&response)?);

    if let Some(dir) = &output {
        if response.success {
            eprintln!(
                "Evaluation saved to: {}",
                dir.join(format!("{}.json", request.submission_id)).display()
            );
        }
    }

    anyhow::ensure!(response.success, "evaluation failed");
    Ok(())
}
