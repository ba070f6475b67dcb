//! CLI subcommands.

pub mod batch;
pub mod evaluate;
pub mod init;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use comfy_table::{Cell, Table};

use rubrix_core::engine::EvalEngine;
use rubrix_core::model::EvaluationResponse;
use rubrix_core::traits::{
    ChatBackend, CompletionRequest, CompletionResponse, EvaluationStore, Retriever,
};
use rubrix_providers::config::{create_backend, RubrixConfig};
use rubrix_providers::retrieval::{HttpRetriever, NullRetriever};

/// Backend used when AI scoring is switched off. Fails immediately so the
/// router lands on the heuristic without waiting out a timeout.
struct DisabledBackend;

#[async_trait]
impl ChatBackend for DisabledBackend {
    fn id(&self) -> &str {
        "disabled"
    }

    async fn complete(&self, _request: &CompletionRequest) -> anyhow::Result<CompletionResponse> {
        anyhow::bail!("AI scoring disabled")
    }
}

/// Assemble an engine from config. With `offline` set, or with no primary
/// backend configured, every submission takes the heuristic path.
pub fn build_engine(
    config: &RubrixConfig,
    offline: bool,
    store: Arc<dyn EvaluationStore>,
) -> Result<EvalEngine> {
    let (primary, secondary): (Arc<dyn ChatBackend>, Option<Arc<dyn ChatBackend>>) =
        match (&config.primary, offline) {
            (Some(primary_config), false) => {
                let primary = create_backend("primary", primary_config)?;
                let secondary = config
                    .secondary
                    .as_ref()
                    .map(|c| create_backend("secondary", c))
                    .transpose()?;
                (primary, secondary)
            }
            _ => (Arc::new(DisabledBackend), None),
        };

    let retriever: Arc<dyn Retriever> = match (&config.retrieval_url, offline) {
        (Some(url), false) => Arc::new(HttpRetriever::new(url)?),
        _ => Arc::new(NullRetriever),
    };

    Ok(EvalEngine::new(
        primary,
        secondary,
        retriever,
        store,
        config.engine_config(),
    ))
}

/// Render one evaluation as a table row set on stderr.
pub fn print_score_table(responses: &[EvaluationResponse]) {
    let mut table = Table::new();
    table.set_header(vec![
        "Submission",
        "Content",
        "Structure",
        "Language",
        "Evidence",
        "Total",
        "Weighted %",
        "Path",
    ]);

    for response in responses {
        match &response.evaluation {
            Some(evaluation) => {
                let s = &evaluation.scores;
                table.add_row(vec![
                    Cell::new(&evaluation.submission_id),
                    Cell::new(format!("{:.1}", s.content_score)),
                    Cell::new(format!("{:.1}", s.structure_score)),
                    Cell::new(format!("{:.1}", s.language_score)),
                    Cell::new(format!("{:.1}", s.evidence_score)),
                    Cell::new(format!("{:.1}/40", s.total_score)),
                    Cell::new(format!("{:.1}%", s.weighted_percentage)),
                    Cell::new(evaluation.scorer_path.to_string()),
                ]);
            }
            None => {
                table.add_row(vec![
                    Cell::new("-"),
                    Cell::new("-"),
                    Cell::new("-"),
                    Cell::new("-"),
                    Cell::new("-"),
                    Cell::new("-"),
                    Cell::new("-"),
                    Cell::new(format!(
                        "failed: {}",
                        response.error.as_deref().unwrap_or("unknown")
                    )),
                ]);
            }
        }
    }

    eprintln!("\n{table}");
}
