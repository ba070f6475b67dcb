//! The `rubrix batch` command.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;

use rubrix_core::parser::{parse_batch, validate_batch};
use rubrix_providers::config::load_config_from;
use rubrix_providers::store::JsonFileStore;

use super::{build_engine, print_score_table};

pub async fn execute(
    file: PathBuf,
    output: Option<PathBuf>,
    parallelism: Option<usize>,
    offline: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let mut config = load_config_from(config_path.as_deref())?;
    if let Some(parallelism) = parallelism {
        anyhow::ensure!(parallelism >= 1, "parallelism must be at least 1");
        config.parallelism = parallelism;
    }

    let batch = parse_batch(&file)?;
    for warning in validate_batch(&batch) {
        match &warning.submission_id {
            Some(id) => eprintln!("Warning [{id}]: {}", warning.message),
            None => eprintln!("Warning: {}", warning.message),
        }
    }

    let batch_name = batch.name.clone();
    let requests = batch.into_requests(|| uuid::Uuid::new_v4().to_string());
    anyhow::ensure!(!requests.is_empty(), "batch contains no submissions");

    let output_dir = output.unwrap_or_else(|| config.output_dir.clone());
    let store = Arc::new(JsonFileStore::new(output_dir.clone())?);
    let engine = build_engine(&config, offline, store)?;

    eprintln!(
        "Evaluating batch \"{batch_name}\": {} submissions, parallelism {}",
        requests.len(),
        config.parallelism
    );

    let started = Instant::now();
    let responses = engine.evaluate_many(&requests).await;
    let failed = responses.iter().filter(|r| !r.success).count();

    print_score_table(&responses);
    eprintln!(
        "Complete: {}/{} succeeded, {failed} failed ({:.1}s)",
        responses.len() - failed,
        responses.len(),
        started.elapsed().as_secs_f64()
    );
    eprintln!("Evaluations saved to: {}", output_dir.display());

    anyhow::ensure!(failed == 0, "{failed} submission(s) failed");
    Ok(())
}
