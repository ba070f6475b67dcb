//! Engine configuration and backend factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use rubrix_core::engine::EvalEngineConfig;
use rubrix_core::traits::ChatBackend;

use crate::openai::OpenAiChatBackend;

/// Configuration for one chat backend in the fallback chain.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub model: String,
    pub api_key: String,
    #[serde(default)]
    pub base_url: Option<String>,
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("model", &self.model)
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Top-level rubrix configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RubrixConfig {
    /// Primary chat backend. Absent means heuristic-only operation.
    #[serde(default)]
    pub primary: Option<BackendConfig>,
    /// Secondary chat backend tried when the primary fails.
    #[serde(default)]
    pub secondary: Option<BackendConfig>,
    /// Base URL of the reference retrieval service, if any.
    #[serde(default)]
    pub retrieval_url: Option<String>,
    /// Directory for persisted evaluations.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Wall-clock budget for one evaluation.
    #[serde(default = "default_deadline")]
    pub deadline_secs: u64,
    /// Budget for a single backend call.
    #[serde(default = "default_backend_timeout")]
    pub backend_timeout_secs: u64,
    /// Snippets requested per retrieval.
    #[serde(default = "default_top_k")]
    pub retrieval_top_k: usize,
    /// Character cap on the assembled reference context.
    #[serde(default = "default_context_chars")]
    pub max_context_chars: usize,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Max concurrent evaluations in a batch.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./rubrix-results")
}
fn default_deadline() -> u64 {
    30
}
fn default_backend_timeout() -> u64 {
    25
}
fn default_top_k() -> usize {
    5
}
fn default_context_chars() -> usize {
    3000
}
fn default_max_tokens() -> u32 {
    1500
}
fn default_temperature() -> f64 {
    0.3
}
fn default_parallelism() -> usize {
    4
}

impl Default for RubrixConfig {
    fn default() -> Self {
        Self {
            primary: None,
            secondary: None,
            retrieval_url: None,
            output_dir: default_output_dir(),
            deadline_secs: default_deadline(),
            backend_timeout_secs: default_backend_timeout(),
            retrieval_top_k: default_top_k(),
            max_context_chars: default_context_chars(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            parallelism: default_parallelism(),
        }
    }
}

impl RubrixConfig {
    /// Translate the file-level knobs into the engine's config.
    pub fn engine_config(&self) -> EvalEngineConfig {
        EvalEngineConfig {
            deadline: Duration::from_secs(self.deadline_secs),
            backend_timeout: Duration::from_secs(self.backend_timeout_secs),
            retrieval_top_k: self.retrieval_top_k,
            max_context_chars: self.max_context_chars,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            parallelism: self.parallelism,
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

fn resolve_backend_config(config: &BackendConfig) -> BackendConfig {
    BackendConfig {
        model: config.model.clone(),
        api_key: resolve_env_vars(&config.api_key),
        base_url: config.base_url.as_ref().map(|u| resolve_env_vars(u)),
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `rubrix.toml` in the current directory
/// 2. `~/.config/rubrix/config.toml`
///
/// Environment variable overrides: `RUBRIX_PRIMARY_KEY`, `RUBRIX_SECONDARY_KEY`.
pub fn load_config() -> Result<RubrixConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<RubrixConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("rubrix.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<RubrixConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => RubrixConfig::default(),
    };

    // Apply env var overrides
    if let Ok(key) = std::env::var("RUBRIX_PRIMARY_KEY") {
        if let Some(primary) = &mut config.primary {
            primary.api_key = key;
        }
    }
    if let Ok(key) = std::env::var("RUBRIX_SECONDARY_KEY") {
        if let Some(secondary) = &mut config.secondary {
            secondary.api_key = key;
        }
    }

    // Resolve env vars in backend configs
    config.primary = config.primary.as_ref().map(resolve_backend_config);
    config.secondary = config.secondary.as_ref().map(resolve_backend_config);
    config.retrieval_url = config.retrieval_url.as_ref().map(|u| resolve_env_vars(u));

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("rubrix"))
}

/// Create a chat backend from its configuration.
pub fn create_backend(id: &str, config: &BackendConfig) -> Result<Arc<dyn ChatBackend>> {
    let backend = OpenAiChatBackend::new(
        id,
        &config.api_key,
        &config.model,
        config.base_url.clone(),
    )?;
    Ok(Arc::new(backend))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_RUBRIX_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_RUBRIX_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_RUBRIX_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        std::env::remove_var("_RUBRIX_TEST_VAR");
    }

    #[test]
    fn default_config_matches_engine_defaults() {
        let config = RubrixConfig::default();
        assert_eq!(config.deadline_secs, 30);
        assert_eq!(config.backend_timeout_secs, 25);
        assert_eq!(config.retrieval_top_k, 5);
        assert_eq!(config.max_context_chars, 3000);
        assert_eq!(config.parallelism, 4);

        let engine = config.engine_config();
        assert_eq!(engine.deadline, Duration::from_secs(30));
        assert_eq!(engine.max_tokens, 1500);
    }

    #[test]
    fn parse_full_config() {
        let toml_str = r#"
deadline_secs = 20
parallelism = 8

[primary]
model = "gpt-4.1"
api_key = "${_MISSING_KEY}"

[secondary]
model = "gpt-4.1-mini"
api_key = "sk-direct"
base_url = "https://alt.example.com"
"#;
        let config: RubrixConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.deadline_secs, 20);
        assert_eq!(config.parallelism, 8);
        assert_eq!(config.primary.as_ref().unwrap().model, "gpt-4.1");
        assert_eq!(
            config.secondary.as_ref().unwrap().base_url.as_deref(),
            Some("https://alt.example.com")
        );
        // unspecified knobs keep their defaults
        assert_eq!(config.max_tokens, 1500);
    }

    #[test]
    fn debug_masks_api_key() {
        let config = BackendConfig {
            model: "gpt-4.1".into(),
            api_key: "sk-secret".into(),
            base_url: None,
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("***"));
    }

    #[test]
    fn explicit_missing_path_fails() {
        let err = load_config_from(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }
}
