//! Run configuration.
//!
//! Process-scoped configuration objects, built once at startup and passed
//! explicitly to the components that need them.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::dataset::{DEFAULT_DATASET, DEFAULT_SPLIT};

/// Default base URL for the action-execution service.
pub const DEFAULT_ACTIONS_URL: &str = "http://localhost:8700";

/// Default command used to launch the coding agent.
pub const DEFAULT_AGENT_COMMAND: &str = "python -m baseagent";

/// Default directory for per-issue agent logs.
pub const DEFAULT_AGENT_LOGS_DIR: &str = "./agent-logs";

/// Configuration for the agent's underlying model backend.
///
/// Constant across a run. Defaults are the placeholder credentials used in
/// offline runs; real values come from the CLI or environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelEnvConfig {
    /// API key for the model backend.
    pub api_key: String,
    /// Endpoint of the model backend.
    pub endpoint: String,
    /// Backend label (e.g. "azure").
    pub model_env: String,
}

impl Default for ModelEnvConfig {
    fn default() -> Self {
        Self {
            api_key: "test-key".to_string(),
            endpoint: "test-endpoint".to_string(),
            model_env: "azure".to_string(),
        }
    }
}

impl ModelEnvConfig {
    /// Sets the API key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    /// Sets the backend endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Sets the backend label.
    pub fn with_model_env(mut self, model_env: impl Into<String>) -> Self {
        self.model_env = model_env.into();
        self
    }
}

/// Configuration for one evaluation run.
#[derive(Debug, Clone)]
pub struct EvalConfig {
    /// HuggingFace dataset identifier.
    pub dataset_name: String,
    /// Dataset split to evaluate.
    pub split: String,
    /// Starting row offset of the slice.
    pub offset: usize,
    /// Number of records in the slice.
    pub count: usize,
    /// Optional repository filter applied to the slice.
    pub repo_filter: Option<String>,
    /// Base URL of the action-execution service.
    pub actions_url: String,
    /// Command used to launch the coding agent.
    pub agent_command: String,
    /// Maximum run time per agent invocation.
    pub agent_timeout: Duration,
    /// Directory for per-issue agent logs.
    pub agent_logs_dir: PathBuf,
    /// Model backend configuration handed to the agent.
    pub model_env: ModelEnvConfig,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            dataset_name: DEFAULT_DATASET.to_string(),
            split: DEFAULT_SPLIT.to_string(),
            offset: 1,
            count: 49,
            repo_filter: None,
            actions_url: DEFAULT_ACTIONS_URL.to_string(),
            agent_command: DEFAULT_AGENT_COMMAND.to_string(),
            agent_timeout: Duration::from_secs(600),
            agent_logs_dir: PathBuf::from(DEFAULT_AGENT_LOGS_DIR),
            model_env: ModelEnvConfig::default(),
        }
    }
}

impl EvalConfig {
    /// Sets the dataset identifier and split.
    pub fn with_dataset(mut self, dataset: impl Into<String>, split: impl Into<String>) -> Self {
        self.dataset_name = dataset.into();
        self.split = split.into();
        self
    }

    /// Sets the slice bounds.
    pub fn with_slice(mut self, offset: usize, count: usize) -> Self {
        self.offset = offset;
        self.count = count;
        self
    }

    /// Restricts the run to a single repository.
    pub fn with_repo_filter(mut self, repo: impl Into<String>) -> Self {
        self.repo_filter = Some(repo.into());
        self
    }

    /// Sets the action-execution service URL.
    pub fn with_actions_url(mut self, url: impl Into<String>) -> Self {
        self.actions_url = url.into();
        self
    }

    /// Sets the agent command.
    pub fn with_agent_command(mut self, command: impl Into<String>) -> Self {
        self.agent_command = command.into();
        self
    }

    /// Sets the per-invocation agent timeout.
    pub fn with_agent_timeout(mut self, timeout: Duration) -> Self {
        self.agent_timeout = timeout;
        self
    }

    /// Sets the agent logs directory.
    pub fn with_agent_logs_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.agent_logs_dir = dir.into();
        self
    }

    /// Sets the model backend configuration.
    pub fn with_model_env(mut self, model_env: ModelEnvConfig) -> Self {
        self.model_env = model_env;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_env_defaults_are_placeholders() {
        let config = ModelEnvConfig::default();
        assert_eq!(config.api_key, "test-key");
        assert_eq!(config.endpoint, "test-endpoint");
        assert_eq!(config.model_env, "azure");
    }

    #[test]
    fn test_eval_config_defaults() {
        let config = EvalConfig::default();
        assert_eq!(config.dataset_name, DEFAULT_DATASET);
        assert_eq!(config.split, "test");
        assert_eq!(config.offset, 1);
        assert_eq!(config.count, 49);
        assert!(config.repo_filter.is_none());
        assert_eq!(config.agent_timeout, Duration::from_secs(600));
    }

    #[test]
    fn test_eval_config_builder() {
        let config = EvalConfig::default()
            .with_dataset("princeton-nlp/SWE-bench", "dev")
            .with_slice(0, 10)
            .with_repo_filter("django/django")
            .with_agent_timeout(Duration::from_secs(60))
            .with_model_env(ModelEnvConfig::default().with_api_key("real-key"));

        assert_eq!(config.dataset_name, "princeton-nlp/SWE-bench");
        assert_eq!(config.split, "dev");
        assert_eq!(config.offset, 0);
        assert_eq!(config.count, 10);
        assert_eq!(config.repo_filter.as_deref(), Some("django/django"));
        assert_eq!(config.model_env.api_key, "real-key");
    }
}
