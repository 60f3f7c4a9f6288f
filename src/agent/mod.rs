//! Coding-agent contract.
//!
//! The agent that actually attempts to resolve an issue is an external
//! collaborator. This module defines the constructor/run contract the
//! driver speaks: build the agent once from `CoderAgentArgs`, then invoke
//! `run` per issue with an `IssueConfig` and a workspace identifier.

pub mod process;

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::ModelEnvConfig;

pub use process::ProcessCoderAgent;

/// Per-issue configuration handed to the agent.
///
/// Constructed fresh for each issue and not retained by the driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueConfig {
    /// Repository in "owner/repo" format.
    pub repo_name: String,
    /// Benchmark instance identifier.
    pub issue_id: String,
    /// Commit the repository was reset to before the run.
    pub base_commit_id: String,
    /// Natural-language issue description.
    pub issue_desc: String,
}

/// Arguments for constructing a coding agent.
#[derive(Debug, Clone)]
pub struct CoderAgentArgs {
    /// Directory where the agent writes per-issue logs.
    pub agent_logs_dir: PathBuf,
    /// Command used to launch the agent process.
    pub command: String,
    /// Maximum run time per invocation.
    pub timeout: Duration,
    /// Model backend configuration exported to the agent.
    pub model_env: ModelEnvConfig,
}

impl CoderAgentArgs {
    /// Creates agent arguments with the given logs directory and defaults
    /// for everything else.
    pub fn new(agent_logs_dir: impl Into<PathBuf>) -> Self {
        Self {
            agent_logs_dir: agent_logs_dir.into(),
            command: crate::config::DEFAULT_AGENT_COMMAND.to_string(),
            timeout: Duration::from_secs(600),
            model_env: ModelEnvConfig::default(),
        }
    }

    /// Sets the agent launch command.
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = command.into();
        self
    }

    /// Sets the per-invocation timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the model backend configuration.
    pub fn with_model_env(mut self, model_env: ModelEnvConfig) -> Self {
        self.model_env = model_env;
        self
    }
}

/// Result of one agent invocation.
#[derive(Debug, Clone)]
pub struct AgentOutput {
    /// Exit code from the agent process.
    pub exit_code: i32,
    /// Standard output captured.
    pub stdout: String,
    /// Standard error captured.
    pub stderr: String,
    /// Execution duration.
    pub duration: Duration,
}

impl AgentOutput {
    /// Creates a new agent output.
    pub fn new(exit_code: i32, stdout: String, stderr: String, duration: Duration) -> Self {
        Self {
            exit_code,
            stdout,
            stderr,
            duration,
        }
    }

    /// Checks if the agent completed successfully (exit code 0).
    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Error type for agent operations.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("Agent execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Agent timed out after {0:?}")]
    Timeout(Duration),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Contract for coding agents.
#[async_trait]
pub trait CoderAgent: Send + Sync {
    /// Attempt to resolve an issue inside the given workspace.
    async fn run(
        &self,
        issue: &IssueConfig,
        workspace_id: &str,
    ) -> Result<AgentOutput, AgentError>;
}
