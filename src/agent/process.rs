//! Process-spawning coding agent.
//!
//! Launches an external CLI agent per issue: the issue description goes in
//! on stdin, workspace and issue identifiers are passed as arguments, and
//! the model environment is exported as process environment variables.
//! Captured output is mirrored to a per-issue log file.

use std::process::Stdio;
use std::time::Instant;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};

use super::{AgentError, AgentOutput, CoderAgent, CoderAgentArgs, IssueConfig};

/// Coding agent backed by an external command.
pub struct ProcessCoderAgent {
    args: CoderAgentArgs,
}

impl ProcessCoderAgent {
    /// Creates an agent from the given arguments.
    pub fn new(args: CoderAgentArgs) -> Self {
        Self { args }
    }

    /// Write the captured output of one invocation under the agent logs
    /// directory as `<issue_id>.log`.
    async fn write_log(&self, issue_id: &str, output: &AgentOutput) -> Result<(), AgentError> {
        tokio::fs::create_dir_all(&self.args.agent_logs_dir).await?;

        let safe_id = issue_id.replace(['/', ' '], "_");
        let path = self.args.agent_logs_dir.join(format!("{safe_id}.log"));
        let contents = format!(
            "exit_code: {}\n--- stdout ---\n{}\n--- stderr ---\n{}\n",
            output.exit_code, output.stdout, output.stderr
        );
        tokio::fs::write(&path, contents).await?;
        debug!(path = %path.display(), "Agent log written");
        Ok(())
    }
}

#[async_trait]
impl CoderAgent for ProcessCoderAgent {
    async fn run(
        &self,
        issue: &IssueConfig,
        workspace_id: &str,
    ) -> Result<AgentOutput, AgentError> {
        let start = Instant::now();

        let mut parts = self.args.command.split_whitespace();
        let program = parts.next().ok_or_else(|| {
            AgentError::ExecutionFailed("agent command is empty".to_string())
        })?;

        let mut cmd = Command::new(program);
        cmd.args(parts)
            .arg("--workspace-id")
            .arg(workspace_id)
            .arg("--issue-id")
            .arg(&issue.issue_id)
            .env("MODEL_ENV", &self.args.model_env.model_env)
            .env("AZURE_ENDPOINT", &self.args.model_env.endpoint)
            .env("API_KEY", &self.args.model_env.api_key)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        info!(
            issue_id = %issue.issue_id,
            workspace_id = workspace_id,
            command = %self.args.command,
            "Starting coder agent"
        );

        let mut child = cmd.spawn().map_err(|e| {
            AgentError::ExecutionFailed(format!("Failed to spawn {}: {}", program, e))
        })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(issue.issue_desc.as_bytes())
                .await
                .map_err(|e| {
                    AgentError::ExecutionFailed(format!("Failed to write issue description: {}", e))
                })?;
            stdin.shutdown().await.ok();
        }

        let timeout_result =
            tokio::time::timeout(self.args.timeout, child.wait_with_output()).await;
        let duration = start.elapsed();

        match timeout_result {
            Ok(Ok(raw)) => {
                let exit_code = raw.status.code().unwrap_or(-1);
                let stdout = String::from_utf8_lossy(&raw.stdout).to_string();
                let stderr = String::from_utf8_lossy(&raw.stderr).to_string();

                debug!(issue_id = %issue.issue_id, exit_code, "Agent completed");

                let output = AgentOutput::new(exit_code, stdout, stderr, duration);
                self.write_log(&issue.issue_id, &output).await?;
                Ok(output)
            }
            Ok(Err(e)) => Err(AgentError::ExecutionFailed(format!("Process error: {}", e))),
            // kill_on_drop reaps the child once the timed-out future is dropped
            Err(_) => Err(AgentError::Timeout(self.args.timeout)),
        }
    }
}
