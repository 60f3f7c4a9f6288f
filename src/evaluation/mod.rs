//! Evaluation run loop.
//!
//! Processes a slice of issue records strictly sequentially: resolve a
//! workspace for the record's repository, build the issue description,
//! package the issue configuration, and invoke the coding agent. A failure
//! while processing one record is recorded as a typed outcome and never
//! stops the run.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::actions::ActionClient;
use crate::agent::{AgentOutput, CoderAgent, IssueConfig};
use crate::dataset::IssueRecord;
use crate::description::build_issue_description;
use crate::error::IssueError;
use crate::workspace::WorkspaceRegistry;

/// Terminal state of one issue record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    /// The agent was invoked and returned.
    Completed,
    /// The record itself was unusable.
    InvalidRecord,
    /// Workspace provisioning or repository reset failed.
    WorkspaceError,
    /// The agent failed to run or timed out.
    AgentError,
}

impl std::fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::InvalidRecord => write!(f, "invalid_record"),
            Self::WorkspaceError => write!(f, "workspace_error"),
            Self::AgentError => write!(f, "agent_error"),
        }
    }
}

/// Outcome of processing one issue record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueOutcome {
    /// Benchmark instance identifier.
    pub issue_id: String,
    /// Repository the issue belongs to.
    pub repo: String,
    /// Terminal state.
    pub status: IssueStatus,
    /// Agent exit code, when the agent ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_exit_code: Option<i32>,
    /// Failure description, when processing failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Wall-clock time spent on this record.
    pub duration_secs: f64,
}

impl IssueOutcome {
    fn completed(record: &IssueRecord, output: &AgentOutput, duration_secs: f64) -> Self {
        Self {
            issue_id: record.instance_id.clone(),
            repo: record.repo.clone(),
            status: IssueStatus::Completed,
            agent_exit_code: Some(output.exit_code),
            error: None,
            duration_secs,
        }
    }

    fn failed(record: &IssueRecord, err: &IssueError, duration_secs: f64) -> Self {
        let status = match err {
            IssueError::InvalidRecord(_) => IssueStatus::InvalidRecord,
            IssueError::Workspace(_) => IssueStatus::WorkspaceError,
            IssueError::Agent(_) => IssueStatus::AgentError,
        };
        Self {
            issue_id: record.instance_id.clone(),
            repo: record.repo.clone(),
            status,
            agent_exit_code: None,
            error: Some(err.to_string()),
            duration_secs,
        }
    }
}

/// Summary of one evaluation run, returned to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalSummary {
    /// Number of records processed.
    pub total: usize,
    /// Records for which the agent was invoked and returned.
    pub completed: usize,
    /// Records rejected as unusable input.
    pub invalid_record: usize,
    /// Records that failed on a workspace action.
    pub workspace_error: usize,
    /// Records that failed inside the agent invocation.
    pub agent_error: usize,
    /// Per-record outcomes, in processing order.
    pub outcomes: Vec<IssueOutcome>,
    /// RFC 3339 timestamp of run completion.
    pub finished_at: String,
}

impl EvalSummary {
    fn from_outcomes(outcomes: Vec<IssueOutcome>) -> Self {
        let count = |status: IssueStatus| outcomes.iter().filter(|o| o.status == status).count();
        Self {
            total: outcomes.len(),
            completed: count(IssueStatus::Completed),
            invalid_record: count(IssueStatus::InvalidRecord),
            workspace_error: count(IssueStatus::WorkspaceError),
            agent_error: count(IssueStatus::AgentError),
            outcomes,
            finished_at: Utc::now().to_rfc3339(),
        }
    }
}

/// Sequential evaluation driver.
pub struct EvalRunner {
    /// Remote action-execution client.
    actions: Arc<dyn ActionClient>,
    /// The coding agent under evaluation.
    agent: Arc<dyn CoderAgent>,
}

impl EvalRunner {
    /// Creates a runner over the given collaborators.
    pub fn new(actions: Arc<dyn ActionClient>, agent: Arc<dyn CoderAgent>) -> Self {
        Self { actions, agent }
    }

    /// Process every record in order and return the run summary.
    ///
    /// The workspace registry is scoped to this call: repeated repositories
    /// within the slice reuse the workspace provisioned on first sight.
    pub async fn run(&self, issues: &[IssueRecord]) -> EvalSummary {
        let mut registry = WorkspaceRegistry::new(self.actions.clone());
        let mut outcomes = Vec::with_capacity(issues.len());

        for (count, issue) in issues.iter().enumerate() {
            info!(
                count = count + 1,
                total = issues.len(),
                issue_id = %issue.instance_id,
                repo = %issue.repo,
                provisioned_repos = registry.len(),
                "Processing issue"
            );

            let start = Instant::now();
            match self.process_issue(&mut registry, issue).await {
                Ok(output) => {
                    info!(
                        issue_id = %issue.instance_id,
                        exit_code = output.exit_code,
                        elapsed = ?output.duration,
                        "Agent finished"
                    );
                    outcomes.push(IssueOutcome::completed(
                        issue,
                        &output,
                        start.elapsed().as_secs_f64(),
                    ));
                }
                Err(e) => {
                    error!(issue_id = %issue.instance_id, error = %e, "Error processing issue");
                    outcomes.push(IssueOutcome::failed(
                        issue,
                        &e,
                        start.elapsed().as_secs_f64(),
                    ));
                }
            }
        }

        EvalSummary::from_outcomes(outcomes)
    }

    /// Process a single record: workspace, description, agent.
    async fn process_issue(
        &self,
        registry: &mut WorkspaceRegistry,
        issue: &IssueRecord,
    ) -> Result<AgentOutput, IssueError> {
        let workspace_id = registry.acquire(&issue.repo).await?;

        let issue_desc =
            build_issue_description(issue.hints_text.as_deref(), &issue.problem_statement)?;
        debug!(
            issue_id = %issue.instance_id,
            patch_lines = issue.patch.as_deref().map_or(0, |p| p.lines().count()),
            install_commit = issue.environment_setup_commit.as_deref().unwrap_or(""),
            "Issue description built"
        );

        let config = IssueConfig {
            repo_name: issue.repo.clone(),
            issue_id: issue.instance_id.clone(),
            base_commit_id: issue.base_commit.clone(),
            issue_desc,
        };

        info!(issue_id = %config.issue_id, workspace_id = %workspace_id, "Starting agent for issue");
        let output = self.agent.run(&config, &workspace_id).await?;
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::agent::AgentError;
    use crate::workspace::tests::RecordingActionClient;

    /// Agent stub that records invocations and can fail selectively.
    struct StubAgent {
        runs: Mutex<Vec<(String, String)>>,
        fail_for: Option<String>,
    }

    impl StubAgent {
        fn new() -> Self {
            Self {
                runs: Mutex::new(Vec::new()),
                fail_for: None,
            }
        }

        fn failing_for(issue_id: &str) -> Self {
            Self {
                runs: Mutex::new(Vec::new()),
                fail_for: Some(issue_id.to_string()),
            }
        }
    }

    #[async_trait]
    impl CoderAgent for StubAgent {
        async fn run(
            &self,
            issue: &IssueConfig,
            workspace_id: &str,
        ) -> Result<AgentOutput, AgentError> {
            self.runs
                .lock()
                .unwrap()
                .push((issue.issue_id.clone(), workspace_id.to_string()));
            if self.fail_for.as_deref() == Some(issue.issue_id.as_str()) {
                return Err(AgentError::ExecutionFailed("agent crashed".to_string()));
            }
            Ok(AgentOutput::new(
                0,
                String::new(),
                String::new(),
                Duration::from_millis(1),
            ))
        }
    }

    fn record(issue_id: &str, repo: &str, problem: &str) -> IssueRecord {
        IssueRecord {
            instance_id: issue_id.to_string(),
            repo: repo.to_string(),
            base_commit: "abc123".to_string(),
            patch: None,
            hints_text: None,
            problem_statement: problem.to_string(),
            environment_setup_commit: None,
            version: None,
            created_at: None,
            fail_to_pass: None,
            pass_to_pass: None,
        }
    }

    #[tokio::test]
    async fn test_all_records_completed() {
        let actions = Arc::new(RecordingActionClient::new());
        let agent = Arc::new(StubAgent::new());
        let runner = EvalRunner::new(actions, agent.clone());

        let issues = vec![
            record("a-1", "x/a", "Fix a"),
            record("b-1", "x/b", "Fix b"),
        ];
        let summary = runner.run(&issues).await;

        assert_eq!(summary.total, 2);
        assert_eq!(summary.completed, 2);
        assert_eq!(agent.runs.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_bad_record_does_not_stop_the_run() {
        let actions = Arc::new(RecordingActionClient::new());
        let agent = Arc::new(StubAgent::new());
        let runner = EvalRunner::new(actions, agent.clone());

        let issues = vec![
            record("a-1", "x/a", "Fix a"),
            record("a-2", "x/a", "   "),
            record("a-3", "x/a", "Fix c"),
        ];
        let summary = runner.run(&issues).await;

        assert_eq!(summary.total, 3);
        assert_eq!(summary.completed, 2);
        assert_eq!(summary.invalid_record, 1);
        assert_eq!(summary.outcomes[1].status, IssueStatus::InvalidRecord);
        assert!(summary.outcomes[1]
            .error
            .as_deref()
            .unwrap()
            .contains("problem statement is empty"));

        // The record after the bad one was still processed.
        let runs = agent.runs.lock().unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[1].0, "a-3");
    }

    #[tokio::test]
    async fn test_repeated_repo_reuses_workspace() {
        let actions = Arc::new(RecordingActionClient::new());
        let agent = Arc::new(StubAgent::new());
        let runner = EvalRunner::new(actions.clone(), agent.clone());

        let issues = vec![
            record("a-1", "django/django", "Fix a"),
            record("a-2", "django/django", "Fix b"),
        ];
        let summary = runner.run(&issues).await;
        assert_eq!(summary.completed, 2);

        // One workspace creation; the second clone was reset-only.
        assert_eq!(*actions.created.lock().unwrap(), 1);
        let clones = actions.clones.lock().unwrap();
        assert_eq!(clones.len(), 2);
        assert!(clones[1].just_reset);

        // Both agent invocations saw the same workspace id.
        let runs = agent.runs.lock().unwrap();
        assert_eq!(runs[0].1, runs[1].1);
    }

    #[tokio::test]
    async fn test_workspace_failure_is_typed() {
        let actions = Arc::new(RecordingActionClient {
            fail_create: true,
            ..RecordingActionClient::new()
        });
        let agent = Arc::new(StubAgent::new());
        let runner = EvalRunner::new(actions, agent.clone());

        let summary = runner.run(&[record("a-1", "x/a", "Fix a")]).await;
        assert_eq!(summary.workspace_error, 1);
        assert_eq!(summary.completed, 0);
        assert!(agent.runs.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_agent_failure_is_typed_and_run_continues() {
        let actions = Arc::new(RecordingActionClient::new());
        let agent = Arc::new(StubAgent::failing_for("a-1"));
        let runner = EvalRunner::new(actions, agent);

        let issues = vec![
            record("a-1", "x/a", "Fix a"),
            record("a-2", "x/a", "Fix b"),
        ];
        let summary = runner.run(&issues).await;

        assert_eq!(summary.agent_error, 1);
        assert_eq!(summary.completed, 1);
        assert_eq!(summary.outcomes[0].status, IssueStatus::AgentError);
        assert_eq!(summary.outcomes[1].status, IssueStatus::Completed);
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&IssueStatus::WorkspaceError).unwrap();
        assert_eq!(json, "\"workspace_error\"");
    }
}
