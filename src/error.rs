//! Error types for evaluation-run operations.
//!
//! Subsystem errors (`DatasetError`, `ActionError`, `AgentError`,
//! `DescriptionError`) live next to their modules; this module defines the
//! per-issue error that the run loop records, distinguishing bad input
//! records from collaborator call failures.

use thiserror::Error;

use crate::actions::ActionError;
use crate::agent::AgentError;
use crate::description::DescriptionError;

/// Failure while processing a single issue record.
#[derive(Debug, Error)]
pub enum IssueError {
    /// The record itself is unusable (e.g. empty problem statement).
    #[error("invalid issue record: {0}")]
    InvalidRecord(#[from] DescriptionError),

    /// A workspace provisioning or repository action failed.
    #[error("workspace action failed: {0}")]
    Workspace(#[from] ActionError),

    /// The coding agent failed or timed out.
    #[error("agent run failed: {0}")]
    Agent(#[from] AgentError),
}

impl IssueError {
    /// Whether this failure is a permanent data problem rather than a
    /// collaborator call failure.
    pub fn is_input_error(&self) -> bool {
        matches!(self, IssueError::InvalidRecord(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_error_classification() {
        let err = IssueError::from(DescriptionError::EmptyProblemStatement);
        assert!(err.is_input_error());

        let err = IssueError::from(ActionError::Http("connection refused".to_string()));
        assert!(!err.is_input_error());
    }

    #[test]
    fn test_issue_error_display() {
        let err = IssueError::from(DescriptionError::EmptyProblemStatement);
        assert_eq!(
            err.to_string(),
            "invalid issue record: problem statement is empty"
        );
    }
}
