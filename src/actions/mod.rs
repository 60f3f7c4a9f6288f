//! Remote action-execution client.
//!
//! All workspace provisioning and repository operations are delegated to a
//! remote action-execution service; this module defines the client contract
//! and the wire types for the actions the driver invokes:
//!
//! 1. Create an isolated workspace
//! 2. Clone a repository into a workspace (with a reset-only mode)

pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use http::HttpActionClient;

/// Response from a create-workspace action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWorkspaceResponse {
    /// Opaque identifier for the provisioned workspace.
    pub workspace_id: String,
}

/// Parameters for a clone-repository action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloneRepositoryRequest {
    /// Target workspace identifier.
    pub workspace_id: String,
    /// Repository in "owner/repo" format.
    pub repo_name: String,
    /// When true, reset an existing clone to its base commit instead of
    /// cloning from scratch.
    #[serde(default)]
    pub just_reset: bool,
}

impl CloneRepositoryRequest {
    /// Build a full-clone request.
    pub fn clone_into(workspace_id: impl Into<String>, repo_name: impl Into<String>) -> Self {
        Self {
            workspace_id: workspace_id.into(),
            repo_name: repo_name.into(),
            just_reset: false,
        }
    }

    /// Build a reset-only request against an existing clone.
    pub fn reset(workspace_id: impl Into<String>, repo_name: impl Into<String>) -> Self {
        Self {
            workspace_id: workspace_id.into(),
            repo_name: repo_name.into(),
            just_reset: true,
        }
    }
}

/// Error type for remote action invocations.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Action '{action}' failed: {message}")]
    ActionFailed { action: String, message: String },

    #[error("Failed to parse action response: {0}")]
    ParseError(String),
}

/// Client contract for the remote action-execution service.
///
/// The service behind this trait owns all real systems complexity
/// (containers, git, sandboxing); the driver only sees opaque workspace
/// identifiers and success/failure per action.
#[async_trait]
pub trait ActionClient: Send + Sync {
    /// Provision a new isolated workspace and return its identifier.
    async fn create_workspace(&self) -> Result<CreateWorkspaceResponse, ActionError>;

    /// Clone a repository into a workspace, or reset an existing clone when
    /// `just_reset` is set.
    async fn clone_repository(&self, request: &CloneRepositoryRequest) -> Result<(), ActionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clone_request_constructors() {
        let full = CloneRepositoryRequest::clone_into("ws-1", "django/django");
        assert!(!full.just_reset);
        assert_eq!(full.workspace_id, "ws-1");
        assert_eq!(full.repo_name, "django/django");

        let reset = CloneRepositoryRequest::reset("ws-1", "django/django");
        assert!(reset.just_reset);
    }

    #[test]
    fn test_clone_request_serialization() {
        let request = CloneRepositoryRequest::reset("ws-9", "sympy/sympy");
        let json = serde_json::to_value(&request).expect("serialization should succeed");
        assert_eq!(json["workspace_id"], "ws-9");
        assert_eq!(json["just_reset"], true);

        // just_reset defaults to false when absent on the wire
        let parsed: CloneRepositoryRequest =
            serde_json::from_str(r#"{"workspace_id": "ws-2", "repo_name": "a/b"}"#)
                .expect("deserialization should succeed");
        assert!(!parsed.just_reset);
    }

    #[test]
    fn test_action_error_display() {
        let err = ActionError::ActionFailed {
            action: "create_workspace".to_string(),
            message: "out of capacity".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Action 'create_workspace' failed: out of capacity"
        );
    }
}
