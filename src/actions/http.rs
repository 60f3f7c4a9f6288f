//! HTTP implementation of the action-execution client.
//!
//! Speaks a minimal JSON-over-HTTP protocol: each action is a POST to
//! `{base_url}/actions/{name}` with a JSON params body. The reply is a JSON
//! object; an `"error"` field signals action failure even on a 2xx status.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use super::{ActionClient, ActionError, CloneRepositoryRequest, CreateWorkspaceResponse};

/// Action name for workspace creation.
const ACTION_CREATE_WORKSPACE: &str = "create_workspace";

/// Action name for repository clone/reset.
const ACTION_CLONE_REPOSITORY: &str = "clone_repository";

/// HTTP client for the remote action-execution service.
pub struct HttpActionClient {
    /// HTTP client for action requests.
    http_client: Client,
    /// Base URL of the action-execution service.
    base_url: String,
}

impl HttpActionClient {
    /// Create a client for the service at `base_url`.
    ///
    /// Workspace creation can take minutes on a cold backend, so the request
    /// timeout is generous.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http_client: Client::builder()
                .timeout(Duration::from_secs(300))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Get the configured base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Invoke a named action with the given params and return the reply body.
    async fn execute<P: Serialize>(&self, action: &str, params: &P) -> Result<Value, ActionError> {
        let url = format!("{}/actions/{}", self.base_url, action);

        let response = self
            .http_client
            .post(&url)
            .json(params)
            .send()
            .await
            .map_err(|e| ActionError::Http(e.to_string()))?;

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| ActionError::ParseError(e.to_string()))?;

        if let Some(message) = body.get("error").and_then(Value::as_str) {
            return Err(ActionError::ActionFailed {
                action: action.to_string(),
                message: message.to_string(),
            });
        }

        if !status.is_success() {
            return Err(ActionError::Http(format!(
                "action '{}' returned status {}",
                action, status
            )));
        }

        Ok(body)
    }
}

#[async_trait]
impl ActionClient for HttpActionClient {
    async fn create_workspace(&self) -> Result<CreateWorkspaceResponse, ActionError> {
        let body = self
            .execute(ACTION_CREATE_WORKSPACE, &serde_json::json!({}))
            .await?;

        serde_json::from_value(body).map_err(|e| {
            ActionError::ParseError(format!("invalid create_workspace response: {}", e))
        })
    }

    async fn clone_repository(&self, request: &CloneRepositoryRequest) -> Result<(), ActionError> {
        self.execute(ACTION_CLONE_REPOSITORY, request).await?;
        Ok(())
    }
}
