//! Common types for benchmark dataset access.
//!
//! Defines the issue-record representation shared by the evaluation loop
//! and the error type for dataset slice queries.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while querying a benchmark dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Failed to parse response data.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// API rate limit exceeded.
    #[error("Rate limited: retry after {retry_after:?} seconds")]
    RateLimited {
        /// Optional retry-after duration in seconds.
        retry_after: Option<u64>,
    },

    /// Invalid or unexpected response from the API.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for dataset operations.
pub type DatasetResult<T> = Result<T, DatasetError>;

/// One benchmark case describing a real-world software defect and its
/// reference fix.
///
/// Field layout mirrors the SWE-bench Lite schema: the test-selection lists
/// (`fail_to_pass` / `pass_to_pass`) are carried for completeness but not
/// consumed by the evaluation loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueRecord {
    /// Formatted instance identifier, usually `repo_owner__repo_name-PR-number`.
    pub instance_id: String,

    /// Repository owner/name identifier from GitHub.
    pub repo: String,

    /// Commit hash of the repository HEAD before the solution PR is applied.
    pub base_commit: String,

    /// The gold patch generated by the solution PR, minus test-related code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<String>,

    /// Comments made on the issue prior to the solution PR's first commit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hints_text: Option<String>,

    /// The issue title and body.
    pub problem_statement: String,

    /// Commit hash to use for environment setup and installation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment_setup_commit: Option<String>,

    /// Installation version used when running evaluation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Creation date of the solution pull request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    /// JSON list of tests resolved by the PR, tied to the issue resolution.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fail_to_pass: Option<String>,

    /// JSON list of tests that pass before and after the PR application.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pass_to_pass: Option<String>,
}
