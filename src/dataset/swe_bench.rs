//! SWE-bench dataset provider.
//!
//! Read-only slice queries against the SWE-bench dataset hosted on
//! HuggingFace. Each row is one real bug instance from a popular Python
//! repository, with the associated gold patch and test metadata.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::types::{DatasetError, DatasetResult, IssueRecord};

/// Default dataset name for SWE-bench Lite on HuggingFace.
pub const DEFAULT_DATASET: &str = "princeton-nlp/SWE-bench_Lite";

/// Default split to fetch from the dataset.
pub const DEFAULT_SPLIT: &str = "test";

/// Base URL for HuggingFace datasets-server rows API.
const HUGGINGFACE_ROWS_API: &str = "https://datasets-server.huggingface.co/rows";

/// Maximum rows per request accepted by the rows API.
const MAX_PAGE_SIZE: usize = 100;

/// Provider for SWE-bench issue records.
///
/// # Example
///
/// ```ignore
/// use swe_eval::dataset::SweBenchDataset;
///
/// let dataset = SweBenchDataset::new();
/// let issues = dataset.fetch(1, 49).await?;
/// for issue in &issues {
///     println!("{} from {}", issue.instance_id, issue.repo);
/// }
/// ```
pub struct SweBenchDataset {
    /// HTTP client for API requests.
    http_client: Client,
    /// HuggingFace dataset name.
    dataset_name: String,
    /// Dataset split to fetch from.
    split: String,
}

impl SweBenchDataset {
    /// Create a provider for the SWE-bench_Lite "test" split.
    pub fn new() -> Self {
        Self::with_dataset(DEFAULT_DATASET, DEFAULT_SPLIT)
    }

    /// Create a provider for a specific dataset and split.
    ///
    /// # Arguments
    ///
    /// * `dataset_name` - HuggingFace dataset identifier (e.g., "princeton-nlp/SWE-bench")
    /// * `split` - Dataset split to use (e.g., "test", "train", "validation")
    pub fn with_dataset(dataset_name: impl Into<String>, split: impl Into<String>) -> Self {
        Self {
            http_client: Client::builder()
                .timeout(Duration::from_secs(60))
                .build()
                .expect("Failed to build HTTP client"),
            dataset_name: dataset_name.into(),
            split: split.into(),
        }
    }

    /// Get the current dataset name.
    pub fn dataset_name(&self) -> &str {
        &self.dataset_name
    }

    /// Get the current split.
    pub fn split(&self) -> &str {
        &self.split
    }

    /// Fetch a slice of issue records.
    ///
    /// # Arguments
    ///
    /// * `offset` - Starting row offset
    /// * `length` - Maximum number of records to fetch (capped at the API page size)
    ///
    /// # Errors
    ///
    /// Returns `DatasetError` if the HTTP request fails, the API returns an
    /// error status, or the response cannot be parsed.
    pub async fn fetch(&self, offset: usize, length: usize) -> DatasetResult<Vec<IssueRecord>> {
        let effective_length = length.min(MAX_PAGE_SIZE);

        let url = format!(
            "{}?dataset={}&config=default&split={}&offset={}&length={}",
            HUGGINGFACE_ROWS_API,
            urlencoding::encode(&self.dataset_name),
            urlencoding::encode(&self.split),
            offset,
            effective_length
        );

        let response = self
            .http_client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| DatasetError::HttpError(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok());
            return Err(DatasetError::RateLimited { retry_after });
        }

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(DatasetError::HttpError(format!(
                "API returned status {}: {}",
                status, error_text
            )));
        }

        let api_response: RowsResponse = response
            .json()
            .await
            .map_err(|e| DatasetError::ParseError(format!("Failed to parse response: {}", e)))?;

        let records = api_response
            .rows
            .into_iter()
            .filter_map(convert_row)
            .collect();

        Ok(records)
    }
}

impl Default for SweBenchDataset {
    fn default() -> Self {
        Self::new()
    }
}

/// Keep only records belonging to the given repository.
///
/// The query is trimmed and lowercased before comparison, so
/// `" Django/Django "` matches records with `repo == "django/django"`.
pub fn filter_by_repo(records: Vec<IssueRecord>, repo_name: &str) -> Vec<IssueRecord> {
    let needle = repo_name.trim().to_ascii_lowercase();
    records
        .into_iter()
        .filter(|r| r.repo == needle)
        .collect()
}

/// Convert a raw dataset row into an `IssueRecord`.
///
/// Rows missing `instance_id` or `repo` cannot be processed or reported
/// per-issue, so they are dropped here.
fn convert_row(row: Row) -> Option<IssueRecord> {
    let data = row.row;

    let Some(instance_id) = data.instance_id else {
        debug!(row_idx = row.row_idx, "Skipping row without instance_id");
        return None;
    };
    let Some(repo) = data.repo else {
        debug!(row_idx = row.row_idx, instance_id = %instance_id, "Skipping row without repo");
        return None;
    };

    Some(IssueRecord {
        instance_id,
        repo,
        base_commit: data.base_commit.unwrap_or_default(),
        patch: data.patch,
        hints_text: data.hints_text,
        problem_statement: data.problem_statement.unwrap_or_default(),
        environment_setup_commit: data.environment_setup_commit,
        version: data.version,
        created_at: data.created_at,
        fail_to_pass: data.fail_to_pass,
        pass_to_pass: data.pass_to_pass,
    })
}

/// Response structure from the HuggingFace rows API.
#[derive(Debug, Deserialize)]
struct RowsResponse {
    /// List of rows from the dataset.
    rows: Vec<Row>,
    /// Total number of rows in the dataset.
    #[allow(dead_code)]
    num_rows_total: Option<usize>,
}

/// A single row from the HuggingFace dataset.
#[derive(Debug, Deserialize)]
struct Row {
    /// Row index in the dataset.
    row_idx: usize,
    /// Row data containing the actual fields.
    row: RowData,
}

/// Data fields for a SWE-bench instance, all optional on the wire.
#[derive(Debug, Deserialize)]
struct RowData {
    instance_id: Option<String>,
    repo: Option<String>,
    base_commit: Option<String>,
    patch: Option<String>,
    hints_text: Option<String>,
    problem_statement: Option<String>,
    environment_setup_commit: Option<String>,
    version: Option<String>,
    created_at: Option<String>,
    #[serde(rename = "FAIL_TO_PASS")]
    fail_to_pass: Option<String>,
    #[serde(rename = "PASS_TO_PASS")]
    pass_to_pass: Option<String>,
}
