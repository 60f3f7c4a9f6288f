//! Benchmark dataset access.
//!
//! Read-only slice queries by dataset name and split, plus the shared
//! issue-record representation consumed by the evaluation loop.

pub mod swe_bench;
pub mod types;

pub use swe_bench::{filter_by_repo, SweBenchDataset, DEFAULT_DATASET, DEFAULT_SPLIT};
pub use types::{DatasetError, DatasetResult, IssueRecord};
