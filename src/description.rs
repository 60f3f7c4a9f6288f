//! Issue-description builder.
//!
//! Assembles the natural-language instruction handed to the coding agent:
//! a fixed preamble, the problem statement, and an optional hint section.

use thiserror::Error;

/// Preamble placed before the problem statement.
const ISSUE_PREAMBLE: &str = "Here is the issue, that you have to solve all on your own:\n";

/// Preamble placed before the hints, when hints are present.
const HINTS_PREAMBLE: &str =
    "\n\nHere are few hints to solve the issue described in problem_statement: \n";

/// Validation error raised while building an issue description.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DescriptionError {
    #[error("problem statement is empty")]
    EmptyProblemStatement,
}

/// Build the issue description from hints and problem statement.
///
/// The problem statement is required and must contain at least one
/// non-whitespace character; hints are appended under their own preamble
/// only when present and non-empty. No other transformation is applied.
pub fn build_issue_description(
    hints: Option<&str>,
    problem_statement: &str,
) -> Result<String, DescriptionError> {
    if problem_statement.trim().is_empty() {
        return Err(DescriptionError::EmptyProblemStatement);
    }

    let mut description = String::with_capacity(
        ISSUE_PREAMBLE.len() + problem_statement.len() + hints.map_or(0, str::len),
    );
    description.push_str(ISSUE_PREAMBLE);
    description.push_str(problem_statement);

    if let Some(hints) = hints {
        if !hints.is_empty() {
            description.push_str(HINTS_PREAMBLE);
            description.push_str(hints);
        }
    }

    Ok(description)
}
