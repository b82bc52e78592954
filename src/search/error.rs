//! Request-level pipeline failures

use crate::engines::SearchError;
use std::time::Duration;
use thiserror::Error;

/// Failures that abort the whole query
///
/// Fetch and summarize problems never show up here; they degrade the
/// affected entry instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("query must not be empty")]
    EmptyQuery,

    #[error("No search results found.")]
    NoResults,

    #[error("search timed out after {0:?}")]
    SearchTimeout(Duration),

    #[error("search failed: {0}")]
    Search(#[from] SearchError),
}
