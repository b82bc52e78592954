//! Pipeline data models

use serde::{Deserialize, Serialize};

/// Summary used when a page could not be fetched or yielded no text
pub const FETCH_FAILED_SUMMARY: &str = "Content could not be fetched from the source.";

/// Summary used when the summarizer failed for a fetched page
pub const SUMMARY_FAILED_SUMMARY: &str = "Failed to generate summary.";

/// A single search hit as returned by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub link: String,
    #[serde(default)]
    pub snippet: String,
}

impl SearchResult {
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            snippet: String::new(),
        }
    }

    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = snippet.into();
        self
    }
}

/// Outcome of one result's fetch and summarize stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// The summary is model output
    Summarized,
    /// Fetch failed or returned no text; summarizer was not called
    FetchFailed,
    /// Summarizer errored, timed out or the item task panicked
    SummarizeFailed,
}

impl ItemStatus {
    /// Placeholder summary for degraded statuses
    pub fn placeholder(&self) -> Option<&'static str> {
        match self {
            Self::Summarized => None,
            Self::FetchFailed => Some(FETCH_FAILED_SUMMARY),
            Self::SummarizeFailed => Some(SUMMARY_FAILED_SUMMARY),
        }
    }

    pub fn is_degraded(&self) -> bool {
        !matches!(self, Self::Summarized)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Summarized => "summarized",
            Self::FetchFailed => "fetch_failed",
            Self::SummarizeFailed => "summarize_failed",
        }
    }
}

/// One entry of the response, produced for every search result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSummary {
    pub title: String,
    pub summary: String,
    pub link: String,
    pub status: ItemStatus,
}

impl ResultSummary {
    /// Entry carrying a model-generated summary
    pub fn summarized(result: &SearchResult, summary: String) -> Self {
        Self {
            title: result.title.clone(),
            summary,
            link: result.link.clone(),
            status: ItemStatus::Summarized,
        }
    }

    /// Entry carrying the placeholder for a degraded status
    ///
    /// `status` must be degraded; `Summarized` entries come from
    /// [`ResultSummary::summarized`].
    pub fn degraded(result: &SearchResult, status: ItemStatus) -> Self {
        debug_assert!(
            status.is_degraded(),
            "degraded entry built with status {}",
            status.as_str()
        );
        let status = if status.is_degraded() {
            status
        } else {
            ItemStatus::SummarizeFailed
        };
        Self {
            title: result.title.clone(),
            summary: status
                .placeholder()
                .unwrap_or(SUMMARY_FAILED_SUMMARY)
                .to_string(),
            link: result.link.clone(),
            status,
        }
    }
}

/// Response for one query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub query: String,
    pub individual_summaries: Vec<ResultSummary>,
}

impl SummaryResponse {
    /// Number of entries carrying a placeholder summary
    pub fn degraded_count(&self) -> usize {
        self.individual_summaries
            .iter()
            .filter(|s| s.status.is_degraded())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degraded_entries_keep_title_and_link() {
        let result = SearchResult::new("Title", "https://example.com/a").with_snippet("snip");

        let fetch = ResultSummary::degraded(&result, ItemStatus::FetchFailed);
        assert_eq!(fetch.summary, FETCH_FAILED_SUMMARY);
        assert_eq!(fetch.title, "Title");
        assert_eq!(fetch.link, "https://example.com/a");

        let summarize = ResultSummary::degraded(&result, ItemStatus::SummarizeFailed);
        assert_eq!(summarize.summary, SUMMARY_FAILED_SUMMARY);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "degraded entry built with status summarized")]
    fn test_degraded_rejects_success_status() {
        let result = SearchResult::new("Title", "https://example.com/a");
        let _ = ResultSummary::degraded(&result, ItemStatus::Summarized);
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_value(ItemStatus::FetchFailed).unwrap();
        assert_eq!(json, "fetch_failed");
        assert_eq!(ItemStatus::SummarizeFailed.as_str(), "summarize_failed");
    }

    #[test]
    fn test_search_result_snippet_defaults_to_empty() {
        let result: SearchResult =
            serde_json::from_str(r#"{"title":"t","link":"https://example.com"}"#).unwrap();
        assert!(result.snippet.is_empty());
    }

    #[test]
    fn test_response_shape() {
        let result = SearchResult::new("T", "https://example.com");
        let response = SummaryResponse {
            query: "q".to_string(),
            individual_summaries: vec![
                ResultSummary::summarized(&result, "short".to_string()),
                ResultSummary::degraded(&result, ItemStatus::FetchFailed),
            ],
        };
        assert_eq!(response.degraded_count(), 1);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["query"], "q");
        assert_eq!(json["individual_summaries"][0]["summary"], "short");
        assert_eq!(json["individual_summaries"][1]["status"], "fetch_failed");
    }
}
