//! ragsum: search the web, fetch each hit and summarize it
//!
//! A query goes to a search provider, every returned page is fetched and
//! reduced to plain text, and each text is summarized by a chat-completion
//! model. Per-page failures degrade to placeholder summaries; only an empty
//! search result set fails the whole request.

pub mod config;
pub mod content;
pub mod engines;
pub mod metrics;
pub mod network;
pub mod search;
pub mod summarize;
pub mod web;

pub use config::Settings;
pub use content::{ContentFetcher, HttpContentFetcher};
pub use engines::{EngineSearchProvider, SearchProvider};
pub use search::{Orchestrator, PipelineError, ResultSummary, SearchResult, SummaryResponse};
pub use summarize::{OpenAiSummarizer, Summarizer};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Number of search results summarized per query
pub const DEFAULT_RESULT_COUNT: usize = 3;

/// Maximum characters of page text handed to the summarizer
pub const MAX_CONTENT_CHARS: usize = 2000;

/// Upper bound on tokens generated per summary
pub const SUMMARY_MAX_TOKENS: u32 = 150;

/// Default timeout for outbound requests in seconds
pub const DEFAULT_TIMEOUT: f64 = 10.0;
