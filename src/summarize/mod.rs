//! Summarization module
//!
//! Condenses fetched page text with a chat-completion model.

mod openai;

pub use openai::OpenAiSummarizer;

use async_trait::async_trait;
use thiserror::Error;

/// Errors from a single summarize call
#[derive(Debug, Error)]
pub enum SummarizeError {
    #[error("no content to summarize")]
    EmptyInput,

    #[error("summarization request timed out")]
    Timeout,

    #[error("summarization provider unreachable: {0}")]
    Network(String),

    #[error("summarization provider rate limit exceeded")]
    RateLimited,

    #[error("summarization provider rejected credentials (HTTP {0})")]
    Unauthorized(u16),

    #[error("summarization provider returned HTTP {0}")]
    Http(u16),

    #[error("malformed completion: {0}")]
    Malformed(String),
}

/// Produces a short natural-language summary of a text
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, text: &str, instruction: &str) -> Result<String, SummarizeError>;
}
