//! Engine traits and types

use crate::config::SearchSettings;
use crate::network::{HttpRequest, HttpResponse};
use crate::search::SearchResult;

/// Parameters for building a search request
#[derive(Debug, Clone)]
pub struct RequestParams {
    /// Search query string
    pub query: String,
    /// Maximum number of results wanted
    pub count: usize,
}

impl RequestParams {
    pub fn new(query: impl Into<String>, count: usize) -> Self {
        Self {
            query: query.into(),
            count,
        }
    }
}

/// A web search API: builds the request and parses the response
///
/// Engines do no I/O themselves; [`EngineSearchProvider`](super::EngineSearchProvider)
/// executes the request they build.
pub trait Engine: Send + Sync {
    /// Engine name
    fn name(&self) -> &str;

    /// Most results a single request can return
    fn max_results(&self) -> usize {
        10
    }

    /// Build the HTTP request for a search
    fn request(&self, params: &RequestParams) -> anyhow::Result<HttpRequest>;

    /// Parse the HTTP response into results, in provider order
    fn response(&self, response: HttpResponse) -> anyhow::Result<Vec<SearchResult>>;

    /// Apply credentials and endpoint overrides (called once on startup)
    fn init(&mut self, _config: &SearchSettings) -> anyhow::Result<()> {
        Ok(())
    }

    /// Check that everything the engine needs is configured
    fn validate(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
