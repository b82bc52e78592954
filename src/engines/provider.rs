//! Search provider seam used by the orchestrator

use super::traits::{Engine, RequestParams};
use crate::network::{is_timeout, HttpClient};
use crate::search::SearchResult;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Errors from a single search call
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("failed to build search request: {0}")]
    Request(String),

    #[error("search request timed out")]
    Timeout,

    #[error("search provider unreachable: {0}")]
    Network(String),

    #[error("search provider returned an unusable response: {0}")]
    Response(String),
}

/// Maps a query to an ordered list of web results
///
/// Zero results is a valid answer; deciding what that means is left to the
/// caller.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Return at most `count` results in provider order
    async fn search(&self, query: &str, count: usize) -> Result<Vec<SearchResult>, SearchError>;

    /// Provider name for logging
    fn name(&self) -> &str;
}

/// Runs an [`Engine`]'s requests over the shared HTTP client
pub struct EngineSearchProvider {
    client: HttpClient,
    engine: Arc<dyn Engine>,
    timeout: Duration,
}

impl EngineSearchProvider {
    pub fn new(client: HttpClient, engine: Arc<dyn Engine>, timeout: Duration) -> Self {
        Self {
            client,
            engine,
            timeout,
        }
    }
}

#[async_trait]
impl SearchProvider for EngineSearchProvider {
    async fn search(&self, query: &str, count: usize) -> Result<Vec<SearchResult>, SearchError> {
        let params = RequestParams::new(query, count);
        let request = self
            .engine
            .request(&params)
            .map_err(|e| SearchError::Request(e.to_string()))?;

        let response = self
            .client
            .execute_with_timeout(request, self.timeout)
            .await
            .map_err(|e| {
                if is_timeout(&e) {
                    SearchError::Timeout
                } else {
                    SearchError::Network(e.to_string())
                }
            })?;

        let mut results = self
            .engine
            .response(response)
            .map_err(|e| SearchError::Response(e.to_string()))?;
        results.truncate(count);

        debug!(
            "Engine {} returned {} results for '{}'",
            self.engine.name(),
            results.len(),
            query
        );

        Ok(results)
    }

    fn name(&self) -> &str {
        self.engine.name()
    }
}
