//! Brave Search API engine

use super::traits::*;
use crate::config::SearchSettings;
use crate::network::{accept_json, HttpRequest, HttpResponse};
use crate::search::SearchResult;
use anyhow::{anyhow, Result as AnyhowResult};

const API_URL: &str = "https://api.search.brave.com/res/v1/web/search";

/// Brave web search through the official API
pub struct Brave {
    base_url: String,
    api_key: Option<String>,
}

impl Brave {
    pub fn new() -> Self {
        Self {
            base_url: API_URL.to_string(),
            api_key: None,
        }
    }

    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::new()
        }
    }

    fn parse_results(&self, json: &serde_json::Value) -> Vec<SearchResult> {
        let items = json
            .pointer("/web/results")
            .and_then(|r| r.as_array())
            .cloned()
            .unwrap_or_default();

        let mut results = Vec::new();

        for item in items {
            let url = item
                .get("url")
                .and_then(|u| u.as_str())
                .unwrap_or_default();

            if url.is_empty() {
                continue;
            }

            let title = item
                .get("title")
                .and_then(|t| t.as_str())
                .unwrap_or_default();

            let snippet = item
                .get("description")
                .and_then(|d| d.as_str())
                .unwrap_or_default();

            results.push(SearchResult::new(title, url).with_snippet(snippet));
        }

        results
    }
}

impl Default for Brave {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for Brave {
    fn name(&self) -> &str {
        "brave"
    }

    fn max_results(&self) -> usize {
        20
    }

    fn request(&self, params: &RequestParams) -> AnyhowResult<HttpRequest> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow!("Brave API key not configured"))?;

        Ok(HttpRequest::get(&self.base_url)
            .param("q", params.query.as_str())
            .param("count", params.count.clamp(1, self.max_results()).to_string())
            .header("Accept", accept_json())
            .header("X-Subscription-Token", api_key))
    }

    fn response(&self, response: HttpResponse) -> AnyhowResult<Vec<SearchResult>> {
        if response.is_rate_limited() {
            return Err(anyhow!("Brave API rate limit exceeded"));
        }
        if !response.is_success() {
            return Err(anyhow!("HTTP error: {}", response.status));
        }

        let json: serde_json::Value = response
            .json()
            .map_err(|e| anyhow!("Failed to parse JSON: {}", e))?;

        Ok(self.parse_results(&json))
    }

    fn init(&mut self, config: &SearchSettings) -> AnyhowResult<()> {
        self.api_key = config.api_key.clone();
        if let Some(ref url) = config.base_url {
            self.base_url = url.clone();
        }
        Ok(())
    }

    fn validate(&self) -> AnyhowResult<()> {
        if self.api_key.as_deref().map_or(true, str::is_empty) {
            return Err(anyhow!("BRAVE_API_KEY is not set"));
        }
        Ok(())
    }
}
