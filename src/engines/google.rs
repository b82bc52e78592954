//! Google Programmable Search (Custom Search JSON API)

use super::traits::*;
use crate::config::SearchSettings;
use crate::network::{accept_json, HttpRequest, HttpResponse};
use crate::search::SearchResult;
use anyhow::{anyhow, Result as AnyhowResult};
use serde::Deserialize;

const API_URL: &str = "https://www.googleapis.com/customsearch/v1";

/// Google Custom Search engine, needs a developer key and a `cx` id
pub struct Google {
    base_url: String,
    api_key: Option<String>,
    engine_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: Option<String>,
}

impl Google {
    pub fn new() -> Self {
        Self {
            base_url: API_URL.to_string(),
            api_key: None,
            engine_id: None,
        }
    }

    pub fn with_credentials(api_key: impl Into<String>, engine_id: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            engine_id: Some(engine_id.into()),
            ..Self::new()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl Default for Google {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for Google {
    fn name(&self) -> &str {
        "google"
    }

    fn request(&self, params: &RequestParams) -> AnyhowResult<HttpRequest> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow!("Google API key not configured"))?;
        let engine_id = self
            .engine_id
            .as_deref()
            .ok_or_else(|| anyhow!("Google search engine id not configured"))?;

        let num = params.count.clamp(1, self.max_results());

        Ok(HttpRequest::get(&self.base_url)
            .param("key", api_key)
            .param("cx", engine_id)
            .param("q", params.query.as_str())
            .param("num", num.to_string())
            .header("Accept", accept_json()))
    }

    fn response(&self, response: HttpResponse) -> AnyhowResult<Vec<SearchResult>> {
        if response.is_rate_limited() {
            return Err(anyhow!("Google API quota exceeded"));
        }
        if !response.is_success() {
            return Err(anyhow!("HTTP error: {}", response.status));
        }

        // A query without hits comes back without an `items` field
        let parsed: SearchResponse = response
            .json()
            .map_err(|e| anyhow!("Failed to parse JSON: {}", e))?;

        Ok(parsed
            .items
            .into_iter()
            .filter(|item| !item.link.is_empty())
            .map(|item| {
                SearchResult::new(item.title, item.link).with_snippet(item.snippet.unwrap_or_default())
            })
            .collect())
    }

    fn init(&mut self, config: &SearchSettings) -> AnyhowResult<()> {
        self.api_key = config.api_key.clone();
        self.engine_id = config.engine_id.clone();
        if let Some(ref url) = config.base_url {
            self.base_url = url.clone();
        }
        Ok(())
    }

    fn validate(&self) -> AnyhowResult<()> {
        if self.api_key.as_deref().map_or(true, str::is_empty) {
            return Err(anyhow!("GOOGLE_API_KEY is not set"));
        }
        if self.engine_id.as_deref().map_or(true, str::is_empty) {
            return Err(anyhow!("GOOGLE_CSE_ID is not set"));
        }
        Ok(())
    }
}
