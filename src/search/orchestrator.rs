//! Query orchestration
//!
//! Runs search once, then fetch and summarize for every result
//! concurrently. Only search problems abort a query; anything that goes
//! wrong later degrades the affected entry.

use super::error::PipelineError;
use super::models::{ItemStatus, ResultSummary, SearchResult, SummaryResponse};
use crate::config::{Settings, DEFAULT_INSTRUCTION};
use crate::content::{truncate_chars, ContentFetcher};
use crate::engines::{SearchError, SearchProvider};
use crate::metrics::{Metrics, Stage};
use crate::summarize::Summarizer;
use futures::future::join_all;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, info, info_span, warn, Instrument};

/// Knobs for one orchestrator instance
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Results requested from the search provider
    pub result_count: usize,
    /// System instruction passed to the summarizer
    pub instruction: String,
    pub search_timeout: Duration,
    pub fetch_timeout: Duration,
    pub summarize_timeout: Duration,
    /// Extra search attempts after a timeout or network failure
    pub search_retries: u32,
    /// Upper bound on characters handed to the summarizer
    pub max_content_chars: usize,
}

impl PipelineOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            result_count: settings.search.result_count,
            instruction: settings.summarizer.instruction.clone(),
            search_timeout: settings.search.timeout(),
            fetch_timeout: settings.fetch.timeout(),
            summarize_timeout: settings.summarizer.timeout(),
            search_retries: settings.search.retries,
            max_content_chars: settings.fetch.max_chars,
        }
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            result_count: crate::DEFAULT_RESULT_COUNT,
            instruction: DEFAULT_INSTRUCTION.to_string(),
            search_timeout: Duration::from_secs_f64(crate::DEFAULT_TIMEOUT),
            fetch_timeout: Duration::from_secs_f64(crate::DEFAULT_TIMEOUT),
            summarize_timeout: Duration::from_secs(30),
            search_retries: 0,
            max_content_chars: crate::MAX_CONTENT_CHARS,
        }
    }
}

/// Search, fetch and summarize pipeline
///
/// Cheap to clone; every clone shares the same adapters and metrics.
#[derive(Clone)]
pub struct Orchestrator {
    search: Arc<dyn SearchProvider>,
    fetcher: Arc<dyn ContentFetcher>,
    summarizer: Arc<dyn Summarizer>,
    metrics: Arc<Metrics>,
    options: Arc<PipelineOptions>,
}

impl Orchestrator {
    pub fn new(
        search: Arc<dyn SearchProvider>,
        fetcher: Arc<dyn ContentFetcher>,
        summarizer: Arc<dyn Summarizer>,
    ) -> Self {
        Self {
            search,
            fetcher,
            summarizer,
            metrics: Arc::new(Metrics::new()),
            options: Arc::new(PipelineOptions::default()),
        }
    }

    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = Arc::new(options);
        self
    }

    /// Share an existing metrics collector
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Answer a query with one summary entry per search result
    ///
    /// Entries come back in search order. Each one either carries a model
    /// summary or one of the fixed placeholders.
    pub async fn process(&self, query: &str) -> Result<SummaryResponse, PipelineError> {
        let span = info_span!("query", id = %uuid::Uuid::new_v4());
        self.process_inner(query).instrument(span).await
    }

    async fn process_inner(&self, query: &str) -> Result<SummaryResponse, PipelineError> {
        if query.trim().is_empty() {
            return Err(PipelineError::EmptyQuery);
        }

        self.metrics.inc_query();
        info!("Processing query '{}'", query);

        let results = self.search(query).await?;
        if results.is_empty() {
            info!("No search results for '{}'", query);
            self.metrics.inc_not_found();
            return Err(PipelineError::NoResults);
        }

        debug!("Summarizing {} results", results.len());

        let handles: Vec<_> = results
            .iter()
            .cloned()
            .map(|result| {
                let this = self.clone();
                tokio::spawn(async move { this.process_item(result).await }.in_current_span())
            })
            .collect();

        let individual_summaries = join_all(handles)
            .await
            .into_iter()
            .zip(results.iter())
            .map(|(joined, result)| match joined {
                Ok(summary) => summary,
                Err(e) => {
                    warn!("Item task for {} aborted: {}", result.link, e);
                    self.metrics.record_item(ItemStatus::SummarizeFailed);
                    ResultSummary::degraded(result, ItemStatus::SummarizeFailed)
                }
            })
            .collect::<Vec<_>>();

        let response = SummaryResponse {
            query: query.to_string(),
            individual_summaries,
        };

        info!(
            "Query '{}' done: {} entries, {} degraded",
            query,
            response.individual_summaries.len(),
            response.degraded_count()
        );

        Ok(response)
    }

    /// Run the search stage with its timeout and retry budget
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, PipelineError> {
        let options = &self.options;
        let mut attempt = 0;

        loop {
            let start = Instant::now();
            let outcome = timeout(
                options.search_timeout,
                self.search.search(query, options.result_count),
            )
            .await;
            self.metrics
                .record_stage_time(Stage::Search, start.elapsed().as_millis() as u64);

            let err = match outcome {
                Ok(Ok(mut results)) => {
                    results.truncate(options.result_count);
                    debug!(
                        "{} returned {} results in {:?}",
                        self.search.name(),
                        results.len(),
                        start.elapsed()
                    );
                    return Ok(results);
                }
                Ok(Err(SearchError::Timeout)) | Err(_) => {
                    PipelineError::SearchTimeout(options.search_timeout)
                }
                Ok(Err(e)) => PipelineError::Search(e),
            };

            let retryable = matches!(
                err,
                PipelineError::SearchTimeout(_) | PipelineError::Search(SearchError::Network(_))
            );
            if retryable && attempt < options.search_retries {
                attempt += 1;
                warn!(
                    "Search via {} failed ({}), retrying {}/{}",
                    self.search.name(),
                    err,
                    attempt,
                    options.search_retries
                );
                continue;
            }

            warn!("Search via {} failed: {}", self.search.name(), err);
            self.metrics.inc_search_failure();
            return Err(err);
        }
    }

    /// Fetch and summarize one result; never fails
    async fn process_item(&self, result: SearchResult) -> ResultSummary {
        let options = &self.options;

        let start = Instant::now();
        let content = match timeout(options.fetch_timeout, self.fetcher.fetch(&result.link)).await
        {
            Ok(content) => content,
            Err(_) => {
                warn!("Fetching {} timed out after {:?}", result.link, options.fetch_timeout);
                String::new()
            }
        };
        self.metrics
            .record_stage_time(Stage::Fetch, start.elapsed().as_millis() as u64);

        if content.trim().is_empty() {
            debug!("No content for {}", result.link);
            self.metrics.record_item(ItemStatus::FetchFailed);
            return ResultSummary::degraded(&result, ItemStatus::FetchFailed);
        }

        let (text, truncated) = truncate_chars(&content, options.max_content_chars);
        if truncated {
            debug!(
                "Content from {} cut to {} characters",
                result.link, options.max_content_chars
            );
            self.metrics.inc_truncation();
        }

        let start = Instant::now();
        let outcome = timeout(
            options.summarize_timeout,
            self.summarizer.summarize(text, &options.instruction),
        )
        .await;
        self.metrics
            .record_stage_time(Stage::Summarize, start.elapsed().as_millis() as u64);

        match outcome {
            Ok(Ok(summary)) => {
                self.metrics.record_item(ItemStatus::Summarized);
                ResultSummary::summarized(&result, summary)
            }
            Ok(Err(e)) => {
                warn!("Summarizing {} failed: {}", result.link, e);
                self.metrics.record_item(ItemStatus::SummarizeFailed);
                ResultSummary::degraded(&result, ItemStatus::SummarizeFailed)
            }
            Err(_) => {
                warn!(
                    "Summarizing {} timed out after {:?}",
                    result.link, options.summarize_timeout
                );
                self.metrics.record_item(ItemStatus::SummarizeFailed);
                ResultSummary::degraded(&result, ItemStatus::SummarizeFailed)
            }
        }
    }
}
