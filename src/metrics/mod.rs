//! Metrics collection module
//!
//! Tracks query outcomes, per-item degradation and stage latencies.

use crate::search::ItemStatus;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

/// Samples kept per stage for the rolling average
const MAX_SAMPLES: usize = 100;

/// Pipeline stages with their own latency series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Search,
    Fetch,
    Summarize,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::Fetch => "fetch",
            Self::Summarize => "summarize",
        }
    }
}

/// Global metrics collector
#[derive(Debug)]
pub struct Metrics {
    /// Queries accepted by the orchestrator
    total_queries: AtomicU64,
    /// Queries whose search returned nothing
    not_found: AtomicU64,
    /// Queries aborted by a failed or timed-out search
    search_failures: AtomicU64,
    /// Pages cut to the content limit
    truncations: AtomicU64,
    /// Items by outcome
    item_outcomes: RwLock<HashMap<ItemStatus, u64>>,
    /// Stage response times in ms, most recent last
    stage_times: RwLock<HashMap<Stage, Vec<u64>>>,
}

impl Metrics {
    /// Create a new metrics instance
    pub fn new() -> Self {
        Self {
            total_queries: AtomicU64::new(0),
            not_found: AtomicU64::new(0),
            search_failures: AtomicU64::new(0),
            truncations: AtomicU64::new(0),
            item_outcomes: RwLock::new(HashMap::new()),
            stage_times: RwLock::new(HashMap::new()),
        }
    }

    pub fn inc_query(&self) {
        self.total_queries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_not_found(&self) {
        self.not_found.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_search_failure(&self) {
        self.search_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_truncation(&self) {
        self.truncations.fetch_add(1, Ordering::Relaxed);
    }

    /// Record how one result's pipeline ended
    pub fn record_item(&self, status: ItemStatus) {
        if let Ok(mut outcomes) = self.item_outcomes.write() {
            *outcomes.entry(status).or_insert(0) += 1;
        }
    }

    /// Record a stage response time
    pub fn record_stage_time(&self, stage: Stage, time_ms: u64) {
        if let Ok(mut times) = self.stage_times.write() {
            let entry = times.entry(stage).or_default();
            if entry.len() >= MAX_SAMPLES {
                entry.remove(0);
            }
            entry.push(time_ms);
        }
    }

    pub fn get_total_queries(&self) -> u64 {
        self.total_queries.load(Ordering::Relaxed)
    }

    /// Items recorded with the given status
    pub fn get_item_count(&self, status: ItemStatus) -> u64 {
        self.item_outcomes
            .read()
            .ok()
            .and_then(|outcomes| outcomes.get(&status).copied())
            .unwrap_or(0)
    }

    /// Average response time for a stage
    pub fn get_avg_stage_time(&self, stage: Stage) -> Option<u64> {
        let times = self.stage_times.read().ok()?;
        times.get(&stage).and_then(|t| {
            if t.is_empty() {
                None
            } else {
                Some(t.iter().sum::<u64>() / t.len() as u64)
            }
        })
    }

    /// Percentage of items that got a real summary
    pub fn get_success_rate(&self) -> f64 {
        let ok = self.get_item_count(ItemStatus::Summarized);
        let total = ok
            + self.get_item_count(ItemStatus::FetchFailed)
            + self.get_item_count(ItemStatus::SummarizeFailed);
        if total == 0 {
            100.0
        } else {
            (ok as f64 / total as f64) * 100.0
        }
    }

    /// Snapshot for the stats endpoint
    pub fn snapshot(&self) -> MetricsSnapshot {
        let avg_stage_ms = [Stage::Search, Stage::Fetch, Stage::Summarize]
            .into_iter()
            .filter_map(|stage| {
                self.get_avg_stage_time(stage)
                    .map(|ms| (stage.as_str().to_string(), ms))
            })
            .collect();

        let items = [
            ItemStatus::Summarized,
            ItemStatus::FetchFailed,
            ItemStatus::SummarizeFailed,
        ]
        .into_iter()
        .map(|status| (status.as_str().to_string(), self.get_item_count(status)))
        .collect();

        MetricsSnapshot {
            total_queries: self.get_total_queries(),
            not_found: self.not_found.load(Ordering::Relaxed),
            search_failures: self.search_failures.load(Ordering::Relaxed),
            truncations: self.truncations.load(Ordering::Relaxed),
            items,
            success_rate: self.get_success_rate(),
            avg_stage_ms,
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub total_queries: u64,
    pub not_found: u64,
    pub search_failures: u64,
    pub truncations: u64,
    pub items: HashMap<String, u64>,
    pub success_rate: f64,
    pub avg_stage_ms: HashMap<String, u64>,
}
