//! Application state shared across handlers

use crate::config::Settings;
use crate::metrics::Metrics;
use crate::search::Orchestrator;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Global settings
    pub settings: Arc<Settings>,
    /// Query pipeline
    pub orchestrator: Orchestrator,
    /// Counters shared with the pipeline
    pub metrics: Arc<Metrics>,
    /// Server start time, reported by /stats
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Create new application state around a built orchestrator
    pub fn new(settings: Settings, orchestrator: Orchestrator) -> Self {
        let metrics = orchestrator.metrics().clone();
        Self {
            settings: Arc::new(settings),
            orchestrator,
            metrics,
            started_at: Utc::now(),
        }
    }

    /// Seconds since the state was created
    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}
