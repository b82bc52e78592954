//! Search orchestration module
//!
//! Drives one query through search, fetch and summarize and assembles the
//! per-result response.

mod error;
mod models;
mod orchestrator;

pub use error::PipelineError;
pub use models::*;
pub use orchestrator::{Orchestrator, PipelineOptions};
