//! Search engine module
//!
//! Defines the Engine trait, the search APIs behind it and the provider that
//! executes engine requests.

mod loader;
mod provider;
mod traits;

// Engine implementations
pub mod brave;
pub mod google;

pub use loader::EngineLoader;
pub use provider::{EngineSearchProvider, SearchError, SearchProvider};
pub use traits::*;
