//! Web server module
//!
//! Exposes the summarization pipeline over a small JSON API.

mod error;
mod handlers;
mod routes;
mod state;

pub use error::ApiError;
pub use handlers::QueryRequest;
pub use routes::create_router;
pub use state::AppState;
