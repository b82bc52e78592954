//! HTTP networking module
//!
//! Outbound HTTP shared by the search provider, page fetcher and summarizer.

mod client;
mod types;
mod user_agent;

pub use client::{is_timeout, HttpClient, MAX_REDIRECTS};
pub use types::{HttpMethod, HttpRequest, HttpResponse, RequestBody};
pub use user_agent::{accept_json, generate_user_agent};
