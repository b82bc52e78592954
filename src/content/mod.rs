//! Page content module
//!
//! Fetches result pages and turns them into bounded plain text.

mod extractor;
mod fetcher;

pub use extractor::{extract_html, extract_plain, truncate_chars, Extracted};
pub use fetcher::{ContentFetcher, FetchError, HttpContentFetcher};
