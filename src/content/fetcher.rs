//! Page fetching for search result links
//!
//! Links come straight from the search provider, so every target is
//! untrusted: only http(s) is allowed, private hosts are refused by default,
//! and the body is only ever parsed for text.

use super::extractor::{extract_html, extract_plain, Extracted};
use crate::config::{FetchSettings, OutgoingSettings};
use crate::metrics::Metrics;
use crate::network::{is_timeout, HttpClient, HttpRequest, MAX_REDIRECTS};
use async_trait::async_trait;
use reqwest::redirect::Policy;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::{Host, Url};

/// Content fetch error types
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("unsafe URL blocked: {0}")]
    UnsafeUrl(String),

    #[error("timeout fetching: {0}")]
    Timeout(String),

    #[error("HTTP error: {0}")]
    Network(String),

    #[error("HTTP {0} for: {1}")]
    HttpStatus(u16, String),

    #[error("unsupported content type {0} for: {1}")]
    UnsupportedContent(String, String),
}

/// Redirect refused because its target failed the URL check
#[derive(Debug, Error)]
#[error("redirect to {0} blocked")]
struct BlockedRedirect(String);

/// Redirect policy that applies the URL check to every hop
fn redirect_policy(block_private_hosts: bool) -> Policy {
    Policy::custom(move |attempt| {
        if attempt.previous().len() >= MAX_REDIRECTS {
            return attempt.error("too many redirects");
        }
        let target = attempt.url().to_string();
        match HttpContentFetcher::check_url(&target, block_private_hosts) {
            Ok(()) => attempt.follow(),
            Err(_) => attempt.error(BlockedRedirect(target)),
        }
    })
}

/// Retrieves a page and reduces it to bounded plain text
///
/// Never fails: anything that goes wrong yields an empty string.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> String;
}

/// Fetcher with its own HTTP client
///
/// The client re-checks every redirect target, so a public link cannot
/// bounce the request onto a private host.
pub struct HttpContentFetcher {
    client: HttpClient,
    settings: FetchSettings,
    metrics: Option<Arc<Metrics>>,
}

impl HttpContentFetcher {
    pub fn new(outgoing: &OutgoingSettings, settings: FetchSettings) -> anyhow::Result<Self> {
        let client = HttpClient::with_redirect_policy(
            outgoing,
            redirect_policy(settings.block_private_hosts),
        )?;
        Ok(Self {
            client,
            settings,
            metrics: None,
        })
    }

    /// Count truncated pages in the given collector
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Fetch and extract, reporting why a page was unusable
    pub async fn try_fetch(&self, url: &str) -> Result<Extracted, FetchError> {
        Self::check_url(url, self.settings.block_private_hosts)?;
        self.fetch_checked(url).await
    }

    /// Fetch a URL that already passed [`check_url`](Self::check_url)
    async fn fetch_checked(&self, url: &str) -> Result<Extracted, FetchError> {
        debug!("Fetching content from: {}", url);

        let response = self
            .client
            .execute_with_timeout(HttpRequest::get(url), self.settings.timeout())
            .await
            .map_err(|e| {
                if is_timeout(&e) {
                    return FetchError::Timeout(url.to_string());
                }
                match e.chain().find_map(|c| c.downcast_ref::<BlockedRedirect>()) {
                    Some(BlockedRedirect(target)) => FetchError::UnsafeUrl(target.clone()),
                    None => FetchError::Network(e.to_string()),
                }
            })?;

        if !response.is_success() {
            return Err(FetchError::HttpStatus(response.status, url.to_string()));
        }

        let max_chars = self.settings.max_chars;
        let extracted = match response.content_type().as_deref() {
            None | Some("text/html") | Some("application/xhtml+xml") => {
                extract_html(&response.text, max_chars)
            }
            Some("text/plain") => extract_plain(&response.text, max_chars),
            Some(other) => {
                return Err(FetchError::UnsupportedContent(
                    other.to_string(),
                    url.to_string(),
                ))
            }
        };

        if extracted.truncated {
            info!("Content from {} truncated to {} characters", url, max_chars);
            if let Some(ref metrics) = self.metrics {
                metrics.inc_truncation();
            }
        }

        Ok(extracted)
    }

    /// Reject non-http(s) URLs and, optionally, private network hosts
    pub fn check_url(url: &str, block_private_hosts: bool) -> Result<(), FetchError> {
        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", url, e)))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FetchError::UnsafeUrl(url.to_string()));
        }

        let host = parsed
            .host()
            .ok_or_else(|| FetchError::InvalidUrl(url.to_string()))?;

        if block_private_hosts && is_private_host(&host) {
            return Err(FetchError::UnsafeUrl(url.to_string()));
        }

        Ok(())
    }
}

#[async_trait]
impl ContentFetcher for HttpContentFetcher {
    async fn fetch(&self, url: &str) -> String {
        match self.try_fetch(url).await {
            Ok(extracted) => extracted.text,
            Err(e) => {
                warn!("Failed to fetch {}: {}", url, e);
                String::new()
            }
        }
    }
}

fn is_private_host(host: &Host<&str>) -> bool {
    match host {
        Host::Domain(domain) => {
            let domain = domain.to_ascii_lowercase();
            domain == "localhost" || domain.ends_with(".localhost") || domain.ends_with(".local")
        }
        Host::Ipv4(ip) => is_private_v4(ip),
        Host::Ipv6(ip) => is_private_v6(ip),
    }
}

fn is_private_v4(ip: &Ipv4Addr) -> bool {
    ip.is_loopback()
        || ip.is_private()
        || ip.is_link_local()
        || ip.is_unspecified()
        || ip.is_broadcast()
}

fn is_private_v6(ip: &Ipv6Addr) -> bool {
    if let Some(v4) = ip.to_ipv4_mapped() {
        return is_private_v4(&v4);
    }
    let first = ip.segments()[0];
    ip.is_loopback()
        || ip.is_unspecified()
        // fc00::/7 unique local
        || (first & 0xfe00) == 0xfc00
        // fe80::/10 link local
        || (first & 0xffc0) == 0xfe80
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher(timeout: f64) -> HttpContentFetcher {
        let settings = FetchSettings {
            timeout,
            block_private_hosts: false,
            ..Default::default()
        };
        HttpContentFetcher::new(&OutgoingSettings::default(), settings).unwrap()
    }

    #[test]
    fn test_check_url() {
        assert!(HttpContentFetcher::check_url("https://example.com/page", true).is_ok());
        assert!(HttpContentFetcher::check_url("ftp://example.com/file", true).is_err());
        assert!(HttpContentFetcher::check_url("javascript:alert(1)", true).is_err());
        assert!(HttpContentFetcher::check_url("not a url", true).is_err());
        assert!(HttpContentFetcher::check_url("http://localhost:8080/", true).is_err());
        assert!(HttpContentFetcher::check_url("http://127.0.0.1/", true).is_err());
        assert!(HttpContentFetcher::check_url("http://10.1.2.3/", true).is_err());
        assert!(HttpContentFetcher::check_url("http://192.168.0.10/", true).is_err());
        assert!(HttpContentFetcher::check_url("http://[::1]/", true).is_err());
        assert!(HttpContentFetcher::check_url("http://[fd00::1]/", true).is_err());
        assert!(HttpContentFetcher::check_url("http://127.0.0.1/", false).is_ok());
    }

    #[tokio::test]
    async fn test_fetch_extracts_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/article"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(
                    "<html><head><script>evil()</script></head><body><p>Hello page</p></body></html>",
                    "text/html",
                ),
            )
            .mount(&server)
            .await;

        let text = fetcher(5.0).fetch(&format!("{}/article", server.uri())).await;
        assert_eq!(text, "Hello page");
    }

    #[tokio::test]
    async fn test_fetch_truncates_large_pages() {
        let server = MockServer::start().await;
        let body = format!("<html><body><p>{}</p></body></html>", "lorem ipsum ".repeat(2000));
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html"))
            .mount(&server)
            .await;

        let metrics = Arc::new(Metrics::new());
        let extracted = fetcher(5.0)
            .with_metrics(metrics.clone())
            .try_fetch(&server.uri())
            .await
            .unwrap();
        assert!(extracted.truncated);
        assert_eq!(extracted.text.chars().count(), 2000);
        assert_eq!(metrics.snapshot().truncations, 1);
    }

    #[tokio::test]
    async fn test_fetch_failures_yield_empty_string() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<p>late</p>")
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/file.pdf"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("%PDF-1.4", "application/pdf"))
            .mount(&server)
            .await;

        let fetcher = fetcher(0.1);
        assert_eq!(fetcher.fetch(&format!("{}/missing", server.uri())).await, "");
        assert_eq!(fetcher.fetch(&format!("{}/slow", server.uri())).await, "");
        assert_eq!(fetcher.fetch(&format!("{}/file.pdf", server.uri())).await, "");

        let err = fetcher
            .try_fetch(&format!("{}/slow", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_fetch_blocks_private_hosts_by_default() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>internal</p>"))
            .expect(0)
            .mount(&server)
            .await;

        let fetcher =
            HttpContentFetcher::new(&OutgoingSettings::default(), FetchSettings::default()).unwrap();
        let err = fetcher.try_fetch(&server.uri()).await.unwrap_err();
        assert!(matches!(err, FetchError::UnsafeUrl(_)));
    }

    async fn mount_redirect(server: &MockServer, from: &str, to: String) {
        Mock::given(method("GET"))
            .and(path(from))
            .respond_with(ResponseTemplate::new(302).insert_header("location", to))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_redirect_to_private_host_is_blocked() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/secret"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw("<p>internal admin data</p>", "text/html"),
            )
            .expect(0)
            .mount(&server)
            .await;
        mount_redirect(&server, "/r", format!("{}/secret", server.uri())).await;
        mount_redirect(&server, "/metadata", "http://169.254.169.254/latest".to_string()).await;

        let fetcher =
            HttpContentFetcher::new(&OutgoingSettings::default(), FetchSettings::default()).unwrap();
        assert!(HttpContentFetcher::check_url(&format!("{}/secret", server.uri()), true).is_err());

        // The mock server itself is on loopback, so skip the entry check and
        // let the redirect policy decide.
        let err = fetcher
            .fetch_checked(&format!("{}/r", server.uri()))
            .await
            .unwrap_err();
        match err {
            FetchError::UnsafeUrl(target) => assert!(target.ends_with("/secret")),
            other => panic!("expected UnsafeUrl, got {:?}", other),
        }

        let err = fetcher
            .fetch_checked(&format!("{}/metadata", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::UnsafeUrl(_)));
    }

    #[tokio::test]
    async fn test_redirects_followed_when_private_hosts_allowed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/target"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("<p>Moved here</p>", "text/html"))
            .expect(1)
            .mount(&server)
            .await;
        mount_redirect(&server, "/start", format!("{}/target", server.uri())).await;

        let text = fetcher(5.0).fetch(&format!("{}/start", server.uri())).await;
        assert_eq!(text, "Moved here");
    }
}
