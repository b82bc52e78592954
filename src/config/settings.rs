//! Settings structures for ragsum configuration

use crate::{DEFAULT_RESULT_COUNT, DEFAULT_TIMEOUT, MAX_CONTENT_CHARS, SUMMARY_MAX_TOKENS};
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// Instruction given to the summarizer when none is configured
pub const DEFAULT_INSTRUCTION: &str = "Summarize the following content:";

/// Main settings structure, mirrors settings.yml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub outgoing: OutgoingSettings,
    pub search: SearchSettings,
    pub fetch: FetchSettings,
    pub summarizer: SummarizerSettings,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = serde_yaml::from_str(&content)?;
        Ok(settings)
    }

    /// Merge with process environment variables
    pub fn merge_env(&mut self) {
        self.merge_vars(|key| std::env::var(key).ok());
    }

    /// Merge values from an arbitrary variable lookup
    ///
    /// Provider credentials use the vendors' usual variable names; server
    /// options use the `RAGSUM_` prefix.
    pub fn merge_vars<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("RAGSUM_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Some(val) = lookup("RAGSUM_BIND_ADDRESS") {
            self.server.bind_address = val;
        }
        if let Some(val) = lookup("RAGSUM_SEARCH_ENGINE") {
            self.search.engine = val;
        }

        match self.search.engine.as_str() {
            "brave" => {
                if let Some(val) = lookup("BRAVE_API_KEY") {
                    self.search.api_key = Some(val);
                }
            }
            _ => {
                if let Some(val) = lookup("GOOGLE_API_KEY") {
                    self.search.api_key = Some(val);
                }
                if let Some(val) = lookup("GOOGLE_CSE_ID") {
                    self.search.engine_id = Some(val);
                }
            }
        }

        if let Some(val) = lookup("OPENAI_API_KEY") {
            self.summarizer.api_key = Some(val);
        }
        if let Some(val) = lookup("OPENAI_BASE_URL") {
            self.summarizer.base_url = val;
        }
        if let Some(val) = lookup("OPENAI_MODEL") {
            self.summarizer.model = val;
        }
    }

    /// Check value ranges that serde cannot express
    pub fn validate(&self) -> Result<()> {
        if !(1..=10).contains(&self.search.result_count) {
            bail!(
                "search.result_count must be between 1 and 10, got {}",
                self.search.result_count
            );
        }
        if self.fetch.max_chars == 0 {
            bail!("fetch.max_chars must be greater than zero");
        }
        if self.summarizer.max_tokens == 0 {
            bail!("summarizer.max_tokens must be greater than zero");
        }
        if !(0.0..=2.0).contains(&self.summarizer.temperature) {
            bail!(
                "summarizer.temperature must be between 0 and 2, got {}",
                self.summarizer.temperature
            );
        }
        for (name, secs) in [
            ("outgoing.request_timeout", self.outgoing.request_timeout),
            ("search.timeout", self.search.timeout),
            ("fetch.timeout", self.fetch.timeout),
            ("summarizer.timeout", self.summarizer.timeout),
        ] {
            if !(secs.is_finite() && secs > 0.0) {
                bail!("{} must be a positive number of seconds, got {}", name, secs);
            }
        }
        Ok(())
    }
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Server port
    pub port: u16,
    /// Bind address
    pub bind_address: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: 8000,
            bind_address: "127.0.0.1".to_string(),
        }
    }
}

/// Outgoing request settings shared by every adapter
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutgoingSettings {
    /// Default request timeout in seconds
    pub request_timeout: f64,
    /// Appended to the generated user agent
    pub useragent_suffix: Option<String>,
    /// Idle connections kept per host
    pub pool_maxsize: usize,
    /// Verify SSL certificates
    pub verify_ssl: bool,
    /// Proxy settings
    pub proxies: ProxySettings,
    /// Extra headers to send with every request
    pub extra_headers: HashMap<String, String>,
}

impl Default for OutgoingSettings {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_TIMEOUT,
            useragent_suffix: None,
            pool_maxsize: 20,
            verify_ssl: true,
            proxies: ProxySettings::default(),
            extra_headers: HashMap::new(),
        }
    }
}

/// Proxy settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    pub http: Option<String>,
    pub https: Option<String>,
    pub all: Option<String>,
}

/// Search provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Provider implementation: "google" or "brave"
    pub engine: String,
    /// Developer key / subscription token
    pub api_key: Option<String>,
    /// Search context id (Google `cx`)
    pub engine_id: Option<String>,
    /// Override for the provider endpoint
    pub base_url: Option<String>,
    /// Results summarized per query
    pub result_count: usize,
    /// Timeout for one search call in seconds
    pub timeout: f64,
    /// Extra attempts after a failed search call
    pub retries: u32,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            engine: "google".to_string(),
            api_key: None,
            engine_id: None,
            base_url: None,
            result_count: DEFAULT_RESULT_COUNT,
            timeout: DEFAULT_TIMEOUT,
            retries: 0,
        }
    }
}

impl SearchSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout)
    }
}

/// Page fetching settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    /// Maximum characters of extracted text
    pub max_chars: usize,
    /// Timeout for one page fetch in seconds
    pub timeout: f64,
    /// Refuse loopback and private network hosts
    pub block_private_hosts: bool,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            max_chars: MAX_CONTENT_CHARS,
            timeout: DEFAULT_TIMEOUT,
            block_private_hosts: true,
        }
    }
}

impl FetchSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout)
    }
}

/// Chat-completion summarizer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizerSettings {
    /// API key sent as a bearer token
    pub api_key: Option<String>,
    /// Base URL of an OpenAI-compatible API
    pub base_url: String,
    /// Model name
    pub model: String,
    /// Maximum generated tokens
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
    /// System instruction sent before the page text
    pub instruction: String,
    /// Timeout for one completion in seconds
    pub timeout: f64,
}

impl Default for SummarizerSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            max_tokens: SUMMARY_MAX_TOKENS,
            temperature: 0.5,
            instruction: DEFAULT_INSTRUCTION.to_string(),
            timeout: 30.0,
        }
    }
}

impl SummarizerSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout)
    }
}
