//! OpenAI-compatible chat-completion summarizer

use super::{SummarizeError, Summarizer};
use crate::config::SummarizerSettings;
use crate::network::{accept_json, is_timeout, HttpClient, HttpRequest};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Summarizer backed by `POST {base_url}/chat/completions`
pub struct OpenAiSummarizer {
    client: HttpClient,
    api_key: String,
    endpoint: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    timeout: Duration,
}

impl OpenAiSummarizer {
    /// Build from settings; fails when no API key is configured
    pub fn new(client: HttpClient, settings: &SummarizerSettings) -> Result<Self> {
        let api_key = settings
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| anyhow!("OPENAI_API_KEY is not set"))?;

        Ok(Self {
            client,
            api_key,
            endpoint: format!("{}/chat/completions", settings.base_url.trim_end_matches('/')),
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            timeout: settings.timeout(),
        })
    }

    fn build_request(&self, text: &str, instruction: &str) -> HttpRequest {
        HttpRequest::post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Accept", accept_json())
            .json(json!({
                "model": self.model,
                "messages": [
                    {"role": "system", "content": instruction},
                    {"role": "user", "content": text}
                ],
                "max_tokens": self.max_tokens,
                "temperature": self.temperature,
            }))
    }
}

#[async_trait]
impl Summarizer for OpenAiSummarizer {
    async fn summarize(&self, text: &str, instruction: &str) -> Result<String, SummarizeError> {
        if text.trim().is_empty() {
            return Err(SummarizeError::EmptyInput);
        }

        let response = self
            .client
            .execute_with_timeout(self.build_request(text, instruction), self.timeout)
            .await
            .map_err(|e| {
                if is_timeout(&e) {
                    SummarizeError::Timeout
                } else {
                    SummarizeError::Network(e.to_string())
                }
            })?;

        match response.status {
            200..=299 => {}
            429 => return Err(SummarizeError::RateLimited),
            401 | 403 => return Err(SummarizeError::Unauthorized(response.status)),
            status => return Err(SummarizeError::Http(status)),
        }

        let completion: ChatCompletion = response
            .json()
            .map_err(|e| SummarizeError::Malformed(e.to_string()))?;

        let summary = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| SummarizeError::Malformed("completion has no content".to_string()))?;

        debug!("Generated summary: {}", summary.chars().take(300).collect::<String>());

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn summarizer(server: &MockServer) -> OpenAiSummarizer {
        let settings = SummarizerSettings {
            api_key: Some("sk-test".to_string()),
            base_url: format!("{}/v1/", server.uri()),
            timeout: 2.0,
            ..Default::default()
        };
        OpenAiSummarizer::new(HttpClient::new().unwrap(), &settings).unwrap()
    }

    fn completion(content: &str) -> serde_json::Value {
        json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "model": "gpt-3.5-turbo",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": content},
                "finish_reason": "stop"
            }]
        })
    }

    #[test]
    fn test_requires_api_key() {
        let settings = SummarizerSettings::default();
        assert!(OpenAiSummarizer::new(HttpClient::new().unwrap(), &settings).is_err());
    }

    #[tokio::test]
    async fn test_request_format() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "gpt-3.5-turbo",
                "max_tokens": 150,
                "temperature": 0.5,
                "messages": [
                    {"role": "system", "content": "Summarize the following content:"},
                    {"role": "user", "content": "Some page text"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("  A short summary. ")))
            .expect(1)
            .mount(&server)
            .await;

        let summary = summarizer(&server)
            .summarize("Some page text", "Summarize the following content:")
            .await
            .unwrap();
        assert_eq!(summary, "A short summary.");
    }

    #[tokio::test]
    async fn test_empty_text_skips_model() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("unused")))
            .expect(0)
            .mount(&server)
            .await;

        let err = summarizer(&server).summarize("   ", "Summarize").await.unwrap_err();
        assert!(matches!(err, SummarizeError::EmptyInput));
    }

    #[tokio::test]
    async fn test_error_classification() {
        let server = MockServer::start().await;
        let s = summarizer(&server);

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        assert!(matches!(
            s.summarize("text", "i").await.unwrap_err(),
            SummarizeError::RateLimited
        ));

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        assert!(matches!(
            s.summarize("text", "i").await.unwrap_err(),
            SummarizeError::Unauthorized(401)
        ));

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        assert!(matches!(
            s.summarize("text", "i").await.unwrap_err(),
            SummarizeError::Malformed(_)
        ));

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        assert!(matches!(
            s.summarize("text", "i").await.unwrap_err(),
            SummarizeError::Http(500)
        ));
    }
}
