//! Google Gemini `generateContent` client.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use super::{Summarizer, SummarizerError};
use crate::config::{ApiKey, SummarizerSettings};

/// Summarizer backed by the Gemini REST API
pub struct GeminiSummarizer {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: ApiKey,
    timeout: Duration,
}

impl GeminiSummarizer {
    /// Create a client for `settings.model`, authenticating with `api_key`
    pub fn new(settings: &SummarizerSettings, api_key: ApiKey) -> Result<Self, SummarizerError> {
        let timeout = Duration::from_secs(settings.timeout_secs);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SummarizerError::Http(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            api_key,
            timeout,
        })
    }

    fn generate_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

#[async_trait]
impl Summarizer for GeminiSummarizer {
    async fn generate(&self, prompt_and_text: &str) -> Result<String, SummarizerError> {
        let url = self.generate_url();
        tracing::debug!("Calling {} ({} characters)", url, prompt_and_text.len());

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.api_key.expose())
            .json(&json!({
                "contents": [{
                    "parts": [{ "text": prompt_and_text }]
                }]
            }))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SummarizerError::Timeout(self.timeout.as_secs())
                } else {
                    SummarizerError::Http(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SummarizerError::Http(e.to_string()))?;

        if !status.is_success() {
            return Err(SummarizerError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        extract_text(&body)
    }

    fn model_name(&self) -> String {
        self.model.clone()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

fn extract_text(body: &str) -> Result<String, SummarizerError> {
    let response: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|e| SummarizerError::Http(format!("unexpected response body: {}", e)))?;

    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(SummarizerError::Blocked(reason));
    }

    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(SummarizerError::EmptyResponse);
    }

    Ok(text)
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.chars().take(200).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_text_joins_parts_of_first_candidate() {
        let body = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "* point one\n"}, {"text": "* point two"}], "role": "model"}},
                {"content": {"parts": [{"text": "ignored"}]}}
            ]
        }"#;
        assert_eq!(extract_text(body).unwrap(), "* point one\n* point two");
    }

    #[test]
    fn test_extract_text_reports_block_and_empty() {
        let blocked = r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#;
        assert!(matches!(extract_text(blocked), Err(SummarizerError::Blocked(r)) if r == "SAFETY"));

        let empty = r#"{"candidates": [{"finishReason": "STOP"}]}"#;
        assert!(matches!(extract_text(empty), Err(SummarizerError::EmptyResponse)));
    }

    #[test]
    fn test_error_message_prefers_api_message() {
        let body = r#"{"error": {"code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT"}}"#;
        assert_eq!(error_message(body), "API key not valid.");
        assert_eq!(error_message("upstream down"), "upstream down");
    }

    #[test]
    fn test_generate_url() {
        let settings = SummarizerSettings {
            endpoint: "https://example.test/v1beta/".to_string(),
            model: "gemini-test".to_string(),
            ..SummarizerSettings::default()
        };
        let summarizer = GeminiSummarizer::new(&settings, ApiKey::new("k")).unwrap();
        assert_eq!(
            summarizer.generate_url(),
            "https://example.test/v1beta/models/gemini-test:generateContent"
        );
        assert_eq!(summarizer.model_name(), "gemini-test");
    }
}
