use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::{InsightModel, LlmError, Prompt};

pub struct AnthropicClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl AnthropicClient {
    const API_VERSION: &str = "2023-06-01";
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// A client without a key can still be built; every call then fails
    /// with [`LlmError::MissingCredential`].
    pub fn new(api_key: Option<String>, timeout: Duration) -> Result<Self, LlmError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: "https://api.anthropic.com/v1".into(),
        })
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub async fn send_messages_request(
        &self,
        model_name: &str,
        max_tokens: u32,
        prompt: &Prompt,
    ) -> Result<MessagesResponse, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::MissingCredential)?;

        let body = serde_json::json!({
            "model": model_name,
            "max_tokens": max_tokens,
            "system": prompt.system,
            "messages": [
                {
                    "role": "user",
                    "content": prompt.user
                }
            ]
        });

        let resp = self
            .client
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", api_key)
            .header("anthropic-version", Self::API_VERSION)
            .json(&body)
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, timeout = e.is_timeout(), "Failed to make http request"))?;

        let status = resp.status();
        if !status.is_success() {
            let message = preview(&resp.text().await.unwrap_or_default(), 100);
            if status == StatusCode::TOO_MANY_REQUESTS {
                return Err(LlmError::RateLimited { message });
            }
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(resp.json::<MessagesResponse>().await?)
    }
}

/// First `max_chars` characters with newlines flattened, for logs and errors.
pub(crate) fn preview(text: &str, max_chars: usize) -> String {
    text.chars()
        .take(max_chars)
        .map(|c| if c == '\n' { ' ' } else { c })
        .collect()
}

#[derive(Debug, Deserialize)]
pub struct MessagesResponse {
    pub id: Option<String>,
    #[serde(default)]
    pub content: Vec<ContentBlock>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl MessagesResponse {
    pub fn first_text(&self) -> Option<&str> {
        self.content
            .iter()
            .filter(|block| block.kind == "text")
            .find_map(|block| block.text.as_deref())
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }
}

impl InsightModel for AnthropicClient {
    const MODEL: &'static str = "claude-sonnet-4-5";

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn complete(&self, prompt: &Prompt) -> Result<String, LlmError> {
        let response = self
            .send_messages_request(Self::MODEL, Self::MAX_OUTPUT_TOKENS, prompt)
            .await?;

        if let Some(usage) = &response.usage {
            tracing::debug!(
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                "Model usage"
            );
        }

        response
            .first_text()
            .map(str::to_string)
            .ok_or(LlmError::EmptyContent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_text_skips_non_text_blocks() {
        let response: MessagesResponse = serde_json::from_value(serde_json::json!({
            "id": "msg_1",
            "content": [
                {"type": "thinking"},
                {"type": "text", "text": "  {\"emotionalLabel\": \"a\", \"nextMove\": \"b\"}\n"}
            ],
            "usage": {"input_tokens": 10, "output_tokens": 5}
        }))
        .unwrap();

        assert_eq!(
            response.first_text(),
            Some("{\"emotionalLabel\": \"a\", \"nextMove\": \"b\"}")
        );
    }

    #[test]
    fn test_first_text_empty_content() {
        let response: MessagesResponse =
            serde_json::from_value(serde_json::json!({"content": [{"type": "text", "text": "  "}]}))
                .unwrap();
        assert_eq!(response.first_text(), None);
    }

    #[test]
    fn test_blank_key_is_unconfigured() {
        let client = AnthropicClient::new(Some("   ".into()), AnthropicClient::DEFAULT_TIMEOUT).unwrap();
        assert!(!client.is_configured());

        let client = AnthropicClient::new(Some("sk-test".into()), AnthropicClient::DEFAULT_TIMEOUT).unwrap();
        assert!(client.is_configured());
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_any_request() {
        let client = AnthropicClient::new(None, AnthropicClient::DEFAULT_TIMEOUT)
            .unwrap()
            .with_base_url("http://127.0.0.1:9");
        let prompt = Prompt {
            system: "s".into(),
            user: "u".into(),
        };
        let result = client.complete(&prompt).await;
        assert!(matches!(result, Err(LlmError::MissingCredential)));
    }

    #[test]
    fn test_preview_truncates_and_flattens() {
        assert_eq!(preview("a\nb\nc", 3), "a b");
        assert_eq!(preview("héllo", 10), "héllo");
    }
}
