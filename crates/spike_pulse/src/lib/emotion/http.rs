use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use super::{capitalize, EmotionAnalyzer, EmotionError};
use crate::{llm::anthropic::preview, types::EmotionReading};

/// Client for an emotion classifier that answers `{emotions: [{name, score}]}`.
pub struct HttpEmotionClient {
    client: Client,
    url: Option<String>,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EmotionResponse {
    #[serde(default)]
    emotions: Vec<EmotionScore>,
}

#[derive(Debug, Deserialize)]
struct EmotionScore {
    name: String,
    score: f64,
}

impl HttpEmotionClient {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
    const API_KEY_HEADER: &str = "X-Hume-Api-Key";

    /// Without a URL every call fails with [`EmotionError::NotConfigured`].
    pub fn new(
        url: Option<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, EmotionError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            url: url.filter(|u| !u.trim().is_empty()),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.url.is_some()
    }
}

impl EmotionAnalyzer for HttpEmotionClient {
    async fn analyze(&self, text: &str) -> Result<EmotionReading, EmotionError> {
        let url = self.url.as_deref().ok_or(EmotionError::NotConfigured)?;

        let mut request = self
            .client
            .post(url)
            .json(&serde_json::json!({ "text": text }));
        if let Some(api_key) = &self.api_key {
            request = request.header(Self::API_KEY_HEADER, api_key);
        }

        let resp = request
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, timeout = e.is_timeout(), "Failed to make http request"))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(EmotionError::Api {
                status: status.as_u16(),
                message: preview(&resp.text().await.unwrap_or_default(), 100),
            });
        }

        let body = resp.json::<EmotionResponse>().await?;

        let top = body
            .emotions
            .into_iter()
            .filter(|e| e.score.is_finite())
            .max_by(|a, b| a.score.total_cmp(&b.score));

        let Some(top) = top else {
            tracing::debug!("No emotion predictions returned");
            return Ok(EmotionReading {
                emotion: "Neutral".into(),
                score: 0.5,
                confidence: 50,
            });
        };

        let score = top.score.clamp(0.0, 1.0);
        Ok(EmotionReading {
            emotion: capitalize(&top.name),
            score,
            confidence: (score * 100.0).round() as u8,
        })
    }
}
