//! # Emotion Passthrough
//!
//! Forwards a piece of text to a third-party emotion classifier. Callers go
//! through [`analyze_or_neutral`], which never fails.

mod http;

use std::future::Future;

pub use http::HttpEmotionClient;

use crate::types::EmotionReading;

#[derive(Debug, thiserror::Error)]
pub enum EmotionError {
    #[error("Emotion endpoint is not configured")]
    NotConfigured,
    #[error("HTTP error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
}

pub trait EmotionAnalyzer {
    fn analyze(&self, text: &str)
        -> impl Future<Output = Result<EmotionReading, EmotionError>> + Send;
}

/// Any upstream failure collapses to [`EmotionReading::neutral`].
#[tracing::instrument(skip_all, fields(text_len = text.len()))]
pub async fn analyze_or_neutral<E>(analyzer: &E, text: &str) -> EmotionReading
where
    E: EmotionAnalyzer + Sync,
{
    match analyzer.analyze(text).await {
        Ok(reading) => reading,
        Err(EmotionError::NotConfigured) => {
            tracing::debug!("Emotion endpoint not configured, returning neutral");
            EmotionReading::neutral()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Emotion analysis failed, returning neutral");
            EmotionReading::neutral()
        }
    }
}

/// Upper-cases the first character and leaves the rest alone.
pub(crate) fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing;

    impl EmotionAnalyzer for Failing {
        async fn analyze(&self, _text: &str) -> Result<EmotionReading, EmotionError> {
            Err(EmotionError::Api {
                status: 503,
                message: "down".into(),
            })
        }
    }

    #[tokio::test]
    async fn test_failure_degrades_to_neutral() {
        let reading = analyze_or_neutral(&Failing, "hello").await;
        assert_eq!(reading, EmotionReading::neutral());
        assert_eq!(reading.confidence, 0);
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("joy"), "Joy");
        assert_eq!(capitalize("Awe"), "Awe");
        assert_eq!(capitalize("élan"), "Élan");
        assert_eq!(capitalize(""), "");
    }
}
