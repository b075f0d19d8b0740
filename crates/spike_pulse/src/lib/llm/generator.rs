use std::future::Future;

use crate::Prompt;

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Model credential is not configured")]
    MissingCredential,
    #[error("HTTP error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Rate limited: {message}")]
    RateLimited { message: String },
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("No text content in model response")]
    EmptyContent,
}

/// Text-in, text-out access to the model that writes insights.
///
/// One attempt per call; resilience comes from the caller's fallback path.
pub trait InsightModel {
    const MODEL: &'static str;
    const MAX_OUTPUT_TOKENS: u32 = 150;

    /// Whether the credential needed to reach the provider is present.
    fn is_configured(&self) -> bool {
        true
    }

    fn complete(&self, prompt: &Prompt) -> impl Future<Output = Result<String, LlmError>> + Send;
}
