use crate::LlmError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(&'static str),
    #[error("Model provider error: {0}")]
    Provider(#[from] LlmError),
    #[error("Malformed model output: {0}")]
    MalformedOutput(&'static str),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Provider throttling is reported separately from other failures.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Error::Provider(LlmError::RateLimited { .. }))
    }
}
