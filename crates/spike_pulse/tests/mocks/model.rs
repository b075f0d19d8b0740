use std::sync::{Arc, Mutex};
use spike_pulse::{InsightModel, LlmError, Prompt};

#[derive(Clone)]
enum Reply {
    Text(String),
    Fail(String),
    RateLimited,
    MissingCredential,
}

#[derive(Clone)]
pub struct MockModel {
    reply: Reply,
    configured: bool,
    pub calls: Arc<Mutex<Vec<Prompt>>>,
}

impl MockModel {
    fn with(reply: Reply, configured: bool) -> Self {
        Self {
            reply,
            configured,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn new(reply: &str) -> Self {
        Self::with(Reply::Text(reply.to_string()), true)
    }

    pub fn failing(msg: &str) -> Self {
        Self::with(Reply::Fail(msg.to_string()), true)
    }

    pub fn rate_limited() -> Self {
        Self::with(Reply::RateLimited, true)
    }

    /// No credential: `is_configured` is false and every call fails.
    pub fn unconfigured() -> Self {
        Self::with(Reply::MissingCredential, false)
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl InsightModel for MockModel {
    const MODEL: &'static str = "mock-claude";

    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn complete(&self, prompt: &Prompt) -> Result<String, LlmError> {
        self.calls.lock().unwrap().push(prompt.clone());
        match &self.reply {
            Reply::Text(text) => Ok(text.clone()),
            Reply::Fail(msg) => Err(LlmError::Api {
                status: 500,
                message: msg.clone(),
            }),
            Reply::RateLimited => Err(LlmError::RateLimited {
                message: "slow down".to_string(),
            }),
            Reply::MissingCredential => Err(LlmError::MissingCredential),
        }
    }
}
