pub mod api;
pub mod correlation;
pub mod emotion;
mod error;
pub mod fallback;
pub mod guard;
mod llm;
pub mod parser;
pub mod policy;
mod processor;
pub mod tracing;
pub mod types;

pub use error::Error;
pub use llm::anthropic;
pub use llm::{
    generator::{InsightModel, LlmError},
    prompt::{Prompt, PromptBuilder},
};
pub use processor::{builder::InsightServiceBuilder, InsightService};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
