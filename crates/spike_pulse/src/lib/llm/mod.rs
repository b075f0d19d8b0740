pub mod anthropic;
pub mod generator;
pub mod prompt;
