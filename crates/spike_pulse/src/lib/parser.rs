//! # Model Reply Parser
//!
//! Recovers the `{emotionalLabel, nextMove}` pair from raw model text.
//! Models do not always answer with bare JSON: some wrap it in a markdown
//! fence, some lead with a sentence of prose. Parsing is therefore two
//! explicit stages, strict first and embedded-object second.

use std::{ops::Deref, sync::LazyLock};

use regex::Regex;
use serde::Deserialize;

use crate::{error::Error, types::Insight};

/// First `{` through last `}`, across newlines.
static JSON_OBJECT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)\{.*\}").unwrap());

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawInsight {
    emotional_label: Option<String>,
    next_move: Option<String>,
}

pub struct ModelReply(String);

impl Deref for ModelReply {
    type Target = String;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl ModelReply {
    pub fn new(reply: String) -> Self {
        ModelReply(reply)
    }

    /// Parses the reply and checks both fields are present and non-blank.
    ///
    /// # Returns
    /// * `Ok(Insight)` with trimmed fields.
    /// * `Err(Error::MalformedOutput)` when no stage yields a usable object.
    #[tracing::instrument(skip_all)]
    pub fn to_insight(&self) -> Result<Insight, Error> {
        let raw = self
            .parse_strict()
            .or_else(|e| {
                tracing::debug!(error = %e, "Strict parse failed, scanning for embedded object");
                self.parse_embedded()
            })?;

        let emotional_label = non_blank(raw.emotional_label)
            .ok_or(Error::MalformedOutput("Missing or empty 'emotionalLabel'"))?;
        let next_move = non_blank(raw.next_move)
            .ok_or(Error::MalformedOutput("Missing or empty 'nextMove'"))?;

        Ok(Insight {
            emotional_label,
            next_move,
        })
    }

    fn parse_strict(&self) -> Result<RawInsight, Error> {
        Ok(serde_json::from_str(self.trim())?)
    }

    fn parse_embedded(&self) -> Result<RawInsight, Error> {
        JSON_OBJECT_RE
            .find(self)
            .and_then(|m| serde_json::from_str(m.as_str()).ok())
            .ok_or(Error::MalformedOutput(
                "No JSON object could be extracted from the model reply",
            ))
    }
}

impl From<String> for ModelReply {
    fn from(value: String) -> Self {
        ModelReply(value)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<Insight, Error> {
        ModelReply::from(text.to_string()).to_insight()
    }

    #[test]
    fn test_bare_json() {
        let insight =
            parse(r#"{"emotionalLabel": "story connects", "nextMove": "Ask their stories. Be authentic"}"#)
                .unwrap();
        assert_eq!(insight.emotional_label, "story connects");
        assert_eq!(insight.next_move, "Ask their stories. Be authentic");
    }

    #[test]
    fn test_leading_prose() {
        let insight = parse(
            r#"Here you go: {"emotionalLabel": "gaming wins", "nextMove": "Ask about setup"}"#,
        )
        .unwrap();
        assert_eq!(insight.emotional_label, "gaming wins");
        assert_eq!(insight.next_move, "Ask about setup");
    }

    #[test]
    fn test_markdown_fence() {
        let text = "```json\n{\n  \"emotionalLabel\": \"tech talk loses\",\n  \"nextMove\": \"Pivot to giveaway. Boost energy\"\n}\n```";
        let insight = parse(text).unwrap();
        assert_eq!(insight.emotional_label, "tech talk loses");
        assert_eq!(insight.next_move, "Pivot to giveaway. Boost energy");
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let insight =
            parse(r#"{"emotionalLabel": "a b", "nextMove": "c d", "reason": "because"}"#).unwrap();
        assert_eq!(insight, Insight::new("a b", "c d"));
    }

    #[test]
    fn test_missing_label_is_malformed() {
        let result = parse(r#"{"nextMove": "Ask something"}"#);
        assert!(matches!(result, Err(Error::MalformedOutput(_))));
    }

    #[test]
    fn test_blank_move_is_malformed() {
        let result = parse(r#"{"emotionalLabel": "steady", "nextMove": "   "}"#);
        assert!(matches!(result, Err(Error::MalformedOutput(_))));
    }

    #[test]
    fn test_no_json_is_malformed() {
        let result = parse("Sorry, I can't help with that.");
        assert!(matches!(result, Err(Error::MalformedOutput(_))));
    }

    #[test]
    fn test_broken_json_is_malformed() {
        let result = parse(r#"Sure! {emotionalLabel: steady, nextMove: "go"}"#);
        assert!(matches!(result, Err(Error::MalformedOutput(_))));
    }

    #[test]
    fn test_non_string_fields_are_malformed() {
        let result = parse(r#"{"emotionalLabel": 3, "nextMove": ["a"]}"#);
        assert!(matches!(result, Err(Error::MalformedOutput(_))));
    }
}
