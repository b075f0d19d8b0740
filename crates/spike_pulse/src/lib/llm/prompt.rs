//! # Prompt Builder
//!
//! Renders the system and user instructions for a [`TelemetrySnapshot`].
//! Both templates live next to this file as text resources; this module
//! only fills in their `{placeholder}`s.
//!
//! Every optional signal renders to an explicit "no data" phrase so the model
//! never mistakes a missing value for a zero.

use itertools::Itertools;

use crate::{
    policy::{Band, InsightPolicy},
    types::{Prosody, TelemetrySnapshot},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    policy: InsightPolicy,
}

impl PromptBuilder {
    const SYSTEM_TEMPLATE: &str = include_str!("./prompts/system_0.txt");
    const USER_TEMPLATE: &str = include_str!("./prompts/user_0.txt");

    pub fn new(policy: InsightPolicy) -> Self {
        Self { policy }
    }

    pub fn build(&self, snapshot: &TelemetrySnapshot) -> Prompt {
        Prompt {
            system: self.system_prompt(),
            user: self.user_prompt(snapshot),
        }
    }

    pub fn system_prompt(&self) -> String {
        let t = &self.policy.thresholds;
        let vars = [
            ("max_label_words", self.policy.max_label_words.to_string()),
            ("max_move_words", self.policy.max_move_words.to_string()),
            ("spike", t.spike.to_string()),
            ("strong_spike", t.strong_spike.to_string()),
            ("flatline", t.flatline_tolerance.to_string()),
            ("drop", t.drop.to_string()),
            ("drop_floor", t.drop_floor.to_string()),
            ("dump", t.dump.to_string()),
        ];
        render(Self::SYSTEM_TEMPLATE, &vars)
    }

    pub fn user_prompt(&self, snapshot: &TelemetrySnapshot) -> String {
        let band = Band::classify(snapshot.viewer_delta, &self.policy.thresholds);
        let vars = [
            ("transcript", snapshot.transcript.clone()),
            ("delta", format_delta(snapshot.viewer_delta)),
            ("prev_count", snapshot.prev_count.to_string()),
            ("viewer_count", snapshot.viewer_count.to_string()),
            ("band", band.to_string()),
            ("prosody", describe_prosody(snapshot.prosody.as_ref())),
            ("burst", describe_burst(snapshot)),
            ("language", describe_language(snapshot)),
            ("topic", describe_topic(snapshot)),
            ("history", describe_history(snapshot)),
            ("quality", describe_quality(snapshot)),
            ("keywords", describe_keywords(snapshot)),
            ("transcript_quality", describe_transcript_quality(snapshot)),
            (
                "recent_insights",
                describe_recent_insights(snapshot, self.policy.repetition_lookback),
            ),
            ("winning_topics", describe_winning_topics(snapshot)),
        ];
        render(Self::USER_TEMPLATE, &vars)
    }
}

/// Single pass over `template`; `{key}` is replaced when `key` is known,
/// any other brace is copied as-is. Substituted values are never rescanned.
fn render(template: &str, vars: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len() + 256);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let substituted = after.find('}').and_then(|close| {
            let key = &after[..close];
            vars.iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (value, close))
        });

        match substituted {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn format_delta(delta: i64) -> String {
    format!("{delta:+}")
}

fn describe_prosody(prosody: Option<&Prosody>) -> String {
    let Some(p) = prosody else {
        return "No prosody data".into();
    };

    format!(
        "Top emotion: {} ({}%), Energy: {}%, Excitement: {}%, Confidence: {}%",
        p.top_emotion.as_deref().unwrap_or("unknown"),
        p.top_score.unwrap_or_default(),
        p.energy.unwrap_or_default(),
        p.excitement.unwrap_or_default(),
        p.confidence.unwrap_or_default(),
    )
}

fn describe_burst(snapshot: &TelemetrySnapshot) -> String {
    match &snapshot.burst {
        Some(burst) if burst.detected => format!(
            "Burst detected: {}",
            burst.kind.as_deref().unwrap_or("unknown")
        ),
        _ => "No burst activity".into(),
    }
}

fn describe_language(snapshot: &TelemetrySnapshot) -> String {
    match snapshot.language_emotion() {
        Some(emotion) => format!("Language emotion: {emotion}"),
        None => "No language emotion".into(),
    }
}

fn describe_topic(snapshot: &TelemetrySnapshot) -> String {
    snapshot
        .topic
        .clone()
        .unwrap_or_else(|| "No topic detected".into())
}

fn describe_history(snapshot: &TelemetrySnapshot) -> String {
    if snapshot.recent_history.is_empty() {
        return "No recent history".into();
    }

    let items = snapshot
        .recent_history
        .iter()
        .map(|h| {
            format!(
                "{} ({})",
                format_delta(h.delta),
                h.emotion.as_deref().unwrap_or("unknown")
            )
        })
        .join(", ");
    format!("Recent pattern: {items}")
}

fn describe_quality(snapshot: &TelemetrySnapshot) -> String {
    snapshot
        .quality
        .clone()
        .unwrap_or_else(|| "No signal quality data".into())
}

fn describe_keywords(snapshot: &TelemetrySnapshot) -> String {
    match &snapshot.keywords_said {
        Some(keywords) if !keywords.is_empty() => {
            format!("Keywords said: {}", keywords.iter().join(", "))
        }
        _ => "No keywords detected".into(),
    }
}

fn describe_transcript_quality(snapshot: &TelemetrySnapshot) -> String {
    match (&snapshot.transcript_quality, snapshot.unique_word_ratio) {
        (None, None) => "No transcript quality data".into(),
        (Some(quality), None) => quality.clone(),
        (None, Some(ratio)) => format!("Unique word ratio: {ratio:.2}"),
        (Some(quality), Some(ratio)) => format!("{quality}, unique word ratio: {ratio:.2}"),
    }
}

fn describe_recent_insights(snapshot: &TelemetrySnapshot, lookback: usize) -> String {
    let recent = snapshot.recent_insights_tail(lookback);
    if recent.is_empty() {
        return "No recent suggestions".into();
    }
    recent.iter().map(|s| format!("\"{s}\"")).join(", ")
}

fn describe_winning_topics(snapshot: &TelemetrySnapshot) -> String {
    match &snapshot.winning_topics {
        Some(topics) if !topics.is_empty() => topics.iter().join(", "),
        _ => "No winning topics yet".into(),
    }
}
