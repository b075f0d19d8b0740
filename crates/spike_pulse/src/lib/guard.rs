//! # Constraint Guard
//!
//! Post-processing applied to every model-sourced insight, in this order:
//!
//! 1. truncate the label to its word limit
//! 2. truncate the move to its word limit
//! 3. replace a field that repeats transcript wording verbatim
//! 4. mark a move that mostly repeats a recent suggestion
//!
//! Later steps see the already truncated text.

use std::collections::HashSet;

use crate::{policy::InsightPolicy, types::Insight, types::TelemetrySnapshot};

#[derive(Debug, Clone, Default)]
pub struct ConstraintGuard {
    policy: InsightPolicy,
}

impl ConstraintGuard {
    pub fn new(policy: InsightPolicy) -> Self {
        Self { policy }
    }

    #[tracing::instrument(skip_all, fields(viewer_delta = snapshot.viewer_delta))]
    pub fn enforce(&self, insight: Insight, snapshot: &TelemetrySnapshot) -> Insight {
        let policy = &self.policy;

        let mut emotional_label = truncate_words(&insight.emotional_label, policy.max_label_words);
        let mut next_move = truncate_words(&insight.next_move, policy.max_move_words);

        if let Some(window) = find_bleed(
            &emotional_label,
            &snapshot.transcript,
            policy.label_bleed_window,
            policy.bleed_min_chars,
        ) {
            tracing::warn!(%window, "Transcript bleed in emotionalLabel, replacing");
            emotional_label = neutral_label(snapshot.viewer_delta).to_string();
        }

        if let Some(window) = find_bleed(
            &next_move,
            &snapshot.transcript,
            policy.move_bleed_window,
            policy.bleed_min_chars,
        ) {
            tracing::warn!(%window, "Transcript bleed in nextMove, replacing");
            next_move = neutral_move(snapshot.viewer_delta).to_string();
        }

        let recent = snapshot.recent_insights_tail(policy.repetition_lookback);
        if let Some(prior) = recent
            .iter()
            .find(|prior| overlap_ratio(&next_move, prior) > policy.repetition_ratio)
        {
            tracing::info!(%prior, %next_move, "nextMove repeats a recent suggestion");
            let prefixed = format!("{}{}", policy.repetition_prefix, next_move);
            let capped = truncate_chars(&prefixed, policy.repetition_max_chars);
            next_move = truncate_words(&capped, policy.max_move_words);
        }

        Insight {
            emotional_label,
            next_move,
        }
    }
}

/// Neutral label used when the model's label leaked transcript text.
pub fn neutral_label(viewer_delta: i64) -> &'static str {
    if viewer_delta > 0 {
        "✅ Neutral"
    } else {
        "❌ Neutral"
    }
}

/// Neutral move used when the model's move leaked transcript text.
pub fn neutral_move(viewer_delta: i64) -> &'static str {
    if viewer_delta > 0 {
        "Keep momentum"
    } else {
        "Pivot to engaging content"
    }
}

pub fn truncate_words(text: &str, max_words: usize) -> String {
    text.split_whitespace()
        .take(max_words)
        .collect::<Vec<_>>()
        .join(" ")
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars()
        .take(max_chars)
        .collect::<String>()
        .trim_end()
        .to_string()
}

/// Returns the first `window`-word run of `field` that appears verbatim in
/// the transcript. Both sides go through [`normalize_words`] first, so case,
/// spacing and punctuation around words do not hide a match. Runs shorter
/// than `min_chars` characters are too common to count.
fn find_bleed(field: &str, transcript: &str, window: usize, min_chars: usize) -> Option<String> {
    if window == 0 {
        return None;
    }

    let transcript = normalize_words(transcript).join(" ");
    if transcript.is_empty() {
        return None;
    }

    normalize_words(field)
        .windows(window)
        .map(|run| run.join(" "))
        .filter(|run| run.chars().count() >= min_chars)
        .find(|run| contains_phrase(&transcript, run))
}

/// Lowercase words with leading and trailing punctuation removed.
fn normalize_words(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(normalize_token)
        .filter(|w| !w.is_empty())
        .collect()
}

fn normalize_token(word: &str) -> String {
    word.trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase()
}

/// Phrase match aligned to word boundaries of the normalized transcript.
fn contains_phrase(transcript: &str, phrase: &str) -> bool {
    let padded_transcript = format!(" {transcript} ");
    let padded_phrase = format!(" {phrase} ");
    padded_transcript.contains(&padded_phrase)
}

fn tokens(text: &str) -> HashSet<String> {
    normalize_words(text).into_iter().collect()
}

/// |new ∩ prior| / |new| over lowercase word sets.
fn overlap_ratio(candidate: &str, prior: &str) -> f64 {
    let candidate = tokens(candidate);
    if candidate.is_empty() {
        return 0.0;
    }
    let prior = tokens(prior);
    let shared = candidate.intersection(&prior).count();
    shared as f64 / candidate.len() as f64
}
