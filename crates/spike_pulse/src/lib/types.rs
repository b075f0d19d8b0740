use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Voice-derived affect signal. Scores are percentages as sent by the client.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Prosody {
    pub top_emotion: Option<String>,
    pub top_score: Option<f64>,
    pub energy: Option<f64>,
    pub excitement: Option<f64>,
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Burst {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub detected: bool,
}

/// Older clients nest the text emotion as `language: {emotion}`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LanguageSignal {
    pub emotion: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HistoryItem {
    pub delta: i64,
    pub emotion: Option<String>,
}

/// One request's worth of live-stream signals.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetrySnapshot {
    pub transcript: String,
    #[serde(default)]
    pub viewer_delta: i64,
    #[serde(default)]
    pub viewer_count: u64,
    #[serde(default)]
    pub prev_count: u64,
    pub prosody: Option<Prosody>,
    pub burst: Option<Burst>,
    pub language_emotion: Option<String>,
    pub language: Option<LanguageSignal>,
    pub topic: Option<String>,
    pub quality: Option<String>,
    /// most recent last
    #[serde(default)]
    pub recent_history: Vec<HistoryItem>,
    pub keywords_said: Option<BTreeSet<String>>,
    /// previously emitted `nextMove` values, most recent last
    pub recent_insights: Option<Vec<String>>,
    pub winning_topics: Option<Vec<String>>,
    pub transcript_quality: Option<String>,
    pub unique_word_ratio: Option<f64>,
}

impl TelemetrySnapshot {
    pub fn new(transcript: impl Into<String>, viewer_delta: i64) -> Self {
        Self {
            transcript: transcript.into(),
            viewer_delta,
            ..Default::default()
        }
    }

    /// Trims and lowercases the free-form labels, drops blank entries and
    /// clamps the unique word ratio. Never rejects a snapshot.
    pub fn normalize(mut self) -> Self {
        self.transcript = self.transcript.trim().to_string();
        self.topic = normalize_label(self.topic);
        self.quality = normalize_label(self.quality);
        self.transcript_quality = normalize_label(self.transcript_quality);
        self.language_emotion = non_blank(self.language_emotion)
            .or_else(|| self.language.take().and_then(|l| non_blank(l.emotion)));
        self.unique_word_ratio = self
            .unique_word_ratio
            .filter(|r| r.is_finite())
            .map(|r| r.clamp(0.0, 1.0));
        self.recent_insights = self.recent_insights.map(retain_non_blank);
        self.winning_topics = self.winning_topics.map(retain_non_blank);
        self.keywords_said = self.keywords_said.map(|keywords| {
            keywords
                .into_iter()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
                .collect()
        });
        self
    }

    /// `viewerDelta` is expected to equal `viewerCount - prevCount` but the
    /// client owns that invariant; callers only log a mismatch.
    pub fn viewer_delta_is_consistent(&self) -> bool {
        self.viewer_count as i128 - self.prev_count as i128 == self.viewer_delta as i128
    }

    pub fn language_emotion(&self) -> Option<&str> {
        self.language_emotion
            .as_deref()
            .or_else(|| self.language.as_ref().and_then(|l| l.emotion.as_deref()))
    }

    /// The last `n` prior suggestions, oldest first.
    pub fn recent_insights_tail(&self, n: usize) -> &[String] {
        match &self.recent_insights {
            Some(insights) => &insights[insights.len().saturating_sub(n)..],
            None => &[],
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn normalize_label(value: Option<String>) -> Option<String> {
    non_blank(value).map(|v| v.to_lowercase())
}

fn retain_non_blank(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

/// The two coaching fields, before provenance is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insight {
    pub emotional_label: String,
    pub next_move: String,
}

impl Insight {
    pub fn new(emotional_label: impl Into<String>, next_move: impl Into<String>) -> Self {
        Self {
            emotional_label: emotional_label.into(),
            next_move: next_move.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightSource {
    #[serde(alias = "claude")]
    Llm,
    Fallback,
    FallbackRateLimited,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightResult {
    pub emotional_label: String,
    pub next_move: String,
    pub source: InsightSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

impl InsightResult {
    pub fn new(insight: Insight, source: InsightSource, correlation_id: impl Into<String>) -> Self {
        Self {
            emotional_label: insight.emotional_label,
            next_move: insight.next_move,
            source,
            correlation_id: Some(correlation_id.into()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmotionRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EmotionReading {
    pub emotion: String,
    /// 0.0 - 1.0
    pub score: f64,
    /// integer percent
    pub confidence: u8,
}

impl EmotionReading {
    /// Returned whenever the upstream classifier cannot be used.
    pub fn neutral() -> Self {
        Self {
            emotion: "Neutral".into(),
            score: 0.5,
            confidence: 0,
        }
    }
}
