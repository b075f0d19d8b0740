//! # Insight Policy
//!
//! Tunable numbers shared by the prompt templates, the constraint guard and
//! the fallback synthesizer. Nothing in the pipeline hard-codes a threshold;
//! everything reads it from an [`InsightPolicy`].

use std::fmt;

/// Viewer-delta thresholds, all expressed as positive magnitudes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandThresholds {
    /// `|delta| <= flatline_tolerance` is called steady inside the flatline band
    pub flatline_tolerance: i64,
    /// `delta >= spike` is a spike
    pub spike: i64,
    /// `delta >= strong_spike` is a spike worth doubling down on
    pub strong_spike: i64,
    /// `delta <= -drop` is a drop
    pub drop: i64,
    /// `delta <= -drop_floor` is called steep inside the drop band
    pub drop_floor: i64,
    /// `delta < -dump` is a dump
    pub dump: i64,
    /// positive delta at which the fallback says "wins big"
    pub big_win: i64,
    /// positive delta at which the fallback says "works"
    pub solid_win: i64,
}

impl Default for BandThresholds {
    fn default() -> Self {
        Self {
            flatline_tolerance: 3,
            spike: 5,
            strong_spike: 15,
            drop: 5,
            drop_floor: 15,
            dump: 30,
            big_win: 20,
            solid_win: 10,
        }
    }
}

/// Qualitative classification of a viewer delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    Spike,
    Flatline,
    Drop,
    Dump,
}

impl Band {
    /// Band used to describe the delta to the model.
    pub fn classify(delta: i64, thresholds: &BandThresholds) -> Self {
        if delta >= thresholds.spike {
            Band::Spike
        } else if delta < -thresholds.dump {
            Band::Dump
        } else if delta <= -thresholds.drop {
            Band::Drop
        } else {
            Band::Flatline
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Band::Spike => "spike",
            Band::Flatline => "flatline",
            Band::Drop => "drop",
            Band::Dump => "dump",
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse content category as reported by the client, mapped onto the short
/// word the fallback copy uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    Food,
    Fitness,
    Finance,
    Personal,
    Interaction,
    Gaming,
    Makeup,
    Giveaway,
    General,
}

impl Topic {
    /// Unknown or absent topics map to [`Topic::General`].
    pub fn from_label(label: Option<&str>) -> Self {
        let Some(label) = label else {
            return Topic::General;
        };

        match label.trim().to_ascii_lowercase().as_str() {
            "food" | "cooking" => Topic::Food,
            "fitness" | "workout" => Topic::Fitness,
            "finance" | "money" => Topic::Finance,
            "personal" | "story" => Topic::Personal,
            "interaction" | "chat" => Topic::Interaction,
            "gaming" => Topic::Gaming,
            "makeup" => Topic::Makeup,
            "giveaway" => Topic::Giveaway,
            _ => Topic::General,
        }
    }

    pub fn word(&self) -> &'static str {
        match self {
            Topic::Food => "cooking",
            Topic::Fitness => "workout",
            Topic::Finance => "money",
            Topic::Personal => "story",
            Topic::Interaction => "chat",
            Topic::Gaming => "gaming",
            Topic::Makeup => "makeup",
            Topic::Giveaway => "giveaway",
            Topic::General => "content",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsightPolicy {
    pub max_label_words: usize,
    pub max_move_words: usize,
    /// contiguous words checked against the transcript for the label
    pub label_bleed_window: usize,
    /// contiguous words checked against the transcript for the move
    pub move_bleed_window: usize,
    /// bleed windows shorter than this many characters are ignored
    pub bleed_min_chars: usize,
    /// how many prior moves the repetition check looks at
    pub repetition_lookback: usize,
    /// overlap ratio above which a move counts as repeated
    pub repetition_ratio: f64,
    pub repetition_prefix: &'static str,
    pub repetition_max_chars: usize,
    pub thresholds: BandThresholds,
    /// Treat a missing model credential as an ordinary provider failure
    /// and answer from the fallback instead of failing the request.
    pub degrade_without_credentials: bool,
}

impl Default for InsightPolicy {
    fn default() -> Self {
        Self {
            max_label_words: 3,
            max_move_words: 12,
            label_bleed_window: 3,
            move_bleed_window: 4,
            bleed_min_chars: 10,
            repetition_lookback: 3,
            repetition_ratio: 0.6,
            repetition_prefix: "Try: ",
            repetition_max_chars: 50,
            thresholds: BandThresholds::default(),
            degrade_without_credentials: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_boundaries_follow_default_thresholds() {
        let t = BandThresholds::default();
        assert_eq!(Band::classify(5, &t), Band::Spike);
        assert_eq!(Band::classify(25, &t), Band::Spike);
        assert_eq!(Band::classify(4, &t), Band::Flatline);
        assert_eq!(Band::classify(0, &t), Band::Flatline);
        assert_eq!(Band::classify(-3, &t), Band::Flatline);
        assert_eq!(Band::classify(-5, &t), Band::Drop);
        assert_eq!(Band::classify(-10, &t), Band::Drop);
        assert_eq!(Band::classify(-30, &t), Band::Drop);
        assert_eq!(Band::classify(-31, &t), Band::Dump);
        assert_eq!(Band::classify(-35, &t), Band::Dump);
    }

    #[test]
    fn test_band_respects_custom_thresholds() {
        let t = BandThresholds {
            dump: 20,
            ..Default::default()
        };
        assert_eq!(Band::classify(-21, &t), Band::Dump);
        assert_eq!(Band::classify(-20, &t), Band::Drop);
    }

    #[test]
    fn test_topic_mapping_has_explicit_default() {
        assert_eq!(Topic::from_label(Some("food")).word(), "cooking");
        assert_eq!(Topic::from_label(Some("fitness")).word(), "workout");
        assert_eq!(Topic::from_label(Some("finance")).word(), "money");
        assert_eq!(Topic::from_label(Some("personal")).word(), "story");
        assert_eq!(Topic::from_label(Some("interaction")).word(), "chat");
        assert_eq!(Topic::from_label(Some(" Gaming ")).word(), "gaming");
        assert_eq!(Topic::from_label(Some("general")).word(), "content");
        assert_eq!(Topic::from_label(Some("knitting")).word(), "content");
        assert_eq!(Topic::from_label(None).word(), "content");
    }
}
