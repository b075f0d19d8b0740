//! # Fallback Synthesizer
//!
//! Rule-based insight used whenever the model path fails. A pure function of
//! `(topic, viewer_delta)` that never fails and never leaves the process.

use crate::{
    policy::{Band, BandThresholds, Topic},
    types::{Insight, InsightResult, InsightSource},
};

#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackSynthesizer {
    thresholds: BandThresholds,
}

impl FallbackSynthesizer {
    pub fn new(thresholds: BandThresholds) -> Self {
        Self { thresholds }
    }

    /// Picks the band with the fixed decision order
    /// `delta > 0`, `|delta| > dump`, `delta < 0`, otherwise flat.
    pub fn band(&self, viewer_delta: i64) -> Band {
        if viewer_delta > 0 {
            Band::Spike
        } else if viewer_delta.unsigned_abs() > self.thresholds.dump.unsigned_abs() {
            Band::Dump
        } else if viewer_delta < 0 {
            Band::Drop
        } else {
            Band::Flatline
        }
    }

    pub fn synthesize(&self, topic: Option<&str>, viewer_delta: i64) -> Insight {
        let w = Topic::from_label(topic).word();
        let t = &self.thresholds;

        match self.band(viewer_delta) {
            Band::Spike if viewer_delta >= t.big_win => Insight::new(
                format!("{w} wins big"),
                format!("Double down on {w}. Stay hyped"),
            ),
            Band::Spike if viewer_delta >= t.solid_win => Insight::new(
                format!("{w} works"),
                format!("Do more {w} talk. Keep energy up"),
            ),
            Band::Spike => Insight::new(
                format!("{w} gains"),
                format!("Keep {w} going. Build excitement"),
            ),
            Band::Dump => Insight::new(
                format!("{w} dump"),
                format!("Stop {w}. Change topic now"),
            ),
            Band::Drop => Insight::new(
                format!("{w} dip"),
                format!("Less {w}. Pivot to chat. Boost energy"),
            ),
            Band::Flatline => Insight::new(
                format!("{w} steady"),
                "Ask where they're from. Create buzz",
            ),
        }
    }

    /// Same copy either way; only the provenance tag differs.
    pub fn result(
        &self,
        topic: Option<&str>,
        viewer_delta: i64,
        rate_limited: bool,
        correlation_id: impl Into<String>,
    ) -> InsightResult {
        let source = if rate_limited {
            InsightSource::FallbackRateLimited
        } else {
            InsightSource::Fallback
        };
        InsightResult::new(self.synthesize(topic, viewer_delta), source, correlation_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synth() -> FallbackSynthesizer {
        FallbackSynthesizer::default()
    }

    #[test]
    fn test_is_deterministic() {
        let first = synth().synthesize(Some("gaming"), 25);
        for _ in 0..10 {
            assert_eq!(synth().synthesize(Some("gaming"), 25), first);
        }
        assert_eq!(first, Insight::new("gaming wins big", "Double down on gaming. Stay hyped"));
    }

    #[test]
    fn test_band_boundaries() {
        assert_eq!(synth().band(5), Band::Spike);
        assert_eq!(synth().band(1), Band::Spike);
        assert_eq!(synth().band(-10), Band::Drop);
        assert_eq!(synth().band(-30), Band::Drop);
        assert_eq!(synth().band(-31), Band::Dump);
        assert_eq!(synth().band(-35), Band::Dump);
        assert_eq!(synth().band(0), Band::Flatline);
    }

    #[test]
    fn test_spike_tiers() {
        assert_eq!(synth().synthesize(Some("food"), 20).emotional_label, "cooking wins big");
        assert_eq!(synth().synthesize(Some("food"), 10).emotional_label, "cooking works");
        assert_eq!(synth().synthesize(Some("food"), 5).emotional_label, "cooking gains");
    }

    #[test]
    fn test_negative_bands_use_topic_word() {
        let dump = synth().synthesize(Some("finance"), -35);
        assert_eq!(dump, Insight::new("money dump", "Stop money. Change topic now"));

        let drop = synth().synthesize(Some("personal"), -10);
        assert_eq!(drop.emotional_label, "story dip");

        let flat = synth().synthesize(None, 0);
        assert_eq!(flat.emotional_label, "content steady");
    }

    #[test]
    fn test_custom_dump_threshold() {
        let synth = FallbackSynthesizer::new(BandThresholds {
            dump: 20,
            ..Default::default()
        });
        assert_eq!(synth.band(-21), Band::Dump);
        assert_eq!(synth.band(-20), Band::Drop);
    }

    #[test]
    fn test_word_limits_hold_for_every_band() {
        for topic in [None, Some("interaction"), Some("giveaway"), Some("fitness")] {
            for delta in [-100, -31, -30, -5, -1, 0, 1, 9, 10, 19, 20, 500] {
                let insight = synth().synthesize(topic, delta);
                assert!(insight.emotional_label.split_whitespace().count() <= 3);
                let words = insight.next_move.split_whitespace().count();
                assert!((1..=8).contains(&words), "{}", insight.next_move);
            }
        }
    }

    #[test]
    fn test_rate_limited_only_changes_source() {
        let plain = synth().result(Some("gaming"), -12, false, "a");
        let limited = synth().result(Some("gaming"), -12, true, "b");

        assert_eq!(plain.source, InsightSource::Fallback);
        assert_eq!(limited.source, InsightSource::FallbackRateLimited);
        assert_eq!(plain.emotional_label, limited.emotional_label);
        assert_eq!(plain.next_move, limited.next_move);
    }
}
