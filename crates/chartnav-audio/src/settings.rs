#![forbid(unsafe_code)]

//! Tunable sonification parameters.
//!
//! Every default matches the constants the engine was designed around, so
//! `AudioSettings::default()` is the reference sound.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use chartnav_core::SegmentShape;

/// Duration and chord policy per segment shape.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SegmentPolicy {
    /// Duration multiplier for outliers.
    pub punctual: f64,
    /// Duration multiplier for whiskers.
    pub extended: f64,
    /// Duration multiplier for the box body.
    pub compound: f64,
    /// Frequency ratio of the chord tone under the box body (0.5 = one octave).
    pub chord_ratio: f64,
    /// Volume ratio of the chord tone.
    pub chord_volume: f64,
}

impl Default for SegmentPolicy {
    fn default() -> Self {
        Self {
            punctual: 0.5,
            extended: 2.0,
            compound: 2.0,
            chord_ratio: 0.5,
            chord_volume: 0.25,
        }
    }
}

impl SegmentPolicy {
    #[must_use]
    pub fn duration_multiplier(&self, shape: SegmentShape) -> f64 {
        match shape {
            SegmentShape::Normal => 1.0,
            SegmentShape::Punctual => self.punctual,
            SegmentShape::Extended => self.extended,
            SegmentShape::Compound => self.compound,
        }
    }
}

/// Dynamics limiter shared by every voice.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LimiterSettings {
    pub threshold_db: f64,
    pub knee_db: f64,
    pub ratio: f64,
    pub attack_secs: f64,
    pub release_secs: f64,
    /// Output gain after compression.
    pub makeup_gain: f64,
}

impl Default for LimiterSettings {
    fn default() -> Self {
        Self {
            threshold_db: -50.0,
            knee_db: 40.0,
            ratio: 12.0,
            attack_secs: 0.0,
            release_secs: 0.25,
            makeup_gain: 0.5,
        }
    }
}

/// User-facing audio configuration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AudioSettings {
    /// Volume in percent, 0..=100. Applied quadratically.
    pub volume: u8,
    /// Lower edge of the audible band, Hz.
    pub min_frequency: f64,
    /// Upper edge of the audible band, Hz.
    pub max_frequency: f64,
    /// Base tone duration, seconds.
    pub tone_duration_secs: f64,
    /// Frequency of the zero/absent tone, Hz.
    pub null_frequency: f64,
    /// Gap between members of a multi-value cell in separate mode, ms.
    pub separate_stagger_ms: u64,
    /// Length of a full line sweep, seconds.
    pub sweep_duration_secs: f64,
    /// Fade applied when a sweep is cancelled, ms.
    pub sweep_fade_ms: u64,
    pub segments: SegmentPolicy,
    pub limiter: LimiterSettings,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            volume: 50,
            min_frequency: 100.0,
            max_frequency: 1000.0,
            tone_duration_secs: 0.3,
            null_frequency: 100.0,
            separate_stagger_ms: 50,
            sweep_duration_secs: 4.0,
            sweep_fade_ms: 30,
            segments: SegmentPolicy::default(),
            limiter: LimiterSettings::default(),
        }
    }
}

impl AudioSettings {
    /// Quadratic volume in `0.0..=1.0`.
    #[must_use]
    pub fn gain(&self) -> f64 {
        let v = f64::from(self.volume.min(100)) / 100.0;
        v * v
    }

    /// Validation messages; empty when the settings are usable.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.volume > 100 {
            errors.push(format!("audio.volume must be in 0..=100, got {}", self.volume));
        }
        if !(self.min_frequency > 0.0 && self.min_frequency < self.max_frequency) {
            errors.push(format!(
                "audio.min_frequency must be positive and below max_frequency, got {} / {}",
                self.min_frequency, self.max_frequency
            ));
        }
        if self.tone_duration_secs <= 0.0 {
            errors.push(format!(
                "audio.tone_duration_secs must be > 0, got {}",
                self.tone_duration_secs
            ));
        }
        if self.sweep_duration_secs <= 0.0 {
            errors.push(format!(
                "audio.sweep_duration_secs must be > 0, got {}",
                self.sweep_duration_secs
            ));
        }
        if self.segments.chord_ratio <= 0.0 {
            errors.push(format!(
                "audio.segments.chord_ratio must be > 0, got {}",
                self.segments.chord_ratio
            ));
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(AudioSettings::default().validate().is_empty());
    }

    #[test]
    fn gain_is_quadratic() {
        let s = AudioSettings {
            volume: 50,
            ..AudioSettings::default()
        };
        assert!((s.gain() - 0.25).abs() < 1e-12);
        let loud = AudioSettings {
            volume: 100,
            ..AudioSettings::default()
        };
        assert_eq!(loud.gain(), 1.0);
    }

    #[test]
    fn validate_reports_inverted_band() {
        let s = AudioSettings {
            min_frequency: 900.0,
            max_frequency: 200.0,
            volume: 120,
            ..AudioSettings::default()
        };
        let errors = s.validate();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("volume"));
    }

    #[test]
    fn multipliers_follow_shape() {
        let p = SegmentPolicy::default();
        assert_eq!(p.duration_multiplier(SegmentShape::Punctual), 0.5);
        assert_eq!(p.duration_multiplier(SegmentShape::Compound), 2.0);
        assert_eq!(p.duration_multiplier(SegmentShape::Normal), 1.0);
    }
}
