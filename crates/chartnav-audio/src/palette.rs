#![forbid(unsafe_code)]

//! Timbre palette distinguishing groups in multi-series charts.
//!
//! Eleven fixed entries: the four basic waveforms, then harmonic variants.
//! Group indices beyond the palette wrap around. [`NULL_TONE`] sits outside
//! the palette so an empty reading never sounds like a group.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Oscillator shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Waveform {
    #[default]
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

/// Overtone at `ratio × fundamental`, mixed at `amplitude`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Harmonic {
    pub ratio: f64,
    pub amplitude: f64,
}

/// Attack / decay / release as fractions of the tone duration; sustain as a
/// fraction of peak gain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adsr {
    pub attack: f64,
    pub decay: f64,
    pub sustain: f64,
    pub release: f64,
}

/// One palette slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaletteEntry {
    pub waveform: Waveform,
    /// Gain of the fundamental relative to the voice volume.
    pub fundamental: f64,
    pub harmonics: &'static [Harmonic],
    pub adsr: Adsr,
}

const fn h(ratio: f64, amplitude: f64) -> Harmonic {
    Harmonic { ratio, amplitude }
}

const fn adsr(attack: f64, decay: f64, sustain: f64, release: f64) -> Adsr {
    Adsr {
        attack,
        decay,
        sustain,
        release,
    }
}

/// Named palette slots.
pub mod index {
    pub const SINE_BASIC: usize = 0;
    pub const SQUARE_BASIC: usize = 1;
    pub const SAWTOOTH_BASIC: usize = 2;
    pub const TRIANGLE_BASIC: usize = 3;
    pub const SAWTOOTH_DARK: usize = 4;
    pub const SINE_HARMONIC: usize = 5;
    pub const TRIANGLE_HARMONIC: usize = 6;
    pub const SQUARE_HARMONIC: usize = 7;
    pub const TRIANGLE_MELLOW: usize = 8;
    pub const SINE_SUBTLE: usize = 9;
    pub const SAWTOOTH_SOFT: usize = 10;
}

pub const PALETTE: [PaletteEntry; 11] = [
    PaletteEntry {
        waveform: Waveform::Sine,
        fundamental: 1.0,
        harmonics: &[],
        adsr: adsr(0.01, 0.1, 0.8, 0.2),
    },
    PaletteEntry {
        waveform: Waveform::Square,
        fundamental: 1.0,
        harmonics: &[],
        adsr: adsr(0.005, 0.05, 0.7, 0.15),
    },
    PaletteEntry {
        waveform: Waveform::Sawtooth,
        fundamental: 1.0,
        harmonics: &[],
        adsr: adsr(0.02, 0.08, 0.6, 0.25),
    },
    PaletteEntry {
        waveform: Waveform::Triangle,
        fundamental: 1.0,
        harmonics: &[],
        adsr: adsr(0.015, 0.12, 0.9, 0.18),
    },
    PaletteEntry {
        waveform: Waveform::Sawtooth,
        fundamental: 1.0,
        harmonics: &[h(2.0, 0.2), h(3.0, 0.1), h(5.0, 0.05)],
        adsr: adsr(0.005, 0.3, 0.4, 0.5),
    },
    PaletteEntry {
        waveform: Waveform::Sine,
        fundamental: 1.0,
        harmonics: &[h(2.0, 0.15), h(4.0, 0.05)],
        adsr: adsr(0.02, 0.2, 0.6, 0.3),
    },
    PaletteEntry {
        waveform: Waveform::Triangle,
        fundamental: 1.0,
        harmonics: &[h(3.0, 0.2), h(6.0, 0.1)],
        adsr: adsr(0.01, 0.1, 0.8, 0.2),
    },
    PaletteEntry {
        waveform: Waveform::Square,
        fundamental: 1.0,
        harmonics: &[h(3.0, 0.1), h(7.0, 0.05)],
        adsr: adsr(0.005, 0.05, 0.5, 0.1),
    },
    PaletteEntry {
        waveform: Waveform::Triangle,
        fundamental: 1.0,
        harmonics: &[h(2.5, 0.15), h(4.5, 0.08)],
        adsr: adsr(0.01, 0.4, 0.3, 0.5),
    },
    PaletteEntry {
        waveform: Waveform::Sine,
        fundamental: 1.0,
        harmonics: &[h(2.0, 0.1), h(3.0, 0.05)],
        adsr: adsr(0.02, 0.1, 0.9, 0.15),
    },
    PaletteEntry {
        waveform: Waveform::Sawtooth,
        fundamental: 1.0,
        harmonics: &[h(2.0, 0.05), h(6.0, 0.02)],
        adsr: adsr(0.005, 0.4, 0.2, 0.6),
    },
];

/// Timbre of null and zero readings: a hollow triangle with a fifth above
/// and a short, dry envelope.
pub const NULL_TONE: PaletteEntry = PaletteEntry {
    waveform: Waveform::Triangle,
    fundamental: 0.8,
    harmonics: &[h(1.5, 0.3)],
    adsr: adsr(0.005, 0.15, 0.3, 0.3),
};

/// Entry for `group`, wrapping past the end of the palette.
#[must_use]
pub fn entry(group: usize) -> &'static PaletteEntry {
    &PALETTE[group % PALETTE.len()]
}

/// Direction of a candle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Trend {
    Bull,
    Bear,
    Neutral,
}

impl Trend {
    /// Classify a candle by its open and close.
    #[must_use]
    pub fn of(open: f64, close: f64) -> Self {
        if close > open {
            Self::Bull
        } else if close < open {
            Self::Bear
        } else {
            Self::Neutral
        }
    }

    #[must_use]
    pub const fn palette_index(self) -> usize {
        match self {
            Self::Bull => index::SINE_BASIC,
            Self::Bear => index::SAWTOOTH_SOFT,
            Self::Neutral => index::TRIANGLE_BASIC,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Bull => "bull",
            Self::Bear => "bear",
            Self::Neutral => "neutral",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_past_palette() {
        assert_eq!(entry(11), entry(0));
        assert_eq!(entry(14).waveform, Waveform::Triangle);
    }

    #[test]
    fn adsr_fractions_fit_duration() {
        for e in PALETTE.iter().chain([&NULL_TONE]) {
            let a = e.adsr;
            assert!(a.attack + a.decay + a.release <= 1.0);
            assert!(a.sustain > 0.0 && a.sustain <= 1.0);
        }
    }

    #[test]
    fn null_tone_differs_from_every_group() {
        assert!(PALETTE.iter().all(|e| *e != NULL_TONE));
        assert!(!NULL_TONE.harmonics.is_empty());
    }

    #[test]
    fn trends_map_to_distinct_timbres() {
        assert_eq!(Trend::of(1.0, 2.0), Trend::Bull);
        assert_eq!(Trend::of(2.0, 1.0), Trend::Bear);
        assert_eq!(Trend::of(2.0, 2.0), Trend::Neutral);
        assert_eq!(entry(Trend::Bear.palette_index()).waveform, Waveform::Sawtooth);
        assert_eq!(entry(Trend::Neutral.palette_index()).waveform, Waveform::Triangle);
    }
}
