#![forbid(unsafe_code)]

//! Click-free gain envelopes.
//!
//! # Invariants
//!
//! - For a positive volume no breakpoint is zero. Tones end on the floor
//!   (`FLOOR × volume`), so a voice is never cut mid-cycle.
//! - Only [`GainEnvelope::adsr`] also starts on the floor. The standard and
//!   sweep curves open at half volume; [`GainEnvelope::decay`] opens at its
//!   `start` gain.
//! - Breakpoint times are non-decreasing and the last one equals the
//!   envelope duration.

use std::time::Duration;

use crate::palette::Adsr;

/// Near-silent gain used instead of zero.
pub const FLOOR: f64 = 1e-4;

/// Default curve, spread evenly over the tone: rise, hold, fast decay.
const DEFAULT_CURVE: [f64; 7] = [0.5, 1.0, 0.5, 0.5, 0.5, 0.1, FLOOR];

/// How the gain travels from the previous breakpoint to this one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ramp {
    /// Jump at the breakpoint time.
    Step,
    Linear,
    Exponential,
}

/// One gain breakpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainPoint {
    pub at: Duration,
    pub gain: f64,
    pub ramp: Ramp,
}

/// A piecewise gain curve.
#[derive(Debug, Clone, PartialEq)]
pub struct GainEnvelope {
    points: Vec<GainPoint>,
}

impl GainEnvelope {
    #[must_use]
    pub fn points(&self) -> &[GainPoint] {
        &self.points
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.points.last().map_or(Duration::ZERO, |p| p.at)
    }

    #[must_use]
    pub fn peak(&self) -> f64 {
        self.points.iter().map(|p| p.gain).fold(0.0, f64::max)
    }

    #[must_use]
    pub fn final_gain(&self) -> f64 {
        self.points.last().map_or(0.0, |p| p.gain)
    }

    /// Evenly spaced linear curve over `duration`.
    #[must_use]
    pub fn from_curve(values: &[f64], duration: Duration) -> Self {
        let steps = values.len().saturating_sub(1).max(1) as u128;
        let total = duration.as_nanos();
        let points = values
            .iter()
            .enumerate()
            .map(|(i, &gain)| GainPoint {
                at: nanos(total * i as u128 / steps),
                gain,
                ramp: if i == 0 { Ramp::Step } else { Ramp::Linear },
            })
            .collect();
        Self { points }
    }

    /// The default tone curve scaled by `volume`.
    #[must_use]
    pub fn standard(volume: f64, duration: Duration) -> Self {
        let scaled: Vec<f64> = DEFAULT_CURVE.iter().map(|g| g * volume).collect();
        Self::from_curve(&scaled, duration)
    }

    /// ADSR shape from a palette entry, scaled by `volume`.
    ///
    /// Starts on the floor, rises to `volume`, decays to `sustain`, holds,
    /// and releases back to the floor at `duration`.
    #[must_use]
    pub fn adsr(shape: Adsr, volume: f64, duration: Duration) -> Self {
        let secs = duration.as_secs_f64();
        let attack = secs * shape.attack;
        let decay = secs * shape.decay;
        let release = secs * shape.release;
        let sustain_time = secs - attack - decay - release;
        let sustain = shape.sustain * volume;
        let floor = FLOOR * volume;

        let mut points = vec![
            GainPoint {
                at: Duration::ZERO,
                gain: floor,
                ramp: Ramp::Step,
            },
            GainPoint {
                at: Duration::from_secs_f64(attack),
                gain: volume,
                ramp: Ramp::Linear,
            },
            GainPoint {
                at: Duration::from_secs_f64(attack + decay),
                gain: sustain,
                ramp: Ramp::Linear,
            },
        ];
        if sustain_time > 0.0 {
            points.push(GainPoint {
                at: Duration::from_secs_f64(attack + decay + sustain_time),
                gain: sustain,
                ramp: Ramp::Step,
            });
        }
        points.push(GainPoint {
            at: duration,
            gain: floor,
            ramp: Ramp::Linear,
        });
        Self { points }
    }

    /// Flat sweep envelope: `3n` samples at half volume, then the floor.
    #[must_use]
    pub fn sweep(samples: usize, volume: f64, duration: Duration) -> Self {
        let mut curve = vec![0.5 * volume; samples.max(1) * 3];
        curve.push(FLOOR * volume);
        Self::from_curve(&curve, duration)
    }

    /// Exponential decay from `start` to `end` over `duration`.
    #[must_use]
    pub fn decay(start: f64, end: f64, duration: Duration) -> Self {
        Self {
            points: vec![
                GainPoint {
                    at: Duration::ZERO,
                    gain: start,
                    ramp: Ramp::Step,
                },
                GainPoint {
                    at: duration,
                    gain: end,
                    ramp: Ramp::Exponential,
                },
            ],
        }
    }
}

fn nanos(n: u128) -> Duration {
    Duration::from_nanos(u64::try_from(n).unwrap_or(u64::MAX))
}
