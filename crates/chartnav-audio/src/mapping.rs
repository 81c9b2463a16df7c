#![forbid(unsafe_code)]

//! Value-to-sound mapping.
//!
//! Frequency is a linear map of the value from the trace's observed range
//! into the audible band. Panning is a linear map of the horizontal index
//! into `[-1, 1]`, clamped.

use chartnav_core::{Panning, ValueRange, interpolate};

use crate::settings::AudioSettings;

const PAN_RANGE: ValueRange = ValueRange::new(-1.0, 1.0);

/// Map `value` from `range` into the configured frequency band.
///
/// A degenerate range maps to the band minimum.
#[must_use]
pub fn frequency(value: f64, range: ValueRange, settings: &AudioSettings) -> f64 {
    let band = ValueRange::new(settings.min_frequency, settings.max_frequency);
    interpolate(value, range, band)
}

/// Stereo position of `panning` in `[-1, 1]`.
///
/// A single-slot layout is centered.
#[must_use]
pub fn pan(panning: Panning) -> f64 {
    if panning.size <= 1 {
        return 0.0;
    }
    let slots = ValueRange::new(0.0, (panning.size - 1) as f64);
    interpolate(panning.index as f64, slots, PAN_RANGE).clamp(-1.0, 1.0)
}

/// Pan positions for a sweep over `len` consecutive slots.
#[must_use]
pub fn pan_curve(len: usize) -> Vec<f64> {
    (0..len).map(|i| pan(Panning::new(i, len))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_endpoints() {
        let s = AudioSettings::default();
        let r = ValueRange::new(-3.0, 7.0);
        assert_eq!(frequency(-3.0, r, &s), 100.0);
        assert_eq!(frequency(7.0, r, &s), 1000.0);
    }

    #[test]
    fn degenerate_range_is_band_min() {
        let s = AudioSettings::default();
        assert_eq!(frequency(4.0, ValueRange::new(4.0, 4.0), &s), 100.0);
    }

    #[test]
    fn pan_spans_stereo_field() {
        assert_eq!(pan(Panning::new(0, 5)), -1.0);
        assert_eq!(pan(Panning::new(2, 5)), 0.0);
        assert_eq!(pan(Panning::new(4, 5)), 1.0);
        assert_eq!(pan(Panning::new(9, 5)), 1.0);
    }

    #[test]
    fn single_slot_is_centered() {
        assert_eq!(pan(Panning::new(0, 1)), 0.0);
        assert_eq!(pan(Panning::new(0, 0)), 0.0);
    }

    #[test]
    fn curve_is_monotonic() {
        let c = pan_curve(4);
        assert_eq!(c.first(), Some(&-1.0));
        assert_eq!(c.last(), Some(&1.0));
        assert!(c.windows(2).all(|w| w[0] < w[1]));
    }
}
