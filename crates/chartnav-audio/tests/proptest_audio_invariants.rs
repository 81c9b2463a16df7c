//! Property-based invariant tests for sonification.
//!
//! 1. Frequencies stay inside the configured band for in-range values
//! 2. Pan stays inside `[-1, 1]` for every layout
//! 3. Every voice a cue starts is released once the scheduler drains
//! 4. Envelopes never touch zero gain

use std::sync::Arc;
use std::time::Duration;

use chartnav_audio::{
    AudioMode, AudioSettings, GainEnvelope, ManualScheduler, PALETTE, RecordingSink, SharedSink,
    SonificationEngine, mapping,
};
use chartnav_core::{AudioCue, Panning, Segment, Value, ValueRange};
use proptest::prelude::*;

// ── Strategies ──────────────────────────────────────────────────────────

fn range_strategy() -> impl Strategy<Value = ValueRange> {
    (-1e6f64..1e6, 0.0f64..1e6).prop_map(|(min, span)| ValueRange::new(min, min + span))
}

fn segment_strategy() -> impl Strategy<Value = Segment> {
    prop_oneof![
        Just(Segment::Datum),
        Just(Segment::LowerOutlier),
        Just(Segment::Minimum),
        Just(Segment::Median),
        Just(Segment::Maximum),
        Just(Segment::Open),
    ]
}

fn value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        (-10.0f64..10.0).prop_map(Value::Number),
        prop::collection::vec(-10.0f64..10.0, 0..5).prop_map(Value::Numbers),
        Just(Value::Missing),
        Just(Value::Category("a".to_owned())),
    ]
}

// ═══════════════════════════════════════════════════════════════════════
// 1–2. Mapping bounds
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn frequency_within_band(range in range_strategy(), t in 0.0f64..=1.0) {
        let settings = AudioSettings::default();
        let value = range.min + t * (range.max - range.min);
        let f = mapping::frequency(value, range, &settings);
        prop_assert!(f >= settings.min_frequency - 1e-6);
        prop_assert!(f <= settings.max_frequency + 1e-6);
    }

    #[test]
    fn pan_within_unit(size in 0usize..64, index in 0usize..64) {
        let p = mapping::pan(Panning::new(index.min(size.saturating_sub(1)), size));
        prop_assert!((-1.0..=1.0).contains(&p));
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 3. Cleanup
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn every_voice_is_released(
        value in value_strategy(),
        segment in segment_strategy(),
        group in prop::option::of(0usize..20),
        combined in any::<bool>(),
    ) {
        let sink = RecordingSink::shared();
        let sched = ManualScheduler::new();
        let shared: SharedSink = sink.clone();
        let mut engine =
            SonificationEngine::new(AudioSettings::default(), shared, Arc::new(sched.clone()));
        if combined {
            engine.set_mode(AudioMode::Combined);
        }
        let cue = AudioCue {
            value,
            range: ValueRange::new(-10.0, 10.0),
            panning: Panning::new(1, 3),
            group,
            segment,
            multi_valued: false,
            intersections: Vec::new(),
            continuous: false,
        };
        let ids = engine.play(&cue);
        prop_assert!(!ids.is_empty());
        sched.advance(Duration::from_secs(10));
        prop_assert_eq!(sink.lock().unwrap().live_voices(), 0);
        prop_assert_eq!(sched.pending(), 0);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 4. Envelopes
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn envelopes_stay_positive(
        volume in 0.001f64..=1.0,
        millis in 1u64..5_000,
        slot in 0usize..11,
    ) {
        let d = Duration::from_millis(millis);
        let adsr = GainEnvelope::adsr(PALETTE[slot].adsr, volume, d);
        let standard = GainEnvelope::standard(volume, d);
        for env in [adsr, standard] {
            prop_assert!(env.points().iter().all(|p| p.gain > 0.0));
            prop_assert_eq!(env.duration(), d);
        }
    }
}
