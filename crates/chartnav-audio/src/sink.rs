#![forbid(unsafe_code)]

//! Audio sink boundary.
//!
//! The engine never synthesizes samples. It describes voices
//! ([`VoiceSpec`]) and hands them to an [`AudioSink`], which owns the actual
//! output graph. All voices pass through one process-wide limiter configured
//! once via [`AudioSink::configure_limiter`].
//!
//! [`RecordingSink`] records every call for headless tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use ahash::AHashSet;

use crate::envelope::GainEnvelope;
use crate::palette::Waveform;
use crate::settings::LimiterSettings;

/// Handle of a started voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VoiceId(pub u64);

/// A parameter that is either constant or swept evenly over the voice.
#[derive(Debug, Clone, PartialEq)]
pub enum Curve {
    Fixed(f64),
    Sweep(Vec<f64>),
}

impl Curve {
    /// First value of the curve.
    #[must_use]
    pub fn initial(&self) -> f64 {
        match self {
            Self::Fixed(v) => *v,
            Self::Sweep(vs) => vs.first().copied().unwrap_or(0.0),
        }
    }
}

/// Everything a sink needs to start one oscillator.
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceSpec {
    pub waveform: Waveform,
    /// Hz.
    pub frequency: Curve,
    /// Stereo position in `[-1, 1]`.
    pub pan: Curve,
    pub envelope: GainEnvelope,
    /// Delay before the voice starts, relative to the call.
    pub start_offset: Duration,
}

impl VoiceSpec {
    /// Time from the call until the envelope completes.
    #[must_use]
    pub fn end(&self) -> Duration {
        self.start_offset + self.envelope.duration()
    }
}

/// Output device abstraction.
///
/// `release` must tolerate ids that were already released.
pub trait AudioSink {
    fn configure_limiter(&mut self, limiter: &LimiterSettings);
    fn start_voice(&mut self, spec: VoiceSpec) -> VoiceId;
    /// Ramp a voice's gain to `gain` over `over`, replacing its envelope.
    fn ramp(&mut self, id: VoiceId, gain: f64, over: Duration);
    fn release(&mut self, id: VoiceId);
}

/// Sink shared between the engine and its cleanup tasks.
pub type SharedSink = Arc<Mutex<dyn AudioSink + Send>>;

// ---------------------------------------------------------------------------
// RecordingSink
// ---------------------------------------------------------------------------

/// One recorded sink call.
#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    Limiter(LimiterSettings),
    Start { id: VoiceId, spec: VoiceSpec },
    Ramp { id: VoiceId, gain: f64, over: Duration },
    Release { id: VoiceId },
}

/// Headless sink that records calls and tracks live voices.
#[derive(Debug, Default)]
pub struct RecordingSink {
    next_id: u64,
    events: Vec<SinkEvent>,
    live: AHashSet<VoiceId>,
}

impl RecordingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A recording sink wrapped for sharing with an engine.
    #[must_use]
    pub fn shared() -> Arc<Mutex<Self>> {
        Arc::new(Mutex::new(Self::new()))
    }

    #[must_use]
    pub fn events(&self) -> &[SinkEvent] {
        &self.events
    }

    /// Specs of every voice started so far, in start order.
    #[must_use]
    pub fn started(&self) -> Vec<&VoiceSpec> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SinkEvent::Start { spec, .. } => Some(spec),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn live_voices(&self) -> usize {
        self.live.len()
    }

    #[must_use]
    pub fn is_live(&self, id: VoiceId) -> bool {
        self.live.contains(&id)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl AudioSink for RecordingSink {
    fn configure_limiter(&mut self, limiter: &LimiterSettings) {
        self.events.push(SinkEvent::Limiter(*limiter));
    }

    fn start_voice(&mut self, spec: VoiceSpec) -> VoiceId {
        let id = VoiceId(self.next_id);
        self.next_id += 1;
        self.live.insert(id);
        self.events.push(SinkEvent::Start { id, spec });
        id
    }

    fn ramp(&mut self, id: VoiceId, gain: f64, over: Duration) {
        self.events.push(SinkEvent::Ramp { id, gain, over });
    }

    fn release(&mut self, id: VoiceId) {
        if self.live.remove(&id) {
            self.events.push(SinkEvent::Release { id });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> VoiceSpec {
        VoiceSpec {
            waveform: Waveform::Sine,
            frequency: Curve::Fixed(440.0),
            pan: Curve::Fixed(0.0),
            envelope: GainEnvelope::standard(1.0, Duration::from_millis(300)),
            start_offset: Duration::from_millis(50),
        }
    }

    #[test]
    fn records_and_tracks_live_voices() {
        let mut sink = RecordingSink::new();
        let a = sink.start_voice(spec());
        let b = sink.start_voice(spec());
        assert_ne!(a, b);
        assert_eq!(sink.live_voices(), 2);
        sink.release(a);
        sink.release(a);
        assert_eq!(sink.live_voices(), 1);
        assert!(sink.is_live(b));
        let releases = sink
            .events()
            .iter()
            .filter(|e| matches!(e, SinkEvent::Release { .. }))
            .count();
        assert_eq!(releases, 1);
    }

    #[test]
    fn voice_end_includes_offset() {
        assert_eq!(spec().end(), Duration::from_millis(350));
    }

    #[test]
    fn curve_initial() {
        assert_eq!(Curve::Sweep(vec![3.0, 4.0]).initial(), 3.0);
        assert_eq!(Curve::Fixed(2.0).initial(), 2.0);
    }
}
