#![forbid(unsafe_code)]

//! Sonification engine.
//!
//! Turns [`AudioCue`]s into voices on an [`AudioSink`](crate::AudioSink).
//!
//! # Invariants
//!
//! - Every voice started by a call is released by a cleanup task scheduled
//!   strictly after its envelope ends (`start_offset + 2 × duration`).
//! - At most one smooth sweep is alive. Starting another cancels the first.
//! - Nothing is started while the mode is [`AudioMode::Off`] or the volume
//!   is zero.
//! - An intersection of several lines is voiced as one chord: every line's
//!   timbre at the same pitch, started together.
//!
//! # Failure Modes
//!
//! - A poisoned sink lock is recovered; the sink keeps receiving calls.
//! - Non-numeric values (categories) are voiced as the null tone.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chartnav_core::{AudioCue, Panning, SegmentShape, ValueRange};

use crate::envelope::{FLOOR, GainEnvelope};
use crate::mapping;
use crate::palette::{self, NULL_TONE, PaletteEntry, Waveform};
use crate::scheduler::{Scheduler, lock};
use crate::settings::AudioSettings;
use crate::sink::{Curve, SharedSink, VoiceId, VoiceSpec};

/// Partials of the boundary tone and their relative gains.
const EMPTY_PARTIALS: [(f64, f64); 5] = [
    (500.0, 1.0),
    (1000.0, 0.6),
    (1500.0, 0.4),
    (2100.0, 0.2),
    (2700.0, 0.1),
];
const EMPTY_GAIN: f64 = 0.3;
const EMPTY_DURATION: Duration = Duration::from_millis(200);

/// Gain an intersection chord decays to, relative to the volume.
const INTERSECTION_TAIL: f64 = 0.01;

const WARNING_FREQUENCY: f64 = 180.0;
const WARNING_BEEP: Duration = Duration::from_millis(200);
const WARNING_GAP: Duration = Duration::from_millis(100);

/// Sound output mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AudioMode {
    Off,
    /// Multi-values are voiced one after another.
    #[default]
    Separate,
    /// Multi-values are voiced together as a chord.
    Combined,
}

/// Drives an [`AudioSink`](crate::AudioSink) from navigation cues.
pub struct SonificationEngine {
    settings: AudioSettings,
    sink: SharedSink,
    scheduler: Arc<dyn Scheduler>,
    mode: AudioMode,
    multi_valued: bool,
    sweep: Arc<Mutex<Option<VoiceId>>>,
}

impl std::fmt::Debug for SonificationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SonificationEngine")
            .field("settings", &self.settings)
            .field("mode", &self.mode)
            .field("multi_valued", &self.multi_valued)
            .field("sweeping", &self.is_sweeping())
            .finish_non_exhaustive()
    }
}

impl SonificationEngine {
    /// Create an engine and configure the sink's limiter.
    pub fn new(settings: AudioSettings, sink: SharedSink, scheduler: Arc<dyn Scheduler>) -> Self {
        lock(&sink).configure_limiter(&settings.limiter);
        Self {
            settings,
            sink,
            scheduler,
            mode: AudioMode::default(),
            multi_valued: false,
            sweep: Arc::new(Mutex::new(None)),
        }
    }

    #[must_use]
    pub fn settings(&self) -> &AudioSettings {
        &self.settings
    }

    /// Replace the settings; the limiter is reconfigured.
    pub fn set_settings(&mut self, settings: AudioSettings) {
        lock(&self.sink).configure_limiter(&settings.limiter);
        self.settings = settings;
    }

    pub fn set_volume(&mut self, volume: u8) {
        self.settings.volume = volume.min(100);
    }

    #[must_use]
    pub fn mode(&self) -> AudioMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: AudioMode) {
        self.mode = mode;
    }

    /// Adapt the mode when the active trace gains or loses multi-value cells.
    ///
    /// An enabled engine switches to `Combined` for multi-valued traces and
    /// back to `Separate` otherwise. `Off` stays off.
    pub fn track_multi(&mut self, multi_valued: bool) {
        if self.multi_valued == multi_valued {
            return;
        }
        self.multi_valued = multi_valued;
        if self.mode != AudioMode::Off {
            self.mode = if multi_valued {
                AudioMode::Combined
            } else {
                AudioMode::Separate
            };
        }
    }

    /// Cycle the mode and return the announcement.
    ///
    /// Off → Separate (Combined for multi-valued traces), Separate → Off,
    /// Combined → Separate.
    pub fn toggle(&mut self) -> String {
        self.mode = match self.mode {
            AudioMode::Off if self.multi_valued => AudioMode::Combined,
            AudioMode::Off => AudioMode::Separate,
            AudioMode::Separate => AudioMode::Off,
            AudioMode::Combined => AudioMode::Separate,
        };
        if self.mode == AudioMode::Off {
            self.cancel_smooth();
        }
        let label = match self.mode {
            AudioMode::Off => "off",
            AudioMode::Separate if self.multi_valued => "separate",
            AudioMode::Separate => "on",
            AudioMode::Combined => "combined",
        };
        tracing::debug!(mode = ?self.mode, "audio mode toggled");
        format!("Sound is {label}")
    }

    fn audible(&self) -> bool {
        self.mode != AudioMode::Off && self.settings.gain() > 0.0
    }

    fn tone_duration(&self) -> Duration {
        secs(self.settings.tone_duration_secs)
    }

    // -----------------------------------------------------------------------
    // Point tones
    // -----------------------------------------------------------------------

    /// Voice a cue. Returns the ids of every voice started.
    pub fn play(&self, cue: &AudioCue) -> Vec<VoiceId> {
        if !self.audible() {
            return Vec::new();
        }
        let members = cue.value.numbers();
        if members.is_empty() || cue.value.is_null() {
            return self.null_tone(cue.panning, Duration::ZERO);
        }
        if cue.intersections.len() > 1 {
            return self.intersection(members[0], cue);
        }
        if cue.continuous {
            return self.glide(&members, cue);
        }
        let stagger = Duration::from_millis(self.settings.separate_stagger_ms);
        let mut ids = Vec::new();
        for (i, value) in members.into_iter().enumerate() {
            let offset = match self.mode {
                AudioMode::Separate => stagger * u32::try_from(i).unwrap_or(u32::MAX),
                _ => Duration::ZERO,
            };
            if value == 0.0 {
                ids.extend(self.null_tone(cue.panning, offset));
            } else {
                ids.extend(self.tone(value, cue, offset));
            }
        }
        ids
    }

    fn tone(&self, value: f64, cue: &AudioCue, offset: Duration) -> Vec<VoiceId> {
        let policy = &self.settings.segments;
        let shape = cue.segment.shape();
        let duration =
            secs(self.settings.tone_duration_secs * policy.duration_multiplier(shape));
        let volume = self.settings.gain();
        let frequency = mapping::frequency(value, cue.range, &self.settings);
        let pan = Curve::Fixed(mapping::pan(cue.panning));
        let entry = palette::entry(cue.group.unwrap_or(palette::index::SINE_BASIC));

        let mut specs = voices(entry, frequency, &pan, volume, duration, offset);
        if shape == SegmentShape::Compound {
            specs.push(VoiceSpec {
                waveform: Waveform::Triangle,
                frequency: Curve::Fixed(frequency * policy.chord_ratio),
                pan,
                envelope: GainEnvelope::standard(volume * policy.chord_volume, duration),
                start_offset: offset,
            });
        }
        tracing::trace!(value, frequency, voices = specs.len(), "tone");
        self.start_all(specs)
    }

    fn null_tone(&self, panning: Panning, offset: Duration) -> Vec<VoiceId> {
        let pan = Curve::Fixed(mapping::pan(panning));
        let specs = voices(
            &NULL_TONE,
            self.settings.null_frequency,
            &pan,
            self.settings.gain(),
            self.tone_duration(),
            offset,
        );
        self.start_all(specs)
    }

    /// One voice per meeting line, all at the pitch of `value`, each in the
    /// line's palette waveform, decaying together from full volume.
    fn intersection(&self, value: f64, cue: &AudioCue) -> Vec<VoiceId> {
        let volume = self.settings.gain();
        let duration = self.tone_duration();
        let frequency = mapping::frequency(value, cue.range, &self.settings);
        let specs: Vec<VoiceSpec> = cue
            .intersections
            .iter()
            .map(|&group| VoiceSpec {
                waveform: palette::entry(group).waveform,
                frequency: Curve::Fixed(frequency),
                pan: Curve::Fixed(0.0),
                envelope: GainEnvelope::decay(volume, INTERSECTION_TAIL * volume, duration),
                start_offset: Duration::ZERO,
            })
            .collect();
        tracing::trace!(value, frequency, lines = specs.len(), "intersection");
        self.start_all(specs)
    }

    /// A point on a continuous curve: one voice gliding through its
    /// neighbourhood over a single tone duration.
    fn glide(&self, values: &[f64], cue: &AudioCue) -> Vec<VoiceId> {
        let pan = Curve::Fixed(mapping::pan(cue.panning));
        let spec = self.smooth_spec(values, cue.range, cue.group, pan, self.tone_duration());
        tracing::trace!(points = values.len(), "glide");
        self.start_all(vec![spec])
    }

    /// Boundary feedback: a short inharmonic chime, panned to the edge.
    pub fn play_empty(&self, panning: Panning) -> Vec<VoiceId> {
        if !self.audible() {
            return Vec::new();
        }
        let volume = self.settings.gain();
        let pan = mapping::pan(panning);
        let specs = EMPTY_PARTIALS
            .iter()
            .map(|&(frequency, gain)| VoiceSpec {
                waveform: Waveform::Sine,
                frequency: Curve::Fixed(frequency),
                pan: Curve::Fixed(pan),
                envelope: GainEnvelope::decay(
                    EMPTY_GAIN * gain * volume,
                    FLOOR * volume,
                    EMPTY_DURATION,
                ),
                start_offset: Duration::ZERO,
            })
            .collect();
        self.start_all(specs)
    }

    /// Two descending beeps a semitone apart.
    pub fn warning(&self) -> Vec<VoiceId> {
        if !self.audible() {
            return Vec::new();
        }
        let volume = self.settings.gain();
        let lower = WARNING_FREQUENCY / 2f64.powf(1.0 / 12.0);
        let specs = [(WARNING_FREQUENCY, Duration::ZERO), (lower, WARNING_BEEP + WARNING_GAP)]
            .into_iter()
            .map(|(frequency, start_offset)| VoiceSpec {
                waveform: Waveform::Sine,
                frequency: Curve::Fixed(frequency),
                pan: Curve::Fixed(0.0),
                envelope: GainEnvelope::decay(volume, FLOOR * volume, WARNING_BEEP),
                start_offset,
            })
            .collect();
        self.start_all(specs)
    }

    fn start_all(&self, specs: Vec<VoiceSpec>) -> Vec<VoiceId> {
        let Some(cleanup_at) = specs
            .iter()
            .map(|s| s.start_offset + s.envelope.duration() * 2)
            .max()
        else {
            return Vec::new();
        };
        let ids: Vec<VoiceId> = {
            let mut sink = lock(&self.sink);
            specs.into_iter().map(|s| sink.start_voice(s)).collect()
        };
        let sink = Arc::clone(&self.sink);
        let released = ids.clone();
        self.scheduler.schedule(
            cleanup_at,
            Box::new(move || {
                let mut sink = lock(&sink);
                for id in released {
                    sink.release(id);
                }
            }),
        );
        ids
    }

    // -----------------------------------------------------------------------
    // Smooth sweep
    // -----------------------------------------------------------------------

    /// Sweep one voice through `values` over the configured duration.
    ///
    /// Any running sweep is cancelled first.
    pub fn play_smooth(
        &self,
        values: &[f64],
        range: ValueRange,
        group: Option<usize>,
    ) -> Option<VoiceId> {
        self.cancel_smooth();
        if !self.audible() || values.is_empty() {
            return None;
        }
        let pan = if values.len() < 2 {
            Curve::Fixed(0.0)
        } else {
            Curve::Sweep(mapping::pan_curve(values.len()))
        };
        let duration = secs(self.settings.sweep_duration_secs);
        let spec = self.smooth_spec(values, range, group, pan, duration);

        let id = lock(&self.sink).start_voice(spec);
        *lock(&self.sweep) = Some(id);
        tracing::debug!(?id, points = values.len(), "sweep started");

        let sink = Arc::clone(&self.sink);
        let slot = Arc::clone(&self.sweep);
        self.scheduler.schedule(
            duration * 2,
            Box::new(move || {
                {
                    let mut current = lock(&slot);
                    if *current == Some(id) {
                        *current = None;
                    }
                }
                lock(&sink).release(id);
            }),
        );
        Some(id)
    }

    /// One voice sweeping its frequency through `values`.
    fn smooth_spec(
        &self,
        values: &[f64],
        range: ValueRange,
        group: Option<usize>,
        pan: Curve,
        duration: Duration,
    ) -> VoiceSpec {
        let mut frequencies: Vec<f64> = values
            .iter()
            .map(|&v| mapping::frequency(v, range, &self.settings))
            .collect();
        if frequencies.len() == 1 {
            frequencies.push(frequencies[0]);
        }
        VoiceSpec {
            waveform: group.map_or(Waveform::Sine, |g| palette::entry(g).waveform),
            frequency: Curve::Sweep(frequencies),
            pan,
            envelope: GainEnvelope::sweep(values.len(), self.settings.gain(), duration),
            start_offset: Duration::ZERO,
        }
    }

    /// Fade out the running sweep. Returns whether one was running.
    pub fn cancel_smooth(&self) -> bool {
        let Some(id) = lock(&self.sweep).take() else {
            return false;
        };
        let fade = Duration::from_millis(self.settings.sweep_fade_ms);
        lock(&self.sink).ramp(id, FLOOR * self.settings.gain(), fade);
        let sink = Arc::clone(&self.sink);
        self.scheduler
            .schedule(fade, Box::new(move || lock(&sink).release(id)));
        tracing::debug!(?id, "sweep cancelled");
        true
    }

    #[must_use]
    pub fn is_sweeping(&self) -> bool {
        lock(&self.sweep).is_some()
    }
}

/// The fundamental and overtones of `entry` at `frequency`.
fn voices(
    entry: &PaletteEntry,
    frequency: f64,
    pan: &Curve,
    volume: f64,
    duration: Duration,
    offset: Duration,
) -> Vec<VoiceSpec> {
    let fundamental = (1.0, entry.fundamental);
    std::iter::once(fundamental)
        .chain(entry.harmonics.iter().map(|h| (h.ratio, h.amplitude)))
        .map(|(ratio, amplitude)| VoiceSpec {
            waveform: entry.waveform,
            frequency: Curve::Fixed(frequency * ratio),
            pan: pan.clone(),
            envelope: GainEnvelope::adsr(entry.adsr, volume * amplitude, duration),
            start_offset: offset,
        })
        .collect()
}

/// Seconds to a duration, rounded to the microsecond.
fn secs(s: f64) -> Duration {
    let micros = (s.max(0.0) * 1e6).round();
    Duration::from_micros(if micros.is_finite() { micros as u64 } else { 0 })
}
