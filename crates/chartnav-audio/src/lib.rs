#![forbid(unsafe_code)]

//! Sonification for chartnav.
//!
//! Values become tones: frequency follows the value inside the trace's
//! observed range, stereo position follows the horizontal index, timbre
//! follows the group. Boundaries get a short chime of their own.
//!
//! # Design
//!
//! The crate produces *descriptions* of voices ([`VoiceSpec`]) and hands them
//! to an [`AudioSink`]. Real output backends implement the trait; tests use
//! [`RecordingSink`]. Voice cleanup runs on a [`Scheduler`] so a
//! [`ManualScheduler`] can replay time deterministically.
//!
//! | Module | Role |
//! |---|---|
//! | [`settings`] | Tunables: volume, band, durations, limiter |
//! | [`mapping`] | Value → frequency, index → pan |
//! | [`palette`] | Group → waveform, harmonics, ADSR |
//! | [`envelope`] | Click-free gain curves |
//! | [`engine`] | Modes, tones, sweeps, cleanup |
//! | [`observer`] | Hooks the engine onto [`chartnav_core::PlotUpdate`] |

pub mod engine;
pub mod envelope;
pub mod mapping;
pub mod observer;
pub mod palette;
pub mod scheduler;
pub mod settings;
pub mod sink;

pub use engine::{AudioMode, SonificationEngine};
pub use envelope::{FLOOR, GainEnvelope, GainPoint, Ramp};
pub use observer::AudioObserver;
pub use palette::{Adsr, Harmonic, PALETTE, PaletteEntry, Trend, Waveform};
pub use scheduler::{ManualScheduler, Scheduler, Task, ThreadScheduler};
pub use settings::{AudioSettings, LimiterSettings, SegmentPolicy};
pub use sink::{AudioSink, Curve, RecordingSink, SharedSink, SinkEvent, VoiceId, VoiceSpec};
