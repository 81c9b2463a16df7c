#![forbid(unsafe_code)]

//! Text, braille and highlight modalities for chartnav.
//!
//! Each modality is an independent [`chartnav_core::Observer`] over
//! [`chartnav_core::PlotUpdate`]. They never talk to each other: the
//! navigation context is the only fan-out point, so every modality sees the
//! same point in the same order.
//!
//! Announcements go through a [`NarrationSink`]; nothing here synthesizes
//! speech.

pub mod braille;
pub mod highlight;
pub mod narration;
pub mod text;

pub use braille::{BOX_WIDTH, BrailleFrame, BrailleObserver, EncodedBraille, encode};
pub use highlight::{
    ElementResolver, HighlightObserver, HighlightRenderer, MapResolver, RecordingRenderer,
};
pub use narration::{BufferedNarration, NarrationSink, SharedNarration, announce};
pub use text::{TextMode, TextObserver};
