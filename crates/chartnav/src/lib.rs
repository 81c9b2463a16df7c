#![forbid(unsafe_code)]

//! chartnav public facade.
//!
//! This crate re-exports the types a host needs to make a rendered chart
//! navigable: trace models and figures to describe the data, the [`Engine`]
//! to feed intents into, and the sinks through which audio, narration and
//! highlights leave the engine.

// --- Core re-exports -------------------------------------------------------

pub use chartnav_core::{
    AxisLabels, BoundaryKind, BoundaryNotice, BoxSummary, ExtremaKind, NavDirection, Observer,
    ObserverHandle, PlotUpdate, Point, Position, Selector, TraceKind, TraceState, Value,
    ValueRange,
};

// --- Audio re-exports ------------------------------------------------------

pub use chartnav_audio::{
    AudioMode, AudioSettings, AudioSink, ManualScheduler, RecordingSink, Scheduler, SharedSink,
    ThreadScheduler, VoiceId, VoiceSpec,
};

// --- Modality re-exports ---------------------------------------------------

pub use chartnav_modality::{
    BufferedNarration, ElementResolver, HighlightObserver, HighlightRenderer, MapResolver,
    NarrationSink, RecordingRenderer, SharedNarration, TextMode,
};

// --- Runtime re-exports ----------------------------------------------------

pub use chartnav_runtime::{
    BarModel, BarSeries, BoxModel, Candle, CandlestickModel, DescribeTarget, Engine,
    EngineBuilder, EngineConfig, EngineError, Figure, HeatmapModel, Intent, JsonFileStorage,
    LineModel, LineSeries, MarkAction, MemoryStorage, Modalities, Result, RotorMode,
    ScatterModel, Scope, SegmentedModel, SharedStorage, SmoothModel, Storage, Subplot, Trace,
    Violin, ViolinModel,
};

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        BarModel, DescribeTarget, Engine, EngineConfig, ExtremaKind, Figure, Intent, LineModel,
        MarkAction, NavDirection, Result, Subplot, Trace,
    };

    pub use crate::{audio, core, modality, runtime};
}

pub use chartnav_audio as audio;
pub use chartnav_core as core;
pub use chartnav_modality as modality;
pub use chartnav_runtime as runtime;
