#![forbid(unsafe_code)]

//! Runtime: trace models, the navigation context and the intent-driven engine.
//!
//! # Role in chartnav
//! `chartnav-runtime` turns chart data into navigable [`Trace`]s, arranges
//! them into a [`Figure`], and drives everything through [`Engine`]: one
//! [`Intent`] in, one synchronized round of audio, text, braille and
//! highlight output out.
//!
//! # How it fits in the system
//! The [`Context`] is the single fan-out point over the observer registry
//! from `chartnav-core`. The modality observers from `chartnav-audio` and
//! `chartnav-modality` are wired by [`EngineBuilder`]. Marks persist through
//! the [`Storage`] trait; configuration loads from TOML or JSON
//! ([`EngineConfig`]).
//!
//! # Quick start
//!
//! ```rust,ignore
//! use chartnav_runtime::{BarModel, Engine, Figure, Intent, Trace};
//! use chartnav_core::NavDirection;
//!
//! let model = BarModel::single(vec!["a".into(), "b".into()], vec![3.0, 5.0])?;
//! let figure = Figure::single("sales", Trace::new("bars", model)?)?;
//! let mut engine = Engine::new(figure)?;
//! engine.handle(Intent::Move(NavDirection::Right));
//! ```

pub mod autoplay;
pub mod config;
pub mod context;
pub mod controller;
pub mod error;
pub mod extrema;
pub mod figure;
pub mod intent;
#[cfg(feature = "subscriber")]
pub mod logging;
pub mod mark;
pub mod rotor;
pub mod scope;
pub mod storage;
pub mod trace;

pub use autoplay::Autoplay;
pub use config::{AutoplayConfig, BrailleConfig, EngineConfig, MarksConfig, TextConfig};
pub use context::Context;
pub use controller::{Engine, EngineBuilder, HighlightSwitch};
pub use error::{EngineError, Result};
pub use extrema::{ExtremaJump, ExtremaNavigator};
pub use figure::{Figure, Subplot, TraceLocation};
pub use intent::{DescribeTarget, Intent, MarkAction, Modalities};
pub use mark::{Mark, MarkBook, SLOTS, SetOutcome};
pub use rotor::{Rotor, RotorMode};
pub use scope::{Scope, ScopeStack};
pub use storage::{JsonFileStorage, MemoryStorage, SharedStorage, Storage};
pub use trace::{
    BarModel, BarSeries, BoxModel, Candle, CandlestickModel, Description, HeatmapModel, Line,
    LineModel, LineSeries, ScatterModel, SegmentedModel, SmoothModel, Trace, TraceModel, Violin,
    ViolinModel,
};
