#![forbid(unsafe_code)]

//! Core: movable topologies, point descriptions and observer plumbing.
//!
//! # Role in chartnav
//! `chartnav-core` is the leaf layer. It owns the shapes a cursor can walk
//! ([`topology`]), the neutral description of the datum under the cursor
//! ([`point`], [`state`]) and the registry that fans state out to every
//! modality ([`observer`]).
//!
//! # How it fits in the system
//! `chartnav-runtime` builds traces on top of these topologies and drives
//! the registry; `chartnav-audio` and `chartnav-modality` implement
//! [`observer::Observer`] over [`state::PlotUpdate`]. Nothing here performs
//! I/O or depends on a clock.

pub mod direction;
pub mod error;
pub mod observer;
pub mod point;
pub mod state;
pub mod stats;
pub mod topology;

pub use direction::{Axis, MoveTarget, NavDirection, Position};
pub use error::{SeriesError, TopologyError};
pub use observer::{Observer, ObserverHandle, ObserverRegistry, SubscriptionId};
pub use point::{Point, Segment, SegmentShape, Value};
pub use state::{
    AudioCue, AxisLabels, BoundaryKind, BoundaryNotice, BoxSummary, BrailleCue, BrailleSeries, Labeled,
    LayerState, Panning, PlotUpdate, Selector, SubplotState, TextCue, TraceKind, TraceState,
};
pub use stats::{
    ExtremaKind, ValueRange, box_summary, even_grid, extrema_indices, interpolate, kde, kde_over,
};
pub use topology::{
    Graph, GraphNode, Grid, Movable, MovableOptions, Plane, PlaneMode, Topology, TopologyKind,
};
