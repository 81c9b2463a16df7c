#![forbid(unsafe_code)]

//! State descriptions fanned out to observers.
//!
//! A [`TraceState`] bundles the point under the cursor with one cue per
//! modality. Cues are plain data: the trace decides *what* each modality
//! should express, the observers decide *how*.

use std::fmt;
use std::sync::Arc;

use crate::direction::{NavDirection, Position};
use crate::point::{Point, Segment, Value};
use crate::stats::ValueRange;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Chart kind of a trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TraceKind {
    Bar,
    Line,
    Heatmap,
    Box,
    Candlestick,
    Scatter,
    Smooth,
    Violin,
    Segmented,
}

impl TraceKind {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Bar => "bar",
            Self::Line => "line",
            Self::Heatmap => "heatmap",
            Self::Box => "box",
            Self::Candlestick => "candlestick",
            Self::Scatter => "scatter",
            Self::Smooth => "smooth",
            Self::Violin => "violin",
            Self::Segmented => "segmented",
        }
    }
}

impl fmt::Display for TraceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Axis titles of a trace.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AxisLabels {
    pub x: String,
    pub y: String,
    pub fill: Option<String>,
}

impl Default for AxisLabels {
    fn default() -> Self {
        Self {
            x: "X".to_owned(),
            y: "Y".to_owned(),
            fill: None,
        }
    }
}

/// Opaque element selector bound to a datum.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Selector(pub String);

impl Selector {
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// Cues
// ---------------------------------------------------------------------------

/// Horizontal position of a tone: `index` out of `size` slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Panning {
    pub index: usize,
    pub size: usize,
}

impl Panning {
    #[must_use]
    pub const fn new(index: usize, size: usize) -> Self {
        Self { index, size }
    }

    /// Centered panning for states with no spatial meaning.
    pub const CENTER: Self = Self { index: 0, size: 1 };
}

/// What the sonification engine needs to voice a point.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioCue {
    /// Sonified value; multi-values are voiced member by member.
    pub value: Value,
    /// Observed range of the whole trace.
    pub range: ValueRange,
    pub panning: Panning,
    /// Palette index distinguishing groups (series, fills, trends).
    pub group: Option<usize>,
    pub segment: Segment,
    /// Whether the trace has multi-value cells anywhere.
    pub multi_valued: bool,
    /// Palette groups of every series passing through this exact point.
    /// Empty unless at least two meet here.
    pub intersections: Vec<usize>,
    /// Point on a continuous curve: `value` holds the previous, current and
    /// next readings and is voiced as one glide.
    pub continuous: bool,
}

/// A labelled reading for text output.
#[derive(Debug, Clone, PartialEq)]
pub struct Labeled {
    pub label: String,
    pub value: Value,
}

impl Labeled {
    #[must_use]
    pub fn new(label: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// What the text formatter needs to describe a point.
#[derive(Debug, Clone, PartialEq)]
pub struct TextCue {
    pub main: Labeled,
    pub cross: Labeled,
    pub fill: Option<Labeled>,
    /// Box section or candle field.
    pub section: Option<String>,
    /// Bin range, replacing the main value in verbose output.
    pub range: Option<ValueRange>,
}

/// Five-number summary of one box, plus its outliers.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoxSummary {
    pub lower_outliers: Vec<f64>,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub upper_outliers: Vec<f64>,
}

/// Whole-series data a braille encoder turns into cells, once per trace.
#[derive(Debug, Clone, PartialEq)]
pub enum BrailleSeries {
    Bar { rows: Vec<Vec<f64>> },
    /// One row per box, scaled against the shared `range`.
    Box { boxes: Vec<BoxSummary>, range: ValueRange },
    Heatmap { rows: Vec<Vec<f64>> },
    Line { rows: Vec<Vec<f64>> },
    /// One row per candle field; `bear[col]` flags falling candles.
    Candlestick { rows: Vec<Vec<f64>>, bear: Vec<bool> },
}

/// What the braille observer needs: the series (shared) and the caret.
#[derive(Debug, Clone, PartialEq)]
pub struct BrailleCue {
    /// Cache key; the series is encoded again only when this changes.
    pub trace_id: String,
    pub position: Position,
    pub series: Arc<BrailleSeries>,
}

// ---------------------------------------------------------------------------
// Updates
// ---------------------------------------------------------------------------

/// Full description of the cursor inside one trace.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceState {
    pub trace_id: String,
    pub kind: TraceKind,
    pub title: Option<String>,
    pub axes: AxisLabels,
    pub position: Position,
    pub point: Point,
    pub audio: AudioCue,
    pub text: TextCue,
    /// `None` when the chart kind has no braille rendering.
    pub braille: Option<BrailleCue>,
    pub highlight: Vec<Selector>,
}

/// Entering another layer of the active subplot.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerState {
    /// 1-based layer index.
    pub index: usize,
    pub size: usize,
    pub trace: TraceState,
}

/// Cursor resting on a subplot of a figure.
#[derive(Debug, Clone, PartialEq)]
pub struct SubplotState {
    /// 1-based subplot index.
    pub index: usize,
    pub size: usize,
    pub kinds: Vec<TraceKind>,
    pub panning: Panning,
}

/// Why a move did not happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryKind {
    /// Edge of the active trace.
    Edge(NavDirection),
    /// No layer above/below the active one.
    NoLayer,
    /// Edge of the figure's subplot grid.
    NoSubplot(NavDirection),
}

/// The single notice emitted for a rejected move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundaryNotice {
    pub kind: BoundaryKind,
    /// Where the boundary sits, for spatialized feedback.
    pub panning: Panning,
}

impl BoundaryNotice {
    #[must_use]
    pub fn message(&self) -> String {
        match self.kind {
            BoundaryKind::Edge(dir) => format!("No additional point {}", dir.side()),
            BoundaryKind::NoLayer => "No additional layer".to_owned(),
            BoundaryKind::NoSubplot(dir) => format!("No additional subplot {}", dir.side()),
        }
    }
}

/// Everything the context fans out.
#[derive(Debug, Clone, PartialEq)]
pub enum PlotUpdate {
    Trace(TraceState),
    Layer(LayerState),
    Subplot(SubplotState),
    Boundary(BoundaryNotice),
}

impl PlotUpdate {
    /// The trace description carried by this update, if any.
    #[must_use]
    pub fn trace(&self) -> Option<&TraceState> {
        match self {
            Self::Trace(t) => Some(t),
            Self::Layer(l) => Some(&l.trace),
            Self::Subplot(_) | Self::Boundary(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_messages_differ_per_axis() {
        let edge = BoundaryNotice {
            kind: BoundaryKind::Edge(NavDirection::Left),
            panning: Panning::new(0, 4),
        };
        assert_eq!(edge.message(), "No additional point to the left");
        let layer = BoundaryNotice {
            kind: BoundaryKind::NoLayer,
            panning: Panning::CENTER,
        };
        assert_eq!(layer.message(), "No additional layer");
    }

    #[test]
    fn kind_labels() {
        assert_eq!(TraceKind::Candlestick.to_string(), "candlestick");
        assert_eq!(TraceKind::Box.label(), "box");
    }

    #[test]
    fn subplot_update_has_no_trace() {
        let update = PlotUpdate::Subplot(SubplotState {
            index: 1,
            size: 2,
            kinds: vec![TraceKind::Bar],
            panning: Panning::CENTER,
        });
        assert!(update.trace().is_none());
    }
}
