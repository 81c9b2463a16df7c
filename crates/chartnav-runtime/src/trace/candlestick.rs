#![forbid(unsafe_code)]

//! Candlestick charts on a graph topology.
//!
//! Each candle is a column whose four fields are stacked by value, so up and
//! down always step to the next higher or lower price of the same candle.
//! Left and right keep the field (open stays open), which may change the row
//! from one candle to the next; a plain grid cannot express that, a graph
//! can.
//!
//! # Invariants
//!
//! 1. Row `r` of column `c` is the `r`-th lowest field of candle `c`; equal
//!    prices keep the low, open, close, high order.
//! 2. Every node has top/bottom pointers to its own candle and start/end
//!    pointers to the same field of the first and last candle.

use chartnav_audio::Trend;
use chartnav_core::{
    AudioCue, AxisLabels, BrailleSeries, Graph, GraphNode, Labeled, Movable, MovableOptions,
    Panning, Point, Position, Segment, TextCue, Topology, TraceKind, Value, ValueRange,
};

use super::{Description, Line, TraceModel, category_index, range_or_unit};
use crate::error::{EngineError, Result};

/// Fields in tie-break order.
const FIELDS: [Segment; 4] = [Segment::Low, Segment::Open, Segment::Close, Segment::High];

#[derive(Debug, Clone, PartialEq)]
pub struct Candle {
    pub label: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Candle {
    #[must_use]
    pub fn new(label: impl Into<String>, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            label: label.into(),
            open,
            high,
            low,
            close,
        }
    }

    #[must_use]
    pub fn trend(&self) -> Trend {
        Trend::of(self.open, self.close)
    }

    fn field(&self, segment: Segment) -> f64 {
        match segment {
            Segment::Open => self.open,
            Segment::High => self.high,
            Segment::Close => self.close,
            _ => self.low,
        }
    }

    /// Fields sorted by price.
    fn stacked(&self) -> [Segment; 4] {
        let mut order = FIELDS;
        order.sort_by(|a, b| self.field(*a).total_cmp(&self.field(*b)));
        order
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CandlestickModel {
    candles: Vec<Candle>,
    /// `order[col][row]` is the field at that cell.
    order: Vec<[Segment; 4]>,
    range: ValueRange,
}

impl CandlestickModel {
    /// # Errors
    ///
    /// [`EngineError::InvalidData`] without candles or when a candle's low
    /// or high does not bound its open and close.
    pub fn new(candles: Vec<Candle>) -> Result<Self> {
        if candles.is_empty() {
            return Err(EngineError::InvalidData("candlestick chart has no candles".into()));
        }
        if let Some(bad) = candles.iter().find(|c| {
            c.low > c.open.min(c.close) || c.high < c.open.max(c.close)
        }) {
            return Err(EngineError::InvalidData(format!(
                "candle {:?} low/high do not bound open/close",
                bad.label
            )));
        }
        let order = candles.iter().map(Candle::stacked).collect();
        let range = range_or_unit(candles.iter().flat_map(|c| [c.low, c.high]));
        Ok(Self { candles, order, range })
    }

    fn row_of(&self, col: usize, field: Segment) -> Option<usize> {
        self.order.get(col)?.iter().position(|f| *f == field)
    }

    fn field_at(&self, pos: Position) -> Option<Segment> {
        self.order.get(pos.col)?.get(pos.row).copied()
    }

    fn node(&self, row: usize, col: usize) -> Option<GraphNode> {
        let field = self.field_at(Position::new(row, col))?;
        let last = self.candles.len() - 1;
        let same_field = |c: usize| self.row_of(c, field).map(|r| Position::new(r, c));
        Some(GraphNode {
            up: (row < 3).then(|| Position::new(row + 1, col)),
            down: row.checked_sub(1).map(|r| Position::new(r, col)),
            left: col.checked_sub(1).and_then(same_field),
            right: (col < last).then(|| col + 1).and_then(same_field),
            top: Some(Position::new(3, col)),
            bottom: Some(Position::new(0, col)),
            start: same_field(0),
            end: same_field(last),
        })
    }
}

impl TraceModel for CandlestickModel {
    fn kind(&self) -> TraceKind {
        TraceKind::Candlestick
    }

    fn topology(&self) -> Result<Topology> {
        let cells = (0..FIELDS.len())
            .map(|row| (0..self.candles.len()).map(|col| self.node(row, col)).collect())
            .collect();
        Ok(Graph::new(cells, MovableOptions::default())?.into())
    }

    fn describe(&self, topology: &Topology, axes: &AxisLabels) -> Description {
        let pos = topology.position();
        let candle = self.candles.get(pos.col);
        let segment = self.field_at(pos).unwrap_or(Segment::Datum);
        let label = candle.map_or(Value::Missing, |c| Value::Category(c.label.clone()));
        let value = candle.map_or(Value::Missing, |c| Value::Number(c.field(segment)));
        let trend = candle.map_or(Trend::Neutral, Candle::trend);
        Description {
            point: Point::new(label.clone())
                .with_secondary(value.clone())
                .with_segment(segment)
                .with_group(trend.label()),
            audio: AudioCue {
                value: value.clone(),
                range: self.range,
                panning: Panning::new(pos.col, self.candles.len()),
                group: Some(trend.palette_index()),
                segment,
                multi_valued: false,
                intersections: Vec::new(),
                continuous: false,
            },
            text: TextCue {
                main: Labeled::new(axes.x.clone(), label),
                cross: Labeled::new(axes.y.clone(), value),
                fill: Some(Labeled::new("Trend", trend.label())),
                section: segment.label().map(str::to_owned),
                range: None,
            },
        }
    }

    /// Rows follow the value stacking, so braille cells line up with the
    /// cursor.
    fn braille(&self) -> Option<BrailleSeries> {
        let rows = (0..FIELDS.len())
            .map(|row| {
                self.candles
                    .iter()
                    .zip(&self.order)
                    .map(|(candle, order)| candle.field(order[row]))
                    .collect()
            })
            .collect();
        let bear = self.candles.iter().map(|c| c.trend() == Trend::Bear).collect();
        Some(BrailleSeries::Candlestick { rows, bear })
    }

    fn x_value(&self, topology: &Topology) -> Option<Value> {
        self.candles
            .get(topology.position().col)
            .map(|c| Value::Category(c.label.clone()))
    }

    fn locate_x(&self, x: &Value, row: usize) -> Option<Position> {
        let labels: Vec<String> = self.candles.iter().map(|c| c.label.clone()).collect();
        let col = category_index(&labels, x)?;
        Some(Position::new(row.min(3), col))
    }

    /// The current field across every candle.
    fn line(&self, topology: &Topology) -> Option<Line> {
        let field = self.field_at(topology.position())?;
        let positions = (0..self.candles.len())
            .map(|c| self.row_of(c, field).map(|r| Position::new(r, c)))
            .collect::<Option<Vec<_>>>()?;
        Some(Line {
            key: FIELDS.iter().position(|f| *f == field).unwrap_or(0),
            values: self.candles.iter().map(|c| c.field(field)).collect(),
            positions,
        })
    }

    fn value_at(&self, _topology: &Topology, pos: Position) -> Option<f64> {
        let field = self.field_at(pos)?;
        self.candles.get(pos.col).map(|c| c.field(field))
    }
}
