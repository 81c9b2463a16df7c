#![forbid(unsafe_code)]

//! Violin plots on a dual-mode plane.
//!
//! Every violin is a kernel density estimate of its samples, evaluated on
//! one y grid shared by all violins. Columns are violins and rows are grid
//! levels, so each `(row, col)` is one point of the plane. In column mode
//! left/right compare violins at the same level; in row mode up/down walk
//! one violin's curve. A point is voiced as a glide over the density around
//! it, scaled against that violin's own density range. Like scatter plots,
//! violins have no braille rendering.

use chartnav_core::{
    AudioCue, AxisLabels, Labeled, Movable, Panning, Plane, Point, Position, Segment,
    TextCue, Topology, TraceKind, Value, ValueRange, box_summary, even_grid, kde_over,
};

use super::{BoxModel, Description, Line, TraceModel, category_index, fill_label};
use crate::error::{EngineError, Result};

/// Grid levels used by [`ViolinModel::new`].
pub const DEFAULT_LEVELS: usize = 32;

/// Widening applied to a flat density range.
const FLAT_PAD: f64 = 0.001;

/// One violin: a label and its raw samples.
#[derive(Debug, Clone, PartialEq)]
pub struct Violin {
    pub label: String,
    pub samples: Vec<f64>,
}

impl Violin {
    #[must_use]
    pub fn new(label: impl Into<String>, samples: Vec<f64>) -> Self {
        Self {
            label: label.into(),
            samples,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViolinModel {
    violins: Vec<Violin>,
    grid: Vec<f64>,
    /// `density[violin][level]`.
    density: Vec<Vec<f64>>,
    density_ranges: Vec<ValueRange>,
}

impl ViolinModel {
    /// Violins evaluated on [`DEFAULT_LEVELS`] levels.
    ///
    /// # Errors
    ///
    /// As [`ViolinModel::with_levels`].
    pub fn new(violins: Vec<Violin>) -> Result<Self> {
        Self::with_levels(violins, DEFAULT_LEVELS)
    }

    /// Violins evaluated on `levels` evenly spaced y values spanning every
    /// sample.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidData`] without violins or levels, and
    /// [`EngineError::Series`] for a violin with no finite sample.
    pub fn with_levels(violins: Vec<Violin>, levels: usize) -> Result<Self> {
        if violins.is_empty() || levels == 0 {
            return Err(EngineError::InvalidData("violin plot needs violins and levels".into()));
        }
        let all: Vec<f64> = violins.iter().flat_map(|v| v.samples.iter().copied()).collect();
        let span = ValueRange::of(&all)?;
        let grid = if span.is_degenerate() {
            vec![span.min]
        } else {
            even_grid(span, levels)
        };
        let density = violins
            .iter()
            .map(|v| kde_over(&v.samples, &grid))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let density_ranges = density.iter().map(|d| padded_range(d)).collect();
        tracing::debug!(violins = violins.len(), levels = grid.len(), "violin densities");
        Ok(Self {
            violins,
            grid,
            density,
            density_ranges,
        })
    }

    fn labels(&self) -> Vec<String> {
        self.violins.iter().map(|v| v.label.clone()).collect()
    }

    fn density_at(&self, pos: Position) -> Option<f64> {
        self.density.get(pos.col)?.get(pos.row).copied()
    }

    /// The box plot of the same samples, for a layer drawn inside the
    /// violins.
    ///
    /// # Errors
    ///
    /// As [`BoxModel::new`].
    pub fn box_layer(&self) -> Result<BoxModel> {
        let boxes = self
            .violins
            .iter()
            .map(|v| box_summary(&v.samples))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        BoxModel::new(self.labels(), boxes)
    }
}

/// Observed density range, widened when flat so it never degenerates.
fn padded_range(density: &[f64]) -> ValueRange {
    let range = ValueRange::of(density).unwrap_or(ValueRange::new(0.0, 0.0));
    if range.is_degenerate() {
        ValueRange::new((range.min - FLAT_PAD).max(0.0), range.max + FLAT_PAD)
    } else {
        range
    }
}

/// Text precision of levels and densities.
fn rounded(v: f64) -> f64 {
    (v * 1e4).round() / 1e4
}

impl TraceModel for ViolinModel {
    fn kind(&self) -> TraceKind {
        TraceKind::Violin
    }

    fn topology(&self) -> Result<Topology> {
        let points: Vec<(f64, f64)> = (0..self.violins.len())
            .flat_map(|col| self.grid.iter().map(move |&y| (col as f64, y)))
            .collect();
        Ok(Plane::from_points(&points)?.into())
    }

    fn describe(&self, topology: &Topology, axes: &AxisLabels) -> Description {
        let pos = topology.position();
        let label = self
            .violins
            .get(pos.col)
            .map_or(Value::Missing, |v| Value::Category(v.label.clone()));
        let y = self.grid.get(pos.row).map_or(Value::Missing, |&y| Value::Number(rounded(y)));
        let curve = self.density.get(pos.col).map(Vec::as_slice).unwrap_or_default();
        let audio_value = match curve.len().checked_sub(1) {
            Some(last) => {
                let at = |i: usize| curve[i.min(last)];
                Value::Numbers(vec![at(pos.row.saturating_sub(1)), at(pos.row), at(pos.row + 1)])
            }
            None => Value::Missing,
        };
        let density = self.density_at(pos).map_or(Value::Missing, |d| Value::Number(rounded(d)));
        Description {
            point: Point::new(label.clone()).with_secondary(y.clone()),
            audio: AudioCue {
                value: audio_value,
                range: self
                    .density_ranges
                    .get(pos.col)
                    .copied()
                    .unwrap_or(ValueRange::new(0.0, 1.0)),
                panning: Panning::new(pos.row, self.grid.len()),
                group: None,
                segment: Segment::Datum,
                multi_valued: false,
                intersections: Vec::new(),
                continuous: true,
            },
            text: TextCue {
                main: Labeled::new(axes.x.clone(), label),
                cross: Labeled::new(axes.y.clone(), y),
                fill: Some(Labeled::new(fill_label(axes, "Volume"), density)),
                section: None,
                range: None,
            },
        }
    }

    fn x_value(&self, topology: &Topology) -> Option<Value> {
        self.violins
            .get(topology.position().col)
            .map(|v| Value::Category(v.label.clone()))
    }

    /// Same level in the violin labelled `x`; `row` is the level.
    fn locate_x(&self, x: &Value, row: usize) -> Option<Position> {
        let col = category_index(&self.labels(), x)?;
        Some(Position::new(row.min(self.grid.len() - 1), col))
    }

    /// The density curve of the violin under the cursor.
    fn line(&self, topology: &Topology) -> Option<Line> {
        let col = topology.position().col;
        let values = self.density.get(col)?.clone();
        Some(Line {
            key: col,
            positions: (0..values.len()).map(|row| Position::new(row, col)).collect(),
            values,
        })
    }

    fn value_at(&self, _topology: &Topology, pos: Position) -> Option<f64> {
        self.density_at(pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chartnav_core::{NavDirection, PlaneMode};

    fn model() -> ViolinModel {
        ViolinModel::with_levels(
            vec![
                Violin::new("low", vec![1.0, 2.0, 2.0, 3.0]),
                Violin::new("high", vec![7.0, 8.0, 8.0, 9.0]),
            ],
            9,
        )
        .unwrap()
    }

    #[test]
    fn violins_share_one_grid() {
        let m = model();
        assert_eq!(m.grid.len(), 9);
        assert_eq!((m.grid[0], m.grid[8]), (1.0, 9.0));
        let topo = m.topology().unwrap();
        let plane = topo.as_plane().unwrap();
        assert_eq!(plane.columns().len(), 2);
        assert!(plane.columns().iter().all(|c| c.ys.len() == 9));
    }

    #[test]
    fn up_walks_one_curve_and_right_keeps_the_level() {
        let m = model();
        let mut topo = m.topology().unwrap();
        topo.move_once(NavDirection::Right);
        assert_eq!(topo.position(), Position::new(0, 0));

        // first vertical move switches to row mode in place
        assert!(topo.move_once(NavDirection::Up));
        assert_eq!(topo.position(), Position::new(0, 0));
        assert!(topo.move_once(NavDirection::Up));
        assert_eq!(topo.position(), Position::new(1, 0));
        assert_eq!(topo.as_plane().map(|p| p.mode()), Some(PlaneMode::Row));

        assert!(topo.move_once(NavDirection::Right));
        assert!(topo.move_once(NavDirection::Right));
        assert_eq!(topo.position(), Position::new(1, 1));
    }

    #[test]
    fn point_reads_label_level_and_volume() {
        let m = model();
        let mut topo = m.topology().unwrap();
        assert!(topo.move_to_index(Position::new(1, 0)));
        let d = m.describe(&topo, &AxisLabels::default());
        assert_eq!(d.text.main, Labeled::new("X", "low"));
        assert_eq!(d.text.cross, Labeled::new("Y", 2.0));
        let volume = m.density_at(Position::new(1, 0)).unwrap();
        assert_eq!(d.text.fill, Some(Labeled::new("Volume", rounded(volume))));

        assert!(d.audio.continuous);
        assert_eq!(d.audio.group, None);
        let curve = &m.density[0];
        assert_eq!(d.audio.value, Value::Numbers(vec![curve[0], curve[1], curve[2]]));
        assert_eq!(d.audio.range, ValueRange::of(curve).unwrap());
    }

    #[test]
    fn flat_density_range_is_widened() {
        assert_eq!(padded_range(&[0.0, 0.0]), ValueRange::new(0.0, FLAT_PAD));
        assert_eq!(padded_range(&[0.5]), ValueRange::new(0.5 - FLAT_PAD, 0.5 + FLAT_PAD));
    }

    #[test]
    fn box_layer_summarises_the_same_samples() {
        let boxes = model().box_layer().unwrap();
        let mut topo = boxes.topology().unwrap();
        assert!(topo.move_to_index(Position::new(1, 3)));
        assert_eq!(boxes.value_at(&topo, Position::new(1, 3)), Some(8.0));
    }

    #[test]
    fn rejects_a_violin_without_samples() {
        let err = ViolinModel::new(vec![Violin::new("a", vec![1.0]), Violin::new("b", Vec::new())]);
        assert!(matches!(err, Err(EngineError::Series(_))));
        assert!(ViolinModel::new(Vec::new()).is_err());
    }
}
