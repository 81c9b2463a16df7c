#![forbid(unsafe_code)]

//! Bar charts, single or grouped, with optional histogram bins.

use chartnav_core::{
    AudioCue, AxisLabels, BrailleSeries, Grid, Labeled, Movable, MovableOptions, Panning, Point,
    Position, Segment, TextCue, Topology, TraceKind, Value, ValueRange,
};

use super::{Description, Line, TraceModel, category, category_index, fill_label, range_or_unit};
use crate::error::{EngineError, Result};

/// One bar series.
#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    pub name: Option<String>,
    pub values: Vec<f64>,
}

impl BarSeries {
    #[must_use]
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: Some(name.into()),
            values,
        }
    }
}

/// Bars over shared categories. Series stack as rows, bottom first.
#[derive(Debug, Clone, PartialEq)]
pub struct BarModel {
    categories: Vec<String>,
    series: Vec<BarSeries>,
    bins: Option<Vec<ValueRange>>,
    range: ValueRange,
}

impl BarModel {
    /// # Errors
    ///
    /// [`EngineError::InvalidData`] when there is no series or a series does
    /// not have one value per category.
    pub fn new(categories: Vec<String>, series: Vec<BarSeries>) -> Result<Self> {
        if series.is_empty() {
            return Err(EngineError::InvalidData("bar chart has no series".into()));
        }
        if let Some(bad) = series.iter().find(|s| s.values.len() != categories.len()) {
            return Err(EngineError::InvalidData(format!(
                "bar series {:?} has {} values for {} categories",
                bad.name.as_deref().unwrap_or(""),
                bad.values.len(),
                categories.len()
            )));
        }
        let range = range_or_unit(series.iter().flat_map(|s| s.values.iter().copied()));
        Ok(Self {
            categories,
            series,
            bins: None,
            range,
        })
    }

    /// A single unnamed series.
    ///
    /// # Errors
    ///
    /// As [`BarModel::new`].
    pub fn single(categories: Vec<String>, values: Vec<f64>) -> Result<Self> {
        Self::new(categories, vec![BarSeries { name: None, values }])
    }

    /// Histogram bins, one per category; verbose text reads the bin range.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidData`] when the bin count differs from the
    /// category count.
    pub fn with_bins(mut self, bins: Vec<(f64, f64)>) -> Result<Self> {
        if bins.len() != self.categories.len() {
            return Err(EngineError::InvalidData(format!(
                "{} bins for {} categories",
                bins.len(),
                self.categories.len()
            )));
        }
        self.bins = Some(bins.into_iter().map(|(lo, hi)| ValueRange::new(lo, hi)).collect());
        Ok(self)
    }

    fn grouped(&self) -> bool {
        self.series.len() > 1
    }

    fn value(&self, pos: Position) -> Option<f64> {
        self.series.get(pos.row)?.values.get(pos.col).copied()
    }
}

impl TraceModel for BarModel {
    fn kind(&self) -> TraceKind {
        TraceKind::Bar
    }

    fn topology(&self) -> Result<Topology> {
        Ok(Grid::rectangular(self.series.len(), self.categories.len(), MovableOptions::default())?.into())
    }

    fn describe(&self, topology: &Topology, axes: &AxisLabels) -> Description {
        let pos = topology.position();
        let x = category(&self.categories, pos.col);
        let y = self.value(pos).map_or(Value::Missing, Value::Number);
        let name = self.series.get(pos.row).and_then(|s| s.name.clone());

        let mut point = Point::new(x.clone()).with_secondary(y.clone());
        if let Some(name) = &name {
            point = point.with_group(name.clone());
        }
        let fill = match (self.grouped(), name) {
            (true, Some(name)) => Some(Labeled::new(fill_label(axes, "Group"), name.as_str())),
            _ => None,
        };
        Description {
            point,
            audio: AudioCue {
                value: y.clone(),
                range: self.range,
                panning: Panning::new(pos.col, self.categories.len()),
                group: self.grouped().then_some(pos.row),
                segment: Segment::Datum,
                multi_valued: false,
                intersections: Vec::new(),
                continuous: false,
            },
            text: TextCue {
                main: Labeled::new(axes.x.clone(), x),
                cross: Labeled::new(axes.y.clone(), y),
                fill,
                section: None,
                range: self.bins.as_ref().and_then(|b| b.get(pos.col).copied()),
            },
        }
    }

    fn braille(&self) -> Option<BrailleSeries> {
        Some(BrailleSeries::Bar {
            rows: self.series.iter().map(|s| s.values.clone()).collect(),
        })
    }

    fn x_value(&self, topology: &Topology) -> Option<Value> {
        self.categories
            .get(topology.position().col)
            .map(|s| Value::Category(s.clone()))
    }

    fn locate_x(&self, x: &Value, row: usize) -> Option<Position> {
        let col = category_index(&self.categories, x)?;
        Some(Position::new(row.min(self.series.len() - 1), col))
    }

    fn line(&self, topology: &Topology) -> Option<Line> {
        let row = topology.position().row;
        let series = self.series.get(row)?;
        Some(Line {
            key: row,
            values: series.values.clone(),
            positions: (0..series.values.len()).map(|col| Position::new(row, col)).collect(),
        })
    }

    fn value_at(&self, _topology: &Topology, pos: Position) -> Option<f64> {
        self.value(pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chartnav_core::NavDirection;

    fn labels(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("c{i}")).collect()
    }

    #[test]
    fn rejects_ragged_series() {
        let err = BarModel::new(labels(3), vec![BarSeries::new("a", vec![1.0])]).unwrap_err();
        assert!(matches!(err, EngineError::InvalidData(_)));
    }

    #[test]
    fn grouped_bars_carry_fill_and_group() {
        let model = BarModel::new(
            labels(2),
            vec![BarSeries::new("north", vec![1.0, 2.0]), BarSeries::new("south", vec![3.0, 4.0])],
        )
        .unwrap();
        let mut topo = model.topology().unwrap();
        topo.move_once(NavDirection::Up);
        topo.move_once(NavDirection::Up);
        let d = model.describe(&topo, &AxisLabels::default());
        assert_eq!(d.audio.group, Some(1));
        assert_eq!(d.text.fill, Some(Labeled::new("Group", "south")));
        assert_eq!(d.audio.range, ValueRange::new(1.0, 4.0));
    }

    #[test]
    fn single_bars_have_no_group() {
        let model = BarModel::single(labels(2), vec![5.0, 6.0]).unwrap();
        let topo = model.topology().unwrap();
        let d = model.describe(&topo, &AxisLabels::default());
        assert_eq!(d.audio.group, None);
        assert_eq!(d.text.fill, None);
    }

    #[test]
    fn bins_fill_text_range() {
        let model = BarModel::single(labels(2), vec![5.0, 6.0])
            .unwrap()
            .with_bins(vec![(0.0, 10.0), (10.0, 20.0)])
            .unwrap();
        let mut topo = model.topology().unwrap();
        topo.move_to_index(Position::new(0, 1));
        let d = model.describe(&topo, &AxisLabels::default());
        assert_eq!(d.text.range, Some(ValueRange::new(10.0, 20.0)));
    }

    #[test]
    fn locate_x_finds_category() {
        let model = BarModel::single(labels(3), vec![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(
            model.locate_x(&Value::Category("c2".into()), 5),
            Some(Position::new(0, 2))
        );
        assert_eq!(model.locate_x(&Value::Number(2.0), 0), None);
    }
}
