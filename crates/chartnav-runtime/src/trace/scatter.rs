#![forbid(unsafe_code)]

//! Scatter plots on a dual-mode plane.
//!
//! In column mode the cursor rests on a distinct x and reads every y at that
//! x; in row mode it rests on a distinct y and reads every x. Several
//! readings make a multi-value cell.

use chartnav_core::{
    AudioCue, AxisLabels, Labeled, Movable, Panning, Plane, PlaneMode, Point, Position, Segment,
    TextCue, Topology, TraceKind, Value, ValueRange,
};

use super::{Description, Line, TraceModel, range_or_unit};
use crate::error::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterModel {
    points: Vec<(f64, f64)>,
    x_range: ValueRange,
    y_range: ValueRange,
}

impl ScatterModel {
    #[must_use]
    pub fn new(points: Vec<(f64, f64)>) -> Self {
        let x_range = range_or_unit(points.iter().map(|p| p.0));
        let y_range = range_or_unit(points.iter().map(|p| p.1));
        Self {
            points,
            x_range,
            y_range,
        }
    }
}

fn reading(values: &[f64]) -> Value {
    match values {
        [one] => Value::Number(*one),
        many => Value::Numbers(many.to_vec()),
    }
}

impl TraceModel for ScatterModel {
    fn kind(&self) -> TraceKind {
        TraceKind::Scatter
    }

    fn topology(&self) -> Result<Topology> {
        Ok(Plane::from_points(&self.points)?.into())
    }

    fn describe(&self, topology: &Topology, axes: &AxisLabels) -> Description {
        let pos = topology.position();
        let Some(plane) = topology.as_plane() else {
            return missing(axes);
        };
        let (main, cross, range, panning) = match plane.mode() {
            PlaneMode::Col => {
                let Some(column) = plane.current_column() else {
                    return missing(axes);
                };
                (
                    Labeled::new(axes.x.clone(), column.x),
                    Labeled::new(axes.y.clone(), reading(&column.ys)),
                    self.y_range,
                    Panning::new(pos.col, plane.columns().len()),
                )
            }
            PlaneMode::Row => {
                let Some(row) = plane.current_row() else {
                    return missing(axes);
                };
                (
                    Labeled::new(axes.y.clone(), row.y),
                    Labeled::new(axes.x.clone(), reading(&row.xs)),
                    self.x_range,
                    Panning::new(pos.row, plane.rows().len()),
                )
            }
        };
        Description {
            point: member_point(plane, &main, &cross),
            audio: AudioCue {
                value: cross.value.clone(),
                range,
                panning,
                group: None,
                segment: Segment::Datum,
                multi_valued: self.multi_valued(),
                intersections: Vec::new(),
                continuous: false,
            },
            text: TextCue {
                main,
                cross,
                fill: None,
                section: None,
                range: None,
            },
        }
    }

    fn multi_valued(&self) -> bool {
        let mut xs: Vec<f64> = self.points.iter().map(|p| p.0).collect();
        let mut ys: Vec<f64> = self.points.iter().map(|p| p.1).collect();
        xs.sort_by(f64::total_cmp);
        ys.sort_by(f64::total_cmp);
        xs.windows(2).any(|w| w[0] == w[1]) || ys.windows(2).any(|w| w[0] == w[1])
    }

    fn x_value(&self, topology: &Topology) -> Option<Value> {
        let plane = topology.as_plane()?;
        match plane.mode() {
            PlaneMode::Col => plane.current_column().map(|c| Value::Number(c.x)),
            PlaneMode::Row => None,
        }
    }

    fn locate_x(&self, x: &Value, _row: usize) -> Option<Position> {
        let x = x.as_f64()?;
        let plane = Plane::from_points(&self.points).ok()?;
        let col = plane.columns().iter().position(|c| c.x == x)?;
        let y = *plane.columns()[col].ys.first()?;
        let row = plane.rows().iter().position(|r| r.y == y)?;
        Some(Position::new(row, col))
    }

    fn line(&self, _topology: &Topology) -> Option<Line> {
        None
    }

    /// The single reading at `pos` in the current mode.
    fn value_at(&self, topology: &Topology, pos: Position) -> Option<f64> {
        let plane = topology.as_plane()?;
        let values = match plane.mode() {
            PlaneMode::Col => &plane.columns().get(pos.col)?.ys,
            PlaneMode::Row => &plane.rows().get(pos.row)?.xs,
        };
        match values.as_slice() {
            [one] => Some(*one),
            _ => None,
        }
    }
}

/// The point under the cursor, tagged with its index inside the current
/// column or row when that holds several readings.
fn member_point(plane: &Plane, main: &Labeled, cross: &Labeled) -> Point {
    let point = Point::new(main.value.clone()).with_secondary(cross.value.clone());
    match (&cross.value, plane.member_index()) {
        (Value::Numbers(_), Some(index)) => point.with_sub_index(index),
        _ => point,
    }
}

fn missing(axes: &AxisLabels) -> Description {
    Description {
        point: Point::new(Value::Missing),
        audio: AudioCue {
            value: Value::Missing,
            range: ValueRange::new(0.0, 1.0),
            panning: Panning::CENTER,
            group: None,
            segment: Segment::Datum,
            multi_valued: false,
            intersections: Vec::new(),
            continuous: false,
        },
        text: TextCue {
            main: Labeled::new(axes.x.clone(), Value::Missing),
            cross: Labeled::new(axes.y.clone(), Value::Missing),
            fill: None,
            section: None,
            range: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chartnav_core::NavDirection;

    fn model() -> ScatterModel {
        ScatterModel::new(vec![(1.0, 1.0), (1.0, 3.0), (2.0, 2.0), (3.0, 1.0)])
    }

    #[test]
    fn column_mode_reads_all_ys() {
        let m = model();
        let mut topo = m.topology().unwrap();
        topo.move_once(NavDirection::Right);
        let d = m.describe(&topo, &AxisLabels::default());
        assert_eq!(d.text.main, Labeled::new("X", 1.0));
        assert_eq!(d.text.cross.value, Value::Numbers(vec![1.0, 3.0]));
        assert!(d.audio.multi_valued);
        // entry rests on the lowest y of the first column
        assert_eq!(d.point.sub_index, Some(0));
    }

    #[test]
    fn sub_index_follows_the_cursor_through_a_toggle() {
        let m = model();
        let mut topo = m.topology().unwrap();
        topo.move_once(NavDirection::Right);
        topo.move_to_extreme(NavDirection::Up);
        // row y=3 holds only x=1
        let d = m.describe(&topo, &AxisLabels::default());
        assert_eq!(d.text.main, Labeled::new("Y", 3.0));
        assert_eq!(d.point.sub_index, None);
        // back in column x=1 the cursor sits on its upper y
        assert!(topo.move_once(NavDirection::Left));
        let d = m.describe(&topo, &AxisLabels::default());
        assert_eq!(d.text.main, Labeled::new("X", 1.0));
        assert_eq!(d.point.sub_index, Some(1));
    }

    #[test]
    fn single_reading_has_no_sub_index() {
        let m = model();
        let mut topo = m.topology().unwrap();
        topo.move_once(NavDirection::Right);
        topo.move_once(NavDirection::Right);
        let d = m.describe(&topo, &AxisLabels::default());
        assert_eq!(d.point.sub_index, None);
    }

    #[test]
    fn orthogonal_move_switches_to_rows() {
        let m = model();
        let mut topo = m.topology().unwrap();
        topo.move_once(NavDirection::Right);
        topo.move_once(NavDirection::Right);
        assert!(topo.move_once(NavDirection::Up));
        let d = m.describe(&topo, &AxisLabels::default());
        assert_eq!(d.text.main, Labeled::new("Y", 2.0));
        assert_eq!(d.text.cross.value, Value::Number(2.0));
    }

    #[test]
    fn locate_x_lands_on_lowest_y() {
        let m = model();
        assert_eq!(m.locate_x(&Value::Number(3.0), 0), Some(Position::new(0, 2)));
    }

    #[test]
    fn empty_scatter_fails_to_build() {
        assert!(ScatterModel::new(Vec::new()).topology().is_err());
    }
}
