//! Property-based invariant tests for braille encoding.
//!
//! 1. Every char of the rendering maps back to a cell
//! 2. Every cell's caret lies inside the rendering and routes back to its row
//! 3. Level encoders emit one cell per datum plus one newline per row
//! 4. Box rows are exactly `BOX_WIDTH` cells wide

use std::sync::Arc;

use chartnav_core::{BoxSummary, BrailleSeries, Position, ValueRange};
use chartnav_modality::{BOX_WIDTH, EncodedBraille, encode};
use proptest::prelude::*;

// ── Strategies ──────────────────────────────────────────────────────────

fn rows_strategy() -> impl Strategy<Value = Vec<Vec<f64>>> {
    prop::collection::vec(prop::collection::vec(-100.0f64..100.0, 1..24), 1..5)
}

fn series_strategy() -> impl Strategy<Value = BrailleSeries> {
    prop_oneof![
        rows_strategy().prop_map(|rows| BrailleSeries::Bar { rows }),
        rows_strategy().prop_map(|rows| BrailleSeries::Heatmap { rows }),
        rows_strategy().prop_map(|rows| BrailleSeries::Line { rows }),
        rows_strategy().prop_flat_map(|rows| {
            let width = rows.iter().map(Vec::len).max().unwrap_or(0);
            prop::collection::vec(any::<bool>(), width)
                .prop_map(move |bear| BrailleSeries::Candlestick {
                    rows: rows.clone(),
                    bear,
                })
        }),
    ]
}

fn box_strategy() -> impl Strategy<Value = BoxSummary> {
    (
        prop::collection::vec(0.0f64..10.0, 0..3),
        prop::collection::vec(0.0f64..10.0, 5),
        prop::collection::vec(0.0f64..10.0, 0..3),
    )
        .prop_map(|(lower, mut five, upper)| {
            five.sort_by(f64::total_cmp);
            let base = 10.0;
            let mut lower: Vec<f64> = lower.iter().map(|v| v / 2.0).collect();
            lower.sort_by(f64::total_cmp);
            let mut upper: Vec<f64> = upper.iter().map(|v| base * 2.0 + v).collect();
            upper.sort_by(f64::total_cmp);
            BoxSummary {
                lower_outliers: lower,
                min: base + five[0] / 2.0,
                q1: base + five[1] / 2.0,
                median: base + five[2] / 2.0,
                q3: base + five[3] / 2.0,
                max: base + five[4] / 2.0,
                upper_outliers: upper,
            }
        })
}

fn check_maps(enc: &EncodedBraille, rows: usize, cols: &dyn Fn(usize) -> usize) {
    for i in 0..enc.len() {
        let cell = enc.cell_at(i).expect("every char maps to a cell");
        assert!(cell.row < rows);
    }
    assert!(enc.cell_at(enc.len()).is_none());
    for row in 0..rows {
        for col in 0..cols(row) {
            let idx = enc.index_of(Position::new(row, col)).expect("cell has caret");
            assert!(idx < enc.len());
            assert_eq!(enc.cell_at(idx).map(|p| p.row), Some(row));
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 1–3. Level and trend encoders
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn maps_are_consistent(series in series_strategy()) {
        let rows = match &series {
            BrailleSeries::Bar { rows }
            | BrailleSeries::Heatmap { rows }
            | BrailleSeries::Line { rows }
            | BrailleSeries::Candlestick { rows, .. } => rows.clone(),
            BrailleSeries::Box { .. } => unreachable!(),
        };
        let enc = encode(&series);
        let cells: usize = rows.iter().map(|r| r.len() + 1).sum();
        prop_assert_eq!(enc.len(), cells);
        prop_assert_eq!(enc.text().chars().count(), cells);
        check_maps(&enc, rows.len(), &|r| rows[r].len());
        for (r, row) in rows.iter().enumerate() {
            for c in 0..row.len() {
                let idx = enc.index_of(Position::new(r, c)).unwrap();
                prop_assert_eq!(enc.cell_at(idx), Some(Position::new(r, c)));
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 4. Box rows
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn box_rows_fill_width(boxes in prop::collection::vec(box_strategy(), 1..4)) {
        let series = Arc::new(BrailleSeries::Box {
            boxes: boxes.clone(),
            range: ValueRange::new(0.0, 30.0),
        });
        let enc = encode(&series);
        prop_assert_eq!(enc.len(), boxes.len() * (BOX_WIDTH + 1));
        check_maps(&enc, boxes.len(), &|_| 7);
    }
}
