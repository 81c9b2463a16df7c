#![forbid(unsafe_code)]

//! Cycling through the minima and maxima of a line.
//!
//! Every (trace, line, kind) keeps its own cursor. A jump lands on the
//! occurrence under the cursor and advances it, so repeated jumps visit tied
//! extrema in index order and wrap around.

use ahash::AHashMap;
use chartnav_core::{ExtremaKind, Position, extrema_indices};

use crate::trace::Line;

/// Result of one jump.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtremaJump {
    pub position: Position,
    pub value: f64,
    /// 1-based occurrence that was visited.
    pub occurrence: usize,
    pub total: usize,
}

type Key = (String, usize, ExtremaKind);

#[derive(Debug, Clone, Default)]
pub struct ExtremaNavigator {
    cursors: AHashMap<Key, usize>,
}

impl ExtremaNavigator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Next extreme of `line`, advancing its cursor.
    ///
    /// `None` when the line has no finite value.
    pub fn next(&mut self, trace_id: &str, line: &Line, kind: ExtremaKind) -> Option<ExtremaJump> {
        if line.values.is_empty() {
            return None;
        }
        let occurrences = extrema_indices(&line.values, kind).ok()?;
        let cursor = self
            .cursors
            .entry((trace_id.to_owned(), line.key, kind))
            .or_insert(0);
        let slot = *cursor % occurrences.len();
        *cursor = (slot + 1) % occurrences.len();

        let index = occurrences[slot];
        let jump = ExtremaJump {
            position: *line.positions.get(index)?,
            value: line.values[index],
            occurrence: slot + 1,
            total: occurrences.len(),
        };
        tracing::debug!(trace_id, line = line.key, ?kind, index, occurrence = jump.occurrence, "extrema jump");
        Some(jump)
    }

    /// Rewind cursors of one line, for one kind or both.
    pub fn reset(&mut self, trace_id: &str, line: usize, kind: Option<ExtremaKind>) {
        self.cursors
            .retain(|(t, l, k), _| !(t == trace_id && *l == line && kind.is_none_or(|kind| kind == *k)));
    }

    /// Rewind every cursor of a trace.
    pub fn reset_trace(&mut self, trace_id: &str) {
        self.cursors.retain(|(t, _, _), _| t != trace_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(values: Vec<f64>) -> Line {
        let positions = (0..values.len()).map(|c| Position::new(0, c)).collect();
        Line {
            key: 0,
            values,
            positions,
        }
    }

    #[test]
    fn tied_minima_cycle_in_index_order() {
        let l = line(vec![3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0]);
        let mut nav = ExtremaNavigator::new();
        let visits: Vec<usize> = (0..3)
            .map(|_| nav.next("t", &l, ExtremaKind::Min).unwrap().position.col)
            .collect();
        assert_eq!(visits, vec![1, 3, 1]);
    }

    #[test]
    fn kinds_and_traces_have_separate_cursors() {
        let l = line(vec![1.0, 5.0, 1.0, 5.0]);
        let mut nav = ExtremaNavigator::new();
        assert_eq!(nav.next("a", &l, ExtremaKind::Min).unwrap().position.col, 0);
        assert_eq!(nav.next("a", &l, ExtremaKind::Max).unwrap().position.col, 1);
        assert_eq!(nav.next("b", &l, ExtremaKind::Min).unwrap().position.col, 0);
        let second = nav.next("a", &l, ExtremaKind::Min).unwrap();
        assert_eq!((second.position.col, second.occurrence, second.total), (2, 2, 2));
    }

    #[test]
    fn reset_rewinds() {
        let l = line(vec![1.0, 1.0]);
        let mut nav = ExtremaNavigator::new();
        nav.next("t", &l, ExtremaKind::Min);
        nav.reset("t", 0, Some(ExtremaKind::Min));
        assert_eq!(nav.next("t", &l, ExtremaKind::Min).unwrap().position.col, 0);
        nav.reset_trace("t");
        assert_eq!(nav.next("t", &l, ExtremaKind::Min).unwrap().position.col, 0);
    }

    #[test]
    fn empty_line_has_no_extreme() {
        let mut nav = ExtremaNavigator::new();
        assert!(nav.next("t", &line(Vec::new()), ExtremaKind::Max).is_none());
        assert!(nav.next("t", &line(vec![f64::NAN]), ExtremaKind::Max).is_none());
    }
}
