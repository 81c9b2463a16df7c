//! Property-based invariant tests for context-level navigation.
//!
//! 1. Every context move emits exactly one update, and a rejected move
//!    leaves the cursor where it was
//! 2. The cursor never leaves the trace's valid positions
//! 3. A successful lower/higher seek lands on a strictly lower/higher value;
//!    a failed seek does not move
//! 4. Extrema jumps land on the extreme value and cycle through every tie
//! 5. Setting a mark, wandering off and jumping back restores the position
//! 6. Scope toggles restore the previous scope

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use chartnav_audio::ManualScheduler;
use chartnav_core::{ExtremaKind, NavDirection, Observer, PlotUpdate, Position, extrema_indices};
use chartnav_runtime::{
    BarModel, BarSeries, Context, Engine, ExtremaNavigator, Figure, Intent, Scope, ScopeStack,
    Trace,
};
use proptest::prelude::*;

// ── Strategies ──────────────────────────────────────────────────────────

fn dir_strategy() -> impl Strategy<Value = NavDirection> {
    prop_oneof![
        Just(NavDirection::Up),
        Just(NavDirection::Down),
        Just(NavDirection::Left),
        Just(NavDirection::Right),
    ]
}

/// Rectangular series data: 1-4 series of 1-10 small integer values.
fn series_strategy() -> impl Strategy<Value = Vec<Vec<f64>>> {
    (1usize..5, 1usize..11).prop_flat_map(|(rows, cols)| {
        prop::collection::vec(prop::collection::vec((0i32..8).prop_map(f64::from), cols), rows)
    })
}

fn bar_trace(series: &[Vec<f64>]) -> Trace {
    let cols = series[0].len();
    let labels = (0..cols).map(|c| format!("c{c}")).collect();
    let series = series
        .iter()
        .enumerate()
        .map(|(i, values)| BarSeries::new(format!("s{i}"), values.clone()))
        .collect();
    Trace::new("t", BarModel::new(labels, series).unwrap()).unwrap()
}

#[derive(Default)]
struct Count(usize);

impl Observer<PlotUpdate> for Count {
    fn update(&mut self, _update: &PlotUpdate) {
        self.0 += 1;
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 1-2. One update per move, cursor stays valid
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn one_update_per_move(
        series in series_strategy(),
        dirs in prop::collection::vec(dir_strategy(), 1..40),
    ) {
        let mut ctx = Context::new(Figure::single("f", bar_trace(&series)).unwrap());
        let count = Rc::new(RefCell::new(Count::default()));
        ctx.subscribe(count.clone());
        for (i, dir) in dirs.iter().enumerate() {
            let before = ctx.active_trace().position();
            let entry = ctx.active_trace().is_initial_entry();
            let moved = ctx.move_once(*dir);
            prop_assert_eq!(count.borrow().0, i + 1);
            if !moved && !entry {
                prop_assert_eq!(ctx.active_trace().position(), before);
            }
            let pos = ctx.active_trace().position();
            prop_assert!(pos.row < series.len() && pos.col < series[0].len());
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 3. Rotor seeks
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn seek_is_strict(
        values in prop::collection::vec((0i32..8).prop_map(f64::from), 2..12),
        start in 0usize..12,
        dir in prop_oneof![Just(NavDirection::Left), Just(NavDirection::Right)],
        lower in any::<bool>(),
    ) {
        let start = start % values.len();
        let mut trace = bar_trace(std::slice::from_ref(&values));
        prop_assert!(trace.move_to_index(0, start));
        let current = values[start];
        let found = trace.seek(dir, |v| if lower { v < current } else { v > current });
        let after = trace.position();
        if found {
            let v = values[after.col];
            let in_direction = if lower { v < current } else { v > current };
            prop_assert!(in_direction);
        } else {
            prop_assert_eq!(after, Position::new(0, start));
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 4. Extrema cycling
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn extrema_cycle_through_ties(
        values in prop::collection::vec((0i32..4).prop_map(f64::from), 1..16),
        max in any::<bool>(),
    ) {
        let kind = if max { ExtremaKind::Max } else { ExtremaKind::Min };
        let trace = bar_trace(std::slice::from_ref(&values));
        let line = trace.line().unwrap();
        let ties = extrema_indices(&values, kind).unwrap();
        let mut nav = ExtremaNavigator::new();
        for round in 0..2 {
            for (i, &index) in ties.iter().enumerate() {
                let jump = nav.next("t", &line, kind).unwrap();
                prop_assert_eq!(jump.position.col, index, "round {}", round);
                prop_assert_eq!(jump.occurrence, i + 1);
                prop_assert_eq!(jump.value, values[index]);
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 5. Mark round-trip
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn mark_jump_restores_position(
        series in series_strategy(),
        slot in 0u8..10,
        target in (0usize..4, 0usize..10),
        dirs in prop::collection::vec(dir_strategy(), 0..20),
    ) {
        let row = target.0 % series.len();
        let col = target.1 % series[0].len();
        let mut engine = Engine::builder(Figure::single("f", bar_trace(&series)).unwrap())
            .scheduler(Arc::new(ManualScheduler::new()))
            .build()
            .unwrap();
        let moved = engine.handle(Intent::MoveToIndex { row, col });
        prop_assert!(moved);
        prop_assert!(engine.handle(Intent::MarkSet(slot)));
        for dir in dirs {
            engine.handle(Intent::Move(dir));
        }
        prop_assert!(engine.handle(Intent::MarkJump(slot)));
        let state = engine.state();
        prop_assert_eq!(state.trace_id.as_str(), "t");
        prop_assert_eq!(state.position, Position::new(row, col));
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 6. Scope stack
// ═══════════════════════════════════════════════════════════════════════

fn scope_strategy() -> impl Strategy<Value = Scope> {
    prop_oneof![
        Just(Scope::Trace),
        Just(Scope::Rotor),
        Just(Scope::MarkSet),
        Just(Scope::MarkPlay),
        Just(Scope::MarkJump),
    ]
}

proptest! {
    #[test]
    fn enter_then_leave_restores(
        setup in prop::collection::vec(scope_strategy(), 0..6),
        scope in scope_strategy(),
    ) {
        let mut stack = ScopeStack::new(Scope::Subplot);
        for s in setup {
            stack.toggle(s);
        }
        if !stack.contains(scope) {
            let before = stack.active();
            let depth = stack.depth();
            prop_assert_eq!(stack.toggle(scope), scope);
            prop_assert_eq!(stack.toggle(scope), before);
            prop_assert_eq!(stack.depth(), depth);
        }
    }
}
