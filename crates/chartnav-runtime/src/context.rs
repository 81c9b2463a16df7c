#![forbid(unsafe_code)]

//! Navigation context: the figure, the scope stack and the observer fan-out.
//!
//! Every navigation call mutates the figure first and then emits exactly one
//! [`PlotUpdate`] to every registered observer. Observers never talk to each
//! other; this is the only place updates come from.
//!
//! # Invariants
//!
//! 1. A successful move emits the new state; a rejected move emits one
//!    [`BoundaryNotice`] and leaves the cursor where it was.
//! 2. Notices are differentiated per level: trace edges, missing layers and
//!    the edge of the subplot grid each have their own kind.
//! 3. Calls that neither move nor reject (invalid explicit index, failed
//!    seek) emit nothing; the caller decides how to report them.

use chartnav_core::{
    BoundaryKind, BoundaryNotice, LayerState, NavDirection, ObserverHandle, ObserverRegistry,
    Panning, PlotUpdate, Position, SubscriptionId, TraceState,
};

use crate::figure::Figure;
use crate::scope::{Scope, ScopeStack};
use crate::trace::Trace;

pub struct Context {
    figure: Figure,
    scopes: ScopeStack,
    observers: ObserverRegistry<PlotUpdate>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("figure", &self.figure.id())
            .field("scope", &self.scopes.active())
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Context {
    /// Rest at the subplot level when there is more than one subplot.
    #[must_use]
    pub fn new(figure: Figure) -> Self {
        let resting = if figure.subplot_count() > 1 {
            Scope::Subplot
        } else {
            Scope::Trace
        };
        Self {
            figure,
            scopes: ScopeStack::new(resting),
            observers: ObserverRegistry::new(),
        }
    }

    #[must_use]
    pub fn figure(&self) -> &Figure {
        &self.figure
    }

    pub fn figure_mut(&mut self) -> &mut Figure {
        &mut self.figure
    }

    // -----------------------------------------------------------------------
    // Scopes
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn active(&self) -> Scope {
        self.scopes.active()
    }

    pub fn toggle_scope(&mut self, scope: Scope) -> Scope {
        self.scopes.toggle(scope)
    }

    fn at_subplot_level(&self) -> bool {
        self.scopes.active() == Scope::Subplot
    }

    // -----------------------------------------------------------------------
    // Observers
    // -----------------------------------------------------------------------

    pub fn subscribe(&mut self, observer: ObserverHandle<PlotUpdate>) -> SubscriptionId {
        self.observers.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Deliver `update` to every observer.
    pub fn emit(&self, update: &PlotUpdate) {
        self.observers.notify(update);
    }

    fn emit_boundary(&self, kind: BoundaryKind, panning: Panning) {
        tracing::debug!(?kind, "boundary");
        self.emit(&PlotUpdate::Boundary(BoundaryNotice { kind, panning }));
    }

    /// Emit the current state again (describe-point, after toggles).
    pub fn announce_current(&self) {
        if self.at_subplot_level() {
            self.emit(&PlotUpdate::Subplot(self.figure.subplot_state()));
        } else {
            self.emit(&PlotUpdate::Trace(self.state()));
        }
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn active_trace(&self) -> &Trace {
        self.figure.active_trace()
    }

    pub fn active_trace_mut(&mut self) -> &mut Trace {
        self.figure.active_trace_mut()
    }

    #[must_use]
    pub fn state(&self) -> TraceState {
        self.active_trace().state()
    }

    /// Would a step towards `dir` succeed at the current level?
    #[must_use]
    pub fn is_movable(&self, dir: NavDirection) -> bool {
        if self.at_subplot_level() {
            self.figure.is_subplot_movable(dir)
        } else {
            self.active_trace().is_movable(dir)
        }
    }

    // -----------------------------------------------------------------------
    // Movement
    // -----------------------------------------------------------------------

    /// Step once at the current level.
    pub fn move_once(&mut self, dir: NavDirection) -> bool {
        if self.at_subplot_level() {
            if self.figure.move_subplot(dir) {
                self.emit(&PlotUpdate::Subplot(self.figure.subplot_state()));
                return true;
            }
            let panning = self.figure.subplot_state().panning;
            self.emit_boundary(BoundaryKind::NoSubplot(dir), panning);
            return false;
        }
        if self.active_trace_mut().move_once(dir) {
            self.emit(&PlotUpdate::Trace(self.state()));
            true
        } else {
            let panning = self.state().audio.panning;
            self.emit_boundary(BoundaryKind::Edge(dir), panning);
            false
        }
    }

    /// Jump to the boundary of the active trace.
    pub fn move_to_extreme(&mut self, dir: NavDirection) -> bool {
        if self.at_subplot_level() {
            return false;
        }
        let moved = self.active_trace_mut().move_to_extreme(dir);
        if moved {
            self.emit(&PlotUpdate::Trace(self.state()));
        }
        moved
    }

    /// Validated jump inside the active trace.
    pub fn move_to_index(&mut self, row: usize, col: usize) -> bool {
        let moved = self.active_trace_mut().move_to_index(row, col);
        if moved {
            self.emit(&PlotUpdate::Trace(self.state()));
        } else {
            tracing::debug!(row, col, "rejected index");
        }
        moved
    }

    /// Seek in `dir` for a value accepted by `accept`.
    pub fn seek(&mut self, dir: NavDirection, accept: impl FnMut(f64) -> bool) -> bool {
        let found = self.active_trace_mut().seek(dir, accept);
        if found {
            self.emit(&PlotUpdate::Trace(self.state()));
        }
        found
    }

    /// Switch to the layer above (`Up`) or below (`Down`), keeping the x
    /// position when the new layer has it.
    pub fn step_layer(&mut self, dir: NavDirection) -> bool {
        let x = self.active_trace().x_value();
        if !self.figure.subplot_mut().step_layer(dir) {
            self.emit_boundary(BoundaryKind::NoLayer, Panning::CENTER);
            return false;
        }
        let trace = self.figure.active_trace_mut();
        let carried = x.as_ref().is_some_and(|x| trace.move_to_x_value(x));
        if !carried {
            trace.enter();
        }
        let subplot = self.figure.subplot();
        let layer = LayerState {
            index: subplot.active_index() + 1,
            size: subplot.len(),
            trace: self.state(),
        };
        tracing::debug!(layer = layer.index, carried, "layer switched");
        self.emit(&PlotUpdate::Layer(layer));
        true
    }

    /// From the subplot grid into the active subplot's trace.
    pub fn enter_subplot(&mut self) -> bool {
        if !self.at_subplot_level() {
            return false;
        }
        self.scopes.toggle(Scope::Trace);
        self.active_trace_mut().enter();
        self.emit(&PlotUpdate::Trace(self.state()));
        true
    }

    /// Back from a trace to the subplot grid.
    pub fn exit_subplot(&mut self) -> bool {
        if self.scopes.active() != Scope::Trace || !self.scopes.contains(Scope::Subplot) {
            return false;
        }
        self.scopes.toggle(Scope::Subplot);
        self.emit(&PlotUpdate::Subplot(self.figure.subplot_state()));
        true
    }

    /// Focus trace `trace_id` and move to `(row, col)` in it.
    ///
    /// Nothing changes unless the trace exists and the index is valid.
    pub fn jump(&mut self, trace_id: &str, row: usize, col: usize) -> bool {
        let Some(location) = self.figure.locate(trace_id) else {
            return false;
        };
        let valid = self
            .figure
            .trace(trace_id)
            .is_some_and(|t| t.is_movable(Position::new(row, col)));
        if !valid || !self.figure.focus(location) {
            return false;
        }
        if self.at_subplot_level() {
            self.scopes.toggle(Scope::Trace);
        }
        self.move_to_index(row, col)
    }
}
