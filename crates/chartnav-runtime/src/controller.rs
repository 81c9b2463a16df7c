#![forbid(unsafe_code)]

//! The engine: intents in, synchronized modality output out.
//!
//! [`Engine`] owns the navigation [`Context`] and the output observers, and
//! turns each [`Intent`] into at most one context transition. Everything the
//! user perceives (tones, narration, braille, highlights) flows from the
//! updates the context emits, plus the engine's own short notices for
//! commands that do not move the cursor.
//!
//! # Invariants
//!
//! 1. Every intent except the speed controls stops a running autoplay
//!    before it is handled.
//! 2. A mark scope lasts for exactly one further intent: a slot number
//!    completes it, anything else abandons it, and either way the previous
//!    scope is restored.
//! 3. An intent that cannot be carried out plays the warning tone and
//!    returns `false`; boundary moves are the exception, their notice
//!    already carries the feedback.
//!
//! # Failure Modes
//!
//! Configuration is validated once in [`EngineBuilder::build`]. After that
//! nothing in [`Engine::handle`] can fail: storage problems are logged and
//! invalid requests become notices.

use std::cell::{Ref, RefCell};
use std::rc::Rc;
use std::sync::Arc;

use chartnav_audio::{
    AudioMode, AudioObserver, RecordingSink, Scheduler, SharedSink, SonificationEngine,
    ThreadScheduler,
};
use chartnav_core::{
    ExtremaKind, NavDirection, Observer, ObserverHandle, PlotUpdate, SubscriptionId, TraceState,
};
use chartnav_modality::text::{terse, verbose};
use chartnav_modality::{
    BrailleObserver, BufferedNarration, ElementResolver, HighlightObserver, HighlightRenderer,
    SharedNarration, TextMode, TextObserver, announce,
};
use web_time::Instant;

use crate::autoplay::Autoplay;
use crate::config::EngineConfig;
use crate::context::Context;
use crate::error::{EngineError, Result};
use crate::extrema::ExtremaNavigator;
use crate::figure::Figure;
use crate::intent::{DescribeTarget, Intent, MarkAction, Modalities};
use crate::mark::{Mark, MarkBook};
use crate::rotor::{Rotor, RotorMode};
use crate::scope::Scope;
use crate::storage::{MemoryStorage, SharedStorage};

// ---------------------------------------------------------------------------
// Highlight switch
// ---------------------------------------------------------------------------

/// Highlight output that can be paused while staying subscribed.
pub trait HighlightSwitch {
    fn is_enabled(&self) -> bool;
    fn set_enabled(&mut self, enabled: bool);
}

impl<R, H> HighlightSwitch for HighlightObserver<R, H>
where
    R: ElementResolver,
    H: HighlightRenderer<Element = R::Element>,
{
    fn is_enabled(&self) -> bool {
        HighlightObserver::is_enabled(self)
    }

    fn set_enabled(&mut self, enabled: bool) {
        HighlightObserver::set_enabled(self, enabled);
    }
}

struct Highlight {
    handle: ObserverHandle<PlotUpdate>,
    switch: Rc<RefCell<dyn HighlightSwitch>>,
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Wires a [`Figure`] to its collaborators.
///
/// Every collaborator has a headless default: buffered narration, a
/// recording audio sink, thread-based cleanup and in-memory storage.
pub struct EngineBuilder {
    figure: Figure,
    config: EngineConfig,
    modalities: Modalities,
    narration: Option<SharedNarration>,
    sink: Option<SharedSink>,
    scheduler: Option<Arc<dyn Scheduler>>,
    storage: Option<SharedStorage>,
    highlight: Option<Highlight>,
    observers: Vec<ObserverHandle<PlotUpdate>>,
}

impl EngineBuilder {
    #[must_use]
    pub fn new(figure: Figure) -> Self {
        Self {
            figure,
            config: EngineConfig::default(),
            modalities: Modalities::default(),
            narration: None,
            sink: None,
            scheduler: None,
            storage: None,
            highlight: None,
            observers: Vec::new(),
        }
    }

    #[must_use]
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Which built-in observers get subscribed.
    #[must_use]
    pub fn modalities(mut self, modalities: Modalities) -> Self {
        self.modalities = modalities;
        self
    }

    #[must_use]
    pub fn narration(mut self, narration: SharedNarration) -> Self {
        self.narration = Some(narration);
        self
    }

    #[must_use]
    pub fn audio_sink(mut self, sink: SharedSink) -> Self {
        self.sink = Some(sink);
        self
    }

    #[must_use]
    pub fn scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    #[must_use]
    pub fn storage(mut self, storage: SharedStorage) -> Self {
        self.storage = Some(storage);
        self
    }

    #[must_use]
    pub fn highlight<R, H>(mut self, observer: Rc<RefCell<HighlightObserver<R, H>>>) -> Self
    where
        R: ElementResolver + 'static,
        H: HighlightRenderer<Element = R::Element> + 'static,
    {
        self.highlight = Some(Highlight {
            handle: observer.clone(),
            switch: observer,
        });
        self
    }

    /// Extra observer, subscribed after the built-in ones.
    #[must_use]
    pub fn observer(mut self, observer: ObserverHandle<PlotUpdate>) -> Self {
        self.observers.push(observer);
        self
    }

    /// # Errors
    ///
    /// [`EngineError::InvalidConfig`](crate::error::EngineError::InvalidConfig)
    /// when the configuration does not validate.
    pub fn build(self) -> Result<Engine> {
        let config = self.config.validated()?;
        let modalities = self.modalities;

        let narration: SharedNarration = match self.narration {
            Some(narration) => narration,
            None => BufferedNarration::shared(),
        };
        let sink: SharedSink = match self.sink {
            Some(sink) => sink,
            None => RecordingSink::shared(),
        };
        let scheduler: Arc<dyn Scheduler> = match self.scheduler {
            Some(scheduler) => scheduler,
            None => Arc::new(ThreadScheduler),
        };
        let storage: SharedStorage = match self.storage {
            Some(storage) => storage,
            None => Rc::new(RefCell::new(MemoryStorage::new())),
        };

        let audio = Rc::new(RefCell::new(AudioObserver::new(SonificationEngine::new(
            config.audio.clone(),
            sink,
            scheduler,
        ))));
        let text = Rc::new(RefCell::new(
            TextObserver::new(Rc::clone(&narration)).with_mode(config.text.mode),
        ));
        let braille = Rc::new(RefCell::new(BrailleObserver::new(Rc::clone(&narration))));

        let marks = MarkBook::open(self.figure.id(), &config.marks, storage);
        let mut context = Context::new(self.figure);

        if modalities.contains(Modalities::TEXT) {
            context.subscribe(text.clone());
        }
        if modalities.contains(Modalities::AUDIO) {
            context.subscribe(audio.clone());
        }
        if modalities.contains(Modalities::BRAILLE) {
            context.subscribe(braille.clone());
            if config.braille.enabled {
                let mut braille = braille.borrow_mut();
                braille.update(&PlotUpdate::Trace(context.state()));
                braille.toggle();
            }
        }
        if let Some(highlight) = &self.highlight {
            highlight
                .switch
                .borrow_mut()
                .set_enabled(modalities.contains(Modalities::HIGHLIGHT));
            context.subscribe(Rc::clone(&highlight.handle));
        }
        for observer in self.observers {
            context.subscribe(observer);
        }

        tracing::debug!(
            figure_id = %context.figure().id(),
            ?modalities,
            scope = ?context.active(),
            "engine built"
        );
        Ok(Engine {
            context,
            narration,
            audio,
            text,
            braille,
            highlight: self.highlight,
            rotor: Rotor::new(),
            extrema: ExtremaNavigator::new(),
            marks,
            autoplay: Autoplay::new(config.autoplay),
        })
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

pub struct Engine {
    context: Context,
    narration: SharedNarration,
    audio: Rc<RefCell<AudioObserver>>,
    text: Rc<RefCell<TextObserver>>,
    braille: Rc<RefCell<BrailleObserver>>,
    highlight: Option<Highlight>,
    rotor: Rotor,
    extrema: ExtremaNavigator,
    marks: MarkBook,
    autoplay: Autoplay,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("context", &self.context)
            .field("rotor", &self.rotor.mode())
            .field("marks", &self.marks)
            .field("autoplay", &self.autoplay.direction())
            .finish_non_exhaustive()
    }
}

impl Engine {
    #[must_use]
    pub fn builder(figure: Figure) -> EngineBuilder {
        EngineBuilder::new(figure)
    }

    /// An engine with default configuration and headless collaborators.
    ///
    /// # Errors
    ///
    /// As [`EngineBuilder::build`].
    pub fn new(figure: Figure) -> Result<Self> {
        EngineBuilder::new(figure).build()
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn context(&self) -> &Context {
        &self.context
    }

    #[must_use]
    pub fn state(&self) -> TraceState {
        self.context.state()
    }

    #[must_use]
    pub fn scope(&self) -> Scope {
        self.context.active()
    }

    #[must_use]
    pub fn narration(&self) -> &SharedNarration {
        &self.narration
    }

    #[must_use]
    pub fn marks(&self) -> &MarkBook {
        &self.marks
    }

    #[must_use]
    pub fn rotor_mode(&self) -> RotorMode {
        self.rotor.mode()
    }

    #[must_use]
    pub fn autoplay(&self) -> &Autoplay {
        &self.autoplay
    }

    #[must_use]
    pub fn audio_mode(&self) -> AudioMode {
        self.audio.borrow().engine().mode()
    }

    #[must_use]
    pub fn text_mode(&self) -> TextMode {
        self.text.borrow().mode()
    }

    #[must_use]
    pub fn audio(&self) -> Ref<'_, AudioObserver> {
        self.audio.borrow()
    }

    #[must_use]
    pub fn text(&self) -> Ref<'_, TextObserver> {
        self.text.borrow()
    }

    #[must_use]
    pub fn braille(&self) -> Ref<'_, BrailleObserver> {
        self.braille.borrow()
    }

    pub fn subscribe(&mut self, observer: ObserverHandle<PlotUpdate>) -> SubscriptionId {
        self.context.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.context.unsubscribe(id)
    }

    /// Put the cursor on `(row, col)` of `trace_id` from host code.
    ///
    /// # Errors
    ///
    /// [`EngineError::UnknownTrace`] for an id not in the figure and
    /// [`EngineError::InvalidData`] for a position the trace does not have.
    pub fn focus(&mut self, trace_id: &str, row: usize, col: usize) -> Result<()> {
        if self.context.figure().locate(trace_id).is_none() {
            return Err(EngineError::UnknownTrace(trace_id.to_owned()));
        }
        if self.context.jump(trace_id, row, col) {
            Ok(())
        } else {
            Err(EngineError::InvalidData(format!(
                "no position ({row}, {col}) in trace {trace_id:?}"
            )))
        }
    }

    // -----------------------------------------------------------------------
    // Input
    // -----------------------------------------------------------------------

    /// Handle one intent now. Returns whether it took effect.
    pub fn handle(&mut self, intent: Intent) -> bool {
        self.handle_at(intent, Instant::now())
    }

    /// Handle one intent at `now` (the time base of autoplay).
    pub fn handle_at(&mut self, intent: Intent, now: Instant) -> bool {
        tracing::debug!(?intent, scope = ?self.context.active(), "intent");
        let stopped = !intent.keeps_autoplay() && self.autoplay.stop();

        let active = self.context.active();
        if active.is_mark() {
            self.context.toggle_scope(active);
            match intent {
                Intent::Slot(slot) => return self.complete_mark(active, slot),
                Intent::Cancel => return true,
                _ => {}
            }
        }

        match intent {
            Intent::Move(dir) => self.step(dir),
            Intent::MoveToExtreme(dir) => self.context.move_to_extreme(dir) || self.reject(None),
            Intent::MoveToIndex { row, col } => {
                self.context.move_to_index(row, col) || self.reject(None)
            }
            Intent::StepLayer(dir) => {
                if self.at_subplot_level() {
                    return self.reject(None);
                }
                self.context.step_layer(dir)
            }
            Intent::EnterSubplot => self.context.enter_subplot() || self.reject(None),
            Intent::ExitSubplot => self.context.exit_subplot() || self.reject(None),

            Intent::RotorNext => self.rotate(true),
            Intent::RotorPrev => self.rotate(false),
            Intent::Extrema(kind) => self.extrema(kind),
            Intent::ResetExtrema => {
                let trace_id = self.context.active_trace().id().to_owned();
                self.extrema.reset_trace(&trace_id);
                true
            }

            Intent::BeginMark(action) => self.begin_mark(action),
            Intent::Slot(_) => self.reject(None),
            Intent::MarkSet(slot) => self.mark_set(slot),
            Intent::MarkPlay(slot) => self.mark_play(slot),
            Intent::MarkJump(slot) => self.mark_jump(slot),
            Intent::Cancel => self.cancel(),

            Intent::ToggleAudio => {
                let message = self.audio.borrow_mut().engine_mut().toggle();
                tracing::info!(%message, "audio toggled");
                announce(&self.narration, &message);
                true
            }
            Intent::ToggleText => {
                self.text.borrow_mut().toggle();
                true
            }
            Intent::ToggleBraille => {
                let before = self.braille.borrow().is_enabled();
                self.braille.borrow_mut().toggle();
                before != self.braille.borrow().is_enabled() || self.reject(None)
            }
            Intent::ToggleHighlight => self.toggle_highlight(),
            Intent::BrailleRoute(index) => {
                let target = self.braille.borrow().route(index);
                match target {
                    Some(pos) if !self.at_subplot_level() => {
                        self.context.move_to_index(pos.row, pos.col) || self.reject(None)
                    }
                    _ => self.reject(None),
                }
            }

            Intent::Autoplay(dir) => {
                let steps = if self.at_subplot_level() {
                    0
                } else {
                    self.context.active_trace().steps_towards(dir)
                };
                self.autoplay.start(dir, steps, now);
                true
            }
            Intent::StopAutoplay => stopped,
            Intent::SpeedUp => {
                let message = self.autoplay.speed_up(now);
                announce(&self.narration, message);
                true
            }
            Intent::SpeedDown => {
                let message = self.autoplay.speed_down(now);
                announce(&self.narration, message);
                true
            }
            Intent::ResetSpeed => {
                let message = self.autoplay.reset_speed(now);
                announce(&self.narration, message);
                true
            }

            Intent::Sweep => self.sweep(),
            Intent::Describe(target) => self.describe(target),
        }
    }

    /// Advance autoplay. Returns whether a step was taken.
    ///
    /// A run stops silently when the next step would cross a boundary.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(dir) = self.autoplay.due(now) else {
            return false;
        };
        if self.context.is_movable(dir) {
            self.context.move_once(dir)
        } else {
            self.autoplay.stop();
            false
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn at_subplot_level(&self) -> bool {
        self.context.active() == Scope::Subplot
    }

    /// Warning tone plus an optional notice; always `false`.
    fn reject(&self, message: Option<&str>) -> bool {
        self.audio.borrow().engine().warning();
        if let Some(message) = message {
            announce(&self.narration, message);
        }
        false
    }

    fn step(&mut self, dir: NavDirection) -> bool {
        if self.context.active() != Scope::Rotor || !self.rotor.is_seeking() {
            return self.context.move_once(dir);
        }
        let mode = self.rotor.mode();
        let found = match self.context.active_trace().value() {
            Some(current) => self.context.seek(dir, |v| mode.accepts(current, v)),
            None => false,
        };
        found || self.reject(Some(&self.rotor.not_found(dir)))
    }

    fn rotate(&mut self, forward: bool) -> bool {
        if self.at_subplot_level() {
            return self.reject(None);
        }
        let mode = if forward {
            self.rotor.next()
        } else {
            self.rotor.prev()
        };
        let in_scope = self.context.active() == Scope::Rotor;
        if self.rotor.is_seeking() != in_scope {
            self.context.toggle_scope(Scope::Rotor);
        }
        announce(&self.narration, mode.label());
        true
    }

    fn extrema(&mut self, kind: ExtremaKind) -> bool {
        if self.at_subplot_level() {
            return self.reject(None);
        }
        let trace = self.context.active_trace();
        let trace_id = trace.id().to_owned();
        let Some(line) = trace.line() else {
            return self.reject(Some("No extrema for this trace"));
        };
        match self.extrema.next(&trace_id, &line, kind) {
            Some(jump) => {
                self.context.move_to_index(jump.position.row, jump.position.col)
                    || self.reject(None)
            }
            None => self.reject(Some(&format!("No {} for this trace", kind.label()))),
        }
    }

    fn cancel(&mut self) -> bool {
        if self.context.active() == Scope::Rotor {
            self.context.toggle_scope(Scope::Rotor);
            self.rotor.reset();
            announce(&self.narration, self.rotor.mode().label());
            return true;
        }
        if self.audio.borrow().engine().cancel_smooth() {
            return true;
        }
        self.context.exit_subplot() || self.reject(None)
    }

    fn toggle_highlight(&mut self) -> bool {
        let Some(highlight) = &self.highlight else {
            return self.reject(None);
        };
        let enabled = !highlight.switch.borrow().is_enabled();
        highlight.switch.borrow_mut().set_enabled(enabled);
        tracing::info!(enabled, "highlight toggled");
        announce(
            &self.narration,
            &format!("Highlight is {}", if enabled { "on" } else { "off" }),
        );
        if enabled {
            highlight.handle.borrow_mut().update(&PlotUpdate::Trace(self.context.state()));
        }
        true
    }

    // -----------------------------------------------------------------------
    // Marks
    // -----------------------------------------------------------------------

    fn begin_mark(&mut self, action: MarkAction) -> bool {
        let scope = match action {
            MarkAction::Set => Scope::MarkSet,
            MarkAction::Play => Scope::MarkPlay,
            MarkAction::Jump => Scope::MarkJump,
        };
        if action == MarkAction::Set && self.at_subplot_level() {
            return self.reject(None);
        }
        self.context.toggle_scope(scope);
        true
    }

    fn complete_mark(&mut self, scope: Scope, slot: u8) -> bool {
        match scope {
            Scope::MarkSet => self.mark_set(slot),
            Scope::MarkPlay => self.mark_play(slot),
            _ => self.mark_jump(slot),
        }
    }

    fn mark_set(&mut self, slot: u8) -> bool {
        if self.at_subplot_level() {
            return self.reject(None);
        }
        if !MarkBook::is_valid_slot(slot) {
            return self.reject(Some(&format!("Invalid mark slot {slot}")));
        }
        let state = self.context.state();
        if state.point.measure().is_empty() {
            return self.reject(Some("Cannot set mark on empty position"));
        }
        let mark = Mark {
            trace_id: state.trace_id.clone(),
            row: state.position.row,
            col: state.position.col,
            terse: terse(&state.text),
            verbose: verbose(&state.text),
        };
        match self.marks.set(slot, mark) {
            Some(outcome) => {
                announce(&self.narration, &outcome.message(slot));
                true
            }
            None => self.reject(None),
        }
    }

    fn mark_play(&mut self, slot: u8) -> bool {
        let Some(mark) = self.marks.get(slot).cloned() else {
            return self.reject(Some(&format!("Mark {slot} is empty")));
        };
        let state = self
            .context
            .figure()
            .trace(&mark.trace_id)
            .and_then(|trace| trace.state_at(mark.row, mark.col));
        let Some(state) = state else {
            tracing::warn!(slot, trace_id = %mark.trace_id, "mark no longer resolves");
            return self.reject(Some(&format!("Mark {slot} references invalid trace")));
        };
        announce(&self.narration, &format!("Mark {slot}"));
        self.context.emit(&PlotUpdate::Trace(state));
        true
    }

    fn mark_jump(&mut self, slot: u8) -> bool {
        let Some(mark) = self.marks.get(slot).cloned() else {
            return self.reject(Some(&format!("Mark {slot} is empty")));
        };
        if self.context.jump(&mark.trace_id, mark.row, mark.col) {
            tracing::info!(slot, trace_id = %mark.trace_id, row = mark.row, col = mark.col, "jumped to mark");
            announce(&self.narration, &format!("Jumped to mark {slot}"));
            true
        } else {
            tracing::warn!(slot, trace_id = %mark.trace_id, "mark jump failed");
            self.reject(Some(&format!("Failed to jump to mark {slot}")))
        }
    }

    // -----------------------------------------------------------------------
    // Sweep and describe
    // -----------------------------------------------------------------------

    fn sweep(&self) -> bool {
        if self.at_subplot_level() {
            return self.reject(None);
        }
        let trace = self.context.active_trace();
        let Some((line, range)) = trace.line().and_then(|l| l.range().map(|r| (l, r))) else {
            return self.reject(None);
        };
        let group = trace.describe().audio.group;
        let started = self
            .audio
            .borrow()
            .engine()
            .play_smooth(&line.values, range, group)
            .is_some();
        started || self.reject(None)
    }

    fn describe(&self, target: DescribeTarget) -> bool {
        let subplot_level = self.at_subplot_level();
        let trace = self.context.active_trace();
        let message = match (target, subplot_level) {
            (DescribeTarget::Point, _) => {
                self.context.announce_current();
                return true;
            }
            (DescribeTarget::Title, true) => self
                .context
                .figure()
                .title()
                .map(|t| format!("Figure title is {t}")),
            (DescribeTarget::Title, false) => trace.title().map(|t| format!("Subplot title is {t}")),
            (_, true) => None,
            (DescribeTarget::X, false) => Some(format!("X label is {}", trace.axes().x)),
            (DescribeTarget::Y, false) => Some(format!("Y label is {}", trace.axes().y)),
            (DescribeTarget::Fill, false) => trace
                .describe()
                .text
                .fill
                .map(|fill| format!("Fill is {}", fill.value)),
        };
        match message {
            Some(message) => {
                announce(&self.narration, &message);
                true
            }
            None => self.reject(None),
        }
    }
}
