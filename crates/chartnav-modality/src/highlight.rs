#![forbid(unsafe_code)]

//! Visual highlight of the elements bound to the cursor.
//!
//! The observer resolves each [`Selector`] of the active point to rendered
//! elements and asks the renderer for one overlay per element. Overlays of
//! the previous point are removed first, so at most one point is highlighted.
//!
//! # Failure Modes
//!
//! - A selector that resolves to nothing is skipped with a `debug` log; the
//!   other modalities are unaffected.

use std::hash::Hash;

use ahash::AHashMap;
use chartnav_core::{Observer, PlotUpdate, Selector};

/// Finds rendered elements for a selector.
pub trait ElementResolver {
    type Element;
    fn resolve(&self, selector: &Selector) -> Vec<Self::Element>;
}

/// Draws and removes highlight overlays.
pub trait HighlightRenderer {
    type Element;
    type Handle;
    fn create_overlay(&mut self, element: &Self::Element) -> Self::Handle;
    fn remove_overlay(&mut self, handle: Self::Handle);
}

/// Resolver backed by a fixed selector table.
#[derive(Debug, Clone)]
pub struct MapResolver<E> {
    table: AHashMap<Selector, Vec<E>>,
}

impl<E> Default for MapResolver<E> {
    fn default() -> Self {
        Self {
            table: AHashMap::new(),
        }
    }
}

impl<E: Clone> MapResolver<E> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, selector: Selector, elements: Vec<E>) {
        self.table.insert(selector, elements);
    }

    #[must_use]
    pub fn with(mut self, selector: impl Into<String>, elements: Vec<E>) -> Self {
        self.insert(Selector::new(selector), elements);
        self
    }
}

impl<E: Clone> ElementResolver for MapResolver<E> {
    type Element = E;

    fn resolve(&self, selector: &Selector) -> Vec<E> {
        self.table.get(selector).cloned().unwrap_or_default()
    }
}

/// Keeps the overlays of the current point.
pub struct HighlightObserver<R, H>
where
    R: ElementResolver,
    H: HighlightRenderer<Element = R::Element>,
{
    resolver: R,
    renderer: H,
    active: Vec<H::Handle>,
    enabled: bool,
}

impl<R, H> std::fmt::Debug for HighlightObserver<R, H>
where
    R: ElementResolver,
    H: HighlightRenderer<Element = R::Element>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HighlightObserver")
            .field("overlays", &self.active.len())
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

impl<R, H> HighlightObserver<R, H>
where
    R: ElementResolver,
    H: HighlightRenderer<Element = R::Element>,
{
    #[must_use]
    pub fn new(resolver: R, renderer: H) -> Self {
        Self {
            resolver,
            renderer,
            active: Vec::new(),
            enabled: true,
        }
    }

    #[must_use]
    pub fn renderer(&self) -> &H {
        &self.renderer
    }

    /// Number of overlays currently drawn.
    #[must_use]
    pub fn overlay_count(&self) -> usize {
        self.active.len()
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Turn highlighting on or off; switching off clears every overlay.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.clear();
        }
    }

    /// Remove every overlay.
    pub fn clear(&mut self) {
        for handle in self.active.drain(..) {
            self.renderer.remove_overlay(handle);
        }
    }

    fn highlight(&mut self, selectors: &[Selector]) {
        self.clear();
        for selector in selectors {
            let elements = self.resolver.resolve(selector);
            if elements.is_empty() {
                tracing::debug!(selector = selector.as_str(), "selector resolved to no element");
                continue;
            }
            for element in &elements {
                let handle = self.renderer.create_overlay(element);
                self.active.push(handle);
            }
        }
    }
}

impl<R, H> Observer<PlotUpdate> for HighlightObserver<R, H>
where
    R: ElementResolver,
    H: HighlightRenderer<Element = R::Element>,
{
    fn update(&mut self, update: &PlotUpdate) {
        if !self.enabled {
            return;
        }
        match update {
            PlotUpdate::Trace(_) | PlotUpdate::Layer(_) => {
                if let Some(trace) = update.trace() {
                    self.highlight(&trace.highlight);
                }
            }
            PlotUpdate::Subplot(_) => self.clear(),
            PlotUpdate::Boundary(_) => {}
        }
    }
}

/// Renderer that records overlays by handle, for headless use.
#[derive(Debug, Clone)]
pub struct RecordingRenderer<E> {
    next: u64,
    live: AHashMap<u64, E>,
    created: usize,
    removed: usize,
}

impl<E: Clone + Eq + Hash> RecordingRenderer<E> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            next: 0,
            live: AHashMap::new(),
            created: 0,
            removed: 0,
        }
    }

    /// Elements that currently carry an overlay.
    #[must_use]
    pub fn highlighted(&self) -> Vec<E> {
        let mut handles: Vec<_> = self.live.iter().collect();
        handles.sort_by_key(|(h, _)| **h);
        handles.into_iter().map(|(_, e)| e.clone()).collect()
    }

    #[must_use]
    pub fn created(&self) -> usize {
        self.created
    }

    #[must_use]
    pub fn removed(&self) -> usize {
        self.removed
    }
}

impl<E: Clone + Eq + Hash> HighlightRenderer for RecordingRenderer<E> {
    type Element = E;
    type Handle = u64;

    fn create_overlay(&mut self, element: &E) -> u64 {
        let handle = self.next;
        self.next += 1;
        self.created += 1;
        self.live.insert(handle, element.clone());
        handle
    }

    fn remove_overlay(&mut self, handle: u64) {
        if self.live.remove(&handle).is_some() {
            self.removed += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observer() -> HighlightObserver<MapResolver<&'static str>, RecordingRenderer<&'static str>> {
        let resolver = MapResolver::new()
            .with("#bar-0", vec!["rect0"])
            .with("#bar-1", vec!["rect1", "label1"]);
        HighlightObserver::new(resolver, RecordingRenderer::new())
    }

    #[test]
    fn replaces_previous_overlay() {
        let mut obs = observer();
        obs.highlight(&[Selector::new("#bar-0")]);
        assert_eq!(obs.renderer().highlighted(), vec!["rect0"]);
        obs.highlight(&[Selector::new("#bar-1")]);
        assert_eq!(obs.renderer().highlighted(), vec!["rect1", "label1"]);
        assert_eq!(obs.renderer().removed(), 1);
    }

    #[test]
    fn unresolvable_selector_is_skipped() {
        let mut obs = observer();
        obs.highlight(&[Selector::new("#missing"), Selector::new("#bar-0")]);
        assert_eq!(obs.overlay_count(), 1);
    }

    #[test]
    fn disabling_clears() {
        let mut obs = observer();
        obs.highlight(&[Selector::new("#bar-1")]);
        obs.set_enabled(false);
        assert_eq!(obs.overlay_count(), 0);
        assert!(obs.renderer().highlighted().is_empty());
    }
}
