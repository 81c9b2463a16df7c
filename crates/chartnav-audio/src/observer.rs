#![forbid(unsafe_code)]

//! Audio as a navigation observer.

use chartnav_core::{Observer, PlotUpdate};

use crate::engine::SonificationEngine;

/// Voices every trace update and chimes on boundaries.
///
/// Subplot updates are silent.
#[derive(Debug)]
pub struct AudioObserver {
    engine: SonificationEngine,
}

impl AudioObserver {
    #[must_use]
    pub fn new(engine: SonificationEngine) -> Self {
        Self { engine }
    }

    #[must_use]
    pub fn engine(&self) -> &SonificationEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut SonificationEngine {
        &mut self.engine
    }
}

impl Observer<PlotUpdate> for AudioObserver {
    fn update(&mut self, update: &PlotUpdate) {
        match update {
            PlotUpdate::Trace(_) | PlotUpdate::Layer(_) => {
                if let Some(trace) = update.trace() {
                    self.engine.track_multi(trace.audio.multi_valued);
                    self.engine.play(&trace.audio);
                }
            }
            PlotUpdate::Boundary(notice) => {
                self.engine.play_empty(notice.panning);
            }
            PlotUpdate::Subplot(_) => {}
        }
    }
}
