#![forbid(unsafe_code)]

//! The input vocabulary of the engine.
//!
//! Front ends translate their own key bindings into [`Intent`]s; the engine
//! never sees raw keys. Intents are plain data, so a recorded session can be
//! replayed as a JSON list.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use chartnav_core::{ExtremaKind, NavDirection};

/// Which mark operation a slot number completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkAction {
    Set,
    Play,
    Jump,
}

/// What a describe request reads out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DescribeTarget {
    X,
    Y,
    Fill,
    Title,
    Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "intent", content = "arg", rename_all = "snake_case")]
pub enum Intent {
    /// One step at the active level, or a value seek when the rotor is on.
    Move(NavDirection),
    MoveToExtreme(NavDirection),
    MoveToIndex { row: usize, col: usize },
    /// Next (`Up`) or previous (`Down`) layer of the active subplot.
    StepLayer(NavDirection),
    EnterSubplot,
    ExitSubplot,

    RotorNext,
    RotorPrev,
    Extrema(ExtremaKind),
    ResetExtrema,

    /// Enter the scope that waits for a slot number.
    BeginMark(MarkAction),
    /// A digit; completes a pending mark operation.
    Slot(u8),
    MarkSet(u8),
    MarkPlay(u8),
    MarkJump(u8),
    /// Leave the innermost transient scope.
    Cancel,

    ToggleAudio,
    ToggleText,
    ToggleBraille,
    ToggleHighlight,
    /// A routing key on the braille display.
    BrailleRoute(usize),

    Autoplay(NavDirection),
    StopAutoplay,
    SpeedUp,
    SpeedDown,
    ResetSpeed,

    /// Sweep the active line as one continuous tone.
    Sweep,
    Describe(DescribeTarget),
}

impl Intent {
    /// Intents that leave a running autoplay alone.
    #[must_use]
    pub const fn keeps_autoplay(self) -> bool {
        matches!(
            self,
            Self::Autoplay(_) | Self::SpeedUp | Self::SpeedDown | Self::ResetSpeed
        )
    }
}

bitflags! {
    /// Output modalities wired to the context at build time.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modalities: u8 {
        const AUDIO     = 0b0001;
        const TEXT      = 0b0010;
        const BRAILLE   = 0b0100;
        const HIGHLIGHT = 0b1000;
    }
}

impl Default for Modalities {
    fn default() -> Self {
        Self::all()
    }
}
