#![forbid(unsafe_code)]

//! Text descriptions of the cursor.
//!
//! Two formats share one [`TextCue`]:
//!
//! - **verbose**: `"Month is Jan, Sales is 12"`, with box sections
//!   (`"…, Y, 2 Upper outlier(s) are 30, 41"`) and fills
//!   (`"…, Temp is 3"`); a bin range replaces the main value
//!   (`"Score is 10 through 20, …"`).
//! - **terse**: `"Jan, 12"`; multi-values are bracketed; candle fields read
//!   `"Jan, 105, open bear"`.
//!
//! Boundary notices are announced in every mode. The mode only governs the
//! descriptions of points, layers and subplots.

use std::fmt::Write as _;

use chartnav_core::{
    LayerState, Observer, PlotUpdate, SubplotState, TextCue, TraceKind, TraceState, Value,
};

use crate::narration::{SharedNarration, announce};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How much text each point produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TextMode {
    Off,
    Terse,
    #[default]
    Verbose,
}

impl TextMode {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Terse => "terse",
            Self::Verbose => "verbose",
        }
    }

    /// Verbose → Terse → Off → Verbose.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Verbose => Self::Terse,
            Self::Terse => Self::Off,
            Self::Off => Self::Verbose,
        }
    }
}

// ---------------------------------------------------------------------------
// Formatters
// ---------------------------------------------------------------------------

fn bracketed(value: &Value) -> String {
    match value {
        Value::Numbers(_) => format!("[{value}]"),
        other => other.to_string(),
    }
}

/// Verbose point description.
#[must_use]
pub fn verbose(cue: &TextCue) -> String {
    let mut out = String::new();
    let _ = write!(out, "{} is ", cue.main.label);
    match cue.range {
        Some(range) => {
            let _ = write!(out, "{} through {}", range.min, range.max);
        }
        None => {
            let _ = write!(out, "{}", cue.main.value);
        }
    }
    let _ = write!(out, ", {}", cue.cross.label);

    if let Some(section) = &cue.section {
        out.push_str(", ");
        if let Value::Numbers(vs) = &cue.cross.value {
            let _ = write!(out, "{} ", vs.len());
        }
        out.push_str(section);
    }

    match &cue.cross.value {
        Value::Numbers(vs) if vs.len() > 1 => {
            let _ = write!(out, " are {}", cue.cross.value);
        }
        Value::Numbers(vs) if vs.is_empty() => {}
        other => {
            let _ = write!(out, " is {other}");
        }
    }

    if let Some(fill) = &cue.fill {
        let _ = write!(out, ", {} is {}", fill.label, fill.value);
    }
    out
}

/// Terse point description.
#[must_use]
pub fn terse(cue: &TextCue) -> String {
    let mut out = format!("{}, {}", bracketed(&cue.main.value), bracketed(&cue.cross.value));
    match (&cue.section, &cue.fill) {
        (Some(section), Some(fill)) => {
            let _ = write!(out, ", {section} {}", fill.value);
        }
        (Some(section), None) => {
            out.push_str(", ");
            if let Value::Numbers(vs) = &cue.cross.value {
                let _ = write!(out, "{} ", vs.len());
            }
            out.push_str(section);
        }
        (None, Some(fill)) => {
            let _ = write!(out, ", {}", fill.value);
        }
        (None, None) => {}
    }
    out
}

/// Point description in `mode`; empty when the mode is off.
#[must_use]
pub fn describe(cue: &TextCue, mode: TextMode) -> String {
    match mode {
        TextMode::Off => String::new(),
        TextMode::Terse => terse(cue),
        TextMode::Verbose => verbose(cue),
    }
}

#[must_use]
pub fn layer_text(index: usize, size: usize, kind: TraceKind) -> String {
    format!("Layer {index} of {size}: {kind} plot")
}

/// Layer switch announcement; with several layers the new position is read
/// along with it.
#[must_use]
pub fn layer_switch_text(layer: &LayerState) -> String {
    let head = layer_text(layer.index, layer.size, layer.trace.kind);
    if layer.size <= 1 {
        return head;
    }
    let cue = &layer.trace.text;
    let mut parts = vec![
        format!("{} is {}", cue.main.label, cue.main.value),
        format!("{} is {}", cue.cross.label, cue.cross.value),
    ];
    if let Some(fill) = &cue.fill {
        parts.push(format!("{} is {}", fill.label, fill.value));
    }
    format!("{head} at {}", parts.join(", "))
}

#[must_use]
pub fn subplot_text(state: &SubplotState) -> String {
    let details = match state.kinds.as_slice() {
        [] => return "No plot info to display".to_owned(),
        [kind] => format!("This is a {kind} plot"),
        kinds => {
            let names: Vec<&str> = kinds.iter().map(|k| k.label()).collect();
            format!(
                "This is a multi-layered plot containing {} plots",
                names.join(", ")
            )
        }
    };
    format!(
        "Subplot {} of {}: {details}. Press 'ENTER' to select this subplot.",
        state.index, state.size
    )
}

// ---------------------------------------------------------------------------
// Observer
// ---------------------------------------------------------------------------

/// Formats every update and announces it.
pub struct TextObserver {
    mode: TextMode,
    narration: SharedNarration,
    current: Option<String>,
}

impl std::fmt::Debug for TextObserver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextObserver")
            .field("mode", &self.mode)
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

impl TextObserver {
    #[must_use]
    pub fn new(narration: SharedNarration) -> Self {
        Self {
            mode: TextMode::default(),
            narration,
            current: None,
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: TextMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn mode(&self) -> TextMode {
        self.mode
    }

    /// Latest point description, regardless of whether it was announced.
    #[must_use]
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Cycle the mode and announce it. Returns whether text is still on.
    pub fn toggle(&mut self) -> bool {
        self.mode = self.mode.next();
        tracing::info!(mode = self.mode.label(), "text mode toggled");
        announce(
            &self.narration,
            &format!("Text mode is {}", self.mode.label()),
        );
        self.mode != TextMode::Off
    }

    fn on_trace(&mut self, trace: &TraceState) {
        let text = match self.mode {
            TextMode::Terse => terse(&trace.text),
            TextMode::Verbose | TextMode::Off => verbose(&trace.text),
        };
        if self.mode != TextMode::Off {
            announce(&self.narration, &text);
        }
        self.current = Some(text);
    }
}

impl Observer<PlotUpdate> for TextObserver {
    fn update(&mut self, update: &PlotUpdate) {
        match update {
            PlotUpdate::Trace(trace) => self.on_trace(trace),
            PlotUpdate::Layer(layer) => {
                self.current = Some(describe(&layer.trace.text, self.mode));
                if self.mode != TextMode::Off {
                    announce(&self.narration, &layer_switch_text(layer));
                }
            }
            PlotUpdate::Subplot(subplot) => {
                if self.mode != TextMode::Off {
                    announce(&self.narration, &subplot_text(subplot));
                }
            }
            PlotUpdate::Boundary(notice) => announce(&self.narration, &notice.message()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chartnav_core::{Labeled, Panning, ValueRange};

    fn cue() -> TextCue {
        TextCue {
            main: Labeled::new("Month", "Jan"),
            cross: Labeled::new("Sales", 12.0),
            fill: None,
            section: None,
            range: None,
        }
    }

    #[test]
    fn plain_formats() {
        assert_eq!(verbose(&cue()), "Month is Jan, Sales is 12");
        assert_eq!(terse(&cue()), "Jan, 12");
    }

    #[test]
    fn heatmap_fill() {
        let mut c = cue();
        c.fill = Some(Labeled::new("Temp", 3.5));
        assert_eq!(verbose(&c), "Month is Jan, Sales is 12, Temp is 3.5");
        assert_eq!(terse(&c), "Jan, 12, 3.5");
    }

    #[test]
    fn box_outliers_count() {
        let mut c = cue();
        c.cross = Labeled::new("Y", vec![30.0, 41.0]);
        c.section = Some("Upper outlier(s)".to_owned());
        assert_eq!(verbose(&c), "Month is Jan, Y, 2 Upper outlier(s) are 30, 41");
        assert_eq!(terse(&c), "Jan, [30, 41], 2 Upper outlier(s)");
    }

    #[test]
    fn box_without_outliers_reads_section_only() {
        let mut c = cue();
        c.cross = Labeled::new("Y", Vec::new());
        c.section = Some("Upper outlier(s)".to_owned());
        assert_eq!(verbose(&c), "Month is Jan, Y, 0 Upper outlier(s)");
    }

    #[test]
    fn candle_field_and_trend() {
        let mut c = cue();
        c.cross = Labeled::new("Price", 105.0);
        c.section = Some("open".to_owned());
        c.fill = Some(Labeled::new("Trend", "bear"));
        assert_eq!(terse(&c), "Jan, 105, open bear");
    }

    #[test]
    fn bin_range_replaces_main() {
        let mut c = cue();
        c.main = Labeled::new("Score", 15.0);
        c.range = Some(ValueRange::new(10.0, 20.0));
        assert_eq!(verbose(&c), "Score is 10 through 20, Sales is 12");
    }

    #[test]
    fn subplot_descriptions() {
        let single = SubplotState {
            index: 1,
            size: 2,
            kinds: vec![TraceKind::Bar],
            panning: Panning::CENTER,
        };
        assert_eq!(
            subplot_text(&single),
            "Subplot 1 of 2: This is a bar plot. Press 'ENTER' to select this subplot."
        );
        let multi = SubplotState {
            kinds: vec![TraceKind::Bar, TraceKind::Line],
            ..single
        };
        assert!(subplot_text(&multi).contains("multi-layered plot containing bar, line plots"));
    }

    #[test]
    fn mode_cycle() {
        assert_eq!(TextMode::Verbose.next(), TextMode::Terse);
        assert_eq!(TextMode::Terse.next(), TextMode::Off);
        assert_eq!(TextMode::Off.next(), TextMode::Verbose);
    }
}
