#![forbid(unsafe_code)]

//! Braille rendering of whole series.
//!
//! A series is encoded once per trace into a line of Unicode braille cells
//! per row, each row terminated by `'\n'`. Two maps tie cells to data:
//! `cell_to_index[row][col]` gives the caret for a cursor position and
//! `index_to_cell[i]` routes a display position back to the cursor.
//!
//! | Series | Levels | Glyphs |
//! |---|---|---|
//! | bar | per-row quarters | `⠤ ⠒ ⠉`, blank for zero |
//! | heatmap | global thirds | `⠤ ⠒ ⠉`, blank for zero |
//! | line | per-row quarters, trend aware | 8-dot slopes (`⢄ ⡠ ⠔ …`) |
//! | candlestick | per-row thirds, trend aware | 6-dot slopes, dot 8 on bear candles |
//! | box | proportional width | `⠂` outliers, `⠒` whiskers, `⠿` quartiles, `⠸⠇` median |
//!
//! # Invariants
//!
//! - `index_to_cell.len()` equals the number of chars in the text.
//! - Every `cell_to_index` entry is a valid index into `index_to_cell`.

use chartnav_core::{
    BoxSummary, BrailleCue, BrailleSeries, Observer, PlotUpdate, Position, TraceState, ValueRange,
};

use crate::narration::{SharedNarration, announce};

/// Display width of a box row, in cells.
pub const BOX_WIDTH: usize = 32;

const NEWLINE: char = '\n';

/// Encoded series with its cell maps.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EncodedBraille {
    cells: Vec<char>,
    cell_to_index: Vec<Vec<usize>>,
    index_to_cell: Vec<Position>,
}

impl EncodedBraille {
    /// Full text, rows separated by newlines.
    #[must_use]
    pub fn text(&self) -> String {
        self.cells.iter().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Caret index for a cursor position.
    #[must_use]
    pub fn index_of(&self, pos: Position) -> Option<usize> {
        self.cell_to_index.get(pos.row)?.get(pos.col).copied()
    }

    /// Cursor position under display index `index`.
    #[must_use]
    pub fn cell_at(&self, index: usize) -> Option<Position> {
        self.index_to_cell.get(index).copied()
    }

    fn push(&mut self, glyph: char, row: usize, col: usize) {
        self.cells.push(glyph);
        self.index_to_cell.push(Position::new(row, col));
    }

    /// Append a row of one glyph per column plus its newline.
    fn push_row(&mut self, row: usize, glyphs: impl IntoIterator<Item = char>) {
        let mut map = Vec::new();
        for (col, glyph) in glyphs.into_iter().enumerate() {
            map.push(self.cells.len());
            self.push(glyph, row, col);
        }
        let end = map.len();
        map.push(self.cells.len());
        self.push(NEWLINE, row, end);
        self.cell_to_index.push(map);
    }
}

/// Encode a series.
#[must_use]
pub fn encode(series: &BrailleSeries) -> EncodedBraille {
    match series {
        BrailleSeries::Bar { rows } => encode_bar(rows),
        BrailleSeries::Heatmap { rows } => encode_heatmap(rows),
        BrailleSeries::Line { rows } => encode_line(rows),
        BrailleSeries::Candlestick { rows, bear } => encode_candlestick(rows, bear),
        BrailleSeries::Box { boxes, range } => encode_box(boxes, *range, BOX_WIDTH),
    }
}

fn row_range(row: &[f64]) -> ValueRange {
    ValueRange::of(row).unwrap_or(ValueRange::new(0.0, 0.0))
}

// ---------------------------------------------------------------------------
// Level encoders
// ---------------------------------------------------------------------------

fn encode_bar(rows: &[Vec<f64>]) -> EncodedBraille {
    let mut out = EncodedBraille::default();
    for (r, row) in rows.iter().enumerate() {
        let range = row_range(row);
        let step = range.span() / 4.0;
        let medium = range.min + 2.0 * step;
        let high = medium + step;
        out.push_row(
            r,
            row.iter().map(|&v| {
                if v == 0.0 {
                    ' '
                } else if v <= medium {
                    '⠤'
                } else if v <= high {
                    '⠒'
                } else {
                    '⠉'
                }
            }),
        );
    }
    out
}

fn encode_heatmap(rows: &[Vec<f64>]) -> EncodedBraille {
    let range = ValueRange::of_rows(rows).unwrap_or(ValueRange::new(0.0, 0.0));
    let step = range.span() / 3.0;
    let low = range.min + step;
    let medium = low + step;
    let mut out = EncodedBraille::default();
    for (r, row) in rows.iter().enumerate() {
        out.push_row(
            r,
            row.iter().map(|&v| {
                if v == 0.0 {
                    ' '
                } else if v <= low {
                    '⠤'
                } else if v <= medium {
                    '⠒'
                } else {
                    '⠉'
                }
            }),
        );
    }
    out
}

// ---------------------------------------------------------------------------
// Trend encoders
// ---------------------------------------------------------------------------

struct Thresholds {
    low: f64,
    medium: f64,
    medium_high: f64,
}

/// 8-dot glyph for `current`, sloped toward `prev`.
fn line_glyph(current: f64, prev: Option<f64>, t: &Thresholds) -> char {
    let Thresholds {
        low,
        medium,
        medium_high,
    } = *t;
    match prev {
        Some(p) if current <= low && p > low => {
            if p <= medium {
                '⢄'
            } else if p <= medium_high {
                '⢆'
            } else {
                '⢇'
            }
        }
        _ if current <= low => '⣀',
        Some(p) if p <= low => {
            if current <= medium {
                '⡠'
            } else if current <= medium_high {
                '⡰'
            } else {
                '⡸'
            }
        }
        Some(p) if current <= medium && p > medium => {
            if p <= medium_high { '⠢' } else { '⠣' }
        }
        _ if current <= medium => '⠤',
        Some(p) if p <= medium => {
            if current <= medium_high { '⠔' } else { '⠜' }
        }
        Some(p) if current <= medium_high && p > medium_high => '⠑',
        _ if current <= medium_high => '⠒',
        Some(p) if p <= medium_high => '⠊',
        _ => '⠉',
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Low,
    Medium,
    High,
}

fn level(v: f64, low: f64, medium: f64) -> Level {
    if v <= low {
        Level::Low
    } else if v <= medium {
        Level::Medium
    } else {
        Level::High
    }
}

/// 6-dot glyph for `current`, sloped toward `prev`.
fn candle_glyph(current: Level, prev: Option<Level>) -> char {
    use Level::{High, Low, Medium};
    match (current, prev) {
        (Low, Some(Medium)) => '⠢',
        (Low, Some(High)) => '⠣',
        (Low, _) => '⠤',
        (Medium, Some(Low)) => '⠔',
        (Medium, Some(High)) => '⠑',
        (Medium, _) => '⠒',
        (High, Some(Low)) => '⠜',
        (High, Some(Medium)) => '⠊',
        (High, _) => '⠉',
    }
}

/// Add dot 8 to a braille glyph.
fn with_dot8(glyph: char) -> char {
    let base = u32::from(glyph).saturating_sub(0x2800);
    char::from_u32(0x2800 + (base | 0x80)).unwrap_or(glyph)
}

fn encode_line(rows: &[Vec<f64>]) -> EncodedBraille {
    let mut out = EncodedBraille::default();
    for (r, row) in rows.iter().enumerate() {
        let range = row_range(row);
        let step = range.span() / 4.0;
        let t = Thresholds {
            low: range.min + step,
            medium: range.min + 2.0 * step,
            medium_high: range.min + 3.0 * step,
        };
        out.push_row(
            r,
            row.iter().enumerate().map(|(c, &v)| {
                let prev = c.checked_sub(1).map(|p| row[p]);
                line_glyph(v, prev, &t)
            }),
        );
    }
    out
}

fn encode_candlestick(rows: &[Vec<f64>], bear: &[bool]) -> EncodedBraille {
    let mut out = EncodedBraille::default();
    for (r, row) in rows.iter().enumerate() {
        let range = row_range(row);
        let step = range.span() / 3.0;
        let low = range.min + step;
        let medium = low + step;
        out.push_row(
            r,
            row.iter().enumerate().map(|(c, &v)| {
                let prev = c.checked_sub(1).map(|p| level(row[p], low, medium));
                let glyph = candle_glyph(level(v, low, medium), prev);
                if bear.get(c).copied().unwrap_or(false) {
                    with_dot8(glyph)
                } else {
                    glyph
                }
            }),
        );
    }
    out
}

// ---------------------------------------------------------------------------
// Box encoder
// ---------------------------------------------------------------------------

/// Box row sections, in column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Part {
    Blank,
    LowerOutlier,
    Min,
    Q1,
    Median,
    Q3,
    Max,
    UpperOutlier,
}

impl Part {
    /// Cursor column of the section, `None` for spacing.
    fn column(self) -> Option<usize> {
        match self {
            Self::Blank => None,
            Self::LowerOutlier => Some(0),
            Self::Min => Some(1),
            Self::Q1 => Some(2),
            Self::Median => Some(3),
            Self::Q3 => Some(4),
            Self::Max => Some(5),
            Self::UpperOutlier => Some(6),
        }
    }

    fn glyph(self, nth: usize) -> char {
        match self {
            Self::Min | Self::Max => '⠒',
            Self::Q1 | Self::Q3 => '⠿',
            Self::Median if nth == 0 => '⠸',
            Self::Median => '⠇',
            Self::LowerOutlier | Self::UpperOutlier => '⠂',
            Self::Blank => '⠀',
        }
    }

    fn resizable(self) -> bool {
        !matches!(self, Self::Blank | Self::Median)
    }
}

#[derive(Debug, Clone, Copy)]
struct Section {
    part: Part,
    length: f64,
    chars: i64,
}

const BOX_COLUMNS: usize = 7;
const MEDIAN_COLUMN: usize = 3;

/// Lay out one box as proportional sections totalling `width` cells.
fn box_sections(summary: &BoxSummary, range: ValueRange, width: usize) -> Vec<Section> {
    // (part, value); None marks the global bounds.
    let mut marks: Vec<(Option<Part>, f64)> = vec![(None, range.min)];
    marks.extend(summary.lower_outliers.iter().map(|&v| (Some(Part::LowerOutlier), v)));
    marks.extend([
        (Some(Part::Min), summary.min),
        (Some(Part::Q1), summary.q1),
        (Some(Part::Median), summary.median),
        (Some(Part::Q3), summary.q3),
        (Some(Part::Max), summary.max),
    ]);
    marks.extend(summary.upper_outliers.iter().map(|&v| (Some(Part::UpperOutlier), v)));
    marks.push((None, range.max));

    let mut sections = Vec::new();
    let mut before_median = true;
    for i in 0..marks.len() - 1 {
        let (part, value) = marks[i];
        let gap = if before_median {
            (marks[i + 1].1 - value).abs()
        } else {
            (value - marks[i - 1].1).abs()
        };
        match part {
            Some(p @ (Part::LowerOutlier | Part::UpperOutlier)) => {
                sections.push(Section { part: p, length: 0.0, chars: 1 });
                sections.push(Section { part: Part::Blank, length: gap, chars: 0 });
            }
            Some(Part::Median) => {
                before_median = false;
                sections.push(Section { part: Part::Median, length: 0.0, chars: 2 });
            }
            None => sections.push(Section { part: Part::Blank, length: gap, chars: 0 }),
            Some(p) => sections.push(Section { part: p, length: gap, chars: 1 }),
        }
    }

    let find = |part: Part, sections: &[Section], need_length: bool| {
        sections
            .iter()
            .rposition(|s| s.part == part && (!need_length || s.length > 0.0))
    };
    // The longer of each mirrored pair gets one extra cell.
    for (a, b, need_length) in [(Part::Min, Part::Max, true), (Part::Q1, Part::Q3, false)] {
        if let (Some(ia), Some(ib)) = (find(a, &sections, need_length), find(b, &sections, need_length))
        {
            if sections[ia].length > sections[ib].length {
                sections[ia].chars += 1;
            } else if sections[ib].length > sections[ia].length {
                sections[ib].chars += 1;
            }
        }
    }

    let width = i64::try_from(width).unwrap_or(i64::MAX);
    let reserved: i64 = sections.iter().map(|s| s.chars).sum();
    let available = (width - reserved).max(0) as f64;
    let total: f64 = sections
        .iter()
        .filter(|s| s.part != Part::Median && s.length > 0.0)
        .map(|s| s.length)
        .sum();
    if total > 0.0 {
        for s in sections.iter_mut() {
            if s.part != Part::Median && s.length > 0.0 {
                s.chars += (s.length / total * available).round() as i64;
            }
        }
    }

    // Absorb rounding drift in the data sections first, then in the spacing;
    // a data section never shrinks below one cell.
    let mut drift = width - sections.iter().map(|s| s.chars).sum::<i64>();
    let passes: [fn(&Section, i64) -> bool; 2] = [
        |s, drift| s.part.resizable() && s.length > 0.0 && (drift > 0 || s.chars > 1),
        |s, drift| s.part == Part::Blank && (drift > 0 || s.chars > 0),
    ];
    for eligible in passes {
        let mut idle = 0;
        let mut i = 0;
        while drift != 0 && idle < sections.len() {
            let n = sections.len();
            let s = &mut sections[i % n];
            if eligible(s, drift) {
                s.chars += drift.signum();
                drift -= drift.signum();
                idle = 0;
            } else {
                idle += 1;
            }
            i += 1;
        }
    }
    sections
}

fn encode_box(boxes: &[BoxSummary], range: ValueRange, width: usize) -> EncodedBraille {
    let mut out = EncodedBraille::default();
    for (row, summary) in boxes.iter().enumerate() {
        let mut map: [Option<usize>; BOX_COLUMNS] = [None; BOX_COLUMNS];
        let mut col = 0;
        for section in box_sections(summary, range, width) {
            if let Some(c) = section.part.column() {
                col = c;
                map[c] = Some(out.cells.len());
            }
            for nth in 0..usize::try_from(section.chars).unwrap_or(0) {
                out.push(section.part.glyph(nth), row, col);
            }
        }
        // Empty sections borrow the caret of their neighbour toward the median.
        for s in 0..MEDIAN_COLUMN {
            if map[s].is_none() {
                map[s] = (s + 1..=MEDIAN_COLUMN).find_map(|t| map[t]);
            }
        }
        for s in (MEDIAN_COLUMN + 1..BOX_COLUMNS).rev() {
            if map[s].is_none() {
                map[s] = (MEDIAN_COLUMN..s).rev().find_map(|t| map[t]);
            }
        }
        let newline = out.cells.len();
        out.push(NEWLINE, row, col);
        out.cell_to_index
            .push(map.iter().map(|m| m.unwrap_or(newline)).collect());
    }
    out
}

// ---------------------------------------------------------------------------
// Observer
// ---------------------------------------------------------------------------

/// What a braille display shows: the text and the caret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrailleFrame {
    pub text: String,
    pub caret: usize,
}

/// Keeps a braille rendering of the active trace, re-encoding only when the
/// trace changes.
pub struct BrailleObserver {
    enabled: bool,
    narration: SharedNarration,
    cache: Option<(String, EncodedBraille)>,
    last: Option<BrailleCue>,
    last_kind: Option<String>,
    frame: Option<BrailleFrame>,
    encodes: usize,
}

impl std::fmt::Debug for BrailleObserver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrailleObserver")
            .field("enabled", &self.enabled)
            .field("cached", &self.cache.as_ref().map(|(id, _)| id))
            .field("frame", &self.frame)
            .finish_non_exhaustive()
    }
}

impl BrailleObserver {
    #[must_use]
    pub fn new(narration: SharedNarration) -> Self {
        Self {
            enabled: false,
            narration,
            cache: None,
            last: None,
            last_kind: None,
            frame: None,
            encodes: 0,
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[must_use]
    pub fn frame(&self) -> Option<&BrailleFrame> {
        self.frame.as_ref()
    }

    /// How many times a series has been encoded.
    #[must_use]
    pub fn encode_count(&self) -> usize {
        self.encodes
    }

    /// Flip braille output and announce the result.
    ///
    /// Traces without a braille rendering are refused with a notice.
    pub fn toggle(&mut self) -> String {
        let message = match (&self.last, &self.last_kind) {
            (Some(_), _) => {
                self.enabled = !self.enabled;
                if self.enabled {
                    self.render();
                } else {
                    self.frame = None;
                }
                format!("Braille is {}", if self.enabled { "on" } else { "off" })
            }
            (None, Some(kind)) => format!("Braille is not supported for plot type: {kind}"),
            (None, None) => "No info for braille".to_owned(),
        };
        tracing::info!(enabled = self.enabled, "braille toggled");
        announce(&self.narration, &message);
        message
    }

    /// Cursor position under braille display index `index`.
    ///
    /// `None` while braille is off or the index is outside the rendering.
    #[must_use]
    pub fn route(&self, index: usize) -> Option<Position> {
        if !self.enabled {
            return None;
        }
        let (_, encoded) = self.cache.as_ref()?;
        encoded.cell_at(index)
    }

    fn on_trace(&mut self, trace: &TraceState) {
        self.last_kind = Some(trace.kind.label().to_owned());
        self.last = trace.braille.clone();
        if self.last.is_none() {
            self.frame = None;
        }
        if self.enabled {
            self.render();
        }
    }

    fn render(&mut self) {
        let Some(cue) = &self.last else {
            return;
        };
        let stale = self
            .cache
            .as_ref()
            .is_none_or(|(id, _)| *id != cue.trace_id);
        if stale {
            tracing::debug!(trace_id = %cue.trace_id, "encoding braille");
            self.cache = Some((cue.trace_id.clone(), encode(&cue.series)));
            self.encodes += 1;
        }
        if let Some((_, encoded)) = &self.cache {
            let text = encoded.text();
            let caret = encoded.index_of(cue.position).unwrap_or(0);
            self.frame = Some(BrailleFrame {
                text: text.trim_end_matches(NEWLINE).to_owned(),
                caret,
            });
        }
    }
}

impl Observer<PlotUpdate> for BrailleObserver {
    fn update(&mut self, update: &PlotUpdate) {
        if let Some(trace) = update.trace() {
            self.on_trace(trace);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_levels_per_row() {
        let enc = encode(&BrailleSeries::Bar {
            rows: vec![vec![0.0, 1.0, 5.0, 7.0, 10.0]],
        });
        assert_eq!(enc.text(), " ⠤⠤⠒⠉\n");
        assert_eq!(enc.index_of(Position::new(0, 4)), Some(4));
        assert_eq!(enc.cell_at(5), Some(Position::new(0, 5)));
    }

    #[test]
    fn heatmap_uses_global_thirds() {
        let enc = encode(&BrailleSeries::Heatmap {
            rows: vec![vec![1.0, 2.0], vec![3.0, 0.0]],
        });
        assert_eq!(enc.text(), "⠤⠒\n⠉ \n");
        assert_eq!(enc.index_of(Position::new(1, 0)), Some(3));
    }

    #[test]
    fn line_slopes_follow_previous() {
        let enc = encode(&BrailleSeries::Line {
            rows: vec![vec![0.0, 10.0, 0.0, 4.0]],
        });
        let cells: Vec<char> = enc.text().chars().collect();
        assert_eq!(cells[0], '⣀');
        assert_eq!(cells[1], '⡸');
        assert_eq!(cells[2], '⢇');
        assert_eq!(cells[3], '⡠');
    }

    #[test]
    fn bear_candles_get_dot8() {
        let enc = encode(&BrailleSeries::Candlestick {
            rows: vec![vec![1.0, 9.0]],
            bear: vec![false, true],
        });
        let cells: Vec<char> = enc.text().chars().collect();
        assert_eq!(cells[0], '⠤');
        assert_eq!(cells[1], with_dot8('⠜'));
        assert_eq!(u32::from(cells[1]) & 0x80, 0x80);
    }

    #[test]
    fn box_row_fills_width() {
        let summary = BoxSummary {
            lower_outliers: vec![],
            min: 2.0,
            q1: 4.0,
            median: 5.0,
            q3: 7.0,
            max: 9.0,
            upper_outliers: vec![12.0],
        };
        let enc = encode(&BrailleSeries::Box {
            boxes: vec![summary],
            range: ValueRange::new(0.0, 12.0),
        });
        assert_eq!(enc.len(), BOX_WIDTH + 1);
        let text = enc.text();
        assert!(text.contains('⠸'));
        assert!(text.contains('⠂'));
        // Missing lower outliers route to the whisker.
        assert_eq!(
            enc.index_of(Position::new(0, 0)),
            enc.index_of(Position::new(0, 1))
        );
        let median = enc.index_of(Position::new(0, 3)).unwrap();
        assert_eq!(enc.cell_at(median), Some(Position::new(0, 3)));
    }
}
