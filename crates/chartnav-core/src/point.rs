#![forbid(unsafe_code)]

//! Neutral description of the datum under the cursor.
//!
//! A [`Point`] is produced by a trace every time the cursor settles and is
//! never mutated afterwards. Every modality reads the same point, which is
//! what keeps audio, text, braille and highlight in agreement.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A datum value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Value {
    Number(f64),
    Category(String),
    /// Multi-value cell (stacked bars, outlier lists, several y values at one x).
    Numbers(Vec<f64>),
    Missing,
}

impl Value {
    /// The scalar numeric reading, if any.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Numbers(vs) if vs.len() == 1 => Some(vs[0]),
            _ => None,
        }
    }

    /// Every numeric reading carried by this value.
    #[must_use]
    pub fn numbers(&self) -> Vec<f64> {
        match self {
            Self::Number(v) => vec![*v],
            Self::Numbers(vs) => vs.clone(),
            Self::Category(_) | Self::Missing => Vec::new(),
        }
    }

    #[must_use]
    pub fn is_multi(&self) -> bool {
        matches!(self, Self::Numbers(vs) if vs.len() > 1)
    }

    /// No reading at all: absent, an empty list, or a non-finite number.
    /// Zero is a reading.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Number(v) => !v.is_finite(),
            Self::Numbers(vs) => vs.is_empty(),
            Self::Category(_) => false,
            Self::Missing => true,
        }
    }

    /// Zero, empty or absent. Sonified as the null tone.
    #[must_use]
    pub fn is_null(&self) -> bool {
        match self {
            Self::Number(v) => *v == 0.0,
            Self::Numbers(vs) => vs.is_empty(),
            Self::Category(_) => false,
            Self::Missing => true,
        }
    }
}

impl fmt::Display for Value {
    /// Multi-values are joined with `", "`; framing is left to formatters.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{v}"),
            Self::Category(s) => f.write_str(s),
            Self::Numbers(vs) => {
                for (i, v) in vs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{v}")?;
                }
                Ok(())
            }
            Self::Missing => Ok(()),
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Category(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Category(s)
    }
}

impl From<Vec<f64>> for Value {
    fn from(vs: Vec<f64>) -> Self {
        Self::Numbers(vs)
    }
}

// ---------------------------------------------------------------------------
// Segments
// ---------------------------------------------------------------------------

/// Which part of a composite mark the cursor sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Segment {
    #[default]
    Datum,
    LowerOutlier,
    Minimum,
    Q1,
    Median,
    Q3,
    Maximum,
    UpperOutlier,
    Open,
    High,
    Low,
    Close,
}

/// How a segment sounds, independent of its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentShape {
    /// A single datum, played with the default duration.
    Normal,
    /// Isolated points (outliers): shortened.
    Punctual,
    /// Spans (whiskers): lengthened.
    Extended,
    /// Box body: lengthened and doubled one octave below.
    Compound,
}

impl Segment {
    /// Box sections from bottom to top.
    pub const BOX: [Self; 7] = [
        Self::LowerOutlier,
        Self::Minimum,
        Self::Q1,
        Self::Median,
        Self::Q3,
        Self::Maximum,
        Self::UpperOutlier,
    ];

    /// Candle fields in price-reading order.
    pub const CANDLE: [Self; 4] = [Self::Open, Self::High, Self::Low, Self::Close];

    #[must_use]
    pub const fn shape(self) -> SegmentShape {
        match self {
            Self::LowerOutlier | Self::UpperOutlier => SegmentShape::Punctual,
            Self::Minimum | Self::Maximum => SegmentShape::Extended,
            Self::Q1 | Self::Median | Self::Q3 => SegmentShape::Compound,
            _ => SegmentShape::Normal,
        }
    }

    /// Section label used by text output, `None` for plain data.
    #[must_use]
    pub const fn label(self) -> Option<&'static str> {
        match self {
            Self::Datum => None,
            Self::LowerOutlier => Some("Lower outlier(s)"),
            Self::Minimum => Some("Minimum"),
            Self::Q1 => Some("25%"),
            Self::Median => Some("50%"),
            Self::Q3 => Some("75%"),
            Self::Maximum => Some("Maximum"),
            Self::UpperOutlier => Some("Upper outlier(s)"),
            Self::Open => Some("open"),
            Self::High => Some("high"),
            Self::Low => Some("low"),
            Self::Close => Some("close"),
        }
    }
}

// ---------------------------------------------------------------------------
// Point
// ---------------------------------------------------------------------------

/// The datum under the cursor.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point {
    /// Main-axis value (usually the category or x).
    pub value: Value,
    /// Cross-axis reading (usually the measured y).
    pub secondary: Option<Value>,
    /// Group or fill label for multi-series charts.
    pub group: Option<String>,
    /// Index of this member inside a multi-value cell.
    pub sub_index: Option<usize>,
    pub segment: Segment,
}

impl Point {
    #[must_use]
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            secondary: None,
            group: None,
            sub_index: None,
            segment: Segment::Datum,
        }
    }

    #[must_use]
    pub fn with_secondary(mut self, value: impl Into<Value>) -> Self {
        self.secondary = Some(value.into());
        self
    }

    #[must_use]
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    #[must_use]
    pub fn with_sub_index(mut self, index: usize) -> Self {
        self.sub_index = Some(index);
        self
    }

    #[must_use]
    pub fn with_segment(mut self, segment: Segment) -> Self {
        self.segment = segment;
        self
    }

    /// The value that gets sonified: the secondary reading if present.
    #[must_use]
    pub fn measure(&self) -> &Value {
        self.secondary.as_ref().unwrap_or(&self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_joins_members() {
        assert_eq!(Value::Numbers(vec![1.0, 2.5]).to_string(), "1, 2.5");
        assert_eq!(Value::Number(3.0).to_string(), "3");
        assert_eq!(Value::from("Sat").to_string(), "Sat");
    }

    #[test]
    fn empty_is_narrower_than_null() {
        assert!(Value::Missing.is_empty());
        assert!(Value::Number(f64::NAN).is_empty());
        assert!(!Value::Number(0.0).is_empty());
        assert!(Value::Number(0.0).is_null());
    }

    #[test]
    fn null_detection() {
        assert!(Value::Number(0.0).is_null());
        assert!(Value::Missing.is_null());
        assert!(Value::Numbers(vec![]).is_null());
        assert!(!Value::Number(0.5).is_null());
        assert!(!Value::from("a").is_null());
    }

    #[test]
    fn segment_shapes() {
        assert_eq!(Segment::UpperOutlier.shape(), SegmentShape::Punctual);
        assert_eq!(Segment::Maximum.shape(), SegmentShape::Extended);
        assert_eq!(Segment::Median.shape(), SegmentShape::Compound);
        assert_eq!(Segment::Close.shape(), SegmentShape::Normal);
        assert_eq!(Segment::Q1.label(), Some("25%"));
    }
}
