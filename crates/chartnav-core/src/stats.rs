#![forbid(unsafe_code)]

//! Small statistics over numeric series.
//!
//! All helpers are total over non-empty input and return
//! [`SeriesError::EmptySeries`] otherwise; callers guard before calling.
//! Non-finite values are ignored.

use crate::error::SeriesError;
use crate::state::BoxSummary;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Closed interval `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Observed range of `values`.
    ///
    /// # Errors
    ///
    /// [`SeriesError::EmptySeries`] when no finite value is present.
    pub fn of(values: &[f64]) -> Result<Self, SeriesError> {
        let mut finite = values.iter().copied().filter(|v| v.is_finite());
        let first = finite.next().ok_or(SeriesError::EmptySeries)?;
        let (min, max) = finite.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
        Ok(Self { min, max })
    }

    /// Range over several rows at once.
    ///
    /// # Errors
    ///
    /// [`SeriesError::EmptySeries`] when every row is empty.
    pub fn of_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self, SeriesError> {
        let flat: Vec<f64> = rows.iter().flat_map(|r| r.as_ref().iter().copied()).collect();
        Self::of(&flat)
    }

    #[must_use]
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.span() == 0.0
    }
}

/// Linear map of `value` from `from` into `to`.
///
/// A degenerate source range maps everything to `to.min`.
#[must_use]
pub fn interpolate(value: f64, from: ValueRange, to: ValueRange) -> f64 {
    if from.is_degenerate() {
        return to.min;
    }
    let t = (value - from.min) / from.span();
    to.min + t * to.span()
}

/// Which extreme to look for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ExtremaKind {
    Min,
    Max,
}

impl ExtremaKind {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Min => "minimum",
            Self::Max => "maximum",
        }
    }
}

/// Every index whose value equals the extreme. Ties are all reported.
///
/// # Errors
///
/// [`SeriesError::EmptySeries`] when no finite value is present.
pub fn extrema_indices(values: &[f64], kind: ExtremaKind) -> Result<Vec<usize>, SeriesError> {
    let range = ValueRange::of(values)?;
    let target = match kind {
        ExtremaKind::Min => range.min,
        ExtremaKind::Max => range.max,
    };
    Ok(values
        .iter()
        .enumerate()
        .filter(|(_, v)| **v == target)
        .map(|(i, _)| i)
        .collect())
}

// ---------------------------------------------------------------------------
// Distributions
// ---------------------------------------------------------------------------

/// Finite samples, ascending.
fn sorted_finite(samples: &[f64]) -> Result<Vec<f64>, SeriesError> {
    let mut sorted: Vec<f64> = samples.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return Err(SeriesError::EmptySeries);
    }
    sorted.sort_by(f64::total_cmp);
    Ok(sorted)
}

/// Linearly interpolated quantile of ascending, non-empty `sorted`.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let h = (sorted.len() - 1) as f64 * q.clamp(0.0, 1.0);
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
}

/// Box summary of raw samples with Tukey fences at 1.5 × IQR.
///
/// Whiskers end on the most extreme samples inside the fences; samples
/// beyond them are outliers.
///
/// # Errors
///
/// [`SeriesError::EmptySeries`] when no finite sample is present.
pub fn box_summary(samples: &[f64]) -> Result<BoxSummary, SeriesError> {
    let sorted = sorted_finite(samples)?;
    let q1 = quantile(&sorted, 0.25);
    let median = quantile(&sorted, 0.5);
    let q3 = quantile(&sorted, 0.75);
    let fence = 1.5 * (q3 - q1);
    let (low, high) = (q1 - fence, q3 + fence);
    let inside: Vec<f64> = sorted.iter().copied().filter(|v| (low..=high).contains(v)).collect();
    Ok(BoxSummary {
        lower_outliers: sorted.iter().copied().filter(|v| *v < low).collect(),
        min: inside.first().copied().unwrap_or(q1).min(q1),
        q1,
        median,
        q3,
        max: inside.last().copied().unwrap_or(q3).max(q3),
        upper_outliers: sorted.iter().copied().filter(|v| *v > high).collect(),
    })
}

/// Gaussian kernel density of `samples`, evaluated at `levels` evenly
/// spaced values from the smallest to the largest sample.
///
/// The bandwidth follows Silverman's rule of thumb. A single distinct value
/// yields one level carrying all the density.
///
/// # Errors
///
/// [`SeriesError::EmptySeries`] when no finite sample is present.
pub fn kde(samples: &[f64], levels: usize) -> Result<Vec<(f64, f64)>, SeriesError> {
    let sorted = sorted_finite(samples)?;
    let range = ValueRange::new(sorted[0], sorted[sorted.len() - 1]);
    if range.is_degenerate() || levels < 2 {
        return Ok(vec![(range.min, 1.0)]);
    }
    let grid = even_grid(range, levels);
    let density = density_of(&sorted, &grid);
    Ok(grid.into_iter().zip(density).collect())
}

/// Kernel density of `samples` at each value of `grid`, with the bandwidth
/// of [`kde`]. Samples of one distinct value put density 1 on that value
/// and 0 elsewhere.
///
/// # Errors
///
/// [`SeriesError::EmptySeries`] when no finite sample is present.
pub fn kde_over(samples: &[f64], grid: &[f64]) -> Result<Vec<f64>, SeriesError> {
    let sorted = sorted_finite(samples)?;
    Ok(density_of(&sorted, grid))
}

/// `levels` evenly spaced values spanning `range`, ends included.
#[must_use]
pub fn even_grid(range: ValueRange, levels: usize) -> Vec<f64> {
    match levels {
        0 => Vec::new(),
        1 => vec![range.min],
        n => {
            let step = range.span() / (n - 1) as f64;
            (0..n).map(|i| range.min + step * i as f64).collect()
        }
    }
}

fn density_of(sorted: &[f64], grid: &[f64]) -> Vec<f64> {
    let range = ValueRange::new(sorted[0], sorted[sorted.len() - 1]);
    if range.is_degenerate() {
        return grid.iter().map(|y| if *y == range.min { 1.0 } else { 0.0 }).collect();
    }
    let n = sorted.len() as f64;
    let mean = sorted.iter().sum::<f64>() / n;
    let sd = (sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();
    let iqr = quantile(sorted, 0.75) - quantile(sorted, 0.25);
    let spread = if iqr > 0.0 { sd.min(iqr / 1.34) } else { sd };
    let bandwidth = 0.9 * spread * n.powf(-0.2);
    let norm = 1.0 / (n * bandwidth * (2.0 * std::f64::consts::PI).sqrt());
    grid.iter()
        .map(|y| {
            sorted
                .iter()
                .map(|v| (-0.5 * ((y - v) / bandwidth).powi(2)).exp())
                .sum::<f64>()
                * norm
        })
        .collect()
}
