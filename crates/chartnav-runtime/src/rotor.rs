#![forbid(unsafe_code)]

//! Rotor: what the arrow keys seek.
//!
//! In [`RotorMode::Data`] arrows step point by point. In the value modes they
//! skip ahead to the next point strictly lower or higher than the one under
//! the cursor. The mode list wraps in both directions.

use chartnav_core::NavDirection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RotorMode {
    #[default]
    Data,
    Lower,
    Higher,
}

impl RotorMode {
    pub const ALL: [Self; 3] = [Self::Data, Self::Lower, Self::Higher];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Data => "Data point",
            Self::Lower => "Lower value",
            Self::Higher => "Higher value",
        }
    }

    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Data => Self::Lower,
            Self::Lower => Self::Higher,
            Self::Higher => Self::Data,
        }
    }

    #[must_use]
    pub const fn prev(self) -> Self {
        match self {
            Self::Data => Self::Higher,
            Self::Lower => Self::Data,
            Self::Higher => Self::Lower,
        }
    }

    /// Whether `candidate` is a hit when seeking from `current`.
    ///
    /// Data mode accepts any value; it never seeks.
    #[must_use]
    pub fn accepts(self, current: f64, candidate: f64) -> bool {
        match self {
            Self::Data => true,
            Self::Lower => candidate < current,
            Self::Higher => candidate > current,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Rotor {
    mode: RotorMode,
}

impl Rotor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn mode(&self) -> RotorMode {
        self.mode
    }

    /// Whether arrows seek values instead of stepping.
    #[must_use]
    pub fn is_seeking(&self) -> bool {
        self.mode != RotorMode::Data
    }

    pub fn next(&mut self) -> RotorMode {
        self.mode = self.mode.next();
        tracing::debug!(mode = self.mode.label(), "rotor");
        self.mode
    }

    pub fn prev(&mut self) -> RotorMode {
        self.mode = self.mode.prev();
        tracing::debug!(mode = self.mode.label(), "rotor");
        self.mode
    }

    pub fn reset(&mut self) {
        self.mode = RotorMode::Data;
    }

    /// Announcement for a seek that found nothing.
    #[must_use]
    pub fn not_found(&self, dir: NavDirection) -> String {
        format!("No {} found {}", self.mode.label().to_lowercase(), dir.side())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycling_wraps_both_ways() {
        let mut r = Rotor::new();
        assert_eq!(r.next(), RotorMode::Lower);
        assert_eq!(r.next(), RotorMode::Higher);
        assert_eq!(r.next(), RotorMode::Data);
        assert_eq!(r.prev(), RotorMode::Higher);
        for mode in RotorMode::ALL {
            assert_eq!(mode.next().prev(), mode);
        }
    }

    #[test]
    fn value_modes_are_strict() {
        assert!(RotorMode::Lower.accepts(3.0, 2.0));
        assert!(!RotorMode::Lower.accepts(3.0, 3.0));
        assert!(RotorMode::Higher.accepts(3.0, 4.0));
        assert!(!RotorMode::Higher.accepts(3.0, 3.0));
    }

    #[test]
    fn failure_message() {
        let mut r = Rotor::new();
        r.next();
        assert_eq!(r.not_found(NavDirection::Left), "No lower value found to the left");
        r.next();
        assert_eq!(r.not_found(NavDirection::Up), "No higher value found above");
    }
}
