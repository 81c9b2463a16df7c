#![forbid(unsafe_code)]

//! Timed repetition of a move.
//!
//! Autoplay is a pure timer: the caller passes the current [`Instant`] to
//! [`Autoplay::due`] and performs the move itself. The interval is chosen so
//! a full run towards the edge takes about
//! [`AutoplayConfig::total_duration_ms`], unless the user changed the speed,
//! in which case the user's interval sticks across runs.
//!
//! # Invariants
//!
//! 1. At most one run is active; starting a new run replaces the old one.
//! 2. The interval stays within `min_interval_ms..=max_interval_ms` of the
//!    run (the minimum widens to a shorter computed interval).

use std::time::Duration;

use chartnav_core::NavDirection;
use web_time::Instant;

use crate::config::AutoplayConfig;

#[derive(Debug, Clone)]
pub struct Autoplay {
    config: AutoplayConfig,
    direction: Option<NavDirection>,
    /// Interval of the current run.
    interval_ms: u64,
    /// Interval computed for the current run, the target of `reset_speed`.
    run_default_ms: u64,
    /// Lower bound for the current run.
    run_min_ms: u64,
    /// Interval chosen with speed-up/down; survives across runs.
    user_ms: Option<u64>,
    next_due: Option<Instant>,
}

impl Autoplay {
    #[must_use]
    pub fn new(config: AutoplayConfig) -> Self {
        Self {
            config,
            direction: None,
            interval_ms: config.default_interval_ms,
            run_default_ms: config.default_interval_ms,
            run_min_ms: config.min_interval_ms,
            user_ms: None,
            next_due: None,
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.direction.is_some()
    }

    #[must_use]
    pub fn direction(&self) -> Option<NavDirection> {
        self.direction
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Start moving towards `dir`, `steps` moves away from the edge.
    pub fn start(&mut self, dir: NavDirection, steps: usize, now: Instant) {
        let computed = if steps == 0 {
            self.config.default_interval_ms
        } else {
            self.config
                .total_duration_ms
                .div_ceil(steps as u64)
                .min(self.config.max_interval_ms)
        };
        self.run_default_ms = computed;
        self.run_min_ms = self.config.min_interval_ms.min(computed);
        self.interval_ms = self.user_ms.unwrap_or(computed);
        self.direction = Some(dir);
        self.next_due = Some(now + self.interval());
        tracing::debug!(?dir, steps, interval_ms = self.interval_ms, "autoplay started");
    }

    /// Returns whether a run was active.
    pub fn stop(&mut self) -> bool {
        let was = self.direction.take().is_some();
        self.next_due = None;
        if was {
            tracing::debug!("autoplay stopped");
        }
        was
    }

    /// The direction to move in when a step is due at `now`.
    pub fn due(&mut self, now: Instant) -> Option<NavDirection> {
        let dir = self.direction?;
        let due = self.next_due?;
        if now < due {
            return None;
        }
        self.next_due = Some(now + self.interval());
        Some(dir)
    }

    /// Shorten the interval by one step, down to the run minimum.
    pub fn speed_up(&mut self, now: Instant) -> &'static str {
        let faster = self.interval_ms.saturating_sub(self.config.step_ms);
        if faster > self.run_min_ms {
            self.set_user(faster, now);
            "Speed up"
        } else {
            "Max speed"
        }
    }

    /// Lengthen the interval by one step, up to the configured maximum.
    pub fn speed_down(&mut self, now: Instant) -> &'static str {
        let slower = self.interval_ms + self.config.step_ms;
        if slower <= self.config.max_interval_ms {
            self.set_user(slower, now);
            "Speed down"
        } else {
            "Min speed"
        }
    }

    /// Forget the user's speed and go back to the run's computed interval.
    pub fn reset_speed(&mut self, now: Instant) -> &'static str {
        self.user_ms = None;
        self.interval_ms = self.run_default_ms;
        self.restart(now);
        "Reset speed"
    }

    fn set_user(&mut self, interval_ms: u64, now: Instant) {
        self.user_ms = Some(interval_ms);
        self.interval_ms = interval_ms;
        self.restart(now);
        tracing::debug!(interval_ms, "autoplay speed");
    }

    fn restart(&mut self, now: Instant) {
        if self.is_running() {
            self.next_due = Some(now + self.interval());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn interval_spreads_total_over_steps_up_to_max() {
        let mut a = Autoplay::new(AutoplayConfig::default());
        a.start(NavDirection::Right, 40, Instant::now());
        assert_eq!(a.interval(), ms(100));
        a.start(NavDirection::Right, 7, Instant::now());
        assert_eq!(a.interval(), ms(500));
        a.start(NavDirection::Right, 0, Instant::now());
        assert_eq!(a.interval(), ms(250));
    }

    #[test]
    fn due_fires_once_per_interval() {
        let mut a = Autoplay::new(AutoplayConfig::default());
        let t0 = Instant::now();
        a.start(NavDirection::Left, 40, t0);
        assert_eq!(a.interval(), ms(100));
        assert_eq!(a.due(t0 + ms(50)), None);
        assert_eq!(a.due(t0 + ms(100)), Some(NavDirection::Left));
        assert_eq!(a.due(t0 + ms(150)), None);
        assert_eq!(a.due(t0 + ms(200)), Some(NavDirection::Left));
        assert!(a.stop());
        assert_eq!(a.due(t0 + ms(1000)), None);
        assert!(!a.stop());
    }

    #[test]
    fn speed_limits() {
        let mut a = Autoplay::new(AutoplayConfig::default());
        let t0 = Instant::now();
        a.start(NavDirection::Right, 40, t0);
        assert_eq!(a.speed_up(t0), "Speed up");
        assert_eq!(a.interval(), ms(80));
        assert_eq!(a.speed_up(t0), "Speed up");
        assert_eq!(a.speed_up(t0), "Max speed");
        assert_eq!(a.interval(), ms(60));
        assert_eq!(a.reset_speed(t0), "Reset speed");
        assert_eq!(a.interval(), ms(100));

        a.start(NavDirection::Right, 8, t0);
        assert_eq!(a.interval(), ms(500));
        assert_eq!(a.speed_down(t0), "Min speed");
    }

    #[test]
    fn user_speed_survives_new_runs() {
        let mut a = Autoplay::new(AutoplayConfig::default());
        let t0 = Instant::now();
        a.start(NavDirection::Right, 40, t0);
        a.speed_down(t0);
        a.stop();
        a.start(NavDirection::Up, 4, t0);
        assert_eq!(a.interval(), ms(120));
    }
}
