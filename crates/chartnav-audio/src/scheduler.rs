#![forbid(unsafe_code)]

//! Deferred tasks for voice cleanup.
//!
//! Each tone schedules its own cleanup strictly after its envelope ends.
//! A task closes over only the voice ids it releases, so overlapping tones
//! never interfere.
//!
//! - [`ThreadScheduler`] runs each task on a detached thread after sleeping.
//! - [`ManualScheduler`] keeps a virtual clock advanced by tests.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

/// A deferred unit of work.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Runs tasks after a delay.
pub trait Scheduler: Send + Sync {
    fn schedule(&self, delay: Duration, task: Task);
}

pub(crate) fn lock<T: ?Sized>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// ThreadScheduler
// ---------------------------------------------------------------------------

/// Wall-clock scheduler backed by detached threads.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadScheduler;

impl Scheduler for ThreadScheduler {
    fn schedule(&self, delay: Duration, task: Task) {
        let spawned = thread::Builder::new()
            .name("chartnav-audio-cleanup".into())
            .spawn(move || {
                thread::sleep(delay);
                task();
            });
        if let Err(err) = spawned {
            tracing::warn!(%err, "failed to spawn cleanup thread");
        }
    }
}

// ---------------------------------------------------------------------------
// ManualScheduler
// ---------------------------------------------------------------------------

struct Pending {
    due: Duration,
    seq: u64,
    task: Task,
}

#[derive(Default)]
struct ManualInner {
    now: Duration,
    seq: u64,
    queue: Vec<Pending>,
}

/// Deterministic scheduler driven by [`ManualScheduler::advance`].
///
/// Clones share the same clock and queue.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    inner: Arc<Mutex<ManualInner>>,
}

impl std::fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = lock(&self.inner);
        f.debug_struct("ManualScheduler")
            .field("now", &inner.now)
            .field("pending", &inner.queue.len())
            .finish()
    }
}

impl ManualScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    #[must_use]
    pub fn now(&self) -> Duration {
        lock(&self.inner).now
    }

    /// Number of tasks not yet run.
    #[must_use]
    pub fn pending(&self) -> usize {
        lock(&self.inner).queue.len()
    }

    /// Move the clock forward by `by`, running every task that falls due in
    /// due-time order (ties in scheduling order).
    ///
    /// Tasks run without the internal lock held, so they may schedule more
    /// work; anything due within the window also runs.
    pub fn advance(&self, by: Duration) {
        let target = lock(&self.inner).now + by;
        loop {
            let next = {
                let mut inner = lock(&self.inner);
                let idx = inner
                    .queue
                    .iter()
                    .enumerate()
                    .filter(|(_, p)| p.due <= target)
                    .min_by_key(|(_, p)| (p.due, p.seq))
                    .map(|(i, _)| i);
                match idx {
                    Some(i) => {
                        let pending = inner.queue.swap_remove(i);
                        inner.now = pending.due;
                        Some(pending.task)
                    }
                    None => {
                        inner.now = target;
                        None
                    }
                }
            };
            match next {
                Some(task) => task(),
                None => break,
            }
        }
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: Task) {
        let mut inner = lock(&self.inner);
        let due = inner.now + delay;
        let seq = inner.seq;
        inner.seq += 1;
        inner.queue.push(Pending { due, seq, task });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn manual_runs_in_due_order() {
        let sched = ManualScheduler::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        for (delay, tag) in [(30, "c"), (10, "a"), (20, "b"), (10, "a2")] {
            let log = log.clone();
            sched.schedule(
                Duration::from_millis(delay),
                Box::new(move || log.lock().unwrap().push(tag)),
            );
        }
        sched.advance(Duration::from_millis(15));
        assert_eq!(*log.lock().unwrap(), vec!["a", "a2"]);
        assert_eq!(sched.pending(), 2);
        sched.advance(Duration::from_millis(100));
        assert_eq!(*log.lock().unwrap(), vec!["a", "a2", "b", "c"]);
        assert_eq!(sched.now(), Duration::from_millis(115));
    }

    #[test]
    fn tasks_may_reschedule() {
        let sched = ManualScheduler::new();
        let hits = Arc::new(Mutex::new(0));
        let inner_sched = sched.clone();
        let inner_hits = hits.clone();
        sched.schedule(
            Duration::from_millis(5),
            Box::new(move || {
                *inner_hits.lock().unwrap() += 1;
                let again = inner_hits.clone();
                inner_sched.schedule(
                    Duration::from_millis(5),
                    Box::new(move || *again.lock().unwrap() += 1),
                );
            }),
        );
        sched.advance(Duration::from_millis(20));
        assert_eq!(*hits.lock().unwrap(), 2);
    }

    #[test]
    fn thread_scheduler_runs_task() {
        let (tx, rx) = mpsc::channel();
        ThreadScheduler.schedule(
            Duration::from_millis(1),
            Box::new(move || {
                let _ = tx.send(42);
            }),
        );
        assert_eq!(rx.recv_timeout(Duration::from_secs(5)), Ok(42));
    }
}
