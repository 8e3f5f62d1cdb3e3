//! Clocks and cancellable deadlines for paced transitions.
//!
//! Pacing is cosmetic: a deadline only decides when the next phase becomes
//! visible. Deadlines are owned by the runner that scheduled them; dropping
//! the owner cancels them, so an outside timer holding a [`CancelToken`]
//! can tell the transition it was waiting for will never happen.
use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Monotonic time since some fixed origin.
pub trait Clock {
    fn now(&self) -> Duration;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Duration {
        (**self).now()
    }
}

/// Wall clock measured from construction.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Hand-driven clock for tests and replays.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Duration>,
}

impl ManualClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// Clock following `tokio::time`, so paused test runtimes control it.
#[cfg(feature = "async")]
#[derive(Debug, Clone, Copy)]
pub struct TokioClock {
    origin: tokio::time::Instant,
}

#[cfg(feature = "async")]
impl TokioClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: tokio::time::Instant::now(),
        }
    }
}

#[cfg(feature = "async")]
impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "async")]
impl Clock for TokioClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Observer side of a [`TimerHandle`].
#[derive(Debug, Clone)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
    /// True once the owning handle fired, was cancelled, or was dropped.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

/// A single pending deadline. Cancelled on drop.
#[derive(Debug)]
pub struct TimerHandle {
    due: Duration,
    flag: Rc<Cell<bool>>,
}

impl TimerHandle {
    #[must_use]
    pub fn schedule(now: Duration, delay: Duration) -> Self {
        Self {
            due: now + delay,
            flag: Rc::new(Cell::new(false)),
        }
    }

    #[must_use]
    pub const fn due(&self) -> Duration {
        self.due
    }

    #[must_use]
    pub fn is_due(&self, now: Duration) -> bool {
        now >= self.due
    }

    #[must_use]
    pub fn remaining(&self, now: Duration) -> Duration {
        self.due.saturating_sub(now)
    }

    #[must_use]
    pub fn token(&self) -> CancelToken {
        CancelToken(Rc::clone(&self.flag))
    }

    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.flag.set(true);
    }
}
