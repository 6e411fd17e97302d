use std::cell::Cell;
use std::rc::Rc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

// ---------------------------------------------------------------------------
// Time sources
// ---------------------------------------------------------------------------

/// Source of "current time" in seconds.
///
/// The controller only ever subtracts two readings, so the epoch is
/// irrelevant; what matters is that readings never decrease.
pub trait Clock {
    fn now(&self) -> f64;
}

impl<F: Fn() -> f64> Clock for F {
    fn now(&self) -> f64 {
        self()
    }
}

/// Wall clock: seconds since the UNIX epoch.
///
/// Subject to NTP and manual adjustment. Prefer [`MonotonicClock`] when the
/// host clock may step backwards.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            // Host clock set before 1970: report a negative offset.
            .unwrap_or_else(|e| -e.duration().as_secs_f64())
    }
}

/// Monotonic clock: seconds elapsed since the clock was created.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Manually driven clock.
///
/// Clones share the same time, so a test can keep one handle and give the
/// other to a controller.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    time: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new(start: f64) -> Self {
        Self { time: Rc::new(Cell::new(start)) }
    }

    pub fn set(&self, time: f64) {
        self.time.set(time);
    }

    pub fn advance(&self, dt: f64) {
        self.time.set(self.time.get() + dt);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.time.get()
    }
}
