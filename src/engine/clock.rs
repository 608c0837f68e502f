use std::{cell::Cell, rc::Rc, time::Instant};

use chrono::{DateTime, Duration, Local};

/// Time source for the engine.
///
/// `now` is monotonic seconds used for every note timestamp. `wall_time`
/// only names rendered files.
pub trait Clock {
    fn now(&self) -> f64;
    fn wall_time(&self) -> DateTime<Local>;
}

pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
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
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }

    fn wall_time(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Hand-driven clock. Clones share the same time, so a test can keep one
/// and advance it while the engine owns another.
#[derive(Debug, Clone)]
pub struct ManualClock {
    seconds: Rc<Cell<f64>>,
    wall_origin: DateTime<Local>,
}

impl ManualClock {
    pub fn new(wall_origin: DateTime<Local>) -> Self {
        Self {
            seconds: Rc::new(Cell::new(0.0)),
            wall_origin,
        }
    }

    pub fn set(&self, seconds: f64) {
        self.seconds.set(seconds);
    }

    pub fn advance(&self, seconds: f64) {
        self.seconds.set(self.seconds.get() + seconds);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.seconds.get()
    }

    fn wall_time(&self) -> DateTime<Local> {
        let elapsed = Duration::milliseconds((self.seconds.get() * 1000.0).round() as i64);
        self.wall_origin + elapsed
    }
}
