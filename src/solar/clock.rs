//! Civil time sources.

use std::sync::{Arc, Mutex};

use chrono::{NaiveDateTime, TimeDelta, Utc};

/// Source of the current civil (local) date and time
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Wall clock shifted by a fixed timezone offset
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    offset: TimeDelta,
}

impl SystemClock {
    /// `timezone_hours` is the civil offset from UTC
    pub fn new(timezone_hours: f64) -> Self {
        let millis = (timezone_hours * 3_600_000.0).round() as i64;
        Self {
            offset: TimeDelta::try_milliseconds(millis).unwrap_or_else(TimeDelta::zero),
        }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Utc::now().naive_utc() + self.offset
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Clone, Debug)]
pub struct ManualClock {
    now: Arc<Mutex<NaiveDateTime>>,
}

impl ManualClock {
    pub fn new(start: NaiveDateTime) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn set(&self, time: NaiveDateTime) {
        if let Ok(mut now) = self.now.lock() {
            *now = time;
        }
    }

    pub fn advance(&self, delta: TimeDelta) {
        if let Ok(mut now) = self.now.lock() {
            *now += delta;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        match self.now.lock() {
            Ok(now) => *now,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}
