//! Fixed-period tick scheduling

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// How long tick history is kept for interval statistics
const HISTORY_WINDOW: Duration = Duration::from_secs(15);

/// Tick interval statistics over the history window
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TickStats {
    pub avg_interval_ms: f32,
    pub max_interval_ms: f32,
    pub tick_count: u64,
}

/// Decides when the next engine tick is due.
///
/// Missed deadlines are skipped rather than replayed, so a stalled host
/// never produces a burst of back-to-back ticks.
pub struct TickTimer {
    period: Duration,
    next_deadline: Instant,
    last_tick: Option<Instant>,
    tick_count: u64,
    /// Ring buffer of (timestamp, interval_secs)
    history: VecDeque<(Instant, f32)>,
}

impl TickTimer {
    /// Create a timer whose first tick is due immediately
    pub fn new(period: Duration) -> Self {
        Self::starting_at(period, Instant::now())
    }

    /// Create a timer whose first tick is due at `first`
    pub fn starting_at(period: Duration, first: Instant) -> Self {
        Self {
            period: period.max(Duration::from_millis(1)),
            next_deadline: first,
            last_tick: None,
            tick_count: 0,
            history: VecDeque::new(),
        }
    }

    /// Configured tick period
    pub fn period(&self) -> Duration {
        self.period
    }

    /// When the next tick is due
    pub fn next_deadline(&self) -> Instant {
        self.next_deadline
    }

    /// Total ticks fired
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Returns `true` and schedules the following deadline if a tick is due at `now`.
    pub fn poll(&mut self, now: Instant) -> bool {
        if now < self.next_deadline {
            return false;
        }

        if let Some(last) = self.last_tick {
            self.history.push_back((now, (now - last).as_secs_f32()));
        }
        self.last_tick = Some(now);
        self.tick_count += 1;

        // Skip any deadlines that passed while we were late
        self.next_deadline += self.period;
        if self.next_deadline <= now {
            let behind = now - self.next_deadline;
            let skipped = (behind.as_nanos() / self.period.as_nanos()) as u32 + 1;
            self.next_deadline += self.period * skipped;
        }

        let cutoff = now.checked_sub(HISTORY_WINDOW).unwrap_or(now);
        while let Some(&(timestamp, _)) = self.history.front() {
            if timestamp < cutoff {
                self.history.pop_front();
            } else {
                break;
            }
        }

        true
    }

    /// Interval statistics over the last 15 seconds
    pub fn stats(&self) -> TickStats {
        let count = self.history.len();
        let (total, max) = self
            .history
            .iter()
            .fold((0.0f32, 0.0f32), |(sum, max), &(_, dt)| (sum + dt, max.max(dt)));

        TickStats {
            avg_interval_ms: if count > 0 { total / count as f32 * 1000.0 } else { 0.0 },
            max_interval_ms: max * 1000.0,
            tick_count: self.tick_count,
        }
    }
}
