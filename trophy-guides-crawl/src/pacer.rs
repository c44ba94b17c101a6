//! Request pacing.
//!
//! Upstream sites throttle aggressive crawlers, so every external request
//! waits for its turn: at least `request_delay` after the previous one.
//! Time goes through a [`Clock`] so tests can run a full crawl without
//! sleeping.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Default delay between two external requests.
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_secs(2);

/// Longest single sleep while waiting out a cancellable pause.
const PAUSE_SLICE: Duration = Duration::from_millis(500);

/// Source of time for pacing and cooldowns.
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration);
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// A clock that only moves when slept on. Records every sleep.
#[derive(Debug)]
pub struct ManualClock {
    start: Instant,
    elapsed: Mutex<Duration>,
    sleeps: Mutex<Vec<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            elapsed: Mutex::new(Duration::ZERO),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    /// Move time forward without recording a sleep.
    pub fn advance(&self, duration: Duration) {
        if let Ok(mut elapsed) = self.elapsed.lock() {
            *elapsed += duration;
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed.lock().map(|e| *e).unwrap_or_default()
    }

    /// Every sleep requested so far, in order.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.start + self.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration);
        if let Ok(mut sleeps) = self.sleeps.lock() {
            sleeps.push(duration);
        }
    }
}

/// Enforces a minimum gap between external requests.
pub struct Pacer {
    clock: Arc<dyn Clock>,
    request_delay: Duration,
    last_request: Option<Instant>,
    requests: usize,
}

impl Pacer {
    pub fn new(request_delay: Duration) -> Self {
        Self::with_clock(request_delay, Arc::new(SystemClock))
    }

    pub fn with_clock(request_delay: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            request_delay,
            last_request: None,
            requests: 0,
        }
    }

    /// Block until the next request may go out, then claim the slot.
    pub fn wait_turn(&mut self) {
        if let Some(last) = self.last_request {
            let elapsed = self.clock.now().saturating_duration_since(last);
            if elapsed < self.request_delay {
                self.clock.sleep(self.request_delay - elapsed);
            }
        }
        self.last_request = Some(self.clock.now());
        self.requests += 1;
    }

    /// Sleep for `duration`, waking early if `cancel` gets set.
    ///
    /// Returns `false` if the pause was cut short.
    pub fn pause(&self, duration: Duration, cancel: &AtomicBool) -> bool {
        let mut remaining = duration;
        while !remaining.is_zero() {
            if cancel.load(Ordering::Relaxed) {
                return false;
            }
            let slice = remaining.min(PAUSE_SLICE);
            self.clock.sleep(slice);
            remaining -= slice;
        }
        !cancel.load(Ordering::Relaxed)
    }

    /// Total requests paced so far.
    pub fn requests(&self) -> usize {
        self.requests
    }

    pub fn request_delay(&self) -> Duration {
        self.request_delay
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }
}

#[cfg(test)]
#[path = "tests/pacer_tests.rs"]
mod tests;
