//! Circuit breaker for suspected upstream rate limiting.
//!
//! ```text
//!            errors > threshold, or attempts with nothing found
//!   Closed ──────────────────────────────────────────────────▶ Open
//!     ▲                                                         │
//!     │ batch ok                                  cooldown over │
//!     │                                                         ▼
//!     └───────────────────────── HalfOpen ◀─────────────────────┘
//!                                   │  batch fails again
//!                                   └────────────────────▶ Open
//! ```
//!
//! The breaker never aborts a run. Opening only means "wait out the
//! cooldown before the next batch".

use std::sync::atomic::AtomicBool;
use std::time::Duration;

use crate::pacer::Pacer;

/// Default number of accumulated errors that opens the breaker.
pub const DEFAULT_ERROR_THRESHOLD: usize = 10;

/// Default cooldown while open.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakerConfig {
    /// The breaker opens once accumulated errors exceed this.
    pub error_threshold: usize,
    pub cooldown: Duration,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            error_threshold: DEFAULT_ERROR_THRESHOLD,
            cooldown: DEFAULT_COOLDOWN,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

/// What one batch looked like, as far as the breaker cares.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchHealth {
    pub errors: usize,
    pub attempts: usize,
    pub found: usize,
}

impl BatchHealth {
    /// External requests were made but nothing came back.
    pub fn came_back_empty(&self) -> bool {
        self.attempts > 0 && self.found == 0
    }
}

#[derive(Debug)]
pub struct CircuitBreaker {
    config: BreakerConfig,
    state: BreakerState,
    errors: usize,
    trips: usize,
}

impl CircuitBreaker {
    pub fn new(config: BreakerConfig) -> Self {
        Self {
            config,
            state: BreakerState::Closed,
            errors: 0,
            trips: 0,
        }
    }

    pub fn state(&self) -> BreakerState {
        self.state
    }

    /// Errors accumulated since the last reset.
    pub fn errors(&self) -> usize {
        self.errors
    }

    /// How many times the breaker has opened.
    pub fn trips(&self) -> usize {
        self.trips
    }

    pub fn config(&self) -> &BreakerConfig {
        &self.config
    }

    /// Feed a finished batch. Returns `true` if the breaker is now open.
    pub fn record(&mut self, health: BatchHealth) -> bool {
        if self.state == BreakerState::Open {
            return true;
        }

        self.errors += health.errors;
        let failed = self.errors > self.config.error_threshold || health.came_back_empty();

        if failed {
            self.state = BreakerState::Open;
            self.trips += 1;
            log::warn!(
                "Circuit breaker open: {} errors, {} attempts, {} found",
                self.errors,
                health.attempts,
                health.found
            );
            return true;
        }

        if self.state == BreakerState::HalfOpen {
            log::info!("Circuit breaker closed after a healthy batch");
        }
        self.state = BreakerState::Closed;
        if health.errors == 0 && health.found > 0 {
            self.errors = 0;
        }
        false
    }

    /// Wait out the cooldown and move to half-open with a reset counter.
    ///
    /// Returns `false` if cancelled during the wait; the state still moves
    /// to half-open.
    pub fn cool_down(&mut self, pacer: &Pacer, cancel: &AtomicBool) -> bool {
        let completed = pacer.pause(self.config.cooldown, cancel);
        self.state = BreakerState::HalfOpen;
        self.errors = 0;
        completed
    }
}

#[cfg(test)]
#[path = "tests/breaker_tests.rs"]
mod tests;
