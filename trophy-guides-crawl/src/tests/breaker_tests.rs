use super::*;
use std::sync::Arc;

use crate::pacer::ManualClock;

fn health(errors: usize, attempts: usize, found: usize) -> BatchHealth {
    BatchHealth {
        errors,
        attempts,
        found,
    }
}

fn breaker() -> CircuitBreaker {
    CircuitBreaker::new(BreakerConfig::default())
}

#[test]
fn healthy_batches_stay_closed() {
    let mut b = breaker();
    assert!(!b.record(health(0, 1, 50)));
    assert!(!b.record(health(3, 1, 50)));
    assert_eq!(b.state(), BreakerState::Closed);
    assert_eq!(b.errors(), 3);
}

#[test]
fn errors_accumulate_until_threshold_exceeded() {
    let mut b = breaker();
    assert!(!b.record(health(6, 4, 10)));
    assert!(!b.record(health(4, 4, 10)));
    assert_eq!(b.errors(), 10);
    assert!(b.record(health(1, 4, 10)));
    assert_eq!(b.state(), BreakerState::Open);
    assert_eq!(b.trips(), 1);
}

#[test]
fn clean_productive_batch_resets_counter() {
    let mut b = breaker();
    b.record(health(8, 4, 10));
    b.record(health(0, 4, 10));
    assert_eq!(b.errors(), 0);
    assert!(!b.record(health(8, 4, 10)));
}

#[test]
fn empty_result_with_attempts_opens() {
    let mut b = breaker();
    assert!(b.record(health(0, 3, 0)));
    assert_eq!(b.state(), BreakerState::Open);
}

#[test]
fn empty_result_without_attempts_is_fine() {
    let mut b = breaker();
    assert!(!b.record(health(0, 0, 0)));
}

#[test]
fn cooldown_then_half_open_then_closed() {
    let clock = Arc::new(ManualClock::new());
    let pacer = Pacer::with_clock(Duration::ZERO, clock.clone());
    let cancel = AtomicBool::new(false);
    let mut b = breaker();

    b.record(health(11, 1, 5));
    assert!(b.cool_down(&pacer, &cancel));
    assert_eq!(clock.elapsed(), DEFAULT_COOLDOWN);
    assert_eq!(b.state(), BreakerState::HalfOpen);
    assert_eq!(b.errors(), 0);

    assert!(!b.record(health(0, 1, 5)));
    assert_eq!(b.state(), BreakerState::Closed);
}

#[test]
fn half_open_failure_reopens() {
    let clock = Arc::new(ManualClock::new());
    let pacer = Pacer::with_clock(Duration::ZERO, clock);
    let cancel = AtomicBool::new(false);
    let mut b = breaker();

    b.record(health(0, 2, 0));
    b.cool_down(&pacer, &cancel);
    assert!(b.record(health(0, 2, 0)));
    assert_eq!(b.state(), BreakerState::Open);
    assert_eq!(b.trips(), 2);
}
