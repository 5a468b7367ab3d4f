//! Condition waiter.
//!
//! Blocks the calling thread until a status check returns a target value or
//! a timeout elapses. The controller has no asynchronous notification, so
//! this is a bounded polling loop: status is at most one poll interval stale.
//! Each call owns its own timing window and keeps no state between calls.

use std::convert::Infallible;
use std::fmt;
use std::thread;
use std::time::{Duration, Instant};
use tracing::trace;

/// A check never reached its target within the bound.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeoutError<T> {
    /// Last value observed, `None` if no check completed.
    pub last: Option<T>,
    /// Value waited for.
    pub target: T,
    /// Configured bound.
    pub timeout: Duration,
    /// Wall-clock time spent waiting.
    pub elapsed: Duration,
}

impl<T: fmt::Debug> fmt::Display for TimeoutError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "condition not met after {:?} (timeout {:?}): last {:?}, target {:?}",
            self.elapsed, self.timeout, self.last, self.target
        )
    }
}

impl<T: fmt::Debug> std::error::Error for TimeoutError<T> {}

/// Failure of a fallible wait.
#[derive(Debug, Clone, PartialEq)]
pub enum WaitError<T, E> {
    /// Bound elapsed before the target was observed.
    Timeout(TimeoutError<T>),
    /// The check itself failed; waiting stopped.
    Check(E),
}

/// Poll `check` until it returns `target` or `timeout` elapses.
///
/// The check runs immediately. A check error aborts the wait.
pub fn try_wait_until<T, E, P>(
    mut check: P,
    target: T,
    poll_interval: Duration,
    timeout: Duration,
) -> Result<(), WaitError<T, E>>
where
    T: PartialEq + fmt::Debug,
    P: FnMut() -> Result<T, E>,
{
    let start = Instant::now();
    let mut polls: u32 = 0;

    loop {
        let value = check().map_err(WaitError::Check)?;
        polls += 1;
        if value == target {
            trace!(polls, elapsed = ?start.elapsed(), "condition met");
            return Ok(());
        }

        let elapsed = start.elapsed();
        if elapsed >= timeout {
            return Err(WaitError::Timeout(TimeoutError {
                last: Some(value),
                target,
                timeout,
                elapsed,
            }));
        }

        trace!(polls, last = ?value, target = ?target, "condition not met, sleeping");
        // Never sleep past the deadline by more than the final check.
        thread::sleep(poll_interval.min(timeout - elapsed));
    }
}

/// Poll an infallible `check` until it returns `target` or `timeout` elapses.
pub fn wait_until<T, P>(
    mut check: P,
    target: T,
    poll_interval: Duration,
    timeout: Duration,
) -> Result<(), TimeoutError<T>>
where
    T: PartialEq + fmt::Debug,
    P: FnMut() -> T,
{
    try_wait_until(
        || Ok::<T, Infallible>(check()),
        target,
        poll_interval,
        timeout,
    )
    .map_err(|e| match e {
        WaitError::Timeout(t) => t,
        WaitError::Check(never) => match never {},
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn first_match_uses_one_check() {
        let calls = Cell::new(0);
        let result = wait_until(
            || {
                calls.set(calls.get() + 1);
                true
            },
            true,
            Duration::from_millis(100),
            Duration::from_secs(1),
        );
        assert!(result.is_ok());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn never_matching_check_times_out_within_bounded_overshoot() {
        let start = Instant::now();
        let err = wait_until(
            || false,
            true,
            Duration::from_millis(100),
            Duration::from_secs(1),
        )
        .unwrap_err();
        let elapsed = start.elapsed();

        assert!(elapsed >= Duration::from_secs(1), "returned early: {elapsed:?}");
        assert!(elapsed <= Duration::from_millis(1200), "overshoot: {elapsed:?}");
        assert_eq!(err.last, Some(false));
        assert!(err.target);
        assert!(err.elapsed >= err.timeout);
    }

    #[test]
    fn matches_after_a_few_polls() {
        let calls = Cell::new(0u32);
        wait_until(
            || {
                calls.set(calls.get() + 1);
                calls.get() >= 3
            },
            true,
            Duration::from_millis(10),
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn check_error_stops_waiting() {
        let calls = Cell::new(0u32);
        let err = try_wait_until(
            || {
                calls.set(calls.get() + 1);
                Err::<bool, _>("link down")
            },
            true,
            Duration::from_millis(10),
            Duration::from_secs(1),
        )
        .unwrap_err();
        assert_eq!(err, WaitError::Check("link down"));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn each_wait_starts_a_fresh_window() {
        for _ in 0..2 {
            let start = Instant::now();
            let _ = wait_until(|| 0, 1, Duration::from_millis(20), Duration::from_millis(100));
            assert!(start.elapsed() >= Duration::from_millis(100));
        }
    }
}
