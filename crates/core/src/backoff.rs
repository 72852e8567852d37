//! Exponential backoff with full jitter between retried attempts.
//!
//! The delay for attempt `n` is `jitter * (min(cap, base^n) + 1)` milliseconds,
//! with `jitter` uniform in `[0, 1)`. From attempt 3 on the exponential term
//! is saturated at the cap, so the delay is uniform in `[0, 5001)` ms.
//!
//! Both sleeps honor an [`Interrupt`]: when it is raised the sleep returns
//! [`SleepOutcome::Interrupted`] early and the signal stays raised.

use std::time::Duration;

use tracing::{debug, trace};

use crate::interrupt::Interrupt;

/// Base of the exponential term, in milliseconds.
pub const SLEEP_BASE_MS: u64 = 10;
/// Upper bound of the exponential term, in milliseconds.
pub const SLEEP_CAP_MS: u64 = 5000;

/// How a backoff sleep ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SleepOutcome {
	/// The full delay elapsed.
	Elapsed,
	/// The interrupt was raised before the delay elapsed.
	Interrupted,
}

impl SleepOutcome {
	pub fn is_interrupted(self) -> bool {
		self == SleepOutcome::Interrupted
	}
}

/// `min(SLEEP_CAP_MS, SLEEP_BASE_MS^attempt)`.
pub fn exponential_ms(attempt: u32) -> u64 {
	SLEEP_BASE_MS.checked_pow(attempt).map_or(SLEEP_CAP_MS, |ms| ms.min(SLEEP_CAP_MS))
}

/// Exclusive upper bound of the delay for `attempt`, in milliseconds.
pub fn upper_bound_ms(attempt: u32) -> u64 {
	exponential_ms(attempt) + 1
}

/// Delay for `attempt` given a jitter sample in `[0, 1)`, truncated to whole milliseconds.
pub fn delay_from_jitter(attempt: u32, jitter: f64) -> Duration {
	debug_assert!((0.0..1.0).contains(&jitter), "jitter must lie in [0, 1)");
	let ms = jitter * upper_bound_ms(attempt) as f64;
	Duration::from_millis(ms as u64)
}

/// Randomized delay for `attempt`.
pub fn retry_delay(attempt: u32) -> Duration {
	delay_from_jitter(attempt, rand::random::<f64>())
}

/// Blocks the calling thread for the backoff delay of `attempt`.
pub fn retry_sleep(attempt: u32, interrupt: &Interrupt) -> SleepOutcome {
	let delay = retry_delay(attempt);
	trace!(target = "ledger.session", attempt, delay_ms = delay.as_millis() as u64, "retry sleep");

	if interrupt.wait_timeout(delay) {
		debug!(target = "ledger.session", attempt, "retry sleep interrupted");
		SleepOutcome::Interrupted
	} else {
		SleepOutcome::Elapsed
	}
}

/// Async counterpart of [`retry_sleep`]; suspends only the calling task.
///
/// Dropping the future cancels the sleep as well.
pub async fn retry_sleep_async(attempt: u32, interrupt: &Interrupt) -> SleepOutcome {
	let delay = retry_delay(attempt);
	trace!(target = "ledger.session", attempt, delay_ms = delay.as_millis() as u64, "retry sleep");

	let outcome = sleep_async(delay, interrupt).await;
	if outcome.is_interrupted() {
		debug!(target = "ledger.session", attempt, "retry sleep interrupted");
	}
	outcome
}

async fn sleep_async(delay: Duration, interrupt: &Interrupt) -> SleepOutcome {
	tokio::select! {
		biased;
		_ = interrupt.interrupted() => SleepOutcome::Interrupted,
		_ = tokio::time::sleep(delay) => SleepOutcome::Elapsed,
	}
}
