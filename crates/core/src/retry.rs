//! Bounded retry loops over a base session.
//!
//! Attempt `0` is the first try. After a retryable failure the loop sleeps
//! with the backoff for the next attempt number and tries again, up to
//! `retry_limit` retries. The session must be open before every attempt.

use std::future::Future;

use tracing::{debug, warn};

use crate::backoff::{retry_sleep, retry_sleep_async};
use crate::error::{Error, Result};
use crate::handle::SessionIdentity;
use crate::interrupt::Interrupt;
use crate::session::BaseSession;

enum Next {
	Retry(u32),
	Stop(Error),
}

fn after_failure<H: SessionIdentity>(session: &BaseSession<H>, attempt: u32, err: Error) -> Next {
	if !err.is_retryable() {
		return Next::Stop(err);
	}
	if attempt >= session.retry_limit() {
		warn!(
			target = "ledger.session",
			ledger = %session.ledger_name(),
			attempts = attempt + 1,
			error = %err,
			"retries exhausted"
		);
		return Next::Stop(Error::RetriesExhausted {
			attempts: attempt + 1,
			last: Box::new(err),
		});
	}
	debug!(
		target = "ledger.session",
		ledger = %session.ledger_name(),
		attempt = attempt + 1,
		error = %err,
		"retrying after transient failure"
	);
	Next::Retry(attempt + 1)
}

/// Runs `op` until it succeeds, fails permanently, or the retry limit is spent.
///
/// `op` receives the attempt number. Returns [`Error::Interrupted`] if the
/// interrupt is raised before an attempt or during a backoff sleep; the
/// interrupt is left raised.
pub fn execute<H, T, F>(session: &BaseSession<H>, interrupt: &Interrupt, mut op: F) -> Result<T>
where
	H: SessionIdentity,
	F: FnMut(u32) -> Result<T>,
{
	let mut attempt = 0;
	loop {
		if interrupt.is_interrupted() {
			return Err(Error::Interrupted);
		}
		session.ensure_open()?;

		let err = match op(attempt) {
			Ok(value) => return Ok(value),
			Err(err) => err,
		};
		attempt = match after_failure(session, attempt, err) {
			Next::Retry(next) => next,
			Next::Stop(err) => return Err(err),
		};

		if retry_sleep(attempt, interrupt).is_interrupted() {
			return Err(Error::Interrupted);
		}
	}
}

/// Async form of [`execute`]. Backoff sleeps suspend only the calling task.
pub async fn execute_async<H, T, F, Fut>(session: &BaseSession<H>, interrupt: &Interrupt, mut op: F) -> Result<T>
where
	H: SessionIdentity,
	F: FnMut(u32) -> Fut,
	Fut: Future<Output = Result<T>>,
{
	let mut attempt = 0;
	loop {
		if interrupt.is_interrupted() {
			return Err(Error::Interrupted);
		}
		session.ensure_open()?;

		let err = match op(attempt).await {
			Ok(value) => return Ok(value),
			Err(err) => err,
		};
		attempt = match after_failure(session, attempt, err) {
			Next::Retry(next) => next,
			Next::Stop(err) => return Err(err),
		};

		if retry_sleep_async(attempt, interrupt).await.is_interrupted() {
			return Err(Error::Interrupted);
		}
	}
}

#[cfg(test)]
mod tests {
	use std::cell::Cell;

	use super::*;
	use crate::config::SessionConfig;
	use crate::error::TransportError;
	use crate::fake_handle::{FakeHandleBuilder, FakeSessionHandle};

	fn session(retry_limit: u32) -> BaseSession<FakeSessionHandle> {
		let (handle, _) = FakeHandleBuilder::new().build();
		BaseSession::new(handle, &SessionConfig::default().with_retry_limit(retry_limit)).unwrap()
	}

	fn transient() -> Error {
		TransportError::Communication("throttled".into()).into()
	}

	#[test]
	fn returns_first_success() {
		let session = session(3);
		let value = execute(&session, &Interrupt::new(), |attempt| Ok(attempt)).unwrap();
		assert_eq!(value, 0);
	}

	#[test]
	fn retries_transient_failures() {
		let session = session(3);
		let value = execute(&session, &Interrupt::new(), |attempt| if attempt < 2 { Err(transient()) } else { Ok("done") }).unwrap();
		assert_eq!(value, "done");
	}

	#[test]
	fn stops_after_retry_limit() {
		let session = session(2);
		let calls = Cell::new(0);
		let err = execute(&session, &Interrupt::new(), |_| -> Result<()> {
			calls.set(calls.get() + 1);
			Err(transient())
		})
		.unwrap_err();

		assert_eq!(calls.get(), 3);
		match err {
			Error::RetriesExhausted { attempts, last } => {
				assert_eq!(attempts, 3);
				assert!(last.is_retryable());
			}
			other => panic!("expected RetriesExhausted, got {other:?}"),
		}
	}

	#[test]
	fn zero_limit_means_single_attempt() {
		let session = session(0);
		let calls = Cell::new(0);
		let err = execute(&session, &Interrupt::new(), |_| -> Result<()> {
			calls.set(calls.get() + 1);
			Err(transient())
		})
		.unwrap_err();
		assert_eq!(calls.get(), 1);
		assert!(matches!(err, Error::RetriesExhausted { attempts: 1, .. }));
	}

	#[test]
	fn permanent_failure_is_not_retried() {
		let session = session(5);
		let calls = Cell::new(0);
		let err = execute(&session, &Interrupt::new(), |_| -> Result<()> {
			calls.set(calls.get() + 1);
			Err(Error::InvalidConfig("bad statement".into()))
		})
		.unwrap_err();
		assert_eq!(calls.get(), 1);
		assert!(matches!(err, Error::InvalidConfig(_)));
	}

	#[test]
	fn closed_session_is_rejected_before_work() {
		let session = session(3);
		session.soft_close();
		let err = execute(&session, &Interrupt::new(), |_| Ok(())).unwrap_err();
		assert!(err.is_session_closed());
	}

	#[test]
	fn session_closed_mid_retry_stops_loop() {
		let session = session(3);
		let err = execute(&session, &Interrupt::new(), |_| -> Result<()> {
			session.soft_close();
			Err(transient())
		})
		.unwrap_err();
		assert!(err.is_session_closed());
	}

	#[test]
	fn raised_interrupt_stops_before_attempt() {
		let session = session(3);
		let interrupt = Interrupt::new();
		interrupt.interrupt();
		let err = execute(&session, &interrupt, |_| Ok(())).unwrap_err();
		assert!(matches!(err, Error::Interrupted));
		assert!(interrupt.is_interrupted());
	}

	#[tokio::test(start_paused = true)]
	async fn async_retries_then_succeeds() {
		let session = session(4);
		let value = execute_async(&session, &Interrupt::new(), |attempt| async move {
			if attempt < 3 { Err(transient()) } else { Ok(attempt) }
		})
		.await
		.unwrap();
		assert_eq!(value, 3);
	}

	#[tokio::test(start_paused = true)]
	async fn async_exhausts_limit() {
		let session = session(1);
		let err = execute_async(&session, &Interrupt::new(), |_| async { Err::<(), _>(transient()) })
			.await
			.unwrap_err();
		assert!(matches!(err, Error::RetriesExhausted { attempts: 2, .. }));
	}
}
