//! In-memory session handle for exercising session lifecycle without a ledger service.
//!
//! # Example
//!
//! ```ignore
//! let (handle, controller) = FakeHandleBuilder::new().ledger("orders").build();
//! let session = BaseSession::new(handle, &SessionConfig::default())?;
//!
//! controller.fail_aborts(TransportError::Closed);
//! assert!(!session.abort_or_close());
//! assert_eq!(controller.abort_calls(), 1);
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::error::TransportError;
use crate::handle::{AbortFuture, AsyncSessionHandle, SessionHandle, SessionIdentity};

#[derive(Debug, Default)]
struct Shared {
	abort_calls: AtomicUsize,
	abort_failure: Mutex<Option<TransportError>>,
}

/// Builder for fake handles.
#[derive(Debug, Clone)]
pub struct FakeHandleBuilder {
	ledger_name: String,
	token: String,
}

impl FakeHandleBuilder {
	pub fn new() -> Self {
		Self {
			ledger_name: "test-ledger".to_string(),
			token: "test-session-token".to_string(),
		}
	}

	pub fn ledger(mut self, ledger_name: impl Into<String>) -> Self {
		self.ledger_name = ledger_name.into();
		self
	}

	pub fn token(mut self, token: impl Into<String>) -> Self {
		self.token = token.into();
		self
	}

	/// Builds the handle and a controller sharing its state.
	pub fn build(self) -> (FakeSessionHandle, FakeHandleController) {
		let shared = Arc::new(Shared::default());
		let handle = FakeSessionHandle {
			ledger_name: self.ledger_name,
			token: self.token,
			shared: Arc::clone(&shared),
		};
		(handle, FakeHandleController { shared })
	}
}

impl Default for FakeHandleBuilder {
	fn default() -> Self {
		Self::new()
	}
}

/// Controls abort outcomes and inspects abort traffic of a [`FakeSessionHandle`].
#[derive(Debug, Clone)]
pub struct FakeHandleController {
	shared: Arc<Shared>,
}

impl FakeHandleController {
	/// Makes every subsequent abort fail with `err`.
	pub fn fail_aborts(&self, err: TransportError) {
		*self.shared.abort_failure.lock() = Some(err);
	}

	/// Makes every subsequent abort succeed.
	pub fn succeed_aborts(&self) {
		*self.shared.abort_failure.lock() = None;
	}

	/// Number of aborts sent so far.
	pub fn abort_calls(&self) -> usize {
		self.shared.abort_calls.load(Ordering::SeqCst)
	}
}

/// Session handle whose aborts are scripted by a [`FakeHandleController`].
#[derive(Debug)]
pub struct FakeSessionHandle {
	ledger_name: String,
	token: String,
	shared: Arc<Shared>,
}

impl FakeSessionHandle {
	fn record_abort(&self) -> Result<(), TransportError> {
		self.shared.abort_calls.fetch_add(1, Ordering::SeqCst);
		match self.shared.abort_failure.lock().clone() {
			Some(err) => Err(err),
			None => Ok(()),
		}
	}
}

impl SessionIdentity for FakeSessionHandle {
	fn ledger_name(&self) -> &str {
		&self.ledger_name
	}

	fn token(&self) -> &str {
		&self.token
	}
}

impl SessionHandle for FakeSessionHandle {
	fn send_abort(&self) -> Result<(), TransportError> {
		self.record_abort()
	}
}

impl AsyncSessionHandle for FakeSessionHandle {
	fn send_abort(&self) -> AbortFuture<'_> {
		Box::pin(async move {
			tokio::task::yield_now().await;
			self.record_abort()
		})
	}
}
