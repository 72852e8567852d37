//! Base session shared by the blocking and async ledger sessions.
//!
//! Higher-level sessions call [`BaseSession::ensure_open`] before issuing
//! work, and [`BaseSession::abort_or_close`] (or its async twin) when the
//! transport fails in a way they cannot recover from.
//!
//! # Thread Safety
//!
//! `BaseSession` is `Send + Sync` whenever its handle is, and can be shared
//! with `Arc` between a worker and a watchdog. Only the closed flag is
//! synchronized: aborting while another operation is in flight on the same
//! handle abandons that operation's state. Callers must serialize use of
//! the handle around `abort_or_close`.

use tracing::{debug, trace};

use crate::close_state::CloseState;
use crate::config::SessionConfig;
use crate::error::{Result, TransportError};
use crate::handle::{AsyncSessionHandle, SessionHandle, SessionIdentity};

/// A session handle plus its one-way closed state.
#[derive(Debug)]
pub struct BaseSession<H> {
	handle: H,
	state: CloseState,
	retry_limit: u32,
}

impl<H: SessionIdentity> BaseSession<H> {
	/// Wraps an established handle. The session starts open.
	///
	/// Fails with [`Error::InvalidConfig`](crate::Error::InvalidConfig) if `config` does not validate.
	pub fn new(handle: H, config: &SessionConfig) -> Result<Self> {
		config.validate()?;
		Ok(Self {
			handle,
			state: CloseState::new(),
			retry_limit: config.retry_limit,
		})
	}

	pub fn ledger_name(&self) -> &str {
		self.handle.ledger_name()
	}

	pub fn session_token(&self) -> &str {
		self.handle.token()
	}

	/// Maximum number of retries after the first attempt.
	pub fn retry_limit(&self) -> u32 {
		self.retry_limit
	}

	pub fn handle(&self) -> &H {
		&self.handle
	}

	pub fn is_closed(&self) -> bool {
		self.state.is_closed()
	}

	/// Marks the session closed without notifying the service.
	pub fn soft_close(&self) {
		self.state.soft_close(self.ledger_name());
	}

	/// Fails with [`Error::SessionClosed`](crate::Error::SessionClosed) if the session may no longer be used.
	pub fn ensure_open(&self) -> Result<()> {
		self.state.ensure_open(self.ledger_name())
	}

	fn settle_abort(&self, result: std::result::Result<(), TransportError>) -> bool {
		match result {
			Ok(()) => {
				trace!(target = "ledger.session", ledger = %self.ledger_name(), "session aborted and idle");
				true
			}
			Err(err) => {
				debug!(
					target = "ledger.session",
					ledger = %self.ledger_name(),
					error = %err,
					"abort failed; closing session"
				);
				self.state.mark_closed();
				false
			}
		}
	}
}

impl<H: SessionHandle> BaseSession<H> {
	/// Sends an abort to return the session to idle, closing it if that fails.
	///
	/// Returns `true` if the abort succeeded and the session remains usable,
	/// `false` if the session was already closed (no abort is sent) or is now
	/// closed because the abort failed. Only call when no other work is in
	/// flight on this session.
	pub fn abort_or_close(&self) -> bool {
		if self.state.is_closed() {
			return false;
		}
		self.settle_abort(SessionHandle::send_abort(&self.handle))
	}
}

impl<H: AsyncSessionHandle> BaseSession<H> {
	/// Async form of [`BaseSession::abort_or_close`] with the same contract.
	pub async fn abort_or_close_async(&self) -> bool {
		if self.state.is_closed() {
			return false;
		}
		let result = AsyncSessionHandle::send_abort(&self.handle).await;
		self.settle_abort(result)
	}
}
