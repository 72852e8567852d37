//! Error types for ledger sessions.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures reported by a session handle's transport.
///
/// Handle implementations map their wire-level failures onto these variants.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
	#[error("communication with the ledger service failed: {0}")]
	Communication(String),

	#[error("transport is closed")]
	Closed,

	#[error("request timed out: {0}")]
	Timeout(String),
}

/// Errors surfaced by session lifecycle and retry operations.
#[derive(Debug, Error)]
pub enum Error {
	/// The session was used after it was closed.
	#[error("session is closed")]
	SessionClosed,

	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Every permitted retry failed.
	#[error("retries exhausted after {attempts} attempts: {last}")]
	RetriesExhausted { attempts: u32, last: Box<Error> },

	/// The interrupt signal was raised while retrying.
	#[error("retry interrupted")]
	Interrupted,

	#[error("invalid session config: {0}")]
	InvalidConfig(String),

	#[error("io error: {0}")]
	Io(#[from] std::io::Error),

	#[error("json error: {0}")]
	Json(#[from] serde_json::Error),
}

impl Error {
	/// Returns `true` when another attempt may succeed.
	///
	/// Only transport failures qualify; misuse and configuration errors never do.
	pub fn is_retryable(&self) -> bool {
		matches!(self, Error::Transport(_))
	}

	/// Returns `true` for the closed-session misuse error.
	pub fn is_session_closed(&self) -> bool {
		matches!(self, Error::SessionClosed)
	}
}
