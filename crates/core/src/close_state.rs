//! One-way closed flag shared by every session operation.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, error};

use crate::error::{Error, Result};

/// Atomic open/closed state that moves from open to closed at most once.
///
/// There is no way to reopen: the only mutators are [`soft_close`](Self::soft_close)
/// and [`mark_closed`](Self::mark_closed), both of which set the flag.
#[derive(Debug, Default)]
pub struct CloseState {
	closed: AtomicBool,
}

impl CloseState {
	/// Creates an open state.
	pub fn new() -> Self {
		Self {
			closed: AtomicBool::new(false),
		}
	}

	/// Returns `true` once the state has been closed.
	#[inline]
	pub fn is_closed(&self) -> bool {
		self.closed.load(Ordering::Acquire)
	}

	/// Marks the state closed. Idempotent.
	///
	/// `ledger` only labels the log line emitted on the transition.
	pub fn soft_close(&self, ledger: &str) {
		if self.mark_closed() {
			debug!(target = "ledger.session", ledger, "session soft closed");
		}
	}

	/// Sets the flag and returns `true` if this call performed the transition.
	pub(crate) fn mark_closed(&self) -> bool {
		!self.closed.swap(true, Ordering::AcqRel)
	}

	/// Fails with [`Error::SessionClosed`] if the state is closed.
	pub fn ensure_open(&self, ledger: &str) -> Result<()> {
		if self.is_closed() {
			error!(target = "ledger.session", ledger, "session is closed");
			return Err(Error::SessionClosed);
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use super::*;

	#[test]
	fn starts_open() {
		let state = CloseState::new();
		assert!(!state.is_closed());
		assert!(state.ensure_open("orders").is_ok());
	}

	#[test]
	fn soft_close_is_idempotent() {
		let state = CloseState::new();
		state.soft_close("orders");
		assert!(state.is_closed());
		state.soft_close("orders");
		assert!(state.is_closed());
	}

	#[test]
	fn ensure_open_fails_after_close() {
		let state = CloseState::new();
		state.soft_close("orders");
		assert!(matches!(state.ensure_open("orders"), Err(Error::SessionClosed)));
	}

	#[test]
	fn mark_closed_reports_only_first_transition() {
		let state = CloseState::new();
		assert!(state.mark_closed());
		assert!(!state.mark_closed());
		assert!(state.is_closed());
	}

	#[test]
	fn concurrent_closers_transition_exactly_once() {
		let state = Arc::new(CloseState::new());
		let handles: Vec<_> = (0..8)
			.map(|_| {
				let state = Arc::clone(&state);
				std::thread::spawn(move || state.mark_closed())
			})
			.collect();

		let transitions = handles.into_iter().map(|h| h.join().unwrap()).filter(|won| *won).count();
		assert_eq!(transitions, 1);
		assert!(state.is_closed());
	}
}
