//! Cooperative interruption signal for blocking and async waits.
//!
//! An [`Interrupt`] is the cancellation state of a calling context. Whoever
//! owns the work (a supervisor, a watchdog thread, a shutdown hook) calls
//! [`Interrupt::interrupt`]; waits in this crate return early and leave the
//! signal set so the enclosing loop can observe it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tokio::sync::Notify;

#[derive(Debug, Default)]
struct Inner {
	flag: AtomicBool,
	lock: Mutex<()>,
	cvar: Condvar,
	notify: Notify,
}

/// Cloneable interruption handle; clones share one signal.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
	inner: Arc<Inner>,
}

impl Interrupt {
	pub fn new() -> Self {
		Self::default()
	}

	/// Raises the signal and wakes every blocked or pending waiter.
	pub fn interrupt(&self) {
		self.inner.flag.store(true, Ordering::Release);
		// Waiters check the flag under this lock before parking.
		drop(self.inner.lock.lock());
		self.inner.cvar.notify_all();
		self.inner.notify.notify_waiters();
	}

	#[inline]
	pub fn is_interrupted(&self) -> bool {
		self.inner.flag.load(Ordering::Acquire)
	}

	/// Lowers the signal. Only the owner of the interrupted work should call this.
	pub fn clear(&self) {
		self.inner.flag.store(false, Ordering::Release);
	}

	/// Blocks the current thread for `duration` or until interrupted.
	///
	/// Returns `true` if the wait ended because of the signal.
	pub fn wait_timeout(&self, duration: Duration) -> bool {
		let deadline = Instant::now() + duration;
		let mut guard = self.inner.lock.lock();
		while !self.is_interrupted() {
			if self.inner.cvar.wait_until(&mut guard, deadline).timed_out() {
				return self.is_interrupted();
			}
		}
		true
	}

	/// Resolves once the signal is raised. Resolves immediately if already set.
	pub async fn interrupted(&self) {
		loop {
			// Registered on creation, so a raise between here and the check is not lost.
			let notified = self.inner.notify.notified();
			if self.is_interrupted() {
				return;
			}
			notified.await;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn wait_runs_to_deadline_without_signal() {
		let interrupt = Interrupt::new();
		let start = Instant::now();
		assert!(!interrupt.wait_timeout(Duration::from_millis(20)));
		assert!(start.elapsed() >= Duration::from_millis(20));
	}

	#[test]
	fn wait_returns_immediately_when_already_set() {
		let interrupt = Interrupt::new();
		interrupt.interrupt();
		let start = Instant::now();
		assert!(interrupt.wait_timeout(Duration::from_secs(5)));
		assert!(start.elapsed() < Duration::from_secs(1));
	}

	#[test]
	fn signal_from_other_thread_wakes_waiter() {
		let interrupt = Interrupt::new();
		let remote = interrupt.clone();
		let handle = std::thread::spawn(move || {
			std::thread::sleep(Duration::from_millis(20));
			remote.interrupt();
		});

		let start = Instant::now();
		assert!(interrupt.wait_timeout(Duration::from_secs(10)));
		assert!(start.elapsed() < Duration::from_secs(5));
		assert!(interrupt.is_interrupted());
		handle.join().unwrap();
	}

	#[test]
	fn clear_lowers_signal() {
		let interrupt = Interrupt::new();
		interrupt.interrupt();
		interrupt.clear();
		assert!(!interrupt.is_interrupted());
	}

	#[tokio::test]
	async fn async_waiter_wakes_on_signal() {
		let interrupt = Interrupt::new();
		let remote = interrupt.clone();
		tokio::spawn(async move {
			tokio::time::sleep(Duration::from_millis(10)).await;
			remote.interrupt();
		});

		tokio::time::timeout(Duration::from_secs(5), interrupt.interrupted())
			.await
			.expect("interrupted() should resolve");
		assert!(interrupt.is_interrupted());
	}
}
