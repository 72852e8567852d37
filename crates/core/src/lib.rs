//! Session lifecycle and retry backoff shared by ledger session implementations.
//!
//! This crate is the foundation beneath the blocking and async ledger sessions.
//! It owns two things:
//! * A one-way "closed" flag guarding every unit of work issued on a session
//! * The exponential-backoff-with-jitter sleep used between retried attempts
//!
//! The wire protocol, transactions, and statement execution live in the
//! transport behind [`SessionHandle`] / [`AsyncSessionHandle`].

pub mod backoff;
pub mod close_state;
pub mod config;
pub mod error;
pub mod fake_handle;
pub mod handle;
pub mod interrupt;
pub mod retry;
pub mod session;

pub use backoff::{SleepOutcome, retry_delay, retry_sleep, retry_sleep_async};
pub use close_state::CloseState;
pub use config::SessionConfig;
pub use error::{Error, Result, TransportError};
pub use handle::{AbortFuture, AsyncSessionHandle, SessionHandle, SessionIdentity};
pub use interrupt::Interrupt;
pub use session::BaseSession;
