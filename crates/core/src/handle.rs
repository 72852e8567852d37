//! Session handle collaborator seam.
//!
//! A session handle is an established connection to one ledger, identified
//! by a session token. The transport behind it (wire format, request
//! correlation, connection management) is implemented elsewhere; this crate
//! only needs the identity and the ability to send an abort.

use std::future::Future;
use std::pin::Pin;

use crate::error::TransportError;

/// Future returned by [`AsyncSessionHandle::send_abort`].
pub type AbortFuture<'a> = Pin<Box<dyn Future<Output = Result<(), TransportError>> + Send + 'a>>;

/// Identity of an established session.
pub trait SessionIdentity {
	/// Name of the ledger the session is bound to.
	fn ledger_name(&self) -> &str;

	/// Token issued by the service when the session was started.
	fn token(&self) -> &str;
}

/// Blocking session handle.
pub trait SessionHandle: SessionIdentity {
	/// Asks the service to discard in-progress work and return the session to idle.
	fn send_abort(&self) -> Result<(), TransportError>;
}

/// Async session handle.
pub trait AsyncSessionHandle: SessionIdentity {
	/// Asks the service to discard in-progress work and return the session to idle.
	fn send_abort(&self) -> AbortFuture<'_>;
}

impl<T: SessionIdentity + ?Sized> SessionIdentity for std::sync::Arc<T> {
	fn ledger_name(&self) -> &str {
		(**self).ledger_name()
	}

	fn token(&self) -> &str {
		(**self).token()
	}
}

impl<T: SessionHandle + ?Sized> SessionHandle for std::sync::Arc<T> {
	fn send_abort(&self) -> Result<(), TransportError> {
		SessionHandle::send_abort(&**self)
	}
}

impl<T: AsyncSessionHandle + ?Sized> AsyncSessionHandle for std::sync::Arc<T> {
	fn send_abort(&self) -> AbortFuture<'_> {
		AsyncSessionHandle::send_abort(&**self)
	}
}
