use thiserror::Error;

/// Errors surfaced by [`AddressSearch`](crate::AddressSearch) operations.
///
/// Operations are dispatched onto the engine thread; they can only fail
/// before the hop. Search failures themselves arrive through
/// [`AddressView::search_failed`](crate::AddressView::search_failed).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
	/// The engine thread is gone; the operation was not dispatched.
	#[error("engine gateway is unavailable")]
	EngineUnavailable,

	/// The session was closed or finalized and can no longer be driven.
	#[error("search session is closed")]
	Closed,
}
