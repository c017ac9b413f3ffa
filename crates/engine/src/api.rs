//! Capability surface a concrete mapping engine implements.

use std::sync::Arc;

use crate::address::DetailLevel;
use crate::place::Place;

/// Identifies one asynchronous search request so a later cancel can target
/// it. Tickets are allocated by the caller and never reused within a session.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct SearchTicket(u64);

impl SearchTicket {
	#[must_use]
	pub const fn new(raw: u64) -> Self {
		Self(raw)
	}

	#[must_use]
	pub const fn raw(self) -> u64 {
		self.0
	}
}

/// Completion status the engine reports for one search request.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SearchReason {
	NoError,
	/// The result set was truncated but is still usable.
	ReducedResult,
	/// The request was superseded or withdrawn. Staleness, not an error.
	Cancelled,
	Busy,
	NetworkFailed,
	Internal,
}

impl SearchReason {
	/// Success means "apply the results"; a reduced result set counts.
	#[must_use]
	pub fn is_success(self) -> bool {
		matches!(self, SearchReason::NoError | SearchReason::ReducedResult)
	}
}

/// Progress notification for one search request.
///
/// A well-behaved engine emits `Started` once, then exactly one `Completed`,
/// both on the engine thread.
pub enum SearchEvent {
	Started,
	Completed {
		reason: SearchReason,
		/// Engine-provided diagnostic, empty when it has nothing to say.
		hint: String,
		places: Vec<Arc<Place>>,
	},
}

/// Callback receiving [`SearchEvent`]s, always invoked on the engine thread.
pub type SearchEvents = Box<dyn FnMut(SearchEvent) + Send>;

/// Scope and filter for one search request.
#[derive(Clone, Debug)]
pub struct SearchQuery {
	/// Confirmed parent the search is scoped under; `None` is world scope
	/// (used for country listings).
	pub parent: Option<Arc<Place>>,
	pub filter: String,
	pub level: DetailLevel,
}

/// Black-box mapping engine.
///
/// Methods must only be invoked on the engine thread; implementations are
/// expected to guard themselves with [`Gateway::assert_engine_thread`] and to
/// deliver their callbacks through [`Gateway::post`] so listeners run on the
/// engine thread too.
///
/// [`Gateway::assert_engine_thread`]: crate::Gateway::assert_engine_thread
/// [`Gateway::post`]: crate::Gateway::post
pub trait Engine: Send + Sync {
	/// Start an asynchronous search; progress arrives through `events`.
	fn search(&self, ticket: SearchTicket, query: SearchQuery, events: SearchEvents);

	/// Withdraw an in-flight search. The engine completes it with
	/// [`SearchReason::Cancelled`]; cancellation is cooperative and never
	/// silently drops the request.
	fn cancel_search(&self, ticket: SearchTicket);

	/// Ordered plausible refinement levels directly under `parent`.
	///
	/// `None` is world scope and yields `[Country]`. A country that exposes
	/// no state level answers `[City]` here; callers must branch on the
	/// answer rather than assume the full stage sequence.
	fn next_detail_levels(&self, parent: Option<&Place>) -> Vec<DetailLevel>;
}
