//! The guided search coordinator.
//!
//! [`AddressSearch`] is the thread-safe front end: every operation it takes
//! is marshaled onto the engine thread, where the session state machine runs
//! and where the engine's completion callbacks arrive. A newer search for a
//! stage always cancels the in-flight one first; a superseded search reports
//! back as [`SearchReason::Cancelled`] and is ignored without touching the
//! candidate list.

use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use gazet_engine::{
	AddressField, DetailLevel, Engine, Gateway, Place, SearchEvent, SearchEvents, SearchQuery,
	SearchReason, SearchTicket,
};
use tracing::{debug, trace, warn};

use crate::error::SessionError;
use crate::session::{Candidate, Session};
use crate::view::AddressView;

/// Front-end handle to one guided address search session.
///
/// Cheap to clone; all clones drive the same session. The session lives
/// until [`AddressSearch::close`] or a terminal selection tears it down.
#[derive(Clone)]
pub struct AddressSearch {
	inner: Arc<Inner>,
}

struct Inner {
	gateway: Gateway,
	engine: Arc<dyn Engine>,
	view: Arc<dyn AddressView>,
	closed: AtomicBool,
	session: Mutex<Session>,
}

impl AddressSearch {
	/// Open a session against `engine`, reporting to `view`.
	#[must_use]
	pub fn open(gateway: Gateway, engine: Arc<dyn Engine>, view: Arc<dyn AddressView>) -> Self {
		Self {
			inner: Arc::new(Inner {
				gateway,
				engine,
				view,
				closed: AtomicBool::new(false),
				session: Mutex::new(Session::new()),
			}),
		}
	}

	/// The user edited a field's filter text.
	///
	/// Idempotent: re-delivering the identical `(field, text)` pair does not
	/// restart the search. Any other change cancels the in-flight search for
	/// the previous stage and issues a new one scoped to the field's parent.
	pub fn on_filter_changed(&self, field: AddressField, text: &str) -> Result<(), SessionError> {
		let text = text.trim().to_owned();
		self.dispatch(move |inner| Inner::filter_changed(inner, field, text))
	}

	/// The user tapped a candidate row.
	///
	/// Terminal rows (house number, crossing) finalize the session;
	/// everything else confirms the row as parent and advances the flow.
	pub fn on_candidate_selected(&self, index: usize) -> Result<(), SessionError> {
		self.dispatch(move |inner| Inner::candidate_selected(inner, index))
	}

	/// A country was picked outside the regular flow (e.g. country picker).
	pub fn on_country_changed(&self, country: Arc<Place>) -> Result<(), SessionError> {
		self.dispatch(move |inner| Inner::country_changed(inner, country))
	}

	/// The country flag was tapped: list countries at world scope so the
	/// view can offer a picker.
	pub fn on_country_flag_tapped(&self) -> Result<(), SessionError> {
		self.dispatch(Inner::country_flag_tapped)
	}

	/// Finalize early with the deepest confirmed entity, falling back to the
	/// first candidate. No-op while still refining Country or State.
	pub fn on_search_button(&self) -> Result<(), SessionError> {
		self.dispatch(Inner::search_button)
	}

	/// Tear the session down: cancel in-flight work and release every
	/// confirmed parent. Further operations return [`SessionError::Closed`].
	pub fn close(&self) {
		if self.inner.closed.swap(true, AtomicOrdering::AcqRel) {
			return;
		}
		let inner = Arc::clone(&self.inner);
		self.inner.gateway.post(move || Inner::teardown(&inner));
	}

	#[must_use]
	pub fn is_closed(&self) -> bool {
		self.inner.closed.load(AtomicOrdering::Acquire)
	}

	// ----- read-only snapshots, safe from any thread -----

	#[must_use]
	pub fn candidate_count(&self) -> usize {
		self.inner.lock().candidates.len()
	}

	/// The candidate at `index`, or `None` when out of range.
	#[must_use]
	pub fn candidate(&self, index: usize) -> Option<Candidate> {
		self.inner.lock().candidates.get(index).cloned()
	}

	#[must_use]
	pub fn candidate_label(&self, index: usize) -> Option<String> {
		self.candidate(index).map(|candidate| candidate.label())
	}

	#[must_use]
	pub fn candidate_description(&self, index: usize) -> Option<String> {
		self.candidate(index).and_then(|candidate| candidate.description())
	}

	#[must_use]
	pub fn field_enabled(&self, field: AddressField) -> bool {
		self.inner.lock().enabled.get(field)
	}

	#[must_use]
	pub fn current_field(&self) -> AddressField {
		self.inner.lock().field
	}

	#[must_use]
	pub fn confirmed_country(&self) -> Option<Arc<Place>> {
		self.inner.lock().country.clone()
	}

	#[must_use]
	pub fn confirmed_state(&self) -> Option<Arc<Place>> {
		self.inner.lock().state.clone()
	}

	#[must_use]
	pub fn confirmed_city(&self) -> Option<Arc<Place>> {
		self.inner.lock().city.clone()
	}

	#[must_use]
	pub fn confirmed_street(&self) -> Option<Arc<Place>> {
		self.inner.lock().street.clone()
	}

	fn dispatch(
		&self,
		op: impl FnOnce(&Arc<Inner>) + Send + 'static,
	) -> Result<(), SessionError> {
		if self.inner.closed.load(AtomicOrdering::Acquire) {
			return Err(SessionError::Closed);
		}
		let inner = Arc::clone(&self.inner);
		if self.inner.gateway.post(move || op(&inner)) {
			Ok(())
		} else {
			Err(SessionError::EngineUnavailable)
		}
	}
}

/// What to tell the view after a successful completion was folded in.
enum FollowUp {
	Refresh,
	Revert(AddressField, String),
	FocusCrossing,
	Nothing,
}

impl Inner {
	fn lock(&self) -> MutexGuard<'_, Session> {
		self.session.lock().unwrap_or_else(PoisonError::into_inner)
	}

	fn filter_changed(inner: &Arc<Inner>, field: AddressField, text: String) {
		inner.gateway.assert_engine_thread();

		let (parent, explicit_level) = {
			let mut session = inner.lock();
			if session.field == field && session.filter == text {
				trace!(?field, %text, "filter unchanged; ignoring");
				return;
			}
			let switched = session.field != field;
			if switched {
				session.last_successful_filter.clear();
			}
			session.field = field;
			session.filter = text;

			let parent = session.parent_for(field);
			if field != AddressField::Country && parent.is_none() {
				// Nothing to scope the search under; the field should not
				// have been editable in the first place.
				warn!(?field, "filter edit without a confirmed parent");
				return;
			}
			(parent, switched.then(|| field.detail_level()))
		};

		Inner::cancel_pending(inner);

		// On a field switch the target level is the field's own; within the
		// same field the engine is asked what is plausible under the parent
		// rather than assuming the fixed stage sequence.
		let level = explicit_level.unwrap_or_else(|| {
			let plausible = inner.engine.next_detail_levels(parent.as_deref());
			let own = field.detail_level();
			if plausible.contains(&own) {
				own
			} else {
				plausible.first().copied().unwrap_or(own)
			}
		});

		Inner::issue_search(inner, parent, level);
	}

	fn candidate_selected(inner: &Arc<Inner>, index: usize) {
		inner.gateway.assert_engine_thread();

		let candidate = {
			let session = inner.lock();
			match session.candidates.get(index) {
				Some(candidate) => candidate.clone(),
				None => {
					warn!(index, len = session.candidates.len(), "selection out of range");
					return;
				}
			}
		};

		match candidate.level {
			// Terminal stages hand the chosen place over and end the flow.
			DetailLevel::HouseNumber | DetailLevel::Crossing => {
				Inner::finish(inner, candidate.place);
			}
			DetailLevel::Country => Inner::country_changed(inner, candidate.place),
			level => Inner::confirm_and_advance(inner, level, candidate.place),
		}
	}

	fn confirm_and_advance(inner: &Arc<Inner>, level: DetailLevel, place: Arc<Place>) {
		Inner::cancel_pending(inner);

		let confirmed_field = AddressField::for_level(level);
		{
			let mut session = inner.lock();
			session.confirm(level, Arc::clone(&place));
			// A new upstream parent invalidates anything typed downstream.
			session.filter.clear();
			session.last_successful_filter.clear();
			session.candidates.clear();
			session.recompute_enabled();
		}

		let plausible = inner.engine.next_detail_levels(Some(place.as_ref()));
		let Some(next_level) = plausible.first().copied() else {
			debug!(?level, "no refinement level under confirmed parent");
			inner.view.refresh_all();
			return;
		};
		let next_field = AddressField::for_level(next_level);
		{
			let mut session = inner.lock();
			session.field = next_field;
			session.level = Some(next_level);
		}

		inner.view.set_field_text(confirmed_field, &place.name);
		inner.view.focus_field(next_field);
		inner.view.refresh_all();

		Inner::issue_search(inner, Some(place), next_level);
	}

	fn country_changed(inner: &Arc<Inner>, country: Arc<Place>) {
		inner.gateway.assert_engine_thread();

		{
			let session = inner.lock();
			if let Some(current) = &session.country
				&& current.country_code() == country.country_code()
			{
				trace!("same country re-selected; ignoring");
				return;
			}
		}

		Inner::cancel_pending(inner);

		// Which refinement the new country supports is the engine's call;
		// countries without a state level go straight to City.
		let plausible = inner.engine.next_detail_levels(Some(country.as_ref()));
		let has_states = plausible.first() == Some(&DetailLevel::State);
		let next_level = plausible.first().copied().unwrap_or(DetailLevel::City);
		let next_field = AddressField::for_level(next_level);

		{
			let mut session = inner.lock();
			session.confirm(DetailLevel::Country, Arc::clone(&country));
			session.country_has_states = has_states;
			session.filter.clear();
			session.last_successful_filter.clear();
			session.candidates.clear();
			session.field = next_field;
			session.level = Some(next_level);
			session.recompute_enabled();
		}

		inner.view.refresh_all();
		inner.view.focus_field(next_field);

		Inner::issue_search(inner, Some(country), next_level);
	}

	fn country_flag_tapped(inner: &Arc<Inner>) {
		inner.gateway.assert_engine_thread();
		Inner::cancel_pending(inner);
		{
			let mut session = inner.lock();
			session.field = AddressField::Country;
			session.level = Some(DetailLevel::Country);
			session.filter.clear();
			session.last_successful_filter.clear();
		}
		Inner::issue_search(inner, None, DetailLevel::Country);
	}

	fn search_button(inner: &Arc<Inner>) {
		inner.gateway.assert_engine_thread();
		let target = {
			let session = inner.lock();
			let confirmed = match session.field {
				AddressField::Country | AddressField::State => return,
				AddressField::City => session.city.clone(),
				AddressField::StreetName => session.street.clone(),
				AddressField::StreetNumber | AddressField::Crossing => None,
			};
			confirmed.or_else(|| {
				session
					.candidates
					.first()
					.map(|candidate| Arc::clone(&candidate.place))
			})
		};
		match target {
			Some(place) => Inner::finish(inner, place),
			None => debug!("nothing to finalize yet"),
		}
	}

	fn issue_search(inner: &Arc<Inner>, parent: Option<Arc<Place>>, level: DetailLevel) {
		let (ticket, filter) = {
			let mut session = inner.lock();
			let ticket = session.allocate_ticket();
			session.pending = Some(ticket);
			session.level = Some(level);
			(ticket, session.filter.clone())
		};
		debug!(ticket = ticket.raw(), ?level, %filter, "issuing search");
		let events = Inner::event_sink(inner, ticket);
		inner
			.engine
			.search(ticket, SearchQuery { parent, filter, level }, events);
	}

	fn event_sink(inner: &Arc<Inner>, ticket: SearchTicket) -> SearchEvents {
		let inner = Arc::clone(inner);
		Box::new(move |event| match event {
			SearchEvent::Started => inner.view.show_busy(),
			SearchEvent::Completed { reason, hint, places } => {
				Inner::complete_search(&inner, ticket, reason, &hint, places);
			}
		})
	}

	fn complete_search(
		inner: &Arc<Inner>,
		ticket: SearchTicket,
		reason: SearchReason,
		hint: &str,
		places: Vec<Arc<Place>>,
	) {
		inner.gateway.assert_engine_thread();
		inner.view.hide_busy();

		if reason == SearchReason::Cancelled {
			// A newer search superseded this one. The candidate list belongs
			// to the successor now; leave everything untouched.
			trace!(ticket = ticket.raw(), "superseded search reported back; ignoring");
			return;
		}

		if !reason.is_success() {
			debug!(ticket = ticket.raw(), ?reason, hint, "search failed");
			{
				let mut session = inner.lock();
				session.pending = None;
				session.candidates.clear();
			}
			inner.view.search_failed(reason);
			inner.view.refresh_results();
			return;
		}

		let follow_up = {
			let mut session = inner.lock();
			session.pending = None;
			let level = session.level.unwrap_or_else(|| session.field.detail_level());

			if !places.is_empty() || level == DetailLevel::Crossing {
				session.last_successful_filter = session.filter.clone();
				session.candidates.clear();
				if level == DetailLevel::Crossing {
					// A street with no mapped crossings still offers
					// "anywhere on this street".
					if let Some(street) = session.street.clone() {
						session.candidates.push(Candidate {
							place: street,
							level,
							anywhere: true,
						});
					}
				}
				session.candidates.extend(places.into_iter().map(|place| Candidate {
					place,
					level,
					anywhere: false,
				}));
				FollowUp::Refresh
			} else if !session.last_successful_filter.is_empty() {
				// Dead-end filter: snap the field back to the last text that
				// produced results, keeping the previous candidates.
				let revert = session.last_successful_filter.clone();
				session.filter = revert.clone();
				FollowUp::Revert(session.field, revert)
			} else if session.field == AddressField::StreetNumber {
				// No such house number; steer the user to intersections.
				FollowUp::FocusCrossing
			} else {
				FollowUp::Nothing
			}
		};

		match follow_up {
			FollowUp::Refresh => inner.view.refresh_results(),
			FollowUp::Revert(field, text) => inner.view.set_field_text(field, &text),
			FollowUp::FocusCrossing => inner.view.focus_field(AddressField::Crossing),
			FollowUp::Nothing => {}
		}
	}

	fn cancel_pending(inner: &Arc<Inner>) {
		let ticket = inner.lock().pending.take();
		if let Some(ticket) = ticket {
			trace!(ticket = ticket.raw(), "cancelling superseded search");
			inner.engine.cancel_search(ticket);
		}
	}

	fn finish(inner: &Arc<Inner>, place: Arc<Place>) {
		inner.closed.store(true, AtomicOrdering::Release);
		debug!(name = %place.name, "search session finished");
		inner.view.session_finished(place);
		Inner::teardown(inner);
	}

	fn teardown(inner: &Arc<Inner>) {
		Inner::cancel_pending(inner);
		let mut session = inner.lock();
		session.candidates.clear();
		session.country = None;
		session.state = None;
		session.city = None;
		session.street = None;
		session.filter.clear();
		session.last_successful_filter.clear();
		session.recompute_enabled();
	}
}
