//! Notification surface the coordinator drives.

use std::sync::Arc;

use gazet_engine::{AddressField, Place, SearchReason};

/// Listener for guided search notifications.
///
/// Every method is invoked on the engine thread; implementations that touch
/// widgets must hop to their own UI thread first. Places handed over are
/// immutable snapshots and safe to keep.
///
/// All methods default to no-ops so a view only implements what it renders.
pub trait AddressView: Send + Sync {
	/// A search went in flight.
	fn show_busy(&self) {}

	/// A search completed, in any outcome.
	fn hide_busy(&self) {}

	/// The candidate list for the current stage changed.
	fn refresh_results(&self) {}

	/// A confirmed parent changed; the whole form should be re-read.
	fn refresh_all(&self) {}

	/// Replace a field's filter text (autofill of a confirmed name, or the
	/// fallback revert to the last successful filter).
	fn set_field_text(&self, field: AddressField, text: &str) {
		let _ = (field, text);
	}

	/// Move input focus to the given field.
	fn focus_field(&self, field: AddressField) {
		let _ = field;
	}

	/// A search failed hard; the candidate list was cleared.
	fn search_failed(&self, reason: SearchReason) {
		let _ = reason;
	}

	/// A terminal candidate was chosen; the session is finished.
	fn session_finished(&self, place: Arc<Place>) {
		let _ = place;
	}
}
