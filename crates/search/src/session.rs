//! Session state for one guided address search.

use std::sync::Arc;

use gazet_engine::{AddressField, DetailLevel, FieldFlags, Place, SearchTicket};

/// One offered result row at the current stage, not yet confirmed.
#[derive(Clone)]
pub struct Candidate {
	pub place: Arc<Place>,
	pub level: DetailLevel,
	/// Synthetic "anywhere on this street" crossing entry.
	pub anywhere: bool,
}

impl Candidate {
	/// Primary row text.
	#[must_use]
	pub fn label(&self) -> String {
		match self.level {
			DetailLevel::State => self
				.place
				.state_code()
				.map(str::to_owned)
				.unwrap_or_else(|| self.place.name.clone()),
			DetailLevel::HouseNumber => trim_number_markers(&self.place.name),
			DetailLevel::Crossing if self.anywhere => {
				format!("Anywhere on {}", self.place.name)
			}
			_ => self.place.name.clone(),
		}
	}

	/// Secondary row text, for rows that carry one.
	#[must_use]
	pub fn description(&self) -> Option<String> {
		match self.level {
			DetailLevel::State => Some(self.place.name.clone()),
			_ => None,
		}
	}
}

/// House numbers may arrive decorated as `12 <street name>`; only the bare
/// number is shown.
fn trim_number_markers(name: &str) -> String {
	match name.find('<') {
		Some(pos) => name[..pos].trim().to_owned(),
		None => name.trim().to_owned(),
	}
}

/// Mutable state of one search session.
///
/// Owned by the coordinator and mutated exclusively on the engine thread;
/// read-only snapshots leak out through the front-end accessors. The
/// candidate list always corresponds to the most recently completed,
/// non-cancelled search for the current stage.
pub(crate) struct Session {
	pub(crate) field: AddressField,
	pub(crate) filter: String,
	pub(crate) last_successful_filter: String,
	pub(crate) level: Option<DetailLevel>,
	pub(crate) country: Option<Arc<Place>>,
	pub(crate) state: Option<Arc<Place>>,
	pub(crate) city: Option<Arc<Place>>,
	pub(crate) street: Option<Arc<Place>>,
	/// Whether the confirmed country exposes a State refinement level.
	/// Discovered from the engine per country, never assumed.
	pub(crate) country_has_states: bool,
	pub(crate) candidates: Vec<Candidate>,
	pub(crate) enabled: FieldFlags,
	pub(crate) pending: Option<SearchTicket>,
	next_ticket: u64,
}

impl Session {
	pub(crate) fn new() -> Self {
		// Country and State start editable, everything downstream waits for
		// a confirmed parent.
		let mut enabled = FieldFlags::none();
		enabled.set(AddressField::Country, true);
		enabled.set(AddressField::State, true);
		Self {
			field: AddressField::Country,
			filter: String::new(),
			last_successful_filter: String::new(),
			level: None,
			country: None,
			state: None,
			city: None,
			street: None,
			country_has_states: true,
			candidates: Vec::new(),
			enabled,
			pending: None,
			next_ticket: 0,
		}
	}

	pub(crate) fn allocate_ticket(&mut self) -> SearchTicket {
		self.next_ticket += 1;
		SearchTicket::new(self.next_ticket)
	}

	/// Confirmed entity that scopes searches in `field`.
	///
	/// City searches are parented on the State only when the country uses
	/// states; otherwise directly on the Country. The Country field itself
	/// searches at world scope.
	pub(crate) fn parent_for(&self, field: AddressField) -> Option<Arc<Place>> {
		match field {
			AddressField::Country => None,
			AddressField::State => self.country.clone(),
			AddressField::City => {
				if self.country_has_states {
					self.state.clone()
				} else {
					self.country.clone()
				}
			}
			AddressField::StreetName => self.city.clone(),
			AddressField::StreetNumber | AddressField::Crossing => self.street.clone(),
		}
	}

	/// Store `place` as the confirmed parent for its stage and drop every
	/// confirmation downstream of it.
	pub(crate) fn confirm(&mut self, level: DetailLevel, place: Arc<Place>) {
		match level {
			DetailLevel::Country => {
				self.country = Some(place);
				self.state = None;
				self.city = None;
				self.street = None;
			}
			DetailLevel::State => {
				self.state = Some(place);
				self.city = None;
				self.street = None;
			}
			DetailLevel::City => {
				self.city = Some(place);
				self.street = None;
			}
			DetailLevel::Street => self.street = Some(place),
			// Terminal levels finalize the session, they are never parents.
			DetailLevel::HouseNumber | DetailLevel::Crossing => {}
		}
	}

	/// Recompute which fields are editable from the confirmed parents.
	pub(crate) fn recompute_enabled(&mut self) {
		let mut enabled = FieldFlags::none();
		enabled.set(AddressField::Country, true);
		enabled.set(
			AddressField::State,
			self.country.is_some() && self.country_has_states,
		);
		let city_ready = if self.country_has_states {
			self.state.is_some()
		} else {
			self.country.is_some()
		};
		enabled.set(AddressField::City, city_ready);
		enabled.set(AddressField::StreetName, self.city.is_some());
		enabled.set(AddressField::StreetNumber, self.street.is_some());
		enabled.set(AddressField::Crossing, self.street.is_some());
		self.enabled = enabled;
	}
}

#[cfg(test)]
mod tests {
	use gazet_engine::Address;

	use super::*;

	fn place(name: &str) -> Arc<Place> {
		Arc::new(Place::named(name))
	}

	#[test]
	fn city_parent_depends_on_state_usage() {
		let mut session = Session::new();
		session.country = Some(place("Germany"));
		session.state = Some(place("Bavaria"));

		session.country_has_states = true;
		assert_eq!(
			session.parent_for(AddressField::City).unwrap().name,
			"Bavaria"
		);

		session.country_has_states = false;
		assert_eq!(
			session.parent_for(AddressField::City).unwrap().name,
			"Germany"
		);
	}

	#[test]
	fn confirming_upstream_drops_downstream_parents() {
		let mut session = Session::new();
		session.country = Some(place("Germany"));
		session.state = Some(place("Bavaria"));
		session.city = Some(place("Munich"));
		session.street = Some(place("Leopoldstrasse"));

		session.confirm(DetailLevel::State, place("Saxony"));
		assert_eq!(session.state.as_ref().unwrap().name, "Saxony");
		assert!(session.city.is_none());
		assert!(session.street.is_none());
		assert!(session.country.is_some());
	}

	#[test]
	fn enabled_map_follows_confirmations() {
		let mut session = Session::new();
		session.country = Some(place("Germany"));
		session.country_has_states = true;
		session.recompute_enabled();
		assert!(session.enabled.get(AddressField::State));
		assert!(!session.enabled.get(AddressField::City));

		session.state = Some(place("Bavaria"));
		session.recompute_enabled();
		assert!(session.enabled.get(AddressField::City));
		assert!(!session.enabled.get(AddressField::StreetName));

		session.city = Some(place("Munich"));
		session.street = Some(place("Leopoldstrasse"));
		session.recompute_enabled();
		assert!(session.enabled.get(AddressField::StreetNumber));
		assert!(session.enabled.get(AddressField::Crossing));
	}

	#[test]
	fn stateless_country_keeps_state_disabled_but_opens_city() {
		let mut session = Session::new();
		session.country = Some(place("Andorra"));
		session.country_has_states = false;
		session.recompute_enabled();
		assert!(!session.enabled.get(AddressField::State));
		assert!(session.enabled.get(AddressField::City));
	}

	#[test]
	fn state_rows_label_with_code_and_describe_with_name() {
		let bavaria = Arc::new(Place::named("Bavaria").with_address(Address {
			country_code: Some("DE".into()),
			state_code: Some("BY".into()),
			..Address::default()
		}));
		let candidate = Candidate {
			place: bavaria,
			level: DetailLevel::State,
			anywhere: false,
		};
		assert_eq!(candidate.label(), "BY");
		assert_eq!(candidate.description().as_deref(), Some("Bavaria"));
	}

	#[test]
	fn house_number_labels_drop_street_markers() {
		let candidate = Candidate {
			place: place("12 <Leopoldstrasse>"),
			level: DetailLevel::HouseNumber,
			anywhere: false,
		};
		assert_eq!(candidate.label(), "12");
	}

	#[test]
	fn anywhere_rows_say_so() {
		let candidate = Candidate {
			place: place("Leopoldstrasse"),
			level: DetailLevel::Crossing,
			anywhere: true,
		};
		assert_eq!(candidate.label(), "Anywhere on Leopoldstrasse");
		assert_eq!(candidate.description(), None);
	}
}
