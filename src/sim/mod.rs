//! In-memory stand-in for the proprietary mapping engine.
//!
//! The simulator serves the guided flow from a [`Dataset`]: countries at
//! world scope, then states, cities, streets, house numbers and crossings
//! underneath the given parent. Filter text is fuzzy-matched; completions
//! are posted back through the gateway so they arrive on the engine thread
//! exactly like real engine callbacks, and cancellation flips an in-flight
//! delivery to [`SearchReason::Cancelled`] before it lands.

mod dataset;

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use frizbee::{Config, match_list};
use tracing::debug;

use gazet_engine::{
	Address, DetailLevel, Engine, Gateway, Place, SearchEvent, SearchEvents, SearchQuery,
	SearchReason, SearchTicket,
};

pub use dataset::{CityRecord, CountryRecord, Dataset, DatasetError, StateRecord, StreetRecord};

/// Default cap on returned rows; hitting it reports `ReducedResult`.
pub const DEFAULT_RESULT_LIMIT: usize = 32;

pub struct SimEngine {
	gateway: Gateway,
	dataset: Dataset,
	limit: usize,
	cancelled: Arc<Mutex<HashSet<u64>>>,
}

impl SimEngine {
	#[must_use]
	pub fn new(gateway: Gateway, dataset: Dataset) -> Self {
		Self {
			gateway,
			dataset,
			limit: DEFAULT_RESULT_LIMIT,
			cancelled: Arc::new(Mutex::new(HashSet::new())),
		}
	}

	#[must_use]
	pub fn with_result_limit(mut self, limit: usize) -> Self {
		self.limit = limit.max(1);
		self
	}

	fn country_record(&self, place: &Place) -> Option<&CountryRecord> {
		let iso = place.country_code()?;
		self.dataset.countries.iter().find(|country| country.iso == iso)
	}

	fn state_record<'a>(
		&self,
		country: &'a CountryRecord,
		code: &str,
	) -> Option<&'a StateRecord> {
		country.states.iter().find(|state| state.code == code)
	}

	fn city_record<'s, 'p>(&'s self, parent: &'p Place) -> Option<(&'s CountryRecord, Option<&'p str>, &'s CityRecord)> {
		let country = self.country_record(parent)?;
		let city_name = parent.address.city.as_deref()?;
		match parent.state_code() {
			Some(code) => {
				let state = self.state_record(country, code)?;
				let city = state.cities.iter().find(|city| city.name == city_name)?;
				Some((country, Some(code), city))
			}
			None => {
				let city = country.cities.iter().find(|city| city.name == city_name)?;
				Some((country, None, city))
			}
		}
	}

	fn street_record(&self, parent: &Place) -> Option<(Address, &StreetRecord)> {
		let (_, _, city) = self.city_record(parent)?;
		let street_name = parent.address.street.as_deref()?;
		let street = city.streets.iter().find(|street| street.name == street_name)?;
		Some((parent.address.clone(), street))
	}

	fn countries(&self) -> Vec<Place> {
		self.dataset
			.countries
			.iter()
			.map(|country| {
				Place::named(&country.name).with_address(Address {
					country_code: Some(country.iso.clone()),
					..Address::default()
				})
			})
			.collect()
	}

	fn states(&self, parent: &Place) -> Vec<Place> {
		let Some(country) = self.country_record(parent) else {
			return Vec::new();
		};
		country
			.states
			.iter()
			.map(|state| {
				Place::named(&state.name).with_address(Address {
					country_code: Some(country.iso.clone()),
					state_code: Some(state.code.clone()),
					..Address::default()
				})
			})
			.collect()
	}

	fn cities(&self, parent: &Place) -> Vec<Place> {
		let Some(country) = self.country_record(parent) else {
			return Vec::new();
		};
		let (state_code, records) = match parent.state_code() {
			Some(code) => match self.state_record(country, code) {
				Some(state) => (Some(code.to_owned()), &state.cities),
				None => return Vec::new(),
			},
			None => (None, &country.cities),
		};
		records
			.iter()
			.map(|city| {
				let mut place = Place::named(&city.name).with_address(Address {
					country_code: Some(country.iso.clone()),
					state_code: state_code.clone(),
					city: Some(city.name.clone()),
					..Address::default()
				});
				if let Some(position) = city.position {
					place = place.with_position(position);
				}
				place
			})
			.collect()
	}

	fn streets(&self, parent: &Place) -> Vec<Place> {
		let Some((_, _, city)) = self.city_record(parent) else {
			return Vec::new();
		};
		city.streets
			.iter()
			.map(|street| {
				Place::named(&street.name).with_address(Address {
					street: Some(street.name.clone()),
					..parent.address.clone()
				})
			})
			.collect()
	}

	fn numbers(&self, parent: &Place) -> Vec<Place> {
		let Some((address, street)) = self.street_record(parent) else {
			return Vec::new();
		};
		street
			.numbers
			.iter()
			// Real engines decorate the number with the street it sits on;
			// presentation strips the marker again.
			.map(|number| {
				Place::named(format!("{number} <{}>", street.name)).with_address(address.clone())
			})
			.collect()
	}

	fn crossings(&self, parent: &Place) -> Vec<Place> {
		let Some((address, street)) = self.street_record(parent) else {
			return Vec::new();
		};
		street
			.crossings
			.iter()
			.map(|crossing| Place::named(crossing).with_address(address.clone()))
			.collect()
	}

	fn collect(&self, query: &SearchQuery) -> (Vec<Arc<Place>>, bool) {
		let pool = match (query.level, query.parent.as_deref()) {
			(DetailLevel::Country, _) => self.countries(),
			(_, None) => Vec::new(),
			(DetailLevel::State, Some(parent)) => self.states(parent),
			(DetailLevel::City, Some(parent)) => self.cities(parent),
			(DetailLevel::Street, Some(parent)) => self.streets(parent),
			(DetailLevel::HouseNumber, Some(parent)) => self.numbers(parent),
			(DetailLevel::Crossing, Some(parent)) => self.crossings(parent),
		};
		rank(pool, query.filter.trim(), self.limit)
	}
}

impl Engine for SimEngine {
	fn search(&self, ticket: SearchTicket, query: SearchQuery, mut events: SearchEvents) {
		self.gateway.assert_engine_thread();
		events(SearchEvent::Started);

		let (places, truncated) = self.collect(&query);
		let reason = if truncated {
			SearchReason::ReducedResult
		} else {
			SearchReason::NoError
		};
		debug!(
			ticket = ticket.raw(),
			level = ?query.level,
			results = places.len(),
			"sim search"
		);

		// Deliver asynchronously so a cancel issued after this call still
		// wins the race against the completion.
		let cancelled = Arc::clone(&self.cancelled);
		self.gateway.post(move || {
			let withdrawn = cancelled
				.lock()
				.unwrap_or_else(PoisonError::into_inner)
				.remove(&ticket.raw());
			if withdrawn {
				events(SearchEvent::Completed {
					reason: SearchReason::Cancelled,
					hint: String::new(),
					places: Vec::new(),
				});
			} else {
				events(SearchEvent::Completed {
					reason,
					hint: String::new(),
					places,
				});
			}
		});
	}

	fn cancel_search(&self, ticket: SearchTicket) {
		self.cancelled
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.insert(ticket.raw());
	}

	fn next_detail_levels(&self, parent: Option<&Place>) -> Vec<DetailLevel> {
		let Some(parent) = parent else {
			return vec![DetailLevel::Country];
		};
		let address = &parent.address;
		if address.street.is_some() {
			return vec![DetailLevel::HouseNumber, DetailLevel::Crossing];
		}
		if address.city.is_some() {
			return vec![DetailLevel::Street];
		}
		if address.state_code.is_some() {
			return vec![DetailLevel::City];
		}
		match self.country_record(parent) {
			Some(country) if country.states.is_empty() => vec![DetailLevel::City],
			Some(_) => vec![DetailLevel::State],
			None => Vec::new(),
		}
	}
}

/// Order the pool for presentation: alphabetical for an empty filter, fuzzy
/// score (best first, dataset order as tie break) otherwise.
fn rank(mut pool: Vec<Place>, filter: &str, limit: usize) -> (Vec<Arc<Place>>, bool) {
	if filter.is_empty() {
		pool.sort_by(|a, b| a.name.cmp(&b.name));
		let truncated = pool.len() > limit;
		pool.truncate(limit);
		return (pool.into_iter().map(Arc::new).collect(), truncated);
	}

	let haystacks: Vec<&str> = pool.iter().map(|place| place.name.as_str()).collect();
	let mut config = Config::default();
	config.prefilter = false;
	config.max_typos = None;
	config.sort = false;
	let matches = match_list(filter, &haystacks, config);

	let mut ranked: Vec<(u16, usize)> = matches
		.into_iter()
		.filter(|entry| entry.score > 0)
		.map(|entry| (entry.score, entry.index as usize))
		.collect();
	ranked.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
	let truncated = ranked.len() > limit;
	ranked.truncate(limit);

	let places = ranked
		.into_iter()
		.map(|(_, index)| Arc::new(pool[index].clone()))
		.collect();
	(places, truncated)
}

#[cfg(test)]
mod tests {
	use std::sync::mpsc;

	use super::*;

	struct SimHarness {
		gateway: Gateway,
		engine: Arc<SimEngine>,
	}

	impl SimHarness {
		fn new() -> Self {
			let gateway = Gateway::spawn();
			let engine = Arc::new(SimEngine::new(gateway.clone(), Dataset::builtin()));
			Self { gateway, engine }
		}

		/// Run a search to completion and hand back the terminal event.
		fn search(&self, query: SearchQuery) -> (SearchReason, Vec<Arc<Place>>) {
			self.search_with(query, false)
		}

		fn search_with(
			&self,
			query: SearchQuery,
			cancel_immediately: bool,
		) -> (SearchReason, Vec<Arc<Place>>) {
			let (tx, rx) = mpsc::channel();
			let engine = Arc::clone(&self.engine);
			self.gateway
				.execute(move || {
					let ticket = SearchTicket::new(1);
					let events: SearchEvents = Box::new(move |event| {
						if let SearchEvent::Completed { reason, places, .. } = event {
							let _ = tx.send((reason, places));
						}
					});
					engine.search(ticket, query, events);
					if cancel_immediately {
						engine.cancel_search(ticket);
					}
				})
				.unwrap();
			// Let the posted delivery run before reading the outcome.
			self.gateway.execute(|| ()).unwrap();
			rx.recv().unwrap()
		}
	}

	impl Drop for SimHarness {
		fn drop(&mut self) {
			self.gateway.shutdown();
		}
	}

	fn world(level: DetailLevel, filter: &str) -> SearchQuery {
		SearchQuery {
			parent: None,
			filter: filter.to_owned(),
			level,
		}
	}

	fn under(parent: Place, level: DetailLevel, filter: &str) -> SearchQuery {
		SearchQuery {
			parent: Some(Arc::new(parent)),
			filter: filter.to_owned(),
			level,
		}
	}

	fn germany() -> Place {
		Place::named("Germany").with_address(Address {
			country_code: Some("DE".into()),
			..Address::default()
		})
	}

	#[test]
	fn empty_filter_lists_countries_alphabetically() {
		let harness = SimHarness::new();
		let (reason, places) = harness.search(world(DetailLevel::Country, ""));
		assert_eq!(reason, SearchReason::NoError);
		let names: Vec<_> = places.iter().map(|place| place.name.as_str()).collect();
		assert_eq!(names, vec!["Andorra", "Germany"]);
	}

	#[test]
	fn fuzzy_filter_narrows_countries() {
		let harness = SimHarness::new();
		let (_, places) = harness.search(world(DetailLevel::Country, "germ"));
		assert_eq!(places.len(), 1);
		assert_eq!(places[0].name, "Germany");
	}

	#[test]
	fn states_are_scoped_to_their_country() {
		let harness = SimHarness::new();
		let (_, places) = harness.search(under(germany(), DetailLevel::State, ""));
		let names: Vec<_> = places.iter().map(|place| place.name.as_str()).collect();
		assert_eq!(names, vec!["Bavaria", "Berlin"]);
		assert_eq!(places[0].state_code(), Some("BY"));
	}

	#[test]
	fn house_numbers_carry_street_markers() {
		let harness = SimHarness::new();
		let street = Place::named("Leopoldstrasse").with_address(Address {
			country_code: Some("DE".into()),
			state_code: Some("BY".into()),
			city: Some("Munich".into()),
			street: Some("Leopoldstrasse".into()),
		});
		let (_, places) = harness.search(under(street, DetailLevel::HouseNumber, ""));
		assert_eq!(places[0].name, "10 <Leopoldstrasse>");
	}

	#[test]
	fn cancelling_before_delivery_reports_cancelled() {
		let harness = SimHarness::new();
		let (reason, places) =
			harness.search_with(world(DetailLevel::Country, ""), true);
		assert_eq!(reason, SearchReason::Cancelled);
		assert!(places.is_empty());
	}

	#[test]
	fn result_cap_reports_reduced_result() {
		let gateway = Gateway::spawn();
		let engine = Arc::new(
			SimEngine::new(gateway.clone(), Dataset::builtin()).with_result_limit(1),
		);
		let harness = SimHarness { gateway, engine };
		let (reason, places) = harness.search(world(DetailLevel::Country, ""));
		assert_eq!(reason, SearchReason::ReducedResult);
		assert_eq!(places.len(), 1);
	}

	#[test]
	fn next_levels_follow_the_dataset_shape() {
		let harness = SimHarness::new();
		let engine = &harness.engine;
		assert_eq!(engine.next_detail_levels(None), vec![DetailLevel::Country]);
		assert_eq!(
			engine.next_detail_levels(Some(&germany())),
			vec![DetailLevel::State]
		);
		let andorra = Place::named("Andorra").with_address(Address {
			country_code: Some("AD".into()),
			..Address::default()
		});
		assert_eq!(
			engine.next_detail_levels(Some(&andorra)),
			vec![DetailLevel::City]
		);
		let street = Place::named("Leopoldstrasse").with_address(Address {
			country_code: Some("DE".into()),
			state_code: Some("BY".into()),
			city: Some("Munich".into()),
			street: Some("Leopoldstrasse".into()),
		});
		assert_eq!(
			engine.next_detail_levels(Some(&street)),
			vec![DetailLevel::HouseNumber, DetailLevel::Crossing]
		);
	}
}
