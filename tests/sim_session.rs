//! Whole-stack session: the real coordinator driving the simulated engine
//! through the gateway, from country pick down to a finalized crossing.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use gazet::sim::{Dataset, SimEngine};
use gazet::{AddressField, AddressSearch, AddressView, Engine, Gateway, Place};

#[derive(Default)]
struct ProbeView {
	focused: Mutex<Vec<AddressField>>,
	refreshes: AtomicUsize,
	finished: Mutex<Option<Arc<Place>>>,
}

impl AddressView for ProbeView {
	fn refresh_results(&self) {
		self.refreshes.fetch_add(1, Ordering::SeqCst);
	}

	fn focus_field(&self, field: AddressField) {
		self.focused.lock().unwrap().push(field);
	}

	fn session_finished(&self, place: Arc<Place>) {
		*self.finished.lock().unwrap() = Some(place);
	}
}

struct Demo {
	gateway: Gateway,
	view: Arc<ProbeView>,
	search: AddressSearch,
}

impl Demo {
	fn new() -> Self {
		let gateway = Gateway::spawn();
		let engine = Arc::new(SimEngine::new(gateway.clone(), Dataset::builtin()));
		let view = Arc::new(ProbeView::default());
		let search = AddressSearch::open(
			gateway.clone(),
			engine as Arc<dyn Engine>,
			Arc::clone(&view) as Arc<dyn AddressView>,
		);
		Self { gateway, view, search }
	}

	/// Settle every queued job, including posted completions.
	fn settle(&self) {
		// Two hops: one for dispatched operations, one for the completion
		// they post.
		self.gateway.execute(|| ()).unwrap();
		self.gateway.execute(|| ()).unwrap();
	}

	fn labels(&self) -> Vec<String> {
		(0..self.search.candidate_count())
			.filter_map(|index| self.search.candidate_label(index))
			.collect()
	}
}

impl Drop for Demo {
	fn drop(&mut self) {
		self.gateway.shutdown();
	}
}

#[test]
fn full_session_from_country_to_crossing() {
	let demo = Demo::new();

	demo.search.on_filter_changed(AddressField::Country, "germ").unwrap();
	demo.settle();
	assert_eq!(demo.labels(), vec!["Germany"]);

	// Germany uses states, so confirming it opens the State stage.
	demo.search.on_candidate_selected(0).unwrap();
	demo.settle();
	assert_eq!(demo.search.current_field(), AddressField::State);
	assert!(demo.search.field_enabled(AddressField::State));
	assert_eq!(demo.labels(), vec!["BY", "BE"]);

	demo.search.on_filter_changed(AddressField::State, "bav").unwrap();
	demo.settle();
	assert_eq!(demo.labels(), vec!["BY"]);
	assert_eq!(
		demo.search.candidate_description(0).as_deref(),
		Some("Bavaria")
	);

	demo.search.on_candidate_selected(0).unwrap();
	demo.settle();
	assert_eq!(demo.search.confirmed_state().unwrap().name, "Bavaria");
	assert_eq!(demo.labels(), vec!["Munich", "Nuremberg"]);

	demo.search.on_candidate_selected(0).unwrap();
	demo.settle();
	assert_eq!(demo.search.confirmed_city().unwrap().name, "Munich");
	assert_eq!(demo.labels(), vec!["Leopoldstrasse", "Marienplatz"]);

	demo.search.on_candidate_selected(0).unwrap();
	demo.settle();
	assert_eq!(demo.search.confirmed_street().unwrap().name, "Leopoldstrasse");
	assert_eq!(demo.search.current_field(), AddressField::StreetNumber);
	assert_eq!(
		demo.labels(),
		vec!["10", "12", "14"],
		"house numbers are listed with street markers stripped"
	);

	// Switch to intersections: the synthetic anywhere row leads the list.
	demo.search.on_filter_changed(AddressField::Crossing, "").unwrap();
	demo.settle();
	assert_eq!(
		demo.labels(),
		vec![
			"Anywhere on Leopoldstrasse",
			"Georgenstrasse",
			"Ungererstrasse"
		]
	);

	demo.search.on_candidate_selected(1).unwrap();
	demo.settle();

	let finished = demo.view.finished.lock().unwrap().clone().unwrap();
	assert_eq!(finished.name, "Georgenstrasse");
	assert_eq!(finished.address.street.as_deref(), Some("Leopoldstrasse"));
	assert!(demo.search.is_closed());
}

#[test]
fn unknown_house_number_steers_to_crossings() {
	let demo = Demo::new();

	demo.search.on_filter_changed(AddressField::Country, "germ").unwrap();
	demo.settle();
	demo.search.on_candidate_selected(0).unwrap();
	demo.settle();
	demo.search.on_filter_changed(AddressField::State, "bav").unwrap();
	demo.settle();
	demo.search.on_candidate_selected(0).unwrap();
	demo.settle();
	demo.search.on_candidate_selected(0).unwrap();
	demo.settle();
	demo.search.on_candidate_selected(0).unwrap();
	demo.settle();
	assert_eq!(demo.search.current_field(), AddressField::StreetNumber);

	demo.search
		.on_filter_changed(AddressField::StreetNumber, "999")
		.unwrap();
	demo.settle();

	assert!(
		demo.view
			.focused
			.lock()
			.unwrap()
			.contains(&AddressField::Crossing)
	);
}
