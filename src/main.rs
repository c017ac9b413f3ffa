mod cli;
mod console;
mod settings;

use std::io::{self, BufRead};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use cli::{OutputFormat, parse_cli};
use console::{Command, ConsoleView};
use gazet::sim::{Dataset, SimEngine};
use gazet::{AddressField, AddressSearch, AddressView, Engine, Gateway, Place};
use settings::ResolvedSettings;

fn main() -> Result<()> {
	init_logging();
	let cli = parse_cli();
	let settings = settings::load(&cli)?;

	if cli.print_config {
		settings.print_summary();
	}

	let dataset = match &settings.dataset {
		Some(path) => Dataset::from_path(path)
			.with_context(|| format!("failed to load dataset {}", path.display()))?,
		None => Dataset::builtin(),
	};

	run_session(cli.output, &settings, dataset)
}

/// Logs go to stderr so they never interleave with the prompt; the level is
/// controlled by `GAZET_LOG` (e.g. `GAZET_LOG=gazet=debug`).
fn init_logging() {
	let filter = EnvFilter::try_from_env("GAZET_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(io::stderr)
		.init();
}

fn run_session(format: OutputFormat, settings: &ResolvedSettings, dataset: Dataset) -> Result<()> {
	let gateway = Gateway::spawn();
	let engine = Arc::new(
		SimEngine::new(gateway.clone(), dataset).with_result_limit(settings.result_limit),
	);
	let view = Arc::new(ConsoleView::default());
	let search = AddressSearch::open(
		gateway.clone(),
		Arc::clone(&engine) as Arc<dyn Engine>,
		Arc::clone(&view) as Arc<dyn AddressView>,
	);

	// Seed the first stage so the prompt starts with something to pick.
	match &settings.default_country {
		Some(name) => search.on_filter_changed(AddressField::Country, name)?,
		None => search.on_country_flag_tapped()?,
	}

	println!("gazet: guided address search (type `help`)");
	let stdin = io::stdin();
	for line in stdin.lock().lines() {
		let line = line?;
		match console::parse_command(&line) {
			Err(message) => println!("  {message}"),
			Ok(Command::Quit) => break,
			Ok(Command::Help) => console::print_help(),
			Ok(Command::List) => print_candidates(&search),
			Ok(Command::Form) => print_form(&search),
			Ok(command) => {
				if let Err(error) = apply_command(&search, command) {
					println!("  {error}");
				}
			}
		}
		// Let dispatched work and its callbacks settle before prompting again.
		let _ = gateway.execute(|| ());
		if view.finished() {
			break;
		}
	}

	search.close();
	let _ = gateway.execute(|| ());
	gateway.shutdown();

	if let Some(place) = view.take_result() {
		match format {
			OutputFormat::Plain => print_plain(&place),
			OutputFormat::Json => print_json(&place)?,
		}
	}
	Ok(())
}

fn apply_command(search: &AddressSearch, command: Command) -> Result<()> {
	match command {
		Command::Type(field, text) => search.on_filter_changed(field, &text)?,
		Command::Pick(index) => search.on_candidate_selected(index)?,
		Command::Countries => search.on_country_flag_tapped()?,
		Command::Search => search.on_search_button()?,
		Command::List | Command::Form | Command::Help | Command::Quit => {}
	}
	Ok(())
}

fn print_candidates(search: &AddressSearch) {
	let count = search.candidate_count();
	if count == 0 {
		println!("  (no candidates)");
		return;
	}
	for index in 0..count {
		let Some(label) = search.candidate_label(index) else {
			continue;
		};
		match search.candidate_description(index) {
			Some(description) => println!("  [{index}] {label} ({description})"),
			None => println!("  [{index}] {label}"),
		}
	}
}

fn print_form(search: &AddressSearch) {
	let show = |name: &str, place: Option<Arc<Place>>| match place {
		Some(place) => println!("  {name}: {}", place.name),
		None => println!("  {name}: -"),
	};
	show("Country", search.confirmed_country());
	show("State", search.confirmed_state());
	show("City", search.confirmed_city());
	show("Street", search.confirmed_street());

	let editable: Vec<String> = AddressField::ALL
		.into_iter()
		.filter(|field| search.field_enabled(*field))
		.map(|field| format!("{field:?}"))
		.collect();
	println!("  editable: {}", editable.join(", "));
	println!("  editing: {:?}", search.current_field());
}

fn print_plain(place: &Place) {
	println!("{}", place.name);
	let address = &place.address;
	let mut parts = Vec::new();
	if let Some(street) = &address.street {
		parts.push(street.clone());
	}
	if let Some(city) = &address.city {
		parts.push(city.clone());
	}
	if let Some(state) = &address.state_code {
		parts.push(state.clone());
	}
	if let Some(country) = &address.country_code {
		parts.push(country.clone());
	}
	if !parts.is_empty() {
		println!("{}", parts.join(", "));
	}
	if let Some(position) = place.position {
		println!("{:.4}, {:.4}", position.lat, position.lon);
	}
}

fn print_json(place: &Place) -> Result<()> {
	println!("{}", serde_json::to_string_pretty(place)?);
	Ok(())
}
