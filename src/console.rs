//! Console rendering of coordinator notifications plus demo input parsing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use gazet::{AddressField, AddressView, Place, SearchReason};

/// Prints coordinator notifications and remembers the finalized place.
///
/// Notifications arrive on the engine thread; printing to a locked stdout is
/// safe there, so no extra thread hop is needed in this view.
#[derive(Default)]
pub struct ConsoleView {
	finished: AtomicBool,
	result: Mutex<Option<Arc<Place>>>,
}

impl ConsoleView {
	pub fn finished(&self) -> bool {
		self.finished.load(Ordering::Acquire)
	}

	pub fn take_result(&self) -> Option<Arc<Place>> {
		self.result
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.take()
	}
}

impl AddressView for ConsoleView {
	fn show_busy(&self) {
		println!("  ... searching");
	}

	fn refresh_results(&self) {
		println!("  results updated (try `list`)");
	}

	fn refresh_all(&self) {
		println!("  form changed (try `form`)");
	}

	fn set_field_text(&self, field: AddressField, text: &str) {
		println!("  {field:?} set to {text:?}");
	}

	fn focus_field(&self, field: AddressField) {
		println!("  focus moved to {field:?}");
	}

	fn search_failed(&self, reason: SearchReason) {
		println!("  search failed: {reason:?}");
	}

	fn session_finished(&self, place: Arc<Place>) {
		*self
			.result
			.lock()
			.unwrap_or_else(PoisonError::into_inner) = Some(place);
		self.finished.store(true, Ordering::Release);
	}
}

/// One line of demo input.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
	/// Edit a field's filter text.
	Type(AddressField, String),
	/// Tap the candidate at the given index.
	Pick(usize),
	/// Print the current candidate list.
	List,
	/// Print confirmed parents and field states.
	Form,
	/// Open the country picker.
	Countries,
	/// Finalize with the deepest confirmed entity.
	Search,
	Help,
	Quit,
}

pub fn parse_command(line: &str) -> Result<Command, String> {
	let mut words = line.split_whitespace();
	let Some(verb) = words.next() else {
		return Err("empty command; try `help`".into());
	};
	match verb {
		"type" => {
			let field = words
				.next()
				.and_then(parse_field)
				.ok_or_else(|| format!("usage: type <{}> <text>", FIELD_NAMES.join("|")))?;
			let text = words.collect::<Vec<_>>().join(" ");
			Ok(Command::Type(field, text))
		}
		"pick" => words
			.next()
			.and_then(|token| token.parse().ok())
			.map(Command::Pick)
			.ok_or_else(|| "usage: pick <index>".into()),
		"list" => Ok(Command::List),
		"form" => Ok(Command::Form),
		"countries" => Ok(Command::Countries),
		"search" => Ok(Command::Search),
		"help" => Ok(Command::Help),
		"quit" | "exit" => Ok(Command::Quit),
		other => Err(format!("unknown command {other:?}; try `help`")),
	}
}

const FIELD_NAMES: [&str; 6] = ["country", "state", "city", "street", "number", "crossing"];

fn parse_field(token: &str) -> Option<AddressField> {
	match token.to_ascii_lowercase().as_str() {
		"country" => Some(AddressField::Country),
		"state" => Some(AddressField::State),
		"city" => Some(AddressField::City),
		"street" => Some(AddressField::StreetName),
		"number" => Some(AddressField::StreetNumber),
		"crossing" => Some(AddressField::Crossing),
		_ => None,
	}
}

pub fn print_help() {
	println!("commands:");
	println!("  type <country|state|city|street|number|crossing> <text>");
	println!("  pick <index>      confirm a candidate");
	println!("  list              show candidates");
	println!("  form              show confirmed parents and editable fields");
	println!("  countries         open the country picker");
	println!("  search            finalize with the deepest confirmed entity");
	println!("  quit");
}
