//! Address refinement vocabulary: detail levels and form fields.

/// One step of address refinement, from coarsest to finest.
///
/// "No detail" is deliberately not a variant; code that has not settled on a
/// level carries `Option<DetailLevel>` instead.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum DetailLevel {
	Country,
	State,
	City,
	Street,
	HouseNumber,
	Crossing,
}

/// Input fields of the guided address form, in refinement order.
///
/// Fields map one-to-one onto [`DetailLevel`]s; the distinction exists
/// because the form talks about what the user is editing while the engine
/// talks about what kind of place it returns.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum AddressField {
	Country,
	State,
	City,
	StreetName,
	StreetNumber,
	Crossing,
}

impl AddressField {
	/// Every field, in form order.
	pub const ALL: [AddressField; 6] = [
		AddressField::Country,
		AddressField::State,
		AddressField::City,
		AddressField::StreetName,
		AddressField::StreetNumber,
		AddressField::Crossing,
	];

	/// The detail level searched while this field is being edited.
	#[must_use]
	pub fn detail_level(self) -> DetailLevel {
		match self {
			AddressField::Country => DetailLevel::Country,
			AddressField::State => DetailLevel::State,
			AddressField::City => DetailLevel::City,
			AddressField::StreetName => DetailLevel::Street,
			AddressField::StreetNumber => DetailLevel::HouseNumber,
			AddressField::Crossing => DetailLevel::Crossing,
		}
	}

	/// The field that holds results of the given level.
	#[must_use]
	pub fn for_level(level: DetailLevel) -> AddressField {
		match level {
			DetailLevel::Country => AddressField::Country,
			DetailLevel::State => AddressField::State,
			DetailLevel::City => AddressField::City,
			DetailLevel::Street => AddressField::StreetName,
			DetailLevel::HouseNumber => AddressField::StreetNumber,
			DetailLevel::Crossing => AddressField::Crossing,
		}
	}

	/// Whether selecting a result in this field completes the whole flow.
	#[must_use]
	pub fn is_terminal(self) -> bool {
		matches!(self, AddressField::StreetNumber | AddressField::Crossing)
	}

	/// Index into per-field tables such as the enabled map.
	#[must_use]
	pub(crate) fn index(self) -> usize {
		self as usize
	}
}

/// Per-field flags, e.g. "is this input currently editable".
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FieldFlags([bool; AddressField::ALL.len()]);

impl FieldFlags {
	/// All fields cleared.
	#[must_use]
	pub fn none() -> Self {
		Self([false; AddressField::ALL.len()])
	}

	#[must_use]
	pub fn get(&self, field: AddressField) -> bool {
		self.0[field.index()]
	}

	pub fn set(&mut self, field: AddressField, value: bool) {
		self.0[field.index()] = value;
	}
}

impl Default for FieldFlags {
	fn default() -> Self {
		Self::none()
	}
}
