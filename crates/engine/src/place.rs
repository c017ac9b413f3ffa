//! Opaque place records returned by the engine.

use serde::{Deserialize, Serialize};

/// Geographic position in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
	pub lat: f64,
	pub lon: f64,
}

/// Structured address components attached to a place.
///
/// Which components are present depends on the place's refinement level: a
/// country carries only its code, a street carries the whole chain above it.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
	/// ISO 3166-1 alpha-2 country code.
	pub country_code: Option<String>,
	pub state_code: Option<String>,
	pub city: Option<String>,
	pub street: Option<String>,
}

/// A place at some refinement level: a country, a state, a city, a street or
/// an address point.
///
/// Places are produced by the engine and treated as immutable snapshots from
/// then on; a newer search supersedes them, nothing mutates them. They are
/// shared between the coordinator and UI code behind `Arc`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Place {
	pub name: String,
	#[serde(default)]
	pub address: Address,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub position: Option<Coordinates>,
}

impl Place {
	#[must_use]
	pub fn named(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			address: Address::default(),
			position: None,
		}
	}

	#[must_use]
	pub fn with_address(mut self, address: Address) -> Self {
		self.address = address;
		self
	}

	#[must_use]
	pub fn with_position(mut self, position: Coordinates) -> Self {
		self.position = Some(position);
		self
	}

	/// ISO country code, when known.
	#[must_use]
	pub fn country_code(&self) -> Option<&str> {
		self.address.country_code.as_deref()
	}

	#[must_use]
	pub fn state_code(&self) -> Option<&str> {
		self.address.state_code.as_deref()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn builder_fills_address_fields() {
		let place = Place::named("Bavaria").with_address(Address {
			country_code: Some("DE".into()),
			state_code: Some("BY".into()),
			..Address::default()
		});
		assert_eq!(place.country_code(), Some("DE"));
		assert_eq!(place.state_code(), Some("BY"));
		assert_eq!(place.address.city, None);
	}

	#[test]
	fn serializes_without_missing_position() {
		let json = serde_json::to_value(Place::named("Munich")).unwrap();
		assert!(json.get("position").is_none());
	}
}
