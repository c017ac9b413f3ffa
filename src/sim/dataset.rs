//! Gazetteer dataset backing the simulated engine.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use gazet_engine::Coordinates;

#[derive(Debug, Error)]
pub enum DatasetError {
	#[error("failed to read dataset file")]
	Io(#[from] std::io::Error),

	#[error("malformed dataset")]
	Parse(#[from] serde_json::Error),
}

/// Hierarchical world the simulator serves: countries, optionally split into
/// states, down to streets with house numbers and crossings.
#[derive(Clone, Debug, Deserialize)]
pub struct Dataset {
	pub countries: Vec<CountryRecord>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CountryRecord {
	pub name: String,
	/// ISO 3166-1 alpha-2 code.
	pub iso: String,
	#[serde(default)]
	pub states: Vec<StateRecord>,
	/// Cities attached directly to the country, for countries that have no
	/// state level.
	#[serde(default)]
	pub cities: Vec<CityRecord>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct StateRecord {
	pub name: String,
	pub code: String,
	#[serde(default)]
	pub cities: Vec<CityRecord>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CityRecord {
	pub name: String,
	#[serde(default)]
	pub position: Option<Coordinates>,
	#[serde(default)]
	pub streets: Vec<StreetRecord>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct StreetRecord {
	pub name: String,
	#[serde(default)]
	pub numbers: Vec<String>,
	#[serde(default)]
	pub crossings: Vec<String>,
}

impl Dataset {
	pub fn from_path(path: &Path) -> Result<Self, DatasetError> {
		let text = fs::read_to_string(path)?;
		Ok(serde_json::from_str(&text)?)
	}

	/// Small built-in world: one country with states, one without.
	#[must_use]
	pub fn builtin() -> Self {
		let leopoldstrasse = StreetRecord {
			name: "Leopoldstrasse".into(),
			numbers: vec!["10".into(), "12".into(), "14".into()],
			crossings: vec!["Georgenstrasse".into(), "Ungererstrasse".into()],
		};
		let marienplatz = StreetRecord {
			name: "Marienplatz".into(),
			numbers: vec!["1".into(), "8".into()],
			crossings: Vec::new(),
		};
		let munich = CityRecord {
			name: "Munich".into(),
			position: Some(Coordinates { lat: 48.137, lon: 11.575 }),
			streets: vec![leopoldstrasse, marienplatz],
		};
		let nuremberg = CityRecord {
			name: "Nuremberg".into(),
			position: Some(Coordinates { lat: 49.452, lon: 11.077 }),
			streets: vec![StreetRecord {
				name: "Koenigstrasse".into(),
				numbers: vec!["5".into()],
				crossings: Vec::new(),
			}],
		};
		let berlin_city = CityRecord {
			name: "Berlin".into(),
			position: Some(Coordinates { lat: 52.520, lon: 13.405 }),
			streets: vec![StreetRecord {
				name: "Unter den Linden".into(),
				numbers: vec!["1".into(), "77".into()],
				crossings: vec!["Friedrichstrasse".into()],
			}],
		};
		let germany = CountryRecord {
			name: "Germany".into(),
			iso: "DE".into(),
			states: vec![
				StateRecord {
					name: "Bavaria".into(),
					code: "BY".into(),
					cities: vec![munich, nuremberg],
				},
				StateRecord {
					name: "Berlin".into(),
					code: "BE".into(),
					cities: vec![berlin_city],
				},
			],
			cities: Vec::new(),
		};
		let andorra = CountryRecord {
			name: "Andorra".into(),
			iso: "AD".into(),
			states: Vec::new(),
			cities: vec![CityRecord {
				name: "Andorra la Vella".into(),
				position: Some(Coordinates { lat: 42.507, lon: 1.521 }),
				streets: vec![StreetRecord {
					name: "Avinguda Meritxell".into(),
					numbers: vec!["32".into()],
					crossings: Vec::new(),
				}],
			}],
		};
		Self {
			countries: vec![germany, andorra],
		}
	}
}
