//! Demo settings: an optional TOML file layered under the CLI flags.

use std::path::PathBuf;

use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;

use crate::cli::CliArgs;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct RawSettings {
	engine: EngineSection,
	demo: DemoSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct EngineSection {
	result_limit: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct DemoSection {
	dataset: Option<PathBuf>,
	default_country: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ResolvedSettings {
	pub dataset: Option<PathBuf>,
	pub result_limit: usize,
	pub default_country: Option<String>,
}

impl ResolvedSettings {
	pub fn print_summary(&self) {
		println!("Effective configuration:");
		match &self.dataset {
			Some(path) => println!("  Dataset: {}", path.display()),
			None => println!("  Dataset: built-in sample"),
		}
		println!("  Result limit: {}", self.result_limit);
		if let Some(country) = &self.default_country {
			println!("  Default country: {country}");
		}
	}
}

/// Resolve the effective settings; CLI flags win over the settings file.
pub fn load(cli: &CliArgs) -> Result<ResolvedSettings> {
	let raw = match &cli.config {
		Some(path) => Config::builder()
			.add_source(File::from(path.as_path()))
			.build()
			.with_context(|| format!("failed to load settings from {}", path.display()))?
			.try_deserialize::<RawSettings>()
			.context("malformed settings file")?,
		None => RawSettings::default(),
	};

	Ok(ResolvedSettings {
		dataset: cli.dataset.clone().or(raw.demo.dataset),
		result_limit: raw.engine.result_limit.unwrap_or(gazet::sim::DEFAULT_RESULT_LIMIT),
		default_country: raw.demo.default_country,
	})
}
