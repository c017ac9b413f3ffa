//! Command line surface of the demo binary.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Interactive guided address search against the simulated engine.
#[derive(Debug, Parser)]
#[command(name = "gazet", version, about)]
pub struct CliArgs {
	/// Gazetteer dataset file (JSON); the built-in sample when omitted.
	#[arg(long, env = "GAZET_DATASET", value_name = "PATH")]
	pub dataset: Option<PathBuf>,

	/// Settings file (TOML).
	#[arg(long, value_name = "PATH")]
	pub config: Option<PathBuf>,

	/// Output format for the finalized address.
	#[arg(long, value_enum, default_value_t = OutputFormat::Plain)]
	pub output: OutputFormat,

	/// Print the effective configuration before starting.
	#[arg(long)]
	pub print_config: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
	Plain,
	Json,
}

/// Parse command line arguments into the strongly typed [`CliArgs`] structure.
pub fn parse_cli() -> CliArgs {
	CliArgs::parse()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_to_plain_output_and_builtin_dataset() {
		let args = CliArgs::parse_from(["gazet"]);
		assert_eq!(args.output, OutputFormat::Plain);
		assert!(args.dataset.is_none());
		assert!(!args.print_config);
	}

	#[test]
	fn accepts_json_output() {
		let args = CliArgs::parse_from(["gazet", "--output", "json"]);
		assert_eq!(args.output, OutputFormat::Json);
	}
}
