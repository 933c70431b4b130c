use std::path::Path;

use athena_config::{ClientConfig, KEYS};

use anyhow::Result;
use clap::Subcommand;

use crate::{
	context::OutputFormat,
	util::{output::table, prelude::*},
};

#[derive(Subcommand, Debug)]
pub enum ConfigCmd {
	/// Show all configuration
	Show,
	/// Get a configuration value
	Get {
		/// Configuration key (e.g. "api_url", "search.debounce_ms")
		key: String,
	},
	/// Set a configuration value, an empty value clears optional keys
	Set {
		/// Configuration key
		key: String,
		/// Configuration value
		value: String,
	},
}

pub fn run(format: OutputFormat, data_dir: &Path, cmd: ConfigCmd) -> Result<()> {
	let mut config = ClientConfig::load(data_dir)?;

	match cmd {
		ConfigCmd::Show => match format {
			OutputFormat::Json => crate::util::output::print_json(&config),
			OutputFormat::Human => {
				let mut table = table(&["Key", "Value"]);
				for key in KEYS {
					let value = config.get(key)?.unwrap_or_else(|| "(not set)".to_string());
					table.add_row(vec![key.to_string(), value]);
				}

				println!("{table}");
				println!();
				println!(
					"Config file: {}",
					ClientConfig::config_path(data_dir).display()
				);
			}
		},
		ConfigCmd::Get { key } => {
			let value = config.get(&key)?;
			match format {
				OutputFormat::Json => crate::util::output::print_json(&value),
				OutputFormat::Human => {
					println!("{}", value.as_deref().unwrap_or("(not set)"));
				}
			}
		}
		ConfigCmd::Set { key, value } => {
			config.set(&key, &value, data_dir)?;
			if !matches!(format, OutputFormat::Json) {
				println!("Set {key} = {value}");
			}
		}
	}

	Ok(())
}
