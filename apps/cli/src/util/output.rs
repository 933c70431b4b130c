use athena_utils::notify::{Level, Notification, Notifier};

use comfy_table::{presets::UTF8_BORDERS_ONLY, Table};
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::error;

use crate::context::OutputFormat;

pub fn print_json<T: Serialize + ?Sized>(value: &T) {
	match serde_json::to_string_pretty(value) {
		Ok(json) => println!("{json}"),
		Err(e) => error!("Failed to serialize output: {e:#}"),
	}
}

pub fn table(header: &[&str]) -> Table {
	let mut table = Table::new();
	table.load_preset(UTF8_BORDERS_ONLY);
	table.set_header(header.to_vec());
	table
}

/// Shows notifications on the terminal, errors go to stderr
#[derive(Debug, Clone, Copy)]
pub struct ConsoleNotifier {
	format: OutputFormat,
}

impl ConsoleNotifier {
	pub const fn new(format: OutputFormat) -> Self {
		Self { format }
	}
}

impl Notifier for ConsoleNotifier {
	fn notify(&self, notification: Notification) {
		match (self.format, notification.level) {
			(OutputFormat::Json, Level::Error) => match serde_json::to_string_pretty(&notification) {
				Ok(json) => eprintln!("{json}"),
				Err(_) => eprintln!("{notification}"),
			},
			(OutputFormat::Json, _) => print_json(&notification),
			(OutputFormat::Human, Level::Error) => eprintln!("{} {notification}", "✗".red()),
			(OutputFormat::Human, Level::Success) => println!("{} {notification}", "✓".green()),
			(OutputFormat::Human, Level::Info) => println!("{} {notification}", "•".blue()),
		}
	}
}
