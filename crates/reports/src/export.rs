use std::{
	fs, io,
	path::{Path, PathBuf},
};

use athena_utils::title_case;

use chrono::NaiveDate;
use tracing::info;

use crate::row::ReportRow;

pub const CSV_HEADER: [&str; 11] = [
	"Asset Tag",
	"Serial Number",
	"Model",
	"Device Status",
	"Student Name",
	"Student ID",
	"Checkout Date",
	"Days Outstanding",
	"Checked Out By",
	"Checkout Status",
	"Insurance Status",
];

const ALL_SCHOOLS: &str = "All Schools";

#[derive(thiserror::Error, Debug)]
pub enum ExportError {
	#[error("failed to write report to '{}': {source}", .path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: io::Error,
	},
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
	pub filename: String,
	pub contents: String,
}

impl CsvExport {
	/// Writes the document into `dir` under its generated filename
	pub fn write_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf, ExportError> {
		let dir = dir.as_ref();
		fs::create_dir_all(dir).map_err(|source| ExportError::Io {
			path: dir.to_path_buf(),
			source,
		})?;

		let path = dir.join(&self.filename);
		fs::write(&path, &self.contents).map_err(|source| ExportError::Io {
			path: path.clone(),
			source,
		})?;

		info!(path = %path.display(), "Exported current checkouts report");
		Ok(path)
	}
}

/// `Athena Report - Current Checkouts - {date} - {school}{ - Checkout Person}.csv`
#[must_use]
pub fn filename(date: NaiveDate, school: Option<&str>, processor: Option<&str>) -> String {
	let school = school
		.map(str::trim)
		.filter(|s| !s.is_empty())
		.unwrap_or(ALL_SCHOOLS);

	let processor = processor
		.map(str::trim)
		.filter(|p| !p.is_empty())
		.map(|p| format!(" - {}", title_case(p)))
		.unwrap_or_default();

	format!(
		"Athena Report - Current Checkouts - {} - {school}{processor}.csv",
		date.format("%Y-%m-%d")
	)
}

// Values are quoted as they are; embedded quotes are not escaped.
fn quoted<'a>(fields: impl IntoIterator<Item = &'a str>) -> String {
	fields
		.into_iter()
		.map(|field| format!("\"{field}\""))
		.collect::<Vec<_>>()
		.join(",")
}

fn record(row: &ReportRow, today: NaiveDate) -> String {
	let checkout_date = row
		.checkout
		.checkout_day()
		.map(|day| day.format("%Y-%m-%d").to_string())
		.or_else(|| row.checkout.checkout_date.clone())
		.unwrap_or_default();
	let days = row.days_outstanding_at(today).to_string();
	let student_name = row.student.display_name();

	quoted([
		row.chromebook.asset_tag.as_str(),
		row.chromebook.serial_number.as_str(),
		row.chromebook.model.as_str(),
		row.chromebook.status.as_str(),
		student_name.as_str(),
		row.student.student_id.as_deref().unwrap_or_default(),
		checkout_date.as_str(),
		days.as_str(),
		row.processor_name(),
		row.checkout.status.as_deref().unwrap_or_default(),
		row.insurance_status(),
	])
}

/// Builds the CSV document for the filtered rows, `None` when there is nothing to export
#[must_use]
pub fn export_csv<'a>(
	rows: impl IntoIterator<Item = &'a ReportRow>,
	date: NaiveDate,
	school: Option<&str>,
	processor: Option<&str>,
) -> Option<CsvExport> {
	let records = rows
		.into_iter()
		.map(|row| record(row, date))
		.collect::<Vec<_>>();

	if records.is_empty() {
		return None;
	}

	let contents = std::iter::once(quoted(CSV_HEADER))
		.chain(records)
		.collect::<Vec<_>>()
		.join("\n");

	Some(CsvExport {
		filename: filename(date, school, processor),
		contents,
	})
}
