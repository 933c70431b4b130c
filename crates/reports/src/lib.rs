#![warn(
	clippy::all,
	clippy::pedantic,
	clippy::correctness,
	clippy::perf,
	clippy::style,
	clippy::suspicious,
	clippy::complexity,
	clippy::nursery,
	clippy::unwrap_used,
	unused_qualifications,
	rust_2018_idioms,
	trivial_casts,
	trivial_numeric_casts,
	unused_allocation,
	clippy::dbg_macro,
	deprecated
)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

//! Current checkouts report: row projection, client side filtering, summary figures
//! and CSV export.

mod export;
mod row;
mod summary;
mod view;

pub use export::{export_csv, filename, CsvExport, ExportError, CSV_HEADER};
pub use row::{filter_rows, ReportCheckout, ReportDevice, ReportPerson, ReportRow, ReportStudent};
pub use summary::Summary;
pub use view::{CurrentCheckouts, ReportView};

pub use athena_api::reports::current_checkouts::Query as ReportQuery;
