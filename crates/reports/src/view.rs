use std::sync::Arc;

use athena_api::{reports::current_checkouts::Query, RequestConfigProvider};
use athena_utils::notify::Notification;

use chrono::NaiveDate;
use tracing::{instrument, warn};

use crate::{
	export::{export_csv, CsvExport},
	row::{filter_rows, ReportRow},
	summary::Summary,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ReportView {
	#[default]
	Loading,
	Loaded(Vec<ReportRow>),
	/// Replaces the table, nothing from an earlier load is kept around
	Failed(Notification),
}

/// State of the current checkouts page: server side filters, the fetched rows and the
/// client side search and pending toggle applied on top of them.
#[derive(Debug, Clone, Default)]
pub struct CurrentCheckouts {
	pub query: Query,
	pub search: String,
	pub pending_only: bool,
	view: ReportView,
}

impl CurrentCheckouts {
	#[must_use]
	pub fn new(query: Query) -> Self {
		Self {
			query,
			..Default::default()
		}
	}

	#[must_use]
	pub const fn view(&self) -> &ReportView {
		&self.view
	}

	#[instrument(skip_all, fields(school = ?self.query.school))]
	pub async fn load<P: RequestConfigProvider>(&mut self, provider: &Arc<P>) {
		self.view = ReportView::Loading;

		let res = athena_api::reports::current_checkouts::<ReportRow>(
			provider.get_request_config().await,
			&self.query,
		)
		.await;

		self.apply(res);
	}

	pub fn apply(&mut self, res: Result<Vec<ReportRow>, athena_api::Error>) {
		self.view = match res {
			Ok(rows) => ReportView::Loaded(rows),
			Err(e) => {
				warn!(%e, "Failed to load current checkouts");
				ReportView::Failed(e.to_notification("Failed to load report"))
			}
		};
	}

	/// Rows left after search and the pending toggle, empty unless loaded
	#[must_use]
	pub fn filtered(&self) -> Vec<&ReportRow> {
		match &self.view {
			ReportView::Loaded(rows) => filter_rows(rows, &self.search, self.pending_only),
			ReportView::Loading | ReportView::Failed(_) => Vec::new(),
		}
	}

	#[must_use]
	pub fn summary(&self, today: NaiveDate) -> Summary {
		Summary::from_rows(self.filtered(), today)
	}

	/// The filename names the processor only when the report is filtered by one. Their
	/// display name is preferred over the raw filter value, which may be an id or an email.
	#[must_use]
	pub fn export(&self, today: NaiveDate) -> Option<CsvExport> {
		let rows = self.filtered();

		let processor = self.query.checkout_by.as_deref().map(|filter| {
			let mut names = rows
				.iter()
				.copied()
				.map(ReportRow::processor_name)
				.filter(|name| !name.is_empty());

			match names.next() {
				Some(first) if names.all(|name| name == first) => first,
				_ => filter,
			}
		});

		export_csv(rows.iter().copied(), today, self.query.school.as_deref(), processor)
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	fn rows() -> Vec<ReportRow> {
		serde_json::from_value(json!([
			{ "chromebook": { "assetTag": "CB-1", "status": "pending_signature" }, "student": { "studentId": "1" } },
			{ "chromebook": { "assetTag": "CB-2", "status": "checked_out" }, "student": { "studentId": "2" } }
		]))
		.expect("rows")
	}

	fn today() -> NaiveDate {
		NaiveDate::from_ymd_opt(2024, 9, 3).expect("date")
	}

	#[test]
	fn pending_toggle_end_to_end() {
		let mut report = CurrentCheckouts::default();
		report.apply(Ok(rows()));

		report.pending_only = true;
		let filtered = report.filtered();
		assert_eq!(filtered.len(), 1);
		assert_eq!(filtered[0].chromebook.asset_tag, "CB-1");
		assert_eq!(report.summary(today()).total, 1);

		report.pending_only = false;
		assert_eq!(report.filtered().len(), 2);
	}

	#[test]
	fn failure_replaces_the_table() {
		let mut report = CurrentCheckouts::default();
		report.apply(Ok(rows()));
		report.apply(Err(athena_api::Error::NotAuthenticated));

		assert!(matches!(report.view(), ReportView::Failed(n) if n.is_error()));
		assert!(report.filtered().is_empty());
		assert_eq!(report.export(today()), None);
	}

	#[test]
	fn export_uses_server_filters_for_the_filename() {
		let mut report = CurrentCheckouts::new(Query {
			school: Some("Lincoln".into()),
			checkout_by: Some("jane doe".into()),
			..Default::default()
		});
		report.apply(Ok(rows()));
		report.search = "cb-2".into();

		let export = report.export(today()).expect("export");
		assert_eq!(
			export.filename,
			"Athena Report - Current Checkouts - 2024-09-03 - Lincoln - Jane Doe.csv"
		);
		assert_eq!(export.contents.lines().count(), 2);
	}

	#[test]
	fn export_names_the_processor_instead_of_the_filter_value() {
		let mut report = CurrentCheckouts::new(Query {
			checkout_by: Some("17".into()),
			..Default::default()
		});
		report.apply(Ok(serde_json::from_value(json!([
			{ "chromebook": { "assetTag": "CB-1" }, "processor": { "name": "jane DOE" } },
			{ "chromebook": { "assetTag": "CB-2" }, "checkedOutBy": { "name": "jane DOE" } }
		]))
		.expect("rows")));

		let export = report.export(today()).expect("export");
		assert_eq!(
			export.filename,
			"Athena Report - Current Checkouts - 2024-09-03 - All Schools - Jane Doe.csv"
		);
	}

	#[test]
	fn export_falls_back_to_the_filter_when_processors_differ() {
		let mut report = CurrentCheckouts::new(Query {
			checkout_by: Some("front office".into()),
			..Default::default()
		});
		report.apply(Ok(serde_json::from_value(json!([
			{ "chromebook": { "assetTag": "CB-1" }, "processor": { "name": "Jane Doe" } },
			{ "chromebook": { "assetTag": "CB-2" }, "processor": { "name": "Sam Lee" } }
		]))
		.expect("rows")));

		let export = report.export(today()).expect("export");
		assert!(export.filename.ends_with(" - All Schools - Front Office.csv"));

		report.query.checkout_by = None;
		let export = report.export(today()).expect("export");
		assert!(export.filename.ends_with(" - All Schools.csv"));
	}
}
