use athena_utils::contains_ignore_case;

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

const PENDING_SIGNATURE: &str = "pending_signature";
const UNINSURED: &str = "Uninsured";
const INSURED: &str = "Insured";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportDevice {
	#[serde(alias = "asset_tag")]
	pub asset_tag: String,
	#[serde(alias = "serial_number")]
	pub serial_number: String,
	pub model: String,
	/// Raw device status, kept as a string since rows are only ever displayed
	pub status: String,
	#[serde(alias = "insurance_status")]
	pub insurance_status: Option<String>,
	#[serde(alias = "is_insured")]
	pub is_insured: Option<bool>,
}

/// Student ids come back as numbers from some schools and as strings from others
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum Raw {
		Text(String),
		Number(i64),
	}

	Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
		Raw::Text(text) => text,
		Raw::Number(number) => number.to_string(),
	}))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportStudent {
	#[serde(alias = "student_id", deserialize_with = "string_or_number")]
	pub student_id: Option<String>,
	#[serde(alias = "first_name")]
	pub first_name: Option<String>,
	#[serde(alias = "last_name")]
	pub last_name: Option<String>,
	pub name: Option<String>,
	pub email: Option<String>,
}

impl ReportStudent {
	#[must_use]
	pub fn display_name(&self) -> String {
		if let Some(name) = self.name.as_deref().filter(|n| !n.trim().is_empty()) {
			return name.trim().to_string();
		}

		[self.first_name.as_deref(), self.last_name.as_deref()]
			.into_iter()
			.flatten()
			.map(str::trim)
			.filter(|part| !part.is_empty())
			.collect::<Vec<_>>()
			.join(" ")
	}

	/// Identity used to count distinct students
	pub(crate) fn key(&self) -> Option<String> {
		self.student_id
			.clone()
			.or_else(|| self.email.clone())
			.or_else(|| Some(self.display_name()).filter(|n| !n.is_empty()))
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportCheckout {
	pub id: Option<i64>,
	#[serde(alias = "checkout_date")]
	pub checkout_date: Option<String>,
	pub status: Option<String>,
	#[serde(alias = "insurance_status")]
	pub insurance_status: Option<String>,
	/// Older rows only carry this one
	pub insurance: Option<String>,
}

impl ReportCheckout {
	/// Accepts full RFC 3339 timestamps as well as bare dates
	#[must_use]
	pub fn checkout_day(&self) -> Option<NaiveDate> {
		let raw = self.checkout_date.as_deref()?.trim();

		DateTime::parse_from_rfc3339(raw)
			.map(|dt| dt.date_naive())
			.ok()
			.or_else(|| raw.get(..10).and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()))
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportPerson {
	pub name: Option<String>,
	pub email: Option<String>,
}

impl ReportPerson {
	#[must_use]
	pub fn display_name(&self) -> &str {
		self.name
			.as_deref()
			.or(self.email.as_deref())
			.unwrap_or_default()
	}
}

/// One line of the current checkouts report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportRow {
	pub chromebook: ReportDevice,
	pub student: ReportStudent,
	pub checkout: ReportCheckout,
	/// Staff member who processed the checkout
	#[serde(alias = "checked_out_by", alias = "checkedOutBy")]
	pub processor: Option<ReportPerson>,
	#[serde(alias = "days_outstanding")]
	pub days_outstanding: Option<i64>,
	pub school: Option<String>,
}

fn non_empty(value: Option<&String>) -> Option<&str> {
	value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

impl ReportRow {
	/// The most specific insurance status this row knows about
	#[must_use]
	pub fn insurance_status(&self) -> &str {
		non_empty(self.checkout.insurance_status.as_ref())
			.or_else(|| non_empty(self.checkout.insurance.as_ref()))
			.or_else(|| non_empty(self.chromebook.insurance_status.as_ref()))
			.or_else(|| {
				self.chromebook
					.is_insured
					.map(|insured| if insured { INSURED } else { UNINSURED })
			})
			.unwrap_or(UNINSURED)
	}

	#[must_use]
	pub fn is_insured(&self) -> bool {
		self.insurance_status().eq_ignore_ascii_case("insured")
	}

	#[must_use]
	pub fn is_pending(&self) -> bool {
		self.chromebook.status == PENDING_SIGNATURE
			|| self
				.checkout
				.status
				.as_deref()
				.is_some_and(|s| s.eq_ignore_ascii_case("pending"))
	}

	/// Days since checkout, preferring what the server computed
	#[must_use]
	pub fn days_outstanding_at(&self, today: NaiveDate) -> i64 {
		self.days_outstanding
			.or_else(|| {
				self.checkout
					.checkout_day()
					.map(|day| (today - day).num_days().max(0))
			})
			.unwrap_or(0)
	}

	#[must_use]
	pub fn processor_name(&self) -> &str {
		self.processor
			.as_ref()
			.map_or("", ReportPerson::display_name)
	}

	fn matches(&self, search: &str) -> bool {
		let student_name = self.student.display_name();
		let student_id = self.student.student_id.as_deref().unwrap_or_default();

		let matched = [
			self.chromebook.asset_tag.as_str(),
			self.chromebook.serial_number.as_str(),
			self.chromebook.model.as_str(),
			student_name.as_str(),
			student_id,
			self.processor_name(),
		]
		.into_iter()
		.any(|field| contains_ignore_case(field, search));
		matched
	}
}

/// Client side narrowing of the fetched rows: free text search plus the pending toggle
#[must_use]
pub fn filter_rows<'a>(rows: &'a [ReportRow], search: &str, pending_only: bool) -> Vec<&'a ReportRow> {
	let search = search.trim();

	rows.iter()
		.filter(|row| !pending_only || row.is_pending())
		.filter(|row| search.is_empty() || row.matches(search))
		.collect()
}
