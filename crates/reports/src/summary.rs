use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Serialize;

use crate::row::ReportRow;

/// Figures shown above the report table, computed from the filtered rows only
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
	pub total: usize,
	pub distinct_students: usize,
	pub mean_days_outstanding: f64,
	pub insured_count: usize,
	pub insured_percent: f64,
}

impl Summary {
	#[must_use]
	#[allow(clippy::cast_precision_loss)]
	pub fn from_rows<'a>(rows: impl IntoIterator<Item = &'a ReportRow>, today: NaiveDate) -> Self {
		let mut students = HashSet::new();
		let mut total = 0_usize;
		let mut days = 0_i64;
		let mut insured_count = 0_usize;

		for row in rows {
			total += 1;
			days += row.days_outstanding_at(today);
			if row.is_insured() {
				insured_count += 1;
			}
			if let Some(key) = row.student.key() {
				students.insert(key);
			}
		}

		if total == 0 {
			return Self::default();
		}

		Self {
			total,
			distinct_students: students.len(),
			mean_days_outstanding: days as f64 / total as f64,
			insured_count,
			insured_percent: insured_count as f64 / total as f64 * 100.0,
		}
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	fn today() -> NaiveDate {
		NaiveDate::from_ymd_opt(2024, 9, 1).expect("date")
	}

	#[test]
	fn empty_report_has_zeroes() {
		let summary = Summary::from_rows(&[], today());
		assert_eq!(summary, Summary::default());
		assert!(summary.insured_percent.abs() < f64::EPSILON);
	}

	#[test]
	fn reduces_rows() {
		let rows: Vec<ReportRow> = serde_json::from_value(json!([
			{ "student": { "studentId": "1" }, "daysOutstanding": 10, "checkout": { "insuranceStatus": "Insured" } },
			{ "student": { "studentId": "1" }, "daysOutstanding": 20, "chromebook": { "isInsured": false } },
			{ "student": { "studentId": "2" }, "daysOutstanding": 30, "chromebook": { "insuranceStatus": "insured" } },
			{ "student": { "name": "No Id" }, "daysOutstanding": 0 }
		]))
		.expect("rows");

		let summary = Summary::from_rows(&rows, today());
		assert_eq!(summary.total, 4);
		assert_eq!(summary.distinct_students, 3);
		assert!((summary.mean_days_outstanding - 15.0).abs() < f64::EPSILON);
		assert_eq!(summary.insured_count, 2);
		assert!((summary.insured_percent - 50.0).abs() < f64::EPSILON);
	}
}
