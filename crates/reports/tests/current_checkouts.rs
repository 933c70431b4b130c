use athena_api::{auth::BearerToken, RequestConfig};
use athena_reports::{CurrentCheckouts, ReportQuery, ReportView};

use std::{collections::HashMap, net::TcpListener, sync::Arc};

use axum::{extract::Query, http::StatusCode, routing::get, Json, Router};
use chrono::NaiveDate;
use serde_json::json;

async fn serve(app: Router) -> String {
	let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
	let addr = listener.local_addr().expect("local addr");

	tokio::spawn(async move {
		axum::Server::from_tcp(listener)
			.expect("from_tcp")
			.serve(app.into_make_service())
			.await
			.expect("server");
	});

	format!("http://{addr}")
}

fn provider(base: &str) -> Arc<RequestConfig> {
	Arc::new(RequestConfig::new(base).with_token(Some(BearerToken::new("t"))))
}

#[tokio::test]
async fn loads_filters_summarizes_and_exports() {
	let base = serve(Router::new().route(
		"/reports/current-checkouts",
		get(|Query(params): Query<HashMap<String, String>>| async move {
			assert_eq!(params.get("school").map(String::as_str), Some("Lincoln"));
			assert_eq!(params.get("includePending").map(String::as_str), Some("true"));

			Json(json!([
				{
					"chromebook": { "assetTag": "CB-1", "serialNumber": "SN1", "status": "pending_signature" },
					"student": { "studentId": 1, "firstName": "Ana", "lastName": "Lopez" },
					"checkout": { "status": "pending", "insurance": "insured" },
					"processor": { "name": "mr. smith" },
					"daysOutstanding": 2
				},
				{
					"chromebook": { "assetTag": "CB-2", "serialNumber": "SN2", "status": "checked_out", "isInsured": false },
					"student": { "studentId": 2, "name": "Ben Ode" },
					"checkout": { "status": "active" },
					"daysOutstanding": 8
				}
			]))
		}),
	))
	.await;

	let mut report = CurrentCheckouts::new(ReportQuery {
		school: Some("Lincoln".into()),
		include_pending: true,
		..Default::default()
	});
	report.load(&provider(&base)).await;

	assert!(matches!(report.view(), ReportView::Loaded(rows) if rows.len() == 2));

	let today = NaiveDate::from_ymd_opt(2024, 9, 3).expect("date");
	let summary = report.summary(today);
	assert_eq!(summary.total, 2);
	assert_eq!(summary.distinct_students, 2);
	assert_eq!(summary.insured_count, 1);
	assert!((summary.insured_percent - 50.0).abs() < f64::EPSILON);
	assert!((summary.mean_days_outstanding - 5.0).abs() < f64::EPSILON);

	report.pending_only = true;
	let export = report.export(today).expect("export");
	assert_eq!(
		export.filename,
		"Athena Report - Current Checkouts - 2024-09-03 - Lincoln.csv"
	);
	assert_eq!(export.contents.lines().count(), 2);
	assert!(export.contents.ends_with("\"mr. smith\",\"pending\",\"insured\""));
}

#[tokio::test]
async fn server_error_shows_message_instead_of_rows() {
	let base = serve(Router::new().route(
		"/reports/current-checkouts",
		get(|| async {
			(
				StatusCode::INTERNAL_SERVER_ERROR,
				Json(json!({ "error": "Report service unavailable" })),
			)
		}),
	))
	.await;

	let mut report = CurrentCheckouts::default();
	report.load(&provider(&base)).await;

	match report.view() {
		ReportView::Failed(notification) => {
			assert_eq!(notification.title, "Failed to load report");
			assert_eq!(notification.description, "Report service unavailable");
		}
		other => panic!("expected a failure, got {other:?}"),
	}
}

#[tokio::test]
async fn missing_token_fails_without_calling_the_server() {
	let mut report = CurrentCheckouts::default();
	report
		.load(&Arc::new(RequestConfig::new("http://127.0.0.1:9")))
		.await;

	assert!(matches!(
		report.view(),
		ReportView::Failed(n) if n.title == "Not authenticated"
	));
}
