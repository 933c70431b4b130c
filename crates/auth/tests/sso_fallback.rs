use athena_api::RequestConfig;
use athena_auth::{sso, Role};

use std::net::TcpListener;

use axum::{http::StatusCode, routing::get, Json, Router};
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

#[tokio::test]
async fn api_document_is_preferred() {
	let base = serve(
		Router::new()
			.route(
				"/api/sso/config",
				get(|| async { Json(json!({ "branding": { "appName": "Athena (API)" } })) }),
			)
			.route(
				"/sso-config.json",
				get(|| async { Json(json!({ "branding": { "appName": "Athena (static)" } })) }),
			),
	)
	.await;

	let config = sso::load(RequestConfig::new(&base), &base)
		.await
		.expect("load");
	assert_eq!(config.branding.app_name, "Athena (API)");
}

#[tokio::test]
async fn falls_back_to_static_file() {
	let base = serve(
		Router::new()
			.route(
				"/api/sso/config",
				get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
			)
			.route(
				"/sso-config.json",
				get(|| async {
					Json(json!({
						"providers": [{ "id": "google", "name": "Google", "type": "google" }],
						"accessControl": { "adminEmails": ["tech@district.org"] }
					}))
				}),
			),
	)
	.await;

	let config = sso::load(RequestConfig::new(&base), &base)
		.await
		.expect("load");
	assert_eq!(config.providers.len(), 1);
	assert_eq!(
		config.evaluate("tech@district.org", Some("google")),
		sso::AccessDecision::Allowed(Role::Admin)
	);
}

#[tokio::test]
async fn both_sources_failing_is_an_error() {
	let base = serve(Router::new()).await;

	assert!(sso::load(RequestConfig::new(&base), &base).await.is_err());
}
