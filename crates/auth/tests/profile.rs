use athena_api::{auth::BearerToken, RequestConfig};
use athena_auth::{AuthState, MemoryTokenStore, Role, StoredSession, TokenStore};

use std::{net::TcpListener, sync::Arc};

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

fn logged_in() -> (Arc<MemoryTokenStore>, AuthState) {
	let store = Arc::new(MemoryTokenStore::with_session(StoredSession {
		token: BearerToken::new("stale"),
		profile: None,
	}));
	let auth = AuthState::new(Arc::clone(&store) as Arc<dyn TokenStore>);
	auth.init().expect("init");
	(store, auth)
}

#[tokio::test]
async fn accepted_token_gets_a_profile() {
	let base = serve(Router::new().route(
		"/api/auth/me",
		get(|| async { Json(json!({ "id": 3, "email": "tech@district.org", "role": "admin" })) }),
	))
	.await;
	let (store, auth) = logged_in();

	let profile = auth
		.refresh_profile(&RequestConfig::new(&base))
		.await
		.expect("profile");

	assert_eq!(profile.role, Role::Admin);
	assert_eq!(auth.role(), Role::Admin);
	assert!(store.load().expect("load").is_some_and(|s| s.profile.is_some()));
}

#[tokio::test]
async fn rejected_token_is_dropped() {
	let base = serve(Router::new().route(
		"/api/auth/me",
		get(|| async { (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Invalid token" }))) }),
	))
	.await;
	let (store, auth) = logged_in();

	let res = auth.refresh_profile(&RequestConfig::new(&base)).await;

	assert!(matches!(res, Err(athena_auth::Error::Api(ref e)) if e.is_not_authenticated()));
	assert!(!auth.snapshot().is_authenticated());
	assert_eq!(store.load().expect("load"), None);
}

#[tokio::test]
async fn server_errors_keep_the_token() {
	let base = serve(Router::new().route(
		"/api/auth/me",
		get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
	))
	.await;
	let (store, auth) = logged_in();

	let res = auth.refresh_profile(&RequestConfig::new(&base)).await;

	assert!(matches!(res, Err(athena_auth::Error::Api(_))));
	assert!(auth.snapshot().is_authenticated());
	assert!(store.load().expect("load").is_some());
}
