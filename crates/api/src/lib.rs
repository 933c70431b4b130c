//! Client for the Athena REST backend.
//!
//! One module per endpoint, each exposing an `exec` function that takes a fresh
//! [`RequestConfig`]. Endpoints that mutate state or expose protected data require a
//! bearer token and fail with [`Error::NotAuthenticated`] before sending anything when
//! none is available.

pub mod auth;
mod error;
mod types;

use std::{future::Future, sync::Arc};

use auth::BearerToken;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, instrument};

pub use error::Error;
pub use types::{Device, DeviceStatus, InsuranceStatus, Role, UserProfile};

#[derive(Clone, Debug)]
pub struct RequestConfig {
	pub client: reqwest::Client,
	pub api_url: String,
	pub auth_token: Option<BearerToken>,
}

impl RequestConfig {
	pub fn new(api_url: impl Into<String>) -> Self {
		Self {
			client: reqwest::Client::new(),
			api_url: api_url.into().trim_end_matches('/').to_string(),
			auth_token: None,
		}
	}

	#[must_use]
	pub fn with_token(mut self, token: Option<BearerToken>) -> Self {
		self.auth_token = token;
		self
	}

	fn url(&self, path: &str) -> String {
		format!("{}{path}", self.api_url)
	}

	fn require_token(&self) -> Result<&BearerToken, Error> {
		self.auth_token.as_ref().ok_or(Error::NotAuthenticated)
	}
}

pub trait RequestConfigProvider: Send + Sync + 'static {
	fn get_request_config(self: &Arc<Self>) -> impl Future<Output = RequestConfig> + Send;
}

impl RequestConfigProvider for RequestConfig {
	async fn get_request_config(self: &Arc<Self>) -> RequestConfig {
		RequestConfig::clone(self)
	}
}

trait WithAuth {
	fn with_auth(self, token: &BearerToken) -> Self;
	fn with_optional_auth(self, token: Option<&BearerToken>) -> Self;
}

impl WithAuth for reqwest::RequestBuilder {
	fn with_auth(self, token: &BearerToken) -> Self {
		self.header(reqwest::header::AUTHORIZATION, token.header_value())
	}

	fn with_optional_auth(self, token: Option<&BearerToken>) -> Self {
		match token {
			Some(token) => self.with_auth(token),
			None => self,
		}
	}
}

/// Sends the request, turning non-2xx responses into [`Error::Status`]
async fn send(req: reqwest::RequestBuilder) -> Result<reqwest::Response, Error> {
	let res = req.send().await?;
	let status = res.status();

	if status.is_success() {
		Ok(res)
	} else {
		let body = res.text().await.unwrap_or_default();
		debug!(%status, %body, "Request failed");
		Err(Error::from_status(status, &body))
	}
}

async fn send_json<T: DeserializeOwned>(req: reqwest::RequestBuilder) -> Result<T, Error> {
	let bytes = send(req).await?.bytes().await?;
	serde_json::from_slice(&bytes).map_err(|e| Error::Decode(e.to_string()))
}

async fn send_empty(req: reqwest::RequestBuilder) -> Result<(), Error> {
	send(req).await.map(|_| ())
}

pub mod sandbox {
	use super::*;

	#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
	#[serde(rename_all = "camelCase")]
	pub struct SandboxStatus {
		pub sandbox: bool,
		#[serde(default)]
		pub session_id: Option<String>,
		/// Remaining lifetime in minutes, as reported by the server
		#[serde(default)]
		pub ttl: Option<u64>,
	}

	pub use status::exec as status;
	pub mod status {
		use super::*;

		#[instrument(skip_all)]
		pub async fn exec(config: RequestConfig) -> Result<SandboxStatus, Error> {
			send_json(
				config
					.client
					.get(config.url("/api/sandbox"))
					.with_optional_auth(config.auth_token.as_ref()),
			)
			.await
		}
	}

	pub use enable::exec as enable;
	pub mod enable {
		use super::*;

		#[instrument(skip(config))]
		pub async fn exec(config: RequestConfig, ttl_minutes: Option<u32>) -> Result<(), Error> {
			let token = config.require_token()?;

			let body = match ttl_minutes {
				Some(ttl) => json!({ "ttlMinutes": ttl }),
				None => json!({}),
			};

			send_empty(
				config
					.client
					.post(config.url("/api/sandbox/enable"))
					.json(&body)
					.with_auth(token),
			)
			.await
		}
	}

	pub use disable::exec as disable;
	pub mod disable {
		use super::*;

		#[instrument(skip_all)]
		pub async fn exec(config: RequestConfig) -> Result<(), Error> {
			let token = config.require_token()?;

			send_empty(
				config
					.client
					.post(config.url("/api/sandbox/disable"))
					.with_auth(token),
			)
			.await
		}
	}

	pub use overlay::exec as overlay;
	pub mod overlay {
		use super::*;

		/// The diff payload is opaque to the client and rendered verbatim
		pub type Response = serde_json::Value;

		#[instrument(skip_all)]
		pub async fn exec(config: RequestConfig) -> Result<Response, Error> {
			send_json(
				config
					.client
					.get(config.url("/api/sandbox/overlay"))
					.with_optional_auth(config.auth_token.as_ref()),
			)
			.await
		}
	}
}

pub mod insurance {
	use super::*;

	pub use override_status::exec as override_status;
	pub mod override_status {
		use super::*;

		#[derive(Debug, Clone, PartialEq, Eq)]
		pub struct Input {
			pub chromebook_id: i64,
			/// `None` until the operator picks a status
			pub new_insurance_status: Option<InsuranceStatus>,
			pub override_reason: Option<String>,
		}

		#[derive(Serialize)]
		struct Body<'a> {
			chromebook_id: i64,
			new_insurance_status: InsuranceStatus,
			#[serde(skip_serializing_if = "Option::is_none")]
			override_reason: Option<&'a str>,
		}

		#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
		pub struct Response {
			pub success: bool,
			#[serde(default)]
			pub message: Option<String>,
			#[serde(default)]
			pub data: Option<ResponseData>,
		}

		#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
		pub struct ResponseData {
			#[serde(default)]
			pub workflow_explanation: Option<String>,
		}

		#[instrument(skip(config))]
		pub async fn exec(config: RequestConfig, input: &Input) -> Result<Response, Error> {
			let Some(new_insurance_status) = input.new_insurance_status else {
				return Err(Error::Validation(
					"Please select an insurance status".to_string(),
				));
			};

			let token = config.require_token()?;

			send_json(
				config
					.client
					.post(config.url("/api/insurance-override"))
					.json(&Body {
						chromebook_id: input.chromebook_id,
						new_insurance_status,
						override_reason: input
							.override_reason
							.as_deref()
							.map(str::trim)
							.filter(|r| !r.is_empty()),
					})
					.with_auth(token),
			)
			.await
		}
	}
}

pub mod reports {
	use super::*;

	pub use current_checkouts::exec as current_checkouts;
	pub mod current_checkouts {
		use super::*;

		/// Server-side filters of the current checkouts report
		#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
		#[serde(rename_all = "camelCase")]
		pub struct Query {
			#[serde(skip_serializing_if = "Option::is_none")]
			pub school: Option<String>,
			#[serde(skip_serializing_if = "Option::is_none")]
			pub checkout_by: Option<String>,
			pub include_subdirectories: bool,
			pub include_pending: bool,
		}

		/// Rows are decoded into whatever projection the caller asks for
		#[instrument(skip(config))]
		pub async fn exec<Row: DeserializeOwned>(
			config: RequestConfig,
			query: &Query,
		) -> Result<Vec<Row>, Error> {
			let token = config.require_token()?;

			send_json(
				config
					.client
					.get(config.url("/reports/current-checkouts"))
					.query(query)
					.with_auth(token),
			)
			.await
		}
	}
}

pub mod sso {
	use super::*;

	pub use config::exec as config;
	pub mod config {
		use super::*;

		#[instrument(skip_all)]
		pub async fn exec<Doc: DeserializeOwned>(config: RequestConfig) -> Result<Doc, Error> {
			send_json(config.client.get(config.url("/api/sso/config"))).await
		}
	}

	pub use static_config::exec as static_config;
	pub mod static_config {
		use super::*;

		/// Fetch the `sso-config.json` served next to the dashboard
		#[instrument(skip(client))]
		pub async fn exec<Doc: DeserializeOwned>(
			client: &reqwest::Client,
			static_origin: &str,
		) -> Result<Doc, Error> {
			send_json(client.get(format!(
				"{}/sso-config.json",
				static_origin.trim_end_matches('/')
			)))
			.await
		}
	}
}

pub mod devices {
	use super::*;

	pub use list::exec as list;
	pub mod list {
		use super::*;

		#[instrument(skip_all)]
		pub async fn exec(config: RequestConfig) -> Result<Vec<Device>, Error> {
			let token = config.require_token()?;

			send_json(
				config
					.client
					.get(config.url("/api/chromebooks"))
					.with_auth(token),
			)
			.await
		}
	}

	pub use search::exec as search;
	pub mod search {
		use super::*;

		#[instrument(skip(config))]
		pub async fn exec(config: RequestConfig, query: &str) -> Result<Vec<Device>, Error> {
			let token = config.require_token()?;

			send_json(
				config
					.client
					.get(config.url("/api/chromebooks/search"))
					.query(&[("q", query)])
					.with_auth(token),
			)
			.await
		}
	}
}

pub mod user {
	use super::*;

	pub use me::exec as me;
	pub mod me {
		use super::*;

		#[instrument(skip_all)]
		pub async fn exec(config: RequestConfig) -> Result<UserProfile, Error> {
			let token = config.require_token()?;

			send_json(
				config
					.client
					.get(config.url("/api/auth/me"))
					.with_auth(token),
			)
			.await
		}
	}
}
