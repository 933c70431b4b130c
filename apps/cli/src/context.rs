use std::{path::PathBuf, sync::Arc};

use athena_api::{RequestConfig, RequestConfigProvider};
use athena_auth::{AuthState, AuthenticatedRequests, FileTokenStore};
use athena_config::ClientConfig;
use athena_utils::notify::{Notification, Notifier};

use anyhow::{Context as _, Result};

use crate::util::output::ConsoleNotifier;

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
	Human,
	Json,
}

/// Everything a command needs, built once at startup
pub struct Context {
	pub format: OutputFormat,
	pub data_dir: PathBuf,
	pub config: ClientConfig,
	/// Anonymous request config, used for endpoints that never need a token
	pub base: RequestConfig,
	pub auth: Arc<AuthState>,
	pub requests: Arc<AuthenticatedRequests>,
	notifier: ConsoleNotifier,
}

impl Context {
	pub fn new(format: OutputFormat, data_dir: PathBuf, api_url: Option<String>) -> Result<Self> {
		let mut config = ClientConfig::load(&data_dir).context("Failed to load client configuration")?;

		// Command line and environment win over the stored value, without persisting it
		if let Some(api_url) = api_url {
			config.api_url = api_url;
		}

		let base = RequestConfig::new(&config.api_url);

		let auth = Arc::new(AuthState::new(Arc::new(FileTokenStore::in_data_dir(
			&data_dir,
		))));
		auth.init().context("Failed to load the stored session")?;

		let requests = Arc::new(AuthenticatedRequests::new(base.clone(), Arc::clone(&auth)));

		Ok(Self {
			format,
			data_dir,
			config,
			base,
			auth,
			requests,
			notifier: ConsoleNotifier::new(format),
		})
	}

	/// Request config carrying the current token, if any
	pub async fn request_config(&self) -> RequestConfig {
		self.requests.get_request_config().await
	}

	pub fn notify(&self, notification: Notification) {
		self.notifier.notify(notification);
	}
}
