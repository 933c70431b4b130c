use std::sync::Arc;

use athena_api::{
	sandbox::{self, SandboxStatus},
	Error, RequestConfigProvider,
};

use async_trait::async_trait;
use serde_json::Value;

/// Everything the sandbox controller and overlay viewer need from the backend
#[async_trait]
pub trait SandboxBackend: Send + Sync + 'static {
	async fn status(&self) -> Result<SandboxStatus, Error>;

	async fn enable(&self, ttl_minutes: Option<u32>) -> Result<(), Error>;

	async fn disable(&self) -> Result<(), Error>;

	async fn overlay(&self) -> Result<Value, Error>;
}

pub struct ApiSandbox<P> {
	provider: Arc<P>,
}

impl<P: RequestConfigProvider> ApiSandbox<P> {
	pub const fn new(provider: Arc<P>) -> Self {
		Self { provider }
	}
}

#[async_trait]
impl<P: RequestConfigProvider> SandboxBackend for ApiSandbox<P> {
	async fn status(&self) -> Result<SandboxStatus, Error> {
		sandbox::status(self.provider.get_request_config().await).await
	}

	async fn enable(&self, ttl_minutes: Option<u32>) -> Result<(), Error> {
		sandbox::enable(self.provider.get_request_config().await, ttl_minutes).await
	}

	async fn disable(&self) -> Result<(), Error> {
		sandbox::disable(self.provider.get_request_config().await).await
	}

	async fn overlay(&self) -> Result<Value, Error> {
		sandbox::overlay(self.provider.get_request_config().await).await
	}
}
