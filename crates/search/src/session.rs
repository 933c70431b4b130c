use std::{sync::Arc, time::Duration};

use athena_api::{devices, Device, RequestConfigProvider};
use athena_utils::task::AbortOnDrop;

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::{
	debounce::{Debouncer, DEFAULT_DEBOUNCE},
	merge::{candidates, SearchHit},
};

/// Queries shorter than this (after trimming) never reach the remote search
pub const MIN_REMOTE_CHARS: usize = 3;

#[async_trait]
pub trait RemoteSearch: Send + Sync + 'static {
	async fn search(&self, query: &str) -> Result<Vec<Device>, athena_api::Error>;
}

/// Remote search backed by the Athena device search endpoint
pub struct ApiRemoteSearch<P> {
	provider: Arc<P>,
}

impl<P: RequestConfigProvider> ApiRemoteSearch<P> {
	pub const fn new(provider: Arc<P>) -> Self {
		Self { provider }
	}
}

#[async_trait]
impl<P: RequestConfigProvider> RemoteSearch for ApiRemoteSearch<P> {
	async fn search(&self, query: &str) -> Result<Vec<Device>, athena_api::Error> {
		devices::search(self.provider.get_request_config().await, query).await
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchSettings {
	pub debounce: Duration,
	pub min_remote_chars: usize,
}

impl Default for SearchSettings {
	fn default() -> Self {
		Self {
			debounce: DEFAULT_DEBOUNCE,
			min_remote_chars: MIN_REMOTE_CHARS,
		}
	}
}

#[derive(Debug, Clone, Default)]
struct RemoteState {
	/// Debounced query the driver last acted upon
	query: String,
	results: Vec<Device>,
	in_flight: usize,
}

/// State behind the device picker: the local device cache, the live query and the
/// debounced remote search results.
///
/// The session owns its timers; dropping it cancels the debounce timer and stops
/// reacting to new queries. Remote calls already in flight are left alone and whatever
/// lands last is what gets shown.
pub struct SearchSession {
	local: Vec<Device>,
	query: String,
	settings: SearchSettings,
	debouncer: Debouncer<String>,
	remote: Arc<watch::Sender<RemoteState>>,
	focus_requested: bool,
	_driver: AbortOnDrop<()>,
}

impl SearchSession {
	pub fn new(local: Vec<Device>, remote: Arc<dyn RemoteSearch>, settings: SearchSettings) -> Self {
		let debouncer = Debouncer::new(String::new(), settings.debounce);
		let state = Arc::new(watch::channel(RemoteState::default()).0);

		let driver = AbortOnDrop::spawn(drive(
			debouncer.subscribe(),
			remote,
			Arc::clone(&state),
			settings.min_remote_chars,
		));

		Self {
			local,
			query: String::new(),
			settings,
			debouncer,
			remote: state,
			focus_requested: false,
			_driver: driver,
		}
	}

	pub fn set_local(&mut self, local: Vec<Device>) {
		self.local = local;
	}

	#[must_use]
	pub fn local(&self) -> &[Device] {
		&self.local
	}

	pub fn set_query(&mut self, query: impl Into<String>) {
		self.query = query.into();
		self.debouncer.set(self.query.clone());
	}

	#[must_use]
	pub fn query(&self) -> &str {
		&self.query
	}

	#[must_use]
	pub fn debounced_query(&self) -> String {
		self.debouncer.current()
	}

	/// True while the input hasn't settled yet or a remote call is still running
	#[must_use]
	pub fn is_searching(&self) -> bool {
		let remote = self.remote.borrow();
		remote.query != self.query || remote.in_flight > 0
	}

	#[must_use]
	pub fn remote_results(&self) -> Vec<Device> {
		self.remote.borrow().results.clone()
	}

	fn remote_enabled(&self) -> bool {
		self.query.trim().chars().count() >= self.settings.min_remote_chars
	}

	#[must_use]
	pub fn candidates(&self) -> Vec<SearchHit> {
		if self.remote_enabled() {
			candidates(&self.query, &self.local, &self.remote.borrow().results)
		} else {
			candidates(&self.query, &self.local, &[])
		}
	}

	/// Enter key: picks the candidate if there is exactly one
	pub fn submit(&self, select: impl FnOnce(&SearchHit)) -> bool {
		match self.candidates().as_slice() {
			[only] => {
				select(only);
				true
			}
			_ => false,
		}
	}

	/// Ask the view to focus the search input on its next render
	pub fn request_focus(&mut self) {
		self.focus_requested = true;
	}

	/// Consumes a pending focus request
	pub fn take_focus_request(&mut self) -> bool {
		std::mem::take(&mut self.focus_requested)
	}

	/// Waits until the current query has been debounced and its remote search answered
	pub async fn settled(&self) {
		let mut remote_rx = self.remote.subscribe();

		while self.is_searching() {
			if remote_rx.changed().await.is_err() {
				break;
			}
		}
	}
}

async fn drive(
	mut queries: watch::Receiver<String>,
	remote: Arc<dyn RemoteSearch>,
	state: Arc<watch::Sender<RemoteState>>,
	min_remote_chars: usize,
) {
	while queries.changed().await.is_ok() {
		let query = queries.borrow_and_update().clone();
		let trimmed = query.trim().to_string();

		if trimmed.chars().count() < min_remote_chars {
			state.send_modify(|s| {
				s.query = query;
				s.results.clear();
			});
			continue;
		}

		state.send_modify(|s| {
			s.query = query;
			s.in_flight += 1;
		});

		debug!(query = %trimmed, "Running remote device search");

		tokio::spawn({
			let remote = Arc::clone(&remote);
			let state = Arc::clone(&state);
			async move {
				let res = remote.search(&trimmed).await;
				state.send_modify(|s| {
					s.in_flight -= 1;
					match res {
						Ok(devices) => s.results = devices,
						Err(e) => warn!(query = %trimmed, %e, "Remote device search failed"),
					}
				});
			}
		});
	}
}
