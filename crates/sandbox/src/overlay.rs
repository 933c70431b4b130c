use std::{
	sync::{
		atomic::{AtomicUsize, Ordering},
		Arc,
	},
	time::Duration,
};

use athena_utils::task::AbortOnDrop;

use serde_json::Value;
use tokio::{
	sync::watch,
	time::{interval, MissedTickBehavior},
};
use tracing::{debug, trace};

use crate::{backend::SandboxBackend, controller::SandboxState};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Controls {
	open: bool,
	auto_refresh: bool,
}

impl Controls {
	const fn should_poll(self, sandbox_active: bool) -> bool {
		self.open && self.auto_refresh && sandbox_active
	}
}

/// Counts live poll intervals, decremented when the interval is dropped
struct TimerGuard(Arc<AtomicUsize>);

impl TimerGuard {
	fn start(count: &Arc<AtomicUsize>) -> Self {
		count.fetch_add(1, Ordering::SeqCst);
		Self(Arc::clone(count))
	}
}

impl Drop for TimerGuard {
	fn drop(&mut self) {
		self.0.fetch_sub(1, Ordering::SeqCst);
	}
}

/// The detached panel showing the raw sandbox overlay diff.
///
/// A single supervisor task, owned by the viewer, watches the panel controls and the
/// sandbox state. It keeps one poll interval alive while the panel is open, auto refresh
/// is on and the sandbox is active, and drops it as soon as any of those goes false.
pub struct OverlayViewer {
	backend: Arc<dyn SandboxBackend>,
	controls: watch::Sender<Controls>,
	payload: Arc<watch::Sender<Option<Value>>>,
	timers: Arc<AtomicUsize>,
	_supervisor: AbortOnDrop<()>,
}

impl OverlayViewer {
	/// Mounts a closed viewer with auto refresh on
	pub fn new(
		backend: Arc<dyn SandboxBackend>,
		sandbox: watch::Receiver<SandboxState>,
		poll_interval: Duration,
	) -> Self {
		let (controls, controls_rx) = watch::channel(Controls {
			open: false,
			auto_refresh: true,
		});
		let payload = Arc::new(watch::channel(None).0);
		let timers = Arc::new(AtomicUsize::new(0));

		let supervisor = AbortOnDrop::spawn(supervise(
			Arc::clone(&backend),
			controls_rx,
			sandbox,
			Arc::clone(&payload),
			Arc::clone(&timers),
			poll_interval,
		));

		Self {
			backend,
			controls,
			payload,
			timers,
			_supervisor: supervisor,
		}
	}

	pub fn set_open(&self, open: bool) {
		self.controls.send_if_modified(|c| {
			let changed = c.open != open;
			c.open = open;
			changed
		});
	}

	pub fn set_auto_refresh(&self, auto_refresh: bool) {
		self.controls.send_if_modified(|c| {
			let changed = c.auto_refresh != auto_refresh;
			c.auto_refresh = auto_refresh;
			changed
		});
	}

	#[must_use]
	pub fn is_open(&self) -> bool {
		self.controls.borrow().open
	}

	#[must_use]
	pub fn auto_refresh(&self) -> bool {
		self.controls.borrow().auto_refresh
	}

	/// Fetches the overlay once, outside of the polling schedule
	pub async fn refresh_now(&self) {
		fetch(self.backend.as_ref(), &self.payload).await;
	}

	#[must_use]
	pub fn payload(&self) -> Option<Value> {
		self.payload.borrow().clone()
	}

	pub fn subscribe(&self) -> watch::Receiver<Option<Value>> {
		self.payload.subscribe()
	}

	/// The payload pretty printed as is
	#[must_use]
	pub fn render(&self) -> String {
		self.payload
			.borrow()
			.as_ref()
			.map_or_else(|| "No overlay data yet".to_string(), render)
	}

	/// Number of poll intervals currently alive, never more than one
	#[must_use]
	pub fn active_timers(&self) -> usize {
		self.timers.load(Ordering::SeqCst)
	}
}

#[must_use]
pub fn render(payload: &Value) -> String {
	serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string())
}

async fn fetch(backend: &dyn SandboxBackend, payload: &watch::Sender<Option<Value>>) {
	match backend.overlay().await {
		Ok(value) => {
			payload.send_replace(Some(value));
		}
		Err(e) => debug!(%e, "Failed to fetch sandbox overlay"),
	}
}

fn should_poll(
	controls: &mut watch::Receiver<Controls>,
	sandbox: &mut watch::Receiver<SandboxState>,
) -> bool {
	let active = sandbox.borrow_and_update().active;
	controls.borrow_and_update().should_poll(active)
}

async fn supervise(
	backend: Arc<dyn SandboxBackend>,
	mut controls: watch::Receiver<Controls>,
	mut sandbox: watch::Receiver<SandboxState>,
	payload: Arc<watch::Sender<Option<Value>>>,
	timers: Arc<AtomicUsize>,
	poll_interval: Duration,
) {
	loop {
		if should_poll(&mut controls, &mut sandbox) {
			trace!("Starting overlay polling");
			let _guard = TimerGuard::start(&timers);
			let mut ticker = interval(poll_interval);
			ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

			loop {
				tokio::select! {
					_ = ticker.tick() => fetch(backend.as_ref(), &payload).await,
					res = controls.changed() => {
						if res.is_err() {
							return;
						}
						if !should_poll(&mut controls, &mut sandbox) {
							break;
						}
					}
					res = sandbox.changed() => {
						if res.is_err() {
							return;
						}
						if !should_poll(&mut controls, &mut sandbox) {
							break;
						}
					}
				}
			}

			trace!("Stopped overlay polling");
		} else {
			tokio::select! {
				res = controls.changed() => if res.is_err() { return },
				res = sandbox.changed() => if res.is_err() { return },
			}
		}
	}
}
