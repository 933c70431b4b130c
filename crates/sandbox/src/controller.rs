use std::{sync::Arc, time::Duration};

use athena_auth::{AuthSnapshot, Role};
use athena_utils::error::report_error;

use serde::Serialize;
use strum::Display;
use tokio::{
	sync::watch,
	time::{interval, MissedTickBehavior},
};
use tracing::{debug, info, instrument};

use crate::backend::SandboxBackend;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SandboxPhase {
	#[default]
	Disabled,
	Enabling,
	Enabled,
	Disabling,
}

impl SandboxPhase {
	#[must_use]
	pub const fn is_busy(self) -> bool {
		matches!(self, Self::Enabling | Self::Disabling)
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SandboxState {
	pub active: bool,
	pub session_id: Option<String>,
	/// Minutes left before the server expires the session
	pub ttl: Option<u64>,
	pub phase: SandboxPhase,
}

impl SandboxState {
	const fn settled_phase(&self) -> SandboxPhase {
		if self.active {
			SandboxPhase::Enabled
		} else {
			SandboxPhase::Disabled
		}
	}
}

/// What an enable or disable request ended up doing.
///
/// Failures are already logged by the controller, this only lets a front end decide
/// what to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum ToggleOutcome {
	/// The current role may not touch the sandbox, nothing was sent
	NotPermitted,
	/// Another enable or disable is still running
	Busy,
	Applied,
	Failed,
}

/// What the sandbox toggle control shows, only ever produced for admins
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleView {
	pub active: bool,
	pub busy: bool,
	pub session_id: Option<String>,
	pub ttl: Option<u64>,
}

/// Sole owner of the sandbox session state.
///
/// Expiry is enforced by the server; the controller never times a session out by itself,
/// it only re-syncs through [`SandboxController::refresh`].
pub struct SandboxController {
	backend: Arc<dyn SandboxBackend>,
	auth: watch::Receiver<AuthSnapshot>,
	state: watch::Sender<SandboxState>,
}

impl SandboxController {
	pub fn new(backend: Arc<dyn SandboxBackend>, auth: watch::Receiver<AuthSnapshot>) -> Self {
		Self {
			backend,
			auth,
			state: watch::channel(SandboxState::default()).0,
		}
	}

	pub async fn init(&self) {
		self.refresh().await;
	}

	fn role(&self) -> Role {
		self.auth.borrow().role()
	}

	/// Re-sync with the server. Failures leave the current state as it is.
	#[instrument(skip(self))]
	pub async fn refresh(&self) {
		match self.backend.status().await {
			Ok(status) => {
				self.state.send_modify(|state| {
					state.active = status.sandbox;
					state.session_id = status.session_id;
					state.ttl = status.ttl;
					if !state.phase.is_busy() {
						state.phase = state.settled_phase();
					}
				});
			}
			Err(e) => debug!(%e, "Failed to refresh sandbox state, keeping the previous one"),
		}
	}

	/// Refreshes every `period` until the returned future is dropped, so a session the
	/// server expired or ended from elsewhere shows up in the state
	pub async fn resync_every(&self, period: Duration) {
		let mut ticker = interval(period);
		ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
		// The first tick completes immediately, the state is already fresh
		ticker.tick().await;

		loop {
			ticker.tick().await;
			self.refresh().await;
		}
	}

	#[instrument(skip(self))]
	pub async fn enable(&self, ttl_minutes: Option<u32>) -> ToggleOutcome {
		if !self.begin(SandboxPhase::Enabling) {
			return self.rejection();
		}

		let res = self.backend.enable(ttl_minutes).await;
		self.finish(res, "enable").await
	}

	#[instrument(skip(self))]
	pub async fn disable(&self) -> ToggleOutcome {
		if !self.begin(SandboxPhase::Disabling) {
			return self.rejection();
		}

		let res = self.backend.disable().await;
		self.finish(res, "disable").await
	}

	/// Moves into `phase` if the role allows it and nothing else is running
	fn begin(&self, phase: SandboxPhase) -> bool {
		if !self.role().is_admin() {
			return false;
		}

		self.state.send_if_modified(|state| {
			if state.phase.is_busy() {
				false
			} else {
				state.phase = phase;
				true
			}
		})
	}

	fn rejection(&self) -> ToggleOutcome {
		if self.role().is_admin() {
			ToggleOutcome::Busy
		} else {
			debug!(role = %self.role(), "Ignoring sandbox toggle from non admin");
			ToggleOutcome::NotPermitted
		}
	}

	async fn finish(&self, res: Result<(), athena_api::Error>, action: &str) -> ToggleOutcome {
		let failed = report_error(format_args!("Failed to {action} sandbox"), &res);
		let outcome = if failed {
			ToggleOutcome::Failed
		} else {
			info!("Sandbox {action} succeeded");
			self.refresh().await;
			ToggleOutcome::Applied
		};

		self.state.send_if_modified(|state| {
			let settled = state.settled_phase();
			let changed = state.phase != settled;
			state.phase = settled;
			changed
		});

		outcome
	}

	#[must_use]
	pub fn state(&self) -> SandboxState {
		self.state.borrow().clone()
	}

	#[must_use]
	pub fn is_active(&self) -> bool {
		self.state.borrow().active
	}

	/// `None` means the toggle isn't rendered at all
	#[must_use]
	pub fn toggle_view(&self) -> Option<ToggleView> {
		if !self.role().is_admin() {
			return None;
		}

		let state = self.state.borrow();
		Some(ToggleView {
			active: state.active,
			busy: state.phase.is_busy(),
			session_id: state.session_id.clone(),
			ttl: state.ttl,
		})
	}

	#[must_use]
	pub fn subscribe(&self) -> watch::Receiver<SandboxState> {
		self.state.subscribe()
	}
}

#[cfg(test)]
mod tests {
	use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

	use athena_api::{sandbox::SandboxStatus, Error, UserProfile};

	use async_trait::async_trait;
	use serde_json::Value;
	use tracing_test::traced_test;

	use super::*;

	#[derive(Default)]
	struct FakeBackend {
		active: AtomicBool,
		calls: AtomicUsize,
		fail_toggle: bool,
		fail_status: AtomicBool,
	}

	#[async_trait]
	impl SandboxBackend for FakeBackend {
		async fn status(&self) -> Result<SandboxStatus, Error> {
			self.calls.fetch_add(1, Ordering::SeqCst);
			if self.fail_status.load(Ordering::SeqCst) {
				return Err(Error::Validation("offline".into()));
			}
			let active = self.active.load(Ordering::SeqCst);
			Ok(SandboxStatus {
				sandbox: active,
				session_id: active.then(|| "sess-1".to_string()),
				ttl: active.then_some(30),
			})
		}

		async fn enable(&self, _ttl_minutes: Option<u32>) -> Result<(), Error> {
			self.calls.fetch_add(1, Ordering::SeqCst);
			if self.fail_toggle {
				return Err(Error::Validation("sandbox unavailable".into()));
			}
			self.active.store(true, Ordering::SeqCst);
			Ok(())
		}

		async fn disable(&self) -> Result<(), Error> {
			self.calls.fetch_add(1, Ordering::SeqCst);
			if self.fail_toggle {
				return Err(Error::Validation("sandbox unavailable".into()));
			}
			self.active.store(false, Ordering::SeqCst);
			Ok(())
		}

		async fn overlay(&self) -> Result<Value, Error> {
			Ok(Value::Null)
		}
	}

	fn auth(role: Role) -> watch::Receiver<AuthSnapshot> {
		watch::channel(AuthSnapshot {
			token: None,
			profile: Some(UserProfile {
				id: None,
				email: "someone@district.org".into(),
				name: None,
				role,
			}),
		})
		.1
	}

	#[tokio::test]
	async fn non_admin_enable_is_a_silent_no_op() {
		let backend = Arc::new(FakeBackend::default());
		let controller = SandboxController::new(backend.clone(), auth(Role::User));

		assert_eq!(controller.enable(Some(15)).await, ToggleOutcome::NotPermitted);
		assert_eq!(controller.disable().await, ToggleOutcome::NotPermitted);

		assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
		assert!(!controller.is_active());
		assert_eq!(controller.toggle_view(), None);
	}

	#[tokio::test]
	async fn admin_enable_then_disable() {
		let backend = Arc::new(FakeBackend::default());
		let controller = SandboxController::new(backend.clone(), auth(Role::Admin));
		let mut rx = controller.subscribe();

		controller.init().await;
		assert_eq!(controller.state().phase, SandboxPhase::Disabled);

		assert_eq!(controller.enable(None).await, ToggleOutcome::Applied);
		assert!(rx.has_changed().expect("sender alive"));

		let state = rx.borrow_and_update().clone();
		assert!(state.active);
		assert_eq!(state.phase, SandboxPhase::Enabled);
		assert_eq!(state.session_id.as_deref(), Some("sess-1"));
		assert_eq!(state.ttl, Some(30));

		assert_eq!(controller.disable().await, ToggleOutcome::Applied);
		let state = controller.state();
		assert!(!state.active);
		assert_eq!(state.phase, SandboxPhase::Disabled);
		assert_eq!(state.session_id, None);
	}

	#[tokio::test]
	#[traced_test]
	async fn failures_are_logged_not_returned_as_errors() {
		let backend = Arc::new(FakeBackend {
			fail_toggle: true,
			..Default::default()
		});
		let controller = SandboxController::new(backend, auth(Role::SuperAdmin));

		assert_eq!(controller.enable(Some(5)).await, ToggleOutcome::Failed);

		let state = controller.state();
		assert!(!state.active);
		assert_eq!(state.phase, SandboxPhase::Disabled);
		assert!(logs_contain("Failed to enable sandbox: sandbox unavailable"));
	}

	#[tokio::test]
	async fn refresh_failure_keeps_previous_state() {
		let backend = Arc::new(FakeBackend::default());
		backend.active.store(true, Ordering::SeqCst);

		let controller = SandboxController::new(backend.clone(), auth(Role::Admin));
		controller.init().await;
		assert!(controller.is_active());

		backend.fail_status.store(true, Ordering::SeqCst);
		backend.active.store(false, Ordering::SeqCst);
		controller.refresh().await;

		assert!(controller.is_active());
		assert_eq!(controller.state().session_id.as_deref(), Some("sess-1"));
	}

	#[tokio::test(start_paused = true)]
	async fn resync_picks_up_server_side_expiry() {
		let backend = Arc::new(FakeBackend::default());
		backend.active.store(true, Ordering::SeqCst);

		let controller = SandboxController::new(backend.clone(), auth(Role::User));
		controller.init().await;
		assert!(controller.is_active());

		backend.active.store(false, Ordering::SeqCst);
		let _ = tokio::time::timeout(
			Duration::from_millis(2500),
			controller.resync_every(Duration::from_secs(2)),
		)
		.await;

		assert!(!controller.is_active());
		assert_eq!(controller.state().phase, SandboxPhase::Disabled);
		// init plus a single resync, the immediate first tick is skipped
		assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
	}

	#[tokio::test]
	async fn toggle_view_for_admins() {
		let backend = Arc::new(FakeBackend::default());
		let controller = SandboxController::new(backend, auth(Role::SuperAdmin));

		assert_eq!(
			controller.toggle_view(),
			Some(ToggleView {
				active: false,
				busy: false,
				session_id: None,
				ttl: None,
			})
		);
	}

	#[test]
	fn phase_names() {
		assert_eq!(SandboxPhase::Enabling.to_string(), "enabling");
		assert!(SandboxPhase::Disabling.is_busy());
		assert!(!SandboxPhase::Enabled.is_busy());
	}
}
