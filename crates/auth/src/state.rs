use std::sync::Arc;

use athena_api::{auth::BearerToken, user, RequestConfig, RequestConfigProvider, Role, UserProfile};

use tokio::sync::watch;
use tracing::{debug, info, instrument};

use crate::{
	store::{StoredSession, TokenStore},
	Error,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthSnapshot {
	pub token: Option<BearerToken>,
	pub profile: Option<UserProfile>,
}

impl AuthSnapshot {
	#[must_use]
	pub const fn is_authenticated(&self) -> bool {
		self.token.is_some()
	}

	/// Anonymous and profile-less sessions are plain users
	#[must_use]
	pub fn role(&self) -> Role {
		self.profile.as_ref().map_or(Role::User, |p| p.role)
	}
}

/// Owner of the authentication state.
///
/// Created once by the composition root, `init` loads whatever the token store holds and
/// `logout` tears it down again. Everybody else only reads through [`AuthState::subscribe`]
/// or the accessors.
pub struct AuthState {
	store: Arc<dyn TokenStore>,
	state: watch::Sender<AuthSnapshot>,
}

impl AuthState {
	pub fn new(store: Arc<dyn TokenStore>) -> Self {
		Self {
			store,
			state: watch::channel(AuthSnapshot::default()).0,
		}
	}

	pub fn init(&self) -> Result<(), Error> {
		let snapshot = self
			.store
			.load()?
			.map(|StoredSession { token, profile }| AuthSnapshot {
				token: Some(token),
				profile,
			})
			.unwrap_or_default();

		debug!(
			authenticated = snapshot.is_authenticated(),
			role = %snapshot.role(),
			"Loaded stored session"
		);

		self.state.send_replace(snapshot);
		Ok(())
	}

	pub fn login(&self, token: BearerToken, profile: Option<UserProfile>) -> Result<(), Error> {
		let session = StoredSession { token, profile };
		self.store.save(&session)?;

		info!(
			email = session.profile.as_ref().map(|p| p.email.as_str()),
			"Logged in"
		);

		self.state.send_replace(AuthSnapshot {
			token: Some(session.token),
			profile: session.profile,
		});
		Ok(())
	}

	pub fn logout(&self) -> Result<(), Error> {
		self.store.clear()?;
		self.state.send_replace(AuthSnapshot::default());
		info!("Logged out");
		Ok(())
	}

	/// Ask the backend who we are and persist the answer alongside the token
	#[instrument(skip_all)]
	pub async fn refresh_profile(&self, base: &RequestConfig) -> Result<UserProfile, Error> {
		let token = self.require_token()?;

		let profile = match user::me(base.clone().with_token(Some(token.clone()))).await {
			Ok(profile) => profile,
			Err(e) => {
				// A token the backend refuses is never worth keeping, other failures may pass
				if e.is_not_authenticated() {
					info!("Backend rejected the stored token, logging out");
					self.logout()?;
				}
				return Err(e.into());
			}
		};

		self.login(token, Some(profile.clone()))?;
		Ok(profile)
	}

	#[must_use]
	pub fn snapshot(&self) -> AuthSnapshot {
		self.state.borrow().clone()
	}

	#[must_use]
	pub fn token(&self) -> Option<BearerToken> {
		self.state.borrow().token.clone()
	}

	#[must_use]
	pub fn role(&self) -> Role {
		self.state.borrow().role()
	}

	pub fn require_token(&self) -> Result<BearerToken, athena_api::Error> {
		self.token().ok_or(athena_api::Error::NotAuthenticated)
	}

	#[must_use]
	pub fn subscribe(&self) -> watch::Receiver<AuthSnapshot> {
		self.state.subscribe()
	}
}

/// Hands out request configs carrying whatever token the auth state holds right now
pub struct AuthenticatedRequests {
	base: RequestConfig,
	auth: Arc<AuthState>,
}

impl AuthenticatedRequests {
	pub fn new(base: RequestConfig, auth: Arc<AuthState>) -> Self {
		Self { base, auth }
	}
}

impl RequestConfigProvider for AuthenticatedRequests {
	async fn get_request_config(self: &Arc<Self>) -> RequestConfig {
		self.base.clone().with_token(self.auth.token())
	}
}
