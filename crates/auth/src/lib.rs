//! Authentication state and SSO configuration of the Athena client

use std::{io, path::PathBuf};

pub mod sso;
mod state;
mod store;

pub use state::{AuthSnapshot, AuthState, AuthenticatedRequests};
pub use store::{FileTokenStore, MemoryTokenStore, StoredSession, TokenStore};

pub use athena_api::{auth::BearerToken, Role, UserProfile};

#[derive(thiserror::Error, Debug)]
pub enum Error {
	#[error("token store I/O error at '{}': {source}", .path.display())]
	Store {
		path: PathBuf,
		#[source]
		source: io::Error,
	},
	#[error("token store at '{}' is corrupt: {source}", .path.display())]
	CorruptStore {
		path: PathBuf,
		#[source]
		source: serde_json::Error,
	},
	#[error("token store lock poisoned")]
	Poisoned,
	#[error(transparent)]
	Api(#[from] athena_api::Error),
}
