use std::{
	fs, io,
	path::{Path, PathBuf},
	sync::Mutex,
};

use athena_api::{auth::BearerToken, UserProfile};

use serde::{Deserialize, Serialize};

use crate::Error;

const TOKEN_FILE: &str = "token.json";

/// What survives between runs: the bearer token and the profile it was issued for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
	pub token: BearerToken,
	#[serde(default)]
	pub profile: Option<UserProfile>,
}

pub trait TokenStore: Send + Sync {
	fn load(&self) -> Result<Option<StoredSession>, Error>;
	fn save(&self, session: &StoredSession) -> Result<(), Error>;
	fn clear(&self) -> Result<(), Error>;
}

/// Token kept as JSON in the data directory
#[derive(Debug, Clone)]
pub struct FileTokenStore {
	path: PathBuf,
}

impl FileTokenStore {
	#[must_use]
	pub fn in_data_dir(data_dir: &Path) -> Self {
		Self {
			path: data_dir.join(TOKEN_FILE),
		}
	}

	#[must_use]
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn io_err(&self, source: io::Error) -> Error {
		Error::Store {
			path: self.path.clone(),
			source,
		}
	}
}

impl TokenStore for FileTokenStore {
	fn load(&self) -> Result<Option<StoredSession>, Error> {
		match fs::read_to_string(&self.path) {
			Ok(json) => serde_json::from_str(&json)
				.map(Some)
				.map_err(|source| Error::CorruptStore {
					path: self.path.clone(),
					source,
				}),
			Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
			Err(e) => Err(self.io_err(e)),
		}
	}

	fn save(&self, session: &StoredSession) -> Result<(), Error> {
		if let Some(parent) = self.path.parent() {
			fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
		}

		let json = serde_json::to_string_pretty(session).map_err(|source| Error::CorruptStore {
			path: self.path.clone(),
			source,
		})?;

		fs::write(&self.path, json).map_err(|e| self.io_err(e))
	}

	fn clear(&self) -> Result<(), Error> {
		match fs::remove_file(&self.path) {
			Ok(()) => Ok(()),
			Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
			Err(e) => Err(self.io_err(e)),
		}
	}
}

#[derive(Debug, Default)]
pub struct MemoryTokenStore(Mutex<Option<StoredSession>>);

impl MemoryTokenStore {
	#[must_use]
	pub fn with_session(session: StoredSession) -> Self {
		Self(Mutex::new(Some(session)))
	}
}

impl TokenStore for MemoryTokenStore {
	fn load(&self) -> Result<Option<StoredSession>, Error> {
		Ok(self.0.lock().map_err(|_| Error::Poisoned)?.clone())
	}

	fn save(&self, session: &StoredSession) -> Result<(), Error> {
		*self.0.lock().map_err(|_| Error::Poisoned)? = Some(session.clone());
		Ok(())
	}

	fn clear(&self) -> Result<(), Error> {
		*self.0.lock().map_err(|_| Error::Poisoned)? = None;
		Ok(())
	}
}
