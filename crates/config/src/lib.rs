//! Client configuration stored in the Athena data directory

use std::{
	fs, io,
	path::{Path, PathBuf},
	time::Duration,
};

use serde::{Deserialize, Serialize};
use tracing::debug;

const CONFIG_FILE: &str = "client.json";

pub const DEFAULT_API_URL: &str = "http://localhost:5000";

#[derive(thiserror::Error, Debug)]
pub enum Error {
	#[error("could not determine the data directory for this platform")]
	NoDataDir,
	#[error("config I/O error at '{}': {source}", .path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: io::Error,
	},
	#[error("malformed config at '{}': {source}", .path.display())]
	Malformed {
		path: PathBuf,
		#[source]
		source: serde_json::Error,
	},
	#[error("unknown config key: {0}")]
	UnknownKey(String),
	#[error("invalid value '{value}' for {key}")]
	InvalidValue { key: String, value: String },
}

/// Keys accepted by [`ClientConfig::get`] and [`ClientConfig::set`]
pub const KEYS: [&str; 7] = [
	"api_url",
	"static_url",
	"search.debounce_ms",
	"search.min_remote_chars",
	"sandbox.poll_interval_ms",
	"sandbox.default_ttl_minutes",
	"report.default_school",
];

/// Platform-specific data directory resolution
pub fn default_data_dir() -> Result<PathBuf, Error> {
	#[cfg(target_os = "windows")]
	let dir = dirs::data_dir().ok_or(Error::NoDataDir)?.join("Athena");

	#[cfg(target_os = "linux")]
	let dir = dirs::data_local_dir().ok_or(Error::NoDataDir)?.join("athena");

	#[cfg(not(any(target_os = "windows", target_os = "linux")))]
	let dir = dirs::data_dir().ok_or(Error::NoDataDir)?.join("athena");

	fs::create_dir_all(&dir).map_err(|source| Error::Io {
		path: dir.clone(),
		source,
	})?;

	Ok(dir)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
	/// Base URL of the Athena REST backend
	pub api_url: String,
	/// Origin serving the static `sso-config.json`, defaults to `api_url`
	#[serde(default)]
	pub static_url: Option<String>,
	#[serde(default)]
	pub search: SearchConfig,
	#[serde(default)]
	pub sandbox: SandboxConfig,
	#[serde(default)]
	pub report: ReportConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchConfig {
	pub debounce_ms: u64,
	/// Shorter queries never reach the remote search
	pub min_remote_chars: usize,
}

impl Default for SearchConfig {
	fn default() -> Self {
		Self {
			debounce_ms: 300,
			min_remote_chars: 3,
		}
	}
}

impl SearchConfig {
	#[must_use]
	pub const fn debounce(&self) -> Duration {
		Duration::from_millis(self.debounce_ms)
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SandboxConfig {
	pub poll_interval_ms: u64,
	pub default_ttl_minutes: Option<u32>,
}

impl Default for SandboxConfig {
	fn default() -> Self {
		Self {
			poll_interval_ms: 2000,
			default_ttl_minutes: None,
		}
	}
}

impl SandboxConfig {
	#[must_use]
	pub const fn poll_interval(&self) -> Duration {
		Duration::from_millis(self.poll_interval_ms)
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportConfig {
	pub default_school: Option<String>,
}

impl Default for ClientConfig {
	fn default() -> Self {
		Self {
			api_url: DEFAULT_API_URL.to_string(),
			static_url: None,
			search: SearchConfig::default(),
			sandbox: SandboxConfig::default(),
			report: ReportConfig::default(),
		}
	}
}

impl ClientConfig {
	/// Get the config file path
	#[must_use]
	pub fn config_path(data_dir: &Path) -> PathBuf {
		data_dir.join(CONFIG_FILE)
	}

	/// Load the config from the data directory, writing the defaults on first run
	pub fn load(data_dir: &Path) -> Result<Self, Error> {
		let path = Self::config_path(data_dir);

		match fs::read_to_string(&path) {
			Ok(json) => {
				serde_json::from_str(&json).map_err(|source| Error::Malformed { path, source })
			}
			Err(e) if e.kind() == io::ErrorKind::NotFound => {
				debug!(path = %path.display(), "No client config found, writing defaults");
				let config = Self::default();
				config.save(data_dir)?;
				Ok(config)
			}
			Err(source) => Err(Error::Io { path, source }),
		}
	}

	pub fn save(&self, data_dir: &Path) -> Result<(), Error> {
		fs::create_dir_all(data_dir).map_err(|source| Error::Io {
			path: data_dir.to_path_buf(),
			source,
		})?;

		let path = Self::config_path(data_dir);
		let json = serde_json::to_string_pretty(self).map_err(|source| Error::Malformed {
			path: path.clone(),
			source,
		})?;

		fs::write(&path, json).map_err(|source| Error::Io { path, source })
	}

	pub fn set_api_url(&mut self, api_url: String, data_dir: &Path) -> Result<(), Error> {
		self.api_url = api_url;
		self.save(data_dir)
	}

	/// Current value of `key`, `None` for an unset optional value
	pub fn get(&self, key: &str) -> Result<Option<String>, Error> {
		Ok(match key {
			"api_url" => Some(self.api_url.clone()),
			"static_url" => self.static_url.clone(),
			"search.debounce_ms" => Some(self.search.debounce_ms.to_string()),
			"search.min_remote_chars" => Some(self.search.min_remote_chars.to_string()),
			"sandbox.poll_interval_ms" => Some(self.sandbox.poll_interval_ms.to_string()),
			"sandbox.default_ttl_minutes" => {
				self.sandbox.default_ttl_minutes.map(|ttl| ttl.to_string())
			}
			"report.default_school" => self.report.default_school.clone(),
			_ => return Err(Error::UnknownKey(key.to_string())),
		})
	}

	/// Set `key` from its textual form and persist. An empty value clears optional keys.
	pub fn set(&mut self, key: &str, value: &str, data_dir: &Path) -> Result<(), Error> {
		let invalid = || Error::InvalidValue {
			key: key.to_string(),
			value: value.to_string(),
		};
		let optional = || Some(value.trim().to_string()).filter(|v| !v.is_empty());

		match key {
			"api_url" => {
				if value.trim().is_empty() {
					return Err(invalid());
				}
				self.api_url = value.trim().to_string();
			}
			"static_url" => self.static_url = optional(),
			"search.debounce_ms" => {
				self.search.debounce_ms = value.trim().parse().map_err(|_| invalid())?;
			}
			"search.min_remote_chars" => {
				self.search.min_remote_chars = value.trim().parse().map_err(|_| invalid())?;
			}
			"sandbox.poll_interval_ms" => {
				let ms: u64 = value.trim().parse().map_err(|_| invalid())?;
				if ms == 0 {
					return Err(invalid());
				}
				self.sandbox.poll_interval_ms = ms;
			}
			"sandbox.default_ttl_minutes" => {
				self.sandbox.default_ttl_minutes = optional()
					.map(|v| v.parse::<u32>())
					.transpose()
					.map_err(|_| invalid())?;
			}
			"report.default_school" => self.report.default_school = optional(),
			_ => return Err(Error::UnknownKey(key.to_string())),
		}

		self.save(data_dir)
	}

	/// Where the static `sso-config.json` is served from
	#[must_use]
	pub fn static_origin(&self) -> &str {
		self.static_url.as_deref().unwrap_or(&self.api_url)
	}
}
