#![warn(
	clippy::all,
	clippy::pedantic,
	clippy::correctness,
	clippy::perf,
	clippy::style,
	clippy::suspicious,
	clippy::complexity,
	clippy::nursery,
	clippy::unwrap_used,
	unused_qualifications,
	rust_2018_idioms,
	trivial_casts,
	trivial_numeric_casts,
	unused_allocation,
	clippy::dbg_macro,
	deprecated
)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

//! Device picker search: local cache first, debounced remote lookup for the rest.

pub mod debounce;
pub mod matching;
pub mod merge;
pub mod session;

pub use debounce::{Debouncer, DEFAULT_DEBOUNCE};
pub use matching::{is_org_unit_query, matches};
pub use merge::{candidates, merge, Provenance, SearchHit};
pub use session::{ApiRemoteSearch, RemoteSearch, SearchSession, SearchSettings, MIN_REMOTE_CHARS};

#[cfg(test)]
pub(crate) mod test_support {
	use athena_api::{Device, DeviceStatus};

	pub(crate) fn device(id: i64, asset_tag: &str, serial: &str) -> Device {
		Device {
			id,
			asset_tag: asset_tag.into(),
			serial_number: serial.into(),
			model: "Dell 3100".into(),
			status: DeviceStatus::Available,
			org_unit_path: "/Chromebooks".into(),
			current_user: None,
			last_known_user: None,
			insurance_status: None,
			is_insured: None,
			device_id: None,
			annotated_location: None,
			notes: None,
			last_sync: None,
			os_version: None,
		}
	}
}
