use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(
	Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DeviceStatus {
	Available,
	CheckedOut,
	Maintenance,
	Lost,
	Damaged,
	PendingSignature,
}

/// A Chromebook as the backend reports it.
///
/// Read-only on the client, every change goes through a backend action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
	pub id: i64,
	#[serde(alias = "asset_tag")]
	pub asset_tag: String,
	#[serde(alias = "serial_number")]
	pub serial_number: String,
	#[serde(default)]
	pub model: String,
	pub status: DeviceStatus,
	#[serde(default, alias = "org_unit_path")]
	pub org_unit_path: String,
	#[serde(default, alias = "current_user")]
	pub current_user: Option<String>,
	#[serde(default, alias = "last_known_user")]
	pub last_known_user: Option<String>,
	#[serde(default, alias = "insurance_status")]
	pub insurance_status: Option<String>,
	#[serde(default, alias = "is_insured")]
	pub is_insured: Option<bool>,
	// Google directory fields
	#[serde(default, alias = "device_id")]
	pub device_id: Option<String>,
	#[serde(default, alias = "annotated_location")]
	pub annotated_location: Option<String>,
	#[serde(default)]
	pub notes: Option<String>,
	#[serde(default, alias = "last_sync")]
	pub last_sync: Option<String>,
	#[serde(default, alias = "os_version")]
	pub os_version: Option<String>,
}

impl Device {
	/// Users currently or most recently associated with the device
	pub fn users(&self) -> impl Iterator<Item = &str> {
		self.current_user
			.as_deref()
			.into_iter()
			.chain(self.last_known_user.as_deref())
	}
}

#[derive(
	Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
	Admin,
	#[serde(alias = "super-admin", alias = "superadmin")]
	#[strum(to_string = "super_admin", serialize = "super-admin")]
	SuperAdmin,
	#[default]
	#[serde(other)]
	User,
}

impl Role {
	/// Admins and super admins may touch sandbox mode and overrides
	#[must_use]
	pub const fn is_admin(self) -> bool {
		matches!(self, Self::Admin | Self::SuperAdmin)
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
	#[serde(default)]
	pub id: Option<i64>,
	pub email: String,
	#[serde(default)]
	pub name: Option<String>,
	#[serde(default)]
	pub role: Role,
}

#[derive(
	Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum InsuranceStatus {
	Insured,
	Uninsured,
	Pending,
}
