use std::collections::HashSet;

use athena_api::{Device, DeviceStatus};

use serde::Serialize;

use crate::matching::matches;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
	Local,
	Remote,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
	pub device: Device,
	pub source: Provenance,
}

/// Local devices followed by the remote ones we didn't already have.
///
/// Every serial number shows up at most once and the first occurrence wins, so a local
/// record always shadows a remote record for the same device.
#[must_use]
pub fn merge(local: &[Device], remote: &[Device]) -> Vec<SearchHit> {
	let mut seen = HashSet::with_capacity(local.len() + remote.len());

	local
		.iter()
		.map(|device| (device, Provenance::Local))
		.chain(remote.iter().map(|device| (device, Provenance::Remote)))
		.filter(|(device, _)| seen.insert(device.serial_number.clone()))
		.map(|(device, source)| SearchHit {
			device: device.clone(),
			source,
		})
		.collect()
}

/// Devices offered for checkout for the given raw query.
///
/// An empty query shows nothing rather than everything.
#[must_use]
pub fn candidates(query: &str, local: &[Device], remote: &[Device]) -> Vec<SearchHit> {
	let query = query.trim();
	if query.is_empty() {
		return Vec::new();
	}

	merge(local, remote)
		.into_iter()
		.filter(|hit| hit.device.status == DeviceStatus::Available && matches(&hit.device, query))
		.collect()
}
