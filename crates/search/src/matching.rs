use athena_api::Device;
use athena_utils::contains_ignore_case;

/// Queries that look like a directory path are matched against the org unit only
#[must_use]
pub fn is_org_unit_query(query: &str) -> bool {
	let query = query.trim();
	query.starts_with('/') || query.contains("OU=")
}

/// Whether `device` matches the already trimmed, non empty `query`
#[must_use]
pub fn matches(device: &Device, query: &str) -> bool {
	if is_org_unit_query(query) {
		return contains_ignore_case(&device.org_unit_path, query);
	}

	[
		device.asset_tag.as_str(),
		device.serial_number.as_str(),
		device.model.as_str(),
	]
	.into_iter()
	.chain(device.users())
	.any(|field| contains_ignore_case(field, query))
}
