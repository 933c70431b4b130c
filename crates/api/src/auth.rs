use std::fmt;

use serde::{Deserialize, Serialize};

/// Bearer token issued by the Athena backend after SSO login
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BearerToken(String);

impl BearerToken {
	#[must_use]
	pub fn new(token: impl Into<String>) -> Self {
		Self(token.into())
	}

	#[must_use]
	pub fn as_str(&self) -> &str {
		&self.0
	}

	pub(crate) fn header_value(&self) -> String {
		format!("Bearer {}", self.0)
	}
}

// Never print the token itself
impl fmt::Debug for BearerToken {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("BearerToken(<redacted>)")
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn debug_is_redacted() {
		let token = BearerToken::new("secret-value");
		assert_eq!(format!("{token:?}"), "BearerToken(<redacted>)");
		assert_eq!(token.header_value(), "Bearer secret-value");
	}
}
