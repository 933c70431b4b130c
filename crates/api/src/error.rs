use athena_utils::notify::Notification;

use reqwest::StatusCode;
use serde::Deserialize;

#[derive(thiserror::Error, Debug)]
pub enum Error {
	#[error("network error: {0}")]
	Transport(#[from] reqwest::Error),
	#[error("request failed with status {status}: {message}")]
	Status { status: StatusCode, message: String },
	#[error("Not authenticated")]
	NotAuthenticated,
	#[error("{0}")]
	Validation(String),
	#[error("failed to decode response: {0}")]
	Decode(String),
}

/// The shapes the backend uses for error bodies, any of the fields may carry the message
#[derive(Deserialize, Default)]
struct ErrorBody {
	error: Option<String>,
	message: Option<String>,
	detail: Option<String>,
}

impl Error {
	pub(crate) fn from_status(status: StatusCode, body: &str) -> Self {
		let message = serde_json::from_str::<ErrorBody>(body)
			.ok()
			.and_then(|b| b.error.or(b.message).or(b.detail))
			.unwrap_or_else(|| {
				status
					.canonical_reason()
					.unwrap_or("Unknown error")
					.to_string()
			});

		Self::Status { status, message }
	}

	#[must_use]
	pub fn is_not_authenticated(&self) -> bool {
		match self {
			Self::NotAuthenticated => true,
			Self::Status { status, .. } => *status == StatusCode::UNAUTHORIZED,
			_ => false,
		}
	}

	/// Turns the error into something we can show to the user, `title` names the failed action
	#[must_use]
	pub fn to_notification(&self, title: &str) -> Notification {
		match self {
			Self::NotAuthenticated => Notification::error(
				"Not authenticated",
				"Please log in before performing this action.",
			),
			Self::Validation(message) => Notification::error("Validation error", message),
			Self::Transport(_) => Notification::error(title, "Could not reach the Athena server."),
			Self::Status { message, .. } => Notification::error(title, message),
			Self::Decode(message) => Notification::error(title, message),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn structured_body_message_wins() {
		let e = Error::from_status(StatusCode::FORBIDDEN, r#"{"error":"Admin role required"}"#);
		assert_eq!(
			e.to_string(),
			"request failed with status 403 Forbidden: Admin role required"
		);

		let e = Error::from_status(StatusCode::BAD_REQUEST, r#"{"message":"bad ttl"}"#);
		assert!(matches!(e, Error::Status { ref message, .. } if message == "bad ttl"));
	}

	#[test]
	fn unstructured_body_falls_back_to_reason() {
		let e = Error::from_status(StatusCode::BAD_GATEWAY, "<html>oops</html>");
		assert!(matches!(e, Error::Status { ref message, .. } if message == "Bad Gateway"));
	}

	#[test]
	fn unauthorized_status_counts_as_not_authenticated() {
		assert!(Error::from_status(StatusCode::UNAUTHORIZED, "").is_not_authenticated());
		assert!(Error::NotAuthenticated.is_not_authenticated());
		assert!(!Error::Validation("x".into()).is_not_authenticated());
	}

	#[test]
	fn notifications_carry_title() {
		let n = Error::from_status(StatusCode::CONFLICT, r#"{"error":"Device already checked out"}"#)
			.to_notification("Checkout failed");
		assert!(n.is_error());
		assert_eq!(n.title, "Checkout failed");
		assert_eq!(n.description, "Device already checked out");

		let n = Error::NotAuthenticated.to_notification("ignored");
		assert_eq!(n.title, "Not authenticated");
	}
}
