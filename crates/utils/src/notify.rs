//! User-visible notifications, the toast of the dashboard.
//!
//! Every failure that reaches the user goes through a [`Notification`] with a title and a
//! description. Front ends decide how to show them through a [`Notifier`].

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
	Success,
	Info,
	Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
	pub level: Level,
	pub title: String,
	pub description: String,
}

impl Notification {
	pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
		Self {
			level: Level::Success,
			title: title.into(),
			description: description.into(),
		}
	}

	pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
		Self {
			level: Level::Info,
			title: title.into(),
			description: description.into(),
		}
	}

	pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
		Self {
			level: Level::Error,
			title: title.into(),
			description: description.into(),
		}
	}

	#[must_use]
	pub const fn is_error(&self) -> bool {
		matches!(self.level, Level::Error)
	}
}

impl fmt::Display for Notification {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.description.is_empty() {
			write!(f, "{}", self.title)
		} else {
			write!(f, "{}: {}", self.title, self.description)
		}
	}
}

pub trait Notifier: Send + Sync {
	fn notify(&self, notification: Notification);
}

#[cfg(test)]
mod tests {
	use std::sync::Mutex;

	use super::*;

	#[derive(Debug, Default)]
	struct CollectingNotifier {
		received: Mutex<Vec<Notification>>,
	}

	impl CollectingNotifier {
		fn take(&self) -> Vec<Notification> {
			self.received
				.lock()
				.map(|mut received| std::mem::take(&mut *received))
				.unwrap_or_default()
		}
	}

	impl Notifier for CollectingNotifier {
		fn notify(&self, notification: Notification) {
			if let Ok(mut received) = self.received.lock() {
				received.push(notification);
			}
		}
	}

	#[test]
	fn collects_in_order() {
		let notifier = CollectingNotifier::default();
		notifier.notify(Notification::error("Not authenticated", "Log in first"));
		notifier.notify(Notification::success("Saved", ""));

		let received = notifier.take();
		assert_eq!(received.len(), 2);
		assert!(received[0].is_error());
		assert_eq!(received[0].to_string(), "Not authenticated: Log in first");
		assert_eq!(received[1].to_string(), "Saved");
		assert!(notifier.take().is_empty());
	}
}
