use athena_utils::notify::Notification;

/// A failure already phrased for the person at the terminal
#[derive(thiserror::Error, Debug)]
#[error("{0}")]
pub struct Failure(pub Notification);

impl Failure {
	pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
		Self(Notification::error(title, description))
	}
}

pub trait NotifyErr<T> {
	/// Turns a backend error into a [`Failure`] titled after the action that failed
	fn or_notify(self, title: &str) -> Result<T, Failure>;
}

impl<T> NotifyErr<T> for Result<T, athena_api::Error> {
	fn or_notify(self, title: &str) -> Result<T, Failure> {
		self.map_err(|e| Failure(e.to_notification(title)))
	}
}
