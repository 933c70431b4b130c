use std::{
	future::Future,
	pin::Pin,
	task::{Context, Poll},
};

use tokio::task::{JoinError, JoinHandle};

/// A spawned tokio task that is aborted when its handle goes out of scope.
///
/// Debounce and polling timers are held in one of these by the component that started them.
#[derive(Debug)]
pub struct AbortOnDrop<T>(JoinHandle<T>);

impl<T: Send + 'static> AbortOnDrop<T> {
	pub fn spawn(future: impl Future<Output = T> + Send + 'static) -> Self {
		Self(tokio::spawn(future))
	}
}

impl<T> AbortOnDrop<T> {
	#[must_use]
	pub fn is_finished(&self) -> bool {
		self.0.is_finished()
	}
}

impl<T> Future for AbortOnDrop<T> {
	type Output = Result<T, JoinError>;

	fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
		Pin::new(&mut self.0).poll(cx)
	}
}

impl<T> Drop for AbortOnDrop<T> {
	fn drop(&mut self) {
		self.0.abort();
	}
}
