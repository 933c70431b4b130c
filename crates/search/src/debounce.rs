use std::{sync::Arc, time::Duration};

use athena_utils::task::AbortOnDrop;

use tokio::sync::watch;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Publishes a value only once it has been stable for `delay`.
///
/// There is a single pending timer at any time: every `set` cancels the previous one
/// before scheduling a new one, and dropping the debouncer cancels whatever is pending.
pub struct Debouncer<T> {
	delay: Duration,
	latest: T,
	output: Arc<watch::Sender<T>>,
	pending: Option<AbortOnDrop<()>>,
}

impl<T: Clone + PartialEq + Send + Sync + 'static> Debouncer<T> {
	pub fn new(initial: T, delay: Duration) -> Self {
		Self {
			delay,
			latest: initial.clone(),
			output: Arc::new(watch::channel(initial).0),
			pending: None,
		}
	}

	pub fn set(&mut self, value: T) {
		self.latest = value;
		self.schedule();
	}

	/// Changing the delay restarts the timer for the latest value
	pub fn set_delay(&mut self, delay: Duration) {
		self.delay = delay;
		if self.pending.is_some() {
			self.schedule();
		}
	}

	fn schedule(&mut self) {
		// Replacing the handle drops, and therefore aborts, the previous timer
		self.pending = None;

		if *self.output.borrow() == self.latest {
			return;
		}

		let output = Arc::clone(&self.output);
		let value = self.latest.clone();
		let delay = self.delay;

		self.pending = Some(AbortOnDrop::spawn(async move {
			tokio::time::sleep(delay).await;
			output.send_replace(value);
		}));
	}

	/// Value as of the last time the input settled
	#[must_use]
	pub fn current(&self) -> T {
		self.output.borrow().clone()
	}

	#[must_use]
	pub fn latest(&self) -> &T {
		&self.latest
	}

	#[must_use]
	pub fn is_pending(&self) -> bool {
		self.pending.as_ref().is_some_and(|timer| !timer.is_finished())
	}

	#[must_use]
	pub fn subscribe(&self) -> watch::Receiver<T> {
		self.output.subscribe()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test(start_paused = true)]
	async fn publishes_after_quiet_period() {
		let mut debouncer = Debouncer::new(String::new(), DEFAULT_DEBOUNCE);
		let mut rx = debouncer.subscribe();

		debouncer.set("c".into());
		tokio::time::sleep(Duration::from_millis(100)).await;
		debouncer.set("cb".into());
		tokio::time::sleep(Duration::from_millis(100)).await;
		debouncer.set("cb-1".into());

		assert!(debouncer.is_pending());
		assert_eq!(debouncer.current(), "");

		tokio::time::sleep(Duration::from_millis(299)).await;
		assert_eq!(debouncer.current(), "");

		rx.changed().await.expect("debounced value");
		assert_eq!(*rx.borrow(), "cb-1");
		assert!(!debouncer.is_pending());
	}

	#[tokio::test(start_paused = true)]
	async fn only_the_last_timer_fires() {
		let mut debouncer = Debouncer::new(0_u32, DEFAULT_DEBOUNCE);
		let mut rx = debouncer.subscribe();

		for i in 1..=50 {
			debouncer.set(i);
			tokio::time::sleep(Duration::from_millis(10)).await;
		}

		tokio::time::sleep(Duration::from_secs(1)).await;

		assert!(rx.has_changed().expect("sender alive"));
		assert_eq!(*rx.borrow_and_update(), 50);
		assert!(!rx.has_changed().expect("sender alive"));
	}

	#[tokio::test(start_paused = true)]
	async fn dropping_cancels_pending_publication() {
		let mut debouncer = Debouncer::new(0_u32, DEFAULT_DEBOUNCE);
		let rx = debouncer.subscribe();

		debouncer.set(7);
		drop(debouncer);

		tokio::time::sleep(Duration::from_secs(1)).await;
		assert_eq!(*rx.borrow(), 0);
	}

	#[tokio::test(start_paused = true)]
	async fn delay_change_reschedules() {
		let mut debouncer = Debouncer::new(0_u32, Duration::from_secs(5));

		debouncer.set(1);
		tokio::time::sleep(Duration::from_secs(1)).await;
		debouncer.set_delay(Duration::from_millis(50));

		tokio::time::sleep(Duration::from_millis(60)).await;
		assert_eq!(debouncer.current(), 1);
	}

	#[tokio::test(start_paused = true)]
	async fn returning_to_the_published_value_cancels() {
		let mut debouncer = Debouncer::new(String::from("abc"), DEFAULT_DEBOUNCE);

		debouncer.set("abcd".into());
		debouncer.set("abc".into());

		assert!(!debouncer.is_pending());
		tokio::time::sleep(Duration::from_secs(1)).await;
		assert_eq!(debouncer.current(), "abc");
	}
}
