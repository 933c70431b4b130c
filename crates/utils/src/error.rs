use std::fmt::Display;

use tracing::error;

/// Report a failed result with tracing, prefixed by what was being attempted.
///
/// Returns whether there was an error to report.
pub fn report_error<T, E: Display>(context: impl Display, res: &Result<T, E>) -> bool {
	match res {
		Ok(_) => false,
		Err(e) => {
			error!("{context}: {e:#}");
			true
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use tracing_test::traced_test;

	#[test]
	#[traced_test]
	fn reports_only_errors() {
		assert!(!report_error("Failed to save", &Ok::<u8, String>(1)));
		assert!(!logs_contain("ERROR"));

		assert!(report_error(
			format_args!("Failed to {} sandbox", "enable"),
			&Err::<(), _>("connection refused")
		));
		assert!(logs_contain("Failed to enable sandbox: connection refused"));
	}
}
