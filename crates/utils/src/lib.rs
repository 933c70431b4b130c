#![warn(
	clippy::all,
	clippy::pedantic,
	clippy::correctness,
	clippy::perf,
	clippy::style,
	clippy::suspicious,
	clippy::complexity,
	clippy::nursery,
	clippy::unwrap_used,
	unused_qualifications,
	rust_2018_idioms,
	trivial_casts,
	trivial_numeric_casts,
	unused_allocation,
	clippy::dbg_macro,
	deprecated
)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

pub mod error;
pub mod notify;
pub mod task;

/// Case-insensitive substring match used by every free-text filter
#[must_use]
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
	haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Capitalizes the first letter of every whitespace separated word and lowercases the rest
#[must_use]
pub fn title_case(value: &str) -> String {
	value
		.split_whitespace()
		.map(|word| {
			let mut chars = word.chars();
			chars.next().map_or_else(String::new, |first| {
				first
					.to_uppercase()
					.chain(chars.flat_map(char::to_lowercase))
					.collect()
			})
		})
		.collect::<Vec<_>>()
		.join(" ")
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn title_case_words() {
		assert_eq!(title_case("jANE   doe"), "Jane Doe");
		assert_eq!(title_case(""), "");
		assert_eq!(title_case("o'brien"), "O'brien");
	}

	#[test]
	fn contains_is_case_insensitive() {
		assert!(contains_ignore_case("/Chromebooks/Elementary", "elementary"));
		assert!(!contains_ignore_case("HP 11 G8", "lenovo"));
	}
}
