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

//! Sandbox session state, the overlay viewer and its draggable panel.

mod backend;
mod controller;
pub mod drag;
pub mod overlay;

pub use backend::{ApiSandbox, SandboxBackend};
pub use controller::{SandboxController, SandboxPhase, SandboxState, ToggleOutcome, ToggleView};
pub use overlay::{OverlayViewer, DEFAULT_POLL_INTERVAL};
