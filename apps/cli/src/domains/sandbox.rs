use std::{sync::Arc, time::Duration};

use athena_sandbox::{
	overlay, ApiSandbox, OverlayViewer, SandboxBackend, SandboxController, SandboxState,
	ToggleOutcome,
};

use anyhow::Result;
use clap::Subcommand;
use serde_json::Value;

use crate::{context::Context, util::prelude::*};

#[derive(Subcommand, Debug)]
pub enum SandboxCmd {
	/// Show the current sandbox session
	Status,
	/// Turn sandbox mode on (admins only)
	Enable {
		/// Minutes before the server ends the session
		#[arg(long)]
		ttl: Option<u32>,
	},
	/// Turn sandbox mode off (admins only)
	Disable,
	/// Show the changes simulated in the sandbox
	Overlay {
		/// Keep polling and print every new payload until interrupted
		#[arg(long)]
		watch: bool,
		/// Poll interval, defaults to the configured one
		#[arg(long)]
		interval_ms: Option<u64>,
	},
}

pub async fn run(ctx: &Context, cmd: SandboxCmd) -> Result<()> {
	let backend: Arc<dyn SandboxBackend> = Arc::new(ApiSandbox::new(Arc::clone(&ctx.requests)));
	let controller = SandboxController::new(Arc::clone(&backend), ctx.auth.subscribe());
	controller.init().await;

	match cmd {
		SandboxCmd::Status => {
			let state = controller.state();
			print_output!(ctx, &state, |s: &SandboxState| {
				if !s.active {
					println!("Sandbox: off");
					return;
				}
				println!("Sandbox: on");
				if let Some(id) = &s.session_id {
					println!("Session: {id}");
				}
				if let Some(ttl) = s.ttl {
					println!("Expires in: {ttl} min");
				}
			});
		}
		SandboxCmd::Enable { ttl } => {
			let ttl = ttl.or(ctx.config.sandbox.default_ttl_minutes);
			let outcome = controller.enable(ttl).await;
			ctx.notify(toggled(outcome, "enable")?);
		}
		SandboxCmd::Disable => {
			let outcome = controller.disable().await;
			ctx.notify(toggled(outcome, "disable")?);
		}
		SandboxCmd::Overlay { watch, interval_ms } => {
			let interval = interval_ms.map_or_else(
				|| ctx.config.sandbox.poll_interval(),
				Duration::from_millis,
			);

			if watch {
				watch_overlay(ctx, backend, &controller, interval).await?;
			} else {
				let payload = backend
					.overlay()
					.await
					.or_notify("Failed to load sandbox overlay")?;
				print_payload(ctx, &payload);
			}
		}
	}

	Ok(())
}

fn toggled(outcome: ToggleOutcome, action: &str) -> Result<Notification, Failure> {
	match outcome {
		ToggleOutcome::Applied => Ok(Notification::success(format!("Sandbox {action}d"), "")),
		ToggleOutcome::NotPermitted => Err(Failure::new(
			"Not permitted",
			"Only admins can change sandbox mode.",
		)),
		ToggleOutcome::Busy => Err(Failure::new(
			"Sandbox busy",
			"Another sandbox change is still running.",
		)),
		ToggleOutcome::Failed => Err(Failure::new(
			format!("Failed to {action} sandbox"),
			"The server rejected the request, see the log for details.",
		)),
	}
}

fn print_payload(ctx: &Context, payload: &Value) {
	print_output!(ctx, payload, |p: &Value| println!("{}", overlay::render(p)));
}

async fn watch_overlay(
	ctx: &Context,
	backend: Arc<dyn SandboxBackend>,
	controller: &SandboxController,
	interval: Duration,
) -> Result<()> {
	if !controller.is_active() {
		ctx.notify(Notification::info(
			"Sandbox inactive",
			"The overlay is only polled while the sandbox is on.",
		));
		return Ok(());
	}

	let viewer = OverlayViewer::new(backend, controller.subscribe(), interval);
	let mut updates = viewer.subscribe();
	let mut sandbox = controller.subscribe();
	viewer.set_open(true);

	// Expiry happens on the server, only a refresh notices it
	let resync = controller.resync_every(interval);
	tokio::pin!(resync);

	loop {
		tokio::select! {
			res = updates.changed() => {
				if res.is_err() {
					break;
				}
				let payload = updates.borrow_and_update().clone();
				if let Some(payload) = payload {
					print_payload(ctx, &payload);
				}
			}
			res = sandbox.changed() => {
				if res.is_err() || !sandbox.borrow_and_update().active {
					ctx.notify(Notification::info(
						"Sandbox session ended",
						"Stopped watching the overlay.",
					));
					break;
				}
			}
			() = &mut resync => break,
			_ = tokio::signal::ctrl_c() => break,
		}
	}

	viewer.set_open(false);
	Ok(())
}
