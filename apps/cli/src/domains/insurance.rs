use athena_api::{insurance::override_status, InsuranceStatus};

use anyhow::Result;
use clap::Subcommand;

use crate::{context::Context, util::prelude::*};

#[derive(Subcommand, Debug)]
pub enum InsuranceCmd {
	/// Set a device's insurance status by hand
	Override {
		chromebook_id: i64,
		/// insured, uninsured or pending
		#[arg(long)]
		status: Option<InsuranceStatus>,
		#[arg(long)]
		reason: Option<String>,
	},
}

pub async fn run(ctx: &Context, cmd: InsuranceCmd) -> Result<()> {
	match cmd {
		InsuranceCmd::Override {
			chromebook_id,
			status,
			reason,
		} => {
			let res = override_status(
				ctx.request_config().await,
				&override_status::Input {
					chromebook_id,
					new_insurance_status: status,
					override_reason: reason,
				},
			)
			.await
			.or_notify("Failed to override insurance status")?;

			let message = res
				.message
				.unwrap_or_else(|| "Insurance status updated".to_string());

			if !res.success {
				return Err(Failure::new("Failed to override insurance status", message).into());
			}

			let description = match res.data.and_then(|d| d.workflow_explanation) {
				Some(explanation) => format!("{message}\n{explanation}"),
				None => message,
			};
			ctx.notify(Notification::success("Insurance status updated", description));
		}
	}

	Ok(())
}
