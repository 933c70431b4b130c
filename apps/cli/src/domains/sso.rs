use athena_auth::sso::{self, AccessDecision, SsoConfig};

use anyhow::Result;
use clap::Subcommand;

use crate::{
	context::Context,
	util::{output::table, prelude::*},
};

#[derive(Subcommand, Debug)]
pub enum SsoCmd {
	/// Show the SSO providers and access rules
	Config,
	/// Check whether an email may sign in, and with which role
	Check {
		email: String,
		/// Provider id, e.g. google
		#[arg(long)]
		provider: Option<String>,
	},
}

pub async fn run(ctx: &Context, cmd: SsoCmd) -> Result<()> {
	let config = sso::load(ctx.base.clone(), ctx.config.static_origin())
		.await
		.or_notify("Failed to load SSO configuration")?;

	match cmd {
		SsoCmd::Config => {
			print_output!(ctx, &config, |c: &SsoConfig| {
				println!("{}", c.branding.app_name);

				let mut table = table(&["Id", "Name", "Enabled", "Allowed Domains"]);
				for p in &c.providers {
					table.add_row(vec![
						p.id.clone(),
						p.name.clone(),
						if p.enabled { "yes" } else { "no" }.to_string(),
						p.allowed_domains.join(", "),
					]);
				}
				println!("{table}");

				let enabled = c.enabled_providers().map(|p| p.name.as_str()).collect::<Vec<_>>();
				if enabled.is_empty() {
					println!("No sign-in provider is enabled");
				} else {
					println!("Sign in with: {}", enabled.join(", "));
				}

				let domains = &c.access_control.allowed_domains;
				if domains.is_empty() {
					println!("Any domain may sign in");
				} else {
					println!("Allowed domains: {}", domains.join(", "));
				}
			});
		}
		SsoCmd::Check { email, provider } => {
			let decision = config.evaluate(&email, provider.as_deref());

			if let AccessDecision::Denied(reason) = &decision {
				return Err(Failure::new("Access denied", reason.clone()).into());
			}

			print_output!(ctx, &decision, |d: &AccessDecision| {
				if let AccessDecision::Allowed(role) = d {
					println!("{email} may sign in as {role}");
				}
			});
		}
	}

	Ok(())
}
