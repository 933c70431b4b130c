use athena_auth::{BearerToken, Role, UserProfile};
use athena_utils::error::report_error;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::{context::Context, util::prelude::*};

#[derive(Args, Debug)]
pub struct LoginArgs {
	/// Bearer token issued by the Athena backend
	#[arg(long, env = "ATHENA_TOKEN", hide_env_values = true)]
	pub token: String,
	/// Store the token without asking the backend who it belongs to
	#[arg(long)]
	pub offline: bool,
}

pub async fn login(ctx: &Context, args: LoginArgs) -> Result<()> {
	ctx.auth.login(BearerToken::new(args.token.trim()), None)?;

	if args.offline {
		ctx.notify(Notification::success(
			"Logged in",
			"Token stored without verification.",
		));
		return Ok(());
	}

	match ctx.auth.refresh_profile(&ctx.base).await {
		Ok(profile) => {
			print_output!(ctx, &profile, |p: &UserProfile| {
				println!("Logged in as {} ({})", p.email, p.role);
			});
			Ok(())
		}
		Err(athena_auth::Error::Api(e)) => {
			// Rejected tokens are already gone, anything else is still unverified
			if !e.is_not_authenticated() {
				report_error("Failed to forget the unverified token", &ctx.auth.logout());
			}
			Err(Failure(e.to_notification("Login failed")).into())
		}
		Err(e) => Err(e.into()),
	}
}

pub fn logout(ctx: &Context) -> Result<()> {
	ctx.auth.logout()?;
	ctx.notify(Notification::success("Logged out", ""));
	Ok(())
}

#[derive(Serialize)]
struct WhoAmI {
	authenticated: bool,
	email: Option<String>,
	name: Option<String>,
	role: Role,
}

pub fn whoami(ctx: &Context) -> Result<()> {
	let snapshot = ctx.auth.snapshot();

	let out = WhoAmI {
		authenticated: snapshot.is_authenticated(),
		email: snapshot.profile.as_ref().map(|p| p.email.clone()),
		name: snapshot.profile.as_ref().and_then(|p| p.name.clone()),
		role: snapshot.role(),
	};

	print_output!(ctx, &out, |o: &WhoAmI| {
		if !o.authenticated {
			println!("Not logged in");
			return;
		}

		match (&o.email, &o.name) {
			(Some(email), Some(name)) => println!("{name} <{email}>"),
			(Some(email), None) => println!("{email}"),
			_ => println!("Logged in with an unverified token"),
		}
		println!("Role: {}", o.role);
	});

	Ok(())
}
