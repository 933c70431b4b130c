use std::sync::Arc;

use athena_api::devices;
use athena_search::{ApiRemoteSearch, Provenance, SearchHit, SearchSession, SearchSettings};

use anyhow::Result;
use clap::Args;
use tracing::warn;

use crate::{
	context::Context,
	util::{output::table, prelude::*},
};

#[derive(Args, Debug)]
pub struct SearchArgs {
	/// Asset tag, serial number, model, user, or an org unit path like /Chromebooks/Elementary
	pub query: String,
	/// Pick the device right away when exactly one matches
	#[arg(long)]
	pub select: bool,
}

pub async fn run(ctx: &Context, args: SearchArgs) -> Result<()> {
	let local = match devices::list(ctx.request_config().await).await {
		Ok(devices) => devices,
		Err(e) => {
			warn!(%e, "Failed to load the device list, relying on remote search only");
			Vec::new()
		}
	};

	let mut session = SearchSession::new(
		local,
		Arc::new(ApiRemoteSearch::new(Arc::clone(&ctx.requests))),
		SearchSettings {
			debounce: ctx.config.search.debounce(),
			min_remote_chars: ctx.config.search.min_remote_chars,
		},
	);

	session.set_query(args.query);
	session.settled().await;

	if args.select {
		let mut selected = None;
		if !session.submit(|hit| selected = Some(hit.clone())) {
			let count = session.candidates().len();
			return Err(Failure::new(
				"No single match",
				format!("{count} devices match, narrow the search to pick one."),
			)
			.into());
		}

		if let Some(hit) = selected {
			print_output!(ctx, &hit, |hit: &SearchHit| {
				println!(
					"Selected {} ({}, {})",
					hit.device.asset_tag, hit.device.serial_number, hit.device.model
				);
			});
		}
		return Ok(());
	}

	let hits = session.candidates();
	print_output!(ctx, &hits, |hits: &Vec<SearchHit>| {
		if hits.is_empty() {
			println!("No available devices match");
			return;
		}

		let mut table = table(&["Asset Tag", "Serial", "Model", "User", "Org Unit", "Source"]);
		for hit in hits {
			let device = &hit.device;
			table.add_row(vec![
				device.asset_tag.clone(),
				device.serial_number.clone(),
				device.model.clone(),
				device.users().next().unwrap_or("-").to_string(),
				device.org_unit_path.clone(),
				match hit.source {
					Provenance::Local => "local".to_string(),
					Provenance::Remote => "remote".to_string(),
				},
			]);
		}
		println!("{table}");
	});

	Ok(())
}
