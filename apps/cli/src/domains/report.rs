use std::path::PathBuf;

use athena_reports::{CurrentCheckouts, ReportQuery, ReportRow, ReportView, Summary};

use anyhow::Result;
use chrono::Local;
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::{
	context::Context,
	util::{output::table, prelude::*},
};

#[derive(Subcommand, Debug)]
pub enum ReportCmd {
	/// Devices currently checked out, with summary figures
	CurrentCheckouts(CurrentCheckoutsArgs),
}

#[derive(Args, Debug)]
pub struct CurrentCheckoutsArgs {
	/// School to report on, defaults to the configured school or all of them
	#[arg(long)]
	pub school: Option<String>,
	/// Only checkouts processed by this staff member
	#[arg(long)]
	pub checkout_by: Option<String>,
	/// Include devices in org units below the school
	#[arg(long)]
	pub include_subdirectories: bool,
	/// Ask the server for checkouts still waiting on a signature
	#[arg(long)]
	pub include_pending: bool,
	/// Show only pending checkouts
	#[arg(long)]
	pub pending_only: bool,
	/// Filter rows by asset tag, serial, model, student or processor
	#[arg(long, default_value = "")]
	pub search: String,
	/// Write the filtered rows as CSV into this directory
	#[arg(long)]
	pub export: Option<PathBuf>,
}

#[derive(Serialize)]
struct ReportOutput<'a> {
	summary: Summary,
	rows: Vec<&'a ReportRow>,
}

pub async fn run(ctx: &Context, cmd: ReportCmd) -> Result<()> {
	match cmd {
		ReportCmd::CurrentCheckouts(args) => current_checkouts(ctx, args).await,
	}
}

async fn current_checkouts(ctx: &Context, args: CurrentCheckoutsArgs) -> Result<()> {
	let mut report = CurrentCheckouts::new(ReportQuery {
		school: args.school.or_else(|| ctx.config.report.default_school.clone()),
		checkout_by: args.checkout_by,
		include_subdirectories: args.include_subdirectories,
		include_pending: args.include_pending || args.pending_only,
	});
	report.search = args.search;
	report.pending_only = args.pending_only;

	report.load(&ctx.requests).await;
	if let ReportView::Failed(notification) = report.view() {
		return Err(Failure(notification.clone()).into());
	}

	let today = Local::now().date_naive();
	let out = ReportOutput {
		summary: report.summary(today),
		rows: report.filtered(),
	};

	print_output!(ctx, &out, |o: &ReportOutput<'_>| {
		let mut table = table(&[
			"Asset Tag",
			"Serial",
			"Model",
			"Student",
			"Checked Out",
			"Days",
			"Insurance",
			"Processor",
		]);
		for row in &o.rows {
			table.add_row(vec![
				row.chromebook.asset_tag.clone(),
				row.chromebook.serial_number.clone(),
				row.chromebook.model.clone(),
				row.student.display_name(),
				row.checkout
					.checkout_day()
					.map_or_else(|| "-".to_string(), |d| d.to_string()),
				row.days_outstanding_at(today).to_string(),
				row.insurance_status().to_string(),
				row.processor_name().to_string(),
			]);
		}
		println!("{table}");

		let s = &o.summary;
		println!(
			"{} checkouts, {} students, {:.1} days outstanding on average, {} insured ({:.1}%)",
			s.total, s.distinct_students, s.mean_days_outstanding, s.insured_count, s.insured_percent
		);
	});

	if let Some(dir) = args.export {
		match report.export(today) {
			None => ctx.notify(Notification::info("Nothing to export", "No rows match the current filters.")),
			Some(csv) => {
				let path = csv.write_to(&dir)?;
				ctx.notify(Notification::success(
					"Report exported",
					path.display().to_string(),
				));
			}
		}
	}

	Ok(())
}
