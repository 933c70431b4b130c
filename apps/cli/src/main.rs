use std::{path::PathBuf, process::ExitCode};

use athena_utils::notify::{Notification, Notifier};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod context;
mod domains;
mod util;

use context::{Context, OutputFormat};
use domains::{
	auth::LoginArgs, config::ConfigCmd, insurance::InsuranceCmd, report::ReportCmd,
	sandbox::SandboxCmd, search::SearchArgs, sso::SsoCmd,
};
use util::{error::Failure, output::ConsoleNotifier};

#[derive(Parser, Debug)]
#[command(name = "athena", about = "Athena Chromebook checkout dashboard client")]
struct Cli {
	/// Path to the Athena data directory
	#[arg(long, global = true)]
	data_dir: Option<PathBuf>,

	/// Backend URL, overrides the configured one for this run
	#[arg(long, global = true, env = "ATHENA_API_URL")]
	api_url: Option<String>,

	/// Output format
	#[arg(long, global = true, value_enum, default_value = "human")]
	format: OutputFormat,

	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
	/// Store a bearer token and check who it belongs to
	Login(LoginArgs),
	/// Forget the stored token
	Logout,
	/// Show the signed in user and role
	Whoami,
	/// Find available devices for checkout
	Search(SearchArgs),
	/// Sandbox mode
	#[command(subcommand)]
	Sandbox(SandboxCmd),
	/// Reports
	#[command(subcommand)]
	Report(ReportCmd),
	/// Insurance overrides
	#[command(subcommand)]
	Insurance(InsuranceCmd),
	/// SSO configuration and access checks
	#[command(subcommand)]
	Sso(SsoCmd),
	/// Client configuration
	#[command(subcommand)]
	Config(ConfigCmd),
}

/// Used when `RUST_LOG` is unset: quiet dependencies, Athena's own crates at info
const DEFAULT_LOG_FILTER: &str = "warn,athena=info";

fn init_tracing() {
	let filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

	tracing_subscriber::registry()
		.with(filter)
		.with(fmt::layer().with_writer(std::io::stderr).with_target(false))
		.init();
}

async fn run(cli: Cli) -> Result<()> {
	let data_dir = match cli.data_dir {
		Some(dir) => dir,
		None => athena_config::default_data_dir()?,
	};

	let (format, api_url) = (cli.format, cli.api_url);
	let context = || Context::new(format, data_dir.clone(), api_url.clone());

	match cli.command {
		Commands::Login(args) => domains::auth::login(&context()?, args).await,
		Commands::Logout => domains::auth::logout(&context()?),
		Commands::Whoami => domains::auth::whoami(&context()?),
		Commands::Search(args) => domains::search::run(&context()?, args).await,
		Commands::Sandbox(cmd) => domains::sandbox::run(&context()?, cmd).await,
		Commands::Report(cmd) => domains::report::run(&context()?, cmd).await,
		Commands::Insurance(cmd) => domains::insurance::run(&context()?, cmd).await,
		Commands::Sso(cmd) => domains::sso::run(&context()?, cmd).await,
		// Works on the stored file, never on values overridden from the command line
		Commands::Config(cmd) => domains::config::run(format, &data_dir, cmd),
	}
}

#[tokio::main]
async fn main() -> ExitCode {
	init_tracing();

	let cli = Cli::parse();
	let notifier = ConsoleNotifier::new(cli.format);

	match run(cli).await {
		Ok(()) => ExitCode::SUCCESS,
		Err(e) => {
			let notification = match e.downcast::<Failure>() {
				Ok(Failure(notification)) => notification,
				Err(e) => Notification::error("Error", format!("{e:#}")),
			};
			notifier.notify(notification);
			ExitCode::FAILURE
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_log_filter_is_valid() {
		assert!(EnvFilter::try_new(DEFAULT_LOG_FILTER).is_ok());
	}
}
