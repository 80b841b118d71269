//! Command-line entry points: issue a GitHub credential into a file, or summarize a URL to JSON.

// std
use std::{io, path::PathBuf};
// crates.io
use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::Result;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
// self
use thumbsup::{config::Config, issuer::CredentialIssuer, provider::ProviderDispatcher};

#[derive(Debug, Parser)]
#[command(name = "thumbsup", version, about = "Rank community reactions on GitHub and Stack Overflow")]
struct Cli {
	#[command(subcommand)]
	command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
	/// Generate an access token and store it at the given path
	Token {
		/// Service to generate the token for
		service: Service,
		/// Path at which to store the token
		access_file: PathBuf,
	},
	/// Summarize a GitHub issue or Stack Overflow question URL as JSON
	Summarize {
		/// URL to summarize
		url: String,
		/// Skip the upstream quota check
		#[arg(long)]
		skip_rate_limit_check: bool,
	},
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Service {
	Github,
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;
	tracing_subscriber::registry()
		.with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "thumbsup=info".into()))
		.with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
		.init();

	let cli = Cli::parse();
	let config = Config::from_env()?;

	match cli.command {
		Command::Token { service: Service::Github, access_file } => {
			let method = CredentialIssuer::new(&config)?.issue(&access_file).await?;

			println!(
				"Token stored at {} for service=github using method={method}",
				access_file.display()
			);
		},
		Command::Summarize { url, skip_rate_limit_check } => {
			let summary =
				ProviderDispatcher::new(&config)?.summarize_with(&url, !skip_rate_limit_check).await?;

			println!("{}", serde_json::to_string(&summary)?);
		},
	}

	Ok(())
}
