//! Query gateway entry point.
//!
//! Resolves one request document against the configured chain backend and prints
//! the JSON response.
//!
//! # Flow
//! 1. Applies CLI options to the environment and sets up logging
//! 2. Loads the gateway configuration (default `config/gateway.json`)
//! 3. Builds the chain backend (JSON-RPC node or fixture)
//! 4. Resolves the request document given with `--query` and prints the response

use connex_gateway::{
	bootstrap::{execute_query, initialize_gateway, Result},
	models::{ConfigLoader, GatewayConfig, DEFAULT_CONFIG_PATH},
	utils::{logging::setup_logging, parse_string_to_bytes_size},
};

use clap::Parser;
use dotenvy::dotenv_override;
use std::{
	env::{set_var, var},
	path::{Path, PathBuf},
};
use tracing::{error, info};

#[derive(Parser)]
#[command(
	name = "connex-gateway",
	about = "A query gateway resolving log filters, contract reads, account lookups and transaction broadcasts over Ethereum-style chain data.",
	version
)]
struct Cli {
	/// Write logs to file instead of stdout
	#[arg(long)]
	log_file: bool,

	/// Set log level (trace, debug, info, warn, error)
	#[arg(long, value_name = "LEVEL")]
	log_level: Option<String>,

	/// Path to store log files (default: logs/)
	#[arg(long, value_name = "PATH")]
	log_path: Option<String>,

	/// Maximum log file size before rolling (e.g., "1GB", "500MB", "1024KB")
	#[arg(long, value_name = "SIZE", value_parser = parse_string_to_bytes_size)]
	log_max_size: Option<u64>,

	/// Path to the gateway configuration (default: config/gateway.json)
	#[arg(long, value_name = "CONFIG_PATH")]
	config: Option<PathBuf>,

	/// Path to the request document to resolve
	#[arg(long, value_name = "QUERY_PATH")]
	query: Option<PathBuf>,

	/// Pretty-print the response document
	#[arg(long)]
	pretty: bool,

	/// Validate the configuration file without resolving anything
	#[arg(long)]
	check: bool,
}

impl Cli {
	/// Apply CLI options to environment variables, overriding any existing values
	fn apply_to_env(&self) {
		// Reload environment variables from .env file
		dotenv_override().ok();

		if self.log_file {
			set_var("LOG_MODE", "file");
		}

		if let Ok(level) = var("RUST_LOG") {
			set_var("LOG_LEVEL", level);
		}

		if let Some(level) = &self.log_level {
			set_var("LOG_LEVEL", level);
			set_var("RUST_LOG", level);
		}

		if let Some(path) = &self.log_path {
			set_var("LOG_DATA_DIR", path);
		}

		if let Some(max_size) = &self.log_max_size {
			set_var("LOG_MAX_SIZE", max_size.to_string());
		}
	}
}

/// Main entry point of the query gateway.
///
/// # Errors
/// Returns an error if the configuration is invalid, the backend cannot be built or
/// the request document cannot be read.
#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();
	cli.apply_to_env();

	setup_logging().unwrap_or_else(|e| {
		error!("Failed to setup logging: {}", e);
	});

	if cli.check {
		validate_configuration(cli.config.as_deref()).await;
		return Ok(());
	}

	let Some(query) = cli.query.as_deref() else {
		return Err("No request document given. Pass --query <QUERY_PATH> or --check".into());
	};

	let (config, gateway) = initialize_gateway(cli.config.as_deref())
		.await
		.map_err(|e| format!("Failed to initialize gateway: {}", e))?;
	info!(name = %config.name, query = %query.display(), "Resolving request");

	let document = execute_query(&gateway, query).await?;
	let output = if cli.pretty {
		serde_json::to_string_pretty(&document)?
	} else {
		serde_json::to_string(&document)?
	};
	println!("{}", output);
	Ok(())
}

/// Validates the configuration file and reports the outcome
async fn validate_configuration(path: Option<&Path>) {
	let path = path.unwrap_or(Path::new(DEFAULT_CONFIG_PATH));
	info!("Validating configuration file {}...", path.display());

	match GatewayConfig::load_from_path(path).await {
		Ok(config) => info!(name = %config.name, "Configuration is valid"),
		Err(e) => error!("Configuration validation failed: {}", e),
	}
}
