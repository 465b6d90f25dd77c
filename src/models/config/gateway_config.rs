//! Gateway configuration loading and validation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, path::Path};
use tracing::warn;

use crate::{
	models::config::{ConfigError, ConfigLoader},
	utils::http::RetryConfig,
};

/// Location of the configuration file when none is given on the command line
pub const DEFAULT_CONFIG_PATH: &str = "config/gateway.json";

const MAX_LOG_CHUNK_SIZE: u64 = 100_000;

fn default_log_chunk_size() -> u64 {
	1000
}

/// RPC endpoint with its failover weight
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RpcUrl {
	/// Type of RPC endpoint (only "rpc" is supported)
	pub type_: String,

	/// URL of the endpoint
	pub url: String,

	/// Weight used to order endpoints (0-100); 0 disables the endpoint
	pub weight: u32,
}

/// Where chain data comes from.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BackendConfig {
	/// Ethereum JSON-RPC node(s)
	Rpc { rpc_urls: Vec<RpcUrl> },
	/// In-memory chain loaded from a JSON fixture file
	Fixture { path: String },
}

/// Top-level gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
	/// Human-readable name of this gateway instance
	pub name: String,

	/// Chain backend serving all collaborator traits
	pub backend: BackendConfig,

	/// Maximum number of blocks requested from the log source at once
	#[serde(default = "default_log_chunk_size")]
	pub log_chunk_size: u64,

	/// Retry policy of the JSON-RPC transport
	#[serde(default)]
	pub retry: RetryConfig,
}

impl GatewayConfig {
	/// Loads the configuration from `path`, or from [`DEFAULT_CONFIG_PATH`].
	pub async fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
		Self::load_from_path(path.unwrap_or(Path::new(DEFAULT_CONFIG_PATH))).await
	}

	fn validate_rpc_urls(rpc_urls: &[RpcUrl]) -> Result<(), ConfigError> {
		if rpc_urls.iter().all(|rpc_url| rpc_url.weight == 0) {
			return Err(ConfigError::validation_error(
				"At least one RPC URL with a non-zero weight is required",
				None,
				None,
			));
		}

		for rpc_url in rpc_urls {
			let metadata = Some(HashMap::from([("url".to_string(), rpc_url.url.clone())]));

			if rpc_url.type_ != "rpc" {
				return Err(ConfigError::validation_error(
					format!("Unsupported RPC URL type '{}'", rpc_url.type_),
					None,
					metadata,
				));
			}

			if rpc_url.weight > 100 {
				return Err(ConfigError::validation_error(
					"RPC URL weights must be between 0 and 100",
					None,
					metadata,
				));
			}

			let parsed = url::Url::parse(&rpc_url.url).map_err(|e| {
				ConfigError::validation_error(
					"Invalid RPC URL",
					Some(Box::new(e)),
					metadata.clone(),
				)
			})?;

			match parsed.scheme() {
				"https" => {}
				"http" => warn!(url = %rpc_url.url, "RPC URL uses an insecure http:// scheme"),
				_ => {
					return Err(ConfigError::validation_error(
						"RPC URLs must start with http:// or https://",
						None,
						metadata,
					))
				}
			}
		}

		Ok(())
	}
}

#[async_trait]
impl ConfigLoader for GatewayConfig {
	async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
		let metadata = Some(HashMap::from([(
			"path".to_string(),
			path.display().to_string(),
		)]));

		if !Self::is_json_file(path) {
			return Err(ConfigError::file_error(
				"configuration file must be a .json file",
				None,
				metadata,
			));
		}

		let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
			ConfigError::file_error(
				format!("failed to read gateway config file: {}", e),
				Some(Box::new(e)),
				metadata.clone(),
			)
		})?;

		let config: GatewayConfig = serde_json::from_str(&contents).map_err(|e| {
			ConfigError::parse_error(
				format!("failed to parse gateway config: {}", e),
				Some(Box::new(e)),
				metadata,
			)
		})?;

		config.validate()?;
		Ok(config)
	}

	/// Ensures that:
	/// - the gateway has a name
	/// - the chunk size is positive and bounded
	/// - the backend is usable (reachable-looking RPC URLs or a fixture path)
	fn validate(&self) -> Result<(), ConfigError> {
		if self.name.trim().is_empty() {
			return Err(ConfigError::validation_error(
				"Gateway name is required",
				None,
				None,
			));
		}

		if self.log_chunk_size == 0 || self.log_chunk_size > MAX_LOG_CHUNK_SIZE {
			return Err(ConfigError::validation_error(
				format!(
					"log_chunk_size must be between 1 and {}",
					MAX_LOG_CHUNK_SIZE
				),
				None,
				Some(HashMap::from([(
					"log_chunk_size".to_string(),
					self.log_chunk_size.to_string(),
				)])),
			));
		}

		if self.retry.initial_backoff > self.retry.max_backoff {
			return Err(ConfigError::validation_error(
				"retry.initial_backoff must not exceed retry.max_backoff",
				None,
				None,
			));
		}

		match &self.backend {
			BackendConfig::Rpc { rpc_urls } => Self::validate_rpc_urls(rpc_urls),
			BackendConfig::Fixture { path } if path.trim().is_empty() => Err(
				ConfigError::validation_error("Fixture path is required", None, None),
			),
			BackendConfig::Fixture { .. } => Ok(()),
		}
	}
}
