//! Bootstrap module for building the gateway from its configuration.
//!
//! - `create_backend`: builds the chain backend named by the configuration
//! - `initialize_gateway`: loads the configuration and wires the resolvers
//! - `load_request` / `execute_query`: read and resolve a request document

use serde_json::{json, Value};
use std::{collections::HashMap, error::Error, path::Path, sync::Arc};
use tracing::{info, instrument};

use crate::{
	models::{BackendConfig, ConfigError, GatewayConfig},
	services::{
		blockchain::{ChainBackend, EvmClient, MemoryChain},
		gateway::{Gateway, GatewayError, GatewayRequest},
	},
	utils::logging::error::TraceableError,
};

/// Type alias for handling ServiceResult
pub type Result<T> = std::result::Result<T, Box<dyn Error>>;

/// Chain backend shared by every resolver
pub type SharedBackend = Arc<dyn ChainBackend>;

/// Gateway over a dynamically chosen backend
pub type GatewayService = Gateway<dyn ChainBackend>;

/// Builds the backend described by `config`.
///
/// RPC backends probe their endpoints before returning; fixture backends load the
/// whole fixture file into memory.
pub async fn create_backend(config: &GatewayConfig) -> Result<SharedBackend> {
	let backend: SharedBackend = match &config.backend {
		BackendConfig::Rpc { rpc_urls } => {
			let client = EvmClient::new(rpc_urls, &config.retry).await?;
			info!(urls = rpc_urls.len(), "Connected to JSON-RPC backend");
			Arc::new(client)
		}
		BackendConfig::Fixture { path } => {
			let chain = MemoryChain::from_fixture_file(Path::new(path)).await?;
			info!(path = %path, "Loaded fixture backend");
			Arc::new(chain)
		}
	};
	Ok(backend)
}

/// Loads the configuration and builds the gateway.
///
/// # Errors
/// Returns an error if the configuration is invalid or the backend cannot be built
pub async fn initialize_gateway(
	config_path: Option<&Path>,
) -> Result<(GatewayConfig, GatewayService)> {
	let config = GatewayConfig::load(config_path).await?;
	let backend = create_backend(&config).await?;
	let gateway = Gateway::new(backend, config.log_chunk_size);
	Ok((config, gateway))
}

/// Reads a request document from `path`.
pub async fn load_request(path: &Path) -> std::result::Result<GatewayRequest, ConfigError> {
	let metadata = Some(HashMap::from([(
		"path".to_string(),
		path.display().to_string(),
	)]));

	let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
		ConfigError::file_error(
			"failed to read request document",
			Some(Box::new(e)),
			metadata.clone(),
		)
	})?;

	serde_json::from_str(&contents).map_err(|e| {
		ConfigError::parse_error(
			format!("failed to parse request document: {}", e),
			Some(Box::new(e)),
			metadata,
		)
	})
}

/// Error document for a failed request: category, message, trace id and, for
/// reverts, the raw payload and decoded reason.
pub fn error_document(error: &GatewayError) -> Value {
	let message = match error {
		GatewayError::ValidationError(ctx)
		| GatewayError::DecodeError(ctx)
		| GatewayError::SourceUnavailable(ctx)
		| GatewayError::BroadcastRejected(ctx) => ctx.format_with_metadata(),
		GatewayError::ExecutionReverted { context, .. } => context.message.clone(),
		GatewayError::Other(e) => e.to_string(),
	};

	let mut document = json!({
		"category": error.category(),
		"message": message,
		"traceId": error.trace_id(),
	});
	if let GatewayError::ExecutionReverted { data, reason, .. } = error {
		document["data"] = json!(data);
		document["reason"] = json!(reason);
	}
	json!({ "errors": [document] })
}

/// Resolves the request document at `path` and returns the response document.
///
/// Request failures are reported in the returned document; only unreadable request
/// files are errors.
#[instrument(skip(gateway))]
pub async fn execute_query(gateway: &GatewayService, path: &Path) -> Result<Value> {
	let request = load_request(path).await?;
	let field = request.field();

	let document = match gateway.resolve(request).await {
		Ok(response) => serde_json::to_value(response)?,
		Err(error) => {
			info!(field, category = error.category(), "Request failed");
			error_document(&error)
		}
	};
	Ok(document)
}
