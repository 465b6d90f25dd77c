//! JSON-RPC transport used by the node backend.
//!
//! - `http`: HTTP transport with weighted endpoints and retry middleware
//! - `endpoint_manager`: active/fallback endpoint bookkeeping and rotation

mod endpoint_manager;
mod error;
mod http;

pub use endpoint_manager::EndpointManager;
pub use error::TransportError;
pub use http::HttpTransportClient;

use reqwest_retry::{
	default_on_request_failure, default_on_request_success, Retryable, RetryableStrategy,
};
use serde::Serialize;
use serde_json::{json, Value};

/// HTTP status codes that trigger RPC endpoint rotation
/// - 429: Too Many Requests - indicates rate limiting from the current endpoint
pub const ROTATE_ON_ERROR_CODES: [u16; 1] = [429];

/// Base trait for JSON-RPC transports
#[async_trait::async_trait]
pub trait BlockchainTransport: Send + Sync {
	/// Get the current URL being used by the transport
	async fn get_current_url(&self) -> String;

	/// Sends a request and returns the full JSON-RPC response envelope.
	///
	/// A response carrying an `error` object is returned as [`TransportError::Rpc`].
	async fn send_raw_request<P>(
		&self,
		method: &str,
		params: Option<P>,
	) -> Result<Value, TransportError>
	where
		P: Into<Value> + Send + Clone + Serialize;

	/// Builds the request body
	async fn customize_request<P>(&self, method: &str, params: Option<P>) -> Value
	where
		P: Into<Value> + Send + Clone + Serialize,
	{
		json!({
			"jsonrpc": "2.0",
			"id": 1,
			"method": method,
			"params": params.map(|p| p.into())
		})
	}
}

/// Extension trait for transports that can probe alternative endpoints
#[async_trait::async_trait]
pub trait RotatingTransport: BlockchainTransport {
	/// Checks that `url` answers the connection probe
	async fn try_connect(&self, url: &str) -> Result<(), anyhow::Error>;
}

/// Retries transient failures (timeouts, 5xx, 429) and nothing else
pub struct TransientErrorRetryStrategy;
impl RetryableStrategy for TransientErrorRetryStrategy {
	fn handle(
		&self,
		res: &Result<reqwest::Response, reqwest_middleware::Error>,
	) -> Option<Retryable> {
		match res {
			Ok(success) => default_on_request_success(success),
			Err(error) => default_on_request_failure(error),
		}
	}
}
