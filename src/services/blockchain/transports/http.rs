//! HTTP transport for JSON-RPC nodes.
//!
//! Endpoints are ordered by weight (highest first, weight 0 disabled). The first
//! endpoint answering the connection probe becomes active; the rest are fallbacks.
//! Transient failures are retried by the middleware configured from [`RetryConfig`].

use anyhow::Context;
use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::{
	models::RpcUrl,
	services::blockchain::transports::{
		BlockchainTransport, EndpointManager, RotatingTransport, TransientErrorRetryStrategy,
		TransportError,
	},
	utils::http::{create_retryable_http_client, RetryConfig},
};

#[derive(Clone, Debug)]
pub struct HttpTransportClient {
	/// Retryable HTTP client shared with the endpoint manager
	pub client: ClientWithMiddleware,
	endpoint_manager: EndpointManager,
	/// Request sent to check that an endpoint is alive
	connection_probe: Value,
}

impl HttpTransportClient {
	/// Connects to the highest-weighted endpoint that answers `eth_chainId`.
	pub async fn new(rpc_urls: &[RpcUrl], retry_config: &RetryConfig) -> Result<Self, anyhow::Error> {
		let mut rpc_urls: Vec<_> = rpc_urls
			.iter()
			.filter(|rpc_url| rpc_url.type_ == "rpc" && rpc_url.weight > 0)
			.collect();
		rpc_urls.sort_by(|a, b| b.weight.cmp(&a.weight));

		let base_client = reqwest::ClientBuilder::new()
			.pool_idle_timeout(Duration::from_secs(90))
			.pool_max_idle_per_host(32)
			.timeout(Duration::from_secs(30))
			.connect_timeout(Duration::from_secs(20))
			.build()
			.context("Failed to create base HTTP client")?;

		let client = create_retryable_http_client(
			retry_config,
			base_client,
			Some(TransientErrorRetryStrategy),
		);

		let connection_probe = json!({
			"jsonrpc": "2.0",
			"id": 1,
			"method": "eth_chainId",
			"params": []
		});

		for rpc_url in rpc_urls.iter() {
			if let Err(e) = Self::probe(&client, &connection_probe, &rpc_url.url).await {
				warn!(url = %rpc_url.url, error = %e, "RPC URL failed connection probe");
				continue;
			}

			let fallback_urls: Vec<String> = rpc_urls
				.iter()
				.filter(|other| other.url != rpc_url.url)
				.map(|other| other.url.clone())
				.collect();

			debug!(url = %rpc_url.url, fallbacks = fallback_urls.len(), "Connected to RPC URL");
			return Ok(Self {
				endpoint_manager: EndpointManager::new(client.clone(), &rpc_url.url, fallback_urls),
				client,
				connection_probe,
			});
		}

		Err(anyhow::anyhow!("All RPC URLs failed to connect"))
	}

	async fn probe(
		client: &ClientWithMiddleware,
		payload: &Value,
		url: &str,
	) -> Result<(), anyhow::Error> {
		let url = Url::parse(url).map_err(|_| anyhow::anyhow!("Invalid URL: {}", url))?;
		let response = client
			.post(url.clone())
			.json(payload)
			.send()
			.await
			.with_context(|| format!("Failed to connect to {}", url))?;

		if !response.status().is_success() {
			return Err(anyhow::anyhow!(
				"Failed to connect to {}: {}",
				url,
				response.status().as_u16()
			));
		}
		Ok(())
	}
}

#[async_trait]
impl BlockchainTransport for HttpTransportClient {
	async fn get_current_url(&self) -> String {
		self.endpoint_manager.active_url.read().await.clone()
	}

	async fn send_raw_request<P>(
		&self,
		method: &str,
		params: Option<P>,
	) -> Result<Value, TransportError>
	where
		P: Into<Value> + Send + Clone + Serialize,
	{
		self.endpoint_manager
			.send_raw_request(self, method, params)
			.await
	}
}

#[async_trait]
impl RotatingTransport for HttpTransportClient {
	async fn try_connect(&self, url: &str) -> Result<(), anyhow::Error> {
		Self::probe(&self.client, &self.connection_probe, url).await
	}
}
