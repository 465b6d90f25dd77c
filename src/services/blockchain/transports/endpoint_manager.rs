//! Active and fallback RPC endpoints.
//!
//! Requests go to the active URL. Network failures and rate limiting responses rotate
//! to the next fallback that answers the transport's connection probe; the previously
//! active URL is moved to the back of the fallback list.

use reqwest::header::CONTENT_TYPE;
use reqwest_middleware::ClientWithMiddleware;
use serde::Serialize;
use serde_json::Value;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::services::blockchain::transports::{
	RotatingTransport, TransportError, ROTATE_ON_ERROR_CODES,
};

#[derive(Clone, Debug)]
pub struct EndpointManager {
	pub active_url: Arc<RwLock<String>>,
	pub fallback_urls: Arc<RwLock<Vec<String>>>,
	client: ClientWithMiddleware,
	rotation_lock: Arc<Mutex<()>>,
}

fn url_metadata(url: &str) -> Option<HashMap<String, String>> {
	Some(HashMap::from([("url".to_string(), url.to_string())]))
}

/// Splits a JSON-RPC envelope into its result or its error object.
fn into_rpc_result(envelope: Value, url: &str) -> Result<Value, TransportError> {
	match envelope.get("error") {
		Some(error) if !error.is_null() => {
			let code = error.get("code").and_then(Value::as_i64).unwrap_or_default();
			let message = error
				.get("message")
				.and_then(Value::as_str)
				.unwrap_or("unknown JSON-RPC error");
			Err(TransportError::rpc(
				code,
				message,
				error.get("data").cloned(),
				url_metadata(url),
			))
		}
		_ => Ok(envelope),
	}
}

impl EndpointManager {
	pub fn new(client: ClientWithMiddleware, active_url: &str, fallback_urls: Vec<String>) -> Self {
		Self {
			active_url: Arc::new(RwLock::new(active_url.to_string())),
			fallback_urls: Arc::new(RwLock::new(fallback_urls)),
			client,
			rotation_lock: Arc::new(Mutex::new(())),
		}
	}

	/// Makes the first fallback that answers the connection probe the active URL.
	pub async fn try_rotate_url<T: RotatingTransport>(
		&self,
		transport: &T,
	) -> Result<String, TransportError> {
		let _guard = self.rotation_lock.lock().await;
		let current = self.active_url.read().await.clone();
		let candidates: Vec<String> = self
			.fallback_urls
			.read()
			.await
			.iter()
			.filter(|url| **url != current)
			.cloned()
			.collect();

		for candidate in candidates {
			if let Err(e) = transport.try_connect(&candidate).await {
				warn!(url = %candidate, error = %e, "Fallback RPC URL failed connection probe");
				continue;
			}

			let mut active = self.active_url.write().await;
			let mut fallbacks = self.fallback_urls.write().await;
			fallbacks.retain(|url| *url != candidate);
			fallbacks.push(current.clone());
			*active = candidate.clone();

			debug!(from = %current, to = %candidate, "Rotated RPC URL");
			return Ok(candidate);
		}

		Err(TransportError::url_rotation(
			format!("No fallback URL available. Current active: '{}'", current),
			None,
			None,
		))
	}

	/// Sends a JSON-RPC request to the active URL, rotating on network errors and on
	/// [`ROTATE_ON_ERROR_CODES`]. Each URL is tried at most once per request.
	pub async fn send_raw_request<T, P>(
		&self,
		transport: &T,
		method: &str,
		params: Option<P>,
	) -> Result<Value, TransportError>
	where
		T: RotatingTransport,
		P: Into<Value> + Send + Clone + Serialize,
	{
		let request = transport.customize_request(method, params).await;
		let body = serde_json::to_string(&request).map_err(|e| {
			TransportError::request_serialization(
				"Failed to serialize request JSON",
				Some(Box::new(e)),
				Some(HashMap::from([("method".to_string(), method.to_string())])),
			)
		})?;

		let mut rotations_left = self.fallback_urls.read().await.len();

		loop {
			let url = self.active_url.read().await.clone();
			debug!(url = %url, method = %method, "Sending JSON-RPC request");

			let failure = match self
				.client
				.post(&url)
				.header(CONTENT_TYPE, "application/json")
				.body(body.clone())
				.send()
				.await
			{
				Ok(response) if response.status().is_success() => {
					let envelope: Value = response.json().await.map_err(|e| {
						TransportError::response_parse(
							"Failed to parse JSON response",
							Some(Box::new(e)),
							url_metadata(&url),
						)
					})?;
					return into_rpc_result(envelope, &url);
				}
				Ok(response) => {
					let status = response.status();
					let text = response.text().await.unwrap_or_default();
					if !ROTATE_ON_ERROR_CODES.contains(&status.as_u16()) {
						return Err(TransportError::http(status, url, text, None, None));
					}
					warn!(url = %url, status = %status, "RPC URL is rate limiting requests");
					TransportError::http(status, url, text, None, None)
				}
				Err(e) => {
					warn!(url = %url, error = %e, "Network error while sending JSON-RPC request");
					TransportError::network(e.to_string(), Some(Box::new(e)), url_metadata(&url))
				}
			};

			if rotations_left == 0 {
				return Err(failure);
			}
			rotations_left -= 1;

			if let Err(rotation_error) = self.try_rotate_url(transport).await {
				debug!(error = %rotation_error, "Giving up after failed rotation");
				return Err(failure);
			}
		}
	}
}
