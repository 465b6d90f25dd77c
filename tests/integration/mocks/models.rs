//! Shared fixtures: mockito JSON-RPC servers, RPC URL lists and head pointers.

use alloy::primitives::B256;
use connex_gateway::{
	models::{Head, RpcUrl},
	utils::http::{JitterSetting, RetryConfig},
};
use mockito::{Matcher, Mock, Server};
use serde_json::json;
use std::time::Duration;

/// Mocks a successful `eth_chainId` connection probe
pub fn create_http_valid_server_mock_network_response(server: &mut Server) -> Mock {
	server
		.mock("POST", "/")
		.match_body(Matcher::PartialJson(json!({"method": "eth_chainId"})))
		.with_header("content-type", "application/json")
		.with_status(200)
		.with_body(r#"{"jsonrpc":"2.0","id":1,"result":"0x1"}"#)
		.create()
}

/// RPC URLs with descending weights, in the given order
pub fn create_rpc_urls(urls: Vec<&str>) -> Vec<RpcUrl> {
	urls.into_iter()
		.enumerate()
		.map(|(index, url)| RpcUrl {
			type_: "rpc".to_string(),
			url: url.to_string(),
			weight: 100u32.saturating_sub(index as u32),
		})
		.collect()
}

/// Retry policy without retries, so failures surface immediately
pub fn no_retry_config() -> RetryConfig {
	RetryConfig {
		max_retries: 0,
		base_for_backoff: 2,
		initial_backoff: Duration::from_millis(1),
		max_backoff: Duration::from_millis(1),
		jitter: JitterSetting::None,
	}
}

/// Head at block `number`
pub fn head_at(number: u64) -> Head {
	Head {
		id: B256::with_last_byte(number as u8),
		number,
		timestamp: 1_700_000_000 + number,
		parent_id: B256::ZERO,
	}
}
