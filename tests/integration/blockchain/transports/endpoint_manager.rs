use mockito::Server;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use serde_json::json;

use connex_gateway::services::blockchain::{EndpointManager, TransportError};

use crate::integration::mocks::ProbeTransport;

fn get_mock_client_builder() -> ClientWithMiddleware {
	ClientBuilder::new(reqwest::Client::new()).build()
}

#[tokio::test]
async fn test_endpoint_rotation() {
	let server1 = Server::new_async().await;
	let mut server2 = Server::new_async().await;
	let server3 = Server::new_async().await;

	let mock2 = server2
		.mock("GET", "/")
		.with_status(200)
		.create_async()
		.await;

	let manager = EndpointManager::new(
		get_mock_client_builder(),
		server1.url().as_ref(),
		vec![server2.url(), server3.url()],
	);
	let transport = ProbeTransport::new();

	assert_eq!(&*manager.active_url.read().await, &server1.url());

	let new_url = manager.try_rotate_url(&transport).await.unwrap();
	assert_eq!(new_url, server2.url());
	assert_eq!(&*manager.active_url.read().await, &server2.url());
	// the previous URL becomes the last fallback
	assert_eq!(
		&*manager.fallback_urls.read().await,
		&vec![server3.url(), server1.url()]
	);

	mock2.assert();
}

#[tokio::test]
async fn test_rotation_skips_unreachable_fallbacks() {
	let server1 = Server::new_async().await;
	let mut server2 = Server::new_async().await;
	let mut server3 = Server::new_async().await;

	let _unhealthy = server2
		.mock("GET", "/")
		.with_status(503)
		.create_async()
		.await;
	let _healthy = server3
		.mock("GET", "/")
		.with_status(200)
		.create_async()
		.await;

	let manager = EndpointManager::new(
		get_mock_client_builder(),
		server1.url().as_ref(),
		vec![server2.url(), server3.url()],
	);

	let new_url = manager.try_rotate_url(&ProbeTransport::new()).await.unwrap();
	assert_eq!(new_url, server3.url());
}

#[tokio::test]
async fn test_rotation_without_fallbacks_fails() {
	let server = Server::new_async().await;
	let manager = EndpointManager::new(get_mock_client_builder(), server.url().as_ref(), vec![]);

	let result = manager.try_rotate_url(&ProbeTransport::new()).await;
	assert!(matches!(result, Err(TransportError::UrlRotation(_))));
	assert_eq!(&*manager.active_url.read().await, &server.url());
}

#[tokio::test]
async fn test_send_raw_request() {
	let mut server = Server::new_async().await;
	let mock = server
		.mock("POST", "/")
		.with_status(200)
		.with_header("content-type", "application/json")
		.with_body(r#"{"jsonrpc": "2.0", "result": "success", "id": 1}"#)
		.create_async()
		.await;

	let manager = EndpointManager::new(get_mock_client_builder(), server.url().as_ref(), vec![]);
	let result = manager
		.send_raw_request(&ProbeTransport::new(), "test_method", Some(json!(["param1"])))
		.await
		.unwrap();

	assert_eq!(result["result"], "success");
	mock.assert();
}

#[tokio::test]
async fn test_rate_limit_without_healthy_fallback_returns_http_error() {
	let mut primary = Server::new_async().await;
	let fallback = Server::new_async().await;

	let limited = primary
		.mock("POST", "/")
		.with_status(429)
		.expect(1)
		.create_async()
		.await;

	let manager = EndpointManager::new(
		get_mock_client_builder(),
		primary.url().as_ref(),
		vec![fallback.url()],
	);
	let result = manager
		.send_raw_request(&ProbeTransport::new(), "eth_blockNumber", Some(json!([])))
		.await;

	match result {
		Err(TransportError::Http { status_code, .. }) => assert_eq!(status_code.as_u16(), 429),
		other => panic!("expected an HTTP error, got {other:?}"),
	}
	assert_eq!(&*manager.active_url.read().await, &primary.url());
	limited.assert();
}

#[tokio::test]
async fn test_network_error_rotates() {
	let mut fallback = Server::new_async().await;
	let _probe = fallback
		.mock("GET", "/")
		.with_status(200)
		.create_async()
		.await;
	let served = fallback
		.mock("POST", "/")
		.with_status(200)
		.with_header("content-type", "application/json")
		.with_body(r#"{"jsonrpc": "2.0", "result": "0x1", "id": 1}"#)
		.expect(1)
		.create_async()
		.await;

	let manager = EndpointManager::new(
		get_mock_client_builder(),
		"http://127.0.0.1:1",
		vec![fallback.url()],
	);
	let result = manager
		.send_raw_request(&ProbeTransport::new(), "eth_chainId", Some(json!([])))
		.await
		.unwrap();

	assert_eq!(result["result"], "0x1");
	assert_eq!(&*manager.active_url.read().await, &fallback.url());
	served.assert();
}
