//! Integration tests for the JSON-RPC node client, driven by a mocked transport.

use alloy::primitives::{Address, Bytes, B256, U256};
use mockall::{predicate, Sequence};
use serde_json::{json, Value};

use connex_gateway::{
	models::{LogKind, LogRecord},
	services::blockchain::{
		BroadcastSink, EvmClient, ExecutionClient, LogQuery, LogSource, StateSource,
		SubmitOutcome, TransportError,
	},
};

use crate::integration::mocks::{rpc_response, MockEVMTransportClient};

const TOKEN: &str = "0x1234567890123456789012345678901234567890";

fn hash(byte: u8) -> String {
	format!("0x{}", hex::encode([byte; 32]))
}

fn address(byte: u8) -> String {
	format!("0x{}", hex::encode([byte; 20]))
}

fn create_mock_block(number: u64, transactions: Vec<Value>) -> Value {
	json!({
		"number": format!("0x{:x}", number),
		"hash": format!("0x{:064x}", number),
		"parentHash": format!("0x{:064x}", number.wrapping_sub(1)),
		"sha3Uncles": "0x1dcc4de8dec75d7aab85b567b6ccd41ad312451b948a7413f0a142fd40d49347",
		"miner": format!("0x{:040x}", number),
		"stateRoot": format!("0x{:064x}", number),
		"transactionsRoot": format!("0x{:064x}", number),
		"gasUsed": "0x5208",
		"gasLimit": "0x1c9c380",
		"timestamp": "0x674c0aef",
		"difficulty": "0x0",
		"totalDifficulty": "0x10",
		"uncles": [],
		"transactions": transactions,
	})
}

fn create_mock_log(block: u64, log_index: u64, tx: u8) -> Value {
	json!({
		"address": TOKEN,
		"topics": [hash(0xdd)],
		"data": "0x",
		"blockNumber": format!("0x{:x}", block),
		"blockHash": format!("0x{:064x}", block),
		"transactionHash": hash(tx),
		"transactionIndex": "0x0",
		"logIndex": format!("0x{:x}", log_index),
		"removed": false
	})
}

#[tokio::test]
async fn test_read_event_logs_enriches_records() {
	let mut transport = MockEVMTransportClient::new();

	let expected_params = json!([{
		"fromBlock": "0x1",
		"toBlock": "0xa",
		"address": [TOKEN]
	}]);
	transport
		.expect_send_raw_request()
		.with(
			predicate::eq("eth_getLogs"),
			predicate::eq(Some(expected_params.as_array().unwrap().to_vec())),
		)
		.times(1)
		.returning(|_: &str, _: Option<Vec<Value>>| {
			Ok(rpc_response(json!([
				create_mock_log(5, 1, 0x22),
				create_mock_log(5, 0, 0x11),
			])))
		});
	// each block is fetched once
	transport
		.expect_send_raw_request()
		.withf(|method, params| {
			method == "eth_getBlockByNumber" && params.as_ref().is_some_and(|p| p[0] == json!("0x5"))
		})
		.times(1)
		.returning(|_: &str, _: Option<Vec<Value>>| {
			Ok(rpc_response(create_mock_block(
				5,
				vec![json!({
					"hash": hash(0x11),
					"from": address(0x77),
					"to": TOKEN,
					"value": "0x0"
				})],
			)))
		});

	let client = EvmClient::new_with_transport(transport);
	let records = client
		.read_logs(LogQuery {
			kind: LogKind::Event,
			addresses: Some(vec![TOKEN.parse().unwrap()]),
			from: 1,
			to: 10,
		})
		.await
		.unwrap();

	assert_eq!(records.len(), 2);
	assert_eq!(records[0].position(), (5, 0));
	assert_eq!(records[0].meta.tx_origin, Address::repeat_byte(0x77));
	assert_eq!(records[0].meta.block_timestamp, 0x674c0aef);
	assert_eq!(records[0].meta.block_id, B256::from(U256::from(5)));
	// origin of an unknown transaction stays zero
	assert_eq!(records[1].meta.tx_origin, Address::ZERO);
}

#[tokio::test]
async fn test_read_logs_missing_result() {
	let mut transport = MockEVMTransportClient::new();
	transport
		.expect_send_raw_request()
		.returning(|_: &str, _: Option<Vec<Value>>| Ok(json!({"id": 1, "jsonrpc": "2.0"})));

	let client = EvmClient::new_with_transport(transport);
	let error = client
		.read_logs(LogQuery {
			kind: LogKind::Event,
			addresses: None,
			from: 1,
			to: 10,
		})
		.await
		.unwrap_err();
	assert!(format!("{:#}", error).contains("Missing 'result' field"));
}

#[tokio::test]
async fn test_read_transfers_from_blocks_and_receipts() {
	let mut transport = MockEVMTransportClient::new();
	let mut seq = Sequence::new();

	transport
		.expect_send_raw_request()
		.withf(|method, _| method == "eth_getBlockByNumber")
		.times(1)
		.in_sequence(&mut seq)
		.returning(|_: &str, _: Option<Vec<Value>>| {
			Ok(rpc_response(create_mock_block(
				9,
				vec![
					json!({"hash": hash(0x01), "from": address(0x0a), "to": address(0x0b), "value": "0x64"}),
					json!({"hash": hash(0x02), "from": address(0x0a), "to": address(0x0c), "value": "0x0"}),
					json!({"hash": hash(0x03), "from": address(0x0a), "to": address(0x0d), "value": "0x1"}),
				],
			)))
		});
	transport
		.expect_send_raw_request()
		.withf(|method, params| {
			method == "eth_getTransactionReceipt"
				&& params.as_ref().is_some_and(|p| p[0] == json!(hash(0x01)))
		})
		.times(1)
		.in_sequence(&mut seq)
		.returning(|_: &str, _: Option<Vec<Value>>| Ok(rpc_response(json!({"status": "0x1"}))));
	// failed transactions transfer nothing
	transport
		.expect_send_raw_request()
		.withf(|method, params| {
			method == "eth_getTransactionReceipt"
				&& params.as_ref().is_some_and(|p| p[0] == json!(hash(0x03)))
		})
		.times(1)
		.in_sequence(&mut seq)
		.returning(|_: &str, _: Option<Vec<Value>>| Ok(rpc_response(json!({"status": "0x0"}))));

	let client = EvmClient::new_with_transport(transport);
	let records: Vec<LogRecord> = client
		.read_logs(LogQuery {
			kind: LogKind::Transfer,
			addresses: None,
			from: 9,
			to: 9,
		})
		.await
		.unwrap();

	assert_eq!(records.len(), 1);
	let transfer = records[0].transfer.as_ref().unwrap();
	assert_eq!(transfer.sender, Address::repeat_byte(0x0a));
	assert_eq!(transfer.recipient, Address::repeat_byte(0x0b));
	assert_eq!(transfer.amount, U256::from(100));
	assert_eq!(records[0].kind(), LogKind::Transfer);
}

#[tokio::test]
async fn test_get_head_and_block() {
	let mut transport = MockEVMTransportClient::new();
	transport
		.expect_send_raw_request()
		.withf(|method, _| method == "eth_blockNumber")
		.times(1)
		.returning(|_: &str, _: Option<Vec<Value>>| Ok(rpc_response(json!("0x64"))));
	transport
		.expect_send_raw_request()
		.withf(|method, params| {
			method == "eth_getBlockByNumber"
				&& params.as_ref().is_some_and(|p| p[0] == json!("0x64"))
		})
		.times(1)
		.returning(|_: &str, _: Option<Vec<Value>>| Ok(rpc_response(create_mock_block(100, vec![]))));
	transport
		.expect_send_raw_request()
		.withf(|method, params| {
			method == "eth_getBlockByNumber" && params.as_ref().is_some_and(|p| p[0] == json!("0x0"))
		})
		.times(1)
		.returning(|_: &str, _: Option<Vec<Value>>| Ok(rpc_response(Value::Null)));

	let client = EvmClient::new_with_transport(transport);
	let head = client.get_head().await.unwrap();
	assert_eq!(head.number, 100);
	assert_eq!(head.parent_id, B256::from(U256::from(99)));

	assert_eq!(client.get_block(0).await.unwrap(), None);
}

#[tokio::test]
async fn test_get_account_without_proof_support() {
	let mut transport = MockEVMTransportClient::new();
	transport
		.expect_send_raw_request()
		.withf(|method, params| {
			method == "eth_getBalance" && params.as_ref().is_some_and(|p| p[1] == json!("0x2a"))
		})
		.returning(|_: &str, _: Option<Vec<Value>>| Ok(rpc_response(json!("0x3e8"))));
	transport
		.expect_send_raw_request()
		.withf(|method, _| method == "eth_getCode")
		.returning(|_: &str, _: Option<Vec<Value>>| Ok(rpc_response(json!("0x6080"))));
	transport
		.expect_send_raw_request()
		.withf(|method, _| method == "eth_getProof")
		.returning(|_: &str, _: Option<Vec<Value>>| {
			Err(TransportError::rpc(-32601, "method not found", None, None))
		});

	let client = EvmClient::new_with_transport(transport);
	let state = client
		.get_account(TOKEN.parse().unwrap(), Some(42))
		.await
		.unwrap();
	assert_eq!(state.balance, U256::from(1000));
	assert_eq!(state.code, Bytes::from(vec![0x60, 0x80]));
	assert_eq!(state.storage_root, None);
}

#[tokio::test]
async fn test_sync_progress() {
	for (syncing, expected) in [
		(json!(false), 100),
		(
			json!({"startingBlock": "0x0", "currentBlock": "0x32", "highestBlock": "0x64"}),
			50,
		),
	] {
		let mut transport = MockEVMTransportClient::new();
		transport
			.expect_send_raw_request()
			.withf(|method, _| method == "eth_syncing")
			.returning(move |_: &str, _: Option<Vec<Value>>| Ok(rpc_response(syncing.clone())));

		let client = EvmClient::new_with_transport(transport);
		assert_eq!(client.get_sync_progress().await.unwrap(), expected);
	}
}

#[tokio::test]
async fn test_call_distinguishes_reverts_from_failures() {
	let mut transport = MockEVMTransportClient::new();
	transport
		.expect_send_raw_request()
		.times(1)
		.returning(|_: &str, _: Option<Vec<Value>>| {
			Err(TransportError::rpc(-32602, "invalid argument", None, None))
		});

	let client = EvmClient::new_with_transport(transport);
	assert!(client
		.call(Address::ZERO, Bytes::new(), None)
		.await
		.is_err());
}

#[tokio::test]
async fn test_submit_accepts_and_rejects() {
	let mut transport = MockEVMTransportClient::new();
	transport
		.expect_send_raw_request()
		.with(
			predicate::eq("eth_sendRawTransaction"),
			predicate::eq(Some(vec![json!("0x01")])),
		)
		.times(1)
		.returning(|_: &str, _: Option<Vec<Value>>| Ok(rpc_response(json!(hash(0xab)))));
	transport
		.expect_send_raw_request()
		.with(
			predicate::eq("eth_sendRawTransaction"),
			predicate::eq(Some(vec![json!("0x02")])),
		)
		.times(1)
		.returning(|_: &str, _: Option<Vec<Value>>| {
			Err(TransportError::rpc(-32000, "nonce too low", None, None))
		});

	let client = EvmClient::new_with_transport(transport);
	assert_eq!(
		client.submit(Bytes::from(vec![0x01])).await.unwrap(),
		SubmitOutcome::Accepted(B256::repeat_byte(0xab))
	);
	assert_eq!(
		client.submit(Bytes::from(vec![0x02])).await.unwrap(),
		SubmitOutcome::Rejected("nonce too low".to_string())
	);
}
