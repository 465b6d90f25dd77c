//! Integration tests for contract reads.

use alloy::{
	core::dyn_abi::DynSolValue,
	primitives::{Address, Bytes, U256},
};
use mockall::predicate;
use serde_json::{json, Value};
use std::sync::Arc;

use connex_gateway::{
	models::CallSpec,
	services::{
		abi::{encode_call, parse_function, ERROR_SELECTOR, PANIC_SELECTOR},
		blockchain::{CallOutcome, EvmClient, TransportError},
		call::{CallError, CallResolver},
	},
};

use crate::integration::mocks::{rpc_response, MockChainBackend, MockEVMTransportClient};

const CONTRACT: Address = Address::new([0xcc; 20]);

fn spec(signature: &str, params: Vec<u8>, block: Option<u64>) -> CallSpec {
	CallSpec {
		address: CONTRACT,
		signature: signature.to_string(),
		params: params.into(),
		block,
	}
}

fn error_string(reason: &str) -> Vec<u8> {
	let mut payload = ERROR_SELECTOR.to_vec();
	payload.extend(DynSolValue::String(reason.to_string()).abi_encode_params());
	payload
}

#[tokio::test]
async fn test_revert_carries_exact_payload() {
	let payload = error_string("insufficient balance");
	let expected = payload.clone();

	let mut backend = MockChainBackend::new();
	backend
		.expect_call()
		.times(1)
		.returning(move |_, _, _| Ok(CallOutcome::Revert(payload.clone().into())));

	let resolver = CallResolver::new(Arc::new(backend));
	match resolver
		.resolve(&spec("function transfer(address,uint256) returns (bool)", vec![], None))
		.await
	{
		Err(CallError::ExecutionReverted { data, reason, .. }) => {
			assert_eq!(data.as_ref(), expected.as_slice());
			assert_eq!(reason.as_deref(), Some("insufficient balance"));
		}
		other => panic!("expected a revert, got {other:?}"),
	}
}

#[tokio::test]
async fn test_revert_without_reason_and_panics() {
	let mut panic_payload = PANIC_SELECTOR.to_vec();
	panic_payload.extend(U256::from(0x11).to_be_bytes_vec());

	for (payload, expected_reason) in [
		(Vec::new(), None),
		(vec![0xde, 0xad, 0xbe, 0xef], None),
		(panic_payload, Some("Panic(0x11)")),
	] {
		let returned = payload.clone();
		let mut backend = MockChainBackend::new();
		backend
			.expect_call()
			.returning(move |_, _, _| Ok(CallOutcome::Revert(returned.clone().into())));

		let resolver = CallResolver::new(Arc::new(backend));
		match resolver.resolve(&spec("function f()", vec![], None)).await {
			Err(CallError::ExecutionReverted { data, reason, .. }) => {
				assert_eq!(data.as_ref(), payload.as_slice());
				assert_eq!(reason.as_deref(), expected_reason);
			}
			other => panic!("expected a revert, got {other:?}"),
		}
	}
}

#[tokio::test]
async fn test_calldata_and_block_are_forwarded() {
	let signature = "function balanceOf(address owner) view returns (uint256 balance)";
	let owner = DynSolValue::Address(Address::repeat_byte(0x01)).abi_encode();
	let calldata = encode_call(&parse_function(signature).unwrap(), &owner);
	assert_eq!(&calldata[..4], &[0x70, 0xa0, 0x82, 0x31]);

	let mut backend = MockChainBackend::new();
	backend
		.expect_call()
		.with(
			predicate::eq(CONTRACT),
			predicate::eq(calldata),
			predicate::eq(Some(42u64)),
		)
		.times(1)
		.returning(|_, _, _| {
			Ok(CallOutcome::Success(
				U256::from(5).to_be_bytes_vec().into(),
			))
		});

	let resolver = CallResolver::new(Arc::new(backend));
	let value = resolver
		.resolve(&spec(signature, owner, Some(42)))
		.await
		.unwrap();
	assert_eq!(value, json!({"0": "5", "balance": "5"}));
}

#[tokio::test]
async fn test_multiple_outputs_are_keyed_by_position_and_name() {
	let signature = "function info() view returns (string name, uint8 decimals, bool)";
	let output = DynSolValue::Tuple(vec![
		DynSolValue::String("Token".to_string()),
		DynSolValue::Uint(U256::from(18), 8),
		DynSolValue::Bool(true),
	])
	.abi_encode_params();

	let mut backend = MockChainBackend::new();
	backend
		.expect_call()
		.returning(move |_, _, _| Ok(CallOutcome::Success(output.clone().into())));

	let value = CallResolver::new(Arc::new(backend))
		.resolve(&spec(signature, vec![], None))
		.await
		.unwrap();
	assert_eq!(
		value,
		json!({"0": "Token", "name": "Token", "1": 18, "decimals": 18, "2": true})
	);
}

#[tokio::test]
async fn test_collaborator_failure_is_source_unavailable() {
	let mut backend = MockChainBackend::new();
	backend
		.expect_call()
		.returning(|_, _, _| Err(anyhow::anyhow!("timeout")));

	let resolver = CallResolver::new(Arc::new(backend));
	assert!(matches!(
		resolver.resolve(&spec("function f()", vec![], None)).await,
		Err(CallError::SourceUnavailable(_))
	));
}

#[tokio::test]
async fn test_node_revert_reaches_the_resolver() {
	let payload = error_string("paused");
	let hex_payload = format!("0x{}", hex::encode(&payload));

	let mut transport = MockEVMTransportClient::new();
	transport
		.expect_send_raw_request()
		.withf(|method, _| method == "eth_call")
		.times(1)
		.returning(move |_: &str, _: Option<Vec<Value>>| {
			Err(TransportError::rpc(
				3,
				"execution reverted: paused",
				Some(Value::String(hex_payload.clone())),
				None,
			))
		});

	let client = EvmClient::new_with_transport(transport);
	let resolver = CallResolver::new(Arc::new(client));
	match resolver.resolve(&spec("function pause()", vec![], None)).await {
		Err(CallError::ExecutionReverted { data, reason, .. }) => {
			assert_eq!(data, Bytes::from(payload));
			assert_eq!(reason.as_deref(), Some("paused"));
		}
		other => panic!("expected a revert, got {other:?}"),
	}
}

#[tokio::test]
async fn test_node_result_is_decoded() {
	let mut transport = MockEVMTransportClient::new();
	transport
		.expect_send_raw_request()
		.withf(|method, params| {
			method == "eth_call"
				&& params.as_ref().is_some_and(|params| params[1] == json!("latest"))
		})
		.times(1)
		.returning(|_: &str, _: Option<Vec<Value>>| {
			Ok(rpc_response(json!(format!("0x{}", "00".repeat(31) + "01"))))
		});

	let client = EvmClient::new_with_transport(transport);
	let value = CallResolver::new(Arc::new(client))
		.resolve(&spec("function paused() view returns (bool)", vec![], None))
		.await
		.unwrap();
	assert_eq!(value, json!({"0": true}));
}
