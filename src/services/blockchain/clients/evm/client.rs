//! Ethereum JSON-RPC backend.
//!
//! Implements every collaborator role on top of a [`BlockchainTransport`]:
//! event logs from `eth_getLogs`, value transfers from full blocks and receipts,
//! account state, `eth_call` and `eth_sendRawTransaction`.

use alloy::primitives::{Address, Bytes, B256, U256, U64};
use anyhow::Context;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::{debug, instrument};

use crate::{
	models::{AccountState, Block, Head, LogKind, LogMeta, LogRecord, RpcUrl, TransferFields},
	services::blockchain::{
		client::{
			BroadcastSink, CallOutcome, ExecutionClient, LogQuery, LogSource, StateSource,
			SubmitOutcome,
		},
		transports::{BlockchainTransport, HttpTransportClient, TransportError},
		BlockChainError,
	},
	utils::http::RetryConfig,
};

/// JSON-RPC code geth and most clients use for `execution reverted`
const EXECUTION_REVERTED: i64 = 3;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcLog {
	address: Address,
	topics: Vec<B256>,
	data: Bytes,
	block_number: U64,
	transaction_hash: B256,
	log_index: U64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcTransaction {
	hash: B256,
	from: Address,
	to: Option<Address>,
	value: U256,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcBlock {
	hash: B256,
	number: U64,
	parent_hash: B256,
	timestamp: U64,
	gas_limit: U64,
	gas_used: U64,
	miner: Address,
	state_root: B256,
	transactions_root: B256,
	#[serde(default)]
	total_difficulty: Option<U256>,
	#[serde(default)]
	transactions: Vec<RpcTransaction>,
}

impl RpcBlock {
	fn number(&self) -> u64 {
		self.number.to::<u64>()
	}

	fn timestamp(&self) -> u64 {
		self.timestamp.to::<u64>()
	}

	fn origin_of(&self, tx_hash: &B256) -> Address {
		self.transactions
			.iter()
			.find(|tx| tx.hash == *tx_hash)
			.map(|tx| tx.from)
			.unwrap_or_default()
	}

	fn into_block(self) -> Block {
		Block {
			id: self.hash,
			number: self.number(),
			parent_id: self.parent_hash,
			timestamp: self.timestamp(),
			gas_limit: self.gas_limit.to::<u64>(),
			beneficiary: self.miner,
			gas_used: self.gas_used.to::<u64>(),
			total_score: self
				.total_difficulty
				.and_then(|score| u64::try_from(score).ok())
				.unwrap_or_default(),
			tx_root: self.transactions_root,
			state_root: self.state_root,
			signer: self.miner,
			transactions: self.transactions.iter().map(|tx| tx.hash).collect(),
			is_trunk: true,
		}
	}
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcReceipt {
	#[serde(default)]
	status: Option<U64>,
	#[serde(default)]
	contract_address: Option<Address>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcSyncing {
	starting_block: U64,
	current_block: U64,
	highest_block: U64,
}

fn quantity(number: u64) -> String {
	format!("0x{:x}", number)
}

fn block_tag(block: Option<u64>) -> String {
	block.map(quantity).unwrap_or_else(|| "latest".to_string())
}

/// Extracts and deserializes the `result` field of a JSON-RPC response.
fn parse_result<T: DeserializeOwned>(response: Value, method: &str) -> Result<T, anyhow::Error> {
	let result = response
		.get("result")
		.cloned()
		.with_context(|| format!("Missing 'result' field in {} response", method))?;
	serde_json::from_value(result).with_context(|| format!("Failed to parse {} result", method))
}

/// Client for Ethereum JSON-RPC nodes
#[derive(Clone)]
pub struct EvmClient<T> {
	transport: T,
}

impl<T> EvmClient<T> {
	pub fn new_with_transport(transport: T) -> Self {
		Self { transport }
	}
}

impl EvmClient<HttpTransportClient> {
	/// Connects to the highest-weighted reachable endpoint of `rpc_urls`.
	pub async fn new(rpc_urls: &[RpcUrl], retry: &RetryConfig) -> Result<Self, BlockChainError> {
		let transport = HttpTransportClient::new(rpc_urls, retry).await.map_err(|e| {
			BlockChainError::connection_error(
				"Failed to connect to any RPC URL",
				Some(e.into()),
				None,
			)
		})?;
		Ok(Self::new_with_transport(transport))
	}
}

impl<T: BlockchainTransport> EvmClient<T> {
	async fn request<R: DeserializeOwned>(
		&self,
		method: &str,
		params: Value,
	) -> Result<R, anyhow::Error> {
		let response = self
			.transport
			.send_raw_request(method, Some(params))
			.await
			.with_context(|| format!("{} request failed", method))?;
		parse_result(response, method)
	}

	async fn get_rpc_block(&self, number: Option<u64>) -> Result<Option<RpcBlock>, anyhow::Error> {
		self.request("eth_getBlockByNumber", json!([block_tag(number), true]))
			.await
			.with_context(|| format!("Failed to get block {}", block_tag(number)))
	}

	async fn get_block_number(&self) -> Result<u64, anyhow::Error> {
		let number: U64 = self.request("eth_blockNumber", json!([])).await?;
		Ok(number.to::<u64>())
	}

	async fn read_event_logs(&self, query: &LogQuery) -> Result<Vec<LogRecord>, anyhow::Error> {
		let mut filter = json!({
			"fromBlock": quantity(query.from),
			"toBlock": quantity(query.to),
		});
		if let Some(addresses) = &query.addresses {
			filter["address"] = json!(addresses);
		}

		let logs: Vec<RpcLog> = self
			.request("eth_getLogs", json!([filter]))
			.await
			.with_context(|| format!("Failed to get logs for blocks {} - {}", query.from, query.to))?;

		// Logs carry neither block time nor transaction origin
		let mut blocks: HashMap<u64, RpcBlock> = HashMap::new();
		let mut records = Vec::with_capacity(logs.len());
		for log in logs {
			let number = log.block_number.to::<u64>();
			if !blocks.contains_key(&number) {
				let block = self
					.get_rpc_block(Some(number))
					.await?
					.with_context(|| format!("Block {} of a returned log not found", number))?;
				blocks.insert(number, block);
			}
			let block = &blocks[&number];

			records.push(LogRecord {
				address: log.address,
				topics: log.topics,
				data: log.data,
				meta: LogMeta {
					block_id: block.hash,
					block_number: number,
					block_timestamp: block.timestamp(),
					tx_id: log.transaction_hash,
					tx_origin: block.origin_of(&log.transaction_hash),
					log_index: log.log_index.to::<u64>(),
				},
				transfer: None,
			});
		}

		records.sort_by_key(LogRecord::position);
		Ok(records)
	}

	async fn read_transfers(&self, query: &LogQuery) -> Result<Vec<LogRecord>, anyhow::Error> {
		let mut records = Vec::new();

		for number in query.from..=query.to {
			let Some(block) = self.get_rpc_block(Some(number)).await? else {
				continue;
			};

			let mut log_index = 0;
			for tx in block.transactions.iter().filter(|tx| !tx.value.is_zero()) {
				let receipt: Option<RpcReceipt> = self
					.request("eth_getTransactionReceipt", json!([tx.hash]))
					.await?;
				let Some(receipt) = receipt else {
					continue;
				};
				if receipt.status.is_some_and(|status| status.is_zero()) {
					continue;
				}
				let Some(recipient) = tx.to.or(receipt.contract_address) else {
					continue;
				};

				records.push(LogRecord {
					address: Address::ZERO,
					topics: Vec::new(),
					data: Bytes::new(),
					meta: LogMeta {
						block_id: block.hash,
						block_number: number,
						block_timestamp: block.timestamp(),
						tx_id: tx.hash,
						tx_origin: tx.from,
						log_index,
					},
					transfer: Some(TransferFields {
						sender: tx.from,
						recipient,
						amount: tx.value,
					}),
				});
				log_index += 1;
			}
		}

		Ok(records)
	}

	async fn get_storage_root(
		&self,
		address: Address,
		block: Option<u64>,
	) -> Result<Option<B256>, anyhow::Error> {
		let response = self
			.transport
			.send_raw_request(
				"eth_getProof",
				Some(json!([address, Vec::<B256>::new(), block_tag(block)])),
			)
			.await;

		match response {
			Ok(response) => {
				let proof: Value = parse_result(response, "eth_getProof")?;
				Ok(proof
					.get("storageHash")
					.cloned()
					.and_then(|hash| serde_json::from_value(hash).ok()))
			}
			// Nodes without proof support report no storage root
			Err(TransportError::Rpc { code, message, .. }) => {
				debug!(code, message = %message, "Storage root unavailable");
				Ok(None)
			}
			Err(e) => Err(anyhow::Error::new(e).context("eth_getProof request failed")),
		}
	}
}

/// Revert payload carried by a JSON-RPC error, if the error is a revert.
fn revert_payload(code: i64, message: &str, data: Option<&Value>) -> Option<Bytes> {
	let payload = data.and_then(|data| match data {
		Value::String(hex) => hex.parse::<Bytes>().ok(),
		Value::Object(object) => object
			.get("data")
			.and_then(Value::as_str)
			.and_then(|hex| hex.parse::<Bytes>().ok()),
		_ => None,
	});

	if code == EXECUTION_REVERTED || message.contains("revert") || payload.is_some() {
		Some(payload.unwrap_or_default())
	} else {
		None
	}
}

#[async_trait]
impl<T: BlockchainTransport> LogSource for EvmClient<T> {
	#[instrument(skip(self), fields(from = query.from, to = query.to))]
	async fn read_logs(&self, query: LogQuery) -> Result<Vec<LogRecord>, anyhow::Error> {
		match query.kind {
			LogKind::Event => self.read_event_logs(&query).await,
			LogKind::Transfer => self.read_transfers(&query).await,
		}
	}
}

#[async_trait]
impl<T: BlockchainTransport> StateSource for EvmClient<T> {
	#[instrument(skip(self))]
	async fn get_account(
		&self,
		address: Address,
		block: Option<u64>,
	) -> Result<AccountState, anyhow::Error> {
		let tag = block_tag(block);
		let balance: U256 = self
			.request("eth_getBalance", json!([address, tag]))
			.await
			.with_context(|| format!("Failed to get balance of {}", address))?;
		let code: Bytes = self
			.request("eth_getCode", json!([address, tag]))
			.await
			.with_context(|| format!("Failed to get code of {}", address))?;
		let storage_root = self.get_storage_root(address, block).await?;

		Ok(AccountState {
			balance,
			code,
			storage_root,
			self_destructed: false,
		})
	}

	#[instrument(skip(self))]
	async fn get_head(&self) -> Result<Head, anyhow::Error> {
		let number = self.get_block_number().await?;
		let block = self
			.get_rpc_block(Some(number))
			.await?
			.with_context(|| format!("Head block {} not found", number))?;
		Ok(block.into_block().head())
	}

	#[instrument(skip(self))]
	async fn get_block(&self, number: u64) -> Result<Option<Block>, anyhow::Error> {
		Ok(self.get_rpc_block(Some(number)).await?.map(RpcBlock::into_block))
	}

	#[instrument(skip(self))]
	async fn get_sync_progress(&self) -> Result<u64, anyhow::Error> {
		let syncing: Value = self.request("eth_syncing", json!([])).await?;
		if syncing == Value::Bool(false) {
			return Ok(100);
		}

		let syncing: RpcSyncing =
			serde_json::from_value(syncing).context("Failed to parse eth_syncing result")?;
		let start = syncing.starting_block.to::<u64>();
		let current = syncing.current_block.to::<u64>().saturating_sub(start);
		let highest = syncing.highest_block.to::<u64>().saturating_sub(start);
		if highest == 0 {
			return Ok(100);
		}
		Ok((current.saturating_mul(100) / highest).min(100))
	}
}

#[async_trait]
impl<T: BlockchainTransport> ExecutionClient for EvmClient<T> {
	#[instrument(skip(self, data))]
	async fn call(
		&self,
		address: Address,
		data: Bytes,
		block: Option<u64>,
	) -> Result<CallOutcome, anyhow::Error> {
		let params = json!([{"to": address, "data": data}, block_tag(block)]);

		match self.transport.send_raw_request("eth_call", Some(params)).await {
			Ok(response) => Ok(CallOutcome::Success(parse_result(response, "eth_call")?)),
			Err(TransportError::Rpc {
				code,
				message,
				data,
				context,
			}) => match revert_payload(code, &message, data.as_ref()) {
				Some(payload) => Ok(CallOutcome::Revert(payload)),
				None => Err(anyhow::Error::new(TransportError::Rpc {
					code,
					message,
					data,
					context,
				})
				.context("eth_call request failed")),
			},
			Err(e) => Err(anyhow::Error::new(e).context("eth_call request failed")),
		}
	}
}

#[async_trait]
impl<T: BlockchainTransport> BroadcastSink for EvmClient<T> {
	#[instrument(skip(self, raw))]
	async fn submit(&self, raw: Bytes) -> Result<SubmitOutcome, anyhow::Error> {
		match self
			.transport
			.send_raw_request("eth_sendRawTransaction", Some(json!([raw])))
			.await
		{
			Ok(response) => Ok(SubmitOutcome::Accepted(parse_result(
				response,
				"eth_sendRawTransaction",
			)?)),
			Err(TransportError::Rpc { message, .. }) => Ok(SubmitOutcome::Rejected(message)),
			Err(e) => Err(anyhow::Error::new(e).context("eth_sendRawTransaction request failed")),
		}
	}
}
