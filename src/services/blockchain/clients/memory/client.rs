//! In-memory append-only chain.
//!
//! Serves fixtures, local development and tests. Blocks and logs are only ever
//! appended. Account state is a single latest snapshot, so `block` arguments of
//! state and call reads are ignored.

use alloy::primitives::{keccak256, Address, Bytes};
use async_trait::async_trait;
use serde::Deserialize;
use std::{collections::HashMap, path::Path};
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::{
	models::{AccountState, Block, Head, LogKind, LogRecord},
	services::blockchain::{
		client::{
			BroadcastSink, CallOutcome, ExecutionClient, LogQuery, LogSource, StateSource,
			SubmitOutcome,
		},
		BlockChainError,
	},
};

fn full_sync() -> u64 {
	100
}

/// Account entry of a fixture file
#[derive(Debug, Clone, Deserialize)]
pub struct AccountFixture {
	pub address: Address,
	#[serde(flatten)]
	pub state: AccountState,
}

/// Canned outcome of a contract call, keyed by target and exact calldata
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CallFixture {
	pub address: Address,
	pub data: Bytes,
	#[serde(default)]
	pub result: Option<Bytes>,
	#[serde(default)]
	pub revert: Option<Bytes>,
}

/// Raw transaction the sink refuses, with its reason
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RejectionFixture {
	pub data: Bytes,
	pub reason: String,
}

/// Contents of a chain fixture file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ChainFixture {
	#[serde(default)]
	pub blocks: Vec<Block>,
	#[serde(default)]
	pub logs: Vec<LogRecord>,
	#[serde(default)]
	pub accounts: Vec<AccountFixture>,
	#[serde(default)]
	pub calls: Vec<CallFixture>,
	#[serde(default)]
	pub rejections: Vec<RejectionFixture>,
	#[serde(default = "full_sync")]
	pub sync_progress: u64,
}

impl Default for ChainFixture {
	fn default() -> Self {
		Self {
			blocks: Vec::new(),
			logs: Vec::new(),
			accounts: Vec::new(),
			calls: Vec::new(),
			rejections: Vec::new(),
			sync_progress: full_sync(),
		}
	}
}

#[derive(Debug, Default)]
struct ChainState {
	blocks: Vec<Block>,
	logs: Vec<LogRecord>,
	accounts: HashMap<Address, AccountState>,
	calls: HashMap<(Address, Bytes), CallOutcome>,
	rejections: HashMap<Bytes, String>,
	submitted: Vec<Bytes>,
	sync_progress: u64,
}

impl ChainState {
	/// Records in blocks `from..=to`, located by binary search over the sorted log.
	fn logs_in_range(&self, from: u64, to: u64) -> &[LogRecord] {
		let start = self
			.logs
			.partition_point(|record| record.meta.block_number < from);
		let end = self
			.logs
			.partition_point(|record| record.meta.block_number <= to);
		&self.logs[start..end.max(start)]
	}
}

/// Append-only chain held in memory
#[derive(Debug)]
pub struct MemoryChain {
	state: RwLock<ChainState>,
}

impl Default for MemoryChain {
	fn default() -> Self {
		Self::from_fixture(ChainFixture::default())
	}
}

impl MemoryChain {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn from_fixture(fixture: ChainFixture) -> Self {
		let mut state = ChainState {
			sync_progress: fixture.sync_progress.min(100),
			..Default::default()
		};

		state.blocks = fixture.blocks;
		state.blocks.sort_by_key(|block| block.number);
		state.logs = fixture.logs;
		state.logs.sort_by_key(LogRecord::position);
		state.accounts = fixture
			.accounts
			.into_iter()
			.map(|account| (account.address, account.state))
			.collect();
		state.calls = fixture
			.calls
			.into_iter()
			.map(|call| {
				let outcome = match (call.revert, call.result) {
					(Some(payload), _) => CallOutcome::Revert(payload),
					(None, result) => CallOutcome::Success(result.unwrap_or_default()),
				};
				((call.address, call.data), outcome)
			})
			.collect();
		state.rejections = fixture
			.rejections
			.into_iter()
			.map(|rejection| (rejection.data, rejection.reason))
			.collect();

		Self {
			state: RwLock::new(state),
		}
	}

	/// Loads a JSON fixture file.
	pub async fn from_fixture_file(path: &Path) -> Result<Self, BlockChainError> {
		let metadata = Some(HashMap::from([(
			"path".to_string(),
			path.display().to_string(),
		)]));

		let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
			BlockChainError::request_error(
				"Failed to read chain fixture",
				Some(Box::new(e)),
				metadata.clone(),
			)
		})?;
		let fixture: ChainFixture = serde_json::from_str(&contents).map_err(|e| {
			BlockChainError::request_error(
				"Failed to parse chain fixture",
				Some(Box::new(e)),
				metadata,
			)
		})?;

		debug!(
			blocks = fixture.blocks.len(),
			logs = fixture.logs.len(),
			"Loaded chain fixture"
		);
		Ok(Self::from_fixture(fixture))
	}

	/// Appends a block. Its number must follow the current head.
	pub async fn push_block(&self, block: Block) -> Result<(), BlockChainError> {
		let mut state = self.state.write().await;
		if let Some(head) = state.blocks.last() {
			if block.number <= head.number {
				return Err(BlockChainError::internal_error(
					format!(
						"Block {} does not extend head {}",
						block.number, head.number
					),
					None,
					None,
				));
			}
		}
		state.blocks.push(block);
		Ok(())
	}

	/// Appends a record, keeping (block number, log index) order.
	pub async fn push_log(&self, record: LogRecord) {
		let mut state = self.state.write().await;
		let position = state
			.logs
			.partition_point(|existing| existing.position() <= record.position());
		state.logs.insert(position, record);
	}

	pub async fn set_account(&self, address: Address, account: AccountState) {
		self.state.write().await.accounts.insert(address, account);
	}

	pub async fn set_call_outcome(&self, address: Address, data: Bytes, outcome: CallOutcome) {
		self.state
			.write()
			.await
			.calls
			.insert((address, data), outcome);
	}

	pub async fn reject_transaction(&self, raw: Bytes, reason: impl Into<String>) {
		self.state
			.write()
			.await
			.rejections
			.insert(raw, reason.into());
	}

	/// Raw transactions accepted so far, in submission order
	pub async fn submitted(&self) -> Vec<Bytes> {
		self.state.read().await.submitted.clone()
	}
}

#[async_trait]
impl LogSource for MemoryChain {
	#[instrument(skip(self))]
	async fn read_logs(&self, query: LogQuery) -> Result<Vec<LogRecord>, anyhow::Error> {
		let state = self.state.read().await;
		Ok(state
			.logs_in_range(query.from, query.to)
			.iter()
			.filter(|record| record.kind() == query.kind)
			.filter(|record| match (&query.addresses, query.kind) {
				(Some(addresses), LogKind::Event) => addresses.contains(&record.address),
				_ => true,
			})
			.cloned()
			.collect())
	}
}

#[async_trait]
impl StateSource for MemoryChain {
	async fn get_account(
		&self,
		address: Address,
		_block: Option<u64>,
	) -> Result<AccountState, anyhow::Error> {
		Ok(self
			.state
			.read()
			.await
			.accounts
			.get(&address)
			.cloned()
			.unwrap_or_default())
	}

	async fn get_head(&self) -> Result<Head, anyhow::Error> {
		let state = self.state.read().await;
		let head = state
			.blocks
			.last()
			.ok_or_else(|| BlockChainError::block_not_found("Chain has no blocks", None, None))?;
		Ok(head.head())
	}

	async fn get_block(&self, number: u64) -> Result<Option<Block>, anyhow::Error> {
		let state = self.state.read().await;
		Ok(state
			.blocks
			.binary_search_by_key(&number, |block| block.number)
			.ok()
			.map(|index| state.blocks[index].clone()))
	}

	async fn get_sync_progress(&self) -> Result<u64, anyhow::Error> {
		Ok(self.state.read().await.sync_progress)
	}
}

#[async_trait]
impl ExecutionClient for MemoryChain {
	async fn call(
		&self,
		address: Address,
		data: Bytes,
		_block: Option<u64>,
	) -> Result<CallOutcome, anyhow::Error> {
		Ok(self
			.state
			.read()
			.await
			.calls
			.get(&(address, data))
			.cloned()
			.unwrap_or(CallOutcome::Success(Bytes::new())))
	}
}

#[async_trait]
impl BroadcastSink for MemoryChain {
	#[instrument(skip(self, raw))]
	async fn submit(&self, raw: Bytes) -> Result<SubmitOutcome, anyhow::Error> {
		let mut state = self.state.write().await;
		if let Some(reason) = state.rejections.get(&raw) {
			return Ok(SubmitOutcome::Rejected(reason.clone()));
		}
		let hash = keccak256(&raw);
		state.submitted.push(raw);
		Ok(SubmitOutcome::Accepted(hash))
	}
}
