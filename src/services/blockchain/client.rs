//! Collaborator interfaces the query core depends on.
//!
//! The core never owns chain data. It reads logs and state, executes read-only calls
//! and forwards raw transactions through these traits, which every chain backend
//! implements. Implementations must be safe for concurrent use.

use alloy::primitives::{Address, Bytes, B256};
use async_trait::async_trait;

use crate::models::{AccountState, Block, Head, LogKind, LogRecord};

/// A bounded read of the log source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogQuery {
	pub kind: LogKind,
	/// Restricts event logs to these emitters when set
	pub addresses: Option<Vec<Address>>,
	/// First block, inclusive
	pub from: u64,
	/// Last block, inclusive
	pub to: u64,
}

/// Result of a read-only contract call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome {
	/// Return data of a successful execution
	Success(Bytes),
	/// Revert payload (possibly empty)
	Revert(Bytes),
}

/// Result of submitting a signed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
	/// Transaction hash assigned by the sink
	Accepted(B256),
	/// Reason given by the sink, unmodified
	Rejected(String),
}

#[async_trait]
pub trait LogSource: Send + Sync {
	/// Returns the records of `query.kind` in `[from, to]`, ordered by
	/// (block number, log index).
	async fn read_logs(&self, query: LogQuery) -> Result<Vec<LogRecord>, anyhow::Error>;
}

#[async_trait]
pub trait StateSource: Send + Sync {
	/// Account state at `block`, or at the head when unset
	async fn get_account(
		&self,
		address: Address,
		block: Option<u64>,
	) -> Result<AccountState, anyhow::Error>;

	async fn get_head(&self) -> Result<Head, anyhow::Error>;

	/// Block by number, `None` when the chain has no such block
	async fn get_block(&self, number: u64) -> Result<Option<Block>, anyhow::Error>;

	/// Sync progress as a percentage (0-100)
	async fn get_sync_progress(&self) -> Result<u64, anyhow::Error>;
}

#[async_trait]
pub trait ExecutionClient: Send + Sync {
	/// Executes `data` against `address` at `block` (head when unset) without
	/// committing any state.
	async fn call(
		&self,
		address: Address,
		data: Bytes,
		block: Option<u64>,
	) -> Result<CallOutcome, anyhow::Error>;
}

#[async_trait]
pub trait BroadcastSink: Send + Sync {
	/// Submits a signed transaction exactly once.
	async fn submit(&self, raw: Bytes) -> Result<SubmitOutcome, anyhow::Error>;
}

/// A backend serving every collaborator role.
pub trait ChainBackend: LogSource + StateSource + ExecutionClient + BroadcastSink {}

impl<T> ChainBackend for T where T: LogSource + StateSource + ExecutionClient + BroadcastSink {}
