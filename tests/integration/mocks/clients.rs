//! Mock implementation of a chain backend.
//!
//! [`MockChainBackend`] implements every collaborator role so it can be handed to
//! the filter engines, the call resolver and the gateway. Expectations count calls,
//! which lets tests assert that sources are (or are not) touched.

use alloy::primitives::{Address, Bytes};
use async_trait::async_trait;
use mockall::mock;

use connex_gateway::{
	models::{AccountState, Block, Head, LogRecord},
	services::blockchain::{
		BroadcastSink, CallOutcome, ExecutionClient, LogQuery, LogSource, StateSource,
		SubmitOutcome,
	},
};

mock! {
	/// Mock implementation of a chain backend.
	pub ChainBackend {}

	#[async_trait]
	impl LogSource for ChainBackend {
		async fn read_logs(&self, query: LogQuery) -> Result<Vec<LogRecord>, anyhow::Error>;
	}

	#[async_trait]
	impl StateSource for ChainBackend {
		async fn get_account(
			&self,
			address: Address,
			block: Option<u64>,
		) -> Result<AccountState, anyhow::Error>;
		async fn get_head(&self) -> Result<Head, anyhow::Error>;
		async fn get_block(&self, number: u64) -> Result<Option<Block>, anyhow::Error>;
		async fn get_sync_progress(&self) -> Result<u64, anyhow::Error>;
	}

	#[async_trait]
	impl ExecutionClient for ChainBackend {
		async fn call(
			&self,
			address: Address,
			data: Bytes,
			block: Option<u64>,
		) -> Result<CallOutcome, anyhow::Error>;
	}

	#[async_trait]
	impl BroadcastSink for ChainBackend {
		async fn submit(&self, raw: Bytes) -> Result<SubmitOutcome, anyhow::Error>;
	}
}
