//! Per-field resolvers.
//!
//! [`Gateway`] adapts each top-level request field to the filter engines, the call
//! resolver or the state and broadcast collaborators of one chain backend.

use alloy::primitives::{Address, Bytes, B256};
use futures::TryStreamExt;
use serde_json::Value;
use std::{collections::HashMap, sync::Arc};
use tracing::{info, instrument};

use crate::{
	models::{
		Account, Block, CallSpec, ContractFilterCriteria, DecodedLog, FilterCriteria, Status,
	},
	services::{
		abi::helpers::h160_to_string,
		blockchain::{BroadcastSink, ChainBackend, StateSource, SubmitOutcome},
		call::CallResolver,
		filter::{ContractFilter, DecodedLogStream, FilterEvaluator, LogStream},
		gateway::{GatewayError, GatewayRequest, GatewayResponse},
	},
};

/// Version reported by `connexVersion`
pub const CONNEX_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Resolves gateway requests against one chain backend.
pub struct Gateway<C: ?Sized> {
	backend: Arc<C>,
	filters: FilterEvaluator<C>,
	contracts: ContractFilter<C>,
	calls: CallResolver<C>,
}

impl<C> Gateway<C>
where
	C: ChainBackend + ?Sized + 'static,
{
	/// Creates a gateway reading logs in chunks of at most `log_chunk_size` blocks.
	pub fn new(backend: Arc<C>, log_chunk_size: u64) -> Self {
		let filters = FilterEvaluator::new(backend.clone(), log_chunk_size);
		Self {
			contracts: ContractFilter::new(filters.clone()),
			calls: CallResolver::new(backend.clone()),
			filters,
			backend,
		}
	}

	/// Resolves one request, collecting streamed results.
	#[instrument(skip(self, request), fields(field = request.field()))]
	pub async fn resolve(&self, request: GatewayRequest) -> Result<GatewayResponse, GatewayError> {
		let response = match request {
			GatewayRequest::Filter(filter) => GatewayResponse::Filter(
				self.filter(filter)
					.await?
					.map_ok(DecodedLog::undecoded)
					.try_collect()
					.await?,
			),
			GatewayRequest::ContractFilter {
				address,
				abi_signatures,
				filter,
			} => GatewayResponse::ContractFilter(
				self.contract_filter(address, &abi_signatures, filter)
					.await?
					.try_collect()
					.await?,
			),
			GatewayRequest::ContractRead {
				address,
				abi_signature,
				params,
				block,
			} => GatewayResponse::ContractRead(
				self.contract_read(&CallSpec {
					address,
					signature: abi_signature,
					params,
					block,
				})
				.await?,
			),
			GatewayRequest::Status => GatewayResponse::Status(self.status().await?),
			GatewayRequest::Genesis => GatewayResponse::Genesis(self.genesis().await?),
			GatewayRequest::ConnexVersion => {
				GatewayResponse::ConnexVersion(self.connex_version().to_string())
			}
			GatewayRequest::Account { address, block } => {
				GatewayResponse::Account(self.account(address, block).await?)
			}
			GatewayRequest::SendRawTransaction { data } => {
				GatewayResponse::SendRawTransaction(self.send_raw_transaction(data).await?)
			}
		};
		Ok(response)
	}

	/// Matching log records in the requested order.
	pub async fn filter(&self, filter: FilterCriteria) -> Result<LogStream, GatewayError> {
		Ok(self.filters.evaluate(filter).await?)
	}

	/// Decoded records emitted by `address`.
	pub async fn contract_filter(
		&self,
		address: Address,
		abi_signatures: &[String],
		filter: ContractFilterCriteria,
	) -> Result<DecodedLogStream, GatewayError> {
		Ok(self
			.contracts
			.evaluate(address, abi_signatures, filter)
			.await?)
	}

	/// Decoded result of a read-only call.
	pub async fn contract_read(&self, call: &CallSpec) -> Result<Value, GatewayError> {
		Ok(self.calls.resolve(call).await?)
	}

	pub async fn status(&self) -> Result<Status, GatewayError> {
		let head = self.backend.get_head().await.map_err(|e| {
			GatewayError::source_unavailable("Failed to read chain head", Some(e.into()), None)
		})?;
		let progress = self.backend.get_sync_progress().await.map_err(|e| {
			GatewayError::source_unavailable(
				"Failed to read sync progress",
				Some(e.into()),
				None,
			)
		})?;
		Ok(Status {
			progress: progress.min(100),
			head,
		})
	}

	/// Block number 0.
	pub async fn genesis(&self) -> Result<Block, GatewayError> {
		self.backend
			.get_block(0)
			.await
			.map_err(|e| {
				GatewayError::source_unavailable(
					"Failed to read genesis block",
					Some(e.into()),
					None,
				)
			})?
			.ok_or_else(|| {
				GatewayError::source_unavailable("Genesis block is not available", None, None)
			})
	}

	pub fn connex_version(&self) -> &'static str {
		CONNEX_VERSION
	}

	/// Account state at `block`, or at the head.
	pub async fn account(
		&self,
		address: Address,
		block: Option<u64>,
	) -> Result<Account, GatewayError> {
		let state = self.backend.get_account(address, block).await.map_err(|e| {
			GatewayError::source_unavailable(
				"Failed to read account",
				Some(e.into()),
				Some(HashMap::from([("address".to_string(), h160_to_string(address))])),
			)
		})?;
		Ok(Account::from_state(address, state))
	}

	/// Forwards `data` to the broadcast sink once and returns the transaction hash.
	#[instrument(skip(self, data), fields(bytes = data.len()))]
	pub async fn send_raw_transaction(&self, data: Bytes) -> Result<B256, GatewayError> {
		let outcome = self.backend.submit(data).await.map_err(|e| {
			GatewayError::source_unavailable("Failed to submit transaction", Some(e.into()), None)
		})?;

		match outcome {
			SubmitOutcome::Accepted(hash) => {
				info!(%hash, "Transaction accepted");
				Ok(hash)
			}
			SubmitOutcome::Rejected(reason) => {
				Err(GatewayError::broadcast_rejected(reason, None))
			}
		}
	}
}
