//! Test helper utilities for blocks
//!
//! - `BlockBuilder`: Builder for creating test Block instances whose ids and parent
//!   ids are derived from the block number, so consecutive blocks link up

use alloy::primitives::{Address, B256, U256};

use crate::models::Block;

fn block_id(number: u64) -> B256 {
	B256::from(U256::from(number))
}

/// Builder for creating test Block instances
pub struct BlockBuilder {
	number: u64,
	id: Option<B256>,
	timestamp: u64,
	gas_limit: u64,
	gas_used: u64,
	beneficiary: Address,
	transactions: Vec<B256>,
}

impl Default for BlockBuilder {
	fn default() -> Self {
		Self {
			number: 0,
			id: None,
			timestamp: 1_530_316_800,
			gas_limit: 10_000_000,
			gas_used: 0,
			beneficiary: Address::ZERO,
			transactions: vec![],
		}
	}
}

impl BlockBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn number(mut self, number: u64) -> Self {
		self.number = number;
		self
	}

	pub fn id(mut self, id: B256) -> Self {
		self.id = Some(id);
		self
	}

	pub fn timestamp(mut self, timestamp: u64) -> Self {
		self.timestamp = timestamp;
		self
	}

	pub fn gas_used(mut self, gas_used: u64) -> Self {
		self.gas_used = gas_used;
		self
	}

	pub fn beneficiary(mut self, beneficiary: Address) -> Self {
		self.beneficiary = beneficiary;
		self
	}

	pub fn transactions(mut self, transactions: Vec<B256>) -> Self {
		self.transactions = transactions;
		self
	}

	pub fn build(self) -> Block {
		Block {
			id: self.id.unwrap_or_else(|| block_id(self.number)),
			number: self.number,
			parent_id: self
				.number
				.checked_sub(1)
				.map(block_id)
				.unwrap_or_default(),
			timestamp: self.timestamp,
			gas_limit: self.gas_limit,
			beneficiary: self.beneficiary,
			gas_used: self.gas_used,
			total_score: self.number,
			tx_root: B256::ZERO,
			state_root: B256::ZERO,
			signer: self.beneficiary,
			transactions: self.transactions,
			is_trunk: true,
		}
	}
}
