//! Test helper utilities for log records
//!
//! - `LogRecordBuilder`: Builder for creating test LogRecord instances

use alloy::primitives::{Address, Bytes, B256, U256};

use crate::models::{LogMeta, LogRecord, TransferFields};

/// Builder for creating test LogRecord instances
pub struct LogRecordBuilder {
	address: Address,
	topics: Vec<B256>,
	data: Bytes,
	block_number: u64,
	block_id: Option<B256>,
	log_index: u64,
	timestamp: u64,
	tx_id: B256,
	tx_origin: Address,
	transfer: Option<TransferFields>,
}

impl Default for LogRecordBuilder {
	fn default() -> Self {
		Self {
			address: Address::ZERO,
			topics: vec![],
			data: Bytes::new(),
			block_number: 0,
			block_id: None,
			log_index: 0,
			timestamp: 0,
			tx_id: B256::repeat_byte(0x11),
			tx_origin: Address::ZERO,
			transfer: None,
		}
	}
}

impl LogRecordBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn address(mut self, address: Address) -> Self {
		self.address = address;
		self
	}

	pub fn topics(mut self, topics: Vec<B256>) -> Self {
		self.topics = topics;
		self
	}

	pub fn data(mut self, data: impl Into<Bytes>) -> Self {
		self.data = data.into();
		self
	}

	/// Block number and index of the record within the block
	pub fn block(mut self, number: u64, log_index: u64) -> Self {
		self.block_number = number;
		self.log_index = log_index;
		self
	}

	pub fn block_id(mut self, block_id: B256) -> Self {
		self.block_id = Some(block_id);
		self
	}

	pub fn timestamp(mut self, timestamp: u64) -> Self {
		self.timestamp = timestamp;
		self
	}

	pub fn tx_id(mut self, tx_id: B256) -> Self {
		self.tx_id = tx_id;
		self
	}

	pub fn tx_origin(mut self, tx_origin: Address) -> Self {
		self.tx_origin = tx_origin;
		self
	}

	/// Turns the record into a value transfer
	pub fn transfer(mut self, sender: Address, recipient: Address, amount: U256) -> Self {
		self.transfer = Some(TransferFields {
			sender,
			recipient,
			amount,
		});
		self
	}

	pub fn build(self) -> LogRecord {
		let block_id = self
			.block_id
			.unwrap_or_else(|| B256::from(U256::from(self.block_number)));

		LogRecord {
			address: self.address,
			topics: self.topics,
			data: self.data,
			meta: LogMeta {
				block_id,
				block_number: self.block_number,
				block_timestamp: self.timestamp,
				tx_id: self.tx_id,
				tx_origin: self.tx_origin,
				log_index: self.log_index,
			},
			transfer: self.transfer,
		}
	}
}
