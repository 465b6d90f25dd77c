//! Log records produced by a log source and their decoded output form.

use alloy::primitives::{Address, Bytes, B256, U256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::core::scalars;

/// The two disjoint kinds of records a query can select.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
	/// Contract event log (address + topics + data)
	#[default]
	Event,
	/// Value transfer (sender, recipient, amount)
	Transfer,
}

impl LogKind {
	/// Parses a kind case-insensitively. Returns `None` for unknown values.
	pub fn parse(value: &str) -> Option<Self> {
		match value.trim().to_ascii_lowercase().as_str() {
			"event" => Some(Self::Event),
			"transfer" => Some(Self::Transfer),
			_ => None,
		}
	}
}

/// Chain position of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogMeta {
	#[serde(rename = "blockID")]
	pub block_id: B256,
	#[serde(rename = "blockNumber")]
	pub block_number: u64,
	#[serde(rename = "blockTimestamp")]
	pub block_timestamp: u64,
	#[serde(rename = "txID")]
	pub tx_id: B256,
	#[serde(rename = "txOrigin")]
	pub tx_origin: Address,
	/// Position of the record within its block
	#[serde(rename = "logIndex", default)]
	pub log_index: u64,
}

/// Decoded participants of a value transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferFields {
	pub sender: Address,
	pub recipient: Address,
	#[serde(
		deserialize_with = "scalars::big_int",
		serialize_with = "scalars::big_int_hex"
	)]
	pub amount: U256,
}

/// An immutable record read from a log source.
///
/// Records carrying [`TransferFields`] are of kind [`LogKind::Transfer`]; they have the
/// zero address and no topics or data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
	#[serde(default)]
	pub address: Address,
	#[serde(default)]
	pub topics: Vec<B256>,
	#[serde(default)]
	pub data: Bytes,
	pub meta: LogMeta,
	#[serde(flatten, default, skip_serializing_if = "Option::is_none")]
	pub transfer: Option<TransferFields>,
}

impl LogRecord {
	pub fn kind(&self) -> LogKind {
		if self.transfer.is_some() {
			LogKind::Transfer
		} else {
			LogKind::Event
		}
	}

	/// Topic at `position`, if the record has that many topics.
	pub fn topic(&self, position: usize) -> Option<&B256> {
		self.topics.get(position)
	}

	/// Ordering key inside a result set.
	pub fn position(&self) -> (u64, u64) {
		(self.meta.block_number, self.meta.log_index)
	}
}

/// A record as returned to clients, with decode results and time fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedLog {
	#[serde(flatten)]
	pub log: LogRecord,
	pub decoded: Option<Value>,
	pub log_name: Option<String>,
	pub timestamp: u64,
	/// RFC 3339 UTC date of the block timestamp
	pub tx_date: Option<String>,
}

impl DecodedLog {
	pub fn new(log: LogRecord, decoded: Option<Value>, log_name: Option<String>) -> Self {
		let timestamp = log.meta.block_timestamp;
		let tx_date = i64::try_from(timestamp)
			.ok()
			.and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
			.map(|date| date.to_rfc3339());
		Self {
			log,
			decoded,
			log_name,
			timestamp,
			tx_date,
		}
	}

	/// Wraps a record that was not decoded.
	pub fn undecoded(log: LogRecord) -> Self {
		Self::new(log, None, None)
	}
}
