//! Declarative filter criteria as received from clients.
//!
//! Every field is optional so that "unset" stays distinct from zero or empty.
//! Values such as `kind`, `order`, `limit` and `offset` are kept in their raw wire
//! form here and validated by the filter evaluator before any source is touched.

use alloy::primitives::{Address, B256};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::core::scalars;

/// One matching rule. All populated fields must match (AND).
///
/// Event fields and transfer fields are two disjoint shapes; populating both makes
/// the criterion invalid for any query kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Criteria {
	#[serde(default, deserialize_with = "scalars::opt_address")]
	pub address: Option<Address>,
	#[serde(default, deserialize_with = "scalars::opt_topic0")]
	pub topic0: Option<B256>,
	#[serde(default, deserialize_with = "scalars::opt_b256")]
	pub topic1: Option<B256>,
	#[serde(default, deserialize_with = "scalars::opt_b256")]
	pub topic2: Option<B256>,
	#[serde(default, deserialize_with = "scalars::opt_b256")]
	pub topic3: Option<B256>,
	#[serde(default, deserialize_with = "scalars::opt_b256")]
	pub topic4: Option<B256>,
	#[serde(default, deserialize_with = "scalars::opt_address")]
	pub tx_origin: Option<Address>,
	#[serde(default, deserialize_with = "scalars::opt_address")]
	pub sender: Option<Address>,
	#[serde(default, deserialize_with = "scalars::opt_address")]
	pub recipient: Option<Address>,
}

impl Criteria {
	/// Criterion constraining only the emitting address.
	pub fn for_address(address: Address) -> Self {
		Self {
			address: Some(address),
			..Default::default()
		}
	}

	/// Topic constraint at `position` (0..=4).
	pub fn topic(&self, position: usize) -> Option<&B256> {
		match position {
			0 => self.topic0.as_ref(),
			1 => self.topic1.as_ref(),
			2 => self.topic2.as_ref(),
			3 => self.topic3.as_ref(),
			4 => self.topic4.as_ref(),
			_ => None,
		}
	}

	/// Mutable topic slot at `position` (0..=4).
	pub fn topic_mut(&mut self, position: usize) -> Option<&mut Option<B256>> {
		match position {
			0 => Some(&mut self.topic0),
			1 => Some(&mut self.topic1),
			2 => Some(&mut self.topic2),
			3 => Some(&mut self.topic3),
			4 => Some(&mut self.topic4),
			_ => None,
		}
	}

	pub fn has_event_fields(&self) -> bool {
		self.address.is_some() || (0..=4).any(|position| self.topic(position).is_some())
	}

	pub fn has_transfer_fields(&self) -> bool {
		self.tx_origin.is_some() || self.sender.is_some() || self.recipient.is_some()
	}
}

/// Block range. Either bound may be unset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Range {
	pub from: Option<u64>,
	pub to: Option<u64>,
}

/// Result ordering by (block number, log index).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
	#[default]
	Asc,
	Desc,
}

impl Order {
	/// Parses an order case-insensitively. Returns `None` for unknown values.
	pub fn parse(value: &str) -> Option<Self> {
		match value.trim().to_ascii_lowercase().as_str() {
			"asc" => Some(Self::Asc),
			"desc" => Some(Self::Desc),
			_ => None,
		}
	}
}

/// A log query: kind, order, range, pagination and an OR list of criteria.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterCriteria {
	pub kind: Option<String>,
	pub order: Option<String>,
	pub range: Option<Range>,
	pub limit: Option<i64>,
	pub offset: Option<i64>,
	pub criterias: Option<Vec<Criteria>>,
}

/// A log query scoped to one contract. Its kind is always `event`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContractFilterCriteria {
	/// Constraints in decoded-parameter terms: an object (AND) or an array of objects (OR)
	pub indexed: Option<Value>,
	pub order: Option<String>,
	pub range: Option<Range>,
	pub limit: Option<i64>,
	pub offset: Option<i64>,
	pub criterias: Option<Vec<Criteria>>,
}

impl ContractFilterCriteria {
	/// Splits into the event-kind filter and the `indexed` constraint.
	pub fn into_parts(self) -> (FilterCriteria, Option<Value>) {
		let filter = FilterCriteria {
			kind: Some("event".to_string()),
			order: self.order,
			range: self.range,
			limit: self.limit,
			offset: self.offset,
			criterias: self.criterias,
		};
		(filter, self.indexed)
	}
}
