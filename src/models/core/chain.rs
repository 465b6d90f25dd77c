//! Chain state shapes returned by the state source and by the gateway.

use alloy::primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

use crate::models::core::scalars;

/// Raw account state as reported by a state source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountState {
	#[serde(
		deserialize_with = "scalars::big_int",
		serialize_with = "scalars::big_int_hex"
	)]
	pub balance: U256,
	#[serde(default)]
	pub code: Bytes,
	/// Storage root, when the source can report one
	#[serde(default)]
	pub storage_root: Option<B256>,
	#[serde(default)]
	pub self_destructed: bool,
}

/// Account as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
	pub address: Address,
	#[serde(serialize_with = "scalars::big_int_hex")]
	pub balance: U256,
	pub energy: Option<B256>,
	pub has_code: bool,
	pub code: Bytes,
}

impl Account {
	/// Builds the client view of `state`. Self-destructed accounts report no code.
	pub fn from_state(address: Address, state: AccountState) -> Self {
		let has_code = !state.code.is_empty() && !state.self_destructed;
		Self {
			address,
			balance: state.balance,
			energy: state.storage_root,
			has_code,
			code: if state.self_destructed {
				Bytes::new()
			} else {
				state.code
			},
		}
	}
}

/// Chain head pointer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Head {
	pub id: B256,
	pub number: u64,
	pub timestamp: u64,
	#[serde(rename = "parentID")]
	pub parent_id: B256,
}

/// Sync progress (percent, 0..=100) and head.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Status {
	pub progress: u64,
	pub head: Head,
}

/// Block summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
	pub id: B256,
	pub number: u64,
	#[serde(rename = "parentID")]
	pub parent_id: B256,
	pub timestamp: u64,
	pub gas_limit: u64,
	pub beneficiary: Address,
	pub gas_used: u64,
	pub total_score: u64,
	pub tx_root: B256,
	pub state_root: B256,
	pub signer: Address,
	pub transactions: Vec<B256>,
	pub is_trunk: bool,
}

impl Block {
	pub fn head(&self) -> Head {
		Head {
			id: self.id,
			number: self.number,
			timestamp: self.timestamp,
			parent_id: self.parent_id,
		}
	}
}

/// A read-only contract call request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSpec {
	pub address: Address,
	/// Function signature, human-readable or a JSON ABI item
	pub signature: String,
	/// Pre-encoded ABI parameters, passed through unchanged
	pub params: Bytes,
	/// Target block; the head when unset
	pub block: Option<u64>,
}
