//! Request and response documents of the gateway.
//!
//! A request names exactly one top-level field, e.g.
//! `{"contractRead": {"address": "0x..", "abiSignature": "..", "params": "0x"}}` or
//! `"status"`. The response is keyed by the same field name.

use alloy::primitives::{Address, Bytes, B256};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{
	scalars, Account, Block, ContractFilterCriteria, DecodedLog, FilterCriteria, Status,
};

/// One top-level query or mutation field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub enum GatewayRequest {
	Filter(FilterCriteria),
	#[serde(rename_all = "camelCase")]
	ContractFilter {
		#[serde(deserialize_with = "scalars::address")]
		address: Address,
		abi_signatures: Vec<String>,
		#[serde(default)]
		filter: ContractFilterCriteria,
	},
	#[serde(rename_all = "camelCase")]
	ContractRead {
		#[serde(deserialize_with = "scalars::address")]
		address: Address,
		abi_signature: String,
		#[serde(default)]
		params: Bytes,
		#[serde(default)]
		block: Option<u64>,
	},
	Status,
	Genesis,
	ConnexVersion,
	Account {
		#[serde(deserialize_with = "scalars::address")]
		address: Address,
		#[serde(default)]
		block: Option<u64>,
	},
	SendRawTransaction {
		data: Bytes,
	},
}

impl GatewayRequest {
	/// Field name as it appears in request and response documents.
	pub fn field(&self) -> &'static str {
		match self {
			Self::Filter(_) => "filter",
			Self::ContractFilter { .. } => "contractFilter",
			Self::ContractRead { .. } => "contractRead",
			Self::Status => "status",
			Self::Genesis => "genesis",
			Self::ConnexVersion => "connexVersion",
			Self::Account { .. } => "account",
			Self::SendRawTransaction { .. } => "sendRawTransaction",
		}
	}
}

/// Result of one resolved field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum GatewayResponse {
	Filter(Vec<DecodedLog>),
	ContractFilter(Vec<DecodedLog>),
	ContractRead(Value),
	Status(Status),
	Genesis(Block),
	ConnexVersion(String),
	Account(Account),
	SendRawTransaction(B256),
}
