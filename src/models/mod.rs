//! Domain models and data structures of the query gateway.
//!
//! - `config`: Configuration loading and validation
//! - `core`: Query contract and chain data shapes (criteria, log records, accounts, blocks)

mod config;
mod core;

pub use config::{
	BackendConfig, ConfigError, ConfigLoader, GatewayConfig, RpcUrl, DEFAULT_CONFIG_PATH,
};

pub use self::core::{
	scalars, Account, AccountState, Block, CallSpec, ContractFilterCriteria, Criteria,
	DecodedLog, FilterCriteria, Head, LogKind, LogMeta, LogRecord, Order, Range, Status,
	TransferFields,
};
