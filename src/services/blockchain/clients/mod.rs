//! Chain backend implementations.
//!
//! - EVM client for Ethereum JSON-RPC nodes
//! - Memory chain for fixtures and tests

mod evm {
	pub mod client;
}
mod memory {
	pub mod client;
}

pub use evm::client::EvmClient;
pub use memory::client::{AccountFixture, CallFixture, ChainFixture, MemoryChain, RejectionFixture};
