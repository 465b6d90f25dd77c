//! Chain collaborators: the interfaces the query core consumes and the backends
//! implementing them.
//!
//! - Collaborator traits (log source, state source, execution, broadcast)
//! - JSON-RPC node client and in-memory chain
//! - HTTP transport with retry and endpoint rotation
//! - Error handling for backend operations

mod client;
mod clients;
mod error;
mod transports;

pub use client::{
	BroadcastSink, CallOutcome, ChainBackend, ExecutionClient, LogQuery, LogSource, StateSource,
	SubmitOutcome,
};
pub use clients::{
	AccountFixture, CallFixture, ChainFixture, EvmClient, MemoryChain, RejectionFixture,
};
pub use error::BlockChainError;
pub use transports::{
	BlockchainTransport, EndpointManager, HttpTransportClient, RotatingTransport,
	TransientErrorRetryStrategy, TransportError, ROTATE_ON_ERROR_CODES,
};
