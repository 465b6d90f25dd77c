//! Query gateway over Ethereum-style chain data.
//!
//! Clients describe what they want (addresses, event signatures, topic combinations,
//! block ranges, pagination) and the gateway resolves it into chain-data lookups:
//!
//! - Log and transfer filtering with ordering and pagination
//! - Contract-scoped filters with ABI decoding of event logs
//! - Read-only contract calls with decoded results and revert reasons
//! - Account, status and genesis lookups and raw transaction broadcast
//!
//! # Module Structure
//!
//! - `bootstrap`: Builds the gateway from its configuration
//! - `models`: Query contract, chain data shapes and configuration
//! - `services`: ABI codec, filter engines, call resolver, chain backends and gateway
//! - `utils`: Logging, HTTP and parsing helpers

pub mod bootstrap;
pub mod models;
pub mod services;
pub mod utils;
