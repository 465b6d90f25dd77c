//! Core services implementing the query gateway.
//!
//! - `abi`: Signature parsing and ABI encoding/decoding
//! - `blockchain`: Collaborator traits and chain backends
//! - `call`: Read-only contract call resolution
//! - `filter`: Criteria matching, filter evaluation and contract filters
//! - `gateway`: Per-field request resolvers

pub mod abi;
pub mod blockchain;
pub mod call;
pub mod filter;
pub mod gateway;
