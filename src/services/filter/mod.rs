//! Log filtering.
//!
//! - `matcher`: pure criterion matching of a single record
//! - `evaluator`: validation, chunked reading, ordering and pagination
//! - `contract`: contract-scoped filters with `indexed` translation and decoding

mod contract;
mod error;
mod evaluator;
mod matcher;

pub use contract::{
	intersect, scope_to_address, translate_indexed, ContractFilter, DecodedLogStream,
};
pub use error::FilterError;
pub use evaluator::{BlockChunks, FilterEvaluator, FilterPlan, LogStream};
pub use matcher::{matches, matches_any};
