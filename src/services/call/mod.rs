//! Contract read resolution: calldata assembly, execution and output decoding.

mod error;
mod resolver;

pub use error::CallError;
pub use resolver::CallResolver;
