//! ABI codec used by the contract filter and call resolvers.
//!
//! - `codec`: signature parsing, calldata and log coding, revert reasons
//! - `helpers`: JSON rendering of decoded values

mod codec;
mod error;
pub mod helpers;

pub use codec::{
	decode_event, decode_log, decode_output, decode_revert_reason, encode_call, encode_event,
	encode_topic, event_layout, event_to_json, param_type, parse_event, parse_function,
	ERROR_SELECTOR, PANIC_SELECTOR,
};
pub use error::AbiError;
