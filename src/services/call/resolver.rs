//! Read-only contract calls.

use serde_json::Value;
use std::{collections::HashMap, sync::Arc};
use tracing::{debug, instrument};

use crate::{
	models::CallSpec,
	services::{
		abi::{decode_output, encode_call, helpers::h160_to_string, parse_function},
		blockchain::{CallOutcome, ExecutionClient},
		call::CallError,
	},
};

/// Resolves contract reads against an execution collaborator.
pub struct CallResolver<C: ?Sized> {
	client: Arc<C>,
}

impl<C: ?Sized> Clone for CallResolver<C> {
	fn clone(&self) -> Self {
		Self {
			client: self.client.clone(),
		}
	}
}

impl<C> CallResolver<C>
where
	C: ExecutionClient + ?Sized,
{
	pub fn new(client: Arc<C>) -> Self {
		Self { client }
	}

	/// Executes `call` and decodes its return data.
	///
	/// The calldata is the function selector followed by `call.params` as given.
	#[instrument(skip(self), fields(address = %call.address, signature = %call.signature))]
	pub async fn resolve(&self, call: &CallSpec) -> Result<Value, CallError> {
		let metadata = HashMap::from([
			("address".to_string(), h160_to_string(call.address)),
			("signature".to_string(), call.signature.clone()),
		]);

		let function = parse_function(&call.signature).map_err(|e| {
			CallError::validation_error(
				"Invalid function signature",
				Some(Box::new(e)),
				Some(metadata.clone()),
			)
		})?;

		let data = encode_call(&function, &call.params);
		let outcome = self
			.client
			.call(call.address, data, call.block)
			.await
			.map_err(|e| {
				CallError::source_unavailable(
					"Contract call failed",
					Some(e.into()),
					Some(metadata.clone()),
				)
			})?;

		match outcome {
			CallOutcome::Success(output) => {
				debug!(bytes = output.len(), "Decoding call output");
				decode_output(&function, &output).map_err(|e| {
					CallError::decode_error(
						"Failed to decode call output",
						Some(Box::new(e)),
						Some(metadata),
					)
				})
			}
			CallOutcome::Revert(payload) => {
				Err(CallError::execution_reverted(payload, Some(metadata)))
			}
		}
	}
}
