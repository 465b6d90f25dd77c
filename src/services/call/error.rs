//! Contract read error types.

use alloy::primitives::Bytes;
use std::collections::HashMap;
use thiserror::Error as ThisError;
use uuid::Uuid;

use crate::{
	services::abi::decode_revert_reason,
	utils::logging::error::{BoxedSource, ErrorContext, TraceableError},
};

/// Represents errors that can occur while resolving a contract read
#[derive(ThisError, Debug)]
pub enum CallError {
	/// The function signature could not be parsed
	#[error("Validation error: {0}")]
	ValidationError(ErrorContext),

	/// Return data did not match the declared outputs
	#[error("Decode error: {0}")]
	DecodeError(ErrorContext),

	/// Execution reverted. `data` is the exact revert payload
	#[error("Execution reverted: {context}")]
	ExecutionReverted {
		data: Bytes,
		reason: Option<String>,
		context: ErrorContext,
	},

	/// The execution collaborator failed
	#[error("Source unavailable: {0}")]
	SourceUnavailable(ErrorContext),

	/// Other errors that don't fit into the categories above
	#[error(transparent)]
	Other(#[from] anyhow::Error),
}

impl CallError {
	pub fn validation_error(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::ValidationError(ErrorContext::new(msg, source, metadata))
	}

	pub fn decode_error(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::DecodeError(ErrorContext::new(msg, source, metadata))
	}

	/// Builds a revert error, decoding `Error(string)` and `Panic(uint256)` reasons.
	pub fn execution_reverted(
		data: Bytes,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		let reason = decode_revert_reason(&data);
		let message = reason
			.clone()
			.unwrap_or_else(|| "execution reverted without a reason".to_string());
		Self::ExecutionReverted {
			context: ErrorContext::new(message, None, metadata),
			data,
			reason,
		}
	}

	pub fn source_unavailable(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::SourceUnavailable(ErrorContext::new_with_log(msg, source, metadata))
	}
}

impl TraceableError for CallError {
	fn trace_id(&self) -> String {
		match self {
			Self::ValidationError(ctx) | Self::DecodeError(ctx) | Self::SourceUnavailable(ctx) => {
				ctx.trace_id.clone()
			}
			Self::ExecutionReverted { context, .. } => context.trace_id.clone(),
			Self::Other(_) => Uuid::new_v4().to_string(),
		}
	}
}
