//! Gateway error types.
//!
//! Every service error folds into one [`GatewayError`] category, keeping its context
//! (and with it the trace id).

use alloy::primitives::Bytes;
use std::collections::HashMap;
use thiserror::Error as ThisError;
use uuid::Uuid;

use crate::{
	services::{call::CallError, filter::FilterError},
	utils::logging::error::{BoxedSource, ErrorContext, TraceableError},
};

/// Represents the error categories a gateway request can fail with
#[derive(ThisError, Debug)]
pub enum GatewayError {
	/// The request is malformed and nothing was evaluated
	#[error("Validation error: {0}")]
	ValidationError(ErrorContext),

	/// Data did not match the declared ABI shape
	#[error("Decode error: {0}")]
	DecodeError(ErrorContext),

	/// Contract execution reverted with `data`
	#[error("Execution reverted: {context}")]
	ExecutionReverted {
		data: Bytes,
		reason: Option<String>,
		context: ErrorContext,
	},

	/// A collaborator failed
	#[error("Source unavailable: {0}")]
	SourceUnavailable(ErrorContext),

	/// The broadcast sink rejected the transaction; the message is its reason
	#[error("Broadcast rejected: {0}")]
	BroadcastRejected(ErrorContext),

	/// Other errors that don't fit into the categories above
	#[error(transparent)]
	Other(#[from] anyhow::Error),
}

impl GatewayError {
	pub fn validation_error(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::ValidationError(ErrorContext::new(msg, source, metadata))
	}

	pub fn source_unavailable(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::SourceUnavailable(ErrorContext::new_with_log(msg, source, metadata))
	}

	/// Rejection with the sink's `reason` as the message, unmodified.
	pub fn broadcast_rejected(
		reason: impl Into<String>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::BroadcastRejected(ErrorContext::new(reason, None, metadata))
	}

	/// Short category name used in error responses.
	pub fn category(&self) -> &'static str {
		match self {
			Self::ValidationError(_) => "ValidationError",
			Self::DecodeError(_) => "DecodeError",
			Self::ExecutionReverted { .. } => "ExecutionReverted",
			Self::SourceUnavailable(_) => "SourceUnavailable",
			Self::BroadcastRejected(_) => "BroadcastRejected",
			Self::Other(_) => "InternalError",
		}
	}
}

impl From<FilterError> for GatewayError {
	fn from(error: FilterError) -> Self {
		match error {
			FilterError::ValidationError(ctx) => Self::ValidationError(ctx),
			FilterError::SourceUnavailable(ctx) => Self::SourceUnavailable(ctx),
			FilterError::InternalError(_) | FilterError::Other(_) => {
				Self::Other(anyhow::Error::new(error))
			}
		}
	}
}

impl From<CallError> for GatewayError {
	fn from(error: CallError) -> Self {
		match error {
			CallError::ValidationError(ctx) => Self::ValidationError(ctx),
			CallError::DecodeError(ctx) => Self::DecodeError(ctx),
			CallError::ExecutionReverted {
				data,
				reason,
				context,
			} => Self::ExecutionReverted {
				data,
				reason,
				context,
			},
			CallError::SourceUnavailable(ctx) => Self::SourceUnavailable(ctx),
			CallError::Other(e) => Self::Other(e),
		}
	}
}

impl TraceableError for GatewayError {
	fn trace_id(&self) -> String {
		match self {
			Self::ValidationError(ctx)
			| Self::DecodeError(ctx)
			| Self::SourceUnavailable(ctx)
			| Self::BroadcastRejected(ctx) => ctx.trace_id.clone(),
			Self::ExecutionReverted { context, .. } => context.trace_id.clone(),
			Self::Other(_) => Uuid::new_v4().to_string(),
		}
	}
}
