//! ABI codec error types.
//!
//! Codec errors are built without logging. Callers decide whether a decode failure
//! is fatal (a contract read) or a per-record outcome (a contract filter).

use crate::utils::logging::error::{BoxedSource, ErrorContext, TraceableError};
use std::collections::HashMap;
use thiserror::Error as ThisError;
use uuid::Uuid;

/// Represents errors that can occur while parsing signatures or coding ABI values
#[derive(ThisError, Debug)]
pub enum AbiError {
	/// The signature text or JSON ABI item could not be parsed
	#[error("Signature error: {0}")]
	SignatureError(ErrorContext),

	/// Bytes did not match the shape declared by the signature
	#[error("Decode error: {0}")]
	DecodeError(ErrorContext),

	/// A value could not be coerced into the declared ABI type
	#[error("Encode error: {0}")]
	EncodeError(ErrorContext),

	/// Other errors that don't fit into the categories above
	#[error(transparent)]
	Other(#[from] anyhow::Error),
}

impl AbiError {
	pub fn signature_error(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::SignatureError(ErrorContext::new(msg, source, metadata))
	}

	pub fn decode_error(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::DecodeError(ErrorContext::new(msg, source, metadata))
	}

	pub fn encode_error(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::EncodeError(ErrorContext::new(msg, source, metadata))
	}
}

impl TraceableError for AbiError {
	fn trace_id(&self) -> String {
		match self {
			Self::SignatureError(ctx) | Self::DecodeError(ctx) | Self::EncodeError(ctx) => {
				ctx.trace_id.clone()
			}
			Self::Other(_) => Uuid::new_v4().to_string(),
		}
	}
}
