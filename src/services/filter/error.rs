//! Error types for filter evaluation.
//!
//! Validation errors are raised before any source is read and are not logged here;
//! source failures are logged when they are created.

use crate::utils::logging::error::{BoxedSource, ErrorContext, TraceableError};
use std::collections::HashMap;
use thiserror::Error as ThisError;
use uuid::Uuid;

/// Represents errors that can occur during filter evaluation
#[derive(ThisError, Debug)]
pub enum FilterError {
	/// The filter itself is malformed (range, pagination, kind, order, criteria shape)
	#[error("Validation error: {0}")]
	ValidationError(ErrorContext),

	/// The log or state source failed
	#[error("Source unavailable: {0}")]
	SourceUnavailable(ErrorContext),

	/// Errors related to internal processing errors
	#[error("Internal error: {0}")]
	InternalError(ErrorContext),

	/// Other errors that don't fit into the categories above
	#[error(transparent)]
	Other(#[from] anyhow::Error),
}

impl FilterError {
	// Validation error
	pub fn validation_error(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::ValidationError(ErrorContext::new(msg, source, metadata))
	}

	// Source unavailable
	pub fn source_unavailable(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::SourceUnavailable(ErrorContext::new_with_log(msg, source, metadata))
	}

	// Internal error
	pub fn internal_error(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::InternalError(ErrorContext::new_with_log(msg, source, metadata))
	}
}

impl TraceableError for FilterError {
	fn trace_id(&self) -> String {
		match self {
			Self::ValidationError(ctx) | Self::SourceUnavailable(ctx) | Self::InternalError(ctx) => {
				ctx.trace_id.clone()
			}
			Self::Other(_) => Uuid::new_v4().to_string(),
		}
	}
}
