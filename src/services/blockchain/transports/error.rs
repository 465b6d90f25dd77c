//! Error types for the JSON-RPC transport
//!
//! Covers network communication, HTTP status failures, JSON-RPC error envelopes,
//! response parsing, request serialization and endpoint rotation.

use crate::utils::logging::error::{BoxedSource, ErrorContext, TraceableError};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
	/// HTTP error
	#[error("HTTP error: status {status_code} for URL {url}")]
	Http {
		status_code: reqwest::StatusCode,
		url: String,
		body: String,
		context: ErrorContext,
	},

	/// The node answered with a JSON-RPC `error` object
	#[error("JSON-RPC error {code}: {message}")]
	Rpc {
		code: i64,
		message: String,
		data: Option<Value>,
		context: ErrorContext,
	},

	/// Network error
	#[error("Network error: {0}")]
	Network(ErrorContext),

	/// JSON parsing error
	#[error("Failed to parse JSON response: {0}")]
	ResponseParse(ErrorContext),

	/// Request body serialization error
	#[error("Failed to serialize request JSON: {0}")]
	RequestSerialization(ErrorContext),

	/// URL rotation error
	#[error("URL rotation failed: {0}")]
	UrlRotation(ErrorContext),
}

impl TransportError {
	pub fn http(
		status_code: reqwest::StatusCode,
		url: String,
		body: String,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		let msg = format!("HTTP error: status {} for URL {}", status_code, url);

		Self::Http {
			status_code,
			url,
			body,
			context: ErrorContext::new_with_log(msg, source, metadata),
		}
	}

	/// JSON-RPC error envelope. Not logged: reverts and rejections travel this way.
	pub fn rpc(
		code: i64,
		message: impl Into<String>,
		data: Option<Value>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		let message = message.into();
		Self::Rpc {
			code,
			context: ErrorContext::new(
				format!("JSON-RPC error {}: {}", code, message),
				None,
				metadata,
			),
			message,
			data,
		}
	}

	pub fn network(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::Network(ErrorContext::new_with_log(msg, source, metadata))
	}

	pub fn response_parse(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::ResponseParse(ErrorContext::new_with_log(msg, source, metadata))
	}

	pub fn request_serialization(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::RequestSerialization(ErrorContext::new_with_log(msg, source, metadata))
	}

	pub fn url_rotation(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::UrlRotation(ErrorContext::new_with_log(msg, source, metadata))
	}
}

impl TraceableError for TransportError {
	fn trace_id(&self) -> String {
		match self {
			Self::Http { context, .. } | Self::Rpc { context, .. } => context.trace_id.clone(),
			Self::Network(ctx)
			| Self::ResponseParse(ctx)
			| Self::RequestSerialization(ctx)
			| Self::UrlRotation(ctx) => ctx.trace_id.clone(),
		}
	}
}
