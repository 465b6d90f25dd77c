//! Signature parsing and ABI encoding/decoding.
//!
//! Signatures are accepted either as human-readable text (`name(type,...)`, with
//! optional `indexed` markers for events and `returns (...)` for functions) or as a
//! single JSON ABI item.

use alloy::{
	core::{
		dyn_abi::{DecodedEvent, DynSolType, DynSolValue, EventExt, FunctionExt, Specifier},
		json_abi::{AbiItem, Event, EventParam, Function},
	},
	primitives::{keccak256, Bytes, B256},
};
use serde_json::{json, Value};
use std::{borrow::Cow, collections::HashMap};

use crate::services::abi::{helpers::keyed_object, AbiError};

/// Selector of `Error(string)` revert payloads
pub const ERROR_SELECTOR: [u8; 4] = [0x08, 0xc3, 0x79, 0xa0];

/// Selector of `Panic(uint256)` revert payloads
pub const PANIC_SELECTOR: [u8; 4] = [0x4e, 0x48, 0x7b, 0x71];

fn signature_metadata(signature: &str) -> Option<HashMap<String, String>> {
	Some(HashMap::from([(
		"signature".to_string(),
		signature.to_string(),
	)]))
}

fn parse_json_item(signature: &str) -> Result<AbiItem<'static>, AbiError> {
	let mut item: Value = serde_json::from_str(signature).map_err(|e| {
		AbiError::signature_error(
			"Invalid JSON ABI item",
			Some(Box::new(e)),
			signature_metadata(signature),
		)
	})?;

	// Solidity compilers omit empty lists and `anonymous: false` in some outputs
	if let Some(object) = item.as_object_mut() {
		let defaults = match object.get("type").and_then(Value::as_str) {
			Some("function") => vec![("inputs", json!([])), ("outputs", json!([]))],
			Some("event") => vec![("inputs", json!([])), ("anonymous", json!(false))],
			_ => Vec::new(),
		};
		for (key, value) in defaults {
			object.entry(key).or_insert(value);
		}
	}

	serde_json::from_value(item).map_err(|e| {
		AbiError::signature_error(
			"Invalid JSON ABI item",
			Some(Box::new(e)),
			signature_metadata(signature),
		)
	})
}

/// Parses a function signature or JSON ABI function item.
pub fn parse_function(signature: &str) -> Result<Function, AbiError> {
	let signature = signature.trim();
	if signature.starts_with('{') {
		return match parse_json_item(signature)? {
			AbiItem::Function(function) => Ok(function.into_owned()),
			other => Err(AbiError::signature_error(
				format!("Expected a function ABI item, got {}", other.json_type()),
				None,
				signature_metadata(signature),
			)),
		};
	}

	Function::parse(signature).map_err(|e| {
		AbiError::signature_error(
			"Invalid function signature",
			Some(Box::new(e)),
			signature_metadata(signature),
		)
	})
}

/// Parses an event signature or JSON ABI event item.
pub fn parse_event(signature: &str) -> Result<Event, AbiError> {
	let signature = signature.trim();
	if signature.starts_with('{') {
		return match parse_json_item(signature)? {
			AbiItem::Event(event) => Ok(event.into_owned()),
			other => Err(AbiError::signature_error(
				format!("Expected an event ABI item, got {}", other.json_type()),
				None,
				signature_metadata(signature),
			)),
		};
	}

	Event::parse(signature).map_err(|e| {
		AbiError::signature_error(
			"Invalid event signature",
			Some(Box::new(e)),
			signature_metadata(signature),
		)
	})
}

/// Calldata for `function`: its selector followed by the already encoded params.
pub fn encode_call(function: &Function, params: &[u8]) -> Bytes {
	let mut data = Vec::with_capacity(4 + params.len());
	data.extend_from_slice(function.selector().as_slice());
	data.extend_from_slice(params);
	data.into()
}

/// Decodes call return data into an object keyed by output position and name.
pub fn decode_output(function: &Function, data: &[u8]) -> Result<Value, AbiError> {
	let values = function.abi_decode_output(data).map_err(|e| {
		AbiError::decode_error(
			format!(
				"Return data does not match the outputs of {}",
				function.signature()
			),
			Some(Box::new(e)),
			Some(HashMap::from([(
				"length".to_string(),
				data.len().to_string(),
			)])),
		)
	})?;

	Ok(keyed_object(
		&values,
		function
			.outputs
			.iter()
			.map(|param| (param.name.as_str(), param.components.as_slice())),
	))
}

/// The event with its indexed layout inferred from a log with `topic_count` topics.
///
/// When no input carries an `indexed` marker the first `topic_count - 1` inputs are
/// treated as indexed. Events that already mark inputs are returned unchanged.
pub fn event_layout(event: &Event, topic_count: usize) -> Cow<'_, Event> {
	if event.anonymous || topic_count <= 1 || event.inputs.iter().any(|input| input.indexed) {
		return Cow::Borrowed(event);
	}

	let mut inferred = event.clone();
	for input in inferred.inputs.iter_mut().take(topic_count - 1) {
		input.indexed = true;
	}
	Cow::Owned(inferred)
}

/// Decodes log topics and data against `event`, inferring the indexed layout when
/// the signature has none.
pub fn decode_event(event: &Event, topics: &[B256], data: &[u8]) -> Result<DecodedEvent, AbiError> {
	event_layout(event, topics.len())
		.decode_log_parts(topics.iter().copied(), data)
		.map_err(|e| {
			AbiError::decode_error(
				format!("Log does not match event {}", event.signature()),
				Some(Box::new(e)),
				Some(HashMap::from([(
					"topics".to_string(),
					topics.len().to_string(),
				)])),
			)
		})
}

/// Renders a decoded event as an object keyed by input position and name, with
/// indexed and body values merged back into declaration order.
///
/// `layout` must be the event the values were decoded with (see [`event_layout`]).
pub fn event_to_json(layout: &Event, decoded: &DecodedEvent) -> Value {
	let mut indexed = decoded.indexed.iter();
	let mut body = decoded.body.iter();

	let values: Vec<DynSolValue> = layout
		.inputs
		.iter()
		.filter_map(|input| {
			if input.indexed {
				indexed.next().cloned()
			} else {
				body.next().cloned()
			}
		})
		.collect();

	keyed_object(
		&values,
		layout
			.inputs
			.iter()
			.map(|input| (input.name.as_str(), input.components.as_slice())),
	)
}

/// Decodes a log against `event` and renders the result as JSON.
pub fn decode_log(event: &Event, topics: &[B256], data: &[u8]) -> Result<Value, AbiError> {
	let layout = event_layout(event, topics.len());
	let decoded = decode_event(event, topics, data)?;
	Ok(event_to_json(&layout, &decoded))
}

/// Re-encodes decoded event values into topics and data.
pub fn encode_event(
	event: &Event,
	decoded: &DecodedEvent,
) -> Result<(Vec<B256>, Bytes), AbiError> {
	let mut topics = Vec::with_capacity(decoded.indexed.len() + 1);
	if !event.anonymous {
		topics.push(event.selector());
	}

	for value in &decoded.indexed {
		let word = value.as_word().ok_or_else(|| {
			AbiError::encode_error(
				"Indexed value does not fit in a topic word",
				None,
				signature_metadata(&event.signature()),
			)
		})?;
		topics.push(word);
	}

	let data = DynSolValue::Tuple(decoded.body.clone()).abi_encode_params();
	Ok((topics, data.into()))
}

/// Resolves the ABI type of an event input.
pub fn param_type(param: &EventParam) -> Result<DynSolType, AbiError> {
	param.resolve().map_err(|e| {
		AbiError::signature_error(
			format!("Unsupported parameter type '{}'", param.ty),
			Some(Box::new(e)),
			None,
		)
	})
}

/// Encodes a JSON value of type `ty` into the topic word an indexed input produces.
///
/// Static types are encoded in place. Strings and bytes are stored as the keccak-256
/// hash of their contents; arrays and tuples as the hash of [`encode_topic_preimage`].
pub fn encode_topic(ty: &DynSolType, value: &Value) -> Result<B256, AbiError> {
	let text = match value {
		Value::String(s) => s.clone(),
		other => other.to_string(),
	};

	let metadata = Some(HashMap::from([
		("type".to_string(), ty.sol_type_name().into_owned()),
		("value".to_string(), text.clone()),
	]));

	let coerced = ty.coerce_str(&text).map_err(|e| {
		AbiError::encode_error(
			"Value cannot be encoded as the declared type",
			Some(Box::new(e)),
			metadata.clone(),
		)
	})?;

	match &coerced {
		DynSolValue::String(s) => return Ok(keccak256(s.as_bytes())),
		DynSolValue::Bytes(b) => return Ok(keccak256(b)),
		DynSolValue::Tuple(_) | DynSolValue::Array(_) | DynSolValue::FixedArray(_) => {
			let mut preimage = Vec::new();
			encode_topic_preimage(&coerced, &mut preimage);
			return Ok(keccak256(preimage));
		}
		_ => {}
	}

	coerced.as_word().ok_or_else(|| {
		AbiError::encode_error("Value does not fit in a topic word", None, metadata)
	})
}

/// Writes the in-place encoding of an indexed composite value: every member padded
/// to a multiple of 32 bytes, recursively, with no offsets or length prefixes.
fn encode_topic_preimage(value: &DynSolValue, out: &mut Vec<u8>) {
	match value {
		DynSolValue::String(s) => pad_to_word(s.as_bytes(), out),
		DynSolValue::Bytes(b) => pad_to_word(b, out),
		DynSolValue::Tuple(items) | DynSolValue::Array(items) | DynSolValue::FixedArray(items) => {
			for item in items {
				encode_topic_preimage(item, out);
			}
		}
		other => out.extend_from_slice(&other.abi_encode()),
	}
}

fn pad_to_word(bytes: &[u8], out: &mut Vec<u8>) {
	out.extend_from_slice(bytes);
	let rem = bytes.len() % 32;
	if rem != 0 {
		out.resize(out.len() + 32 - rem, 0);
	}
}

/// Extracts a readable reason from `Error(string)` and `Panic(uint256)` payloads.
pub fn decode_revert_reason(data: &[u8]) -> Option<String> {
	if data.len() < 4 {
		return None;
	}
	let (selector, payload) = data.split_at(4);

	if selector == ERROR_SELECTOR {
		return DynSolType::String
			.abi_decode(payload)
			.ok()
			.and_then(|value| value.as_str().map(str::to_string));
	}

	if selector == PANIC_SELECTOR {
		return DynSolType::Uint(256)
			.abi_decode(payload)
			.ok()
			.and_then(|value| value.as_uint())
			.and_then(|(code, _)| u64::try_from(code).ok())
			.map(|code| format!("Panic(0x{:02x})", code));
	}

	None
}
