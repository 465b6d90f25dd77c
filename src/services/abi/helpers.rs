//! Conversions from decoded ABI values to their JSON output form.
//!
//! Integers of up to 64 bits become JSON numbers and wider integers decimal strings.
//! Byte values and addresses are rendered as `0x` lowercase hex. Tuples become objects
//! keyed by position and, where the ABI names them, by component name.

use alloy::{
	core::{dyn_abi::DynSolValue, json_abi::Param},
	primitives::{Address, B256},
};
use serde_json::{Map, Value};

/// Converts a B256 hash to its `0x` hex representation.
pub fn b256_to_string(hash: B256) -> String {
	format!("0x{}", hex::encode(hash.as_slice()))
}

/// Converts an address to its `0x` lowercase hex representation.
pub fn h160_to_string(address: Address) -> String {
	format!("0x{}", hex::encode(address.as_slice()))
}

/// Converts a decoded value into JSON.
///
/// `components` describes tuple members (or the members of the tuple element of an
/// array) and is used for naming only; an empty slice yields positional keys.
pub fn dyn_value_to_json(value: &DynSolValue, components: &[Param]) -> Value {
	match value {
		DynSolValue::Bool(b) => Value::Bool(*b),
		DynSolValue::Uint(u, bits) if *bits <= 64 => u64::try_from(*u)
			.map(Value::from)
			.unwrap_or_else(|_| Value::String(u.to_string())),
		DynSolValue::Uint(u, _) => Value::String(u.to_string()),
		DynSolValue::Int(i, bits) if *bits <= 64 => i64::try_from(*i)
			.map(Value::from)
			.unwrap_or_else(|_| Value::String(i.to_string())),
		DynSolValue::Int(i, _) => Value::String(i.to_string()),
		DynSolValue::FixedBytes(word, size) => {
			Value::String(format!("0x{}", hex::encode(&word[..*size])))
		}
		DynSolValue::Address(address) => Value::String(h160_to_string(*address)),
		DynSolValue::Function(function) => Value::String(format!("0x{}", hex::encode(function))),
		DynSolValue::Bytes(bytes) => Value::String(format!("0x{}", hex::encode(bytes))),
		DynSolValue::String(s) => Value::String(s.clone()),
		DynSolValue::Array(items) | DynSolValue::FixedArray(items) => Value::Array(
			items
				.iter()
				.map(|item| dyn_value_to_json(item, components))
				.collect(),
		),
		DynSolValue::Tuple(items) => keyed_object(
			items,
			components
				.iter()
				.map(|param| (param.name.as_str(), param.components.as_slice())),
		),
	}
}

/// Builds an object keyed by position (`"0"`, `"1"`, ...) and by field name.
///
/// `fields` pairs each value with its declared name and tuple components. Values
/// beyond the declared fields only get a positional key. Unnamed fields and names
/// that collide with a positional key are skipped.
pub fn keyed_object<'a>(
	values: &[DynSolValue],
	fields: impl IntoIterator<Item = (&'a str, &'a [Param])>,
) -> Value {
	let mut fields = fields.into_iter();
	let mut object = Map::new();

	for (position, value) in values.iter().enumerate() {
		let (name, components) = fields.next().unwrap_or(("", &[][..]));
		let json = dyn_value_to_json(value, components);
		let key = position.to_string();

		if !name.is_empty() && name.parse::<usize>().is_err() {
			object.insert(name.to_string(), json.clone());
		}
		object.insert(key, json);
	}

	Value::Object(object)
}
