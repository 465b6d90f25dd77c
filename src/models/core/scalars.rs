//! Wire scalars accepted by the query contract.
//!
//! Inputs are lenient where the query contract is lenient: addresses may be given as
//! 20-byte values or as 32-byte left-zero-padded words, `topic0` may be an event
//! signature, and big integers may be JSON numbers, decimal strings or `0x` hex.
//! Outputs always use the canonical forms (`0x` lowercase hex).

use alloy::{
	core::json_abi::Event,
	primitives::{keccak256, Address, B256, U256},
};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::str::FromStr;

fn decode_hex(input: &str) -> Result<Vec<u8>, String> {
	let stripped = input
		.strip_prefix("0x")
		.or_else(|| input.strip_prefix("0X"))
		.ok_or_else(|| format!("Expected 0x-prefixed hex, got '{}'", input))?;
	hex::decode(stripped).map_err(|e| format!("Invalid hex '{}': {}", input, e))
}

/// Parses a 20-byte address, or a 32-byte word whose first 12 bytes are zero.
pub fn parse_address(input: &str) -> Result<Address, String> {
	let bytes = decode_hex(input.trim())?;
	match bytes.len() {
		20 => Ok(Address::from_slice(&bytes)),
		32 if bytes[..12].iter().all(|b| *b == 0) => Ok(Address::from_slice(&bytes[12..])),
		32 => Err(format!("32-byte value '{}' is not a padded address", input)),
		n => Err(format!("Address must be 20 or 32 bytes, got {} bytes", n)),
	}
}

/// Parses a `0x`-prefixed 32-byte value.
pub fn parse_b256(input: &str) -> Result<B256, String> {
	let bytes = decode_hex(input.trim())?;
	if bytes.len() != 32 {
		return Err(format!("Expected 32 bytes, got {} bytes", bytes.len()));
	}
	Ok(B256::from_slice(&bytes))
}

/// Parses `topic0`: a 32-byte value, or an event signature hashed into its selector.
pub fn parse_topic0(input: &str) -> Result<B256, String> {
	let input = input.trim();
	if input.starts_with("0x") || input.starts_with("0X") {
		return parse_b256(input);
	}
	if !input.contains('(') {
		return Err(format!(
			"topic0 must be a 32-byte value or an event signature, got '{}'",
			input
		));
	}
	match Event::parse(input) {
		Ok(event) => Ok(event.selector()),
		Err(_) => {
			let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
			Ok(keccak256(compact.as_bytes()))
		}
	}
}

/// Parses a BigInt given as a JSON number, a decimal string or a `0x` hex string.
pub fn parse_big_int(value: &Value) -> Result<U256, String> {
	match value {
		Value::Number(n) => n
			.as_u64()
			.map(U256::from)
			.ok_or_else(|| format!("BigInt must be a non-negative integer, got {}", n)),
		Value::String(s) => {
			let s = s.trim();
			if let Some(hex_digits) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
				if hex_digits.is_empty() {
					return Ok(U256::ZERO);
				}
				U256::from_str_radix(hex_digits, 16)
					.map_err(|e| format!("Invalid hex BigInt '{}': {}", s, e))
			} else {
				U256::from_str(s).map_err(|e| format!("Invalid decimal BigInt '{}': {}", s, e))
			}
		}
		other => Err(format!("BigInt must be a number or string, got {}", other)),
	}
}

/// Formats a BigInt the way it is emitted on the wire.
pub fn format_big_int(value: &U256) -> String {
	format!("{:#x}", value)
}

fn lenient<'de, D, T>(
	deserializer: D,
	parse: fn(&str) -> Result<T, String>,
) -> Result<Option<T>, D::Error>
where
	D: Deserializer<'de>,
{
	match Option::<String>::deserialize(deserializer)? {
		Some(s) => parse(&s).map(Some).map_err(serde::de::Error::custom),
		None => Ok(None),
	}
}

/// `deserialize_with` for required lenient addresses.
pub fn address<'de, D>(deserializer: D) -> Result<Address, D::Error>
where
	D: Deserializer<'de>,
{
	let s = String::deserialize(deserializer)?;
	parse_address(&s).map_err(serde::de::Error::custom)
}

/// `deserialize_with` for optional lenient addresses.
pub fn opt_address<'de, D>(deserializer: D) -> Result<Option<Address>, D::Error>
where
	D: Deserializer<'de>,
{
	lenient(deserializer, parse_address)
}

/// `deserialize_with` for optional 32-byte values.
pub fn opt_b256<'de, D>(deserializer: D) -> Result<Option<B256>, D::Error>
where
	D: Deserializer<'de>,
{
	lenient(deserializer, parse_b256)
}

/// `deserialize_with` for an optional `topic0`.
pub fn opt_topic0<'de, D>(deserializer: D) -> Result<Option<B256>, D::Error>
where
	D: Deserializer<'de>,
{
	lenient(deserializer, parse_topic0)
}

/// `deserialize_with` for BigInt values.
pub fn big_int<'de, D>(deserializer: D) -> Result<U256, D::Error>
where
	D: Deserializer<'de>,
{
	let value = Value::deserialize(deserializer)?;
	parse_big_int(&value).map_err(serde::de::Error::custom)
}

/// `serialize_with` for BigInt values.
pub fn big_int_hex<S>(value: &U256, serializer: S) -> Result<S::Ok, S::Error>
where
	S: serde::Serializer,
{
	serializer.serialize_str(&format_big_int(value))
}
