//! Parsing utilities for command-line and environment values.

use byte_unit::Byte;
use std::str::FromStr;

/// Parses a human-readable size ("1GB", "500MB", "1024KiB") into bytes.
///
/// Used for `--log-max-size` and `LOG_MAX_SIZE`.
pub fn parse_string_to_bytes_size(s: &str) -> Result<u64, String> {
	Byte::from_str(s.trim())
		.map(|byte| byte.as_u64())
		.map_err(|e| format!("Invalid size format: '{}'. Error: {}", s, e))
}
