//! Criteria matching.
//!
//! Pure predicates over a single record. A populated criterion field must equal the
//! corresponding record field; unset fields match anything.

use crate::models::{Criteria, LogKind, LogRecord};

/// Whether `log` satisfies `criterion` in a query of `kind`.
///
/// Records of another kind never match. A criterion carrying fields of the other
/// shape (event fields in a transfer query or vice versa) cannot be satisfied.
pub fn matches(criterion: &Criteria, kind: LogKind, log: &LogRecord) -> bool {
	if log.kind() != kind {
		return false;
	}

	match kind {
		LogKind::Event => {
			!criterion.has_transfer_fields()
				&& criterion
					.address
					.is_none_or(|address| address == log.address)
				&& (0..=4).all(|position| match criterion.topic(position) {
					Some(topic) => log.topic(position) == Some(topic),
					None => true,
				})
		}
		LogKind::Transfer => {
			let Some(transfer) = &log.transfer else {
				return false;
			};
			!criterion.has_event_fields()
				&& criterion
					.tx_origin
					.is_none_or(|origin| origin == log.meta.tx_origin)
				&& criterion
					.sender
					.is_none_or(|sender| sender == transfer.sender)
				&& criterion
					.recipient
					.is_none_or(|recipient| recipient == transfer.recipient)
		}
	}
}

/// Whether `log` satisfies any of `criteria`. Empty criteria match every record of
/// the query kind.
pub fn matches_any(criteria: &[Criteria], kind: LogKind, log: &LogRecord) -> bool {
	if log.kind() != kind {
		return false;
	}
	criteria.is_empty() || criteria.iter().any(|criterion| matches(criterion, kind, log))
}
