//! Property-based tests for criteria matching.

use alloy::primitives::B256;
use connex_gateway::{
	models::{Criteria, LogKind},
	services::filter::{matches, matches_any},
};
use proptest::{prelude::*, test_runner::Config};

use crate::properties::strategies::{
	event_criteria_strategy, event_log_strategy, transfer_criteria_strategy,
	transfer_log_strategy,
};

proptest! {
	#![proptest_config(Config {
		failure_persistence: None,
		..Config::default()
	})]

	// Each populated field must equal the record field; unset fields match anything
	#[test]
	fn test_event_match_is_field_wise_equality(
		criterion in event_criteria_strategy(),
		log in event_log_strategy(),
	) {
		let expected = criterion.address.is_none_or(|address| address == log.address)
			&& (0..=4).all(|position| {
				criterion.topic(position).is_none_or(|topic| log.topic(position) == Some(topic))
			});
		prop_assert_eq!(matches(&criterion, LogKind::Event, &log), expected);
	}

	#[test]
	fn test_transfer_match_is_field_wise_equality(
		criterion in transfer_criteria_strategy(),
		log in transfer_log_strategy(),
	) {
		let transfer = log.transfer.clone().unwrap();
		let expected = criterion.tx_origin.is_none_or(|origin| origin == log.meta.tx_origin)
			&& criterion.sender.is_none_or(|sender| sender == transfer.sender)
			&& criterion.recipient.is_none_or(|recipient| recipient == transfer.recipient);
		prop_assert_eq!(matches(&criterion, LogKind::Transfer, &log), expected);
	}

	// A criterion copied from a record always matches it
	#[test]
	fn test_record_matches_its_own_fields(log in event_log_strategy()) {
		let mut criterion = Criteria::for_address(log.address);
		for (position, topic) in log.topics.iter().enumerate() {
			*criterion.topic_mut(position).unwrap() = Some(*topic);
		}
		prop_assert!(matches(&criterion, LogKind::Event, &log));

		// the same criterion with a topic the record lacks does not
		if log.topics.len() < 5 {
			*criterion.topic_mut(log.topics.len()).unwrap() = Some(B256::repeat_byte(0xff));
			prop_assert!(!matches(&criterion, LogKind::Event, &log));
		}
	}

	#[test]
	fn test_empty_criteria_match_every_record_of_kind(
		event in event_log_strategy(),
		transfer in transfer_log_strategy(),
	) {
		prop_assert!(matches_any(&[], LogKind::Event, &event));
		prop_assert!(matches_any(&[], LogKind::Transfer, &transfer));
		prop_assert!(!matches_any(&[], LogKind::Transfer, &event));
		prop_assert!(!matches_any(&[], LogKind::Event, &transfer));
	}

	#[test]
	fn test_criteria_list_is_a_disjunction(
		criteria in prop::collection::vec(event_criteria_strategy(), 1..5),
		log in event_log_strategy(),
	) {
		let any = criteria.iter().any(|criterion| matches(criterion, LogKind::Event, &log));
		prop_assert_eq!(matches_any(&criteria, LogKind::Event, &log), any);
	}

	// Mixing event and transfer fields makes a criterion unsatisfiable
	#[test]
	fn test_mixed_shape_never_matches(
		event_criterion in event_criteria_strategy(),
		transfer_criterion in transfer_criteria_strategy(),
		event in event_log_strategy(),
		transfer in transfer_log_strategy(),
	) {
		prop_assume!(event_criterion.has_event_fields() && transfer_criterion.has_transfer_fields());
		let mixed = Criteria {
			tx_origin: transfer_criterion.tx_origin,
			sender: transfer_criterion.sender,
			recipient: transfer_criterion.recipient,
			..event_criterion
		};
		prop_assert!(!matches(&mixed, LogKind::Event, &event));
		prop_assert!(!matches(&mixed, LogKind::Transfer, &transfer));
	}
}
