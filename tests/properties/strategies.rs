use alloy::primitives::{Address, B256, U256};
use connex_gateway::{
	models::{Criteria, LogRecord},
	utils::tests::builders::log::LogRecordBuilder,
};
use proptest::{option, prelude::*};

/// Small pool of emitters so that generated criteria and logs collide often
pub fn address_strategy() -> impl Strategy<Value = Address> {
	(1u8..=4).prop_map(Address::repeat_byte)
}

pub fn topic_strategy() -> impl Strategy<Value = B256> {
	(1u8..=4).prop_map(B256::repeat_byte)
}

pub fn event_log_strategy() -> impl Strategy<Value = LogRecord> {
	(
		address_strategy(),
		prop::collection::vec(topic_strategy(), 0..=5),
		0u64..50,
		0u64..4,
	)
		.prop_map(|(address, topics, block, log_index)| {
			LogRecordBuilder::new()
				.address(address)
				.topics(topics)
				.block(block, log_index)
				.build()
		})
}

pub fn transfer_log_strategy() -> impl Strategy<Value = LogRecord> {
	(
		address_strategy(),
		address_strategy(),
		address_strategy(),
		any::<u64>(),
		0u64..50,
		0u64..4,
	)
		.prop_map(|(origin, sender, recipient, amount, block, log_index)| {
			LogRecordBuilder::new()
				.tx_origin(origin)
				.transfer(sender, recipient, U256::from(amount))
				.block(block, log_index)
				.build()
		})
}

pub fn event_criteria_strategy() -> impl Strategy<Value = Criteria> {
	(
		option::of(address_strategy()),
		option::of(topic_strategy()),
		option::of(topic_strategy()),
		option::of(topic_strategy()),
	)
		.prop_map(|(address, topic0, topic1, topic2)| Criteria {
			address,
			topic0,
			topic1,
			topic2,
			..Default::default()
		})
}

pub fn transfer_criteria_strategy() -> impl Strategy<Value = Criteria> {
	(
		option::of(address_strategy()),
		option::of(address_strategy()),
		option::of(address_strategy()),
	)
		.prop_map(|(tx_origin, sender, recipient)| Criteria {
			tx_origin,
			sender,
			recipient,
			..Default::default()
		})
}

/// Logs with unique positions, in arbitrary order
pub fn unique_event_logs_strategy(max: usize) -> impl Strategy<Value = Vec<LogRecord>> {
	prop::collection::vec(event_log_strategy(), 0..max).prop_map(|mut logs| {
		logs.sort_by_key(LogRecord::position);
		logs.dedup_by_key(|log| log.position());
		logs.reverse();
		logs
	})
}
