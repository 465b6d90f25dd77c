//! Contract-scoped filtering with ABI decoding.
//!
//! Wraps the [`FilterEvaluator`] for a single emitting contract. Constraints given
//! in decoded-parameter terms (`indexed`) are translated into topic criteria using
//! the supplied event signatures, and every matching record is decoded with the
//! first signature whose selector equals its `topic0`.

use alloy::{
	core::json_abi::{Event, EventParam},
	primitives::{Address, B256},
};
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use serde_json::{Map, Value};
use std::{collections::HashMap, sync::Arc};
use tracing::{debug, instrument};

use crate::{
	models::{ContractFilterCriteria, Criteria, DecodedLog, LogRecord},
	services::{
		abi::{decode_log, encode_topic, param_type, parse_event},
		blockchain::{LogSource, StateSource},
		filter::{FilterError, FilterEvaluator, FilterPlan},
	},
};

/// Lazy sequence of decoded records.
pub type DecodedLogStream = BoxStream<'static, Result<DecodedLog, FilterError>>;

/// Evaluates contract filters on top of a [`FilterEvaluator`].
pub struct ContractFilter<C: ?Sized> {
	evaluator: FilterEvaluator<C>,
}

impl<C> ContractFilter<C>
where
	C: LogSource + StateSource + ?Sized + 'static,
{
	pub fn new(evaluator: FilterEvaluator<C>) -> Self {
		Self { evaluator }
	}

	/// Returns the decoded records emitted by `address` that satisfy `filter`.
	///
	/// # Arguments
	/// * `address` - Emitting contract; every criterion is restricted to it
	/// * `abi_signatures` - Event signatures used for `indexed` translation and decoding
	/// * `filter` - Range, order, pagination, criteria and `indexed` constraints
	///
	/// # Errors
	/// `ValidationError` for malformed signatures, filters or `indexed` values;
	/// `SourceUnavailable` when the log or state source fails.
	#[instrument(skip(self, abi_signatures, filter))]
	pub async fn evaluate(
		&self,
		address: Address,
		abi_signatures: &[String],
		filter: ContractFilterCriteria,
	) -> Result<DecodedLogStream, FilterError> {
		let events = abi_signatures
			.iter()
			.map(|signature| {
				parse_event(signature).map_err(|e| {
					FilterError::validation_error(
						format!("Invalid event signature '{}'", signature),
						Some(Box::new(e)),
						None,
					)
				})
			})
			.collect::<Result<Vec<_>, _>>()?;

		let (filter, indexed) = filter.into_parts();
		let mut plan = FilterPlan::from_criteria(filter)?;

		let scoped = scope_to_address(address, std::mem::take(&mut plan.criteria));
		plan.criteria = match translate_indexed(&events, indexed.as_ref())? {
			Some(constraints) => intersect(&scoped, &constraints),
			None => scoped,
		};

		if plan.criteria.is_empty() {
			debug!("No criterion can match the contract filter");
			return Ok(stream::empty().boxed());
		}

		let records = self.evaluator.evaluate_plan(plan).await?;
		let events = Arc::new(events);
		Ok(records
			.map_ok(move |record| decode_record(&events, record))
			.boxed())
	}
}

/// Restricts `criteria` to `address`. Criteria naming another address are dropped;
/// no criteria at all means every log of `address`.
pub fn scope_to_address(address: Address, criteria: Vec<Criteria>) -> Vec<Criteria> {
	if criteria.is_empty() {
		return vec![Criteria::for_address(address)];
	}

	criteria
		.into_iter()
		.filter(|criterion| criterion.address.is_none_or(|named| named == address))
		.map(|criterion| Criteria {
			address: Some(address),
			..criterion
		})
		.collect()
}

fn invalid_indexed(message: &str, value: &Value) -> FilterError {
	FilterError::validation_error(
		message,
		None,
		Some(HashMap::from([("indexed".to_string(), value.to_string())])),
	)
}

/// Translates an `indexed` value into topic criteria.
///
/// Returns `None` when there is no constraint (absent, `null` or `[]`). Otherwise
/// each object yields one criterion per event able to express it; the list is
/// empty when none can.
pub fn translate_indexed(
	events: &[Event],
	indexed: Option<&Value>,
) -> Result<Option<Vec<Criteria>>, FilterError> {
	let objects: Vec<&Map<String, Value>> = match indexed {
		None | Some(Value::Null) => return Ok(None),
		Some(Value::Array(items)) if items.is_empty() => return Ok(None),
		Some(Value::Object(object)) => vec![object],
		Some(value @ Value::Array(items)) => items
			.iter()
			.map(|item| {
				item.as_object().ok_or_else(|| {
					invalid_indexed("indexed array entries must be objects", value)
				})
			})
			.collect::<Result<_, _>>()?,
		Some(value) => {
			return Err(invalid_indexed(
				"indexed must be an object or an array of objects",
				value,
			))
		}
	};

	let mut criteria = Vec::new();
	for object in objects {
		for event in events {
			if let Some(criterion) = translate_object(event, object)? {
				criteria.push(criterion);
			}
		}
	}
	Ok(Some(criteria))
}

/// Translates one `{name: value}` object for `event`, or `None` when some name is
/// not among the event's indexed inputs.
fn translate_object(
	event: &Event,
	object: &Map<String, Value>,
) -> Result<Option<Criteria>, FilterError> {
	let indexed: Vec<&EventParam> = event.inputs.iter().filter(|input| input.indexed).collect();

	let mut constraints = Vec::with_capacity(object.len());
	for (name, value) in object {
		match indexed.iter().position(|input| input.name == *name) {
			Some(position) => constraints.push((position, value)),
			None => return Ok(None),
		}
	}

	let mut criterion = Criteria::default();
	let first_topic = if event.anonymous {
		0
	} else {
		criterion.topic0 = Some(event.selector());
		1
	};

	for (position, value) in constraints {
		let input = indexed[position];
		let metadata = Some(HashMap::from([
			("event".to_string(), event.name.clone()),
			("parameter".to_string(), input.name.clone()),
		]));

		let word = param_type(input)
			.and_then(|ty| encode_topic(&ty, value))
			.map_err(|e| {
				FilterError::validation_error(
					format!("Invalid value for indexed parameter '{}'", input.name),
					Some(Box::new(e)),
					metadata.clone(),
				)
			})?;

		let slot = criterion.topic_mut(first_topic + position).ok_or_else(|| {
			FilterError::validation_error("Too many indexed parameters", None, metadata)
		})?;
		*slot = Some(word);
	}

	Ok(Some(criterion))
}

fn merge_field<T: PartialEq + Copy>(a: Option<T>, b: Option<T>) -> Result<Option<T>, ()> {
	match (a, b) {
		(Some(a), Some(b)) if a != b => Err(()),
		(a, b) => Ok(a.or(b)),
	}
}

/// Conjunction of two criteria, or `None` when they cannot both hold.
fn merge(a: &Criteria, b: &Criteria) -> Option<Criteria> {
	let topic = |position: usize| -> Result<Option<B256>, ()> {
		merge_field(a.topic(position).copied(), b.topic(position).copied())
	};

	Some(Criteria {
		address: merge_field(a.address, b.address).ok()?,
		topic0: topic(0).ok()?,
		topic1: topic(1).ok()?,
		topic2: topic(2).ok()?,
		topic3: topic(3).ok()?,
		topic4: topic(4).ok()?,
		tx_origin: merge_field(a.tx_origin, b.tx_origin).ok()?,
		sender: merge_field(a.sender, b.sender).ok()?,
		recipient: merge_field(a.recipient, b.recipient).ok()?,
	})
}

/// Pairwise conjunction of two OR-lists, dropping contradictory pairs.
pub fn intersect(left: &[Criteria], right: &[Criteria]) -> Vec<Criteria> {
	left.iter()
		.flat_map(|a| right.iter().filter_map(move |b| merge(a, b)))
		.collect()
}

fn decode_record(events: &[Event], record: LogRecord) -> DecodedLog {
	let Some(topic0) = record.topic(0).copied() else {
		debug!(position = ?record.position(), "Log has no topics, leaving it undecoded");
		return DecodedLog::undecoded(record);
	};

	let Some(event) = events
		.iter()
		.find(|event| !event.anonymous && event.selector() == topic0)
	else {
		debug!(%topic0, "No signature matches the log selector");
		return DecodedLog::undecoded(record);
	};

	match decode_log(event, &record.topics, &record.data) {
		Ok(decoded) => {
			let name = event.name.clone();
			DecodedLog::new(record, Some(decoded), Some(name))
		}
		Err(e) => {
			debug!(error = %e, event = %event.name, "Failed to decode log");
			DecodedLog::undecoded(record)
		}
	}
}
