//! Filter evaluation against a log source.
//!
//! A [`FilterCriteria`] is validated into a [`FilterPlan`] before any source is
//! touched. The head is then read once to bound the range, and the log source is
//! read lazily, one block chunk at a time, in the requested order. Matching,
//! ordering and pagination happen in-process.

use alloy::primitives::Address;
use futures::{
	future,
	stream::{self, BoxStream, StreamExt, TryStreamExt},
};
use std::{collections::HashMap, sync::Arc};
use tracing::{debug, instrument};

use crate::{
	models::{Criteria, FilterCriteria, LogKind, LogRecord, Order},
	services::{
		blockchain::{LogQuery, LogSource, StateSource},
		filter::{matcher::matches_any, FilterError},
	},
};

/// Lazy, finite sequence of matching records. Dropping it stops further reads.
pub type LogStream = BoxStream<'static, Result<LogRecord, FilterError>>;

/// A validated filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterPlan {
	pub kind: LogKind,
	pub order: Order,
	pub from: u64,
	/// Upper bound before clamping to the head
	pub to: Option<u64>,
	pub limit: Option<usize>,
	pub offset: usize,
	pub criteria: Vec<Criteria>,
}

fn non_negative(name: &str, value: Option<i64>) -> Result<Option<usize>, FilterError> {
	value
		.map(|value| {
			usize::try_from(value).map_err(|e| {
				FilterError::validation_error(
					format!("{} must not be negative", name),
					Some(Box::new(e)),
					Some(HashMap::from([(name.to_string(), value.to_string())])),
				)
			})
		})
		.transpose()
}

impl FilterPlan {
	/// Validates `filter`, applying defaults for unset values.
	pub fn from_criteria(filter: FilterCriteria) -> Result<Self, FilterError> {
		let kind = match filter.kind.as_deref() {
			None => LogKind::default(),
			Some(value) => LogKind::parse(value).ok_or_else(|| {
				FilterError::validation_error(
					format!("Unknown filter kind '{}'", value),
					None,
					None,
				)
			})?,
		};

		let order = match filter.order.as_deref() {
			None => Order::default(),
			Some(value) => Order::parse(value).ok_or_else(|| {
				FilterError::validation_error(format!("Unknown order '{}'", value), None, None)
			})?,
		};

		let limit = non_negative("limit", filter.limit)?;
		let offset = non_negative("offset", filter.offset)?.unwrap_or_default();

		let range = filter.range.unwrap_or_default();
		let from = range.from.unwrap_or_default();
		if let Some(to) = range.to {
			if from > to {
				return Err(FilterError::validation_error(
					format!("Range start {} is after range end {}", from, to),
					None,
					None,
				));
			}
		}

		let criteria = filter.criterias.unwrap_or_default();
		for (index, criterion) in criteria.iter().enumerate() {
			let conflicting = match kind {
				LogKind::Event => criterion.has_transfer_fields(),
				LogKind::Transfer => criterion.has_event_fields(),
			};
			if conflicting {
				return Err(FilterError::validation_error(
					format!("Criterion {} does not fit a {:?} query", index, kind),
					None,
					Some(HashMap::from([("criterion".to_string(), index.to_string())])),
				));
			}
		}

		Ok(Self {
			kind,
			order,
			from,
			to: range.to,
			limit,
			offset,
			criteria,
		})
	}

	/// Emitters the source can restrict an event read to: set only when every
	/// criterion names an address.
	pub fn pushdown_addresses(&self) -> Option<Vec<Address>> {
		if self.kind != LogKind::Event || self.criteria.is_empty() {
			return None;
		}
		let mut addresses = self
			.criteria
			.iter()
			.map(|criterion| criterion.address)
			.collect::<Option<Vec<_>>>()?;
		addresses.sort();
		addresses.dedup();
		Some(addresses)
	}
}

/// Walks an inclusive block range in chunks of at most `size` blocks.
#[derive(Debug, Clone)]
pub struct BlockChunks {
	from: u64,
	to: u64,
	size: u64,
	order: Order,
	done: bool,
}

impl BlockChunks {
	pub fn new(from: u64, to: u64, size: u64, order: Order) -> Self {
		Self {
			from,
			to,
			size: size.max(1),
			order,
			done: from > to,
		}
	}
}

impl Iterator for BlockChunks {
	type Item = (u64, u64);

	fn next(&mut self) -> Option<Self::Item> {
		if self.done {
			return None;
		}

		let span = self.size - 1;
		let chunk = match self.order {
			Order::Asc => {
				let end = self.from.saturating_add(span).min(self.to);
				let chunk = (self.from, end);
				if end == self.to {
					self.done = true;
				} else {
					self.from = end + 1;
				}
				chunk
			}
			Order::Desc => {
				let start = self.to.saturating_sub(span).max(self.from);
				let chunk = (start, self.to);
				if start == self.from {
					self.done = true;
				} else {
					self.to = start - 1;
				}
				chunk
			}
		};
		Some(chunk)
	}
}

/// Evaluates filters against a shared log and state source.
pub struct FilterEvaluator<C: ?Sized> {
	source: Arc<C>,
	chunk_size: u64,
}

impl<C: ?Sized> Clone for FilterEvaluator<C> {
	fn clone(&self) -> Self {
		Self {
			source: self.source.clone(),
			chunk_size: self.chunk_size,
		}
	}
}

impl<C> FilterEvaluator<C>
where
	C: LogSource + StateSource + ?Sized + 'static,
{
	pub fn new(source: Arc<C>, chunk_size: u64) -> Self {
		Self {
			source,
			chunk_size: chunk_size.max(1),
		}
	}

	/// Validates `filter` and returns the stream of matching records.
	#[instrument(skip(self))]
	pub async fn evaluate(&self, filter: FilterCriteria) -> Result<LogStream, FilterError> {
		let plan = FilterPlan::from_criteria(filter)?;
		self.evaluate_plan(plan).await
	}

	/// Runs an already validated plan.
	pub async fn evaluate_plan(&self, plan: FilterPlan) -> Result<LogStream, FilterError> {
		let head = self.source.get_head().await.map_err(|e| {
			FilterError::source_unavailable("Failed to read chain head", Some(e.into()), None)
		})?;

		let to = plan.to.map_or(head.number, |to| to.min(head.number));
		if plan.from > to {
			debug!(from = plan.from, to, "Range is beyond the head");
			return Ok(stream::empty().boxed());
		}

		debug!(
			from = plan.from,
			to,
			head = head.number,
			criteria = plan.criteria.len(),
			"Evaluating filter"
		);

		let addresses = plan.pushdown_addresses();
		let source = self.source.clone();
		let FilterPlan {
			kind,
			order,
			from,
			limit,
			offset,
			criteria,
			..
		} = plan;

		let chunks = BlockChunks::new(from, to, self.chunk_size, order);
		// a failed read ends the stream before the next chunk is requested
		let records = stream::try_unfold(chunks, move |mut chunks| {
			let source = source.clone();
			let addresses = addresses.clone();
			async move {
				let Some((from, to)) = chunks.next() else {
					return Ok(None);
				};
				let query = LogQuery {
					kind,
					addresses,
					from,
					to,
				};
				let records = source.read_logs(query).await.map_err(|e| {
					FilterError::source_unavailable(
						"Failed to read logs",
						Some(e.into()),
						Some(HashMap::from([
							("from".to_string(), from.to_string()),
							("to".to_string(), to.to_string()),
						])),
					)
				})?;
				Ok::<_, FilterError>(Some((records, chunks)))
			}
		})
		.map_ok(move |records| {
			let mut matched: Vec<LogRecord> = records
				.into_iter()
				.filter(|record| matches_any(&criteria, kind, record))
				.collect();
			matched.sort_by_key(LogRecord::position);
			if order == Order::Desc {
				matched.reverse();
			}
			stream::iter(matched.into_iter().map(Ok::<_, FilterError>))
		})
		.try_flatten();

		let mut to_skip = offset;
		let paged = records.try_filter(move |_| {
			let keep = to_skip == 0;
			to_skip = to_skip.saturating_sub(1);
			future::ready(keep)
		});

		Ok(match limit {
			Some(limit) => paged.take(limit).boxed(),
			None => paged.boxed(),
		})
	}
}
