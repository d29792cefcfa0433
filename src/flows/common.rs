//! Shared helpers for flow implementations (refresh policy, provider calls, outcome recording).

// std
use std::time::Instant;
// self
use crate::{
	_prelude::*,
	cache::ExpiringCache,
	flows::{Broker, RefreshRecords},
	http::ProviderHttpClient,
	oauth::{ProviderClient, TransportErrorMapper},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

/// Controls how long a completed refresh is shared with concurrent callers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RefreshPolicy {
	/// Lifetime of a published record (stale access token -> new access token).
	pub record_ttl: Duration,
	/// Upper bound on published records; `None` leaves the cache unbounded.
	pub record_capacity: Option<usize>,
}
impl RefreshPolicy {
	/// Default lifetime of a published record.
	pub const DEFAULT_RECORD_TTL: Duration = Duration::seconds(60);
	/// Default upper bound on published records.
	pub const DEFAULT_RECORD_CAPACITY: usize = 10_000;

	/// Overrides the record lifetime; negative values are clamped to zero.
	pub fn with_record_ttl(mut self, ttl: Duration) -> Self {
		self.record_ttl = if ttl.is_negative() { Duration::ZERO } else { ttl };

		self
	}

	/// Overrides the record capacity.
	pub fn with_record_capacity(mut self, capacity: Option<usize>) -> Self {
		self.record_capacity = capacity;

		self
	}

	pub(crate) fn build_records(&self) -> RefreshRecords {
		let cache = ExpiringCache::new(self.record_ttl);
		let cache = match self.record_capacity {
			Some(capacity) => cache.with_capacity_limit(capacity),
			None => cache,
		};

		Arc::new(Mutex::new(cache))
	}
}
impl Default for RefreshPolicy {
	fn default() -> Self {
		Self {
			record_ttl: Self::DEFAULT_RECORD_TTL,
			record_capacity: Some(Self::DEFAULT_RECORD_CAPACITY),
		}
	}
}

impl<C, M> Broker<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	pub(crate) fn provider_client(&self) -> ProviderClient<'_, C, M> {
		ProviderClient::new(self.http_client.as_ref(), self.transport_mapper.as_ref())
	}

	pub(crate) fn flow_span(&self, kind: FlowKind, stage: &'static str) -> FlowSpan {
		FlowSpan::new(kind, stage, &self.descriptor.id)
	}
}

/// Records the terminal outcome and elapsed time of a flow inside its span.
pub(crate) fn finish_flow(
	span: &FlowSpan,
	kind: FlowKind,
	outcome: FlowOutcome,
	started: Instant,
) {
	span.record_outcome(outcome);

	let _entered = span.clone().entered();

	obs::record_flow_outcome(kind, outcome);
	obs::record_flow_duration(kind, outcome, started.elapsed());
}

/// Maps a flow result to its terminal outcome label.
pub(crate) fn outcome_of<T>(result: &Result<T>) -> FlowOutcome {
	if result.is_ok() { FlowOutcome::Success } else { FlowOutcome::Failure }
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn default_policy_shares_records_for_a_minute() {
		let policy = RefreshPolicy::default();

		assert_eq!(policy.record_ttl, Duration::seconds(60));
		assert_eq!(policy.record_capacity, Some(10_000));
		assert_eq!(policy.build_records().lock().ttl(), Duration::seconds(60));
	}

	#[test]
	fn policy_overrides_are_clamped() {
		let policy = RefreshPolicy::default()
			.with_record_ttl(Duration::seconds(-1))
			.with_record_capacity(Some(0));
		let records = policy.build_records();

		assert_eq!(policy.record_ttl, Duration::ZERO);

		records.lock().insert("stale".into(), "fresh".into());

		assert!(records.lock().is_empty(), "Zero capacity must not retain records.");
	}
}
