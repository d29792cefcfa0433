//! Optional observability helpers for broker flows.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `oauth2_session_broker.flow` with the `flow`,
//!   `stage` (call site), `provider`, and `outcome` fields, plus a `debug` event carrying the
//!   elapsed time of each flow.
//! - Enable `metrics` to increment the `oauth2_session_broker_flow_total` counter for every
//!   outcome and to record `oauth2_session_broker_flow_duration_seconds`, both labeled by
//!   `flow` + `outcome`.
//!
//! Token material never reaches a span field, label, or event.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Broker operations observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Authorization code redemption.
	Redeem,
	/// Refresh coordination.
	Refresh,
	/// Session validation against the validate endpoint.
	Validate,
	/// Profile (email) lookup.
	Profile,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::Redeem => "redeem",
			FlowKind::Refresh => "refresh",
			FlowKind::Validate => "validate",
			FlowKind::Profile => "profile",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a broker operation.
	Attempt,
	/// Completed with a provider round trip.
	Success,
	/// Refresh reused a token published by a concurrent caller.
	Adopted,
	/// Refresh was not needed.
	Skipped,
	/// Failure reported back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Adopted => "adopted",
			FlowOutcome::Skipped => "skipped",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
