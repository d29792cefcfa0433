// std
use std::time::Duration as StdDuration;
// self
use crate::obs::{FlowKind, FlowOutcome};

/// Records a flow outcome via the global metrics recorder (when enabled).
pub fn record_flow_outcome(kind: FlowKind, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"oauth2_session_broker_flow_total",
			"flow" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Records how long a finished flow took.
///
/// Feeds the `oauth2_session_broker_flow_duration_seconds` histogram when `metrics` is enabled and
/// emits a `debug` event when `tracing` is enabled.
pub fn record_flow_duration(kind: FlowKind, outcome: FlowOutcome, elapsed: StdDuration) {
	#[cfg(feature = "metrics")]
	{
		metrics::histogram!(
			"oauth2_session_broker_flow_duration_seconds",
			"flow" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.record(elapsed.as_secs_f64());
	}
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(
			flow = kind.as_str(),
			outcome = outcome.as_str(),
			elapsed_ms = elapsed.as_secs_f64() * 1_000.,
			"Broker flow finished."
		);
	}

	#[cfg(not(any(feature = "metrics", feature = "tracing")))]
	{
		let _ = (kind, outcome, elapsed);
	}
}
