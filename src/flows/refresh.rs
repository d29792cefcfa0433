//! Refresh coordination with per-stale-token guards and short-lived result sharing.
//!
//! A gateway calls [`Broker::refresh_if_needed`] for every request that carries a session.
//! Sessions that are still valid, or that hold no refresh token, return immediately without
//! locking. Expired sessions are keyed by their stale access token: the first caller for a key
//! performs one `grant_type=refresh_token` exchange and publishes the new access token, and every
//! caller queued on the same key adopts that token instead of spending the (often single-use)
//! refresh token a second time.
//!
//! Adoption copies only the access token. The adopting session keeps its old refresh token and
//! its past expiry, so its very next call refreshes again, keyed by the adopted access token for
//! which no record exists. That exchange spends the old refresh token a second time, which a
//! provider issuing single-use refresh tokens will most likely reject.

mod guard;
mod metrics;

pub use guard::{KeyGuard, KeyedGuards};
pub use metrics::RefreshMetrics;

// std
use std::time::Instant;
// self
use crate::{
	_prelude::*,
	auth::SessionState,
	flows::{Broker, common},
	http::ProviderHttpClient,
	oauth::{TransportErrorMapper, token::TokenForm},
	obs::{self, FlowKind, FlowOutcome},
	provider::GrantType,
};

/// Result of [`Broker::refresh_if_needed`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RefreshOutcome {
	/// No session, a valid access token, or no refresh token; nothing was touched.
	NotNeeded,
	/// A concurrent caller already refreshed this stale token; its access token was adopted.
	///
	/// Only the access token changes. The session still looks expired and holds the old refresh
	/// token, so the next call performs another exchange with it.
	Adopted,
	/// This call performed the exchange and rewrote the session.
	Refreshed,
}
impl RefreshOutcome {
	/// Returns `true` only when this call performed the exchange.
	pub const fn refreshed(self) -> bool {
		matches!(self, RefreshOutcome::Refreshed)
	}

	const fn flow_outcome(self) -> FlowOutcome {
		match self {
			RefreshOutcome::NotNeeded => FlowOutcome::Skipped,
			RefreshOutcome::Adopted => FlowOutcome::Adopted,
			RefreshOutcome::Refreshed => FlowOutcome::Success,
		}
	}
}

impl<C, M> Broker<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Refreshes `session` in place when its access token has expired.
	///
	/// On failure the session is left untouched and any record published for its stale access
	/// token is evicted, so the next caller performs a fresh exchange.
	pub async fn refresh_if_needed(
		&self,
		session: Option<&mut SessionState>,
	) -> Result<RefreshOutcome> {
		const KIND: FlowKind = FlowKind::Refresh;

		let started = Instant::now();
		let span = self.flow_span(KIND, "refresh_if_needed");

		self.refresh_metrics.record_attempt();
		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let Some(session) = session.filter(|s| s.needs_refresh_at(OffsetDateTime::now_utc()))
		else {
			self.refresh_metrics.record_skipped();
			common::finish_flow(&span, KIND, FlowOutcome::Skipped, started);

			return Ok(RefreshOutcome::NotNeeded);
		};
		let result = span.instrument(self.refresh_locked(session)).await;

		match &result {
			Ok(RefreshOutcome::Adopted) => self.refresh_metrics.record_adopted(),
			Ok(RefreshOutcome::Refreshed) => self.refresh_metrics.record_refreshed(),
			Ok(RefreshOutcome::NotNeeded) => self.refresh_metrics.record_skipped(),
			Err(_) => self.refresh_metrics.record_failure(),
		}

		let outcome = match &result {
			Ok(outcome) => outcome.flow_outcome(),
			Err(_) => FlowOutcome::Failure,
		};

		common::finish_flow(&span, KIND, outcome, started);

		result
	}

	async fn refresh_locked(&self, session: &mut SessionState) -> Result<RefreshOutcome> {
		let stale_key = session.access_token.expose().to_owned();
		let _guard = self.refresh_guards.lock(&stale_key).await;
		let published = self.refresh_records.lock().get(stale_key.as_str());

		if let Some(access_token) = published {
			session.access_token = access_token;

			return Ok(RefreshOutcome::Adopted);
		}

		let exchanged = {
			let form = TokenForm::new(GrantType::RefreshToken)
				.param("refresh_token", session.refresh_token.expose())
				.client(&self.client_id, self.client_secret.as_deref());

			self.provider_client().exchange(&self.descriptor.endpoints.token, &form).await
		};

		match exchanged {
			Ok(issued) => {
				session.apply_refresh(issued);
				self.refresh_records.lock().insert(stale_key, session.access_token.clone());

				Ok(RefreshOutcome::Refreshed)
			},
			Err(e) => {
				self.refresh_records.lock().remove(stale_key.as_str());

				Err(e)
			},
		}
	}
}
