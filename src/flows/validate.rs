//! Session validation and profile lookups.

// std
use std::time::Instant;
// self
use crate::{
	_prelude::*,
	auth::SessionState,
	error::ValidationError,
	flows::{Broker, common},
	http::ProviderHttpClient,
	oauth::{TransportErrorMapper, profile},
	obs::{self, FlowKind, FlowOutcome},
	provider::EndpointKind,
};

impl<C, M> Broker<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Returns `true` only when the validate endpoint accepts the session's access token.
	///
	/// Fails closed: an empty token, a transport failure, or any status besides 200 yields
	/// `false`.
	pub async fn validate(&self, session: &SessionState) -> bool {
		const KIND: FlowKind = FlowKind::Validate;

		let started = Instant::now();
		let span = self.flow_span(KIND, "validate");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		if session.access_token.is_empty() {
			common::finish_flow(&span, KIND, FlowOutcome::Failure, started);

			return false;
		}

		let result = span
			.instrument(self.provider_client().get_authorized(
				EndpointKind::Validate,
				&self.descriptor.endpoints.validate,
				session.access_token.expose(),
			))
			.await;

		common::finish_flow(&span, KIND, common::outcome_of(&result), started);

		result.is_ok()
	}

	/// Reads the signed-in user's email from the profile endpoint.
	pub async fn email(&self, session: &SessionState) -> Result<String> {
		const KIND: FlowKind = FlowKind::Profile;

		let started = Instant::now();
		let span = self.flow_span(KIND, "email");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result: Result<String> = span
			.instrument(async move {
				if session.access_token.is_empty() {
					return Err(ValidationError::MissingAccessToken.into());
				}

				let body = self
					.provider_client()
					.get_authorized(
						EndpointKind::Profile,
						&self.descriptor.endpoints.profile,
						session.access_token.expose(),
					)
					.await?;

				profile::parse_email(&body)
			})
			.await;

		common::finish_flow(&span, KIND, common::outcome_of(&result), started);

		result
	}
}
