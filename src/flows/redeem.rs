//! Authorization code redemption.

// std
use std::time::Instant;
// self
use crate::{
	_prelude::*,
	auth::SessionState,
	error::ValidationError,
	flows::{Broker, common},
	http::ProviderHttpClient,
	oauth::{TransportErrorMapper, token::TokenForm},
	obs::{self, FlowKind, FlowOutcome},
	provider::GrantType,
};

impl<C, M> Broker<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Exchanges the authorization code delivered to `redirect_uri` for a new session.
	///
	/// The descriptor's protected resource, when configured, is sent as `resource`. A response
	/// without a refresh token yields a session that can not be refreshed.
	pub async fn redeem(&self, redirect_uri: &str, code: &str) -> Result<SessionState> {
		const KIND: FlowKind = FlowKind::Redeem;

		let started = Instant::now();
		let span = self.flow_span(KIND, "redeem");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result: Result<SessionState> = span
			.instrument(async move {
				if code.is_empty() {
					return Err(ValidationError::MissingCode.into());
				}

				let form = TokenForm::new(GrantType::AuthorizationCode)
					.param("code", code)
					.param("redirect_uri", redirect_uri)
					.client(&self.client_id, self.client_secret.as_deref())
					.optional("resource", self.descriptor.protected_resource.as_ref().map(Url::as_str));
				let issued =
					self.provider_client().exchange(&self.descriptor.endpoints.token, &form).await?;

				Ok(SessionState::from(issued))
			})
			.await;

		common::finish_flow(&span, KIND, common::outcome_of(&result), started);

		result
	}
}
