//! Login (authorization) URL construction.

// self
use crate::{
	_prelude::*,
	error::ConfigError,
	flows::Broker,
	http::ProviderHttpClient,
	oauth::TransportErrorMapper,
	obs::FlowKind,
	provider::EndpointKind,
};

impl<C, M> Broker<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Builds the URL users are sent to in order to sign in.
	///
	/// Appends `response_type=code`, `client_id`, `redirect_uri`, `scope`, `state`, and the
	/// protected `resource` when configured, keeping any query the endpoint already carries.
	pub fn login_url(&self, redirect_uri: &str, state: &str) -> Result<Url> {
		let _span = self.flow_span(FlowKind::Redeem, "login_url").entered();
		let mut url = self
			.descriptor
			.endpoints
			.authorization
			.clone()
			.ok_or(ConfigError::MissingEndpoint { endpoint: EndpointKind::Authorization })?;

		{
			let mut query = url.query_pairs_mut();

			query
				.append_pair("response_type", "code")
				.append_pair("client_id", &self.client_id)
				.append_pair("redirect_uri", redirect_uri)
				.append_pair("scope", &self.descriptor.scope)
				.append_pair("state", state);

			if let Some(resource) = &self.descriptor.protected_resource {
				query.append_pair("resource", resource.as_str());
			}
		}

		Ok(url)
	}
}
