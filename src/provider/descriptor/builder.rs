// self
use crate::{
	_prelude::*,
	auth::ProviderId,
	provider::{DEFAULT_SCOPE, EndpointKind, ProviderDescriptor, ProviderEndpoints},
};

/// Errors raised while constructing or validating descriptors.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum ProviderDescriptorError {
	/// Token endpoint is mandatory for all flows.
	#[error("Missing token endpoint.")]
	MissingTokenEndpoint,
	/// Profile endpoint is mandatory for identity lookups and validation.
	#[error("Missing profile endpoint.")]
	MissingProfileEndpoint,
	/// Endpoints must use HTTPS.
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: EndpointKind,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Reject scopes containing control characters.
	#[error("Scope must only contain printable characters.")]
	InvalidScope,
}

/// Builder for [`ProviderDescriptor`] values.
#[derive(Debug)]
pub struct ProviderDescriptorBuilder {
	/// Identifier for the descriptor being constructed.
	pub id: ProviderId,
	/// Optional login endpoint.
	pub authorization_endpoint: Option<Url>,
	/// Token endpoint used for exchanges and refreshes.
	pub token_endpoint: Option<Url>,
	/// Profile endpoint used for identity lookups.
	pub profile_endpoint: Option<Url>,
	/// Optional validation endpoint; falls back to the profile endpoint.
	pub validate_endpoint: Option<Url>,
	/// Scope override; falls back to [`DEFAULT_SCOPE`].
	pub scope: Option<String>,
	/// Optional protected resource identifier.
	pub protected_resource: Option<Url>,
	/// Accepts plain-HTTP endpoints (local development only).
	pub allow_insecure_endpoints: bool,
}
impl ProviderDescriptorBuilder {
	/// Creates a new builder seeded with the provided identifier.
	pub fn new(id: ProviderId) -> Self {
		Self {
			id,
			authorization_endpoint: None,
			token_endpoint: None,
			profile_endpoint: None,
			validate_endpoint: None,
			scope: None,
			protected_resource: None,
			allow_insecure_endpoints: false,
		}
	}

	/// Sets the login endpoint.
	pub fn authorization_endpoint(mut self, url: Url) -> Self {
		self.authorization_endpoint = Some(url);

		self
	}

	/// Sets the token endpoint.
	pub fn token_endpoint(mut self, url: Url) -> Self {
		self.token_endpoint = Some(url);

		self
	}

	/// Sets the profile endpoint.
	pub fn profile_endpoint(mut self, url: Url) -> Self {
		self.profile_endpoint = Some(url);

		self
	}

	/// Sets a dedicated validation endpoint.
	pub fn validate_endpoint(mut self, url: Url) -> Self {
		self.validate_endpoint = Some(url);

		self
	}

	/// Overrides the requested scope.
	pub fn scope(mut self, scope: impl Into<String>) -> Self {
		self.scope = Some(scope.into());

		self
	}

	/// Sets the protected resource sent on code redemption.
	pub fn protected_resource(mut self, url: Url) -> Self {
		self.protected_resource = Some(url);

		self
	}

	/// Allows `http://` endpoints, e.g. for a provider running on localhost.
	pub fn allow_insecure_endpoints(mut self, allow: bool) -> Self {
		self.allow_insecure_endpoints = allow;

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<ProviderDescriptor, ProviderDescriptorError> {
		let token = self.token_endpoint.ok_or(ProviderDescriptorError::MissingTokenEndpoint)?;
		let profile =
			self.profile_endpoint.ok_or(ProviderDescriptorError::MissingProfileEndpoint)?;
		let validate = self.validate_endpoint.unwrap_or_else(|| profile.clone());
		let endpoints =
			ProviderEndpoints { authorization: self.authorization_endpoint, token, profile, validate };
		let descriptor = ProviderDescriptor {
			id: self.id,
			endpoints,
			scope: self.scope.unwrap_or_else(|| DEFAULT_SCOPE.into()),
			protected_resource: self.protected_resource,
		};

		if !self.allow_insecure_endpoints {
			validate_endpoints(&descriptor.endpoints)?;
		}
		if descriptor.scope.chars().any(char::is_control) {
			return Err(ProviderDescriptorError::InvalidScope);
		}

		Ok(descriptor)
	}
}

fn validate_endpoints(endpoints: &ProviderEndpoints) -> Result<(), ProviderDescriptorError> {
	for kind in [
		EndpointKind::Authorization,
		EndpointKind::Token,
		EndpointKind::Profile,
		EndpointKind::Validate,
	] {
		if let Some(url) = endpoints.get(kind) {
			validate_endpoint(kind, url)?;
		}
	}

	Ok(())
}

fn validate_endpoint(kind: EndpointKind, url: &Url) -> Result<(), ProviderDescriptorError> {
	if url.scheme() != "https" {
		Err(ProviderDescriptorError::InsecureEndpoint { endpoint: kind, url: url.to_string() })
	} else {
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("Failed to parse descriptor fixture URL.")
	}

	fn builder() -> ProviderDescriptorBuilder {
		ProviderDescriptor::builder(
			ProviderId::new("portal").expect("Provider identifier fixture should be valid."),
		)
	}

	#[test]
	fn defaults_fill_validate_endpoint_and_scope() {
		let descriptor = builder()
			.token_endpoint(url("https://id.example.com/oauth2/access_token"))
			.profile_endpoint(url("https://id.example.com/api/user"))
			.build()
			.expect("Descriptor with token and profile endpoints should build.");

		assert_eq!(descriptor.endpoints.validate, descriptor.endpoints.profile);
		assert_eq!(descriptor.scope, DEFAULT_SCOPE);
		assert!(descriptor.endpoints.authorization.is_none());
		assert!(descriptor.protected_resource.is_none());
	}

	#[test]
	fn missing_required_endpoints_are_rejected() {
		let err = builder()
			.profile_endpoint(url("https://id.example.com/api/user"))
			.build()
			.expect_err("Token endpoint is required.");

		assert_eq!(err, ProviderDescriptorError::MissingTokenEndpoint);

		let err = builder()
			.token_endpoint(url("https://id.example.com/token"))
			.build()
			.expect_err("Profile endpoint is required.");

		assert_eq!(err, ProviderDescriptorError::MissingProfileEndpoint);
	}

	#[test]
	fn insecure_endpoints_need_explicit_opt_in() {
		let make = || {
			builder()
				.authorization_endpoint(url("http://localhost:8080/authorize"))
				.token_endpoint(url("https://id.example.com/token"))
				.profile_endpoint(url("https://id.example.com/api/user"))
		};
		let err = make().build().expect_err("Plain-HTTP endpoints should be rejected.");

		assert!(matches!(
			err,
			ProviderDescriptorError::InsecureEndpoint { endpoint: EndpointKind::Authorization, .. }
		));

		make()
			.allow_insecure_endpoints(true)
			.build()
			.expect("Opt-in should accept plain-HTTP endpoints.");
	}

	#[test]
	fn control_characters_in_scope_are_rejected() {
		let err = builder()
			.token_endpoint(url("https://id.example.com/token"))
			.profile_endpoint(url("https://id.example.com/api/user"))
			.scope("basic\nadmin")
			.build()
			.expect_err("Scope with a newline should be rejected.");

		assert_eq!(err, ProviderDescriptorError::InvalidScope);
	}
}
