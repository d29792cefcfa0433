//! Token endpoint request encoding and response parsing.

// crates.io
use oauth2::{
	HttpRequest,
	http::{
		Method, Request,
		header::{ACCEPT, CONTENT_TYPE},
	},
};
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	auth::{TokenExchangeResult, TokenSecret, session},
	error::{ConfigError, ProtocolError},
	provider::{EndpointKind, GrantType},
};

/// Ordered form parameters for a token endpoint POST.
pub(crate) struct TokenForm<'a>(Vec<(&'static str, &'a str)>);
impl<'a> TokenForm<'a> {
	pub(crate) fn new(grant: GrantType) -> Self {
		Self(vec![("grant_type", grant.as_str())])
	}

	pub(crate) fn param(mut self, key: &'static str, value: &'a str) -> Self {
		self.0.push((key, value));

		self
	}

	pub(crate) fn optional(self, key: &'static str, value: Option<&'a str>) -> Self {
		match value {
			Some(value) => self.param(key, value),
			None => self,
		}
	}

	/// Appends `client_id` and, for confidential clients, `client_secret`.
	pub(crate) fn client(self, client_id: &'a str, client_secret: Option<&'a str>) -> Self {
		self.param("client_id", client_id).optional("client_secret", client_secret)
	}

	pub(crate) fn encode(&self) -> String {
		form_urlencoded::Serializer::new(String::new()).extend_pairs(self.0.iter()).finish()
	}
}

#[derive(Deserialize)]
struct TokenResponseBody {
	access_token: Option<String>,
	expires_in: Option<i64>,
	refresh_token: Option<String>,
}

pub(crate) fn build_request(endpoint: &Url, form: &TokenForm<'_>) -> Result<HttpRequest> {
	Request::builder()
		.method(Method::POST)
		.uri(endpoint.as_str())
		.header(CONTENT_TYPE, "application/x-www-form-urlencoded")
		.header(ACCEPT, "application/json")
		.body(form.encode().into_bytes())
		.map_err(|e| ConfigError::from(e).into())
}

/// Parses a 200 token response received at `completed_at`.
///
/// An empty `refresh_token` is reported as absent.
pub(crate) fn parse_response(
	body: &[u8],
	completed_at: OffsetDateTime,
) -> Result<TokenExchangeResult> {
	let mut de = serde_json::Deserializer::from_slice(body);
	let parsed: TokenResponseBody = serde_path_to_error::deserialize(&mut de)
		.map_err(|source| ProtocolError::ResponseParse { endpoint: EndpointKind::Token, source })?;
	let access_token = parsed
		.access_token
		.filter(|token| !token.is_empty())
		.ok_or(ProtocolError::MissingAccessToken)?;
	let expires_in = parsed.expires_in.ok_or(ProtocolError::MissingExpiresIn)?;

	if expires_in <= 0 {
		return Err(ProtocolError::NonPositiveExpiresIn.into());
	}

	let expires_on = completed_at
		.checked_add(Duration::seconds(expires_in))
		.ok_or(ProtocolError::ExpiresInOutOfRange)?;

	Ok(TokenExchangeResult {
		access_token: TokenSecret::new(access_token),
		refresh_token: parsed.refresh_token.filter(|token| !token.is_empty()).map(TokenSecret::new),
		expires_on: session::truncate_to_second(expires_on),
	})
}
