//! Bearer-authenticated profile requests.

// crates.io
use oauth2::{
	HttpRequest,
	http::{
		Method, Request,
		header::{ACCEPT, AUTHORIZATION},
	},
};
// self
use crate::{
	_prelude::*,
	error::{ConfigError, ProtocolError},
	provider::EndpointKind,
};

#[derive(Deserialize)]
struct ProfileBody {
	#[serde(default, alias = "Email")]
	email: Option<String>,
}

pub(crate) fn build_request(endpoint: &Url, access_token: &str) -> Result<HttpRequest> {
	Request::builder()
		.method(Method::GET)
		.uri(endpoint.as_str())
		.header(AUTHORIZATION, format!("Bearer {access_token}"))
		.header(ACCEPT, "application/json")
		.body(Vec::new())
		.map_err(|e| ConfigError::from(e).into())
}

/// Reads the non-empty `email` field of a profile document.
pub(crate) fn parse_email(body: &[u8]) -> Result<String> {
	let mut de = serde_json::Deserializer::from_slice(body);
	let parsed: ProfileBody = serde_path_to_error::deserialize(&mut de)
		.map_err(|source| ProtocolError::ResponseParse { endpoint: EndpointKind::Profile, source })?;

	parsed.email.filter(|email| !email.is_empty()).ok_or_else(|| ProtocolError::MissingEmail.into())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn request_carries_bearer_and_accept_headers() {
		let endpoint =
			Url::parse("https://id.example.com/api/user").expect("Endpoint fixture should parse.");
		let request = build_request(&endpoint, "A1").expect("Profile request should build.");

		assert_eq!(request.method(), Method::GET);
		assert_eq!(
			request.headers().get(AUTHORIZATION).map(|value| value.as_bytes()),
			Some(&b"Bearer A1"[..])
		);
		assert_eq!(
			request.headers().get(ACCEPT).map(|value| value.as_bytes()),
			Some(&b"application/json"[..])
		);
		assert!(request.body().is_empty());
	}

	#[test]
	fn email_is_read_from_either_casing() {
		assert_eq!(
			parse_email(br#"{"email":"ops@example.com","name":"Ops"}"#)
				.expect("Lowercase email should parse."),
			"ops@example.com"
		);
		assert_eq!(
			parse_email(br#"{"Email":"ops@example.com"}"#).expect("Capitalized email should parse."),
			"ops@example.com"
		);
	}

	#[test]
	fn missing_or_empty_email_is_a_protocol_error() {
		assert!(matches!(
			parse_email(br#"{"name":"Ops"}"#),
			Err(Error::Protocol(ProtocolError::MissingEmail))
		));
		assert!(matches!(
			parse_email(br#"{"email":""}"#),
			Err(Error::Protocol(ProtocolError::MissingEmail))
		));
		assert!(matches!(
			parse_email(b"not json"),
			Err(Error::Protocol(ProtocolError::ResponseParse { endpoint: EndpointKind::Profile, .. }))
		));
	}
}
