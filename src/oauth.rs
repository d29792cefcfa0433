//! Provider call plumbing: transport error mapping, token exchanges, and profile lookups.
//!
//! Requests are assembled from `oauth2::http` types. Token responses are read without requiring
//! `token_type`, and rejections keep their raw body.

pub use oauth2;

pub(crate) mod profile;
pub(crate) mod token;

// crates.io
use oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse, http::StatusCode};
// self
use crate::{
	_prelude::*, auth::TokenExchangeResult, http::ProviderHttpClient, provider::EndpointKind,
};
#[cfg(feature = "reqwest")] use crate::error::{ConfigError, TransportError};

/// Maps HTTP transport failures into broker [`Error`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted while calling `endpoint` into a broker error.
	fn map_transport_error(&self, endpoint: EndpointKind, error: HttpClientError<E>) -> Error;
}

/// Default mapper for reqwest-backed transports.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		endpoint: EndpointKind,
		err: HttpClientError<ReqwestError>,
	) -> Error {
		match err {
			HttpClientError::Reqwest(inner) => map_reqwest_error(endpoint, *inner),
			HttpClientError::Http(inner) => ConfigError::from(inner).into(),
			HttpClientError::Io(inner) => TransportError::Io(inner).into(),
			HttpClientError::Other(message) => TransportError::Other { endpoint, message }.into(),
			_ => TransportError::Other { endpoint, message: "unrecognized client failure".into() }
				.into(),
		}
	}
}

/// Borrowed transport + mapper pair used by flows for a single provider call.
pub(crate) struct ProviderClient<'a, C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	http_client: &'a C,
	error_mapper: &'a M,
}
impl<'a, C, M> ProviderClient<'a, C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	pub(crate) fn new(http_client: &'a C, error_mapper: &'a M) -> Self {
		Self { http_client, error_mapper }
	}

	/// POSTs `form` to the token endpoint and parses the issued tokens.
	pub(crate) async fn exchange(
		&self,
		endpoint: &Url,
		form: &token::TokenForm<'_>,
	) -> Result<TokenExchangeResult> {
		let request = token::build_request(endpoint, form)?;
		let response = self.send(EndpointKind::Token, request).await?;
		let body = expect_ok(EndpointKind::Token, response)?;

		token::parse_response(&body, OffsetDateTime::now_utc())
	}

	/// GETs `endpoint` with a bearer token and returns the body of a 200 response.
	pub(crate) async fn get_authorized(
		&self,
		kind: EndpointKind,
		endpoint: &Url,
		access_token: &str,
	) -> Result<Vec<u8>> {
		let request = profile::build_request(endpoint, access_token)?;
		let response = self.send(kind, request).await?;

		expect_ok(kind, response)
	}

	async fn send(&self, kind: EndpointKind, request: HttpRequest) -> Result<HttpResponse> {
		let handle = self.http_client.handle();

		handle.call(request).await.map_err(|err| self.error_mapper.map_transport_error(kind, err))
	}
}

fn expect_ok(kind: EndpointKind, response: HttpResponse) -> Result<Vec<u8>> {
	let status = response.status();
	let body = response.into_body();

	if status != StatusCode::OK {
		return Err(Error::ProviderRejection {
			endpoint: kind,
			status: status.as_u16(),
			body: String::from_utf8_lossy(&body).into_owned(),
		});
	}

	Ok(body)
}

#[cfg(feature = "reqwest")]
fn map_reqwest_error(endpoint: EndpointKind, err: ReqwestError) -> Error {
	if err.is_builder() {
		return ConfigError::from(err).into();
	}
	if err.is_timeout() {
		return TransportError::Timeout { endpoint }.into();
	}

	TransportError::network(endpoint, err).into()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn response(status: u16, body: &str) -> HttpResponse {
		let mut response = HttpResponse::new(body.as_bytes().to_vec());

		*response.status_mut() =
			StatusCode::from_u16(status).expect("Status fixture should be a valid HTTP status.");

		response
	}

	#[test]
	fn only_200_is_accepted() {
		let body = expect_ok(EndpointKind::Token, response(200, "{}"))
			.expect("HTTP 200 should be accepted.");

		assert_eq!(body, b"{}");

		let err = expect_ok(EndpointKind::Token, response(201, "{}"))
			.expect_err("Any status besides 200 is a rejection.");

		assert_eq!(err.status(), Some(201));
	}

	#[test]
	fn rejection_keeps_raw_body() {
		let err = expect_ok(EndpointKind::Profile, response(401, "token expired"))
			.expect_err("HTTP 401 should be rejected.");

		match err {
			Error::ProviderRejection { endpoint, status, body } => {
				assert_eq!(endpoint, EndpointKind::Profile);
				assert_eq!(status, 401);
				assert_eq!(body, "token expired");
			},
			other => panic!("Unexpected error variant: {other:?}."),
		}
	}

	#[cfg(feature = "reqwest")]
	#[test]
	fn reqwest_mapper_classifies_plain_failures() {
		let mapper = ReqwestTransportErrorMapper;
		let err = mapper.map_transport_error(
			EndpointKind::Token,
			HttpClientError::Other("connection reset".into()),
		);

		assert!(matches!(
			err,
			Error::Transport(TransportError::Other { endpoint: EndpointKind::Token, .. })
		));

		let err = mapper.map_transport_error(
			EndpointKind::Validate,
			HttpClientError::Io(std::io::Error::other("broken pipe")),
		);

		assert!(matches!(err, Error::Transport(TransportError::Io(_))));
	}
}
