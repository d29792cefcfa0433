//! Broker-level error types shared across flows, providers, and transports.
//!
//! The taxonomy separates malformed caller input ([`ValidationError`]), local setup problems
//! ([`ConfigError`]), an unreachable provider ([`TransportError`]), an explicit refusal
//! ([`Error::ProviderRejection`]), and a provider whose response shape changed
//! ([`ProtocolError`]). None of the messages carry token material.

// self
use crate::{_prelude::*, provider::EndpointKind};

/// Broker-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical broker error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Caller input is malformed; never retried.
	#[error(transparent)]
	Validation(#[from] ValidationError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Provider answered with a non-200 status.
	#[error("The {endpoint} endpoint rejected the request with HTTP {status}: {body}")]
	ProviderRejection {
		/// Endpoint that produced the response.
		endpoint: EndpointKind,
		/// HTTP status code returned by the provider.
		status: u16,
		/// Raw response body, kept verbatim for operator diagnostics.
		body: String,
	},
	/// Provider answered with a body the broker cannot interpret.
	#[error(transparent)]
	Protocol(#[from] ProtocolError),
}
impl Error {
	/// Returns the HTTP status carried by a provider rejection.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::ProviderRejection { status, .. } => Some(*status),
			_ => None,
		}
	}
}

/// Malformed caller input detected before any provider call.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum ValidationError {
	/// Authorization code redemption was attempted without a code.
	#[error("Authorization code is missing.")]
	MissingCode,
	/// A provider call needed an access token but the session has none.
	#[error("Session has no access token.")]
	MissingAccessToken,
}

/// Configuration failures raised by the broker.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Descriptor lacks an endpoint the requested operation needs.
	#[error("Descriptor does not configure the {endpoint} endpoint.")]
	MissingEndpoint {
		/// Endpoint that is not configured.
		endpoint: EndpointKind,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the {endpoint} endpoint.")]
	Network {
		/// Endpoint being called.
		endpoint: EndpointKind,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Request did not complete within the transport's deadline.
	#[error("Request to the {endpoint} endpoint timed out.")]
	Timeout {
		/// Endpoint being called.
		endpoint: EndpointKind,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling a provider endpoint.")]
	Io(#[from] std::io::Error),
	/// HTTP client failure without a structured error.
	#[error("HTTP client error occurred while calling the {endpoint} endpoint: {message}.")]
	Other {
		/// Endpoint being called.
		endpoint: EndpointKind,
		/// Client-supplied description.
		message: String,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(
		endpoint: EndpointKind,
		src: impl 'static + Send + Sync + std::error::Error,
	) -> Self {
		Self::Network { endpoint, source: Box::new(src) }
	}
}

/// Provider responses that do not match the expected shape.
#[derive(Debug, ThisError)]
pub enum ProtocolError {
	/// Response body is not the JSON document the endpoint promises.
	#[error("The {endpoint} endpoint returned malformed JSON.")]
	ResponseParse {
		/// Endpoint that produced the body.
		endpoint: EndpointKind,
		/// Structured parsing failure, including the offending path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Token response omitted `access_token` or sent an empty one.
	#[error("Token endpoint response is missing access_token.")]
	MissingAccessToken,
	/// Token response omitted `expires_in`.
	#[error("Token endpoint response is missing expires_in.")]
	MissingExpiresIn,
	/// Token response carried a zero or negative lifetime.
	#[error("The expires_in value must be positive.")]
	NonPositiveExpiresIn,
	/// Token response carried a lifetime that overflows the clock.
	#[error("The expires_in value exceeds the supported range.")]
	ExpiresInOutOfRange,
	/// Profile response omitted `email` or sent an empty one.
	#[error("Profile endpoint response is missing email.")]
	MissingEmail,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn rejection_message_keeps_body_and_status() {
		let err = Error::ProviderRejection {
			endpoint: EndpointKind::Token,
			status: 400,
			body: "{\"error\":\"invalid_grant\"}".into(),
		};

		assert_eq!(err.status(), Some(400));
		assert_eq!(
			err.to_string(),
			"The token endpoint rejected the request with HTTP 400: {\"error\":\"invalid_grant\"}"
		);
	}

	#[test]
	fn non_rejections_have_no_status() {
		let err = Error::from(ValidationError::MissingCode);

		assert_eq!(err.status(), None);
		assert_eq!(err.to_string(), "Authorization code is missing.");
	}
}
