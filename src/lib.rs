//! OAuth 2.0 session token lifecycle for reverse-proxy gateways: authorization-code redemption,
//! fail-closed session validation, and deduplicated refreshes that survive single-use refresh
//! tokens under concurrent load.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod cache;
pub mod error;
pub mod flows;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod provider;
#[cfg(feature = "reqwest")]
#[doc(hidden)]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests and demos.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::ProviderId,
		flows::Broker,
		http::ReqwestHttpClient,
		oauth::ReqwestTransportErrorMapper,
		provider::ProviderDescriptor,
	};

	/// Broker type alias used by reqwest-backed integration tests.
	pub type ReqwestTestBroker = Broker<ReqwestHttpClient, ReqwestTransportErrorMapper>;

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Builds a descriptor whose authorize/token/profile endpoints live under `base`.
	///
	/// Plain-HTTP endpoints are accepted so the descriptor works with any mock server.
	pub fn descriptor_for(base: &str) -> ProviderDescriptor {
		let base = base.trim_end_matches('/');
		let url = |path: &str| {
			Url::parse(&format!("{base}{path}")).expect("Failed to parse mock provider URL.")
		};

		ProviderDescriptor::builder(
			ProviderId::new("mock-provider").expect("Failed to build mock provider identifier."),
		)
		.authorization_endpoint(url("/oauth2/authorize"))
		.token_endpoint(url("/oauth2/access_token"))
		.profile_endpoint(url("/api/user"))
		.allow_insecure_endpoints(true)
		.build()
		.expect("Failed to build mock provider descriptor.")
	}

	/// Constructs a [`Broker`] backed by the reqwest transport used across integration tests.
	pub fn build_reqwest_test_broker(
		descriptor: ProviderDescriptor,
		client_id: &str,
		client_secret: &str,
	) -> ReqwestTestBroker {
		Broker::with_http_client(
			descriptor,
			client_id,
			test_reqwest_http_client(),
			ReqwestTransportErrorMapper,
		)
		.with_client_secret(client_secret)
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		hash::Hash,
		str::FromStr,
		sync::Arc,
	};
	#[cfg(feature = "reqwest")]
	pub use std::pin::Pin;

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
