//! Gateway-facing operations implemented on the [`Broker`] facade.

pub mod common;
pub mod refresh;

mod login;
mod redeem;
mod validate;

pub use common::*;
pub use refresh::*;

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	cache::ExpiringCache,
	http::ProviderHttpClient,
	oauth::TransportErrorMapper,
	provider::ProviderDescriptor,
};
#[cfg(feature = "reqwest")]
use crate::{http::ReqwestHttpClient, oauth::ReqwestTransportErrorMapper};

#[cfg(feature = "reqwest")]
/// Broker specialized for the crate's default reqwest transport stack.
pub type ReqwestBroker = Broker<ReqwestHttpClient, ReqwestTransportErrorMapper>;

pub(crate) type RefreshRecords = Arc<Mutex<ExpiringCache<String, TokenSecret>>>;

/// Manages session tokens against a single provider descriptor.
///
/// The broker owns the HTTP client, the provider descriptor, and the client credentials, plus the
/// state that keeps concurrent refreshes of one stale access token down to a single exchange.
/// Clones share that state, so a gateway can hand a clone to every request handler.
#[derive(Clone)]
pub struct Broker<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// HTTP client wrapper used for every outbound provider request.
	pub http_client: Arc<C>,
	/// Mapper applied to transport-layer errors before surfacing them to callers.
	pub transport_mapper: Arc<M>,
	/// Provider descriptor that defines endpoints, scope, and the protected resource.
	pub descriptor: ProviderDescriptor,
	/// OAuth 2.0 client identifier sent with every exchange.
	pub client_id: String,
	/// Optional client secret sent with every exchange.
	pub client_secret: Option<String>,
	/// Shared counters for refresh outcomes.
	pub refresh_metrics: Arc<RefreshMetrics>,
	refresh_policy: RefreshPolicy,
	refresh_guards: KeyedGuards,
	refresh_records: RefreshRecords,
}
impl<C, M> Broker<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a broker that reuses the caller-provided transport + mapper pair.
	pub fn with_http_client(
		descriptor: ProviderDescriptor,
		client_id: impl Into<String>,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		let refresh_policy = RefreshPolicy::default();

		Self {
			http_client: http_client.into(),
			transport_mapper: mapper.into(),
			descriptor,
			client_id: client_id.into(),
			client_secret: None,
			refresh_metrics: Default::default(),
			refresh_records: refresh_policy.build_records(),
			refresh_policy,
			refresh_guards: Default::default(),
		}
	}

	/// Sets or replaces the client secret.
	pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
		self.client_secret = Some(secret.into());

		self
	}

	/// Replaces the refresh deduplication policy.
	///
	/// Records published under the previous policy are discarded.
	pub fn with_refresh_policy(mut self, policy: RefreshPolicy) -> Self {
		self.refresh_records = policy.build_records();
		self.refresh_policy = policy;

		self
	}

	/// Returns the active refresh deduplication policy.
	pub fn refresh_policy(&self) -> &RefreshPolicy {
		&self.refresh_policy
	}

	/// Drops expired refresh records; returns how many were removed.
	///
	/// Lookups already skip expired records, so this only bounds memory between refresh bursts.
	pub fn purge_refresh_records(&self) -> usize {
		self.refresh_records.lock().purge_expired()
	}
}
#[cfg(feature = "reqwest")]
impl Broker<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates a new broker for the provided descriptor and client identifier.
	///
	/// The broker provisions its own reqwest-backed transport with
	/// [`ReqwestHttpClient::DEFAULT_TIMEOUT`], so a stalled provider fails the call instead of
	/// hanging it. Use [`Broker::with_http_client`] to supply a differently tuned client and
	/// [`Broker::with_client_secret`] to attach the client secret.
	pub fn new(descriptor: ProviderDescriptor, client_id: impl Into<String>) -> Result<Self> {
		let http_client = ReqwestHttpClient::with_timeout(ReqwestHttpClient::DEFAULT_TIMEOUT)?;

		Ok(Self::with_http_client(
			descriptor,
			client_id,
			http_client,
			Arc::new(ReqwestTransportErrorMapper),
		))
	}
}
impl<C, M> Debug for Broker<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Broker")
			.field("descriptor", &self.descriptor)
			.field("client_id", &self.client_id)
			.field("client_secret_set", &self.client_secret.is_some())
			.field("refresh_policy", &self.refresh_policy)
			.finish()
	}
}
