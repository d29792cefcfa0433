//! Provider descriptor data structures shared by all flows.

/// Builder API for assembling provider descriptors.
pub mod builder;

pub use builder::*;

// self
use crate::{_prelude::*, auth::ProviderId};

/// Scope requested when the descriptor does not override it.
pub const DEFAULT_SCOPE: &str = "basic";

/// Provider endpoints the broker talks to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointKind {
	/// Login (authorization) endpoint users are redirected to.
	Authorization,
	/// Token endpoint used for code and refresh exchanges.
	Token,
	/// Profile endpoint returning the user's identity.
	Profile,
	/// Endpoint probed to validate an access token.
	Validate,
}
impl EndpointKind {
	/// Returns a stable label suitable for span fields and messages.
	pub const fn as_str(self) -> &'static str {
		match self {
			EndpointKind::Authorization => "authorization",
			EndpointKind::Token => "token",
			EndpointKind::Profile => "profile",
			EndpointKind::Validate => "validate",
		}
	}
}
impl Display for EndpointKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Endpoint set declared by a provider descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEndpoints {
	/// Login endpoint; only needed to build login URLs.
	pub authorization: Option<Url>,
	/// Token endpoint used for exchanges and refreshes.
	pub token: Url,
	/// Profile endpoint used for identity lookups.
	pub profile: Url,
	/// Endpoint probed by session validation; defaults to the profile endpoint.
	pub validate: Url,
}
impl ProviderEndpoints {
	/// Returns the URL configured for `kind`, if any.
	pub fn get(&self, kind: EndpointKind) -> Option<&Url> {
		match kind {
			EndpointKind::Authorization => self.authorization.as_ref(),
			EndpointKind::Token => Some(&self.token),
			EndpointKind::Profile => Some(&self.profile),
			EndpointKind::Validate => Some(&self.validate),
		}
	}
}

/// Immutable provider descriptor consumed by flows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
	/// Descriptor identifier.
	pub id: ProviderId,
	/// Endpoint definitions exposed by the provider.
	pub endpoints: ProviderEndpoints,
	/// Scope requested on the login URL.
	pub scope: String,
	/// Protected resource sent as `resource` on code redemption and login.
	pub protected_resource: Option<Url>,
}
impl ProviderDescriptor {
	/// Creates a new builder for the provided identifier.
	pub fn builder(id: ProviderId) -> ProviderDescriptorBuilder {
		ProviderDescriptorBuilder::new(id)
	}
}
