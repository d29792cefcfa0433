//! Provider-facing configuration.
//!
//! `descriptor` exposes validated metadata ([`ProviderDescriptor`]) covering the login, token,
//! profile, and validation endpoints plus the scope and protected resource sent to the
//! provider. `grant` names the two token grants the broker performs.

pub mod descriptor;
pub mod grant;

pub use descriptor::*;
pub use grant::*;
