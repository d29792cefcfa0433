//! Gateway session state and the token exchange results applied to it.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Lifecycle status for a session's access token at a given instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
	/// Access token is still valid.
	Active,
	/// Access token expired and a refresh token is available.
	Refreshable,
	/// Access token expired and cannot be refreshed.
	Expired,
}

/// Mutable token state owned by a single gateway session.
///
/// The access token is valid while `now < expires_on`. An empty refresh token means the
/// session can not be refreshed and must go through the login flow again.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
	/// Bearer credential presented to upstream services.
	pub access_token: TokenSecret,
	/// Credential exchanged for a new access token; possibly single-use.
	pub refresh_token: TokenSecret,
	/// Absolute expiry of the access token, second precision.
	#[serde(with = "time::serde::timestamp")]
	pub expires_on: OffsetDateTime,
}
impl SessionState {
	/// Creates a session; `expires_on` is truncated to whole seconds.
	pub fn new(
		access_token: impl Into<String>,
		refresh_token: impl Into<String>,
		expires_on: OffsetDateTime,
	) -> Self {
		Self {
			access_token: TokenSecret::new(access_token),
			refresh_token: TokenSecret::new(refresh_token),
			expires_on: truncate_to_second(expires_on),
		}
	}

	/// Computes the lifecycle status at a given instant.
	pub fn status_at(&self, instant: OffsetDateTime) -> SessionStatus {
		if instant < self.expires_on {
			SessionStatus::Active
		} else if self.can_refresh() {
			SessionStatus::Refreshable
		} else {
			SessionStatus::Expired
		}
	}

	/// Returns `true` if the access token has expired at the provided instant.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		instant >= self.expires_on
	}

	/// Returns `true` if the access token is expired relative to the current clock.
	pub fn is_expired(&self) -> bool {
		self.is_expired_at(OffsetDateTime::now_utc())
	}

	/// Returns `true` when a refresh token is held.
	pub fn can_refresh(&self) -> bool {
		!self.refresh_token.is_empty()
	}

	/// Returns `true` when the session is expired at `instant` and holds a refresh token.
	pub fn needs_refresh_at(&self, instant: OffsetDateTime) -> bool {
		matches!(self.status_at(instant), SessionStatus::Refreshable)
	}

	/// Remaining lifetime at `instant`; negative once expired.
	pub fn expires_in_at(&self, instant: OffsetDateTime) -> Duration {
		self.expires_on - instant
	}

	/// Remaining lifetime relative to the current clock.
	pub fn expires_in(&self) -> Duration {
		self.expires_in_at(OffsetDateTime::now_utc())
	}

	/// Applies a refresh response in place.
	///
	/// A response without a refresh token keeps the one already held.
	pub fn apply_refresh(&mut self, result: TokenExchangeResult) {
		let TokenExchangeResult { access_token, refresh_token, expires_on } = result;

		self.access_token = access_token;
		self.expires_on = expires_on;

		if let Some(refresh_token) = refresh_token.filter(|secret| !secret.is_empty()) {
			self.refresh_token = refresh_token;
		}
	}
}
impl From<TokenExchangeResult> for SessionState {
	fn from(result: TokenExchangeResult) -> Self {
		Self {
			access_token: result.access_token,
			refresh_token: result.refresh_token.unwrap_or_default(),
			expires_on: result.expires_on,
		}
	}
}
impl Debug for SessionState {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SessionState")
			.field("access_token", &"<redacted>")
			.field("refresh_token", &(!self.refresh_token.is_empty()).then_some("<redacted>"))
			.field("expires_on", &self.expires_on)
			.finish()
	}
}
impl Display for SessionState {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(
			f,
			"Session{{access_token:<redacted> refresh_token:{} expires_on:{}}}",
			if self.can_refresh() { "<redacted>" } else { "<none>" },
			self.expires_on
		)
	}
}

/// Tokens returned by a single successful exchange against the token endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenExchangeResult {
	/// Newly issued access token.
	pub access_token: TokenSecret,
	/// Newly issued refresh token; `None` when the provider omitted it.
	pub refresh_token: Option<TokenSecret>,
	/// Absolute expiry: exchange completion time plus `expires_in`, truncated to seconds.
	pub expires_on: OffsetDateTime,
}
impl Debug for TokenExchangeResult {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenExchangeResult")
			.field("access_token", &"<redacted>")
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("expires_on", &self.expires_on)
			.finish()
	}
}

/// Drops the sub-second part of an instant.
pub(crate) fn truncate_to_second(instant: OffsetDateTime) -> OffsetDateTime {
	instant - Duration::nanoseconds(i64::from(instant.nanosecond()))
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	fn session(expires_on: OffsetDateTime, refresh: &str) -> SessionState {
		SessionState::new("access", refresh, expires_on)
	}

	#[test]
	fn status_transitions_cover_all_states() {
		let expires = macros::datetime!(2025-01-01 01:00 UTC);
		let refreshable = session(expires, "refresh");
		let stranded = session(expires, "");

		assert_eq!(
			refreshable.status_at(macros::datetime!(2025-01-01 00:59:59 UTC)),
			SessionStatus::Active
		);
		assert_eq!(refreshable.status_at(expires), SessionStatus::Refreshable);
		assert_eq!(stranded.status_at(expires), SessionStatus::Expired);
		assert!(refreshable.needs_refresh_at(expires));
		assert!(!stranded.needs_refresh_at(expires));
	}

	#[test]
	fn constructor_truncates_sub_second_expiry() {
		let session = session(macros::datetime!(2025-01-01 00:00:10.750 UTC), "r");

		assert_eq!(session.expires_on, macros::datetime!(2025-01-01 00:00:10 UTC));
		assert_eq!(
			session.expires_in_at(macros::datetime!(2025-01-01 00:00:00 UTC)),
			Duration::seconds(10)
		);
	}

	#[test]
	fn apply_refresh_preserves_refresh_token_when_omitted() {
		let mut state = session(macros::datetime!(2025-01-01 00:00 UTC), "refresh-1");
		let renewed = macros::datetime!(2025-01-01 01:00 UTC);

		state.apply_refresh(TokenExchangeResult {
			access_token: "access-2".into(),
			refresh_token: None,
			expires_on: renewed,
		});

		assert_eq!(state.access_token.expose(), "access-2");
		assert_eq!(state.refresh_token.expose(), "refresh-1");
		assert_eq!(state.expires_on, renewed);

		state.apply_refresh(TokenExchangeResult {
			access_token: "access-3".into(),
			refresh_token: Some("refresh-3".into()),
			expires_on: renewed,
		});

		assert_eq!(state.refresh_token.expose(), "refresh-3");
	}

	#[test]
	fn formatters_redact_tokens() {
		let state = SessionState::new(
			"access-secret",
			"refresh-secret",
			macros::datetime!(2025-01-01 00:00 UTC),
		);
		let debug = format!("{state:?}");
		let display = state.to_string();

		for rendered in [&debug, &display] {
			assert!(!rendered.contains("access-secret"));
			assert!(!rendered.contains("refresh-secret"));
		}

		assert!(display.contains("<redacted>"));
	}

	#[test]
	fn serde_uses_unix_timestamps() {
		let state = session(macros::datetime!(2025-01-01 00:00 UTC), "r");
		let json = serde_json::to_value(&state).expect("Session should serialize.");

		assert_eq!(json["expires_on"], 1_735_689_600);

		let back: SessionState = serde_json::from_value(json).expect("Session should deserialize.");

		assert_eq!(back, state);
	}
}
