//! Token state replaced wholesale on every successful refresh.

// self
use crate::{
	_prelude::*,
	auth::{ScopeSet, token::secret::TokenSecret},
	error::AuthError,
};

/// Fraction of the server-reported lifetime a token is trusted for.
pub const EXPIRY_MARGIN: f64 = 0.97;
/// Header carrying API keys.
pub const API_KEY_HEADER: &str = "x-goog-api-key";

/// Access token plus the metadata needed to build headers and decide on refreshes.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenState {
	/// Access token (or API key) value.
	pub access_token: TokenSecret,
	/// Scheme placed before the token in `Authorization` headers; the header name for API keys.
	pub token_type: String,
	/// Scopes granted to the token.
	pub scope: ScopeSet,
	/// Instant after which the token must be refreshed; `None` never expires.
	pub expires_at: Option<OffsetDateTime>,
}
impl TokenState {
	/// State for an API key: never expires and carries no scopes.
	pub fn api_key(key: TokenSecret) -> Self {
		Self {
			access_token: key,
			token_type: API_KEY_HEADER.into(),
			scope: ScopeSet::default(),
			expires_at: None,
		}
	}

	/// State for a freshly issued token, trusting `expires_in_secs` with the safety margin.
	pub fn issued(
		access_token: impl Into<String>,
		token_type: &str,
		scope: ScopeSet,
		expires_in_secs: Option<u64>,
		now: OffsetDateTime,
	) -> Result<Self, AuthError> {
		let expires_in = expires_in_secs.ok_or(AuthError::MissingExpiresIn)?;

		if expires_in == 0 {
			return Err(AuthError::NonPositiveExpiresIn);
		}

		let expires_at = Duration::checked_seconds_f64(expires_in as f64 * EXPIRY_MARGIN)
			.and_then(|lifetime| now.checked_add(lifetime))
			.ok_or(AuthError::ExpiresInOutOfRange { expires_in })?;

		Ok(Self {
			access_token: TokenSecret::new(access_token),
			token_type: canonical_token_type(token_type),
			scope,
			expires_at: Some(expires_at),
		})
	}

	/// Returns `true` while the token may still be presented at `instant`.
	pub fn is_valid_at(&self, instant: OffsetDateTime) -> bool {
		self.expires_at.is_none_or(|expiry| instant <= expiry)
	}
}
impl Debug for TokenState {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenState")
			.field("access_token", &self.access_token)
			.field("token_type", &self.token_type)
			.field("scope", &self.scope)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}

fn canonical_token_type(raw: &str) -> String {
	if raw.eq_ignore_ascii_case("bearer") { "Bearer".into() } else { raw.to_owned() }
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[test]
	fn issued_state_applies_three_percent_margin() {
		let now = macros::datetime!(2025-01-01 00:00 UTC);
		let state = TokenState::issued("ya29.a", "bearer", ScopeSet::default(), Some(3600), now)
			.expect("Positive lifetimes should build a token state.");

		assert_eq!(state.expires_at, Some(now + Duration::seconds(3492)));
		assert_eq!(state.token_type, "Bearer");
		assert!(state.is_valid_at(now + Duration::seconds(3492)));
		assert!(!state.is_valid_at(now + Duration::seconds(3493)));
	}

	#[test]
	fn issued_state_rejects_missing_or_zero_lifetime() {
		let now = macros::datetime!(2025-01-01 00:00 UTC);

		assert!(matches!(
			TokenState::issued("t", "Bearer", ScopeSet::default(), None, now),
			Err(AuthError::MissingExpiresIn)
		));
		assert!(matches!(
			TokenState::issued("t", "Bearer", ScopeSet::default(), Some(0), now),
			Err(AuthError::NonPositiveExpiresIn)
		));
	}

	#[test]
	fn issued_state_rejects_unrepresentable_lifetime() {
		let now = macros::datetime!(2025-01-01 00:00 UTC);

		for expires_in in [1_000_000_000_000, u64::MAX] {
			assert!(matches!(
				TokenState::issued("t", "Bearer", ScopeSet::default(), Some(expires_in), now),
				Err(AuthError::ExpiresInOutOfRange { expires_in: reported }) if reported == expires_in
			));
		}
	}

	#[test]
	fn api_key_state_never_expires() {
		let state = TokenState::api_key(TokenSecret::new("AIza"));

		assert!(state.is_valid_at(macros::datetime!(9999-12-31 23:59 UTC)));
		assert!(state.scope.is_empty());
		assert_eq!(state.token_type, "x-goog-api-key");
	}
}
