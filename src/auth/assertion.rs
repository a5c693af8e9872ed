//! Signed JWT assertions for the service account bearer grant.

// crates.io
use jsonwebtoken::{Algorithm, EncodingKey, Header};
// self
use crate::{
	_prelude::*,
	auth::{ScopeSet, ServiceAccountKey},
	error::{AuthError, ConfigError},
};

/// Grant type posted alongside the signed assertion.
pub const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
/// Lifetime claimed by each assertion.
pub const ASSERTION_LIFETIME: Duration = Duration::hours(1);

/// Claims carried by a service account assertion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionClaims {
	/// Service account email.
	pub iss: String,
	/// Space-delimited scopes requested.
	pub scope: String,
	/// Token endpoint the assertion is addressed to.
	pub aud: String,
	/// Issued-at, seconds since the epoch.
	pub iat: i64,
	/// Expiry, seconds since the epoch.
	pub exp: i64,
}
impl AssertionClaims {
	/// Claims for `key` requesting `scopes`, issued at `now`.
	pub fn new(key: &ServiceAccountKey, scopes: &ScopeSet, now: OffsetDateTime) -> Self {
		Self {
			iss: key.client_email.clone(),
			scope: scopes.joined(),
			aud: key.token_uri.clone(),
			iat: now.unix_timestamp(),
			exp: (now + ASSERTION_LIFETIME).unix_timestamp(),
		}
	}
}

/// Signs an RS256 assertion with the key's private key, tagging the header with its `kid`.
pub fn sign_assertion(key: &ServiceAccountKey, scopes: &ScopeSet, now: OffsetDateTime) -> Result<String> {
	let encoding_key = EncodingKey::from_rsa_pem(key.private_key.expose().as_bytes())
		.map_err(ConfigError::InvalidSigningKey)?;
	let mut header = Header::new(Algorithm::RS256);

	header.kid = key.private_key_id.clone();

	let claims = AssertionClaims::new(key, scopes, now);

	jsonwebtoken::encode(&header, &claims, &encoding_key).map_err(|e| AuthError::Signing(e).into())
}
