//! Credential material that must stay out of logs.

// self
use crate::_prelude::*;

/// Access token, API key, refresh token, client secret, or private key.
///
/// Formatting prints a fixed mask; [`TokenSecret::expose`] is the only way to read the value.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps `value`.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Raw value, for building headers and request bodies.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Returns `true` when the wrapped value is empty.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "TokenSecret(***; {} bytes)", self.0.len())
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("***")
	}
}
