//! Credential record shapes and the rules that tell them apart.

// std
use std::path::Path;
// self
use crate::{_prelude::*, auth::token::secret::TokenSecret, error::ConfigError};

/// Google's token endpoint, used when a record carries no `token_uri`.
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
/// Scopes requested for service accounts unless overridden.
pub const DEFAULT_SERVICE_ACCOUNT_SCOPES: [&str; 3] = [
	"https://www.googleapis.com/auth/drive",
	"https://www.googleapis.com/auth/youtube",
	"https://mail.google.com/",
];

/// Service account key file (`service_account.json`).
#[derive(Clone, Debug, Deserialize)]
pub struct ServiceAccountKey {
	/// Assertion issuer.
	pub client_email: String,
	/// RSA private key in PEM form.
	pub private_key: TokenSecret,
	/// Key identifier placed in the assertion header as `kid`.
	#[serde(default)]
	pub private_key_id: Option<String>,
	/// Token endpoint and assertion audience.
	#[serde(default = "default_token_uri")]
	pub token_uri: String,
}

/// Authorized user record holding a long-lived refresh token (`client_token.json`).
#[derive(Clone, Debug, Deserialize)]
pub struct AuthorizedUserKey {
	/// OAuth client identifier.
	pub client_id: String,
	/// OAuth client secret.
	pub client_secret: TokenSecret,
	/// Refresh token exchanged for access tokens.
	pub refresh_token: TokenSecret,
	/// Token endpoint.
	#[serde(default = "default_token_uri")]
	pub token_uri: String,
}

/// The three credential shapes a [`Credential`](crate::Credential) can hold.
#[derive(Clone, Debug)]
pub enum CredentialKind {
	/// Static API key sent as `x-goog-api-key`.
	ApiKey(TokenSecret),
	/// Service account exchanging signed assertions for tokens.
	ServiceAccount(ServiceAccountKey),
	/// OAuth client exchanging a refresh token for tokens.
	OAuthClient(AuthorizedUserKey),
}
impl CredentialKind {
	/// Wraps a raw API key.
	pub fn api_key(key: impl Into<String>) -> Self {
		Self::ApiKey(TokenSecret::new(key))
	}

	/// Interprets free-form input: an existing file path, inline JSON, or a raw API key.
	pub fn from_input(input: &str) -> Result<Self, ConfigError> {
		if input.is_empty() {
			return Err(ConfigError::UnrecognizedCredential);
		}

		let path = Path::new(input);

		if path.is_file() {
			return Self::from_path(path);
		}
		if let Ok(record @ Value::Object(_)) = serde_json::from_str::<Value>(input) {
			return Self::classify(&record);
		}

		Ok(Self::api_key(input))
	}

	/// Reads and classifies a JSON credential file.
	pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let text = std::fs::read_to_string(path).map_err(|source| ConfigError::CredentialFile {
			path: path.display().to_string(),
			source,
		})?;
		let mut de = serde_json::Deserializer::from_str(&text);
		let record: Value = serde_path_to_error::deserialize(&mut de)
			.map_err(|source| ConfigError::InvalidCredential { source })?;

		Self::classify(&record)
	}

	/// Alias of [`classify`](Self::classify) for already-parsed records.
	pub fn from_record(record: &Value) -> Result<Self, ConfigError> {
		Self::classify(record)
	}

	/// Decides the credential shape from the fields present.
	///
	/// `client_email` wins over `refresh_token`; records with neither fall back to an API key
	/// read from `api_key` or `key`. A bare JSON string is an API key.
	///
	/// An object with none of these fields is not taken as an API key. It fails with
	/// [`ConfigError::UnrecognizedCredential`], since no value in it can authenticate a request.
	pub fn classify(record: &Value) -> Result<Self, ConfigError> {
		let fields = match record {
			Value::String(key) if !key.is_empty() => return Ok(Self::api_key(key.as_str())),
			Value::Object(fields) => fields,
			_ => return Err(ConfigError::UnrecognizedCredential),
		};

		if fields.contains_key("client_email") {
			return serde_path_to_error::deserialize(record)
				.map(Self::ServiceAccount)
				.map_err(|source| ConfigError::InvalidCredential { source });
		}
		if fields.contains_key("refresh_token") {
			return serde_path_to_error::deserialize(record)
				.map(Self::OAuthClient)
				.map_err(|source| ConfigError::InvalidCredential { source });
		}

		["api_key", "key"]
			.into_iter()
			.find_map(|name| fields.get(name).and_then(Value::as_str).filter(|key| !key.is_empty()))
			.map(Self::api_key)
			.ok_or(ConfigError::UnrecognizedCredential)
	}

	/// Stable label for the variant.
	pub const fn as_str(&self) -> &'static str {
		match self {
			Self::ApiKey(_) => "api_key",
			Self::ServiceAccount(_) => "service_account",
			Self::OAuthClient(_) => "oauth_client",
		}
	}

	/// Token endpoint the credential refreshes against, if any.
	pub fn token_uri(&self) -> Option<&str> {
		match self {
			Self::ApiKey(_) => None,
			Self::ServiceAccount(key) => Some(&key.token_uri),
			Self::OAuthClient(key) => Some(&key.token_uri),
		}
	}
}

fn default_token_uri() -> String {
	DEFAULT_TOKEN_URI.into()
}
