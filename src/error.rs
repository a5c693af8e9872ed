//! Crate-level error types shared by credentials, discovery, request building, and dispatch.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Token endpoint rejected or garbled a token exchange.
	#[error(transparent)]
	Auth(#[from] AuthError),
	/// Discovery directory or document could not be obtained.
	#[error(transparent)]
	Discovery(#[from] DiscoveryError),
	/// Method name or call arguments do not fit the discovery document.
	#[error(transparent)]
	Parameter(#[from] ParameterError),
	/// Target API rejected the built request.
	#[error(transparent)]
	Api(#[from] ApiError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
}

/// Token endpoint failures. Fatal to the in-flight call and never retried.
#[derive(Debug, ThisError)]
pub enum AuthError {
	/// Token endpoint answered with a non-success status.
	#[error("Token endpoint rejected the {grant} exchange: {payload}.")]
	Rejected {
		/// Grant label.
		grant: &'static str,
		/// HTTP status code, when available.
		status: Option<u16>,
		/// Provider error payload (JSON when parseable, otherwise the raw text).
		payload: Value,
	},
	/// Token endpoint responded with JSON that does not describe a token.
	#[error("Token endpoint returned malformed JSON for the {grant} exchange.")]
	MalformedResponse {
		/// Grant label.
		grant: &'static str,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Token endpoint response omitted `expires_in`.
	#[error("Token endpoint response is missing expires_in.")]
	MissingExpiresIn,
	/// Token endpoint returned a non-positive duration.
	#[error("The expires_in value must be positive.")]
	NonPositiveExpiresIn,
	/// Token endpoint returned a lifetime past the representable date range.
	#[error("The expires_in value {expires_in} is out of range.")]
	ExpiresInOutOfRange {
		/// Reported lifetime in seconds.
		expires_in: u64,
	},
	/// Service account assertion could not be signed.
	#[error("Service account assertion could not be signed.")]
	Signing(#[source] jsonwebtoken::errors::Error),
	/// Token exchange failed for a reason outside the categories above.
	#[error("Token endpoint returned an unexpected response: {message}.")]
	TokenEndpoint {
		/// Summary of the failure.
		message: String,
	},
}

/// Discovery directory and document failures.
#[derive(Debug, ThisError)]
pub enum DiscoveryError {
	/// Discovery document request failed with a non-success status.
	#[error("Discovery document for {service}:{version} is unavailable (status {status}).")]
	DocumentUnavailable {
		/// Service name.
		service: String,
		/// Service version.
		version: String,
		/// HTTP status code.
		status: u16,
	},
	/// Discovery directory request failed with a non-success status.
	#[error("Discovery directory is unavailable (status {status}).")]
	DirectoryUnavailable {
		/// HTTP status code.
		status: u16,
	},
	/// Directory lists no version for the service.
	#[error("Discovery directory lists no version for service `{service}`.")]
	UnknownService {
		/// Service name.
		service: String,
	},
	/// Discovery endpoint could not be reached.
	#[error("Discovery endpoint for `{target}` is unreachable.")]
	Unreachable {
		/// Service (and version, if known) being resolved.
		target: String,
		/// Transport failure.
		#[source]
		source: TransportError,
	},
	/// Discovery payload could not be parsed.
	#[error("Discovery payload for `{target}` is malformed.")]
	Malformed {
		/// Service (and version, if known) being resolved.
		target: String,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Method references a request schema the document does not define.
	#[error("Discovery document does not define schema `{schema}`.")]
	UnknownSchema {
		/// Referenced schema name.
		schema: String,
	},
}

/// Caller-side problems with method names and arguments.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum ParameterError {
	/// Method name does not follow `service:version.resource….verb`.
	#[error("Method name `{method}` is invalid: {reason}.")]
	InvalidMethodName {
		/// Offending method name.
		method: String,
		/// What is wrong with it.
		reason: &'static str,
	},
	/// Method path does not resolve inside the discovery document.
	#[error("Method `{method}` does not exist: no `{segment}` in the discovery document.")]
	UnknownMethod {
		/// Requested method name.
		method: String,
		/// First segment that failed to resolve.
		segment: String,
	},
	/// A percent-encoded path value would collapse into a dot segment.
	#[error("Method `{method}` cannot place `{value}` in the path parameter `{name}`.")]
	DotPathParameter {
		/// Requested method name.
		method: String,
		/// Placeholder name.
		name: String,
		/// Rejected value.
		value: String,
	},
	/// A path placeholder has no value in the call arguments.
	#[error("Method `{method}` requires the path parameter `{name}`.")]
	MissingPathParameter {
		/// Requested method name.
		method: String,
		/// Placeholder name.
		name: String,
	},
	/// Built URL could not be parsed.
	#[error("Method `{method}` produced an invalid URL `{url}`.")]
	InvalidUrl {
		/// Requested method name.
		method: String,
		/// Offending URL text.
		url: String,
	},
	/// Method does not declare a media upload endpoint.
	#[error("Method `{method}` does not support media upload.")]
	UploadUnsupported {
		/// Requested method name.
		method: String,
	},
}

/// Target API failures surfaced verbatim.
#[derive(Debug, ThisError)]
pub enum ApiError {
	/// API answered with a non-success status.
	#[error("{method} {url} failed with status {status}: {body}")]
	Rejected {
		/// HTTP verb.
		method: String,
		/// Request URL including query.
		url: String,
		/// HTTP status code.
		status: u16,
		/// Response body as received.
		body: String,
	},
	/// API answered with a body that is not JSON.
	#[error("{method} {url} returned a payload that is not JSON.")]
	MalformedPayload {
		/// HTTP verb.
		method: String,
		/// Request URL including query.
		url: String,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}

/// Configuration and validation failures.
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
	/// Header value contains characters HTTP does not allow.
	#[error("Header `{name}` cannot carry the provided value.")]
	InvalidHeader {
		/// Header name.
		name: &'static str,
	},
	/// Credential file could not be read.
	#[error("Credential file {path} could not be read.")]
	CredentialFile {
		/// Offending path.
		path: String,
		/// Underlying IO failure.
		#[source]
		source: std::io::Error,
	},
	/// Credential record does not match the shape implied by its fields.
	#[error("Credential record is invalid.")]
	InvalidCredential {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Credential record carries no usable key.
	#[error("Credential record has no service account, refresh token, or API key fields.")]
	UnrecognizedCredential,
	/// A credential or endpoint URL cannot be parsed.
	#[error("URL `{url}` is invalid.")]
	InvalidUrl {
		/// Offending URL text.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Service account private key is not a valid RSA PEM.
	#[error("Service account private key is not a valid RSA PEM.")]
	InvalidSigningKey(#[source] jsonwebtoken::errors::Error),
	/// Client configuration failed validation.
	#[error(transparent)]
	Client(#[from] crate::config::ClientConfigError),
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
	#[error("Network error occurred while calling {url}.")]
	Network {
		/// Target URL.
		url: String,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred during transport.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(url: impl Into<String>, src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Network { url: url.into(), source: Box::new(src) }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn api_error_keeps_body_verbatim() {
		let err: Error = ApiError::Rejected {
			method: "GET".into(),
			url: "https://example.com/a".into(),
			status: 404,
			body: "{\"error\":{\"code\":404}}".into(),
		}
		.into();

		assert!(matches!(err, Error::Api(ApiError::Rejected { status: 404, .. })));
		assert!(err.to_string().contains("{\"error\":{\"code\":404}}"));
	}

	#[test]
	fn auth_error_reports_provider_payload() {
		let err = AuthError::Rejected {
			grant: "refresh_token",
			status: Some(400),
			payload: serde_json::json!({ "error": "invalid_grant" }),
		};

		assert!(err.to_string().contains("invalid_grant"));
		assert!(err.to_string().contains("refresh_token"));
	}
}
