//! Client configuration: discovery endpoint, batching limits, and resolver tuning.

// std
use std::time::Duration as StdDuration;
// self
use crate::_prelude::*;

/// Public discovery service root; document URLs are `{root}{service}/{version}/rest`.
pub const DEFAULT_DISCOVERY_ENDPOINT: &str = "https://www.googleapis.com/discovery/v1/apis/";
/// Per-request identifier cap enforced by list-by-id endpoints.
pub const MAX_BATCH_SIZE: usize = 50;
/// Default ceiling of simultaneous in-flight resolver fetches.
pub const DEFAULT_RESOLVE_CONCURRENCY: usize = 50;
/// Default per-fetch resolver timeout.
pub const DEFAULT_RESOLVE_TIMEOUT: StdDuration = StdDuration::from_secs(10);
/// Browser user agent sent with channel page fetches.
pub const DEFAULT_RESOLVE_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_1) \
	AppleWebKit/537.36 (KHTML, like Gecko) Chrome/110.0.5400.117 Safari/537.36";
/// Consent cookie that skips the interstitial on channel pages.
pub const DEFAULT_RESOLVE_COOKIE: &str = "CONSENT=YES+yt.463627267.en-GB+FX+553";

/// Errors raised while validating a [`ClientConfig`].
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum ClientConfigError {
	/// Endpoints must use HTTPS unless they point at a loopback host.
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Discovery root must end with `/` so service paths join under it.
	#[error("The discovery endpoint must end with a slash: {url}.")]
	DiscoveryEndpointNotDirectory {
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Batch size outside `1..=50`.
	#[error("Batch size must be between 1 and {MAX_BATCH_SIZE}, got {size}.")]
	BatchSizeOutOfRange {
		/// Rejected size.
		size: usize,
	},
	/// Resolver concurrency of zero would never admit a fetch.
	#[error("Resolver concurrency must be positive.")]
	ZeroConcurrency,
	/// Resolver timeout of zero would fail every fetch.
	#[error("Resolver timeout must be positive.")]
	ZeroTimeout,
}

/// Immutable client configuration consumed by [`ApiClient`](crate::ApiClient) and
/// [`ChannelResolver`](crate::resolve::ChannelResolver).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
	/// Discovery directory root (also the prefix of every document URL).
	pub discovery_endpoint: Url,
	/// Identifiers per list-by-id request.
	pub batch_size: usize,
	/// Simultaneous in-flight resolver fetches.
	pub resolve_concurrency: usize,
	/// Independent timeout applied to each resolver fetch.
	pub resolve_timeout: StdDuration,
	/// User agent sent with resolver fetches.
	pub resolve_user_agent: String,
	/// Cookie header sent with resolver fetches.
	pub resolve_cookie: String,
}
impl ClientConfig {
	/// Returns a builder seeded with the defaults.
	pub fn builder() -> ClientConfigBuilder {
		ClientConfigBuilder::default()
	}

	/// Document URL for a `(service, version)` pair.
	pub fn document_url(&self, service: &str, version: &str) -> String {
		format!("{}{service}/{version}/rest", self.discovery_endpoint)
	}

	fn validate(&self) -> Result<(), ClientConfigError> {
		validate_endpoint("discovery", &self.discovery_endpoint)?;

		if !self.discovery_endpoint.path().ends_with('/') {
			return Err(ClientConfigError::DiscoveryEndpointNotDirectory {
				url: self.discovery_endpoint.to_string(),
			});
		}
		if !(1..=MAX_BATCH_SIZE).contains(&self.batch_size) {
			return Err(ClientConfigError::BatchSizeOutOfRange { size: self.batch_size });
		}
		if self.resolve_concurrency == 0 {
			return Err(ClientConfigError::ZeroConcurrency);
		}
		if self.resolve_timeout.is_zero() {
			return Err(ClientConfigError::ZeroTimeout);
		}

		Ok(())
	}
}
impl Default for ClientConfig {
	fn default() -> Self {
		Self {
			discovery_endpoint: default_discovery_endpoint(),
			batch_size: MAX_BATCH_SIZE,
			resolve_concurrency: DEFAULT_RESOLVE_CONCURRENCY,
			resolve_timeout: DEFAULT_RESOLVE_TIMEOUT,
			resolve_user_agent: DEFAULT_RESOLVE_USER_AGENT.into(),
			resolve_cookie: DEFAULT_RESOLVE_COOKIE.into(),
		}
	}
}

/// Builder for [`ClientConfig`] values.
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
	config: ClientConfig,
}
impl ClientConfigBuilder {
	/// Overrides the discovery directory root.
	pub fn discovery_endpoint(mut self, url: Url) -> Self {
		self.config.discovery_endpoint = url;

		self
	}

	/// Overrides the list-by-id batch size.
	pub fn batch_size(mut self, size: usize) -> Self {
		self.config.batch_size = size;

		self
	}

	/// Overrides the resolver concurrency ceiling.
	pub fn resolve_concurrency(mut self, limit: usize) -> Self {
		self.config.resolve_concurrency = limit;

		self
	}

	/// Overrides the per-fetch resolver timeout.
	pub fn resolve_timeout(mut self, timeout: StdDuration) -> Self {
		self.config.resolve_timeout = timeout;

		self
	}

	/// Overrides the resolver user agent.
	pub fn resolve_user_agent(mut self, agent: impl Into<String>) -> Self {
		self.config.resolve_user_agent = agent.into();

		self
	}

	/// Overrides the resolver cookie header.
	pub fn resolve_cookie(mut self, cookie: impl Into<String>) -> Self {
		self.config.resolve_cookie = cookie.into();

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ClientConfig, ClientConfigError> {
		self.config.validate()?;

		Ok(self.config)
	}
}

fn default_discovery_endpoint() -> Url {
	Url::parse(DEFAULT_DISCOVERY_ENDPOINT).expect("Default discovery endpoint should parse.")
}

fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), ClientConfigError> {
	let loopback = matches!(url.host_str(), Some("localhost" | "127.0.0.1" | "[::1]"));

	if url.scheme() == "https" || (url.scheme() == "http" && loopback) {
		Ok(())
	} else {
		Err(ClientConfigError::InsecureEndpoint { endpoint: name, url: url.to_string() })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("Test URL should parse.")
	}

	#[test]
	fn defaults_pass_validation() {
		let config = ClientConfig::builder().build().expect("Default config should be valid.");

		assert_eq!(config.batch_size, 50);
		assert_eq!(config.resolve_concurrency, 50);
		assert_eq!(config.resolve_timeout, StdDuration::from_secs(10));
		assert_eq!(
			config.document_url("sheets", "v4"),
			"https://www.googleapis.com/discovery/v1/apis/sheets/v4/rest"
		);
	}

	#[test]
	fn rejects_insecure_remote_endpoints_but_allows_loopback() {
		let err = ClientConfig::builder()
			.discovery_endpoint(url("http://example.com/apis/"))
			.build()
			.expect_err("Plain HTTP to a remote host must be rejected.");

		assert!(matches!(err, ClientConfigError::InsecureEndpoint { endpoint: "discovery", .. }));

		let config = ClientConfig::builder()
			.discovery_endpoint(url("http://127.0.0.1:8080/apis/"))
			.build()
			.expect("Loopback endpoints are allowed over HTTP.");

		assert_eq!(config.document_url("drive", "v3"), "http://127.0.0.1:8080/apis/drive/v3/rest");
	}

	#[test]
	fn rejects_out_of_range_limits() {
		assert_eq!(
			ClientConfig::builder().batch_size(51).build(),
			Err(ClientConfigError::BatchSizeOutOfRange { size: 51 })
		);
		assert_eq!(
			ClientConfig::builder().batch_size(0).build(),
			Err(ClientConfigError::BatchSizeOutOfRange { size: 0 })
		);
		assert_eq!(
			ClientConfig::builder().resolve_concurrency(0).build(),
			Err(ClientConfigError::ZeroConcurrency)
		);
		assert_eq!(
			ClientConfig::builder().resolve_timeout(StdDuration::ZERO).build(),
			Err(ClientConfigError::ZeroTimeout)
		);
		assert!(matches!(
			ClientConfig::builder().discovery_endpoint(url("https://example.com/apis")).build(),
			Err(ClientConfigError::DiscoveryEndpointNotDirectory { .. })
		));
	}
}
