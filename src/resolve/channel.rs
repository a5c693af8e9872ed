//! Concurrent resolution of free-form channel URLs to channel ids.

// std
use std::sync::LazyLock;
// crates.io
use async_lock::Semaphore;
use futures::future;
use regex::Regex;
// self
use crate::{
	_prelude::*,
	config::ClientConfig,
	error::ConfigError,
	http::{
		HttpResponse, HttpTransport, is_success,
		http::{self as h, header},
	},
	obs::{self, CallKind, CallSpan},
};

static CHANNEL_URL: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"youtube\.com/channel/([-_0-9A-Za-z]{24})")
		.expect("Channel URL pattern should compile.")
});
static CHANNEL_PAGE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r#""(?:externalChannelId|externalId)":"([-_0-9A-Za-z]{24})""#)
		.expect("Channel page pattern should compile.")
});

/// Channel id embedded in a `youtube.com/channel/<id>` URL.
pub fn channel_id_in_url(url: &str) -> Option<&str> {
	CHANNEL_URL.captures(url).and_then(|c| c.get(1)).map(|m| m.as_str())
}

/// Channel id declared by a channel page; the last declaration wins.
pub fn channel_id_in_page(body: &str) -> Option<&str> {
	CHANNEL_PAGE.captures_iter(body).filter_map(|c| c.get(1)).last().map(|m| m.as_str())
}

/// Resolves channel URLs (`/channel/…`, `/c/…`, `/@handle`, …) with bounded concurrency.
///
/// URLs that already carry an id never hit the network. The rest are fetched with a consent
/// cookie and browser headers, at most [`ClientConfig::resolve_concurrency`] at a time, each
/// under its own [`ClientConfig::resolve_timeout`].
///
/// The timeout uses Tokio's timer, so [`resolve`](Self::resolve) must run inside a Tokio
/// runtime with the time driver enabled.
pub struct ChannelResolver<T>
where
	T: ?Sized + HttpTransport,
{
	transport: Arc<T>,
	config: ClientConfig,
	admission: Semaphore,
}
impl<T> ChannelResolver<T>
where
	T: ?Sized + HttpTransport,
{
	/// Creates a resolver over `transport`.
	pub fn new(transport: impl Into<Arc<T>>, config: ClientConfig) -> Self {
		let admission = Semaphore::new(config.resolve_concurrency.max(1));

		Self { transport: transport.into(), config, admission }
	}

	/// Resolves every URL; the output has one slot per input, in input order.
	pub async fn resolve<S>(&self, urls: &[S]) -> Vec<Option<String>>
	where
		S: AsRef<str>,
	{
		let span = CallSpan::new(CallKind::Resolve, "channel.resolve");

		span.instrument(future::join_all(urls.iter().map(|url| self.resolve_one(url.as_ref()))))
			.await
	}

	/// Resolves a single URL. Failures, timeouts and misses all yield `None`.
	pub async fn resolve_one(&self, url: &str) -> Option<String> {
		if let Some(id) = channel_id_in_url(url) {
			return Some(id.to_owned());
		}

		let _permit = self.admission.acquire().await;

		match tokio::time::timeout(self.config.resolve_timeout, self.fetch_id(url)).await {
			Ok(Ok(id)) => id,
			Ok(Err(e)) => {
				obs::warn_absorbed(CallKind::Resolve, url, &e);

				None
			},
			Err(elapsed) => {
				obs::warn_absorbed(CallKind::Resolve, url, &elapsed);

				None
			},
		}
	}

	async fn fetch_id(&self, url: &str) -> Result<Option<String>> {
		let mut response = self.get(url).await?;

		if !is_success(&response) {
			response = self.get(&url.replace("/c/", "/")).await?;
		}

		Ok(channel_id_in_page(&String::from_utf8_lossy(response.body())).map(str::to_owned))
	}

	async fn get(&self, url: &str) -> Result<HttpResponse> {
		let request = h::Request::builder()
			.method(h::Method::GET)
			.uri(url)
			.header(header::ACCEPT, "*/*")
			.header(header::USER_AGENT, self.config.resolve_user_agent.as_str())
			.header(header::COOKIE, self.config.resolve_cookie.as_str())
			.body(Vec::new())
			.map_err(ConfigError::from)?;

		Ok(self.transport.execute(request).await?)
	}
}
impl<T> Debug for ChannelResolver<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ChannelResolver")
			.field("concurrency", &self.config.resolve_concurrency)
			.field("timeout", &self.config.resolve_timeout)
			.finish()
	}
}
