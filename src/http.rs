//! Transport primitives shared by token exchanges, discovery fetches, and API dispatch.
//!
//! [`HttpTransport`] is the crate's only dependency on an HTTP stack. Requests and responses use
//! the `http` crate types re-exported by `oauth2`, so the same transport also drives the
//! refresh-token grant through [`OAuthHandle`]. The optional [`ReqwestHttpClient`] is the
//! bundled implementation.

// crates.io
use oauth2::{AsyncHttpClient, HttpClientError};
// self
use crate::{_prelude::*, error::TransportError};

pub use oauth2::{HttpRequest, HttpResponse, http};

/// Boxed future returned by [`HttpTransport::execute`].
pub type HttpFuture<'a> =
	Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + 'a + Send + Sync>>;

/// Abstraction over HTTP transports capable of executing a fully built request.
///
/// Implementations must be `Send + Sync + 'static` so one transport can be shared by the
/// credential, the document cache, and concurrent resolver fetches. The returned future must
/// own whatever it needs so it stays `Send + Sync` for the lifetime of the in-flight request.
/// Non-success statuses are returned as responses, never as errors.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Sends `request` and resolves with the full response.
	fn execute(&self, request: HttpRequest) -> HttpFuture<'_>;
}

/// Adapter that lets the `oauth2` crate send token requests through an [`HttpTransport`].
///
/// Remembers the status of the last response so token endpoint errors can report it.
pub struct OAuthHandle<'t, T>
where
	T: ?Sized + HttpTransport,
{
	transport: &'t T,
	status: RwLock<Option<u16>>,
}
impl<'t, T> OAuthHandle<'t, T>
where
	T: ?Sized + HttpTransport,
{
	/// Borrows `transport` for the duration of one token exchange.
	pub fn new(transport: &'t T) -> Self {
		Self { transport, status: RwLock::new(None) }
	}

	/// Status code of the most recent response, if one arrived.
	pub fn last_status(&self) -> Option<u16> {
		*self.status.read()
	}
}
impl<'c, 't, T> AsyncHttpClient<'c> for OAuthHandle<'t, T>
where
	T: ?Sized + HttpTransport,
	't: 'c,
{
	type Error = HttpClientError<TransportError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		let fut = self.transport.execute(request);

		Box::pin(async move {
			let response = fut.await.map_err(|e| HttpClientError::Reqwest(Box::new(e)))?;

			*self.status.write() = Some(response.status().as_u16());

			Ok(response)
		})
	}
}

/// Returns `true` for 2xx statuses.
pub(crate) fn is_success(response: &HttpResponse) -> bool {
	response.status().is_success()
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// The default client follows redirects, which channel page lookups rely on.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestHttpClient {
	fn execute(&self, request: HttpRequest) -> HttpFuture<'_> {
		let client = self.0.clone();

		Box::pin(async move {
			let url = request.uri().to_string();
			let request = reqwest::Request::try_from(request)
				.map_err(|e| TransportError::network(url.clone(), e))?;
			let response =
				client.execute(request).await.map_err(|e| TransportError::network(url.clone(), e))?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let body = response.bytes().await.map_err(|e| TransportError::network(url, e))?;
			let mut response_new = HttpResponse::new(body.to_vec());

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}
