//! Discovery service access: directory listing, document fetch, and the typed document model.

pub mod cache;
pub mod directory;
pub mod document;
pub mod method;

pub use cache::DocumentCache;
pub use directory::{DirectoryItem, DirectoryList};
pub use document::*;
pub use method::MethodName;

// self
use crate::{
	_prelude::*,
	config::ClientConfig,
	error::DiscoveryError,
	http::{HttpResponse, HttpTransport, http as h, is_success},
};

/// Fetches the directory listing of every public service version.
pub(crate) async fn fetch_directory<T>(
	transport: &T,
	config: &ClientConfig,
) -> Result<DirectoryList, DiscoveryError>
where
	T: ?Sized + HttpTransport,
{
	let target = "directory";
	let response = get(transport, config.discovery_endpoint.as_str(), target).await?;

	if !is_success(&response) {
		return Err(DiscoveryError::DirectoryUnavailable { status: response.status().as_u16() });
	}

	parse(&response, target)
}

/// Fetches the document of one service version.
pub(crate) async fn fetch_document<T>(
	transport: &T,
	config: &ClientConfig,
	service: &str,
	version: &str,
) -> Result<ServiceDocument, DiscoveryError>
where
	T: ?Sized + HttpTransport,
{
	let target = DocumentCache::key(service, version);
	let url = config.document_url(service, version);
	let response = get(transport, &url, &target).await?;

	if !is_success(&response) {
		return Err(DiscoveryError::DocumentUnavailable {
			service: service.to_owned(),
			version: version.to_owned(),
			status: response.status().as_u16(),
		});
	}

	parse(&response, &target)
}

async fn get<T>(transport: &T, url: &str, target: &str) -> Result<HttpResponse, DiscoveryError>
where
	T: ?Sized + HttpTransport,
{
	let unreachable =
		|source| DiscoveryError::Unreachable { target: target.to_owned(), source };
	let request = h::Request::builder()
		.method(h::Method::GET)
		.uri(url)
		.header(h::header::ACCEPT, "application/json")
		.body(Vec::new())
		.map_err(|e| unreachable(crate::error::TransportError::network(url, e)))?;

	transport.execute(request).await.map_err(unreachable)
}

fn parse<D>(response: &HttpResponse, target: &str) -> Result<D, DiscoveryError>
where
	D: for<'de> Deserialize<'de>,
{
	let mut de = serde_json::Deserializer::from_slice(response.body());

	serde_path_to_error::deserialize(&mut de)
		.map_err(|source| DiscoveryError::Malformed { target: target.to_owned(), source })
}
