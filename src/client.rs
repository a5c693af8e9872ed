//! Discovery-driven API client: name a method, pass arguments, get the JSON payload back.

// self
use crate::{
	_prelude::*,
	config::ClientConfig,
	credential::Credential,
	discovery::{self, DirectoryItem, DirectoryList, DocumentCache, MethodDescriptor, MethodName, ServiceDocument},
	error::{ApiError, ConfigError, DiscoveryError},
	http::{
		HttpResponse, HttpTransport,
		http::{self as h, HeaderMap, StatusCode, header},
	},
	obs::{self, CallKind},
	request::{self, Attachment, BuiltRequest, CallArgs, multipart},
	resolve::ChannelResolver,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

/// [`ApiClient`] specialized for the crate's default reqwest transport.
#[cfg(feature = "reqwest")]
pub type ReqwestApiClient = ApiClient<ReqwestHttpClient>;

/// Builds and sends requests for any method a discovery document describes.
///
/// Documents are fetched on first use and kept in a [`DocumentCache`] that can be shared
/// between clients. Every dispatch asks the credential for fresh headers.
pub struct ApiClient<T>
where
	T: ?Sized + HttpTransport,
{
	credential: Arc<Credential<T>>,
	transport: Arc<T>,
	cache: Arc<DocumentCache>,
	config: ClientConfig,
}
impl<T> ApiClient<T>
where
	T: ?Sized + HttpTransport,
{
	/// Client using the credential's transport and the default configuration.
	pub fn new(credential: impl Into<Arc<Credential<T>>>) -> Self {
		Self::with_config(credential, ClientConfig::default())
	}

	/// Client using the credential's transport and `config`.
	pub fn with_config(credential: impl Into<Arc<Credential<T>>>, config: ClientConfig) -> Self {
		let credential = credential.into();
		let transport = credential.transport().clone();

		Self { credential, transport, cache: Default::default(), config }
	}

	/// Shares an existing document cache.
	pub fn with_cache(mut self, cache: Arc<DocumentCache>) -> Self {
		self.cache = cache;

		self
	}

	/// Credential behind every dispatch.
	pub fn credential(&self) -> &Arc<Credential<T>> {
		&self.credential
	}

	/// Document cache.
	pub fn cache(&self) -> &Arc<DocumentCache> {
		&self.cache
	}

	/// Client configuration.
	pub fn config(&self) -> &ClientConfig {
		&self.config
	}

	/// Channel resolver sharing this client's transport and configuration.
	pub fn channel_resolver(&self) -> ChannelResolver<T> {
		ChannelResolver::new(self.transport.clone(), self.config.clone())
	}

	/// Every service version listed by the discovery directory.
	pub async fn list_services(&self) -> Result<Vec<DirectoryItem>> {
		Ok(self.fetch_directory().await?.items)
	}

	/// Latest version of `service`, from the cache or the discovery directory.
	pub async fn latest_version(&self, service: &str) -> Result<String> {
		if let Some(version) = self.cache.latest_version(service) {
			return Ok(version);
		}

		let directory = self.fetch_directory().await?;

		directory
			.latest_version(service)
			.map(str::to_owned)
			.ok_or_else(|| DiscoveryError::UnknownService { service: service.to_owned() }.into())
	}

	/// Returns the cached document of `service`, fetching it on a miss.
	///
	/// Without a version the latest one is looked up first.
	pub async fn ensure_document(
		&self,
		service: &str,
		version: Option<&str>,
	) -> Result<Arc<ServiceDocument>> {
		let version = match version {
			Some(version) => version.to_owned(),
			None => self.latest_version(service).await?,
		};

		if let Some(document) = self.cache.get(service, &version) {
			return Ok(document);
		}

		let document = obs::observe(CallKind::Discovery, "ensure_document", async {
			discovery::fetch_document(self.transport.as_ref(), &self.config, service, &version)
				.await
				.map_err(Error::from)
		})
		.await?;

		Ok(self.cache.insert(service, &version, document))
	}

	/// Descriptor of the named method.
	pub async fn method(&self, name: &str) -> Result<MethodDescriptor> {
		let (name, document) = self.resolve_method(name).await?;

		Ok(document.method(&name)?.clone())
	}

	/// Scopes that authorize the named method.
	pub async fn method_scopes(&self, name: &str) -> Result<Vec<String>> {
		Ok(self.method(name).await?.scopes)
	}

	/// Every scope `service` declares.
	pub async fn service_scopes(&self, service: &str, version: Option<&str>) -> Result<Vec<String>> {
		Ok(self.ensure_document(service, version).await?.scopes())
	}

	/// Builds the request for `name` without sending it.
	pub async fn build(&self, name: &str, args: &CallArgs) -> Result<BuiltRequest> {
		let (name, document) = self.resolve_method(name).await?;

		request::build_request(&document, &name, args)
	}

	/// Builds the media upload request for `name` without sending it.
	pub async fn build_upload(&self, name: &str, args: &CallArgs) -> Result<BuiltRequest> {
		let (name, document) = self.resolve_method(name).await?;

		request::build_upload_request(&document, &name, args)
	}

	/// Sends `request` with fresh credential headers.
	///
	/// With an attachment the body goes out as `multipart/related`: the JSON body (or `{}`) as
	/// metadata followed by the attachment bytes. `204` and empty bodies yield `None`.
	pub async fn dispatch(
		&self,
		request: &BuiltRequest,
		attachment: Option<&Attachment>,
	) -> Result<Option<Value>> {
		obs::observe(CallKind::Dispatch, "dispatch", async {
			let url = request.full_url();
			let mut builder = h::Request::builder()
				.method(request.http_method.as_str())
				.uri(url.as_str())
				.header(header::ACCEPT, "application/json");
			let body = match (attachment, &request.body) {
				(Some(attachment), body) => {
					let metadata = body.clone().unwrap_or_else(|| Value::Object(Map::new()));
					let encoded = multipart::related(&metadata, attachment);

					builder = builder.header(header::CONTENT_TYPE, encoded.content_type);

					encoded.bytes
				},
				(None, Some(body)) => {
					builder = builder.header(header::CONTENT_TYPE, "application/json");

					body.to_string().into_bytes()
				},
				(None, None) => Vec::new(),
			};
			let response = self.send(builder, body).await?;
			let status = response.status();

			if !status.is_success() {
				return Err(rejected(&request.http_method, &url, &response));
			}
			if status == StatusCode::NO_CONTENT || response.body().iter().all(u8::is_ascii_whitespace)
			{
				return Ok(None);
			}

			let mut de = serde_json::Deserializer::from_slice(response.body());

			serde_path_to_error::deserialize(&mut de).map(Some).map_err(|source| {
				ApiError::MalformedPayload {
					method: request.http_method.clone(),
					url: url.to_string(),
					source,
				}
				.into()
			})
		})
		.await
	}

	/// Builds and dispatches `name` in one step.
	pub async fn call(&self, name: &str, args: &CallArgs) -> Result<Option<Value>> {
		let request = self.build(name, args).await?;

		self.dispatch(&request, None).await
	}

	/// Authenticated GET returning the raw response bytes (e.g. `…?alt=media`).
	pub async fn download(&self, url: &str) -> Result<Vec<u8>> {
		obs::observe(CallKind::Dispatch, "download", async {
			let parsed = Url::parse(url).map_err(|source| ConfigError::InvalidUrl {
				url: url.to_owned(),
				source,
			})?;
			let builder = h::Request::builder().method(h::Method::GET).uri(parsed.as_str());
			let response = self.send(builder, Vec::new()).await?;

			if !response.status().is_success() {
				return Err(rejected("GET", &parsed, &response));
			}

			Ok(response.into_body())
		})
		.await
	}

	pub(crate) async fn resolve_method(&self, raw: &str) -> Result<(MethodName, Arc<ServiceDocument>)> {
		let mut name = MethodName::parse(raw)?;

		if name.version().is_none() {
			let version = self.latest_version(name.service()).await?;

			name = name.with_version(version);
		}

		let document = self.ensure_document(name.service(), name.version()).await?;

		Ok((name, document))
	}

	async fn send(&self, mut builder: h::request::Builder, body: Vec<u8>) -> Result<HttpResponse> {
		let headers: HeaderMap = self.credential.headers().await?;

		if let Some(map) = builder.headers_mut() {
			map.extend(headers);
		}

		let request = builder.body(body).map_err(ConfigError::from)?;

		Ok(self.transport.execute(request).await?)
	}

	async fn fetch_directory(&self) -> Result<DirectoryList> {
		let directory = obs::observe(CallKind::Discovery, "fetch_directory", async {
			discovery::fetch_directory(self.transport.as_ref(), &self.config).await.map_err(Error::from)
		})
		.await?;

		for item in &directory.items {
			if let Some(version) = directory.latest_version(&item.name) {
				self.cache.set_latest_version(&item.name, version);
			}
		}

		Ok(directory)
	}
}
#[cfg(feature = "reqwest")]
impl ApiClient<ReqwestHttpClient> {
	/// Client over a fresh reqwest transport for a credential given as a file path, inline JSON
	/// record, or raw API key.
	pub fn from_input(input: &str) -> Result<Self> {
		let client = ReqwestClient::builder().build().map_err(ConfigError::from)?;
		let transport = Arc::new(ReqwestHttpClient::with_client(client));

		Ok(Self::new(Credential::from_input(input, transport)?))
	}
}
impl<T> Debug for ApiClient<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiClient")
			.field("credential", &self.credential)
			.field("cached_documents", &self.cache.len())
			.field("config", &self.config)
			.finish()
	}
}

fn rejected(method: &str, url: &Url, response: &HttpResponse) -> Error {
	ApiError::Rejected {
		method: method.to_owned(),
		url: url.to_string(),
		status: response.status().as_u16(),
		body: String::from_utf8_lossy(response.body()).into_owned(),
	}
	.into()
}
