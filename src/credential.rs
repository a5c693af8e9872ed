//! Credential manager: holds one credential and keeps a valid token on hand.
//!
//! [`Credential::headers`] is the single entry point callers need. It refreshes when the stored
//! token has passed its (margin-adjusted) expiry, then renders the header that authenticates a
//! request. Refreshes are single-flight: concurrent callers that observe an expired token queue
//! on one guard, and whoever enters after a successful exchange reuses its result instead of
//! contacting the token endpoint again.

mod metrics;

pub use metrics::{RefreshCounts, RefreshMetrics};

// self
use crate::{
	_prelude::*,
	auth::{
		API_KEY_HEADER, Clock, CredentialKind, DEFAULT_SERVICE_ACCOUNT_SCOPES, ScopeSet,
		SystemClock, TokenSecret, TokenState,
	},
	error::ConfigError,
	http::{
		HttpTransport,
		http::{HeaderMap, HeaderName, HeaderValue, header::AUTHORIZATION},
	},
	oauth::TokenExchange,
	obs::{self, CallKind},
};

/// One credential plus its current token state.
pub struct Credential<T>
where
	T: ?Sized + HttpTransport,
{
	kind: CredentialKind,
	transport: Arc<T>,
	clock: Arc<dyn Clock>,
	scopes: RwLock<ScopeSet>,
	state: RwLock<Option<TokenState>>,
	guard: AsyncMutex<()>,
	metrics: Arc<RefreshMetrics>,
}
impl<T> Credential<T>
where
	T: ?Sized + HttpTransport,
{
	/// Wraps `kind`. No token endpoint is contacted until the first refresh.
	///
	/// Service accounts request the default scope list; API keys are valid immediately.
	pub fn new(kind: CredentialKind, transport: impl Into<Arc<T>>) -> Self {
		let scopes = match &kind {
			CredentialKind::ServiceAccount(_) =>
				ScopeSet::new(DEFAULT_SERVICE_ACCOUNT_SCOPES).unwrap_or_default(),
			_ => ScopeSet::default(),
		};
		let state = match &kind {
			CredentialKind::ApiKey(key) => Some(TokenState::api_key(key.clone())),
			_ => None,
		};

		Self {
			kind,
			transport: transport.into(),
			clock: Arc::new(SystemClock),
			scopes: RwLock::new(scopes),
			state: RwLock::new(state),
			guard: AsyncMutex::new(()),
			metrics: Default::default(),
		}
	}

	/// Builds a credential from a file path, inline JSON record, or raw API key.
	pub fn from_input(input: &str, transport: impl Into<Arc<T>>) -> Result<Self> {
		Ok(Self::new(CredentialKind::from_input(input)?, transport))
	}

	/// Replaces the scopes requested by service account assertions.
	///
	/// Any cached token is discarded so the next refresh requests the new scopes.
	pub fn with_scopes(self, scopes: ScopeSet) -> Self {
		if matches!(self.kind, CredentialKind::ApiKey(_)) {
			return self;
		}

		*self.scopes.write() = scopes;
		*self.state.write() = None;

		self
	}

	/// Swaps the time source used for expiry decisions.
	pub fn with_clock(mut self, clock: impl 'static + Clock) -> Self {
		self.clock = Arc::new(clock);

		self
	}

	/// Ensures a valid token is stored and returns it.
	///
	/// No-op while the stored token is valid. Token endpoint failures surface as
	/// [`AuthError`](crate::error::AuthError) and leave the previous state in place.
	pub async fn refresh(&self) -> Result<TokenState> {
		if let Some(state) = self.valid_state() {
			self.metrics.record_reuse();

			return Ok(state);
		}

		obs::observe(CallKind::Refresh, "credential.refresh", async {
			let _singleflight = self.guard.lock().await;

			if let Some(state) = self.valid_state() {
				self.metrics.record_reuse();

				return Ok(state);
			}

			let now = self.clock.now();
			let requested = self.scopes.read().clone();
			let exchange = TokenExchange::new(self.transport.as_ref());

			self.metrics.record_exchange();

			let result = match &self.kind {
				CredentialKind::ApiKey(key) => Ok(TokenState::api_key(key.clone())),
				CredentialKind::ServiceAccount(key) => exchange.jwt_bearer(key, &requested, now).await,
				CredentialKind::OAuthClient(key) => exchange.refresh_token(key, &requested, now).await,
			};

			match result {
				Ok(state) => {
					self.metrics.record_success();

					if !matches!(self.kind, CredentialKind::ApiKey(_)) {
						*self.scopes.write() = state.scope.clone();
					}

					*self.state.write() = Some(state.clone());

					Ok(state)
				},
				Err(e) => {
					self.metrics.record_failure();

					Err(e)
				},
			}
		})
		.await
	}

	/// Refreshes if needed and renders the authentication header.
	///
	/// Tokens produce `Authorization: <type> <token>`; API keys produce `x-goog-api-key: <key>`.
	pub async fn headers(&self) -> Result<HeaderMap> {
		let state = self.refresh().await?;
		let mut headers = HeaderMap::new();

		if matches!(self.kind, CredentialKind::ApiKey(_)) {
			let mut value = HeaderValue::from_str(state.access_token.expose())
				.map_err(|_| ConfigError::InvalidHeader { name: API_KEY_HEADER })?;

			value.set_sensitive(true);
			headers.insert(HeaderName::from_static(API_KEY_HEADER), value);
		} else {
			let mut value = HeaderValue::from_str(&format!(
				"{} {}",
				state.token_type,
				state.access_token.expose()
			))
			.map_err(|_| ConfigError::InvalidHeader { name: "authorization" })?;

			value.set_sensitive(true);
			headers.insert(AUTHORIZATION, value);
		}

		Ok(headers)
	}

	/// Refreshes if needed and returns the token (or API key).
	pub async fn token(&self) -> Result<TokenSecret> {
		Ok(self.refresh().await?.access_token)
	}

	/// Refreshes if needed and returns the token type.
	pub async fn token_type(&self) -> Result<String> {
		Ok(self.refresh().await?.token_type)
	}

	/// Credential shape.
	pub fn kind(&self) -> &CredentialKind {
		&self.kind
	}

	/// Scopes requested, or granted by the latest refresh.
	pub fn scopes(&self) -> ScopeSet {
		self.scopes.read().clone()
	}

	/// Expiry of the stored token; `None` before the first refresh and for API keys.
	pub fn expires_at(&self) -> Option<OffsetDateTime> {
		self.state.read().as_ref().and_then(|state| state.expires_at)
	}

	/// Stored token state without refreshing.
	pub fn state(&self) -> Option<TokenState> {
		self.state.read().clone()
	}

	/// Refresh counters.
	pub fn metrics(&self) -> Arc<RefreshMetrics> {
		self.metrics.clone()
	}

	/// Transport shared with discovery and dispatch.
	pub fn transport(&self) -> &Arc<T> {
		&self.transport
	}

	fn valid_state(&self) -> Option<TokenState> {
		let now = self.clock.now();

		self.state.read().as_ref().filter(|state| state.is_valid_at(now)).cloned()
	}
}
impl<T> Debug for Credential<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credential")
			.field("kind", &self.kind)
			.field("scopes", &*self.scopes.read())
			.field("state", &*self.state.read())
			.finish()
	}
}
