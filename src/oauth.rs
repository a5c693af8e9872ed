//! Token endpoint exchanges behind the credential manager.
//!
//! The refresh-token grant runs through the `oauth2` crate's [`BasicClient`] with client
//! credentials posted in the request body. The JWT bearer grant has no `oauth2` counterpart, so
//! it posts the signed assertion directly and parses the response with the same rules.

pub use oauth2;

// crates.io
use oauth2::{
	AuthType, ClientId, ClientSecret, HttpClientError, RefreshToken, RequestTokenError,
	TokenResponse, TokenUrl,
	basic::{BasicClient, BasicErrorResponse, BasicRequestTokenError},
};
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	auth::{
		AuthorizedUserKey, JWT_BEARER_GRANT, ScopeSet, ServiceAccountKey, TokenState,
		sign_assertion,
	},
	error::{AuthError, ConfigError, TransportError},
	http::{HttpResponse, HttpTransport, OAuthHandle, http as h, is_success},
};

const REFRESH_GRANT: &str = "refresh_token";
const BEARER_GRANT: &str = "jwt_bearer";

/// Successful token endpoint payload.
#[derive(Debug, Deserialize)]
struct TokenPayload {
	access_token: String,
	#[serde(default)]
	token_type: Option<String>,
	#[serde(default)]
	expires_in: Option<u64>,
	#[serde(default)]
	scope: Option<String>,
}

/// Performs token exchanges over a borrowed transport.
pub(crate) struct TokenExchange<'t, T>
where
	T: ?Sized + HttpTransport,
{
	transport: &'t T,
}
impl<'t, T> TokenExchange<'t, T>
where
	T: ?Sized + HttpTransport,
{
	pub(crate) fn new(transport: &'t T) -> Self {
		Self { transport }
	}

	/// Exchanges the stored refresh token. A granted `scope` replaces `known` scopes.
	pub(crate) async fn refresh_token(
		&self,
		key: &AuthorizedUserKey,
		known: &ScopeSet,
		now: OffsetDateTime,
	) -> Result<TokenState> {
		let token_url = TokenUrl::new(key.token_uri.clone())
			.map_err(|source| ConfigError::InvalidUrl { url: key.token_uri.clone(), source })?;
		let client = BasicClient::new(ClientId::new(key.client_id.clone()))
			.set_client_secret(ClientSecret::new(key.client_secret.expose().to_owned()))
			.set_token_uri(token_url)
			.set_auth_type(AuthType::RequestBody);
		let handle = OAuthHandle::new(self.transport);
		let refresh = RefreshToken::new(key.refresh_token.expose().to_owned());
		let response = client
			.exchange_refresh_token(&refresh)
			.request_async(&handle)
			.await
			.map_err(|e| map_request_error(REFRESH_GRANT, handle.last_status(), e))?;
		let scope = match response.scopes() {
			Some(granted) => ScopeSet::new(granted.iter().map(|scope| scope.as_str()))
				.map_err(|e| AuthError::TokenEndpoint { message: e.to_string() })?,
			None => known.clone(),
		};

		TokenState::issued(
			response.access_token().secret().to_owned(),
			response.token_type().as_ref(),
			scope,
			response.expires_in().map(|lifetime| lifetime.as_secs()),
			now,
		)
		.map_err(Into::into)
	}

	/// Signs an assertion for `scopes` and exchanges it with the JWT bearer grant.
	pub(crate) async fn jwt_bearer(
		&self,
		key: &ServiceAccountKey,
		scopes: &ScopeSet,
		now: OffsetDateTime,
	) -> Result<TokenState> {
		let assertion = sign_assertion(key, scopes, now)?;
		let body = form_urlencoded::Serializer::new(String::new())
			.append_pair("grant_type", JWT_BEARER_GRANT)
			.append_pair("assertion", &assertion)
			.finish();
		let request = h::Request::builder()
			.method(h::Method::POST)
			.uri(key.token_uri.as_str())
			.header(h::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
			.header(h::header::ACCEPT, "application/json")
			.body(body.into_bytes())
			.map_err(ConfigError::from)?;
		let response = self.transport.execute(request).await?;
		let payload = parse_token_response(BEARER_GRANT, &response)?;
		let scope = match payload.scope.as_deref() {
			Some(granted) if !granted.is_empty() => ScopeSet::from_str(granted)
				.map_err(|e| AuthError::TokenEndpoint { message: e.to_string() })?,
			_ => scopes.clone(),
		};

		TokenState::issued(
			payload.access_token,
			payload.token_type.as_deref().unwrap_or("Bearer"),
			scope,
			payload.expires_in,
			now,
		)
		.map_err(Into::into)
	}
}

fn parse_token_response(grant: &'static str, response: &HttpResponse) -> Result<TokenPayload> {
	if !is_success(response) {
		return Err(AuthError::Rejected {
			grant,
			status: Some(response.status().as_u16()),
			payload: error_payload(response.body()),
		}
		.into());
	}

	let mut de = serde_json::Deserializer::from_slice(response.body());

	serde_path_to_error::deserialize(&mut de)
		.map_err(|source| AuthError::MalformedResponse { grant, source }.into())
}

fn error_payload(body: &[u8]) -> Value {
	serde_json::from_slice(body)
		.unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()))
}

fn map_request_error(
	grant: &'static str,
	status: Option<u16>,
	err: BasicRequestTokenError<HttpClientError<TransportError>>,
) -> Error {
	let rejected = status.is_some_and(|code| !(200..300).contains(&code));

	match err {
		RequestTokenError::ServerResponse(response) =>
			AuthError::Rejected { grant, status, payload: server_payload(&response) }.into(),
		RequestTokenError::Parse(_, body) if rejected =>
			AuthError::Rejected { grant, status, payload: error_payload(&body) }.into(),
		RequestTokenError::Parse(source, _) => AuthError::MalformedResponse { grant, source }.into(),
		RequestTokenError::Request(error) => map_transport_error(error),
		RequestTokenError::Other(message) if rejected =>
			AuthError::Rejected { grant, status, payload: Value::String(message) }.into(),
		RequestTokenError::Other(message) => AuthError::TokenEndpoint { message }.into(),
	}
}

fn server_payload(response: &BasicErrorResponse) -> Value {
	serde_json::to_value(response)
		.unwrap_or_else(|_| Value::String(response.error().to_string()))
}

fn map_transport_error(err: HttpClientError<TransportError>) -> Error {
	match err {
		HttpClientError::Reqwest(inner) => (*inner).into(),
		HttpClientError::Http(inner) => ConfigError::from(inner).into(),
		HttpClientError::Io(inner) => TransportError::Io(inner).into(),
		HttpClientError::Other(message) => AuthError::TokenEndpoint { message }.into(),
		_ => AuthError::TokenEndpoint { message: "HTTP client error.".into() }.into(),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn response(status: u16, body: &str) -> HttpResponse {
		let mut response = HttpResponse::new(body.as_bytes().to_vec());

		*response.status_mut() = h::StatusCode::from_u16(status).expect("Status fixture is valid.");

		response
	}

	#[test]
	fn rejected_payload_is_kept_as_json_or_text() {
		let err = parse_token_response(BEARER_GRANT, &response(400, r#"{"error":"invalid_grant"}"#))
			.expect_err("Non-success statuses must be rejected.");

		assert!(matches!(
			&err,
			Error::Auth(AuthError::Rejected { status: Some(400), payload, .. })
				if payload["error"] == "invalid_grant"
		));

		let err = parse_token_response(BEARER_GRANT, &response(502, "Bad Gateway"))
			.expect_err("Non-success statuses must be rejected.");

		assert!(matches!(
			&err,
			Error::Auth(AuthError::Rejected { payload: Value::String(text), .. }) if text == "Bad Gateway"
		));
	}

	#[test]
	fn malformed_success_payload_reports_path() {
		let err = parse_token_response(BEARER_GRANT, &response(200, r#"{"access_token":7}"#))
			.expect_err("Numeric access tokens are malformed.");

		let Error::Auth(AuthError::MalformedResponse { source, .. }) = err else {
			panic!("Expected a malformed response error.");
		};

		assert_eq!(source.path().to_string(), "access_token");
	}

	#[test]
	fn transport_errors_pass_through() {
		let err = map_request_error(
			REFRESH_GRANT,
			None,
			RequestTokenError::Request(HttpClientError::Reqwest(Box::new(TransportError::Io(
				std::io::Error::other("reset"),
			)))),
		);

		assert!(matches!(err, Error::Transport(TransportError::Io(_))));
	}
}
