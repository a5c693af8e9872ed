#![cfg(feature = "reqwest")]

mod common;

// std
use std::sync::Arc;
// crates.io
use httpmock::prelude::*;
use time::Duration;
// self
use common::*;
use discovery_broker::{
	Credential,
	auth::{CredentialKind, ManualClock},
	credential::RefreshCounts,
	error::{AuthError, Error},
	http::ReqwestHttpClient,
};

fn credential(record: &serde_json::Value, clock: &ManualClock) -> Credential<ReqwestHttpClient> {
	Credential::new(
		CredentialKind::classify(record).expect("Credential fixture should classify."),
		transport(),
	)
	.with_clock(clock.clone())
}

#[tokio::test]
async fn oauth_client_refreshes_once_until_expiry() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/token")
				.form_urlencoded_tuple("grant_type", "refresh_token")
				.form_urlencoded_tuple("refresh_token", "refresh-it")
				.form_urlencoded_tuple("client_id", "client-it")
				.form_urlencoded_tuple("client_secret", "secret-it");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"access-1\",\"token_type\":\"bearer\",\"expires_in\":3600,\
				 \"scope\":\"https://www.googleapis.com/auth/drive\"}",
			);
		})
		.await;
	let clock = ManualClock::new(START);
	let credential = credential(&oauth_client_record(&server), &clock);

	assert!(credential.expires_at().is_none());

	for _ in 0..3 {
		let headers = credential.headers().await.expect("Refresh should succeed.");

		assert_eq!(
			headers.get("authorization").and_then(|v| v.to_str().ok()),
			Some("Bearer access-1")
		);
	}

	mock.assert_calls_async(1).await;

	assert_eq!(credential.expires_at(), Some(START + Duration::seconds(3492)));
	assert_eq!(credential.scopes().joined(), "https://www.googleapis.com/auth/drive");

	clock.advance(Duration::seconds(3492));
	credential.refresh().await.expect("Token is still valid at the expiry instant.");
	mock.assert_calls_async(1).await;

	clock.advance(Duration::seconds(1));
	credential.refresh().await.expect("Expired token should refresh.");
	mock.assert_calls_async(2).await;

	assert_eq!(
		credential.metrics().snapshot(),
		RefreshCounts { exchanges: 2, successes: 2, failures: 0, reuses: 3 }
	);
}

#[tokio::test]
async fn service_account_posts_a_signed_assertion() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/token")
				.header("content-type", "application/x-www-form-urlencoded")
				.form_urlencoded_tuple("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer")
				.body_includes("assertion=");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"sa-token\",\"token_type\":\"Bearer\",\"expires_in\":1000}");
		})
		.await;
	let clock = ManualClock::new(START);
	let credential = credential(&service_account_record(&server), &clock);

	assert!(matches!(credential.kind(), CredentialKind::ServiceAccount(_)));

	let token = credential.token().await.expect("Assertion exchange should succeed.");

	assert_eq!(token.expose(), "sa-token");
	assert_eq!(credential.expires_at(), Some(START + Duration::seconds(970)));
	assert!(credential.scopes().contains("https://www.googleapis.com/auth/youtube"));

	mock.assert_async().await;
}

#[tokio::test]
async fn concurrent_callers_share_one_exchange() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200)
				.header("content-type", "application/json")
				.delay(std::time::Duration::from_millis(100))
				.body("{\"access_token\":\"shared\",\"token_type\":\"Bearer\",\"expires_in\":600}");
		})
		.await;
	let credential = Arc::new(credential(&oauth_client_record(&server), &ManualClock::new(START)));
	let (first, second, third) =
		tokio::join!(credential.headers(), credential.headers(), credential.headers());

	for headers in [first, second, third] {
		let headers = headers.expect("Every concurrent caller should get headers.");

		assert_eq!(
			headers.get("authorization").and_then(|v| v.to_str().ok()),
			Some("Bearer shared")
		);
	}

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn rejected_exchange_surfaces_the_provider_payload() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(400).header("content-type", "application/json").body(
				"{\"error\":\"invalid_grant\",\"error_description\":\"Token has been revoked.\"}",
			);
		})
		.await;
	let credential = credential(&oauth_client_record(&server), &ManualClock::new(START));
	let err = credential.headers().await.expect_err("Revoked refresh tokens must fail.");

	match err {
		Error::Auth(AuthError::Rejected { grant, status, payload }) => {
			assert_eq!(grant, "refresh_token");
			assert_eq!(status, Some(400));
			assert_eq!(payload["error"], "invalid_grant");
		},
		other => panic!("Unexpected error: {other:?}."),
	}

	assert!(credential.state().is_none());

	// Failures are not retried by the credential.
	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn service_account_rejection_keeps_the_raw_body() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(401).body("unauthorized client");
		})
		.await;
	let credential = credential(&service_account_record(&server), &ManualClock::new(START));
	let err = credential.refresh().await.expect_err("Rejected assertions must fail.");

	assert!(matches!(
		err,
		Error::Auth(AuthError::Rejected { grant: "jwt_bearer", status: Some(401), ref payload })
			if *payload == "unauthorized client"
	));
}

#[tokio::test]
async fn missing_expires_in_is_an_auth_error() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"forever\",\"token_type\":\"Bearer\"}");
		})
		.await;
	let credential = credential(&service_account_record(&server), &ManualClock::new(START));
	let err = credential.refresh().await.expect_err("Tokens without a lifetime must fail.");

	assert!(matches!(err, Error::Auth(AuthError::MissingExpiresIn)));
}

#[tokio::test]
async fn absurd_expires_in_fails_without_storing_state() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"forever\",\"token_type\":\"Bearer\",\"expires_in\":18446744073709551615}",
			);
		})
		.await;
	let credential = credential(&service_account_record(&server), &ManualClock::new(START));
	let err = credential.refresh().await.expect_err("Unrepresentable lifetimes must fail.");

	assert!(matches!(
		err,
		Error::Auth(AuthError::ExpiresInOutOfRange { expires_in: u64::MAX })
	));
	assert!(credential.state().is_none());
}

#[tokio::test]
async fn api_keys_from_raw_input_render_the_key_header() {
	let credential = <Credential<ReqwestHttpClient>>::from_input(API_KEY, transport())
		.expect("Raw strings are API keys.");
	let headers = credential.headers().await.expect("API keys need no exchange.");

	assert_eq!(headers.get("x-goog-api-key").and_then(|v| v.to_str().ok()), Some(API_KEY));
	assert_eq!(credential.token_type().await.expect("API key state is static."), "x-goog-api-key");
	assert_eq!(credential.metrics().snapshot().exchanges, 0);
}
