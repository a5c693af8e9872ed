#![allow(dead_code)]

// std
use std::sync::Arc;
// crates.io
use httpmock::{Mock, prelude::*};
use serde_json::{Value, json};
use time::{OffsetDateTime, macros::datetime};
use url::Url;
// self
use discovery_broker::{
	ApiClient, Credential, auth::CredentialKind, config::ClientConfig, http::ReqwestHttpClient,
};

pub const API_KEY: &str = "AIza-integration-key";
pub const DIRECTORY_PATH: &str = "/discovery/v1/apis/";
pub const DOCUMENT_PATH: &str = "/discovery/v1/apis/svc/v1/rest";
pub const START: OffsetDateTime = datetime!(2025-01-01 00:00 UTC);

pub fn transport() -> Arc<ReqwestHttpClient> {
	Arc::new(ReqwestHttpClient::default())
}

pub fn config(server: &MockServer) -> ClientConfig {
	ClientConfig::builder()
		.discovery_endpoint(
			Url::parse(&server.url(DIRECTORY_PATH)).expect("Mock discovery root should parse."),
		)
		.build()
		.expect("Loopback configuration should be valid.")
}

pub fn api_key_client(server: &MockServer) -> ApiClient<ReqwestHttpClient> {
	ApiClient::with_config(Credential::new(CredentialKind::api_key(API_KEY), transport()), config(server))
}

pub fn oauth_client_record(server: &MockServer) -> Value {
	json!({
		"client_id": "client-it",
		"client_secret": "secret-it",
		"refresh_token": "refresh-it",
		"token_uri": server.url("/token"),
	})
}

pub fn service_account_record(server: &MockServer) -> Value {
	json!({
		"type": "service_account",
		"client_email": "robot@project-it.iam.gserviceaccount.com",
		"private_key": include_str!("../fixtures/service_account_key.pem"),
		"private_key_id": "kid-it",
		"token_uri": server.url("/token"),
	})
}

/// Discovery document for `svc:v1` whose base URL points back at the mock server.
pub fn document(server: &MockServer) -> Value {
	json!({
		"name": "svc",
		"version": "v1",
		"rootUrl": server.url("/"),
		"servicePath": "svc/v1/",
		"baseUrl": server.url("/svc/v1/"),
		"auth": { "oauth2": { "scopes": {
			"https://www.googleapis.com/auth/svc": { "description": "Full access" },
			"https://www.googleapis.com/auth/svc.readonly": { "description": "Read access" }
		}}},
		"schemas": {
			"Item": {
				"id": "Item",
				"type": "object",
				"properties": { "title": { "type": "string" }, "index": { "type": "integer" } }
			}
		},
		"resources": { "a": { "resources": { "b": { "methods": {
			"get": {
				"id": "svc.a.b.get",
				"httpMethod": "GET",
				"path": "a/{id}/b",
				"parameters": {
					"id": { "location": "path", "required": true, "type": "string" },
					"maxResults": { "location": "query", "type": "integer" },
					"pageToken": { "location": "query", "type": "string" }
				},
				"scopes": ["https://www.googleapis.com/auth/svc.readonly"]
			},
			"insert": {
				"id": "svc.a.b.insert",
				"httpMethod": "POST",
				"path": "a/b",
				"parameters": { "notify": { "location": "query", "type": "boolean" } },
				"request": { "$ref": "Item" },
				"response": { "$ref": "Item" },
				"supportsMediaUpload": true,
				"mediaUpload": { "protocols": { "simple": {
					"multipart": true,
					"path": "/upload/svc/v1/a/b"
				}}}
			},
			"delete": {
				"id": "svc.a.b.delete",
				"httpMethod": "DELETE",
				"path": "a/{id}/b",
				"parameters": { "id": { "location": "path", "required": true } }
			},
			"list": {
				"id": "svc.a.b.list",
				"httpMethod": "GET",
				"path": "items",
				"parameters": {
					"id": { "location": "query", "type": "string" },
					"part": { "location": "query", "type": "string" }
				}
			}
		}}}}}
	})
}

pub fn directory() -> Value {
	json!({
		"kind": "discovery#directoryList",
		"items": [
			{ "id": "svc:v0", "name": "svc", "version": "v0", "preferred": false },
			{ "id": "svc:v1", "name": "svc", "version": "v1", "preferred": true },
			{ "id": "other:v3", "name": "other", "version": "v3", "preferred": true }
		]
	})
}

/// Mounts the directory listing and the `svc:v1` document.
pub async fn mount_discovery(server: &MockServer) -> (Mock<'_>, Mock<'_>) {
	let directory_mock = server
		.mock_async(|when, then| {
			when.method(GET).path(DIRECTORY_PATH);
			then.status(200).json_body(directory());
		})
		.await;
	let document_mock = server
		.mock_async(|when, then| {
			when.method(GET).path(DOCUMENT_PATH);
			then.status(200).json_body(document(server));
		})
		.await;

	(directory_mock, document_mock)
}
