//! Calls a discovery-described method end to end against a local mock of Google's endpoints:
//! the refresh-token exchange, the discovery document, and the API itself.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::json;
use url::Url;
// self
use discovery_broker::{
	ApiClient, CallArgs, Credential, config::ClientConfig, http::ReqwestHttpClient,
	reqwest::Client,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-access\",\"token_type\":\"Bearer\",\"expires_in\":3600,\
				 \"scope\":\"https://www.googleapis.com/auth/spreadsheets.readonly\"}",
			);
		})
		.await;
	let _document_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/discovery/v1/apis/sheets/v4/rest");
			then.status(200).json_body(json!({
				"name": "sheets",
				"version": "v4",
				"rootUrl": server.url("/"),
				"baseUrl": server.url("/"),
				"resources": { "spreadsheets": { "resources": { "values": { "methods": {
					"get": {
						"id": "sheets.spreadsheets.values.get",
						"httpMethod": "GET",
						"path": "v4/spreadsheets/{spreadsheetId}/values/{range}",
						"parameters": {
							"spreadsheetId": { "location": "path", "required": true },
							"range": { "location": "path", "required": true },
							"majorDimension": { "location": "query" }
						}
					}
				}}}}}
			}));
		})
		.await;
	let api_mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/v4/spreadsheets/sheet-1/values/Sheet1")
				.header("authorization", "Bearer demo-access");
			then.status(200).json_body(json!({
				"range": "Sheet1!A1:B2",
				"values": [["name", "score"], ["ada", "42"]]
			}));
		})
		.await;
	let record = json!({
		"client_id": "demo-client",
		"client_secret": "demo-secret",
		"refresh_token": "demo-refresh",
		"token_uri": server.url("/token"),
	});
	let transport = ReqwestHttpClient::with_client(Client::builder().build()?);
	let credential = <Credential<ReqwestHttpClient>>::from_input(&record.to_string(), transport)?;
	let config = ClientConfig::builder()
		.discovery_endpoint(Url::parse(&server.url("/discovery/v1/apis/"))?)
		.build()?;
	let client = ApiClient::with_config(credential, config);
	let args = CallArgs::new()
		.with("spreadsheetId", "sheet-1")
		.with("range", "Sheet1")
		.with("majorDimension", "ROWS");
	let values = client.call("sheets:v4.spreadsheets.values.get", &args).await?;

	println!("Values: {}.", values.unwrap_or_default());
	println!("Granted scopes: {}.", client.credential().scopes());

	token_mock.assert_async().await;
	api_mock.assert_async().await;

	Ok(())
}
