#![cfg(feature = "reqwest")]

mod common;

// crates.io
use httpmock::prelude::*;
use serde_json::{Value, json};
// self
use common::*;
use discovery_broker::{
	Attachment, CallArgs,
	error::{ApiError, Error, ParameterError},
};

#[tokio::test]
async fn path_values_fill_the_template_and_undeclared_arguments_drop() {
	let server = MockServer::start_async().await;
	let _mocks = mount_discovery(&server).await;
	let api = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/svc/v1/a/X/b")
				.header("x-goog-api-key", API_KEY)
				.query_param("maxResults", "5")
				.query_param_missing("pageToken")
				.query_param_missing("bogus")
				.query_param_missing("id");
			then.status(200).json_body(json!({ "id": "X", "title": "found" }));
		})
		.await;
	let client = api_key_client(&server);
	let args = CallArgs::new()
		.with("id", "X")
		.with("maxResults", 5)
		.with("pageToken", Value::Null)
		.with("bogus", "dropped");
	let built = client.build("svc:v1.a.b.get", &args).await.expect("Request should build.");

	assert_eq!(built.http_method, "GET");
	assert_eq!(built.url.as_str(), server.url("/svc/v1/a/X/b"));
	assert_eq!(built.query, vec![("maxResults".to_owned(), "5".to_owned())]);
	assert!(built.body.is_none());

	let payload = client.dispatch(&built, None).await.expect("Dispatch should succeed.");

	assert_eq!(payload, Some(json!({ "id": "X", "title": "found" })));

	api.assert_async().await;
}

#[tokio::test]
async fn missing_path_values_fail_before_dispatch() {
	let server = MockServer::start_async().await;
	let _mocks = mount_discovery(&server).await;
	let client = api_key_client(&server);
	let err = client
		.call("svc:v1.a.b.get", &CallArgs::new().with("maxResults", 5))
		.await
		.expect_err("The id placeholder has no value.");

	assert!(matches!(
		err,
		Error::Parameter(ParameterError::MissingPathParameter { ref name, .. }) if name == "id"
	));

	let err = client
		.call("svc:v1.a.c.get", &CallArgs::new())
		.await
		.expect_err("Unknown resources must fail.");

	assert!(matches!(
		err,
		Error::Parameter(ParameterError::UnknownMethod { ref segment, .. }) if segment == "c"
	));
}

#[tokio::test]
async fn bodies_only_carry_schema_properties() {
	let server = MockServer::start_async().await;
	let _mocks = mount_discovery(&server).await;
	let api = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/svc/v1/a/b")
				.query_param("notify", "true")
				.header("content-type", "application/json")
				.json_body(json!({ "title": "T" }));
			then.status(200).json_body(json!({ "id": "new", "title": "T" }));
		})
		.await;
	let client = api_key_client(&server);
	let args = CallArgs::new().with("title", "T").with("extra", "E").with("notify", true);
	let payload = client.call("svc:v1.a.b.insert", &args).await.expect("Insert should succeed.");

	assert_eq!(payload, Some(json!({ "id": "new", "title": "T" })));

	api.assert_async().await;
}

#[tokio::test]
async fn no_content_yields_no_payload() {
	let server = MockServer::start_async().await;
	let _mocks = mount_discovery(&server).await;
	let api = server
		.mock_async(|when, then| {
			when.method(DELETE).path("/svc/v1/a/gone/b");
			then.status(204);
		})
		.await;
	let client = api_key_client(&server);
	let payload = client
		.call("svc:v1.a.b.delete", &CallArgs::new().with("id", "gone"))
		.await
		.expect("Delete should succeed.");

	assert!(payload.is_none());

	api.assert_async().await;
}

#[tokio::test]
async fn rejected_calls_surface_the_body_verbatim() {
	let server = MockServer::start_async().await;
	let _mocks = mount_discovery(&server).await;
	let body = "{\"error\":{\"code\":404,\"message\":\"Requested entity was not found.\"}}";
	let api = server
		.mock_async(|when, then| {
			when.method(GET).path("/svc/v1/a/missing/b");
			then.status(404).header("content-type", "application/json").body(body);
		})
		.await;
	let client = api_key_client(&server);
	let err = client
		.call("svc:v1.a.b.get", &CallArgs::new().with("id", "missing"))
		.await
		.expect_err("404 must fail.");

	match err {
		Error::Api(ApiError::Rejected { method, url, status, body: received }) => {
			assert_eq!(method, "GET");
			assert_eq!(url, server.url("/svc/v1/a/missing/b"));
			assert_eq!(status, 404);
			assert_eq!(received, body);
		},
		other => panic!("Unexpected error: {other:?}."),
	}

	// Rejections are not retried.
	api.assert_calls_async(1).await;
}

#[tokio::test]
async fn uploads_send_multipart_bodies_to_the_upload_path() {
	let server = MockServer::start_async().await;
	let _mocks = mount_discovery(&server).await;
	let api = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/upload/svc/v1/a/b")
				.query_param("uploadType", "multipart")
				.header_exists("content-type")
				.body_includes("Content-Type: application/json; charset=UTF-8")
				.body_includes("{\"title\":\"report\"}")
				.body_includes("Content-Type: text/csv")
				.body_includes("a,b\n1,2");
			then.status(200).json_body(json!({ "id": "uploaded" }));
		})
		.await;
	let client = api_key_client(&server);
	let request = client
		.build_upload("svc:v1.a.b.insert", &CallArgs::new().with("title", "report"))
		.await
		.expect("Upload request should build.");
	let attachment = Attachment::new("text/csv", b"a,b\n1,2".to_vec());
	let payload =
		client.dispatch(&request, Some(&attachment)).await.expect("Upload should succeed.");

	assert_eq!(payload, Some(json!({ "id": "uploaded" })));

	api.assert_async().await;
}

#[tokio::test]
async fn uploads_require_a_declared_upload_path() {
	let server = MockServer::start_async().await;
	let _mocks = mount_discovery(&server).await;
	let client = api_key_client(&server);
	let err = client
		.build_upload("svc:v1.a.b.get", &CallArgs::new().with("id", "X"))
		.await
		.expect_err("Read-only methods have no upload path.");

	assert!(matches!(err, Error::Parameter(ParameterError::UploadUnsupported { .. })));
}

#[tokio::test]
async fn downloads_return_raw_bytes() {
	let server = MockServer::start_async().await;
	let api = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/svc/v1/files/f1")
				.query_param("alt", "media")
				.header("x-goog-api-key", API_KEY);
			then.status(200).body(vec![0_u8, 159, 146, 150]);
		})
		.await;
	let client = api_key_client(&server);
	let bytes = client
		.download(&server.url("/svc/v1/files/f1?alt=media"))
		.await
		.expect("Download should succeed.");

	assert_eq!(bytes, vec![0_u8, 159, 146, 150]);

	api.assert_async().await;
}

#[tokio::test]
async fn extra_query_pairs_can_be_appended() {
	let server = MockServer::start_async().await;
	let _mocks = mount_discovery(&server).await;
	let api = server
		.mock_async(|when, then| {
			when.method(GET).path("/svc/v1/a/X/b").query_param("fields", "id,title");
			then.status(200).body("  \n");
		})
		.await;
	let client = api_key_client(&server);
	let request = client
		.build("svc:v1.a.b.get", &CallArgs::new().with("id", "X"))
		.await
		.expect("Request should build.")
		.with_query("fields", "id,title");

	assert!(client.dispatch(&request, None).await.expect("Dispatch should succeed.").is_none());

	api.assert_async().await;
}
