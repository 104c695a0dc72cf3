#![cfg(all(feature = "reqwest", feature = "test"))]

// crates.io
use httpmock::prelude::*;
// self
use singly::{
	_preludet::build_reqwest_test_client,
	auth::AccessToken,
	client::{QueryParams, ReqwestSingly},
	error::{DecodeError, Error},
	service::RangeQuery,
};

const SERVICES: &str =
	"{\"twitter\":{\"desc\":\"Twitter service\"},\"facebook\":{\"desc\":\"Facebook service\"}}";

fn build_client(server: &MockServer) -> ReqwestSingly {
	let client = build_reqwest_test_client(&server.url("/"), "app-key", "app-secret");

	client.set_access_token(AccessToken::new("T1"));

	client
}

#[tokio::test]
async fn service_registry_is_fetched_once() -> color_eyre::Result<()> {
	let server = MockServer::start_async().await;
	let client = build_client(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v0/services").query_param("access_token", "T1");
			then.status(200).header("content-type", "application/json").body(SERVICES);
		})
		.await;

	assert_eq!(client.service_names().await?, vec!["facebook".to_owned(), "twitter".to_owned()]);

	let twitter = client.service("twitter").await?.expect("Twitter should be registered.");

	assert_eq!(twitter.desc(), Some("Twitter service"));
	assert!(client.service("unknown").await?.is_none());
	assert_eq!(client.services().await?.len(), 2);

	mock.assert_calls_async(1).await;

	Ok(())
}

#[tokio::test]
async fn endpoint_range_passes_only_present_options() -> color_eyre::Result<()> {
	let server = MockServer::start_async().await;
	let client = build_client(&server);
	let services = server
		.mock_async(|when, then| {
			when.method(GET).path("/v0/services");
			then.status(200).header("content-type", "application/json").body(SERVICES);
		})
		.await;
	let tweets = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/v0/services/twitter/tweets")
				.query_param("access_token", "T1")
				.query_param("limit", "2");
			then.status(200)
				.header("content-type", "application/json")
				.body("[{\"id\":\"1\"},{\"id\":\"2\"}]");
		})
		.await;
	let twitter = client.service("twitter").await?.expect("Twitter should be registered.");
	let items = twitter.endpoint_range("tweets", RangeQuery::default().limit(2)).await?;

	services.assert_calls_async(1).await;
	tweets.assert_calls_async(1).await;

	assert_eq!(items.as_array().map(Vec::len), Some(2));

	Ok(())
}

#[tokio::test]
async fn endpoint_get_fetches_single_item() -> color_eyre::Result<()> {
	let server = MockServer::start_async().await;
	let client = build_client(&server);

	server
		.mock_async(|when, then| {
			when.method(GET).path("/v0/services");
			then.status(200).header("content-type", "application/json").body(SERVICES);
		})
		.await;

	let item = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/v0/services/facebook/photos/99")
				.query_param("access_token", "T1");
			then.status(200).header("content-type", "application/json").body("{\"id\":\"99\"}");
		})
		.await;
	let facebook = client.service("facebook").await?.expect("Facebook should be registered.");
	let photo = facebook.endpoint_get("photos", "99").await?;

	item.assert_calls_async(1).await;

	assert_eq!(photo["id"], "99");

	Ok(())
}

#[tokio::test]
async fn profiles_round_trip_and_decode_errors() {
	let server = MockServer::start_async().await;
	let client = build_client(&server);
	let body = "{\"id\":\"u1\",\"services\":{\"twitter\":[\"123\"]},\"score\":1.5}";
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v0/profiles").query_param("access_token", "T1");
			then.status(200).header("content-type", "application/json").body(body);
		})
		.await;
	let profile = client.profiles().await.expect("Profiles call should succeed.");

	mock.assert_calls_async(1).await;

	assert_eq!(
		profile,
		serde_json::from_str::<serde_json::Value>(body).expect("Fixture should be valid JSON.")
	);

	server
		.mock_async(|when, then| {
			when.method(GET).path("/v0/types/statuses");
			then.status(200).body("<html></html>");
		})
		.await;

	let err = client
		.call("types/statuses", &QueryParams::new().with("limit", 1))
		.await
		.expect_err("HTML bodies should not decode.");

	assert!(matches!(err, Error::Decode(DecodeError::Syntax { .. })));
}

#[tokio::test]
async fn calls_without_token_fail_before_sending() {
	let server = MockServer::start_async().await;
	let client = build_client(&server);

	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v0/profiles");
			then.status(200).body("{}");
		})
		.await;

	client.clear_access_token();

	let err = client.profiles().await.expect_err("Calls without a token should fail.");

	mock.assert_calls_async(0).await;

	assert!(matches!(err, Error::NotAuthenticated));
}
