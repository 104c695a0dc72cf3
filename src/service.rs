//! Service descriptors: read-only snapshots of one upstream service plus a gateway to its
//! sub-endpoints.

// self
use crate::{
	_prelude::*,
	client::{QueryParams, Singly},
	http::ApiHttpClient,
};

/// Metadata of one service as returned by the `services` endpoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ServiceInfo {
	/// Service name, e.g. `twitter`.
	pub name: String,
	/// Every raw key/value pair the `services` endpoint returned for the service.
	pub attributes: JsonMap<String, JsonValue>,
}
impl ServiceInfo {
	/// Creates a snapshot from the service name and its raw attributes.
	pub fn new(name: impl Into<String>, attributes: JsonMap<String, JsonValue>) -> Self {
		Self { name: name.into(), attributes }
	}

	/// Human-readable description (`desc`), when present and a string.
	pub fn desc(&self) -> Option<&str> {
		self.attributes.get("desc").and_then(JsonValue::as_str)
	}

	/// Looks up a raw attribute.
	pub fn get(&self, key: &str) -> Option<&JsonValue> {
		self.attributes.get(key)
	}

	/// Iterates over the attribute keys.
	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.attributes.keys().map(String::as_str)
	}
}

/// Paging and filtering options for [`Service::endpoint_range`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RangeQuery {
	/// Maximum number of items.
	pub limit: Option<u64>,
	/// Number of items to skip.
	pub offset: Option<u64>,
	/// Free-text filter.
	pub q: Option<String>,
}
impl RangeQuery {
	/// Sets the maximum number of items.
	pub fn limit(mut self, limit: u64) -> Self {
		self.limit = Some(limit);

		self
	}

	/// Sets the number of items to skip.
	pub fn offset(mut self, offset: u64) -> Self {
		self.offset = Some(offset);

		self
	}

	/// Sets the free-text filter.
	pub fn q(mut self, q: impl Into<String>) -> Self {
		self.q = Some(q.into());

		self
	}

	fn into_params(self) -> QueryParams {
		QueryParams::new()
			.with_opt("limit", self.limit)
			.with_opt("offset", self.offset)
			.with_opt("q", self.q)
	}
}

/// Descriptor of one service, borrowing the client it was obtained from.
///
/// The metadata is the snapshot taken when the registry was populated. Endpoint calls go
/// through the client each time and use whatever token it holds at that moment.
pub struct Service<'a, C>
where
	C: ?Sized + ApiHttpClient,
{
	client: &'a Singly<C>,
	info: Arc<ServiceInfo>,
}
impl<'a, C> Service<'a, C>
where
	C: ?Sized + ApiHttpClient,
{
	pub(crate) fn new(client: &'a Singly<C>, info: Arc<ServiceInfo>) -> Self {
		Self { client, info }
	}

	/// Service name.
	pub fn name(&self) -> &str {
		&self.info.name
	}

	/// Human-readable description (`desc`), when present.
	pub fn desc(&self) -> Option<&str> {
		self.info.desc()
	}

	/// Looks up a raw attribute.
	pub fn get(&self, key: &str) -> Option<&JsonValue> {
		self.info.get(key)
	}

	/// Iterates over the attribute keys.
	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.info.keys()
	}

	/// Every raw attribute.
	pub fn attributes(&self) -> &JsonMap<String, JsonValue> {
		&self.info.attributes
	}

	/// Owned metadata snapshot, detached from the client.
	pub fn info(&self) -> &ServiceInfo {
		&self.info
	}

	/// Fetches the service's discovery document (`services/<name>`).
	pub async fn discovery(&self) -> Result<JsonValue> {
		self.client.service_discovery(self.name()).await
	}

	/// Lists items of a sub-endpoint (`services/<name>/<sub_endpoint>`), e.g. recent tweets.
	///
	/// Only the options that are set are sent.
	pub async fn endpoint_range(&self, sub_endpoint: &str, query: RangeQuery) -> Result<JsonValue> {
		let segments = self.segments(sub_endpoint, None);

		self.client.get_json("endpoint_range", &segments, &query.into_params()).await
	}

	/// Fetches one item of a sub-endpoint (`services/<name>/<sub_endpoint>/<item_id>`).
	pub async fn endpoint_get(&self, sub_endpoint: &str, item_id: &str) -> Result<JsonValue> {
		let segments = self.segments(sub_endpoint, Some(item_id));

		self.client.get_json("endpoint_get", &segments, &QueryParams::new()).await
	}

	fn segments<'s>(&'s self, sub_endpoint: &'s str, item_id: Option<&'s str>) -> Vec<&'s str> {
		["services", self.name()]
			.into_iter()
			.chain(sub_endpoint.split('/').filter(|segment| !segment.is_empty()))
			.chain(item_id)
			.collect()
	}
}
impl<C> Clone for Service<'_, C>
where
	C: ?Sized + ApiHttpClient,
{
	fn clone(&self) -> Self {
		Self { client: self.client, info: Arc::clone(&self.info) }
	}
}
impl<C> Debug for Service<'_, C>
where
	C: ?Sized + ApiHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Service").field("info", &self.info).finish()
	}
}
impl<C> Display for Service<'_, C>
where
	C: ?Sized + ApiHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "<Service {}>", self.name())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{_preludet::*, auth::AccessToken};

	async fn twitter(client: &RecordingSingly) -> Service<'_, RecordingHttpClient> {
		client
			.service("twitter")
			.await
			.expect("Registry lookup should succeed.")
			.expect("Twitter should be a known service.")
	}

	fn authenticated_client() -> (RecordingSingly, RecordingHttpClient) {
		let (client, transport) = build_recording_client();

		client.set_access_token(AccessToken::new("T1"));
		transport.respond(
			"/v0/services",
			200,
			r#"{"twitter":{"desc":"Twitter service","since":1300000000}}"#,
		);

		(client, transport)
	}

	#[tokio::test]
	async fn descriptor_exposes_raw_attributes() {
		let (client, _) = authenticated_client();
		let service = twitter(&client).await;

		assert_eq!(service.name(), "twitter");
		assert_eq!(service.to_string(), "<Service twitter>");
		assert_eq!(service.get("since"), Some(&JsonValue::from(1300000000_u64)));
		assert_eq!(service.keys().collect::<Vec<_>>(), vec!["desc", "since"]);
		assert!(service.get("missing").is_none());
	}

	#[tokio::test]
	async fn endpoint_range_sends_only_present_options() {
		let (client, transport) = authenticated_client();

		transport.respond("/v0/services/twitter/tweets", 200, "[]");

		let service = twitter(&client).await;

		service
			.endpoint_range("tweets", RangeQuery::default().limit(2))
			.await
			.expect("Range call should succeed.");

		let request = transport
			.requests()
			.into_iter()
			.find(|req| req.url.path() == "/v0/services/twitter/tweets")
			.expect("Range call should hit the tweets endpoint.");

		assert_eq!(
			request.url.as_str(),
			"https://api.test.singly/v0/services/twitter/tweets?access_token=T1&limit=2"
		);

		service
			.endpoint_range("tweets", RangeQuery::default().offset(20).q("rust lang"))
			.await
			.expect("Range call should succeed.");

		let last = transport.requests().pop().expect("A request should be recorded.");

		assert_eq!(
			last.query(),
			vec![
				("access_token".into(), "T1".into()),
				("offset".into(), "20".into()),
				("q".into(), "rust lang".into()),
			]
		);
	}

	#[tokio::test]
	async fn endpoint_get_addresses_single_item() {
		let (client, transport) = authenticated_client();

		transport.respond("/v0/services/twitter/tweets/42", 200, r#"{"id":"42"}"#);

		let service = twitter(&client).await;
		let item =
			service.endpoint_get("tweets", "42").await.expect("Single item call should succeed.");

		assert_eq!(item["id"], "42");

		let last = transport.requests().pop().expect("A request should be recorded.");

		assert_eq!(last.query(), vec![("access_token".into(), "T1".into())]);
	}

	#[tokio::test]
	async fn endpoint_calls_use_the_current_token() {
		let (client, transport) = authenticated_client();

		transport.respond("/v0/services/twitter", 200, "{}");

		let service = twitter(&client).await;

		client.set_access_token(AccessToken::new("T2"));
		service.discovery().await.expect("Discovery should succeed.");

		let last = transport.requests().pop().expect("A request should be recorded.");

		assert_eq!(last.query(), vec![("access_token".into(), "T2".into())]);

		client.clear_access_token();

		assert!(matches!(service.discovery().await, Err(Error::NotAuthenticated)));
	}
}
