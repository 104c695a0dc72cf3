//! Authenticated data endpoint invocation.
//!
//! Every data call resolves `<api_root>v0/<path>`, appends `access_token` plus the caller's
//! non-null parameters, issues one `GET`, and decodes the body as JSON.

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	auth::AccessToken,
	client::Singly,
	error::{ConfigError, DecodeError},
	http::{self, ApiHttpClient},
	obs::{self, CallKind},
};

const ACCESS_TOKEN_PARAM: &str = "access_token";

/// Query parameters for a data endpoint call.
///
/// Values are optional; absent ones are dropped when the query string is serialized, so callers
/// can pass optional filters straight through. Parameters serialize in key order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryParams(BTreeMap<String, Option<String>>);
impl QueryParams {
	/// Creates an empty parameter set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a present parameter.
	pub fn with(self, key: impl Into<String>, value: impl ToString) -> Self {
		self.with_opt(key, Some(value))
	}

	/// Adds a parameter that is dropped when `value` is `None`.
	pub fn with_opt<V>(mut self, key: impl Into<String>, value: Option<V>) -> Self
	where
		V: ToString,
	{
		self.insert(key, value.map(|value| value.to_string()));

		self
	}

	/// Inserts or replaces a parameter.
	pub fn insert(&mut self, key: impl Into<String>, value: Option<String>) {
		self.0.insert(key.into(), value);
	}

	/// Iterates over the parameters that will be serialized.
	pub fn present(&self) -> impl Iterator<Item = (&str, &str)> {
		self.0.iter().filter_map(|(key, value)| value.as_deref().map(|value| (key.as_str(), value)))
	}

	/// Whether no parameter will be serialized.
	pub fn is_empty(&self) -> bool {
		self.present().next().is_none()
	}
}
impl<K, V> FromIterator<(K, Option<V>)> for QueryParams
where
	K: Into<String>,
	V: ToString,
{
	fn from_iter<I>(iter: I) -> Self
	where
		I: IntoIterator<Item = (K, Option<V>)>,
	{
		iter.into_iter().fold(Self::new(), |params, (key, value)| params.with_opt(key, value))
	}
}

impl<C> Singly<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Calls an arbitrary data endpoint and returns the decoded JSON.
	///
	/// `endpoint` is relative to the API root (`profiles`, `services/twitter`, ...). Fails with
	/// [`Error::NotAuthenticated`] before any request when no token is set. A caller-supplied
	/// `access_token` parameter is ignored in favor of the session token.
	pub async fn call(&self, endpoint: &str, params: &QueryParams) -> Result<JsonValue> {
		let segments = split_path(endpoint);

		self.get_json("call", &segments, params).await
	}

	/// Calls a data endpoint and decodes the JSON into `T`.
	///
	/// Decoding failures report the JSON path of the first mismatch.
	pub async fn call_as<T>(&self, endpoint: &str, params: &QueryParams) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let value = self.call(endpoint, params).await?;

		Ok(decode_value(endpoint, value)?)
	}

	/// Fetches the user's aggregated profile.
	pub async fn profiles(&self) -> Result<JsonValue> {
		self.get_json("profiles", &["profiles"], &QueryParams::new()).await
	}

	/// Fetches the discovery document of one service (`services/<name>`).
	pub async fn service_discovery(&self, name: &str) -> Result<JsonValue> {
		self.get_json("service_discovery", &["services", name], &QueryParams::new()).await
	}

	/// Issues one authenticated `GET` for the given path segments.
	///
	/// Segments are percent-encoded individually, so identifiers containing `/` stay a single
	/// segment.
	pub(crate) async fn get_json(
		&self,
		stage: &'static str,
		segments: &[&str],
		params: &QueryParams,
	) -> Result<JsonValue> {
		obs::observe(CallKind::Endpoint, stage, async {
			let token = self.require_token()?;
			let label = segments.join("/");
			let url = self.endpoint_url(segments, &token, params)?;
			let debug = self.debug();

			obs::debug_event(debug, CallKind::Endpoint, || {
				format!("Calling {}.", redact_token(&url))
			});

			let request = http::get_request(&url)?;
			let response = http::send(self.http_client.as_ref(), &label, request).await?;

			obs::debug_event(debug, CallKind::Endpoint, || {
				format!(
					"Endpoint {label} returned data {}.",
					String::from_utf8_lossy(&response.body)
				)
			});

			let value: JsonValue = serde_json::from_slice(&response.body)
				.map_err(|source| DecodeError::Syntax { endpoint: label.clone(), source })?;

			obs::debug_event(debug, CallKind::Endpoint, || {
				format!(
					"Endpoint {label} returned json {}.",
					serde_json::to_string_pretty(&value).unwrap_or_default()
				)
			});

			Ok(value)
		})
		.await
	}

	fn endpoint_url(
		&self,
		segments: &[&str],
		token: &AccessToken,
		params: &QueryParams,
	) -> Result<Url> {
		let mut url = self.endpoints().api.clone();

		url.path_segments_mut()
			.map_err(|_| ConfigError::InvalidApiRoot { url: self.endpoints().api.to_string() })?
			.pop_if_empty()
			.extend(segments);

		let mut pairs = url.query_pairs_mut();

		pairs.append_pair(ACCESS_TOKEN_PARAM, token.expose());

		for (key, value) in params.present().filter(|(key, _)| *key != ACCESS_TOKEN_PARAM) {
			pairs.append_pair(key, value);
		}

		drop(pairs);

		Ok(url)
	}
}

/// Decodes an already-parsed JSON value into `T`, tracking the path of the first mismatch.
pub(crate) fn decode_value<T>(endpoint: &str, value: JsonValue) -> Result<T, DecodeError>
where
	T: DeserializeOwned,
{
	serde_path_to_error::deserialize(value)
		.map_err(|source| DecodeError::Shape { endpoint: endpoint.to_owned(), source })
}

fn split_path(endpoint: &str) -> Vec<&str> {
	endpoint.split('/').filter(|segment| !segment.is_empty()).collect()
}

fn redact_token(url: &Url) -> Url {
	let pairs = url
		.query_pairs()
		.map(|(key, value)| {
			let value = if key == ACCESS_TOKEN_PARAM { "<redacted>".into() } else { value };

			(key.into_owned(), value.into_owned())
		})
		.collect::<Vec<_>>();
	let mut redacted = url.clone();

	redacted.query_pairs_mut().clear().extend_pairs(pairs);

	redacted
}
