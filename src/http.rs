//! Transport primitives for Singly requests.
//!
//! The module exposes [`ApiHttpClient`], the client's only dependency on an HTTP stack. Every
//! Singly operation builds one [`HttpRequest`], asks the transport for a short-lived
//! [`AsyncHttpClient`] handle, and awaits exactly one response. Retries, timeouts, pooling, and
//! keep-alive all belong to the transport.

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// crates.io
use oauth2::{
	AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse,
	http::{
		Method, Request,
		header::{ACCEPT, CONTENT_TYPE},
	},
};
// self
use crate::{
	_prelude::*,
	error::{ConfigError, TransportError},
};

/// Abstraction over HTTP transports capable of executing Singly requests.
///
/// Callers provide an implementation (typically behind `Arc<T>`) and the client requests a
/// fresh [`AsyncHttpClient`] handle per call. Handles must own whatever state they need so
/// their request futures stay `Send` for the lifetime of the in-flight request.
pub trait ApiHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// [`AsyncHttpClient`] handle used for a single request.
	type Handle: for<'c> AsyncHttpClient<
			'c,
			Error = HttpClientError<Self::TransportError>,
			Future: 'c + Send,
		>
		+ 'static
		+ Send
		+ Sync;

	/// Builds a handle for the next request.
	fn handle(&self) -> Self::Handle;
}

/// Successful response returned by [`send`]: status and raw body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiResponse {
	/// HTTP status code (always 2xx).
	pub status: u16,
	/// Raw response body.
	pub body: Vec<u8>,
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl ApiHttpClient for ReqwestHttpClient {
	type Handle = ReqwestHandle;
	type TransportError = ReqwestError;

	fn handle(&self) -> Self::Handle {
		ReqwestHandle(self.0.clone())
	}
}

/// Per-request handle returned by [`ReqwestHttpClient`].
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestHandle(ReqwestClient);
#[cfg(feature = "reqwest")]
impl<'c> AsyncHttpClient<'c> for ReqwestHandle {
	type Error = HttpClientError<ReqwestError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		let client = self.0.clone();

		Box::pin(async move {
			let response =
				client.execute(request.try_into().map_err(Box::new)?).await.map_err(Box::new)?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let mut response_new =
				HttpResponse::new(response.bytes().await.map_err(Box::new)?.to_vec());

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}

/// Builds a `GET` request that accepts JSON.
pub(crate) fn get_request(url: &Url) -> Result<HttpRequest> {
	Request::builder()
		.method(Method::GET)
		.uri(url.as_str())
		.header(ACCEPT, "application/json")
		.body(Vec::new())
		.map_err(|e| ConfigError::from(e).into())
}

/// Builds a form-encoded `POST` request that accepts JSON.
pub(crate) fn form_post_request<'a, I>(url: &Url, pairs: I) -> Result<HttpRequest>
where
	I: IntoIterator<Item = (&'a str, &'a str)>,
{
	let body = url::form_urlencoded::Serializer::new(String::new()).extend_pairs(pairs).finish();

	Request::builder()
		.method(Method::POST)
		.uri(url.as_str())
		.header(ACCEPT, "application/json")
		.header(CONTENT_TYPE, "application/x-www-form-urlencoded")
		.body(body.into_bytes())
		.map_err(|e| ConfigError::from(e).into())
}

/// Executes one request and rejects non-success statuses.
///
/// `endpoint` labels the call in errors; it never contains the access token.
pub(crate) async fn send<C>(
	http_client: &C,
	endpoint: &str,
	request: HttpRequest,
) -> Result<ApiResponse>
where
	C: ?Sized + ApiHttpClient,
{
	let handle = http_client.handle();
	let response =
		handle.call(request).await.map_err(|err| map_transport_error(endpoint, err))?;
	let status = response.status().as_u16();
	let body = response.into_body();

	if !(200..300).contains(&status) {
		return Err(TransportError::Status {
			endpoint: endpoint.to_owned(),
			status,
			body: String::from_utf8_lossy(&body).into_owned(),
		}
		.into());
	}

	Ok(ApiResponse { status, body })
}

fn map_transport_error<E>(endpoint: &str, err: HttpClientError<E>) -> Error
where
	E: 'static + Send + Sync + StdError,
{
	let endpoint = endpoint.to_owned();

	match err {
		HttpClientError::Reqwest(inner) =>
			TransportError::Network { endpoint, source: inner }.into(),
		HttpClientError::Http(inner) => ConfigError::from(inner).into(),
		HttpClientError::Io(source) => TransportError::Io { endpoint, source }.into(),
		HttpClientError::Other(message) => TransportError::Other { endpoint, message }.into(),
		_ => TransportError::Other { endpoint, message: "unrecognized transport failure".into() }
			.into(),
	}
}
