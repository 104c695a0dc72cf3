//! Async client for the Singly social-data API: three-legged OAuth 2.0 sign-in, the user's
//! aggregated profile, and per-service endpoints behind one uniform namespace.
//!
//! ```no_run
//! # async fn demo() -> singly::error::Result<()> {
//! use singly::{client::Singly, config::SinglyConfig, flows::AuthorizeRedirect};
//!
//! let client = Singly::new(SinglyConfig::new("app-key", "app-secret"))?;
//!
//! client
//! 	.auth(
//! 		"twitter",
//! 		|url| async move {
//! 			// Drive the user through `url` and report where the service redirected them.
//! 			let _ = url;
//!
//! 			AuthorizeRedirect::new(302, "http://localhost:9999/?code=abc")
//! 		},
//! 		None,
//! 	)
//! 	.await?;
//!
//! if let Some(twitter) = client.service("twitter").await? {
//! 	let recent = twitter.endpoint_range("tweets", Default::default()).await?;
//!
//! 	println!("{recent}");
//! }
//! # Ok(())
//! # }
//! ```

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod flows;
pub mod http;
pub mod obs;
pub mod service;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for tests; enabled via `cfg(test)` or the `test` crate
	//! feature.

	pub use crate::_prelude::*;

	// crates.io
	use oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse, http::StatusCode};
	// self
	#[cfg(feature = "reqwest")] use crate::{client::ReqwestSingly, http::ReqwestHttpClient};
	use crate::{client::Singly, config::SinglyConfig, http::ApiHttpClient};

	/// Client type alias used by tests that run against [`RecordingHttpClient`].
	pub type RecordingSingly = Singly<RecordingHttpClient>;

	/// Request captured by [`RecordingHttpClient`].
	#[derive(Clone, Debug)]
	pub struct RecordedRequest {
		/// HTTP method, upper-cased.
		pub method: String,
		/// Full request URL.
		pub url: Url,
		/// Raw request body.
		pub body: Vec<u8>,
	}
	impl RecordedRequest {
		/// Returns the decoded query pairs of the request URL.
		pub fn query(&self) -> Vec<(String, String)> {
			self.url.query_pairs().into_owned().collect()
		}

		/// Returns the decoded form pairs of the request body.
		pub fn form(&self) -> HashMap<String, String> {
			url::form_urlencoded::parse(&self.body).into_owned().collect()
		}
	}

	/// Transport failure produced by [`RecordingHttpClient`] when no canned response is queued.
	#[derive(Debug, ThisError)]
	#[error("No canned response is queued for {path}.")]
	pub struct UnroutedRequest {
		/// Path of the request that could not be served.
		pub path: String,
	}

	/// In-memory transport that serves canned responses by URL path and records every request.
	#[derive(Clone, Debug, Default)]
	pub struct RecordingHttpClient {
		routes: Arc<Mutex<HashMap<String, (u16, String)>>>,
		requests: Arc<Mutex<Vec<RecordedRequest>>>,
	}
	impl RecordingHttpClient {
		/// Serves `status` + `body` for every request to `path`, replacing any earlier response.
		pub fn respond(&self, path: &str, status: u16, body: impl Into<String>) -> &Self {
			self.routes.lock().insert(path.to_owned(), (status, body.into()));

			self
		}

		/// Returns every request issued so far.
		pub fn requests(&self) -> Vec<RecordedRequest> {
			self.requests.lock().clone()
		}

		/// Returns the number of requests issued to `path`.
		pub fn hits(&self, path: &str) -> usize {
			self.requests.lock().iter().filter(|req| req.url.path() == path).count()
		}
	}
	impl ApiHttpClient for RecordingHttpClient {
		type Handle = RecordingHttpClient;
		type TransportError = UnroutedRequest;

		fn handle(&self) -> Self::Handle {
			self.clone()
		}
	}
	impl<'c> AsyncHttpClient<'c> for RecordingHttpClient {
		type Error = HttpClientError<UnroutedRequest>;
		type Future =
			Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

		fn call(&'c self, request: HttpRequest) -> Self::Future {
			let client = self.clone();

			Box::pin(async move {
				let url = Url::parse(&request.uri().to_string())
					.map_err(|e| HttpClientError::Other(e.to_string()))?;
				let path = url.path().to_owned();

				client.requests.lock().push(RecordedRequest {
					method: request.method().as_str().to_owned(),
					url,
					body: request.body().clone(),
				});

				let (status, body) = client
					.routes
					.lock()
					.get(&path)
					.cloned()
					.ok_or_else(|| Box::new(UnroutedRequest { path }))?;
				let mut response = HttpResponse::new(body.into_bytes());

				*response.status_mut() = StatusCode::from_u16(status)
					.map_err(|e| HttpClientError::Other(e.to_string()))?;

				Ok(response)
			})
		}
	}

	/// Builds a configuration pointing every endpoint at `https://api.test.singly/`.
	pub fn test_config() -> SinglyConfig {
		SinglyConfig::builder("test-key", "test-secret")
			.api_root(
				Url::parse("https://api.test.singly/").expect("Test API root should parse."),
			)
			.build()
			.expect("Test configuration should be valid.")
	}

	/// Constructs a [`Singly`] client backed by a fresh [`RecordingHttpClient`].
	pub fn build_recording_client() -> (RecordingSingly, RecordingHttpClient) {
		let transport = RecordingHttpClient::default();
		let client = Singly::with_http_client(test_config(), transport.clone())
			.expect("Recording client should build from the test configuration.");

		(client, transport)
	}

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	#[cfg(feature = "reqwest")]
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Constructs a reqwest-backed [`Singly`] client whose endpoints all resolve against
	/// `api_root`, typically an `httpmock` server URL.
	#[cfg(feature = "reqwest")]
	pub fn build_reqwest_test_client(
		api_root: &str,
		app_key: &str,
		app_secret: &str,
	) -> ReqwestSingly {
		let config = SinglyConfig::builder(app_key, app_secret)
			.api_root(Url::parse(api_root).expect("Mock API root should parse successfully."))
			.build()
			.expect("Configuration should be valid for the mock server.");

		Singly::with_http_client(config, test_reqwest_http_client())
			.expect("Client should build for the mock server.")
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::{Map as JsonMap, Value as JsonValue};
	pub use thiserror::Error as ThisError;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _, tracing_subscriber as _};
