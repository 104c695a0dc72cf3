//! Client-level error types shared across the authenticator, the endpoint layer, and services.

// self
use crate::_prelude::*;

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Token endpoint answered with something other than a usable token.
	#[error(transparent)]
	TokenExchange(#[from] TokenExchangeError),
	/// Transport failure (DNS, TCP, TLS) or non-success HTTP status.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Response body could not be decoded.
	#[error(transparent)]
	Decode(#[from] DecodeError),

	/// A data endpoint was called before an access token was obtained or assigned.
	#[error("No access token is set; authenticate or assign a token first.")]
	NotAuthenticated,
	/// The redirect reported by the authorize callback carried no `code` parameter.
	#[error("Redirect URI `{redirected_uri}` does not carry an authorization code.")]
	MissingAuthorizationCode {
		/// URI reported by the authorize callback.
		redirected_uri: String,
	},
}

/// Configuration and request-construction failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// A configured URL cannot be parsed or joined.
	#[error("The {field} URL is invalid.")]
	InvalidUrl {
		/// Configuration field that failed validation.
		field: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// The API root cannot carry path segments or is not HTTP(S).
	#[error("The API root must be an absolute http(s) URL: {url}.")]
	InvalidApiRoot {
		/// Rejected URL.
		url: String,
	},
	/// A credential was left empty.
	#[error("The {field} must not be empty.")]
	EmptyCredential {
		/// Configuration field that failed validation.
		field: &'static str,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Token endpoint responses that did not yield an access token.
#[derive(Debug, ThisError)]
pub enum TokenExchangeError {
	/// Token endpoint responded with a body that is not JSON.
	#[error("Token endpoint returned malformed JSON.")]
	MalformedResponse {
		/// JSON parsing failure.
		#[source]
		source: serde_json::Error,
		/// HTTP status code of the response.
		status: u16,
	},
	/// Token endpoint responded with JSON lacking a usable `access_token`.
	#[error("Token endpoint response is missing access_token.")]
	MissingAccessToken {
		/// HTTP status code of the response.
		status: u16,
	},
}

/// Transport-level failures (network, IO, HTTP status).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling {endpoint}.")]
	Network {
		/// Endpoint label of the failed call.
		endpoint: String,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling {endpoint}.")]
	Io {
		/// Endpoint label of the failed call.
		endpoint: String,
		/// IO failure.
		#[source]
		source: std::io::Error,
	},
	/// Server answered with a non-success status.
	#[error("{endpoint} responded with HTTP {status}.")]
	Status {
		/// Endpoint label of the failed call.
		endpoint: String,
		/// HTTP status code.
		status: u16,
		/// Response body, lossily decoded as UTF-8.
		body: String,
	},
	/// Transport reported a failure without a typed cause.
	#[error("HTTP client error occurred while calling {endpoint}: {message}.")]
	Other {
		/// Endpoint label of the failed call.
		endpoint: String,
		/// Transport-supplied message.
		message: String,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(
		endpoint: impl Into<String>,
		src: impl 'static + Send + Sync + std::error::Error,
	) -> Self {
		Self::Network { endpoint: endpoint.into(), source: Box::new(src) }
	}

	/// Returns the HTTP status when the failure is a non-success response.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Status { status, .. } => Some(*status),
			_ => None,
		}
	}
}

/// Response bodies that could not be decoded.
#[derive(Debug, ThisError)]
pub enum DecodeError {
	/// Body is not valid JSON.
	#[error("Endpoint `{endpoint}` returned a body that is not valid JSON.")]
	Syntax {
		/// Endpoint path relative to the API root.
		endpoint: String,
		/// JSON parsing failure.
		#[source]
		source: serde_json::Error,
	},
	/// Body is valid JSON but does not match the requested type.
	#[error(
		"Endpoint `{endpoint}` returned JSON that does not match the expected shape at `{}`.",
		.source.path()
	)]
	Shape {
		/// Endpoint path relative to the API root.
		endpoint: String,
		/// Decoding failure, including the JSON path of the first mismatch.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}
