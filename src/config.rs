//! Client configuration: application credentials, redirect URI, and the API root every
//! endpoint URL derives from.
//!
//! Configuration is explicit and owned by the client. Embedding applications load it however
//! they like (the type is `serde`-enabled) and pass it to
//! [`Singly::new`](crate::client::Singly::new).

// self
use crate::{_prelude::*, auth::AppSecret, error::ConfigError};

/// Redirect URI used when none is configured.
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:9999";
/// Production API root.
pub const DEFAULT_API_ROOT: &str = "https://api.singly.com/";

/// Immutable client configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinglyConfig {
	/// Application key, sent as `client_id`.
	pub app_key: String,
	/// Application secret, sent as `app_secret` during the token exchange.
	pub app_secret: AppSecret,
	/// Redirect URI registered for the application. Kept verbatim so the value sent to the
	/// authorize endpoint matches the registration byte for byte.
	#[serde(default = "default_redirect_uri")]
	pub redirect_uri: String,
	/// Root URL the OAuth and data endpoints are resolved against.
	#[serde(default = "default_api_root")]
	pub api_root: Url,
}
impl SinglyConfig {
	/// Creates a configuration with the default redirect URI and API root.
	pub fn new(app_key: impl Into<String>, app_secret: impl Into<String>) -> Self {
		Self {
			app_key: app_key.into(),
			app_secret: AppSecret::new(app_secret),
			redirect_uri: default_redirect_uri(),
			api_root: default_api_root(),
		}
	}

	/// Creates a new builder for the provided credentials.
	pub fn builder(
		app_key: impl Into<String>,
		app_secret: impl Into<String>,
	) -> SinglyConfigBuilder {
		SinglyConfigBuilder::new(app_key, app_secret)
	}

	/// Validates the configuration and derives the endpoint set.
	pub fn endpoints(&self) -> Result<SinglyEndpoints, ConfigError> {
		if self.app_key.is_empty() {
			return Err(ConfigError::EmptyCredential { field: "app_key" });
		}
		if self.app_secret.expose().is_empty() {
			return Err(ConfigError::EmptyCredential { field: "app_secret" });
		}

		Url::parse(&self.redirect_uri)
			.map_err(|source| ConfigError::InvalidUrl { field: "redirect_uri", source })?;

		SinglyEndpoints::from_root(&self.api_root)
	}
}

/// Endpoint set derived from the API root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SinglyEndpoints {
	/// Browser-facing authorize endpoint.
	pub authorize: Url,
	/// Token endpoint the authorization code is exchanged at.
	pub access_token: Url,
	/// Base of every data endpoint.
	pub api: Url,
}
impl SinglyEndpoints {
	/// Resolves the endpoint set against `root`. A missing trailing slash is tolerated.
	pub fn from_root(root: &Url) -> Result<Self, ConfigError> {
		if root.cannot_be_a_base() || !matches!(root.scheme(), "http" | "https") {
			return Err(ConfigError::InvalidApiRoot { url: root.to_string() });
		}

		let mut root = root.clone();

		if !root.path().ends_with('/') {
			let path = format!("{}/", root.path());

			root.set_path(&path);
		}

		let join = |path: &str| {
			root.join(path).map_err(|source| ConfigError::InvalidUrl { field: "api_root", source })
		};

		Ok(Self {
			authorize: join("oauth/authorize")?,
			access_token: join("oauth/access_token")?,
			api: join("v0/")?,
		})
	}
}

/// Builder for [`SinglyConfig`] values.
#[derive(Debug)]
pub struct SinglyConfigBuilder {
	/// Application key.
	pub app_key: String,
	/// Application secret.
	pub app_secret: AppSecret,
	/// Optional redirect URI override.
	pub redirect_uri: Option<String>,
	/// Optional API root override.
	pub api_root: Option<Url>,
}
impl SinglyConfigBuilder {
	/// Creates a new builder seeded with the provided credentials.
	pub fn new(app_key: impl Into<String>, app_secret: impl Into<String>) -> Self {
		Self {
			app_key: app_key.into(),
			app_secret: AppSecret::new(app_secret),
			redirect_uri: None,
			api_root: None,
		}
	}

	/// Overrides the redirect URI.
	pub fn redirect_uri(mut self, uri: impl Into<String>) -> Self {
		self.redirect_uri = Some(uri.into());

		self
	}

	/// Overrides the API root.
	pub fn api_root(mut self, url: Url) -> Self {
		self.api_root = Some(url);

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<SinglyConfig, ConfigError> {
		let config = SinglyConfig {
			app_key: self.app_key,
			app_secret: self.app_secret,
			redirect_uri: self.redirect_uri.unwrap_or_else(default_redirect_uri),
			api_root: self.api_root.unwrap_or_else(default_api_root),
		};

		config.endpoints()?;

		Ok(config)
	}
}

fn default_redirect_uri() -> String {
	DEFAULT_REDIRECT_URI.into()
}

fn default_api_root() -> Url {
	// Constant input; parsing cannot fail.
	Url::parse(DEFAULT_API_ROOT).unwrap_or_else(|_| unreachable!("default API root is valid"))
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("Failed to parse test URL.")
	}

	#[test]
	fn defaults_match_production_endpoints() {
		let config = SinglyConfig::new("key", "secret");
		let endpoints = config.endpoints().expect("Default configuration should validate.");

		assert_eq!(config.redirect_uri, "http://localhost:9999");
		assert_eq!(endpoints.authorize.as_str(), "https://api.singly.com/oauth/authorize");
		assert_eq!(endpoints.access_token.as_str(), "https://api.singly.com/oauth/access_token");
		assert_eq!(endpoints.api.as_str(), "https://api.singly.com/v0/");
	}

	#[test]
	fn api_root_without_trailing_slash_keeps_its_path() {
		let endpoints = SinglyEndpoints::from_root(&url("http://127.0.0.1:8080/proxy"))
			.expect("Proxy root should resolve.");

		assert_eq!(endpoints.authorize.as_str(), "http://127.0.0.1:8080/proxy/oauth/authorize");
		assert_eq!(endpoints.api.as_str(), "http://127.0.0.1:8080/proxy/v0/");
	}

	#[test]
	fn builder_rejects_empty_credentials_and_bad_roots() {
		let err = SinglyConfig::builder("", "secret")
			.build()
			.expect_err("Empty application key should be rejected.");

		assert!(matches!(err, ConfigError::EmptyCredential { field: "app_key" }));

		let err = SinglyConfig::builder("key", "")
			.build()
			.expect_err("Empty application secret should be rejected.");

		assert!(matches!(err, ConfigError::EmptyCredential { field: "app_secret" }));

		let err = SinglyConfig::builder("key", "secret")
			.api_root(url("mailto:someone@example.com"))
			.build()
			.expect_err("Non-HTTP roots should be rejected.");

		assert!(matches!(err, ConfigError::InvalidApiRoot { .. }));

		let err = SinglyConfig::builder("key", "secret")
			.redirect_uri("not a uri")
			.build()
			.expect_err("Unparseable redirect URIs should be rejected.");

		assert!(matches!(err, ConfigError::InvalidUrl { field: "redirect_uri", .. }));
	}

	#[test]
	fn config_deserializes_with_defaults() {
		let config: SinglyConfig =
			serde_json::from_str(r#"{"app_key":"key","app_secret":"secret"}"#)
				.expect("Minimal configuration should deserialize.");

		assert_eq!(config, SinglyConfig::new("key", "secret"));
		assert!(format!("{config:?}").contains("AppSecret(\"<redacted>\")"));
	}
}
