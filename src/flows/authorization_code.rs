//! Three-legged authorization code flow.
//!
//! [`Singly::auth`] builds the authorize URL, hands it to a caller-supplied callback that drives
//! the user through consent (a browser, a webview, a test stub), extracts the `code` from the
//! redirect the callback reports back, and exchanges it at the token endpoint. Web applications
//! that receive the redirect in their own handler can use [`Singly::authorize_url`] and
//! [`Singly::exchange_code`] directly.

// self
use crate::{
	_prelude::*,
	auth::AccessToken,
	client::Singly,
	config::DEFAULT_REDIRECT_URI,
	error::TokenExchangeError,
	http::{self, ApiHttpClient, ApiResponse},
	obs::{self, CallKind},
};

const TOKEN_ENDPOINT_LABEL: &str = "oauth/access_token";

/// Outcome reported by an authorize callback: the HTTP status it observed and the URI the
/// service redirected the user to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthorizeRedirect {
	/// HTTP status observed by the callback. Informational only.
	pub status: u16,
	/// URI the user was redirected to; expected to carry a `code` query parameter.
	pub redirected_uri: String,
}
impl AuthorizeRedirect {
	/// Creates a redirect report.
	pub fn new(status: u16, redirected_uri: impl Into<String>) -> Self {
		Self { status, redirected_uri: redirected_uri.into() }
	}
}

impl<C> Singly<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Builds the browser-facing authorize URL for `service`.
	///
	/// `redirect_uri` overrides the configured redirect URI for this authorization only.
	pub fn authorize_url(&self, service: &str, redirect_uri: Option<&str>) -> Url {
		let mut url = self.endpoints().authorize.clone();

		url.query_pairs_mut()
			.append_pair("client_id", &self.config().app_key)
			.append_pair("redirect_uri", redirect_uri.unwrap_or(&self.config().redirect_uri))
			.append_pair("service", service);

		url
	}

	/// Runs the full authorization code flow against `service` and stores the resulting token.
	///
	/// `callback` receives the authorize URL and reports where the user ended up. The status it
	/// reports is not validated. Fails with [`Error::MissingAuthorizationCode`] when the redirect
	/// carries no `code`, leaving the current token untouched.
	pub async fn auth<F, Fut>(
		&self,
		service: &str,
		callback: F,
		redirect_uri: Option<&str>,
	) -> Result<AccessToken>
	where
		F: FnOnce(Url) -> Fut,
		Fut: Future<Output = AuthorizeRedirect>,
	{
		let authorize_url = self.authorize_url(service, redirect_uri);
		let debug = self.debug();
		let code = obs::observe(CallKind::Authorize, "auth", async {
			obs::debug_event(debug, CallKind::Authorize, || {
				format!("Calling authorize callback ({authorize_url}).")
			});

			let redirect = callback(authorize_url.clone()).await;

			obs::debug_event(debug, CallKind::Authorize, || {
				format!(
					"Authorize callback responded with (HTTP {}, URL {}).",
					redirect.status, redirect.redirected_uri
				)
			});

			extract_code(&redirect.redirected_uri)
		})
		.await?;

		self.exchange_code(&code).await
	}

	/// Exchanges an authorization code for an access token and stores it in the session.
	pub async fn exchange_code(&self, code: &str) -> Result<AccessToken> {
		obs::observe(CallKind::TokenExchange, "exchange_code", async {
			let endpoint = &self.endpoints().access_token;
			let config = self.config();
			let request = http::form_post_request(
				endpoint,
				[
					("client_id", config.app_key.as_str()),
					("app_secret", config.app_secret.expose()),
					("code", code),
				],
			)?;

			obs::debug_event(self.debug(), CallKind::TokenExchange, || {
				format!("Exchanging authorization code at {endpoint}.")
			});

			let response =
				http::send(self.http_client.as_ref(), TOKEN_ENDPOINT_LABEL, request).await?;
			let token = parse_token_response(&response)?;

			obs::debug_event(self.debug(), CallKind::TokenExchange, || {
				format!("Token endpoint responded with HTTP {}.", response.status)
			});
			self.set_access_token(token.clone());

			Ok(token)
		})
		.await
	}
}

/// Extracts the `code` query parameter from a redirect URI.
///
/// Relative URIs resolve against the default redirect URI. Only the query counts, so a `code`
/// inside the fragment is ignored. Empty codes and unparseable URIs count as missing.
pub fn extract_code(redirected_uri: &str) -> Result<String> {
	Url::parse(DEFAULT_REDIRECT_URI)
		.and_then(|base| base.join(redirected_uri))
		.ok()
		.and_then(|url| {
			url.query_pairs()
				.find(|(key, _)| key == "code")
				.map(|(_, code)| code.into_owned())
				.filter(|code| !code.is_empty())
		})
		.ok_or_else(|| Error::MissingAuthorizationCode {
			redirected_uri: redirected_uri.to_owned(),
		})
}

fn parse_token_response(response: &ApiResponse) -> Result<AccessToken, TokenExchangeError> {
	let status = response.status;
	let body: JsonValue = serde_json::from_slice(&response.body)
		.map_err(|source| TokenExchangeError::MalformedResponse { source, status })?;

	body.get("access_token")
		.and_then(JsonValue::as_str)
		.filter(|token| !token.is_empty())
		.map(AccessToken::new)
		.ok_or(TokenExchangeError::MissingAccessToken { status })
}
