//! The Singly API client: configuration, session state, transport, and the service registry.

pub mod endpoint;
pub mod registry;

pub use endpoint::*;

// self
use crate::{
	_prelude::*,
	auth::AccessToken,
	client::registry::ServiceRegistry,
	config::{SinglyConfig, SinglyEndpoints},
	http::ApiHttpClient,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestSingly = Singly<ReqwestHttpClient>;

/// Singly API client.
///
/// The client owns its configuration, the session (access token + debug flag), the HTTP
/// transport, and the lazily-populated service registry. Every operation issues at most one
/// request and awaits it before returning; nothing runs in the background.
///
/// Session state sits behind a lock, so operations take `&self` and [`Service`] descriptors can
/// borrow the client while the token changes underneath them.
///
/// [`Service`]: crate::service::Service
pub struct Singly<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// HTTP transport used for every outbound request.
	pub http_client: Arc<C>,
	config: SinglyConfig,
	endpoints: SinglyEndpoints,
	session: RwLock<Session>,
	pub(crate) registry: RwLock<Option<Arc<ServiceRegistry>>>,
	pub(crate) registry_guard: AsyncMutex<()>,
}
impl<C> Singly<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Creates a client that reuses the caller-provided transport.
	pub fn with_http_client(config: SinglyConfig, http_client: impl Into<Arc<C>>) -> Result<Self> {
		let endpoints = config.endpoints()?;

		Ok(Self {
			http_client: http_client.into(),
			config,
			endpoints,
			session: Default::default(),
			registry: Default::default(),
			registry_guard: Default::default(),
		})
	}

	/// Configuration the client was built with.
	pub fn config(&self) -> &SinglyConfig {
		&self.config
	}

	/// Endpoint set derived from the configured API root.
	pub fn endpoints(&self) -> &SinglyEndpoints {
		&self.endpoints
	}

	/// Returns the current access token, if any.
	pub fn access_token(&self) -> Option<AccessToken> {
		self.session.read().access_token.clone()
	}

	/// Assigns an access token obtained earlier (offline or cached-token mode).
	pub fn set_access_token(&self, token: AccessToken) {
		self.session.write().access_token = Some(token);
	}

	/// Drops the current access token.
	pub fn clear_access_token(&self) {
		self.session.write().access_token = None;
	}

	/// Whether an access token is present.
	pub fn is_authenticated(&self) -> bool {
		self.session.read().access_token.is_some()
	}

	/// Enables or disables request/response dumps as `tracing` debug events.
	pub fn set_debug(&self, debug: bool) {
		self.session.write().debug = debug;
	}

	/// Current debug flag.
	pub fn debug(&self) -> bool {
		self.session.read().debug
	}

	pub(crate) fn require_token(&self) -> Result<AccessToken> {
		self.access_token().ok_or(Error::NotAuthenticated)
	}
}
#[cfg(feature = "reqwest")]
impl Singly<ReqwestHttpClient> {
	/// Creates a new client backed by a default reqwest transport.
	pub fn new(config: SinglyConfig) -> Result<Self> {
		Self::with_http_client(config, ReqwestHttpClient::default())
	}
}
impl<C> Debug for Singly<C>
where
	C: ?Sized + ApiHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Singly")
			.field("config", &self.config)
			.field("authenticated", &self.is_authenticated())
			.field("debug", &self.debug())
			.field("services_loaded", &self.services_loaded())
			.finish()
	}
}

#[derive(Debug, Default)]
struct Session {
	access_token: Option<AccessToken>,
	debug: bool,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::_preludet::*;

	#[test]
	fn new_client_starts_unauthenticated_with_empty_registry() {
		let (client, transport) = build_recording_client();

		assert!(client.access_token().is_none());
		assert!(!client.is_authenticated());
		assert!(!client.services_loaded());
		assert!(!client.debug());
		assert!(transport.requests().is_empty());
	}

	#[test]
	fn token_can_be_assigned_and_cleared() {
		let (client, _) = build_recording_client();

		client.set_access_token(AccessToken::new("cached"));

		assert_eq!(
			client.access_token().map(|token| token.expose().to_owned()),
			Some("cached".into())
		);

		client.clear_access_token();

		assert!(matches!(client.require_token(), Err(Error::NotAuthenticated)));
	}

	#[test]
	fn debug_output_hides_token() {
		let (client, _) = build_recording_client();

		client.set_access_token(AccessToken::new("very-secret-token"));

		let rendered = format!("{client:?}");

		assert!(rendered.contains("authenticated: true"));
		assert!(!rendered.contains("very-secret-token"));
	}
}
