//! Lazily-populated service registry.
//!
//! The first access to [`Singly::services`], [`Singly::service`] or [`Singly::service_names`]
//! fetches the `services` endpoint once and memoizes the result for the client's lifetime.
//! Entries are snapshots: they go stale silently when the upstream service list changes, and
//! only [`Singly::refresh_services`] repopulates them. The population lock is held across the
//! fetch, so concurrent first callers share one request. The snapshot itself sits outside that
//! lock and stays readable while a refresh is in flight.

// self
use crate::{
	_prelude::*,
	client::{QueryParams, Singly, endpoint},
	http::ApiHttpClient,
	service::{Service, ServiceInfo},
};

const SERVICES_ENDPOINT: &str = "services";

/// Memoized `services` response.
#[derive(Debug, Default)]
pub(crate) struct ServiceRegistry {
	services: BTreeMap<String, Arc<ServiceInfo>>,
	names: Vec<String>,
}
impl ServiceRegistry {
	fn from_response(response: BTreeMap<String, JsonMap<String, JsonValue>>) -> Self {
		let services = response
			.into_iter()
			.map(|(name, attributes)| {
				let info = Arc::new(ServiceInfo::new(name.clone(), attributes));

				(name, info)
			})
			.collect::<BTreeMap<_, _>>();
		let mut names = services.keys().cloned().collect::<Vec<_>>();

		names.sort();

		Self { services, names }
	}
}

impl<C> Singly<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Returns every known service keyed by name, fetching the registry on first use.
	pub async fn services(&self) -> Result<BTreeMap<String, Service<'_, C>>> {
		let registry = self.registry().await?;

		Ok(registry
			.services
			.iter()
			.map(|(name, info)| (name.clone(), Service::new(self, Arc::clone(info))))
			.collect())
	}

	/// Returns the descriptor for `name`, or `None` when the service is unknown.
	///
	/// Only the first registry population can fail; unknown names never do.
	pub async fn service(&self, name: &str) -> Result<Option<Service<'_, C>>> {
		let registry = self.registry().await?;

		Ok(registry.services.get(name).map(|info| Service::new(self, Arc::clone(info))))
	}

	/// Returns the lexicographically sorted service names.
	pub async fn service_names(&self) -> Result<Vec<String>> {
		Ok(self.registry().await?.names.clone())
	}

	/// Discards the memoized registry and fetches it again.
	///
	/// On failure the previous registry, if any, is kept.
	pub async fn refresh_services(&self) -> Result<Vec<String>> {
		let _guard = self.registry_guard.lock().await;
		let registry = Arc::new(self.fetch_registry().await?);
		let names = registry.names.clone();

		*self.registry.write() = Some(registry);

		Ok(names)
	}

	/// Whether the registry has been populated.
	pub fn services_loaded(&self) -> bool {
		self.registry.read().is_some()
	}

	async fn registry(&self) -> Result<Arc<ServiceRegistry>> {
		if let Some(registry) = self.cached_registry() {
			return Ok(registry);
		}

		let _guard = self.registry_guard.lock().await;

		// A concurrent caller may have populated it while we waited.
		if let Some(registry) = self.cached_registry() {
			return Ok(registry);
		}

		let registry = Arc::new(self.fetch_registry().await?);

		*self.registry.write() = Some(Arc::clone(&registry));

		Ok(registry)
	}

	fn cached_registry(&self) -> Option<Arc<ServiceRegistry>> {
		self.registry.read().clone()
	}

	async fn fetch_registry(&self) -> Result<ServiceRegistry> {
		let value = self.get_json("services", &[SERVICES_ENDPOINT], &QueryParams::new()).await?;
		let response = endpoint::decode_value(SERVICES_ENDPOINT, value)?;

		Ok(ServiceRegistry::from_response(response))
	}
}
