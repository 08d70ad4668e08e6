//! Resolution of the Service belonging to a Keycloak
//!
//! Every Service the operator manages carries the same managed-by label, so
//! the label selector used to fill the cache matches the Services of all
//! Keycloak instances. The owned Service is picked out by its derived name in
//! the Keycloak's namespace instead.

use k8s_openapi::api::core::v1::Service;
use keycloak_api::Keycloak;
use std::sync::Arc;
use tracing::debug;

use crate::{service_name, CacheAccessor, CoreError, ResourceKey, Result};

/// Cache key of the Service owned by `keycloak`
pub fn service_key(keycloak: &Keycloak) -> Result<ResourceKey> {
    let namespace = keycloak.metadata.namespace.as_deref().ok_or_else(|| {
        CoreError::InvalidConfiguration("Keycloak is missing metadata.namespace".to_string())
    })?;
    Ok(ResourceKey::new(namespace, service_name(keycloak)?))
}

/// Find the Service owned by `keycloak`.
///
/// `Ok(None)` is the normal state before the Service has been created, and
/// also what an unsynced cache reports.
pub fn find_current<C>(keycloak: &Keycloak, cache: &C) -> Result<Option<Arc<Service>>>
where
    C: CacheAccessor<Service> + ?Sized,
{
    let key = service_key(keycloak)?;
    let current = cache.get(&key);
    debug!(service = %key, found = current.is_some(), "Looked up Keycloak Service");
    Ok(current)
}
