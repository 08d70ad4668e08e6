//! Reconciliation of the Service owned by a Keycloak

use k8s_openapi::api::core::v1::{Service, ServicePort};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use keycloak_api::constants::{MANAGED_BY_LABEL, MANAGED_BY_SELECTOR};
use keycloak_api::Keycloak;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::{desired_service, find_current, CacheAccessor, CoreError, ResourceKey, Result, WriteableStore};

/// Result of one reconciliation pass
#[derive(Clone, Debug, PartialEq)]
pub enum ServiceOutcome {
    /// The Service did not exist and was created
    Created(Service),
    /// The Service drifted from the desired state and was replaced
    Updated(Service),
    /// The Service already matched the desired state
    Unchanged,
}

/// Drive the Service owned by `keycloak` towards its desired state.
///
/// Safe to call any number of times: a pass against a cache that already
/// reflects the desired state writes nothing. Write failures, conflicts
/// included, are returned to the caller for retry.
pub async fn reconcile_service<C, S>(
    keycloak: &Keycloak,
    cache: &C,
    store: &S,
) -> Result<ServiceOutcome>
where
    C: CacheAccessor<Service> + ?Sized,
    S: WriteableStore<Service> + ?Sized,
{
    let desired = desired_service(keycloak)?;
    let key = ResourceKey::of(&desired)?;

    let Some(current) = find_current(keycloak, cache)? else {
        info!(service = %key, "Creating Keycloak Service");
        let created = match store.create(&desired).await {
            Err(CoreError::Conflict(reason)) => {
                // Usually a Service whose managed-by label was removed
                warn!(
                    service = %key,
                    "Keycloak Service exists but is not cached, check its {} label",
                    MANAGED_BY_LABEL
                );
                return Err(CoreError::Conflict(format!(
                    "{}; the existing Service may lack the {} label",
                    reason, MANAGED_BY_SELECTOR
                )));
            }
            other => other?,
        };
        return Ok(ServiceOutcome::Created(created));
    };

    if ManagedFields::of(&current) == ManagedFields::of(&desired)
        && !needs_adoption(&current, &desired)
    {
        debug!(service = %key, "Keycloak Service is up to date");
        return Ok(ServiceOutcome::Unchanged);
    }

    info!(service = %key, "Updating drifted Keycloak Service");
    let merged = merge_managed(&current, &desired);
    let updated = store.update(&key, &merged).await?;
    Ok(ServiceOutcome::Updated(updated))
}

/// The parts of a Service this operator owns
#[derive(Debug, PartialEq)]
struct ManagedFields<'a> {
    labels: Option<&'a BTreeMap<String, String>>,
    selector: Option<&'a BTreeMap<String, String>>,
    ports: Vec<(Option<&'a str>, i32, &'a str)>,
}

impl<'a> ManagedFields<'a> {
    fn of(svc: &'a Service) -> Self {
        let spec = svc.spec.as_ref();
        Self {
            labels: non_empty(svc.metadata.labels.as_ref()),
            selector: non_empty(spec.and_then(|s| s.selector.as_ref())),
            // targetPort and nodePort are server-assigned and not compared
            ports: spec
                .and_then(|s| s.ports.as_ref())
                .into_iter()
                .flatten()
                .map(|p| {
                    (
                        p.name.as_deref(),
                        p.port,
                        p.protocol.as_deref().unwrap_or("TCP"),
                    )
                })
                .collect(),
        }
    }
}

fn non_empty(map: Option<&BTreeMap<String, String>>) -> Option<&BTreeMap<String, String>> {
    map.filter(|m| !m.is_empty())
}

fn controller_of(svc: &Service) -> Option<&OwnerReference> {
    svc.metadata
        .owner_references
        .iter()
        .flatten()
        .find(|owner| owner.controller == Some(true))
}

/// True when `desired` names a controller that `current` is not owned by
fn needs_adoption(current: &Service, desired: &Service) -> bool {
    match controller_of(desired) {
        Some(wanted) => controller_of(current).map_or(true, |owner| owner.uid != wanted.uid),
        None => false,
    }
}

/// Overwrite the managed fields of `current` with those of `desired`.
///
/// Everything else on `current` (uid, resourceVersion, clusterIPs,
/// annotations, type) is kept so the replace does not erase it.
fn merge_managed(current: &Service, desired: &Service) -> Service {
    let mut merged = current.clone();
    merged.metadata.labels = desired.metadata.labels.clone();
    if let Some(wanted) = controller_of(desired).cloned() {
        // Only one controller reference is allowed; plain owners are kept.
        let mut owners: Vec<OwnerReference> = merged
            .metadata
            .owner_references
            .take()
            .unwrap_or_default()
            .into_iter()
            .filter(|owner| owner.controller != Some(true))
            .collect();
        owners.push(wanted);
        merged.metadata.owner_references = Some(owners);
    }

    let desired_spec = desired.spec.clone().unwrap_or_default();
    let spec = merged.spec.get_or_insert_with(Default::default);
    let current_ports = spec.ports.take().unwrap_or_default();
    spec.ports = desired_spec.ports.map(|ports| {
        ports
            .into_iter()
            .map(|port| keep_node_port(port, &current_ports))
            .collect()
    });
    spec.selector = desired_spec.selector;
    merged
}

fn keep_node_port(mut port: ServicePort, current: &[ServicePort]) -> ServicePort {
    if let Some(existing) = current.iter().find(|p| p.name == port.name) {
        port.node_port = existing.node_port;
    }
    port
}
