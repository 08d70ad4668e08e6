//! Keycloak controller for reconciling the Service owned by each Keycloak

use chrono::Utc;
use futures::StreamExt;
use k8s_openapi::api::core::v1::Service;
use keycloak_api::constants::{FIELD_MANAGER, MANAGED_BY_SELECTOR};
use keycloak_api::Keycloak;
use keycloak_core::{reconcile_service, CoreError, KubeStore, ServiceOutcome};
use kube::api::{Patch, PatchParams};
use kube::core::NamespaceResourceScope;
use kube::{Api, Client, Resource, ResourceExt};
use kube_runtime::controller::Action;
use kube_runtime::reflector::{self, Store};
use kube_runtime::{watcher, Controller, WatchStreamExt};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::config::OperatorConfig;
use crate::status::next_status;

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Service(#[from] CoreError),

    #[error("Failed to update Keycloak status: {0}")]
    Status(#[source] kube::Error),
}

impl ReconcileError {
    fn is_conflict(&self) -> bool {
        match self {
            ReconcileError::Service(e) => e.is_conflict(),
            ReconcileError::Status(kube::Error::Api(response)) => response.code == 409,
            ReconcileError::Status(_) => false,
        }
    }
}

/// State shared by all reconciliations
pub struct Context {
    client: Client,
    services: Store<Service>,
    writer: KubeStore<Service>,
    config: OperatorConfig,
}

impl Context {
    /// Record the outcome of a pass as the `HasErrors` condition
    async fn report_status(
        &self,
        keycloak: &Keycloak,
        error: Option<&CoreError>,
    ) -> Result<(), ReconcileError> {
        let message = error.map(ToString::to_string);
        let Some(status) = next_status(
            keycloak.status.as_ref(),
            keycloak.metadata.generation,
            message.as_deref(),
            Utc::now(),
        ) else {
            return Ok(());
        };
        let Some(namespace) = keycloak.namespace() else {
            return Ok(());
        };

        let api: Api<Keycloak> = Api::namespaced(self.client.clone(), &namespace);
        let params = PatchParams {
            field_manager: Some(FIELD_MANAGER.to_string()),
            ..Default::default()
        };
        api.patch_status(
            &keycloak.name_any(),
            &params,
            &Patch::Merge(json!({ "status": status })),
        )
        .await
        .map_err(ReconcileError::Status)?;
        Ok(())
    }
}

pub struct KeycloakController {
    client: Client,
    config: OperatorConfig,
}

impl KeycloakController {
    pub fn new(client: Client, config: OperatorConfig) -> Self {
        Self { client, config }
    }

    fn api<K>(&self) -> Api<K>
    where
        K: Resource<Scope = NamespaceResourceScope>,
        K::DynamicType: Default,
    {
        match &self.config.watch_namespace {
            Some(namespace) => Api::namespaced(self.client.clone(), namespace),
            None => Api::all(self.client.clone()),
        }
    }

    /// Run until a shutdown signal is received
    pub async fn run(self) -> anyhow::Result<()> {
        info!(
            namespace = self.config.watch_namespace.as_deref().unwrap_or("*"),
            "Starting Keycloak reconciliation"
        );

        let keycloaks: Api<Keycloak> = self.api();
        let services: Api<Service> = self.api();

        // Only Services carrying the managed-by label are mirrored
        let (service_store, service_writer) = reflector::store();
        let service_stream = watcher(services, watcher::Config::default().labels(MANAGED_BY_SELECTOR))
            .default_backoff()
            .reflect(service_writer)
            .touched_objects();

        let context = Arc::new(Context {
            client: self.client.clone(),
            services: service_store,
            writer: KubeStore::new(self.client.clone(), FIELD_MANAGER),
            config: self.config,
        });

        let mut stream = Controller::new(keycloaks, watcher::Config::default())
            .owns_stream(service_stream)
            .shutdown_on_signal()
            .run(reconcile, error_policy, context)
            .boxed();

        // Process the reconciliation stream
        while let Some(item) = stream.next().await {
            match item {
                Ok((keycloak, _)) => debug!(keycloak = %keycloak, "Reconciled Keycloak successfully"),
                Err(e) => error!("Error in reconciliation stream: {}", e),
            }
        }

        Ok(())
    }
}

async fn reconcile(keycloak: Arc<Keycloak>, ctx: Arc<Context>) -> Result<Action, ReconcileError> {
    let namespace = keycloak.namespace().unwrap_or_default();
    let name = keycloak.name_any();
    info!(%namespace, %name, "Reconciling Keycloak");

    let outcome = reconcile_service(&keycloak, &ctx.services, &ctx.writer).await;
    let status = ctx.report_status(&keycloak, outcome.as_ref().err()).await;

    match (outcome, status) {
        (Ok(outcome), Ok(())) => {
            match outcome {
                ServiceOutcome::Created(_) => info!(%namespace, %name, "Created Keycloak Service"),
                ServiceOutcome::Updated(_) => info!(%namespace, %name, "Updated Keycloak Service"),
                ServiceOutcome::Unchanged => debug!(%namespace, %name, "Keycloak Service unchanged"),
            }
            Ok(Action::requeue(ctx.config.requeue))
        }
        (Ok(_), Err(e)) => Err(e),
        (Err(e), status) => {
            if let Err(status_err) = status {
                warn!(%namespace, %name, "Could not report failure in status: {}", status_err);
            }
            Err(e.into())
        }
    }
}

fn error_policy(keycloak: Arc<Keycloak>, err: &ReconcileError, ctx: Arc<Context>) -> Action {
    let namespace = keycloak.namespace().unwrap_or_default();
    let name = keycloak.name_any();
    if err.is_conflict() {
        warn!(%namespace, %name, "Conflict reconciling Keycloak, retrying: {}", err);
        Action::requeue(ctx.config.conflict_requeue)
    } else {
        error!(%namespace, %name, "Error reconciling Keycloak: {}", err);
        Action::requeue(ctx.config.error_requeue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::error::ErrorResponse;

    fn api_error(code: u16) -> kube::Error {
        kube::Error::Api(ErrorResponse {
            status: "Failure".to_string(),
            message: "the object has been modified".to_string(),
            reason: "Conflict".to_string(),
            code,
        })
    }

    #[test]
    fn test_conflicts_are_detected() {
        assert!(ReconcileError::Service(CoreError::Conflict("ns/kc-service".to_string())).is_conflict());
        assert!(ReconcileError::Status(api_error(409)).is_conflict());
    }

    #[test]
    fn test_other_errors_are_not_conflicts() {
        assert!(!ReconcileError::Service(CoreError::InvalidConfiguration("port".to_string())).is_conflict());
        assert!(!ReconcileError::Status(api_error(500)).is_conflict());
    }
}
