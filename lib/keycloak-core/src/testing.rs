//! Test fixtures shared by the unit tests of this crate

use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Service, ServicePort, ServiceSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use keycloak_api::{HttpSpec, Keycloak, KeycloakSpec};
use kube_runtime::reflector::store::Writer;
use kube_runtime::reflector::Store;
use kube_runtime::watcher;
use tokio::sync::Mutex;

use crate::{CoreError, ResourceKey, Result, WriteableStore};

pub fn keycloak(name: &str, namespace: &str, http: Option<HttpSpec>) -> Keycloak {
    let mut kc = Keycloak::new(
        name,
        KeycloakSpec {
            http,
            ..Default::default()
        },
    );
    kc.metadata.namespace = Some(namespace.to_string());
    kc.metadata.uid = Some(format!("uid-{}", name));
    kc
}

/// Bare Service with only a name and namespace
pub fn service_named(namespace: &str, name: &str) -> Service {
    Service {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Reflector store pre-populated with `services`
pub fn cache_of(services: Vec<Service>) -> Store<Service> {
    let mut writer: Writer<Service> = Writer::default();
    for svc in services {
        writer.apply_watcher_event(&watcher::Event::Apply(svc));
    }
    writer.as_reader()
}

/// Fill in what the API server adds to a Service on write
pub fn server_defaults(mut svc: Service, resource_version: &str) -> Service {
    svc.metadata.uid.get_or_insert_with(|| "svc-uid".to_string());
    svc.metadata.resource_version = Some(resource_version.to_string());

    let spec = svc.spec.get_or_insert_with(ServiceSpec::default);
    spec.cluster_ip.get_or_insert_with(|| "10.96.0.10".to_string());
    spec.type_.get_or_insert_with(|| "ClusterIP".to_string());
    spec.session_affinity.get_or_insert_with(|| "None".to_string());
    for port in spec.ports.iter_mut().flatten() {
        default_target_port(port);
    }
    svc
}

fn default_target_port(port: &mut ServicePort) {
    if port.target_port.is_none() {
        port.target_port = Some(IntOrString::Int(port.port));
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum WriteCall {
    Create(Service),
    Update(ResourceKey, Service),
}

/// [`WriteableStore`] recording every call and answering like an API server
#[derive(Default)]
pub struct RecordingStore {
    calls: Mutex<Vec<WriteCall>>,
    conflict: bool,
}

impl RecordingStore {
    pub fn conflicting() -> Self {
        Self {
            conflict: true,
            ..Default::default()
        }
    }

    pub async fn calls(&self) -> Vec<WriteCall> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl WriteableStore<Service> for RecordingStore {
    async fn create(&self, desired: &Service) -> Result<Service> {
        self.calls.lock().await.push(WriteCall::Create(desired.clone()));
        if self.conflict {
            return Err(CoreError::Conflict(format!(
                "{}: already exists",
                ResourceKey::of(desired)?
            )));
        }
        Ok(server_defaults(desired.clone(), "1"))
    }

    async fn update(&self, key: &ResourceKey, desired: &Service) -> Result<Service> {
        self.calls
            .lock()
            .await
            .push(WriteCall::Update(key.clone(), desired.clone()));
        if self.conflict {
            return Err(CoreError::Conflict(format!("{}: object was modified", key)));
        }
        let next = desired
            .metadata
            .resource_version
            .as_deref()
            .and_then(|rv| rv.parse::<u64>().ok())
            .map_or(1, |rv| rv + 1);
        Ok(server_defaults(desired.clone(), &next.to_string()))
    }
}
