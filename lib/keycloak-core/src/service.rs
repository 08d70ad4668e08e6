//! Desired state of the Service exposing a Keycloak

use k8s_openapi::api::core::v1::{Service, ServicePort, ServiceSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use keycloak_api::constants::{
    APP_LABEL, APP_LABEL_VALUE, INSTANCE_LABEL, KEYCLOAK_HTTPS_PORT, KEYCLOAK_HTTPS_PORT_NAME,
    KEYCLOAK_HTTP_PORT, KEYCLOAK_HTTP_PORT_NAME, KEYCLOAK_SERVICE_PROTOCOL,
    KEYCLOAK_SERVICE_SUFFIX, MANAGED_BY_LABEL, MANAGED_BY_VALUE,
};
use keycloak_api::Keycloak;
use kube::Resource;
use std::collections::BTreeMap;

use crate::{CoreError, Result};

/// Name of the Service owned by `keycloak`
pub fn service_name(keycloak: &Keycloak) -> Result<String> {
    let name = keycloak_name(keycloak)?;
    Ok(format!("{}{}", name, KEYCLOAK_SERVICE_SUFFIX))
}

/// Labels identifying every resource belonging to `keycloak`.
///
/// Also used as the Service selector, so they must match the Keycloak pods.
pub fn instance_labels(keycloak: &Keycloak) -> Result<BTreeMap<String, String>> {
    let name = keycloak_name(keycloak)?;
    Ok(BTreeMap::from([
        (APP_LABEL.to_string(), APP_LABEL_VALUE.to_string()),
        (MANAGED_BY_LABEL.to_string(), MANAGED_BY_VALUE.to_string()),
        (INSTANCE_LABEL.to_string(), name.to_string()),
    ]))
}

/// Port the Service exposes.
///
/// Without TLS Keycloak is assumed to answer plain HTTP only, so exactly one
/// of the HTTP or HTTPS ports is ever exposed.
pub fn service_port(keycloak: &Keycloak) -> Result<i32> {
    let http = keycloak.spec.http.as_ref();
    let (field, port) = if keycloak.is_tls_configured() {
        (
            "httpsPort",
            http.and_then(|h| h.https_port).unwrap_or(KEYCLOAK_HTTPS_PORT),
        )
    } else {
        (
            "httpPort",
            http.and_then(|h| h.http_port).unwrap_or(KEYCLOAK_HTTP_PORT),
        )
    };

    if !(1..=65535).contains(&port) {
        return Err(CoreError::InvalidConfiguration(format!(
            "spec.http.{} {} is outside 1-65535",
            field, port
        )));
    }
    Ok(port)
}

fn service_port_name(keycloak: &Keycloak) -> &'static str {
    if keycloak.is_tls_configured() {
        KEYCLOAK_HTTPS_PORT_NAME
    } else {
        KEYCLOAK_HTTP_PORT_NAME
    }
}

/// Compute the Service `keycloak` should own
pub fn desired_service(keycloak: &Keycloak) -> Result<Service> {
    let namespace = keycloak.metadata.namespace.clone().ok_or_else(|| {
        CoreError::InvalidConfiguration("Keycloak is missing metadata.namespace".to_string())
    })?;
    let labels = instance_labels(keycloak)?;

    Ok(Service {
        metadata: ObjectMeta {
            name: Some(service_name(keycloak)?),
            namespace: Some(namespace),
            labels: Some(labels.clone()),
            owner_references: keycloak.controller_owner_ref(&()).map(|owner| vec![owner]),
            ..Default::default()
        },
        spec: Some(ServiceSpec {
            ports: Some(vec![ServicePort {
                name: Some(service_port_name(keycloak).to_string()),
                port: service_port(keycloak)?,
                protocol: Some(KEYCLOAK_SERVICE_PROTOCOL.to_string()),
                ..Default::default()
            }]),
            selector: Some(labels),
            ..Default::default()
        }),
        ..Default::default()
    })
}

fn keycloak_name(keycloak: &Keycloak) -> Result<&str> {
    keycloak
        .metadata
        .name
        .as_deref()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| CoreError::InvalidConfiguration("Keycloak is missing metadata.name".to_string()))
}
