//! Keycloak API types and CRDs for Kubernetes integration
//!
//! This library defines the custom resources watched by the keycloak-operator:
//! - Keycloak: a Keycloak server deployment and its HTTP/TLS configuration
//!
//! It also carries the naming and labelling constants shared by everything
//! the operator creates on behalf of a Keycloak.

pub mod constants;
pub mod v2alpha1;

pub use v2alpha1::{HttpSpec, Keycloak, KeycloakSpec, KeycloakStatus, KeycloakStatusCondition};
