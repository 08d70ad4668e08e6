/// API version v2alpha1 for Keycloak CRDs

pub mod keycloak;

pub use keycloak::{HostnameSpec, HttpSpec, Keycloak, KeycloakSpec, KeycloakStatus, KeycloakStatusCondition};
