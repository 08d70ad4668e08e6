//! Core reconciliation logic for the Keycloak Service
//!
//! This library provides:
//! - Desired-state computation of the Service owned by a Keycloak
//! - Discrimination of that Service among all operator-managed Services
//! - Cache and write-side abstractions over the reflector and API server
//! - The reconciliation driver tying them together

pub mod cache;
pub mod discriminator;
pub mod error;
pub mod reconcile;
pub mod service;
pub mod store;

#[cfg(test)]
mod testing;

pub use cache::{CacheAccessor, ResourceKey};
pub use discriminator::{find_current, service_key};
pub use error::{CoreError, Result};
pub use reconcile::{reconcile_service, ServiceOutcome};
pub use service::{desired_service, instance_labels, service_name, service_port};
pub use store::{KubeStore, WriteableStore};
