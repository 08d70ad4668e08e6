//! Write side of dependent resource management

use async_trait::async_trait;
use kube::api::PostParams;
use kube::core::NamespaceResourceScope;
use kube::{Api, Client, Resource};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use std::marker::PhantomData;
use tracing::debug;

use crate::{CoreError, ResourceKey, Result};

/// Writes resources of kind `K` to the cluster.
///
/// Conflicts are returned as [`CoreError::Conflict`] and never retried here.
#[async_trait]
pub trait WriteableStore<K>: Send + Sync {
    /// Create `desired`; fails with a conflict if it already exists
    async fn create(&self, desired: &K) -> Result<K>;

    /// Replace the object identified by `key` with `desired`.
    ///
    /// `desired` must carry the resource version it was derived from so a
    /// concurrent change is detected as a conflict instead of overwritten.
    async fn update(&self, key: &ResourceKey, desired: &K) -> Result<K>;
}

/// [`WriteableStore`] backed by the Kubernetes API server
pub struct KubeStore<K> {
    client: Client,
    field_manager: String,
    _kind: PhantomData<fn() -> K>,
}

impl<K> KubeStore<K> {
    pub fn new(client: Client, field_manager: impl Into<String>) -> Self {
        Self {
            client,
            field_manager: field_manager.into(),
            _kind: PhantomData,
        }
    }

    fn post_params(&self) -> PostParams {
        PostParams {
            dry_run: false,
            field_manager: Some(self.field_manager.clone()),
        }
    }
}

#[async_trait]
impl<K> WriteableStore<K> for KubeStore<K>
where
    K: Resource<Scope = NamespaceResourceScope>
        + Clone
        + Debug
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static,
    K::DynamicType: Default,
{
    async fn create(&self, desired: &K) -> Result<K> {
        let key = ResourceKey::of(desired)?;
        let api: Api<K> = Api::namespaced(self.client.clone(), &key.namespace);

        debug!(namespace = %key.namespace, name = %key.name, "Creating {}", K::kind(&Default::default()));
        api.create(&self.post_params(), desired)
            .await
            .map_err(|e| CoreError::from_write(e, &key))
    }

    async fn update(&self, key: &ResourceKey, desired: &K) -> Result<K> {
        let api: Api<K> = Api::namespaced(self.client.clone(), &key.namespace);

        debug!(namespace = %key.namespace, name = %key.name, "Replacing {}", K::kind(&Default::default()));
        api.replace(&key.name, &self.post_params(), desired)
            .await
            .map_err(|e| CoreError::from_write(e, key))
    }
}
