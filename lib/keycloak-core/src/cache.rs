//! Read-only cache view of cluster resources

use kube::Resource;
use kube_runtime::reflector::{ObjectRef, Store};
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use crate::{CoreError, Result};

/// Namespace and name identifying a namespaced resource of a known kind
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ResourceKey {
    pub namespace: String,
    pub name: String,
}

impl ResourceKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Key of an existing object; both name and namespace must be set
    pub fn of<K>(obj: &K) -> Result<Self>
    where
        K: Resource,
        K::DynamicType: Default,
    {
        let meta = obj.meta();
        match (meta.namespace.as_ref(), meta.name.as_ref()) {
            (Some(namespace), Some(name)) => Ok(Self::new(namespace.as_str(), name.as_str())),
            _ => Err(CoreError::InvalidConfiguration(format!(
                "{} is missing a name or namespace",
                K::kind(&Default::default())
            ))),
        }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Eventually consistent view of the resources of kind `K`.
///
/// A miss means the object does not exist yet or the cache has not caught up.
pub trait CacheAccessor<K> {
    fn get(&self, key: &ResourceKey) -> Option<Arc<K>>;
}

impl<K> CacheAccessor<K> for Store<K>
where
    K: Resource + Clone + 'static,
    K::DynamicType: Default + Eq + Hash + Clone,
{
    fn get(&self, key: &ResourceKey) -> Option<Arc<K>> {
        Store::get(self, &ObjectRef::new(&key.name).within(&key.namespace))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{cache_of, service_named};
    use k8s_openapi::api::core::v1::Service;

    #[test]
    fn test_key_of_object() {
        let svc = service_named("ns", "kc-service");
        assert_eq!(
            ResourceKey::of(&svc).unwrap(),
            ResourceKey::new("ns", "kc-service")
        );
    }

    #[test]
    fn test_key_of_object_without_namespace() {
        let mut svc = service_named("ns", "kc-service");
        svc.metadata.namespace = None;
        let err = ResourceKey::of(&svc).unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_store_lookup_is_namespace_scoped() {
        let cache = cache_of(vec![
            service_named("ns", "kc-service"),
            service_named("other", "kc-service"),
        ]);

        let hit: Option<Arc<Service>> =
            CacheAccessor::get(&cache, &ResourceKey::new("other", "kc-service"));
        assert_eq!(
            hit.unwrap().metadata.namespace.as_deref(),
            Some("other")
        );
        let miss: Option<Arc<Service>> =
            CacheAccessor::get(&cache, &ResourceKey::new("missing", "kc-service"));
        assert!(miss.is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(ResourceKey::new("ns", "kc").to_string(), "ns/kc");
    }
}
