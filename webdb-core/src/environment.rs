//! # Database Environments
//!
//! A [`DatabaseEnvironment`] is the type metadata associated with one remote endpoint. It is
//! used to resolve the `_type` of every query sent to and every object read from that
//! endpoint.
//!
//! Environments are computed lazily and at most once per endpoint identity (URL and remote
//! database name), then shared for the lifetime of the process through the
//! [`EnvironmentCache`].
use crate::{
    client::RemoteEndpoint,
    registry::{ObjectType, TypeLookup, TypeRegistry},
};
use once_cell::sync::{Lazy, OnceCell};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError, RwLock},
};
use uuid::Uuid;

/// Type metadata of one remote endpoint.
///
/// Every client configured for the endpoint contributes its types, so the environment knows
/// the union of their registries whatever order the clients were created in.
#[derive(Debug)]
pub struct DatabaseEnvironment {
    endpoint: RemoteEndpoint,
    types: RwLock<TypeRegistry>,
}

impl DatabaseEnvironment {
    pub fn new(endpoint: RemoteEndpoint, types: TypeRegistry) -> Self {
        Self {
            endpoint,
            types: RwLock::new(types),
        }
    }

    /// The endpoint this environment was computed for.
    pub fn endpoint(&self) -> &RemoteEndpoint {
        &self.endpoint
    }

    /// A snapshot of the types currently known for this endpoint.
    pub fn types(&self) -> TypeRegistry {
        self.types.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Adds the types of `registry`, replacing known types with the same id or name.
    pub fn register_all(&self, registry: &TypeRegistry) {
        if registry.is_empty() {
            return;
        }
        self.types
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .merge(registry);
    }
}

impl TypeLookup for DatabaseEnvironment {
    fn by_id(&self, id: &Uuid) -> Option<Arc<ObjectType>> {
        self.types
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .by_id(id)
    }

    fn by_name(&self, name: &str) -> Option<Arc<ObjectType>> {
        self.types
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .by_name(name)
    }
}

type Slot = Arc<OnceCell<Arc<DatabaseEnvironment>>>;

static GLOBAL: Lazy<EnvironmentCache> = Lazy::new(EnvironmentCache::new);

/// A memoizing map from endpoint identity to its environment.
///
/// The first access for an endpoint computes its environment exactly once, even when several
/// threads race on it: the map lock is only held to fetch the per-endpoint slot, and the
/// computation runs on that slot so that other endpoints are never blocked by it.
/// Entries are never evicted.
#[derive(Debug, Default)]
pub struct EnvironmentCache {
    slots: Mutex<HashMap<RemoteEndpoint, Slot>>,
}

impl EnvironmentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide cache.
    pub fn global() -> &'static EnvironmentCache {
        &GLOBAL
    }

    /// Returns the environment of `endpoint`, computing it with `produce` on the first access.
    pub fn get_or_init<F>(&self, endpoint: &RemoteEndpoint, produce: F) -> Arc<DatabaseEnvironment>
    where
        F: FnOnce() -> DatabaseEnvironment,
    {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            slots.entry(endpoint.clone()).or_default().clone()
        };

        slot.get_or_init(|| {
            tracing::debug!(url = endpoint.url(), database = ?endpoint.database(), "computing database environment");
            Arc::new(produce())
        })
        .clone()
    }

    /// Returns the environment of `endpoint` if it has already been computed.
    pub fn get(&self, endpoint: &RemoteEndpoint) -> Option<Arc<DatabaseEnvironment>> {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.get(endpoint).and_then(|slot| slot.get().cloned())
    }

    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
