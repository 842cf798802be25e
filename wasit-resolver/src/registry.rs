//! Service registry — the registration table.
//!
//! Maps [`ServiceKey`] to a [`Registration`]: the factory, the lifetime,
//! and the cache slot a singleton fills on first successful resolution.
//! The registry itself never runs factories; that is the resolver's job.

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::debug;

use crate::dispose::AsyncDispose;
use crate::error::Result;
use crate::key::ServiceKey;
use crate::lifetime::Lifetime;
use crate::resolver::Resolver;

/// Type-erased shared instance.
pub(crate) type AnyArc = Arc<dyn Any + Send + Sync>;

/// Boxed future used by async factories.
pub(crate) type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// What a factory hands back: the erased instance plus the teardown
/// capability captured at registration time, if the service opted in.
pub(crate) struct Produced {
    pub instance: AnyArc,
    pub disposer: Option<Arc<dyn AsyncDispose>>,
}

pub(crate) type SyncFactoryFn =
    Arc<dyn Fn(&Resolver) -> Result<Produced> + Send + Sync>;
pub(crate) type AsyncFactoryFn =
    Arc<dyn Fn(Resolver) -> BoxFuture<Result<Produced>> + Send + Sync>;

/// The sync/async fork is fixed at registration time, so the sync
/// resolution path can refuse an async registration without running
/// anything.
#[derive(Clone)]
pub(crate) enum Factory {
    Sync(SyncFactoryFn),
    Async(AsyncFactoryFn),
}

/// A singleton's filled cache slot.
#[derive(Clone)]
pub(crate) struct CachedService {
    pub instance: AnyArc,
    pub disposer: Option<Arc<dyn AsyncDispose>>,
}

/// Registration entry for a single service.
///
/// The cache slot is a [`OnceCell`]: structurally absent until the first
/// successful singleton resolution, written exactly once afterwards.
/// "Never resolved" and "resolved" are distinct states regardless of
/// what value was produced.
pub(crate) struct Registration {
    pub key: ServiceKey,
    pub lifetime: Lifetime,
    pub factory: Factory,
    pub cached: OnceCell<CachedService>,
}

impl Registration {
    pub(crate) fn new(key: ServiceKey, lifetime: Lifetime, factory: Factory) -> Self {
        Self {
            key,
            lifetime,
            factory,
            cached: OnceCell::new(),
        }
    }

    /// Registration for a pre-built instance: singleton lifetime, cache
    /// already filled, and a constant factory so the record has the same
    /// shape as a factory-built singleton.
    pub(crate) fn with_instance(key: ServiceKey, service: CachedService) -> Self {
        let snapshot = service.clone();
        let factory = Factory::Sync(Arc::new(move |_| {
            Ok(Produced {
                instance: snapshot.instance.clone(),
                disposer: snapshot.disposer.clone(),
            })
        }));

        let cached = OnceCell::new();
        let _ = cached.set(service);

        Self {
            key,
            lifetime: Lifetime::Singleton,
            factory,
            cached,
        }
    }
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("key", &self.key)
            .field("lifetime", &self.lifetime)
            .field("cached", &self.cached.get().is_some())
            .finish()
    }
}

/// Stores all registrations for one resolver.
///
/// Iteration order is insertion order: removal only ever clears
/// everything, so the order vector and the map stay in step by
/// construction.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    entries: HashMap<ServiceKey, Registration>,
    order: Vec<ServiceKey>,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Stores a registration; last write wins, the whole record is
    /// replaced (no merge). A re-registered key keeps its original
    /// position in iteration order.
    pub(crate) fn insert(&mut self, registration: Registration) {
        let key = registration.key.clone();
        debug!(key = %key, lifetime = %registration.lifetime, "Registered service");

        if !self.entries.contains_key(&key) {
            self.order.push(key.clone());
        }
        self.entries.insert(key, registration);
    }

    pub(crate) fn get(&self, key: &ServiceKey) -> Option<&Registration> {
        self.entries.get(key)
    }

    pub(crate) fn contains(&self, key: &ServiceKey) -> bool {
        self.entries.contains_key(key)
    }

    /// All registered keys, oldest first.
    pub(crate) fn keys(&self) -> Vec<ServiceKey> {
        self.order.clone()
    }

    /// Registrations in insertion order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Registration> {
        self.order.iter().filter_map(|key| self.entries.get(key))
    }

    /// Drops every registration. Does NOT run disposal — callers that
    /// want teardown go through the resolver's `dispose()` first.
    pub(crate) fn clear(&mut self) {
        debug!(dropped = self.entries.len(), "Cleared registry");
        self.entries.clear();
        self.order.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
