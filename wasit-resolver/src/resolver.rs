//! # The Resolver — heart of Wasit
//!
//! The runtime service resolver: callers register how to build a service
//! under a key, and the resolver later produces instances, reusing
//! cached singletons or building transients fresh.
//!
//! # Architecture
//! ```text
//! register*()  ──>  Registry (key → factory + lifetime + cache slot)
//!                      ▲
//! resolve() ───────────┘ cache hit: return cached Arc
//! resolve_async()        cache miss: push key, run factory
//!                                    (factory may re-enter resolve)
//! dispose()    ──>  await teardown of cached instances, then clear
//! ```
//!
//! # Examples
//! ```rust
//! use wasit_resolver::prelude::*;
//! use std::sync::Arc;
//!
//! struct Database {
//!     url: String,
//! }
//!
//! struct UserRepo {
//!     db: Arc<Database>,
//! }
//!
//! let resolver = Resolver::new();
//! resolver.register_singleton("database", |_| {
//!     Ok(Database { url: "postgres://localhost".into() })
//! });
//! resolver.register_transient("user_repo", |r| {
//!     let db = r.resolve::<Database>("database")?;
//!     Ok(UserRepo { db })
//! });
//!
//! let repo = resolver.resolve::<UserRepo>("user_repo").expect("resolves");
//! assert_eq!(repo.db.url, "postgres://localhost");
//! ```

use std::any::type_name;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, trace, warn};

use crate::dispose::AsyncDispose;
use crate::error::{NotFoundError, Result, WasitError};
use crate::key::{IntoServiceKey, ServiceKey};
use crate::lifetime::Lifetime;
use crate::metrics::ResolutionMetrics;
use crate::registry::{
    AnyArc, AsyncFactoryFn, BoxFuture, CachedService, Factory, Produced, Registration, Registry,
    SyncFactoryFn,
};
use crate::stack::ResolutionStack;

// ═══════════════════════════════════════════
// Resolver
// ═══════════════════════════════════════════

/// Thread-safe, runtime-mutable service resolver.
///
/// Cloning is cheap and clones share the same registry, resolution
/// stack, and metrics; separately created resolvers are fully
/// independent.
///
/// Locks are held only for short critical sections — never across a
/// factory invocation or an `await` — so factories are free to resolve
/// their own dependencies re-entrantly.
#[derive(Clone, Default)]
pub struct Resolver {
    inner: Arc<ResolverInner>,
}

#[derive(Default)]
struct ResolverInner {
    registry: parking_lot::RwLock<Registry>,
    stack: ResolutionStack,
    metrics: ResolutionMetrics,
}

impl Resolver {
    /// Creates an empty resolver.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ResolverInner {
                registry: parking_lot::RwLock::new(Registry::new()),
                stack: ResolutionStack::new(),
                metrics: ResolutionMetrics::new(),
            }),
        }
    }

    // ── Registration ──

    /// Registers a factory under `key` with an explicit lifetime.
    ///
    /// Last write wins: re-registering a key replaces the whole record,
    /// including any cached singleton. Holders of already-resolved
    /// instances keep what they have.
    ///
    /// The factory receives the resolver so it can resolve its own
    /// dependencies.
    pub fn register<T, K, F>(&self, key: K, lifetime: Lifetime, factory: F)
    where
        T: Send + Sync + 'static,
        K: IntoServiceKey,
        F: Fn(&Resolver) -> Result<T> + Send + Sync + 'static,
    {
        let erased: SyncFactoryFn = Arc::new(move |resolver: &Resolver| {
            let value = factory(resolver)?;
            Ok(Produced {
                instance: Arc::new(value) as AnyArc,
                disposer: None,
            })
        });
        self.insert(Registration::new(key.into_key(), lifetime, Factory::Sync(erased)));
    }

    /// Registers a singleton factory: called once on first resolve,
    /// the produced instance is cached and shared from then on.
    pub fn register_singleton<T, K, F>(&self, key: K, factory: F)
    where
        T: Send + Sync + 'static,
        K: IntoServiceKey,
        F: Fn(&Resolver) -> Result<T> + Send + Sync + 'static,
    {
        self.register(key, Lifetime::Singleton, factory);
    }

    /// Registers a transient factory: called on every resolve.
    pub fn register_transient<T, K, F>(&self, key: K, factory: F)
    where
        T: Send + Sync + 'static,
        K: IntoServiceKey,
        F: Fn(&Resolver) -> Result<T> + Send + Sync + 'static,
    {
        self.register(key, Lifetime::Transient, factory);
    }

    /// Registers an async factory under `key`.
    ///
    /// Only [`resolve_async`](Resolver::resolve_async) can run it; the
    /// sync path fails with [`WasitError::AsyncInSyncContext`].
    pub fn register_async<T, K, F, Fut>(&self, key: K, lifetime: Lifetime, factory: F)
    where
        T: Send + Sync + 'static,
        K: IntoServiceKey,
        F: Fn(Resolver) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let erased: AsyncFactoryFn =
            Arc::new(move |resolver: Resolver| -> BoxFuture<Result<Produced>> {
                let building = factory(resolver);
                Box::pin(async move {
                    let value = building.await?;
                    Ok(Produced {
                        instance: Arc::new(value) as AnyArc,
                        disposer: None,
                    })
                })
            });
        self.insert(Registration::new(key.into_key(), lifetime, Factory::Async(erased)));
    }

    /// Registers a pre-built instance as a singleton.
    ///
    /// The instance is available on the very next lookup; no factory
    /// runs, and `has()` is true before any resolution.
    pub fn register_instance<T, K>(&self, key: K, instance: T)
    where
        T: Send + Sync + 'static,
        K: IntoServiceKey,
    {
        let instance = Arc::new(instance);
        self.insert(Registration::with_instance(
            key.into_key(),
            CachedService {
                instance: instance as AnyArc,
                disposer: None,
            },
        ));
    }

    /// Like [`register`](Resolver::register), but captures the service's
    /// [`AsyncDispose`] capability so `dispose()` can tear it down.
    ///
    /// Only cached (singleton) instances are ever disposed; a transient
    /// registered this way is owned by whoever resolved it.
    pub fn register_disposable<T, K, F>(&self, key: K, lifetime: Lifetime, factory: F)
    where
        T: AsyncDispose + 'static,
        K: IntoServiceKey,
        F: Fn(&Resolver) -> Result<T> + Send + Sync + 'static,
    {
        let erased: SyncFactoryFn = Arc::new(move |resolver: &Resolver| {
            let instance = Arc::new(factory(resolver)?);
            Ok(Produced {
                instance: instance.clone() as AnyArc,
                disposer: Some(instance as Arc<dyn AsyncDispose>),
            })
        });
        self.insert(Registration::new(key.into_key(), lifetime, Factory::Sync(erased)));
    }

    /// Like [`register_instance`](Resolver::register_instance), but the
    /// instance participates in `dispose()`.
    pub fn register_disposable_instance<T, K>(&self, key: K, instance: T)
    where
        T: AsyncDispose + 'static,
        K: IntoServiceKey,
    {
        let instance = Arc::new(instance);
        self.insert(Registration::with_instance(
            key.into_key(),
            CachedService {
                instance: instance.clone() as AnyArc,
                disposer: Some(instance as Arc<dyn AsyncDispose>),
            },
        ));
    }

    fn insert(&self, registration: Registration) {
        self.inner.registry.write().insert(registration);
    }

    // ── Resolution ──

    /// Resolves a service synchronously.
    ///
    /// # Errors
    /// - [`WasitError::CircularDependency`] — the key is already mid-construction
    /// - [`WasitError::NotFound`] — nothing registered under the key
    /// - [`WasitError::AsyncInSyncContext`] — the registration has an async factory
    /// - [`WasitError::TypeMismatch`] — the instance is not a `T`
    pub fn resolve<T: Send + Sync + 'static>(&self, key: impl IntoServiceKey) -> Result<Arc<T>> {
        let key = key.into_key();
        let started = Instant::now();
        let instance = self.resolve_erased(&key)?;
        self.inner.metrics.record(&key, started.elapsed());
        downcast(key, instance)
    }

    /// Resolves a service, awaiting async factories.
    ///
    /// Same algorithm as [`resolve`](Resolver::resolve) and the same
    /// cycle-detection scope and singleton cache, but either factory
    /// kind may run. Never fails with `AsyncInSyncContext`.
    pub async fn resolve_async<T: Send + Sync + 'static>(
        &self,
        key: impl IntoServiceKey,
    ) -> Result<Arc<T>> {
        let key = key.into_key();
        let started = Instant::now();
        let instance = self.resolve_erased_async(&key).await?;
        self.inner.metrics.record(&key, started.elapsed());
        downcast(key, instance)
    }

    fn resolve_erased(&self, key: &ServiceKey) -> Result<AnyArc> {
        trace!(key = %key, "Resolving");

        // cycle check comes before the registry lookup, so a cycle is
        // reported even when intermediate registrations exist
        self.inner.stack.check(key)?;

        let (factory, lifetime) = match self.lookup(key)? {
            Lookup::Cached(instance) => return Ok(instance),
            Lookup::Build(factory, lifetime) => (factory, lifetime),
        };

        let _frame = self.inner.stack.acquire(key.clone())?;
        let produced = match factory {
            Factory::Sync(build) => build(self)?,
            Factory::Async(_) => {
                return Err(WasitError::AsyncInSyncContext { key: key.clone() });
            }
        };

        let instance = produced.instance.clone();
        if lifetime.is_singleton() {
            self.cache(key, produced);
        }
        Ok(instance)
    }

    async fn resolve_erased_async(&self, key: &ServiceKey) -> Result<AnyArc> {
        trace!(key = %key, "Resolving (async)");

        self.inner.stack.check(key)?;

        let (factory, lifetime) = match self.lookup(key)? {
            Lookup::Cached(instance) => return Ok(instance),
            Lookup::Build(factory, lifetime) => (factory, lifetime),
        };

        // the frame stays held across the await; the guard pops it even
        // if the future is dropped mid-build
        let _frame = self.inner.stack.acquire(key.clone())?;
        let produced = match factory {
            Factory::Sync(build) => build(self)?,
            Factory::Async(build) => build(self.clone()).await?,
        };

        let instance = produced.instance.clone();
        if lifetime.is_singleton() {
            self.cache(key, produced);
        }
        Ok(instance)
    }

    /// Reads the registration under a short-lived lock, returning either
    /// the cached instance or what is needed to build one.
    fn lookup(&self, key: &ServiceKey) -> Result<Lookup> {
        let registry = self.inner.registry.read();

        let Some(registration) = registry.get(key) else {
            return Err(WasitError::NotFound(NotFoundError {
                requested: key.clone(),
                suggestions: find_suggestions(&registry, key),
            }));
        };

        if let Some(cached) = registration.cached.get() {
            trace!(key = %key, "Cache hit");
            return Ok(Lookup::Cached(cached.instance.clone()));
        }

        Ok(Lookup::Build(registration.factory.clone(), registration.lifetime))
    }

    /// Write-once fill of a singleton's cache slot. A concurrent resolve
    /// may have won the race; its instance stays, ours is dropped.
    fn cache(&self, key: &ServiceKey, produced: Produced) {
        let registry = self.inner.registry.read();
        if let Some(registration) = registry.get(key) {
            let stored = registration
                .cached
                .set(CachedService {
                    instance: produced.instance,
                    disposer: produced.disposer,
                })
                .is_ok();
            if stored {
                debug!(key = %key, "Cached singleton");
            }
        }
    }

    // ── Introspection ──

    /// Returns `true` if `key` is registered. Never instantiates.
    pub fn has(&self, key: impl IntoServiceKey) -> bool {
        self.inner.registry.read().contains(&key.into_key())
    }

    /// All registered keys, in registration order.
    pub fn keys(&self) -> Vec<ServiceKey> {
        self.inner.registry.read().keys()
    }

    /// Number of registered services.
    pub fn len(&self) -> usize {
        self.inner.registry.read().len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.inner.registry.read().is_empty()
    }

    /// Resolution timing counters. Observational only.
    pub fn metrics(&self) -> &ResolutionMetrics {
        &self.inner.metrics
    }

    /// Drops every registration without running teardown.
    ///
    /// Call [`dispose`](Resolver::dispose) instead when cached services
    /// should be torn down first.
    pub fn clear(&self) {
        self.inner.registry.write().clear();
    }

    // ── Disposal ──

    /// Tears down every cached instance that opted into
    /// [`AsyncDispose`], then clears the registry.
    ///
    /// Best-effort and total: a failing teardown is logged and skipped,
    /// never propagated, and never stops the rest of the pass. Cached
    /// instances without the capability are skipped silently.
    pub async fn dispose(&self) {
        let disposables: Vec<(ServiceKey, Arc<dyn AsyncDispose>)> = {
            let registry = self.inner.registry.read();
            registry
                .iter()
                .filter_map(|registration| {
                    let cached = registration.cached.get()?;
                    let disposer = cached.disposer.clone()?;
                    Some((registration.key.clone(), disposer))
                })
                .collect()
        };

        debug!(count = disposables.len(), "Disposing cached services");
        for (key, disposer) in disposables {
            match disposer.dispose().await {
                Ok(()) => trace!(key = %key, "Disposed"),
                Err(error) => {
                    warn!(key = %key, error = %error, "Teardown failed; continuing disposal");
                }
            }
        }

        self.clear();
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("registered", &self.len())
            .finish()
    }
}

enum Lookup {
    Cached(AnyArc),
    Build(Factory, Lifetime),
}

fn downcast<T: Send + Sync + 'static>(key: ServiceKey, instance: AnyArc) -> Result<Arc<T>> {
    instance.downcast::<T>().map_err(|_| WasitError::TypeMismatch {
        key,
        expected: type_name::<T>(),
    })
}

fn find_suggestions(registry: &Registry, key: &ServiceKey) -> Vec<String> {
    let keys = registry.keys();
    let names: Vec<&str> = keys
        .iter()
        .filter(|k| *k != key)
        .map(|k| k.display_name())
        .collect();
    wasit_support::suggest_similar(key.display_name(), &names, 3)
}

// ═══════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════

pub mod prelude {
    pub use super::Resolver;
    pub use crate::dispose::{AsyncDispose, DisposeError};
    pub use crate::error::{Result, WasitError};
    pub use crate::key::{IntoServiceKey, ServiceKey, ServiceToken};
    pub use crate::lifetime::Lifetime;
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════
