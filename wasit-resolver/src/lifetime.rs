//! Service lifetime policy.
//!
//! The lifetime decides what the resolver does with a produced instance:
//! - [`Lifetime::Singleton`] — build once, cache, reuse forever
//! - [`Lifetime::Transient`] — build fresh on every resolve
//!
//! It is fixed at registration time; re-registering a key replaces the
//! whole record, lifetime included.

use std::fmt;

/// Controls instance reuse for a registration.
///
/// # Examples
/// ```
/// use wasit_resolver::lifetime::Lifetime;
///
/// assert!(Lifetime::Singleton.is_singleton());
/// assert!(!Lifetime::Transient.is_singleton());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifetime {
    /// One instance shared for the life of the resolver.
    ///
    /// Created on first resolve, cached, and returned by reference
    /// (cloned `Arc`) from then on. The cache slot also makes the
    /// instance eligible for [`dispose()`](crate::Resolver::dispose).
    ///
    /// # When to use
    /// - Connection pools
    /// - Configuration objects
    /// - Shared caches
    Singleton,

    /// A fresh instance on every resolve call, never cached.
    ///
    /// # When to use
    /// - Lightweight stateless services
    /// - Command/query handlers
    /// - Objects whose state must not be shared
    Transient,
}

impl Lifetime {
    /// Returns `true` if this lifetime caches the produced instance.
    #[inline]
    pub fn is_singleton(&self) -> bool {
        matches!(self, Lifetime::Singleton)
    }
}

impl fmt::Display for Lifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lifetime::Singleton => write!(f, "Singleton"),
            Lifetime::Transient => write!(f, "Transient"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singleton_caches() {
        assert!(Lifetime::Singleton.is_singleton());
        assert!(!Lifetime::Transient.is_singleton());
    }

    #[test]
    fn lifetime_equality() {
        assert_eq!(Lifetime::Singleton, Lifetime::Singleton);
        assert_ne!(Lifetime::Singleton, Lifetime::Transient);
    }

    #[test]
    fn lifetime_display() {
        assert_eq!(format!("{}", Lifetime::Singleton), "Singleton");
        assert_eq!(format!("{}", Lifetime::Transient), "Transient");
    }
}
