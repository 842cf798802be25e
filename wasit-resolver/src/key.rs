//! Service identification keys.
//!
//! [`ServiceKey`] is the normalized identifier under which a registration
//! is stored and looked up. Any accepted token shape — a Rust type, a
//! string name, or a minted [`ServiceToken`] — normalizes to one key type
//! via [`IntoServiceKey`], so registration and lookup can never diverge
//! merely because the caller held a different token representation.

use std::any::{TypeId, type_name};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Uniquely identifies a service in the resolver.
///
/// Identity never depends on a human-readable name for type and token
/// keys: the `TypeId` (respectively the minted id) is the uniqueness
/// source, and the name string travels along purely for diagnostics.
/// Two distinct types that happen to share a short name therefore get
/// distinct keys.
///
/// # Examples
/// ```
/// use wasit_resolver::key::ServiceKey;
///
/// // Type key — identity is the TypeId
/// let key = ServiceKey::of::<String>();
/// assert!(key.display_name().ends_with("String"));
///
/// // String key — normalizes to itself
/// let key = ServiceKey::from("database");
/// assert_eq!(key.display_name(), "database");
/// ```
#[derive(Debug, Clone)]
pub enum ServiceKey {
    /// A Rust type used as a key; the name is diagnostics-only.
    Type(TypeId, &'static str),
    /// An opaque string name.
    Name(Arc<str>),
    /// A minted symbolic token; the label is diagnostics-only.
    Token(u64, &'static str),
}

impl ServiceKey {
    /// Creates a key for type `T`.
    ///
    /// # Examples
    /// ```
    /// use wasit_resolver::key::ServiceKey;
    ///
    /// let key = ServiceKey::of::<i32>();
    /// assert_eq!(key, ServiceKey::of::<i32>());
    /// ```
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        ServiceKey::Type(TypeId::of::<T>(), type_name::<T>())
    }

    /// Returns the human-readable name used in error messages.
    #[inline]
    pub fn display_name(&self) -> &str {
        match self {
            ServiceKey::Type(_, name) => name,
            ServiceKey::Name(name) => name,
            ServiceKey::Token(_, label) => label,
        }
    }
}

// Equality and hashing use the identity fields only; diagnostic
// strings on type and token keys are ignored.
impl PartialEq for ServiceKey {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ServiceKey::Type(a, _), ServiceKey::Type(b, _)) => a == b,
            (ServiceKey::Name(a), ServiceKey::Name(b)) => a == b,
            (ServiceKey::Token(a, _), ServiceKey::Token(b, _)) => a == b,
            _ => false,
        }
    }
}

impl Eq for ServiceKey {}

impl Hash for ServiceKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            ServiceKey::Type(id, _) => {
                0u8.hash(state);
                id.hash(state);
            }
            ServiceKey::Name(name) => {
                1u8.hash(state);
                name.hash(state);
            }
            ServiceKey::Token(id, _) => {
                2u8.hash(state);
                id.hash(state);
            }
        }
    }
}

impl fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceKey::Type(_, name) => write!(f, "{name}"),
            ServiceKey::Name(name) => write!(f, "{name:?}"),
            ServiceKey::Token(id, label) => write!(f, "{label}#{id}"),
        }
    }
}

// token ids start at 1 so 0 can never collide with a minted token
static NEXT_TOKEN_ID: AtomicU64 = AtomicU64::new(1);

/// An opaque symbolic key, minted once and unique for the process.
///
/// Tokens are the collision-free alternative to string keys: two tokens
/// are equal only if they are the very same minted handle, regardless of
/// label. Mint one per service and share it between the registering and
/// the resolving side.
///
/// # Examples
/// ```
/// use wasit_resolver::key::ServiceToken;
///
/// let primary = ServiceToken::new("database");
/// let replica = ServiceToken::new("database");
/// assert_ne!(primary, replica); // same label, different identity
/// assert_eq!(primary, primary);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ServiceToken {
    id: u64,
    label: &'static str,
}

impl ServiceToken {
    /// Mints a fresh token with a diagnostic label.
    pub fn new(label: &'static str) -> Self {
        Self {
            id: NEXT_TOKEN_ID.fetch_add(1, Ordering::Relaxed),
            label,
        }
    }

    /// Returns the diagnostic label.
    #[inline]
    pub fn label(&self) -> &'static str {
        self.label
    }
}

impl PartialEq for ServiceToken {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ServiceToken {}

impl Hash for ServiceToken {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for ServiceToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.label, self.id)
    }
}

/// Normalizes any accepted token shape into a [`ServiceKey`].
///
/// Implemented for keys themselves, string names, and minted tokens.
/// Every registry-facing operation funnels through this trait.
pub trait IntoServiceKey {
    fn into_key(self) -> ServiceKey;
}

impl IntoServiceKey for ServiceKey {
    #[inline]
    fn into_key(self) -> ServiceKey {
        self
    }
}

impl IntoServiceKey for &ServiceKey {
    #[inline]
    fn into_key(self) -> ServiceKey {
        self.clone()
    }
}

impl IntoServiceKey for &str {
    #[inline]
    fn into_key(self) -> ServiceKey {
        ServiceKey::Name(Arc::from(self))
    }
}

impl IntoServiceKey for String {
    #[inline]
    fn into_key(self) -> ServiceKey {
        ServiceKey::Name(Arc::from(self))
    }
}

impl IntoServiceKey for ServiceToken {
    #[inline]
    fn into_key(self) -> ServiceKey {
        ServiceKey::Token(self.id, self.label)
    }
}

impl IntoServiceKey for &ServiceToken {
    #[inline]
    fn into_key(self) -> ServiceKey {
        ServiceKey::Token(self.id, self.label)
    }
}

impl From<&str> for ServiceKey {
    fn from(name: &str) -> Self {
        name.into_key()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MyService;

    #[test]
    fn type_key_equality() {
        assert_eq!(ServiceKey::of::<MyService>(), ServiceKey::of::<MyService>());
        assert_ne!(ServiceKey::of::<MyService>(), ServiceKey::of::<String>());
    }

    #[test]
    fn same_short_name_types_stay_distinct() {
        mod east {
            pub struct Widget;
        }
        mod west {
            pub struct Widget;
        }

        let a = ServiceKey::of::<east::Widget>();
        let b = ServiceKey::of::<west::Widget>();
        // identical short names, different identities
        assert_ne!(a, b);
        assert!(a.display_name().ends_with("Widget"));
        assert!(b.display_name().ends_with("Widget"));
    }

    #[test]
    fn string_and_owned_string_normalize_equal() {
        assert_eq!("cache".into_key(), String::from("cache").into_key());
        assert_ne!("cache".into_key(), "cash".into_key());
    }

    #[test]
    fn string_key_never_matches_type_key() {
        assert_ne!(
            "alloc::string::String".into_key(),
            ServiceKey::of::<String>()
        );
    }

    #[test]
    fn tokens_are_unique_per_mint() {
        let a = ServiceToken::new("queue");
        let b = ServiceToken::new("queue");
        assert_ne!(a, b);
        assert_ne!(a.into_key(), b.into_key());
        assert_eq!(a.into_key(), a.into_key());
    }

    #[test]
    fn token_label_is_diagnostic_only() {
        let token = ServiceToken::new("bus");
        assert_eq!(token.label(), "bus");
        assert!(format!("{token}").starts_with("bus#"));
    }

    #[test]
    fn keys_work_in_hashmap() {
        let mut map = HashMap::new();
        map.insert(ServiceKey::of::<String>(), "type");
        map.insert("config".into_key(), "name");
        assert_eq!(map.get(&ServiceKey::of::<String>()), Some(&"type"));
        assert_eq!(map.get(&"config".into_key()), Some(&"name"));
        assert_eq!(map.get(&"missing".into_key()), None);
    }

    #[test]
    fn unsized_type_key() {
        trait MyTrait {}
        let key = ServiceKey::of::<dyn MyTrait>();
        assert!(key.display_name().contains("MyTrait"));
    }

    #[test]
    fn display_formats() {
        assert!(format!("{}", ServiceKey::of::<u8>()).contains("u8"));
        assert_eq!(format!("{}", "db".into_key()), "\"db\"");
    }
}
