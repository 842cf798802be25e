//! Error types for resolver operations.
//!
//! Every failure carries the offending [`ServiceKey`] and, where it
//! helps, a hint about what to do instead.

use std::fmt;

use wasit_support::rendering::render_chain;

use crate::key::ServiceKey;

/// Main error type for all Wasit operations.
#[derive(Debug, thiserror::Error)]
pub enum WasitError {
    /// Requested service was never registered.
    #[error("{}", .0)]
    NotFound(NotFoundError),

    /// A key re-entered the resolution stack before finishing construction.
    #[error("{}", .0)]
    CircularDependency(CircularDependencyError),

    /// Synchronous resolution hit a registration with an async factory.
    #[error("Service {key} has an async factory; use resolve_async instead of resolve")]
    AsyncInSyncContext { key: ServiceKey },

    /// A factory returned an error during construction.
    #[error("Failed to construct {key}: {source}")]
    ConstructionFailed {
        key: ServiceKey,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The produced instance could not be downcast to the requested type.
    #[error("Type mismatch for {key}: expected {expected}")]
    TypeMismatch {
        key: ServiceKey,
        expected: &'static str,
    },
}

/// Error when a service was not registered.
///
/// Includes "did you mean?" suggestions built from the keys that ARE
/// registered.
#[derive(Debug)]
pub struct NotFoundError {
    /// The key that was requested
    pub requested: ServiceKey,
    /// Display names of similar registered keys
    pub suggestions: Vec<String>,
}

impl fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Service not registered: {}", self.requested)?;

        if !self.suggestions.is_empty() {
            write!(f, "\n  Did you mean one of:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n    - {suggestion}")?;
            }
        }

        write!(
            f,
            "\n  Hint: register {} before resolving it",
            self.requested
        )
    }
}

/// Error when a resolution cycle is detected.
///
/// Shows the full chain so you can see WHERE the cycle closes. The
/// reported repeat is the first key seen twice on the stack, which for
/// an A → B → A cycle is A.
#[derive(Debug)]
pub struct CircularDependencyError {
    /// The chain of keys mid-construction, ending with the repeat.
    pub chain: Vec<ServiceKey>,
}

impl fmt::Display for CircularDependencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.chain.iter().map(|k| k.display_name()).collect();
        write!(f, "Circular dependency detected:\n  {}", render_chain(&names))?;
        write!(
            f,
            "\n  Hint: break the cycle by resolving one side lazily inside a method call"
        )
    }
}

/// Convenient Result type for Wasit operations.
pub type Result<T> = std::result::Result<T, WasitError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::IntoServiceKey;

    #[test]
    fn not_found_display() {
        let err = WasitError::NotFound(NotFoundError {
            requested: "user_repo".into_key(),
            suggestions: vec!["UserRepository".into()],
        });

        let msg = format!("{err}");
        assert!(msg.contains("not registered"));
        assert!(msg.contains("user_repo"));
        assert!(msg.contains("Did you mean"));
        assert!(msg.contains("UserRepository"));
    }

    #[test]
    fn not_found_without_suggestions() {
        let err = WasitError::NotFound(NotFoundError {
            requested: ServiceKey::of::<String>(),
            suggestions: vec![],
        });

        let msg = format!("{err}");
        assert!(!msg.contains("Did you mean"));
        assert!(msg.contains("Hint"));
    }

    #[test]
    fn circular_dependency_display() {
        let err = WasitError::CircularDependency(CircularDependencyError {
            chain: vec!["a".into_key(), "b".into_key(), "a".into_key()],
        });

        let msg = format!("{err}");
        assert!(msg.contains("Circular"));
        assert!(msg.contains("a → b → a"));
    }

    #[test]
    fn async_in_sync_names_the_fix() {
        let err = WasitError::AsyncInSyncContext {
            key: "mailer".into_key(),
        };

        let msg = format!("{err}");
        assert!(msg.contains("mailer"));
        assert!(msg.contains("resolve_async"));
    }

    #[test]
    fn construction_failed_carries_source() {
        let err = WasitError::ConstructionFailed {
            key: "db".into_key(),
            source: "connection refused".into(),
        };

        let msg = format!("{err}");
        assert!(msg.contains("db"));
        assert!(msg.contains("connection refused"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
