//! Teardown capability for cached services.

/// Opt-in asynchronous teardown for services owned by the resolver.
///
/// Implement this trait for services that need structured cleanup
/// (closing connections, flushing buffers) and register them through
/// [`register_disposable`](crate::Resolver::register_disposable) or
/// [`register_disposable_instance`](crate::Resolver::register_disposable_instance).
/// The capability is captured at registration time; the disposal pass
/// never inspects the runtime shape of an instance.
///
/// A returned error is logged and skipped — one misbehaving service
/// cannot stop the teardown of the others.
///
/// # Examples
/// ```
/// use wasit_resolver::dispose::{AsyncDispose, DisposeError};
/// use async_trait::async_trait;
///
/// struct DatabaseClient {
///     connection_id: String,
/// }
///
/// #[async_trait]
/// impl AsyncDispose for DatabaseClient {
///     async fn dispose(&self) -> Result<(), DisposeError> {
///         println!("Closing connection {}", self.connection_id);
///         Ok(())
///     }
/// }
/// ```
#[async_trait::async_trait]
pub trait AsyncDispose: Send + Sync {
    /// Performs asynchronous cleanup of held resources.
    async fn dispose(&self) -> Result<(), DisposeError>;
}

/// Error type returned by a failing teardown.
pub type DisposeError = Box<dyn std::error::Error + Send + Sync>;
