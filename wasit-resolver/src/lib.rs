//! Core resolver implementation for Wasit.

pub mod dispose;
pub mod error;
pub mod key;
pub mod lifetime;
pub mod metrics;
mod registry;
pub mod resolver;
mod stack;

pub use dispose::{AsyncDispose, DisposeError};
pub use error::{Result, WasitError};
pub use key::{IntoServiceKey, ServiceKey, ServiceToken};
pub use lifetime::Lifetime;
pub use metrics::{ResolutionMetrics, TimingStats};
pub use resolver::{Resolver, prelude};
