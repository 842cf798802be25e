//! # Wasit — runtime service registry & resolver for Rust
//!
//! An inversion-of-control registry: register how to build a service
//! under a type, string, or minted token key, then resolve it — the
//! resolver decides between reusing a cached singleton and building a
//! fresh transient, detects resolution cycles, forks between sync and
//! async construction, and tears down owned instances on `dispose()`.

pub use wasit_resolver::*;
pub use wasit_support::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facade_reexports_the_core() {
        let resolver = Resolver::new();
        resolver.register_instance("answer", 42u32);
        assert_eq!(*resolver.resolve::<u32>("answer").unwrap(), 42);
    }
}
