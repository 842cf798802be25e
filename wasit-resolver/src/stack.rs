//! Resolution stack — cycle detection during graph traversal.
//!
//! The stack holds the keys currently mid-construction for one resolver.
//! A key is pushed immediately before its factory runs and popped
//! unconditionally when the RAII frame drops, so a failed construction
//! can never leave detection state behind. The sync and async paths
//! share one stack, which is what lets a sync resolve nested inside an
//! async factory participate in the same cycle scope.

use parking_lot::Mutex;

use crate::error::{CircularDependencyError, Result, WasitError};
use crate::key::ServiceKey;

/// Set of keys currently being constructed, in entry order.
#[derive(Debug, Default)]
pub(crate) struct ResolutionStack {
    frames: Mutex<Vec<ServiceKey>>,
}

impl ResolutionStack {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Fails with [`WasitError::CircularDependency`] if `key` is already
    /// mid-construction. Checked before any registry lookup so a cycle
    /// is reported even when intermediate registrations exist.
    pub(crate) fn check(&self, key: &ServiceKey) -> Result<()> {
        let frames = self.frames.lock();
        if frames.contains(key) {
            return Err(Self::cycle(&frames, key));
        }
        Ok(())
    }

    /// Pushes `key` and returns a frame that pops it on drop.
    ///
    /// Re-checks membership under the same lock as the push, so the
    /// check-then-push pair cannot be split by another caller.
    pub(crate) fn acquire(&self, key: ServiceKey) -> Result<StackFrame<'_>> {
        let mut frames = self.frames.lock();
        if frames.contains(&key) {
            return Err(Self::cycle(&frames, &key));
        }
        frames.push(key.clone());
        drop(frames);
        Ok(StackFrame { stack: self, key })
    }

    fn cycle(frames: &[ServiceKey], repeat: &ServiceKey) -> WasitError {
        let mut chain = frames.to_vec();
        chain.push(repeat.clone());
        WasitError::CircularDependency(CircularDependencyError { chain })
    }

    #[cfg(test)]
    fn depth(&self) -> usize {
        self.frames.lock().len()
    }
}

/// RAII guard for one stack entry.
///
/// Popping happens on every exit path — normal return, error, or a
/// dropped future on the async path.
#[derive(Debug)]
pub(crate) struct StackFrame<'a> {
    stack: &'a ResolutionStack,
    key: ServiceKey,
}

impl Drop for StackFrame<'_> {
    fn drop(&mut self) {
        let mut frames = self.stack.frames.lock();
        // frames drop LIFO under cooperative scheduling; removing by key
        // keeps the pop correct even if drop order ever differs
        if let Some(pos) = frames.iter().rposition(|k| k == &self.key) {
            frames.remove(pos);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::IntoServiceKey;

    #[test]
    fn acquire_and_drop() {
        let stack = ResolutionStack::new();
        {
            let _a = stack.acquire("a".into_key()).unwrap();
            let _b = stack.acquire("b".into_key()).unwrap();
            assert_eq!(stack.depth(), 2);
        }
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn reentry_is_a_cycle() {
        let stack = ResolutionStack::new();
        let _a = stack.acquire("a".into_key()).unwrap();
        let _b = stack.acquire("b".into_key()).unwrap();

        let err = stack.acquire("a".into_key()).unwrap_err();
        match err {
            WasitError::CircularDependency(e) => {
                let names: Vec<&str> = e.chain.iter().map(|k| k.display_name()).collect();
                assert_eq!(names, ["a", "b", "a"]);
            }
            other => panic!("expected CircularDependency, got: {other:?}"),
        }
    }

    #[test]
    fn check_reports_without_pushing() {
        let stack = ResolutionStack::new();
        let _a = stack.acquire("a".into_key()).unwrap();

        assert!(stack.check(&"b".into_key()).is_ok());
        assert!(stack.check(&"a".into_key()).is_err());
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn failed_acquire_leaves_stack_intact() {
        let stack = ResolutionStack::new();
        let _a = stack.acquire("a".into_key()).unwrap();
        let _ = stack.acquire("a".into_key()).unwrap_err();
        assert_eq!(stack.depth(), 1);

        drop(_a);
        assert_eq!(stack.depth(), 0);
        // after unwinding, the key is free again
        assert!(stack.check(&"a".into_key()).is_ok());
    }
}
