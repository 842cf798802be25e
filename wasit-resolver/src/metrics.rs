//! Per-key resolution timing counters.
//!
//! Purely observational: the resolver records how long successful
//! resolutions take, and nothing here is ever consulted by resolution
//! logic or able to make it fail.

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::RwLock;

use crate::key::ServiceKey;

/// Accumulated timings for one service key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimingStats {
    /// Number of successful resolutions
    pub count: u64,
    /// Cumulative resolution time
    pub total: Duration,
    /// Fastest resolution seen
    pub min: Duration,
    /// Slowest resolution seen
    pub max: Duration,
}

impl TimingStats {
    fn new() -> Self {
        Self {
            count: 0,
            total: Duration::ZERO,
            min: Duration::MAX,
            max: Duration::ZERO,
        }
    }

    fn record(&mut self, elapsed: Duration) {
        self.count += 1;
        self.total += elapsed;
        self.min = self.min.min(elapsed);
        self.max = self.max.max(elapsed);
    }

    /// Average resolution time, zero when nothing was recorded.
    pub fn average(&self) -> Duration {
        if self.count == 0 {
            Duration::ZERO
        } else {
            self.total / self.count as u32
        }
    }
}

/// Append-only timing counters per key, reset only explicitly.
#[derive(Debug, Default)]
pub struct ResolutionMetrics {
    times: RwLock<HashMap<ServiceKey, TimingStats>>,
}

impl ResolutionMetrics {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&self, key: &ServiceKey, elapsed: Duration) {
        let mut times = self.times.write();
        times
            .entry(key.clone())
            .or_insert_with(TimingStats::new)
            .record(elapsed);
    }

    /// Counters for one key, if it was ever resolved since the last reset.
    pub fn stats_for(&self, key: &ServiceKey) -> Option<TimingStats> {
        self.times.read().get(key).cloned()
    }

    /// Snapshot of all counters.
    pub fn snapshot(&self) -> HashMap<ServiceKey, TimingStats> {
        self.times.read().clone()
    }

    /// Drops all counters.
    pub fn reset(&self) {
        self.times.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::IntoServiceKey;

    #[test]
    fn record_accumulates() {
        let metrics = ResolutionMetrics::new();
        let key = "db".into_key();

        metrics.record(&key, Duration::from_millis(4));
        metrics.record(&key, Duration::from_millis(2));
        metrics.record(&key, Duration::from_millis(6));

        let stats = metrics.stats_for(&key).unwrap();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.total, Duration::from_millis(12));
        assert_eq!(stats.min, Duration::from_millis(2));
        assert_eq!(stats.max, Duration::from_millis(6));
        assert_eq!(stats.average(), Duration::from_millis(4));
    }

    #[test]
    fn keys_are_tracked_independently() {
        let metrics = ResolutionMetrics::new();
        metrics.record(&"a".into_key(), Duration::from_millis(1));
        metrics.record(&"b".into_key(), Duration::from_millis(2));
        metrics.record(&"b".into_key(), Duration::from_millis(2));

        assert_eq!(metrics.stats_for(&"a".into_key()).unwrap().count, 1);
        assert_eq!(metrics.stats_for(&"b".into_key()).unwrap().count, 2);
        assert_eq!(metrics.snapshot().len(), 2);
    }

    #[test]
    fn unknown_key_has_no_stats() {
        let metrics = ResolutionMetrics::new();
        assert!(metrics.stats_for(&"ghost".into_key()).is_none());
    }

    #[test]
    fn reset_drops_counters() {
        let metrics = ResolutionMetrics::new();
        metrics.record(&"a".into_key(), Duration::from_millis(1));

        metrics.reset();
        assert!(metrics.snapshot().is_empty());
        assert!(metrics.stats_for(&"a".into_key()).is_none());
    }

    #[test]
    fn average_of_nothing_is_zero() {
        assert_eq!(TimingStats::new().average(), Duration::ZERO);
    }
}
