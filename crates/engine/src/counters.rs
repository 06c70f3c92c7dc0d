//! Aggregate event counters shared by evaluation and reporting.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use dashmap::DashMap;

use gridwatch_core::{DeviceId, Report};

/// Total and per-device event counters.
///
/// The two halves are protected independently: the total by a mutex, the
/// per-device map by the map's own per-shard locking. Nothing is ever
/// decremented. When no increment is in flight, the total equals the sum of
/// the per-device counts.
#[derive(Debug, Default)]
pub struct Counters {
    total: Mutex<u64>,
    per_device: DashMap<DeviceId, u64>,
}

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one event for `device`. Returns the new total.
    pub fn record(&self, device: DeviceId) -> u64 {
        let total = {
            let mut total = self.total.lock().unwrap_or_else(PoisonError::into_inner);
            *total += 1;
            *total
        };
        *self.per_device.entry(device).or_insert(0) += 1;
        total
    }

    pub fn total(&self) -> u64 {
        *self.total.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn device(&self, device: DeviceId) -> u64 {
        self.per_device.get(&device).map(|c| *c).unwrap_or(0)
    }

    /// Owned copy of the per-device map.
    pub fn per_device(&self) -> BTreeMap<DeviceId, u64> {
        self.per_device
            .iter()
            .map(|entry| (*entry.key(), *entry.value()))
            .collect()
    }

    /// Build a report from the current counts.
    ///
    /// The total and the map are read one after the other, not atomically:
    /// an increment landing in between shows up in the map but not the total.
    pub fn snapshot(&self) -> Report {
        let total = self.total();
        Report::new(total, self.per_device())
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn record_increments_total_and_device() {
        let counters = Counters::new();
        assert_eq!(counters.record(11), 1);
        assert_eq!(counters.record(11), 2);
        assert_eq!(counters.record(12), 3);

        assert_eq!(counters.total(), 3);
        assert_eq!(counters.device(11), 2);
        assert_eq!(counters.device(12), 1);
        assert_eq!(counters.device(99), 0);
    }

    #[test]
    fn concurrent_increments_are_not_lost() {
        let counters = Counters::new();
        let threads = 8;
        let per_thread = 2_000;

        thread::scope(|s| {
            for t in 0..threads {
                let counters = &counters;
                s.spawn(move || {
                    for i in 0..per_thread {
                        counters.record((t + i) % 5);
                    }
                });
            }
        });

        let expected = (threads * per_thread) as u64;
        assert_eq!(counters.total(), expected);
        let sum: u64 = counters.per_device().values().sum();
        assert_eq!(sum, expected);
        assert_eq!(counters.per_device().len(), 5);
    }

    #[test]
    fn snapshot_is_decoupled_from_live_counters() {
        let counters = Counters::new();
        counters.record(1);
        counters.record(2);

        let report = counters.snapshot();
        counters.record(1);
        counters.record(3);

        assert_eq!(report.total_events, 2);
        assert_eq!(report.per_device, BTreeMap::from([(1, 1), (2, 1)]));
        assert_eq!(counters.total(), 4);
    }
}
