//! De-duplicated per-category counting of confirmed tracks.

use std::collections::HashSet;

use log::debug;
use serde::Serialize;

use crate::tracker::class_id::{CategoryCounts, ClassId};
use crate::tracker::track::Track;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LedgerEntry {
    pub track_id: u64,
    pub class_id: ClassId,
    pub counted_at_frame: u64,
}

/// Append-only record of counted track identities.
///
/// Each track id is counted at most once. A vehicle whose track is deleted and
/// later recreated gets a new id and is counted again.
#[derive(Debug, Clone, Default)]
pub struct CountingLedger {
    entries: Vec<LedgerEntry>,
    counted: HashSet<u64>,
    totals: CategoryCounts,
}

impl CountingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count `track` unless its id was already recorded. Returns whether an
    /// entry was appended.
    pub fn record_if_new(&mut self, track: &Track, frame_id: u64) -> bool {
        if !self.counted.insert(track.track_id) {
            return false;
        }

        self.entries.push(LedgerEntry {
            track_id: track.track_id,
            class_id: track.class_id,
            counted_at_frame: frame_id,
        });
        self.totals.increment(track.class_id);
        debug!(
            "counted track {} as {} at frame {frame_id} ({} total)",
            track.track_id,
            track.class_id,
            self.totals.get(track.class_id)
        );
        true
    }

    pub fn totals(&self) -> &CategoryCounts {
        &self.totals
    }

    pub fn total(&self, class_id: ClassId) -> u64 {
        self.totals.get(class_id)
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn contains(&self, track_id: u64) -> bool {
        self.counted.contains(&track_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::kalman_filter::KalmanFilter;
    use crate::tracker::matching::Detection;

    fn track(id: u64, class_id: ClassId) -> Track {
        let kf = KalmanFilter::new();
        let det = Detection::new(0.0, 0.0, 10.0, 10.0, class_id, 0.9);
        Track::new(id, &det, &kf, 1, 4)
    }

    #[test]
    fn test_records_once() {
        let mut ledger = CountingLedger::new();
        let car = track(1, ClassId::Car);

        assert!(ledger.record_if_new(&car, 4));
        for frame in 5..50 {
            assert!(!ledger.record_if_new(&car, frame));
        }

        assert_eq!(ledger.total(ClassId::Car), 1);
        assert_eq!(ledger.len(), 1);
        assert_eq!(
            ledger.entries()[0],
            LedgerEntry {
                track_id: 1,
                class_id: ClassId::Car,
                counted_at_frame: 4
            }
        );
    }

    #[test]
    fn test_totals_per_category() {
        let mut ledger = CountingLedger::new();
        ledger.record_if_new(&track(1, ClassId::Car), 1);
        ledger.record_if_new(&track(2, ClassId::Truck), 1);
        ledger.record_if_new(&track(3, ClassId::Car), 2);
        ledger.record_if_new(&track(4, ClassId::Motorcycle), 3);

        assert_eq!(ledger.total(ClassId::Car), 2);
        assert_eq!(ledger.total(ClassId::Truck), 1);
        assert_eq!(ledger.total(ClassId::Motorcycle), 1);
        assert_eq!(ledger.total(ClassId::Other), 0);
        assert_eq!(ledger.totals().total(), 4);
        assert!(ledger.contains(3));
        assert!(!ledger.contains(5));
    }

    #[test]
    fn test_fresh_ledgers_are_isolated() {
        let mut a = CountingLedger::new();
        a.record_if_new(&track(1, ClassId::Car), 1);
        let b = CountingLedger::new();
        assert!(b.is_empty());
        assert_eq!(b.total(ClassId::Car), 0);
    }
}
