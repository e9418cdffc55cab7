//! Bounded, time ordered buffers of situations and parts.
//!
//! Records are kept latest first by adjusted timestamp. Inserting an out
//! of order record keeps the order; once the capacity is reached the
//! oldest record is evicted.
//!
//! # Example
//!
//! ```ignore
//! let mut history = SituationHistory::new(50);
//! history.push(situation);
//! let snapshot = history.snapshot();
//! let (newer, older) = split_at_time(&snapshot, now_ms);
//! ```

use std::collections::VecDeque;

use crate::aviation::{AircraftParts, AircraftSituation};

/// Default situation capacity per callsign.
pub const MAX_SITUATIONS_PER_CALLSIGN: usize = 50;

/// Default parts capacity per callsign.
pub const MAX_PARTS_PER_CALLSIGN: usize = 50;

/// A record with an adjusted timestamp.
pub trait Timestamped {
    /// Timestamp plus time offset in ms.
    fn adjusted_timestamp_ms(&self) -> i64;
}

impl Timestamped for AircraftSituation {
    fn adjusted_timestamp_ms(&self) -> i64 {
        AircraftSituation::adjusted_timestamp_ms(self)
    }
}

impl Timestamped for AircraftParts {
    fn adjusted_timestamp_ms(&self) -> i64 {
        AircraftParts::adjusted_timestamp_ms(self)
    }
}

/// Bounded buffer sorted latest first.
#[derive(Debug, Clone)]
pub struct TimedHistory<T> {
    records: VecDeque<T>,
    capacity: usize,
}

/// Situations of one callsign.
pub type SituationHistory = TimedHistory<AircraftSituation>;

/// Parts of one callsign.
pub type PartsHistory = TimedHistory<AircraftParts>;

impl<T: Timestamped + Clone> TimedHistory<T> {
    /// Create an empty history. A capacity of 0 is raised to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Insert a record at its time position and evict the oldest on overflow.
    ///
    /// Records with equal adjusted timestamps keep arrival order, the
    /// later arrival counting as newer.
    pub fn push(&mut self, record: T) {
        let ts = record.adjusted_timestamp_ms();
        let index = self
            .records
            .partition_point(|r| r.adjusted_timestamp_ms() > ts);
        self.records.insert(index, record);
        while self.records.len() > self.capacity {
            self.records.pop_back();
        }
        debug_assert!(is_sorted_latest_first(self.records.iter()));
    }

    /// Latest record.
    pub fn latest(&self) -> Option<&T> {
        self.records.front()
    }

    /// Oldest record.
    pub fn oldest(&self) -> Option<&T> {
        self.records.back()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.records.iter()
    }

    /// Copy of all records, latest first.
    pub fn snapshot(&self) -> Vec<T> {
        self.records.iter().cloned().collect()
    }
}

/// Split a latest-first slice at `now_ms`.
///
/// Returns `(newer, older)`: records with an adjusted timestamp after
/// `now_ms`, and records at or before it. Both keep latest-first order.
pub fn split_at_time<T: Timestamped>(records: &[T], now_ms: i64) -> (&[T], &[T]) {
    let pivot = records.partition_point(|r| r.adjusted_timestamp_ms() > now_ms);
    records.split_at(pivot)
}

/// True if the records are sorted latest first.
pub fn is_sorted_latest_first<'a, T: Timestamped + 'a>(records: impl Iterator<Item = &'a T>) -> bool {
    let mut previous = i64::MAX;
    for record in records {
        let ts = record.adjusted_timestamp_ms();
        if ts > previous {
            return false;
        }
        previous = ts;
    }
    true
}
