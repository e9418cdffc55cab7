//! Thread-safe store of remote aircraft, written by the network layer.
//!
//! The ingest thread pushes situations and parts; interpolators read
//! snapshots. Every write bumps a per-history modification timestamp so
//! readers can skip work while nothing changed.

use dashmap::DashMap;

use crate::aviation::{AircraftModel, AircraftParts, AircraftSituation, Callsign};

use super::history::{PartsHistory, SituationHistory, MAX_PARTS_PER_CALLSIGN, MAX_SITUATIONS_PER_CALLSIGN};
use super::RemoteAircraftProvider;

/// Everything known about one remote aircraft.
#[derive(Debug, Clone)]
struct AircraftRecord {
    situations: SituationHistory,
    parts: PartsHistory,
    situations_modified_ms: i64,
    parts_modified_ms: i64,
    model: Option<AircraftModel>,
}

impl AircraftRecord {
    fn new(max_situations: usize, max_parts: usize) -> Self {
        Self {
            situations: SituationHistory::new(max_situations),
            parts: PartsHistory::new(max_parts),
            situations_modified_ms: 0,
            parts_modified_ms: 0,
            model: None,
        }
    }
}

/// Next modification stamp: wall clock, but always past `previous`.
fn next_modified(previous: i64) -> i64 {
    chrono::Utc::now().timestamp_millis().max(previous + 1)
}

/// In-memory [`RemoteAircraftProvider`].
///
/// Aircraft are in range from [`add_aircraft`](Self::add_aircraft) (or the
/// first pushed record) until [`remove_aircraft`](Self::remove_aircraft).
#[derive(Debug)]
pub struct RemoteAircraftStore {
    aircraft: DashMap<Callsign, AircraftRecord>,
    max_situations: usize,
    max_parts: usize,
}

impl Default for RemoteAircraftStore {
    fn default() -> Self {
        Self::new(MAX_SITUATIONS_PER_CALLSIGN, MAX_PARTS_PER_CALLSIGN)
    }
}

impl RemoteAircraftStore {
    /// Create a store with per-callsign capacities.
    pub fn new(max_situations: usize, max_parts: usize) -> Self {
        Self {
            aircraft: DashMap::new(),
            max_situations,
            max_parts,
        }
    }

    /// Start tracking an aircraft. Returns false if already tracked.
    pub fn add_aircraft(&self, callsign: Callsign, model: Option<AircraftModel>) -> bool {
        if self.aircraft.contains_key(&callsign) {
            return false;
        }
        let mut record = AircraftRecord::new(self.max_situations, self.max_parts);
        record.model = model;
        self.aircraft.insert(callsign, record);
        true
    }

    /// Stop tracking an aircraft. Returns false if it was not tracked.
    pub fn remove_aircraft(&self, callsign: &Callsign) -> bool {
        self.aircraft.remove(callsign).is_some()
    }

    /// Add a situation, tracking the aircraft if necessary.
    pub fn push_situation(&self, situation: AircraftSituation) {
        let (max_situations, max_parts) = (self.max_situations, self.max_parts);
        let mut record = self
            .aircraft
            .entry(situation.callsign.clone())
            .or_insert_with(|| AircraftRecord::new(max_situations, max_parts));
        record.situations.push(situation);
        record.situations_modified_ms = next_modified(record.situations_modified_ms);
    }

    /// Add a parts record, tracking the aircraft if necessary.
    pub fn push_parts(&self, callsign: &Callsign, parts: AircraftParts) {
        let (max_situations, max_parts) = (self.max_situations, self.max_parts);
        let mut record = self
            .aircraft
            .entry(callsign.clone())
            .or_insert_with(|| AircraftRecord::new(max_situations, max_parts));
        record.parts.push(parts);
        record.parts_modified_ms = next_modified(record.parts_modified_ms);
    }

    /// Drop all situations of an aircraft but keep it in range.
    pub fn clear_situations(&self, callsign: &Callsign) {
        if let Some(mut record) = self.aircraft.get_mut(callsign) {
            record.situations.clear();
            record.situations_modified_ms = next_modified(record.situations_modified_ms);
        }
    }

    /// Set the rendered model of a tracked aircraft.
    pub fn set_model(&self, callsign: &Callsign, model: AircraftModel) -> bool {
        match self.aircraft.get_mut(callsign) {
            Some(mut record) => {
                record.model = Some(model);
                true
            }
            None => false,
        }
    }

    /// All tracked callsigns, sorted.
    pub fn callsigns(&self) -> Vec<Callsign> {
        let mut callsigns: Vec<Callsign> = self.aircraft.iter().map(|e| e.key().clone()).collect();
        callsigns.sort();
        callsigns
    }

    /// Number of tracked aircraft.
    pub fn len(&self) -> usize {
        self.aircraft.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aircraft.is_empty()
    }
}

impl RemoteAircraftProvider for RemoteAircraftStore {
    fn situations(&self, callsign: &Callsign) -> Vec<AircraftSituation> {
        self.aircraft
            .get(callsign)
            .map(|r| r.situations.snapshot())
            .unwrap_or_default()
    }

    fn parts(&self, callsign: &Callsign) -> Vec<AircraftParts> {
        self.aircraft
            .get(callsign)
            .map(|r| r.parts.snapshot())
            .unwrap_or_default()
    }

    fn situations_last_modified(&self, callsign: &Callsign) -> i64 {
        self.aircraft
            .get(callsign)
            .map(|r| r.situations_modified_ms)
            .unwrap_or(0)
    }

    fn parts_last_modified(&self, callsign: &Callsign) -> i64 {
        self.aircraft
            .get(callsign)
            .map(|r| r.parts_modified_ms)
            .unwrap_or(0)
    }

    fn is_aircraft_in_range(&self, callsign: &Callsign) -> bool {
        self.aircraft.contains_key(callsign)
    }

    fn aircraft_model(&self, callsign: &Callsign) -> Option<AircraftModel> {
        self.aircraft.get(callsign).and_then(|r| r.model.clone())
    }

    fn situations_count(&self, callsign: &Callsign) -> usize {
        self.aircraft
            .get(callsign)
            .map(|r| r.situations.len())
            .unwrap_or(0)
    }

    fn parts_count(&self, callsign: &Callsign) -> usize {
        self.aircraft.get(callsign).map(|r| r.parts.len()).unwrap_or(0)
    }
}
