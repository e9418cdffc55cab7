//! Diagnostic records of interpolation steps.
//!
//! When a setup enables `log_interpolation`, the interpolator hands one
//! [`SituationLog`] and one [`PartsLog`] per step to its attached sink.
//! Records are copies; a sink can never influence interpolation.
//!
//! [`InterpolationLogger`] is the in-memory sink: two bounded queues behind
//! `parking_lot::RwLock`, shared between all interpolators.

use std::collections::VecDeque;

use parking_lot::RwLock;

use crate::aviation::{AircraftParts, AircraftSituation, AircraftSituationChange, AltitudeCorrection, Callsign};

use super::setup::{InterpolationSetup, DEFAULT_MAX_LOG_ENTRIES};

/// One situation step.
#[derive(Debug, Clone, PartialEq)]
pub struct SituationLog {
    /// Step time.
    pub timestamp_ms: i64,
    pub callsign: Callsign,
    /// Strategy name.
    pub interpolator: &'static str,
    pub situation: AircraftSituation,
    /// Older and newer bracketing situations.
    pub bracket: Option<(AircraftSituation, AircraftSituation)>,
    pub fraction: f64,
    pub ground_factor: f64,
    pub altitude_correction: AltitudeCorrection,
    pub interpolant_recalculated: bool,
    pub change: AircraftSituationChange,
    pub setup: InterpolationSetup,
    pub cg_ft: f64,
    pub invalid_situations: u64,
    pub situations_count: usize,
    /// Why the step was invalid, if it was.
    pub error: Option<String>,
}

/// One parts step.
#[derive(Debug, Clone, PartialEq)]
pub struct PartsLog {
    pub timestamp_ms: i64,
    pub callsign: Callsign,
    /// Reported parts available.
    pub reported_count: usize,
    pub parts: Option<AircraftParts>,
    /// No parts were produced.
    pub empty: bool,
    pub reused: bool,
}

/// Receiver of diagnostic records.
pub trait InterpolationLogSink: Send + Sync {
    fn log_situation(&self, record: SituationLog);

    fn log_parts(&self, record: PartsLog);
}

/// Bounded in-memory log, oldest records evicted first.
#[derive(Debug)]
pub struct InterpolationLogger {
    situations: RwLock<VecDeque<SituationLog>>,
    parts: RwLock<VecDeque<PartsLog>>,
    capacity: usize,
}

impl Default for InterpolationLogger {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LOG_ENTRIES)
    }
}

impl InterpolationLogger {
    pub fn new(capacity: usize) -> Self {
        Self {
            situations: RwLock::new(VecDeque::new()),
            parts: RwLock::new(VecDeque::new()),
            capacity: capacity.max(1),
        }
    }

    /// All situation records, oldest first.
    pub fn situation_logs(&self) -> Vec<SituationLog> {
        self.situations.read().iter().cloned().collect()
    }

    /// Situation records of one callsign, oldest first.
    pub fn situation_logs_for(&self, callsign: &Callsign) -> Vec<SituationLog> {
        self.situations
            .read()
            .iter()
            .filter(|r| &r.callsign == callsign)
            .cloned()
            .collect()
    }

    pub fn last_situation_log(&self, callsign: &Callsign) -> Option<SituationLog> {
        self.situations
            .read()
            .iter()
            .rev()
            .find(|r| &r.callsign == callsign)
            .cloned()
    }

    /// All parts records, oldest first.
    pub fn parts_logs(&self) -> Vec<PartsLog> {
        self.parts.read().iter().cloned().collect()
    }

    pub fn parts_logs_for(&self, callsign: &Callsign) -> Vec<PartsLog> {
        self.parts
            .read()
            .iter()
            .filter(|r| &r.callsign == callsign)
            .cloned()
            .collect()
    }

    pub fn last_parts_log(&self, callsign: &Callsign) -> Option<PartsLog> {
        self.parts
            .read()
            .iter()
            .rev()
            .find(|r| &r.callsign == callsign)
            .cloned()
    }

    pub fn situation_log_count(&self) -> usize {
        self.situations.read().len()
    }

    pub fn parts_log_count(&self) -> usize {
        self.parts.read().len()
    }

    pub fn clear(&self) {
        self.situations.write().clear();
        self.parts.write().clear();
    }
}

fn push_bounded<T>(queue: &RwLock<VecDeque<T>>, record: T, capacity: usize) {
    let mut queue = queue.write();
    queue.push_back(record);
    while queue.len() > capacity {
        queue.pop_front();
    }
}

impl InterpolationLogSink for InterpolationLogger {
    fn log_situation(&self, record: SituationLog) {
        push_bounded(&self.situations, record, self.capacity);
    }

    fn log_parts(&self, record: PartsLog) {
        push_bounded(&self.parts, record, self.capacity);
    }
}
