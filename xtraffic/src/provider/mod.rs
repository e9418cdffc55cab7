//! Boundary between the interpolation engine and its collaborators.
//!
//! The engine consumes three providers:
//!
//! - [`RemoteAircraftProvider`]: situation and parts snapshots written by
//!   the network layer
//! - [`SimulationEnvironmentProvider`]: CG lengths from the model database
//!   or the running simulator
//! - [`ElevationProvider`]: cached ground elevation lookups
//!
//! # Thread Safety
//!
//! All providers are `Send + Sync`. The network ingest thread writes into
//! a provider while the render thread reads snapshots from it; snapshot
//! reads only hold a lock for the time it takes to clone the records.
//!
//! None of the lookups perform I/O. Elevation queries are cache reads.

mod cg_cache;
mod elevation;
mod environment;
pub mod history;
mod store;

pub use cg_cache::CgCache;
pub use elevation::{ElevationCache, DEFAULT_ELEVATION_CACHE_CAPACITY};
pub use environment::SimulationEnvironment;
pub use history::{
    split_at_time, PartsHistory, SituationHistory, TimedHistory, Timestamped,
    MAX_PARTS_PER_CALLSIGN, MAX_SITUATIONS_PER_CALLSIGN,
};
pub use store::RemoteAircraftStore;

use crate::aviation::{AircraftModel, AircraftParts, AircraftSituation, Callsign};
use crate::coord::{ElevationPlane, GeoPosition};

/// Read access to the remote aircraft known to the network layer.
///
/// Snapshots are sorted latest first by adjusted timestamp.
pub trait RemoteAircraftProvider: Send + Sync {
    /// Situations of an aircraft, latest first.
    fn situations(&self, callsign: &Callsign) -> Vec<AircraftSituation>;

    /// Parts of an aircraft, latest first.
    fn parts(&self, callsign: &Callsign) -> Vec<AircraftParts>;

    /// Modification timestamp of the situation history, 0 if never written.
    ///
    /// Strictly increases with every write.
    fn situations_last_modified(&self, callsign: &Callsign) -> i64;

    /// Modification timestamp of the parts history, 0 if never written.
    fn parts_last_modified(&self, callsign: &Callsign) -> i64;

    /// True while the aircraft is tracked (in range).
    fn is_aircraft_in_range(&self, callsign: &Callsign) -> bool;

    /// The rendered model, if known.
    fn aircraft_model(&self, callsign: &Callsign) -> Option<AircraftModel>;

    /// Number of buffered situations.
    fn situations_count(&self, callsign: &Callsign) -> usize {
        self.situations(callsign).len()
    }

    /// Number of buffered parts.
    fn parts_count(&self, callsign: &Callsign) -> usize {
        self.parts(callsign).len()
    }

    /// True once the network delivered parts for the aircraft.
    fn remote_aircraft_supports_parts(&self, callsign: &Callsign) -> bool {
        self.parts_count(callsign) > 0
    }
}

/// CG lookups from the model database and the simulator.
pub trait SimulationEnvironmentProvider: Send + Sync {
    /// CG from the model database.
    fn cg_from_database(&self, callsign: &Callsign) -> Option<f64>;

    /// CG as reported by the simulator, falling back to `db_cg_ft`.
    fn simulator_or_db_cg(&self, callsign: &Callsign, db_cg_ft: Option<f64>) -> Option<f64>;
}

/// Ground elevation lookups.
pub trait ElevationProvider: Send + Sync {
    /// Closest known elevation plane within `radius_m` of `position`.
    fn find_closest_elevation(&self, position: &GeoPosition, radius_m: f64) -> Option<ElevationPlane>;
}
