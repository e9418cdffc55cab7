//! Aviation domain types: callsigns, situations, parts, models and the
//! trend analysis over a situation history.

pub mod callsign;
pub mod change;
pub mod model;
pub mod parts;
pub mod situation;

pub use callsign::Callsign;
pub use change::{AircraftSituationChange, SceneryDeviationHint, Statistic, DEFAULT_CHANGE_WINDOW};
pub use model::{AircraftCategory, AircraftModel, ModelParameters, DEFAULT_ENGINE_COUNT};
pub use parts::{engines, AircraftLights, AircraftParts, EngineState, PartsDetails};
pub use situation::{
    normalize_heading, normalize_plus_minus_180, AircraftSituation, AltitudeCorrection,
    ElevationInfo, GroundDetails, OnGround, OnGroundInfo, ALLOWED_ALTITUDE_DEVIATION_FT,
    DEFAULT_CG_FT, GROUND_FACTOR_THRESHOLD, INTERIM_TIME_OFFSET_MS, POSITION_TIME_OFFSET_MS,
};
