//! Per-frame interpolation of remote aircraft.
//!
//! # Architecture
//!
//! ```text
//!  RemoteAircraftProvider ──► Interpolator ──► InterpolationResult
//!                               │  │  │
//!           InterpolationStrategy  │  PartsSelector
//!             (linear | spline)    │
//!                     GroundElevationResolver
//! ```
//!
//! The [`Interpolator`] owns one strategy, one elevation resolver and one
//! parts selector per callsign. Strategies produce an [`Interpolant`]; the
//! interpolator turns it into a situation, fixes ground contact and altitude,
//! and attaches parts. Diagnostic records go to an optional
//! [`InterpolationLogSink`].

mod elevation;
mod interpolant;
mod linear;
mod logger;
mod orchestrator;
mod parts;
mod setup;
mod spline;
mod state;
mod status;

pub use elevation::{interpolated_elevation, GroundElevationResolver};
pub use interpolant::{
    InterpolantContext, Interpolant, InterpolantError, InterpolationStrategy, Pbh,
};
pub use linear::LinearStrategy;
pub use logger::{InterpolationLogSink, InterpolationLogger, PartsLog, SituationLog};
pub use orchestrator::Interpolator;
pub use parts::{guess_parts, latest_reported, PartsRequest, PartsSelection, PartsSelector};
pub use setup::{
    EngineConfig, InterpolationSetup, InterpolatorMode, DEFAULT_CG_REFRESH_INTERVAL,
    DEFAULT_MAX_LOG_ENTRIES, DEFAULT_PARTS_GUESSING_RATIO, DEFAULT_PARTS_INTERPOLATION_RATIO,
};
pub use spline::SplineStrategy;
pub use state::{InterpolatorState, StepOutcome};
pub use status::{InterpolationResult, InterpolationStatus, PartsStatus};
