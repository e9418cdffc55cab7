//! Interpolation strategy trait and the blending helpers shared by the
//! linear and spline strategies.
//!
//! A strategy receives the situations of one aircraft (latest first) and
//! a target time, picks the bracketing pair and produces an [`Interpolant`]:
//! the blended position, altitude, attitude and, when both endpoints carry
//! ground details, a blended ground factor.
//!
//! # Design
//!
//! Strategies are trait objects selected at construction, in the same way
//! prefetch strategies are boxed and swapped at runtime. A strategy may keep
//! state between steps (the spline caches its derivatives).
//!
//! # Time Fraction
//!
//! All strategies work on adjusted timestamps. The fraction is
//! `1 - (end - now) / (end - start)` clamped to `[0, 1]`, so the output
//! equals the older endpoint at its adjusted time and the newer endpoint
//! at its adjusted time.

use thiserror::Error;

use crate::aviation::{
    normalize_heading, AircraftSituation, ElevationInfo, GroundDetails, OnGround, OnGroundInfo,
};
use crate::coord::{GeoPosition, SINGLE_POINT_RADIUS_M};
use crate::provider::ElevationProvider;

/// Ground factors below this count as definitely airborne.
pub(crate) const GROUND_FACTOR_AIRBORNE: f64 = 0.001;

/// Ground factors above this count as definitely on ground.
pub(crate) const GROUND_FACTOR_GROUNDED: f64 = 0.999;

/// Reasons a strategy cannot produce an interpolant.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InterpolantError {
    #[error("no situations")]
    NoSituations,

    #[error("situations not in time order ({older_ms} is not before {newer_ms})")]
    TimeOrder { older_ms: i64, newer_ms: i64 },

    #[error("invalid position in situation at {timestamp_ms}")]
    InvalidPosition { timestamp_ms: i64 },

    #[error("interpolated vector out of range")]
    InvalidVector,
}

/// Inputs of one interpolation step.
#[derive(Clone, Copy)]
pub struct InterpolantContext<'a> {
    /// Situations, latest first.
    pub situations: &'a [AircraftSituation],
    /// Target time in ms since epoch.
    pub now_ms: i64,
    /// CG used to correct endpoint altitudes.
    pub cg_ft: f64,
    /// Elevation lookups for endpoints without elevation.
    pub elevation: Option<&'a dyn ElevationProvider>,
    /// Changes whenever the situations change.
    pub version: i64,
}

impl std::fmt::Debug for InterpolantContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterpolantContext")
            .field("situations", &self.situations.len())
            .field("now_ms", &self.now_ms)
            .field("cg_ft", &self.cg_ft)
            .field("elevation", &self.elevation.is_some())
            .field("version", &self.version)
            .finish()
    }
}

/// Pitch, bank and heading in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pbh {
    pub pitch_deg: f64,
    pub bank_deg: f64,
    pub heading_deg: f64,
}

impl Pbh {
    pub fn of(situation: &AircraftSituation) -> Self {
        Self {
            pitch_deg: situation.pitch_deg,
            bank_deg: situation.bank_deg,
            heading_deg: situation.heading_deg,
        }
    }

    /// Blend towards `end`, heading along the shorter arc.
    pub fn blend(&self, end: &Pbh, t: f64) -> Self {
        Self {
            pitch_deg: blend(self.pitch_deg, end.pitch_deg, t),
            bank_deg: blend(self.bank_deg, end.bank_deg, t),
            heading_deg: blend_heading(self.heading_deg, end.heading_deg, t),
        }
    }
}

/// Output of a strategy for one step.
#[derive(Debug, Clone, PartialEq)]
pub struct Interpolant {
    /// Older endpoint, elevation completed where possible.
    pub start: AircraftSituation,
    /// Newer endpoint, elevation completed where possible.
    pub end: AircraftSituation,
    /// Time fraction in [0, 1].
    pub fraction: f64,
    /// Blended raw timestamp.
    pub interpolated_time_ms: i64,
    /// Blended time offset.
    pub time_offset_ms: i64,
    pub position: GeoPosition,
    /// Blended corrected altitude.
    pub altitude_ft: f64,
    pub pbh: Pbh,
    pub ground_speed_kts: f64,
    /// Blended ground contact, None unless both endpoints have ground details.
    pub on_ground: Option<OnGroundInfo>,
    /// False if a single situation was handed through.
    pub interpolated: bool,
    /// False if cached data of a previous step was reused.
    pub recalculated: bool,
}

impl Interpolant {
    /// Interpolant that hands a single situation through unchanged.
    pub fn single(situation: &AircraftSituation, cg_ft: f64) -> Self {
        let (altitude_ft, _) = situation.corrected_altitude_ft(cg_ft, true);
        Self {
            start: situation.clone(),
            end: situation.clone(),
            fraction: 1.0,
            interpolated_time_ms: situation.timestamp_ms,
            time_offset_ms: situation.time_offset_ms,
            position: situation.position,
            altitude_ft,
            pbh: Pbh::of(situation),
            ground_speed_kts: situation.ground_speed_kts,
            on_ground: None,
            interpolated: false,
            recalculated: true,
        }
    }

    /// True if the blended output is usable.
    pub fn is_valid(&self) -> bool {
        self.position.is_valid() && self.altitude_ft.is_finite()
    }
}

/// Interpolation strategy.
pub trait InterpolationStrategy: Send {
    /// Produce the interpolant for `ctx.now_ms`.
    fn interpolant(&mut self, ctx: &InterpolantContext<'_>) -> Result<Interpolant, InterpolantError>;

    /// Human-readable strategy name.
    fn name(&self) -> &'static str;

    /// Drop cached state.
    fn reset(&mut self) {}
}

// ─────────────────────────────────────────────────────────────────────────────
// Blending helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Linear blend, exact at both ends.
#[inline]
pub fn blend(start: f64, end: f64, t: f64) -> f64 {
    start * (1.0 - t) + end * t
}

/// Blend two headings along the shorter arc. The result is in [0, 360).
pub fn blend_heading(start_deg: f64, end_deg: f64, t: f64) -> f64 {
    if t >= 1.0 {
        return normalize_heading(end_deg);
    }
    let delta = (end_deg - start_deg + 540.0).rem_euclid(360.0) - 180.0;
    normalize_heading(start_deg + delta * t)
}

/// Blend two normal vectors component by component.
pub fn blend_position(start: &GeoPosition, end: &GeoPosition, t: f64) -> GeoPosition {
    let s = start.normal_vector();
    let e = end.normal_vector();
    GeoPosition::from_normal_vector([blend(s[0], e[0], t), blend(s[1], e[1], t), blend(s[2], e[2], t)])
}

/// Fraction of `now_ms` between two adjusted timestamps, clamped to [0, 1].
///
/// Degenerate ranges (end not after start) yield 1.
pub fn time_fraction(start_adjusted_ms: i64, end_adjusted_ms: i64, now_ms: i64) -> f64 {
    if end_adjusted_ms <= start_adjusted_ms {
        return 1.0;
    }
    let range = (end_adjusted_ms - start_adjusted_ms) as f64;
    let remaining = (end_adjusted_ms - now_ms) as f64;
    (1.0 - remaining / range).clamp(0.0, 1.0)
}

/// Raw timestamp at fraction `t` between two situations.
pub fn interpolated_time_ms(start: &AircraftSituation, end: &AircraftSituation, t: f64) -> i64 {
    start.timestamp_ms + (t * (end.timestamp_ms - start.timestamp_ms) as f64).round() as i64
}

/// Blend the ground contact of two situations.
///
/// None unless both carry ground details usable for interpolation.
pub fn interpolate_ground_factor(
    start: &AircraftSituation,
    end: &AircraftSituation,
    t: f64,
) -> Option<OnGroundInfo> {
    if !start.has_ground_details_for_interpolation() || !end.has_ground_details_for_interpolation() {
        return None;
    }
    let f0 = start.on_ground.factor();
    let f1 = end.on_ground.factor();
    if f0 < GROUND_FACTOR_AIRBORNE && f1 < GROUND_FACTOR_AIRBORNE {
        return Some(OnGroundInfo::new(OnGround::NotOnGround, GroundDetails::Interpolated));
    }
    if f0 > GROUND_FACTOR_GROUNDED && f1 > GROUND_FACTOR_GROUNDED {
        return Some(OnGroundInfo::new(OnGround::OnGround, GroundDetails::Interpolated));
    }
    Some(OnGroundInfo::from_factor(blend(f0, f1, t), GroundDetails::Interpolated))
}

/// Fill a missing endpoint elevation from the provider.
///
/// Skipped for situations where ground handling is irrelevant. Returns
/// true if an elevation was set.
pub fn complete_endpoint_elevation(
    situation: &mut AircraftSituation,
    provider: Option<&dyn ElevationProvider>,
) -> bool {
    if situation.has_ground_elevation() || situation.can_likely_skip_near_ground_interpolation() {
        return false;
    }
    let Some(provider) = provider else {
        return false;
    };
    let plane = provider.find_closest_elevation(&situation.position, SINGLE_POINT_RADIUS_M);
    situation.set_ground_elevation_checked(plane, ElevationInfo::FromProvider)
}

/// Both endpoints must have usable positions.
pub(crate) fn check_positions(
    start: &AircraftSituation,
    end: &AircraftSituation,
) -> Result<(), InterpolantError> {
    for situation in [start, end] {
        if !situation.is_valid_vector_range() {
            return Err(InterpolantError::InvalidPosition {
                timestamp_ms: situation.timestamp_ms,
            });
        }
    }
    Ok(())
}
