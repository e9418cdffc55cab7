//! Aircraft situations: a timestamped pose of one remote aircraft.
//!
//! A situation always carries a position and an MSL altitude. Ground
//! elevation, CG and ground contact information are optional and are
//! filled in by the network layer or by the interpolator.
//!
//! # Timestamps
//!
//! Every situation carries a time offset hint: the cadence at which
//! reports are expected (6s for normal position reports, 2s for interim
//! reports). Interpolation runs on the *adjusted* timestamp
//! (`timestamp + offset`), which keeps a consistent delay behind the
//! sender no matter which report type arrived last.

use crate::coord::{
    feet_to_meters, meters_to_feet, ElevationPlane, GeoPosition, KMH_PER_KNOT, MPS_PER_KNOT,
};

use super::callsign::Callsign;

/// Time offset for normal position reports.
pub const POSITION_TIME_OFFSET_MS: i64 = 6000;

/// Time offset for interim (fast) position reports.
pub const INTERIM_TIME_OFFSET_MS: i64 = 2000;

/// Ground factor at and above which an aircraft is rendered on ground.
pub const GROUND_FACTOR_THRESHOLD: f64 = 0.95;

/// Default CG (reference point above ground) when nothing else is known.
pub const DEFAULT_CG_FT: f64 = 2.5 / crate::coord::METERS_PER_FOOT;

/// Standard deviation below which altitudes count as stable (~1m).
pub const ALLOWED_ALTITUDE_DEVIATION_FT: f64 = 3.0;

/// Distance within which an aircraft is snapped to the ground.
const NEAR_GROUND_DELTA_M: f64 = 0.5;

/// Negative ground distances smaller than this are rounding noise.
const UNDERFLOW_EPSILON_FT: f64 = 1e-6;

/// Minimum speed to count as moving.
const MOVING_THRESHOLD_KMH: f64 = 2.5;

/// Faster than any aircraft on a runway (Concorde rotated at ~220 kts).
const SKIP_NEAR_GROUND_SPEED_KTS: f64 = 225.0;

/// Height above ground at which ground handling is irrelevant.
const SKIP_NEAR_GROUND_HEIGHT_M: f64 = 400.0;

// ─────────────────────────────────────────────────────────────────────────────
// Ground contact
// ─────────────────────────────────────────────────────────────────────────────

/// Ground contact state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnGround {
    /// No information.
    #[default]
    Unknown,
    /// Aircraft touches the ground.
    OnGround,
    /// Aircraft is airborne.
    NotOnGround,
}

/// Where the ground contact information came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroundDetails {
    /// Nothing known.
    #[default]
    NotSet,
    /// Guessed from speed, attitude and elevation.
    OnGroundByGuessing,
    /// Reported by the network in the situation itself.
    FromNetwork,
    /// Reported by the network in a parts record.
    FromParts,
    /// Blended from two situations with ground details.
    Interpolated,
    /// Carried over from the previous interpolation step.
    FromCache,
}

impl GroundDetails {
    /// True for information delivered by the network.
    pub fn is_inbound(self) -> bool {
        matches!(self, GroundDetails::FromNetwork | GroundDetails::FromParts)
    }
}

impl std::fmt::Display for GroundDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GroundDetails::NotSet => write!(f, "not set"),
            GroundDetails::OnGroundByGuessing => write!(f, "guessed"),
            GroundDetails::FromNetwork => write!(f, "network"),
            GroundDetails::FromParts => write!(f, "parts"),
            GroundDetails::Interpolated => write!(f, "interpolated"),
            GroundDetails::FromCache => write!(f, "cache"),
        }
    }
}

/// Ground contact state, its provenance and a soft ground factor.
///
/// The factor is always within [0, 1]. Values at or above
/// [`GROUND_FACTOR_THRESHOLD`] count as on ground.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OnGroundInfo {
    state: OnGround,
    details: GroundDetails,
    factor: f64,
}

impl OnGroundInfo {
    /// Create from a definite state.
    pub fn new(state: OnGround, details: GroundDetails) -> Self {
        let factor = match state {
            OnGround::OnGround => 1.0,
            OnGround::NotOnGround | OnGround::Unknown => 0.0,
        };
        Self {
            state,
            details,
            factor,
        }
    }

    /// Create from a ground factor. Out of range values are clamped.
    pub fn from_factor(factor: f64, details: GroundDetails) -> Self {
        let factor = if factor.is_nan() {
            0.0
        } else {
            factor.clamp(0.0, 1.0)
        };
        let state = if factor >= GROUND_FACTOR_THRESHOLD {
            OnGround::OnGround
        } else {
            OnGround::NotOnGround
        };
        Self {
            state,
            details,
            factor,
        }
    }

    /// Derive from a CG-relative ground distance.
    ///
    /// Only "on ground" can be detected this way: a positive distance may
    /// just be a scenery difference between sender and receiver.
    pub fn from_ground_distance(ground_distance_ft: Option<f64>) -> Self {
        match ground_distance_ft {
            Some(d) if feet_to_meters(d) < NEAR_GROUND_DELTA_M => {
                Self::new(OnGround::OnGround, GroundDetails::OnGroundByGuessing)
            }
            _ => Self::default(),
        }
    }

    pub fn state(&self) -> OnGround {
        self.state
    }

    pub fn details(&self) -> GroundDetails {
        self.details
    }

    /// Ground factor in [0, 1].
    pub fn factor(&self) -> f64 {
        self.factor
    }

    pub fn is_on_ground(&self) -> bool {
        self.state == OnGround::OnGround
    }

    /// Same state and factor with different provenance.
    pub fn with_details(mut self, details: GroundDetails) -> Self {
        self.details = details;
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Elevation and altitude correction
// ─────────────────────────────────────────────────────────────────────────────

/// How the ground elevation of a situation was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ElevationInfo {
    #[default]
    NoElevation,
    /// Delivered with the network report.
    FromNetwork,
    /// Queried from the elevation provider.
    FromProvider,
    /// Reused from the previous interpolated situation.
    FromCache,
    /// Reused because the aircraft did not move between reports.
    SamePosition,
    /// Mean of stable elevations of recent situations.
    ChangeAverage,
    /// Geometrically interpolated between two situations.
    Interpolated,
}

impl std::fmt::Display for ElevationInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ElevationInfo::NoElevation => write!(f, "no elevation"),
            ElevationInfo::FromNetwork => write!(f, "network"),
            ElevationInfo::FromProvider => write!(f, "provider"),
            ElevationInfo::FromCache => write!(f, "cache"),
            ElevationInfo::SamePosition => write!(f, "same position"),
            ElevationInfo::ChangeAverage => write!(f, "change average"),
            ElevationInfo::Interpolated => write!(f, "interpolated"),
        }
    }
}

/// Outcome of the ground correction of an altitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AltitudeCorrection {
    /// Altitude kept (or snapped while already within 0.5m of the ground).
    #[default]
    NoCorrection,
    /// Altitude was below ground and lifted to ground + CG.
    Underflow,
    /// Aircraft on ground was pulled down to ground + CG.
    DraggedToGround,
    /// No ground elevation known, altitude kept.
    NoElevation,
}

impl std::fmt::Display for AltitudeCorrection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AltitudeCorrection::NoCorrection => write!(f, "no correction"),
            AltitudeCorrection::Underflow => write!(f, "underflow"),
            AltitudeCorrection::DraggedToGround => write!(f, "dragged to ground"),
            AltitudeCorrection::NoElevation => write!(f, "no elevation"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Situation
// ─────────────────────────────────────────────────────────────────────────────

/// Normalize a heading into [0, 360).
#[inline]
pub fn normalize_heading(deg: f64) -> f64 {
    let h = deg.rem_euclid(360.0);
    if h >= 360.0 {
        0.0
    } else {
        h
    }
}

/// Normalize an angle into [-180, 180).
#[inline]
pub fn normalize_plus_minus_180(deg: f64) -> f64 {
    (deg + 180.0).rem_euclid(360.0) - 180.0
}

/// Timestamped pose of a remote aircraft.
#[derive(Debug, Clone, PartialEq)]
pub struct AircraftSituation {
    /// Callsign of the aircraft.
    pub callsign: Callsign,
    /// Timestamp in ms since epoch.
    pub timestamp_ms: i64,
    /// Expected report cadence in ms.
    pub time_offset_ms: i64,
    /// Horizontal position.
    pub position: GeoPosition,
    /// Altitude above mean sea level in feet (reference point, not gear).
    pub altitude_ft: f64,
    /// Pitch in degrees, positive nose up.
    pub pitch_deg: f64,
    /// Bank in degrees, positive right wing down.
    pub bank_deg: f64,
    /// True heading in degrees, [0, 360).
    pub heading_deg: f64,
    /// Ground speed in knots. Negative while pushing back.
    pub ground_speed_kts: f64,
    /// Ground contact.
    pub on_ground: OnGroundInfo,
    ground_elevation: Option<ElevationPlane>,
    elevation_info: ElevationInfo,
    /// Center of gravity height above gear in feet.
    pub cg_ft: Option<f64>,
}

impl AircraftSituation {
    /// Create a situation with level attitude and no ground information.
    pub fn new(callsign: Callsign, timestamp_ms: i64, position: GeoPosition, altitude_ft: f64) -> Self {
        Self {
            callsign,
            timestamp_ms,
            time_offset_ms: POSITION_TIME_OFFSET_MS,
            position,
            altitude_ft,
            pitch_deg: 0.0,
            bank_deg: 0.0,
            heading_deg: 0.0,
            ground_speed_kts: 0.0,
            on_ground: OnGroundInfo::default(),
            ground_elevation: None,
            elevation_info: ElevationInfo::NoElevation,
            cg_ft: None,
        }
    }

    pub fn with_pbh(mut self, pitch_deg: f64, bank_deg: f64, heading_deg: f64) -> Self {
        self.set_pitch(pitch_deg);
        self.set_bank(bank_deg);
        self.set_heading(heading_deg);
        self
    }

    pub fn with_ground_speed(mut self, ground_speed_kts: f64) -> Self {
        self.ground_speed_kts = ground_speed_kts;
        self
    }

    pub fn with_on_ground(mut self, on_ground: OnGroundInfo) -> Self {
        self.on_ground = on_ground;
        self
    }

    pub fn with_time_offset(mut self, time_offset_ms: i64) -> Self {
        self.time_offset_ms = time_offset_ms;
        self
    }

    /// Attach a ground elevation sampled at this situation's position.
    pub fn with_ground_elevation(mut self, elevation_ft: f64, info: ElevationInfo) -> Self {
        self.set_ground_elevation_ft(elevation_ft, info);
        self
    }

    pub fn with_cg(mut self, cg_ft: f64) -> Self {
        self.cg_ft = Some(cg_ft);
        self
    }

    /// Timestamp plus time offset.
    #[inline]
    pub fn adjusted_timestamp_ms(&self) -> i64 {
        self.timestamp_ms + self.time_offset_ms
    }

    pub fn set_heading(&mut self, heading_deg: f64) {
        self.heading_deg = normalize_heading(heading_deg);
    }

    pub fn set_pitch(&mut self, pitch_deg: f64) {
        self.pitch_deg = normalize_plus_minus_180(pitch_deg);
    }

    pub fn set_bank(&mut self, bank_deg: f64) {
        self.bank_deg = normalize_plus_minus_180(bank_deg);
    }

    // ── elevation ──────────────────────────────────────────────────────────

    pub fn ground_elevation(&self) -> Option<&ElevationPlane> {
        self.ground_elevation.as_ref()
    }

    pub fn ground_elevation_ft(&self) -> Option<f64> {
        self.ground_elevation.map(|p| p.elevation_ft)
    }

    pub fn has_ground_elevation(&self) -> bool {
        self.ground_elevation.is_some()
    }

    /// Provenance of the ground elevation.
    pub fn elevation_info(&self) -> ElevationInfo {
        if self.ground_elevation.is_none() {
            return ElevationInfo::NoElevation;
        }
        self.elevation_info
    }

    pub fn set_ground_elevation(&mut self, plane: ElevationPlane, info: ElevationInfo) {
        self.ground_elevation = Some(plane);
        self.elevation_info = info;
    }

    /// Set an elevation valid for this position only.
    pub fn set_ground_elevation_ft(&mut self, elevation_ft: f64, info: ElevationInfo) {
        self.set_ground_elevation(ElevationPlane::single_point(self.position, elevation_ft), info);
    }

    /// Set the elevation unless one is already present.
    ///
    /// Returns true if the elevation was set.
    pub fn set_ground_elevation_checked(
        &mut self,
        plane: Option<ElevationPlane>,
        info: ElevationInfo,
    ) -> bool {
        match plane {
            Some(plane) if self.ground_elevation.is_none() => {
                self.set_ground_elevation(plane, info);
                true
            }
            _ => false,
        }
    }

    pub fn reset_ground_elevation(&mut self) {
        self.ground_elevation = None;
        self.elevation_info = ElevationInfo::NoElevation;
    }

    /// True if this situation's elevation may be reused at `target`.
    ///
    /// Elevation from the provider is never overwritten by a reused one.
    pub fn can_transfer_ground_elevation(&self, target: &AircraftSituation, radius_m: f64) -> bool {
        let Some(plane) = self.ground_elevation else {
            return false;
        };
        if target.elevation_info() == ElevationInfo::FromProvider {
            return false;
        }
        plane.distance_m(&target.position) <= radius_m
    }

    /// Altitude above the ground elevation (reference point).
    pub fn height_above_ground_ft(&self) -> Option<f64> {
        self.ground_elevation_ft().map(|elv| self.altitude_ft - elv)
    }

    /// Distance between the gear and the ground, given the CG.
    pub fn ground_distance_ft(&self, cg_ft: f64) -> Option<f64> {
        self.ground_elevation_ft()
            .map(|elv| self.altitude_ft - (elv + cg_ft))
    }

    // ── ground contact ─────────────────────────────────────────────────────

    pub fn is_on_ground(&self) -> bool {
        self.on_ground.is_on_ground()
    }

    /// Ground information reported by the network.
    pub fn has_inbound_ground_details(&self) -> bool {
        self.on_ground.details().is_inbound()
    }

    /// Ground contact needs guessing unless the network reported it.
    pub fn should_guess_on_ground(&self) -> bool {
        !self.has_inbound_ground_details()
    }

    /// The ground factor can be blended with another situation's.
    pub fn has_ground_details_for_interpolation(&self) -> bool {
        self.on_ground.details() != GroundDetails::NotSet
    }

    pub fn is_moving(&self) -> bool {
        self.ground_speed_kts * KMH_PER_KNOT >= MOVING_THRESHOLD_KMH
    }

    /// True if ground elevation is irrelevant for this situation.
    pub fn can_likely_skip_near_ground_interpolation(&self) -> bool {
        if self.is_on_ground() && self.has_inbound_ground_details() {
            return false;
        }
        if self.ground_speed_kts > SKIP_NEAR_GROUND_SPEED_KTS {
            return true;
        }
        matches!(
            self.height_above_ground_ft(),
            Some(agl) if feet_to_meters(agl) >= SKIP_NEAR_GROUND_HEIGHT_M
        )
    }

    /// Distance travelled in `ms` at the current ground speed, at least `min_m`.
    pub fn distance_per_time_m(&self, ms: i64, min_m: f64) -> f64 {
        let d = self.ground_speed_kts.abs() * MPS_PER_KNOT * (ms as f64 / 1000.0);
        d.max(min_m)
    }

    /// Distance travelled in 250ms, at least `min_m`.
    pub fn distance_per_time_250ms_m(&self, min_m: f64) -> f64 {
        self.distance_per_time_m(250, min_m)
    }

    // ── altitude ───────────────────────────────────────────────────────────

    /// Altitude corrected against ground + CG.
    ///
    /// Below ground is lifted, within 0.5m of the ground is snapped, and
    /// with `drag_to_ground` an aircraft known or guessed to be on ground
    /// is pulled down.
    pub fn corrected_altitude_ft(&self, cg_ft: f64, drag_to_ground: bool) -> (f64, AltitudeCorrection) {
        let Some(elevation_ft) = self.ground_elevation_ft() else {
            return (self.altitude_ft, AltitudeCorrection::NoElevation);
        };
        let ground_plus_cg = elevation_ft + cg_ft;
        let ground_distance = self.altitude_ft - ground_plus_cg;

        if ground_distance < -UNDERFLOW_EPSILON_FT {
            return (ground_plus_cg, AltitudeCorrection::Underflow);
        }
        if ground_distance.abs() < meters_to_feet(NEAR_GROUND_DELTA_M) {
            return (ground_plus_cg, AltitudeCorrection::NoCorrection);
        }
        let force_drag = drag_to_ground
            && self.is_on_ground()
            && (self.has_inbound_ground_details()
                || self.on_ground.details() == GroundDetails::OnGroundByGuessing);
        if force_drag {
            return (ground_plus_cg, AltitudeCorrection::DraggedToGround);
        }
        (self.altitude_ft, AltitudeCorrection::NoCorrection)
    }

    /// Apply [`Self::corrected_altitude_ft`] and remember the CG.
    pub fn correct_altitude(&mut self, cg_ft: f64, drag_to_ground: bool) -> AltitudeCorrection {
        let (altitude_ft, correction) = self.corrected_altitude_ft(cg_ft, drag_to_ground);
        self.altitude_ft = altitude_ft;
        self.cg_ft = Some(cg_ft);
        correction
    }

    pub fn add_altitude_offset(&mut self, offset_ft: f64) {
        self.altitude_ft += offset_ft;
    }

    // ── geometry ───────────────────────────────────────────────────────────

    pub fn distance_m(&self, other: &AircraftSituation) -> f64 {
        self.position.distance_m(&other.position)
    }

    pub fn equal_normal_vector(&self, other: &AircraftSituation) -> bool {
        self.position.equal_normal_vector(&other.position)
    }

    /// True if position and altitude are usable.
    pub fn is_valid_vector_range(&self) -> bool {
        self.position.is_valid() && self.altitude_ft.is_finite()
    }
}

impl std::fmt::Display for AircraftSituation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ts {} (+{}ms) pos {} alt {:.1}ft p/b/h {:.1}/{:.1}/{:.1} gs {:.1}kts gnd {:.2} [{}] elv {}",
            self.callsign,
            self.timestamp_ms,
            self.time_offset_ms,
            self.position,
            self.altitude_ft,
            self.pitch_deg,
            self.bank_deg,
            self.heading_deg,
            self.ground_speed_kts,
            self.on_ground.factor(),
            self.on_ground.details(),
            match self.ground_elevation_ft() {
                Some(elv) => format!("{:.1}ft [{}]", elv, self.elevation_info()),
                None => "none".to_string(),
            }
        )
    }
}
