//! Trend analysis over the most recent situations of one aircraft.
//!
//! [`AircraftSituationChange`] is derived, never stored by the network
//! layer. It answers questions the interpolator cannot answer from a
//! single situation: is the aircraft climbing, slowing down, rotating, was
//! it on the ground a moment ago, and does our scenery sit higher or lower
//! than the sender's.
//!
//! # Design
//!
//! - Null unless at least two situations are given
//! - Trend flags require a strict monotonic sequence (oldest to latest)
//! - Statistics use the population standard deviation
//! - The scenery deviation is only guessed for a stable ground distance

use super::callsign::Callsign;
use super::model::AircraftModel;
use super::situation::{
    AircraftSituation, GroundDetails, OnGround, OnGroundInfo, ALLOWED_ALTITUDE_DEVIATION_FT,
};

/// Number of situations analyzed by default.
pub const DEFAULT_CHANGE_WINDOW: usize = 5;

/// Ground distance deviation up to which AGL counts as constant.
const SCENERY_MAX_STD_DEV_FT: f64 = 2.0;

/// Pitch beyond which an aircraft is surely airborne.
/// Some tail draggers sit at 11° on the ground.
const MAX_PITCH_ON_GROUND_DEG: f64 = 20.0;

/// Bank beyond which an aircraft is surely airborne.
const MAX_BANK_ON_GROUND_DEG: f64 = 10.0;

/// Speed above which an aircraft is surely airborne when nothing is known.
const SURE_ROTATE_SPEED_KTS: f64 = 130.0;

/// Margin applied to a guessed rotate speed.
const SURE_ROTATE_FACTOR: f64 = 1.25;

/// Mean and population standard deviation of a series.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Statistic {
    pub mean: f64,
    pub std_dev: f64,
}

impl Statistic {
    /// None for an empty series.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        Some(Self {
            mean,
            std_dev: variance.sqrt(),
        })
    }
}

/// Why a scenery deviation was guessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SceneryDeviationHint {
    #[default]
    NoDeviationInfo,
    /// All situations on ground.
    AllOnGround,
    /// All situations before the latest on ground.
    WasOnGround,
    /// Altitude and AGL stable and below the CG.
    SmallAglDeviationNearGround,
}

impl std::fmt::Display for SceneryDeviationHint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneryDeviationHint::NoDeviationInfo => write!(f, "no info"),
            SceneryDeviationHint::AllOnGround => write!(f, "complete on ground"),
            SceneryDeviationHint::WasOnGround => write!(f, "was on ground"),
            SceneryDeviationHint::SmallAglDeviationNearGround => {
                write!(f, "small AGL deviation near ground")
            }
        }
    }
}

/// Trend of the latest situations.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AircraftSituationChange {
    callsign: Callsign,
    situations_count: usize,
    latest_adjusted_ms: i64,
    oldest_adjusted_ms: i64,

    const_ascending: bool,
    const_descending: bool,
    const_on_ground: bool,
    const_not_on_ground: bool,
    was_on_ground: bool,
    was_not_on_ground: bool,
    just_taking_off: bool,
    just_touching_down: bool,
    const_accelerating: bool,
    const_decelerating: bool,
    rotating_up: bool,
    push_back: bool,

    ground_speed: Option<Statistic>,
    pitch: Option<Statistic>,
    altitude: Option<Statistic>,
    elevation: Option<Statistic>,
    ground_distance: Option<Statistic>,
    max_ground_distance_ft: Option<f64>,

    scenery_deviation_ft: Option<f64>,
    scenery_deviation_cg_ft: Option<f64>,
    scenery_hint: SceneryDeviationHint,
}

impl AircraftSituationChange {
    /// The null change.
    pub fn null() -> Self {
        Self::default()
    }

    /// Analyze situations sorted latest first.
    ///
    /// `cg_ft` is needed for the CG-relative scenery deviation, `vtol`
    /// suppresses push back detection.
    pub fn analyze(situations: &[AircraftSituation], cg_ft: Option<f64>, vtol: bool) -> Self {
        if situations.len() < 2 {
            return Self::null();
        }
        debug_assert!(
            situations
                .windows(2)
                .all(|w| w[0].adjusted_timestamp_ms() >= w[1].adjusted_timestamp_ms()),
            "situations must be sorted latest first"
        );

        let latest = &situations[0];
        let oldest = &situations[situations.len() - 1];
        // oldest to latest
        let chrono: Vec<&AircraftSituation> = situations.iter().rev().collect();
        let all_in = |s: &[&AircraftSituation], state: OnGround| s.iter().all(|s| s.on_ground.state() == state);
        let everything = &chrono[..];
        let before_latest = &chrono[..chrono.len() - 1];

        let mut change = Self {
            callsign: latest.callsign.clone(),
            situations_count: situations.len(),
            latest_adjusted_ms: latest.adjusted_timestamp_ms(),
            oldest_adjusted_ms: oldest.adjusted_timestamp_ms(),
            const_ascending: strictly_monotonic(&chrono, |s| s.altitude_ft, |a, b| b > a),
            const_descending: strictly_monotonic(&chrono, |s| s.altitude_ft, |a, b| b < a),
            const_on_ground: all_in(everything, OnGround::OnGround),
            const_not_on_ground: all_in(everything, OnGround::NotOnGround),
            just_taking_off: latest.on_ground.state() == OnGround::NotOnGround
                && all_in(before_latest, OnGround::OnGround),
            just_touching_down: latest.is_on_ground() && all_in(before_latest, OnGround::NotOnGround),
            const_accelerating: strictly_monotonic(&chrono, |s| s.ground_speed_kts, |a, b| b > a),
            const_decelerating: strictly_monotonic(&chrono, |s| s.ground_speed_kts, |a, b| b < a),
            push_back: !vtol && situations.iter().any(|s| s.ground_speed_kts < 0.0),
            ..Self::default()
        };

        if situations.len() >= 3 {
            change.was_on_ground = all_in(before_latest, OnGround::OnGround);
            change.was_not_on_ground = all_in(before_latest, OnGround::NotOnGround);
        }

        change.calculate_statistics(situations, cg_ft);
        change.rotating_up = match change.pitch {
            Some(p) => latest.pitch_deg > p.mean + p.std_dev,
            None => false,
        };
        change
    }

    fn calculate_statistics(&mut self, situations: &[AircraftSituation], cg_ft: Option<f64>) {
        let gs: Vec<f64> = situations.iter().map(|s| s.ground_speed_kts).collect();
        let pitch: Vec<f64> = situations.iter().map(|s| s.pitch_deg).collect();
        let altitudes: Vec<f64> = situations.iter().map(|s| s.altitude_ft).collect();
        self.ground_speed = Statistic::from_values(&gs);
        self.pitch = Statistic::from_values(&pitch);
        self.altitude = Statistic::from_values(&altitudes);

        let elevations: Vec<f64> = situations.iter().filter_map(|s| s.ground_elevation_ft()).collect();
        if elevations.len() != situations.len() {
            return;
        }
        self.elevation = Statistic::from_values(&elevations);

        let distances: Vec<f64> = altitudes
            .iter()
            .zip(elevations.iter())
            .map(|(alt, elv)| alt - elv)
            .collect();
        self.ground_distance = Statistic::from_values(&distances);
        self.max_ground_distance_ft = distances.iter().copied().reduce(f64::max);
        self.guess_scenery_deviation(cg_ft);
    }

    fn guess_scenery_deviation(&mut self, cg_ft: Option<f64>) {
        let Some(distance) = self.ground_distance else {
            return;
        };
        if distance.std_dev > SCENERY_MAX_STD_DEV_FT {
            return;
        }
        let hint = if self.const_on_ground {
            SceneryDeviationHint::AllOnGround
        } else if self.was_on_ground {
            SceneryDeviationHint::WasOnGround
        } else {
            let stable_altitude = self
                .altitude
                .is_some_and(|a| a.std_dev <= SCENERY_MAX_STD_DEV_FT);
            let below_cg = matches!(
                (self.max_ground_distance_ft, cg_ft),
                (Some(max), Some(cg)) if max < cg
            );
            if !(stable_altitude && below_cg) {
                return;
            }
            SceneryDeviationHint::SmallAglDeviationNearGround
        };
        self.scenery_deviation_ft = Some(distance.mean);
        self.scenery_deviation_cg_ft = cg_ft.map(|cg| distance.mean - cg);
        self.scenery_hint = hint;
    }

    // ── accessors ──────────────────────────────────────────────────────────

    pub fn is_null(&self) -> bool {
        self.situations_count < 2
    }

    pub fn callsign(&self) -> &Callsign {
        &self.callsign
    }

    pub fn situations_count(&self) -> usize {
        self.situations_count
    }

    /// Adjusted time span covered, oldest to latest.
    pub fn adjusted_time_range_ms(&self) -> (i64, i64) {
        (self.oldest_adjusted_ms, self.latest_adjusted_ms)
    }

    pub fn is_const_ascending(&self) -> bool {
        self.const_ascending
    }

    pub fn is_const_descending(&self) -> bool {
        self.const_descending
    }

    pub fn is_const_on_ground(&self) -> bool {
        self.const_on_ground
    }

    pub fn is_const_not_on_ground(&self) -> bool {
        self.const_not_on_ground
    }

    pub fn was_const_on_ground(&self) -> bool {
        self.was_on_ground
    }

    pub fn was_const_not_on_ground(&self) -> bool {
        self.was_not_on_ground
    }

    pub fn is_just_taking_off(&self) -> bool {
        self.just_taking_off
    }

    pub fn is_just_touching_down(&self) -> bool {
        self.just_touching_down
    }

    pub fn is_const_accelerating(&self) -> bool {
        self.const_accelerating
    }

    pub fn is_const_decelerating(&self) -> bool {
        self.const_decelerating
    }

    pub fn is_rotating_up(&self) -> bool {
        self.rotating_up
    }

    pub fn contains_push_back(&self) -> bool {
        self.push_back
    }

    pub fn ground_speed_statistic(&self) -> Option<Statistic> {
        self.ground_speed
    }

    pub fn pitch_statistic(&self) -> Option<Statistic> {
        self.pitch
    }

    pub fn altitude_statistic(&self) -> Option<Statistic> {
        self.altitude
    }

    pub fn elevation_statistic(&self) -> Option<Statistic> {
        self.elevation
    }

    pub fn ground_distance_statistic(&self) -> Option<Statistic> {
        self.ground_distance
    }

    /// Elevations of all analyzed situations are nearly identical.
    pub fn has_elevation_dev_within_allowed_range(&self) -> bool {
        self.elevation
            .is_some_and(|e| e.std_dev < ALLOWED_ALTITUDE_DEVIATION_FT)
    }

    /// Altitudes of all analyzed situations are nearly identical.
    pub fn has_altitude_dev_within_allowed_range(&self) -> bool {
        self.altitude
            .is_some_and(|a| a.std_dev < ALLOWED_ALTITUDE_DEVIATION_FT)
    }

    pub fn has_scenery_deviation(&self) -> bool {
        self.scenery_deviation_ft.is_some()
    }

    /// Mean ground distance of the reference point (sender AGL).
    pub fn scenery_deviation_ft(&self) -> Option<f64> {
        self.scenery_deviation_ft
    }

    /// Scenery deviation minus CG: positive means rendered too high.
    pub fn scenery_deviation_cg_ft(&self) -> Option<f64> {
        self.scenery_deviation_cg_ft
    }

    pub fn scenery_hint(&self) -> SceneryDeviationHint {
        self.scenery_hint
    }

    // ── on ground guessing ─────────────────────────────────────────────────

    /// Guess the ground contact of `situation` when the network did not
    /// report it.
    ///
    /// Returns false if nothing was guessed (inbound details exist, or a
    /// VTOL aircraft left no clue).
    pub fn guess_on_ground(&self, situation: &mut AircraftSituation, model: &AircraftModel) -> bool {
        if !situation.should_guess_on_ground() {
            return false;
        }
        let guessed = |state| OnGroundInfo::new(state, GroundDetails::OnGroundByGuessing);

        // non VTOL aircraft have to move to be airborne
        let vtol = model.vtol;
        if !vtol && (situation.ground_speed_kts < 0.0 || !situation.is_moving()) {
            situation.on_ground = guessed(OnGround::OnGround);
            return true;
        }

        situation.on_ground = guessed(OnGround::NotOnGround);

        let params = model.guess_parameters();
        let cg_ft = situation.cg_ft.unwrap_or(params.cg_ft);
        let sure_rotate_kts = params
            .rotate_speed_kts
            .map(|vr| vr * SURE_ROTATE_FACTOR)
            .unwrap_or(SURE_ROTATE_SPEED_KTS);

        if situation.pitch_deg.abs() > MAX_PITCH_ON_GROUND_DEG
            || situation.bank_deg.abs() > MAX_BANK_ON_GROUND_DEG
            || situation.ground_speed_kts > sure_rotate_kts
        {
            return true;
        }

        // elevation detects under or near ground, never "above" (scenery may differ)
        let by_elevation = OnGroundInfo::from_ground_distance(situation.ground_distance_ft(cg_ft));
        if by_elevation.is_on_ground() {
            situation.on_ground = by_elevation;
            return true;
        }

        if !self.is_null() {
            if !vtol && self.was_const_on_ground() {
                if !self.is_rotating_up() {
                    // stick to the ground until rotating up
                    situation.on_ground = guessed(OnGround::OnGround);
                }
                return true;
            }
            if self.is_const_ascending() {
                return true;
            }
        }

        if vtol {
            situation.on_ground = OnGroundInfo::default();
            return false;
        }

        if let Some(vr) = params.rotate_speed_kts {
            if situation.ground_speed_kts < vr {
                situation.on_ground = guessed(OnGround::OnGround);
            }
        }
        true
    }
}

impl std::fmt::Display for AircraftSituationChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_null() {
            return write!(f, "null");
        }
        write!(
            f,
            "{} situations {} ({}-{}) asc/desc {}/{} gnd {}/{} acc/dec {}/{} rotate {} push back {} scenery {} [{}]",
            self.callsign,
            self.situations_count,
            self.oldest_adjusted_ms,
            self.latest_adjusted_ms,
            self.const_ascending,
            self.const_descending,
            self.const_on_ground,
            self.was_on_ground,
            self.const_accelerating,
            self.const_decelerating,
            self.rotating_up,
            self.push_back,
            self.scenery_deviation_ft
                .map(|d| format!("{:.1}ft", d))
                .unwrap_or_else(|| "-".to_string()),
            self.scenery_hint
        )
    }
}

/// True if `cmp(previous, next)` holds for every consecutive pair.
fn strictly_monotonic(
    chrono: &[&AircraftSituation],
    value: impl Fn(&AircraftSituation) -> f64,
    cmp: impl Fn(f64, f64) -> bool,
) -> bool {
    chrono.len() >= 2 && chrono.windows(2).all(|w| cmp(value(w[0]), value(w[1])))
}
