//! Synthetic approach and landing traffic.
//!
//! Every aircraft flies the same 3° glide path to a runway threshold,
//! touches down, decelerates and taxis on. Aircraft start staggered in
//! time. Even aircraft report parts, odd ones report none so their parts
//! are guessed.

use std::time::Instant;

use xtraffic::aviation::{
    engines, AircraftLights, AircraftModel, AircraftParts, AircraftSituation, Callsign, GroundDetails,
    OnGround, OnGroundInfo, POSITION_TIME_OFFSET_MS,
};
use xtraffic::coord::{meters_to_feet, ElevationPlane, GeoPosition, MPS_PER_KNOT};

/// Runway threshold.
const THRESHOLD_LAT: f64 = 47.2602;
const THRESHOLD_LON: f64 = 11.3439;
const FIELD_ELEVATION_FT: f64 = 1906.0;
const RUNWAY_HEADING_DEG: f64 = 260.0;

/// Distance from start to threshold.
const APPROACH_DISTANCE_M: f64 = 9000.0;
const APPROACH_KTS: f64 = 140.0;
const TAXI_KTS: f64 = 20.0;
const ROLLOUT_S: f64 = 40.0;
const GLIDE_SLOPE_DEG: f64 = 3.0;

/// Start delay between consecutive aircraft.
const STAGGER_S: f64 = 15.0;

/// Network report cadence.
pub const REPORT_INTERVAL_MS: i64 = 5000;

const MODELS: [(&str, &str); 4] = [
    ("A320 CFM", "A320"),
    ("B738 WINGLETS", "B738"),
    ("DH8D", "DH8D"),
    ("C172 SKYHAWK", "C172"),
];

/// Milliseconds since the simulation started.
#[derive(Debug, Clone, Copy)]
pub struct SimClock {
    start: Instant,
}

impl SimClock {
    pub fn start() -> Self {
        Self { start: Instant::now() }
    }

    pub fn now_ms(&self) -> i64 {
        self.start.elapsed().as_millis() as i64
    }
}

/// Kinematic state along the track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackPoint {
    /// Distance flown from the start point.
    pub along_m: f64,
    pub ground_speed_kts: f64,
    pub height_above_ground_ft: f64,
    pub pitch_deg: f64,
}

impl TrackPoint {
    pub fn on_ground(&self) -> bool {
        self.height_above_ground_ft <= 0.0
    }
}

/// Track state `t_s` seconds after the aircraft started.
pub fn track_at(t_s: f64) -> TrackPoint {
    let t_s = t_s.max(0.0);
    let approach_mps = APPROACH_KTS * MPS_PER_KNOT;
    let taxi_mps = TAXI_KTS * MPS_PER_KNOT;
    let touchdown_s = APPROACH_DISTANCE_M / approach_mps;

    if t_s < touchdown_s {
        let along_m = approach_mps * t_s;
        let height_m = (APPROACH_DISTANCE_M - along_m) * GLIDE_SLOPE_DEG.to_radians().tan();
        return TrackPoint {
            along_m,
            ground_speed_kts: APPROACH_KTS,
            height_above_ground_ft: meters_to_feet(height_m),
            pitch_deg: 2.5,
        };
    }

    let decel = (approach_mps - taxi_mps) / ROLLOUT_S;
    let dt = t_s - touchdown_s;
    let (rolled_m, speed_mps) = if dt < ROLLOUT_S {
        (approach_mps * dt - 0.5 * decel * dt * dt, approach_mps - decel * dt)
    } else {
        let rollout_m = approach_mps * ROLLOUT_S - 0.5 * decel * ROLLOUT_S * ROLLOUT_S;
        (rollout_m + taxi_mps * (dt - ROLLOUT_S), taxi_mps)
    };
    TrackPoint {
        along_m: APPROACH_DISTANCE_M + rolled_m,
        ground_speed_kts: speed_mps / MPS_PER_KNOT,
        height_above_ground_ft: 0.0,
        pitch_deg: 0.0,
    }
}

/// The traffic of one simulation run.
#[derive(Debug, Clone)]
pub struct Scenario {
    aircraft: usize,
    jitter_ms: u64,
}

impl Scenario {
    pub fn new(aircraft: usize, jitter_ms: u64) -> Self {
        Self { aircraft, jitter_ms }
    }

    pub fn callsigns(&self) -> Vec<Callsign> {
        (0..self.aircraft).map(callsign).collect()
    }

    pub fn model(&self, index: usize) -> AircraftModel {
        let (model_string, icao) = MODELS[index % MODELS.len()];
        AircraftModel::new(model_string, icao).with_callsign(callsign(index))
    }

    /// Elevation of the whole track, for the elevation provider.
    pub fn field_plane(&self) -> ElevationPlane {
        ElevationPlane::new(threshold(), FIELD_ELEVATION_FT, 2.0 * APPROACH_DISTANCE_M)
    }

    /// Whether aircraft `index` reports parts.
    pub fn reports_parts(&self, index: usize) -> bool {
        index % 2 == 0
    }

    /// Deterministic network delay of report `seq` of aircraft `index`.
    pub fn jitter_ms(&self, seq: u64, index: usize) -> i64 {
        if self.jitter_ms == 0 {
            return 0;
        }
        ((seq * 7919 + index as u64 * 104_729) % (self.jitter_ms + 1)) as i64
    }

    /// Situation of aircraft `index` measured at `timestamp_ms`.
    pub fn situation(&self, index: usize, timestamp_ms: i64) -> AircraftSituation {
        let point = track_at(self.elapsed_s(index, timestamp_ms));
        let cg_ft = self.model(index).guess_parameters().cg_ft;
        let on_ground = if point.on_ground() {
            OnGround::OnGround
        } else {
            OnGround::NotOnGround
        };

        AircraftSituation::new(
            callsign(index),
            timestamp_ms,
            start_position().destination(RUNWAY_HEADING_DEG, point.along_m),
            FIELD_ELEVATION_FT + point.height_above_ground_ft + cg_ft,
        )
        .with_time_offset(POSITION_TIME_OFFSET_MS)
        .with_pbh(point.pitch_deg, 0.0, RUNWAY_HEADING_DEG)
        .with_ground_speed(point.ground_speed_kts)
        .with_on_ground(OnGroundInfo::new(on_ground, GroundDetails::FromNetwork))
    }

    /// Parts of aircraft `index` at `timestamp_ms`.
    pub fn parts(&self, index: usize, timestamp_ms: i64) -> AircraftParts {
        let point = track_at(self.elapsed_s(index, timestamp_ms));
        let situation = self.situation(index, timestamp_ms);
        let flaps = match point.height_above_ground_ft {
            h if h < 1000.0 => 100,
            h if h < 2000.0 => 50,
            _ => 25,
        };

        AircraftParts::new(timestamp_ms)
            .with_time_offset(POSITION_TIME_OFFSET_MS)
            .with_gear_down(point.height_above_ground_ft < 1500.0)
            .with_flaps_percent(flaps)
            .with_spoilers_out(point.on_ground() && point.ground_speed_kts > 40.0)
            .with_engines(engines(self.model(index).engine_count_or_default(), true))
            .with_lights(AircraftLights::guessed_for(&situation))
            .with_on_ground(point.on_ground())
    }

    fn elapsed_s(&self, index: usize, timestamp_ms: i64) -> f64 {
        timestamp_ms as f64 / 1000.0 - index as f64 * STAGGER_S
    }
}

fn callsign(index: usize) -> Callsign {
    Callsign::new(format!("XTR{:03}", index + 1))
}

fn threshold() -> GeoPosition {
    GeoPosition::from_degrees(THRESHOLD_LAT, THRESHOLD_LON)
}

fn start_position() -> GeoPosition {
    threshold().destination(RUNWAY_HEADING_DEG - 180.0, APPROACH_DISTANCE_M)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_descends_then_rolls_out() {
        let start = track_at(0.0);
        assert!(start.height_above_ground_ft > 1500.0);
        assert!(!start.on_ground());

        let touchdown_s = APPROACH_DISTANCE_M / (APPROACH_KTS * MPS_PER_KNOT);
        let landed = track_at(touchdown_s + 1.0);
        assert!(landed.on_ground());
        assert!(landed.ground_speed_kts < APPROACH_KTS);

        let taxi = track_at(touchdown_s + ROLLOUT_S + 10.0);
        assert!((taxi.ground_speed_kts - TAXI_KTS).abs() < 1e-9);
    }

    #[test]
    fn test_track_is_continuous() {
        let mut previous = track_at(0.0);
        for step in 1..2000 {
            let point = track_at(step as f64 * 0.1);
            assert!(point.along_m >= previous.along_m);
            assert!(point.along_m - previous.along_m < 10.0);
            previous = point;
        }
    }

    #[test]
    fn test_situation_on_track() {
        let scenario = Scenario::new(2, 0);
        let s = scenario.situation(0, 0);
        assert_eq!(s.callsign, Callsign::new("XTR001"));
        assert!(s.distance_m(&AircraftSituation::new(s.callsign.clone(), 0, start_position(), 0.0)) < 1.0);
        assert_eq!(s.time_offset_ms, POSITION_TIME_OFFSET_MS);
        assert!(scenario.field_plane().is_within_range(&s.position));
    }

    #[test]
    fn test_parts_on_short_final() {
        let scenario = Scenario::new(1, 0);
        let touchdown_ms = (APPROACH_DISTANCE_M / (APPROACH_KTS * MPS_PER_KNOT) * 1000.0) as i64;
        let parts = scenario.parts(0, touchdown_ms - 10_000);
        assert!(parts.gear_down);
        assert_eq!(parts.flaps_percent, 100);
        assert!(!parts.on_ground);
    }

    #[test]
    fn test_jitter_is_bounded() {
        let scenario = Scenario::new(3, 400);
        for seq in 0..100 {
            for index in 0..3 {
                assert!((0..=400).contains(&scenario.jitter_ms(seq, index)));
            }
        }
        assert_eq!(Scenario::new(1, 0).jitter_ms(7, 0), 0);
    }
}
