//! End to end tests of the interpolator against a shared aircraft store.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use proptest::prelude::*;

use xtraffic::aviation::{
    AircraftModel, AircraftParts, AircraftSituation, Callsign, ElevationInfo, PartsDetails,
};
use xtraffic::coord::{ElevationPlane, GeoPosition};
use xtraffic::interpolation::{
    interpolated_elevation, EngineConfig, InterpolationLogger, InterpolationSetup, Interpolator,
    InterpolatorMode, InterpolatorState,
};
use xtraffic::provider::{CgCache, ElevationCache, RemoteAircraftProvider, RemoteAircraftStore};

const FIELD_ELEVATION_FT: f64 = 2000.0;

fn callsign() -> Callsign {
    Callsign::new("DLH4AB")
}

fn situation(ts: i64, lon: f64, altitude_ft: f64, ground_speed_kts: f64) -> AircraftSituation {
    AircraftSituation::new(callsign(), ts, GeoPosition::from_degrees(50.03, lon), altitude_ft)
        .with_time_offset(0)
        .with_ground_speed(ground_speed_kts)
        .with_pbh(0.0, 0.0, 90.0)
}

fn store() -> Arc<RemoteAircraftStore> {
    let store = Arc::new(RemoteAircraftStore::default());
    store.add_aircraft(callsign(), Some(AircraftModel::new("A320 IAE", "A320")));
    store
}

fn interpolator(store: &Arc<RemoteAircraftStore>, mode: InterpolatorMode) -> Interpolator {
    Interpolator::new(
        callsign(),
        store.clone(),
        Arc::new(CgCache::new()),
        EngineConfig::default().with_mode(mode),
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Scenarios
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_midpoint_altitude_is_mean() {
    let store = store();
    store.push_situation(situation(10_000, 8.50, 11_000.0, 280.0));
    store.push_situation(situation(12_000, 8.51, 11_200.0, 280.0));
    let mut interpolator = interpolator(&store, InterpolatorMode::Linear);

    let result = interpolator.interpolate(11_000, &InterpolationSetup::default(), 0);
    let s = result.situation.expect("situation");
    assert!(result.status.interpolated);
    assert!((s.altitude_ft - 11_100.0).abs() < 1e-9);
    assert!(!s.is_on_ground());
}

#[test]
fn test_guessed_parts_at_250ft_agl() {
    let store = store();
    let elevation = Arc::new(ElevationCache::default());
    elevation.remember(ElevationPlane::new(
        GeoPosition::from_degrees(50.03, 8.55),
        FIELD_ELEVATION_FT,
        20_000.0,
    ));
    store.push_situation(situation(10_000, 8.550, FIELD_ELEVATION_FT + 300.0, 100.0).with_pbh(-2.0, 0.0, 90.0));
    store.push_situation(situation(12_000, 8.552, FIELD_ELEVATION_FT + 200.0, 100.0).with_pbh(-2.0, 0.0, 90.0));

    let mut interpolator =
        interpolator(&store, InterpolatorMode::Linear).with_elevation_provider(elevation);
    let result = interpolator.interpolate(11_000, &InterpolationSetup::default(), 0);

    let s = result.situation.expect("situation");
    assert!(s.has_ground_elevation());
    let parts = result.parts.expect("guessed parts");
    assert_eq!(parts.details, PartsDetails::Guessed);
    assert!(parts.gear_down);
    assert_eq!(parts.flaps_percent, 25);
    assert!(!result.parts_status.supports_parts);
}

#[test]
fn test_elevation_at_quarter_fraction() {
    let old = situation(0, 8.50, 3000.0, 150.0).with_ground_elevation(100.0, ElevationInfo::FromNetwork);
    let new = situation(2000, 8.51, 3000.0, 150.0).with_ground_elevation(110.0, ElevationInfo::FromNetwork);
    let at = situation(500, 8.5025, 3000.0, 150.0);

    let elevation = interpolated_elevation(&at, &old, &new).expect("elevation");
    assert!((elevation - 102.5).abs() < 0.05, "elevation {}", elevation);
}

#[test]
fn test_unknown_then_known_aircraft() {
    let store = Arc::new(RemoteAircraftStore::default());
    let mut interpolator = interpolator(&store, InterpolatorMode::Spline);
    let result = interpolator.interpolate(1000, &InterpolationSetup::default(), 0);
    assert!(result.situation.is_none());
    assert_eq!(interpolator.state(), InterpolatorState::Retired);
}

#[test]
fn test_spline_follows_track() {
    let store = store();
    for (i, lon) in [8.50, 8.51, 8.52, 8.53].iter().enumerate() {
        store.push_situation(situation(i as i64 * 2000, *lon, 9000.0 + i as f64 * 100.0, 300.0));
    }
    let mut interpolator = interpolator(&store, InterpolatorMode::Spline);
    let setup = InterpolationSetup::default();

    let mut previous_lon = f64::MIN;
    for now in (2000..6000).step_by(100) {
        let s = interpolator
            .interpolate(now, &setup, 0)
            .situation
            .expect("situation");
        let lon = s.position.longitude();
        assert!(lon >= previous_lon - 1e-9, "spline went backwards at {}", now);
        assert!((8.50..=8.53).contains(&lon));
        previous_lon = lon;
    }
    assert_eq!(interpolator.strategy_name(), "spline");
}

#[test]
fn test_diagnostic_log_records_every_step() {
    let store = store();
    store.push_situation(situation(0, 8.50, 9000.0, 300.0));
    store.push_situation(situation(2000, 8.51, 9100.0, 300.0));
    let logger = Arc::new(InterpolationLogger::new(10));
    let mut interpolator = interpolator(&store, InterpolatorMode::Linear);
    interpolator.attach_logger(logger.clone());

    let setup = InterpolationSetup {
        log_interpolation: true,
        ..InterpolationSetup::default()
    };
    for now in 0..20 {
        interpolator.interpolate(now * 100, &setup, 0);
    }
    assert_eq!(logger.situation_log_count(), 10);
    assert_eq!(logger.parts_log_count(), 10);
    let last = logger.last_situation_log(&callsign()).expect("record");
    assert_eq!(last.timestamp_ms, 1900);
    assert!(last.bracket.is_some());

    interpolator.detach_logger();
    interpolator.interpolate(2500, &setup, 0);
    assert_eq!(logger.last_situation_log(&callsign()).map(|r| r.timestamp_ms), Some(1900));
}

#[test]
fn test_producer_thread() {
    let store = store();
    let stop = Arc::new(AtomicBool::new(false));
    store.push_situation(situation(0, 8.50, 9000.0, 300.0));

    let producer = {
        let store = store.clone();
        let stop = stop.clone();
        thread::spawn(move || {
            let mut ts = 0;
            while !stop.load(Ordering::Relaxed) && ts < 200_000 {
                ts += 1000;
                store.push_situation(situation(ts, 8.50 + ts as f64 * 1e-6, 9000.0, 300.0));
                thread::yield_now();
            }
        })
    };

    let mut interpolator = interpolator(&store, InterpolatorMode::Spline);
    let setup = InterpolationSetup::default();
    for now in 0..2000 {
        let result = interpolator.interpolate(now * 10, &setup, 0);
        assert!(result.situation.is_some(), "no situation at step {}", now);
    }
    stop.store(true, Ordering::Relaxed);
    producer.join().expect("producer");
    assert!(store.situations_count(&callsign()) > 1);
}

// ─────────────────────────────────────────────────────────────────────────────
// Properties
// ─────────────────────────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn prop_reuse_on_gap(count in 1usize..6, now_offset in 0i64..4000) {
        let store = store();
        for i in 0..count {
            store.push_situation(situation(i as i64 * 2000, 8.5 + i as f64 * 0.01, 9000.0, 300.0));
        }
        let mut interpolator = interpolator(&store, InterpolatorMode::Spline);
        let setup = InterpolationSetup::default();
        let valid = interpolator.interpolate(now_offset, &setup, 0).situation;
        prop_assert!(valid.is_some());

        store.clear_situations(&callsign());
        let result = interpolator.interpolate(now_offset + 100, &setup, 0);
        prop_assert_eq!(result.situation, valid);
        prop_assert!(result.status.same_situation);
        prop_assert_eq!(interpolator.state(), InterpolatorState::DegradedReuse);
    }

    #[test]
    fn prop_reported_parts_win(guess_steps in 1i64..10, index in 0u32..8) {
        let store = store();
        store.push_situation(situation(0, 8.50, 2300.0, 140.0));
        store.push_situation(situation(60_000, 8.60, 2300.0, 140.0));
        let mut interpolator = interpolator(&store, InterpolatorMode::Linear);
        let setup = InterpolationSetup::default();

        for step in 0..guess_steps {
            let parts = interpolator.interpolate(step * 100, &setup, index).parts;
            prop_assert!(parts.map_or(true, |p| p.is_guessed()));
        }

        let reported = AircraftParts::new(500).with_time_offset(0).with_flaps_percent(40);
        store.push_parts(&callsign(), reported.clone());
        let result = interpolator.interpolate(guess_steps * 100 + 1000, &setup, index);
        prop_assert_eq!(result.parts, Some(reported));
        prop_assert!(result.parts_status.supports_parts);
    }

    #[test]
    fn prop_idempotent(now in 0i64..6000, index in 0u32..100, linear in any::<bool>()) {
        let store = store();
        for i in 0..4 {
            store.push_situation(situation(i * 2000, 8.5 + i as f64 * 0.01, 9000.0 + i as f64 * 50.0, 300.0));
        }
        let mode = if linear { InterpolatorMode::Linear } else { InterpolatorMode::Spline };
        let mut interpolator = interpolator(&store, mode);
        let setup = InterpolationSetup::default();
        let first = interpolator.interpolate(now, &setup, index);
        let second = interpolator.interpolate(now, &setup, index);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_heading_wraps_through_north(fraction in 0.0f64..=1.0) {
        let store = store();
        store.push_situation(situation(0, 8.50, 9000.0, 300.0).with_pbh(0.0, 0.0, 350.0));
        store.push_situation(situation(10_000, 8.51, 9000.0, 300.0).with_pbh(0.0, 0.0, 10.0));
        let mut interpolator = interpolator(&store, InterpolatorMode::Linear);

        let now = (fraction * 10_000.0).round() as i64;
        let s = interpolator
            .interpolate(now, &InterpolationSetup::default(), 0)
            .situation
            .expect("situation");
        prop_assert!(s.heading_deg >= 349.999 || s.heading_deg <= 10.001, "heading {}", s.heading_deg);
    }

    #[test]
    fn prop_ground_factor_bounded(f0 in 0.0f64..=1.0, f1 in 0.0f64..=1.0, now in 0i64..=2000) {
        use xtraffic::aviation::{GroundDetails, OnGroundInfo};

        let store = store();
        store.push_situation(situation(0, 8.50, 2100.0, 80.0)
            .with_on_ground(OnGroundInfo::from_factor(f0, GroundDetails::FromNetwork)));
        store.push_situation(situation(2000, 8.501, 2100.0, 80.0)
            .with_on_ground(OnGroundInfo::from_factor(f1, GroundDetails::FromNetwork)));
        let mut interpolator = interpolator(&store, InterpolatorMode::Linear);

        let s = interpolator
            .interpolate(now, &InterpolationSetup::default(), 0)
            .situation
            .expect("situation");
        let factor = s.on_ground.factor();
        prop_assert!((0.0..=1.0).contains(&factor));
        prop_assert_eq!(s.is_on_ground(), factor >= 0.95);
    }
}
