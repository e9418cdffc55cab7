//! Linear interpolation between the two situations bracketing the target
//! time.
//!
//! # Bracketing
//!
//! | newer | older | result |
//! |-------|-------|--------|
//! | ≥1 | ≥1 | blend of `older[0]` and the oldest newer one |
//! | ≥1 | 0 | the oldest newer situation, not interpolated |
//! | 0 | ≥2 | blend of the two latest, fraction clamped to 1 |
//! | 0 | 1 | that situation, not interpolated |

use crate::aviation::AircraftSituation;
use crate::provider::split_at_time;

use super::interpolant::{
    blend, blend_position, check_positions, complete_endpoint_elevation, interpolate_ground_factor,
    interpolated_time_ms, time_fraction, Interpolant, InterpolantContext, InterpolantError,
    InterpolationStrategy, Pbh,
};

/// Stateless linear strategy.
#[derive(Debug, Default, Clone, Copy)]
pub struct LinearStrategy;

impl LinearStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl InterpolationStrategy for LinearStrategy {
    fn interpolant(&mut self, ctx: &InterpolantContext<'_>) -> Result<Interpolant, InterpolantError> {
        linear_interpolant(ctx)
    }

    fn name(&self) -> &'static str {
        "linear"
    }
}

/// Pick the bracketing pair and blend it.
pub(crate) fn linear_interpolant(ctx: &InterpolantContext<'_>) -> Result<Interpolant, InterpolantError> {
    let (newer, older) = split_at_time(ctx.situations, ctx.now_ms);
    let (start, end) = match (older.first(), newer.last()) {
        (Some(older_one), Some(newer_one)) => (older_one, newer_one),
        (None, Some(only)) => return single(only, ctx),
        (Some(latest), None) if older.len() >= 2 => (&older[1], latest),
        (Some(only), None) => return single(only, ctx),
        (None, None) => return Err(InterpolantError::NoSituations),
    };
    check_positions(start, end)?;
    if start.adjusted_timestamp_ms() > end.adjusted_timestamp_ms() {
        return Err(InterpolantError::TimeOrder {
            older_ms: start.adjusted_timestamp_ms(),
            newer_ms: end.adjusted_timestamp_ms(),
        });
    }

    let mut start = start.clone();
    let mut end = end.clone();
    complete_endpoint_elevation(&mut start, ctx.elevation);
    complete_endpoint_elevation(&mut end, ctx.elevation);

    let t = time_fraction(
        start.adjusted_timestamp_ms(),
        end.adjusted_timestamp_ms(),
        ctx.now_ms,
    );
    let (start_alt, _) = start.corrected_altitude_ft(ctx.cg_ft, true);
    let (end_alt, _) = end.corrected_altitude_ft(ctx.cg_ft, true);

    let interpolant = Interpolant {
        fraction: t,
        interpolated_time_ms: interpolated_time_ms(&start, &end, t),
        time_offset_ms: blend(start.time_offset_ms as f64, end.time_offset_ms as f64, t).round() as i64,
        position: blend_position(&start.position, &end.position, t),
        altitude_ft: blend(start_alt, end_alt, t),
        pbh: Pbh::of(&start).blend(&Pbh::of(&end), t),
        ground_speed_kts: blend(start.ground_speed_kts, end.ground_speed_kts, t),
        on_ground: interpolate_ground_factor(&start, &end, t),
        interpolated: true,
        recalculated: true,
        start,
        end,
    };
    if !interpolant.is_valid() {
        return Err(InterpolantError::InvalidVector);
    }
    Ok(interpolant)
}

fn single(situation: &AircraftSituation, ctx: &InterpolantContext<'_>) -> Result<Interpolant, InterpolantError> {
    if !situation.is_valid_vector_range() {
        return Err(InterpolantError::InvalidPosition {
            timestamp_ms: situation.timestamp_ms,
        });
    }
    let mut situation = situation.clone();
    complete_endpoint_elevation(&mut situation, ctx.elevation);
    Ok(Interpolant::single(&situation, ctx.cg_ft))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aviation::{Callsign, ElevationInfo};
    use crate::coord::GeoPosition;

    fn situation(ts: i64, lon: f64, altitude_ft: f64) -> AircraftSituation {
        AircraftSituation::new(Callsign::new("LIN1"), ts, GeoPosition::from_degrees(47.0, lon), altitude_ft)
            .with_time_offset(0)
            .with_ground_speed(250.0)
    }

    fn ctx(situations: &[AircraftSituation], now_ms: i64) -> InterpolantContext<'_> {
        InterpolantContext {
            situations,
            now_ms,
            cg_ft: 8.0,
            elevation: None,
            version: 1,
        }
    }

    #[test]
    fn test_midpoint_altitude_is_mean() {
        let situations = vec![situation(3000, 8.01, 5000.0), situation(1000, 8.0, 4000.0)];
        let i = LinearStrategy::new().interpolant(&ctx(&situations, 2000)).unwrap();
        assert!(i.interpolated);
        assert_eq!(i.fraction, 0.5);
        assert_eq!(i.altitude_ft, 4500.0);
        assert_eq!(i.interpolated_time_ms, 2000);
        assert!((i.position.longitude() - 8.005).abs() < 1e-6);
    }

    #[test]
    fn test_exact_at_endpoints() {
        let situations = vec![situation(3000, 8.01, 5000.0), situation(1000, 8.0, 4000.0)];
        let mut strategy = LinearStrategy::new();

        let at_start = strategy.interpolant(&ctx(&situations, 1000)).unwrap();
        assert_eq!(at_start.altitude_ft, 4000.0);
        assert_eq!(at_start.position, situations[1].position);

        let at_end = strategy.interpolant(&ctx(&situations, 3000)).unwrap();
        assert_eq!(at_end.altitude_ft, 5000.0);
        assert_eq!(at_end.position, situations[0].position);
    }

    #[test]
    fn test_before_all_situations_uses_oldest() {
        let situations = vec![situation(3000, 8.01, 5000.0), situation(1000, 8.0, 4000.0)];
        let i = LinearStrategy::new().interpolant(&ctx(&situations, 500)).unwrap();
        assert!(!i.interpolated);
        assert_eq!(i.altitude_ft, 4000.0);
    }

    #[test]
    fn test_beyond_latest_clamps() {
        let situations = vec![situation(3000, 8.01, 5000.0), situation(1000, 8.0, 4000.0)];
        let i = LinearStrategy::new().interpolant(&ctx(&situations, 10_000)).unwrap();
        assert!(i.interpolated);
        assert_eq!(i.fraction, 1.0);
        assert_eq!(i.altitude_ft, 5000.0);
    }

    #[test]
    fn test_single_situation() {
        let situations = vec![situation(1000, 8.0, 4000.0)];
        let i = LinearStrategy::new().interpolant(&ctx(&situations, 5000)).unwrap();
        assert!(!i.interpolated);
        assert_eq!(i.altitude_ft, 4000.0);
    }

    #[test]
    fn test_empty_is_error() {
        let result = LinearStrategy::new().interpolant(&ctx(&[], 5000));
        assert_eq!(result, Err(InterpolantError::NoSituations));
    }

    #[test]
    fn test_invalid_position() {
        let mut broken = situation(3000, 8.01, 5000.0);
        broken.position = GeoPosition::from_normal_vector([f64::NAN, 0.0, 0.0]);
        let situations = vec![broken, situation(1000, 8.0, 4000.0)];
        let result = LinearStrategy::new().interpolant(&ctx(&situations, 2000));
        assert_eq!(result, Err(InterpolantError::InvalidPosition { timestamp_ms: 3000 }));
    }

    #[test]
    fn test_blends_corrected_altitudes() {
        // the newer endpoint is reported below ground and lifted to ground + CG
        let situations = vec![
            situation(3000, 8.01, 90.0).with_ground_elevation(100.0, ElevationInfo::FromNetwork),
            situation(1000, 8.0, 208.0).with_ground_elevation(100.0, ElevationInfo::FromNetwork),
        ];
        let i = LinearStrategy::new().interpolant(&ctx(&situations, 3000)).unwrap();
        assert_eq!(i.altitude_ft, 108.0);
    }

    #[test]
    fn test_heading_takes_short_arc() {
        let situations = vec![
            situation(3000, 8.01, 5000.0).with_pbh(0.0, 0.0, 10.0),
            situation(1000, 8.0, 5000.0).with_pbh(0.0, 0.0, 350.0),
        ];
        let i = LinearStrategy::new().interpolant(&ctx(&situations, 2000)).unwrap();
        assert_eq!(i.pbh.heading_deg, 0.0);
    }
}
