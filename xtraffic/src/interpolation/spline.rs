//! Cubic spline interpolation through three situations.
//!
//! The spline runs through an older support situation `s0`, the latest
//! situation at or before the target time `s1`, and the oldest situation
//! after it `s2`. Output is evaluated between `s1` and `s2`. Derivatives at
//! the three knots come from a natural spline (tridiagonal solve), so
//! position and altitude follow turns and climbs smoothly instead of
//! bending at every report.
//!
//! The normal vector components, the corrected altitude and the ground
//! factor are splined; attitude and ground speed stay linear between `s1`
//! and `s2`.
//!
//! # Caching
//!
//! Derivatives only change when the knots change. They are cached per
//! knot triple, situation version and CG; every other step only evaluates.
//! Knots still missing a ground elevation are completed again on every
//! step and recalculated once the provider answers.
//!
//! # Fallback
//!
//! Without a newer situation, or without an older situation strictly
//! before `s1`, the linear strategy is used.

use tracing::trace;

use crate::aviation::{AircraftSituation, GroundDetails, OnGround, OnGroundInfo};
use crate::coord::GeoPosition;
use crate::provider::split_at_time;

use super::interpolant::{
    blend, check_positions, complete_endpoint_elevation, interpolated_time_ms, time_fraction,
    Interpolant, InterpolantContext, InterpolantError, InterpolationStrategy, Pbh,
    GROUND_FACTOR_AIRBORNE, GROUND_FACTOR_GROUNDED,
};
use super::linear::linear_interpolant;

/// Minimum time span between `s0` and `s1`.
const MIN_SUPPORT_SPAN_MS: i64 = 2000;

/// Share of the time offset used as support span.
const SUPPORT_SPAN_FACTOR: f64 = 0.8;

/// Identifies the knots the cached derivatives belong to: adjusted knot
/// times, situation version and CG bits.
type KnotKey = (i64, i64, i64, i64, u64);

#[derive(Debug, Clone)]
struct SplineKnots {
    key: KnotKey,
    /// A knot near the ground still lacks an elevation.
    missing_elevation: bool,
    /// Knot times relative to `s0`, in ms.
    times: [f64; 3],
    s1: AircraftSituation,
    s2: AircraftSituation,
    x: Curve,
    y: Curve,
    z: Curve,
    altitude: Curve,
    ground: Curve,
}

/// Values and derivatives at the three knots.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Curve {
    values: [f64; 3],
    derivatives: [f64; 3],
}

impl Curve {
    fn new(times: &[f64; 3], values: [f64; 3]) -> Self {
        Self {
            values,
            derivatives: derivatives(times, &values),
        }
    }

    /// Value at fraction `t` between knots 1 and 2.
    fn eval(&self, t: f64, dt: f64) -> f64 {
        eval_hermite(
            t,
            dt,
            self.values[1],
            self.values[2],
            self.derivatives[1],
            self.derivatives[2],
        )
    }
}

/// Spline strategy with derivative cache.
#[derive(Debug, Default)]
pub struct SplineStrategy {
    knots: Option<SplineKnots>,
}

impl SplineStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    fn knots(
        &mut self,
        ctx: &InterpolantContext<'_>,
        s0: &AircraftSituation,
        s1: &AircraftSituation,
        s2: &AircraftSituation,
    ) -> (SplineKnots, bool) {
        let key = (
            s0.adjusted_timestamp_ms(),
            s1.adjusted_timestamp_ms(),
            s2.adjusted_timestamp_ms(),
            ctx.version,
            ctx.cg_ft.to_bits(),
        );
        let cached = self.knots.as_ref().filter(|knots| knots.key == key);
        if let Some(knots) = cached {
            if !knots.missing_elevation {
                return (knots.clone(), false);
            }
        }

        let mut knots = [s0.clone(), s1.clone(), s2.clone()];
        let mut completed = false;
        for situation in knots.iter_mut() {
            completed |= complete_endpoint_elevation(situation, ctx.elevation);
        }
        if let Some(knots) = cached {
            if !completed {
                return (knots.clone(), false);
            }
        }
        let missing_elevation = knots
            .iter()
            .any(|s| !s.has_ground_elevation() && !s.can_likely_skip_near_ground_interpolation());
        let origin = key.0;
        let times = [
            0.0,
            (key.1 - origin) as f64,
            (key.2 - origin) as f64,
        ];
        let normals = knots.iter().map(|s| s.position.normal_vector()).collect::<Vec<_>>();
        let component = |k: usize| [normals[0][k], normals[1][k], normals[2][k]];
        let altitudes = [
            knots[0].corrected_altitude_ft(ctx.cg_ft, true).0,
            knots[1].corrected_altitude_ft(ctx.cg_ft, true).0,
            knots[2].corrected_altitude_ft(ctx.cg_ft, true).0,
        ];
        let grounds = [
            knots[0].on_ground.factor(),
            knots[1].on_ground.factor(),
            knots[2].on_ground.factor(),
        ];

        let [_, s1, s2] = knots;
        let computed = SplineKnots {
            key,
            missing_elevation,
            times,
            s1,
            s2,
            x: Curve::new(&times, component(0)),
            y: Curve::new(&times, component(1)),
            z: Curve::new(&times, component(2)),
            altitude: Curve::new(&times, altitudes),
            ground: Curve::new(&times, grounds),
        };
        trace!(key = ?key, "spline derivatives recalculated");
        self.knots = Some(computed.clone());
        (computed, true)
    }
}

impl InterpolationStrategy for SplineStrategy {
    fn interpolant(&mut self, ctx: &InterpolantContext<'_>) -> Result<Interpolant, InterpolantError> {
        let (newer, older) = split_at_time(ctx.situations, ctx.now_ms);
        let (Some(s2), true) = (newer.last(), older.len() >= 2) else {
            return linear_interpolant(ctx);
        };
        let s1 = &older[0];
        let span = (SUPPORT_SPAN_FACTOR * s2.time_offset_ms.max(MIN_SUPPORT_SPAN_MS) as f64).round() as i64;
        let t1 = s1.adjusted_timestamp_ms();
        let support_before = t1 - span;
        let support = older[1..]
            .iter()
            .find(|s| s.adjusted_timestamp_ms() <= support_before)
            .or_else(|| older[1..].iter().find(|s| s.adjusted_timestamp_ms() < t1));
        let Some(s0) = support else {
            // only duplicates of s1 before it
            return linear_interpolant(ctx);
        };

        let t2 = s2.adjusted_timestamp_ms();
        if t1 >= t2 {
            return Err(InterpolantError::TimeOrder {
                older_ms: t1,
                newer_ms: t2,
            });
        }
        check_positions(s0, s1)?;
        check_positions(s1, s2)?;

        let (knots, recalculated) = self.knots(ctx, s0, s1, s2);
        let t = time_fraction(t1, t2, ctx.now_ms);
        let dt = knots.times[2] - knots.times[1];
        let (start, end) = (&knots.s1, &knots.s2);

        let position = GeoPosition::from_normal_vector([
            knots.x.eval(t, dt),
            knots.y.eval(t, dt),
            knots.z.eval(t, dt),
        ]);

        let on_ground = if start.has_ground_details_for_interpolation()
            && end.has_ground_details_for_interpolation()
        {
            let (f1, f2) = (start.on_ground.factor(), end.on_ground.factor());
            Some(if f1 < GROUND_FACTOR_AIRBORNE && f2 < GROUND_FACTOR_AIRBORNE {
                OnGroundInfo::new(OnGround::NotOnGround, GroundDetails::Interpolated)
            } else if f1 > GROUND_FACTOR_GROUNDED && f2 > GROUND_FACTOR_GROUNDED {
                OnGroundInfo::new(OnGround::OnGround, GroundDetails::Interpolated)
            } else {
                OnGroundInfo::from_factor(knots.ground.eval(t, dt).clamp(0.0, 1.0), GroundDetails::Interpolated)
            })
        } else {
            None
        };

        let interpolant = Interpolant {
            fraction: t,
            interpolated_time_ms: interpolated_time_ms(start, end, t),
            time_offset_ms: blend(start.time_offset_ms as f64, end.time_offset_ms as f64, t).round() as i64,
            position,
            altitude_ft: knots.altitude.eval(t, dt),
            pbh: Pbh::of(start).blend(&Pbh::of(end), t),
            ground_speed_kts: blend(start.ground_speed_kts, end.ground_speed_kts, t),
            on_ground,
            interpolated: true,
            recalculated,
            start: knots.s1,
            end: knots.s2,
        };
        if !interpolant.is_valid() {
            return Err(InterpolantError::InvalidVector);
        }
        Ok(interpolant)
    }

    fn name(&self) -> &'static str {
        "spline"
    }

    fn reset(&mut self) {
        self.knots = None;
    }
}

/// Natural spline derivatives at three knots.
fn derivatives(times: &[f64; 3], values: &[f64; 3]) -> [f64; 3] {
    let h0 = times[1] - times[0];
    let h1 = times[2] - times[1];
    let d0 = (values[1] - values[0]) / (h0 * h0);
    let d1 = (values[2] - values[1]) / (h1 * h1);

    let lower = [0.0, 1.0 / h0, 1.0 / h1];
    let diagonal = [2.0 / h0, 2.0 / h0 + 2.0 / h1, 2.0 / h1];
    let upper = [1.0 / h0, 1.0 / h1, 0.0];
    let rhs = [3.0 * d0, 3.0 * d0 + 3.0 * d1, 3.0 * d1];
    solve_tridiagonal(&lower, &diagonal, &upper, &rhs)
}

/// Thomas algorithm for a 3x3 tridiagonal system.
fn solve_tridiagonal(lower: &[f64; 3], diagonal: &[f64; 3], upper: &[f64; 3], rhs: &[f64; 3]) -> [f64; 3] {
    let mut c = [0.0; 3];
    let mut d = [0.0; 3];
    c[0] = upper[0] / diagonal[0];
    d[0] = rhs[0] / diagonal[0];
    for i in 1..3 {
        let m = diagonal[i] - lower[i] * c[i - 1];
        c[i] = upper[i] / m;
        d[i] = (rhs[i] - lower[i] * d[i - 1]) / m;
    }
    let mut x = [0.0; 3];
    x[2] = d[2];
    for i in (0..2).rev() {
        x[i] = d[i] - c[i] * x[i + 1];
    }
    x
}

/// Cubic Hermite segment in the form of a rational spline.
fn eval_hermite(t: f64, dt: f64, y0: f64, y1: f64, k0: f64, k1: f64) -> f64 {
    let a = k0 * dt - (y1 - y0);
    let b = -k1 * dt + (y1 - y0);
    (1.0 - t) * y0 + t * y1 + t * (1.0 - t) * (a * (1.0 - t) + b * t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aviation::{Callsign, ElevationInfo};
    use crate::coord::ElevationPlane;
    use crate::provider::ElevationCache;

    fn situation(ts: i64, lon: f64, altitude_ft: f64) -> AircraftSituation {
        AircraftSituation::new(Callsign::new("SPL1"), ts, GeoPosition::from_degrees(47.0, lon), altitude_ft)
            .with_time_offset(0)
            .with_ground_speed(250.0)
    }

    fn ctx(situations: &[AircraftSituation], now_ms: i64) -> InterpolantContext<'_> {
        InterpolantContext {
            situations,
            now_ms,
            cg_ft: 8.0,
            elevation: None,
            version: 7,
        }
    }

    #[test]
    fn test_linear_data_stays_linear() {
        let d = derivatives(&[0.0, 2.0, 5.0], &[10.0, 14.0, 20.0]);
        for k in d {
            assert!((k - 2.0).abs() < 1e-12);
        }
        assert!((eval_hermite(0.5, 3.0, 14.0, 20.0, 2.0, 2.0) - 17.0).abs() < 1e-12);
    }

    #[test]
    fn test_hermite_exact_at_knots() {
        assert_eq!(eval_hermite(0.0, 3.0, 14.0, 20.0, 1.0, -4.0), 14.0);
        assert_eq!(eval_hermite(1.0, 3.0, 14.0, 20.0, 1.0, -4.0), 20.0);
    }

    #[test]
    fn test_constant_climb() {
        let situations = vec![
            situation(15_000, 8.03, 4000.0),
            situation(10_000, 8.02, 3500.0),
            situation(5_000, 8.01, 3000.0),
        ];
        let i = SplineStrategy::new().interpolant(&ctx(&situations, 12_500)).unwrap();
        assert!(i.interpolated);
        assert!((i.altitude_ft - 3750.0).abs() < 1e-6);
        assert_eq!(i.start.timestamp_ms, 10_000);
        assert_eq!(i.end.timestamp_ms, 15_000);
    }

    #[test]
    fn test_support_situation_skips_too_recent() {
        // with offset 0 the support span is 1600ms: the 9000 situation is too close to 10000
        let situations = vec![
            situation(15_000, 8.03, 4000.0),
            situation(10_000, 8.02, 3500.0),
            situation(9_000, 8.018, 3400.0),
            situation(5_000, 8.01, 3000.0),
        ];
        let mut spline = SplineStrategy::new();
        spline.interpolant(&ctx(&situations, 12_000)).unwrap();
        assert_eq!(spline.knots.as_ref().map(|k| k.key.0), Some(5_000));
    }

    #[test]
    fn test_derivatives_cached() {
        let situations = vec![
            situation(15_000, 8.03, 4000.0),
            situation(10_000, 8.02, 3500.0),
            situation(5_000, 8.01, 3000.0),
        ];
        let mut spline = SplineStrategy::new();
        assert!(spline.interpolant(&ctx(&situations, 11_000)).unwrap().recalculated);
        assert!(!spline.interpolant(&ctx(&situations, 12_000)).unwrap().recalculated);

        spline.reset();
        assert!(spline.interpolant(&ctx(&situations, 12_000)).unwrap().recalculated);
    }

    #[test]
    fn test_falls_back_to_linear() {
        let situations = vec![situation(15_000, 8.03, 4000.0), situation(10_000, 8.02, 3500.0)];
        let i = SplineStrategy::new().interpolant(&ctx(&situations, 12_500)).unwrap();
        assert!(i.interpolated);
        assert_eq!(i.altitude_ft, 3750.0);
    }

    #[test]
    fn test_duplicate_report_falls_back_to_linear() {
        let situations = vec![
            situation(10_000, 8.02, 3500.0),
            situation(5_000, 8.01, 3000.0),
            situation(5_000, 8.01, 3000.0),
        ];
        let i = SplineStrategy::new().interpolant(&ctx(&situations, 7_000)).unwrap();
        assert!(i.interpolated);
        assert!((i.altitude_ft - 3200.0).abs() < 1e-9);
        assert_eq!(i.start.timestamp_ms, 5_000);
        assert_eq!(i.end.timestamp_ms, 10_000);
    }

    #[test]
    fn test_duplicate_report_skipped_for_support() {
        // the support span reaches past neither older situation, the first strictly older one is used
        let situations = vec![
            situation(12_000, 8.03, 4000.0),
            situation(10_000, 8.02, 3500.0),
            situation(10_000, 8.02, 3500.0),
            situation(9_500, 8.019, 3450.0),
        ];
        let mut spline = SplineStrategy::new();
        assert!(spline.interpolant(&ctx(&situations, 11_000)).is_ok());
        assert_eq!(spline.knots.as_ref().map(|k| k.key.0), Some(9_500));
    }

    #[test]
    fn test_cg_change_recalculates() {
        let situations: Vec<_> = [(15_000, 8.03), (10_000, 8.02), (5_000, 8.01)]
            .iter()
            .map(|&(ts, lon)| {
                situation(ts, lon, 105.0)
                    .with_ground_speed(150.0)
                    .with_ground_elevation(100.0, ElevationInfo::FromNetwork)
            })
            .collect();
        let mut spline = SplineStrategy::new();
        let heavy = InterpolantContext { cg_ft: 20.0, ..ctx(&situations, 11_000) };
        assert!((spline.interpolant(&heavy).unwrap().altitude_ft - 120.0).abs() < 1e-9);

        let light = InterpolantContext { cg_ft: 8.0, ..ctx(&situations, 12_000) };
        let i = spline.interpolant(&light).unwrap();
        assert!(i.recalculated);
        assert!((i.altitude_ft - 108.0).abs() < 1e-9);
    }

    #[test]
    fn test_late_elevation_recalculates() {
        let situations: Vec<_> = [(15_000, 8.03), (10_000, 8.02), (5_000, 8.01)]
            .iter()
            .map(|&(ts, lon)| situation(ts, lon, 105.0).with_ground_speed(150.0))
            .collect();
        let cache = ElevationCache::default();
        let mut spline = SplineStrategy::new();

        let before = InterpolantContext { elevation: Some(&cache), ..ctx(&situations, 11_000) };
        let i = spline.interpolant(&before).unwrap();
        assert!((i.altitude_ft - 105.0).abs() < 1e-9);
        let again = InterpolantContext { elevation: Some(&cache), ..ctx(&situations, 11_500) };
        assert!(!spline.interpolant(&again).unwrap().recalculated);

        for s in &situations {
            cache.remember(ElevationPlane::new(s.position, 100.0, 10.0));
        }
        let after = InterpolantContext { elevation: Some(&cache), ..ctx(&situations, 12_000) };
        let i = spline.interpolant(&after).unwrap();
        assert!(i.recalculated);
        assert!((i.altitude_ft - 108.0).abs() < 1e-9);
        assert!(i.start.has_ground_elevation());
    }
}
