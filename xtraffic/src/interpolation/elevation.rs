//! Ground elevation for the interpolated situation.
//!
//! # Fallback Chain
//!
//! Each step is only tried if the previous one found nothing:
//!
//! 1. **Same position**: the bracketing situations did not move apart
//!    (equal normal vector, or less than the 250ms travel distance) and the
//!    older one has an elevation
//! 2. **Change average**: the elevations of the recent situations are
//!    stable, their mean is used
//! 3. **Interpolated**: geometric interpolation between the elevations of
//!    the bracketing situations
//! 4. **Cache / provider**: the last interpolated situation's elevation if
//!    it is within the 250ms travel radius, else a provider query with
//!    that radius
//!
//! If all steps fail the elevation stays unset and the orchestrator skips
//! the ground correction.

use crate::aviation::{AircraftSituation, AircraftSituationChange, ElevationInfo};
use crate::coord::SINGLE_POINT_RADIUS_M;
use crate::provider::ElevationProvider;

use super::interpolant::Interpolant;

/// Elevations further apart are not interpolated.
const MAX_ELEVATION_DELTA_FT: f64 = 25.0;

/// Within this distance of an endpoint its elevation is used.
const ENDPOINT_SNAP_DISTANCE_M: f64 = 5.0;

/// Distance ratios below (above the complement) snap to an endpoint.
const ENDPOINT_SNAP_RATIO: f64 = 0.05;

/// Interpolate the elevation at `situation` between two situations.
///
/// None unless both endpoints have an elevation and their elevations
/// differ by at most 25 ft.
pub fn interpolated_elevation(
    situation: &AircraftSituation,
    old: &AircraftSituation,
    new: &AircraftSituation,
) -> Option<f64> {
    let old_elv = old.ground_elevation_ft()?;
    let new_elv = new.ground_elevation_ft()?;
    if old.equal_normal_vector(new) {
        return Some(new_elv);
    }
    let delta_ft = new_elv - old_elv;
    if delta_ft.abs() > MAX_ELEVATION_DELTA_FT {
        return None;
    }

    let distance_to_new = situation.distance_m(new);
    if distance_to_new < ENDPOINT_SNAP_DISTANCE_M {
        return Some(new_elv);
    }
    let distance_old_new = old.distance_m(new);
    if distance_old_new < ENDPOINT_SNAP_DISTANCE_M {
        return Some(old_elv);
    }

    let ratio = distance_to_new / distance_old_new;
    if ratio < ENDPOINT_SNAP_RATIO {
        return Some(new_elv);
    }
    if ratio > 1.0 - ENDPOINT_SNAP_RATIO {
        return Some(old_elv);
    }
    Some(new_elv - ratio * delta_ft)
}

/// Resolves the elevation of interpolated situations and counts the outcome.
#[derive(Debug, Default, Clone)]
pub struct GroundElevationResolver {
    found: u64,
    missed: u64,
    last_info: ElevationInfo,
}

impl GroundElevationResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill the elevation of `situation`. Returns true if it has one afterwards.
    pub fn resolve(
        &mut self,
        situation: &mut AircraftSituation,
        interpolant: &Interpolant,
        change: &AircraftSituationChange,
        last: Option<&AircraftSituation>,
        provider: Option<&dyn ElevationProvider>,
    ) -> bool {
        let info = self.find(situation, interpolant, change, last, provider);
        self.last_info = info;
        if info == ElevationInfo::NoElevation {
            self.missed += 1;
            false
        } else {
            self.found += 1;
            true
        }
    }

    fn find(
        &self,
        situation: &mut AircraftSituation,
        interpolant: &Interpolant,
        change: &AircraftSituationChange,
        last: Option<&AircraftSituation>,
        provider: Option<&dyn ElevationProvider>,
    ) -> ElevationInfo {
        if situation.has_ground_elevation() {
            return situation.elevation_info();
        }
        let (old, new) = (&interpolant.start, &interpolant.end);

        if let Some(elv) = old.ground_elevation_ft() {
            let same_position = old.equal_normal_vector(new)
                || old.distance_m(new) < new.distance_per_time_250ms_m(SINGLE_POINT_RADIUS_M);
            if same_position {
                situation.set_ground_elevation_ft(elv, ElevationInfo::SamePosition);
                return ElevationInfo::SamePosition;
            }
        }

        if change.has_elevation_dev_within_allowed_range() {
            if let Some(stat) = change.elevation_statistic() {
                situation.set_ground_elevation_ft(stat.mean, ElevationInfo::ChangeAverage);
                return ElevationInfo::ChangeAverage;
            }
        }

        if let Some(elv) = interpolated_elevation(situation, old, new) {
            situation.set_ground_elevation_ft(elv, ElevationInfo::Interpolated);
            return ElevationInfo::Interpolated;
        }

        let radius_m = situation.distance_per_time_250ms_m(SINGLE_POINT_RADIUS_M);
        if let Some(last) = last {
            if last.can_transfer_ground_elevation(situation, radius_m) {
                if let Some(elv) = last.ground_elevation_ft() {
                    situation.set_ground_elevation_ft(elv, ElevationInfo::FromCache);
                    return ElevationInfo::FromCache;
                }
            }
        }

        if situation.can_likely_skip_near_ground_interpolation() {
            return ElevationInfo::NoElevation;
        }
        let plane = provider.and_then(|p| p.find_closest_elevation(&situation.position, radius_m));
        if situation.set_ground_elevation_checked(plane, ElevationInfo::FromProvider) {
            return ElevationInfo::FromProvider;
        }
        ElevationInfo::NoElevation
    }

    /// Steps that found an elevation.
    pub fn found(&self) -> u64 {
        self.found
    }

    /// Steps that found none.
    pub fn missed(&self) -> u64 {
        self.missed
    }

    /// Source of the most recent elevation.
    pub fn last_info(&self) -> ElevationInfo {
        self.last_info
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Found/missed summary.
    pub fn elevation_info(&self) -> String {
        let total = self.found + self.missed;
        let ratio = if total == 0 {
            0.0
        } else {
            100.0 * self.found as f64 / total as f64
        };
        format!(
            "found {} missed {} ({:.0}%) last {}",
            self.found, self.missed, ratio, self.last_info
        )
    }
}
