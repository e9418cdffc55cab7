//! Ground elevation planes.

use super::GeoPosition;

/// Radius in meters within which a single elevation sample is trusted.
pub const SINGLE_POINT_RADIUS_M: f64 = 5.0;

/// A local ground height reference.
///
/// The elevation measured at `position` is assumed valid for every point
/// within `radius_m` of it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElevationPlane {
    /// Where the elevation was sampled.
    pub position: GeoPosition,
    /// Ground elevation above mean sea level in feet.
    pub elevation_ft: f64,
    /// Radius of validity in meters.
    pub radius_m: f64,
}

impl ElevationPlane {
    /// Create a plane with an explicit radius.
    pub fn new(position: GeoPosition, elevation_ft: f64, radius_m: f64) -> Self {
        Self {
            position,
            elevation_ft,
            radius_m,
        }
    }

    /// Create a plane valid only around the sample point.
    pub fn single_point(position: GeoPosition, elevation_ft: f64) -> Self {
        Self::new(position, elevation_ft, SINGLE_POINT_RADIUS_M)
    }

    /// Distance in meters from the sample point.
    pub fn distance_m(&self, position: &GeoPosition) -> f64 {
        self.position.distance_m(position)
    }

    /// True if `position` lies within the plane's radius.
    pub fn is_within_range(&self, position: &GeoPosition) -> bool {
        self.distance_m(position) <= self.radius_m
    }
}

impl std::fmt::Display for ElevationPlane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:.1}ft @ {} (r={:.1}m)",
            self.elevation_ft, self.position, self.radius_m
        )
    }
}
