//! Geodetic positions for remote traffic.
//!
//! Positions are kept as earth normal vectors (n-vectors). Blending two
//! normal vectors component by component stays well defined across the
//! antimeridian and the poles, which latitude/longitude blending is not.
//! Latitude and longitude are derived on demand.
//!
//! # Example
//!
//! ```ignore
//! use xtraffic::coord::GeoPosition;
//!
//! let ksfo = GeoPosition::from_degrees(37.6189, -122.3750);
//! let koak = GeoPosition::from_degrees(37.7213, -122.2208);
//! println!("{:.0} m", ksfo.distance_m(&koak));
//! ```

mod elevation;

pub use elevation::{ElevationPlane, SINGLE_POINT_RADIUS_M};

/// Mean earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Meters in one foot.
pub const METERS_PER_FOOT: f64 = 0.3048;

/// Meters per second in one knot.
pub const MPS_PER_KNOT: f64 = 1852.0 / 3600.0;

/// Kilometers per hour in one knot.
pub const KMH_PER_KNOT: f64 = 1.852;

/// Tolerance when comparing normalized vector components.
const NORMAL_VECTOR_EPSILON: f64 = 1e-12;

/// Accepted length range of a normal vector produced by blending.
const VALID_VECTOR_LENGTH: std::ops::RangeInclusive<f64> = 0.5..=1.5;

/// Convert feet to meters.
#[inline]
pub fn feet_to_meters(ft: f64) -> f64 {
    ft * METERS_PER_FOOT
}

/// Convert meters to feet.
#[inline]
pub fn meters_to_feet(m: f64) -> f64 {
    m / METERS_PER_FOOT
}

/// A horizontal position on the earth, stored as a normal vector.
///
/// The vector does not need to be of unit length: interpolated positions
/// are slightly shorter than one, and every derived quantity is scale
/// invariant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPosition {
    normal: [f64; 3],
}

impl GeoPosition {
    /// Create a position from latitude and longitude in degrees.
    pub fn from_degrees(latitude: f64, longitude: f64) -> Self {
        let lat = latitude.to_radians();
        let lon = longitude.to_radians();
        Self {
            normal: [lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin()],
        }
    }

    /// Create a position from a (possibly unnormalized) normal vector.
    pub fn from_normal_vector(normal: [f64; 3]) -> Self {
        Self { normal }
    }

    /// The raw normal vector.
    #[inline]
    pub fn normal_vector(&self) -> [f64; 3] {
        self.normal
    }

    /// Latitude in degrees.
    pub fn latitude(&self) -> f64 {
        let [x, y, z] = self.normal;
        z.atan2((x * x + y * y).sqrt()).to_degrees()
    }

    /// Longitude in degrees (-180 to 180).
    pub fn longitude(&self) -> f64 {
        let [x, y, _] = self.normal;
        y.atan2(x).to_degrees()
    }

    /// Great-circle distance in meters.
    pub fn distance_m(&self, other: &GeoPosition) -> f64 {
        let [ax, ay, az] = self.normal;
        let [bx, by, bz] = other.normal;
        let cross = [ay * bz - az * by, az * bx - ax * bz, ax * by - ay * bx];
        let cross_len = (cross[0] * cross[0] + cross[1] * cross[1] + cross[2] * cross[2]).sqrt();
        let dot = ax * bx + ay * by + az * bz;
        cross_len.atan2(dot) * EARTH_RADIUS_M
    }

    /// True if both positions describe the same normal vector.
    pub fn equal_normal_vector(&self, other: &GeoPosition) -> bool {
        let (a, b) = (self.normalized(), other.normalized());
        a.iter()
            .zip(b.iter())
            .all(|(x, y)| (x - y).abs() <= NORMAL_VECTOR_EPSILON)
    }

    /// True if the vector is finite and of plausible length.
    ///
    /// Blending two nearly antipodal vectors collapses towards zero length;
    /// such a vector has no meaningful direction.
    pub fn is_valid(&self) -> bool {
        self.normal.iter().all(|c| c.is_finite() && c.abs() <= 1.5)
            && VALID_VECTOR_LENGTH.contains(&self.length())
    }

    /// The point reached travelling `distance_m` along `bearing_deg`.
    pub fn destination(&self, bearing_deg: f64, distance_m: f64) -> GeoPosition {
        let lat1 = self.latitude().to_radians();
        let lon1 = self.longitude().to_radians();
        let bearing = bearing_deg.to_radians();
        let angular = distance_m / EARTH_RADIUS_M;

        let lat2 = (lat1.sin() * angular.cos() + lat1.cos() * angular.sin() * bearing.cos()).asin();
        let lon2 = lon1
            + (bearing.sin() * angular.sin() * lat1.cos())
                .atan2(angular.cos() - lat1.sin() * lat2.sin());
        GeoPosition::from_degrees(lat2.to_degrees(), lon2.to_degrees())
    }

    fn length(&self) -> f64 {
        let [x, y, z] = self.normal;
        (x * x + y * y + z * z).sqrt()
    }

    fn normalized(&self) -> [f64; 3] {
        let len = self.length();
        if len == 0.0 {
            return self.normal;
        }
        let [x, y, z] = self.normal;
        [x / len, y / len, z / len]
    }
}

impl std::fmt::Display for GeoPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude(), self.longitude())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lat_lon_from_normal_vector() {
        let pos = GeoPosition::from_degrees(47.4647, 8.5492);
        assert!((pos.latitude() - 47.4647).abs() < 1e-9);
        assert!((pos.longitude() - 8.5492).abs() < 1e-9);
    }

    #[test]
    fn test_unnormalized_vector_keeps_lat_lon() {
        let pos = GeoPosition::from_degrees(-33.9461, 151.1772);
        let [x, y, z] = pos.normal_vector();
        let scaled = GeoPosition::from_normal_vector([x * 0.9, y * 0.9, z * 0.9]);
        assert!((scaled.latitude() - pos.latitude()).abs() < 1e-9);
        assert!((scaled.longitude() - pos.longitude()).abs() < 1e-9);
        assert!(scaled.equal_normal_vector(&pos));
    }

    #[test]
    fn test_distance_one_degree_latitude() {
        let a = GeoPosition::from_degrees(0.0, 0.0);
        let b = GeoPosition::from_degrees(1.0, 0.0);
        let expected = EARTH_RADIUS_M * 1.0_f64.to_radians();
        assert!((a.distance_m(&b) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_distance_across_antimeridian() {
        let a = GeoPosition::from_degrees(0.0, 179.9);
        let b = GeoPosition::from_degrees(0.0, -179.9);
        let expected = EARTH_RADIUS_M * 0.2_f64.to_radians();
        assert!((a.distance_m(&b) - expected).abs() < 1e-3);
    }

    #[test]
    fn test_destination_north() {
        let start = GeoPosition::from_degrees(10.0, 20.0);
        let end = start.destination(0.0, 1000.0);
        assert!((start.distance_m(&end) - 1000.0).abs() < 1e-3);
        assert!(end.latitude() > start.latitude());
        assert!((end.longitude() - start.longitude()).abs() < 1e-9);
    }

    #[test]
    fn test_zero_vector_is_invalid() {
        assert!(!GeoPosition::from_normal_vector([0.0, 0.0, 0.0]).is_valid());
        assert!(!GeoPosition::from_normal_vector([f64::NAN, 0.0, 1.0]).is_valid());
        assert!(GeoPosition::from_degrees(51.47, -0.45).is_valid());
    }

    #[test]
    fn test_unit_conversion() {
        assert!((feet_to_meters(1000.0) - 304.8).abs() < 1e-9);
        assert!((meters_to_feet(304.8) - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_display() {
        let pos = GeoPosition::from_degrees(1.5, -2.25);
        assert_eq!(pos.to_string(), "1.500000, -2.250000");
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn distance_is_symmetric(
                lat1 in -89.0..89.0_f64, lon1 in -180.0..180.0_f64,
                lat2 in -89.0..89.0_f64, lon2 in -180.0..180.0_f64,
            ) {
                let a = GeoPosition::from_degrees(lat1, lon1);
                let b = GeoPosition::from_degrees(lat2, lon2);
                let ab = a.distance_m(&b);
                let ba = b.distance_m(&a);
                prop_assert!(ab >= 0.0);
                prop_assert!((ab - ba).abs() < 1e-6);
            }

            #[test]
            fn destination_travels_requested_distance(
                lat in -80.0..80.0_f64, lon in -180.0..180.0_f64,
                bearing in 0.0..360.0_f64, distance in 1.0..50_000.0_f64,
            ) {
                let start = GeoPosition::from_degrees(lat, lon);
                let end = start.destination(bearing, distance);
                prop_assert!((start.distance_m(&end) - distance).abs() < 0.01);
            }
        }
    }
}
