//! # Local tangent-plane projection
//!
//! Converts geographic coordinates (degrees) into a locally flat `(x, y)` frame in **meters**
//! anchored at a reference origin, and back.
//!
//! ## Model
//!
//! An equirectangular approximation around the origin:
//!
//! ```text
//! meters_per_deg_lon = EQUATOR_CIRCUMFERENCE_M · cos(origin_lat) / 360
//! meters_per_deg_lat = POLAR_CIRCUMFERENCE_M / 360
//!
//! x = (lon − origin_lon) · meters_per_deg_lon
//! y = (lat − origin_lat) · meters_per_deg_lat
//! ```
//!
//! The latitude scale is constant (ellipsoidal flattening ignored). This is accurate enough for
//! tile sizes ≥ 100 m over regional extents of a few tens of kilometers; it is not a geodesic
//! solver. The inverse is the exact algebraic reciprocal, so
//! `to_lat_lon(to_local_meters(lat, lon)) ≈ (lat, lon)` up to floating-point rounding.
//!
//! ## See also
//! ------------
//! * [`haversine_distance`](crate::geodesy::haversine_distance) – authoritative distance check.
//! * [`TileIndex`](crate::tiles::TileIndex) – quantizes projected meters into tiles.
use nalgebra::Vector2;

use crate::constants::{
    Degree, Meter, DEFAULT_ORIGIN_LAT, DEFAULT_ORIGIN_LON, EQUATOR_CIRCUMFERENCE_M,
    METERS_PER_DEGREE_LAT,
};

/// A point in the local plane, `x` east and `y` north, in meters from the origin.
pub type ProjectedPoint = Vector2<Meter>;

/// Reference origin of the local plane, fixed for the duration of one run.
///
/// The longitude scale depends only on the origin latitude, so it is computed once at
/// construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalOrigin {
    lat: Degree,
    lon: Degree,
    meters_per_deg_lon: f64,
}

impl LocalOrigin {
    /// Anchor a local plane at `(lat, lon)` in degrees.
    pub fn new(lat: Degree, lon: Degree) -> Self {
        let lon_circumference = EQUATOR_CIRCUMFERENCE_M * lat.to_radians().cos();
        LocalOrigin {
            lat,
            lon,
            meters_per_deg_lon: lon_circumference / 360.0,
        }
    }

    pub fn lat(&self) -> Degree {
        self.lat
    }

    pub fn lon(&self) -> Degree {
        self.lon
    }

    /// Meters per degree of longitude at the origin latitude.
    pub fn meters_per_deg_lon(&self) -> f64 {
        self.meters_per_deg_lon
    }

    /// Project geographic coordinates into the local plane.
    ///
    /// Arguments
    /// -----------------
    /// * `lat`, `lon`: geographic coordinates in degrees.
    ///
    /// Return
    /// ----------
    /// * The [`ProjectedPoint`] `(x, y)` in meters relative to the origin.
    pub fn to_local_meters(&self, lat: Degree, lon: Degree) -> ProjectedPoint {
        let x = (lon - self.lon) * self.meters_per_deg_lon;
        let y = (lat - self.lat) * METERS_PER_DEGREE_LAT;
        Vector2::new(x, y)
    }

    /// Inverse of [`LocalOrigin::to_local_meters`].
    ///
    /// Return
    /// ----------
    /// * `(lat, lon)` in degrees.
    pub fn to_lat_lon(&self, point: &ProjectedPoint) -> (Degree, Degree) {
        let lat = point.y / METERS_PER_DEGREE_LAT + self.lat;
        let lon = point.x / self.meters_per_deg_lon + self.lon;
        (lat, lon)
    }
}

impl Default for LocalOrigin {
    fn default() -> Self {
        LocalOrigin::new(DEFAULT_ORIGIN_LAT, DEFAULT_ORIGIN_LON)
    }
}

/// Free-function form of [`LocalOrigin::to_local_meters`].
pub fn to_local_meters(
    lat: Degree,
    lon: Degree,
    origin_lat: Degree,
    origin_lon: Degree,
) -> (Meter, Meter) {
    let p = LocalOrigin::new(origin_lat, origin_lon).to_local_meters(lat, lon);
    (p.x, p.y)
}

/// Free-function form of [`LocalOrigin::to_lat_lon`].
pub fn to_lat_lon(x: Meter, y: Meter, origin_lat: Degree, origin_lon: Degree) -> (Degree, Degree) {
    LocalOrigin::new(origin_lat, origin_lon).to_lat_lon(&Vector2::new(x, y))
}

#[cfg(test)]
mod projection_test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_origin_maps_to_zero() {
        let origin = LocalOrigin::default();
        let p = origin.to_local_meters(DEFAULT_ORIGIN_LAT, DEFAULT_ORIGIN_LON);
        assert_eq!(p, Vector2::new(0.0, 0.0));
    }

    #[test]
    fn test_scales() {
        let origin = LocalOrigin::new(0.0, 0.0);
        assert_relative_eq!(origin.meters_per_deg_lon(), 40_075_160.0 / 360.0);

        let p = origin.to_local_meters(1.0, 1.0);
        assert_relative_eq!(p.x, 111_319.888_888_888_9, epsilon = 1e-6);
        assert_relative_eq!(p.y, 111_133.333_333_333_3, epsilon = 1e-6);

        // longitude degrees shrink with cos(lat)
        let north = LocalOrigin::new(60.0, 0.0);
        assert_relative_eq!(
            north.meters_per_deg_lon(),
            origin.meters_per_deg_lon() * 0.5,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_roundtrip() {
        let origin = LocalOrigin::default();
        for (lat, lon) in [(39.9, 116.4), (40.1, 116.0), (39.75872, 116.5), (39.5, 115.9)] {
            let p = origin.to_local_meters(lat, lon);
            let (lat2, lon2) = origin.to_lat_lon(&p);
            assert_relative_eq!(lat, lat2, epsilon = 1e-10);
            assert_relative_eq!(lon, lon2, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_free_functions_agree() {
        let (x, y) = to_local_meters(39.9, 116.4, 39.75872, 116.04142);
        let p = LocalOrigin::default().to_local_meters(39.9, 116.4);
        assert_eq!((x, y), (p.x, p.y));

        let (lat, lon) = to_lat_lon(x, y, 39.75872, 116.04142);
        assert_relative_eq!(lat, 39.9, epsilon = 1e-10);
        assert_relative_eq!(lon, 116.4, epsilon = 1e-10);
    }
}
