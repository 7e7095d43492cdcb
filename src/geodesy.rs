use crate::constants::{Degree, Meter, EARTH_RADIUS_M};

/// Great-circle distance between two geographic points, in meters
///
/// Standard haversine formula on a sphere of radius [`EARTH_RADIUS_M`] (6371 km).
///
/// Arguments
/// ---------
/// * `lat1`, `lon1`: first point in degrees
/// * `lat2`, `lon2`: second point in degrees
///
/// Return
/// ------
/// * the distance in meters, symmetric in its two points and zero for identical points
pub fn haversine_distance(lat1: Degree, lon1: Degree, lat2: Degree, lon2: Degree) -> Meter {
    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let dphi = phi2 - phi1;
    let dlambda = (lon2 - lon1).to_radians();

    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    // rounding can push sqrt(a) above 1 near antipodes
    let c = 2.0 * a.sqrt().min(1.0).asin();
    EARTH_RADIUS_M * c
}
