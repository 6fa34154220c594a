//! EPSG:4326 → EPSG:3857 (Web Mercator) projection.
//!
//! Both sides of a proximity join go through the same projection and are
//! compared with plain Euclidean distance in projected metres.

use std::f64::consts::FRAC_PI_4;

/// WGS84 semi-major axis used by EPSG:3857
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Latitude at which Web Mercator becomes square
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Project lon/lat degrees to Web Mercator metres.
///
/// Returns `None` for non-finite input or latitudes outside the projection.
pub fn to_web_mercator(lon: f64, lat: f64) -> Option<[f64; 2]> {
    if !lon.is_finite() || !lat.is_finite() {
        return None;
    }
    if lat.abs() > MAX_LATITUDE || lon.abs() > 180.0 {
        return None;
    }

    let x = EARTH_RADIUS_M * lon.to_radians();
    let y = EARTH_RADIUS_M * (FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln();
    Some([x, y])
}

/// Euclidean distance between two projected points
pub fn planar_distance(a: [f64; 2], b: [f64; 2]) -> f64 {
    (a[0] - b[0]).hypot(a[1] - b[1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin() {
        let [x, y] = to_web_mercator(0.0, 0.0).unwrap();
        assert!(x.abs() < 1e-9);
        assert!(y.abs() < 1e-9);
    }

    #[test]
    fn test_known_point() {
        // London, checked against EPSG:3857 reference values
        let [x, y] = to_web_mercator(-0.1, 51.5).unwrap();
        assert!((x - -11_131.949_079).abs() < 1e-3);
        assert!((y - 6_710_219.083_16).abs() < 1.0);
    }

    #[test]
    fn test_out_of_range() {
        assert!(to_web_mercator(0.0, 89.0).is_none());
        assert!(to_web_mercator(f64::NAN, 51.0).is_none());
        assert!(to_web_mercator(200.0, 51.0).is_none());
    }

    #[test]
    fn test_mercator_scale_at_uk_latitude() {
        // 0.0001° of latitude is about 11 m on the ground and ~17.9 m projected
        let a = to_web_mercator(-0.1, 51.5).unwrap();
        let b = to_web_mercator(-0.1, 51.5001).unwrap();
        let d = planar_distance(a, b);
        assert!(d > 17.0 && d < 19.0, "distance was {}", d);
    }
}
