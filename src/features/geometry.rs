use geo::{Geometry, InteriorPoint, Point};

/// Pick one point standing in for a feature's geometry.
///
/// Points are passed through. Everything else (polygons, multipolygons,
/// lines, collections) uses the interior point, which always lies on the
/// geometry itself, unlike the centroid of a concave polygon.
pub fn representative_point(geometry: &Geometry<f64>) -> Option<Point<f64>> {
    let point = match geometry {
        Geometry::Point(p) => Some(*p),
        other => other.interior_point(),
    }?;

    if point.x().is_finite() && point.y().is_finite() {
        Some(point)
    } else {
        None
    }
}
