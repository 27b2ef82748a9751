//! Flat-earth circle approximation.
//!
//! Converts a radius in kilometres to degrees using two independent scale
//! factors: a fixed kilometres-per-degree of latitude, and a
//! kilometres-per-degree of longitude shrunk by `cos(latitude)`. This is
//! accurate enough for sub-kilometre radii at moderate latitudes. Distortion
//! grows towards the poles and for large radii.

use std::f64::consts::PI;

use crate::{GeoPoint, GeometryError};

/// Kilometres per degree of longitude at the equator.
pub const KM_PER_LON_DEGREE_AT_EQUATOR: f64 = 111.320;

/// Kilometres per degree of latitude.
pub const KM_PER_LAT_DEGREE: f64 = 110.574;

/// Number of ring vertices used by the map layer.
pub const DEFAULT_SEGMENTS: usize = 64;

/// Radius drawn around each risk point on the map.
pub const DEFAULT_RADIUS_KM: f64 = 0.2;

/// Largest accepted ring vertex count.
pub const MAX_SEGMENTS: usize = 4096;

/// Closed ring approximating a circle. First and last points are identical.
///
/// Only produced by [`approximate_circle`].
#[derive(Debug, Clone, PartialEq)]
pub struct CirclePolygon {
    ring: Vec<GeoPoint>,
}

impl CirclePolygon {
    /// Ring vertices including the closing repeat of the first point.
    #[must_use]
    pub fn points(&self) -> &[GeoPoint] {
        &self.ring
    }

    /// Number of points in the ring, including the closing point.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    /// Always `false`; a ring has at least four points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Converts the ring into a `geo` polygon with no interior rings.
    #[must_use]
    pub fn to_geo_polygon(&self) -> geo::Polygon<f64> {
        let exterior: geo::LineString<f64> = self
            .ring
            .iter()
            .map(|p| geo::Coord {
                x: p.longitude,
                y: p.latitude,
            })
            .collect();
        geo::Polygon::new(exterior, vec![])
    }

    /// Converts the ring into a GeoJSON `Polygon` geometry.
    #[must_use]
    pub fn to_geojson_geometry(&self) -> geojson::Geometry {
        let positions = self.ring.iter().map(|p| p.to_position()).collect();
        geojson::Geometry::new(geojson::Value::Polygon(vec![positions]))
    }
}

/// Approximates a circle of `radius_km` around `center` with `segments`
/// vertices.
///
/// The result has exactly `segments + 1` points; the last equals the first.
/// Output is deterministic for identical inputs.
///
/// # Errors
///
/// Returns [`GeometryError::InvalidArgument`] if `radius_km` is not a
/// positive finite number, `segments` is outside `3..=MAX_SEGMENTS`, or the
/// center is non-finite or on a pole.
pub fn approximate_circle(
    center: GeoPoint,
    radius_km: f64,
    segments: usize,
) -> Result<CirclePolygon, GeometryError> {
    if !(radius_km.is_finite() && radius_km > 0.0) {
        return Err(GeometryError::invalid(format!(
            "radius_km must be positive, got {radius_km}"
        )));
    }
    if !(3..=MAX_SEGMENTS).contains(&segments) {
        return Err(GeometryError::invalid(format!(
            "segments must be between 3 and {MAX_SEGMENTS}, got {segments}"
        )));
    }
    if !center.longitude.is_finite() || !center.latitude.is_finite() {
        return Err(GeometryError::invalid(format!(
            "center ({}, {}) is not finite",
            center.longitude, center.latitude
        )));
    }
    // cos(latitude) vanishes at the poles.
    if center.latitude.abs() >= 90.0 {
        return Err(GeometryError::invalid(format!(
            "center latitude {} is on a pole",
            center.latitude
        )));
    }
    let ring_len = segments
        .checked_add(1)
        .ok_or_else(|| GeometryError::invalid("segment count overflows"))?;

    let distance_x =
        radius_km / (KM_PER_LON_DEGREE_AT_EQUATOR * center.latitude.to_radians().cos());
    let distance_y = radius_km / KM_PER_LAT_DEGREE;

    #[allow(clippy::cast_precision_loss)]
    let step = 2.0 * PI / segments as f64;

    let mut ring = Vec::with_capacity(ring_len);
    for i in 0..segments {
        #[allow(clippy::cast_precision_loss)]
        let theta = step * i as f64;
        ring.push(GeoPoint::new(
            distance_x.mul_add(theta.cos(), center.longitude),
            distance_y.mul_add(theta.sin(), center.latitude),
        ));
    }
    let first = ring[0];
    ring.push(first);

    Ok(CirclePolygon { ring })
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Contains;

    const BANGKOK: GeoPoint = GeoPoint::new(100.50, 13.76);

    /// Distance in km under the same flat-earth projection.
    fn projected_km(center: GeoPoint, p: GeoPoint) -> f64 {
        let dx = (p.longitude - center.longitude)
            * KM_PER_LON_DEGREE_AT_EQUATOR
            * center.latitude.to_radians().cos();
        let dy = (p.latitude - center.latitude) * KM_PER_LAT_DEGREE;
        dx.hypot(dy)
    }

    /// Great-circle distance in km.
    fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
        let (lat1, lat2) = (a.latitude.to_radians(), b.latitude.to_radians());
        let dlat = lat2 - lat1;
        let dlon = (b.longitude - a.longitude).to_radians();
        let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        2.0 * 6371.0088 * h.sqrt().asin()
    }

    #[test]
    fn bangkok_ring_has_65_points_and_is_closed() {
        let circle = approximate_circle(BANGKOK, 0.2, 64).unwrap();
        assert_eq!(circle.len(), 65);
        assert_eq!(circle.points()[0], circle.points()[64]);
    }

    #[test]
    fn ring_length_matches_segments() {
        for segments in [3, 4, 17, 64, 360] {
            let circle = approximate_circle(BANGKOK, 1.0, segments).unwrap();
            assert_eq!(circle.len(), segments + 1);
            assert_eq!(circle.points().first(), circle.points().last());
        }
    }

    #[test]
    fn points_lie_on_projected_radius() {
        for lat in [-59.0, -30.0, 0.0, 13.76, 45.0, 59.0] {
            let center = GeoPoint::new(10.0, lat);
            let circle = approximate_circle(center, 0.5, 64).unwrap();
            for p in circle.points() {
                let d = projected_km(center, *p);
                assert!((d - 0.5).abs() < 1e-9, "lat {lat}: projected {d}");
            }
        }
    }

    #[test]
    fn points_are_near_great_circle_radius_at_moderate_latitudes() {
        for lat in [-55.0, -20.0, 0.0, 13.76, 40.0, 55.0] {
            let center = GeoPoint::new(-70.0, lat);
            let circle = approximate_circle(center, 0.2, 64).unwrap();
            for p in circle.points() {
                let d = haversine_km(center, *p);
                assert!((d - 0.2).abs() < 0.2 * 0.02, "lat {lat}: distance {d}");
            }
        }
    }

    #[test]
    fn output_is_deterministic() {
        let a = approximate_circle(BANGKOK, 0.2, 64).unwrap();
        let b = approximate_circle(BANGKOK, 0.2, 64).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn first_vertex_is_due_east() {
        let circle = approximate_circle(BANGKOK, 0.2, 64).unwrap();
        let first = circle.points()[0];
        assert!((first.latitude - BANGKOK.latitude).abs() < 1e-12);
        assert!(first.longitude > BANGKOK.longitude);
    }

    #[test]
    fn polygon_contains_center() {
        let circle = approximate_circle(BANGKOK, 0.2, 64).unwrap();
        let polygon = circle.to_geo_polygon();
        assert!(polygon.contains(&geo::Point::from(BANGKOK)));
        assert!(!polygon.contains(&geo::Point::new(100.6, 13.76)));
    }

    #[test]
    fn geojson_geometry_is_polygon_with_single_ring() {
        let circle = approximate_circle(BANGKOK, 0.2, 8).unwrap();
        match circle.to_geojson_geometry().value {
            geojson::Value::Polygon(rings) => {
                assert_eq!(rings.len(), 1);
                assert_eq!(rings[0].len(), 9);
                assert_eq!(rings[0][0], rings[0][8]);
            }
            other => panic!("expected polygon, got {other:?}"),
        }
    }

    #[test]
    fn rejects_degenerate_parameters() {
        assert!(approximate_circle(BANGKOK, 0.0, 64).is_err());
        assert!(approximate_circle(BANGKOK, -1.0, 64).is_err());
        assert!(approximate_circle(BANGKOK, f64::NAN, 64).is_err());
        assert!(approximate_circle(BANGKOK, f64::INFINITY, 64).is_err());
        assert!(matches!(
            approximate_circle(BANGKOK, 0.2, 2),
            Err(GeometryError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn rejects_oversized_segment_counts() {
        assert!(approximate_circle(BANGKOK, 0.2, MAX_SEGMENTS).is_ok());
        assert!(approximate_circle(BANGKOK, 0.2, MAX_SEGMENTS + 1).is_err());
        assert!(matches!(
            approximate_circle(BANGKOK, 0.2, usize::MAX),
            Err(GeometryError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn rejects_non_finite_center() {
        assert!(approximate_circle(GeoPoint::new(f64::NAN, 13.76), 0.2, 8).is_err());
        assert!(approximate_circle(GeoPoint::new(100.5, f64::NAN), 0.2, 8).is_err());
        assert!(approximate_circle(GeoPoint::new(f64::INFINITY, 0.0), 0.2, 8).is_err());
    }

    #[test]
    fn rejects_polar_center() {
        let north = GeoPoint::try_new(0.0, 90.0).unwrap();
        let south = GeoPoint::try_new(0.0, -90.0).unwrap();
        assert!(approximate_circle(north, 0.2, 8).is_err());
        assert!(approximate_circle(south, 0.2, 8).is_err());

        let near_pole = approximate_circle(GeoPoint::new(0.0, 89.0), 0.2, 8).unwrap();
        assert!(near_pole.points().iter().all(|p| p.longitude.abs() < 1.0));
    }
}
