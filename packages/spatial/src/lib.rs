#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geographic primitives for the sinkhole map.
//!
//! Provides the [`GeoPoint`] value type, the flat-earth circle
//! approximation used to draw risk radii around predicted points
//! ([`circle::approximate_circle`]), and the GeoJSON layer builder that
//! turns a list of scored points into renderable circle polygons
//! ([`layer`]).

pub mod circle;
pub mod layer;

use serde::{Deserialize, Serialize};

pub use circle::{
    CirclePolygon, DEFAULT_RADIUS_KM, DEFAULT_SEGMENTS, MAX_SEGMENTS, approximate_circle,
};

/// Errors produced by geometry construction.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    /// A geometry parameter was out of its valid domain.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the rejected parameter.
        message: String,
    },
}

impl GeometryError {
    fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}

/// A WGS84 position in decimal degrees.
///
/// Serialized as `{"lon": .., "lat": ..}`. Equality is exact float
/// equality on both coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Longitude in `[-180, 180]`.
    #[serde(rename = "lon")]
    pub longitude: f64,
    /// Latitude in `[-90, 90]`.
    #[serde(rename = "lat")]
    pub latitude: f64,
}

impl GeoPoint {
    /// Creates a point without range checks.
    #[must_use]
    pub const fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    /// Creates a point, rejecting non-finite or out-of-range coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidArgument`] if longitude is outside
    /// `[-180, 180]` or latitude is outside `[-90, 90]`.
    pub fn try_new(longitude: f64, latitude: f64) -> Result<Self, GeometryError> {
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(GeometryError::invalid(format!(
                "longitude {longitude} outside [-180, 180]"
            )));
        }
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(GeometryError::invalid(format!(
                "latitude {latitude} outside [-90, 90]"
            )));
        }
        Ok(Self::new(longitude, latitude))
    }

    /// GeoJSON position order: `[lon, lat]`.
    #[must_use]
    pub fn to_position(self) -> Vec<f64> {
        vec![self.longitude, self.latitude]
    }
}

impl From<GeoPoint> for geo::Point<f64> {
    fn from(p: GeoPoint) -> Self {
        Self::new(p.longitude, p.latitude)
    }
}

impl From<geo::Point<f64>> for GeoPoint {
    fn from(p: geo::Point<f64>) -> Self {
        Self::new(p.x(), p.y())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_coordinate_ranges() {
        assert!(GeoPoint::try_new(100.5, 13.76).is_ok());
        assert!(GeoPoint::try_new(-180.0, -90.0).is_ok());
        assert!(GeoPoint::try_new(180.1, 0.0).is_err());
        assert!(GeoPoint::try_new(0.0, -90.5).is_err());
        assert!(GeoPoint::try_new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn serializes_with_short_keys() {
        let json = serde_json::to_value(GeoPoint::new(100.5, 13.76)).unwrap();
        assert_eq!(json, serde_json::json!({"lon": 100.5, "lat": 13.76}));
    }

    #[test]
    fn converts_to_geo_point() {
        let p: geo::Point<f64> = GeoPoint::new(1.0, 2.0).into();
        assert!((p.x() - 1.0).abs() < f64::EPSILON);
        assert!((p.y() - 2.0).abs() < f64::EPSILON);
        assert_eq!(GeoPoint::from(p), GeoPoint::new(1.0, 2.0));
    }
}
