//! Risk circle layer construction.
//!
//! Turns scored points into a GeoJSON `FeatureCollection` of circle
//! polygons, each tagged with its risk tier and display color. Backend
//! predictions below the medium breakpoint are hidden; self-survey points
//! are always drawn.

use geojson::{Feature, FeatureCollection, GeoJson, JsonObject};
use serde::{Deserialize, Serialize};
use sinkhole_map_risk::{Breakpoints, classify};

use crate::{GeoPoint, GeometryError, approximate_circle};

/// Where a scored point came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointSource {
    /// Prediction from the backend's latest area scan.
    Server,
    /// On-demand prediction cached in the self-survey store.
    LocalStorage,
}

impl PointSource {
    /// Value written to the `point_source` feature property.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Server => "server",
            Self::LocalStorage => "localstorage",
        }
    }
}

/// A location with a risk score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskPoint {
    /// Position of the prediction.
    pub location: GeoPoint,
    /// Continuous risk score.
    pub risk: f64,
    /// Origin of the prediction.
    pub source: PointSource,
}

/// Circle rendering parameters.
#[derive(Debug, Clone, Copy)]
pub struct LayerOptions {
    /// Tier thresholds for classification and display filtering.
    pub breakpoints: Breakpoints,
    /// Circle radius in kilometres.
    pub radius_km: f64,
    /// Ring vertex count.
    pub segments: usize,
}

impl Default for LayerOptions {
    fn default() -> Self {
        Self {
            breakpoints: Breakpoints::default(),
            radius_km: crate::DEFAULT_RADIUS_KM,
            segments: crate::DEFAULT_SEGMENTS,
        }
    }
}

/// Whether a point is drawn on the map.
#[must_use]
pub fn is_visible(point: &RiskPoint, breakpoints: &Breakpoints) -> bool {
    point.source == PointSource::LocalStorage || breakpoints.is_displayable(point.risk)
}

/// Builds the circle layer for the given points.
///
/// # Errors
///
/// Returns [`GeometryError`] if the configured radius or segment count is
/// invalid.
pub fn build_circle_layer(
    points: &[RiskPoint],
    options: &LayerOptions,
) -> Result<FeatureCollection, GeometryError> {
    let mut features = Vec::new();

    for point in points.iter().filter(|p| is_visible(p, &options.breakpoints)) {
        let circle = approximate_circle(point.location, options.radius_km, options.segments)?;
        let tier = classify(point.risk, options.breakpoints);

        let mut properties = JsonObject::new();
        properties.insert("risk".to_string(), serde_json::json!(point.risk));
        properties.insert("tier".to_string(), serde_json::json!(tier.as_ref()));
        properties.insert("color".to_string(), serde_json::json!(tier.color()));
        properties.insert(
            "point_source".to_string(),
            serde_json::json!(point.source.as_str()),
        );

        features.push(Feature {
            bbox: None,
            geometry: Some(circle.to_geojson_geometry()),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        });
    }

    log::debug!(
        "Built circle layer: {} of {} points visible",
        features.len(),
        points.len()
    );

    Ok(FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    })
}

/// Extracts scored points from a backend prediction `FeatureCollection`.
///
/// Features without a `Point` geometry or a numeric `risk` property are
/// skipped with a warning.
#[must_use]
pub fn risk_points_from_geojson(geojson: &GeoJson, source: PointSource) -> Vec<RiskPoint> {
    let GeoJson::FeatureCollection(collection) = geojson else {
        log::warn!("Expected a FeatureCollection, got another GeoJSON object");
        return Vec::new();
    };

    collection
        .features
        .iter()
        .filter_map(|feature| {
            let point = feature
                .geometry
                .clone()
                .and_then(|g| geo::Geometry::<f64>::try_from(g).ok())
                .and_then(|g| match g {
                    geo::Geometry::Point(p) => Some(p),
                    _ => None,
                });
            let risk = feature.property("risk").and_then(serde_json::Value::as_f64);

            match (point, risk) {
                (Some(p), Some(risk)) => Some(RiskPoint {
                    location: p.into(),
                    risk,
                    source,
                }),
                _ => {
                    log::warn!("Skipping feature without point geometry or risk");
                    None
                }
            }
        })
        .collect()
}
