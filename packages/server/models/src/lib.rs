#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the sinkhole map server.
//!
//! Request bodies and query strings use `Option` fields so handlers can
//! answer missing parameters with a JSON 400 instead of the framework's
//! plain-text extractor error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sinkhole_map_risk::{Breakpoints, RiskTier, classify};
use sinkhole_map_survey::SurveyPoint;

/// Months of history requested when the caller does not say.
pub const DEFAULT_FEATURE_MONTHS: u32 = 12;

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

/// Error body returned by every endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    /// Short error summary.
    pub error: String,
    /// Upstream or diagnostic detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ApiError {
    /// Error without detail.
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            detail: None,
        }
    }

    /// Error with detail.
    #[must_use]
    pub fn with_detail(error: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            detail: Some(detail.into()),
        }
    }
}

/// Body of `POST /api/point-features`.
#[derive(Debug, Clone, Deserialize)]
pub struct PointFeaturesBody {
    /// Latitude.
    pub lat: Option<f64>,
    /// Longitude.
    pub lon: Option<f64>,
    /// Last day of the series, `YYYY-MM-DD`.
    pub end_date: Option<String>,
    /// Months of history (default 12).
    pub months: Option<u32>,
}

/// Query of `GET /api/get-feature`.
///
/// Same fields as [`PointFeaturesBody`], read from the query string.
pub type GetFeatureParams = PointFeaturesBody;

/// A `lat`/`lon` pair where either may be missing.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct LatLonParams {
    /// Latitude.
    pub lat: Option<f64>,
    /// Longitude.
    pub lon: Option<f64>,
}

/// Body of `POST /api/predict-random-point`.
#[derive(Debug, Clone, Deserialize)]
pub struct PredictRandomPointBody {
    /// Latitude.
    pub lat: Option<f64>,
    /// Longitude.
    pub lon: Option<f64>,
    /// Prediction date, `YYYY-MM-DD`.
    pub date: Option<String>,
}

/// Query of `GET /api/risk-circles`.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskCirclesParams {
    /// Circle radius in kilometres (default 0.2).
    pub radius_km: Option<f64>,
    /// Ring vertex count (default 64).
    pub segments: Option<usize>,
}

/// A live self-survey point as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSurveyPoint {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lon: f64,
    /// Predicted risk score.
    pub risk: f64,
    /// Risk tier under the server's breakpoints.
    pub tier: RiskTier,
    /// Display color for the tier.
    pub color: String,
    /// When the point was recorded.
    pub created_at: DateTime<Utc>,
    /// When the point expires.
    pub expires_at: DateTime<Utc>,
}

impl ApiSurveyPoint {
    /// Converts a stored point, classifying its risk.
    #[must_use]
    pub fn from_point(point: &SurveyPoint, breakpoints: Breakpoints) -> Self {
        let tier = classify(point.risk, breakpoints);
        Self {
            lat: point.location.latitude,
            lon: point.location.longitude,
            risk: point.risk,
            tier,
            color: tier.color().to_string(),
            created_at: point.created_at,
            expires_at: point.expires_at,
        }
    }
}

/// Response of `DELETE /api/survey-points`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ApiDeleted {
    /// Number of points removed.
    pub removed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_detail_is_omitted_when_absent() {
        let json = serde_json::to_value(ApiError::new("lat and lon are required")).unwrap();
        assert_eq!(json, serde_json::json!({"error": "lat and lon are required"}));

        let json = serde_json::to_value(ApiError::with_detail("Backend error", "boom")).unwrap();
        assert_eq!(json["detail"], "boom");
    }

    #[test]
    fn survey_point_is_classified() {
        let point: SurveyPoint = serde_json::from_value(serde_json::json!({
            "lat": 13.76, "lon": 100.5, "risk": 0.35,
            "create_at": "2026-10-19T10:00:00Z",
            "expire_at": "2026-10-19T12:00:00Z"
        }))
        .unwrap();

        let api = ApiSurveyPoint::from_point(&point, Breakpoints::default());
        assert_eq!(api.tier, RiskTier::High);

        let json = serde_json::to_value(&api).unwrap();
        assert_eq!(json["tier"], "HIGH");
        assert!(json.get("expiresAt").is_some());
    }

    #[test]
    fn point_features_body_allows_missing_months() {
        let body: PointFeaturesBody = serde_json::from_value(serde_json::json!({
            "lat": 13.76, "lon": 100.5, "end_date": "2026-10-19"
        }))
        .unwrap();
        assert_eq!(body.months, None);
    }
}
