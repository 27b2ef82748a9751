#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! HTTP client for the sinkhole prediction backend.
//!
//! The backend runs the ML model and caches daily area scans. This crate
//! wraps its endpoints so the API server can forward requests without
//! knowing the backend's URL layout. Responses are mostly passed through
//! as raw JSON; only the on-demand point prediction is decoded, since the
//! server records it in the self-survey cache.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Backend URL used when none is configured.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

/// Errors from talking to the prediction backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The request could not be sent or the response could not be read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body was not the expected JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The backend answered with a non-success status.
    #[error("Backend returned {status}: {body}")]
    Upstream {
        /// HTTP status code from the backend.
        status: u16,
        /// Raw response body.
        body: String,
    },
}

/// Query for the time-series feature endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointFeaturesQuery {
    /// Latitude of the point.
    pub lat: f64,
    /// Longitude of the point.
    pub lon: f64,
    /// Last day of the series, `YYYY-MM-DD`.
    pub end_date: String,
    /// Number of months of history.
    pub months: u32,
}

/// Body for an on-demand point prediction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictPointRequest {
    /// Latitude of the point.
    pub lat: f64,
    /// Longitude of the point.
    pub lon: f64,
    /// Prediction date, `YYYY-MM-DD`.
    pub date: String,
}

/// Decoded on-demand prediction.
#[derive(Debug, Clone, Deserialize)]
pub struct PredictPointResponse {
    /// Backend status string.
    pub status: String,
    /// The predicted point.
    pub feature: PredictedFeature,
}

/// GeoJSON-like feature returned by the point prediction endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct PredictedFeature {
    /// `[lon, lat]` position.
    pub geometry: PredictedGeometry,
    /// Prediction details.
    pub properties: PredictedProperties,
}

/// Point geometry of a predicted feature.
#[derive(Debug, Clone, Deserialize)]
pub struct PredictedGeometry {
    /// `[lon, lat]`.
    pub coordinates: [f64; 2],
}

/// Properties of a predicted feature.
#[derive(Debug, Clone, Deserialize)]
pub struct PredictedProperties {
    /// Latitude the backend evaluated.
    pub lat: f64,
    /// Longitude the backend evaluated.
    pub lon: f64,
    /// Prediction date.
    pub date: String,
    /// Predicted risk score.
    pub risk: f64,
}

/// Decodes a point prediction from the raw backend JSON.
///
/// # Errors
///
/// Returns [`BackendError::Json`] if required fields are missing.
pub fn parse_predict_point(
    value: &serde_json::Value,
) -> Result<PredictPointResponse, BackendError> {
    Ok(PredictPointResponse::deserialize(value)?)
}

/// Turns a backend status and body into JSON or an upstream error.
fn decode_body(
    status: reqwest::StatusCode,
    body: &[u8],
) -> Result<serde_json::Value, BackendError> {
    if !status.is_success() {
        return Err(BackendError::Upstream {
            status: status.as_u16(),
            body: String::from_utf8_lossy(body).into_owned(),
        });
    }
    Ok(serde_json::from_slice(body)?)
}

/// Client for the prediction backend.
#[derive(Debug, Clone)]
pub struct BackendClient {
    base_url: String,
    client: reqwest::Client,
}

impl BackendClient {
    /// Creates a client for the backend at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Creates a client reusing an existing `reqwest` client.
    #[must_use]
    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, client }
    }

    /// Backend root URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    async fn read(resp: reqwest::Response) -> Result<serde_json::Value, BackendError> {
        let status = resp.status();
        let body = resp.bytes().await?;
        decode_body(status, &body)
    }

    /// `GET /latest-geojson`: the latest area scan as `{file, geojson}`.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if the request fails or the backend errors.
    pub async fn latest_geojson(&self) -> Result<serde_json::Value, BackendError> {
        log::debug!("Fetching latest prediction GeoJSON");
        let resp = self.client.get(self.url("latest-geojson")).send().await?;
        Self::read(resp).await
    }

    /// `GET /latest-map`: the latest cached scan in tabular form.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if the request fails or the backend errors.
    pub async fn latest_map(&self) -> Result<serde_json::Value, BackendError> {
        let resp = self.client.get(self.url("latest-map")).send().await?;
        Self::read(resp).await
    }

    /// `GET /point-features`: feature time series for a point.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if the request fails or the backend errors.
    pub async fn point_features(
        &self,
        query: &PointFeaturesQuery,
    ) -> Result<serde_json::Value, BackendError> {
        log::debug!(
            "Fetching point features lat={} lon={} end_date={} months={}",
            query.lat,
            query.lon,
            query.end_date,
            query.months
        );
        let resp = self
            .client
            .get(self.url("point-features"))
            .query(query)
            .send()
            .await?;
        Self::read(resp).await
    }

    /// `GET /point-features-from-scan`: features of the nearest scanned point.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if the request fails or the backend errors.
    pub async fn point_features_from_scan(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<serde_json::Value, BackendError> {
        let resp = self
            .client
            .get(self.url("point-features-from-scan"))
            .query(&[("lat", lat), ("lon", lon)])
            .send()
            .await?;
        Self::read(resp).await
    }

    /// `POST /predict-point`: on-demand prediction for one location.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if the request fails or the backend errors.
    pub async fn predict_point(
        &self,
        request: &PredictPointRequest,
    ) -> Result<serde_json::Value, BackendError> {
        log::info!(
            "Requesting prediction for ({}, {}) on {}",
            request.lat,
            request.lon,
            request.date
        );
        let resp = self
            .client
            .post(self.url("predict-point"))
            .json(request)
            .send()
            .await?;
        Self::read(resp).await
    }
}
