#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Self-survey point cache.
//!
//! A self-survey point is an on-demand risk prediction the user requested
//! for a clicked coordinate. Points live for [`SURVEY_TTL_HOURS`] hours and
//! are stored as a single JSON array under [`SURVEY_POINTS_KEY`] in a
//! key-value [`Storage`] backend. Expiry is lazy: every cache entry point
//! filters out expired records before doing anything else, so no background
//! timer is needed.
//!
//! The cache does a full read-modify-write on every call and is not atomic
//! across concurrent callers. Share it behind a lock.

pub mod cache;
pub mod clock;
pub mod storage;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sinkhole_map_spatial::GeoPoint;

pub use cache::EphemeralPointCache;
pub use clock::{Clock, ManualClock, SystemClock};
pub use storage::{FileStorage, MemoryStorage, Storage};

/// Storage key holding the JSON-encoded survey point collection.
pub const SURVEY_POINTS_KEY: &str = "selfSurveyPoints";

/// Lifetime of a survey point.
pub const SURVEY_TTL_HOURS: i64 = 2;

/// Errors from the persistence layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Filesystem error from a file-backed store.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The collection could not be encoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Writing the value would exceed the store's size limit.
    #[error("Storage quota exceeded: {needed} bytes needed, limit is {limit}")]
    QuotaExceeded {
        /// Total size after the rejected write.
        needed: usize,
        /// Configured size limit.
        limit: usize,
    },

    /// The point cannot be persisted faithfully.
    #[error("Invalid survey point: {reason}")]
    InvalidRecord {
        /// Why the point was rejected.
        reason: String,
    },

    /// The key cannot be used by this backend.
    #[error("Invalid storage key: {key:?}")]
    InvalidKey {
        /// The rejected key.
        key: String,
    },
}

/// A cached on-demand prediction.
///
/// Serialized as `{"lat", "lon", "risk", "create_at", "expire_at"}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurveyPoint {
    /// Where the prediction was requested.
    #[serde(flatten)]
    pub location: GeoPoint,
    /// Predicted risk score.
    pub risk: f64,
    /// When the point was added.
    #[serde(rename = "create_at")]
    pub created_at: DateTime<Utc>,
    /// When the point stops being returned.
    #[serde(rename = "expire_at")]
    pub expires_at: DateTime<Utc>,
}

impl SurveyPoint {
    /// Whether the point is still live at `now`.
    #[must_use]
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn survey_point_uses_persisted_field_names() {
        let point: SurveyPoint = serde_json::from_value(serde_json::json!({
            "lat": 13.76,
            "lon": 100.5,
            "risk": 0.28,
            "create_at": "2026-01-01T10:00:00.000Z",
            "expire_at": "2026-01-01T12:00:00.000Z"
        }))
        .unwrap();

        assert_eq!(point.location, GeoPoint::new(100.5, 13.76));
        assert_eq!(point.expires_at - point.created_at, chrono::TimeDelta::hours(2));

        let json = serde_json::to_value(point).unwrap();
        assert!(json.get("create_at").is_some());
        assert!(json.get("lon").is_some());
    }

    #[test]
    fn liveness_is_strict() {
        let point: SurveyPoint = serde_json::from_value(serde_json::json!({
            "lat": 0.0, "lon": 0.0, "risk": 0.0,
            "create_at": "2026-01-01T10:00:00Z",
            "expire_at": "2026-01-01T12:00:00Z"
        }))
        .unwrap();
        assert!(point.is_live(point.created_at));
        assert!(!point.is_live(point.expires_at));
    }
}
