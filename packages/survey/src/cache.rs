//! The survey point cache.

use chrono::TimeDelta;
use sinkhole_map_spatial::GeoPoint;

use crate::clock::{Clock, SystemClock};
use crate::storage::Storage;
use crate::{SURVEY_POINTS_KEY, SURVEY_TTL_HOURS, StorageError, SurveyPoint};

/// Persisted collection of self-survey points with lazy expiry.
///
/// Every public operation drops expired points before it reads or writes,
/// so callers never observe a point whose `expires_at` has passed.
#[derive(Debug)]
pub struct EphemeralPointCache<S, C = SystemClock> {
    storage: S,
    clock: C,
    ttl: TimeDelta,
}

impl<S: Storage> EphemeralPointCache<S> {
    /// Creates a cache on `storage` using wall-clock time.
    pub fn new(storage: S) -> Self {
        Self::with_clock(storage, SystemClock)
    }
}

impl<S: Storage, C: Clock> EphemeralPointCache<S, C> {
    /// Creates a cache on `storage` using `clock` for expiry.
    pub fn with_clock(storage: S, clock: C) -> Self {
        Self {
            storage,
            clock,
            ttl: TimeDelta::hours(SURVEY_TTL_HOURS),
        }
    }

    /// Underlying storage backend.
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Writes an empty collection if none exists yet. An existing
    /// collection is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the store cannot be read or written.
    pub fn initialize_if_absent(&mut self) -> Result<(), StorageError> {
        if self.storage.get(SURVEY_POINTS_KEY)?.is_none() {
            log::debug!("Initializing empty survey point collection");
            self.storage.set(SURVEY_POINTS_KEY, "[]")?;
        }
        Ok(())
    }

    /// Appends a point at `location` expiring after the TTL.
    ///
    /// Existing points at the same location are kept; nothing is merged.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidRecord`] if the risk or a coordinate
    /// is not finite, or another [`StorageError`] if the collection cannot
    /// be persisted.
    pub fn add(&mut self, location: GeoPoint, risk: f64) -> Result<SurveyPoint, StorageError> {
        // JSON has no NaN or infinity; such a record would read back as null.
        let finite = [location.longitude, location.latitude, risk]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return Err(StorageError::InvalidRecord {
                reason: format!(
                    "non-finite value in ({}, {}) risk={risk}",
                    location.longitude, location.latitude
                ),
            });
        }

        let now = self.clock.now();
        let mut points = self.live_points()?;

        let point = SurveyPoint {
            location,
            risk,
            created_at: now,
            expires_at: now + self.ttl,
        };
        points.push(point);
        self.store(&points)?;

        log::info!(
            "Added survey point ({}, {}) risk={risk}, {} live",
            location.longitude,
            location.latitude,
            points.len()
        );
        Ok(point)
    }

    /// Returns live points whose location equals `location` exactly.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the store cannot be read or the purge
    /// cannot be persisted.
    pub fn find_by_location(
        &mut self,
        location: GeoPoint,
    ) -> Result<Vec<SurveyPoint>, StorageError> {
        let points = self.live_points()?;
        Ok(points
            .into_iter()
            .filter(|p| p.location == location)
            .collect())
    }

    /// Returns every live point.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the store cannot be read or the purge
    /// cannot be persisted.
    pub fn list_all(&mut self) -> Result<Vec<SurveyPoint>, StorageError> {
        self.live_points()
    }

    /// Removes every point whose expiry is not after now. Returns how many
    /// were removed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the store cannot be read or written.
    pub fn purge_expired(&mut self) -> Result<usize, StorageError> {
        let before = self.load()?.len();
        let live = self.live_points()?;
        Ok(before - live.len())
    }

    /// Removes every point located exactly at `location`. Points sharing
    /// only the latitude or only the longitude are kept. Returns how many
    /// were removed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the store cannot be read or written.
    pub fn delete_by_location(&mut self, location: GeoPoint) -> Result<usize, StorageError> {
        let mut points = self.live_points()?;
        let before = points.len();
        points.retain(|p| p.location != location);

        let removed = before - points.len();
        if removed > 0 {
            self.store(&points)?;
            log::info!(
                "Deleted {removed} survey point(s) at ({}, {})",
                location.longitude,
                location.latitude
            );
        }
        Ok(removed)
    }

    /// Loads the collection, drops expired points and persists the result.
    fn live_points(&mut self) -> Result<Vec<SurveyPoint>, StorageError> {
        let now = self.clock.now();
        let mut points = self.load()?;
        points.retain(|p| p.is_live(now));
        self.store(&points)?;
        Ok(points)
    }

    /// Reads the raw collection. Unparseable data is treated as empty and
    /// malformed records are skipped.
    fn load(&self) -> Result<Vec<SurveyPoint>, StorageError> {
        let Some(raw) = self.storage.get(SURVEY_POINTS_KEY)? else {
            return Ok(Vec::new());
        };

        let records: Vec<serde_json::Value> = match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(e) => {
                log::warn!("Discarding unreadable survey point collection: {e}");
                return Ok(Vec::new());
            }
        };

        Ok(records
            .into_iter()
            .filter_map(|record| match serde_json::from_value(record) {
                Ok(point) => Some(point),
                Err(e) => {
                    log::warn!("Skipping malformed survey point: {e}");
                    None
                }
            })
            .collect())
    }

    fn store(&mut self, points: &[SurveyPoint]) -> Result<(), StorageError> {
        let json = serde_json::to_string(points)?;
        self.storage.set(SURVEY_POINTS_KEY, &json)
    }
}
