#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Risk tier classification for sinkhole risk scores.
//!
//! The prediction backend reports a continuous, probability-like risk score
//! per location. This crate maps that score onto a discrete [`RiskTier`]
//! using two ordered [`Breakpoints`]. The default breakpoints are embedded
//! from `breakpoints.toml` at compile time.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Discrete risk classification of a continuous risk score.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskTier {
    /// At or below the medium breakpoint.
    Low,
    /// Above the medium breakpoint, at or below the high breakpoint.
    Medium,
    /// Above the high breakpoint.
    High,
}

impl RiskTier {
    /// Returns all tiers in ascending order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Low, Self::Medium, Self::High]
    }

    /// Presentation color used by the map for markers and circle fills.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Low => "hsl(189 94% 43%)",
            Self::Medium => "hsl(25 95% 53%)",
            Self::High => "hsl(0 84% 60%)",
        }
    }
}

/// Error returned when a pair of breakpoints is not strictly ordered.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("invalid breakpoints medium={medium}, high={high}: expected finite values with high > medium")]
pub struct InvalidBreakpointsError {
    /// The rejected medium breakpoint.
    pub medium: f64,
    /// The rejected high breakpoint.
    pub high: f64,
}

#[derive(Deserialize)]
struct RawBreakpoints {
    medium: f64,
    high: f64,
}

/// Thresholds separating the three risk tiers.
///
/// Always satisfies `high > medium`; construct through [`Breakpoints::new`]
/// or deserialize, both of which validate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBreakpoints")]
pub struct Breakpoints {
    medium: f64,
    high: f64,
}

impl Breakpoints {
    /// Creates a validated pair of breakpoints.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidBreakpointsError`] if either value is not finite or
    /// `high <= medium`.
    pub fn new(medium: f64, high: f64) -> Result<Self, InvalidBreakpointsError> {
        if !medium.is_finite() || !high.is_finite() || high <= medium {
            return Err(InvalidBreakpointsError { medium, high });
        }
        Ok(Self { medium, high })
    }

    /// Lower breakpoint (Low/Medium boundary).
    #[must_use]
    pub const fn medium(&self) -> f64 {
        self.medium
    }

    /// Upper breakpoint (Medium/High boundary).
    #[must_use]
    pub const fn high(&self) -> f64 {
        self.high
    }

    /// Whether a backend prediction with this score is drawn on the map.
    ///
    /// Predictions below the medium breakpoint are hidden.
    #[must_use]
    pub fn is_displayable(&self, score: f64) -> bool {
        score >= self.medium
    }
}

impl TryFrom<RawBreakpoints> for Breakpoints {
    type Error = InvalidBreakpointsError;

    fn try_from(raw: RawBreakpoints) -> Result<Self, Self::Error> {
        Self::new(raw.medium, raw.high)
    }
}

impl Default for Breakpoints {
    fn default() -> Self {
        default_breakpoints()
    }
}

const BREAKPOINTS_TOML: &str = include_str!("../breakpoints.toml");

/// Returns the breakpoints embedded from `breakpoints.toml`.
///
/// # Panics
///
/// Panics if the embedded `breakpoints.toml` is malformed.
#[must_use]
pub fn default_breakpoints() -> Breakpoints {
    toml::de::from_str(BREAKPOINTS_TOML)
        .unwrap_or_else(|e| panic!("Failed to parse embedded breakpoints: {e}"))
}

/// Classifies a risk score.
///
/// Returns [`RiskTier::High`] for `score > high`, [`RiskTier::Medium`] for
/// `medium < score <= high` and [`RiskTier::Low`] for everything else,
/// including zero, negative scores and `NaN`.
#[must_use]
pub fn classify(score: f64, breakpoints: Breakpoints) -> RiskTier {
    if score.is_nan() {
        return RiskTier::Low;
    }
    if score > breakpoints.high {
        RiskTier::High
    } else if score > breakpoints.medium {
        RiskTier::Medium
    } else {
        RiskTier::Low
    }
}

/// Classifies a score that may be missing. A missing score is Low.
#[must_use]
pub fn classify_optional(score: Option<f64>, breakpoints: Breakpoints) -> RiskTier {
    score.map_or(RiskTier::Low, |s| classify(s, breakpoints))
}
