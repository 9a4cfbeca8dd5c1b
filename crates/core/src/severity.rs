//! Severity classification from total pothole area.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Total area (m^2) at or above which severity is Moderate.
pub const MODERATE_THRESHOLD_M2: f64 = 0.2;
/// Total area (m^2) at or above which severity is Severe.
pub const SEVERE_THRESHOLD_M2: f64 = 0.5;
/// Total area (m^2) at or above which severity is Critical.
pub const CRITICAL_THRESHOLD_M2: f64 = 1.0;

/// Ordinal severity band derived from total pothole area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Minor,
    Moderate,
    Severe,
    Critical,
}

impl Severity {
    /// Classify a total area into a severity band.
    ///
    /// Bands are half-open: a boundary value belongs to the upper band
    /// (0.5 m^2 is Severe, not Moderate). Defined for all non-negative input.
    pub fn classify(total_area_m2: f64) -> Self {
        if total_area_m2 < MODERATE_THRESHOLD_M2 {
            Self::Minor
        } else if total_area_m2 < SEVERE_THRESHOLD_M2 {
            Self::Moderate
        } else if total_area_m2 < CRITICAL_THRESHOLD_M2 {
            Self::Severe
        } else {
            Self::Critical
        }
    }

    /// Database / API string form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Minor => "Minor",
            Self::Moderate => "Moderate",
            Self::Severe => "Severe",
            Self::Critical => "Critical",
        }
    }

    /// Parse the string form stored in the database.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "Minor" => Ok(Self::Minor),
            "Moderate" => Ok(Self::Moderate),
            "Severe" => Ok(Self::Severe),
            "Critical" => Ok(Self::Critical),
            other => Err(CoreError::Validation(format!(
                "Unknown severity '{other}'. Must be one of: Minor, Moderate, Severe, Critical"
            ))),
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
