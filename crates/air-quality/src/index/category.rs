//! Index → category mapping.
//!
//! This is the only place a category is derived. Everything else asks
//! [`category_for`] with the index it already has.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Health category of an index value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AqiCategory {
    #[serde(rename = "Good")]
    Good,
    #[serde(rename = "Moderate")]
    Moderate,
    #[serde(rename = "Unhealthy for Sensitive Groups")]
    UnhealthyForSensitiveGroups,
    #[serde(rename = "Unhealthy")]
    Unhealthy,
    #[serde(rename = "Very Unhealthy")]
    VeryUnhealthy,
    #[serde(rename = "Hazardous")]
    Hazardous,
}

/// Ascending `(max_index, category)` thresholds.
const CATEGORY_THRESHOLDS: [(u32, AqiCategory); 6] = [
    (50, AqiCategory::Good),
    (100, AqiCategory::Moderate),
    (150, AqiCategory::UnhealthyForSensitiveGroups),
    (200, AqiCategory::Unhealthy),
    (300, AqiCategory::VeryUnhealthy),
    (500, AqiCategory::Hazardous),
];

impl AqiCategory {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::Moderate => "Moderate",
            Self::UnhealthyForSensitiveGroups => "Unhealthy for Sensitive Groups",
            Self::Unhealthy => "Unhealthy",
            Self::VeryUnhealthy => "Very Unhealthy",
            Self::Hazardous => "Hazardous",
        }
    }
}

impl fmt::Display for AqiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Category of an index value.
///
/// Total over `[0, ∞)`: anything above the last threshold is `Hazardous`.
pub fn category_for(index: u32) -> AqiCategory {
    CATEGORY_THRESHOLDS
        .iter()
        .find(|(max_index, _)| *max_index >= index)
        .map(|(_, category)| *category)
        .unwrap_or(AqiCategory::Hazardous)
}
