//! OpenAQ v3 API response models.

use serde::Deserialize;

/// `GET /locations?coordinates=..&radius=..` response
#[derive(Debug, Deserialize)]
pub struct LocationsResponse {
    #[serde(default)]
    pub results: Vec<OpenAqLocation>,
}

/// A monitoring location (station) with its sensors
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAqLocation {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    /// Distance from the query coordinate in meters, when the API reports it
    #[serde(default)]
    pub distance: Option<f64>,
    #[serde(default)]
    pub sensors: Vec<OpenAqSensor>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAqSensor {
    pub id: u64,
    pub parameter: OpenAqParameter,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAqParameter {
    pub name: String,
}

/// `GET /locations/{id}/latest` response
#[derive(Debug, Deserialize)]
pub struct LatestResponse {
    #[serde(default)]
    pub results: Vec<LatestMeasurement>,
}

/// Latest value of one sensor.
///
/// Newer API revisions identify the sensor only by `sensorsId`; older ones
/// inline the `parameter`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestMeasurement {
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub sensors_id: Option<u64>,
    #[serde(default)]
    pub parameter: Option<OpenAqParameter>,
    #[serde(default)]
    pub datetime: Option<MeasurementTime>,
}

#[derive(Debug, Deserialize)]
pub struct MeasurementTime {
    pub utc: String,
}
