//! World Air Quality Index (WAQI / aqicn.org) station-network provider.
//!
//! Queries the geo feed (`/feed/geo:{lat};{lon}/`), which answers with the
//! nearest station's pre-computed index and optional per-pollutant values.
//! Missing PM2.5/PM10 values are backfilled from the index.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use reqwest::Client;
use serde::Deserialize;

use crate::config::AirQualityConfig;
use crate::errors::AirQualityError;
use crate::http::{build_client, get_json};
use crate::index::MAX_INDEX;
use crate::models::{
    Address, Coordinate, Location, NormalizedReading, PollutantSet, Provenance, REMOTE_CITY,
};
use crate::provider::SourceAdapter;

/// Provider ID constant
pub const PROVIDER_ID: &str = "WAQI";

/// Envelope of every feed response. On error `data` is a message string.
#[derive(Debug, Deserialize)]
struct FeedResponse {
    status: String,
    #[serde(default)]
    data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct FeedData {
    /// A number, or "-" when the station has no current value.
    aqi: serde_json::Value,
    #[serde(default)]
    city: Option<FeedCity>,
    #[serde(default)]
    iaqi: FeedIaqi,
}

#[derive(Debug, Deserialize)]
struct FeedCity {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct FeedIaqi {
    pm25: Option<FeedValue>,
    pm10: Option<FeedValue>,
    no2: Option<FeedValue>,
    so2: Option<FeedValue>,
    co: Option<FeedValue>,
    o3: Option<FeedValue>,
}

#[derive(Debug, Deserialize)]
struct FeedValue {
    v: f64,
}

fn value(field: &Option<FeedValue>) -> Option<f64> {
    field.as_ref().map(|f| f.v)
}

/// WAQI station-network adapter.
///
/// # Example
///
/// ```ignore
/// use pureair_air_quality::provider::waqi::WaqiProvider;
///
/// let provider = WaqiProvider::new(&config);
/// ```
pub struct WaqiProvider {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl WaqiProvider {
    pub fn new(config: &AirQualityConfig) -> Self {
        Self {
            client: build_client(&config.user_agent, config.request_timeout),
            base_url: config.waqi_url.trim_end_matches('/').to_string(),
            token: config
                .waqi_token
                .clone()
                .filter(|token| !token.trim().is_empty()),
        }
    }
}

#[async_trait]
impl SourceAdapter for WaqiProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn priority(&self) -> u8 {
        1
    }

    async fn fetch(
        &self,
        coordinate: &Coordinate,
        timeout: Duration,
    ) -> Result<NormalizedReading, AirQualityError> {
        let token = self
            .token
            .as_deref()
            .ok_or_else(|| AirQualityError::NotConfigured {
                provider: PROVIDER_ID.to_string(),
            })?;

        let url = format!(
            "{}/feed/geo:{};{}/",
            self.base_url, coordinate.lat, coordinate.lon
        );
        debug!("Fetching '{}' feed for {:?}", PROVIDER_ID, coordinate);

        let request = self.client.get(url).query(&[("token", token)]);
        let response: FeedResponse = get_json(PROVIDER_ID, request, timeout).await?;

        map_feed(coordinate, response)
    }
}

fn map_feed(
    coordinate: &Coordinate,
    response: FeedResponse,
) -> Result<NormalizedReading, AirQualityError> {
    if response.status != "ok" {
        let detail = response.data.as_str().unwrap_or("no detail");
        return Err(AirQualityError::unavailable(
            PROVIDER_ID,
            format!("status={} ({})", response.status, detail),
        ));
    }

    let data: FeedData = serde_json::from_value(response.data)
        .map_err(|e| AirQualityError::unavailable(PROVIDER_ID, format!("bad feed data: {e}")))?;

    let aqi = data
        .aqi
        .as_f64()
        .filter(|aqi| aqi.is_finite())
        .ok_or_else(|| {
            AirQualityError::unavailable(PROVIDER_ID, format!("no current index ({})", data.aqi))
        })?;
    let index = aqi.round().clamp(0.0, f64::from(MAX_INDEX)) as u16;

    let pollutants = PollutantSet::backfill_from_index(
        index,
        value(&data.iaqi.pm25),
        value(&data.iaqi.pm10),
        value(&data.iaqi.no2),
        value(&data.iaqi.so2),
        value(&data.iaqi.co),
        value(&data.iaqi.o3),
    );

    // Station names look like "Peenya, Bangalore, India"; keep the first part.
    let station_city = data
        .city
        .and_then(|city| city.name)
        .and_then(|name| name.split(',').next().map(|part| part.trim().to_string()))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| REMOTE_CITY.to_string());

    Ok(NormalizedReading::new(
        index,
        pollutants,
        Location::new(*coordinate, Address::city_only(station_city)),
        Utc::now(),
        Provenance::Live,
        PROVIDER_ID,
    ))
}
