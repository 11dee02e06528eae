//! OpenAQ v3 sensor-directory provider.
//!
//! Two calls per fetch:
//! 1. `GET /locations?coordinates={lat},{lon}&radius=..&limit=..` to find the
//!    nearest station within the search radius.
//! 2. `GET /locations/{id}/latest` for that station's latest measurements.
//!
//! The index is computed locally from PM2.5 (preferred) or PM10.

mod models;

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use reqwest::Client;

use self::models::{LatestResponse, LocationsResponse, OpenAqLocation};
use crate::config::AirQualityConfig;
use crate::errors::AirQualityError;
use crate::http::{build_client, get_json};
use crate::index;
use crate::models::{
    Address, Coordinate, Location, NormalizedReading, Pollutant, PollutantSet, Provenance,
    REMOTE_CITY,
};
use crate::provider::SourceAdapter;

/// Provider ID constant
pub const PROVIDER_ID: &str = "OPENAQ";

/// Index used when a station reports neither PM2.5 nor PM10.
const DEFAULT_INDEX: u16 = 50;

/// OpenAQ sensor-directory adapter.
pub struct OpenAqProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    radius_m: u32,
    station_limit: u32,
    max_measurement_age: Duration,
}

impl OpenAqProvider {
    pub fn new(config: &AirQualityConfig) -> Self {
        Self {
            client: build_client(&config.user_agent, config.request_timeout),
            base_url: config.openaq_url.trim_end_matches('/').to_string(),
            api_key: config
                .openaq_api_key
                .clone()
                .filter(|key| !key.trim().is_empty()),
            radius_m: config.openaq_radius_m,
            station_limit: config.openaq_station_limit,
            max_measurement_age: config.max_measurement_age,
        }
    }

    fn get(&self, url: String) -> reqwest::RequestBuilder {
        let request = self.client.get(url);
        match &self.api_key {
            Some(key) => request.header("X-API-Key", key),
            None => request,
        }
    }
}

#[async_trait]
impl SourceAdapter for OpenAqProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn priority(&self) -> u8 {
        2
    }

    async fn fetch(
        &self,
        coordinate: &Coordinate,
        timeout: Duration,
    ) -> Result<NormalizedReading, AirQualityError> {
        let request = self
            .get(format!("{}/locations", self.base_url))
            .query(&[
                ("coordinates", format!("{},{}", coordinate.lat, coordinate.lon)),
                ("radius", self.radius_m.to_string()),
                ("limit", self.station_limit.to_string()),
            ]);
        let locations: LocationsResponse = get_json(PROVIDER_ID, request, timeout).await?;

        let station = nearest_station(locations.results).ok_or_else(|| {
            AirQualityError::NoStationNearby {
                provider: PROVIDER_ID.to_string(),
            }
        })?;
        debug!(
            "Nearest '{}' station for {:?}: {} ({:?})",
            PROVIDER_ID, coordinate, station.id, station.name
        );

        let request = self.get(format!("{}/locations/{}/latest", self.base_url, station.id));
        let latest: LatestResponse = get_json(PROVIDER_ID, request, timeout).await?;

        map_latest(
            coordinate,
            &station,
            latest,
            Utc::now(),
            self.max_measurement_age,
        )
    }
}

/// Closest station by reported distance; directory order breaks ties.
fn nearest_station(stations: Vec<OpenAqLocation>) -> Option<OpenAqLocation> {
    stations.into_iter().min_by(|a, b| {
        a.distance
            .unwrap_or(f64::MAX)
            .total_cmp(&b.distance.unwrap_or(f64::MAX))
    })
}

fn map_latest(
    coordinate: &Coordinate,
    station: &OpenAqLocation,
    latest: LatestResponse,
    now: DateTime<Utc>,
    max_age: Duration,
) -> Result<NormalizedReading, AirQualityError> {
    let max_age =
        chrono::Duration::from_std(max_age).unwrap_or_else(|_| chrono::Duration::days(36_500));
    let mut values: HashMap<Pollutant, f64> = HashMap::new();

    for measurement in latest.results {
        let Some(value) = measurement.value.filter(|v| v.is_finite() && *v >= 0.0) else {
            continue;
        };

        let measured_at = measurement
            .datetime
            .as_ref()
            .and_then(|time| DateTime::parse_from_rfc3339(&time.utc).ok())
            .map(|time| time.with_timezone(&Utc));
        if matches!(measured_at, Some(at) if now - at > max_age) {
            continue;
        }

        let parameter = measurement.parameter.map(|p| p.name).or_else(|| {
            let sensor_id = measurement.sensors_id?;
            station
                .sensors
                .iter()
                .find(|sensor| sensor.id == sensor_id)
                .map(|sensor| sensor.parameter.name.clone())
        });
        let Some(pollutant) = parameter.and_then(|name| name.parse::<Pollutant>().ok()) else {
            continue;
        };

        values.entry(pollutant).or_insert(value);
    }

    if values.is_empty() {
        return Err(AirQualityError::NoRecentMeasurement {
            provider: PROVIDER_ID.to_string(),
            station: station.id.to_string(),
        });
    }

    let pm25 = values.get(&Pollutant::Pm25).copied().filter(|v| *v > 0.0);
    let pm10 = values.get(&Pollutant::Pm10).copied().filter(|v| *v > 0.0);

    let index = match (pm25, pm10) {
        (Some(pm25), _) => index::compute_pm25(pm25),
        (None, Some(pm10)) => index::compute(Pollutant::Pm10, pm10).unwrap_or(DEFAULT_INDEX),
        (None, None) => DEFAULT_INDEX,
    };

    let pollutants = PollutantSet::backfill_from_index(
        index,
        pm25,
        pm10,
        values.get(&Pollutant::No2).copied(),
        values.get(&Pollutant::So2).copied(),
        values.get(&Pollutant::Co).copied(),
        values.get(&Pollutant::O3).copied(),
    );

    let station_city = station
        .name
        .clone()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| REMOTE_CITY.to_string());

    Ok(NormalizedReading::new(
        index,
        pollutants,
        Location::new(*coordinate, Address::city_only(station_city)),
        now,
        Provenance::Live,
        PROVIDER_ID,
    ))
}
