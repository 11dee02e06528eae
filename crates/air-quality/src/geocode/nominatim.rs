//! OpenStreetMap Nominatim geocoder.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::Deserialize;

use super::GeocodeEnricher;
use crate::config::AirQualityConfig;
use crate::errors::AirQualityError;
use crate::http::{build_client, get_json};
use crate::models::{Address, Coordinate, Location, UNKNOWN_CITY};

const PROVIDER_ID: &str = "NOMINATIM";

/// Reverse lookup response. Nominatim answers `{"error": ...}` with a 200 when
/// a coordinate cannot be resolved (open sea).
#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    address: Option<AddressDetails>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    address: Option<AddressDetails>,
}

#[derive(Debug, Default, Deserialize)]
struct AddressDetails {
    road: Option<String>,
    suburb: Option<String>,
    neighbourhood: Option<String>,
    residential: Option<String>,
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    house_number: Option<String>,
}

impl AddressDetails {
    fn locality(&self) -> Option<String> {
        self.city
            .clone()
            .or_else(|| self.town.clone())
            .or_else(|| self.village.clone())
    }

    fn into_address(self, fallback_city: &str) -> Address {
        let city = self.locality().unwrap_or_else(|| fallback_city.to_string());
        Address {
            suburb: self
                .suburb
                .clone()
                .or_else(|| self.neighbourhood.clone())
                .or(self.residential),
            neighbourhood: self.neighbourhood.or(self.suburb),
            road: self.road,
            city,
            house_number: self.house_number,
        }
    }
}

/// Nominatim-backed [`GeocodeEnricher`].
pub struct NominatimGeocoder {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl NominatimGeocoder {
    pub fn new(config: &AirQualityConfig) -> Self {
        Self {
            client: build_client(&config.user_agent, config.request_timeout),
            base_url: config.nominatim_url.trim_end_matches('/').to_string(),
            timeout: config.request_timeout,
        }
    }
}

#[async_trait]
impl GeocodeEnricher for NominatimGeocoder {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn reverse(&self, coordinate: &Coordinate) -> Result<Address, AirQualityError> {
        let request = self
            .client
            .get(format!("{}/reverse", self.base_url))
            .query(&[
                ("format", "json".to_string()),
                ("lat", coordinate.lat.to_string()),
                ("lon", coordinate.lon.to_string()),
                ("zoom", "18".to_string()),
                ("addressdetails", "1".to_string()),
            ]);

        let response: ReverseResponse = get_json(PROVIDER_ID, request, self.timeout)
            .await
            .map_err(|e| AirQualityError::EnrichmentFailed(e.to_string()))?;

        map_reverse(response)
    }

    async fn search(&self, query: &str) -> Result<Option<Location>, AirQualityError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(None);
        }

        debug!("Searching '{}' for '{}'", PROVIDER_ID, query);

        let request = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[
                ("format", "json"),
                ("q", query),
                ("limit", "1"),
                ("addressdetails", "1"),
            ]);

        let hits: Vec<SearchHit> = get_json(PROVIDER_ID, request, self.timeout).await?;
        Ok(hits.into_iter().next().and_then(map_search_hit))
    }
}

fn map_reverse(response: ReverseResponse) -> Result<Address, AirQualityError> {
    if let Some(error) = response.error {
        return Err(AirQualityError::EnrichmentFailed(error));
    }
    let details = response
        .address
        .ok_or_else(|| AirQualityError::EnrichmentFailed("no address in response".to_string()))?;
    Ok(details.into_address(UNKNOWN_CITY))
}

fn map_search_hit(hit: SearchHit) -> Option<Location> {
    let lat = hit.lat.parse::<f64>().ok()?;
    let lon = hit.lon.parse::<f64>().ok()?;

    let display_city = hit
        .display_name
        .as_deref()
        .and_then(|name| name.split(',').next())
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or("Unknown Area")
        .to_string();

    let address = hit
        .address
        .unwrap_or_default()
        .into_address(&display_city);

    Some(Location::new(Coordinate::new(lat, lon), address))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_reverse_full_address() {
        let response: ReverseResponse = serde_json::from_str(
            r#"{
                "place_id": 1,
                "display_name": "12, MG Road, Shanthala Nagar, Bengaluru",
                "address": {
                    "house_number": "12",
                    "road": "MG Road",
                    "neighbourhood": "Shanthala Nagar",
                    "suburb": "Ashok Nagar",
                    "city": "Bengaluru",
                    "country": "India"
                }
            }"#,
        )
        .expect("response should deserialize");

        let address = map_reverse(response).expect("address");
        assert_eq!(address.road.as_deref(), Some("MG Road"));
        assert_eq!(address.suburb.as_deref(), Some("Ashok Nagar"));
        assert_eq!(address.neighbourhood.as_deref(), Some("Shanthala Nagar"));
        assert_eq!(address.city, "Bengaluru");
        assert_eq!(address.house_number.as_deref(), Some("12"));
    }

    #[test]
    fn test_map_reverse_falls_back_through_locality_fields() {
        let response: ReverseResponse = serde_json::from_str(
            r#"{"address": {"residential": "Green Acres", "village": "Hoskote"}}"#,
        )
        .expect("response should deserialize");

        let address = map_reverse(response).expect("address");
        assert_eq!(address.suburb.as_deref(), Some("Green Acres"));
        assert_eq!(address.neighbourhood, None);
        assert_eq!(address.city, "Hoskote");
    }

    #[test]
    fn test_map_reverse_without_locality_uses_placeholder() {
        let response: ReverseResponse =
            serde_json::from_str(r#"{"address": {"road": "NH 48"}}"#)
                .expect("response should deserialize");

        let address = map_reverse(response).expect("address");
        assert_eq!(address.city, UNKNOWN_CITY);
    }

    #[test]
    fn test_map_reverse_error_payload() {
        let response: ReverseResponse =
            serde_json::from_str(r#"{"error": "Unable to geocode"}"#)
                .expect("response should deserialize");

        let error = map_reverse(response).expect_err("should fail");
        assert!(matches!(error, AirQualityError::EnrichmentFailed(_)));
        assert!(error.is_non_fatal());
    }

    #[test]
    fn test_map_search_hit() {
        let hits: Vec<SearchHit> = serde_json::from_str(
            r#"[{
                "lat": "48.8588897",
                "lon": "2.3200410",
                "display_name": "Paris, Ile-de-France, France",
                "address": {"suburb": "Paris 1er", "city": "Paris"}
            }]"#,
        )
        .expect("hits should deserialize");

        let location = hits
            .into_iter()
            .next()
            .and_then(map_search_hit)
            .expect("location");
        assert!((location.coordinate.lat - 48.8588897).abs() < 1e-9);
        assert!((location.coordinate.lon - 2.3200410).abs() < 1e-9);
        assert_eq!(location.address.city, "Paris");
        assert_eq!(location.address.suburb.as_deref(), Some("Paris 1er"));
    }

    #[test]
    fn test_map_search_hit_uses_display_name_when_no_locality() {
        let hit: SearchHit = serde_json::from_str(
            r#"{"lat": "27.9881", "lon": "86.9250", "display_name": "Mount Everest, Khumbu, Nepal", "address": {}}"#,
        )
        .expect("hit should deserialize");

        let location = map_search_hit(hit).expect("location");
        assert_eq!(location.address.city, "Mount Everest");
    }

    #[test]
    fn test_map_search_hit_rejects_bad_coordinates() {
        let hit: SearchHit =
            serde_json::from_str(r#"{"lat": "north", "lon": "2.32"}"#).expect("hit");
        assert!(map_search_hit(hit).is_none());
    }
}
