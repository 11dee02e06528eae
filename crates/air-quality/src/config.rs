//! Configuration for the acquisition core.

use std::time::Duration;

use serde::Deserialize;

/// Default timeout window for each outbound call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Default cache time-to-live.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(600);

pub const DEFAULT_WAQI_URL: &str = "https://api.waqi.info";
pub const DEFAULT_OPENAQ_URL: &str = "https://api.openaq.org/v3";
pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

/// Settings for providers, cache and timeouts.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AirQualityConfig {
    /// Timeout window for each outbound call.
    #[serde(with = "duration_ms")]
    pub request_timeout: Duration,

    /// Age after which a cache entry is treated as a miss.
    #[serde(with = "duration_secs")]
    pub cache_ttl: Duration,

    pub waqi_url: String,
    /// WAQI feed token. The station-network adapter fails fast without it.
    pub waqi_token: Option<String>,

    pub openaq_url: String,
    /// Optional OpenAQ key, sent as `X-API-Key`.
    pub openaq_api_key: Option<String>,
    /// Nearest-station search radius in meters.
    pub openaq_radius_m: u32,
    /// Number of candidate stations requested from the directory.
    pub openaq_station_limit: u32,
    /// Measurements older than this are not "recent".
    #[serde(with = "duration_secs")]
    pub max_measurement_age: Duration,

    pub nominatim_url: String,

    /// User agent for outbound requests. Nominatim rejects anonymous clients.
    pub user_agent: String,
}

impl Default for AirQualityConfig {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            cache_ttl: DEFAULT_CACHE_TTL,
            waqi_url: DEFAULT_WAQI_URL.to_string(),
            waqi_token: None,
            openaq_url: DEFAULT_OPENAQ_URL.to_string(),
            openaq_api_key: None,
            openaq_radius_m: 25_000,
            openaq_station_limit: 5,
            max_measurement_age: Duration::from_secs(24 * 60 * 60),
            nominatim_url: DEFAULT_NOMINATIM_URL.to_string(),
            user_agent: concat!("pureair/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
