use std::{net::SocketAddr, time::Duration};

use pureair_air_quality::config::{
    AirQualityConfig, DEFAULT_NOMINATIM_URL, DEFAULT_OPENAQ_URL, DEFAULT_WAQI_URL,
};

pub struct Config {
    pub listen_addr: SocketAddr,
    pub cors_allow: Vec<String>,
    /// Whole-request budget for the HTTP layer.
    pub http_timeout: Duration,
    pub air_quality: AirQualityConfig,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let listen_addr: SocketAddr = std::env::var("PUREAIR_LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
            .parse()
            .expect("Invalid PUREAIR_LISTEN_ADDR");
        let cors_allow = std::env::var("PUREAIR_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let http_timeout_ms: u64 = std::env::var("PUREAIR_HTTP_TIMEOUT_MS")
            .unwrap_or_else(|_| "30000".into())
            .parse()
            .unwrap_or(30000);
        let request_timeout_ms: u64 = std::env::var("PUREAIR_REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|_| "10000".into())
            .parse()
            .unwrap_or(10000);
        let cache_ttl_secs: u64 = std::env::var("PUREAIR_CACHE_TTL_SECS")
            .unwrap_or_else(|_| "600".into())
            .parse()
            .unwrap_or(600);

        let air_quality = AirQualityConfig {
            request_timeout: Duration::from_millis(request_timeout_ms),
            cache_ttl: Duration::from_secs(cache_ttl_secs),
            waqi_url: std::env::var("PUREAIR_WAQI_URL").unwrap_or_else(|_| DEFAULT_WAQI_URL.into()),
            waqi_token: non_empty_var("WAQI_API_TOKEN"),
            openaq_url: std::env::var("PUREAIR_OPENAQ_URL")
                .unwrap_or_else(|_| DEFAULT_OPENAQ_URL.into()),
            openaq_api_key: non_empty_var("OPENAQ_API_KEY"),
            nominatim_url: std::env::var("PUREAIR_NOMINATIM_URL")
                .unwrap_or_else(|_| DEFAULT_NOMINATIM_URL.into()),
            ..AirQualityConfig::default()
        };

        Self {
            listen_addr,
            cors_allow,
            http_timeout: Duration::from_millis(http_timeout_ms),
            air_quality,
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
