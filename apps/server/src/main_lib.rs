use std::sync::Arc;

use crate::config::Config;
use pureair_air_quality::AcquisitionPipeline;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub struct AppState {
    pub pipeline: Arc<AcquisitionPipeline>,
}

impl AppState {
    pub fn new(pipeline: AcquisitionPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

/// Install the global subscriber. `log` records from the core crate are
/// forwarded into it.
pub fn init_tracing() {
    let log_format = std::env::var("PUREAIR_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let air_quality = &config.air_quality;
    if air_quality.request_timeout.is_zero() {
        anyhow::bail!("PUREAIR_REQUEST_TIMEOUT_MS must be greater than zero");
    }
    if air_quality.waqi_token.is_none() {
        tracing::warn!("WAQI_API_TOKEN is not set; station-network lookups will be skipped");
    }

    let pipeline = AcquisitionPipeline::from_config(air_quality);
    tracing::info!(
        "Air-quality sources: {} (timeout {:?}, cache ttl {:?})",
        pipeline.adapter_ids().join(" -> "),
        air_quality.request_timeout,
        air_quality.cache_ttl
    );

    Ok(Arc::new(AppState::new(pipeline)))
}
