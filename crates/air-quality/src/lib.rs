//! PureAir Air Quality Crate
//!
//! This crate turns a geographic coordinate into a normalized air-quality
//! reading. It never leaves the caller without a reading: when every live
//! source fails, a deterministic simulated reading is returned instead.
//!
//! # Overview
//!
//! The air-quality crate supports:
//! - Multiple live sources: WAQI station network, OpenAQ sensor directory
//! - EPA breakpoint interpolation for PM2.5, PM10, CO, SO2 and NO2
//! - A TTL cache keyed by quantized coordinate
//! - Address enrichment and free-text location search via Nominatim
//! - A 12-hour synthetic forecast from a single index
//!
//! # Architecture
//!
//! ```text
//!                         +---------------------+
//!   (lat, lon) ---------> | AcquisitionPipeline |
//!                         +---------------------+
//!                                   |
//!                                   v
//!                          +------------------+
//!                          |   CacheStore     |  (hit => done)
//!                          +------------------+
//!                                   | miss
//!                   +---------------+---------------+
//!                   v                               v
//!         +------------------+            +------------------+
//!         |  SourceAdapter   |  (WAQI,    |  GeocodeEnricher |  (concurrent)
//!         |  chain + timeout |   OpenAQ)  +------------------+
//!         +------------------+                      |
//!                   | all failed                    |
//!                   v                               |
//!         +------------------+                      |
//!         | SimulatedSource  |                      |
//!         +------------------+                      |
//!                   +---------------+---------------+
//!                                   v
//!                        +--------------------+
//!                        | NormalizedReading  |  (cached, returned)
//!                        +--------------------+
//! ```
//!
//! # Core Types
//!
//! - [`AcquisitionPipeline`] - Entry point: readings, forecasts, search
//! - [`NormalizedReading`] - Index, category, pollutants, location, provenance
//! - [`Coordinate`] - WGS84 latitude/longitude
//! - [`ForecastPoint`] - One projected hour
//! - [`AirQualityConfig`] - Provider URLs, credentials, timeout and TTL

pub mod cache;
pub mod config;
pub mod errors;
pub mod forecast;
pub mod geocode;
mod http;
pub mod index;
pub mod models;
pub mod pipeline;
pub mod provider;

// Re-export all public types from models
pub use models::{
    Address, Coordinate, Location, NormalizedReading, Pollutant, PollutantSet, Provenance,
    ProviderId, QuantizedCoordinate, REMOTE_CITY, UNKNOWN_CITY,
};

pub use cache::{CacheEntry, CacheStore, ReadingCache, SharedCache};
pub use config::AirQualityConfig;
pub use errors::AirQualityError;
pub use forecast::{ForecastPoint, ForecastProjector};
pub use geocode::{GeocodeEnricher, NominatimGeocoder};
pub use index::{category_for, AqiCategory};
pub use pipeline::{AcquisitionDiagnostics, AcquisitionPipeline, AttemptOutcome};

// Re-export provider types
pub use provider::openaq::OpenAqProvider;
pub use provider::simulated::SimulatedSource;
pub use provider::waqi::WaqiProvider;
pub use provider::SourceAdapter;
