//! Address enrichment and free-text location search.
//!
//! Enrichment is best-effort: the pipeline never fails a reading because
//! the geocoder did.

mod nominatim;

use async_trait::async_trait;

use crate::errors::AirQualityError;
use crate::models::{Address, Coordinate, Location};

pub use nominatim::NominatimGeocoder;

/// Reverse and forward geocoding.
#[async_trait]
pub trait GeocodeEnricher: Send + Sync {
    /// Unique identifier, used in logs and diagnostics.
    fn id(&self) -> &'static str;

    /// Resolve a coordinate to an address breakdown.
    async fn reverse(&self, coordinate: &Coordinate) -> Result<Address, AirQualityError>;

    /// Look up the best match for a free-text query.
    ///
    /// `Ok(None)` means the provider answered with no match.
    async fn search(&self, query: &str) -> Result<Option<Location>, AirQualityError>;
}
