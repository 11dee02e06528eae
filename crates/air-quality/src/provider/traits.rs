//! Source adapter trait definitions.
//!
//! This module defines the core `SourceAdapter` trait that every live
//! air-quality provider implements.

use std::time::Duration;

use async_trait::async_trait;

use crate::errors::AirQualityError;
use crate::models::{Coordinate, NormalizedReading};

/// Trait for live air-quality providers.
///
/// Implement this trait to add a new external source. The pipeline tries
/// adapters in ascending [`priority`](Self::priority) order and takes the
/// first success.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use pureair_air_quality::provider::SourceAdapter;
///
/// struct MyStations {
///     token: String,
/// }
///
/// #[async_trait]
/// impl SourceAdapter for MyStations {
///     fn id(&self) -> &'static str {
///         "MY_STATIONS"
///     }
///
///     async fn fetch(
///         &self,
///         coordinate: &Coordinate,
///         timeout: Duration,
///     ) -> Result<NormalizedReading, AirQualityError> {
///         // ... call the provider and map into a NormalizedReading
///     }
/// }
/// ```
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Unique identifier for this provider.
    ///
    /// Should be a constant string like "WAQI" or "OPENAQ".
    /// Used for logging, diagnostics and the reading's `source` field.
    fn id(&self) -> &'static str;

    /// Provider priority for ordering.
    ///
    /// Lower values = higher priority. Default is 10.
    fn priority(&self) -> u8 {
        10
    }

    /// Fetch a reading for a coordinate.
    ///
    /// Every outbound call made here must complete within `timeout`;
    /// expiry returns [`AirQualityError::Timeout`]. The returned reading's
    /// address is only a hint (a station name at best). The pipeline
    /// replaces it with the geocoded address when one is available, and
    /// also sets the final provenance.
    async fn fetch(
        &self,
        coordinate: &Coordinate,
        timeout: Duration,
    ) -> Result<NormalizedReading, AirQualityError>;
}
