//! Error types for the air-quality crate.
//!
//! Every adapter-level failure is a value of [`AirQualityError`]. The
//! acquisition pipeline catches all of them and moves on to the next source,
//! so none of these ever reach a caller of
//! [`AcquisitionPipeline::get_reading`](crate::pipeline::AcquisitionPipeline::get_reading).

use thiserror::Error;

/// Errors that can occur while acquiring an air-quality reading.
#[derive(Error, Debug)]
pub enum AirQualityError {
    /// The provider could not be reached, answered with a non-2xx status,
    /// or returned a payload we could not use.
    #[error("Source unavailable: {provider} - {message}")]
    SourceUnavailable {
        /// The provider that failed
        provider: String,
        /// What went wrong
        message: String,
    },

    /// The timeout window for an outbound call expired and the call was cancelled.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// A credential required by the provider is not configured.
    #[error("Provider not configured: {provider}")]
    NotConfigured {
        /// The provider missing its credential
        provider: String,
    },

    /// The sensor directory has no station within the search radius.
    #[error("No station nearby: {provider}")]
    NoStationNearby {
        /// The provider that was searched
        provider: String,
    },

    /// A station was found but it has no usable recent measurement.
    #[error("No recent measurement: {provider} station {station}")]
    NoRecentMeasurement {
        /// The provider that was queried
        provider: String,
        /// Provider-specific station identifier
        station: String,
    },

    /// Geocoding failed. Never fatal: the reading keeps a placeholder address.
    #[error("Enrichment failed: {0}")]
    EnrichmentFailed(String),

    /// The cache backend failed. Never fatal: the pipeline runs uncached.
    #[error("Cache unavailable: {0}")]
    CacheUnavailable(String),
}

impl AirQualityError {
    /// Build a [`SourceUnavailable`](Self::SourceUnavailable) error.
    pub fn unavailable(provider: &str, message: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            provider: provider.to_string(),
            message: message.into(),
        }
    }

    /// Whether this error means the provider itself could not serve the request
    /// (network failure, timeout, bad status, missing credential).
    pub fn is_source_unavailable(&self) -> bool {
        matches!(
            self,
            Self::SourceUnavailable { .. }
                | Self::Timeout { .. }
                | Self::NotConfigured { .. }
        )
    }

    /// Whether this error only degrades a reading instead of failing an attempt.
    pub fn is_non_fatal(&self) -> bool {
        matches!(self, Self::EnrichmentFailed(_) | Self::CacheUnavailable(_))
    }
}
