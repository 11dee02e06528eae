//! Air-quality data models
//!
//! - `types` - Type aliases for common identifiers (ProviderId)
//! - `coordinate` - Geographic coordinate and its quantized cache key
//! - `pollutant` - Pollutant identifiers and the six-field concentration set
//! - `reading` - Normalized reading, location/address and provenance

mod coordinate;
mod pollutant;
mod reading;
mod types;

pub use coordinate::{Coordinate, QuantizedCoordinate};
pub use pollutant::{Pollutant, PollutantSet, PM10_PER_INDEX, PM25_PER_INDEX};
pub use reading::{
    Address, Location, NormalizedReading, Provenance, REMOTE_CITY, UNKNOWN_CITY,
};
pub use types::ProviderId;
