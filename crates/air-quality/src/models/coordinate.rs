use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of quantization steps per degree used for cache slots (2 decimal places).
const QUANTA_PER_DEGREE: f64 = 100.0;

/// Geographic coordinate in decimal degrees (WGS84).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Whether latitude is within [-90, 90] and longitude within [-180, 180].
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    /// Quantize to 2 decimal places.
    ///
    /// Readings within ~1.1km share a cache slot.
    pub fn quantized(&self) -> QuantizedCoordinate {
        QuantizedCoordinate {
            lat: quantize(self.lat),
            lon: quantize(self.lon),
        }
    }
}

fn quantize(degrees: f64) -> i64 {
    (degrees * QUANTA_PER_DEGREE).round() as i64
}

/// A coordinate rounded to hundredths of a degree, used as a cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QuantizedCoordinate {
    lat: i64,
    lon: i64,
}

impl fmt::Display for QuantizedCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.2}_{:.2}",
            self.lat as f64 / QUANTA_PER_DEGREE,
            self.lon as f64 / QUANTA_PER_DEGREE
        )
    }
}
