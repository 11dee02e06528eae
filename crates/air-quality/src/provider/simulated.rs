//! Deterministic simulated source.
//!
//! Used by the pipeline when every live adapter failed. Values are derived
//! from the coordinate and the local hour of day, so repeated calls for the
//! same place within the same hour agree. No I/O; cannot fail.

use chrono::{DateTime, Local, Timelike, Utc};

use crate::models::{
    Address, Coordinate, Location, NormalizedReading, PollutantSet, Provenance, REMOTE_CITY,
    PM10_PER_INDEX, PM25_PER_INDEX,
};

/// Provider ID constant
pub const PROVIDER_ID: &str = "SIMULATED";

/// Lowest index the simulation can produce.
pub const MIN_SIMULATED_INDEX: u16 = 15;

/// Highest index the simulation can produce.
pub const MAX_SIMULATED_INDEX: u16 = 235;

/// Synthesizes readings without any external dependency.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedSource;

impl SimulatedSource {
    pub fn new() -> Self {
        Self
    }

    /// Synthesize a reading for the current local hour.
    pub fn reading(&self, coordinate: &Coordinate) -> NormalizedReading {
        self.reading_at(coordinate, Local::now().hour(), Utc::now())
    }

    /// Synthesize a reading for an explicit hour of day.
    pub fn reading_at(
        &self,
        coordinate: &Coordinate,
        hour: u32,
        retrieved_at: DateTime<Utc>,
    ) -> NormalizedReading {
        let (index, pollutants) = simulate_at(coordinate, hour);
        NormalizedReading::new(
            index,
            pollutants,
            Location::new(*coordinate, Address::city_only(REMOTE_CITY)),
            retrieved_at,
            Provenance::Simulated,
            PROVIDER_ID,
        )
    }
}

/// Index and pollutant values for a coordinate at `hour` (0-23).
pub fn simulate_at(coordinate: &Coordinate, hour: u32) -> (u16, PollutantSet) {
    let seed = coordinate.lat * 100.0 + coordinate.lon * 100.0;

    let raw = ((seed + f64::from(hour)).sin().abs() * 220.0 + 15.0).floor();
    let index = raw.clamp(
        f64::from(MIN_SIMULATED_INDEX),
        f64::from(MAX_SIMULATED_INDEX),
    ) as u16;
    let idx = f64::from(index);

    let co = ((seed / 100.0).tan().abs() * 1.5 + 0.2) * 100.0;

    let pollutants = PollutantSet {
        pm25: (idx * PM25_PER_INDEX).floor(),
        pm10: (idx * PM10_PER_INDEX).floor(),
        no2: (seed.cos().abs() * 50.0 + 10.0).floor(),
        so2: (seed.sin().abs() * 15.0 + 2.0).floor(),
        co: co.round() / 100.0,
        o3: ((seed * 2.0).sin().abs() * 80.0 + 5.0).floor(),
    };

    (index, pollutants)
}
