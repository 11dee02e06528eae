use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The six tracked pollutants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pollutant {
    Pm25,
    Pm10,
    No2,
    So2,
    Co,
    O3,
}

impl Pollutant {
    pub const ALL: [Pollutant; 6] = [
        Pollutant::Pm25,
        Pollutant::Pm10,
        Pollutant::No2,
        Pollutant::So2,
        Pollutant::Co,
        Pollutant::O3,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pm25 => "pm25",
            Self::Pm10 => "pm10",
            Self::No2 => "no2",
            Self::So2 => "so2",
            Self::Co => "co",
            Self::O3 => "o3",
        }
    }
}

impl fmt::Display for Pollutant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Pollutant {
    type Err = String;

    /// Parses provider parameter names, case-insensitively. Accepts `pm2.5` as PM2.5.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pm25" | "pm2.5" | "pm2_5" => Ok(Self::Pm25),
            "pm10" => Ok(Self::Pm10),
            "no2" => Ok(Self::No2),
            "so2" => Ok(Self::So2),
            "co" => Ok(Self::Co),
            "o3" => Ok(Self::O3),
            other => Err(format!("unknown pollutant: {other}")),
        }
    }
}

/// Concentrations for the six tracked pollutants, in source-defined units.
///
/// Every field is always populated. Sources that do not report a value
/// backfill it (see [`PollutantSet::backfill_from_index`]).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PollutantSet {
    pub pm25: f64,
    pub pm10: f64,
    pub no2: f64,
    pub so2: f64,
    pub co: f64,
    pub o3: f64,
}

/// PM2.5 estimate per index point when a source omits it.
pub const PM25_PER_INDEX: f64 = 0.58;

/// PM10 estimate per index point when a source omits it.
pub const PM10_PER_INDEX: f64 = 0.85;

impl PollutantSet {
    /// Build a set from optional per-pollutant values.
    ///
    /// PM2.5 and PM10 fall back to fixed ratios against `index`; the gases fall back to zero.
    /// Negative inputs are clamped to zero.
    pub fn backfill_from_index(
        index: u16,
        pm25: Option<f64>,
        pm10: Option<f64>,
        no2: Option<f64>,
        so2: Option<f64>,
        co: Option<f64>,
        o3: Option<f64>,
    ) -> Self {
        let index = f64::from(index);
        Self {
            pm25: non_negative(pm25).unwrap_or_else(|| (index * PM25_PER_INDEX).floor()),
            pm10: non_negative(pm10).unwrap_or_else(|| (index * PM10_PER_INDEX).floor()),
            no2: non_negative(no2).unwrap_or(0.0),
            so2: non_negative(so2).unwrap_or(0.0),
            co: non_negative(co).unwrap_or(0.0),
            o3: non_negative(o3).unwrap_or(0.0),
        }
    }

    pub fn get(&self, pollutant: Pollutant) -> f64 {
        match pollutant {
            Pollutant::Pm25 => self.pm25,
            Pollutant::Pm10 => self.pm10,
            Pollutant::No2 => self.no2,
            Pollutant::So2 => self.so2,
            Pollutant::Co => self.co,
            Pollutant::O3 => self.o3,
        }
    }
}

fn non_negative(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite()).map(|v| v.max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_provider_names() {
        assert_eq!("pm25".parse::<Pollutant>(), Ok(Pollutant::Pm25));
        assert_eq!("PM2.5".parse::<Pollutant>(), Ok(Pollutant::Pm25));
        assert_eq!("NO2".parse::<Pollutant>(), Ok(Pollutant::No2));
        assert!("bc".parse::<Pollutant>().is_err());
    }

    #[test]
    fn test_backfill_particulates_from_index() {
        let set = PollutantSet::backfill_from_index(100, None, None, Some(12.0), None, None, None);
        // 100.0 * 0.58 is just under 58 in f64
        assert_eq!(set.pm25, 57.0);
        assert_eq!(set.pm10, 85.0);
        assert_eq!(set.no2, 12.0);
        assert_eq!(set.so2, 0.0);
        assert_eq!(set.co, 0.0);
        assert_eq!(set.o3, 0.0);
    }

    #[test]
    fn test_backfill_keeps_reported_values_and_clamps_negatives() {
        let set = PollutantSet::backfill_from_index(
            42,
            Some(9.5),
            Some(-3.0),
            None,
            Some(f64::NAN),
            Some(0.4),
            Some(31.0),
        );
        assert_eq!(set.pm25, 9.5);
        assert_eq!(set.pm10, 0.0);
        assert_eq!(set.so2, 0.0);
        assert_eq!(set.co, 0.4);
        assert_eq!(set.get(Pollutant::O3), 31.0);
    }
}
