//! Concentration → index conversion by piecewise-linear interpolation over
//! EPA breakpoint tables.
//!
//! For a concentration `c` inside band `[c_low, c_high]`:
//!
//! ```text
//! index = round((i_high - i_low) / (c_high - c_low) * (c - c_low) + i_low)
//! ```
//!
//! Concentrations are truncated to the table's reporting precision before
//! band matching, so values between two bands (12.05 µg/m³ PM2.5) fall into
//! the lower band. Negative input clamps to 0, anything above the last band
//! clamps to [`MAX_INDEX`].

use crate::models::Pollutant;

/// Upper bound of the index scale.
pub const MAX_INDEX: u16 = 500;

/// One band of a breakpoint table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Breakpoint {
    pub c_low: f64,
    pub c_high: f64,
    pub i_low: u16,
    pub i_high: u16,
}

const fn bp(c_low: f64, c_high: f64, i_low: u16, i_high: u16) -> Breakpoint {
    Breakpoint {
        c_low,
        c_high,
        i_low,
        i_high,
    }
}

/// PM2.5, µg/m³ (24-hour).
pub const PM25_BREAKPOINTS: [Breakpoint; 7] = [
    bp(0.0, 12.0, 0, 50),
    bp(12.1, 35.4, 51, 100),
    bp(35.5, 55.4, 101, 150),
    bp(55.5, 150.4, 151, 200),
    bp(150.5, 250.4, 201, 300),
    bp(250.5, 350.4, 301, 400),
    bp(350.5, 500.4, 401, 500),
];

/// PM10, µg/m³ (24-hour).
pub const PM10_BREAKPOINTS: [Breakpoint; 7] = [
    bp(0.0, 54.0, 0, 50),
    bp(55.0, 154.0, 51, 100),
    bp(155.0, 254.0, 101, 150),
    bp(255.0, 354.0, 151, 200),
    bp(355.0, 424.0, 201, 300),
    bp(425.0, 504.0, 301, 400),
    bp(505.0, 604.0, 401, 500),
];

/// CO, ppm (8-hour).
pub const CO_BREAKPOINTS: [Breakpoint; 7] = [
    bp(0.0, 4.4, 0, 50),
    bp(4.5, 9.4, 51, 100),
    bp(9.5, 12.4, 101, 150),
    bp(12.5, 15.4, 151, 200),
    bp(15.5, 30.4, 201, 300),
    bp(30.5, 40.4, 301, 400),
    bp(40.5, 50.4, 401, 500),
];

/// SO2, ppb (1-hour).
pub const SO2_BREAKPOINTS: [Breakpoint; 7] = [
    bp(0.0, 35.0, 0, 50),
    bp(36.0, 75.0, 51, 100),
    bp(76.0, 185.0, 101, 150),
    bp(186.0, 304.0, 151, 200),
    bp(305.0, 604.0, 201, 300),
    bp(605.0, 804.0, 301, 400),
    bp(805.0, 1004.0, 401, 500),
];

/// NO2, ppb (1-hour).
pub const NO2_BREAKPOINTS: [Breakpoint; 7] = [
    bp(0.0, 53.0, 0, 50),
    bp(54.0, 100.0, 51, 100),
    bp(101.0, 360.0, 101, 150),
    bp(361.0, 649.0, 151, 200),
    bp(650.0, 1249.0, 201, 300),
    bp(1250.0, 1649.0, 301, 400),
    bp(1650.0, 2049.0, 401, 500),
];

/// Breakpoint table and its decimal precision for a pollutant.
///
/// O3 has no single table (8-hour and 1-hour scales overlap), so it has none here.
pub fn breakpoints(pollutant: Pollutant) -> Option<(&'static [Breakpoint], u8)> {
    match pollutant {
        Pollutant::Pm25 => Some((&PM25_BREAKPOINTS, 1)),
        Pollutant::Pm10 => Some((&PM10_BREAKPOINTS, 0)),
        Pollutant::Co => Some((&CO_BREAKPOINTS, 1)),
        Pollutant::So2 => Some((&SO2_BREAKPOINTS, 0)),
        Pollutant::No2 => Some((&NO2_BREAKPOINTS, 0)),
        Pollutant::O3 => None,
    }
}

/// Convert a concentration into an index value.
///
/// Returns `None` for pollutants without a breakpoint table.
pub fn compute(pollutant: Pollutant, concentration: f64) -> Option<u16> {
    let (table, precision) = breakpoints(pollutant)?;
    Some(interpolate(table, precision, concentration))
}

/// PM2.5 index; the common case for station data.
pub fn compute_pm25(concentration: f64) -> u16 {
    interpolate(&PM25_BREAKPOINTS, 1, concentration)
}

/// Interpolate `concentration` over an ascending table. First matching band wins.
pub fn interpolate(table: &[Breakpoint], precision: u8, concentration: f64) -> u16 {
    if !concentration.is_finite() || concentration <= 0.0 {
        return if concentration == f64::INFINITY {
            MAX_INDEX
        } else {
            0
        };
    }

    let c = truncate(concentration, precision);

    for band in table {
        if c >= band.c_low && c <= band.c_high {
            let slope = f64::from(band.i_high - band.i_low) / (band.c_high - band.c_low);
            let index = (slope * (c - band.c_low) + f64::from(band.i_low)).round();
            return (index as u16).min(MAX_INDEX);
        }
    }

    match table.last() {
        Some(last) if c > last.c_high => MAX_INDEX,
        _ => 0,
    }
}

fn truncate(value: f64, precision: u8) -> f64 {
    let scale = 10f64.powi(i32::from(precision));
    // The epsilon keeps exact decimal inputs like 35.4 from truncating to 35.3.
    (value * scale + 1e-9).floor() / scale
}
