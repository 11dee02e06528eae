//! Short-horizon synthetic forecast.
//!
//! Projects the next 12 hours from a single base index: a slow sine swing
//! plus a fixed bump during the morning (08-10h) and evening (17-20h) rush.
//! Pure and synchronous; the only input besides the base index is the local
//! hour of day.

use chrono::{Local, Timelike};
use serde::Serialize;

use crate::index::{category_for, AqiCategory};

/// Number of hourly points in a forecast.
pub const FORECAST_HOURS: u8 = 12;

/// Floor applied to every projected index.
pub const MIN_PROJECTED_INDEX: i32 = 10;

const SWING_AMPLITUDE: f64 = 20.0;
const RUSH_HOUR_BONUS: f64 = 40.0;

/// One projected hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPoint {
    /// Hours ahead of now, 1..=12.
    pub hour_offset: u8,
    /// Wall-clock hour of day (0-23) the point falls on.
    pub hour: u32,
    pub projected_index: i32,
    pub category: AqiCategory,
}

impl ForecastPoint {
    pub fn category_label(&self) -> &'static str {
        self.category.label()
    }
}

/// Derives forecast curves from a base index.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForecastProjector;

impl ForecastProjector {
    pub fn new() -> Self {
        Self
    }

    /// Project from the current local hour.
    pub fn project(&self, base_index: i32) -> Vec<ForecastPoint> {
        self.project_at(base_index, Local::now().hour())
    }

    /// Project from an explicit current hour of day.
    pub fn project_at(&self, base_index: i32, current_hour: u32) -> Vec<ForecastPoint> {
        (1..=FORECAST_HOURS)
            .map(|offset| {
                let hour = (current_hour + u32::from(offset)) % 24;

                let mut variance = (f64::from(offset) / 2.0).sin() * SWING_AMPLITUDE;
                if is_rush_hour(hour) {
                    variance += RUSH_HOUR_BONUS;
                }

                let projected = (f64::from(base_index) + variance).floor() as i32;
                let projected_index = projected.max(MIN_PROJECTED_INDEX);

                ForecastPoint {
                    hour_offset: offset,
                    hour,
                    projected_index,
                    category: category_for(projected_index.unsigned_abs()),
                }
            })
            .collect()
    }
}

fn is_rush_hour(hour: u32) -> bool {
    (8..=10).contains(&hour) || (17..=20).contains(&hour)
}
