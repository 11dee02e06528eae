//! Air-quality index calculation.
//!
//! - `calculator` - concentration → index via breakpoint interpolation
//! - `category` - index → health category

mod calculator;
mod category;

pub use calculator::{
    breakpoints, compute, compute_pm25, interpolate, Breakpoint, CO_BREAKPOINTS, MAX_INDEX,
    NO2_BREAKPOINTS, PM10_BREAKPOINTS, PM25_BREAKPOINTS, SO2_BREAKPOINTS,
};
pub use category::{category_for, AqiCategory};
