//! Derived metrics: the six numbers every advisory is based on.

use serde::Serialize;

use crate::types::{ForecastError, HourlySeries, RawForecast};

/// Hourly samples considered (today's horizon)
pub const HOURLY_WINDOW: usize = 24;
/// Quarter-hour samples that make up the next hour
pub const QUARTER_HOURS_PER_HOUR: usize = 4;

/// Summary of today's forecast.
///
/// Only built by [`derive_metrics`], so every instance has all three
/// temperature figures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastMetrics {
    pub avg_temp_c: f64,
    pub min_temp_c: f64,
    pub max_temp_c: f64,
    pub total_precip_mm: f64,
    /// `None` when the provider has no soil data for the location
    pub min_soil_moisture: Option<f64>,
    /// `None` when the nowcast was unavailable or incomplete
    pub rain_next_hour_mm: Option<f64>,
}

impl ForecastMetrics {
    /// Soil moisture as rendered in prompts and reports; unknown shows as 0.00.
    pub fn soil_moisture_for_display(&self) -> f64 {
        self.min_soil_moisture.unwrap_or(0.0)
    }
}

impl RawForecast {
    pub fn metrics(&self) -> Result<ForecastMetrics, ForecastError> {
        derive_metrics(&self.hourly, self.quarter_hour_precipitation_mm.as_deref())
    }
}

/// Reduce the first [`HOURLY_WINDOW`] hourly samples (and the nowcast, if
/// any) to [`ForecastMetrics`]. Null samples are skipped.
pub fn derive_metrics(
    hourly: &HourlySeries,
    quarter_hour: Option<&[Option<f64>]>,
) -> Result<ForecastMetrics, ForecastError> {
    let temps: Vec<f64> = window(&hourly.temperature_c).collect();
    if temps.is_empty() {
        return Err(ForecastError::MissingSeries("temperature_2m"));
    }

    let min_temp_c = temps.iter().copied().fold(f64::INFINITY, f64::min);
    let max_temp_c = temps.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let avg_temp_c = temps.iter().sum::<f64>() / temps.len() as f64;

    let total_precip_mm = hourly
        .precipitation_mm
        .as_deref()
        .map(|series| window(series).sum::<f64>())
        .unwrap_or(0.0);

    let min_soil_moisture = hourly
        .soil_moisture
        .as_deref()
        .and_then(|series| window(series).reduce(f64::min));

    Ok(ForecastMetrics {
        avg_temp_c,
        min_temp_c,
        max_temp_c,
        total_precip_mm,
        min_soil_moisture,
        rain_next_hour_mm: quarter_hour.and_then(next_hour_precipitation),
    })
}

/// Sum of the first four quarter-hour samples; unknown if any is missing.
pub fn next_hour_precipitation(samples: &[Option<f64>]) -> Option<f64> {
    if samples.len() < QUARTER_HOURS_PER_HOUR {
        return None;
    }
    samples[..QUARTER_HOURS_PER_HOUR]
        .iter()
        .copied()
        .sum::<Option<f64>>()
}

fn window(series: &[Option<f64>]) -> impl Iterator<Item = f64> + '_ {
    series
        .iter()
        .take(HOURLY_WINDOW)
        .filter_map(|v| *v)
        .filter(|v| v.is_finite())
}
