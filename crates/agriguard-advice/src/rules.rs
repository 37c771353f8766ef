//! Deterministic rule table. No network, no credential.

use agriguard_weather::ForecastMetrics;
use async_trait::async_trait;

use crate::strategy::{AdviceOutcome, AdvisoryResult, AdvisoryStrategy};

/// Average temperature above which heat stress is flagged (°C)
pub const HEAT_AVG_TEMP_C: f64 = 32.0;
/// Minimum soil moisture below which irrigation is advised (m³/m³)
pub const CRITICAL_SOIL_MOISTURE: f64 = 0.15;
/// Daily precipitation above which flooding is flagged (mm)
pub const FLOOD_PRECIP_MM: f64 = 10.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct RuleAdvisor;

impl RuleAdvisor {
    pub fn new() -> Self {
        Self
    }

    /// Every triggered rule in fixed order: heat, irrigation, flood.
    pub fn evaluate(&self, metrics: &ForecastMetrics) -> AdvisoryResult {
        let mut lines = Vec::new();

        if metrics.avg_temp_c > HEAT_AVG_TEMP_C {
            lines.push(format!(
                "Heat: average {:.1}°C today. Shade livestock and seedlings, water early, avoid midday fieldwork.",
                metrics.avg_temp_c
            ));
        }

        // unknown soil moisture never triggers irrigation
        if let Some(soil) = metrics.min_soil_moisture {
            if soil < CRITICAL_SOIL_MOISTURE {
                lines.push(format!(
                    "Irrigation: soil moisture down to {:.2}. Irrigate in the early morning or evening.",
                    soil
                ));
            }
        }

        if metrics.total_precip_mm > FLOOD_PRECIP_MM {
            lines.push(format!(
                "Flood: {:.1} mm of rain expected. Clear drainage channels and delay fieldwork.",
                metrics.total_precip_mm
            ));
        }

        if lines.is_empty() {
            lines.push("Stable: no weather threats today. Continue routine field work.".to_string());
        }

        AdvisoryResult::new(lines)
    }
}

#[async_trait]
impl AdvisoryStrategy for RuleAdvisor {
    fn name(&self) -> &'static str {
        "rules"
    }

    async fn advise(&self, _location: &str, metrics: &ForecastMetrics) -> AdviceOutcome {
        AdviceOutcome::Advice(self.evaluate(metrics))
    }
}
