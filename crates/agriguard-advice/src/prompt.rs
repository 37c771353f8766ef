use agriguard_weather::ForecastMetrics;

/// Prompt for the agronomist model. Only the supplied figures are embedded;
/// the next-hour line appears only when the nowcast is known.
pub fn build_prompt(location: &str, metrics: &ForecastMetrics) -> String {
    let rain_next_hour = metrics
        .rain_next_hour_mm
        .map(|mm| {
            format!("- Rain in next hour: {mm:.1} mm (immediate threat if >0.5 mm)\n        ")
        })
        .unwrap_or_default();

    format!(
        "You are an expert agronomist advising smallholder farmers. Use ONLY the numbers below. \
Give 3–5 short, actionable bullet points for TODAY. Be specific and practical (what to do, when, and why). \
Prioritise by urgency. No preamble.

Location: {location}

Forecast (use these exact figures):
- Temperature: min {min:.1}°C, max {max:.1}°C, average {avg:.1}°C
- Total precipitation (next 24h): {rain:.1} mm
        {rain_next_hour}- Soil moisture (3–9 cm, 0–1 scale): {soil:.2} (low if <0.2, critical if <0.15)

Rules: Base advice only on the data above. Mention heat stress / shade if max temp is high; \
irrigation if soil is dry; drainage / delay fieldwork if rain is significant; immediate rain in next hour if >0.5 mm. \
One line per point, label briefly (e.g. \"Heat:\", \"Irrigation:\", \"Rain:\"). Reply with only the bullet points.",
        min = metrics.min_temp_c,
        max = metrics.max_temp_c,
        avg = metrics.avg_temp_c,
        rain = metrics.total_precip_mm,
        soil = metrics.soil_moisture_for_display(),
    )
}
