//! Report block printed to the console and used as the SMS body source.

use std::fmt;

use agriguard_advice::AdviceOutcome;
use agriguard_core::AppError;
use chrono::{Local, NaiveDateTime};

const RULE_WIDTH: usize = 45;

pub const UNCONFIGURED_HINT: &str =
    "⚠️ Set HF_TOKEN (or HUGGING_FACE_HUB_TOKEN) in .env or environment and retry.";

/// Lines to show for a strategy outcome.
pub fn advice_lines(outcome: &AdviceOutcome) -> Vec<String> {
    match outcome {
        AdviceOutcome::Advice(result) => result.lines().to_vec(),
        AdviceOutcome::Unconfigured => vec![UNCONFIGURED_HINT.to_string()],
        AdviceOutcome::Failed(reason) | AdviceOutcome::Unusable(reason) => {
            vec![AppError::Advice(reason.clone()).user_message()]
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    display_name: String,
    generated_at: NaiveDateTime,
    lines: Vec<String>,
}

impl Report {
    /// Report stamped with the current local time.
    pub fn new(display_name: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            display_name: display_name.into(),
            generated_at: Local::now().naive_local(),
            lines,
        }
    }

    pub fn with_generated_at(mut self, generated_at: NaiveDateTime) -> Self {
        self.generated_at = generated_at;
        self
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Plain text for translation and SMS: one line per advisory item.
    pub fn message_body(&self) -> String {
        self.lines.join("\n")
    }

    pub fn render(&self) -> String {
        let heavy = "=".repeat(RULE_WIDTH);
        let light = "-".repeat(RULE_WIDTH);

        let mut out = String::new();
        out.push('\n');
        out.push_str(&heavy);
        out.push('\n');
        out.push_str(&format!(
            "🌾 AGRIGUARD: {} — TODAY'S ADVICE\n",
            self.display_name.to_uppercase()
        ));
        out.push_str(&format!(
            "Generated: {}\n",
            self.generated_at.format("%Y-%m-%d %H:%M")
        ));
        out.push_str(&light);
        out.push('\n');
        for line in &self.lines {
            out.push_str("• ");
            out.push_str(line);
            out.push('\n');
        }
        out.push_str(&heavy);
        out.push_str("\n\n");
        out
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agriguard_advice::AdvisoryResult;
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 16)
            .and_then(|d| d.and_hms_opt(6, 30, 0))
            .unwrap()
    }

    #[test]
    fn test_render_block() {
        let report = Report::new(
            "Lodwar",
            vec!["Heat: shade livestock".into(), "Irrigation: water at dusk".into()],
        )
        .with_generated_at(at());

        let heavy = "=".repeat(45);
        let light = "-".repeat(45);
        let expected = format!(
            "\n{heavy}\n🌾 AGRIGUARD: LODWAR — TODAY'S ADVICE\nGenerated: 2026-10-16 06:30\n{light}\n\
• Heat: shade livestock\n• Irrigation: water at dusk\n{heavy}\n\n"
        );
        assert_eq!(report.render(), expected);
        assert_eq!(report.to_string(), expected);
    }

    #[test]
    fn test_coordinate_title() {
        let report = Report::new("3.12°N, 35.60°E", vec![]).with_generated_at(at());
        assert!(report.render().contains("🌾 AGRIGUARD: 3.12°N, 35.60°E — TODAY'S ADVICE"));
    }

    #[test]
    fn test_message_body_joins_lines() {
        let report = Report::new("x", vec!["a".into(), "b".into()]);
        assert_eq!(report.message_body(), "a\nb");
    }

    #[test]
    fn test_advice_lines_per_outcome() {
        let advice = AdviceOutcome::Advice(AdvisoryResult::new(vec!["Rain: 0.8 mm".into()]));
        assert_eq!(advice_lines(&advice), vec!["Rain: 0.8 mm"]);

        assert_eq!(
            advice_lines(&AdviceOutcome::Unconfigured),
            vec![UNCONFIGURED_HINT]
        );
        assert_eq!(
            advice_lines(&AdviceOutcome::Failed("429: quota".into())),
            vec!["⚠️ AI advice unavailable: 429: quota"]
        );
        assert_eq!(
            advice_lines(&AdviceOutcome::Unusable("Model returned empty response".into())),
            vec!["⚠️ AI advice unavailable: Model returned empty response"]
        );
    }
}
