use agriguard_weather::ForecastMetrics;
use async_trait::async_trait;

/// Ordered advice lines, most urgent first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AdvisoryResult {
    lines: Vec<String>,
}

impl AdvisoryResult {
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Result of running a strategy.
///
/// `Unconfigured` is not a failure: the model strategy simply has no
/// credential, and the operator needs a setup hint rather than an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdviceOutcome {
    Advice(AdvisoryResult),
    Unconfigured,
    /// The provider call failed; carries the provider's error text
    Failed(String),
    /// The call succeeded but the reply held no usable advice
    Unusable(String),
}

impl AdviceOutcome {
    pub fn is_advice(&self) -> bool {
        matches!(self, AdviceOutcome::Advice(_))
    }
}

/// A way of turning today's metrics into advice.
#[async_trait]
pub trait AdvisoryStrategy: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &'static str;

    /// `location` is the display name of the resolved place.
    async fn advise(&self, location: &str, metrics: &ForecastMetrics) -> AdviceOutcome;
}
