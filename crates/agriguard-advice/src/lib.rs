//! Advisory generation for AgriGuard
//!
//! Two interchangeable [`AdvisoryStrategy`] implementations turn
//! [`ForecastMetrics`](agriguard_weather::ForecastMetrics) into short,
//! labelled advice lines: a fixed rule table and a hosted language model.

pub mod error;
pub mod model;
pub mod parse;
pub mod prompt;
pub mod rules;
pub mod strategy;

pub use error::{ModelError, UnusableReply};
pub use model::{ModelAdvisor, ModelSettings};
pub use parse::{parse_reply, strip_bullet};
pub use prompt::build_prompt;
pub use rules::RuleAdvisor;
pub use strategy::{AdviceOutcome, AdvisoryResult, AdvisoryStrategy};
