//! Presentation and delivery for AgriGuard
//!
//! Renders the daily report block, translates it through DeepL and sends it
//! by SMS through Twilio.

pub mod display;
pub mod error;
pub mod sms;
pub mod translate;

pub use display::{advice_lines, Report, UNCONFIGURED_HINT};
pub use error::OutboundError;
pub use sms::{DeliveryOutcome, SmsSender, TwilioClient, TwilioSettings};
pub use translate::{DeepLTranslator, TranslationSettings, Translator};
