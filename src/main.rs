mod cli;
mod pipeline;

use std::time::Duration;

use agriguard_core::{AppError, Config, Credentials};
use agriguard_outbound::{
    DeepLTranslator, SmsSender, TranslationSettings, Translator, TwilioClient, TwilioSettings,
};
use anyhow::Result;
use clap::Parser;

use crate::cli::Cli;
use crate::pipeline::Pipeline;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging and .env before reading credentials
    agriguard_core::init()?;

    let query = cli.location_query()?;
    let config = match Config::load_validated(cli.config.as_deref()) {
        Ok((config, _)) => config,
        Err(e) => {
            tracing::error!("{}", e);
            println!("{}", AppError::from(e).user_message());
            std::process::exit(1);
        }
    };
    let credentials = Credentials::from_env();
    let strategy = cli
        .strategy
        .map(Into::into)
        .unwrap_or(config.advice.strategy);

    let pipeline = Pipeline::from_config(&config, &credentials, strategy)?;
    let daily = pipeline.run(&query).await;
    pipeline.persist_cache();

    if let Some(line) = &daily.status_line {
        println!("{}", line);
    }
    print!("{}", daily.report);

    let mut message = daily.report.message_body();

    if let Some(lang) = &cli.translate {
        let lang = lang
            .clone()
            .unwrap_or_else(|| config.translation.target_lang.clone());
        match translate(&config, &credentials, &message, &lang).await {
            Ok(translated) => {
                println!("🌐 Translation ({}):\n{}\n", lang, translated);
                message = translated;
            }
            Err(e) => println!("{}", e.user_message()),
        }
    }

    if !cli.sms.is_empty() {
        if daily.advised {
            send_sms(&config, &credentials, &cli.sms, &message).await;
        } else {
            tracing::warn!("No advice produced, SMS not sent");
        }
    }

    Ok(())
}

async fn translate(
    config: &Config,
    credentials: &Credentials,
    text: &str,
    target_lang: &str,
) -> Result<String, AppError> {
    let translator = DeepLTranslator::new(
        credentials
            .deepl_auth_key
            .as_ref()
            .map(|k| k.expose().to_string()),
        TranslationSettings {
            api_url: config.translation.api_url.clone(),
            timeout: Duration::from_secs(config.translation.timeout_secs),
        },
    )
    .map_err(|e| AppError::Outbound(e.user_message()))?;

    translator
        .translate(text, target_lang)
        .await
        .map_err(|e| AppError::Outbound(e.user_message()))
}

async fn send_sms(config: &Config, credentials: &Credentials, recipients: &[String], body: &str) {
    let from_number = credentials
        .twilio_from_number
        .clone()
        .or_else(|| config.sms.from_number.clone());
    let client = match TwilioClient::new(
        credentials
            .twilio_account_sid
            .as_ref()
            .map(|s| s.expose().to_string()),
        credentials
            .twilio_auth_token
            .as_ref()
            .map(|s| s.expose().to_string()),
        from_number,
        TwilioSettings {
            api_url: config.sms.api_url.clone(),
            send_delay: Duration::from_millis(config.sms.send_delay_ms),
            timeout: Duration::from_secs(config.sms.timeout_secs),
        },
    ) {
        Ok(client) => client,
        Err(e) => {
            println!("{}", AppError::Outbound(e.user_message()).user_message());
            return;
        }
    };

    for outcome in client.send_bulk(recipients, body).await {
        if outcome.success {
            println!("📨 SMS to {}: sent ({})", outcome.recipient, outcome.detail);
        } else {
            println!("❌ SMS to {}: {}", outcome.recipient, outcome.detail);
        }
    }
}
