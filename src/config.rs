// src/config.rs
use std::env;

/// Credentials for the outbound SMS transport (Twilio-style REST API).
/// All three keys must be present for the transport to be usable.
#[derive(Debug, Clone)]
pub struct SmsConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub sender_number: String,
}

/// Key for the external text-classification service.
#[derive(Debug, Clone)]
pub struct ClassifyConfig {
    pub api_key: String,
}

/// Process-level configuration, read once at startup.
///
/// Missing keys are a normal condition: the affected call sites fall back
/// (notification marked failed, classification substituted) instead of
/// failing the request that triggered them.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub sms: Option<SmsConfig>,
    pub classify: Option<ClassifyConfig>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let sms = match (
            non_empty_var("TWILIO_ACCOUNT_SID"),
            non_empty_var("TWILIO_AUTH_TOKEN"),
            non_empty_var("TWILIO_SENDER_NUMBER"),
        ) {
            (Some(account_sid), Some(auth_token), Some(sender_number)) => Some(SmsConfig {
                account_sid,
                auth_token,
                sender_number,
            }),
            _ => None,
        };

        let classify = non_empty_var("CLASSIFIER_API_KEY").map(|api_key| ClassifyConfig { api_key });

        Self { sms, classify }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(v) if !v.trim().is_empty() => Some(v),
        _ => None,
    }
}
