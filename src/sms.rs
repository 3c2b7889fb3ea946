// src/sms.rs

use reqwest::blocking::Client;
use std::error::Error;
use std::fmt;

use crate::config::SmsConfig;

#[derive(Debug)]
pub enum SmsError {
    RequestFailed(String),
    ApiError(String),
}

impl fmt::Display for SmsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SmsError::RequestFailed(msg) => write!(f, "Request failed: {msg}"),
            SmsError::ApiError(msg) => write!(f, "API error: {msg}"),
        }
    }
}

impl Error for SmsError {}

/// Outbound text messages via a Twilio-style REST API: basic-auth POST
/// of form-encoded To/From/Body against the account's message endpoint.
#[derive(Clone)]
pub struct SmsClient {
    account_sid: String,
    auth_token: String,
    sender_number: String,
    api_base: String,
    client: Client,
}

impl SmsClient {
    pub fn new(cfg: &SmsConfig) -> Self {
        Self::with_api_base(cfg, "https://api.twilio.com")
    }

    /// Point the client at a different host (test servers).
    pub fn with_api_base(cfg: &SmsConfig, api_base: impl Into<String>) -> Self {
        Self {
            account_sid: cfg.account_sid.clone(),
            auth_token: cfg.auth_token.clone(),
            sender_number: cfg.sender_number.clone(),
            api_base: api_base.into(),
            client: Client::new(),
        }
    }

    pub fn send(&self, to: &str, body: &str) -> Result<(), SmsError> {
        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.api_base, self.account_sid
        );

        let resp = self
            .client
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[
                ("To", to),
                ("From", self.sender_number.as_str()),
                ("Body", body),
            ])
            .send()
            .map_err(|e| SmsError::RequestFailed(e.to_string()))?;

        if !resp.status().is_success() {
            let error_body = resp.text().unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SmsError::ApiError(format!(
                "Failed to send SMS: {error_body}"
            )));
        }

        Ok(())
    }
}
