// src/classify.rs
//
// Client for the external text-classification service. The contract at
// this boundary is strict: classification must NEVER fail the mutation
// that asked for it. Any problem (missing key, transport error, non-JSON
// body, wrong shape) is logged and replaced with the neutral fallback.

use reqwest::blocking::Client;
use serde::Serialize;
use serde_json::Value;

use crate::config::ClassifyConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub sentiment: String,
    pub urgency_score: i64,
    pub conversion_prediction: String,
    pub suggested_action: String,
}

/// Fixed neutral tuple substituted on any failure.
pub fn neutral_fallback() -> Classification {
    Classification {
        sentiment: "neutral".to_string(),
        urgency_score: 50,
        conversion_prediction: "unknown".to_string(),
        suggested_action: "follow_up".to_string(),
    }
}

/// Pull the expected shape out of a response body. `None` for anything
/// that is not {sentiment, urgency_score, conversion_prediction,
/// suggested_action} with the right types.
pub fn parse_classification(value: &Value) -> Option<Classification> {
    let sentiment = value.get("sentiment")?.as_str()?.to_string();
    let urgency_score = value.get("urgency_score")?.as_i64()?;
    let conversion_prediction = value.get("conversion_prediction")?.as_str()?.to_string();
    let suggested_action = value.get("suggested_action")?.as_str()?.to_string();

    if !(0..=100).contains(&urgency_score) {
        return None;
    }

    Some(Classification {
        sentiment,
        urgency_score,
        conversion_prediction,
        suggested_action,
    })
}

#[derive(Clone)]
pub struct ClassifyClient {
    api_key: String,
    endpoint: String,
    client: Client,
}

impl ClassifyClient {
    pub fn new(cfg: &ClassifyConfig) -> Self {
        Self::with_endpoint(cfg, "https://api.classifier.example/v1/classify")
    }

    pub fn with_endpoint(cfg: &ClassifyConfig, endpoint: impl Into<String>) -> Self {
        Self {
            api_key: cfg.api_key.clone(),
            endpoint: endpoint.into(),
            client: Client::new(),
        }
    }

    /// Classify a free-text prompt. Infallible by contract: errors are
    /// logged here and the neutral fallback comes back.
    pub fn classify(&self, prompt: &str) -> Classification {
        match self.request(prompt) {
            Ok(c) => c,
            Err(msg) => {
                eprintln!("classification failed, using fallback: {msg}");
                neutral_fallback()
            }
        }
    }

    fn request(&self, prompt: &str) -> Result<Classification, String> {
        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({ "prompt": prompt }))
            .send()
            .map_err(|e| format!("request failed: {e}"))?;

        if !resp.status().is_success() {
            return Err(format!("api status {}", resp.status()));
        }

        let value: Value = resp.json().map_err(|e| format!("non-json body: {e}"))?;
        parse_classification(&value).ok_or_else(|| format!("unexpected shape: {value}"))
    }
}

/// Convenience for call sites holding an optional client: an absent
/// client (no key configured) behaves like a failed call.
pub fn classify_or_fallback(client: Option<&ClassifyClient>, prompt: &str) -> Classification {
    match client {
        Some(c) => c.classify(prompt),
        None => {
            eprintln!("classification skipped: no api key configured");
            neutral_fallback()
        }
    }
}
