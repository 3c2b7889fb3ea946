// src/leads/messages.rs
use serde::Serialize;

use crate::classify::{classify_or_fallback, Classification, ClassifyClient};
use crate::db::{leads as db_leads, Database};
use crate::errors::ServerError;

#[derive(Debug, Clone, Serialize)]
pub struct RecordedMessage {
    pub lead_id: String,
    pub classification: Classification,
}

/// Store an inbound message on the lead, classify it, and patch the
/// AI-derived fields from the result. Classification cannot fail this
/// mutation: a broken or unconfigured service yields the neutral
/// fallback and the patch still lands.
pub fn record_inbound_message(
    db: &Database,
    classifier: Option<&ClassifyClient>,
    lead_id: &str,
    message: &str,
) -> Result<RecordedMessage, ServerError> {
    if message.trim().is_empty() {
        return Err(ServerError::BadRequest("message must not be empty".into()));
    }

    let lead = db
        .with_conn(|conn| db_leads::get_lead(conn, lead_id))?
        .ok_or(ServerError::NotFound)?;

    db.with_conn(|conn| db_leads::record_message(conn, lead_id, message))?;

    let prompt = format!(
        "Lead {} ({} intent, timeline {}) wrote: {message}",
        lead.name,
        lead.intent.as_str(),
        lead.timeline.as_deref().unwrap_or("unknown"),
    );
    let classification = classify_or_fallback(classifier, &prompt);

    db.with_conn(|conn| {
        db_leads::apply_classification(
            conn,
            lead_id,
            &classification.sentiment,
            &classification.conversion_prediction,
            &classification.suggested_action,
        )
    })?;

    Ok(RecordedMessage {
        lead_id: lead_id.to_string(),
        classification,
    })
}
