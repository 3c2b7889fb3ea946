// src/leads/ingest.rs
//
// External-facing lead ingestion: an unauthenticated form submission
// becomes a scored lead plus a scheduled follow-up text. The lead insert
// and the job enqueue land in one transaction; whatever happens to the
// SMS later never rolls the lead back.

use serde::{Deserialize, Serialize};

use crate::db::{jobs, leads as db_leads, Database};
use crate::domain::lead::{Intent, Lead, LeadStatus};
use crate::errors::ServerError;
use crate::ids;

/// Name the follow-up text signs off with.
pub const AGENT_NAME: &str = "Mike";

/// Delay before the follow-up text goes out.
pub const FOLLOW_UP_DELAY_SECS: i64 = 5;

/// Body of POST /submit-lead-form.
#[derive(Debug, Clone, Deserialize)]
pub struct LeadForm {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub property_address: Option<String>,
    pub timeline: Option<String>,
    pub form_id: Option<String>,
    pub source: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestedLead {
    pub lead_id: String,
    pub intent: Intent,
    pub urgency_score: i64,
}

/// Fixed timeline -> urgency table; anything unrecognized lands on 50.
pub fn urgency_from_timeline(timeline: Option<&str>) -> i64 {
    match timeline {
        Some("within_1_month") => 90,
        Some("3-6_months") => 60,
        Some("just_browsing") => 30,
        _ => 50,
    }
}

/// Substring rule on the provenance tag: "seller" wins over "buyer",
/// everything else defaults to investor.
pub fn intent_from_source(source: &str) -> Intent {
    if source.contains("seller") {
        Intent::Seller
    } else if source.contains("buyer") {
        Intent::Buyer
    } else {
        Intent::Investor
    }
}

/// The street line of an address: text before the first comma, or
/// "property" when there is no usable address.
pub fn street_line(property_address: Option<&str>) -> &str {
    match property_address {
        Some(addr) => {
            let line = addr.split(',').next().unwrap_or("").trim();
            if line.is_empty() {
                "property"
            } else {
                line
            }
        }
        None => "property",
    }
}

pub fn ingest_form_lead(
    db: &Database,
    form: &LeadForm,
    now: i64,
) -> Result<IngestedLead, ServerError> {
    if form.name.trim().is_empty() {
        return Err(ServerError::BadRequest("name must not be empty".into()));
    }
    if form.phone.trim().is_empty() {
        return Err(ServerError::BadRequest("phone must not be empty".into()));
    }

    let source = form.source.clone().unwrap_or_else(|| "web_form".to_string());
    let intent = intent_from_source(&source);
    let urgency_score = urgency_from_timeline(form.timeline.as_deref());
    let subject = street_line(form.property_address.as_deref()).to_string();

    let lead = Lead {
        id: ids::new_id("lead"),
        created_at: now,
        name: form.name.clone(),
        phone: form.phone.clone(),
        email: form.email.clone(),
        property_address: form.property_address.clone(),
        timeline: form.timeline.clone(),
        notes: None,
        preferred_location: None,
        intent,
        source,
        status: LeadStatus::New,
        urgency_score,
        buyer_pipeline_stage: None,
        seller_pipeline_stage: None,
        list_price: None,
        listed_date: None,
        budget: None,
        conversion_prediction: None,
        ai_suggestion: Some(format!(
            "New form lead. Open with a quick text about {subject} and confirm their timeline."
        )),
        last_message_sentiment: None,
        last_message_content: None,
        tags: Vec::new(),
    };

    let payload = jobs::FollowUpPayload {
        phone: lead.phone.clone(),
        lead_name: lead.name.clone(),
        property_address: lead.property_address.clone(),
    };

    db.with_conn(|conn| {
        let tx = conn
            .transaction()
            .map_err(|e| ServerError::DbError(format!("begin tx failed: {e}")))?;

        db_leads::insert_lead(&tx, &lead)?;
        jobs::enqueue(&tx, now + FOLLOW_UP_DELAY_SECS, &payload, now)?;

        tx.commit()
            .map_err(|e| ServerError::DbError(format!("commit tx failed: {e}")))?;
        Ok(())
    })?;

    Ok(IngestedLead {
        lead_id: lead.id,
        intent,
        urgency_score,
    })
}
