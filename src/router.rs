// src/router.rs
use std::io::Read;

use astra::Request;
use chrono::Utc;
use serde::Deserialize;

use crate::classify::ClassifyClient;
use crate::config::AppConfig;
use crate::db::{events as db_events, leads as db_leads, users as db_users, Database};
use crate::domain::event::{EventPatch, NewEvent};
use crate::domain::lead::{
    BuyerStage, Lead, LeadStatus, LeadType, NewLead, SellerStage,
};
use crate::errors::{ResultResp, ServerError};
use crate::events::schedule;
use crate::leads::{ingest, messages};
use crate::responses::{json_error_response, json_response};
use crate::sms::SmsClient;

/// Everything a request handler needs, built once at startup.
#[derive(Clone)]
pub struct App {
    pub db: Database,
    pub sms: Option<SmsClient>,
    pub classifier: Option<ClassifyClient>,
}

impl App {
    pub fn new(db: Database, config: &AppConfig) -> Self {
        Self {
            db,
            sms: config.sms.as_ref().map(SmsClient::new),
            classifier: config.classify.as_ref().map(ClassifyClient::new),
        }
    }
}

#[derive(Deserialize)]
struct StatusBody {
    status: LeadStatus,
}

#[derive(Deserialize)]
struct BuyerStageBody {
    stage: BuyerStage,
}

#[derive(Deserialize)]
struct SellerStageBody {
    stage: SellerStage,
}

#[derive(Deserialize)]
struct TagBody {
    tag: String,
}

#[derive(Deserialize)]
struct MessageBody {
    message: String,
}

#[derive(Deserialize)]
struct CompleteBody {
    completed: bool,
}

#[derive(Deserialize)]
struct IdentityUpsertBody {
    external_id: String,
    name: String,
    email: String,
    image_url: Option<String>,
}

#[derive(Deserialize)]
struct IdentityDeleteBody {
    external_id: String,
}

pub fn handle(mut req: Request, app: &App) -> ResultResp {
    let method = req.method().as_str().to_string();
    let path = req.uri().path().to_string();
    let query = parse_query(&req);
    let now = Utc::now().timestamp();

    let segments: Vec<&str> = path
        .trim_matches('/')
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();

    match (method.as_str(), segments.as_slice()) {
        // External form intake. Every failure on this route flattens to a
        // generic 500: the caller is an unauthenticated web form and gets
        // no internal detail.
        ("POST", ["submit-lead-form"]) => {
            let result = read_json::<ingest::LeadForm>(&mut req)
                .and_then(|form| ingest::ingest_form_lead(&app.db, &form, now));
            match result {
                Ok(ingested) => json_response(&ingested),
                Err(err) => {
                    eprintln!("submit-lead-form failed: {err}");
                    Ok(json_error_response(500, "internal server error"))
                }
            }
        }

        // ----- leads -----
        ("GET", ["api", "leads"]) => {
            let leads = list_leads_filtered(&app.db, &query)?;
            json_response(&leads)
        }
        ("POST", ["api", "leads"]) => {
            let input: NewLead = read_json(&mut req)?;
            let id = create_lead(&app.db, &input, now)?;
            json_response(&serde_json::json!({ "lead_id": id }))
        }
        ("GET", ["api", "leads", id]) => {
            let lead = app.db.with_conn(|conn| db_leads::get_lead(conn, id))?;
            match lead {
                Some(lead) => json_response(&lead),
                None => Err(ServerError::NotFound),
            }
        }
        ("POST", ["api", "leads", id, "status"]) => {
            let body: StatusBody = read_json(&mut req)?;
            app.db
                .with_conn(|conn| db_leads::update_status(conn, id, body.status))?;
            json_response(&serde_json::json!({ "ok": true }))
        }
        ("POST", ["api", "leads", id, "buyer-stage"]) => {
            let body: BuyerStageBody = read_json(&mut req)?;
            app.db
                .with_conn(|conn| db_leads::update_buyer_stage(conn, id, body.stage))?;
            json_response(&serde_json::json!({ "ok": true }))
        }
        ("POST", ["api", "leads", id, "seller-stage"]) => {
            let body: SellerStageBody = read_json(&mut req)?;
            app.db
                .with_conn(|conn| db_leads::update_seller_stage(conn, id, body.stage))?;
            json_response(&serde_json::json!({ "ok": true }))
        }
        ("POST", ["api", "leads", id, "tags", "add"]) => {
            let body: TagBody = read_json(&mut req)?;
            app.db
                .with_conn(|conn| db_leads::add_tag(conn, id, &body.tag))?;
            json_response(&serde_json::json!({ "ok": true }))
        }
        ("POST", ["api", "leads", id, "tags", "remove"]) => {
            let body: TagBody = read_json(&mut req)?;
            app.db
                .with_conn(|conn| db_leads::remove_tag(conn, id, &body.tag))?;
            json_response(&serde_json::json!({ "ok": true }))
        }
        ("POST", ["api", "leads", id, "message"]) => {
            let body: MessageBody = read_json(&mut req)?;
            let recorded = messages::record_inbound_message(
                &app.db,
                app.classifier.as_ref(),
                id,
                &body.message,
            )?;
            json_response(&recorded)
        }
        ("GET", ["api", "leads", id, "events"]) => {
            let events = app
                .db
                .with_conn(|conn| db_events::list_events_by_lead(conn, id))?;
            json_response(&events)
        }
        ("GET", ["api", "leads", id, "events", "bucketed"]) => {
            let buckets = app
                .db
                .with_conn(|conn| db_events::list_events_by_lead_bucketed(conn, id, now))?;
            json_response(&buckets)
        }
        ("GET", ["api", "tags"]) => {
            let tags = app.db.with_conn(|conn| db_leads::list_distinct_tags(conn))?;
            json_response(&tags)
        }

        // ----- events -----
        ("GET", ["api", "events"]) => {
            let events = app.db.with_conn(|conn| db_events::list_events(conn))?;
            json_response(&events)
        }
        ("POST", ["api", "events"]) => {
            let input: NewEvent = read_json(&mut req)?;
            let event = schedule::create_event(&app.db, &input, now)?;
            json_response(&event)
        }
        ("GET", ["api", "events", "upcoming"]) => {
            let limit = query_i64(&query, "limit")?.unwrap_or(10);
            let days = query_i64(&query, "days")?.unwrap_or(7);
            // sqlite treats a negative LIMIT as unlimited
            if limit <= 0 {
                return Err(ServerError::BadRequest("limit must be positive".into()));
            }
            if days <= 0 {
                return Err(ServerError::BadRequest("days must be positive".into()));
            }
            let events = app
                .db
                .with_conn(|conn| db_events::list_upcoming_events(conn, limit, days, now))?;
            json_response(&events)
        }
        ("GET", ["api", "events", "range"]) => {
            let start = query_i64(&query, "start")?
                .ok_or_else(|| ServerError::BadRequest("missing start".into()))?;
            let end = query_i64(&query, "end")?
                .ok_or_else(|| ServerError::BadRequest("missing end".into()))?;
            let events = app
                .db
                .with_conn(|conn| db_events::list_events_in_range(conn, start, end))?;
            json_response(&events)
        }
        ("GET", ["api", "events", id]) => {
            let event = app
                .db
                .with_conn(|conn| db_events::get_event_enriched(conn, id))?;
            match event {
                Some(event) => json_response(&event),
                None => Err(ServerError::NotFound),
            }
        }
        ("POST", ["api", "events", id]) => {
            let patch: EventPatch = read_json(&mut req)?;
            app.db
                .with_conn(|conn| db_events::update_event(conn, id, &patch))?;
            json_response(&serde_json::json!({ "ok": true }))
        }
        ("POST", ["api", "events", id, "complete"]) => {
            let body: CompleteBody = read_json(&mut req)?;
            app.db
                .with_conn(|conn| db_events::set_event_completed(conn, id, body.completed))?;
            json_response(&serde_json::json!({ "ok": true }))
        }
        ("DELETE", ["api", "events", id]) => {
            app.db.with_conn(|conn| db_events::delete_event(conn, id))?;
            json_response(&serde_json::json!({ "ok": true }))
        }

        // ----- identity provider sync -----
        ("POST", ["api", "identity", "upsert"]) => {
            let body: IdentityUpsertBody = read_json(&mut req)?;
            app.db.with_conn(|conn| {
                db_users::upsert_user(
                    conn,
                    &body.external_id,
                    &body.name,
                    &body.email,
                    body.image_url.as_deref(),
                    now,
                )
            })?;
            json_response(&serde_json::json!({ "ok": true }))
        }
        ("POST", ["api", "identity", "delete"]) => {
            let body: IdentityDeleteBody = read_json(&mut req)?;
            app.db
                .with_conn(|conn| db_users::delete_user(conn, &body.external_id))?;
            json_response(&serde_json::json!({ "ok": true }))
        }

        _ => Err(ServerError::NotFound),
    }
}

fn create_lead(db: &Database, input: &NewLead, now: i64) -> Result<String, ServerError> {
    if input.name.trim().is_empty() {
        return Err(ServerError::BadRequest("name must not be empty".into()));
    }
    if input.phone.trim().is_empty() {
        return Err(ServerError::BadRequest("phone must not be empty".into()));
    }

    let lead = Lead {
        id: crate::ids::new_id("lead"),
        created_at: now,
        name: input.name.clone(),
        phone: input.phone.clone(),
        email: input.email.clone(),
        property_address: input.property_address.clone(),
        timeline: input.timeline.clone(),
        notes: input.notes.clone(),
        preferred_location: None,
        intent: input.intent,
        source: input.source.clone(),
        status: input.status.unwrap_or(LeadStatus::New),
        urgency_score: ingest::urgency_from_timeline(input.timeline.as_deref()),
        buyer_pipeline_stage: None,
        seller_pipeline_stage: None,
        list_price: None,
        listed_date: None,
        budget: None,
        conversion_prediction: None,
        ai_suggestion: None,
        last_message_sentiment: None,
        last_message_content: None,
        tags: Vec::new(),
    };

    db.with_conn(|conn| db_leads::insert_lead(conn, &lead))?;
    Ok(lead.id)
}

fn list_leads_filtered(
    db: &Database,
    query: &std::collections::HashMap<String, String>,
) -> Result<Vec<Lead>, ServerError> {
    db.with_conn(|conn| {
        if let Some(raw) = query.get("status") {
            let status = LeadStatus::parse(raw)
                .ok_or_else(|| ServerError::BadRequest(format!("unknown status: {raw}")))?;
            return db_leads::list_leads_by_status(conn, status);
        }
        if let Some(source) = query.get("source") {
            return db_leads::list_leads_by_source(conn, source);
        }
        if let Some(raw) = query.get("pipeline") {
            let lead_type = LeadType::parse(raw)
                .ok_or_else(|| ServerError::BadRequest(format!("unknown pipeline: {raw}")))?;
            return db_leads::list_leads_by_pipeline_type(conn, lead_type);
        }
        db_leads::list_leads(conn)
    })
}

fn read_json<T: serde::de::DeserializeOwned>(req: &mut Request) -> Result<T, ServerError> {
    let mut buf = Vec::new();
    req.body_mut()
        .reader()
        .read_to_end(&mut buf)
        .map_err(|e| ServerError::BadRequest(format!("unreadable body: {e}")))?;

    serde_json::from_slice(&buf).map_err(|e| ServerError::BadRequest(format!("invalid json: {e}")))
}

fn parse_query(req: &Request) -> std::collections::HashMap<String, String> {
    let mut map = std::collections::HashMap::new();

    if let Some(q) = req.uri().query() {
        for pair in q.split('&') {
            let mut parts = pair.splitn(2, '=');
            if let (Some(k), Some(v)) = (parts.next(), parts.next()) {
                map.insert(k.to_string(), v.to_string());
            }
        }
    }

    map
}

fn query_i64(
    query: &std::collections::HashMap<String, String>,
    key: &str,
) -> Result<Option<i64>, ServerError> {
    match query.get(key) {
        Some(raw) => raw
            .parse::<i64>()
            .map(Some)
            .map_err(|_| ServerError::BadRequest(format!("{key} must be an integer"))),
        None => Ok(None),
    }
}
