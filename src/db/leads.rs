// src/db/leads.rs
use rusqlite::{params, Connection, OptionalExtension};

use crate::domain::lead::{BuyerStage, Intent, Lead, LeadStatus, LeadType, SellerStage};
use crate::errors::ServerError;

const LEAD_COLUMNS: &str = "id, created_at, name, phone, email, property_address, timeline, \
     notes, preferred_location, intent, source, status, urgency_score, \
     buyer_pipeline_stage, seller_pipeline_stage, list_price, listed_date, budget, \
     conversion_prediction, ai_suggestion, last_message_sentiment, last_message_content";

fn bad_enum(column: &str, value: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        0,
        rusqlite::types::Type::Text,
        format!("unknown {column}: {value}").into(),
    )
}

fn map_lead_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Lead> {
    let intent_raw: String = row.get(9)?;
    let status_raw: String = row.get(11)?;
    let buyer_raw: Option<String> = row.get(13)?;
    let seller_raw: Option<String> = row.get(14)?;

    let intent = Intent::parse(&intent_raw).ok_or_else(|| bad_enum("intent", &intent_raw))?;
    let status = LeadStatus::parse(&status_raw).ok_or_else(|| bad_enum("status", &status_raw))?;
    let buyer_pipeline_stage = match buyer_raw {
        Some(s) => Some(BuyerStage::parse(&s).ok_or_else(|| bad_enum("buyer stage", &s))?),
        None => None,
    };
    let seller_pipeline_stage = match seller_raw {
        Some(s) => Some(SellerStage::parse(&s).ok_or_else(|| bad_enum("seller stage", &s))?),
        None => None,
    };

    Ok(Lead {
        id: row.get(0)?,
        created_at: row.get(1)?,
        name: row.get(2)?,
        phone: row.get(3)?,
        email: row.get(4)?,
        property_address: row.get(5)?,
        timeline: row.get(6)?,
        notes: row.get(7)?,
        preferred_location: row.get(8)?,
        intent,
        source: row.get(10)?,
        status,
        urgency_score: row.get(12)?,
        buyer_pipeline_stage,
        seller_pipeline_stage,
        list_price: row.get(15)?,
        listed_date: row.get(16)?,
        budget: row.get(17)?,
        conversion_prediction: row.get(18)?,
        ai_suggestion: row.get(19)?,
        last_message_sentiment: row.get(20)?,
        last_message_content: row.get(21)?,
        tags: Vec::new(),
    })
}

fn load_tags(conn: &Connection, lead: &mut Lead) -> Result<(), ServerError> {
    let mut stmt = conn
        .prepare("select tag from lead_tags where lead_id = ? order by position")
        .map_err(|e| ServerError::DbError(format!("prepare tags failed: {e}")))?;

    let rows = stmt
        .query_map(params![lead.id], |r| r.get::<_, String>(0))
        .map_err(|e| ServerError::DbError(format!("query tags failed: {e}")))?;

    for tag in rows {
        lead.tags
            .push(tag.map_err(|e| ServerError::DbError(format!("read tag failed: {e}")))?);
    }
    Ok(())
}

fn collect_leads(
    conn: &Connection,
    sql: &str,
    args: &[&dyn rusqlite::ToSql],
) -> Result<Vec<Lead>, ServerError> {
    let mut stmt = conn
        .prepare(sql)
        .map_err(|e| ServerError::DbError(format!("prepare leads failed: {e}")))?;

    let rows = stmt
        .query_map(args, map_lead_row)
        .map_err(|e| ServerError::DbError(format!("query leads failed: {e}")))?;

    let mut leads = Vec::new();
    for row in rows {
        leads.push(row.map_err(|e| ServerError::DbError(format!("read lead failed: {e}")))?);
    }
    for lead in &mut leads {
        load_tags(conn, lead)?;
    }
    Ok(leads)
}

/// Insert a fully-formed lead row. Caller owns id/created_at assignment
/// and validation; see `leads::ingest` and the create handler.
pub fn insert_lead(conn: &Connection, lead: &Lead) -> Result<(), ServerError> {
    conn.execute(
        &format!("insert into leads ({LEAD_COLUMNS}) values (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22)"),
        params![
            lead.id,
            lead.created_at,
            lead.name,
            lead.phone,
            lead.email,
            lead.property_address,
            lead.timeline,
            lead.notes,
            lead.preferred_location,
            lead.intent.as_str(),
            lead.source,
            lead.status.as_str(),
            lead.urgency_score,
            lead.buyer_pipeline_stage.map(BuyerStage::as_str),
            lead.seller_pipeline_stage.map(SellerStage::as_str),
            lead.list_price,
            lead.listed_date,
            lead.budget,
            lead.conversion_prediction,
            lead.ai_suggestion,
            lead.last_message_sentiment,
            lead.last_message_content,
        ],
    )
    .map_err(|e| ServerError::DbError(format!("insert lead failed: {e}")))?;
    Ok(())
}

/// `None` means the lead does not exist, which callers surface as an
/// explicit not-found result rather than an error.
pub fn get_lead(conn: &Connection, id: &str) -> Result<Option<Lead>, ServerError> {
    let lead = conn
        .query_row(
            &format!("select {LEAD_COLUMNS} from leads where id = ?"),
            params![id],
            map_lead_row,
        )
        .optional()
        .map_err(|e| ServerError::DbError(format!("select lead failed: {e}")))?;

    match lead {
        Some(mut lead) => {
            load_tags(conn, &mut lead)?;
            Ok(Some(lead))
        }
        None => Ok(None),
    }
}

/// All leads, newest first.
pub fn list_leads(conn: &Connection) -> Result<Vec<Lead>, ServerError> {
    collect_leads(
        conn,
        &format!("select {LEAD_COLUMNS} from leads order by created_at desc, id desc"),
        &[],
    )
}

pub fn list_leads_by_status(
    conn: &Connection,
    status: LeadStatus,
) -> Result<Vec<Lead>, ServerError> {
    collect_leads(
        conn,
        &format!(
            "select {LEAD_COLUMNS} from leads where status = ? order by created_at desc, id desc"
        ),
        &[&status.as_str()],
    )
}

pub fn list_leads_by_source(conn: &Connection, source: &str) -> Result<Vec<Lead>, ServerError> {
    collect_leads(
        conn,
        &format!(
            "select {LEAD_COLUMNS} from leads where source = ? order by created_at desc, id desc"
        ),
        &[&source],
    )
}

/// Pipeline view: the buyer or seller subset, keyed on the derived
/// lead_type dimension (= intent family).
pub fn list_leads_by_pipeline_type(
    conn: &Connection,
    lead_type: LeadType,
) -> Result<Vec<Lead>, ServerError> {
    collect_leads(
        conn,
        &format!(
            "select {LEAD_COLUMNS} from leads where intent = ? order by created_at desc, id desc"
        ),
        &[&lead_type.intent_str()],
    )
}

/// Every tag in use, deduplicated, ascending.
pub fn list_distinct_tags(conn: &Connection) -> Result<Vec<String>, ServerError> {
    let mut stmt = conn
        .prepare("select distinct tag from lead_tags order by tag asc")
        .map_err(|e| ServerError::DbError(format!("prepare distinct tags failed: {e}")))?;

    let rows = stmt
        .query_map([], |r| r.get::<_, String>(0))
        .map_err(|e| ServerError::DbError(format!("query distinct tags failed: {e}")))?;

    let mut tags = Vec::new();
    for tag in rows {
        tags.push(tag.map_err(|e| ServerError::DbError(format!("read tag failed: {e}")))?);
    }
    Ok(tags)
}

fn patch_one(conn: &Connection, sql: &str, args: &[&dyn rusqlite::ToSql]) -> Result<(), ServerError> {
    let updated = conn
        .execute(sql, args)
        .map_err(|e| ServerError::DbError(format!("update lead failed: {e}")))?;
    if updated == 0 {
        return Err(ServerError::NotFound);
    }
    Ok(())
}

/// Unconditional status patch: any status is reachable from any status.
pub fn update_status(conn: &Connection, id: &str, status: LeadStatus) -> Result<(), ServerError> {
    patch_one(
        conn,
        "update leads set status = ? where id = ?",
        &[&status.as_str(), &id],
    )
}

/// Unconditional stage patch. Deliberately does not check the lead's
/// intent family; the contract preserves that flexibility.
pub fn update_buyer_stage(conn: &Connection, id: &str, stage: BuyerStage) -> Result<(), ServerError> {
    patch_one(
        conn,
        "update leads set buyer_pipeline_stage = ? where id = ?",
        &[&stage.as_str(), &id],
    )
}

pub fn update_seller_stage(
    conn: &Connection,
    id: &str,
    stage: SellerStage,
) -> Result<(), ServerError> {
    patch_one(
        conn,
        "update leads set seller_pipeline_stage = ? where id = ?",
        &[&stage.as_str(), &id],
    )
}

fn lead_exists(conn: &Connection, id: &str) -> Result<bool, ServerError> {
    let found: Option<i64> = conn
        .query_row("select 1 from leads where id = ?", params![id], |r| r.get(0))
        .optional()
        .map_err(|e| ServerError::DbError(format!("select lead failed: {e}")))?;
    Ok(found.is_some())
}

/// Attach a tag. Idempotent: re-adding a member tag is a no-op and does
/// not disturb its display position.
pub fn add_tag(conn: &Connection, id: &str, tag: &str) -> Result<(), ServerError> {
    if !lead_exists(conn, id)? {
        return Err(ServerError::NotFound);
    }
    conn.execute(
        "insert or ignore into lead_tags (lead_id, tag, position)
         values (?1, ?2, (select coalesce(max(position) + 1, 0) from lead_tags where lead_id = ?1))",
        params![id, tag],
    )
    .map_err(|e| ServerError::DbError(format!("insert tag failed: {e}")))?;
    Ok(())
}

/// Detach a tag. Removing a non-member tag is a no-op.
pub fn remove_tag(conn: &Connection, id: &str, tag: &str) -> Result<(), ServerError> {
    if !lead_exists(conn, id)? {
        return Err(ServerError::NotFound);
    }
    conn.execute(
        "delete from lead_tags where lead_id = ? and tag = ?",
        params![id, tag],
    )
    .map_err(|e| ServerError::DbError(format!("delete tag failed: {e}")))?;
    Ok(())
}

/// Store the raw text of an inbound message before classification runs.
pub fn record_message(conn: &Connection, id: &str, content: &str) -> Result<(), ServerError> {
    patch_one(
        conn,
        "update leads set last_message_content = ? where id = ?",
        &[&content, &id],
    )
}

/// Patch the AI-derived fields from a classification result (which may
/// be the neutral fallback).
pub fn apply_classification(
    conn: &Connection,
    id: &str,
    sentiment: &str,
    conversion_prediction: &str,
    suggested_action: &str,
) -> Result<(), ServerError> {
    patch_one(
        conn,
        "update leads set last_message_sentiment = ?, conversion_prediction = ?, ai_suggestion = ?
         where id = ?",
        &[&sentiment, &conversion_prediction, &suggested_action, &id],
    )
}
