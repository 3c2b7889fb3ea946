// src/db/events.rs
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};

use crate::db::leads::get_lead;
use crate::domain::event::{
    BucketedEvents, Event, EventPatch, EventType, EventWithLead, ReminderConfig,
};
use crate::errors::ServerError;

const EVENT_COLUMNS: &str = "id, created_at, title, description, location, event_type, \
     start_time, end_time, lead_id, is_completed, ai_preparation, reminder_config";

fn map_event_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Event> {
    let type_raw: String = row.get(5)?;
    let event_type = EventType::parse(&type_raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            5,
            rusqlite::types::Type::Text,
            format!("unknown event type: {type_raw}").into(),
        )
    })?;

    let reminder_raw: Option<String> = row.get(11)?;
    let reminder_config = match reminder_raw {
        Some(json) => Some(serde_json::from_str::<ReminderConfig>(&json).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                11,
                rusqlite::types::Type::Text,
                format!("bad reminder_config json: {e}").into(),
            )
        })?),
        None => None,
    };

    Ok(Event {
        id: row.get(0)?,
        created_at: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        location: row.get(4)?,
        event_type,
        start_time: row.get(6)?,
        end_time: row.get(7)?,
        lead_id: row.get(8)?,
        is_completed: row.get::<_, i64>(9)? != 0,
        ai_preparation: row.get(10)?,
        reminder_config,
    })
}

fn collect_events(
    conn: &Connection,
    sql: &str,
    args: &[&dyn rusqlite::ToSql],
) -> Result<Vec<Event>, ServerError> {
    let mut stmt = conn
        .prepare(sql)
        .map_err(|e| ServerError::DbError(format!("prepare events failed: {e}")))?;

    let rows = stmt
        .query_map(args, map_event_row)
        .map_err(|e| ServerError::DbError(format!("query events failed: {e}")))?;

    let mut events = Vec::new();
    for row in rows {
        events.push(row.map_err(|e| ServerError::DbError(format!("read event failed: {e}")))?);
    }
    Ok(events)
}

/// Attach each event's lead, resolved now. A dangling lead_id yields
/// `lead: None`, never an error.
fn enrich(conn: &Connection, events: Vec<Event>) -> Result<Vec<EventWithLead>, ServerError> {
    let mut out = Vec::with_capacity(events.len());
    for event in events {
        let lead = match event.lead_id.as_deref() {
            Some(lead_id) => get_lead(conn, lead_id)?,
            None => None,
        };
        out.push(EventWithLead { event, lead });
    }
    Ok(out)
}

pub fn insert_event(conn: &Connection, event: &Event) -> Result<(), ServerError> {
    let reminder_json = match &event.reminder_config {
        Some(cfg) => Some(
            serde_json::to_string(cfg)
                .map_err(|e| ServerError::DbError(format!("encode reminder_config failed: {e}")))?,
        ),
        None => None,
    };

    conn.execute(
        &format!(
            "insert into events ({EVENT_COLUMNS}) \
             values (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"
        ),
        params![
            event.id,
            event.created_at,
            event.title,
            event.description,
            event.location,
            event.event_type.as_str(),
            event.start_time,
            event.end_time,
            event.lead_id,
            event.is_completed as i64,
            event.ai_preparation,
            reminder_json,
        ],
    )
    .map_err(|e| ServerError::DbError(format!("insert event failed: {e}")))?;
    Ok(())
}

pub fn get_event(conn: &Connection, id: &str) -> Result<Option<Event>, ServerError> {
    conn.query_row(
        &format!("select {EVENT_COLUMNS} from events where id = ?"),
        params![id],
        map_event_row,
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("select event failed: {e}")))
}

pub fn get_event_enriched(conn: &Connection, id: &str) -> Result<Option<EventWithLead>, ServerError> {
    match get_event(conn, id)? {
        Some(event) => Ok(enrich(conn, vec![event])?.pop()),
        None => Ok(None),
    }
}

/// All events, ascending by start time.
pub fn list_events(conn: &Connection) -> Result<Vec<Event>, ServerError> {
    collect_events(
        conn,
        &format!("select {EVENT_COLUMNS} from events order by start_time asc, id asc"),
        &[],
    )
}

/// Incomplete events starting within [now, now + days_ahead days],
/// ascending, at most `limit`, enriched.
pub fn list_upcoming_events(
    conn: &Connection,
    limit: i64,
    days_ahead: i64,
    now: i64,
) -> Result<Vec<EventWithLead>, ServerError> {
    let window_end = now + days_ahead * 86_400;
    let events = collect_events(
        conn,
        &format!(
            "select {EVENT_COLUMNS} from events \
             where is_completed = 0 and start_time >= ?1 and start_time <= ?2 \
             order by start_time asc, id asc limit ?3"
        ),
        &[&now, &window_end, &limit],
    )?;
    enrich(conn, events)
}

/// A lead's events, most recent start first.
pub fn list_events_by_lead(conn: &Connection, lead_id: &str) -> Result<Vec<Event>, ServerError> {
    collect_events(
        conn,
        &format!(
            "select {EVENT_COLUMNS} from events where lead_id = ? \
             order by start_time desc, id desc"
        ),
        &[&lead_id],
    )
}

/// Partition a lead's events for the contact timeline:
/// past = completed OR start_time <= now (descending),
/// upcoming = the complement (ascending).
pub fn list_events_by_lead_bucketed(
    conn: &Connection,
    lead_id: &str,
    now: i64,
) -> Result<BucketedEvents, ServerError> {
    let past = collect_events(
        conn,
        &format!(
            "select {EVENT_COLUMNS} from events \
             where lead_id = ?1 and (is_completed = 1 or start_time <= ?2) \
             order by start_time desc, id desc"
        ),
        &[&lead_id, &now],
    )?;
    let upcoming = collect_events(
        conn,
        &format!(
            "select {EVENT_COLUMNS} from events \
             where lead_id = ?1 and is_completed = 0 and start_time > ?2 \
             order by start_time asc, id asc"
        ),
        &[&lead_id, &now],
    )?;
    Ok(BucketedEvents { past, upcoming })
}

/// Events with start_time in [start, end], bounds inclusive, enriched.
pub fn list_events_in_range(
    conn: &Connection,
    start: i64,
    end: i64,
) -> Result<Vec<EventWithLead>, ServerError> {
    let events = collect_events(
        conn,
        &format!(
            "select {EVENT_COLUMNS} from events \
             where start_time >= ?1 and start_time <= ?2 \
             order by start_time asc, id asc"
        ),
        &[&start, &end],
    )?;
    enrich(conn, events)
}

/// Sparse patch: builds SET clauses only for the fields the caller
/// supplied, binding in the same order.
pub fn update_event(conn: &Connection, id: &str, patch: &EventPatch) -> Result<(), ServerError> {
    if patch.is_empty() {
        // Nothing to change; still report missing ids.
        return match get_event(conn, id)? {
            Some(_) => Ok(()),
            None => Err(ServerError::NotFound),
        };
    }

    let mut sets: Vec<&str> = Vec::new();
    let mut bind: Vec<Value> = Vec::new();

    if let Some(title) = &patch.title {
        sets.push("title = ?");
        bind.push(Value::Text(title.clone()));
    }
    if let Some(description) = &patch.description {
        sets.push("description = ?");
        bind.push(Value::Text(description.clone()));
    }
    if let Some(location) = &patch.location {
        sets.push("location = ?");
        bind.push(Value::Text(location.clone()));
    }
    if let Some(event_type) = patch.event_type {
        sets.push("event_type = ?");
        bind.push(Value::Text(event_type.as_str().to_string()));
    }
    if let Some(start_time) = patch.start_time {
        sets.push("start_time = ?");
        bind.push(Value::Integer(start_time));
    }
    if let Some(end_time) = patch.end_time {
        sets.push("end_time = ?");
        bind.push(Value::Integer(end_time));
    }
    if let Some(cfg) = &patch.reminder_config {
        let json = serde_json::to_string(cfg)
            .map_err(|e| ServerError::DbError(format!("encode reminder_config failed: {e}")))?;
        sets.push("reminder_config = ?");
        bind.push(Value::Text(json));
    }

    bind.push(Value::Text(id.to_string()));
    let sql = format!("update events set {} where id = ?", sets.join(", "));

    let updated = conn
        .execute(&sql, params_from_iter(bind))
        .map_err(|e| ServerError::DbError(format!("update event failed: {e}")))?;
    if updated == 0 {
        return Err(ServerError::NotFound);
    }
    Ok(())
}

/// Unconditional completion flag set.
pub fn set_event_completed(conn: &Connection, id: &str, completed: bool) -> Result<(), ServerError> {
    let updated = conn
        .execute(
            "update events set is_completed = ? where id = ?",
            params![completed as i64, id],
        )
        .map_err(|e| ServerError::DbError(format!("update event failed: {e}")))?;
    if updated == 0 {
        return Err(ServerError::NotFound);
    }
    Ok(())
}

/// Hard delete. No cascade: leads never reference events.
pub fn delete_event(conn: &Connection, id: &str) -> Result<(), ServerError> {
    let deleted = conn
        .execute("delete from events where id = ?", params![id])
        .map_err(|e| ServerError::DbError(format!("delete event failed: {e}")))?;
    if deleted == 0 {
        return Err(ServerError::NotFound);
    }
    Ok(())
}
