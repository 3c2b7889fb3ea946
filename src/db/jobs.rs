// src/db/jobs.rs
//
// Durable delayed-notification queue. A single worker thread polls for
// due rows; rows stay 'pending' until marked after dispatch, so a crash
// mid-dispatch re-delivers on restart (at-least-once, no idempotency key).
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::errors::ServerError;

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_SENT: &str = "sent";
pub const STATUS_FAILED: &str = "failed";

/// Payload of the delayed follow-up text scheduled at lead ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowUpPayload {
    pub phone: String,
    pub lead_name: String,
    pub property_address: Option<String>,
}

#[derive(Debug, Clone)]
pub struct JobRow {
    pub id: i64,
    pub run_at: i64,
    pub payload: String,
    pub status: String,
    pub last_error: Option<String>,
}

pub fn enqueue(
    conn: &Connection,
    run_at: i64,
    payload: &FollowUpPayload,
    now: i64,
) -> Result<i64, ServerError> {
    let payload_json = serde_json::to_string(payload)
        .map_err(|e| ServerError::DbError(format!("encode job payload failed: {e}")))?;

    conn.execute(
        "insert into notification_jobs (run_at, payload, status, created_at)
         values (?1, ?2, ?3, ?4)",
        params![run_at, payload_json, STATUS_PENDING, now],
    )
    .map_err(|e| ServerError::DbError(format!("insert job failed: {e}")))?;

    Ok(conn.last_insert_rowid())
}

/// Pending jobs whose run_at has passed, oldest first.
pub fn due_jobs(conn: &Connection, now: i64, limit: i64) -> Result<Vec<JobRow>, ServerError> {
    let mut stmt = conn
        .prepare(
            "select id, run_at, payload, status, last_error
             from notification_jobs
             where status = ?1 and run_at <= ?2
             order by run_at asc, id asc
             limit ?3",
        )
        .map_err(|e| ServerError::DbError(format!("prepare due jobs failed: {e}")))?;

    let rows = stmt
        .query_map(params![STATUS_PENDING, now, limit], |r| {
            Ok(JobRow {
                id: r.get(0)?,
                run_at: r.get(1)?,
                payload: r.get(2)?,
                status: r.get(3)?,
                last_error: r.get(4)?,
            })
        })
        .map_err(|e| ServerError::DbError(format!("query due jobs failed: {e}")))?;

    let mut jobs = Vec::new();
    for row in rows {
        jobs.push(row.map_err(|e| ServerError::DbError(format!("read job failed: {e}")))?);
    }
    Ok(jobs)
}

pub fn mark_sent(conn: &Connection, id: i64) -> Result<(), ServerError> {
    conn.execute(
        "update notification_jobs set status = ?1, last_error = null where id = ?2",
        params![STATUS_SENT, id],
    )
    .map_err(|e| ServerError::DbError(format!("mark job sent failed: {e}")))?;
    Ok(())
}

pub fn mark_failed(conn: &Connection, id: i64, error: &str) -> Result<(), ServerError> {
    conn.execute(
        "update notification_jobs set status = ?1, last_error = ?2 where id = ?3",
        params![STATUS_FAILED, error, id],
    )
    .map_err(|e| ServerError::DbError(format!("mark job failed failed: {e}")))?;
    Ok(())
}

pub fn get_job(conn: &Connection, id: i64) -> Result<Option<JobRow>, ServerError> {
    conn.query_row(
        "select id, run_at, payload, status, last_error from notification_jobs where id = ?",
        params![id],
        |r| {
            Ok(JobRow {
                id: r.get(0)?,
                run_at: r.get(1)?,
                payload: r.get(2)?,
                status: r.get(3)?,
                last_error: r.get(4)?,
            })
        },
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("select job failed: {e}")))
}
