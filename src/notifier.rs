// src/notifier.rs
//
// Background worker for the delayed follow-up texts. Failures here are
// best-effort territory: the lead already exists, so a missing transport
// or a refused request gets logged, the job is marked failed, and
// nothing propagates.

use std::thread;
use std::time::Duration;

use chrono::Utc;

use crate::db::{jobs, Database};
use crate::errors::ServerError;
use crate::leads::ingest::AGENT_NAME;
use crate::sms::SmsClient;

const POLL_INTERVAL: Duration = Duration::from_secs(1);
const BATCH_LIMIT: i64 = 20;

/// The follow-up text sent to a fresh form lead.
pub fn follow_up_text(lead_name: &str, property_address: Option<&str>) -> String {
    match property_address {
        Some(addr) => format!(
            "Hi {lead_name}, this is {AGENT_NAME}. Thanks for reaching out about {addr}. \
             When would be a good time for a quick call?"
        ),
        None => format!(
            "Hi {lead_name}, this is {AGENT_NAME}. Thanks for reaching out. \
             When would be a good time for a quick call?"
        ),
    }
}

/// Poll loop run on its own thread for the life of the process.
pub fn run(db: Database, sms: Option<SmsClient>) {
    println!(
        "notifier started (sms transport {})",
        if sms.is_some() { "configured" } else { "NOT configured" }
    );
    loop {
        let now = Utc::now().timestamp();
        if let Err(e) = process_due_jobs(&db, sms.as_ref(), now) {
            eprintln!("notifier poll failed: {e}");
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Dispatch every due job once. Returns how many jobs were handled.
/// Per-job failures are swallowed into the job row, only store-level
/// failures surface.
pub fn process_due_jobs(
    db: &Database,
    sms: Option<&SmsClient>,
    now: i64,
) -> Result<usize, ServerError> {
    let due = db.with_conn(|conn| jobs::due_jobs(conn, now, BATCH_LIMIT))?;
    let count = due.len();

    for job in due {
        let outcome = dispatch(sms, &job.payload);
        db.with_conn(|conn| match &outcome {
            Ok(()) => jobs::mark_sent(conn, job.id),
            Err(msg) => {
                eprintln!("follow-up job {} failed: {msg}", job.id);
                jobs::mark_failed(conn, job.id, msg)
            }
        })?;
    }

    Ok(count)
}

fn dispatch(sms: Option<&SmsClient>, payload_json: &str) -> Result<(), String> {
    let payload: jobs::FollowUpPayload =
        serde_json::from_str(payload_json).map_err(|e| format!("bad payload: {e}"))?;

    let Some(sms) = sms else {
        return Err("sms transport not configured".to_string());
    };

    let body = follow_up_text(&payload.lead_name, payload.property_address.as_deref());
    sms.send(&payload.phone, &body)
        .map_err(|e| format!("send failed: {e}"))
}
