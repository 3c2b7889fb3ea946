// src/events/schedule.rs
use crate::db::{events as db_events, leads as db_leads, Database};
use crate::domain::event::{Event, NewEvent};
use crate::errors::ServerError;
use crate::events::prep;
use crate::ids;

/// Create an event. If a lead is linked it must exist right now; the
/// preparation note is synthesized from that snapshot of the lead and
/// never recomputed afterwards.
pub fn create_event(db: &Database, input: &NewEvent, now: i64) -> Result<Event, ServerError> {
    if input.title.trim().is_empty() {
        return Err(ServerError::BadRequest("title must not be empty".into()));
    }

    db.with_conn(|conn| {
        let lead = match input.lead_id.as_deref() {
            Some(lead_id) => Some(db_leads::get_lead(conn, lead_id)?.ok_or_else(|| {
                ServerError::BadRequest(format!("lead {lead_id} does not exist"))
            })?),
            None => None,
        };

        let ai_preparation = prep::prepare_hints(input.event_type, lead.as_ref());

        let event = Event {
            id: ids::new_id("evt"),
            created_at: now,
            title: input.title.clone(),
            description: input.description.clone(),
            location: input.location.clone(),
            event_type: input.event_type,
            start_time: input.start_time,
            end_time: input.end_time,
            lead_id: input.lead_id.clone(),
            is_completed: false,
            ai_preparation,
            reminder_config: input.reminder_config.clone(),
        };

        db_events::insert_event(conn, &event)?;
        Ok(event)
    })
}
