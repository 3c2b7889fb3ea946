// src/domain/event.rs
use serde::{Deserialize, Serialize};

use crate::domain::lead::Lead;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Showing,
    Meeting,
    FollowUp,
    Call,
    OpenHouse,
    Other,
}

impl EventType {
    pub fn as_str(self) -> &'static str {
        match self {
            EventType::Showing => "showing",
            EventType::Meeting => "meeting",
            EventType::FollowUp => "follow_up",
            EventType::Call => "call",
            EventType::OpenHouse => "open_house",
            EventType::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "showing" => Some(EventType::Showing),
            "meeting" => Some(EventType::Meeting),
            "follow_up" => Some(EventType::FollowUp),
            "call" => Some(EventType::Call),
            "open_house" => Some(EventType::OpenHouse),
            "other" => Some(EventType::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderChannel {
    Sms,
    Email,
    Push,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderRecipient {
    Realtor,
    Client,
    Both,
}

/// Persisted intent-to-notify settings. Write-only for now: nothing in
/// this service dispatches reminders, so no delivery guarantee attaches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderConfig {
    pub send_reminder: bool,
    pub reminder_minutes_before: Vec<i64>,
    pub channels: Vec<ReminderChannel>,
    pub recipient: ReminderRecipient,
}

/// A scheduled activity, optionally tied to a lead.
///
/// `lead_id` is a weak reference: lookup only, no ownership. Enrichment
/// resolves it at read time and degrades to null if the lead is gone.
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    pub id: String,
    pub created_at: i64,

    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub event_type: EventType,

    /// Unix seconds. end >= start is expected but not enforced.
    pub start_time: i64,
    pub end_time: i64,

    pub lead_id: Option<String>,
    pub is_completed: bool,
    /// Synthesized once at creation, never recomputed.
    pub ai_preparation: Option<String>,
    pub reminder_config: Option<ReminderConfig>,
}

/// An event with its linked lead resolved at read time.
#[derive(Debug, Clone, Serialize)]
pub struct EventWithLead {
    #[serde(flatten)]
    pub event: Event,
    pub lead: Option<Lead>,
}

/// A lead's events split for the contact timeline view.
/// past = completed OR already started; upcoming = the complement.
#[derive(Debug, Clone, Serialize)]
pub struct BucketedEvents {
    pub past: Vec<Event>,
    pub upcoming: Vec<Event>,
}

/// Fields accepted when scheduling an event.
#[derive(Debug, Clone, Deserialize)]
pub struct NewEvent {
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub event_type: EventType,
    pub start_time: i64,
    pub end_time: i64,
    pub lead_id: Option<String>,
    pub reminder_config: Option<ReminderConfig>,
}

/// Sparse patch: only supplied fields change, everything else is left
/// untouched. This is not a full-replace contract.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub event_type: Option<EventType>,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    pub reminder_config: Option<ReminderConfig>,
}

impl EventPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.location.is_none()
            && self.event_type.is_none()
            && self.start_time.is_none()
            && self.end_time.is_none()
            && self.reminder_config.is_none()
    }
}
