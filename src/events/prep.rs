// src/events/prep.rs
//
// One-shot synthesis of the ai_preparation note attached to an event at
// creation time. Never recomputed: later lead edits do not rewrite it.

use crate::domain::event::EventType;
use crate::domain::lead::{Intent, Lead};

/// Appended when the linked lead's urgency score crosses the threshold.
pub const HIGH_PRIORITY_MARKER: &str = "High-priority lead";

pub const HIGH_PRIORITY_THRESHOLD: i64 = 75;

/// Compose preparation hints for an event, keyed on event type and, when
/// a lead is linked, its intent/urgency/notes.
///
/// Without a lead only `open_house` and `showing` get a generic tip;
/// every other type gets none.
pub fn prepare_hints(event_type: EventType, lead: Option<&Lead>) -> Option<String> {
    let Some(lead) = lead else {
        return generic_hint(event_type).map(str::to_string);
    };

    let mut parts = vec![contextual_hint(event_type, lead.intent).to_string()];

    if lead.urgency_score >= HIGH_PRIORITY_THRESHOLD {
        parts.push(format!(
            "{HIGH_PRIORITY_MARKER} ({}/100): confirm early and have next steps ready.",
            lead.urgency_score
        ));
    }

    if let Some(notes) = lead.notes.as_deref() {
        if !notes.trim().is_empty() {
            parts.push(format!("Notes on file: {notes}"));
        }
    }

    Some(parts.join(" "))
}

fn contextual_hint(event_type: EventType, intent: Intent) -> &'static str {
    match (event_type, intent) {
        (EventType::Showing, Intent::Buyer) => {
            "Pull 2-3 comparable listings near the property to anchor the price conversation."
        }
        (EventType::Showing, Intent::Seller) => {
            "Walk the home first and note anything a buyer's agent would flag."
        }
        (EventType::Showing, Intent::Investor) => {
            "Bring rent comps and a rough cap-rate estimate for the area."
        }
        (EventType::OpenHouse, Intent::Seller) => {
            "Review recent foot-traffic numbers and have a pricing update ready."
        }
        (EventType::OpenHouse, _) => {
            "Greet them personally and ask what they thought of the layout."
        }
        (EventType::FollowUp, _) => {
            "Reference the last conversation and ask one concrete next-step question."
        }
        (EventType::Call, _) => "Keep it short: confirm their timeline and one open question.",
        (EventType::Meeting, _) => "Prepare an agenda and the latest numbers for their situation.",
        (EventType::Other, _) => "Check the lead's recent activity before you go in.",
    }
}

fn generic_hint(event_type: EventType) -> Option<&'static str> {
    match event_type {
        EventType::OpenHouse => {
            Some("Stage the entry, set out the sign-in sheet, and prep neighborhood comps.")
        }
        EventType::Showing => Some("Confirm property access and the lockbox code before heading out."),
        _ => None,
    }
}
