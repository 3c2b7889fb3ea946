// src/tests/router_tests/event_tests.rs

use crate::router::handle;
use crate::tests::utils::{body_json, delete, get, make_app, post_json};
use chrono::Utc;
use serde_json::json;

fn create_lead_with_urgency(app: &crate::router::App, urgency: i64) -> String {
    let req = post_json(
        "/submit-lead-form",
        json!({
            "name": "Jane Doe",
            "phone": "555-0100",
            "timeline": match urgency {
                90 => "within_1_month",
                60 => "3-6_months",
                30 => "just_browsing",
                _ => "unknown",
            },
            "source": "qr_buyer_open_house"
        }),
    );
    body_json(handle(req, app).unwrap())["lead_id"]
        .as_str()
        .unwrap()
        .to_string()
}

fn create_event(app: &crate::router::App, body: serde_json::Value) -> serde_json::Value {
    let resp = handle(post_json("/api/events", body), app).unwrap();
    assert_eq!(resp.status(), 200);
    body_json(resp)
}

#[test]
fn showing_for_urgent_lead_carries_priority_marker() {
    let app = make_app();
    let lead_id = create_lead_with_urgency(&app, 90);
    let now = Utc::now().timestamp();

    let event = create_event(
        &app,
        json!({
            "title": "Showing at 12 Oak St",
            "event_type": "showing",
            "start_time": now + 3600,
            "end_time": now + 7200,
            "lead_id": lead_id
        }),
    );

    let prep = event["ai_preparation"].as_str().unwrap();
    assert!(prep.contains(crate::events::prep::HIGH_PRIORITY_MARKER));
}

#[test]
fn meeting_without_lead_has_null_preparation() {
    let app = make_app();
    let now = Utc::now().timestamp();

    let event = create_event(
        &app,
        json!({
            "title": "Team sync",
            "event_type": "meeting",
            "start_time": now + 3600,
            "end_time": now + 7200
        }),
    );

    assert!(event["ai_preparation"].is_null());
}

#[test]
fn upcoming_respects_limit_window_and_completion() {
    let app = make_app();
    let now = Utc::now().timestamp();

    for (title, offset) in [("soon", 600), ("later", 1200), ("next week", 5 * 86_400)] {
        create_event(
            &app,
            json!({
                "title": title,
                "event_type": "call",
                "start_time": now + offset,
                "end_time": now + offset + 600
            }),
        );
    }
    let done = create_event(
        &app,
        json!({
            "title": "already handled",
            "event_type": "call",
            "start_time": now + 900,
            "end_time": now + 1500
        }),
    );
    handle(
        post_json(
            &format!("/api/events/{}/complete", done["id"].as_str().unwrap()),
            json!({ "completed": true }),
        ),
        &app,
    )
    .unwrap();

    let upcoming = body_json(handle(get("/api/events/upcoming?limit=10&days=1"), &app).unwrap());
    let titles: Vec<&str> = upcoming
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["soon", "later"]);

    let capped = body_json(handle(get("/api/events/upcoming?limit=1&days=1"), &app).unwrap());
    assert_eq!(capped.as_array().unwrap().len(), 1);
    assert_eq!(capped[0]["title"], "soon");
}

#[test]
fn upcoming_rejects_non_positive_limit_and_days() {
    let app = make_app();

    // a negative LIMIT would mean "unlimited" to sqlite
    for path in [
        "/api/events/upcoming?limit=-1",
        "/api/events/upcoming?limit=0",
        "/api/events/upcoming?days=-1",
        "/api/events/upcoming?days=0",
    ] {
        match handle(get(path), &app) {
            Err(crate::errors::ServerError::BadRequest(_)) => {}
            Ok(resp) => panic!("expected BadRequest, got status {}", resp.status()),
            Err(other) => panic!("expected BadRequest, got: {other:?}"),
        }
    }
}

#[test]
fn upcoming_events_are_enriched_with_their_lead() {
    let app = make_app();
    let lead_id = create_lead_with_urgency(&app, 50);
    let now = Utc::now().timestamp();

    create_event(
        &app,
        json!({
            "title": "Tour",
            "event_type": "showing",
            "start_time": now + 600,
            "end_time": now + 1200,
            "lead_id": lead_id
        }),
    );
    create_event(
        &app,
        json!({
            "title": "Solo errand",
            "event_type": "other",
            "start_time": now + 700,
            "end_time": now + 1300
        }),
    );

    let upcoming = body_json(handle(get("/api/events/upcoming"), &app).unwrap());
    assert_eq!(upcoming[0]["lead"]["name"], "Jane Doe");
    assert!(upcoming[1]["lead"].is_null());
}

#[test]
fn sparse_update_only_touches_supplied_fields() {
    let app = make_app();
    let now = Utc::now().timestamp();

    let event = create_event(
        &app,
        json!({
            "title": "Walkthrough",
            "description": "bring keys",
            "event_type": "showing",
            "start_time": now + 600,
            "end_time": now + 1200
        }),
    );
    let id = event["id"].as_str().unwrap().to_string();

    handle(
        post_json(&format!("/api/events/{id}"), json!({ "title": "Final walkthrough" })),
        &app,
    )
    .unwrap();

    let got = body_json(handle(get(&format!("/api/events/{id}")), &app).unwrap());
    assert_eq!(got["title"], "Final walkthrough");
    assert_eq!(got["description"], "bring keys");
    assert_eq!(got["event_type"], "showing");
}

#[test]
fn deleted_event_is_not_found_not_an_error() {
    let app = make_app();
    let now = Utc::now().timestamp();

    let event = create_event(
        &app,
        json!({
            "title": "Doomed",
            "event_type": "other",
            "start_time": now + 600,
            "end_time": now + 1200
        }),
    );
    let id = event["id"].as_str().unwrap().to_string();

    handle(delete(&format!("/api/events/{id}")), &app).unwrap();

    match handle(get(&format!("/api/events/{id}")), &app) {
        Err(crate::errors::ServerError::NotFound) => {}
        Ok(resp) => panic!("expected NotFound, got status {}", resp.status()),
        Err(other) => panic!("expected NotFound, got: {other:?}"),
    }
}

#[test]
fn range_query_is_inclusive_on_both_bounds() {
    let app = make_app();
    let base = Utc::now().timestamp() + 100_000;

    for (title, start) in [("lo", base), ("mid", base + 500), ("hi", base + 1000)] {
        create_event(
            &app,
            json!({
                "title": title,
                "event_type": "call",
                "start_time": start,
                "end_time": start + 100
            }),
        );
    }

    let path = format!("/api/events/range?start={base}&end={}", base + 1000);
    let in_range = body_json(handle(get(&path), &app).unwrap());
    assert_eq!(in_range.as_array().unwrap().len(), 3);

    let path = format!("/api/events/range?start={}&end={}", base + 1, base + 999);
    let inner = body_json(handle(get(&path), &app).unwrap());
    assert_eq!(inner.as_array().unwrap().len(), 1);
    assert_eq!(inner[0]["title"], "mid");
}

#[test]
fn bucketed_view_partitions_past_and_upcoming() {
    let app = make_app();
    let lead_id = create_lead_with_urgency(&app, 50);
    let now = Utc::now().timestamp();

    create_event(
        &app,
        json!({
            "title": "long ago",
            "event_type": "call",
            "start_time": now - 5000,
            "end_time": now - 4000,
            "lead_id": lead_id
        }),
    );
    create_event(
        &app,
        json!({
            "title": "coming up",
            "event_type": "call",
            "start_time": now + 5000,
            "end_time": now + 6000,
            "lead_id": lead_id
        }),
    );

    let buckets =
        body_json(handle(get(&format!("/api/leads/{lead_id}/events/bucketed")), &app).unwrap());
    assert_eq!(buckets["past"][0]["title"], "long ago");
    assert_eq!(buckets["upcoming"][0]["title"], "coming up");
    assert_eq!(buckets["past"].as_array().unwrap().len(), 1);
    assert_eq!(buckets["upcoming"].as_array().unwrap().len(), 1);
}

#[test]
fn event_with_unknown_lead_is_rejected() {
    let app = make_app();
    let now = Utc::now().timestamp();

    let req = post_json(
        "/api/events",
        json!({
            "title": "Tour",
            "event_type": "showing",
            "start_time": now + 600,
            "end_time": now + 1200,
            "lead_id": "lead_ghost"
        }),
    );
    match handle(req, &app) {
        Err(crate::errors::ServerError::BadRequest(_)) => {}
        Ok(resp) => panic!("expected BadRequest, got status {}", resp.status()),
        Err(other) => panic!("expected BadRequest, got: {other:?}"),
    }
}
