// src/tests/router_tests/form_tests.rs

use crate::db::jobs;
use crate::notifier;
use crate::router::handle;
use crate::tests::utils::{body_json, get, make_app, post_json};
use chrono::Utc;
use serde_json::json;

#[test]
fn seller_form_submission_scores_and_classifies() {
    let app = make_app();

    let req = post_json(
        "/submit-lead-form",
        json!({
            "name": "Jane Doe",
            "phone": "555-0100",
            "timeline": "within_1_month",
            "source": "sms_link_seller_form"
        }),
    );
    let resp = handle(req, &app).unwrap();
    assert_eq!(resp.status(), 200);

    let body = body_json(resp);
    assert_eq!(body["intent"], "seller");
    assert_eq!(body["urgency_score"], 90);

    let lead_id = body["lead_id"].as_str().unwrap().to_string();
    let resp = handle(get(&format!("/api/leads/{lead_id}")), &app).unwrap();
    let lead = body_json(resp);
    assert_eq!(lead["status"], "new");
    assert_eq!(lead["intent"], "seller");
    assert_eq!(lead["urgency_score"], 90);
}

#[test]
fn buyer_form_without_timeline_defaults_to_50() {
    let app = make_app();

    let req = post_json(
        "/submit-lead-form",
        json!({
            "name": "Sam",
            "phone": "555-0101",
            "source": "qr_buyer_open_house"
        }),
    );
    let resp = handle(req, &app).unwrap();
    assert_eq!(resp.status(), 200);

    let body = body_json(resp);
    assert_eq!(body["intent"], "buyer");
    assert_eq!(body["urgency_score"], 50);
}

#[test]
fn submission_enqueues_a_follow_up_five_seconds_out() {
    let app = make_app();
    let before = Utc::now().timestamp();

    let req = post_json(
        "/submit-lead-form",
        json!({
            "name": "Jane Doe",
            "phone": "555-0100",
            "property_address": "12 Oak St, Provo, UT",
            "source": "sms_link_seller_form"
        }),
    );
    handle(req, &app).unwrap();

    let job = app
        .db
        .with_conn(|conn| jobs::get_job(conn, 1))
        .unwrap()
        .expect("one job enqueued");
    assert_eq!(job.status, jobs::STATUS_PENDING);
    assert!(job.run_at >= before + 5);

    let payload: jobs::FollowUpPayload = serde_json::from_str(&job.payload).unwrap();
    assert_eq!(payload.phone, "555-0100");
    assert_eq!(payload.lead_name, "Jane Doe");
    assert_eq!(payload.property_address.as_deref(), Some("12 Oak St, Provo, UT"));
}

#[test]
fn notification_failure_never_touches_the_lead() {
    let app = make_app();

    let req = post_json(
        "/submit-lead-form",
        json!({
            "name": "Jane Doe",
            "phone": "555-0100",
            "source": "sms_link_seller_form"
        }),
    );
    let lead_id = body_json(handle(req, &app).unwrap())["lead_id"]
        .as_str()
        .unwrap()
        .to_string();

    // Worker runs with no SMS transport: the job fails quietly.
    let later = Utc::now().timestamp() + 10;
    let handled = notifier::process_due_jobs(&app.db, None, later).unwrap();
    assert_eq!(handled, 1);

    let job = app
        .db
        .with_conn(|conn| jobs::get_job(conn, 1))
        .unwrap()
        .unwrap();
    assert_eq!(job.status, jobs::STATUS_FAILED);

    // The lead is still there, untouched.
    let resp = handle(get(&format!("/api/leads/{lead_id}")), &app).unwrap();
    assert_eq!(resp.status(), 200);
}

#[test]
fn form_errors_flatten_to_generic_500() {
    let app = make_app();

    // missing phone: validation failure, but this route leaks nothing
    let req = post_json("/submit-lead-form", json!({ "name": "Jane Doe", "phone": "" }));
    let resp = handle(req, &app).unwrap();
    assert_eq!(resp.status(), 500);
    assert_eq!(body_json(resp)["error"], "internal server error");

    // and no lead was written
    let resp = handle(get("/api/leads"), &app).unwrap();
    assert_eq!(body_json(resp).as_array().unwrap().len(), 0);
}

#[test]
fn ai_suggestion_references_the_street_line() {
    let app = make_app();

    let req = post_json(
        "/submit-lead-form",
        json!({
            "name": "Jane Doe",
            "phone": "555-0100",
            "property_address": "12 Oak St, Provo, UT",
            "source": "sms_link_seller_form"
        }),
    );
    let lead_id = body_json(handle(req, &app).unwrap())["lead_id"]
        .as_str()
        .unwrap()
        .to_string();

    let lead = body_json(handle(get(&format!("/api/leads/{lead_id}")), &app).unwrap());
    let suggestion = lead["ai_suggestion"].as_str().unwrap();
    assert!(suggestion.contains("12 Oak St"));
    assert!(!suggestion.contains("Provo"));

    // no address: falls back to "property"
    let req = post_json(
        "/submit-lead-form",
        json!({ "name": "Sam", "phone": "555-0101", "source": "qr_buyer_open_house" }),
    );
    let lead_id = body_json(handle(req, &app).unwrap())["lead_id"]
        .as_str()
        .unwrap()
        .to_string();
    let lead = body_json(handle(get(&format!("/api/leads/{lead_id}")), &app).unwrap());
    assert!(lead["ai_suggestion"].as_str().unwrap().contains("property"));
}
