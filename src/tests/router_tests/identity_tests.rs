// src/tests/router_tests/identity_tests.rs

use crate::db::users;
use crate::router::handle;
use crate::tests::utils::{make_app, post_json};
use serde_json::json;

#[test]
fn upsert_webhook_is_idempotent_on_external_id() {
    let app = make_app();

    let req = post_json(
        "/api/identity/upsert",
        json!({ "external_id": "idp|42", "name": "Ann", "email": "ann@example.com" }),
    );
    handle(req, &app).unwrap();

    // provider re-sends with updated profile
    let req = post_json(
        "/api/identity/upsert",
        json!({
            "external_id": "idp|42",
            "name": "Ann Lee",
            "email": "ann@example.com",
            "image_url": "https://img.example/ann.png"
        }),
    );
    handle(req, &app).unwrap();

    let user = app
        .db
        .with_conn(|conn| users::get_user_by_external_id(conn, "idp|42"))
        .unwrap()
        .unwrap();
    assert_eq!(user.name, "Ann Lee");

    let count: i64 = app
        .db
        .with_conn(|conn| {
            conn.query_row("select count(*) from users", [], |r| r.get(0))
                .map_err(|e| crate::errors::ServerError::DbError(e.to_string()))
        })
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn delete_webhook_tolerates_replays() {
    let app = make_app();

    let req = post_json(
        "/api/identity/upsert",
        json!({ "external_id": "idp|7", "name": "Bo", "email": "bo@example.com" }),
    );
    handle(req, &app).unwrap();

    for _ in 0..2 {
        let req = post_json("/api/identity/delete", json!({ "external_id": "idp|7" }));
        handle(req, &app).unwrap();
    }

    let user = app
        .db
        .with_conn(|conn| users::get_user_by_external_id(conn, "idp|7"))
        .unwrap();
    assert!(user.is_none());
}
