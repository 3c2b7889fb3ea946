use crate::db::connection::{init_db, Database};
use crate::router::App;
use astra::{Body, Request, Response};
use http::Method;
use std::io::Read;
use std::time::{SystemTime, UNIX_EPOCH};

/// Fresh App over a temp-file DB using the production schema. No SMS
/// transport or classifier: tests exercise the fallback paths.
pub fn make_app() -> App {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let path = std::env::temp_dir().join(format!("router_test_{nanos}.sqlite"));

    let db = Database::new(path);
    init_db(&db, "sql/schema.sql").unwrap_or_else(|e| panic!("Database initialization failed: {e}"));

    App {
        db,
        sms: None,
        classifier: None,
    }
}

pub fn get(path: &str) -> Request {
    http::Request::builder()
        .method(Method::GET)
        .uri(path)
        .body(Body::empty())
        .unwrap()
}

pub fn delete(path: &str) -> Request {
    http::Request::builder()
        .method(Method::DELETE)
        .uri(path)
        .body(Body::empty())
        .unwrap()
}

pub fn post_json(path: &str, body: serde_json::Value) -> Request {
    http::Request::builder()
        .method(Method::POST)
        .uri(path)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn body_json(resp: Response) -> serde_json::Value {
    let mut buf = Vec::new();
    resp.into_body().reader().read_to_end(&mut buf).unwrap();
    serde_json::from_slice(&buf).unwrap()
}
