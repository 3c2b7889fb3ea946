use crate::errors::ServerError;
use astra::{Body, Response, ResponseBuilder};

/// Convert a ServerError into a proper JSON response.
pub fn error_to_response(err: ServerError) -> Response {
    match err {
        ServerError::NotFound => json_error_response(404, "not found"),
        ServerError::BadRequest(msg) => json_error_response(400, &msg),
        ServerError::DbError(msg) => {
            eprintln!("db error: {msg}");
            // Internal detail never leaks to the caller.
            json_error_response(500, "internal server error")
        }
        ServerError::InternalError => json_error_response(500, "internal server error"),
    }
}

/// Build a JSON error body: {"error": "..."}.
pub fn json_error_response(status: u16, message: &str) -> Response {
    let body = serde_json::json!({ "error": message }).to_string();

    ResponseBuilder::new()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Body::from(body))
        .unwrap()
}
