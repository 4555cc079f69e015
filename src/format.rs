use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::Value;

use crate::request::RequestParams;

// Historical mime type for both JSON and JSONP bodies
const MIME: &str = "application/javascript";

/// Serialize content as a JSON text body.
pub fn serve_json(content: &Value) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, MIME)],
        content.to_string(),
    )
        .into_response()
}

/// Wrap the content as `prefix(<json>)` when a usable callback prefix was
/// supplied; the literal string "undefined" does not count.
pub fn serve_jsonp(req: &RequestParams, content: &Value) -> Response {
    match req.prefix() {
        Some(prefix) if prefix != "undefined" => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, MIME)],
            format!("{}({})", prefix, content),
        )
            .into_response(),
        _ => serve_json(content),
    }
}

/// The silent no-op for unregistered actions and verbs. Deliberately not a
/// 404; callers treat it as "nothing to say".
pub fn serve_nothing() -> Response {
    StatusCode::NO_CONTENT.into_response()
}
