use axum::response::Response;
use serde_json::{json, Value};
use tracing::warn;

use crate::config::ApiConfig;
use crate::endpoint::{Endpoint, Verb};
use crate::error::ApiError;
use crate::format::{serve_json, serve_nothing};
use crate::mapper::Record;
use crate::request::RequestParams;
use crate::service::SheetService;
use crate::store::StoreError;

/// The payload body sent back on a failed credential check.
pub const AUTH_ERROR: &str = "user parameters for API access are incorrect";

/// Rows of the reserved `apiusers` sheet matching the request credentials.
pub fn find_api_users(
    req: &RequestParams,
    service: &SheetService,
) -> Result<Vec<Record>, StoreError> {
    let userid = req.userid().unwrap_or_default();
    let userkey = req.userkey().unwrap_or_default();
    Ok(service
        .sheet_values("apiusers")?
        .into_iter()
        .filter(|user| {
            user.get("apiUser").and_then(Value::as_str) == Some(userid)
                && user.get("apiKey").and_then(Value::as_str) == Some(userkey)
        })
        .collect())
}

/// The API-sheet pipeline: credential check first, then the verb handler
/// named by the request's `method` parameter.
///
/// A failed check is a structured JSON payload, not an HTTP error status. A
/// valid user asking for an unknown verb gets a logged empty response.
pub fn do_api_route(
    req: &RequestParams,
    endpoint: &Endpoint,
    service: &SheetService,
    api: &ApiConfig,
) -> Result<Response, ApiError> {
    let users = find_api_users(req, service)?;
    if users.first().is_none() {
        return Ok(serve_json(&json!({ "error": AUTH_ERROR })));
    }

    match Verb::parse(req.method()) {
        Some(verb) => {
            let result = endpoint.handle(verb, req, service, api)?;
            Ok(serve_json(&result))
        }
        None => {
            warn!(
                sheet = endpoint.sheet(),
                method = req.method(),
                "request for unknown api verb"
            );
            Ok(serve_nothing())
        }
    }
}
