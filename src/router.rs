use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::{Json, Response};
use axum::routing::get;
use axum::Router;
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::warn;

use crate::auth;
use crate::config::AppConfig;
use crate::endpoint::Endpoint;
use crate::error::ApiError;
use crate::format::{serve_jsonp, serve_nothing};
use crate::request::RequestParams;
use crate::service::SheetService;
use crate::store::{SheetStore, StoreError};

/// A registered top-level route.
#[derive(Debug, Clone)]
enum Route {
    /// Catch-all: every unprotected sheet plus the change-detection hash.
    AllData,
    /// Change detection: full data only when the caller's hash is stale.
    Poll,
    /// Auth-gated per-sheet endpoint.
    Api(Endpoint),
}

/// Application state shared across requests: the config, the sheet service
/// with its process-wide cache, and the action registry.
pub struct AppState {
    pub config: AppConfig,
    pub service: SheetService,
    routes: HashMap<String, Route>,
}

impl AppState {
    /// Build the route registry: the `none` and `poll` built-ins plus one
    /// api route per sheet the store lists. Protected sheets keep their api
    /// route; they are only excluded from the catch-all. Endpoints capture
    /// their header lists here, so a schema change needs a rebuild.
    pub fn new(config: AppConfig, store: Arc<dyn SheetStore>) -> Result<Self, StoreError> {
        let service = SheetService::new(store.clone(), config.sheets.protected.clone());

        let mut routes = HashMap::new();
        routes.insert("none".to_string(), Route::AllData);
        routes.insert("poll".to_string(), Route::Poll);
        for info in store.list_sheets()? {
            let endpoint = Endpoint::build(&info.name, &service)?;
            routes.insert(info.name, Route::Api(endpoint));
        }

        Ok(Self {
            config,
            service,
            routes,
        })
    }
}

/// Assemble the axum application over the shared state.
pub fn app(state: Arc<AppState>) -> Router {
    let enable_cors = state.config.server.enable_cors;

    let router = Router::new()
        .route("/", get(dispatch).post(dispatch))
        .route("/health", get(health))
        .with_state(state);

    let router = if enable_cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    };

    router.layer(TraceLayer::new_for_http())
}

/// Handler for `/`. GET and POST are handled identically; everything routes
/// on the `action` query parameter, defaulting to the `none` route.
pub async fn dispatch(
    State(app): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
    let req = RequestParams::from_pairs(pairs);

    let route = match req.action() {
        Some(action) => app.routes.get(action),
        None => app.routes.get("none"),
    };

    match route {
        Some(Route::AllData) => {
            let data = app.service.all_data()?;
            Ok(serve_jsonp(&req, &data))
        }
        Some(Route::Poll) => {
            let data = app.service.all_data()?;
            let current = data
                .get("hash")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            if req.hash() == Some(current.as_str()) {
                Ok(serve_jsonp(&req, &Value::String(current)))
            } else {
                Ok(serve_jsonp(&req, &data))
            }
        }
        Some(Route::Api(endpoint)) => {
            auth::do_api_route(&req, endpoint, &app.service, &app.config.api)
        }
        None => {
            warn!(action = req.action().unwrap_or(""), "request for unregistered action");
            Ok(serve_nothing())
        }
    }
}

async fn health() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "status": "ok",
            "timestamp": chrono::Utc::now()
        }
    }))
}
