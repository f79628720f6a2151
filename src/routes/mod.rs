use std::sync::Arc;

use axum::{
    http::{Method, StatusCode},
    middleware,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    db::MovieStore,
    middleware::request_id::{make_span_with_request_id, request_id_middleware},
    services::{pagination::PageDefaults, scoring::ScoringConfig},
};

pub mod movies;

/// Shared, read-only application state
pub struct AppState {
    pub store: Arc<dyn MovieStore>,
    pub scoring: ScoringConfig,
    pub page_defaults: PageDefaults,
}

impl AppState {
    pub fn new(store: Arc<dyn MovieStore>) -> Self {
        Self {
            store,
            scoring: ScoringConfig::default(),
            page_defaults: PageDefaults::default(),
        }
    }

    pub fn with_scoring(mut self, scoring: ScoringConfig) -> Self {
        self.scoring = scoring;
        self
    }

    pub fn with_page_defaults(mut self, page_defaults: PageDefaults) -> Self {
        self.page_defaults = page_defaults;
        self
    }
}

/// Success envelope wrapping every response body
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET]);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(cors)
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id)),
        )
}

/// Movie routes under /api
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/movies", get(movies::list))
        .route("/movies/search", get(movies::search))
        .route("/movies/trending", get(movies::trending))
        .route("/movies/:id", get(movies::get_by_id))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
