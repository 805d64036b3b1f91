//! HTTP route handlers for the drawing archive API.
//!
//! Each entity gets the same set of endpoints under its own prefix
//! (`/drawing`, `/runtime`, `/searchdata`, `/feedback`, `/history`):
//! `save`, `save-all`, `delete/{id}`, `get/{id}` and `get-all`, plus the
//! by-parent lookups where a foreign key exists.
//!
//! - `health`: liveness, readiness and version endpoints

pub mod drawings;
pub mod extract;
pub mod feedbacks;
pub mod health;
pub mod history;
pub mod runtimes;
pub mod search_data;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{config::HttpConfig, state::AppState};

/// Builds the full application router with its layers.
pub fn router(state: AppState) -> Router {
    let http = state.config.http.clone();

    Router::new()
        .route("/healthz", get(health::healthz))
        .route("/readyz", get(health::readyz))
        .route("/version", get(health::version))
        .nest("/drawing", drawing_routes())
        .nest("/runtime", runtime_routes())
        .nest("/searchdata", search_data_routes())
        .nest("/feedback", feedback_routes())
        .nest("/history", history_routes())
        .with_state(state)
        .layer(DefaultBodyLimit::max(http.max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&http))
}

fn drawing_routes() -> Router<AppState> {
    Router::new()
        .route("/save", post(drawings::save))
        .route("/save-all", post(drawings::save_all))
        .route("/delete/{id}", delete(drawings::delete))
        .route("/get/{id}", get(drawings::get))
        .route("/get-all", get(drawings::get_all))
}

fn runtime_routes() -> Router<AppState> {
    Router::new()
        .route("/save", post(runtimes::save))
        .route("/save-all", post(runtimes::save_all))
        .route("/delete/{id}", delete(runtimes::delete))
        .route("/get/{id}", get(runtimes::get))
        .route("/get-all", get(runtimes::get_all))
        .route("/get-for-drawing/{id}", get(runtimes::get_for_drawing))
        .route("/delete-for-drawing/{id}", delete(runtimes::delete_for_drawing))
}

fn search_data_routes() -> Router<AppState> {
    Router::new()
        .route("/save", post(search_data::save))
        .route("/save-all", post(search_data::save_all))
        .route("/delete/{id}", delete(search_data::delete))
        .route("/get/{id}", get(search_data::get))
        .route("/get-all", get(search_data::get_all))
        .route("/get-for-drawing/{id}", get(search_data::get_for_drawing))
        .route("/delete-for-drawing/{id}", delete(search_data::delete_for_drawing))
}

fn feedback_routes() -> Router<AppState> {
    Router::new()
        .route("/save", post(feedbacks::save))
        .route("/save-all", post(feedbacks::save_all))
        .route("/delete/{id}", delete(feedbacks::delete))
        .route("/get/{id}", get(feedbacks::get))
        .route("/get-all", get(feedbacks::get_all))
        .route("/get-for-history/{id}", get(feedbacks::get_for_history))
}

fn history_routes() -> Router<AppState> {
    Router::new()
        .route("/save", post(history::save))
        .route("/save-all", post(history::save_all))
        .route("/delete/{id}", delete(history::delete))
        .route("/get/{id}", get(history::get))
        .route("/get-all", get(history::get_all))
}

fn cors_layer(http: &HttpConfig) -> CorsLayer {
    if http.cors_is_permissive() {
        return CorsLayer::permissive();
    }
    let origins: Vec<HeaderValue> = http
        .cors_allowed_origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o.trim()) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}: {}", o, e);
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}
