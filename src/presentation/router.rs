// HTTP routes
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    earliest_timestamp, get_data, latest_timestamp, list_data_dates, list_metadata, list_topics,
    ping,
};
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

/// All API routes, mounted under `/_/`.
pub fn build_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/ping", get(ping))
        .route("/topics", get(list_topics))
        .route("/meta", get(list_metadata))
        .route("/data", get(get_data))
        .route("/data/dates", get(list_data_dates))
        .route("/data/timestamp/earliest", get(earliest_timestamp))
        .route("/data/timestamp/latest", get(latest_timestamp));

    Router::new()
        .nest("/_", api)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
