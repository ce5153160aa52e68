use std::time::UNIX_EPOCH;

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tower_http::trace::TraceLayer;

use crate::{
    constants::{version::get_version, STARTUP_TIME},
    Data,
};

pub mod dashboard;
pub mod quote;
pub mod source;

pub fn router(data: Data) -> Router {
    Router::new()
        .route("/", get(quote::random_quote))
        .route("/quotes", get(quote::all_quotes).post(quote::add_quote))
        .route("/quotes/{id}/vote", post(quote::vote))
        .route("/popular", get(quote::popular_quotes))
        .route("/sources", post(source::add_source))
        .route("/dashboard", get(dashboard::dashboard))
        .route("/healthz", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(data)
}

#[tracing::instrument(skip_all)]
async fn health(State(data): State<Data>) -> impl IntoResponse {
    let started = STARTUP_TIME
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();

    let (status, db) = match sqlx::query("SELECT 1;").execute(&data.db).await {
        Ok(_) => (StatusCode::OK, "ok"),
        Err(e) => {
            tracing::error!(err = ?e, "an error occurred when pinging the database");
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
        }
    };

    (
        status,
        Json(serde_json::json!({
            "status": if status.is_success() { "ok" } else { "degraded" },
            "database": db,
            "version": get_version(),
            "started_at": started,
        })),
    )
}
