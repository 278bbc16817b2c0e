//! HTTP read side: the projected snapshot and service health.

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use axum::{Json, Router};
use printwatch_core::{FlatSnapshot, PrinterState, StateAccumulator};
use std::sync::Arc;

use crate::health::{HealthTracker, MonitorHealth};

#[derive(Clone)]
pub struct AppState {
    pub accumulator: Arc<StateAccumulator>,
    pub health: HealthTracker,
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/system/health", get(get_system_health))
        .route("/printer", get(get_printer))
        .route("/printer/state", get(get_printer_state))
        .with_state(app_state)
        .layer(middleware::from_fn(require_api_key))
}

/// Optional API key check. `/health` is always open; with no
/// `PRINTWATCH_API_KEY` set the whole API is open (LAN deployments).
async fn require_api_key(req: Request, next: Next) -> Result<Response, StatusCode> {
    if req.uri().path().starts_with("/health") {
        return Ok(next.run(req).await);
    }

    let expected = std::env::var("PRINTWATCH_API_KEY").unwrap_or_default();
    if expected.is_empty() {
        return Ok(next.run(req).await);
    }

    let ok = req
        .headers()
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == expected)
        .unwrap_or(false);
    if !ok {
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(next.run(req).await)
}

/// Flattened snapshot, the storage/API record shape.
async fn get_printer(State(app): State<AppState>) -> Json<FlatSnapshot> {
    Json(app.accumulator.flatten())
}

/// Full typed snapshot including the per-tray AMS detail.
async fn get_printer_state(State(app): State<AppState>) -> Json<PrinterState> {
    Json(app.accumulator.project())
}

async fn get_system_health(State(app): State<AppState>) -> Json<MonitorHealth> {
    Json(app.health.get_health(&app.accumulator))
}
