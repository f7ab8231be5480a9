//! HTTP handlers: health check and debug views.

use std::sync::Arc;

use axum::{Json, extract::State};

use crate::domain::PresenceSnapshot;
use crate::ui::state::AppState;

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Debug endpoint: snapshot of current connections and room memberships
pub async fn debug_presence(State(state): State<Arc<AppState>>) -> Json<PresenceSnapshot> {
    Json(state.registry.snapshot().await)
}
