//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and response structures.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/timer/start", post(start_handler))
        .route("/timer/pause", post(pause_handler))
        .route("/timer/reset", post(reset_handler))
        .route("/timer/duration", put(duration_handler))
        // Fixed noise routes take precedence over the :kind capture
        .route("/noise/pause", post(noise_pause_handler))
        .route("/noise/resume", post(noise_resume_handler))
        .route("/noise/stop", post(noise_stop_handler))
        .route("/noise/:kind", post(noise_play_handler))
        .route("/reminders", get(list_reminders_handler).post(add_reminder_handler))
        .route("/reminders/:id", delete(delete_reminder_handler))
        .route("/settings", get(get_settings_handler).put(put_settings_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
