//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Json,
};
use tracing::{error, info, warn};

use crate::{services::NoiseKind, state::AppState, timer::duration_seconds};
use super::responses::{
    AddReminderRequest, ApiResponse, DurationRequest, ErrorResponse, HealthResponse,
    PlaybackResponse, ReminderListResponse, ReminderView, SettingsBody, StatusResponse,
};

/// Error half of every handler result
pub type ApiError = (StatusCode, Json<ErrorResponse>);

fn internal_error(message: String) -> ApiError {
    error!("{}", message);
    (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse::new(message)))
}

fn bad_request(message: String) -> ApiError {
    warn!("Rejected request: {}", message);
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(message)))
}

/// Unwrap a JSON body, turning extractor rejections into a 400
fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| bad_request(rejection.body_text()))
}

/// Handle POST /timer/start - Start or continue the countdown
pub async fn start_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, ApiError> {
    let timer = state.start_timer().map_err(internal_error)?;
    info!("Start endpoint called - {}s remaining", timer.remaining_seconds);
    Ok(Json(ApiResponse::new("Timer started", timer)))
}

/// Handle POST /timer/pause - Pause the countdown
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, ApiError> {
    let timer = state.pause_timer().map_err(internal_error)?;
    info!("Pause endpoint called - {}s remaining", timer.remaining_seconds);
    Ok(Json(ApiResponse::new("Timer paused", timer)))
}

/// Handle POST /timer/reset - Reset the countdown
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, ApiError> {
    let timer = state.reset_timer().map_err(internal_error)?;
    info!("Reset endpoint called");
    Ok(Json(ApiResponse::new("Timer reset", timer)))
}

/// Handle PUT /timer/duration - Change the interval length
pub async fn duration_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<DurationRequest>, JsonRejection>,
) -> Result<Json<ApiResponse>, ApiError> {
    let request = json_body(body)?;
    duration_seconds(request.minutes).map_err(bad_request)?;
    let timer = state.set_duration(request.minutes).map_err(internal_error)?;
    info!("Duration endpoint called - {} min", request.minutes);
    Ok(Json(ApiResponse::new(
        format!("Timer length set to {} minutes", request.minutes),
        timer,
    )))
}

/// Handle POST /noise/:kind - Select and play a noise
pub async fn noise_play_handler(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
) -> Result<Json<PlaybackResponse>, ApiError> {
    let kind: NoiseKind = kind.parse().map_err(bad_request)?;
    let playback = state.play_noise(kind).map_err(internal_error)?;

    // An unavailable track is not an error, the player just stays silent
    let message = if playback.is_playing {
        format!("Playing {} noise", kind)
    } else {
        format!("{} noise is unavailable", kind)
    };
    Ok(Json(PlaybackResponse::new(message, playback)))
}

/// Handle POST /noise/pause
pub async fn noise_pause_handler(State(state): State<Arc<AppState>>) -> Result<Json<PlaybackResponse>, ApiError> {
    let playback = state.pause_noise().map_err(internal_error)?;
    Ok(Json(PlaybackResponse::new("Noise paused", playback)))
}

/// Handle POST /noise/resume
pub async fn noise_resume_handler(State(state): State<Arc<AppState>>) -> Result<Json<PlaybackResponse>, ApiError> {
    let playback = state.resume_noise().map_err(internal_error)?;
    Ok(Json(PlaybackResponse::new("Noise resumed", playback)))
}

/// Handle POST /noise/stop
pub async fn noise_stop_handler(State(state): State<Arc<AppState>>) -> Result<Json<PlaybackResponse>, ApiError> {
    let playback = state.stop_noise().map_err(internal_error)?;
    Ok(Json(PlaybackResponse::new("Noise stopped", playback)))
}

/// Handle GET /reminders - List reminders by due time
pub async fn list_reminders_handler(State(state): State<Arc<AppState>>) -> Json<ReminderListResponse> {
    let now = state.reminders.now_millis();
    let reminders = state
        .reminders
        .sorted_for_display()
        .into_iter()
        .map(|r| ReminderView::from_reminder(r, now))
        .collect();

    Json(ReminderListResponse {
        reminders,
        last_update: state.reminders.last_update(),
    })
}

/// Handle POST /reminders - Add a reminder
pub async fn add_reminder_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<AddReminderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ReminderView>), ApiError> {
    let request = json_body(body)?;
    match state.add_reminder(&request.text, &request.minutes_input()) {
        Ok(reminder) => {
            info!("Reminder endpoint called - added {}", reminder.id);
            let now = state.reminders.now_millis();
            Ok((StatusCode::CREATED, Json(ReminderView::from_reminder(reminder, now))))
        }
        Err(e) if e.is_invalid_input() => Err(bad_request(e.to_string())),
        Err(e) => Err(internal_error(format!("Failed to save reminder: {}", e))),
    }
}

/// Handle DELETE /reminders/:id - Delete a reminder
pub async fn delete_reminder_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    match state.delete_reminder(&id) {
        Ok(0) => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(format!("No reminder with id {}", id))),
        )),
        Ok(_) => Ok(StatusCode::NO_CONTENT),
        Err(e) => Err(internal_error(format!("Failed to delete reminder: {}", e))),
    }
}

/// Handle GET /settings
pub async fn get_settings_handler(State(state): State<Arc<AppState>>) -> Json<SettingsBody> {
    Json(SettingsBody {
        sync_audio: state.settings.sync_audio(),
    })
}

/// Handle PUT /settings - Toggle the sync-audio flag
pub async fn put_settings_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SettingsBody>, JsonRejection>,
) -> Result<Json<SettingsBody>, ApiError> {
    let body = json_body(body)?;
    state
        .set_sync_audio(body.sync_audio)
        .map_err(|e| internal_error(format!("Failed to save settings: {}", e)))?;
    Ok(Json(body))
}

/// Handle GET /status - Return timer, display and playback status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, ApiError> {
    let (timer, playback, selected_noise) = {
        let controller = state
            .controller
            .lock()
            .map_err(|e| internal_error(format!("Failed to lock timer controller: {}", e)))?;
        (controller.snapshot(), controller.playback_state(), controller.selected_noise())
    };

    let now = state.reminders.now_millis();
    let pending_reminders = state
        .reminders
        .load()
        .iter()
        .filter(|r| !r.triggered && r.time > now)
        .count();
    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        timer,
        playback,
        selected_noise,
        sync_audio: state.settings.sync_audio(),
        pending_reminders,
        notices: state.recent_notices(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
