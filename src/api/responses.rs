//! API request and response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    services::{NoiseKind, PlaybackState},
    state::{Notice, Reminder, TimerState},
};

/// Response for timer control endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer: TimerState,
}

impl ApiResponse {
    /// Create a new API response; status follows the timer phase
    pub fn new(message: impl Into<String>, timer: TimerState) -> Self {
        let status = serde_json::to_value(timer.phase)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();
        Self {
            status,
            message: message.into(),
            timestamp: Utc::now(),
            timer,
        }
    }
}

/// Response for noise control endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackResponse {
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub playback: PlaybackState,
}

impl PlaybackResponse {
    pub fn new(message: impl Into<String>, playback: PlaybackState) -> Self {
        Self {
            message: message.into(),
            timestamp: Utc::now(),
            playback,
        }
    }
}

/// Error body returned with 4xx/5xx status codes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Full status: timer, display, playback, settings and recent notices
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub timer: TimerState,
    pub playback: PlaybackState,
    pub selected_noise: Option<NoiseKind>,
    pub sync_audio: bool,
    pub pending_reminders: usize,
    pub notices: Vec<Notice>,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// One reminder as shown in the listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderView {
    pub id: String,
    pub time: i64,
    pub text: String,
    #[serde(rename = "isTriggered")]
    pub triggered: bool,
    /// Relative due time, e.g. "3m 20s" or "expired"
    pub due_in: String,
}

impl ReminderView {
    pub fn from_reminder(reminder: Reminder, now_millis: i64) -> Self {
        let due_in = reminder.relative_due_text(now_millis);
        Self {
            id: reminder.id,
            time: reminder.time,
            text: reminder.text,
            triggered: reminder.triggered,
            due_in,
        }
    }
}

/// Reminder listing sorted by due time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderListResponse {
    pub reminders: Vec<ReminderView>,
    pub last_update: Option<i64>,
}

/// Body of POST /reminders; minutes may be a number or a string
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddReminderRequest {
    pub text: String,
    pub minutes: Value,
}

impl AddReminderRequest {
    /// The delay exactly as the user typed it
    pub fn minutes_input(&self) -> String {
        match &self.minutes {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Body of PUT /timer/duration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DurationRequest {
    pub minutes: u64,
}

/// Body and response of the settings endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsBody {
    pub sync_audio: bool,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn minutes_input_accepts_numbers_and_strings() {
        let numeric: AddReminderRequest =
            serde_json::from_value(json!({"text": "a", "minutes": 5})).unwrap();
        assert_eq!(numeric.minutes_input(), "5");

        let text: AddReminderRequest =
            serde_json::from_value(json!({"text": "a", "minutes": "abc"})).unwrap();
        assert_eq!(text.minutes_input(), "abc");
    }

    #[test]
    fn api_response_status_follows_phase() {
        let response = ApiResponse::new("ok", TimerState::idle(60));
        assert_eq!(response.status, "idle");
        assert_eq!(response.timer.display.text, "01:00");
    }
}
