//! Timer state structure

use serde::{Deserialize, Serialize};

use crate::timer::DisplayFrame;

/// Lifecycle phase of the countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerPhase {
    Idle,
    Running,
    Paused,
    Finished,
}

impl TimerPhase {
    pub fn is_running(&self) -> bool {
        matches!(self, TimerPhase::Running)
    }
}

/// Point-in-time view of the countdown, published after every change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerState {
    pub phase: TimerPhase,
    pub max_seconds: u64,
    pub remaining_seconds: u64,
    /// Text of the start/pause control
    pub control_label: String,
    pub display: DisplayFrame,
}

impl TimerState {
    /// Idle countdown showing a full ring
    pub fn idle(max_seconds: u64) -> Self {
        let display = crate::timer::CountdownDisplay::new(max_seconds).render();
        Self {
            phase: TimerPhase::Idle,
            max_seconds,
            remaining_seconds: max_seconds,
            control_label: "start".to_string(),
            display,
        }
    }
}
