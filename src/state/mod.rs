//! State management module
//!
//! This module contains all state-related structures and their management logic.

pub mod app_state;
pub mod reminder;
pub mod timer_state;

// Re-export main types
pub use app_state::{AppState, Notice};
pub use reminder::Reminder;
pub use timer_state::{TimerPhase, TimerState};
