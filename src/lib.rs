//! Focus Timer - A Pomodoro countdown service
//!
//! This library provides a single countdown timer with looping ambient noise,
//! a persisted list of time-based reminders, and an HTTP API to drive them.

pub mod config;
pub mod state;
pub mod api;
pub mod services;
pub mod storage;
pub mod tasks;
pub mod timer;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use state::AppState;
pub use api::create_router;
pub use timer::TimerController;
pub use utils::signals::shutdown_signal;
