//! Background tasks module
//!
//! This module contains the tick scheduler and the background tasks that run
//! alongside the HTTP server.

pub mod countdown_ticker;
pub mod reminder_sync;
pub mod scheduler;

// Re-export main functions
pub use countdown_ticker::countdown_ticker_task;
pub use reminder_sync::reminder_sync_task;
pub use scheduler::{ManualScheduler, Scheduler, TickToken, TokioScheduler};
