//! Countdown timer module
//!
//! This module contains the countdown display, the clock abstraction and the
//! controller that drives both from scheduled ticks.

pub mod clock;
pub mod controller;
pub mod countdown;

// Re-export main types
pub use clock::{Clock, ManualClock, SystemClock};
pub use controller::{duration_seconds, TimerController, TimerEvent, TICK_INTERVAL};
pub use countdown::{format_mm_ss, CountdownDisplay, DisplayFrame};
