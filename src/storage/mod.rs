//! Persistence module
//!
//! This module contains the namespaced key-value store and the reminder and
//! settings stores built on top of it.

pub mod error;
pub mod kv;
pub mod reminders;
pub mod settings;

// Re-export main types
pub use error::{ReminderError, StoreError};
pub use kv::{JsonFileStore, KeyValueStore, MemoryStore};
pub use reminders::{ReminderChange, ReminderStore};
pub use settings::SettingsStore;
