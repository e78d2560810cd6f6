//! Keeps the controller's reminder copy in step with the store

use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::state::AppState;

/// Background task that reloads the in-memory reminders after every store change
pub async fn reminder_sync_task(state: Arc<AppState>) {
    info!("Starting reminder sync task");

    let mut changes = state.reminders.subscribe();

    // Catch up on anything saved before we subscribed
    if let Err(e) = state.reload_reminders(state.reminders.load()) {
        warn!("Failed to load reminders: {}", e);
    }

    loop {
        match changes.recv().await {
            Ok(change) => {
                debug!("Reminder list changed at {}, {} entries", change.updated_at, change.reminders.len());
                if let Err(e) = state.reload_reminders(change.reminders) {
                    warn!("Failed to refresh reminders: {}", e);
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                // Missed intermediate lists; the store holds the latest one
                warn!("Reminder sync lagged by {} changes, reloading", skipped);
                if let Err(e) = state.reload_reminders(state.reminders.load()) {
                    warn!("Failed to refresh reminders: {}", e);
                }
            }
            Err(RecvError::Closed) => {
                info!("Reminder change channel closed, sync task exiting");
                break;
            }
        }
    }
}
