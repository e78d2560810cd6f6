//! Countdown tick driver background task

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::{state::AppState, tasks::scheduler::TickToken};

/// Background task that feeds fired ticks back into the timer controller
pub async fn countdown_ticker_task(state: Arc<AppState>, mut fired_rx: mpsc::UnboundedReceiver<TickToken>) {
    info!("Starting countdown ticker task");

    while let Some(token) = fired_rx.recv().await {
        match state.handle_tick(token) {
            Ok(true) => {
                if let Ok(timer) = state.get_timer_state() {
                    debug!("Tick {}: {} ({:?})", token.id(), timer.display.text, timer.phase);
                }
            }
            Ok(false) => debug!("Tick {} was no longer active", token.id()),
            Err(e) => error!("Failed to handle tick: {}", e),
        }
    }

    info!("Tick channel closed, countdown ticker task exiting");
}
