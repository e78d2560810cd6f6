//! Main application state management

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
    time::Instant,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, watch};
use tracing::{info, warn};

use super::{Reminder, TimerState};
use crate::{
    services::{NoiseKind, PlaybackState},
    storage::{ReminderError, ReminderStore, SettingsStore, StoreError},
    tasks::scheduler::TickToken,
    timer::{TimerController, TimerEvent},
};

/// How many user-visible notices are kept for the status endpoint
const MAX_NOTICES: usize = 20;

/// A user-visible message, e.g. a reminder that just fired
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub message: String,
    pub reminder_id: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Shared application state: the timer controller plus the stores it works with
pub struct AppState {
    /// Countdown state machine; all mutations go through this lock
    pub controller: Arc<Mutex<TimerController>>,
    pub reminders: Arc<ReminderStore>,
    pub settings: Arc<SettingsStore>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
    /// Recent user-visible notices, newest last
    pub notices: Arc<Mutex<VecDeque<Notice>>>,
    /// Timer events forwarded from the controller
    pub events_tx: broadcast::Sender<TimerEvent>,
    /// Channel for timer updates
    pub timer_update_tx: watch::Sender<TimerState>,
    /// Keep the receiver alive to prevent channel closure
    pub _timer_update_rx: watch::Receiver<TimerState>,
}

impl AppState {
    /// Create the application state around an idle controller
    pub fn new(
        port: u16,
        host: String,
        controller: TimerController,
        reminders: Arc<ReminderStore>,
        settings: Arc<SettingsStore>,
    ) -> Self {
        let snapshot = controller.snapshot();
        let (timer_update_tx, timer_update_rx) = watch::channel(snapshot);
        let (events_tx, _) = broadcast::channel(100);

        Self {
            controller: Arc::new(Mutex::new(controller)),
            reminders,
            settings,
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
            notices: Arc::new(Mutex::new(VecDeque::new())),
            events_tx,
            timer_update_tx,
            _timer_update_rx: timer_update_rx,
        }
    }

    /// Run `action` against the controller, then publish the new timer state
    pub fn with_controller<F, R>(&self, action: &str, f: F) -> Result<R, String>
    where
        F: FnOnce(&mut TimerController) -> R,
    {
        let mut controller = self.controller.lock()
            .map_err(|e| format!("Failed to lock timer controller: {}", e))?;

        let mut events = controller.subscribe();
        let result = f(&mut *controller);
        let snapshot = controller.snapshot();
        drop(controller); // Release the lock early

        self.record_action(action);
        while let Ok(event) = events.try_recv() {
            self.forward_event(event);
        }
        if let Err(e) = self.timer_update_tx.send(snapshot) {
            warn!("Failed to send timer update: {}", e);
        }

        Ok(result)
    }

    /// Start or continue the countdown
    pub fn start_timer(&self) -> Result<TimerState, String> {
        let sync_audio = self.settings.sync_audio();
        self.with_controller("start", |c| {
            c.start(sync_audio);
            c.snapshot()
        })
    }

    /// Pause the countdown
    pub fn pause_timer(&self) -> Result<TimerState, String> {
        let sync_audio = self.settings.sync_audio();
        self.with_controller("pause", |c| {
            c.pause(sync_audio);
            c.snapshot()
        })
    }

    /// Reset the countdown to its full length
    pub fn reset_timer(&self) -> Result<TimerState, String> {
        self.with_controller("reset", |c| {
            c.reset();
            c.snapshot()
        })
    }

    /// Change the countdown length in minutes
    pub fn set_duration(&self, minutes: u64) -> Result<TimerState, String> {
        self.with_controller("duration", |c| {
            c.set_duration(minutes).map(|()| c.snapshot())
        })?
    }

    /// Feed a fired tick into the controller
    pub fn handle_tick(&self, token: TickToken) -> Result<bool, String> {
        let sync_audio = self.settings.sync_audio();
        let mut controller = self.controller.lock()
            .map_err(|e| format!("Failed to lock timer controller: {}", e))?;

        let mut events = controller.subscribe();
        let accepted = controller.on_tick(token, sync_audio);
        let snapshot = controller.snapshot();
        drop(controller);

        while let Ok(event) = events.try_recv() {
            self.forward_event(event);
        }
        if accepted {
            if let Err(e) = self.timer_update_tx.send(snapshot) {
                warn!("Failed to send timer update: {}", e);
            }
        }
        Ok(accepted)
    }

    /// Select a noise and play it now
    pub fn play_noise(&self, kind: NoiseKind) -> Result<PlaybackState, String> {
        self.with_controller("noise-play", |c| {
            c.play_noise(kind);
            c.playback_state()
        })
    }

    pub fn pause_noise(&self) -> Result<PlaybackState, String> {
        self.with_controller("noise-pause", |c| {
            c.pause_noise();
            c.playback_state()
        })
    }

    pub fn resume_noise(&self) -> Result<PlaybackState, String> {
        self.with_controller("noise-resume", |c| {
            c.resume_noise();
            c.playback_state()
        })
    }

    pub fn stop_noise(&self) -> Result<PlaybackState, String> {
        self.with_controller("noise-stop", |c| {
            c.stop_noise();
            c.playback_state()
        })
    }

    /// Get current playback state
    pub fn get_playback_state(&self) -> Result<PlaybackState, String> {
        self.controller.lock()
            .map(|c| c.playback_state())
            .map_err(|e| format!("Failed to lock timer controller: {}", e))
    }

    /// Get current timer state
    pub fn get_timer_state(&self) -> Result<TimerState, String> {
        self.controller.lock()
            .map(|c| c.snapshot())
            .map_err(|e| format!("Failed to lock timer controller: {}", e))
    }

    /// Add a reminder from user input
    pub fn add_reminder(&self, text: &str, minutes: &str) -> Result<Reminder, ReminderError> {
        let reminder = self.reminders.add(text, minutes)?;
        self.record_action("reminder-add");
        Ok(reminder)
    }

    /// Delete a reminder by id
    pub fn delete_reminder(&self, id: &str) -> Result<usize, StoreError> {
        let removed = self.reminders.remove(id)?;
        self.record_action("reminder-delete");
        Ok(removed)
    }

    /// Replace the controller's in-memory reminder copy
    pub fn reload_reminders(&self, reminders: Vec<Reminder>) -> Result<(), String> {
        let mut controller = self.controller.lock()
            .map_err(|e| format!("Failed to lock timer controller: {}", e))?;
        controller.replace_reminders(reminders);
        Ok(())
    }

    /// Set the sync-audio flag
    pub fn set_sync_audio(&self, enabled: bool) -> Result<(), StoreError> {
        self.settings.set_sync_audio(enabled)?;
        self.record_action(if enabled { "sync-on" } else { "sync-off" });
        Ok(())
    }

    /// Record a user-visible notice
    pub fn push_notice(&self, message: String, reminder_id: Option<String>) {
        match self.notices.lock() {
            Ok(mut notices) => {
                notices.push_back(Notice {
                    message,
                    reminder_id,
                    timestamp: Utc::now(),
                });
                while notices.len() > MAX_NOTICES {
                    notices.pop_front();
                }
            }
            Err(e) => warn!("Failed to lock notices: {}", e),
        }
    }

    /// Most recent notices, oldest first
    pub fn recent_notices(&self) -> Vec<Notice> {
        self.notices.lock()
            .map(|notices| notices.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }

    /// Cancel pending ticks and silence playback
    pub fn shutdown(&self) -> Result<(), String> {
        let mut controller = self.controller.lock()
            .map_err(|e| format!("Failed to lock timer controller: {}", e))?;
        controller.shutdown();
        info!("Application state shut down");
        Ok(())
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    fn forward_event(&self, event: TimerEvent) {
        match &event {
            TimerEvent::ReminderDue(reminder) => {
                self.push_notice(format!("Reminder: {}", reminder.text), Some(reminder.id.clone()));
            }
            TimerEvent::Finished => {
                self.push_notice("Focus session complete".to_string(), None);
            }
            _ => {}
        }
        // Listeners are optional
        let _ = self.events_tx.send(event);
    }
}
