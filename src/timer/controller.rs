//! Countdown state machine
//!
//! The controller owns the remaining-seconds state and at most one pending
//! tick. Every tick decrements the countdown, refreshes the display and fires
//! reminders whose due time has passed. The "sync audio" flag is passed in by
//! the caller at each decision point rather than read from a global.

use std::{sync::Arc, time::Duration};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::{
    services::{AudioBackend, NoiseKind, NoisePlayer, PlaybackState},
    state::{
        reminder::{due_reminders, Reminder},
        TimerPhase, TimerState,
    },
    storage::ReminderStore,
    tasks::scheduler::{Scheduler, TickToken},
};
use super::{Clock, CountdownDisplay};

/// Delay between ticks; each tick is scheduled relative to the previous one
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Validate a timer length in minutes and convert it to seconds
pub fn duration_seconds(minutes: u64) -> Result<u64, String> {
    if minutes == 0 {
        return Err("Timer length must be at least one minute".to_string());
    }
    minutes
        .checked_mul(60)
        .ok_or_else(|| format!("Timer length of {} minutes is too long", minutes))
}

/// Notifications emitted as the countdown progresses
#[derive(Debug, Clone, PartialEq)]
pub enum TimerEvent {
    Started { remaining_seconds: u64 },
    Tick { remaining_seconds: u64 },
    Paused { remaining_seconds: u64 },
    Reset { max_seconds: u64 },
    Finished,
    ReminderDue(Reminder),
}

/// Orchestrates countdown, display, noise playback and reminder checks
pub struct TimerController {
    max_seconds: u64,
    remaining_seconds: u64,
    phase: TimerPhase,
    active_tick: Option<TickToken>,
    selected_kind: Option<NoiseKind>,
    display: CountdownDisplay,
    player: NoisePlayer,
    /// In-memory copy of the reminder list, refreshed on store changes
    reminders: Vec<Reminder>,
    reminder_store: Arc<ReminderStore>,
    scheduler: Arc<dyn Scheduler>,
    clock: Arc<dyn Clock>,
    events_tx: broadcast::Sender<TimerEvent>,
}

impl TimerController {
    /// Create an idle controller counting down from `max_seconds`
    pub fn new(
        max_seconds: u64,
        scheduler: Arc<dyn Scheduler>,
        clock: Arc<dyn Clock>,
        audio: Arc<dyn AudioBackend>,
        reminder_store: Arc<ReminderStore>,
    ) -> Self {
        let max_seconds = if max_seconds == 0 {
            warn!("Timer length of zero requested, using one second");
            1
        } else {
            max_seconds
        };
        let (events_tx, _) = broadcast::channel(100);
        let reminders = reminder_store.load();

        Self {
            max_seconds,
            remaining_seconds: max_seconds,
            phase: TimerPhase::Idle,
            active_tick: None,
            selected_kind: None,
            display: CountdownDisplay::new(max_seconds),
            player: NoisePlayer::new(audio),
            reminders,
            reminder_store,
            scheduler,
            clock,
            events_tx,
        }
    }

    /// Subscribe to timer events
    pub fn subscribe(&self) -> broadcast::Receiver<TimerEvent> {
        self.events_tx.subscribe()
    }

    /// Begin or continue counting down
    pub fn start(&mut self, sync_audio: bool) {
        match self.phase {
            TimerPhase::Running => {
                debug!("Timer already running");
                return;
            }
            TimerPhase::Finished => {
                self.remaining_seconds = self.max_seconds;
                self.display.set_max_time(self.max_seconds);
            }
            TimerPhase::Idle | TimerPhase::Paused => {}
        }

        self.start_noise(sync_audio);
        self.phase = TimerPhase::Running;
        self.schedule_tick();

        info!("Timer started with {}s remaining", self.remaining_seconds);
        self.emit(TimerEvent::Started {
            remaining_seconds: self.remaining_seconds,
        });
    }

    /// Handle a fired tick; stale or cancelled tokens are ignored
    pub fn on_tick(&mut self, token: TickToken, sync_audio: bool) -> bool {
        if self.active_tick != Some(token) {
            debug!("Ignoring stale tick {}", token.id());
            return false;
        }
        self.active_tick = None;

        if self.remaining_seconds > 0 {
            self.remaining_seconds -= 1;
            self.display.set_current_time(self.remaining_seconds);
            self.emit(TimerEvent::Tick {
                remaining_seconds: self.remaining_seconds,
            });
            self.trigger_due_reminders();
        }

        if self.remaining_seconds == 0 {
            self.finish(sync_audio);
        } else {
            self.schedule_tick();
        }
        true
    }

    /// Stop counting down, keeping the remaining time
    pub fn pause(&mut self, sync_audio: bool) {
        if !self.phase.is_running() {
            debug!("Pause ignored, timer is {:?}", self.phase);
            return;
        }

        self.cancel_tick();
        self.phase = TimerPhase::Paused;
        if sync_audio && self.player.is_playing() {
            self.player.pause();
        }

        info!("Timer paused with {}s remaining", self.remaining_seconds);
        self.emit(TimerEvent::Paused {
            remaining_seconds: self.remaining_seconds,
        });
    }

    /// Return to the full configured length
    ///
    /// Only the in-memory reminder copy has its triggered flags cleared; the
    /// persisted flags are left as they are.
    pub fn reset(&mut self) {
        self.cancel_tick();
        self.remaining_seconds = self.max_seconds;
        for reminder in &mut self.reminders {
            reminder.triggered = false;
        }
        self.display.set_max_time(self.max_seconds);
        self.phase = TimerPhase::Idle;

        info!("Timer reset to {}s", self.max_seconds);
        self.emit(TimerEvent::Reset {
            max_seconds: self.max_seconds,
        });
    }

    /// Change the countdown length; the timer is reset
    pub fn set_duration(&mut self, minutes: u64) -> Result<(), String> {
        self.max_seconds = duration_seconds(minutes)?;
        self.reset();
        Ok(())
    }

    /// Choose which noise `start` plays
    pub fn select_noise(&mut self, kind: Option<NoiseKind>) {
        self.selected_kind = kind;
    }

    /// Select `kind` and play it right away
    pub fn play_noise(&mut self, kind: NoiseKind) {
        self.selected_kind = Some(kind);
        self.player.play(kind);
    }

    pub fn pause_noise(&mut self) {
        self.player.pause();
    }

    pub fn resume_noise(&mut self) {
        self.player.resume();
    }

    pub fn stop_noise(&mut self) {
        self.player.stop();
    }

    /// Refresh the in-memory reminder copy
    pub fn replace_reminders(&mut self, reminders: Vec<Reminder>) {
        debug!("Reminder cache refreshed with {} entries", reminders.len());
        self.reminders = reminders;
    }

    pub fn reminders(&self) -> &[Reminder] {
        &self.reminders
    }

    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.remaining_seconds
    }

    pub fn max_seconds(&self) -> u64 {
        self.max_seconds
    }

    pub fn selected_noise(&self) -> Option<NoiseKind> {
        self.selected_kind
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.player.playback_state()
    }

    pub fn display(&self) -> &CountdownDisplay {
        &self.display
    }

    /// Text of the start/pause control
    pub fn control_label(&self) -> &'static str {
        if self.phase.is_running() {
            "pause"
        } else {
            "start"
        }
    }

    pub fn snapshot(&self) -> TimerState {
        TimerState {
            phase: self.phase,
            max_seconds: self.max_seconds,
            remaining_seconds: self.remaining_seconds,
            control_label: self.control_label().to_string(),
            display: self.display.render(),
        }
    }

    /// Tear down: drop any pending tick and silence playback
    pub fn shutdown(&mut self) {
        self.cancel_tick();
        self.player.stop();
        info!("Timer controller shut down");
    }

    fn start_noise(&mut self, sync_audio: bool) {
        let Some(kind) = self.selected_kind else {
            return;
        };

        if !sync_audio {
            self.player.play(kind);
        } else if self.player.is_paused() {
            self.player.resume();
        } else if !self.player.is_playing() {
            self.player.play(kind);
        }
    }

    fn finish(&mut self, sync_audio: bool) {
        self.cancel_tick();
        self.phase = TimerPhase::Finished;
        if sync_audio {
            self.player.stop();
        }

        info!("Timer finished");
        self.emit(TimerEvent::Finished);
    }

    fn trigger_due_reminders(&mut self) {
        let due = due_reminders(&self.reminders, self.clock.now_millis());
        if due.is_empty() {
            return;
        }

        let ids: Vec<String> = due.iter().map(|r| r.id.clone()).collect();
        for reminder in self.reminders.iter_mut().filter(|r| ids.contains(&r.id)) {
            reminder.triggered = true;
        }

        for reminder in due {
            info!("Reminder due: {}", reminder.text);
            self.player.chime();
            self.emit(TimerEvent::ReminderDue(reminder));
        }

        if let Err(e) = self.reminder_store.mark_triggered(&ids) {
            warn!("Failed to persist triggered reminders: {}", e);
        }
    }

    fn schedule_tick(&mut self) {
        self.cancel_tick();
        self.active_tick = Some(self.scheduler.schedule(TICK_INTERVAL));
    }

    fn cancel_tick(&mut self) {
        if let Some(token) = self.active_tick.take() {
            self.scheduler.cancel(token);
        }
    }

    fn emit(&self, event: TimerEvent) {
        // Nobody listening is fine
        let _ = self.events_tx.send(event);
    }
}

impl Drop for TimerController {
    fn drop(&mut self) {
        self.cancel_tick();
    }
}
