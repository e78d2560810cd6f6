#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use focus_timer::{
    services::{AudioBackend, NoiseKind, Playback},
    state::AppState,
    storage::{KeyValueStore, ReminderStore, SettingsStore},
    tasks::ManualScheduler,
    timer::{ManualClock, TimerController},
};

pub const T0: i64 = 1_700_000_000_000;

/// Audio backend that only counts what would have been played
#[derive(Default)]
pub struct CountingAudio {
    pub opened: Mutex<Vec<NoiseKind>>,
    pub chimes: Mutex<usize>,
    pub live: Arc<Mutex<usize>>,
}

impl CountingAudio {
    pub fn chimes(&self) -> usize {
        *self.chimes.lock().unwrap()
    }

    /// Handles that were started and not yet released
    pub fn live(&self) -> usize {
        *self.live.lock().unwrap()
    }
}

struct CountingPlayback {
    live: Arc<Mutex<usize>>,
    started: bool,
}

impl Playback for CountingPlayback {
    fn set_looping(&mut self, _looping: bool) {}

    fn set_volume(&mut self, _left: f32, _right: f32) {}

    fn start(&mut self) -> Result<(), String> {
        self.started = true;
        *self.live.lock().unwrap() += 1;
        Ok(())
    }

    fn pause(&mut self) {}

    fn resume(&mut self) {}

    fn release(&mut self) {
        if self.started {
            self.started = false;
            *self.live.lock().unwrap() -= 1;
        }
    }
}

impl AudioBackend for CountingAudio {
    fn open(&self, kind: NoiseKind) -> Result<Box<dyn Playback>, String> {
        self.opened.lock().unwrap().push(kind);
        Ok(Box::new(CountingPlayback {
            live: Arc::clone(&self.live),
            started: false,
        }))
    }

    fn play_chime(&self) -> Result<(), String> {
        *self.chimes.lock().unwrap() += 1;
        Ok(())
    }
}

pub struct TestApp {
    pub state: Arc<AppState>,
    pub scheduler: Arc<ManualScheduler>,
    pub clock: Arc<ManualClock>,
    pub audio: Arc<CountingAudio>,
}

impl TestApp {
    pub fn new(kv: Arc<dyn KeyValueStore>, max_seconds: u64) -> Self {
        let scheduler = Arc::new(ManualScheduler::new());
        let clock = Arc::new(ManualClock::new(T0));
        let audio = Arc::new(CountingAudio::default());
        let reminders = Arc::new(ReminderStore::new(Arc::clone(&kv), clock.clone()));
        let settings = Arc::new(SettingsStore::new(kv));

        let controller = TimerController::new(
            max_seconds,
            scheduler.clone(),
            clock.clone(),
            audio.clone(),
            Arc::clone(&reminders),
        );
        let state = Arc::new(AppState::new(
            0,
            "127.0.0.1".to_string(),
            controller,
            reminders,
            settings,
        ));

        Self {
            state,
            scheduler,
            clock,
            audio,
        }
    }

    /// Let one second pass and deliver the pending tick
    pub fn tick(&self) -> bool {
        self.clock.advance(1000);
        match self.scheduler.fire_next() {
            Some(token) => self.state.handle_tick(token).unwrap(),
            None => false,
        }
    }
}
