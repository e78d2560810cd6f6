//! Looping ambient noise player

use std::sync::Arc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::audio::{AudioBackend, NoiseKind, Playback};

/// Fixed playback level applied to both channels
pub const NOISE_VOLUME: f32 = 0.5;

/// Snapshot of what the player is doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackState {
    pub current_kind: Option<NoiseKind>,
    pub is_playing: bool,
}

/// Wraps a single looping playback handle
pub struct NoisePlayer {
    backend: Arc<dyn AudioBackend>,
    handle: Option<Box<dyn Playback>>,
    current_kind: Option<NoiseKind>,
    playing: bool,
}

impl NoisePlayer {
    pub fn new(backend: Arc<dyn AudioBackend>) -> Self {
        Self {
            backend,
            handle: None,
            current_kind: None,
            playing: false,
        }
    }

    /// Replace any current playback with a looping `kind` track
    ///
    /// A track that cannot be opened or started leaves the player stopped.
    pub fn play(&mut self, kind: NoiseKind) {
        self.stop();

        let mut handle = match self.backend.open(kind) {
            Ok(handle) => handle,
            Err(e) => {
                warn!("Cannot open {} noise: {}", kind, e);
                return;
            }
        };

        handle.set_looping(true);
        handle.set_volume(NOISE_VOLUME, NOISE_VOLUME);
        if let Err(e) = handle.start() {
            warn!("Cannot start {} noise: {}", kind, e);
            handle.release();
            return;
        }

        info!("Playing {} noise", kind);
        self.handle = Some(handle);
        self.current_kind = Some(kind);
        self.playing = true;
    }

    pub fn pause(&mut self) {
        if !self.playing {
            return;
        }
        if let Some(handle) = self.handle.as_mut() {
            handle.pause();
            self.playing = false;
            debug!("Noise paused");
        }
    }

    pub fn resume(&mut self) {
        if self.playing {
            return;
        }
        if let Some(handle) = self.handle.as_mut() {
            handle.resume();
            self.playing = true;
            debug!("Noise resumed");
        }
    }

    pub fn stop(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            handle.release();
            debug!("Noise stopped");
        }
        self.current_kind = None;
        self.playing = false;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Whether a paused handle is waiting to be resumed
    pub fn is_paused(&self) -> bool {
        self.handle.is_some() && !self.playing
    }

    pub fn current_kind(&self) -> Option<NoiseKind> {
        self.current_kind
    }

    pub fn playback_state(&self) -> PlaybackState {
        PlaybackState {
            current_kind: self.current_kind,
            is_playing: self.playing,
        }
    }

    /// Play the one-shot reminder sound; failures are only logged
    pub fn chime(&self) {
        if let Err(e) = self.backend.play_chime() {
            warn!("Cannot play reminder chime: {}", e);
        }
    }
}
