//! Audio services module
//!
//! This module contains the audio capability used for ambient noise and
//! reminder chimes, and the looping noise player built on it.

pub mod audio;
pub mod noise_player;

// Re-export main types
pub use audio::{AudioBackend, NoiseKind, Playback, ProcessAudioBackend};
pub use noise_player::{NoisePlayer, PlaybackState, NOISE_VOLUME};
