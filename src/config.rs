//! Configuration and CLI argument handling

use std::path::PathBuf;
use clap::Parser;

use crate::services::{NoiseKind, ProcessAudioBackend};

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "focus-timer")]
#[command(about = "A Pomodoro countdown service with ambient noise and reminders")]
#[command(version = "1.0.0")]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Focus interval length in minutes
    #[arg(short, long, default_value = "25", value_parser = clap::value_parser!(u64).range(1..))]
    pub minutes: u64,

    /// Directory holding persisted settings and reminders
    #[arg(long, default_value = ".focus-timer")]
    pub data_dir: PathBuf,

    /// External program used to play audio files
    #[arg(long, default_value = "ffplay")]
    pub player: String,

    /// Audio file looped for white noise
    #[arg(long)]
    pub white_noise: Option<PathBuf>,

    /// Audio file looped for brown noise
    #[arg(long)]
    pub brown_noise: Option<PathBuf>,

    /// Audio file played once when a reminder fires
    #[arg(long)]
    pub chime: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Countdown length in seconds
    pub fn timer_seconds(&self) -> u64 {
        self.minutes.saturating_mul(60)
    }

    /// Build the audio backend from the configured player and files
    pub fn audio_backend(&self) -> ProcessAudioBackend {
        let mut backend = ProcessAudioBackend::new(self.player.clone());
        if let Some(path) = &self.white_noise {
            backend = backend.with_track(NoiseKind::White, path);
        }
        if let Some(path) = &self.brown_noise {
            backend = backend.with_track(NoiseKind::Brown, path);
        }
        if let Some(path) = &self.chime {
            backend = backend.with_chime(path);
        }
        backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_a_standard_pomodoro() {
        let config = Config::try_parse_from(["focus-timer"]).unwrap();
        assert_eq!(config.minutes, 25);
        assert_eq!(config.timer_seconds(), 1500);
        assert_eq!(config.address(), "127.0.0.1:20554");
        assert_eq!(config.log_level(), "info");
        assert_eq!(config.player, "ffplay");
    }

    #[test]
    fn zero_minutes_is_rejected() {
        assert!(Config::try_parse_from(["focus-timer", "--minutes", "0"]).is_err());
    }

    #[test]
    fn verbose_switches_to_debug() {
        let config = Config::try_parse_from(["focus-timer", "-v", "--port", "9000"]).unwrap();
        assert_eq!(config.log_level(), "debug");
        assert_eq!(config.port, 9000);
    }
}
