//! Audio capability: open a looping noise track or play a one-shot chime

use std::{collections::HashMap, fmt, path::PathBuf, process::Stdio, str::FromStr};
use serde::{Deserialize, Serialize};
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

/// Ambient noise tracks the player can loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoiseKind {
    White,
    Brown,
}

impl NoiseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoiseKind::White => "white",
            NoiseKind::Brown => "brown",
        }
    }
}

impl fmt::Display for NoiseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoiseKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "white" => Ok(NoiseKind::White),
            "brown" => Ok(NoiseKind::Brown),
            other => Err(format!("Unknown noise kind: {}", other)),
        }
    }
}

/// A playable handle returned by an [`AudioBackend`]
pub trait Playback: Send {
    fn set_looping(&mut self, looping: bool);
    fn set_volume(&mut self, left: f32, right: f32);
    fn start(&mut self) -> Result<(), String>;
    fn pause(&mut self);
    fn resume(&mut self);
    /// Stop playback and free the underlying resource
    fn release(&mut self);
}

/// Source of playable audio, supplied to the player from outside
pub trait AudioBackend: Send + Sync {
    fn open(&self, kind: NoiseKind) -> Result<Box<dyn Playback>, String>;
    fn play_chime(&self) -> Result<(), String>;
}

/// Backend that plays configured files through an external player program
#[derive(Debug, Clone)]
pub struct ProcessAudioBackend {
    program: String,
    tracks: HashMap<NoiseKind, PathBuf>,
    chime: Option<PathBuf>,
}

impl ProcessAudioBackend {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            tracks: HashMap::new(),
            chime: None,
        }
    }

    pub fn with_track(mut self, kind: NoiseKind, path: impl Into<PathBuf>) -> Self {
        self.tracks.insert(kind, path.into());
        self
    }

    pub fn with_chime(mut self, path: impl Into<PathBuf>) -> Self {
        self.chime = Some(path.into());
        self
    }

    fn resolve(path: Option<&PathBuf>, what: &str) -> Result<PathBuf, String> {
        let path = path.ok_or_else(|| format!("No audio file configured for {}", what))?;
        if !path.is_file() {
            return Err(format!("Audio file for {} not found: {}", what, path.display()));
        }
        Ok(path.clone())
    }
}

impl AudioBackend for ProcessAudioBackend {
    fn open(&self, kind: NoiseKind) -> Result<Box<dyn Playback>, String> {
        let path = Self::resolve(self.tracks.get(&kind), kind.as_str())?;
        debug!("Opened {} noise track {}", kind, path.display());
        Ok(Box::new(ProcessPlayback::new(self.program.clone(), path)))
    }

    fn play_chime(&self) -> Result<(), String> {
        let path = Self::resolve(self.chime.as_ref(), "chime")?;
        let mut playback = ProcessPlayback::new(self.program.clone(), path);
        playback.start()?;
        // One-shot: the process exits on its own once the file ends
        if let Some(mut child) = playback.child.take() {
            tokio::spawn(async move {
                if let Err(e) = child.wait().await {
                    warn!("Chime player did not exit cleanly: {}", e);
                }
            });
        }
        Ok(())
    }
}

/// One external player process
struct ProcessPlayback {
    program: String,
    path: PathBuf,
    looping: bool,
    volume: f32,
    child: Option<Child>,
}

impl ProcessPlayback {
    fn new(program: String, path: PathBuf) -> Self {
        Self {
            program,
            path,
            looping: false,
            volume: 1.0,
            child: None,
        }
    }

    fn signal(&self, signal: &str) {
        let Some(pid) = self.child.as_ref().and_then(|c| c.id()) else {
            return;
        };

        let pid_arg = pid.to_string();
        match Command::new("kill")
            .args([signal, pid_arg.as_str()])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        {
            Ok(_) => debug!("Sent {} to player pid {}", signal, pid),
            Err(e) => warn!("Failed to send {} to player pid {}: {}", signal, pid, e),
        }
    }
}

impl Playback for ProcessPlayback {
    fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    fn set_volume(&mut self, left: f32, right: f32) {
        // The player takes a single level; keep the louder channel
        self.volume = left.max(right).clamp(0.0, 1.0);
    }

    fn start(&mut self) -> Result<(), String> {
        let volume = ((self.volume * 100.0).round() as u32).to_string();
        let mut command = Command::new(&self.program);
        command
            .args(["-nodisp", "-autoexit", "-loglevel", "quiet", "-volume", volume.as_str()])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        if self.looping {
            command.args(["-loop", "0"]);
        }
        command.arg(&self.path);

        let child = command
            .spawn()
            .map_err(|e| format!("Failed to launch {}: {}", self.program, e))?;
        info!("Started {} for {}", self.program, self.path.display());
        self.child = Some(child);
        Ok(())
    }

    fn pause(&mut self) {
        self.signal("-STOP");
    }

    fn resume(&mut self) {
        self.signal("-CONT");
    }

    fn release(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.start_kill() {
                debug!("Player already exited: {}", e);
            }
        }
    }
}

impl Drop for ProcessPlayback {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noise_kind_parses_case_insensitively() {
        assert_eq!("white".parse::<NoiseKind>(), Ok(NoiseKind::White));
        assert_eq!("Brown".parse::<NoiseKind>(), Ok(NoiseKind::Brown));
        assert!("pink".parse::<NoiseKind>().is_err());
    }

    #[test]
    fn noise_kind_serializes_lowercase() {
        assert_eq!(serde_json::to_value(NoiseKind::Brown).unwrap(), "brown");
    }

    #[test]
    fn open_fails_without_configured_track() {
        let backend = ProcessAudioBackend::new("ffplay");
        let err = backend.open(NoiseKind::White).err().unwrap();
        assert!(err.contains("No audio file configured"));
    }

    #[test]
    fn open_fails_for_missing_file() {
        let backend =
            ProcessAudioBackend::new("ffplay").with_track(NoiseKind::Brown, "/nonexistent/brown.ogg");
        let err = backend.open(NoiseKind::Brown).err().unwrap();
        assert!(err.contains("not found"));
    }

    #[test]
    fn chime_fails_without_configured_file() {
        let backend = ProcessAudioBackend::new("ffplay");
        assert!(backend.play_chime().is_err());
    }
}
