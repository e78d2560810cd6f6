//! Persisted user settings

use std::sync::Arc;
use serde_json::Value;
use tracing::info;

use super::{KeyValueStore, StoreError};

const NAMESPACE: &str = "settings";
const SYNC_AUDIO_KEY: &str = "syncAudio";

/// Reads and writes the "sync audio with timer" flag
pub struct SettingsStore {
    kv: Arc<dyn KeyValueStore>,
}

impl SettingsStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Whether pausing or finishing the timer also pauses or stops audio
    pub fn sync_audio(&self) -> bool {
        matches!(self.kv.get(NAMESPACE, SYNC_AUDIO_KEY), Some(Value::Bool(true)))
    }

    pub fn set_sync_audio(&self, enabled: bool) -> Result<(), StoreError> {
        self.kv.put(NAMESPACE, SYNC_AUDIO_KEY, Value::Bool(enabled))?;
        info!("Sync audio with timer set to: {}", enabled);
        Ok(())
    }
}
