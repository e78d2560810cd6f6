//! Persisted reminder list

use std::sync::{Arc, Mutex};
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::{KeyValueStore, ReminderError, StoreError};
use crate::{
    state::reminder::{due_reminders, Reminder},
    timer::Clock,
};

const NAMESPACE: &str = "reminders";
const LIST_KEY: &str = "reminders";
const LAST_UPDATE_KEY: &str = "lastUpdate";
const MILLIS_PER_MINUTE: i64 = 60_000;

/// Change notification sent to subscribers after every save
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderChange {
    pub reminders: Vec<Reminder>,
    pub updated_at: i64,
}

/// Loads, saves and scans the persisted reminder list
pub struct ReminderStore {
    kv: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    changes_tx: broadcast::Sender<ReminderChange>,
    /// Serializes load-modify-save sequences
    edit_lock: Mutex<()>,
}

impl ReminderStore {
    pub fn new(kv: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        let (changes_tx, _) = broadcast::channel(32);
        Self {
            kv,
            clock,
            changes_tx,
            edit_lock: Mutex::new(()),
        }
    }

    /// Subscribe to reminder list changes
    pub fn subscribe(&self) -> broadcast::Receiver<ReminderChange> {
        self.changes_tx.subscribe()
    }

    /// Load the persisted list; missing or malformed data reads as empty
    pub fn load(&self) -> Vec<Reminder> {
        let Some(value) = self.kv.get(NAMESPACE, LIST_KEY) else {
            return Vec::new();
        };

        match serde_json::from_value(value) {
            Ok(reminders) => reminders,
            Err(e) => {
                warn!("Discarding unreadable reminder list: {}", e);
                Vec::new()
            }
        }
    }

    /// Replace the persisted list and notify subscribers
    pub fn save(&self, reminders: &[Reminder]) -> Result<(), StoreError> {
        let encoded = serde_json::to_value(reminders).map_err(|source| StoreError::Encode {
            namespace: NAMESPACE.to_string(),
            source,
        })?;
        self.kv.put(NAMESPACE, LIST_KEY, encoded)?;

        let updated_at = self.clock.now_millis();
        self.kv
            .put(NAMESPACE, LAST_UPDATE_KEY, Value::from(updated_at))?;

        let change = ReminderChange {
            reminders: reminders.to_vec(),
            updated_at,
        };
        if self.changes_tx.send(change).is_err() {
            debug!("No reminder subscribers to notify");
        }

        Ok(())
    }

    /// Current time according to the store's clock
    pub fn now_millis(&self) -> i64 {
        self.clock.now_millis()
    }

    /// Millis timestamp of the last save, if any
    pub fn last_update(&self) -> Option<i64> {
        self.kv.get(NAMESPACE, LAST_UPDATE_KEY)?.as_i64()
    }

    /// Parse a user-entered delay in minutes and add a reminder
    pub fn add(&self, text: &str, delay_input: &str) -> Result<Reminder, ReminderError> {
        let trimmed = delay_input.trim();
        let minutes: i64 = trimmed
            .parse()
            .map_err(|_| ReminderError::InvalidDelay(trimmed.to_string()))?;
        self.add_minutes(text, minutes)
    }

    /// Add a reminder due `minutes` from now
    pub fn add_minutes(&self, text: &str, minutes: i64) -> Result<Reminder, ReminderError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ReminderError::EmptyText);
        }
        if minutes <= 0 {
            return Err(ReminderError::NonPositiveDelay(minutes));
        }
        let delay = minutes
            .checked_mul(MILLIS_PER_MINUTE)
            .ok_or_else(|| ReminderError::InvalidDelay(minutes.to_string()))?;

        let _guard = self.lock_edits()?;
        let mut reminders = self.load();

        let now = self.clock.now_millis();
        let reminder = Reminder::new(unique_id(&reminders, now), now.saturating_add(delay), text);
        reminders.push(reminder.clone());
        self.save(&reminders)?;

        info!("Added reminder {} due in {} min", reminder.id, minutes);
        Ok(reminder)
    }

    /// Remove every reminder with `id`; returns how many were removed
    pub fn remove(&self, id: &str) -> Result<usize, StoreError> {
        let _guard = self.lock_edits()?;
        let mut reminders = self.load();

        let before = reminders.len();
        reminders.retain(|r| r.id != id);
        let removed = before - reminders.len();
        self.save(&reminders)?;

        info!("Removed {} reminder(s) with id {}", removed, id);
        Ok(removed)
    }

    /// Due and untriggered reminders at `now_millis`; nothing is modified
    pub fn scan_due(&self, now_millis: i64) -> Vec<Reminder> {
        due_reminders(&self.load(), now_millis)
    }

    /// Flag the given reminders as triggered and persist
    pub fn mark_triggered(&self, ids: &[String]) -> Result<(), StoreError> {
        if ids.is_empty() {
            return Ok(());
        }

        let _guard = self.lock_edits()?;
        let mut reminders = self.load();
        for reminder in reminders.iter_mut().filter(|r| ids.contains(&r.id)) {
            reminder.triggered = true;
        }
        self.save(&reminders)
    }

    /// Current list sorted by due time
    pub fn sorted_for_display(&self) -> Vec<Reminder> {
        let mut reminders = self.load();
        reminders.sort_by_key(|r| r.time);
        reminders
    }

    fn lock_edits(&self) -> Result<std::sync::MutexGuard<'_, ()>, StoreError> {
        self.edit_lock
            .lock()
            .map_err(|e| StoreError::Lock(e.to_string()))
    }
}

/// Creation-timestamp id, bumped forward until it is unused
fn unique_id(existing: &[Reminder], now_millis: i64) -> String {
    let mut candidate = now_millis;
    loop {
        let id = candidate.to_string();
        if !existing.iter().any(|r| r.id == id) {
            return id;
        }
        candidate += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{storage::MemoryStore, timer::ManualClock};
    use serde_json::json;

    const T0: i64 = 1_700_000_000_000;

    fn store() -> (ReminderStore, Arc<ManualClock>, Arc<MemoryStore>) {
        let kv = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(T0));
        (ReminderStore::new(kv.clone(), clock.clone()), clock, kv)
    }

    #[test]
    fn add_sets_due_time_from_delay() {
        let (store, _, _) = store();
        let reminder = store.add("stand up", "5").unwrap();

        assert_eq!(reminder.time, T0 + 5 * 60_000);
        assert_eq!(reminder.id, T0.to_string());
        assert!(!reminder.triggered);
        assert_eq!(store.load(), vec![reminder]);
    }

    #[test]
    fn scan_due_boundary_is_inclusive() {
        let (store, _, _) = store();
        let reminder = store.add("water", "3").unwrap();
        let due_at = T0 + 3 * 60_000;

        assert_eq!(store.scan_due(due_at), vec![reminder]);
        assert!(store.scan_due(due_at - 1).is_empty());
    }

    #[test]
    fn invalid_input_is_rejected_without_mutation() {
        let (store, _, _) = store();
        store.add("keep", "1").unwrap();
        let before = store.load();

        assert!(matches!(store.add("x", "abc"), Err(ReminderError::InvalidDelay(_))));
        assert!(matches!(store.add("x", "0"), Err(ReminderError::NonPositiveDelay(0))));
        assert!(matches!(store.add("x", "-3"), Err(ReminderError::NonPositiveDelay(-3))));
        assert!(matches!(store.add("   ", "3"), Err(ReminderError::EmptyText)));
        assert!(matches!(store.add("x", ""), Err(ReminderError::InvalidDelay(_))));

        assert_eq!(store.load(), before);
    }

    #[test]
    fn ids_stay_unique_within_one_millisecond() {
        let (store, _, _) = store();
        let first = store.add("a", "1").unwrap();
        let second = store.add("b", "1").unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(second.id, (T0 + 1).to_string());
    }

    #[test]
    fn remove_drops_only_matching_id() {
        let (store, clock, _) = store();
        let keep = store.add("keep", "2").unwrap();
        clock.advance(10);
        let gone = store.add("gone", "2").unwrap();

        assert_eq!(store.remove(&gone.id).unwrap(), 1);
        assert_eq!(store.load(), vec![keep]);
        assert_eq!(store.remove("nope").unwrap(), 0);
    }

    #[test]
    fn mark_triggered_persists_flag() {
        let (store, _, _) = store();
        let reminder = store.add("tea", "1").unwrap();

        store.mark_triggered(&[reminder.id.clone()]).unwrap();
        assert!(store.load()[0].triggered);
        assert!(store.scan_due(T0 + 60_000).is_empty());
    }

    #[test]
    fn malformed_list_loads_empty() {
        let (store, _, kv) = store();
        kv.put("reminders", "reminders", json!({"oops": true})).unwrap();
        assert!(store.load().is_empty());
    }

    #[test]
    fn save_notifies_subscribers_and_stamps_update() {
        let (store, clock, _) = store();
        let mut changes = store.subscribe();

        clock.set(T0 + 77);
        let reminder = store.add("ping", "1").unwrap();

        let change = changes.try_recv().unwrap();
        assert_eq!(change.reminders, vec![reminder]);
        assert_eq!(change.updated_at, T0 + 77);
        assert_eq!(store.last_update(), Some(T0 + 77));
    }

    #[test]
    fn display_listing_is_sorted_by_due_time() {
        let (store, clock, _) = store();
        store.add("late", "30").unwrap();
        clock.advance(1);
        store.add("soon", "1").unwrap();

        let texts: Vec<_> = store.sorted_for_display().into_iter().map(|r| r.text).collect();
        assert_eq!(texts, vec!["soon", "late"]);
    }
}
