//! Reminder record and its display helpers

use serde::{Deserialize, Serialize};

/// A reminder that fires once its due time has passed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    /// Creation timestamp in millis, rendered as a decimal string
    pub id: String,
    /// Absolute due time in milliseconds since the Unix epoch
    pub time: i64,
    pub text: String,
    #[serde(rename = "isTriggered", default)]
    pub triggered: bool,
}

impl Reminder {
    pub fn new(id: impl Into<String>, time: i64, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            time,
            text: text.into(),
            triggered: false,
        }
    }

    /// Due and not fired yet
    pub fn is_due(&self, now_millis: i64) -> bool {
        !self.triggered && self.time <= now_millis
    }

    /// Human-readable time left until the reminder fires
    pub fn relative_due_text(&self, now_millis: i64) -> String {
        format_time_remaining(self.time.saturating_sub(now_millis))
    }
}

/// Reminders from `reminders` that are due at `now_millis`, in stored order
pub fn due_reminders(reminders: &[Reminder], now_millis: i64) -> Vec<Reminder> {
    reminders
        .iter()
        .filter(|r| r.is_due(now_millis))
        .cloned()
        .collect()
}

/// Format a remaining duration as "1h 5m", "3m 20s", "12s" or "expired"
pub fn format_time_remaining(remaining_millis: i64) -> String {
    if remaining_millis <= 0 {
        return "expired".to_string();
    }

    let total_seconds = remaining_millis / 1000;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_persisted_field_names() {
        let reminder = Reminder::new("1700000000000", 1_700_000_060_000, "stretch");
        let json = serde_json::to_value(&reminder).unwrap();

        assert_eq!(json["id"], "1700000000000");
        assert_eq!(json["time"], 1_700_000_060_000_i64);
        assert_eq!(json["text"], "stretch");
        assert_eq!(json["isTriggered"], false);
    }

    #[test]
    fn missing_triggered_flag_defaults_to_false() {
        let json = serde_json::json!({"id": "1", "time": 5, "text": "water"});
        let reminder: Reminder = serde_json::from_value(json).unwrap();
        assert!(!reminder.triggered);
    }

    #[test]
    fn due_check_is_inclusive_and_skips_triggered() {
        let mut reminder = Reminder::new("1", 10_000, "tea");
        assert!(!reminder.is_due(9_999));
        assert!(reminder.is_due(10_000));

        reminder.triggered = true;
        assert!(!reminder.is_due(20_000));
    }

    #[test]
    fn due_reminders_keeps_stored_order() {
        let reminders = vec![
            Reminder::new("b", 30, "second"),
            Reminder::new("a", 10, "first"),
            Reminder::new("c", 99, "later"),
        ];
        let due: Vec<_> = due_reminders(&reminders, 50)
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(due, vec!["b", "a"]);
    }

    #[test]
    fn relative_text_picks_largest_units() {
        assert_eq!(format_time_remaining(0), "expired");
        assert_eq!(format_time_remaining(-5), "expired");
        assert_eq!(format_time_remaining(12_400), "12s");
        assert_eq!(format_time_remaining(200_000), "3m 20s");
        assert_eq!(format_time_remaining(3_900_000), "1h 5m");
    }

    #[test]
    fn relative_text_survives_extreme_times() {
        let now = 1_700_000_000_000;
        assert_eq!(Reminder::new("a", i64::MIN, "old").relative_due_text(now), "expired");
        assert_eq!(Reminder::new("b", i64::MAX, "far").relative_due_text(-now).chars().last(), Some('m'));
    }
}
