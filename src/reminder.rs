//! Core data structures for the repeat-reminder application.
//!
//! This module contains the reminder and group records that are persisted,
//! and the repeat choices offered when creating or editing a reminder.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Name given to the group synthesized when no group exists.
pub const DEFAULT_GROUP_NAME: &str = "General";

/// Represents a single reminder in our system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    /// Unique identifier, stable for the reminder's lifetime
    pub id: Uuid,
    /// Display title
    pub title: String,
    /// Optional longer text shown as the notification body
    pub description: Option<String>,
    /// When the reminder first fires
    pub date: DateTime<Utc>,
    /// Seconds between repeats; `None` or zero means one-shot
    pub repeat_interval: Option<u64>,
}

impl Reminder {
    /// Creates a new reminder with a fresh identifier
    pub fn new(
        title: String,
        description: Option<String>,
        date: DateTime<Utc>,
        repeat_interval: Option<u64>,
    ) -> Self {
        Reminder {
            id: Uuid::new_v4(),
            title,
            description,
            date,
            repeat_interval,
        }
    }

    /// Whether this reminder keeps firing after its first notification
    pub fn is_repeating(&self) -> bool {
        self.repeat_interval.is_some_and(|secs| secs > 0)
    }
}

/// A named, ordered container of reminders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderGroup {
    /// Unique identifier, stable for the group's lifetime
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Reminders in display order
    pub reminders: Vec<Reminder>,
}

impl ReminderGroup {
    /// Creates an empty group with a fresh identifier
    pub fn new(name: impl Into<String>) -> Self {
        ReminderGroup {
            id: Uuid::new_v4(),
            name: name.into(),
            reminders: Vec::new(),
        }
    }

    /// Position of a reminder in this group, if it is here
    pub fn position_of(&self, reminder_id: Uuid) -> Option<usize> {
        self.reminders.iter().position(|r| r.id == reminder_id)
    }
}

/// Repeat choices, each standing for a fixed number of seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepeatOption {
    None,
    Hourly,
    Daily,
    Monthly,
    Yearly,
}

impl RepeatOption {
    /// Every option, in the order a picker lists them
    pub const ALL: [RepeatOption; 5] = [
        RepeatOption::None,
        RepeatOption::Hourly,
        RepeatOption::Daily,
        RepeatOption::Monthly,
        RepeatOption::Yearly,
    ];

    pub const fn as_seconds(self) -> u64 {
        match self {
            RepeatOption::None => 0,
            RepeatOption::Hourly => 3_600,
            RepeatOption::Daily => 86_400,
            RepeatOption::Monthly => 2_592_000,
            RepeatOption::Yearly => 31_536_000,
        }
    }

    /// Maps a stored interval back to its option, if it is one of ours
    pub fn from_seconds(seconds: u64) -> Option<RepeatOption> {
        RepeatOption::ALL
            .into_iter()
            .find(|option| option.as_seconds() == seconds)
    }

    /// Value to store in `Reminder::repeat_interval`
    pub fn as_interval(self) -> Option<u64> {
        match self {
            RepeatOption::None => None,
            other => Some(other.as_seconds()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_repeat_option_seconds() {
        assert_eq!(RepeatOption::None.as_seconds(), 0);
        assert_eq!(RepeatOption::Hourly.as_seconds(), 3600);
        assert_eq!(RepeatOption::Daily.as_seconds(), 86400);
        assert_eq!(RepeatOption::Monthly.as_seconds(), 2_592_000);
        assert_eq!(RepeatOption::Yearly.as_seconds(), 31_536_000);
    }

    #[test]
    fn test_repeat_option_from_seconds() {
        assert_eq!(RepeatOption::from_seconds(0), Some(RepeatOption::None));
        assert_eq!(RepeatOption::from_seconds(86400), Some(RepeatOption::Daily));
        assert_eq!(RepeatOption::from_seconds(42), None);
        assert_eq!(RepeatOption::None.as_interval(), None);
        assert_eq!(RepeatOption::Hourly.as_interval(), Some(3600));
    }

    #[test]
    fn test_reminder_is_repeating() {
        let date = Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap();
        let mut reminder = Reminder::new("Pay rent".to_string(), None, date, None);
        assert!(!reminder.is_repeating());

        reminder.repeat_interval = Some(0);
        assert!(!reminder.is_repeating());

        reminder.repeat_interval = Some(86400);
        assert!(reminder.is_repeating());
    }

    #[test]
    fn test_new_ids_are_unique() {
        let date = Utc::now();
        let a = Reminder::new("a".to_string(), None, date, None);
        let b = Reminder::new("a".to_string(), None, date, None);
        assert_ne!(a.id, b.id);
        assert_ne!(ReminderGroup::new("x").id, ReminderGroup::new("x").id);
    }
}
