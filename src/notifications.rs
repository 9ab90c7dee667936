//! Notification scheduling contract.
//!
//! A reminder turns into at most two scheduled notifications: a one-shot at
//! its date, and a repeating one when it has a repeat interval. Both are
//! addressed by identifiers derived from the reminder id so they can be
//! canceled without remembering what was scheduled.
use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use uuid::Uuid;

use crate::{NotificationRequest, Reminder, Result, Trigger};

/// The delivery layer the mutation API hands notifications to.
///
/// Implementations only enqueue: both methods return once the request is
/// accepted, not once anything is delivered.
pub trait NotificationScheduler: Send + Sync {
    fn schedule(&self, request: NotificationRequest) -> Result<()>;

    fn cancel(&self, identifiers: &[String]) -> Result<()>;
}

/// Identifier of a reminder's one-shot notification
pub fn one_shot_identifier(reminder_id: Uuid) -> String {
    format!("reminder-{}", reminder_id)
}

/// Identifier of a reminder's repeating notification
pub fn repeat_identifier(reminder_id: Uuid) -> String {
    format!("reminder-{}-repeat", reminder_id)
}

/// Both identifiers a reminder may have scheduled under
pub fn notification_identifiers(reminder_id: Uuid) -> Vec<String> {
    vec![
        one_shot_identifier(reminder_id),
        repeat_identifier(reminder_id),
    ]
}

/// Drops seconds and sub-second precision.
pub fn truncate_to_minute(date: DateTime<Utc>) -> DateTime<Utc> {
    date.duration_trunc(TimeDelta::minutes(1)).unwrap_or(date)
}

/// Builds the requests to schedule for a reminder, one-shot first.
pub fn requests_for(reminder: &Reminder, critical_sound: bool) -> Vec<NotificationRequest> {
    let title = reminder.title.clone();
    let body = reminder.description.clone().unwrap_or_default();

    let mut requests = vec![NotificationRequest {
        identifier: one_shot_identifier(reminder.id),
        title: title.clone(),
        body: body.clone(),
        critical_sound,
        trigger: Trigger::At(truncate_to_minute(reminder.date)),
    }];

    if let Some(seconds) = reminder.repeat_interval.filter(|secs| *secs > 0) {
        requests.push(NotificationRequest {
            identifier: repeat_identifier(reminder.id),
            title,
            body,
            critical_sound,
            trigger: Trigger::Every { seconds },
        });
    }

    requests
}
