//! Shared data structures for the repeat-reminder application.
//!
//! Holds the crate-wide `Result` alias and the notification request types
//! exchanged between the mutation API and a scheduler.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ReminderError;

/// A specialized Result type for repeat-reminder operations.
pub type Result<T> = std::result::Result<T, ReminderError>;

/// When a scheduled notification fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trigger {
    /// Fire once at an absolute time (minute resolution).
    At(DateTime<Utc>),
    /// Fire every `seconds`, counted from when the scheduler receives the request.
    Every { seconds: u64 },
}

/// A single notification the scheduler is asked to deliver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRequest {
    /// Deterministic identifier used for later cancellation
    pub identifier: String,
    /// Visible title
    pub title: String,
    /// Visible body, empty when the reminder has no description
    pub body: String,
    /// Ask the delivery layer for its critical alert sound
    pub critical_sound: bool,
    /// When to fire
    pub trigger: Trigger,
}
