//! Repeat-reminder application library
//!
//! This library keeps reminders organized into named groups, persists them to a
//! local key-value slot, and keeps their scheduled notifications in step with
//! every change.

mod cli;
mod config;
mod errors;
mod helper;
mod manager;
mod notification_center;
mod notifications;
mod persistence;
mod reminder;
mod storage;
mod types;

#[cfg(test)]
mod test_utils;

// Re-export key components
pub use cli::*;
pub use config::*;
pub use errors::*;
pub use helper::*;
pub use manager::*;
pub use notification_center::*;
pub use notifications::*;
pub use persistence::*;
pub use reminder::*;
pub use storage::*;
pub use types::*;
