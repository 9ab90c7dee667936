//! Error types for the repeat-reminder application.
//!
//! This module defines the error type used internally by persistence,
//! configuration and notification scheduling. The mutation API never hands
//! these to its caller; they are logged where they are swallowed.

use std::{io, path::PathBuf};

use thiserror::Error;
use uuid::Uuid;

/// The main error type for the repeat-reminder application.
#[derive(Error, Debug)]
pub enum ReminderError {
    /// Errors related to file I/O operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Errors related to serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A persisted identifier appears more than once.
    #[error("Duplicate identifier in stored data: {id}")]
    DuplicateId { id: Uuid },

    /// Errors related to configuration.
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Directory creation or access failed.
    #[error("Failed to create or access directory: {path}")]
    DirectoryError { path: PathBuf },

    /// The notification scheduler could not accept a request.
    #[error("Notification scheduler unavailable: {message}")]
    SchedulerUnavailable { message: String },

    /// for mutex lock acquisition issues
    #[error("{message}")]
    LockAcquisitionFailed { message: String },

    /// Generic application error with a custom message.
    #[error("{message}")]
    ApplicationError { message: String },
}
