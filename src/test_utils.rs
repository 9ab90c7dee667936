//! Scheduler and slot doubles shared by unit tests.

use std::io;
use std::sync::{Arc, Mutex};

use crate::{
    KeyValueStore, MemoryKeyValueStore, NotificationRequest, NotificationScheduler,
    ReminderError, Result,
};

/// One call seen by a [`RecordingScheduler`].
#[derive(Debug, Clone, PartialEq)]
pub enum SchedulerCall {
    Schedule(NotificationRequest),
    Cancel(Vec<String>),
}

/// Records every call in issue order. Clones share the log.
#[derive(Debug, Clone, Default)]
pub struct RecordingScheduler {
    calls: Arc<Mutex<Vec<SchedulerCall>>>,
}

impl RecordingScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<SchedulerCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn scheduled(&self) -> Vec<NotificationRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                SchedulerCall::Schedule(request) => Some(request),
                SchedulerCall::Cancel(_) => None,
            })
            .collect()
    }

    pub fn canceled(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                SchedulerCall::Cancel(ids) => Some(ids),
                SchedulerCall::Schedule(_) => None,
            })
            .flatten()
            .collect()
    }
}

impl NotificationScheduler for RecordingScheduler {
    fn schedule(&self, request: NotificationRequest) -> Result<()> {
        self.calls.lock().unwrap().push(SchedulerCall::Schedule(request));
        Ok(())
    }

    fn cancel(&self, identifiers: &[String]) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(SchedulerCall::Cancel(identifiers.to_vec()));
        Ok(())
    }
}

/// Rejects everything.
#[derive(Debug, Clone, Default)]
pub struct FailingScheduler;

impl NotificationScheduler for FailingScheduler {
    fn schedule(&self, _request: NotificationRequest) -> Result<()> {
        Err(ReminderError::SchedulerUnavailable {
            message: "scheduling disabled".to_string(),
        })
    }

    fn cancel(&self, _identifiers: &[String]) -> Result<()> {
        Err(ReminderError::SchedulerUnavailable {
            message: "cancellation disabled".to_string(),
        })
    }
}

/// Memory slots whose reads or writes can be switched to fail.
/// Clones share both the slots and the switches.
#[derive(Debug, Clone, Default)]
pub struct FlakyKeyValueStore {
    inner: MemoryKeyValueStore,
    fail_reads: Arc<Mutex<bool>>,
    fail_writes: Arc<Mutex<bool>>,
}

impl FlakyKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_reads(&self, fail: bool) {
        *self.fail_reads.lock().unwrap() = fail;
    }

    pub fn set_fail_writes(&self, fail: bool) {
        *self.fail_writes.lock().unwrap() = fail;
    }

    /// The underlying slots, bypassing the switches
    pub fn slots(&self) -> MemoryKeyValueStore {
        self.inner.clone()
    }
}

impl KeyValueStore for FlakyKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        if *self.fail_reads.lock().unwrap() {
            return Err(ReminderError::Io(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "slot reads disabled",
            )));
        }
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if *self.fail_writes.lock().unwrap() {
            return Err(ReminderError::Io(io::Error::new(
                io::ErrorKind::Other,
                "slot writes disabled",
            )));
        }
        self.inner.set(key, value)
    }
}
