// src/notification_center.rs - In-process notification delivery
use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use log::{debug, error, info, warn};
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{self, Duration, MissedTickBehavior};

use crate::{
    truncate_to_minute, Config, NotificationRequest, NotificationScheduler, ReminderError, Result,
    Trigger,
};

#[derive(Debug, Clone, Default)]
pub struct NotificationCenterStatus {
    /// Whether the worker task is running
    pub is_running: bool,
    /// When a notification was last delivered
    pub last_delivery_time: Option<DateTime<Utc>>,
    /// Notifications delivered since start
    pub delivered_count: u64,
    /// Notifications waiting to fire
    pub pending_count: usize,
}

#[derive(Debug)]
pub enum CenterCommand {
    /// Add or replace a pending notification
    Schedule {
        request: NotificationRequest,
        received_at: DateTime<Utc>,
    },
    /// Drop pending notifications by identifier
    Cancel(Vec<String>),
    /// Reply with the pending notifications
    Pending(oneshot::Sender<Vec<PendingNotification>>),
    /// Stop the worker task
    Stop,
}

/// Where due notifications end up.
pub trait NotificationSink: Send + Sync {
    fn deliver(&self, request: &NotificationRequest, fired_at: DateTime<Utc>);
}

/// Delivers by writing to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn deliver(&self, request: &NotificationRequest, fired_at: DateTime<Utc>) {
        if request.body.is_empty() {
            info!("[{}] {}", fired_at.format("%Y-%m-%d %H:%M"), request.title);
        } else {
            info!(
                "[{}] {}: {}",
                fired_at.format("%Y-%m-%d %H:%M"),
                request.title,
                request.body
            );
        }
    }
}

/// A notification waiting for its next fire time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingNotification {
    pub request: NotificationRequest,
    pub next_fire: DateTime<Utc>,
}

/// Pending notifications keyed by identifier.
#[derive(Debug, Default)]
pub struct PendingNotifications {
    entries: BTreeMap<String, PendingNotification>,
}

impl PendingNotifications {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Adds a request, replacing any pending one with the same identifier.
    ///
    /// Returns false when the request can never fire: a one-shot whose
    /// minute has already passed, or a zero interval.
    pub fn insert(&mut self, request: NotificationRequest, received_at: DateTime<Utc>) -> bool {
        let next_fire = match request.trigger {
            Trigger::At(at) => {
                if at < truncate_to_minute(received_at) {
                    debug!("Discarding {}, {} is in the past", request.identifier, at);
                    return false;
                }
                at
            }
            Trigger::Every { seconds } => {
                match interval_delta(seconds).and_then(|step| received_at.checked_add_signed(step)) {
                    Some(next_fire) => next_fire,
                    None => {
                        warn!("Discarding {}, invalid interval {}s", request.identifier, seconds);
                        return false;
                    }
                }
            }
        };

        debug!("Pending {} at {}", request.identifier, next_fire);
        self.entries.insert(
            request.identifier.clone(),
            PendingNotification { request, next_fire },
        );
        true
    }

    /// Removes the given identifiers, returning how many were pending
    pub fn cancel(&mut self, identifiers: &[String]) -> usize {
        identifiers
            .iter()
            .filter(|id| self.entries.remove(id.as_str()).is_some())
            .count()
    }

    /// Delivers everything due at `now`.
    ///
    /// One-shots are removed afterwards. Repeating notifications move to
    /// their first fire time after `now`, so missed periods fire only once.
    pub fn fire_due(&mut self, now: DateTime<Utc>, sink: &dyn NotificationSink) -> usize {
        let due: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, pending)| pending.next_fire <= now)
            .map(|(id, _)| id.clone())
            .collect();

        for id in &due {
            let Some(pending) = self.entries.get_mut(id) else {
                continue;
            };
            sink.deliver(&pending.request, now);

            let next_fire = match pending.request.trigger {
                Trigger::Every { seconds } => interval_delta(seconds).and_then(|step| {
                    let periods = (now - pending.next_fire).num_seconds() / step.num_seconds() + 1;
                    step.num_seconds()
                        .checked_mul(periods)
                        .and_then(TimeDelta::try_seconds)
                        .and_then(|delta| pending.next_fire.checked_add_signed(delta))
                }),
                Trigger::At(_) => None,
            };

            match next_fire {
                Some(next_fire) => pending.next_fire = next_fire,
                None => {
                    self.entries.remove(id);
                }
            }
        }

        due.len()
    }

    pub fn snapshot(&self) -> Vec<PendingNotification> {
        self.entries.values().cloned().collect()
    }
}

fn interval_delta(seconds: u64) -> Option<TimeDelta> {
    if seconds == 0 {
        return None;
    }
    i64::try_from(seconds).ok().and_then(TimeDelta::try_seconds)
}

/// Cloneable, non-blocking front of a [`NotificationCenter`].
///
/// The command channel is unbounded, so a send only fails once the worker
/// has stopped.
#[derive(Debug, Clone)]
pub struct NotificationCenterHandle {
    command_tx: mpsc::UnboundedSender<CenterCommand>,
}

impl NotificationCenterHandle {
    fn send(&self, command: CenterCommand) -> Result<()> {
        self.command_tx
            .send(command)
            .map_err(|e| ReminderError::SchedulerUnavailable {
                message: e.to_string(),
            })
    }
}

impl NotificationScheduler for NotificationCenterHandle {
    fn schedule(&self, request: NotificationRequest) -> Result<()> {
        self.send(CenterCommand::Schedule {
            request,
            received_at: Utc::now(),
        })
    }

    fn cancel(&self, identifiers: &[String]) -> Result<()> {
        self.send(CenterCommand::Cancel(identifiers.to_vec()))
    }
}

/// Keeps pending notifications and delivers them from a background task.
pub struct NotificationCenter {
    /// How often due notifications are checked
    poll_interval: Duration,

    /// Channel to send commands to the worker task
    command_tx: mpsc::UnboundedSender<CenterCommand>,

    /// Receiving end, held until the worker starts
    command_rx: Option<mpsc::UnboundedReceiver<CenterCommand>>,

    /// Handle to the worker task
    worker_task: Option<JoinHandle<()>>,

    /// Current status, shared with the worker
    status: Arc<Mutex<NotificationCenterStatus>>,

    /// Where due notifications are delivered
    sink: Arc<dyn NotificationSink>,
}

impl NotificationCenter {
    /// Create a notification center. Commands sent through its handles are
    /// buffered until [`NotificationCenter::start`].
    pub fn new(config: &Config, sink: Arc<dyn NotificationSink>) -> Self {
        info!(
            "Initializing notification center (poll every {}s)",
            config.poll_interval_secs
        );
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        Self {
            poll_interval: Duration::from_secs(config.poll_interval_secs.max(1)),
            command_tx,
            command_rx: Some(command_rx),
            worker_task: None,
            status: Arc::new(Mutex::new(NotificationCenterStatus::default())),
            sink,
        }
    }

    pub fn handle(&self) -> NotificationCenterHandle {
        NotificationCenterHandle {
            command_tx: self.command_tx.clone(),
        }
    }

    /// Start the worker task
    pub async fn start(&mut self) -> Result<()> {
        let Some(mut command_rx) = self.command_rx.take() else {
            return Err(ReminderError::ApplicationError {
                message: "Notification center was already started".to_string(),
            });
        };
        info!("Starting notification center...");

        let poll_interval = self.poll_interval;
        let sink = Arc::clone(&self.sink);
        let status = Arc::clone(&self.status);
        status.lock().await.is_running = true;

        let task = tokio::spawn(async move {
            let mut pending = PendingNotifications::new();
            let mut interval = time::interval(poll_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let now = Utc::now();
                        let delivered = pending.fire_due(now, sink.as_ref());
                        if delivered > 0 {
                            debug!("Delivered {} notifications", delivered);
                            let mut status = status.lock().await;
                            status.delivered_count += delivered as u64;
                            status.last_delivery_time = Some(now);
                            status.pending_count = pending.len();
                        }
                    }
                    cmd = command_rx.recv() => match cmd {
                        Some(CenterCommand::Schedule { request, received_at }) => {
                            pending.insert(request, received_at);
                            status.lock().await.pending_count = pending.len();
                        }
                        Some(CenterCommand::Cancel(identifiers)) => {
                            let removed = pending.cancel(&identifiers);
                            debug!("Canceled {} of {:?}", removed, identifiers);
                            status.lock().await.pending_count = pending.len();
                        }
                        Some(CenterCommand::Pending(reply)) => {
                            if reply.send(pending.snapshot()).is_err() {
                                debug!("Pending snapshot requester went away");
                            }
                        }
                        Some(CenterCommand::Stop) | None => {
                            info!("Notification center stopping...");
                            break;
                        }
                    }
                }
            }

            status.lock().await.is_running = false;
        });

        self.worker_task = Some(task);
        Ok(())
    }

    /// Stop the worker task if it's running
    pub async fn stop(&mut self) -> Result<()> {
        if let Some(task) = self.worker_task.take() {
            if let Err(e) = self.command_tx.send(CenterCommand::Stop) {
                error!("Failed to send stop command to notification center: {}", e);
            }

            if let Err(e) = task.await {
                let error_mgs = format!("Failed to stop notification center: {}", e);
                error!("{}", error_mgs);
                return Err(ReminderError::ApplicationError { message: error_mgs });
            }

            info!("Notification center stopped");
        } else {
            debug!("Notification center is not running");
        }

        Ok(())
    }

    /// Notifications currently waiting to fire
    pub async fn pending(&self) -> Result<Vec<PendingNotification>> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.command_tx
            .send(CenterCommand::Pending(reply_tx))
            .map_err(|e| ReminderError::SchedulerUnavailable {
                message: format!("Failed to query pending notifications: {}", e),
            })?;

        reply_rx
            .await
            .map_err(|e| ReminderError::SchedulerUnavailable {
                message: format!("Notification center dropped the query: {}", e),
            })
    }

    /// Get the current status of the notification center
    pub async fn status(&self) -> NotificationCenterStatus {
        self.status.lock().await.clone()
    }
}
