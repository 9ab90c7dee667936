//! Mutation API over the reminder store.
//!
//! Every operation updates the in-memory groups, saves the full list, then
//! tells the notification scheduler what changed. Nothing here returns an
//! error: lookup misses are no-ops and scheduler or storage failures are
//! logged where they happen.
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, error, info};
use tokio::sync::watch;
use uuid::Uuid;

use crate::{
    notification_identifiers, requests_for, Config, FileKeyValueStore, NotificationScheduler,
    Reminder, ReminderGroup, ReminderStore,
};

/// Keeps the reminder store and the notification scheduler consistent.
pub struct ReminderManager {
    /// Canonical groups plus persistence
    store: ReminderStore,

    /// Where notification requests go
    scheduler: Arc<dyn NotificationScheduler>,

    /// Copied onto every notification request
    critical_sound: bool,

    /// Latest snapshot for observers
    published: watch::Sender<Vec<ReminderGroup>>,
}

impl ReminderManager {
    /// Loads the store and publishes its initial snapshot.
    pub fn new(
        mut store: ReminderStore,
        scheduler: Arc<dyn NotificationScheduler>,
        critical_sound: bool,
    ) -> Self {
        store.load();
        let (published, _) = watch::channel(store.groups().to_vec());

        Self {
            store,
            scheduler,
            critical_sound,
            published,
        }
    }

    /// Opens the file-backed store described by `config`.
    pub fn open(config: &Config, scheduler: Arc<dyn NotificationScheduler>) -> Self {
        info!(
            "Opening reminder store in {} (slot '{}')",
            config.data_dir.display(),
            config.storage_key
        );
        let store = ReminderStore::new(
            Box::new(FileKeyValueStore::new(&config.data_dir)),
            config.storage_key.clone(),
            config.default_group_name.clone(),
        );
        Self::new(store, scheduler, config.critical_sound)
    }

    /// Receives a fresh snapshot of all groups after every mutation
    pub fn subscribe(&self) -> watch::Receiver<Vec<ReminderGroup>> {
        self.published.subscribe()
    }

    pub fn groups(&self) -> &[ReminderGroup] {
        self.store.groups()
    }

    pub fn group(&self, group_id: Uuid) -> Option<&ReminderGroup> {
        self.store.group(group_id)
    }

    pub fn find_reminder(&self, reminder_id: Uuid) -> Option<(Uuid, &Reminder)> {
        self.store.find_reminder(reminder_id)
    }

    pub fn reminder_count(&self) -> usize {
        self.store.reminder_count()
    }

    /// Appends an empty group and returns its id
    pub fn add_group(&mut self, name: impl Into<String>) -> Uuid {
        let group = ReminderGroup::new(name);
        let id = group.id;
        info!("Adding group '{}' ({})", group.name, id);

        self.store.groups_mut().push(group);
        self.commit();
        id
    }

    pub fn update_group(&mut self, group_id: Uuid, new_name: impl Into<String>) {
        match self.store.group_index(group_id) {
            Some(index) => {
                let new_name = new_name.into();
                info!("Renaming group {} to '{}'", group_id, new_name);
                self.store.groups_mut()[index].name = new_name;
            }
            None => debug!("Rename skipped, group {} not found", group_id),
        }
        self.commit();
    }

    /// Removes a group and cancels its reminders' notifications.
    ///
    /// Deleting the last group leaves a fresh, empty default group in its
    /// place; the deleted group's reminders are discarded, not migrated.
    pub fn delete_group(&mut self, group_id: Uuid) {
        if let Some(index) = self.store.group_index(group_id) {
            let reminder_ids: Vec<Uuid> = self.store.groups()[index]
                .reminders
                .iter()
                .map(|r| r.id)
                .collect();
            for reminder_id in reminder_ids {
                self.cancel_notifications(reminder_id);
            }

            let removed = self.store.groups_mut().remove(index);
            info!(
                "Deleted group '{}' ({}) with {} reminders",
                removed.name,
                removed.id,
                removed.reminders.len()
            );

            if self.store.groups().is_empty() {
                let fallback = self.store.default_group();
                info!("Last group deleted, substituting '{}'", fallback.name);
                self.store.groups_mut().push(fallback);
            }
        } else {
            debug!("Delete skipped, group {} not found", group_id);
        }
        self.commit();
    }

    /// Adds a reminder and schedules its notifications.
    ///
    /// An unknown `group_id` puts the reminder into the first group; with no
    /// groups at all a default group is created first.
    pub fn add_reminder(
        &mut self,
        title: impl Into<String>,
        description: Option<String>,
        date: DateTime<Utc>,
        repeat_interval: Option<u64>,
        group_id: Uuid,
    ) -> Uuid {
        let reminder = Reminder::new(title.into(), description, date, repeat_interval);
        let reminder_id = reminder.id;

        if self.store.groups().is_empty() {
            let fallback = self.store.default_group();
            debug!("No groups exist, creating '{}'", fallback.name);
            self.store.groups_mut().push(fallback);
        }

        let index = self.store.group_index(group_id).unwrap_or_else(|| {
            debug!("Group {} not found, using first group", group_id);
            0
        });

        info!(
            "Adding reminder '{}' ({}) to group {}",
            reminder.title,
            reminder_id,
            self.store.groups()[index].id
        );
        self.store.groups_mut()[index].reminders.push(reminder.clone());
        self.commit();

        self.cancel_notifications(reminder_id);
        self.schedule_notifications(&reminder);
        reminder_id
    }

    /// Overwrites a reminder's fields in place and reschedules it.
    ///
    /// The old notifications are canceled even when the id is not found.
    pub fn update_reminder(
        &mut self,
        reminder_id: Uuid,
        title: impl Into<String>,
        description: Option<String>,
        date: DateTime<Utc>,
        repeat_interval: Option<u64>,
    ) {
        self.cancel_notifications(reminder_id);

        let updated = self
            .store
            .groups_mut()
            .iter_mut()
            .find_map(|group| group.reminders.iter_mut().find(|r| r.id == reminder_id))
            .map(|reminder| {
                reminder.title = title.into();
                reminder.description = description;
                reminder.date = date;
                reminder.repeat_interval = repeat_interval;
                reminder.clone()
            });

        self.commit();

        match updated {
            Some(reminder) => {
                info!("Updated reminder '{}' ({})", reminder.title, reminder_id);
                self.schedule_notifications(&reminder);
            }
            None => debug!("Update skipped, reminder {} not found", reminder_id),
        }
    }

    /// Cancels a reminder's notifications and removes it from every group
    pub fn delete_reminder(&mut self, reminder_id: Uuid) {
        self.cancel_notifications(reminder_id);

        let mut removed = 0;
        for group in self.store.groups_mut().iter_mut() {
            let before = group.reminders.len();
            group.reminders.retain(|r| r.id != reminder_id);
            removed += before - group.reminders.len();
        }

        if removed > 0 {
            info!("Deleted reminder {}", reminder_id);
        } else {
            debug!("Delete skipped, reminder {} not found", reminder_id);
        }
        self.commit();
    }

    /// Moves a reminder to the end of another group, unchanged.
    ///
    /// Does nothing if either group is missing or the reminder is not in
    /// the source group.
    pub fn move_reminder(&mut self, reminder_id: Uuid, from_group_id: Uuid, to_group_id: Uuid) {
        let source = self.store.group_index(from_group_id);
        let target = self.store.group_index(to_group_id);

        match (source, target) {
            (Some(source), Some(target)) => {
                let position = self.store.groups()[source].position_of(reminder_id);
                match position {
                    Some(position) => {
                        let groups = self.store.groups_mut();
                        let reminder = groups[source].reminders.remove(position);
                        groups[target].reminders.push(reminder);
                        info!(
                            "Moved reminder {} from group {} to group {}",
                            reminder_id, from_group_id, to_group_id
                        );
                    }
                    None => debug!(
                        "Move skipped, reminder {} not in group {}",
                        reminder_id, from_group_id
                    ),
                }
            }
            _ => debug!(
                "Move skipped, group {} or {} not found",
                from_group_id, to_group_id
            ),
        }
        self.commit();
    }

    /// Re-issues cancel and schedule for every stored reminder.
    ///
    /// Used at startup when the scheduler does not remember earlier requests.
    pub fn rearm_all(&self) {
        let reminders: Vec<Reminder> = self
            .store
            .groups()
            .iter()
            .flat_map(|g| g.reminders.iter().cloned())
            .collect();

        info!("Re-arming notifications for {} reminders", reminders.len());
        for reminder in &reminders {
            self.cancel_notifications(reminder.id);
            self.schedule_notifications(reminder);
        }
    }

    fn commit(&mut self) {
        self.store.save();
        self.published.send_replace(self.store.groups().to_vec());
    }

    fn cancel_notifications(&self, reminder_id: Uuid) {
        let identifiers = notification_identifiers(reminder_id);
        match self.scheduler.cancel(&identifiers) {
            Ok(()) => debug!("Canceled notifications {:?}", identifiers),
            Err(e) => error!(
                "Failed to cancel notifications for reminder {}: {}",
                reminder_id, e
            ),
        }
    }

    fn schedule_notifications(&self, reminder: &Reminder) {
        for request in requests_for(reminder, self.critical_sound) {
            let identifier = request.identifier.clone();
            match self.scheduler.schedule(request) {
                Ok(()) => debug!("Scheduled notification {}", identifier),
                Err(e) => error!("Failed to schedule notification {}: {}", identifier, e),
            }
        }
    }
}
