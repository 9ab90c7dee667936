use std::collections::HashSet;

use log::{debug, error, info, trace, warn};
use uuid::Uuid;

use crate::{KeyValueStore, Reminder, ReminderError, ReminderGroup, Result};

/// Serializes the full ordered group list to the persisted text form.
pub fn encode_groups(groups: &[ReminderGroup]) -> Result<String> {
    trace!("Serializing {} groups", groups.len());
    Ok(serde_json::to_string_pretty(groups)?)
}

/// Parses the persisted text form, rejecting duplicate group or reminder ids.
pub fn decode_groups(content: &str) -> Result<Vec<ReminderGroup>> {
    let groups: Vec<ReminderGroup> = serde_json::from_str(content)?;

    let mut group_ids = HashSet::with_capacity(groups.len());
    let mut reminder_ids = HashSet::new();
    for group in &groups {
        if !group_ids.insert(group.id) {
            return Err(ReminderError::DuplicateId { id: group.id });
        }
        for reminder in &group.reminders {
            if !reminder_ids.insert(reminder.id) {
                return Err(ReminderError::DuplicateId { id: reminder.id });
            }
        }
    }

    Ok(groups)
}

/// Owns the canonical list of groups and their reminders, and mirrors it
/// into one slot of a [`KeyValueStore`].
pub struct ReminderStore {
    /// Ordered groups, each owning its ordered reminders
    groups: Vec<ReminderGroup>,

    /// Where snapshots are written
    slot_store: Box<dyn KeyValueStore>,

    /// Slot name inside `slot_store`
    storage_key: String,

    /// Name used when a fallback group has to be created
    default_group_name: String,
}

impl ReminderStore {
    /// Creates an empty store. Call [`ReminderStore::load`] before use.
    pub fn new(
        slot_store: Box<dyn KeyValueStore>,
        storage_key: impl Into<String>,
        default_group_name: impl Into<String>,
    ) -> Self {
        Self {
            groups: Vec::new(),
            slot_store,
            storage_key: storage_key.into(),
            default_group_name: default_group_name.into(),
        }
    }

    /// Restores the group list from the slot.
    ///
    /// A missing, unreadable or malformed snapshot is replaced by a single
    /// empty default group, which is written back immediately. Never fails.
    pub fn load(&mut self) {
        debug!("Loading reminder groups from slot '{}'", self.storage_key);

        let loaded = match self.slot_store.get(&self.storage_key) {
            Ok(Some(content)) => match decode_groups(&content) {
                Ok(groups) => Some(groups),
                Err(e) => {
                    warn!("Stored reminder groups are corrupt, resetting: {}", e);
                    None
                }
            },
            Ok(None) => {
                info!("No stored reminder groups, starting fresh");
                None
            }
            Err(e) => {
                warn!("Failed to read stored reminder groups, resetting: {}", e);
                None
            }
        };

        match loaded {
            Some(groups) if !groups.is_empty() => {
                info!(
                    "Loaded {} groups with {} reminders",
                    groups.len(),
                    groups.iter().map(|g| g.reminders.len()).sum::<usize>()
                );
                self.groups = groups;
            }
            _ => {
                self.groups = vec![self.default_group()];
                self.save();
            }
        }
    }

    /// Writes the full group list to the slot. Failures are logged and
    /// otherwise ignored; the in-memory list stays authoritative.
    pub fn save(&mut self) {
        let encoded = match encode_groups(&self.groups) {
            Ok(encoded) => encoded,
            Err(e) => {
                error!("Failed to serialize reminder groups: {}", e);
                return;
            }
        };

        match self.slot_store.set(&self.storage_key, &encoded) {
            Ok(()) => debug!("Saved {} groups", self.groups.len()),
            Err(e) => error!("Failed to save reminder groups: {}", e),
        }
    }

    /// A fresh, empty group carrying the configured default name
    pub fn default_group(&self) -> ReminderGroup {
        ReminderGroup::new(self.default_group_name.clone())
    }

    pub fn groups(&self) -> &[ReminderGroup] {
        &self.groups
    }

    pub(crate) fn groups_mut(&mut self) -> &mut Vec<ReminderGroup> {
        &mut self.groups
    }

    pub fn group(&self, group_id: Uuid) -> Option<&ReminderGroup> {
        self.groups.iter().find(|g| g.id == group_id)
    }

    pub(crate) fn group_index(&self, group_id: Uuid) -> Option<usize> {
        self.groups.iter().position(|g| g.id == group_id)
    }

    /// Finds a reminder and the id of the group that owns it
    pub fn find_reminder(&self, reminder_id: Uuid) -> Option<(Uuid, &Reminder)> {
        self.groups.iter().find_map(|group| {
            group
                .reminders
                .iter()
                .find(|r| r.id == reminder_id)
                .map(|r| (group.id, r))
        })
    }

    /// Total number of reminders across all groups
    pub fn reminder_count(&self) -> usize {
        self.groups.iter().map(|g| g.reminders.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::FlakyKeyValueStore;
    use crate::{FileKeyValueStore, MemoryKeyValueStore, DEFAULT_STORAGE_KEY};
    use chrono::{TimeZone, Utc};
    use tempfile::tempdir;

    fn sample_groups() -> Vec<ReminderGroup> {
        let mut work = ReminderGroup::new("Work");
        work.reminders.push(Reminder::new(
            "Standup".to_string(),
            Some("Daily sync".to_string()),
            Utc.with_ymd_and_hms(2025, 3, 4, 9, 30, 0).unwrap(),
            Some(86400),
        ));
        work.reminders.push(Reminder::new(
            "Review".to_string(),
            None,
            Utc.with_ymd_and_hms(2025, 3, 5, 14, 0, 0).unwrap(),
            None,
        ));
        let home = ReminderGroup::new("Home");
        vec![work, home]
    }

    fn memory_store(slots: &MemoryKeyValueStore) -> ReminderStore {
        ReminderStore::new(Box::new(slots.clone()), DEFAULT_STORAGE_KEY, "General")
    }

    #[test]
    fn test_encode_decode_preserves_everything() {
        let groups = sample_groups();
        let encoded = encode_groups(&groups).unwrap();
        let decoded = decode_groups(&encoded).unwrap();
        assert_eq!(decoded, groups);
    }

    #[test]
    fn test_decode_rejects_duplicate_reminder_ids() {
        let mut groups = sample_groups();
        let duplicate = groups[0].reminders[0].clone();
        groups[1].reminders.push(duplicate.clone());

        let encoded = encode_groups(&groups).unwrap();
        match decode_groups(&encoded) {
            Err(ReminderError::DuplicateId { id }) => assert_eq!(id, duplicate.id),
            other => panic!("expected duplicate id error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_missing_slot_creates_default_and_persists() {
        let slots = MemoryKeyValueStore::new();
        let mut store = memory_store(&slots);
        store.load();

        assert_eq!(store.groups().len(), 1);
        assert_eq!(store.groups()[0].name, "General");
        assert!(store.groups()[0].reminders.is_empty());

        let persisted = slots.get(DEFAULT_STORAGE_KEY).unwrap().unwrap();
        assert_eq!(decode_groups(&persisted).unwrap(), store.groups());
    }

    #[test]
    fn test_load_corrupt_slot_resets() {
        let mut slots = MemoryKeyValueStore::new();
        slots.set(DEFAULT_STORAGE_KEY, "{ definitely not groups").unwrap();

        let mut store = memory_store(&slots);
        store.load();

        assert_eq!(store.groups().len(), 1);
        assert_eq!(store.groups()[0].name, "General");
        let persisted = slots.get(DEFAULT_STORAGE_KEY).unwrap().unwrap();
        assert!(decode_groups(&persisted).is_ok());
    }

    #[test]
    fn test_load_empty_list_heals_to_default() {
        let mut slots = MemoryKeyValueStore::new();
        slots.set(DEFAULT_STORAGE_KEY, "[]").unwrap();

        let mut store = memory_store(&slots);
        store.load();
        assert_eq!(store.groups().len(), 1);
    }

    #[test]
    fn test_load_existing_groups() {
        let groups = sample_groups();
        let mut slots = MemoryKeyValueStore::new();
        slots
            .set(DEFAULT_STORAGE_KEY, &encode_groups(&groups).unwrap())
            .unwrap();

        let mut store = memory_store(&slots);
        store.load();
        assert_eq!(store.groups(), groups.as_slice());
        assert_eq!(store.reminder_count(), 2);
    }

    #[test]
    fn test_save_failure_keeps_memory_state() {
        let slots = FlakyKeyValueStore::new();
        let mut store = ReminderStore::new(Box::new(slots.clone()), DEFAULT_STORAGE_KEY, "General");
        store.load();

        slots.set_fail_writes(true);
        store.groups_mut().push(ReminderGroup::new("Unsaved"));
        store.save();

        assert_eq!(store.groups().len(), 2);
        let persisted = decode_groups(&slots.get(DEFAULT_STORAGE_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(persisted.len(), 1);
    }

    #[test]
    fn test_load_read_failure_resets_and_persists() {
        let slots = FlakyKeyValueStore::new();
        let mut raw = slots.slots();
        raw.set(DEFAULT_STORAGE_KEY, &encode_groups(&sample_groups()).unwrap())
            .unwrap();
        slots.set_fail_reads(true);

        let mut store = ReminderStore::new(Box::new(slots.clone()), DEFAULT_STORAGE_KEY, "General");
        store.load();

        assert_eq!(store.groups().len(), 1);
        assert_eq!(store.groups()[0].name, "General");
        assert!(store.groups()[0].reminders.is_empty());

        let persisted = decode_groups(&raw.get(DEFAULT_STORAGE_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(persisted, store.groups());
    }

    #[test]
    fn test_load_duplicate_group_ids_resets() {
        let mut groups = sample_groups();
        groups[1].id = groups[0].id;
        let encoded = encode_groups(&groups).unwrap();
        assert!(matches!(
            decode_groups(&encoded),
            Err(ReminderError::DuplicateId { id }) if id == groups[0].id
        ));

        let mut slots = MemoryKeyValueStore::new();
        slots.set(DEFAULT_STORAGE_KEY, &encoded).unwrap();
        let mut store = memory_store(&slots);
        store.load();

        assert_eq!(store.groups().len(), 1);
        assert_eq!(store.groups()[0].name, "General");
        assert_eq!(store.reminder_count(), 0);
        let persisted = decode_groups(&slots.get(DEFAULT_STORAGE_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(persisted, store.groups());
    }

    #[test]
    fn test_find_reminder_reports_owner() {
        let groups = sample_groups();
        let target = groups[0].reminders[1].id;
        let work_id = groups[0].id;

        let mut slots = MemoryKeyValueStore::new();
        slots
            .set(DEFAULT_STORAGE_KEY, &encode_groups(&groups).unwrap())
            .unwrap();
        let mut store = memory_store(&slots);
        store.load();

        let (owner, reminder) = store.find_reminder(target).unwrap();
        assert_eq!(owner, work_id);
        assert_eq!(reminder.title, "Review");
        assert!(store.find_reminder(Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_file_backed_round_trip() {
        let dir = tempdir().unwrap();
        let mut store = ReminderStore::new(
            Box::new(FileKeyValueStore::new(dir.path())),
            DEFAULT_STORAGE_KEY,
            "General",
        );
        store.load();
        *store.groups_mut() = sample_groups();
        store.save();

        let mut reopened = ReminderStore::new(
            Box::new(FileKeyValueStore::new(dir.path())),
            DEFAULT_STORAGE_KEY,
            "General",
        );
        reopened.load();
        assert_eq!(reopened.groups(), store.groups());
    }
}
