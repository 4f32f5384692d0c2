//! In-memory notification state: one record per [`NotificationKey`].

use std::collections::BTreeMap;

use crate::types::{DevicePath, NotificationKey, NotificationRecord};

/// Result of [`NotificationStore::upsert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Replaced,
    /// Same key with an identical record; nothing changed.
    Unchanged,
}

#[derive(Debug, Clone, Default)]
pub struct NotificationStore {
    records: BTreeMap<NotificationKey, NotificationRecord>,
}

impl NotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites in place. The entry count never grows for a
    /// key that is already live.
    pub fn upsert(&mut self, key: NotificationKey, record: NotificationRecord) -> UpsertOutcome {
        match self.records.get_mut(&key) {
            Some(existing) if *existing == record => UpsertOutcome::Unchanged,
            Some(existing) => {
                *existing = record;
                UpsertOutcome::Replaced
            }
            None => {
                self.records.insert(key, record);
                UpsertOutcome::Created
            }
        }
    }

    pub fn clear(&mut self, key: &NotificationKey) -> Option<NotificationRecord> {
        self.records.remove(key)
    }

    pub fn get(&self, key: &NotificationKey) -> Option<&NotificationRecord> {
        self.records.get(key)
    }

    pub fn contains(&self, key: &NotificationKey) -> bool {
        self.records.contains_key(key)
    }

    /// All live records, ordered by key.
    pub fn get_all(&self) -> Vec<(NotificationKey, NotificationRecord)> {
        self.records
            .iter()
            .map(|(key, record)| (key.clone(), record.clone()))
            .collect()
    }

    pub fn keys_for_path(&self, device_path: &DevicePath) -> Vec<NotificationKey> {
        self.records
            .keys()
            .filter(|key| &key.device_path == device_path)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
