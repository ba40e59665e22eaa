//! Shared, TTL-evicted storage for refresh progress snapshots.

use std::sync::Arc;
use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use log::debug;

use super::progress_model::{ProgressKey, ProgressSnapshot};

/// Concurrent snapshot store. Writers overwrite whole snapshots, readers
/// get clones, and finished entries are evicted after a retention window.
#[derive(Default)]
pub struct ProgressStore {
    entries: DashMap<ProgressKey, ProgressSnapshot>,
}

impl ProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, key: ProgressKey, snapshot: ProgressSnapshot) {
        self.entries.insert(key, snapshot);
    }

    /// Atomically claim a key for a new run.
    ///
    /// Inserts `snapshot` and returns true unless a processing entry is
    /// already present. Terminal entries awaiting eviction are replaced.
    /// The claim happens under the map's shard lock, so two racing
    /// callers can never both succeed.
    pub fn try_begin(&self, key: ProgressKey, snapshot: ProgressSnapshot) -> bool {
        match self.entries.entry(key) {
            Entry::Occupied(mut entry) => {
                if entry.get().is_processing() {
                    return false;
                }
                entry.insert(snapshot);
                true
            }
            Entry::Vacant(entry) => {
                entry.insert(snapshot);
                true
            }
        }
    }

    pub fn get(&self, key: &ProgressKey) -> Option<ProgressSnapshot> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    pub fn remove(&self, key: &ProgressKey) {
        self.entries.remove(key);
    }

    /// Schedule removal of `key` once `after` has elapsed. The spawned
    /// task holds the store alive until it fires.
    pub fn evict_after(self: &Arc<Self>, key: ProgressKey, after: Duration) {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(after).await;
            debug!("Evicting progress snapshot for {}", key);
            store.remove(&key);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refresh::progress_model::RefreshStatus;
    use chrono::Utc;

    #[test]
    fn test_insert_overwrites_whole_snapshot() {
        let store = ProgressStore::new();
        let key = ProgressKey::new("u", "p");

        store.insert(key.clone(), ProgressSnapshot::processing(5, 0, Utc::now()));
        let mut updated = ProgressSnapshot::processing(5, 0, Utc::now());
        updated.completed = 3;
        updated.current = Some("TCS".to_string());
        store.insert(key.clone(), updated);

        let read = store.get(&key).unwrap();
        assert_eq!(read.completed, 3);
        assert_eq!(read.current.as_deref(), Some("TCS"));
    }

    #[test]
    fn test_try_begin_claims_vacant_key() {
        let store = ProgressStore::new();
        let key = ProgressKey::new("u", "p");

        assert!(store.try_begin(key.clone(), ProgressSnapshot::processing(0, 0, Utc::now())));
        assert!(store.get(&key).unwrap().is_processing());
    }

    #[test]
    fn test_try_begin_rejects_while_processing() {
        let store = ProgressStore::new();
        let key = ProgressKey::new("u", "p");

        assert!(store.try_begin(key.clone(), ProgressSnapshot::processing(3, 0, Utc::now())));
        assert!(!store.try_begin(key.clone(), ProgressSnapshot::processing(0, 0, Utc::now())));

        // The losing claim must not disturb the live snapshot.
        assert_eq!(store.get(&key).unwrap().total, 3);
    }

    #[test]
    fn test_try_begin_replaces_terminal_entry() {
        let store = ProgressStore::new();
        let key = ProgressKey::new("u", "p");

        let mut finished = ProgressSnapshot::processing(2, 0, Utc::now());
        finished.status = RefreshStatus::Completed;
        store.insert(key.clone(), finished);

        assert!(store.try_begin(key.clone(), ProgressSnapshot::processing(5, 1, Utc::now())));
        let read = store.get(&key).unwrap();
        assert!(read.is_processing());
        assert_eq!(read.total, 5);
    }

    #[test]
    fn test_get_unknown_key_is_none() {
        let store = ProgressStore::new();
        assert!(store.get(&ProgressKey::new("u", "missing")).is_none());
    }

    #[tokio::test]
    async fn test_evict_after_removes_entry() {
        let store = Arc::new(ProgressStore::new());
        let key = ProgressKey::new("u", "p");
        store.insert(key.clone(), ProgressSnapshot::processing(1, 0, Utc::now()));

        store.evict_after(key.clone(), Duration::from_millis(20));
        assert!(store.get(&key).is_some());

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(store.get(&key).is_none());
    }
}
