use crate::interface::HistoryEntry;
use crate::prelude::RetinaResult;
use crate::storage::kv::KeyValueStore;
use crate::telemetry::LogManager;
use chrono::{DateTime, Utc};

/// Storage key holding the serialized history.
pub const HISTORY_KEY: &str = "retina_history_v1";

/// Most entries kept; older ones are dropped on append.
pub const HISTORY_CAPACITY: usize = 50;

/// Newest-first prediction log mirrored to a [`KeyValueStore`] after every
/// mutation.
pub struct HistoryStore<S> {
    storage: S,
    entries: Vec<HistoryEntry>,
    logger: LogManager,
}

impl<S: KeyValueStore> HistoryStore<S> {
    /// Opens the store and loads whatever history `storage` already holds.
    pub fn open(storage: S) -> Self {
        let mut store = Self {
            storage,
            entries: Vec::new(),
            logger: LogManager::new(),
        };
        store.entries = store.load_all();
        store
    }

    /// Reads the persisted history. Missing or malformed content yields an
    /// empty list; this never fails.
    pub fn load_all(&self) -> Vec<HistoryEntry> {
        let raw = match self.storage.read(HISTORY_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                self.logger.degraded("history read", &err.to_string());
                return Vec::new();
            }
        };
        match serde_json::from_str::<Vec<HistoryEntry>>(&raw) {
            Ok(mut entries) => {
                entries.truncate(HISTORY_CAPACITY);
                entries
            }
            Err(err) => {
                self.logger.degraded("history parse", &err.to_string());
                Vec::new()
            }
        }
    }

    /// Prepends `entry`, trims to capacity and persists. The in-memory list is
    /// updated even when persisting fails.
    pub fn append(&mut self, entry: HistoryEntry) -> RetinaResult<()> {
        self.entries.insert(0, entry);
        self.entries.truncate(HISTORY_CAPACITY);
        self.persist()
    }

    /// Removes the persisted key, then empties memory. A failed removal leaves
    /// both untouched.
    pub fn clear(&mut self) -> RetinaResult<()> {
        self.storage.remove(HISTORY_KEY)?;
        self.entries.clear();
        self.logger.record("history cleared");
        Ok(())
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&HistoryEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Id for an entry created at `at`: its Unix milliseconds, bumped past the
    /// newest stored id so ids stay unique and increasing.
    pub fn next_id(&self, at: DateTime<Utc>) -> String {
        let millis = at.timestamp_millis();
        let newest = self
            .entries
            .first()
            .and_then(HistoryEntry::id_millis)
            .unwrap_or(i64::MIN);
        millis.max(newest.saturating_add(1)).to_string()
    }

    fn persist(&self) -> RetinaResult<()> {
        let json = serde_json::to_string(&self.entries)?;
        self.storage.write(HISTORY_KEY, &json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::{ConfidenceDistribution, Label, PredictionResult};
    use crate::prelude::RetinaError;
    use crate::storage::kv::{FileStore, MemoryStore};
    use chrono::TimeZone;
    use tempfile::tempdir;

    /// Read-only medium: removals fail, everything else goes to memory.
    struct ReadOnlyRemove(MemoryStore);

    impl KeyValueStore for ReadOnlyRemove {
        fn read(&self, key: &str) -> RetinaResult<Option<String>> {
            self.0.read(key)
        }

        fn write(&self, key: &str, value: &str) -> RetinaResult<()> {
            self.0.write(key, value)
        }

        fn remove(&self, _key: &str) -> RetinaResult<()> {
            Err(RetinaError::Storage("read-only medium".into()))
        }
    }

    fn entry(n: i64) -> HistoryEntry {
        let result = PredictionResult {
            label: Label::Normal,
            confidences: ConfidenceDistribution {
                cnv: 0.1,
                dme: 0.1,
                drusen: 0.1,
                normal: 0.7,
            },
        };
        let at = Utc.timestamp_millis_opt(1_700_000_000_000 + n).unwrap();
        HistoryEntry::new(n.to_string(), format!("retina_{n}.png"), at, &result, None)
    }

    #[test]
    fn keeps_fifty_newest_first() {
        let mut store = HistoryStore::open(MemoryStore::new());
        for n in 0..55 {
            store.append(entry(n)).unwrap();
        }
        assert_eq!(store.len(), HISTORY_CAPACITY);
        assert_eq!(store.entries()[0].id, "54");
        assert_eq!(store.entries()[49].id, "5");
        assert_eq!(store.load_all(), store.entries());
    }

    #[test]
    fn corrupted_content_loads_as_empty() {
        let store = HistoryStore::open(MemoryStore::with_value(HISTORY_KEY, "{not json"));
        assert!(store.is_empty());
        assert!(store.load_all().is_empty());
    }

    #[test]
    fn wrong_shape_loads_as_empty() {
        let store = HistoryStore::open(MemoryStore::with_value(HISTORY_KEY, r#"{"id":"1"}"#));
        assert!(store.is_empty());
        let store = HistoryStore::open(MemoryStore::with_value(HISTORY_KEY, r#"[{"id":"1"}]"#));
        assert!(store.is_empty());
    }

    #[test]
    fn clear_removes_persisted_key() {
        let storage = MemoryStore::new();
        let mut store = HistoryStore::open(&storage);
        store.append(entry(1)).unwrap();
        assert!(storage.read(HISTORY_KEY).unwrap().is_some());
        store.clear().unwrap();
        assert!(store.is_empty());
        assert_eq!(storage.read(HISTORY_KEY).unwrap(), None);
    }

    #[test]
    fn history_survives_reopen_on_disk() {
        let dir = tempdir().unwrap();
        {
            let mut store = HistoryStore::open(FileStore::new(dir.path()));
            store.append(entry(1)).unwrap();
            store.append(entry(2)).unwrap();
        }
        let reopened = HistoryStore::open(FileStore::new(dir.path()));
        assert_eq!(reopened.len(), 2);
        assert_eq!(reopened.entries()[0].id, "2");
        assert_eq!(reopened.get("1").map(|e| e.name.as_str()), Some("retina_1.png"));
    }

    #[test]
    fn next_id_stays_unique_within_a_millisecond() {
        let mut store = HistoryStore::open(MemoryStore::new());
        let at = Utc.timestamp_millis_opt(1_700_000_000_500).unwrap();
        let first = store.next_id(at);
        assert_eq!(first, "1700000000500");
        let mut e = entry(0);
        e.id = first;
        store.append(e).unwrap();
        assert_eq!(store.next_id(at), "1700000000501");
    }

    #[test]
    fn failed_clear_keeps_entries() {
        let mut store = HistoryStore::open(ReadOnlyRemove(MemoryStore::new()));
        store.append(entry(1)).unwrap();
        store.append(entry(2)).unwrap();

        let err = store.clear().unwrap_err();
        assert!(matches!(err, RetinaError::Storage(_)));
        assert_eq!(store.len(), 2);
        assert_eq!(store.load_all(), store.entries());
    }
}
