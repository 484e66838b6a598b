pub mod history;
pub mod kv;

pub use history::{HistoryStore, HISTORY_CAPACITY, HISTORY_KEY};
pub use kv::{FileStore, KeyValueStore, MemoryStore};
