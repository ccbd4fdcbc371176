//! Best-effort history of generated songs.

mod file_history_store;

pub use file_history_store::FileHistoryStore;

use crate::songwriter::HistoryEntry;
use anyhow::Result;

/// Maximum number of entries kept, newest first.
pub const HISTORY_CAP: usize = 50;

pub trait HistoryStore: Send + Sync {
    /// All entries, newest first. Unreadable storage yields an empty list.
    fn list(&self) -> Vec<HistoryEntry>;

    /// Prepends an entry, dropping the oldest ones beyond [`HISTORY_CAP`].
    fn append(&self, entry: HistoryEntry) -> Result<()>;

    /// Removes every entry with the given id.
    fn delete(&self, id: i64) -> Result<()>;

    fn clear(&self) -> Result<()>;

    /// Whether mutations survive a restart.
    fn is_persistent(&self) -> bool;
}

/// Store used by hosted deployments: accepts everything, keeps nothing.
pub struct NoOpHistoryStore;

impl HistoryStore for NoOpHistoryStore {
    fn list(&self) -> Vec<HistoryEntry> {
        Vec::new()
    }

    fn append(&self, _entry: HistoryEntry) -> Result<()> {
        Ok(())
    }

    fn delete(&self, _id: i64) -> Result<()> {
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        Ok(())
    }

    fn is_persistent(&self) -> bool {
        false
    }
}

/// Prepends `entry` and enforces the cap.
pub(crate) fn push_front_capped(entries: &mut Vec<HistoryEntry>, entry: HistoryEntry) {
    entries.insert(0, entry);
    entries.truncate(HISTORY_CAP);
}
