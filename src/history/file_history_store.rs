use super::{push_front_capped, HistoryStore};
use crate::songwriter::HistoryEntry;
use anyhow::{Context, Result};
use std::{
    ffi::OsString,
    fs::File,
    io::{ErrorKind, Read, Write},
    path::{Path, PathBuf},
    sync::Mutex,
};
use tracing::{debug, error, info, warn};

/// History kept as a pretty-printed JSON array in a single file.
///
/// The file is the source of truth: every operation re-reads it, so edits
/// made by another process are picked up (and overwritten on the next write).
/// Entries are decoded one by one; a file that is not a JSON array at all is
/// moved to `<file>.corrupt` before the next write replaces it.
pub struct FileHistoryStore {
    file_path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileHistoryStore {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        let file_path = file_path.into();
        info!("Song history stored at {:?}", file_path);
        Self {
            file_path,
            write_lock: Mutex::new(()),
        }
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Where an undecodable history file is moved before being replaced.
    pub fn corrupt_backup_path(&self) -> PathBuf {
        let mut name = OsString::from(self.file_path.as_os_str());
        name.push(".corrupt");
        PathBuf::from(name)
    }

    /// Raw file content, `None` when the file does not exist yet.
    fn read_content(&self) -> Result<Option<String>> {
        let mut file = match File::open(&self.file_path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("Failed to open history file {:?}", self.file_path)))
            }
        };

        let mut content = String::new();
        file.read_to_string(&mut content)
            .with_context(|| format!("Failed to read history file {:?}", self.file_path))?;
        Ok(Some(content))
    }

    fn load_or_empty(&self) -> Vec<HistoryEntry> {
        let loaded = self
            .read_content()
            .and_then(|content| content.map_or(Ok(Vec::new()), |c| parse_entries(&c)));
        match loaded {
            Ok(entries) => entries,
            Err(e) => {
                debug!("History not loaded from {:?}: {:#}", self.file_path, e);
                Vec::new()
            }
        }
    }

    /// Entries to start a write from. Read failures abort the write; a file
    /// that cannot be decoded is set aside so its content survives.
    fn load_for_update(&self) -> Result<Vec<HistoryEntry>> {
        let Some(content) = self.read_content()? else {
            return Ok(Vec::new());
        };
        match parse_entries(&content) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                let backup = self.corrupt_backup_path();
                warn!(
                    "History file {:?} is not readable ({:#}), moving it to {:?}",
                    self.file_path, e, backup
                );
                std::fs::rename(&self.file_path, &backup).with_context(|| {
                    format!("Failed to move unreadable history file to {:?}", backup)
                })?;
                Ok(Vec::new())
            }
        }
    }

    fn save(&self, entries: &[HistoryEntry]) -> Result<()> {
        let json_string = serde_json::to_string_pretty(entries)?;
        let mut file = File::create(&self.file_path)
            .with_context(|| format!("Failed to create history file {:?}", self.file_path))?;
        file.write_all(json_string.as_bytes())
            .with_context(|| format!("Failed to write history file {:?}", self.file_path))?;
        Ok(())
    }

    /// Runs a read-modify-write cycle under the in-process lock.
    fn update(&self, f: impl FnOnce(&mut Vec<HistoryEntry>)) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| anyhow::anyhow!("history lock poisoned"))?;
        let result = self.load_for_update().and_then(|mut entries| {
            f(&mut entries);
            self.save(&entries)
        });
        result.inspect_err(|e| {
            error!("Error saving history: {:#}", e);
        })
    }
}

/// Decodes a JSON array of entries, skipping the ones that do not fit.
fn parse_entries(content: &str) -> Result<Vec<HistoryEntry>> {
    let values: Vec<serde_json::Value> =
        serde_json::from_str(content).context("History file is not a JSON array")?;
    let entries = values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value(value) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping unreadable history entry #{}: {}", index, e);
                None
            }
        })
        .collect();
    Ok(entries)
}

impl HistoryStore for FileHistoryStore {
    fn list(&self) -> Vec<HistoryEntry> {
        self.load_or_empty()
    }

    fn append(&self, entry: HistoryEntry) -> Result<()> {
        self.update(|entries| push_front_capped(entries, entry))
    }

    fn delete(&self, id: i64) -> Result<()> {
        self.update(|entries| entries.retain(|e| e.id != id))
    }

    fn clear(&self) -> Result<()> {
        self.update(|entries| entries.clear())
    }

    fn is_persistent(&self) -> bool {
        true
    }
}
