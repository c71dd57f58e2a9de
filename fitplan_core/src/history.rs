//! Training history: proposals a user accepted and whether they did them.
//!
//! The whole history is one JSON document. Every mutation holds an
//! exclusive lock on a sidecar `.lock` file for the load-modify-save cycle
//! and replaces the document atomically (temp file, fsync, rename).

use crate::{Error, HistoryEntry, HistoryKey, ProposalItem, Result};
use chrono::{DateTime, NaiveDate, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

#[derive(Debug, Default, Serialize, Deserialize)]
struct HistoryDocument {
    entries: Vec<HistoryEntry>,
}

/// File-backed training history store
pub struct TrainingHistory {
    path: PathBuf,
}

impl TrainingHistory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        self.path.with_extension("json.lock")
    }

    fn open_lock(&self) -> Result<File> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.lock_path())?;
        Ok(file)
    }

    /// Read every entry; a missing file is an empty history
    ///
    /// Unlike the weight log, a corrupted history document is an error.
    pub fn load(&self) -> Result<Vec<HistoryEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let lock = self.open_lock()?;
        lock.lock_shared()?;
        let result = self.read_document();
        lock.unlock()?;
        result
    }

    fn read_document(&self) -> Result<Vec<HistoryEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let contents = std::fs::read_to_string(&self.path)?;
        let document: HistoryDocument = serde_json::from_str(&contents)?;
        Ok(document.entries)
    }

    fn write_document(&self, entries: Vec<HistoryEntry>) -> Result<()> {
        let parent = self.path.parent().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "history path missing parent")
        })?;

        let temp = NamedTempFile::new_in(parent)?;
        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            serde_json::to_writer(&mut writer, &HistoryDocument { entries })?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;
        Ok(())
    }

    /// Load, modify and save the history under an exclusive lock
    fn modify<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Vec<HistoryEntry>) -> Result<T>,
    {
        let lock = self.open_lock()?;
        lock.lock_exclusive()?;

        let result = self.read_document().and_then(|mut entries| {
            let value = f(&mut entries)?;
            self.write_document(entries)?;
            Ok(value)
        });

        lock.unlock()?;
        result
    }

    /// Record every proposal item as a not-yet-performed entry
    ///
    /// An existing entry with the same key is replaced.
    pub fn register(
        &self,
        user_id: u32,
        items: &[ProposalItem],
        at: DateTime<Utc>,
    ) -> Result<Vec<HistoryEntry>> {
        let new_entries: Vec<HistoryEntry> = items
            .iter()
            .map(|item| HistoryEntry {
                key: HistoryKey {
                    exercise_id: item.exercise_id,
                    user_id,
                    training_date: at,
                },
                trained: false,
                reps: item.reps,
                calories: item.calories,
                created_at: at,
                updated_at: at,
            })
            .collect();

        let registered = new_entries.clone();
        self.modify(move |entries| {
            for entry in new_entries {
                upsert(entries, entry);
            }
            Ok(())
        })?;

        tracing::info!(
            "Registered {} history entries for user {}",
            registered.len(),
            user_id
        );
        Ok(registered)
    }

    /// Entries whose training date falls on `date` (UTC), newest first
    pub fn entries_on(&self, user_id: u32, date: NaiveDate) -> Result<Vec<HistoryEntry>> {
        let mut entries: Vec<_> = self
            .load()?
            .into_iter()
            .filter(|e| e.key.user_id == user_id && e.key.training_date.date_naive() == date)
            .collect();
        sort_newest_first(&mut entries);
        Ok(entries)
    }

    /// Every performed entry for a user, newest first
    pub fn completed(&self, user_id: u32) -> Result<Vec<HistoryEntry>> {
        let mut entries: Vec<_> = self
            .load()?
            .into_iter()
            .filter(|e| e.key.user_id == user_id && e.trained)
            .collect();
        sort_newest_first(&mut entries);
        Ok(entries)
    }

    pub fn find(&self, key: &HistoryKey) -> Result<Option<HistoryEntry>> {
        Ok(self.load()?.into_iter().find(|e| &e.key == key))
    }

    /// Mark an entry as performed (or not)
    pub fn set_trained(&self, key: &HistoryKey, trained: bool) -> Result<HistoryEntry> {
        let now = Utc::now();
        self.modify(|entries| {
            let entry = entries
                .iter_mut()
                .find(|e| &e.key == key)
                .ok_or_else(|| not_found(key))?;
            entry.trained = trained;
            entry.updated_at = now;
            Ok(entry.clone())
        })
    }

    /// Replace an entry's exercise, reps and calories
    ///
    /// The entry moves to a new key carrying `new_exercise_id`; the training
    /// date and status are kept.
    pub fn update(
        &self,
        key: &HistoryKey,
        new_exercise_id: u32,
        reps: u32,
        calories: f64,
    ) -> Result<HistoryEntry> {
        if !(calories.is_finite() && calories >= 0.0) {
            return Err(Error::InvalidInput(format!(
                "calories must be non-negative, got {}",
                calories
            )));
        }

        let now = Utc::now();
        self.modify(|entries| {
            let position = entries
                .iter()
                .position(|e| &e.key == key)
                .ok_or_else(|| not_found(key))?;
            let mut entry = entries.remove(position);

            entry.key.exercise_id = new_exercise_id;
            entry.reps = reps;
            entry.calories = calories;
            entry.updated_at = now;

            upsert(entries, entry.clone());
            Ok(entry)
        })
    }

    /// Remove an entry; returns whether it existed
    pub fn delete(&self, key: &HistoryKey) -> Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        let deleted = self.modify(|entries| {
            let before = entries.len();
            entries.retain(|e| &e.key != key);
            Ok(entries.len() != before)
        })?;

        if deleted {
            tracing::info!("Deleted history entry {:?}", key);
        }
        Ok(deleted)
    }
}

fn upsert(entries: &mut Vec<HistoryEntry>, entry: HistoryEntry) {
    match entries.iter_mut().find(|e| e.key == entry.key) {
        Some(existing) => *existing = entry,
        None => entries.push(entry),
    }
}

fn sort_newest_first(entries: &mut [HistoryEntry]) {
    entries.sort_by(|a, b| b.key.training_date.cmp(&a.key.training_date));
}

fn not_found(key: &HistoryKey) -> Error {
    Error::NotFound(format!(
        "history entry for exercise {} (user {}) at {}",
        key.exercise_id,
        key.user_id,
        key.training_date.to_rfc3339()
    ))
}
