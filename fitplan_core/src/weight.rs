//! Body-weight log.
//!
//! Measurements are appended to a JSONL (JSON Lines) file with file locking
//! so that separate processes can record weights safely.

use crate::{Error, Result, WeightEntry};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Source of a user's current body weight
pub trait WeightSource {
    /// Most recent recorded weight, or `None` if the user has none
    fn latest_weight(&self, user_id: u32) -> Result<Option<f64>>;
}

/// JSONL-based weight log with file locking
pub struct JsonlWeightLog {
    path: PathBuf,
}

impl JsonlWeightLog {
    /// Create a new weight log for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Record a measurement taken now
    pub fn record_weight(&self, user_id: u32, weight_kg: f64) -> Result<WeightEntry> {
        self.record_weight_at(user_id, weight_kg, Utc::now())
    }

    /// Record a measurement with an explicit timestamp
    pub fn record_weight_at(
        &self,
        user_id: u32,
        weight_kg: f64,
        recorded_at: DateTime<Utc>,
    ) -> Result<WeightEntry> {
        if !(weight_kg.is_finite() && weight_kg > 0.0) {
            return Err(Error::InvalidInput(format!(
                "weight must be positive, got {}",
                weight_kg
            )));
        }

        let entry = WeightEntry {
            user_id,
            recorded_at,
            weight_kg,
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.lock_exclusive()?;

        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(&entry)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        drop(writer);

        file.unlock()?;

        tracing::info!("Recorded weight {} kg for user {}", weight_kg, user_id);
        Ok(entry)
    }

    /// All measurements for a user, newest first
    pub fn history(&self, user_id: u32) -> Result<Vec<WeightEntry>> {
        let mut entries: Vec<WeightEntry> = read_entries(&self.path)?
            .into_iter()
            .filter(|e| e.user_id == user_id)
            .collect();

        // Later lines win ties on timestamp
        entries.reverse();
        entries.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        Ok(entries)
    }
}

impl WeightSource for JsonlWeightLog {
    fn latest_weight(&self, user_id: u32) -> Result<Option<f64>> {
        let history = self.history(user_id).map_err(|e| {
            Error::CollaboratorUnavailable(format!(
                "failed to read weight log {:?}: {}",
                self.path, e
            ))
        })?;
        Ok(history.first().map(|e| e.weight_kg))
    }
}

/// Read every entry from a weight log, skipping malformed lines
pub fn read_entries(path: &Path) -> Result<Vec<WeightEntry>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut entries = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<WeightEntry>(&line) {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                tracing::warn!(
                    "Failed to parse weight entry at line {}: {}",
                    line_num + 1,
                    e
                );
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} weight entries from {:?}", entries.len(), path);
    Ok(entries)
}
