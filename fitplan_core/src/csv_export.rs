//! CSV export of the training history.

use crate::{Exercise, HistoryEntry, Result};
use std::collections::HashMap;
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow<'a> {
    user_id: u32,
    exercise_id: u32,
    exercise_name: &'a str,
    training_date: String,
    trained: bool,
    reps: u32,
    calories: f64,
}

/// Write history entries to `csv_path` with a header row
///
/// Exercise names are resolved against `exercises`; ids missing from the
/// catalog are written as "unknown". The file is replaced, not appended,
/// and synced before returning. Returns the number of rows written.
pub fn export_history_csv(
    entries: &[HistoryEntry],
    exercises: &[Exercise],
    csv_path: &Path,
) -> Result<usize> {
    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let names: HashMap<u32, &str> = exercises.iter().map(|e| (e.id, e.name.as_str())).collect();

    let file = std::fs::File::create(csv_path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(file);

    for entry in entries {
        writer.serialize(CsvRow {
            user_id: entry.key.user_id,
            exercise_id: entry.key.exercise_id,
            exercise_name: names.get(&entry.key.exercise_id).copied().unwrap_or("unknown"),
            training_date: entry.key.training_date.to_rfc3339(),
            trained: entry.trained,
            reps: entry.reps,
            calories: entry.calories,
        })?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    file.sync_all()?;

    tracing::info!("Exported {} history entries to {:?}", entries.len(), csv_path);
    Ok(entries.len())
}
