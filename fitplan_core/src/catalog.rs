//! Exercise catalog: the built-in defaults and a JSON-file-backed store.
//!
//! The proposal engine only sees the [`ExerciseCatalog`] trait, so any
//! source that can list exercises can feed it.

use crate::{BodyPart, Catalog, Error, Exercise, Result};
use fs2::FileExt;
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Source of the full exercise catalog
pub trait ExerciseCatalog {
    /// Every known exercise, ordered by id
    fn list_exercises(&self) -> Result<Vec<Exercise>>;
}

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog);

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

fn exercise(id: u32, name: &str, part: BodyPart, mets: f64, pace: i32) -> Exercise {
    Exercise {
        id,
        name: name.into(),
        part,
        mets,
        pace,
    }
}

/// Builds the default catalog with built-in exercises for every body part
pub fn build_default_catalog() -> Catalog {
    Catalog {
        exercises: vec![
            // Arms
            exercise(1, "Push-up", BodyPart::Arms, 3.8, 20),
            exercise(2, "Tricep Dip", BodyPart::Arms, 3.8, 15),
            exercise(3, "Dumbbell Curl", BodyPart::Arms, 3.5, 15),
            // Legs
            exercise(4, "Squat", BodyPart::Legs, 5.0, 20),
            exercise(5, "Lunge", BodyPart::Legs, 4.0, 16),
            exercise(6, "Calf Raise", BodyPart::Legs, 2.8, 30),
            // Core
            exercise(7, "Crunch", BodyPart::Core, 3.8, 25),
            exercise(8, "Leg Raise", BodyPart::Core, 3.0, 15),
            exercise(9, "Russian Twist", BodyPart::Core, 3.5, 30),
            // Full body
            exercise(10, "Burpee", BodyPart::FullBody, 8.0, 10),
            exercise(11, "Jumping Jack", BodyPart::FullBody, 7.7, 60),
            exercise(12, "Mountain Climber", BodyPart::FullBody, 8.0, 40),
        ],
    }
}

impl ExerciseCatalog for Catalog {
    fn list_exercises(&self) -> Result<Vec<Exercise>> {
        let mut exercises = self.exercises.clone();
        exercises.sort_by_key(|e| e.id);
        Ok(exercises)
    }
}

impl Catalog {
    /// Validate the catalog for consistency
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let mut seen = HashSet::new();

        for exercise in &self.exercises {
            if !seen.insert(exercise.id) {
                errors.push(format!("Duplicate exercise id {}", exercise.id));
            }
            errors.extend(check_exercise(exercise));
        }

        errors
    }

    /// Append a new exercise with the next free id
    pub fn add(&mut self, name: &str, part: BodyPart, mets: f64, pace: i32) -> Result<Exercise> {
        let next_id = self.exercises.iter().map(|e| e.id).max().unwrap_or(0) + 1;
        let new = exercise(next_id, name.trim(), part, mets, pace);

        let problems = check_exercise(&new);
        if !problems.is_empty() {
            return Err(Error::CatalogValidation(problems.join("; ")));
        }

        self.exercises.push(new.clone());
        Ok(new)
    }
}

fn check_exercise(exercise: &Exercise) -> Vec<String> {
    let mut errors = Vec::new();
    if exercise.name.trim().is_empty() {
        errors.push(format!("Exercise {} has empty name", exercise.id));
    }
    if !(exercise.mets.is_finite() && exercise.mets > 0.0) {
        errors.push(format!(
            "Exercise {} has non-positive MET {}",
            exercise.id, exercise.mets
        ));
    }
    if exercise.pace <= 0 {
        errors.push(format!(
            "Exercise {} has non-positive pace {}",
            exercise.id, exercise.pace
        ));
    }
    errors
}

/// Catalog stored as a JSON document on disk
///
/// A missing file means "use the built-in catalog"; the file is only
/// created once an exercise is added.
pub struct JsonCatalog {
    path: PathBuf,
}

impl JsonCatalog {
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

    /// Load the catalog, falling back to the built-in one when absent
    pub fn load(&self) -> Result<Catalog> {
        if !self.path.exists() {
            tracing::debug!("No catalog file at {:?}, using built-in catalog", self.path);
            return Ok(get_default_catalog().clone());
        }

        let file = std::fs::File::open(&self.path)?;
        file.lock_shared()?;
        let parsed = serde_json::from_reader::<_, Catalog>(std::io::BufReader::new(&file));
        file.unlock()?;

        let catalog = parsed?;
        tracing::debug!(
            "Loaded {} exercises from {:?}",
            catalog.exercises.len(),
            self.path
        );
        Ok(catalog)
    }

    /// Add an exercise and persist the catalog atomically
    ///
    /// The load-add-save cycle holds an exclusive lock on a sidecar
    /// `.lock` file so concurrent writers never drop each other's entries.
    pub fn add_exercise(
        &self,
        name: &str,
        part: BodyPart,
        mets: f64,
        pace: i32,
    ) -> Result<Exercise> {
        let lock = self.open_lock()?;
        lock.lock_exclusive()?;

        let result = self.load().and_then(|mut catalog| {
            let added = catalog.add(name, part, mets, pace)?;
            self.save(&catalog)?;
            Ok(added)
        });

        lock.unlock()?;
        let added = result?;
        tracing::info!("Added exercise {} ({}) to catalog", added.id, added.name);
        Ok(added)
    }

    fn save(&self, catalog: &Catalog) -> Result<()> {
        let parent = self.path.parent().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "catalog path missing parent")
        })?;
        std::fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            serde_json::to_writer_pretty(&mut writer, catalog)?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;
        Ok(())
    }
}

impl ExerciseCatalog for JsonCatalog {
    fn list_exercises(&self) -> Result<Vec<Exercise>> {
        let catalog = self.load().map_err(|e| {
            Error::CollaboratorUnavailable(format!(
                "failed to read catalog {:?}: {}",
                self.path, e
            ))
        })?;
        catalog.list_exercises()
    }
}
