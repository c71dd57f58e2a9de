//! Core domain types for the fitplan system.
//!
//! This module defines the fundamental types used throughout the system:
//! - Exercises and their body-part categories
//! - Proposal requests and results
//! - Weight log and training history records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ============================================================================
// Exercise Types
// ============================================================================

/// Body region an exercise targets
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum BodyPart {
    Arms,
    Legs,
    Core,
    FullBody,
}

impl BodyPart {
    /// Every category, in declaration order
    pub const ALL: [BodyPart; 4] = [
        BodyPart::Arms,
        BodyPart::Legs,
        BodyPart::Core,
        BodyPart::FullBody,
    ];
}

/// A catalog exercise (e.g., "Push-up")
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Exercise {
    pub id: u32,
    pub name: String,
    pub part: BodyPart,
    /// Metabolic equivalent of the movement
    pub mets: f64,
    /// Repetitions per minute
    pub pace: i32,
}

/// The complete exercise catalog, ordered by id
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Catalog {
    pub exercises: Vec<Exercise>,
}

// ============================================================================
// Proposal Types
// ============================================================================

/// Input to the proposal generator
#[derive(Clone, Debug)]
pub struct ProposalRequest {
    pub user_id: u32,
    /// Known body weight; `None` falls back to the configured default
    pub body_weight_kg: Option<f64>,
    /// Empty means every category is eligible
    pub parts: BTreeSet<BodyPart>,
    pub target_calories: f64,
}

impl ProposalRequest {
    /// Build a request from raw body-part labels as they arrive from a client
    pub fn from_labels<S: AsRef<str>>(
        user_id: u32,
        body_weight_kg: Option<f64>,
        labels: &[S],
        target_calories: f64,
    ) -> Self {
        Self {
            user_id,
            body_weight_kg,
            parts: crate::parts::parts_from_labels(labels),
            target_calories,
        }
    }
}

/// One exercise in a proposal with its computed repetition count
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ProposalItem {
    #[serde(rename = "trainingId")]
    pub exercise_id: u32,
    #[serde(rename = "trainingName")]
    pub exercise_name: String,
    pub reps: u32,
    pub calories: f64,
}

/// A generated proposal; `total_calories` is the exact sum of item calories
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ProposalResult {
    #[serde(rename = "trainings")]
    pub items: Vec<ProposalItem>,
    #[serde(rename = "totalCalories")]
    pub total_calories: f64,
}

impl ProposalResult {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// ============================================================================
// Weight and History Types
// ============================================================================

/// A single body-weight measurement
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WeightEntry {
    pub user_id: u32,
    pub recorded_at: DateTime<Utc>,
    pub weight_kg: f64,
}

/// Identity of a training history row
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct HistoryKey {
    pub exercise_id: u32,
    pub user_id: u32,
    pub training_date: DateTime<Utc>,
}

/// A proposal item the user accepted, plus whether it was performed
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntry {
    pub key: HistoryKey,
    pub trained: bool,
    pub reps: u32,
    pub calories: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
