#![forbid(unsafe_code)]

//! Core domain model and business logic for fitplan.
//!
//! This crate provides:
//! - Domain types (exercises, proposals, weight and history records)
//! - The exercise catalog and body-part label table
//! - The calorie-targeted proposal engine
//! - Persistence for the weight log and training history

pub mod types;
pub mod error;
pub mod parts;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod weight;
pub mod history;
pub mod csv_export;
pub mod engine;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{build_default_catalog, get_default_catalog, ExerciseCatalog, JsonCatalog};
pub use config::{Config, ProposalConfig};
pub use weight::{JsonlWeightLog, WeightSource};
pub use history::TrainingHistory;
pub use csv_export::export_history_csv;
pub use engine::{calories_per_rep, generate_proposal, propose_for_user, rng_from_seed};
