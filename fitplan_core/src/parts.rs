//! Body-part label vocabulary.
//!
//! Clients send body parts as free-form labels. The mapping lives in one
//! table; anything not in it is treated as a full-body request.

use crate::BodyPart;
use once_cell::sync::Lazy;
use std::collections::{BTreeSet, HashMap};

/// Recognized labels and the category each one selects
const LABELS: [(&str, BodyPart); 4] = [
    ("腕", BodyPart::Arms),
    ("脚", BodyPart::Legs),
    ("腹筋", BodyPart::Core),
    ("全身", BodyPart::FullBody),
];

static LABEL_TABLE: Lazy<HashMap<&'static str, BodyPart>> =
    Lazy::new(|| LABELS.iter().copied().collect());

/// Category for a label; unknown labels map to [`BodyPart::FullBody`]
pub fn part_from_label(label: &str) -> BodyPart {
    match LABEL_TABLE.get(label) {
        Some(part) => *part,
        None => {
            tracing::debug!("Unrecognized body part label {:?}, using full body", label);
            BodyPart::FullBody
        }
    }
}

/// Map a list of labels to a category filter (duplicates collapse)
pub fn parts_from_labels<S: AsRef<str>>(labels: &[S]) -> BTreeSet<BodyPart> {
    labels
        .iter()
        .map(|label| part_from_label(label.as_ref()))
        .collect()
}

/// Canonical label for a category
pub fn label_for(part: BodyPart) -> &'static str {
    LABELS
        .iter()
        .find(|(_, p)| *p == part)
        .map(|(label, _)| *label)
        .unwrap_or("全身")
}
