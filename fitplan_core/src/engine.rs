//! Proposal engine for building calorie-targeted training plans.
//!
//! Given a body weight, a body-part filter and a calorie target:
//! - Filter the catalog to the requested parts (all parts if none given)
//! - Sample up to `max_exercises` exercises uniformly at random
//! - Split the target evenly and round each share *up* to whole reps
//!
//! Because every share is rounded up, the realized total is never below
//! the requested target.

use crate::config::ProposalConfig;
use crate::weight::WeightSource;
use crate::{
    Error, Exercise, ExerciseCatalog, ProposalItem, ProposalRequest, ProposalResult, Result,
};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Calories burned by a single repetition of `exercise`
///
/// `MET * (1/60) * weight` gives kcal per minute; dividing by the pace
/// (reps per minute) gives kcal per rep.
pub fn calories_per_rep(exercise: &Exercise, weight_kg: f64) -> Result<f64> {
    if exercise.pace <= 0 {
        return Err(Error::Arithmetic(format!(
            "exercise {} ({}) has non-positive pace {}",
            exercise.id, exercise.name, exercise.pace
        )));
    }
    if !(exercise.mets.is_finite() && exercise.mets > 0.0) {
        return Err(Error::Arithmetic(format!(
            "exercise {} ({}) has non-positive MET {}",
            exercise.id, exercise.name, exercise.mets
        )));
    }

    let per_minute = exercise.mets * (1.0 / 60.0) * weight_kg;
    Ok(per_minute / f64::from(exercise.pace))
}

/// Generate a proposal for `request` using randomness from `rng`
///
/// Inputs are checked before the catalog is read. An empty match is a
/// normal empty result; any catalog entry that breaks the per-rep
/// computation aborts the whole proposal.
pub fn generate_proposal<C, R>(
    catalog: &C,
    request: &ProposalRequest,
    settings: &ProposalConfig,
    rng: &mut R,
) -> Result<ProposalResult>
where
    C: ExerciseCatalog + ?Sized,
    R: Rng + ?Sized,
{
    let weight_kg = request
        .body_weight_kg
        .unwrap_or(settings.fallback_weight_kg);
    if !(weight_kg.is_finite() && weight_kg > 0.0) {
        return Err(Error::InvalidInput(format!(
            "body weight must be positive, got {}",
            weight_kg
        )));
    }
    if !(request.target_calories.is_finite() && request.target_calories > 0.0) {
        return Err(Error::InvalidInput(format!(
            "target calories must be positive, got {}",
            request.target_calories
        )));
    }
    if settings.max_exercises == 0 {
        return Err(Error::Config("max_exercises must be at least 1".into()));
    }

    tracing::info!(
        "Generating proposal for user {}: weight {} kg, target {} kcal, parts {:?}",
        request.user_id,
        weight_kg,
        request.target_calories,
        request.parts
    );

    let mut eligible: Vec<Exercise> = catalog
        .list_exercises()?
        .into_iter()
        .filter(|e| request.parts.is_empty() || request.parts.contains(&e.part))
        .collect();

    if eligible.is_empty() {
        tracing::warn!("No exercises found for parts {:?}", request.parts);
        return Ok(ProposalResult::default());
    }

    eligible.shuffle(rng);
    eligible.truncate(settings.max_exercises);

    tracing::info!(
        "Selected exercises: {:?}",
        eligible.iter().map(|e| e.name.as_str()).collect::<Vec<_>>()
    );

    let share = request.target_calories / eligible.len() as f64;
    tracing::debug!("Per-exercise target: {} kcal", share);

    let items = eligible
        .iter()
        .map(|exercise| build_item(exercise, weight_kg, share))
        .collect::<Result<Vec<_>>>()?;

    let total_calories = items.iter().map(|item| item.calories).sum();

    Ok(ProposalResult {
        items,
        total_calories,
    })
}

fn build_item(exercise: &Exercise, weight_kg: f64, share: f64) -> Result<ProposalItem> {
    let per_rep = calories_per_rep(exercise, weight_kg)?;

    let reps = (share / per_rep).ceil();
    if !reps.is_finite() || reps < 1.0 || reps > f64::from(u32::MAX) {
        return Err(Error::Arithmetic(format!(
            "repetition count for {} out of range: {}",
            exercise.name, reps
        )));
    }
    let reps = reps as u32;
    let calories = f64::from(reps) * per_rep;

    tracing::debug!(
        "{}: MET {}, pace {}, {} kcal/rep -> {} reps, {} kcal",
        exercise.name,
        exercise.mets,
        exercise.pace,
        per_rep,
        reps,
        calories
    );

    Ok(ProposalItem {
        exercise_id: exercise.id,
        exercise_name: exercise.name.clone(),
        reps,
        calories,
    })
}

/// Generate a proposal for a stored user, looking up their current weight
///
/// Users with no recorded weight get the configured fallback.
pub fn propose_for_user<C, W, R, S>(
    catalog: &C,
    weights: &W,
    user_id: u32,
    labels: &[S],
    target_calories: f64,
    settings: &ProposalConfig,
    rng: &mut R,
) -> Result<ProposalResult>
where
    C: ExerciseCatalog + ?Sized,
    W: WeightSource + ?Sized,
    R: Rng + ?Sized,
    S: AsRef<str>,
{
    let weight = weights.latest_weight(user_id)?;
    if weight.is_none() {
        tracing::info!(
            "No recorded weight for user {}, using fallback {} kg",
            user_id,
            settings.fallback_weight_kg
        );
    }

    let request = ProposalRequest::from_labels(user_id, weight, labels, target_calories);
    generate_proposal(catalog, &request, settings, rng)
}

/// Random source for one proposal: seeded for reproducible runs,
/// otherwise seeded from the OS
pub fn rng_from_seed(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{build_default_catalog, BodyPart, Catalog};
    use std::collections::BTreeSet;

    fn push_up_catalog() -> Catalog {
        Catalog {
            exercises: vec![Exercise {
                id: 1,
                name: "Push-up".into(),
                part: BodyPart::Arms,
                mets: 3.8,
                pace: 20,
            }],
        }
    }

    fn request(weight: Option<f64>, labels: &[&str], target: f64) -> ProposalRequest {
        ProposalRequest::from_labels(1, weight, labels, target)
    }

    fn settings() -> ProposalConfig {
        ProposalConfig::default()
    }

    struct FailingCatalog;

    impl ExerciseCatalog for FailingCatalog {
        fn list_exercises(&self) -> Result<Vec<Exercise>> {
            Err(Error::CollaboratorUnavailable("catalog offline".into()))
        }
    }

    #[test]
    fn test_push_up_example() {
        let catalog = push_up_catalog();
        let mut rng = rng_from_seed(Some(1));

        let result =
            generate_proposal(&catalog, &request(Some(60.0), &["腕"], 100.0), &settings(), &mut rng)
                .unwrap();

        assert_eq!(result.items.len(), 1);
        let item = &result.items[0];
        assert_eq!(item.exercise_id, 1);
        assert_eq!(item.exercise_name, "Push-up");
        assert_eq!(item.reps, 527);
        assert!((item.calories - 100.13).abs() < 1e-9);
        assert!((result.total_calories - 100.13).abs() < 1e-9);
    }

    #[test]
    fn test_no_matching_part_is_empty_result() {
        let catalog = push_up_catalog();
        let mut rng = rng_from_seed(Some(1));

        let result =
            generate_proposal(&catalog, &request(Some(60.0), &["脚"], 100.0), &settings(), &mut rng)
                .unwrap();

        assert!(result.is_empty());
        assert_eq!(result.total_calories, 0.0);
    }

    #[test]
    fn test_fallback_weight_matches_explicit_sixty() {
        let catalog = build_default_catalog();

        let unknown = generate_proposal(
            &catalog,
            &request(None, &[], 250.0),
            &settings(),
            &mut rng_from_seed(Some(9)),
        )
        .unwrap();
        let explicit = generate_proposal(
            &catalog,
            &request(Some(60.0), &[], 250.0),
            &settings(),
            &mut rng_from_seed(Some(9)),
        )
        .unwrap();

        assert_eq!(unknown, explicit);
    }

    #[test]
    fn test_zero_target_is_invalid() {
        let catalog = push_up_catalog();
        let result = generate_proposal(
            &catalog,
            &request(Some(60.0), &[], 0.0),
            &settings(),
            &mut rng_from_seed(Some(1)),
        );
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_non_positive_weight_is_invalid() {
        let catalog = push_up_catalog();
        for weight in [0.0, -5.0, f64::NAN] {
            let result = generate_proposal(
                &catalog,
                &request(Some(weight), &[], 100.0),
                &settings(),
                &mut rng_from_seed(Some(1)),
            );
            assert!(matches!(result, Err(Error::InvalidInput(_))));
        }
    }

    #[test]
    fn test_invalid_input_checked_before_catalog_read() {
        let result = generate_proposal(
            &FailingCatalog,
            &request(Some(60.0), &[], -1.0),
            &settings(),
            &mut rng_from_seed(Some(1)),
        );
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_catalog_failure_propagates() {
        let result = generate_proposal(
            &FailingCatalog,
            &request(Some(60.0), &[], 100.0),
            &settings(),
            &mut rng_from_seed(Some(1)),
        );
        assert!(matches!(result, Err(Error::CollaboratorUnavailable(_))));
    }

    #[test]
    fn test_zero_pace_aborts_generation() {
        let mut catalog = push_up_catalog();
        catalog.exercises[0].pace = 0;

        let result = generate_proposal(
            &catalog,
            &request(Some(60.0), &["腕"], 100.0),
            &settings(),
            &mut rng_from_seed(Some(1)),
        );
        assert!(matches!(result, Err(Error::Arithmetic(_))));
    }

    fn legs_with_negative_pace(mut catalog: Catalog) -> Catalog {
        catalog.exercises.push(Exercise {
            id: 2,
            name: "Bad Squat".into(),
            part: BodyPart::Legs,
            mets: 5.0,
            pace: -1,
        });
        catalog
    }

    #[test]
    fn test_negative_pace_ignored_when_not_selected() {
        let catalog = legs_with_negative_pace(push_up_catalog());

        let result = generate_proposal(
            &catalog,
            &request(Some(60.0), &["腕"], 100.0),
            &settings(),
            &mut rng_from_seed(Some(1)),
        )
        .unwrap();

        assert_eq!(result.items.len(), 1);
        assert_eq!(result.items[0].exercise_name, "Push-up");
    }

    #[test]
    fn test_negative_pace_aborts_when_selected() {
        let catalog = legs_with_negative_pace(push_up_catalog());

        let result = generate_proposal(
            &catalog,
            &request(Some(60.0), &["脚"], 100.0),
            &settings(),
            &mut rng_from_seed(Some(1)),
        );
        assert!(matches!(result, Err(Error::Arithmetic(_))));
    }

    #[test]
    fn test_underflowing_target_is_arithmetic_error() {
        // 12 kcal per rep; the smallest positive f64 divided by it rounds to zero
        let catalog = Catalog {
            exercises: vec![Exercise {
                id: 1,
                name: "Sled Push".into(),
                part: BodyPart::FullBody,
                mets: 12.0,
                pace: 1,
            }],
        };

        let result = generate_proposal(
            &catalog,
            &request(Some(60.0), &[], f64::from_bits(1)),
            &settings(),
            &mut rng_from_seed(Some(1)),
        );
        assert!(matches!(result, Err(Error::Arithmetic(_))));
    }

    #[test]
    fn test_tiny_target_still_yields_one_rep() {
        let catalog = push_up_catalog();

        let result = generate_proposal(
            &catalog,
            &request(Some(60.0), &["腕"], 0.01),
            &settings(),
            &mut rng_from_seed(Some(1)),
        )
        .unwrap();
        assert_eq!(result.items[0].reps, 1);
    }

    #[test]
    fn test_zero_met_aborts_generation_with_other_valid_items() {
        let mut catalog = push_up_catalog();
        catalog.exercises.push(Exercise {
            id: 2,
            name: "Broken".into(),
            part: BodyPart::Arms,
            mets: 0.0,
            pace: 10,
        });

        let result = generate_proposal(
            &catalog,
            &request(Some(60.0), &["腕"], 100.0),
            &settings(),
            &mut rng_from_seed(Some(1)),
        );
        assert!(matches!(result, Err(Error::Arithmetic(_))));
    }

    #[test]
    fn test_item_count_is_min_of_five_and_eligible() {
        let catalog = build_default_catalog();
        let cases: [(&[&str], usize); 4] = [
            (&[], 5),
            (&["腕"], 3),
            (&["腕", "脚"], 5),
            (&["腹筋", "unknown"], 5),
        ];

        for (labels, expected) in cases {
            let result = generate_proposal(
                &catalog,
                &request(Some(70.0), labels, 300.0),
                &settings(),
                &mut rng_from_seed(Some(3)),
            )
            .unwrap();
            assert_eq!(result.items.len(), expected, "labels {:?}", labels);
        }
    }

    #[test]
    fn test_selection_has_no_duplicates_and_respects_filter() {
        let catalog = build_default_catalog();
        let result = generate_proposal(
            &catalog,
            &request(Some(70.0), &["脚", "腹筋"], 300.0),
            &settings(),
            &mut rng_from_seed(Some(17)),
        )
        .unwrap();

        let ids: BTreeSet<u32> = result.items.iter().map(|i| i.exercise_id).collect();
        assert_eq!(ids.len(), result.items.len());
        for item in &result.items {
            let exercise = catalog
                .exercises
                .iter()
                .find(|e| e.id == item.exercise_id)
                .unwrap();
            assert!(matches!(exercise.part, BodyPart::Legs | BodyPart::Core));
        }
    }

    #[test]
    fn test_reps_follow_ceiling_of_even_share() {
        let catalog = build_default_catalog();
        let weight = 72.5;
        let target = 333.0;

        let result = generate_proposal(
            &catalog,
            &request(Some(weight), &[], target),
            &settings(),
            &mut rng_from_seed(Some(5)),
        )
        .unwrap();

        let share = target / result.items.len() as f64;
        for item in &result.items {
            let exercise = catalog
                .exercises
                .iter()
                .find(|e| e.id == item.exercise_id)
                .unwrap();
            let per_rep = calories_per_rep(exercise, weight).unwrap();
            assert_eq!(item.reps, (share / per_rep).ceil() as u32);
            assert!(item.reps > 0);
            assert_eq!(item.calories, f64::from(item.reps) * per_rep);
        }
    }

    #[test]
    fn test_total_is_exact_sum_and_not_below_target() {
        let catalog = build_default_catalog();
        for seed in 0..20 {
            let target = 50.0 + seed as f64 * 37.0;
            let result = generate_proposal(
                &catalog,
                &request(Some(64.0), &[], target),
                &settings(),
                &mut rng_from_seed(Some(seed)),
            )
            .unwrap();

            let sum: f64 = result.items.iter().map(|i| i.calories).sum();
            assert_eq!(result.total_calories, sum);
            assert!(result.total_calories >= target - 1e-9);
        }
    }

    #[test]
    fn test_empty_parts_equals_all_parts() {
        let catalog = build_default_catalog();
        let all_labels = ["腕", "脚", "腹筋", "全身"];

        for seed in 0..5 {
            let empty = generate_proposal(
                &catalog,
                &request(Some(60.0), &[], 200.0),
                &settings(),
                &mut rng_from_seed(Some(seed)),
            )
            .unwrap();
            let all = generate_proposal(
                &catalog,
                &request(Some(60.0), &all_labels, 200.0),
                &settings(),
                &mut rng_from_seed(Some(seed)),
            )
            .unwrap();
            assert_eq!(empty, all);
        }
    }

    #[test]
    fn test_unknown_label_behaves_like_full_body() {
        let catalog = build_default_catalog();

        let unknown = generate_proposal(
            &catalog,
            &request(Some(60.0), &["shoulders"], 120.0),
            &settings(),
            &mut rng_from_seed(Some(11)),
        )
        .unwrap();
        let full_body = generate_proposal(
            &catalog,
            &request(Some(60.0), &["全身"], 120.0),
            &settings(),
            &mut rng_from_seed(Some(11)),
        )
        .unwrap();

        assert_eq!(unknown, full_body);
        assert_eq!(unknown.items.len(), 3);
    }

    #[test]
    fn test_fixed_seed_is_reproducible() {
        let catalog = build_default_catalog();
        let first = generate_proposal(
            &catalog,
            &request(Some(80.0), &[], 400.0),
            &settings(),
            &mut rng_from_seed(Some(42)),
        )
        .unwrap();
        let second = generate_proposal(
            &catalog,
            &request(Some(80.0), &[], 400.0),
            &settings(),
            &mut rng_from_seed(Some(42)),
        )
        .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_max_exercises_setting_limits_selection() {
        let catalog = build_default_catalog();
        let settings = ProposalConfig {
            max_exercises: 2,
            ..ProposalConfig::default()
        };
        let result = generate_proposal(
            &catalog,
            &request(Some(60.0), &[], 100.0),
            &settings,
            &mut rng_from_seed(Some(2)),
        )
        .unwrap();
        assert_eq!(result.items.len(), 2);
    }

    #[test]
    fn test_propose_for_user_uses_latest_weight() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log = crate::weight::JsonlWeightLog::new(temp_dir.path().join("weights.jsonl"));
        log.record_weight(7, 90.0).unwrap();

        let catalog = push_up_catalog();
        let result = propose_for_user(
            &catalog,
            &log,
            7,
            &["腕"],
            100.0,
            &settings(),
            &mut rng_from_seed(Some(1)),
        )
        .unwrap();

        // 3.8 / 60 * 90 / 20 = 0.285 kcal per rep
        assert_eq!(result.items[0].reps, 351);
    }

    #[test]
    fn test_propose_for_user_without_weight_uses_fallback() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log = crate::weight::JsonlWeightLog::new(temp_dir.path().join("weights.jsonl"));

        let catalog = push_up_catalog();
        let result = propose_for_user(
            &catalog,
            &log,
            7,
            &["腕"],
            100.0,
            &settings(),
            &mut rng_from_seed(Some(1)),
        )
        .unwrap();

        assert_eq!(result.items[0].reps, 527);
    }
}
