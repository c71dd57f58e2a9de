use chrono::{DateTime, NaiveDate, SecondsFormat, SubsecRound, Utc};
use clap::{Parser, Subcommand};
use fitplan_core::*;
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fitplan")]
#[command(about = "Calorie-targeted training proposals and workout log", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Read configuration from this file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Propose exercises and repetitions for a calorie target
    Propose {
        #[arg(long)]
        user: u32,

        /// Body part label (腕, 脚, 腹筋, 全身); repeatable, none means all
        #[arg(long = "part")]
        parts: Vec<String>,

        /// Target calories (kcal)
        #[arg(long)]
        calories: u32,

        /// Seed for a reproducible selection
        #[arg(long)]
        seed: Option<u64>,

        /// Print the proposal as JSON
        #[arg(long)]
        json: bool,

        /// Register the proposal in the training history
        #[arg(long)]
        accept: bool,
    },

    /// Inspect or extend the exercise catalog
    Exercises {
        #[command(subcommand)]
        action: ExerciseAction,
    },

    /// Record or show body weight
    Weight {
        #[command(subcommand)]
        action: WeightAction,
    },

    /// Query and edit the training history
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
}

#[derive(Subcommand)]
enum ExerciseAction {
    /// List every exercise
    List {
        #[arg(long)]
        json: bool,
    },
    /// Add an exercise to the catalog
    Add {
        #[arg(long)]
        name: String,
        /// Body part label
        #[arg(long)]
        part: String,
        #[arg(long)]
        mets: f64,
        /// Repetitions per minute
        #[arg(long, allow_negative_numbers = true)]
        pace: i32,
    },
}

#[derive(Subcommand)]
enum WeightAction {
    /// Record a new measurement
    Set {
        #[arg(long)]
        user: u32,
        #[arg(long)]
        kg: f64,
    },
    /// Show measurements, newest first
    History {
        #[arg(long)]
        user: u32,
    },
}

#[derive(Subcommand)]
enum HistoryAction {
    /// Entries registered on a given day (UTC)
    Day {
        #[arg(long)]
        user: u32,
        #[arg(long)]
        date: NaiveDate,
    },
    /// Every performed entry
    Completed {
        #[arg(long)]
        user: u32,
    },
    /// Mark an entry as performed
    Done {
        #[arg(long)]
        user: u32,
        #[arg(long)]
        exercise: u32,
        #[arg(long)]
        at: DateTime<Utc>,
        /// Mark as not performed instead
        #[arg(long)]
        undo: bool,
    },
    /// Change an entry's exercise, reps and calories
    Edit {
        #[arg(long)]
        user: u32,
        #[arg(long)]
        exercise: u32,
        #[arg(long)]
        at: DateTime<Utc>,
        #[arg(long)]
        new_exercise: u32,
        #[arg(long)]
        reps: u32,
        #[arg(long)]
        calories: f64,
    },
    /// Remove an entry
    Delete {
        #[arg(long)]
        user: u32,
        #[arg(long)]
        exercise: u32,
        #[arg(long)]
        at: DateTime<Utc>,
    },
    /// Write the whole history to CSV
    Export {
        #[arg(long)]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    fitplan_core::logging::init(cli.verbose);

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let paths = config.paths(cli.data_dir.as_deref());
    tracing::debug!("Using data files {:?}", paths);

    match cli.command {
        Commands::Propose {
            user,
            parts,
            calories,
            seed,
            json,
            accept,
        } => cmd_propose(&config, &paths, user, &parts, calories, seed, json, accept),
        Commands::Exercises { action } => cmd_exercises(&paths, action),
        Commands::Weight { action } => cmd_weight(&paths, action),
        Commands::History { action } => cmd_history(&paths, action),
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_propose(
    config: &Config,
    paths: &config::DataPaths,
    user: u32,
    parts: &[String],
    calories: u32,
    seed: Option<u64>,
    json: bool,
    accept: bool,
) -> Result<()> {
    let catalog = JsonCatalog::new(&paths.catalog);
    let weights = JsonlWeightLog::new(&paths.weights);
    let mut rng = rng_from_seed(seed);

    let proposal = propose_for_user(
        &catalog,
        &weights,
        user,
        parts,
        f64::from(calories),
        &config.proposal,
        &mut rng,
    )?;

    if json {
        println!("{}", serde_json::to_string_pretty(&proposal)?);
    } else {
        display_proposal(&proposal, calories);
    }

    if accept && !proposal.is_empty() {
        let at = Utc::now().trunc_subsecs(0);
        let history = TrainingHistory::new(&paths.history);
        let registered = history.register(user, &proposal.items, at)?;
        let message = format!(
            "✓ Registered {} exercises at {}",
            registered.len(),
            format_time(&at)
        );
        if json {
            eprintln!("{}", message);
        } else {
            println!("\n{}", message);
        }
    }

    Ok(())
}

fn cmd_exercises(paths: &config::DataPaths, action: ExerciseAction) -> Result<()> {
    let catalog = JsonCatalog::new(&paths.catalog);

    match action {
        ExerciseAction::List { json } => {
            let exercises = catalog.list_exercises()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&exercises)?);
                return Ok(());
            }
            for e in &exercises {
                println!(
                    "  #{:<3} {:<24} {:<6} MET {:<5} {} reps/min",
                    e.id,
                    e.name,
                    parts::label_for(e.part),
                    e.mets,
                    e.pace
                );
            }
        }
        ExerciseAction::Add {
            name,
            part,
            mets,
            pace,
        } => {
            let added = catalog.add_exercise(&name, parts::part_from_label(&part), mets, pace)?;
            println!("✓ Added exercise #{} {}", added.id, added.name);
        }
    }

    Ok(())
}

fn cmd_weight(paths: &config::DataPaths, action: WeightAction) -> Result<()> {
    let log = JsonlWeightLog::new(&paths.weights);

    match action {
        WeightAction::Set { user, kg } => {
            let entry = log.record_weight(user, kg)?;
            println!(
                "✓ Recorded {} kg for user {}",
                entry.weight_kg, entry.user_id
            );
        }
        WeightAction::History { user } => {
            let entries = log.history(user)?;
            if entries.is_empty() {
                println!("No weight recorded for user {}.", user);
            }
            for entry in entries {
                println!(
                    "  {}  {} kg",
                    format_time(&entry.recorded_at),
                    entry.weight_kg
                );
            }
        }
    }

    Ok(())
}

fn cmd_history(paths: &config::DataPaths, action: HistoryAction) -> Result<()> {
    let history = TrainingHistory::new(&paths.history);
    let catalog = JsonCatalog::new(&paths.catalog);

    match action {
        HistoryAction::Day { user, date } => {
            let entries = history.entries_on(user, date)?;
            display_entries(&entries, &exercise_names(&catalog)?);
        }
        HistoryAction::Completed { user } => {
            let entries = history.completed(user)?;
            display_entries(&entries, &exercise_names(&catalog)?);
        }
        HistoryAction::Done {
            user,
            exercise,
            at,
            undo,
        } => {
            let key = history_key(user, exercise, at);
            history.set_trained(&key, !undo)?;
            if undo {
                println!("✓ Marked as not done");
            } else {
                println!("✓ Marked as done");
            }
        }
        HistoryAction::Edit {
            user,
            exercise,
            at,
            new_exercise,
            reps,
            calories,
        } => {
            let key = history_key(user, exercise, at);
            let updated = history.update(&key, new_exercise, reps, calories)?;
            println!(
                "✓ Updated entry: exercise #{} {} reps {:.2} kcal",
                updated.key.exercise_id, updated.reps, updated.calories
            );
        }
        HistoryAction::Delete { user, exercise, at } => {
            let key = history_key(user, exercise, at);
            if history.delete(&key)? {
                println!("✓ Deleted entry");
            } else {
                println!("No matching entry found.");
            }
        }
        HistoryAction::Export { out } => {
            let entries = history.load()?;
            let exercises = catalog.list_exercises()?;
            let count = export_history_csv(&entries, &exercises, &out)?;
            println!("✓ Exported {} entries to {}", count, out.display());
        }
    }

    Ok(())
}

fn history_key(user_id: u32, exercise_id: u32, training_date: DateTime<Utc>) -> HistoryKey {
    HistoryKey {
        exercise_id,
        user_id,
        training_date,
    }
}

fn exercise_names(catalog: &JsonCatalog) -> Result<HashMap<u32, String>> {
    Ok(catalog
        .list_exercises()?
        .into_iter()
        .map(|e| (e.id, e.name))
        .collect())
}

fn format_time(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn display_proposal(proposal: &ProposalResult, target: u32) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  TRAINING PROPOSAL");
    println!("╰─────────────────────────────────────────╯");
    println!();

    if proposal.is_empty() {
        println!("  No exercises match the requested body parts.");
        println!();
        return;
    }

    for item in &proposal.items {
        println!(
            "  #{:<3} {:<24} {:>5} reps  {:>8.2} kcal",
            item.exercise_id, item.exercise_name, item.reps, item.calories
        );
    }

    println!();
    println!(
        "  Total: {:.2} kcal (target {} kcal)",
        proposal.total_calories, target
    );
    println!();
}

fn display_entries(entries: &[HistoryEntry], names: &HashMap<u32, String>) {
    if entries.is_empty() {
        println!("No history entries.");
        return;
    }

    for entry in entries {
        let name = names
            .get(&entry.key.exercise_id)
            .map(String::as_str)
            .unwrap_or("unknown");
        println!(
            "  {}  #{:<3} {:<24} {:>5} reps  {:>8.2} kcal  [{}]",
            format_time(&entry.key.training_date),
            entry.key.exercise_id,
            name,
            entry.reps,
            entry.calories,
            if entry.trained { "done" } else { "todo" }
        );
    }
}
