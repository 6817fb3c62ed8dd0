//! Headless Battle Runner
//!
//! Runs dish battles without any presentation layer and prints the result as
//! JSON or text. Rosters come from JSON files or are generated from a seed.

use std::path::PathBuf;

use clap::Parser;
use course_battle::battle::{
    BattleEngine, BattleEvent, BattleResult, TeamRoster, Winner, DEFAULT_MAX_STEPS,
    DEFAULT_STEP_SECONDS,
};
use course_battle::core::config::{config, set_config};
use course_battle::core::{BattleConfig, BattleError, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// Headless Battle Runner - slot-by-slot dish battles
#[derive(Parser, Debug)]
#[command(name = "battle_runner")]
#[command(about = "Run dish battles headless and output the result")]
struct Args {
    /// Player roster JSON file
    #[arg(long)]
    player: Option<PathBuf>,

    /// Opponent roster JSON file
    #[arg(long)]
    opponent: Option<PathBuf>,

    /// Seed for generated rosters (used when a roster file is missing)
    #[arg(long)]
    seed: Option<u64>,

    /// Battle config TOML file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the number of courses
    #[arg(long)]
    courses: Option<usize>,

    /// Override the timing speed multiplier
    #[arg(long)]
    speed: Option<f32>,

    /// Simulated seconds per step
    #[arg(long, default_value_t = DEFAULT_STEP_SECONDS)]
    dt: f32,

    /// Maximum steps before giving up on a battle
    #[arg(long, default_value_t = DEFAULT_MAX_STEPS)]
    max_steps: u64,

    /// Number of battles to run (seeds seed, seed+1, ...)
    #[arg(long, default_value_t = 1)]
    battles: u64,

    /// Include the full event log in the output
    #[arg(long)]
    events: bool,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,
}

/// JSON output for a single battle
#[derive(Serialize)]
struct BattleReport {
    seed: Option<u64>,
    ticks: u64,
    simulated_seconds: f32,
    fingerprint: String,
    result: Option<BattleResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    events: Option<Vec<BattleEvent>>,
}

/// JSON output for a batch of battles
#[derive(Serialize)]
struct BatchReport {
    battles: u64,
    unfinished: u64,
    player_wins: u64,
    opponent_wins: u64,
    ties: u64,
    player_win_rate: f32,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("course_battle=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = build_config(&args)?;
    set_config(config)
        .map_err(|_| BattleError::InvalidConfig("battle config already set".into()))?;

    if args.battles > 1 {
        let report = run_batch(&args)?;
        print_batch(&args, &report)?;
    } else {
        let seed = args.seed;
        let (player, opponent) = load_rosters(&args, seed.unwrap_or(0))?;
        let report = run_single(&args, &player, &opponent, seed)?;
        print_single(&args, &report)?;
    }

    Ok(())
}

fn build_config(args: &Args) -> Result<BattleConfig> {
    let mut config = match &args.config {
        Some(path) => BattleConfig::load(path)?,
        None => BattleConfig::default(),
    };
    if let Some(courses) = args.courses {
        config.total_courses = courses;
    }
    if let Some(speed) = args.speed {
        config.timing_speed_scale = speed;
    }
    config.validate()?;

    if !(args.dt > 0.0) {
        return Err(BattleError::InvalidConfig(format!(
            "--dt ({}) must be positive",
            args.dt
        )));
    }
    Ok(config)
}

/// Roster files win; a missing side is generated from the seed
fn load_rosters(args: &Args, seed: u64) -> Result<(TeamRoster, TeamRoster)> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let courses = config().total_courses;

    let player = match &args.player {
        Some(path) => TeamRoster::load(path)?,
        None => TeamRoster::random(&mut rng, courses),
    };
    let opponent = match &args.opponent {
        Some(path) => TeamRoster::load(path)?,
        None => TeamRoster::random(&mut rng, courses),
    };
    Ok((player, opponent))
}

fn run_single(
    args: &Args,
    player: &TeamRoster,
    opponent: &TeamRoster,
    seed: Option<u64>,
) -> Result<BattleReport> {
    let mut engine = BattleEngine::new(config().clone())?;
    engine.start(player, opponent);
    let result = engine.run_to_completion(args.dt, args.max_steps).cloned();

    Ok(BattleReport {
        seed,
        ticks: engine.tick(),
        simulated_seconds: engine.elapsed(),
        fingerprint: format!("{:016x}", engine.fingerprint()),
        result,
        events: args.events.then(|| engine.events().to_vec()),
    })
}

fn run_batch(args: &Args) -> Result<BatchReport> {
    let base_seed = args.seed.unwrap_or_else(|| rand::random());
    let seeds: Vec<u64> = (0..args.battles)
        .map(|i| base_seed.wrapping_add(i))
        .collect();

    let rosters = seeds
        .iter()
        .map(|&seed| load_rosters(args, seed))
        .collect::<Result<Vec<_>>>()?;

    let outcomes: Vec<Option<Winner>> = rosters
        .par_iter()
        .zip(seeds.par_iter())
        .map(|((player, opponent), &seed)| {
            run_single(args, player, opponent, Some(seed))
                .map(|report| report.result.map(|r| r.outcome))
        })
        .collect::<Result<_>>()?;

    let count = |w: Winner| outcomes.iter().filter(|o| **o == Some(w)).count() as u64;
    let player_wins = count(Winner::Player);
    let unfinished = outcomes.iter().filter(|o| o.is_none()).count() as u64;

    Ok(BatchReport {
        battles: args.battles,
        unfinished,
        player_wins,
        opponent_wins: count(Winner::Opponent),
        ties: count(Winner::Tie),
        player_win_rate: player_wins as f32 / args.battles as f32,
    })
}

fn print_single(args: &Args, report: &BattleReport) -> Result<()> {
    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!("=== Battle Result ===");
    if let Some(seed) = report.seed {
        println!("Seed: {}", seed);
    }
    println!(
        "Steps: {} ({:.2}s simulated)",
        report.ticks, report.simulated_seconds
    );
    println!("Fingerprint: {}", report.fingerprint);
    match &report.result {
        Some(result) => {
            for outcome in &result.outcomes {
                println!(
                    "  Course {}: {:?} after {} bites",
                    outcome.slot_index + 1,
                    outcome.winner,
                    outcome.ticks
                );
            }
            println!(
                "Player {} - Opponent {} - Ties {}",
                result.player_wins, result.opponent_wins, result.ties
            );
            println!("Outcome: {:?}", result.outcome);
        }
        None => println!("Battle did not finish within {} steps", args.max_steps),
    }
    if let Some(events) = &report.events {
        println!("\n=== Events ===");
        for event in events {
            println!("[{:>6} {:>7.3}s] {}", event.tick, event.time, event.description);
        }
    }
    Ok(())
}

fn print_batch(args: &Args, report: &BatchReport) -> Result<()> {
    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!("=== {} Battles ===", report.battles);
    println!("Player wins:   {}", report.player_wins);
    println!("Opponent wins: {}", report.opponent_wins);
    println!("Ties:          {}", report.ties);
    if report.unfinished > 0 {
        println!("Unfinished:    {}", report.unfinished);
    }
    println!("Player win rate: {:.1}%", report.player_win_rate * 100.0);
    Ok(())
}
