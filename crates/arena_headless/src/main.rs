//! Headless Crown Arena runner.
//!
//! # Usage
//!
//! ```bash
//! # Interactive session - read commands from stdin
//! cargo run -p arena_headless -- play
//!
//! # One unattended match, autopilot on the home side
//! cargo run -p arena_headless -- run --seed 42 --difficulty hard
//!
//! # Replay a seed several times and compare hashes
//! cargo run -p arena_headless -- verify --seed 42 --runs 5
//!
//! # Validate data files
//! cargo run -p arena_headless -- validate --catalog assets/data/cards.ron
//! ```
//!
//! Logs go to stderr; stdout carries JSON lines only.

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use arena_core::config::{Difficulty, Settings};
use arena_core::data::CardCatalog;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use arena_headless::game_runner::{run_game, verify_seed, GameConfig};
use arena_headless::loader::{
    catalog_or_builtin, describe_cards, load_catalog, load_settings, settings_or_default,
};
use arena_headless::runner::HeadlessRunner;

#[derive(Parser)]
#[command(name = "arena_headless")]
#[command(about = "Headless Crown Arena runner for scripted play and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Card table to load instead of the built-in one
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Settings file to load
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive session over stdin/stdout
    Play {
        /// Random seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Only output state on `query`
        #[arg(long)]
        quiet: bool,
    },

    /// Play one unattended match
    Run {
        /// Random seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Override the opponent difficulty
        #[arg(long, value_enum)]
        difficulty: Option<DifficultyArg>,

        /// Real milliseconds per frame
        #[arg(long, default_value = "16")]
        frame_ms: u64,

        /// Stop the match after this many ticks
        #[arg(long, default_value = "12000")]
        max_ticks: u64,

        /// Output a snapshot every N ticks (0 = final only)
        #[arg(long, default_value = "0")]
        snapshot_every: u64,

        /// Leave the home side idle
        #[arg(long)]
        no_autopilot: bool,

        /// Autopilot action interval in match milliseconds
        #[arg(long, default_value = "3000")]
        autopilot_ms: u64,
    },

    /// Verify determinism by running the same seed several times
    Verify {
        /// Seed to verify
        #[arg(long, default_value = "12345")]
        seed: u64,

        /// Number of verification runs
        #[arg(short, long, default_value = "5")]
        runs: u32,
    },

    /// Validate a card table and/or settings file
    Validate,
}

/// Command-line spelling of [`Difficulty`].
#[derive(Debug, Clone, Copy, ValueEnum)]
enum DifficultyArg {
    Easy,
    Normal,
    Hard,
}

impl From<DifficultyArg> for Difficulty {
    fn from(arg: DifficultyArg) -> Self {
        match arg {
            DifficultyArg::Easy => Self::Easy,
            DifficultyArg::Normal => Self::Normal,
            DifficultyArg::Hard => Self::Hard,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logging goes to stderr; stdout is for JSON lines.
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_ansi(true),
        )
        .with(filter)
        .init();

    let catalog_path = cli.catalog.as_deref();
    let settings_path = cli.settings.as_deref();

    let outcome = match cli.command.unwrap_or(Commands::Play {
        seed: 0,
        quiet: false,
    }) {
        Commands::Play { seed, quiet } => cmd_play(catalog_path, settings_path, seed, quiet),
        Commands::Run {
            seed,
            difficulty,
            frame_ms,
            max_ticks,
            snapshot_every,
            no_autopilot,
            autopilot_ms,
        } => {
            let config = GameConfig {
                seed,
                frame_ms,
                max_ticks,
                snapshot_every,
                autopilot_ms: (!no_autopilot).then_some(autopilot_ms),
            };
            cmd_run(catalog_path, settings_path, difficulty, &config)
        }
        Commands::Verify { seed, runs } => cmd_verify(catalog_path, settings_path, seed, runs),
        Commands::Validate => cmd_validate(catalog_path, settings_path),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            tracing::error!("{message}");
            eprintln!("FATAL: {message}");
            ExitCode::FAILURE
        }
    }
}

fn load(
    catalog_path: Option<&Path>,
    settings_path: Option<&Path>,
) -> Result<(CardCatalog, Settings), String> {
    let catalog = catalog_or_builtin(catalog_path).map_err(|e| e.to_string())?;
    let settings = settings_or_default(settings_path).map_err(|e| e.to_string())?;
    Ok((catalog, settings))
}

/// Serve an interactive session on stdin/stdout.
fn cmd_play(
    catalog_path: Option<&Path>,
    settings_path: Option<&Path>,
    seed: u64,
    quiet: bool,
) -> Result<(), String> {
    let (catalog, settings) = load(catalog_path, settings_path)?;
    tracing::info!(seed, "Starting interactive session");

    let mut runner = HeadlessRunner::new(catalog, settings, seed).map_err(|e| e.to_string())?;
    if quiet {
        runner = runner.quiet();
    }
    runner
        .run(io::stdin().lock(), &mut io::stdout().lock())
        .map_err(|e| format!("Session IO failed: {e}"))
}

/// Play one unattended match.
fn cmd_run(
    catalog_path: Option<&Path>,
    settings_path: Option<&Path>,
    difficulty: Option<DifficultyArg>,
    config: &GameConfig,
) -> Result<(), String> {
    let (catalog, mut settings) = load(catalog_path, settings_path)?;
    if let Some(difficulty) = difficulty {
        settings.difficulty = difficulty.into();
    }

    let report = run_game(catalog, settings, config, &mut io::stdout().lock())
        .map_err(|e| e.to_string())?;

    eprintln!("\n{}", "=".repeat(40));
    eprintln!("MATCH COMPLETE");
    eprintln!("{}", "=".repeat(40));
    eprintln!("Seed: {}", report.seed);
    eprintln!("Outcome: {:?} ({:?})", report.result.outcome, report.result.reason);
    eprintln!(
        "Crowns: home {} - away {}",
        report.result.crowns.home, report.result.crowns.away
    );
    eprintln!(
        "Match time: {:.1}s over {} ticks",
        report.result.elapsed_ms as f64 / 1000.0,
        report.ticks
    );
    eprintln!(
        "Deploys: home {} (rejected {}), away {}",
        report.home_deploys, report.rejected_deploys, report.away_deploys
    );
    eprintln!("Final hash: {:#018x}", report.final_hash);
    Ok(())
}

/// Replay one seed and compare final hashes.
fn cmd_verify(
    catalog_path: Option<&Path>,
    settings_path: Option<&Path>,
    seed: u64,
    runs: u32,
) -> Result<(), String> {
    let (catalog, settings) = load(catalog_path, settings_path)?;
    let config = GameConfig {
        seed,
        ..GameConfig::default()
    };

    tracing::info!(seed, runs, "Verifying determinism");
    let hashes = verify_seed(&catalog, &settings, &config, runs).map_err(|e| e.to_string())?;

    let first = hashes.first().copied();
    let divergent = hashes.iter().filter(|h| Some(**h) != first).count();
    for (i, hash) in hashes.iter().enumerate() {
        eprintln!("  Run {}: {hash:#018x}", i + 1);
    }

    if divergent == 0 {
        eprintln!("DETERMINISTIC: {runs} runs agree");
        Ok(())
    } else {
        Err(format!("NON-DETERMINISTIC: {divergent} of {runs} runs diverged"))
    }
}

/// Validate data files, reporting every problem.
fn print_cards(catalog: &CardCatalog) {
    for line in describe_cards(catalog) {
        eprintln!("  {line}");
    }
}

fn cmd_validate(catalog_path: Option<&Path>, settings_path: Option<&Path>) -> Result<(), String> {
    let mut failures = Vec::new();

    match catalog_path {
        Some(path) => match load_catalog(path) {
            Ok(catalog) => {
                eprintln!("OK: {} ({} cards)", path.display(), catalog.cards().len());
                print_cards(&catalog);
            }
            Err(e) => failures.push(e.to_string()),
        },
        None => match CardCatalog::builtin() {
            Ok(catalog) => {
                eprintln!("OK: built-in catalog ({} cards)", catalog.cards().len());
                print_cards(&catalog);
            }
            Err(e) => failures.push(e.to_string()),
        },
    }

    if let Some(path) = settings_path {
        match load_settings(path) {
            Ok(_) => eprintln!("OK: {}", path.display()),
            Err(e) => failures.push(e.to_string()),
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        for failure in &failures {
            eprintln!("INVALID: {failure}");
        }
        Err(format!("{} file(s) failed validation", failures.len()))
    }
}
