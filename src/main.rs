//! Flank engine command line.
//!
//! ## Usage
//!
//! - `flank` - Show a demo
//! - `flank serve` - Speak the text protocol on stdin/stdout
//! - `flank selfplay` - Let the engine play itself
//!
//! Logs go to stderr; set `RUST_LOG` (e.g. `RUST_LOG=flank=debug`) to see
//! search details.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use flank::constants::{MAX_GAME_TURNS, N_SIMS, ROLLOUT_TURNS, SEARCH_DEPTH};
use flank::protocol::Engine;
use flank::search::{SearchConfig, Source, choose_turn};
use flank::turn::Game;

/// Flank: grid combat with directional pieces
#[derive(Parser)]
#[command(name = "flank")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    search: SearchArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct SearchArgs {
    /// Simulations per engine turn
    #[arg(long, global = true, default_value_t = N_SIMS)]
    sims: usize,
    /// Maximum moves per enumerated turn sequence
    #[arg(long, global = true, default_value_t = SEARCH_DEPTH)]
    depth: usize,
    /// Random turns simulated past each search leaf
    #[arg(long, global = true, default_value_t = ROLLOUT_TURNS)]
    rollout: usize,
    /// Seed for reproducible searches
    #[arg(long, global = true)]
    seed: Option<u64>,
    /// Ignore the opening book
    #[arg(long, global = true)]
    no_book: bool,
}

impl SearchArgs {
    fn config(&self) -> SearchConfig {
        SearchConfig {
            sims: self.sims,
            depth: self.depth,
            rollout_turns: self.rollout,
            seed: self.seed,
            use_book: !self.no_book,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Speak the text protocol on stdin/stdout
    Serve,
    /// Play engine against engine and print the result
    Selfplay {
        /// Number of players
        #[arg(long, default_value_t = 2)]
        players: usize,
        /// Stop after this many turns
        #[arg(long, default_value_t = MAX_GAME_TURNS)]
        max_turns: usize,
    },
    /// Run a short demo
    Demo,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("flank=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.search.config();

    match cli.command {
        Some(Commands::Serve) => Engine::with_config(config).run(),
        Some(Commands::Selfplay { players, max_turns }) => selfplay(players, max_turns, &config),
        Some(Commands::Demo) | None => run_demo(&config),
    }
}

fn selfplay(players: usize, max_turns: usize, config: &SearchConfig) -> Result<()> {
    let mut game = Game::with_players(players).context("setting up self-play")?;
    for turn in 0..max_turns {
        if game.is_over() {
            break;
        }
        let d = choose_turn(&game, config);
        let from = match d.source {
            Source::Book => "book".to_string(),
            Source::Search { visits, winrate } => format!("search v={visits} wr={winrate:.2}"),
        };
        let report = game
            .commit_turn(d.player, &d.turn_start, &d.sequence)
            .with_context(|| format!("committing turn {turn}"))?;
        info!(turn, player = %d.player, seq = %d.sequence, %from, captures = report.applied.iter().filter(|(_, o)| o.is_capture()).count(), "played");
    }
    println!("{}", game.board());
    println!("Result: {}", game.result());
    Ok(())
}

fn run_demo(config: &SearchConfig) -> Result<()> {
    println!("Flank: grid combat engine\n");

    let mut game = Game::new();
    println!("=== Opening position ===");
    println!("{}", game.board());

    for _ in 0..4 {
        let d = choose_turn(&game, config);
        println!("Player {} plays {} ({:?})", d.player, d.sequence, d.source);
        game.commit_turn(d.player, &d.turn_start, &d.sequence)?;
    }

    println!("\n=== After four turns ===");
    println!("{}", game.board());
    println!("Result: {}", game.result());
    Ok(())
}
