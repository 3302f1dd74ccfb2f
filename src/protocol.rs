//! Flank Text Protocol.
//!
//! A line-based command protocol in the style of GTP so the engine can sit
//! behind any front end or session server. Each command may carry a numeric
//! id; replies are `=[id] <text>` on success and `?[id] <text>` on failure,
//! followed by a blank line.
//!
//! ## Supported Commands
//!
//! - `name`, `version`, `protocol_version`, `list_commands`
//! - `known_command <cmd>`
//! - `quit`
//! - `new_game [players]` - Reset to the default layout
//! - `pivot <player> <index> <left|right>`
//! - `step <player> <index> <x> <y>`
//! - `play <player> <move>` - One move in notation, e.g. `S1U` or `P0L`
//! - `end_turn <player>`
//! - `commit <player> <snapshot> <sequence>` - Replay a whole turn from a
//!   turn-start snapshot, e.g. `commit 1 2,7,U/3,7,U S1U/P0R`
//! - `genturn [player]` - Choose a turn with the search and commit it
//! - `pieces <player>` - The player's pieces as a snapshot
//! - `turn` - Mover, moves used and moves left
//! - `result` - `in_progress`, `winner <p>` or `draw`
//! - `showboard`
//!
//! ## Example
//!
//! ```ignore
//! use flank::protocol::Engine;
//! let mut engine = Engine::new();
//! engine.run()?;
//! ```

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result, anyhow, bail};
use tracing::debug;

use crate::moves::{Move, TurnSequence};
use crate::rules::Outcome;
use crate::search::{SearchConfig, choose_turn};
use crate::state::{PlayerId, Rotation, format_pieces, parse_pieces};
use crate::turn::{Game, Phase};

/// The list of known commands.
const KNOWN_COMMANDS: &[&str] = &[
    "commit",
    "end_turn",
    "genturn",
    "known_command",
    "list_commands",
    "name",
    "new_game",
    "pieces",
    "pivot",
    "play",
    "protocol_version",
    "quit",
    "result",
    "showboard",
    "step",
    "turn",
    "version",
];

/// Protocol engine state.
pub struct Engine {
    game: Game,
    players: usize,
    config: SearchConfig,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Create an engine for a standard two-player game with default search settings.
    pub fn new() -> Self {
        Self::with_config(SearchConfig::default())
    }

    pub fn with_config(config: SearchConfig) -> Self {
        Self {
            game: Game::new(),
            players: 2,
            config,
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    /// Run the command loop on stdin and stdout.
    pub fn run(&mut self) -> Result<()> {
        let stdin = io::stdin();
        self.run_with(stdin.lock(), io::stdout())
    }

    /// Run the command loop over arbitrary streams.
    pub fn run_with<R: BufRead, W: Write>(&mut self, input: R, mut out: W) -> Result<()> {
        for line in input.lines() {
            let line = line.context("reading command")?;

            // Skip empty lines and comments
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, command_line) = Self::parse_id(line);
            let parts: Vec<&str> = command_line.split_whitespace().collect();
            if parts.is_empty() {
                continue;
            }

            let command = parts[0].to_lowercase();
            let args = &parts[1..];

            let (success, message) = self.execute(&command, args);
            let prefix = if success { '=' } else { '?' };
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();

            writeln!(out, "{prefix}{id_str} {message}\n").context("writing response")?;
            out.flush().context("flushing response")?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Parse an optional numeric command ID from the beginning of the line.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let trimmed = line.trim();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        if end > 0 {
            if let Ok(id) = trimmed[..end].parse::<u32>() {
                return (Some(id), trimmed[end..].trim());
            }
        }
        (None, trimmed)
    }

    /// Execute a command and return (success, response).
    pub fn execute(&mut self, command: &str, args: &[&str]) -> (bool, String) {
        match self.dispatch(command, args) {
            Ok(msg) => (true, msg),
            Err(e) => {
                debug!(command, error = %e, "command failed");
                (false, e.to_string())
            }
        }
    }

    fn dispatch(&mut self, command: &str, args: &[&str]) -> Result<String> {
        match command {
            "name" => Ok("flank".to_string()),

            "version" => Ok(env!("CARGO_PKG_VERSION").to_string()),

            "protocol_version" => Ok("1".to_string()),

            "list_commands" => Ok(KNOWN_COMMANDS.join("\n")),

            "known_command" => {
                let cmd = arg(args, 0)?;
                let known = KNOWN_COMMANDS.contains(&cmd.to_lowercase().as_str());
                Ok(if known { "true" } else { "false" }.to_string())
            }

            "quit" => Ok(String::new()),

            "new_game" => {
                let players = match args.first() {
                    Some(s) => s.parse::<usize>().context("invalid player count")?,
                    None => self.players,
                };
                self.game = Game::with_players(players)?;
                self.players = players;
                Ok(String::new())
            }

            "pivot" => {
                let player = player_arg(args, 0)?;
                let index = index_arg(args, 1)?;
                let rotation: Rotation = arg(args, 2)?.parse()?;
                let report = self.game.pivot(player, index, rotation)?;
                Ok(describe_move(&report.outcome, &report.phase))
            }

            "step" => {
                let player = player_arg(args, 0)?;
                let index = index_arg(args, 1)?;
                let x: i32 = arg(args, 2)?.parse().context("invalid x")?;
                let y: i32 = arg(args, 3)?.parse().context("invalid y")?;
                let report = self.game.step(player, index, x, y)?;
                Ok(describe_move(&report.outcome, &report.phase))
            }

            "play" => {
                let player = player_arg(args, 0)?;
                let mv: Move = arg(args, 1)?.parse()?;
                let report = self.game.play(player, &mv)?;
                Ok(describe_move(&report.outcome, &report.phase))
            }

            "end_turn" => {
                let player = player_arg(args, 0)?;
                let phase = self.game.end_turn(player)?;
                Ok(describe_phase(&phase))
            }

            "commit" => {
                let player = player_arg(args, 0)?;
                let snapshot = parse_pieces(arg(args, 1)?)?;
                let seq: TurnSequence = match args.get(2) {
                    Some(s) => s.parse()?,
                    None => TurnSequence::pass(),
                };
                let report = self.game.commit_turn(player, &snapshot, &seq)?;
                let skipped: Vec<String> = report.skipped.iter().map(|(i, _)| i.to_string()).collect();
                let mut msg = format!("applied {}", report.applied.len());
                if !skipped.is_empty() {
                    msg.push_str(&format!(" skipped {}", skipped.join(",")));
                }
                msg.push_str("; ");
                msg.push_str(&describe_phase(&report.phase));
                Ok(msg)
            }

            "genturn" => {
                if self.game.is_over() {
                    bail!("the game is over");
                }
                if let Some(s) = args.first() {
                    let player: PlayerId = s.parse()?;
                    if player != self.game.mover() {
                        bail!("player {player} is not to move");
                    }
                }
                let decision = choose_turn(&self.game, &self.config);
                self.game
                    .commit_turn(decision.player, &decision.turn_start, &decision.sequence)?;
                Ok(decision.sequence.to_string())
            }

            "pieces" => {
                let player = player_arg(args, 0)?;
                if !self.game.board().is_seated(player) {
                    bail!("player {player} is not seated");
                }
                Ok(format_pieces(self.game.board().pieces(player)))
            }

            "turn" => {
                let t = self.game.turn();
                Ok(format!("{} {} {}", t.mover, t.moves_used, t.moves_left()))
            }

            "result" => Ok(self.game.result().to_string()),

            "showboard" => Ok(format!("\n{}", self.game.board())),

            _ => Err(anyhow!("unknown command: {command}")),
        }
    }
}

fn arg<'a>(args: &[&'a str], i: usize) -> Result<&'a str> {
    args.get(i).copied().ok_or_else(|| anyhow!("missing argument"))
}

fn player_arg(args: &[&str], i: usize) -> Result<PlayerId> {
    Ok(arg(args, i)?.parse()?)
}

fn index_arg(args: &[&str], i: usize) -> Result<usize> {
    arg(args, i)?.parse().context("invalid piece index")
}

fn describe_move(outcome: &Outcome, phase: &Phase) -> String {
    let what = match outcome {
        Outcome::Pivoted { facing } => format!("pivoted {facing}"),
        Outcome::Moved => "moved".to_string(),
        Outcome::Flanked { victim } => format!("flanked {victim}"),
        Outcome::Repelled { by } => format!("repelled {by}"),
    };
    format!("{what}; {}", describe_phase(phase))
}

fn describe_phase(phase: &Phase) -> String {
    match phase {
        Phase::AwaitingMove { mover, moves_used } => format!("to_move {mover} used {moves_used}"),
        Phase::TurnComplete { next } => format!("turn_complete next {next}"),
        Phase::GameOver(result) => format!("game_over {result}"),
    }
}
