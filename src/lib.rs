//! Flank: a grid combat game engine with an MCTS opponent.
//!
//! Each player moves a handful of directional pieces: a piece may pivot in
//! place or step to a neighbouring square, three moves per turn. Stepping
//! onto an opponent is combat, and only a nose striking a body wins it.
//!
//! ## Modules
//!
//! - [`constants`] - Board defaults, turn rules, heuristic weights, search parameters
//! - [`state`] - Pieces, players and the board
//! - [`moves`] - Atomic moves and turn sequences, with their text notation
//! - [`rules`] - Move legality and combat resolution
//! - [`turn`] - Move budgets, turn order, committed-turn replay and results
//! - [`movegen`] - Atomic move and turn sequence enumeration
//! - [`eval`] - Heuristic position evaluation
//! - [`book`] - Opening book
//! - [`search`] - Monte Carlo Tree Search over whole turns
//! - [`playout`] - Random rollouts used by the search
//! - [`protocol`] - Line-based text protocol
//!
//! ## Example
//!
//! ```
//! use flank::search::{SearchConfig, choose_turn};
//! use flank::turn::Game;
//!
//! let mut game = Game::new();
//! let config = SearchConfig { sims: 50, seed: Some(1), ..SearchConfig::default() };
//!
//! // The engine picks a turn and submits it like any client would.
//! let d = choose_turn(&game, &config);
//! game.commit_turn(d.player, &d.turn_start, &d.sequence).unwrap();
//! println!("{}", game.board());
//! ```

pub mod book;
pub mod constants;
pub mod eval;
pub mod movegen;
pub mod moves;
pub mod playout;
pub mod protocol;
pub mod rules;
pub mod search;
pub mod state;
pub mod turn;
