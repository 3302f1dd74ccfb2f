//! Constants for board geometry, turn rules, evaluation weights and search.
//!
//! Everything the engine tunes lives here. Search knobs are only defaults:
//! callers override them through [`crate::search::SearchConfig`].

// =============================================================================
// Board Geometry
// =============================================================================

/// Default board size (NxN).
pub const N: i32 = 8;

/// Pieces each player starts with in the default layout.
pub const PIECES_PER_PLAYER: usize = 4;

/// Smallest board the default layout fits on.
pub const MIN_BOARD_SIZE: i32 = 4;

/// Most players the default layout can seat (one per board edge).
pub const MAX_PLAYERS: usize = 4;

// =============================================================================
// Turn Rules
// =============================================================================

/// Atomic moves a player may spend per turn.
pub const MOVE_BUDGET: usize = 3;

// =============================================================================
// Heuristic Weights
// =============================================================================

/// Score for being the sole survivor. Dominates every non-terminal score.
pub const WIN_SCORE: f64 = 2000.0;

/// Weight per piece of material difference (relative to the starting count).
pub const MATERIAL_WEIGHT: f64 = 150.0;

/// Flat bonus per own piece on the board.
pub const PRESENCE_BONUS: f64 = 10.0;

/// Bonus per row advanced toward the opponent's home edge.
pub const ADVANCE_WEIGHT: f64 = 1.0;

/// Bonus for facing the advance direction.
pub const FACING_BONUS: f64 = 2.0;

/// Bonus per legal atomic move of a piece.
pub const MOBILITY_WEIGHT: f64 = 0.25;

/// Bonus for a nose aimed at an adjacent opponent body (a pending flank).
pub const THREAT_BONUS: f64 = 6.0;

/// Bonus for an "L" pair with one vertical and one horizontal facing.
pub const COORDINATION_BONUS: f64 = 3.0;

/// Multiplier on the coordination bonus when an opponent is near the pair.
pub const COORDINATION_ENGAGED: f64 = 2.0;

/// Manhattan radius within which an opponent counts as "near" a pair.
pub const ENGAGE_RADIUS: i32 = 2;

/// Piece count at or below which a side is considered "low".
pub const LOW_PIECE_COUNT: usize = 2;

/// Bonus per square of distance to the nearest opponent when low on pieces.
pub const SAFETY_WEIGHT: f64 = 2.0;

/// Penalty for an own piece whose body sits under an adjacent opponent nose,
/// applied when the opponent is low and a trade would stall the win.
pub const EXPOSED_PENALTY: f64 = 8.0;

// =============================================================================
// MCTS (Monte Carlo Tree Search) Parameters
// =============================================================================

/// Default number of simulations per turn decision.
pub const N_SIMS: usize = 400;

/// Default cap on the moves per enumerated turn sequence.
pub const SEARCH_DEPTH: usize = 2;

/// Minimum visits before expanding a node.
pub const EXPAND_VISITS: u32 = 4;

/// UCT exploration constant.
pub const UCT_C: f64 = 1.4;

/// Virtual visits given to the heuristic prior of a freshly expanded child.
pub const PRIOR_VISITS: f64 = 2.0;

/// Score scale for squashing heuristic scores into a [0, 1] value.
pub const VALUE_SCALE: f64 = 100.0;

/// Random turns simulated past a leaf before the heuristic cutoff.
pub const ROLLOUT_TURNS: usize = 4;

/// Probability of taking an available flank in rollouts.
pub const PROB_HEURISTIC_FLANK: f64 = 0.9;

/// Probability of refusing a step that would lose the attacker in rollouts.
pub const PROB_REJECT_REPELLED: f64 = 0.9;

/// Progress report period (number of simulations between debug reports).
pub const REPORT_PERIOD: usize = 100;

/// Fast-play threshold at 20% of simulations.
pub const FASTPLAY20_THRES: f64 = 0.9;

/// Fast-play threshold at 5% of simulations.
pub const FASTPLAY5_THRES: f64 = 0.98;

/// Turn cap for self-play games.
pub const MAX_GAME_TURNS: usize = 200;
