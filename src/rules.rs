//! Move legality and combat resolution.
//!
//! Every function here is total: a rejected move returns `Err` and leaves
//! the board exactly as it was.
//!
//! Combat happens when a piece steps onto an opponent. With `(dx, dy)` the
//! step delta, the attacker leads with its nose if it faces `(dx, dy)` and
//! the defender meets it nose-first if it faces `(-dx, -dy)`. Only a nose
//! striking a body is a flank; every other contact destroys the attacker.

use thiserror::Error;
use tracing::debug;

use crate::moves::Move;
use crate::state::{BoardState, Direction, PlayerId, Rotation};

/// Why a move or commit was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("the game is over")]
    GameOver,
    #[error("player {0} is not to move")]
    NotYourTurn(PlayerId),
    #[error("player {0} is not seated")]
    UnknownPlayer(PlayerId),
    #[error("no piece at index {0}")]
    PieceOutOfRange(usize),
    #[error("target is not an orthogonal neighbour")]
    NotAdjacent,
    #[error("target is off the board")]
    OutOfBounds,
    #[error("target holds one of the mover's own pieces")]
    OwnPiece,
    #[error("move budget already spent")]
    BudgetExhausted,
    #[error("turn-start snapshot does not fit the board")]
    InvalidSnapshot,
}

/// Result of a collision between an attacker and a defender.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Combat {
    /// Nose on body: the defender is removed and the attacker takes its square.
    Flank,
    /// Anything else: the attacker is removed and the defender stays.
    Repelled,
}

/// What an accepted move did to the board.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Pivoted { facing: Direction },
    Moved,
    Flanked { victim: PlayerId },
    Repelled { by: PlayerId },
}

impl Outcome {
    /// Whether the move removed a piece from the board.
    pub fn is_capture(&self) -> bool {
        matches!(self, Outcome::Flanked { .. } | Outcome::Repelled { .. })
    }
}

/// Decide a collision from the two facings and the attacker's step delta.
pub fn resolve_combat(attacker: Direction, defender: Direction, dx: i32, dy: i32) -> Combat {
    let attacker_nose = attacker.delta() == (dx, dy);
    let defender_nose = defender.delta() == (-dx, -dy);
    if attacker_nose && !defender_nose {
        Combat::Flank
    } else {
        Combat::Repelled
    }
}

/// Rotate `player`'s piece `index` a quarter turn.
pub fn pivot(
    state: &mut BoardState,
    player: PlayerId,
    index: usize,
    rotation: Rotation,
) -> Result<Outcome, Rejection> {
    let pieces = state
        .pieces_mut(player)
        .ok_or(Rejection::UnknownPlayer(player))?;
    let piece = pieces
        .get_mut(index)
        .ok_or(Rejection::PieceOutOfRange(index))?;
    piece.facing = piece.facing.rotate(rotation);
    Ok(Outcome::Pivoted {
        facing: piece.facing,
    })
}

/// Step `player`'s piece `index` onto `(tx, ty)`, fighting any opponent there.
pub fn step(
    state: &mut BoardState,
    player: PlayerId,
    index: usize,
    tx: i32,
    ty: i32,
) -> Result<Outcome, Rejection> {
    if !state.is_seated(player) {
        return Err(Rejection::UnknownPlayer(player));
    }
    let attacker = *state
        .pieces(player)
        .get(index)
        .ok_or(Rejection::PieceOutOfRange(index))?;

    let (Some(dx), Some(dy)) = (tx.checked_sub(attacker.x), ty.checked_sub(attacker.y)) else {
        return Err(Rejection::NotAdjacent);
    };
    if Direction::from_delta(dx, dy).is_none() {
        return Err(Rejection::NotAdjacent);
    }
    if !state.in_bounds(tx, ty) {
        return Err(Rejection::OutOfBounds);
    }

    match state.occupant(tx, ty) {
        None => {
            if let Some(ours) = state.pieces_mut(player) {
                ours[index].x = tx;
                ours[index].y = ty;
            }
            Ok(Outcome::Moved)
        }
        Some((owner, _)) if owner == player => Err(Rejection::OwnPiece),
        Some((owner, di)) => {
            let defender = state.pieces(owner)[di];
            match resolve_combat(attacker.facing, defender.facing, dx, dy) {
                Combat::Flank => {
                    if let Some(theirs) = state.pieces_mut(owner) {
                        theirs.remove(di);
                    }
                    if let Some(ours) = state.pieces_mut(player) {
                        ours[index].x = tx;
                        ours[index].y = ty;
                    }
                    debug!(%player, index, victim = %owner, x = tx, y = ty, "flank");
                    Ok(Outcome::Flanked { victim: owner })
                }
                Combat::Repelled => {
                    if let Some(ours) = state.pieces_mut(player) {
                        ours.remove(index);
                    }
                    debug!(%player, index, by = %owner, x = tx, y = ty, "attacker repelled");
                    Ok(Outcome::Repelled { by: owner })
                }
            }
        }
    }
}

/// Apply one atomic move to `state` on behalf of `player`.
pub fn apply_move(state: &mut BoardState, player: PlayerId, mv: &Move) -> Result<Outcome, Rejection> {
    match *mv {
        Move::Pivot { index, rotation } => pivot(state, player, index, rotation),
        Move::Step { index, dx, dy } => {
            let piece = *state
                .pieces(player)
                .get(index)
                .ok_or(Rejection::PieceOutOfRange(index))?;
            let (Some(tx), Some(ty)) = (piece.x.checked_add(dx), piece.y.checked_add(dy)) else {
                return Err(Rejection::NotAdjacent);
            };
            step(state, player, index, tx, ty)
        }
    }
}
