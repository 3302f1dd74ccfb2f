//! Move enumeration.
//!
//! Two levels:
//! - [`atomic_moves`]: every pivot and every in-bounds step of the mover's
//!   pieces that does not land on a friend. Steps onto opponents are included;
//!   the rules decide how they end.
//! - [`enumerate_sequences`]: breadth-first turn sequences of length
//!   `0..=depth`. Every node of the search is a candidate, including the
//!   empty sequence (a pass). Each extension is applied through the rules to
//!   an ephemeral copy of the board, so piece indices in later moves refer to
//!   the list exactly as replay will see it. Opponents never move.
//!
//! Branching is about six moves per piece per ply, so the depth should stay
//! small; the search uses [`crate::constants::SEARCH_DEPTH`].

use std::collections::VecDeque;

use crate::constants::MOVE_BUDGET;
use crate::moves::{Move, TurnSequence};
use crate::rules::apply_move;
use crate::state::{BoardState, Direction, PlayerId, Rotation};
use crate::turn::{GameResult, result_of};

/// Every atomic move available to `player` on `state`.
pub fn atomic_moves(state: &BoardState, player: PlayerId) -> Vec<Move> {
    let pieces = state.pieces(player);
    let mut moves = Vec::with_capacity(pieces.len() * 6);
    for (i, piece) in pieces.iter().enumerate() {
        moves.push(Move::pivot(i, Rotation::Left));
        moves.push(Move::pivot(i, Rotation::Right));
        for dir in Direction::ALL {
            let (dx, dy) = dir.delta();
            let (tx, ty) = (piece.x + dx, piece.y + dy);
            if !state.in_bounds(tx, ty) {
                continue;
            }
            match state.occupant(tx, ty) {
                Some((owner, _)) if owner == player => {}
                _ => moves.push(Move::step(i, dir)),
            }
        }
    }
    moves
}

/// Number of atomic moves piece `index` of `player` has.
pub fn mobility(state: &BoardState, player: PlayerId, index: usize) -> usize {
    let Some(piece) = state.pieces(player).get(index) else {
        return 0;
    };
    let steps = Direction::ALL
        .iter()
        .filter(|dir| {
            let (dx, dy) = dir.delta();
            let (tx, ty) = (piece.x + dx, piece.y + dy);
            state.in_bounds(tx, ty) && !matches!(state.occupant(tx, ty), Some((o, _)) if o == player)
        })
        .count();
    steps + 2
}

/// Candidate turns with the board each one leads to, shortest first.
pub fn enumerate_with_states(
    state: &BoardState,
    player: PlayerId,
    depth: usize,
) -> Vec<(TurnSequence, BoardState)> {
    let depth = depth.min(MOVE_BUDGET);
    let mut out = Vec::new();
    let mut frontier = VecDeque::new();
    frontier.push_back((TurnSequence::pass(), state.clone()));

    while let Some((seq, board)) = frontier.pop_front() {
        let open = seq.len() < depth && result_of(&board) == GameResult::InProgress;
        if open {
            for mv in atomic_moves(&board, player) {
                let mut next = board.clone();
                if apply_move(&mut next, player, &mv).is_ok() {
                    frontier.push_back((seq.extended(mv), next));
                }
            }
        }
        out.push((seq, board));
    }
    out
}

/// Candidate turn sequences of length `0..=depth` for `player`.
pub fn enumerate_sequences(state: &BoardState, player: PlayerId, depth: usize) -> Vec<TurnSequence> {
    enumerate_with_states(state, player, depth)
        .into_iter()
        .map(|(seq, _)| seq)
        .collect()
}
