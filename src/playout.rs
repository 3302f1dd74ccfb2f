//! Random turn rollouts.
//!
//! A rollout plays a few quick turns past a search leaf so the heuristic
//! judges a position after the opponent has had a chance to answer. Each
//! turn spends the full move budget on random atomic moves, with two light
//! biases: flanks are usually taken when available, and steps that would
//! throw a piece against a nose or body are usually refused.

use fastrand::Rng;

use crate::constants::{MOVE_BUDGET, PROB_HEURISTIC_FLANK, PROB_REJECT_REPELLED};
use crate::movegen::atomic_moves;
use crate::moves::Move;
use crate::rules::{Combat, apply_move, resolve_combat};
use crate::state::{BoardState, PlayerId};
use crate::turn::{GameResult, next_alive, result_of};

/// How an atomic move would end if played now.
fn combat_of(state: &BoardState, player: PlayerId, mv: &Move) -> Option<Combat> {
    let Move::Step { index, dx, dy } = *mv else {
        return None;
    };
    let piece = state.pieces(player).get(index)?;
    let (owner, di) = state.occupant(piece.x + dx, piece.y + dy)?;
    if owner == player {
        return None;
    }
    let defender = state.pieces(owner)[di];
    Some(resolve_combat(piece.facing, defender.facing, dx, dy))
}

/// Pick one atomic move for `player`, or `None` if there is nothing to play.
pub fn choose_move(state: &BoardState, player: PlayerId, rng: &mut Rng) -> Option<Move> {
    let moves = atomic_moves(state, player);
    if moves.is_empty() {
        return None;
    }

    if rng.f64() < PROB_HEURISTIC_FLANK {
        let flanks: Vec<&Move> = moves
            .iter()
            .filter(|m| combat_of(state, player, m) == Some(Combat::Flank))
            .collect();
        if !flanks.is_empty() {
            return Some(*flanks[rng.usize(..flanks.len())]);
        }
    }

    // Shuffle-scan like a reservoir: random start, reject losing attacks.
    let n = moves.len();
    let start = rng.usize(..n);
    for k in 0..n {
        let mv = moves[(start + k) % n];
        if combat_of(state, player, &mv) == Some(Combat::Repelled)
            && rng.f64() < PROB_REJECT_REPELLED
        {
            continue;
        }
        return Some(mv);
    }
    Some(moves[start])
}

/// Play up to `turns` random turns starting with `to_move`.
///
/// Stops early once the game is decided. Returns the final board.
pub fn rollout(
    state: &BoardState,
    order: &[PlayerId],
    mut to_move: PlayerId,
    turns: usize,
    rng: &mut Rng,
) -> BoardState {
    let mut board = state.clone();
    for _ in 0..turns {
        if result_of(&board) != GameResult::InProgress {
            break;
        }
        for _ in 0..MOVE_BUDGET {
            let Some(mv) = choose_move(&board, to_move, rng) else {
                break;
            };
            if apply_move(&mut board, to_move, &mv).is_err() || result_of(&board) != GameResult::InProgress {
                break;
            }
            if board.piece_count(to_move) == 0 {
                break;
            }
        }
        match next_alive(&board, order, to_move) {
            Some(p) => to_move = p,
            None => break,
        }
    }
    board
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Direction, Piece};

    #[test]
    fn test_rollout_leaves_input_untouched() {
        let b = BoardState::standard();
        let mut rng = Rng::with_seed(7);
        let order = [PlayerId(0), PlayerId(1)];
        let after = rollout(&b, &order, PlayerId(0), 6, &mut rng);
        assert_eq!(b, BoardState::standard());
        assert!(after.total_pieces() <= 8);
        for p in after.players() {
            assert!(after.fits(p, after.pieces(p)));
        }
    }

    #[test]
    fn test_rollout_is_seeded() {
        let b = BoardState::standard();
        let order = [PlayerId(0), PlayerId(1)];
        let a = rollout(&b, &order, PlayerId(0), 4, &mut Rng::with_seed(42));
        let c = rollout(&b, &order, PlayerId(0), 4, &mut Rng::with_seed(42));
        assert_eq!(a, c);
    }

    #[test]
    fn test_choose_move_none_without_pieces() {
        let mut b = BoardState::new(8);
        b.seat(PlayerId(0), vec![Piece::new(0, 0, Direction::Down)]);
        b.seat(PlayerId(1), Vec::new());
        assert_eq!(choose_move(&b, PlayerId(1), &mut Rng::with_seed(1)), None);
    }

    #[test]
    fn test_combat_of_classifies_steps() {
        let mut b = BoardState::new(8);
        b.seat(PlayerId(0), vec![Piece::new(3, 6, Direction::Left), Piece::new(4, 7, Direction::Left)]);
        b.seat(PlayerId(1), vec![Piece::new(3, 7, Direction::Up)]);
        let up = Move::step(0, Direction::Up);
        let right = Move::step(0, Direction::Right);
        let left = Move::step(0, Direction::Left);
        assert_eq!(combat_of(&b, PlayerId(1), &up), Some(Combat::Flank));
        assert_eq!(combat_of(&b, PlayerId(1), &right), Some(Combat::Repelled));
        assert_eq!(combat_of(&b, PlayerId(1), &left), None);
    }
}
