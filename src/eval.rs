//! Heuristic position evaluation.
//!
//! Scores are from one player's point of view. Terminal positions score
//! `±WIN_SCORE`, far outside anything a live position can reach. Live
//! positions sum a material term (weighted well above everything else) and
//! per-piece terms:
//!
//! - presence, advance toward the far edge, facing the advance direction
//! - mobility (legal atomic moves)
//! - threat: nose on an adjacent opponent that is not aimed back
//! - coordination: diagonal "L" pairs with one vertical and one horizontal
//!   facing, worth more when an opponent is close
//!
//! With two or fewer pieces left a side plays for safety (distance from the
//! nearest opponent) instead of advancing. When the opponents are that low
//! instead, pieces exposed to a flank are penalised so a won position is not
//! traded away.

use crate::constants::{
    ADVANCE_WEIGHT, COORDINATION_BONUS, COORDINATION_ENGAGED, ENGAGE_RADIUS, EXPOSED_PENALTY,
    FACING_BONUS, LOW_PIECE_COUNT, MATERIAL_WEIGHT, MOBILITY_WEIGHT, PIECES_PER_PLAYER,
    PRESENCE_BONUS, SAFETY_WEIGHT, THREAT_BONUS, WIN_SCORE,
};
use crate::movegen::mobility;
use crate::state::{BoardState, Direction, Piece, PlayerId};
use crate::turn::{GameResult, result_of};

/// Terminal-aware heuristic. `starting_pieces` is the per-player count
/// material is measured against.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Heuristic {
    pub starting_pieces: usize,
}

impl Default for Heuristic {
    fn default() -> Self {
        Self {
            starting_pieces: PIECES_PER_PLAYER,
        }
    }
}

impl Heuristic {
    pub fn evaluate(&self, state: &BoardState, player: PlayerId) -> f64 {
        match result_of(state) {
            GameResult::Winner(p) if p == player => return WIN_SCORE,
            GameResult::Winner(_) => return -WIN_SCORE,
            GameResult::Draw => return 0.0,
            GameResult::InProgress => {}
        }
        let own = state.pieces(player);
        if own.is_empty() {
            return -WIN_SCORE;
        }
        let opp: Vec<Piece> = state.opponents(player).copied().collect();

        let own_lost = self.starting_pieces.saturating_sub(own.len()) as f64;
        let opp_lost: f64 = state
            .players()
            .filter(|p| *p != player)
            .map(|p| self.starting_pieces.saturating_sub(state.piece_count(p)) as f64)
            .sum();
        let mut score = MATERIAL_WEIGHT * (opp_lost - own_lost);

        let cautious = own.len() <= LOW_PIECE_COUNT;
        let closing = opp.len() <= LOW_PIECE_COUNT && own.len() > opp.len();
        let advance = player.advance();

        for (i, piece) in own.iter().enumerate() {
            score += PRESENCE_BONUS;
            score += MOBILITY_WEIGHT * mobility(state, player, i) as f64;
            if piece.facing == advance {
                score += FACING_BONUS;
            }

            let threat = if threatens(piece, &opp) { THREAT_BONUS } else { 0.0 };
            if cautious {
                let nearest = opp.iter().map(|o| piece.distance(o)).min().unwrap_or(state.size);
                score += SAFETY_WEIGHT * nearest.min(state.size) as f64;
                score += threat * 0.5;
            } else {
                score += ADVANCE_WEIGHT * progress(piece, advance, state.size) as f64;
                score += threat;
            }

            if closing && exposed(piece, &opp) {
                score -= EXPOSED_PENALTY;
            }
        }

        for (i, a) in own.iter().enumerate() {
            for b in &own[i + 1..] {
                if !is_l_pair(a, b) {
                    continue;
                }
                let engaged = opp
                    .iter()
                    .any(|o| o.distance(a) <= ENGAGE_RADIUS || o.distance(b) <= ENGAGE_RADIUS);
                score += if engaged {
                    COORDINATION_BONUS * COORDINATION_ENGAGED
                } else {
                    COORDINATION_BONUS
                };
            }
        }

        score
    }
}

/// Rows (or columns) advanced from the home edge in direction `advance`.
fn progress(piece: &Piece, advance: Direction, size: i32) -> i32 {
    match advance {
        Direction::Down => piece.y,
        Direction::Up => size - 1 - piece.y,
        Direction::Right => piece.x,
        Direction::Left => size - 1 - piece.x,
    }
}

/// Nose on an adjacent opponent whose nose is not aimed back: a pending flank.
fn threatens(piece: &Piece, opp: &[Piece]) -> bool {
    let target = piece.ahead();
    opp.iter()
        .any(|o| (o.x, o.y) == target && o.facing != piece.facing.opposite())
}

/// An adjacent opponent has its nose on this piece's body.
fn exposed(piece: &Piece, opp: &[Piece]) -> bool {
    opp.iter()
        .any(|o| o.ahead() == (piece.x, piece.y) && piece.facing != o.facing.opposite())
}

/// Diagonal neighbours with complementary (one vertical, one horizontal) facings.
fn is_l_pair(a: &Piece, b: &Piece) -> bool {
    (a.x - b.x).abs() == 1
        && (a.y - b.y).abs() == 1
        && a.facing.is_vertical() != b.facing.is_vertical()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(p0: Vec<Piece>, p1: Vec<Piece>) -> BoardState {
        let mut b = BoardState::new(8);
        b.seat(PlayerId(0), p0);
        b.seat(PlayerId(1), p1);
        b
    }

    #[test]
    fn test_terminal_scores() {
        let b = board(vec![Piece::new(0, 0, Direction::Down)], Vec::new());
        assert_eq!(Heuristic::default().evaluate(&b, PlayerId(0)), WIN_SCORE);
        assert_eq!(Heuristic::default().evaluate(&b, PlayerId(1)), -WIN_SCORE);
        let empty = board(Vec::new(), Vec::new());
        assert_eq!(Heuristic::default().evaluate(&empty, PlayerId(0)), 0.0);
    }

    #[test]
    fn test_start_is_symmetric() {
        let h = Heuristic::default();
        let b = BoardState::standard();
        let a = h.evaluate(&b, PlayerId(0));
        let c = h.evaluate(&b, PlayerId(1));
        assert!((a - c).abs() < 1e-9);
        assert!(a.abs() < WIN_SCORE / 10.0);
    }

    #[test]
    fn test_advance_and_facing_rewarded() {
        let h = Heuristic::default();
        let far = vec![Piece::new(7, 0, Direction::Down); 1];
        let mut home = BoardState::standard();
        let mut forward = BoardState::standard();
        home.seat(PlayerId(0), far.clone());
        forward.seat(PlayerId(0), far);
        home.seat(PlayerId(1), vec![Piece::new(3, 7, Direction::Up), Piece::new(4, 7, Direction::Up), Piece::new(5, 7, Direction::Up)]);
        forward.seat(PlayerId(1), vec![Piece::new(3, 4, Direction::Up), Piece::new(4, 7, Direction::Up), Piece::new(5, 7, Direction::Up)]);
        assert!(h.evaluate(&forward, PlayerId(1)) > h.evaluate(&home, PlayerId(1)));

        let mut turned = forward.clone();
        turned.seat(PlayerId(1), vec![Piece::new(3, 4, Direction::Left), Piece::new(4, 7, Direction::Up), Piece::new(5, 7, Direction::Up)]);
        assert!(h.evaluate(&forward, PlayerId(1)) > h.evaluate(&turned, PlayerId(1)));
    }

    #[test]
    fn test_threat_only_against_body() {
        let opp_body = [Piece::new(3, 5, Direction::Left)];
        let opp_nose = [Piece::new(3, 5, Direction::Down)];
        let me = Piece::new(3, 6, Direction::Up);
        assert!(threatens(&me, &opp_body));
        assert!(!threatens(&me, &opp_nose));
        assert!(!threatens(&Piece::new(3, 6, Direction::Left), &opp_body));
    }

    #[test]
    fn test_exposed_detection() {
        let me = Piece::new(3, 6, Direction::Left);
        assert!(exposed(&me, &[Piece::new(3, 5, Direction::Down)]));
        assert!(!exposed(&Piece::new(3, 6, Direction::Up), &[Piece::new(3, 5, Direction::Down)]));
        assert!(!exposed(&me, &[Piece::new(3, 5, Direction::Left)]));
    }

    #[test]
    fn test_l_pair() {
        let a = Piece::new(2, 2, Direction::Up);
        assert!(is_l_pair(&a, &Piece::new(3, 3, Direction::Left)));
        assert!(!is_l_pair(&a, &Piece::new(3, 3, Direction::Down)));
        assert!(!is_l_pair(&a, &Piece::new(3, 2, Direction::Left)));
    }

    #[test]
    fn test_l_pair_bonus_grows_when_engaged() {
        let h = Heuristic::default();
        // Turning the second piece from Up to Right forms the pair and costs
        // the facing bonus; nothing else in the score depends on it.
        let gain = |opp: Piece| {
            let pair = board(vec![opp], vec![Piece::new(3, 5, Direction::Up), Piece::new(4, 4, Direction::Right)]);
            let flat = board(vec![opp], vec![Piece::new(3, 5, Direction::Up), Piece::new(4, 4, Direction::Up)]);
            h.evaluate(&pair, PlayerId(1)) - h.evaluate(&flat, PlayerId(1))
        };
        let near = gain(Piece::new(6, 4, Direction::Down));
        let far = gain(Piece::new(0, 0, Direction::Down));
        assert!((far - (COORDINATION_BONUS - FACING_BONUS)).abs() < 1e-9);
        assert!((near - (COORDINATION_BONUS * COORDINATION_ENGAGED - FACING_BONUS)).abs() < 1e-9);
        assert!(near > far);
    }

    #[test]
    fn test_material_dominates_position() {
        let h = Heuristic::default();
        // Four pieces huddled at home against four opponents.
        let quiet = BoardState::standard();
        // Three well-placed pieces, one threatening a flank, one pair coordinated.
        let mut active = BoardState::standard();
        active.seat(
            PlayerId(1),
            vec![
                Piece::new(3, 1, Direction::Up),
                Piece::new(4, 2, Direction::Left),
                Piece::new(6, 3, Direction::Up),
            ],
        );
        active.seat(
            PlayerId(0),
            vec![
                Piece::new(2, 0, Direction::Down),
                Piece::new(3, 0, Direction::Right),
                Piece::new(4, 0, Direction::Down),
                Piece::new(5, 0, Direction::Down),
            ],
        );
        assert!(threatens(&active.pieces(PlayerId(1))[0], active.pieces(PlayerId(0))));
        assert!(h.evaluate(&quiet, PlayerId(1)) > h.evaluate(&active, PlayerId(1)));
    }

    #[test]
    fn test_cautious_prefers_distance() {
        let h = Heuristic::default();
        let opp = vec![
            Piece::new(3, 3, Direction::Down),
            Piece::new(4, 3, Direction::Down),
            Piece::new(5, 3, Direction::Down),
        ];
        let near = board(opp.clone(), vec![Piece::new(3, 5, Direction::Left)]);
        let far = board(opp, vec![Piece::new(0, 7, Direction::Left)]);
        assert!(h.evaluate(&far, PlayerId(1)) > h.evaluate(&near, PlayerId(1)));
    }

    #[test]
    fn test_closing_penalises_exposure() {
        let h = Heuristic::default();
        let opp = vec![Piece::new(3, 2, Direction::Down)];
        let mine = |lead: Piece| {
            vec![
                lead,
                Piece::new(0, 7, Direction::Up),
                Piece::new(7, 7, Direction::Up),
            ]
        };
        // Same square and mobility; only the facing under the enemy nose differs.
        let safe = board(opp.clone(), mine(Piece::new(3, 3, Direction::Up)));
        let open = board(opp, mine(Piece::new(3, 3, Direction::Left)));
        let gap = h.evaluate(&safe, PlayerId(1)) - h.evaluate(&open, PlayerId(1));
        assert!(gap >= EXPOSED_PENALTY);
    }
}
