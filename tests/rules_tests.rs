//! Rule engine tests: pivots, steps and combat.
//!
//! Coordinates follow the board convention: `y` grows downward, so a piece
//! facing `Up` attacks with `dy = -1`.

use flank::moves::Move;
use flank::rules::{Combat, Outcome, Rejection, apply_move, pivot, resolve_combat, step};
use flank::state::{BoardState, Direction, Piece, PlayerId, Rotation};

// =============================================================================
// Helper functions
// =============================================================================

/// A board with player 0's pieces and player 1's pieces placed directly.
fn setpos(p0: &[Piece], p1: &[Piece]) -> BoardState {
    let mut b = BoardState::new(8);
    b.seat(PlayerId(0), p0.to_vec());
    b.seat(PlayerId(1), p1.to_vec());
    b
}

const ME: PlayerId = PlayerId(1);
const THEM: PlayerId = PlayerId(0);

// =============================================================================
// Pivot
// =============================================================================

#[test]
fn test_four_pivots_are_identity() {
    for rotation in [Rotation::Left, Rotation::Right] {
        for facing in Direction::ALL {
            let mut b = setpos(&[], &[Piece::new(4, 4, facing)]);
            let mut seen = Vec::new();
            for _ in 0..4 {
                match pivot(&mut b, ME, 0, rotation) {
                    Ok(Outcome::Pivoted { facing }) => seen.push(facing),
                    other => panic!("unexpected {other:?}"),
                }
            }
            assert_eq!(b.pieces(ME)[0].facing, facing);
            // All four facings visited on the way round.
            for d in Direction::ALL {
                assert!(seen.contains(&d));
            }
        }
    }
}

#[test]
fn test_pivot_adjacency_table() {
    let mut b = setpos(&[], &[Piece::new(4, 4, Direction::Up)]);
    let lefts: Vec<Direction> = (0..4)
        .map(|_| {
            pivot(&mut b, ME, 0, Rotation::Left).unwrap();
            b.pieces(ME)[0].facing
        })
        .collect();
    assert_eq!(
        lefts,
        vec![Direction::Left, Direction::Down, Direction::Right, Direction::Up]
    );
}

#[test]
fn test_pivot_keeps_position() {
    let mut b = BoardState::standard();
    pivot(&mut b, ME, 2, Rotation::Right).unwrap();
    assert_eq!(b.pieces(ME)[2], Piece::new(4, 7, Direction::Right));
}

// =============================================================================
// Step legality
// =============================================================================

#[test]
fn test_only_unit_orthogonal_steps() {
    for dx in -2..=2 {
        for dy in -2..=2 {
            let mut b = setpos(&[], &[Piece::new(4, 4, Direction::Up)]);
            let res = apply_move(&mut b, ME, &Move::Step { index: 0, dx, dy });
            if dx.abs() + dy.abs() == 1 {
                assert_eq!(res, Ok(Outcome::Moved), "({dx},{dy})");
                assert_eq!(b.pieces(ME)[0], Piece::new(4 + dx, 4 + dy, Direction::Up));
            } else {
                assert_eq!(res, Err(Rejection::NotAdjacent), "({dx},{dy})");
                assert_eq!(b.pieces(ME)[0], Piece::new(4, 4, Direction::Up));
            }
        }
    }
}

#[test]
fn test_step_off_board_rejected() {
    let mut b = setpos(&[], &[Piece::new(0, 0, Direction::Up)]);
    assert_eq!(step(&mut b, ME, 0, -1, 0), Err(Rejection::OutOfBounds));
    assert_eq!(step(&mut b, ME, 0, 0, -1), Err(Rejection::OutOfBounds));
    assert_eq!(b.pieces(ME)[0], Piece::new(0, 0, Direction::Up));
}

#[test]
fn test_step_onto_own_piece_rejected() {
    let mut b = setpos(
        &[],
        &[Piece::new(3, 7, Direction::Up), Piece::new(3, 6, Direction::Down)],
    );
    let before = b.clone();
    assert_eq!(step(&mut b, ME, 0, 3, 6), Err(Rejection::OwnPiece));
    assert_eq!(b, before);
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_scenario_a_step_to_empty() {
    let mut b = setpos(&[Piece::new(0, 0, Direction::Down)], &[Piece::new(3, 7, Direction::Up)]);
    assert_eq!(step(&mut b, ME, 0, 3, 6), Ok(Outcome::Moved));
    assert_eq!(b.pieces(ME)[0], Piece::new(3, 6, Direction::Up));
}

#[test]
fn test_scenario_b_nose_to_nose() {
    let mut b = setpos(&[Piece::new(3, 6, Direction::Down)], &[Piece::new(3, 7, Direction::Up)]);
    assert_eq!(step(&mut b, ME, 0, 3, 6), Ok(Outcome::Repelled { by: THEM }));
    assert!(b.pieces(ME).is_empty());
    assert_eq!(b.pieces(THEM), &[Piece::new(3, 6, Direction::Down)]);
    assert_eq!(b.occupant(3, 7), None);
}

#[test]
fn test_scenario_c_nose_to_body() {
    let mut b = setpos(&[Piece::new(3, 6, Direction::Left)], &[Piece::new(3, 7, Direction::Up)]);
    assert_eq!(step(&mut b, ME, 0, 3, 6), Ok(Outcome::Flanked { victim: THEM }));
    assert!(b.pieces(THEM).is_empty());
    assert_eq!(b.pieces(ME), &[Piece::new(3, 6, Direction::Up)]);
}

#[test]
fn test_body_to_nose_kills_attacker() {
    // Attacker faces right, steps up into a defender facing down at it.
    let mut b = setpos(&[Piece::new(3, 6, Direction::Down)], &[Piece::new(3, 7, Direction::Right)]);
    assert_eq!(step(&mut b, ME, 0, 3, 6), Ok(Outcome::Repelled { by: THEM }));
    assert!(b.pieces(ME).is_empty());
    assert_eq!(b.pieces(THEM).len(), 1);
}

#[test]
fn test_body_to_body_kills_attacker() {
    let mut b = setpos(&[Piece::new(3, 6, Direction::Right)], &[Piece::new(3, 7, Direction::Left)]);
    assert_eq!(step(&mut b, ME, 0, 3, 6), Ok(Outcome::Repelled { by: THEM }));
    assert!(b.pieces(ME).is_empty());
}

#[test]
fn test_flank_from_behind() {
    // Hitting the defender's back is a body hit too.
    let mut b = setpos(&[Piece::new(3, 6, Direction::Up)], &[Piece::new(3, 7, Direction::Up)]);
    assert_eq!(step(&mut b, ME, 0, 3, 6), Ok(Outcome::Flanked { victim: THEM }));
}

#[test]
fn test_combat_depends_only_on_facings_and_delta() {
    // Same facings and delta at different places and board contents agree.
    let cases = [
        (Piece::new(1, 1, Direction::Right), Piece::new(2, 1, Direction::Up)),
        (Piece::new(5, 2, Direction::Right), Piece::new(6, 2, Direction::Up)),
    ];
    for (attacker, defender) in cases {
        let mut b = setpos(&[defender, Piece::new(7, 7, Direction::Left)], &[attacker]);
        let out = step(&mut b, ME, 0, defender.x, defender.y).unwrap();
        assert_eq!(out, Outcome::Flanked { victim: THEM });
        assert_eq!(
            resolve_combat(attacker.facing, defender.facing, 1, 0),
            Combat::Flank
        );
    }
}

#[test]
fn test_removal_shifts_later_indices() {
    let mut b = setpos(
        &[Piece::new(3, 6, Direction::Down)],
        &[
            Piece::new(0, 0, Direction::Right),
            Piece::new(3, 7, Direction::Up),
            Piece::new(6, 6, Direction::Left),
        ],
    );
    step(&mut b, ME, 1, 3, 6).unwrap();
    assert_eq!(
        b.pieces(ME),
        &[Piece::new(0, 0, Direction::Right), Piece::new(6, 6, Direction::Left)]
    );
    // The old third piece now answers to index 1.
    pivot(&mut b, ME, 1, Rotation::Left).unwrap();
    assert_eq!(b.pieces(ME)[1].facing, Direction::Down);
}
