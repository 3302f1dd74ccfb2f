//! Opening book.
//!
//! A static table keyed by `"<board size>-<player>"`. Each key holds the
//! book lines for that seat in move order: entry `k` is played on the
//! player's `k`-th turn, but only if the player's live pieces equal the
//! entry's turn-start snapshot exactly (positions, facings and order).
//! Anything else falls through to the search.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::moves::{Move, TurnSequence};
use crate::state::{BoardState, Direction, Piece, PlayerId, Rotation};

/// One book line: the expected pieces at turn start and the reply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BookEntry {
    pub turn_start: Vec<Piece>,
    pub sequence: TurnSequence,
}

static BOOK: OnceLock<HashMap<String, Vec<BookEntry>>> = OnceLock::new();

/// Table key for a board size and seat.
pub fn book_key(size: i32, player: PlayerId) -> String {
    format!("{size}-{player}")
}

/// All book lines for a seat, in move order.
pub fn entries(size: i32, player: PlayerId) -> &'static [BookEntry] {
    BOOK.get_or_init(make_book)
        .get(&book_key(size, player))
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// The book reply for `player`'s `move_index`-th turn, if the live pieces
/// match the line's snapshot.
pub fn lookup(state: &BoardState, player: PlayerId, move_index: usize) -> Option<&'static TurnSequence> {
    entries(state.size, player)
        .get(move_index)
        .filter(|e| e.turn_start == state.pieces(player))
        .map(|e| &e.sequence)
}

fn row(y: i32, facing: Direction) -> Vec<Piece> {
    (2..6).map(|x| Piece::new(x, y, facing)).collect()
}

/// Push the two centre pieces out one square, then turn the wings inward so
/// each wing forms an "L" with the centre piece diagonal to it.
fn make_book() -> HashMap<String, Vec<BookEntry>> {
    let mut book = HashMap::new();

    let mut top_second = row(0, Direction::Down);
    top_second[1].y = 1;
    top_second[2].y = 1;
    book.insert(
        book_key(8, PlayerId(0)),
        vec![
            BookEntry {
                turn_start: row(0, Direction::Down),
                sequence: vec![Move::step(1, Direction::Down), Move::step(2, Direction::Down)].into(),
            },
            BookEntry {
                turn_start: top_second,
                sequence: vec![Move::pivot(0, Rotation::Left), Move::pivot(3, Rotation::Right)].into(),
            },
        ],
    );

    let mut bottom_second = row(7, Direction::Up);
    bottom_second[1].y = 6;
    bottom_second[2].y = 6;
    book.insert(
        book_key(8, PlayerId(1)),
        vec![
            BookEntry {
                turn_start: row(7, Direction::Up),
                sequence: vec![Move::step(1, Direction::Up), Move::step(2, Direction::Up)].into(),
            },
            BookEntry {
                turn_start: bottom_second,
                sequence: vec![Move::pivot(0, Rotation::Right), Move::pivot(3, Rotation::Left)].into(),
            },
        ],
    );

    book
}
