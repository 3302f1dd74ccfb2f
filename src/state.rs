//! Board state representation.
//!
//! A board is a square grid with a small number of directional pieces per
//! player. Pieces are kept in an ordered list per player; moves address a
//! piece by its index in that list, and eliminated pieces are compacted out
//! so later indices shift down.
//!
//! Coordinates are `(x, y)` with `y` growing downward: row 0 is the top edge
//! and `Direction::Up` points toward it.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::constants::{MAX_PLAYERS, MIN_BOARD_SIZE, N, PIECES_PER_PLAYER};

/// Errors from parsing the text notation of pieces and moves.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("invalid direction `{0}`")]
    Direction(String),
    #[error("invalid rotation `{0}`")]
    Rotation(String),
    #[error("invalid piece `{0}`")]
    Piece(String),
    #[error("invalid move `{0}`")]
    Move(String),
    #[error("invalid player `{0}`")]
    Player(String),
}

/// Errors from building a default layout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupError {
    #[error("board size {0} is too small for the default layout")]
    BoardTooSmall(i32),
    #[error("default layout seats 2 to {MAX_PLAYERS} players, got {0}")]
    PlayerCount(usize),
}

/// The side a piece's nose points toward.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// A quarter turn in place.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Rotation {
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit vector of this direction.
    #[inline]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// Direction of an orthogonal unit vector, `None` for anything else.
    pub const fn from_delta(dx: i32, dy: i32) -> Option<Direction> {
        match (dx, dy) {
            (0, -1) => Some(Direction::Up),
            (0, 1) => Some(Direction::Down),
            (-1, 0) => Some(Direction::Left),
            (1, 0) => Some(Direction::Right),
            _ => None,
        }
    }

    /// Rotate by a quarter turn.
    ///
    /// Left turns cycle `Up -> Left -> Down -> Right -> Up`; right turns run
    /// the same cycle backwards.
    pub const fn rotate(self, rotation: Rotation) -> Direction {
        match (rotation, self) {
            (Rotation::Left, Direction::Up) => Direction::Left,
            (Rotation::Left, Direction::Left) => Direction::Down,
            (Rotation::Left, Direction::Down) => Direction::Right,
            (Rotation::Left, Direction::Right) => Direction::Up,
            (Rotation::Right, Direction::Up) => Direction::Right,
            (Rotation::Right, Direction::Right) => Direction::Down,
            (Rotation::Right, Direction::Down) => Direction::Left,
            (Rotation::Right, Direction::Left) => Direction::Up,
        }
    }

    pub const fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    #[inline]
    pub const fn is_vertical(self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }

    const fn letter(self) -> char {
        match self {
            Direction::Up => 'U',
            Direction::Down => 'D',
            Direction::Left => 'L',
            Direction::Right => 'R',
        }
    }

    const fn arrow(self) -> char {
        match self {
            Direction::Up => '^',
            Direction::Down => 'v',
            Direction::Left => '<',
            Direction::Right => '>',
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

impl FromStr for Direction {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "u" | "up" => Ok(Direction::Up),
            "d" | "down" => Ok(Direction::Down),
            "l" | "left" => Ok(Direction::Left),
            "r" | "right" => Ok(Direction::Right),
            _ => Err(ParseError::Direction(s.to_string())),
        }
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rotation::Left => write!(f, "L"),
            Rotation::Right => write!(f, "R"),
        }
    }
}

impl FromStr for Rotation {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "l" | "left" => Ok(Rotation::Left),
            "r" | "right" => Ok(Rotation::Right),
            _ => Err(ParseError::Rotation(s.to_string())),
        }
    }
}

/// A directional piece ("block") on the board.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Piece {
    pub x: i32,
    pub y: i32,
    pub facing: Direction,
}

impl Piece {
    pub const fn new(x: i32, y: i32, facing: Direction) -> Self {
        Self { x, y, facing }
    }

    /// Square the nose points at.
    #[inline]
    pub const fn ahead(&self) -> (i32, i32) {
        let (dx, dy) = self.facing.delta();
        (self.x + dx, self.y + dy)
    }

    /// Whether the nose points along `(dx, dy)`.
    #[inline]
    pub fn faces(&self, dx: i32, dy: i32) -> bool {
        self.facing.delta() == (dx, dy)
    }

    #[inline]
    pub const fn distance(&self, other: &Piece) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.x, self.y, self.facing)
    }
}

impl FromStr for Piece {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseError::Piece(s.to_string());
        let mut parts = s.split(',');
        let x = parts.next().ok_or_else(err)?.trim().parse().map_err(|_| err())?;
        let y = parts.next().ok_or_else(err)?.trim().parse().map_err(|_| err())?;
        let facing = parts.next().ok_or_else(err)?.trim().parse().map_err(|_| err())?;
        if parts.next().is_some() {
            return Err(err());
        }
        Ok(Piece::new(x, y, facing))
    }
}

/// Render a piece list as `x,y,D` entries joined by `/` (`-` when empty).
pub fn format_pieces(pieces: &[Piece]) -> String {
    if pieces.is_empty() {
        return "-".to_string();
    }
    pieces
        .iter()
        .map(Piece::to_string)
        .collect::<Vec<_>>()
        .join("/")
}

/// Parse the notation produced by [`format_pieces`].
pub fn parse_pieces(s: &str) -> Result<Vec<Piece>, ParseError> {
    let s = s.trim();
    if s == "-" {
        return Ok(Vec::new());
    }
    s.split('/').map(str::parse).collect()
}

/// A player seat. Player 0 starts on the top edge, player 1 on the bottom.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// Direction this player advances in to reach the opposing home edge.
    pub const fn advance(self) -> Direction {
        match self.0 % 4 {
            0 => Direction::Down,
            1 => Direction::Up,
            2 => Direction::Right,
            _ => Direction::Left,
        }
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PlayerId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u8>()
            .map(PlayerId)
            .map_err(|_| ParseError::Player(s.to_string()))
    }
}

/// The full board: its size and every player's ordered piece list.
///
/// Cloning copies only the piece lists, so simulations clone freely.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoardState {
    pub size: i32,
    pieces: BTreeMap<PlayerId, Vec<Piece>>,
}

impl Default for BoardState {
    fn default() -> Self {
        Self::standard()
    }
}

impl BoardState {
    /// An empty board with no players seated.
    pub fn new(size: i32) -> Self {
        Self {
            size,
            pieces: BTreeMap::new(),
        }
    }

    /// The default two-player game on an 8x8 board.
    pub fn standard() -> Self {
        let mut b = Self::new(N);
        let cols = N / 2 - 2..N / 2 + 2;
        b.seat(PlayerId(0), cols.clone().map(|x| Piece::new(x, 0, Direction::Down)).collect());
        b.seat(PlayerId(1), cols.map(|x| Piece::new(x, N - 1, Direction::Up)).collect());
        b
    }

    /// The default layout for `players` seats on a `size` board.
    ///
    /// Players 0 and 1 take the centre of the top and bottom rows facing
    /// each other; players 2 and 3 take the left and right columns.
    pub fn default_setup(size: i32, players: usize) -> Result<Self, SetupError> {
        if !(2..=MAX_PLAYERS).contains(&players) {
            return Err(SetupError::PlayerCount(players));
        }
        // Side seats must clear the top and bottom rows.
        let min = if players > 2 { MIN_BOARD_SIZE + 2 } else { MIN_BOARD_SIZE };
        if size < min {
            return Err(SetupError::BoardTooSmall(size));
        }

        let half = PIECES_PER_PLAYER as i32 / 2;
        let span = size / 2 - half..size / 2 + half;
        let mut b = Self::new(size);
        for p in 0..players {
            let id = PlayerId(p as u8);
            let pieces = span
                .clone()
                .map(|i| match p {
                    0 => Piece::new(i, 0, Direction::Down),
                    1 => Piece::new(i, size - 1, Direction::Up),
                    2 => Piece::new(0, i, Direction::Right),
                    _ => Piece::new(size - 1, i, Direction::Left),
                })
                .collect();
            b.seat(id, pieces);
        }
        Ok(b)
    }

    /// Seat a player with the given pieces, replacing any previous list.
    pub fn seat(&mut self, player: PlayerId, pieces: Vec<Piece>) {
        self.pieces.insert(player, pieces);
    }

    /// All seated players in id order, including eliminated ones.
    pub fn players(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.pieces.keys().copied()
    }

    pub fn is_seated(&self, player: PlayerId) -> bool {
        self.pieces.contains_key(&player)
    }

    /// A player's pieces in index order. Empty for unknown players.
    pub fn pieces(&self, player: PlayerId) -> &[Piece] {
        self.pieces.get(&player).map(Vec::as_slice).unwrap_or(&[])
    }

    pub(crate) fn pieces_mut(&mut self, player: PlayerId) -> Option<&mut Vec<Piece>> {
        self.pieces.get_mut(&player)
    }

    pub fn piece_count(&self, player: PlayerId) -> usize {
        self.pieces(player).len()
    }

    pub fn total_pieces(&self) -> usize {
        self.pieces.values().map(Vec::len).sum()
    }

    /// Players with at least one piece left.
    pub fn alive_players(&self) -> Vec<PlayerId> {
        self.pieces
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(p, _)| *p)
            .collect()
    }

    /// Every piece not owned by `player`.
    pub fn opponents(&self, player: PlayerId) -> impl Iterator<Item = &Piece> + '_ {
        self.pieces
            .iter()
            .filter(move |(p, _)| **p != player)
            .flat_map(|(_, v)| v.iter())
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.size && y < self.size
    }

    /// Owner and index of the piece on `(x, y)`, if any.
    pub fn occupant(&self, x: i32, y: i32) -> Option<(PlayerId, usize)> {
        self.pieces.iter().find_map(|(p, v)| {
            v.iter()
                .position(|b| b.x == x && b.y == y)
                .map(|i| (*p, i))
        })
    }

    /// Whether `pieces` could stand in for `player`'s list: in bounds, no
    /// two on one square, and clear of every other player's pieces.
    pub fn fits(&self, player: PlayerId, pieces: &[Piece]) -> bool {
        pieces.iter().enumerate().all(|(i, a)| {
            self.in_bounds(a.x, a.y)
                && pieces[..i].iter().all(|b| (b.x, b.y) != (a.x, a.y))
                && self.opponents(player).all(|b| (b.x, b.y) != (a.x, a.y))
        })
    }
}

impl fmt::Display for BoardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.size {
            for x in 0..self.size {
                match self.occupant(x, y) {
                    Some((p, i)) => {
                        let arrow = self.pieces(p)[i].facing.arrow();
                        write!(f, "{arrow}{p} ")?;
                    }
                    None => write!(f, ".  ")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
