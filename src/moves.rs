//! Atomic moves and turn sequences.
//!
//! Text notation:
//! - `P<index><L|R>` pivots piece `index` a quarter turn left or right.
//! - `S<index><U|D|L|R>` steps piece `index` one square in that direction.
//! - A turn sequence joins its moves with `/`; the empty sequence is `pass`.

use std::fmt;
use std::str::FromStr;

use crate::state::{Direction, ParseError, Rotation};

/// One atomic move, addressing a piece by its index in the mover's list.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Move {
    Pivot { index: usize, rotation: Rotation },
    /// Relative step. Only orthogonal unit steps are legal; anything else is
    /// representable so that it can be rejected.
    Step { index: usize, dx: i32, dy: i32 },
}

impl Move {
    pub const fn pivot(index: usize, rotation: Rotation) -> Self {
        Move::Pivot { index, rotation }
    }

    pub const fn step(index: usize, dir: Direction) -> Self {
        let (dx, dy) = dir.delta();
        Move::Step { index, dx, dy }
    }

    pub const fn index(&self) -> usize {
        match self {
            Move::Pivot { index, .. } | Move::Step { index, .. } => *index,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Move::Pivot { index, rotation } => write!(f, "P{index}{rotation}"),
            Move::Step { index, dx, dy } => match Direction::from_delta(dx, dy) {
                Some(dir) => write!(f, "S{index}{dir}"),
                None => write!(f, "S{index}({dx},{dy})"),
            },
        }
    }
}

impl FromStr for Move {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseError::Move(s.to_string());
        let s = s.trim();
        if s.len() < 3 || !s.is_ascii() {
            return Err(err());
        }
        let (kind, rest) = s.split_at(1);
        let (digits, tail) = rest.split_at(rest.len() - 1);
        let index = digits.parse::<usize>().map_err(|_| err())?;
        match kind {
            "P" | "p" => {
                let rotation = tail.parse::<Rotation>().map_err(|_| err())?;
                Ok(Move::pivot(index, rotation))
            }
            "S" | "s" => {
                let dir = tail.parse::<Direction>().map_err(|_| err())?;
                Ok(Move::step(index, dir))
            }
            _ => Err(err()),
        }
    }
}

/// An ordered batch of atomic moves committed as one turn.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct TurnSequence(pub Vec<Move>);

impl TurnSequence {
    /// The empty sequence, i.e. a pass.
    pub const fn pass() -> Self {
        TurnSequence(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn moves(&self) -> &[Move] {
        &self.0
    }

    /// This sequence extended by one more move.
    pub fn extended(&self, mv: Move) -> Self {
        let mut v = Vec::with_capacity(self.0.len() + 1);
        v.extend_from_slice(&self.0);
        v.push(mv);
        TurnSequence(v)
    }
}

impl From<Vec<Move>> for TurnSequence {
    fn from(v: Vec<Move>) -> Self {
        TurnSequence(v)
    }
}

impl fmt::Display for TurnSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "pass");
        }
        let parts: Vec<String> = self.0.iter().map(Move::to_string).collect();
        write!(f, "{}", parts.join("/"))
    }
}

impl FromStr for TurnSequence {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("pass") {
            return Ok(TurnSequence::pass());
        }
        s.split('/')
            .map(str::parse)
            .collect::<Result<Vec<_>, _>>()
            .map(TurnSequence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_notation() {
        assert_eq!("P0L".parse::<Move>(), Ok(Move::pivot(0, Rotation::Left)));
        assert_eq!("s12d".parse::<Move>(), Ok(Move::step(12, Direction::Down)));
        assert_eq!(Move::step(3, Direction::Up).to_string(), "S3U");
        assert_eq!(
            Move::Step { index: 1, dx: 1, dy: 1 }.to_string(),
            "S1(1,1)"
        );
        assert!("X0L".parse::<Move>().is_err());
        assert!("P0".parse::<Move>().is_err());
        assert!("PaL".parse::<Move>().is_err());
        assert!("P0U".parse::<Move>().is_err());
    }

    #[test]
    fn test_sequence_notation() {
        let seq: TurnSequence = "S1U/S2U/P0R".parse().unwrap();
        assert_eq!(
            seq.moves(),
            &[
                Move::step(1, Direction::Up),
                Move::step(2, Direction::Up),
                Move::pivot(0, Rotation::Right),
            ]
        );
        assert_eq!(seq.to_string(), "S1U/S2U/P0R");
        assert_eq!("pass".parse::<TurnSequence>(), Ok(TurnSequence::pass()));
        assert_eq!(TurnSequence::pass().to_string(), "pass");
        assert!("S1U/junk".parse::<TurnSequence>().is_err());
    }

    #[test]
    fn test_extended_keeps_prefix() {
        let base = TurnSequence::from(vec![Move::pivot(0, Rotation::Left)]);
        let longer = base.extended(Move::step(1, Direction::Left));
        assert_eq!(base.len(), 1);
        assert_eq!(longer.len(), 2);
        assert_eq!(longer.moves()[0], base.moves()[0]);
    }
}
