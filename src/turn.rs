//! Turn control: move budgets, turn order and the end of the game.
//!
//! [`Game`] owns the canonical board. Moves reach it either one at a time
//! ([`Game::pivot`], [`Game::step`]) or as a whole committed turn
//! ([`Game::commit_turn`]), which resets the mover's pieces to the supplied
//! turn-start snapshot and replays the sequence through the rules instead
//! of trusting a client-computed final position.

use std::collections::BTreeMap;
use std::fmt;

use tracing::{debug, info, warn};

use crate::constants::MOVE_BUDGET;
use crate::moves::{Move, TurnSequence};
use crate::rules::{Outcome, Rejection, apply_move};
use crate::state::{BoardState, Piece, PlayerId, Rotation, SetupError};

/// Outcome of the game so far.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GameResult {
    Winner(PlayerId),
    Draw,
    InProgress,
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameResult::Winner(p) => write!(f, "winner {p}"),
            GameResult::Draw => write!(f, "draw"),
            GameResult::InProgress => write!(f, "in_progress"),
        }
    }
}

/// Judge a board: one survivor wins, no survivors is a draw.
pub fn result_of(state: &BoardState) -> GameResult {
    let alive = state.alive_players();
    match alive.as_slice() {
        [] => GameResult::Draw,
        [p] => GameResult::Winner(*p),
        _ => GameResult::InProgress,
    }
}

/// The next player after `current` in `order` who still has a piece.
///
/// `current` itself is considered last, so a lone survivor gets `Some(current)`.
pub fn next_alive(state: &BoardState, order: &[PlayerId], current: PlayerId) -> Option<PlayerId> {
    let start = order.iter().position(|p| *p == current).map_or(0, |i| i + 1);
    (0..order.len())
        .map(|k| order[(start + k) % order.len()])
        .find(|p| state.piece_count(*p) > 0)
}

/// Whose turn it is and how much of it has been spent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnState {
    pub mover: PlayerId,
    pub moves_used: usize,
    pub move_budget: usize,
    pub order: Vec<PlayerId>,
    turns_taken: BTreeMap<PlayerId, usize>,
}

impl TurnState {
    pub fn new(order: Vec<PlayerId>) -> Self {
        let mover = order.first().copied().unwrap_or(PlayerId(0));
        Self {
            mover,
            moves_used: 0,
            move_budget: MOVE_BUDGET,
            order,
            turns_taken: BTreeMap::new(),
        }
    }

    /// Turns `player` has completed so far.
    pub fn turns_taken(&self, player: PlayerId) -> usize {
        self.turns_taken.get(&player).copied().unwrap_or(0)
    }

    pub fn moves_left(&self) -> usize {
        self.move_budget - self.moves_used
    }
}

/// Where the turn state machine stands after an operation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    AwaitingMove { mover: PlayerId, moves_used: usize },
    /// The previous mover's turn ended; `next` is now to move.
    TurnComplete { next: PlayerId },
    GameOver(GameResult),
}

/// An accepted live move.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MoveReport {
    pub outcome: Outcome,
    pub phase: Phase,
}

/// What a committed turn actually did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitReport {
    pub applied: Vec<(Move, Outcome)>,
    /// Positions in the submitted sequence that were skipped, with the reason.
    pub skipped: Vec<(usize, Rejection)>,
    pub phase: Phase,
}

/// Replay `seq` for `player` on a copy of `state`.
///
/// Invalid moves are skipped, moves past the budget are ignored, and replay
/// stops once the game is decided.
pub fn apply_sequence(state: &BoardState, player: PlayerId, seq: &TurnSequence) -> BoardState {
    let mut next = state.clone();
    let mut used = 0;
    for mv in seq.moves() {
        if used >= MOVE_BUDGET || result_of(&next) != GameResult::InProgress {
            break;
        }
        if apply_move(&mut next, player, mv).is_ok() {
            used += 1;
        }
    }
    next
}

/// A game in progress: the canonical board plus the turn state.
#[derive(Clone, Debug)]
pub struct Game {
    board: BoardState,
    /// The board as it stood when the current turn began.
    turn_start: BoardState,
    turn: TurnState,
    result: GameResult,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// The standard two-player game.
    pub fn new() -> Self {
        Self::from_state(BoardState::standard(), Vec::new())
    }

    /// A fresh game in the default layout for `players` seats.
    pub fn with_players(players: usize) -> Result<Self, SetupError> {
        let board = BoardState::default_setup(crate::constants::N, players)?;
        Ok(Self::from_state(board, Vec::new()))
    }

    /// A game starting from an arbitrary board.
    ///
    /// An empty `order` means seat order. The first player in `order` with a
    /// piece moves first.
    pub fn from_state(board: BoardState, order: Vec<PlayerId>) -> Self {
        let mut order: Vec<PlayerId> = order.into_iter().filter(|p| board.is_seated(*p)).collect();
        if order.is_empty() {
            order = board.players().collect();
        }
        let mut turn = TurnState::new(order);
        if board.piece_count(turn.mover) == 0 {
            if let Some(p) = next_alive(&board, &turn.order, turn.mover) {
                turn.mover = p;
            }
        }
        let result = result_of(&board);
        Self {
            turn_start: board.clone(),
            board,
            turn,
            result,
        }
    }

    pub fn board(&self) -> &BoardState {
        &self.board
    }

    pub fn turn(&self) -> &TurnState {
        &self.turn
    }

    pub fn mover(&self) -> PlayerId {
        self.turn.mover
    }

    pub fn result(&self) -> GameResult {
        self.result
    }

    pub fn is_over(&self) -> bool {
        self.result != GameResult::InProgress
    }

    pub fn phase(&self) -> Phase {
        match self.result {
            GameResult::InProgress => Phase::AwaitingMove {
                mover: self.turn.mover,
                moves_used: self.turn.moves_used,
            },
            r => Phase::GameOver(r),
        }
    }

    pub fn pivot(&mut self, player: PlayerId, index: usize, rotation: Rotation) -> Result<MoveReport, Rejection> {
        self.play(player, &Move::pivot(index, rotation))
    }

    pub fn step(&mut self, player: PlayerId, index: usize, tx: i32, ty: i32) -> Result<MoveReport, Rejection> {
        self.check_mover(player)?;
        let piece = *self
            .board
            .pieces(player)
            .get(index)
            .ok_or(Rejection::PieceOutOfRange(index))?;
        let (Some(dx), Some(dy)) = (tx.checked_sub(piece.x), ty.checked_sub(piece.y)) else {
            return Err(Rejection::NotAdjacent);
        };
        self.play(player, &Move::Step { index, dx, dy })
    }

    /// Apply one atomic move for the player to move.
    pub fn play(&mut self, player: PlayerId, mv: &Move) -> Result<MoveReport, Rejection> {
        self.check_mover(player)?;
        if self.turn.moves_used >= self.turn.move_budget {
            return Err(Rejection::BudgetExhausted);
        }
        let outcome = apply_move(&mut self.board, player, mv).inspect_err(|e| {
            debug!(%player, %mv, reason = %e, "move rejected");
        })?;
        self.turn.moves_used += 1;
        let phase = self.after_move();
        Ok(MoveReport { outcome, phase })
    }

    /// End the current turn early, with any number of moves used.
    pub fn end_turn(&mut self, player: PlayerId) -> Result<Phase, Rejection> {
        self.check_mover(player)?;
        Ok(self.advance())
    }

    /// Commit a whole turn: roll the board back to where the turn began,
    /// reset `player`'s pieces to `snapshot`, replay `seq` move by move,
    /// then end the turn.
    ///
    /// Live moves already made this turn are undone, captures included, so
    /// the commit spends the one budget the turn has. Moves that fail
    /// validation are skipped and the rest still replay. The snapshot must
    /// hold as many pieces as the player had at turn start and fit the board,
    /// or the commit is refused outright.
    pub fn commit_turn(
        &mut self,
        player: PlayerId,
        snapshot: &[Piece],
        seq: &TurnSequence,
    ) -> Result<CommitReport, Rejection> {
        self.check_mover(player)?;
        let expected = self.turn_start.piece_count(player);
        if snapshot.len() != expected || !self.turn_start.fits(player, snapshot) {
            debug!(%player, expected, got = snapshot.len(), "snapshot refused");
            return Err(Rejection::InvalidSnapshot);
        }
        if self.turn.moves_used > 0 {
            debug!(%player, moves_used = self.turn.moves_used, "live moves undone by commit");
        }
        if self.turn_start.pieces(player) != snapshot {
            warn!(%player, "turn-start snapshot differs from canonical pieces");
        }
        self.board = self.turn_start.clone();
        self.board.seat(player, snapshot.to_vec());
        self.result = result_of(&self.board);
        self.turn.moves_used = 0;

        let mut applied = Vec::new();
        let mut skipped = Vec::new();
        let mut phase = self.phase();
        for (i, mv) in seq.moves().iter().enumerate() {
            if !matches!(phase, Phase::AwaitingMove { .. }) {
                let reason = match phase {
                    Phase::GameOver(_) => Rejection::GameOver,
                    _ => Rejection::BudgetExhausted,
                };
                debug!(%player, index = i, %mv, %reason, "replay move skipped");
                skipped.push((i, reason));
                continue;
            }
            match apply_move(&mut self.board, player, mv) {
                Ok(outcome) => {
                    self.turn.moves_used += 1;
                    applied.push((*mv, outcome));
                    phase = self.after_move();
                }
                Err(reason) => {
                    debug!(%player, index = i, piece = mv.index(), %reason, "replay move skipped");
                    skipped.push((i, reason));
                }
            }
        }
        if let Phase::AwaitingMove { .. } = phase {
            phase = self.advance();
        }
        info!(%player, %seq, applied = applied.len(), skipped = skipped.len(), "turn committed");
        Ok(CommitReport {
            applied,
            skipped,
            phase,
        })
    }

    fn check_mover(&self, player: PlayerId) -> Result<(), Rejection> {
        if self.is_over() {
            return Err(Rejection::GameOver);
        }
        if !self.board.is_seated(player) {
            return Err(Rejection::UnknownPlayer(player));
        }
        if player != self.turn.mover {
            return Err(Rejection::NotYourTurn(player));
        }
        Ok(())
    }

    /// Terminal check plus forced turn transition after an applied move.
    fn after_move(&mut self) -> Phase {
        self.result = result_of(&self.board);
        if self.is_over() {
            info!(result = %self.result, "game over");
            return Phase::GameOver(self.result);
        }
        if self.turn.moves_used >= self.turn.move_budget
            || self.board.piece_count(self.turn.mover) == 0
        {
            return self.advance();
        }
        self.phase()
    }

    fn advance(&mut self) -> Phase {
        let prev = self.turn.mover;
        *self.turn.turns_taken.entry(prev).or_insert(0) += 1;
        self.turn.moves_used = 0;
        if let Some(next) = next_alive(&self.board, &self.turn.order, prev) {
            self.turn.mover = next;
        }
        self.turn_start = self.board.clone();
        info!(from = %prev, to = %self.turn.mover, "turn passes");
        Phase::TurnComplete {
            next: self.turn.mover,
        }
    }
}
