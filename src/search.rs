//! Turn selection: opening book first, then Monte Carlo Tree Search.
//!
//! The search only sees the game through two capabilities:
//! - [`Enumerator`]: candidate turn sequences for a player on a board
//! - [`Evaluator`]: a score for a board from a player's point of view
//!
//! Each tree node is the board after a whole turn. Children are expanded
//! with the evaluator's score as a prior, selected by UCT, and leaves are
//! judged by a short random rollout followed by the evaluator. The chosen
//! sequence goes back through [`crate::turn::Game::commit_turn`] like any
//! human turn.

use fastrand::Rng;
use tracing::debug;

use crate::book;
use crate::constants::{
    EXPAND_VISITS, FASTPLAY5_THRES, FASTPLAY20_THRES, N_SIMS, PRIOR_VISITS, REPORT_PERIOD,
    ROLLOUT_TURNS, SEARCH_DEPTH, UCT_C, VALUE_SCALE,
};
use crate::eval::Heuristic;
use crate::movegen::enumerate_sequences;
use crate::moves::TurnSequence;
use crate::playout::rollout;
use crate::state::{BoardState, Piece, PlayerId};
use crate::turn::{Game, GameResult, apply_sequence, next_alive, result_of};

/// Produces candidate turns.
pub trait Enumerator {
    fn sequences(&self, state: &BoardState, player: PlayerId) -> Vec<TurnSequence>;
}

/// Scores a board for a player. Higher is better for `player`.
pub trait Evaluator {
    fn evaluate(&self, state: &BoardState, player: PlayerId) -> f64;
}

/// Breadth-first enumeration up to a fixed depth.
#[derive(Copy, Clone, Debug)]
pub struct SequenceEnumerator {
    pub depth: usize,
}

impl Default for SequenceEnumerator {
    fn default() -> Self {
        Self {
            depth: SEARCH_DEPTH,
        }
    }
}

impl Enumerator for SequenceEnumerator {
    fn sequences(&self, state: &BoardState, player: PlayerId) -> Vec<TurnSequence> {
        enumerate_sequences(state, player, self.depth)
    }
}

impl Evaluator for Heuristic {
    fn evaluate(&self, state: &BoardState, player: PlayerId) -> f64 {
        Heuristic::evaluate(self, state, player)
    }
}

/// Caller-owned search knobs.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchConfig {
    /// Simulations per decision.
    pub sims: usize,
    /// Maximum moves per enumerated sequence.
    pub depth: usize,
    /// Random turns played past each leaf.
    pub rollout_turns: usize,
    /// Fixed seed for reproducible searches.
    pub seed: Option<u64>,
    pub use_book: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            sims: N_SIMS,
            depth: SEARCH_DEPTH,
            rollout_turns: ROLLOUT_TURNS,
            seed: None,
            use_book: true,
        }
    }
}

/// Squash a heuristic score into a win-probability-like value in (0, 1).
#[inline]
fn value(score: f64) -> f64 {
    1.0 / (1.0 + (-score / VALUE_SCALE).exp())
}

/// A node in the search tree: the board after `moved` played `seq`.
pub struct TreeNode {
    pub state: BoardState,
    /// Player whose turn produced this node.
    pub moved: PlayerId,
    /// Player to move from this node.
    pub to_move: PlayerId,
    pub seq: TurnSequence,
    /// Number of visits
    pub v: u32,
    /// Accumulated value for `moved`
    pub w: f64,
    /// Prior visits
    pub pv: f64,
    /// Prior value
    pub pw: f64,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// A root for `to_move` on `state`.
    pub fn new(state: &BoardState, to_move: PlayerId) -> Self {
        Self {
            state: state.clone(),
            moved: to_move,
            to_move,
            seq: TurnSequence::pass(),
            v: 0,
            w: 0.0,
            pv: 0.0,
            pw: 0.0,
            children: Vec::new(),
        }
    }

    /// Mean value for the player who moved into this node.
    #[inline]
    pub fn winrate(&self) -> f64 {
        if self.v > 0 {
            self.w / self.v as f64
        } else {
            -0.1 // Indicate unvisited
        }
    }

    /// Evaluator value the node was seeded with.
    #[inline]
    pub fn prior(&self) -> f64 {
        if self.pv > 0.0 { self.pw / self.pv } else { 0.0 }
    }

    pub fn is_terminal(&self) -> bool {
        result_of(&self.state) != GameResult::InProgress
    }
}

/// UCT with the evaluator prior folded in as virtual visits.
fn urgency(node: &TreeNode, parent_visits: u32) -> f64 {
    let v = node.v as f64 + node.pv;
    let expectation = if v > 0.0 { (node.w + node.pw) / v } else { 0.5 };
    let explore = UCT_C * ((parent_visits as f64 + 1.0).ln() / (node.v as f64 + 1.0)).sqrt();
    expectation + explore
}

/// Select the child with the highest urgency score.
fn most_urgent(children: &[TreeNode], parent_visits: u32) -> usize {
    children
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| {
            urgency(a, parent_visits)
                .partial_cmp(&urgency(b, parent_visits))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Most visited child, ties broken by winrate and then by prior.
fn best_child(tree: &TreeNode) -> Option<&TreeNode> {
    tree.children.iter().max_by(|a, b| {
        a.v.cmp(&b.v)
            .then(a.winrate().total_cmp(&b.winrate()))
            .then(a.prior().total_cmp(&b.prior()))
    })
}

/// MCTS over whole turns, generic over the enumerator and evaluator.
pub struct TreeSearch<E, V> {
    pub enumerator: E,
    pub evaluator: V,
    pub order: Vec<PlayerId>,
    pub rollout_turns: usize,
    rng: Rng,
}

impl TreeSearch<SequenceEnumerator, Heuristic> {
    /// The default engine configured from `config`.
    pub fn from_config(order: Vec<PlayerId>, config: &SearchConfig) -> Self {
        Self::new(
            SequenceEnumerator { depth: config.depth },
            Heuristic::default(),
            order,
            config,
        )
    }
}

impl<E: Enumerator, V: Evaluator> TreeSearch<E, V> {
    pub fn new(enumerator: E, evaluator: V, order: Vec<PlayerId>, config: &SearchConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => Rng::with_seed(seed),
            None => Rng::new(),
        };
        Self {
            enumerator,
            evaluator,
            order,
            rollout_turns: config.rollout_turns,
            rng,
        }
    }

    /// Generate children for every candidate sequence. Terminal nodes stay
    /// leaves; a player with nothing to play still gets the pass child.
    pub fn expand(&self, node: &mut TreeNode) {
        if !node.children.is_empty() || node.is_terminal() {
            return;
        }
        let player = node.to_move;
        for seq in self.enumerator.sequences(&node.state, player) {
            let state = apply_sequence(&node.state, player, &seq);
            let to_move = next_alive(&state, &self.order, player).unwrap_or(player);
            let prior = value(self.evaluator.evaluate(&state, player));
            node.children.push(TreeNode {
                state,
                moved: player,
                to_move,
                seq,
                v: 0,
                w: 0.0,
                pv: PRIOR_VISITS,
                pw: PRIOR_VISITS * prior,
                children: Vec::new(),
            });
        }
        if node.children.is_empty() {
            let state = node.state.clone();
            let to_move = next_alive(&state, &self.order, player).unwrap_or(player);
            node.children.push(TreeNode {
                state,
                moved: player,
                to_move,
                seq: TurnSequence::pass(),
                v: 0,
                w: 0.0,
                pv: 0.0,
                pw: 0.0,
                children: Vec::new(),
            });
        }
    }

    /// Descend to a leaf, expanding nodes that have been visited enough.
    fn descend(&self, tree: &mut TreeNode) -> Vec<usize> {
        let mut path = Vec::new();
        let mut node = tree;

        while !node.children.is_empty() {
            let child_idx = most_urgent(&node.children, node.v);
            path.push(child_idx);

            {
                let child = &mut node.children[child_idx];
                if child.children.is_empty() && child.v >= EXPAND_VISITS {
                    self.expand(child);
                }
            }

            node = &mut node.children[child_idx];
        }

        path
    }

    /// Propagate a leaf value (for `root_player`) back up the path.
    fn update(tree: &mut TreeNode, path: &[usize], root_player: PlayerId, val: f64) {
        tree.v += 1;
        let mut node = tree;
        for &idx in path {
            node = &mut node.children[idx];
            node.v += 1;
            node.w += if node.moved == root_player { val } else { 1.0 - val };
        }
    }

    /// Run `sims` simulations from `root` and return the chosen sequence.
    ///
    /// Stops early when one child is clearly winning.
    pub fn run(&mut self, root: &mut TreeNode, sims: usize) -> TurnSequence {
        if root.children.is_empty() {
            self.expand(root);
        }
        let root_player = root.to_move;

        for i in 0..sims {
            let path = self.descend(root);

            let leaf = path.iter().fold(&*root, |node, &idx| &node.children[idx]);
            let end = rollout(
                &leaf.state,
                &self.order,
                leaf.to_move,
                self.rollout_turns,
                &mut self.rng,
            );
            let val = value(self.evaluator.evaluate(&end, root_player));

            Self::update(root, &path, root_player, val);

            if i > 0 && i % REPORT_PERIOD == 0 {
                if let Some(best) = best_child(root) {
                    debug!(sims = i, best = %best.seq, visits = best.v, winrate = best.winrate(), "search progress");
                }
            }

            let best_wr = root
                .children
                .iter()
                .filter(|c| c.v > 0)
                .map(|c| c.winrate())
                .fold(0.0_f64, f64::max);

            if (i > sims / 20 && best_wr > FASTPLAY5_THRES)
                || (i > sims / 5 && best_wr > FASTPLAY20_THRES)
            {
                debug!(sims = i, winrate = best_wr, "search stopped early");
                break;
            }
        }

        best_child(root)
            .map(|c| c.seq.clone())
            .unwrap_or_default()
    }
}

/// Where a decision came from.
#[derive(Clone, Debug, PartialEq)]
pub enum Source {
    Book,
    Search { visits: u32, winrate: f64 },
}

/// A turn ready to submit through [`Game::commit_turn`].
#[derive(Clone, Debug, PartialEq)]
pub struct Decision {
    pub player: PlayerId,
    pub turn_start: Vec<Piece>,
    pub sequence: TurnSequence,
    pub source: Source,
}

/// Pick a turn for the player to move in `game`.
pub fn choose_turn(game: &Game, config: &SearchConfig) -> Decision {
    let board = game.board();
    let player = game.mover();
    let turn_start = board.pieces(player).to_vec();

    if config.use_book {
        let index = game.turn().turns_taken(player);
        if let Some(seq) = book::lookup(board, player, index) {
            debug!(%player, %seq, "book move");
            return Decision {
                player,
                turn_start,
                sequence: seq.clone(),
                source: Source::Book,
            };
        }
    }

    let mut search = TreeSearch::from_config(game.turn().order.clone(), config);
    let mut root = TreeNode::new(board, player);
    let sequence = search.run(&mut root, config.sims);
    dump_children(&root);
    let (visits, winrate) = best_child(&root).map_or((0, 0.0), |c| (c.v, c.winrate()));
    debug!(%player, %sequence, visits, winrate, candidates = root.children.len(), "search move");
    Decision {
        player,
        turn_start,
        sequence,
        source: Source::Search { visits, winrate },
    }
}

/// Log the root's children ordered by visits.
pub fn dump_children(root: &TreeNode) {
    let mut children: Vec<&TreeNode> = root.children.iter().collect();
    children.sort_by(|a, b| b.v.cmp(&a.v));
    for child in children.iter().take(10) {
        debug!(
            seq = %child.seq,
            v = child.v,
            wr = child.winrate(),
            "candidate"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Direction;

    fn quick() -> SearchConfig {
        SearchConfig {
            sims: 60,
            depth: 1,
            rollout_turns: 1,
            seed: Some(3),
            use_book: false,
        }
    }

    #[test]
    fn test_value_is_monotone() {
        assert!(value(-50.0) < value(0.0));
        assert!((value(0.0) - 0.5).abs() < 1e-12);
        assert!(value(2000.0) > 0.99);
    }

    #[test]
    fn test_expand_root() {
        let b = BoardState::standard();
        let s = TreeSearch::from_config(vec![PlayerId(0), PlayerId(1)], &quick());
        let mut root = TreeNode::new(&b, PlayerId(1));
        s.expand(&mut root);
        // Pass plus every atomic move.
        assert_eq!(root.children.len(), 15);
        assert!(root.children.iter().all(|c| c.moved == PlayerId(1)));
        assert!(root.children.iter().all(|c| c.to_move == PlayerId(0)));
    }

    #[test]
    fn test_terminal_node_not_expanded() {
        let mut b = BoardState::new(8);
        b.seat(PlayerId(0), Vec::new());
        b.seat(PlayerId(1), vec![Piece::new(0, 0, Direction::Up)]);
        let s = TreeSearch::from_config(vec![PlayerId(0), PlayerId(1)], &quick());
        let mut root = TreeNode::new(&b, PlayerId(1));
        s.expand(&mut root);
        assert!(root.children.is_empty());
        assert_eq!(s_run(&b), TurnSequence::pass());
    }

    fn s_run(b: &BoardState) -> TurnSequence {
        let mut s = TreeSearch::from_config(vec![PlayerId(0), PlayerId(1)], &quick());
        let mut root = TreeNode::new(b, PlayerId(1));
        s.run(&mut root, 10)
    }

    #[test]
    fn test_search_takes_winning_flank() {
        let mut b = BoardState::new(8);
        b.seat(PlayerId(0), vec![Piece::new(3, 6, Direction::Left)]);
        b.seat(PlayerId(1), vec![Piece::new(3, 7, Direction::Up), Piece::new(7, 0, Direction::Up)]);
        let game = Game::from_state(b, vec![PlayerId(1), PlayerId(0)]);
        let d = choose_turn(&game, &quick());
        assert_eq!(d.player, PlayerId(1));
        let after = apply_sequence(game.board(), PlayerId(1), &d.sequence);
        assert_eq!(result_of(&after), GameResult::Winner(PlayerId(1)));
    }

    #[test]
    fn test_book_short_circuits() {
        let game = Game::new();
        let config = SearchConfig {
            use_book: true,
            ..quick()
        };
        let d = choose_turn(&game, &config);
        assert_eq!(d.source, Source::Book);
        assert_eq!(d.sequence.to_string(), "S1D/S2D");
        assert_eq!(d.turn_start, game.board().pieces(PlayerId(0)));
    }

    #[test]
    fn test_seeded_search_is_deterministic() {
        let game = Game::new();
        let a = choose_turn(&game, &quick());
        let b = choose_turn(&game, &quick());
        assert_eq!(a.sequence, b.sequence);
    }

    struct PassOnly;

    impl Enumerator for PassOnly {
        fn sequences(&self, _: &BoardState, _: PlayerId) -> Vec<TurnSequence> {
            vec![TurnSequence::pass()]
        }
    }

    #[test]
    fn test_custom_enumerator() {
        let b = BoardState::standard();
        let order = vec![PlayerId(0), PlayerId(1)];
        let mut s = TreeSearch::new(PassOnly, Heuristic::default(), order, &quick());
        let mut root = TreeNode::new(&b, PlayerId(0));
        assert_eq!(s.run(&mut root, 20), TurnSequence::pass());
        assert_eq!(root.children.len(), 1);
    }
}
