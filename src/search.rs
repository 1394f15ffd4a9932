use std::time::{Duration, Instant};

use log::{debug, info, trace, warn};

use crate::board::{Color, Position, NUM_CELLS};
use crate::evaluation::Evaluator;
use crate::history::HistoryTable;
use crate::killers::{KillerTable, MAX_PLY};
use crate::movegen::Move;
use crate::threat::ThreatScanner;
use crate::transposition::{NodeType, Probe, TranspositionEntry, TranspositionTable};

/// Score of a finished five, shaved by one per ply so faster wins rank higher.
pub const WIN_SCORE: i32 = 100_000_000;
/// Root children above this are treated as won outright.
pub const CERTAIN_WIN: i32 = 90_000_000;

const ALPHA_FLOOR: i32 = i32::MIN + 1;
const BETA_CEILING: i32 = i32::MAX - 1;

// Move ordering weights
const ORDER_WIN: i64 = 100_000_000;
const ORDER_GIVES_WIN: i64 = -10_000_000;
const KILLER_BONUS_FIRST: i64 = 1_000_000;
const KILLER_BONUS_SECOND: i64 = 500_000;

// Threat severity answered without searching (simple and open fours)
const CRITICAL_SEVERITY: i32 = 500_000;

const OPENING_BOOK: [Move; 4] = [
    Move::new(7, 7),
    Move::new(7, 4),
    Move::new(4, 7),
    Move::new(4, 4),
];

const DEFAULT_TT_CAPACITY: usize = 1_000_000;

/// Which path through `select_move` produced the answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveSource {
    OpeningBook,
    ImmediateWin,
    ForcedBlock,
    CriticalThreat,
    Search,
    NoMove,
}

pub struct Search {
    evaluator: Evaluator,
    threat_scanner: ThreatScanner,
    transposition_table: TranspositionTable,
    killers: KillerTable,
    history: HistoryTable,
    max_depth: i32,
    deadline: Instant,
    nodes_searched: u64,
    max_depth_reached: i32,
    completed_depth: i32,
    last_source: MoveSource,
}

impl Search {
    pub fn new() -> Self {
        Self {
            evaluator: Evaluator::new(),
            threat_scanner: ThreatScanner::new(),
            transposition_table: TranspositionTable::new(DEFAULT_TT_CAPACITY),
            killers: KillerTable::new(),
            history: HistoryTable::new(),
            max_depth: MAX_PLY as i32,
            deadline: Instant::now(),
            nodes_searched: 0,
            max_depth_reached: 0,
            completed_depth: 0,
            last_source: MoveSource::NoMove,
        }
    }

    /// Pick a move for `my_color` within `time_limit_ms`. Every stone the
    /// search puts down is taken back before this returns. Returns
    /// `Move::NONE` only when there is no empty cell.
    pub fn select_move(&mut self, position: &mut Position, my_color: Color, time_limit_ms: u64) -> Move {
        let started = Instant::now();
        self.start_clock(time_limit_ms);

        if position.side_to_move() != my_color {
            warn!(
                "select_move for {:?} but {:?} is on move",
                my_color,
                position.side_to_move()
            );
        }

        let (mv, source) = self.choose(position, my_color);
        self.last_source = source;
        info!(
            "{:?} plays {} via {:?} (depth {}, {} nodes, {} ms)",
            my_color,
            mv,
            source,
            self.completed_depth,
            self.nodes_searched,
            started.elapsed().as_millis()
        );
        mv
    }

    fn choose(&mut self, position: &mut Position, my_color: Color) -> (Move, MoveSource) {
        if let Some(mv) = self.opening_move(position, my_color) {
            return (mv, MoveSource::OpeningBook);
        }

        // Finish the game if we can
        if let Some(&mv) = position.winning_moves(my_color).first() {
            return (mv, MoveSource::ImmediateWin);
        }

        // Opponent wins next turn unless we block
        let opponent_wins = position.winning_moves(my_color.opposite());
        if !opponent_wins.is_empty() {
            return (self.best_block(position, my_color, &opponent_wins), MoveSource::ForcedBlock);
        }

        let threats = self.threat_scanner.find_blocking_moves(position, my_color);
        if let Some(top) = threats.first() {
            if top.severity >= CRITICAL_SEVERITY {
                return (top.mv, MoveSource::CriticalThreat);
            }
        }

        let mv = self.iterative_deepening(position, my_color);
        if mv.is_valid() {
            (mv, MoveSource::Search)
        } else {
            (mv, MoveSource::NoMove)
        }
    }

    /// Book reply for the first player on the untouched starting layout.
    pub fn opening_move(&self, position: &Position, my_color: Color) -> Option<Move> {
        if my_color != Color::Black
            || position.side_to_move() != my_color
            || !position.is_starting_layout()
        {
            return None;
        }
        OPENING_BOOK
            .iter()
            .copied()
            .find(|mv| !position.is_occupied(mv.x, mv.y))
    }

    fn best_block(&self, position: &mut Position, my_color: Color, blocks: &[Move]) -> Move {
        let mut best_block = blocks[0];
        let mut best_score = i32::MIN;
        for &block in blocks {
            let Some(child) = position.play(block) else {
                continue;
            };
            let score = self.evaluator.evaluate(&child, my_color);
            if score > best_score {
                best_score = score;
                best_block = block;
            }
        }
        best_block
    }

    fn iterative_deepening(&mut self, position: &mut Position, my_color: Color) -> Move {
        let mut root_moves = self.order_moves(position, my_color, my_color, 0);
        if root_moves.is_empty() {
            return Move::NONE;
        }

        let mut best_move = Move::NONE;
        let max_depth = self.max_depth.clamp(1, MAX_PLY as i32);

        for depth in 1..=max_depth {
            if self.time_up() {
                break;
            }
            self.max_depth_reached = depth;

            let mut depth_best = root_moves[0];
            let mut depth_best_score = i32::MIN;
            let mut completed = true;
            for &mv in root_moves.iter() {
                if self.time_up() {
                    completed = false;
                    break;
                }
                let score = self.search_root_move(position, mv, depth, my_color);
                if self.time_up() {
                    completed = false;
                    break;
                }
                trace!("depth {} root {} scores {}", depth, mv, score);
                if score > CERTAIN_WIN {
                    return mv;
                }
                if score > depth_best_score {
                    depth_best_score = score;
                    depth_best = mv;
                }
            }
            if !completed {
                debug!("depth {} interrupted, keeping depth {}", depth, self.completed_depth);
                break;
            }

            best_move = depth_best;
            self.completed_depth = depth;
            debug!(
                "depth {} best {} score {} nodes {}",
                depth, best_move, depth_best_score, self.nodes_searched
            );

            // Full-window rescore so the next depth starts from the best line
            let mut rescored = Vec::with_capacity(root_moves.len());
            for &mv in root_moves.iter() {
                rescored.push((self.search_root_move(position, mv, depth, my_color), mv));
            }
            rescored.sort_by(|a, b| b.0.cmp(&a.0));
            root_moves = rescored.into_iter().map(|(_, mv)| mv).collect();
        }

        if !best_move.is_valid() {
            // Nothing finished in time; fall back to the ordering heuristic
            best_move = root_moves[0];
        }
        best_move
    }

    fn search_root_move(&mut self, position: &mut Position, mv: Move, depth: i32, my_color: Color) -> i32 {
        match position.play(mv) {
            Some(mut child) => self.alpha_beta(
                &mut child,
                depth - 1,
                ALPHA_FLOOR,
                BETA_CEILING,
                my_color.opposite(),
                my_color,
                1,
            ),
            None => i32::MIN,
        }
    }

    /// Minimax with alpha-beta pruning; scores are from `my_color`'s side.
    /// Returns 0 once the deadline has passed.
    #[allow(clippy::too_many_arguments)]
    pub fn alpha_beta(
        &mut self,
        position: &mut Position,
        depth: i32,
        mut alpha: i32,
        mut beta: i32,
        to_move: Color,
        my_color: Color,
        ply: usize,
    ) -> i32 {
        if self.time_up() {
            return 0;
        }
        self.nodes_searched += 1;

        if position.check_win(my_color) {
            return WIN_SCORE - ply as i32;
        }
        if position.check_win(my_color.opposite()) {
            return -WIN_SCORE + ply as i32;
        }
        if depth <= 0 {
            return self.evaluator.evaluate(position, my_color);
        }

        let hash = position.hash();
        match self.transposition_table.probe(hash, depth, alpha, beta) {
            Probe::Cutoff(score) => return score,
            Probe::Window { alpha: a, beta: b } => {
                alpha = a;
                beta = b;
            }
        }

        let moves = self.order_moves(position, to_move, my_color, ply);
        if moves.is_empty() {
            return self.evaluator.evaluate(position, my_color);
        }

        let alpha_orig = alpha;
        let beta_orig = beta;
        let maximizing = to_move == my_color;
        let mut best_value = if maximizing { i32::MIN } else { i32::MAX };
        let mut best_move = Move::NONE;

        for mv in moves {
            if self.time_up() {
                return 0;
            }
            let value = match position.play(mv) {
                Some(mut child) => self.alpha_beta(
                    &mut child,
                    depth - 1,
                    alpha,
                    beta,
                    to_move.opposite(),
                    my_color,
                    ply + 1,
                ),
                None => continue,
            };
            if self.time_up() {
                return 0;
            }

            if maximizing {
                if value > best_value {
                    best_value = value;
                    best_move = mv;
                }
                alpha = alpha.max(best_value);
            } else {
                if value < best_value {
                    best_value = value;
                    best_move = mv;
                }
                beta = beta.min(best_value);
            }

            if alpha >= beta {
                self.killers.record(ply, mv);
                self.history.increment(mv, depth);
                break;
            }
        }

        if !best_move.is_valid() {
            return self.evaluator.evaluate(position, my_color);
        }

        let node_type = if best_value <= alpha_orig {
            NodeType::UpperBound
        } else if best_value >= beta_orig {
            NodeType::LowerBound
        } else {
            NodeType::Exact
        };
        self.transposition_table.store(
            hash,
            TranspositionEntry {
                depth,
                score: best_value,
                node_type,
                best_move,
            },
        );

        best_value
    }

    /// Candidate moves for `to_move`, most promising first.
    pub fn order_moves(&self, position: &mut Position, to_move: Color, my_color: Color, ply: usize) -> Vec<Move> {
        let candidates = position.candidate_moves();
        let opponent = to_move.opposite();

        let mut severity = [0i32; NUM_CELLS];
        for threat in self.threat_scanner.find_blocking_moves(position, to_move) {
            if let Some(idx) = threat.mv.index() {
                severity[idx] = severity[idx].max(threat.severity);
            }
        }
        let killer_first = self.killers.first(ply);
        let killer_second = self.killers.second(ply);

        let mut scored: Vec<(i64, Move)> = Vec::with_capacity(candidates.len());
        for mv in candidates {
            let wins = position.completes_five(mv.x, mv.y, to_move);
            let Some(child) = position.play(mv) else {
                continue;
            };
            let mut score = if wins {
                ORDER_WIN
            } else if child
                .candidate_moves()
                .iter()
                .any(|reply| child.completes_five(reply.x, reply.y, opponent))
            {
                // Kept so it stays playable when nothing else is
                ORDER_GIVES_WIN
            } else {
                self.evaluator.evaluate(&child, my_color) as i64
            };
            drop(child);

            score -= mv.center_distance() as i64;
            if let Some(idx) = mv.index() {
                score += severity[idx] as i64;
            }
            if mv == killer_first {
                score += KILLER_BONUS_FIRST;
            } else if mv == killer_second {
                score += KILLER_BONUS_SECOND;
            }
            score += self.history.value(mv) as i64;
            scored.push((score, mv));
        }

        // Stable sort: equal scores keep generation order
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored.into_iter().map(|(_, mv)| mv).collect()
    }

    /// Arm the deadline `time_limit_ms` from now and clear every per-call
    /// table. `select_move` does this itself; call it before driving
    /// `alpha_beta` directly.
    pub fn start_clock(&mut self, time_limit_ms: u64) {
        let now = Instant::now();
        self.deadline = now
            .checked_add(Duration::from_millis(time_limit_ms))
            .unwrap_or_else(|| now + Duration::from_secs(24 * 60 * 60));
        self.reset();
    }

    fn time_up(&self) -> bool {
        Instant::now() >= self.deadline
    }

    fn reset(&mut self) {
        self.transposition_table.clear();
        self.killers.reset();
        self.history.reset();
        self.nodes_searched = 0;
        self.max_depth_reached = 0;
        self.completed_depth = 0;
        self.last_source = MoveSource::NoMove;
    }

    pub fn set_max_depth(&mut self, depth: i32) {
        self.max_depth = depth.max(1);
    }

    pub fn set_tt_capacity(&mut self, entries: usize) {
        self.transposition_table.set_capacity(entries);
    }

    pub fn get_nodes_searched(&self) -> u64 {
        self.nodes_searched
    }

    pub fn max_depth_reached(&self) -> i32 {
        self.max_depth_reached
    }

    /// Deepest iteration whose root scan finished before the deadline.
    pub fn completed_depth(&self) -> i32 {
        self.completed_depth
    }

    pub fn last_source(&self) -> MoveSource {
        self.last_source
    }

    pub fn history(&self) -> &HistoryTable {
        &self.history
    }

    pub fn killers(&self) -> &KillerTable {
        &self.killers
    }

    pub fn tt_len(&self) -> usize {
        self.transposition_table.len()
    }
}

impl Default for Search {
    fn default() -> Self {
        Self::new()
    }
}
