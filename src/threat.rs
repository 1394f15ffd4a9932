use crate::board::{all_lines, Color, Line, Position, NUM_CELLS};
use crate::movegen::Move;

pub const OPEN_FOUR: i32 = 1_000_000;
pub const SIMPLE_FOUR: i32 = 500_000;
pub const OPEN_THREE: i32 = 120_000;
pub const BROKEN_THREE: i32 = 60_000;

const WINDOW: i32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreatMove {
    pub mv: Move,
    pub severity: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cell {
    Attacker,
    Defender,
    Empty,
}

/// Best severity seen per cell, remembering first-discovery order.
struct SeverityMap {
    slot: [Option<usize>; NUM_CELLS],
    found: Vec<ThreatMove>,
}

impl SeverityMap {
    fn new() -> Self {
        Self {
            slot: [None; NUM_CELLS],
            found: Vec::new(),
        }
    }

    fn raise(&mut self, mv: Move, severity: i32) {
        let Some(idx) = mv.index() else {
            return;
        };
        match self.slot[idx] {
            Some(i) => {
                let threat = &mut self.found[i];
                threat.severity = threat.severity.max(severity);
            }
            None => {
                self.slot[idx] = Some(self.found.len());
                self.found.push(ThreatMove { mv, severity });
            }
        }
    }

    fn into_sorted(mut self) -> Vec<ThreatMove> {
        // Stable: equal severities stay in discovery order
        self.found.sort_by(|a, b| b.severity.cmp(&a.severity));
        self.found
    }
}

/// Finds the cells a defender must consider to stop the opponent's fours
/// and threes.
pub struct ThreatScanner {
    lines: Vec<Line>,
}

impl ThreatScanner {
    pub fn new() -> Self {
        Self {
            lines: all_lines()
                .into_iter()
                .filter(|line| line.len >= WINDOW)
                .collect(),
        }
    }

    /// Blocking cells against `defender`'s opponent, most severe first.
    pub fn find_blocking_moves(&self, board: &Position, defender: Color) -> Vec<ThreatMove> {
        let attacker = defender.opposite();
        let mut best = SeverityMap::new();
        for line in self.lines.iter() {
            self.scan_line(board, attacker, line, &mut best);
        }
        best.into_sorted()
    }

    /// Highest severity the scan assigns to `mv`, or 0.
    pub fn severity_of(threats: &[ThreatMove], mv: Move) -> i32 {
        threats
            .iter()
            .find(|t| t.mv == mv)
            .map_or(0, |t| t.severity)
    }

    fn scan_line(&self, board: &Position, attacker: Color, line: &Line, best: &mut SeverityMap) {
        let cell = |i: i32| {
            let (x, y) = line.at(i);
            match board.stone_at(x, y) {
                Some(c) if c == attacker => Cell::Attacker,
                Some(_) => Cell::Defender,
                None => Cell::Empty,
            }
        };
        let open = |i: i32| i >= 0 && i < line.len && cell(i) == Cell::Empty;

        for start in 0..=(line.len - WINDOW) {
            let mut attackers = 0;
            let mut empties = Vec::with_capacity(WINDOW as usize);
            let mut blocked = false;
            for offset in 0..WINDOW {
                match cell(start + offset) {
                    Cell::Attacker => attackers += 1,
                    Cell::Empty => empties.push(start + offset),
                    Cell::Defender => {
                        blocked = true;
                        break;
                    }
                }
            }
            if blocked {
                continue;
            }

            let left_open = open(start - 1);
            let right_open = open(start + WINDOW);
            let to_move = |i: i32| {
                let (x, y) = line.at(i);
                Move::new(x, y)
            };

            match (attackers, empties.len()) {
                (4, 1) => {
                    let severity = if left_open && right_open {
                        OPEN_FOUR
                    } else {
                        SIMPLE_FOUR
                    };
                    best.raise(to_move(empties[0]), severity);
                }
                (3, 2) => {
                    let severity = match (left_open, right_open) {
                        (true, true) => OPEN_THREE,
                        (true, false) | (false, true) => BROKEN_THREE,
                        (false, false) => continue,
                    };
                    for &i in empties.iter() {
                        best.raise(to_move(i), severity);
                    }
                }
                _ => {}
            }
        }
    }
}

impl Default for ThreatScanner {
    fn default() -> Self {
        Self::new()
    }
}
