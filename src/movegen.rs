use std::fmt;

use crate::board::{cell_index, Color, Position, BOARD_SIZE};

/// Centre cell, played when the board is empty.
pub const CENTER: i32 = 5;

// Margin around the stones' bounding box searched for candidates.
const CANDIDATE_MARGIN: i32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub x: i32,
    pub y: i32,
}

impl Move {
    /// Sentinel for "no move".
    pub const NONE: Move = Move { x: -1, y: -1 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn is_valid(&self) -> bool {
        cell_index(self.x, self.y).is_some()
    }

    pub fn index(&self) -> Option<usize> {
        cell_index(self.x, self.y)
    }

    /// Squared Euclidean distance from the centre cell.
    pub fn center_distance(&self) -> i32 {
        let dx = self.x - CENTER;
        let dy = self.y - CENTER;
        dx * dx + dy * dy
    }
}

impl Default for Move {
    fn default() -> Self {
        Move::NONE
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.x, self.y)
    }
}

impl Position {
    /// Every empty cell, row-major.
    pub fn legal_moves(&self) -> Vec<Move> {
        let mut moves = Vec::with_capacity(144);
        for y in 0..BOARD_SIZE {
            for x in 0..BOARD_SIZE {
                if !self.is_occupied(x, y) {
                    moves.push(Move::new(x, y));
                }
            }
        }
        moves
    }

    /// Empty cells inside the stones' bounding box (grown by two, clamped to
    /// the board) that touch at least one stone.
    pub fn candidate_moves(&self) -> Vec<Move> {
        let occupied = self.occupied();
        if occupied.is_empty() {
            return vec![Move::new(CENTER, CENTER)];
        }

        let (mut min_x, mut max_x, mut min_y, mut max_y) = (BOARD_SIZE, -1, BOARD_SIZE, -1);
        for idx in occupied.iter() {
            let x = idx as i32 % BOARD_SIZE;
            let y = idx as i32 / BOARD_SIZE;
            min_x = min_x.min(x);
            max_x = max_x.max(x);
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }
        let min_x = (min_x - CANDIDATE_MARGIN).max(0);
        let min_y = (min_y - CANDIDATE_MARGIN).max(0);
        let max_x = (max_x + CANDIDATE_MARGIN).min(BOARD_SIZE - 1);
        let max_y = (max_y + CANDIDATE_MARGIN).min(BOARD_SIZE - 1);

        let mut moves = Vec::new();
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                if !self.is_occupied(x, y) && self.has_neighbor(x, y) {
                    moves.push(Move::new(x, y));
                }
            }
        }

        if moves.is_empty() {
            return self.legal_moves();
        }
        moves
    }

    fn has_neighbor(&self, x: i32, y: i32) -> bool {
        for dy in -1..=1 {
            for dx in -1..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                // Off-board cells count as blocked, not as stones.
                if self.stone_at(x + dx, y + dy).is_some() {
                    return true;
                }
            }
        }
        false
    }

    /// Would a `color` stone on the empty cell (x, y) make five or more?
    pub fn completes_five(&self, x: i32, y: i32, color: Color) -> bool {
        if self.is_occupied(x, y) {
            return false;
        }
        let own = |cx: i32, cy: i32| self.stone_at(cx, cy) == Some(color);
        for &(dx, dy) in [(1, 0), (0, 1), (1, 1), (1, -1)].iter() {
            let mut count = 1;
            let (mut nx, mut ny) = (x + dx, y + dy);
            while own(nx, ny) {
                count += 1;
                nx += dx;
                ny += dy;
            }
            let (mut nx, mut ny) = (x - dx, y - dy);
            while own(nx, ny) {
                count += 1;
                nx -= dx;
                ny -= dy;
            }
            if count >= 5 {
                return true;
            }
        }
        false
    }

    /// Cells where `color` would complete five right now.
    pub fn winning_moves(&self, color: Color) -> Vec<Move> {
        self.legal_moves()
            .into_iter()
            .filter(|mv| self.completes_five(mv.x, mv.y, color))
            .collect()
    }
}
