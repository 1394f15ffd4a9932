use crate::board::NUM_CELLS;
use crate::movegen::Move;

/// Per-cell count of how often a move caused a cutoff, weighted by the
/// remaining depth squared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryTable {
    table: [i32; NUM_CELLS],
}

impl HistoryTable {
    pub fn new() -> Self {
        Self {
            table: [0; NUM_CELLS],
        }
    }

    pub fn reset(&mut self) {
        self.table = [0; NUM_CELLS];
    }

    pub fn increment(&mut self, mv: Move, depth: i32) {
        if let Some(idx) = mv.index() {
            self.table[idx] = self.table[idx].saturating_add(depth * depth);
        }
    }

    pub fn value(&self, mv: Move) -> i32 {
        mv.index().map_or(0, |idx| self.table[idx])
    }

    pub fn is_clear(&self) -> bool {
        self.table.iter().all(|&v| v == 0)
    }
}

impl Default for HistoryTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increment_by_depth_squared() {
        let mut history = HistoryTable::new();
        let mv = Move::new(4, 7);
        history.increment(mv, 3);
        history.increment(mv, 2);
        assert_eq!(history.value(mv), 13);
        assert_eq!(history.value(Move::new(7, 4)), 0);
    }

    #[test]
    fn test_off_board_moves_read_zero() {
        let mut history = HistoryTable::new();
        history.increment(Move::NONE, 5);
        history.increment(Move::new(12, 0), 5);
        assert_eq!(history.value(Move::NONE), 0);
        assert!(history.is_clear());
    }

    #[test]
    fn test_reset() {
        let mut history = HistoryTable::new();
        history.increment(Move::new(0, 0), 4);
        assert!(!history.is_clear());
        history.reset();
        assert!(history.is_clear());
    }
}
