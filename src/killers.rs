use crate::movegen::Move;

pub const MAX_PLY: usize = 64;

/// Two most recent cutoff moves per ply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KillerTable {
    slots: [[Move; 2]; MAX_PLY],
}

impl KillerTable {
    pub fn new() -> Self {
        Self {
            slots: [[Move::NONE; 2]; MAX_PLY],
        }
    }

    pub fn reset(&mut self) {
        self.slots = [[Move::NONE; 2]; MAX_PLY];
    }

    /// Put `mv` in the front slot, pushing the old front killer back.
    pub fn record(&mut self, ply: usize, mv: Move) {
        if let Some(slot) = self.slots.get_mut(ply) {
            if slot[0] != mv {
                slot[1] = slot[0];
                slot[0] = mv;
            }
        }
    }

    pub fn first(&self, ply: usize) -> Move {
        self.slots.get(ply).map_or(Move::NONE, |slot| slot[0])
    }

    pub fn second(&self, ply: usize) -> Move {
        self.slots.get(ply).map_or(Move::NONE, |slot| slot[1])
    }

    pub fn is_clear(&self) -> bool {
        self.slots.iter().flatten().all(|&mv| mv == Move::NONE)
    }
}

impl Default for KillerTable {
    fn default() -> Self {
        Self::new()
    }
}
