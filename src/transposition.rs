use std::collections::HashMap;

use crate::movegen::Move;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Exact,
    LowerBound,
    UpperBound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranspositionEntry {
    pub depth: i32,
    pub score: i32,
    pub node_type: NodeType,
    pub best_move: Move,
}

/// Outcome of looking a position up before searching it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    /// The stored result settles this node.
    Cutoff(i32),
    /// The window after applying the stored bound.
    Window { alpha: i32, beta: i32 },
}

pub struct TranspositionTable {
    table: HashMap<u64, TranspositionEntry>,
    size: usize,
}

impl TranspositionTable {
    pub fn new(size: usize) -> Self {
        Self {
            table: HashMap::with_capacity(size.min(1 << 16)),
            size: size.max(1),
        }
    }

    pub fn store(&mut self, hash: u64, entry: TranspositionEntry) {
        if self.table.len() >= self.size && !self.table.contains_key(&hash) {
            // Full: make room by dropping an arbitrary entry
            if let Some(&victim) = self.table.keys().next() {
                self.table.remove(&victim);
            }
        }
        self.table.insert(hash, entry);
    }

    pub fn get(&self, hash: u64) -> Option<&TranspositionEntry> {
        self.table.get(&hash)
    }

    /// Tighten `alpha`/`beta` with an entry searched at least `depth` deep.
    pub fn probe(&self, hash: u64, depth: i32, mut alpha: i32, mut beta: i32) -> Probe {
        if let Some(entry) = self.table.get(&hash) {
            if entry.depth >= depth {
                match entry.node_type {
                    NodeType::Exact => return Probe::Cutoff(entry.score),
                    NodeType::LowerBound => alpha = alpha.max(entry.score),
                    NodeType::UpperBound => beta = beta.min(entry.score),
                }
                if alpha >= beta {
                    return Probe::Cutoff(entry.score);
                }
            }
        }
        Probe::Window { alpha, beta }
    }

    pub fn clear(&mut self) {
        self.table.clear();
    }

    pub fn set_capacity(&mut self, size: usize) {
        self.size = size.max(1);
        self.table.clear();
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
