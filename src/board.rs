use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::movegen::Move;

pub const BOARD_SIZE: i32 = 12;
pub const NUM_CELLS: usize = (BOARD_SIZE * BOARD_SIZE) as usize;

/// Seed for the fingerprint constants. Fixed so hashes are reproducible
/// across runs and test fixtures.
pub const ZOBRIST_SEED: u64 = 0x0012_3456_78AB_CDEF;

// Two stones per side around the centre, black to move.
const STARTING_WHITE: [(i32, i32); 2] = [(6, 6), (5, 5)];
const STARTING_BLACK: [(i32, i32); 2] = [(6, 5), (5, 6)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    White,
}

impl Color {
    pub fn opposite(&self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    fn index(self) -> usize {
        match self {
            Color::Black => 0,
            Color::White => 1,
        }
    }
}

/// Linear cell index for on-board coordinates.
#[inline]
pub fn cell_index(x: i32, y: i32) -> Option<usize> {
    if x < 0 || x >= BOARD_SIZE || y < 0 || y >= BOARD_SIZE {
        None
    } else {
        Some((y * BOARD_SIZE + x) as usize)
    }
}

/// One straight line across the board: a row, a column, or a diagonal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line {
    pub x: i32,
    pub y: i32,
    pub dx: i32,
    pub dy: i32,
    pub len: i32,
}

impl Line {
    /// Coordinates of the `i`-th cell. Offsets outside `0..len` fall off
    /// the line (and usually off the board).
    #[inline]
    pub fn at(&self, i: i32) -> (i32, i32) {
        (self.x + i * self.dx, self.y + i * self.dy)
    }
}

/// Every row, column, diagonal and anti-diagonal of the board.
pub fn all_lines() -> Vec<Line> {
    let n = BOARD_SIZE;
    let mut lines = Vec::with_capacity((2 * n + 2 * (2 * n - 1)) as usize);
    for y in 0..n {
        lines.push(Line { x: 0, y, dx: 1, dy: 0, len: n });
    }
    for x in 0..n {
        lines.push(Line { x, y: 0, dx: 0, dy: 1, len: n });
    }
    for k in -(n - 1)..n {
        let x = k.max(0);
        let y = (-k).max(0);
        lines.push(Line { x, y, dx: 1, dy: 1, len: (n - x).min(n - y) });
    }
    for s in 0..(2 * n - 1) {
        let x = (s - (n - 1)).max(0);
        let y = s.min(n - 1);
        lines.push(Line { x, y, dx: 1, dy: -1, len: (y + 1).min(n - x) });
    }
    lines
}

/// 144 cells packed into three 64-bit chunks; cell `idx` lives in chunk
/// `idx >> 6`, bit `idx & 63`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bitboard {
    chunks: [u64; 3],
}

impl Bitboard {
    pub const fn new() -> Self {
        Self { chunks: [0; 3] }
    }

    #[inline]
    pub fn set(&mut self, idx: usize) {
        self.chunks[idx >> 6] |= 1u64 << (idx & 63);
    }

    #[inline]
    pub fn clear(&mut self, idx: usize) {
        self.chunks[idx >> 6] &= !(1u64 << (idx & 63));
    }

    #[inline]
    pub fn get(&self, idx: usize) -> bool {
        (self.chunks[idx >> 6] >> (idx & 63)) & 1 == 1
    }

    pub fn count(&self) -> u32 {
        self.chunks.iter().map(|c| c.count_ones()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.iter().all(|&c| c == 0)
    }

    pub fn union(&self, other: &Bitboard) -> Bitboard {
        Bitboard {
            chunks: [
                self.chunks[0] | other.chunks[0],
                self.chunks[1] | other.chunks[1],
                self.chunks[2] | other.chunks[2],
            ],
        }
    }

    /// Set cell indices in ascending (row-major) order.
    pub fn iter(&self) -> BitboardIter {
        BitboardIter {
            chunks: self.chunks,
            chunk: 0,
        }
    }
}

pub struct BitboardIter {
    chunks: [u64; 3],
    chunk: usize,
}

impl Iterator for BitboardIter {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        while self.chunk < 3 {
            let bits = self.chunks[self.chunk];
            if bits != 0 {
                let offset = bits.trailing_zeros() as usize;
                self.chunks[self.chunk] &= bits - 1;
                return Some(self.chunk * 64 + offset);
            }
            self.chunk += 1;
        }
        None
    }
}

/// Random constants folded into the position fingerprint, one per
/// (cell, color) plus a marker for white to move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZobristKeys {
    stones: [[u64; 2]; NUM_CELLS],
    white_to_move: u64,
}

impl ZobristKeys {
    pub fn new(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut stones = [[0u64; 2]; NUM_CELLS];
        for cell in stones.iter_mut() {
            cell[0] = rng.gen();
            cell[1] = rng.gen();
        }
        Self {
            stones,
            white_to_move: rng.gen(),
        }
    }

    #[inline]
    pub fn stone(&self, idx: usize, color: Color) -> u64 {
        self.stones[idx][color.index()]
    }

    #[inline]
    pub fn side(&self) -> u64 {
        self.white_to_move
    }
}

impl Default for ZobristKeys {
    fn default() -> Self {
        Self::new(ZOBRIST_SEED)
    }
}

#[derive(Debug, Clone)]
pub struct Position {
    stones: [Bitboard; 2],
    side_to_move: Color,
    hash: u64,
    keys: Arc<ZobristKeys>,
}

impl Position {
    /// Starting layout with freshly built keys from the fixed seed.
    pub fn new() -> Self {
        Self::with_keys(Arc::new(ZobristKeys::default()))
    }

    /// Starting layout sharing an existing key set.
    pub fn with_keys(keys: Arc<ZobristKeys>) -> Self {
        let mut position = Self::empty_with_keys(keys);
        for &(x, y) in STARTING_WHITE.iter() {
            position.place_stone(x, y, Color::White);
        }
        for &(x, y) in STARTING_BLACK.iter() {
            position.place_stone(x, y, Color::Black);
        }
        position
    }

    /// An empty board, black to move.
    pub fn empty() -> Self {
        Self::empty_with_keys(Arc::new(ZobristKeys::default()))
    }

    pub fn empty_with_keys(keys: Arc<ZobristKeys>) -> Self {
        Self {
            stones: [Bitboard::new(); 2],
            side_to_move: Color::Black,
            hash: 0,
            keys,
        }
    }

    pub fn keys(&self) -> &Arc<ZobristKeys> {
        &self.keys
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn hash(&self) -> u64 {
        self.hash
    }

    pub fn occupied(&self) -> Bitboard {
        self.stones[0].union(&self.stones[1])
    }

    /// Off-board coordinates report occupied so line scans stop at the edge.
    pub fn is_occupied(&self, x: i32, y: i32) -> bool {
        match cell_index(x, y) {
            Some(idx) => self.stones[0].get(idx) || self.stones[1].get(idx),
            None => true,
        }
    }

    pub fn stone_at(&self, x: i32, y: i32) -> Option<Color> {
        let idx = cell_index(x, y)?;
        if self.stones[0].get(idx) {
            Some(Color::Black)
        } else if self.stones[1].get(idx) {
            Some(Color::White)
        } else {
            None
        }
    }

    pub fn count_stones(&self, color: Color) -> u32 {
        self.stones[color.index()].count()
    }

    pub fn stone_count(&self) -> u32 {
        self.stones[0].count() + self.stones[1].count()
    }

    /// Put a stone down without changing the side to move. Used to set up
    /// positions; returns false on an occupied or off-board cell.
    pub fn place_stone(&mut self, x: i32, y: i32, color: Color) -> bool {
        if self.is_occupied(x, y) {
            return false;
        }
        let Some(idx) = cell_index(x, y) else {
            return false;
        };
        self.stones[color.index()].set(idx);
        self.hash ^= self.keys.stone(idx, color);
        true
    }

    pub fn set_side_to_move(&mut self, color: Color) {
        if self.side_to_move != color {
            self.side_to_move = color;
            self.hash ^= self.keys.side();
        }
    }

    pub fn apply_move(&mut self, x: i32, y: i32) -> bool {
        if self.is_occupied(x, y) {
            return false;
        }
        let Some(idx) = cell_index(x, y) else {
            return false;
        };
        let mover = self.side_to_move;
        self.stones[mover.index()].set(idx);
        self.hash ^= self.keys.stone(idx, mover);

        self.side_to_move = mover.opposite();
        self.hash ^= self.keys.side();
        true
    }

    /// Undo the most recent `apply_move`. Fails without touching the board
    /// if the cell does not hold a stone of the side that just moved.
    pub fn reverse_move(&mut self, x: i32, y: i32) -> bool {
        let Some(idx) = cell_index(x, y) else {
            return false;
        };
        let mover = self.side_to_move.opposite();
        if !self.stones[mover.index()].get(idx) {
            return false;
        }
        self.side_to_move = mover;
        self.hash ^= self.keys.side();

        self.stones[mover.index()].clear(idx);
        self.hash ^= self.keys.stone(idx, mover);
        true
    }

    /// Apply `mv` for the side to move and hand back a guard that reverses
    /// it when dropped.
    pub fn play(&mut self, mv: Move) -> Option<MoveGuard<'_>> {
        if self.apply_move(mv.x, mv.y) {
            Some(MoveGuard { position: self, mv })
        } else {
            None
        }
    }

    pub fn check_win(&self, color: Color) -> bool {
        const DIRECTIONS: [(i32, i32); 4] = [(1, 0), (0, 1), (1, 1), (1, -1)];
        let own = &self.stones[color.index()];
        let has = |x: i32, y: i32| cell_index(x, y).map_or(false, |idx| own.get(idx));

        for idx in own.iter() {
            let x = idx as i32 % BOARD_SIZE;
            let y = idx as i32 / BOARD_SIZE;
            for &(dx, dy) in DIRECTIONS.iter() {
                let mut count = 1;
                let (mut nx, mut ny) = (x + dx, y + dy);
                while has(nx, ny) {
                    count += 1;
                    nx += dx;
                    ny += dy;
                }
                let (mut nx, mut ny) = (x - dx, y - dy);
                while has(nx, ny) {
                    count += 1;
                    nx -= dx;
                    ny -= dy;
                }
                if count >= 5 {
                    return true;
                }
            }
        }
        false
    }

    /// Exactly the four predetermined stones, black to move.
    pub fn is_starting_layout(&self) -> bool {
        self.side_to_move == Color::Black
            && self.stone_count() == 4
            && STARTING_WHITE
                .iter()
                .all(|&(x, y)| self.stone_at(x, y) == Some(Color::White))
            && STARTING_BLACK
                .iter()
                .all(|&(x, y)| self.stone_at(x, y) == Some(Color::Black))
    }

    /// Fingerprint recomputed from scratch.
    pub fn compute_hash(&self) -> u64 {
        let mut hash = 0;
        for color in [Color::Black, Color::White] {
            for idx in self.stones[color.index()].iter() {
                hash ^= self.keys.stone(idx, color);
            }
        }
        if self.side_to_move == Color::White {
            hash ^= self.keys.side();
        }
        hash
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        self.stones == other.stones
            && self.side_to_move == other.side_to_move
            && self.hash == other.hash
    }
}

impl Eq for Position {}

/// Exclusive borrow of a position with one move applied. The move is
/// reversed on every exit path when the guard goes out of scope.
pub struct MoveGuard<'a> {
    position: &'a mut Position,
    mv: Move,
}

impl Deref for MoveGuard<'_> {
    type Target = Position;

    fn deref(&self) -> &Position {
        self.position
    }
}

impl DerefMut for MoveGuard<'_> {
    fn deref_mut(&mut self) -> &mut Position {
        self.position
    }
}

impl Drop for MoveGuard<'_> {
    fn drop(&mut self) {
        let reversed = self.position.reverse_move(self.mv.x, self.mv.y);
        debug_assert!(reversed, "unpaired reverse of {:?}", self.mv);
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "  ")?;
        for x in 0..BOARD_SIZE {
            write!(f, " {}", x % 10)?;
        }
        writeln!(f)?;
        for y in 0..BOARD_SIZE {
            write!(f, "{:2}", y)?;
            for x in 0..BOARD_SIZE {
                let c = match self.stone_at(x, y) {
                    Some(Color::Black) => 'X',
                    Some(Color::White) => 'O',
                    None => '.',
                };
                write!(f, " {}", c)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
