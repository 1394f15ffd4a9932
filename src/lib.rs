pub mod board;
pub mod movegen;
pub mod evaluation;
pub mod transposition;
pub mod history;
pub mod killers;
pub mod threat;
pub mod search;
pub mod protocol;

pub use board::{Color, Position};
pub use movegen::Move;
pub use search::Search;
