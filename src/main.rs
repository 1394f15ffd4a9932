use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use five_salmons::board::{ZobristKeys, ZOBRIST_SEED};
use five_salmons::protocol::{ProtocolHandler, DEFAULT_MOVE_TIME_MS};
use five_salmons::search::Search;

#[derive(Parser, Debug)]
#[command(author, version, about = "Five-in-a-row engine for the 12x12 board")]
struct Cli {
    /// Thinking time per move in milliseconds
    #[arg(long, default_value_t = DEFAULT_MOVE_TIME_MS)]
    move_time_ms: u64,

    /// Stop iterative deepening at this depth even if time remains
    #[arg(long)]
    max_depth: Option<i32>,

    /// Transposition table size in entries
    #[arg(long, default_value_t = 1_000_000)]
    tt_capacity: usize,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    let keys = Arc::new(ZobristKeys::new(ZOBRIST_SEED));

    let mut search = Search::new();
    search.set_tt_capacity(cli.tt_capacity);
    if let Some(depth) = cli.max_depth {
        search.set_max_depth(depth);
    }

    let mut handler = ProtocolHandler::with_search(search, keys, cli.move_time_ms);
    handler.run()
}
