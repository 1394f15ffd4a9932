use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use log::{debug, warn};
use thiserror::Error;

use crate::board::{Color, Position, ZobristKeys};
use crate::movegen::Move;
use crate::search::Search;

pub const DEFAULT_MOVE_TIME_MS: u64 = 1800;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("{command} is missing its {argument} argument")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },
    #[error("expected a number for {argument}, got {value:?}")]
    InvalidNumber {
        argument: &'static str,
        value: String,
    },
    #[error("unknown color field {0}, expected 1 or 2")]
    UnknownColor(i64),
    #[error("cannot place a stone at {x} {y}")]
    IllegalPlacement { x: i32, y: i32 },
}

/// What the driver should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Silent,
    Reply(String),
    Quit,
}

/// Match driver: START / PLACE / TURN / END / DEBUG, one command per line.
pub struct ProtocolHandler {
    keys: Arc<ZobristKeys>,
    position: Position,
    my_color: Color,
    move_time_ms: u64,
    search: Search,
}

impl ProtocolHandler {
    pub fn new() -> Self {
        Self::with_search(
            Search::new(),
            Arc::new(ZobristKeys::default()),
            DEFAULT_MOVE_TIME_MS,
        )
    }

    /// Every position this handler sets up shares `keys`.
    pub fn with_search(search: Search, keys: Arc<ZobristKeys>, move_time_ms: u64) -> Self {
        ProtocolHandler {
            position: Position::with_keys(keys.clone()),
            keys,
            my_color: Color::Black,
            move_time_ms,
            search,
        }
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn my_color(&self) -> Color {
        self.my_color
    }

    pub fn run(&mut self) -> Result<()> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        self.run_with(stdin.lock(), &mut stdout)
    }

    pub fn run_with<R: BufRead, W: Write>(&mut self, mut reader: R, writer: &mut W) -> Result<()> {
        let mut line = String::new();
        loop {
            line.clear();
            let read = reader
                .read_line(&mut line)
                .context("failed to read command")?;
            if read == 0 {
                break;
            }

            match self.handle_command(line.trim()) {
                Ok(Response::Silent) => {}
                Ok(Response::Reply(reply)) => {
                    writeln!(writer, "{}", reply).context("failed to write reply")?;
                    writer.flush().context("failed to flush reply")?;
                }
                Ok(Response::Quit) => break,
                Err(e) => warn!("ignoring {:?}: {}", line.trim(), e),
            }
        }
        Ok(())
    }

    pub fn handle_command(&mut self, command: &str) -> Result<Response, ProtocolError> {
        let parts: Vec<&str> = command.split_whitespace().collect();
        if parts.is_empty() {
            return Ok(Response::Silent);
        }

        match parts[0] {
            "START" => self.handle_start(&parts[1..]),
            "PLACE" => self.handle_place(&parts[1..]),
            "TURN" => Ok(self.handle_turn()),
            "END" => {
                debug!("game over: {}", parts[1..].join(" "));
                Ok(Response::Quit)
            }
            "DEBUG" => Ok(Response::Silent),
            other => {
                debug!("unknown command {}", other);
                Ok(Response::Silent)
            }
        }
    }

    fn handle_start(&mut self, args: &[&str]) -> Result<Response, ProtocolError> {
        let field = parse_arg::<i64>(args, 0, "START", "field")?;
        self.my_color = match field {
            1 => Color::Black,
            2 => Color::White,
            other => return Err(ProtocolError::UnknownColor(other)),
        };
        self.position = Position::with_keys(self.keys.clone());
        Ok(Response::Reply("OK".to_string()))
    }

    fn handle_place(&mut self, args: &[&str]) -> Result<Response, ProtocolError> {
        let x = parse_arg::<i32>(args, 0, "PLACE", "x")?;
        let y = parse_arg::<i32>(args, 1, "PLACE", "y")?;
        if !self.position.apply_move(x, y) {
            return Err(ProtocolError::IllegalPlacement { x, y });
        }
        Ok(Response::Silent)
    }

    fn handle_turn(&mut self) -> Response {
        let mut mv = self
            .search
            .select_move(&mut self.position, self.my_color, self.move_time_ms);
        if !mv.is_valid() {
            mv = self
                .position
                .candidate_moves()
                .first()
                .copied()
                .unwrap_or(Move::new(0, 0));
        }
        if !self.position.apply_move(mv.x, mv.y) {
            warn!("own move {} could not be recorded", mv);
        }
        Response::Reply(mv.to_string())
    }
}

impl Default for ProtocolHandler {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_arg<T: std::str::FromStr>(
    args: &[&str],
    index: usize,
    command: &'static str,
    argument: &'static str,
) -> Result<T, ProtocolError> {
    let value = args
        .get(index)
        .ok_or(ProtocolError::MissingArgument { command, argument })?;
    value.parse::<T>().map_err(|_| ProtocolError::InvalidNumber {
        argument,
        value: value.to_string(),
    })
}
