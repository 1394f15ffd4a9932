use crate::board::{all_lines, Color, Line, Position};

/// Outcome of scanning every line for one side's runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub pattern_score: i64,
    pub longest_run: i32,
    pub longest_open_ends: i32,
    pub open_fours: u32,
}

pub struct Evaluator {
    // Run values
    pub five_score: i64,
    pub open_four_score: i64,
    pub simple_four_score: i64,
    pub open_three_score: i64,
    pub broken_three_score: i64,
    pub open_two_score: i64,
    pub closed_two_score: i64,

    // Two open fours at once cannot be stopped
    pub double_open_four_score: i32,

    // Shape bias toward extending the single best line
    pub longest_run_weight: i64,
    pub open_end_weight: i64,

    lines: Vec<Line>,
}

impl Evaluator {
    pub fn new() -> Self {
        Self {
            five_score: 100_000_000,
            open_four_score: 10_000_000,
            simple_four_score: 1_000_000,
            open_three_score: 100_000,
            broken_three_score: 10_000,
            open_two_score: 1_000,
            closed_two_score: 100,

            double_open_four_score: 90_000_000,

            longest_run_weight: 500,
            open_end_weight: 20_000,

            lines: all_lines(),
        }
    }

    /// Static score of `board` from `color`'s point of view.
    pub fn evaluate(&self, board: &Position, color: Color) -> i32 {
        let own = self.summarize(board, color);
        let theirs = self.summarize(board, color.opposite());

        let own_double = own.open_fours >= 2;
        let their_double = theirs.open_fours >= 2;
        if own_double && !their_double {
            return self.double_open_four_score;
        }
        if their_double && !own_double {
            return -self.double_open_four_score;
        }

        let positional = own.pattern_score - theirs.pattern_score;
        let shape = self.shape_bias(&own) - self.shape_bias(&theirs);
        (positional + shape).clamp(-(i32::MAX as i64 - 2), i32::MAX as i64 - 2) as i32
    }

    pub fn pattern_score(&self, count: i32, left_open: bool, right_open: bool) -> i64 {
        let both = left_open && right_open;
        let either = left_open || right_open;
        match count {
            c if c >= 5 => self.five_score,
            4 if both => self.open_four_score,
            4 if either => self.simple_four_score,
            3 if both => self.open_three_score,
            3 if either => self.broken_three_score,
            2 if both => self.open_two_score,
            2 if either => self.closed_two_score,
            _ => 0,
        }
    }

    fn shape_bias(&self, summary: &RunSummary) -> i64 {
        let run = summary.longest_run as i64;
        run * run * run * self.longest_run_weight
            + summary.longest_open_ends as i64 * self.open_end_weight
    }

    /// Walk every maximal run of `color` stones and total up its value.
    pub fn summarize(&self, board: &Position, color: Color) -> RunSummary {
        let mut summary = RunSummary::default();
        let empty_at = |line: &Line, i: i32| {
            if i < 0 || i >= line.len {
                return false;
            }
            let (x, y) = line.at(i);
            !board.is_occupied(x, y)
        };

        for line in self.lines.iter() {
            let mut i = 0;
            while i < line.len {
                let (x, y) = line.at(i);
                if board.stone_at(x, y) != Some(color) {
                    i += 1;
                    continue;
                }
                let mut j = i;
                while j < line.len {
                    let (xj, yj) = line.at(j);
                    if board.stone_at(xj, yj) != Some(color) {
                        break;
                    }
                    j += 1;
                }

                let count = j - i;
                let left_open = empty_at(line, i - 1);
                let right_open = empty_at(line, j);
                summary.pattern_score = summary
                    .pattern_score
                    .saturating_add(self.pattern_score(count, left_open, right_open));

                let open_ends = left_open as i32 + right_open as i32;
                if count > summary.longest_run
                    || (count == summary.longest_run && open_ends > summary.longest_open_ends)
                {
                    summary.longest_run = count;
                    summary.longest_open_ends = open_ends;
                }
                if count == 4 && left_open && right_open {
                    summary.open_fours += 1;
                }
                i = j;
            }
        }
        summary
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}
