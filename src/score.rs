use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::EngineError;

pub const POINTS_PER_PUZZLE: i64 = 100;
pub const HINT_PENALTY: i64 = 15;
pub const TIME_PENALTY_PER_MINUTE: i64 = 2;
/// Certificate scoring charges less per hint than the running score. The
/// two constants are deliberately kept apart.
pub const CERTIFICATE_HINT_PENALTY: i64 = 10;

/// Running score for one player. Every counter is clamped at zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    points: u64,
    puzzles_solved: u64,
    hints_used: u64,
    /// Seconds.
    time_taken: u64,
    /// Mirror of the player's token count, kept so progress files carry it.
    free_hint_tokens: u64,
}

fn clamp(value: i64) -> u64 {
    value.max(0) as u64
}

fn signed(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

impl Score {
    pub fn new(points: i64, puzzles_solved: i64, hints_used: i64, time_taken: i64) -> Self {
        Self {
            points: clamp(points),
            puzzles_solved: clamp(puzzles_solved),
            hints_used: clamp(hints_used),
            time_taken: clamp(time_taken),
            free_hint_tokens: 0,
        }
    }

    /// `points + solved*100 - hints*15 - whole_minutes*2`, floored at zero.
    /// Saturates instead of overflowing on oversized stored counters.
    pub fn calculate_score(&self) -> i64 {
        signed(self.points)
            .saturating_add(signed(self.puzzles_solved).saturating_mul(POINTS_PER_PUZZLE))
            .saturating_sub(signed(self.hints_used).saturating_mul(HINT_PENALTY))
            .saturating_sub((signed(self.time_taken) / 60).saturating_mul(TIME_PENALTY_PER_MINUTE))
            .max(0)
    }

    /// Signed difference of the two calculated scores.
    ///
    /// Comparing against nothing is a caller bug and is reported as
    /// [`EngineError::MissingScore`].
    pub fn compare(&self, other: Option<&Score>) -> Result<i64, EngineError> {
        let other = other.ok_or(EngineError::MissingScore)?;
        Ok(self.calculate_score().saturating_sub(other.calculate_score()))
    }

    pub fn points(&self) -> u64 {
        self.points
    }

    pub fn puzzles_solved(&self) -> u64 {
        self.puzzles_solved
    }

    pub fn hints_used(&self) -> u64 {
        self.hints_used
    }

    pub fn time_taken(&self) -> u64 {
        self.time_taken
    }

    pub fn free_hint_tokens(&self) -> u64 {
        self.free_hint_tokens
    }

    pub fn set_points(&mut self, value: i64) {
        self.points = clamp(value);
    }

    pub fn set_puzzles_solved(&mut self, value: i64) {
        self.puzzles_solved = clamp(value);
    }

    pub fn set_hints_used(&mut self, value: i64) {
        self.hints_used = clamp(value);
    }

    pub fn set_time_taken(&mut self, value: i64) {
        self.time_taken = clamp(value);
    }

    pub fn set_free_hint_tokens(&mut self, value: i64) {
        self.free_hint_tokens = clamp(value);
    }

    pub fn add_points(&mut self, delta: i64) {
        self.set_points(signed(self.points).saturating_add(delta));
    }

    pub fn add_puzzle_solved(&mut self) {
        self.puzzles_solved = self.puzzles_solved.saturating_add(1);
    }

    pub fn add_hints_used(&mut self, delta: i64) {
        self.set_hints_used(signed(self.hints_used).saturating_add(delta));
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn multiplier(&self) -> i64 {
        match self {
            Difficulty::Easy => 1,
            Difficulty::Medium => 2,
            Difficulty::Hard => 3,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "Easy"),
            Difficulty::Medium => write!(f, "Medium"),
            Difficulty::Hard => write!(f, "Hard"),
        }
    }
}

/// End-of-game score: `max(0, base * multiplier - hints * 10)`.
pub fn certificate_score(base_score: i64, difficulty: Difficulty, total_hints_used: u64) -> i64 {
    base_score
        .saturating_mul(difficulty.multiplier())
        .saturating_sub(signed(total_hints_used).saturating_mul(CERTIFICATE_HINT_PENALTY))
        .max(0)
}

/// Issued once every room is completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate {
    pub username: String,
    pub difficulty: Difficulty,
    pub base_score: i64,
    pub total_hints_used: u64,
    pub final_score: i64,
    /// Solved puzzles per variant, e.g. `"logic" -> 2`.
    pub solved_by_category: BTreeMap<String, u32>,
}
