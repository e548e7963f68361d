use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::equation::{self, approx_eq, EPSILON};
use crate::hint::Hint;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PuzzleStatus {
    #[default]
    Unsolved,
    Attempted,
    Solved,
}

impl fmt::Display for PuzzleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PuzzleStatus::Unsolved => write!(f, "UNSOLVED"),
            PuzzleStatus::Attempted => write!(f, "ATTEMPTED"),
            PuzzleStatus::Solved => write!(f, "SOLVED"),
        }
    }
}

fn default_tolerance() -> f64 {
    EPSILON
}

/// Variant-specific solution data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PuzzleKind {
    FreeText {
        answer: String,
    },
    Numeric {
        value: f64,
        #[serde(default = "default_tolerance")]
        tolerance: f64,
    },
    WordChoice {
        choices: Vec<String>,
        answer: String,
    },
    /// `equation` is `lhs = rhs`; the attempt is the value of `variable`.
    Logic {
        equation: String,
        variable: String,
    },
    /// The attempt must equal `expression` evaluated under `bindings`.
    Math {
        expression: String,
        #[serde(default)]
        bindings: BTreeMap<String, f64>,
    },
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

fn parse_number(attempt: &str) -> Option<f64> {
    let attempt = attempt.trim();
    attempt
        .parse::<f64>()
        .ok()
        .or_else(|| equation::evaluate(attempt, &BTreeMap::new()).ok())
        .filter(|v| v.is_finite())
}

impl PuzzleKind {
    /// Short label used in certificates and status lines.
    pub fn category(&self) -> &'static str {
        match self {
            PuzzleKind::FreeText { .. } => "free-text",
            PuzzleKind::Numeric { .. } => "numeric",
            PuzzleKind::WordChoice { .. } => "word-choice",
            PuzzleKind::Logic { .. } => "logic",
            PuzzleKind::Math { .. } => "math",
        }
    }

    /// Whether `attempt` solves this puzzle. Unparseable input is simply wrong.
    pub fn accepts(&self, attempt: &str) -> bool {
        match self {
            PuzzleKind::FreeText { answer } => normalize(attempt) == normalize(answer),
            PuzzleKind::Numeric { value, tolerance } => match attempt.trim().parse::<f64>() {
                Ok(guess) => (guess - value).abs() < *tolerance,
                Err(_) => false,
            },
            PuzzleKind::WordChoice { choices, answer } => {
                let guess = normalize(attempt);
                choices.iter().any(|c| normalize(c) == guess) && guess == normalize(answer)
            }
            PuzzleKind::Logic { equation, variable } => match parse_number(attempt) {
                Some(value) => {
                    equation::equation_holds(equation, variable, value).unwrap_or(false)
                }
                None => false,
            },
            PuzzleKind::Math {
                expression,
                bindings,
            } => {
                let expected = equation::evaluate(expression, bindings);
                match (expected, parse_number(attempt)) {
                    (Ok(expected), Some(guess)) => approx_eq(expected, guess),
                    _ => false,
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Puzzle {
    id: u32,
    prompt: String,
    status: PuzzleStatus,
    hint: Hint,
    kind: PuzzleKind,
}

impl Puzzle {
    pub fn new(id: u32, prompt: impl Into<String>, hints: Vec<String>, kind: PuzzleKind) -> Self {
        Self {
            id,
            prompt: prompt.into(),
            status: PuzzleStatus::Unsolved,
            hint: Hint::new(hints),
            kind,
        }
    }

    /// Check an answer and advance the state machine.
    ///
    /// A wrong answer moves an unsolved puzzle to `Attempted`. A solved
    /// puzzle stays solved whatever the attempt.
    pub fn try_solve(&mut self, attempt: &str) -> bool {
        let correct = self.kind.accepts(attempt);
        if correct {
            self.status = PuzzleStatus::Solved;
        } else if self.status != PuzzleStatus::Solved {
            self.status = PuzzleStatus::Attempted;
        }
        correct
    }

    pub fn reset(&mut self) {
        self.status = PuzzleStatus::Unsolved;
        self.hint.reset_hints_used();
    }

    /// Restore a persisted status. Only used when rehydrating from a store.
    pub(crate) fn restore_status(&mut self, status: PuzzleStatus) {
        self.status = status;
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn status(&self) -> PuzzleStatus {
        self.status
    }

    pub fn is_solved(&self) -> bool {
        self.status == PuzzleStatus::Solved
    }

    pub fn kind(&self) -> &PuzzleKind {
        &self.kind
    }

    pub fn hint(&self) -> &Hint {
        &self.hint
    }

    pub fn hint_mut(&mut self) -> &mut Hint {
        &mut self.hint
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn free_text() -> Puzzle {
        Puzzle::new(
            1,
            "What has keys but opens no locks?",
            vec!["Think music".into()],
            PuzzleKind::FreeText {
                answer: "Piano".into(),
            },
        )
    }

    #[test]
    fn state_machine_moves_through_attempted_to_solved() {
        let mut puzzle = free_text();
        assert_eq!(puzzle.status(), PuzzleStatus::Unsolved);
        assert!(!puzzle.try_solve("guitar"));
        assert_eq!(puzzle.status(), PuzzleStatus::Attempted);
        assert!(puzzle.try_solve("  PIANO "));
        assert_eq!(puzzle.status(), PuzzleStatus::Solved);
    }

    #[test]
    fn solved_is_terminal_until_reset() {
        let mut puzzle = free_text();
        puzzle.try_solve("piano");
        assert!(!puzzle.try_solve("drum"));
        assert_eq!(puzzle.status(), PuzzleStatus::Solved);
        assert!(!puzzle.try_solve(""));
        assert_eq!(puzzle.status(), PuzzleStatus::Solved);

        puzzle.hint_mut().get_hint();
        puzzle.reset();
        assert_eq!(puzzle.status(), PuzzleStatus::Unsolved);
        assert_eq!(puzzle.hint().hints_used(), 0);
    }

    #[rstest]
    #[case("3.14159", true)]
    #[case(" 3.14161 ", true)]
    #[case("3.1418", false)]
    #[case("pi", false)]
    fn numeric_tolerance(#[case] attempt: &str, #[case] expected: bool) {
        let kind = PuzzleKind::Numeric {
            value: 3.14159,
            tolerance: EPSILON,
        };
        assert_eq!(kind.accepts(attempt), expected);
    }

    #[rstest]
    #[case("Red", true)]
    #[case("red ", true)]
    #[case("blue", false)]
    #[case("crimson", false)]
    fn word_choice(#[case] attempt: &str, #[case] expected: bool) {
        let kind = PuzzleKind::WordChoice {
            choices: vec!["red".into(), "blue".into(), "green".into()],
            answer: "RED".into(),
        };
        assert_eq!(kind.accepts(attempt), expected);
    }

    #[rstest]
    #[case("4", true)]
    #[case("8 / 2", true)]
    #[case("5", false)]
    #[case("four", false)]
    fn logic_substitutes_variable(#[case] attempt: &str, #[case] expected: bool) {
        let kind = PuzzleKind::Logic {
            equation: "2 * x + 3 = 11".into(),
            variable: "x".into(),
        };
        assert_eq!(kind.accepts(attempt), expected);
    }

    #[test]
    fn math_uses_bindings() {
        let mut bindings = BTreeMap::new();
        bindings.insert("a".to_string(), 6.0);
        bindings.insert("b".to_string(), 7.0);
        let kind = PuzzleKind::Math {
            expression: "a * b".into(),
            bindings,
        };
        assert!(kind.accepts("42"));
        assert!(!kind.accepts("41"));
        assert!(!kind.accepts("(42"));
    }

    #[test]
    fn deeply_nested_attempt_is_just_wrong() {
        let kind = PuzzleKind::Logic {
            equation: "2 * x + 3 = 11".into(),
            variable: "x".into(),
        };
        assert!(!kind.accepts(&format!("{}4", "-".repeat(20_000))));
        assert!(!kind.accepts(&format!("{}4{}", "(".repeat(20_000), ")".repeat(20_000))));
    }

    #[test]
    fn broken_equation_is_never_solved() {
        let mut puzzle = Puzzle::new(
            9,
            "broken",
            vec![],
            PuzzleKind::Logic {
                equation: "x +".into(),
                variable: "x".into(),
            },
        );
        assert!(!puzzle.try_solve("1"));
        assert_eq!(puzzle.status(), PuzzleStatus::Attempted);
    }

    #[test]
    fn kind_deserializes_from_tagged_toml() {
        let kind: PuzzleKind = toml::from_str("kind = \"numeric\"\nvalue = 12.5\n").unwrap();
        assert_eq!(
            kind,
            PuzzleKind::Numeric {
                value: 12.5,
                tolerance: EPSILON
            }
        );
    }
}
