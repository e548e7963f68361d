pub mod parser;

pub use parser::{evaluate, evaluate_with, EvalError};

/// Absolute tolerance used by every numeric comparison in answer checking.
pub const EPSILON: f64 = 1e-4;

pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

/// Solve check for `lhs = rhs` with `variable` bound to `value`.
pub fn equation_holds(equation: &str, variable: &str, value: f64) -> Result<bool, EvalError> {
    let mut sides = equation.splitn(2, '=');
    let lhs = sides.next().unwrap_or_default();
    let rhs = sides.next().ok_or(EvalError::UnexpectedEnd)?;
    if rhs.contains('=') {
        return Err(EvalError::UnexpectedChar('='));
    }
    let left = evaluate_with(lhs, variable, value)?;
    let right = evaluate_with(rhs, variable, value)?;
    Ok(approx_eq(left, right))
}
