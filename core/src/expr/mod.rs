//! Restricted arithmetic evaluator backing the `calculate` action.
//!
//! The argument handed to `calculate` is produced by the model, which may
//! itself be steered by untrusted search results, so the input is screened
//! character by character before any arithmetic happens. The accepted
//! grammar is:
//!
//! ```text
//! expr   := term (('+' | '-') term)*
//! term   := factor (('*' | '/') factor)*
//! factor := number | '(' expr ')'
//! ```
//!
//! Commas are thousands separators and are stripped. All arithmetic is `f64`.

mod flat;
#[cfg(test)]
mod proptests;

use flat::evaluate_flat;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error("disallowed character '{ch}' at position {position}")]
    DisallowedCharacter { ch: char, position: usize },

    #[error("mismatched parentheses")]
    MismatchedParentheses,

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("division by zero")]
    DivisionByZero,
}

/// Evaluates `expression` under the restricted grammar.
///
/// Parentheses are reduced innermost-first: the last `(` is paired with the
/// first `)` after it, the contents are evaluated as a flat expression and
/// the result is written back as text. This repeats until none remain.
/// A group must be delimited by operators, parentheses or the ends of the
/// expression; `2(3)` and `(1)(2)` are not implicit products.
pub fn evaluate(expression: &str) -> Result<f64, EvalError> {
    validate(expression)?;

    let mut expr: String = expression.chars().filter(|c| *c != ',').collect();

    while let Some(open) = expr.rfind('(') {
        let close = expr[open..]
            .find(')')
            .map(|offset| open + offset)
            .ok_or(EvalError::MismatchedParentheses)?;

        if !group_is_delimited(&expr, open, close) {
            return Err(EvalError::InvalidNumber(expression.trim().to_string()));
        }

        let value = evaluate_flat(&expr[open + 1..close])?;
        expr.replace_range(open..=close, &value.to_string());
    }

    if expr.contains(')') {
        return Err(EvalError::MismatchedParentheses);
    }

    evaluate_flat(&expr)
}

fn group_is_delimited(expr: &str, open: usize, close: usize) -> bool {
    let before = expr[..open].trim_end().chars().next_back();
    let after = expr[close + 1..].trim_start().chars().next();

    matches!(before, None | Some('(' | '+' | '-' | '*' | '/'))
        && matches!(after, None | Some(')' | '+' | '-' | '*' | '/'))
}

fn validate(expression: &str) -> Result<(), EvalError> {
    match expression
        .chars()
        .enumerate()
        .find(|(_, ch)| !is_allowed(*ch))
    {
        Some((position, ch)) => Err(EvalError::DisallowedCharacter { ch, position }),
        None => Ok(()),
    }
}

// Everything else, letters, underscores, brackets, quotes and backticks
// included, is rejected.
const fn is_allowed(ch: char) -> bool {
    matches!(
        ch,
        '0'..='9' | '.' | ',' | '+' | '-' | '*' | '/' | '(' | ')' | ' ' | '\t'
    )
}
