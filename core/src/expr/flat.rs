use super::EvalError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Operator {
    Add,
    Sub,
    Mul,
    Div,
}

impl Operator {
    fn from_char(ch: char) -> Option<Self> {
        match ch {
            '+' => Some(Self::Add),
            '-' => Some(Self::Sub),
            '*' => Some(Self::Mul),
            '/' => Some(Self::Div),
            _ => None,
        }
    }

    fn is_multiplicative(self) -> bool {
        matches!(self, Self::Mul | Self::Div)
    }

    fn is_sign(self) -> bool {
        matches!(self, Self::Add | Self::Sub)
    }

    fn apply(self, left: f64, right: f64) -> Result<f64, EvalError> {
        match self {
            Self::Add => Ok(left + right),
            Self::Sub => Ok(left - right),
            Self::Mul => Ok(left * right),
            Self::Div if right == 0.0 => Err(EvalError::DivisionByZero),
            Self::Div => Ok(left / right),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Token {
    Number(f64),
    Op(Operator),
}

/// Evaluates an expression that contains no parentheses.
pub(crate) fn evaluate_flat(expr: &str) -> Result<f64, EvalError> {
    let tokens = tokenize(expr)?;
    let tokens = fold(tokens, Operator::is_multiplicative)?;
    let tokens = fold(tokens, |_| true)?;

    match tokens.as_slice() {
        [Token::Number(value)] => Ok(*value),
        _ => Err(EvalError::InvalidNumber(expr.trim().to_string())),
    }
}

/// Splits on `+ - * /`, keeping the operators as their own pieces.
fn split_operators(expr: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;

    for (i, ch) in expr.char_indices() {
        if Operator::from_char(ch).is_some() {
            pieces.push(&expr[start..i]);
            pieces.push(&expr[i..i + ch.len_utf8()]);
            start = i + ch.len_utf8();
        }
    }
    pieces.push(&expr[start..]);

    pieces
}

/// Produces a strictly alternating `Number (Op Number)*` sequence.
///
/// A `+` or `-` where a number is expected is the sign of the literal that
/// follows it; at most one sign is accepted per literal.
pub(crate) fn tokenize(expr: &str) -> Result<Vec<Token>, EvalError> {
    let mut tokens = Vec::new();
    let mut expecting_number = true;
    let mut negative: Option<bool> = None;

    for piece in split_operators(expr) {
        let mut chars = piece.chars();
        if let (Some(ch), None) = (chars.next(), chars.next())
            && let Some(op) = Operator::from_char(ch)
        {
            if !expecting_number {
                tokens.push(Token::Op(op));
                expecting_number = true;
            } else if op.is_sign() && negative.is_none() {
                negative = Some(op == Operator::Sub);
            } else {
                return Err(EvalError::InvalidNumber(piece.to_string()));
            }
            continue;
        }

        let literal = piece.trim();
        if literal.is_empty() {
            continue;
        }

        let value: f64 = literal
            .parse()
            .map_err(|_| EvalError::InvalidNumber(literal.to_string()))?;
        let value = if negative.take() == Some(true) {
            -value
        } else {
            value
        };

        tokens.push(Token::Number(value));
        expecting_number = false;
    }

    if expecting_number {
        return Err(EvalError::InvalidNumber(expr.trim().to_string()));
    }

    Ok(tokens)
}

/// Folds every `(Number, Op, Number)` triple whose operator is selected,
/// left to right, re-examining the same position after each fold.
fn fold(
    mut tokens: Vec<Token>,
    selected: impl Fn(Operator) -> bool,
) -> Result<Vec<Token>, EvalError> {
    let mut i = 1;

    while i + 1 < tokens.len() {
        match (tokens[i - 1], tokens[i], tokens[i + 1]) {
            (Token::Number(left), Token::Op(op), Token::Number(right)) if selected(op) => {
                tokens[i - 1] = Token::Number(op.apply(left, right)?);
                tokens.drain(i..=i + 1);
            }
            _ => i += 2,
        }
    }

    Ok(tokens)
}
