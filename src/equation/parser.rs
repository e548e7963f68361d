use std::collections::BTreeMap;

/// Deepest nesting of signs, parentheses and exponents accepted.
pub const MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error("unexpected character {0:?}")]
    UnexpectedChar(char),
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("unexpected trailing input at position {0}")]
    Trailing(usize),
    #[error("unbound variable \"{0}\"")]
    Unbound(String),
    #[error("result is not a finite number")]
    NotFinite,
    #[error("expression is nested too deeply")]
    TooDeep,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Op(char),
    Open,
    Close,
}

fn tokenize(input: &str) -> Result<Vec<Token>, EvalError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
        } else if c.is_ascii_digit() || c == '.' {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                i += 1;
            }
            let text: String = chars[start..i].iter().collect();
            let value = text.parse::<f64>().map_err(|_| EvalError::UnexpectedChar(c))?;
            tokens.push(Token::Number(value));
        } else if c.is_alphabetic() || c == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            tokens.push(Token::Ident(chars[start..i].iter().collect()));
        } else {
            let token = match c {
                '+' | '-' | '*' | '/' | '^' => Token::Op(c),
                '(' => Token::Open,
                ')' => Token::Close,
                other => return Err(EvalError::UnexpectedChar(other)),
            };
            tokens.push(token);
            i += 1;
        }
    }
    Ok(tokens)
}

/// Recursive-descent evaluator.
///
/// ```text
/// expr   := term (('+' | '-') term)*
/// term   := unary (('*' | '/') unary)*
/// unary  := '-' unary | '+' unary | power
/// power  := atom ('^' unary)?
/// atom   := number | ident | '(' expr ')'
/// ```
///
/// `^` is right-associative and binds tighter than unary minus, so `-2^2`
/// is `-4`.
struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    bindings: &'a BTreeMap<String, f64>,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn expr(&mut self) -> Result<f64, EvalError> {
        let mut value = self.term()?;
        while let Some(Token::Op(op @ ('+' | '-'))) = self.peek().cloned() {
            self.pos += 1;
            let rhs = self.term()?;
            value = if op == '+' { value + rhs } else { value - rhs };
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<f64, EvalError> {
        let mut value = self.unary()?;
        while let Some(Token::Op(op @ ('*' | '/'))) = self.peek().cloned() {
            self.pos += 1;
            let rhs = self.unary()?;
            value = if op == '*' { value * rhs } else { value / rhs };
        }
        Ok(value)
    }

    fn power(&mut self) -> Result<f64, EvalError> {
        let base = self.atom()?;
        if let Some(Token::Op('^')) = self.peek() {
            self.pos += 1;
            let exponent = self.unary()?;
            return Ok(base.powf(exponent));
        }
        Ok(base)
    }

    /// Every recursive path passes through here, so this is where nesting
    /// is bounded.
    fn unary(&mut self) -> Result<f64, EvalError> {
        if self.depth >= MAX_DEPTH {
            return Err(EvalError::TooDeep);
        }
        self.depth += 1;
        let value = self.signed();
        self.depth -= 1;
        value
    }

    fn signed(&mut self) -> Result<f64, EvalError> {
        match self.peek() {
            Some(Token::Op('-')) => {
                self.pos += 1;
                Ok(-self.unary()?)
            }
            Some(Token::Op('+')) => {
                self.pos += 1;
                self.unary()
            }
            _ => self.power(),
        }
    }

    fn atom(&mut self) -> Result<f64, EvalError> {
        match self.next() {
            Some(Token::Number(n)) => Ok(n),
            Some(Token::Ident(name)) => self
                .bindings
                .get(&name)
                .copied()
                .ok_or(EvalError::Unbound(name)),
            Some(Token::Open) => {
                let value = self.expr()?;
                match self.next() {
                    Some(Token::Close) => Ok(value),
                    Some(Token::Op(c)) => Err(EvalError::UnexpectedChar(c)),
                    Some(_) => Err(EvalError::Trailing(self.pos - 1)),
                    None => Err(EvalError::UnexpectedEnd),
                }
            }
            Some(Token::Op(c)) => Err(EvalError::UnexpectedChar(c)),
            Some(Token::Close) => Err(EvalError::UnexpectedChar(')')),
            None => Err(EvalError::UnexpectedEnd),
        }
    }
}

/// Evaluate `input` with every identifier looked up in `bindings`.
pub fn evaluate(input: &str, bindings: &BTreeMap<String, f64>) -> Result<f64, EvalError> {
    let mut parser = Parser {
        tokens: tokenize(input)?,
        pos: 0,
        depth: 0,
        bindings,
    };
    let value = parser.expr()?;
    if parser.pos < parser.tokens.len() {
        return Err(EvalError::Trailing(parser.pos));
    }
    if !value.is_finite() {
        return Err(EvalError::NotFinite);
    }
    Ok(value)
}

/// Evaluate with a single free variable bound to `value`.
pub fn evaluate_with(input: &str, variable: &str, value: f64) -> Result<f64, EvalError> {
    let mut bindings = BTreeMap::new();
    bindings.insert(variable.to_string(), value);
    evaluate(input, &bindings)
}
