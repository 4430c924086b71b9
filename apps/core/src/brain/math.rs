//! Safe arithmetic evaluation for the calculator rule.
//!
//! Grammar (lowest to highest precedence):
//!
//! ```text
//! expression := term (('+' | '-') term)*
//! term       := factor (('*' | '/') factor)*
//! factor     := ('+' | '-') factor | '(' expression ')' | number
//! ```
//!
//! Every parse function takes the immutable token slice and a position and
//! returns the value together with the position after what it consumed.
//! Arithmetic runs on `rust_decimal` rounded to [`SIGNIFICANT_DIGITS`].

use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

/// Working precision of every intermediate result.
pub const SIGNIFICANT_DIGITS: u32 = 18;

/// Longest expression the evaluator accepts.
pub const MAX_EXPRESSION_LEN: usize = 200;

/// Deepest parenthesis / unary-sign nesting the evaluator accepts.
pub const MAX_NESTING: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MathError {
    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("unexpected token at position {0}")]
    UnexpectedToken(usize),
    #[error("missing closing parenthesis")]
    MissingParen,
    #[error("division by zero")]
    DivisionByZero,
    #[error("result out of range")]
    Overflow,
    #[error("expression too long or too deeply nested")]
    TooComplex,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(Decimal),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

static WHITELIST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9\s+\-*/().]+$").expect("Invalid regex: math whitelist"));

static LEAD_IN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(what's|what’s|whats|what is|calculate|compute|solve|how much is)\s*")
        .expect("Invalid regex: math lead-in")
});

/// Pulls a candidate expression out of lowercase user input.
///
/// Strips a leading question phrase and a trailing `?`/`=`, maps `x` to `*`,
/// then applies the character whitelist. Returns `None` for anything that is
/// not made purely of math-safe characters or has no digit.
pub fn extract_expression(lower: &str) -> Option<String> {
    let body = LEAD_IN.replace(lower.trim(), "");
    let body = body.trim_end_matches(|c: char| c == '?' || c == '=' || c.is_whitespace());
    let normalized: String = body
        .chars()
        .map(|c| if c == 'x' || c == 'X' { '*' } else { c })
        .collect();

    if normalized.is_empty() || !WHITELIST.is_match(&normalized) {
        return None;
    }
    if !normalized.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(normalized.trim().to_string())
}

/// Splits an expression into tokens. Whitespace is skipped.
pub fn tokenize(input: &str) -> Result<Vec<Token>, MathError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => {
                i += 1;
                continue;
            }
            '+' => tokens.push(Token::Plus),
            '-' => tokens.push(Token::Minus),
            '*' => tokens.push(Token::Star),
            '/' => tokens.push(Token::Slash),
            '(' => tokens.push(Token::LParen),
            ')' => tokens.push(Token::RParen),
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let literal: String = chars[start..i].iter().collect();
                let value = Decimal::from_str(&literal)
                    .map_err(|_| MathError::InvalidNumber(literal.clone()))?;
                tokens.push(Token::Number(value));
                continue;
            }
            other => return Err(MathError::UnexpectedChar(other)),
        }
        i += 1;
    }

    Ok(tokens)
}

/// Evaluates an arithmetic expression.
pub fn evaluate(input: &str) -> Result<Decimal, MathError> {
    if input.len() > MAX_EXPRESSION_LEN {
        return Err(MathError::TooComplex);
    }
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(MathError::UnexpectedEnd);
    }

    let (value, pos) = expression(&tokens, 0, 0)?;
    if pos != tokens.len() {
        return Err(MathError::UnexpectedToken(pos));
    }
    Ok(normalize(round(value)?))
}

/// Renders a result as a plain decimal string without trailing zeros.
pub fn format_result(value: Decimal) -> String {
    normalize(value).to_string()
}

fn normalize(value: Decimal) -> Decimal {
    if value.is_zero() {
        Decimal::ZERO
    } else {
        value.normalize()
    }
}

/// Rounds to the working precision. Near `Decimal::MAX` rounding up leaves
/// the representable range, so those values are truncated instead.
fn round(value: Decimal) -> Result<Decimal, MathError> {
    if value.is_zero() {
        return Ok(Decimal::ZERO);
    }
    value
        .round_sf(SIGNIFICANT_DIGITS)
        .or_else(|| value.round_sf_with_strategy(SIGNIFICANT_DIGITS, RoundingStrategy::ToZero))
        .ok_or(MathError::Overflow)
}

fn expression(tokens: &[Token], pos: usize, depth: usize) -> Result<(Decimal, usize), MathError> {
    let (mut acc, mut pos) = term(tokens, pos, depth)?;
    loop {
        match tokens.get(pos) {
            Some(Token::Plus) => {
                let (rhs, next) = term(tokens, pos + 1, depth)?;
                acc = round(acc.checked_add(rhs).ok_or(MathError::Overflow)?)?;
                pos = next;
            }
            Some(Token::Minus) => {
                let (rhs, next) = term(tokens, pos + 1, depth)?;
                acc = round(acc.checked_sub(rhs).ok_or(MathError::Overflow)?)?;
                pos = next;
            }
            _ => return Ok((acc, pos)),
        }
    }
}

fn term(tokens: &[Token], pos: usize, depth: usize) -> Result<(Decimal, usize), MathError> {
    let (mut acc, mut pos) = factor(tokens, pos, depth)?;
    loop {
        match tokens.get(pos) {
            Some(Token::Star) => {
                let (rhs, next) = factor(tokens, pos + 1, depth)?;
                acc = round(acc.checked_mul(rhs).ok_or(MathError::Overflow)?)?;
                pos = next;
            }
            Some(Token::Slash) => {
                let (rhs, next) = factor(tokens, pos + 1, depth)?;
                if rhs.is_zero() {
                    return Err(MathError::DivisionByZero);
                }
                acc = round(acc.checked_div(rhs).ok_or(MathError::Overflow)?)?;
                pos = next;
            }
            _ => return Ok((acc, pos)),
        }
    }
}

fn factor(tokens: &[Token], pos: usize, depth: usize) -> Result<(Decimal, usize), MathError> {
    if depth > MAX_NESTING {
        return Err(MathError::TooComplex);
    }
    match tokens.get(pos) {
        Some(Token::Plus) => factor(tokens, pos + 1, depth + 1),
        Some(Token::Minus) => {
            let (value, next) = factor(tokens, pos + 1, depth + 1)?;
            Ok((-value, next))
        }
        Some(Token::LParen) => {
            let (value, next) = expression(tokens, pos + 1, depth + 1)?;
            match tokens.get(next) {
                Some(Token::RParen) => Ok((value, next + 1)),
                _ => Err(MathError::MissingParen),
            }
        }
        Some(Token::Number(value)) => Ok((round(*value)?, pos + 1)),
        Some(_) => Err(MathError::UnexpectedToken(pos)),
        None => Err(MathError::UnexpectedEnd),
    }
}
