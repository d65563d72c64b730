//! Parser for the restricted literal syntax that CSV exports use for nested columns.
//!
//! Cells such as `[{'name': 'Phy', 'amount': 120}]` or `{'Str': 'D', 'Dex': 'C'}` are written
//! with single-quoted strings and `None`/`True`/`False` constants, so they are not JSON. This
//! module parses that syntax with a PEST grammar into a [`serde_json::Value`]. Nothing is ever
//! evaluated: names, calls and operators are syntax errors.

use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
use serde_json::{Map, Number, Value};
use thiserror::Error;

/// PEST parser for the literal grammar.
#[derive(Parser)]
#[grammar = "normalize/literal.pest"]
pub struct LiteralParser;

/// Errors produced while parsing a literal.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LiteralError {
    #[error("Literal syntax error: {0}")]
    Syntax(String),

    #[error("Unhashable mapping key: {0}")]
    UnhashableKey(String),

    #[error("Number out of range: {0}")]
    NumberOutOfRange(String),
}

/// Parses `input` as a single literal value.
pub fn parse_literal(input: &str) -> Result<Value, LiteralError> {
    let mut pairs = LiteralParser::parse(Rule::literal, input)
        .map_err(|e| LiteralError::Syntax(e.to_string()))?;

    let literal = pairs
        .next()
        .ok_or_else(|| LiteralError::Syntax("empty input".to_string()))?;
    let value = literal
        .into_inner()
        .next()
        .ok_or_else(|| LiteralError::Syntax("missing value".to_string()))?;

    build_value(value)
}

fn build_value(pair: Pair<Rule>) -> Result<Value, LiteralError> {
    match pair.as_rule() {
        Rule::none => Ok(Value::Null),
        Rule::boolean => Ok(Value::Bool(pair.as_str() == "True")),
        Rule::number => parse_number(pair.as_str()),
        Rule::string => {
            let inner = pair
                .into_inner()
                .next()
                .ok_or_else(|| LiteralError::Syntax("unterminated string".to_string()))?;
            Ok(Value::String(unescape(inner.as_str())))
        }
        Rule::list | Rule::tuple => pair
            .into_inner()
            .map(build_value)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Rule::dict => {
            let mut map = Map::new();
            for entry in pair.into_inner() {
                let mut parts = entry.into_inner();
                let (key, value) = match (parts.next(), parts.next()) {
                    (Some(key), Some(value)) => (key, value),
                    _ => return Err(LiteralError::Syntax("incomplete mapping entry".to_string())),
                };
                let key = key_string(build_value(key)?)?;
                map.insert(key, build_value(value)?);
            }
            Ok(Value::Object(map))
        }
        rule => Err(LiteralError::Syntax(format!("unexpected rule: {:?}", rule))),
    }
}

fn parse_number(text: &str) -> Result<Value, LiteralError> {
    let is_float = text.contains(['.', 'e', 'E']);
    if !is_float {
        if let Ok(i) = text.parse::<i64>() {
            return Ok(Value::Number(i.into()));
        }
        if let Ok(u) = text.trim_start_matches('+').parse::<u64>() {
            return Ok(Value::Number(u.into()));
        }
    }

    text.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| LiteralError::NumberOutOfRange(text.to_string()))
}

/// Mapping keys become strings the way their constants print.
fn key_string(key: Value) -> Result<String, LiteralError> {
    match key {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(true) => Ok("True".to_string()),
        Value::Bool(false) => Ok("False".to_string()),
        Value::Null => Ok("None".to_string()),
        other => Err(LiteralError::UnhashableKey(other.to_string())),
    }
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(next) = chars.next() else {
            out.push('\\');
            break;
        };
        match next {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            '0' => out.push('\0'),
            'a' => out.push('\u{07}'),
            'b' => out.push('\u{08}'),
            'f' => out.push('\u{0C}'),
            'v' => out.push('\u{0B}'),
            '\\' | '\'' | '"' => out.push(next),
            '\n' => {}
            'x' => push_code_point(&mut out, &mut chars, 2, next),
            'u' => push_code_point(&mut out, &mut chars, 4, next),
            'U' => push_code_point(&mut out, &mut chars, 8, next),
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }
    out
}

fn push_code_point(
    out: &mut String,
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    digits: usize,
    marker: char,
) {
    let mut hex = String::with_capacity(digits);
    while hex.len() < digits {
        match chars.peek() {
            Some(c) if c.is_ascii_hexdigit() => {
                hex.push(*c);
                chars.next();
            }
            _ => break,
        }
    }

    let decoded = (hex.len() == digits)
        .then(|| u32::from_str_radix(&hex, 16).ok())
        .flatten()
        .and_then(char::from_u32);

    match decoded {
        Some(c) => out.push(c),
        None => {
            out.push('\\');
            out.push(marker);
            out.push_str(&hex);
        }
    }
}
