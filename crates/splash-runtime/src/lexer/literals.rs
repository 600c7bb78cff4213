//! Literal classification for the lexer

use super::LexError;
use crate::value::Value;

const NUMBER_START: &str = "-0123456789";

/// Classify a piece as a literal, if it is one
///
/// Returns `Ok(None)` when the piece is not a literal (it may still be a
/// keyword). Numeric-looking pieces that fail to parse are errors.
pub(super) fn literal(text: &str, line: u32) -> Result<Option<Value>, LexError> {
    let Some(first) = text.chars().next() else {
        return Ok(None);
    };

    if first == '"' {
        return Ok(Some(string(text)));
    }
    if NUMBER_START.contains(first) {
        return number(text, line).map(Some);
    }
    Ok(boolean(text))
}

/// Parse a single literal value, rejecting keywords
///
/// Used for values supplied from outside a program, such as the input value.
pub fn parse_value(text: &str) -> Result<Value, LexError> {
    let text = text.trim();
    literal(text, 1)?.ok_or_else(|| LexError::UnknownSyntax {
        line: 1,
        text: text.to_string(),
    })
}

/// Strip the first two double quotes
fn string(text: &str) -> Value {
    let mut removed = 0;
    let value: String = text
        .chars()
        .filter(|&c| {
            if c == '"' && removed < 2 {
                removed += 1;
                false
            } else {
                true
            }
        })
        .collect();
    Value::String(value)
}

/// A number is a float if it contains `.` or `f`, otherwise an integer
fn number(text: &str, line: u32) -> Result<Value, LexError> {
    let invalid = || LexError::InvalidNumber {
        line,
        text: text.to_string(),
    };

    if text.contains('.') || text.contains('f') {
        text.parse::<f64>().map(Value::Float).map_err(|_| invalid())
    } else {
        text.parse::<i64>().map(Value::Int).map_err(|_| invalid())
    }
}

fn boolean(text: &str) -> Option<Value> {
    match text {
        "TRUE" => Some(Value::Bool(true)),
        "FALSE" => Some(Value::Bool(false)),
        _ => None,
    }
}
