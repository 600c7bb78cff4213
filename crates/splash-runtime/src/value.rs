//! Runtime values
//!
//! Values are the literal operands a program pushes onto the stack. They are
//! small and cloned freely; there is no shared ownership.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A literal operand
///
/// Two values are equal only when they have the same variant and the same
/// payload, so `Int(1)` and `Float(1.0)` compare unequal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit float
    Float(f64),
    /// UTF-8 string
    String(String),
    /// Boolean
    Bool(bool),
}

impl Value {
    /// Create a string value
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    /// Name of the value's type, as used in diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "INT",
            Value::Float(_) => "FLOAT",
            Value::String(_) => "STRING",
            Value::Bool(_) => "BOOLEAN",
        }
    }

}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) => write_float(f, *n),
            Value::String(s) => write!(f, "{}", s),
            Value::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// Shortest round-trip form; exponent notation outside `1e-4 <= |n| < 1e6`
///
/// Exponents carry a sign and at least two digits (`1e+21`, `1e-05`).
/// Infinities print as `+Inf` / `-Inf`.
fn write_float(f: &mut fmt::Formatter<'_>, n: f64) -> fmt::Result {
    if n.is_nan() {
        return f.write_str("NaN");
    }
    if n.is_infinite() {
        return f.write_str(if n > 0.0 { "+Inf" } else { "-Inf" });
    }

    let scientific = format!("{:e}", n);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((mantissa, exponent)) => (mantissa, exponent.parse::<i32>().unwrap_or(0)),
        None => return write!(f, "{}", n),
    };

    if n != 0.0 && !(-4..6).contains(&exponent) {
        let sign = if exponent < 0 { '-' } else { '+' };
        write!(f, "{}e{}{:02}", mantissa, sign, exponent.abs())
    } else {
        write!(f, "{}", n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Value::Int(-7).to_string(), "-7");
        assert_eq!(Value::Float(5.0).to_string(), "5");
        assert_eq!(Value::Float(2.5).to_string(), "2.5");
        assert_eq!(Value::string("hi there").to_string(), "hi there");
        assert_eq!(Value::Bool(true).to_string(), "true");
    }

    #[test]
    fn test_float_display_uses_exponent_outside_fixed_range() {
        assert_eq!(Value::Float(1.0e21).to_string(), "1e+21");
        assert_eq!(Value::Float(1.0e6).to_string(), "1e+06");
        assert_eq!(Value::Float(123456789.0).to_string(), "1.23456789e+08");
        assert_eq!(Value::Float(999999.5).to_string(), "999999.5");
        assert_eq!(Value::Float(0.00001).to_string(), "1e-05");
        assert_eq!(Value::Float(-2.5e-7).to_string(), "-2.5e-07");
        assert_eq!(Value::Float(0.0001).to_string(), "0.0001");
        assert_eq!(Value::Float(1.5e100).to_string(), "1.5e+100");
        assert_eq!(Value::Float(0.0).to_string(), "0");
    }

    #[test]
    fn test_float_display_non_finite() {
        assert_eq!(Value::Float(f64::INFINITY).to_string(), "+Inf");
        assert_eq!(Value::Float(f64::NEG_INFINITY).to_string(), "-Inf");
        assert_eq!(Value::Float(f64::NAN).to_string(), "NaN");
    }

    #[test]
    fn test_equality_is_type_strict() {
        assert_ne!(Value::Int(1), Value::Float(1.0));
        assert_ne!(Value::string("1"), Value::Int(1));
        assert_eq!(Value::string("a"), Value::from("a"));
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Value::Int(0).type_name(), "INT");
        assert_eq!(Value::Float(0.0).type_name(), "FLOAT");
        assert_eq!(Value::string("").type_name(), "STRING");
        assert_eq!(Value::Bool(false).type_name(), "BOOLEAN");
    }
}
