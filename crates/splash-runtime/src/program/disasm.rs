//! Program disassembler
//!
//! Renders a resolved program as a human-readable listing. Used for
//! debugging, testing, and `splash disasm` output.

use super::Program;
use crate::token::Token;
use crate::value::Value;
use std::fmt::Write;

/// Disassemble a program to human-readable format
///
/// # Format
/// ```text
/// === Labels ===
/// loop -> 0002
///
/// === Instructions ===
/// 0000  INT 3
/// 0001  MARK
/// 0002  STRING "loop"
/// 0003  IF -> 0006
/// ```
pub fn disassemble(program: &Program) -> String {
    let mut output = String::new();

    let labels = program.sorted_labels();
    if !labels.is_empty() {
        let _ = writeln!(output, "=== Labels ===");
        for (name, index) in labels {
            let _ = writeln!(output, "{} -> {:04}", name, index);
        }
        let _ = writeln!(output);
    }

    let _ = writeln!(output, "=== Instructions ===");
    for (index, token) in program.tokens.iter().enumerate() {
        let _ = writeln!(output, "{:04}  {}", index, format_token(token));
    }

    output
}

/// Single listing line body for a token
fn format_token(token: &Token) -> String {
    let kind = token.kind();
    match token {
        Token::Literal(Value::String(s)) => format!("{} {:?}", kind, s),
        Token::Literal(value) => format!("{} {}", kind, value),
        Token::If(target) | Token::Func(target) => match target {
            Some(index) => format!("{} -> {:04}", kind, index),
            None => format!("{} -> <none>", kind),
        },
        _ => kind.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::resolve;

    #[test]
    fn test_disassemble_without_labels() {
        let program = resolve(vec![Token::int(1), Token::float(2.5), Token::Add]).unwrap();
        assert_eq!(
            disassemble(&program),
            "=== Instructions ===\n0000  INT 1\n0001  FLOAT 2.5\n0002  ADD\n"
        );
    }

    #[test]
    fn test_disassemble_targets() {
        let program = resolve(vec![
            Token::If(None),
            Token::EndIf,
            Token::Func(None),
            Token::string("f"),
        ])
        .unwrap();
        let text = disassemble(&program);
        assert!(text.starts_with("=== Labels ===\nf -> 0003\n\n"));
        assert!(text.contains("0000  IF -> 0001\n"));
        assert!(text.contains("0002  FUNC -> <none>\n"));
        assert!(text.contains("0003  STRING \"f\"\n"));
    }
}
