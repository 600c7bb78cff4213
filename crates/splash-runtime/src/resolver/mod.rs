//! Control-flow resolution
//!
//! A single forward pass over the token sequence that builds the label table
//! and patches `IF` / `FUNC` tokens with the index of their end marker. The
//! first matching end marker wins; blocks do not nest.

use crate::error::RuntimeError;
use crate::program::Program;
use crate::stack::Stack;
use crate::token::{Token, TokenKind};
use std::collections::HashMap;

/// Resolve a token sequence into a runnable program
///
/// The returned program's stack holds the seed value `Int 0`.
pub fn resolve(tokens: Vec<Token>) -> Result<Program, RuntimeError> {
    Resolver::new(tokens).resolve()
}

/// Resolver state
pub struct Resolver {
    program: Program,
}

impl Resolver {
    /// Create a resolver over the given tokens
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            program: Program::new(tokens, HashMap::new(), Stack::new()),
        }
    }

    /// Run the resolution pass
    pub fn resolve(mut self) -> Result<Program, RuntimeError> {
        for index in 0..self.program.tokens.len() {
            match self.program.tokens[index].kind() {
                TokenKind::Mark => self.register_label(index)?,
                TokenKind::Func => {
                    self.register_label(index)?;
                    let end = self.find_next(index, TokenKind::EndFunc);
                    self.program.tokens[index] = Token::Func(end);
                }
                TokenKind::If => {
                    let end = self.find_next(index, TokenKind::EndIf);
                    self.program.tokens[index] = Token::If(end);
                }
                _ => {}
            }
        }

        self.program.stack = Stack::seeded();
        Ok(self.program)
    }

    /// Map the label following `index` to the label token's own index
    fn register_label(&mut self, index: usize) -> Result<(), RuntimeError> {
        let label = self.program.label_operand(index)?.to_string();
        tracing::debug!(%label, target = index + 1, "label resolved");
        self.program.labels.insert(label, index + 1);
        Ok(())
    }

    /// First token of `kind` at or after `index`
    fn find_next(&self, index: usize, kind: TokenKind) -> Option<usize> {
        let found = self.program.tokens[index..]
            .iter()
            .position(|token| token.kind() == kind)
            .map(|offset| index + offset);
        if found.is_none() {
            tracing::warn!(
                index,
                "{} has no matching {}",
                self.program.tokens[index].kind(),
                kind
            );
        }
        found
    }
}
