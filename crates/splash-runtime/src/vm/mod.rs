//! Stack-based virtual machine
//!
//! Interprets a resolved [`Program`] in place. The instruction pointer walks
//! the token sequence; after every instruction it advances by one, so a jump
//! to index `t` resumes execution at `t + 1`. There is no call stack:
//! functions are entered and left with explicit `GOTO`s.

pub mod arith;

use crate::error::RuntimeError;
use crate::output::{stdout_writer, OutputWriter};
use crate::program::Program;
use crate::token::{Token, TokenKind};
use crate::value::Value;
use arith::{ArithError, BinaryOp};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::io::Write;

/// Execution options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecOptions {
    /// Emit the stack and the next instruction before every dispatch
    pub trace: bool,
    /// Fail on `GOTO` to an undefined label instead of jumping to index 0
    pub strict_labels: bool,
}

/// Where execution continues after an instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    /// Next token
    Next,
    /// Token after the given index
    Jump(usize),
    /// Stop the loop
    Halt,
}

/// Virtual machine state
pub struct VM<'p> {
    /// Program being executed (stack and labels are mutated in place)
    program: &'p mut Program,
    /// Value pushed by `INPUT`
    input: Value,
    /// Instruction pointer
    ip: usize,
    options: ExecOptions,
    /// Output writer for `PRINT` / `PRINTLN` (defaults to stdout)
    output_writer: OutputWriter,
    /// Undefined labels already warned about
    reported_labels: HashSet<String>,
}

impl<'p> VM<'p> {
    /// Create a VM over a resolved program
    pub fn new(program: &'p mut Program, input: Value) -> Self {
        Self {
            program,
            input,
            ip: 0,
            options: ExecOptions::default(),
            output_writer: stdout_writer(),
            reported_labels: HashSet::new(),
        }
    }

    /// Set execution options
    pub fn with_options(mut self, options: ExecOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the output writer
    pub fn set_output_writer(&mut self, writer: OutputWriter) {
        self.output_writer = writer;
    }

    /// Run until `FIN` or the end of the token sequence
    ///
    /// Returns the popped top of stack, or `None` if the stack is empty.
    pub fn run(&mut self) -> Result<Option<Value>, RuntimeError> {
        while self.ip < self.program.tokens.len() {
            let index = self.ip;

            if self.options.trace {
                tracing::trace!("STACK {}", self.program.stack);
                tracing::trace!("TOKEN {} {}", index, self.program.tokens[index]);
            }

            match self.step(index)? {
                Flow::Next => self.ip += 1,
                Flow::Jump(target) => self.ip = target + 1,
                Flow::Halt => break,
            }
        }

        Ok(self.program.stack.pop())
    }

    /// Execute the instruction at `index`
    fn step(&mut self, index: usize) -> Result<Flow, RuntimeError> {
        let flow = match &self.program.tokens[index] {
            Token::Literal(value) => {
                let value = value.clone();
                self.program.stack.push(value);
                Flow::Next
            }
            Token::Goto => self.goto(index)?,
            Token::Mark => {
                let label = self.program.label_operand(index)?.to_string();
                self.program.labels.insert(label, index + 1);
                Flow::Jump(index + 1)
            }
            Token::If(target) => {
                let target = *target;
                let a = self.pop(index)?;
                let b = self.pop(index)?;
                if a == b {
                    Flow::Next
                } else {
                    Flow::Jump(target.ok_or(RuntimeError::MissingControlTarget {
                        index,
                        kind: TokenKind::If,
                    })?)
                }
            }
            Token::Func(target) => Flow::Jump(target.ok_or(RuntimeError::MissingControlTarget {
                index,
                kind: TokenKind::Func,
            })?),
            Token::EndIf | Token::EndFunc => Flow::Next,
            Token::Dup => {
                let value = self.peek(index)?.clone();
                self.program.stack.push(value);
                Flow::Next
            }
            Token::Drop => {
                self.pop(index)?;
                Flow::Next
            }
            Token::Pick => {
                let count = self.program.count_operand(index)?;
                let value = self
                    .program
                    .stack
                    .peek_nth(count)
                    .cloned()
                    .ok_or(RuntimeError::StackUnderflow { index })?;
                self.program.stack.push(value);
                Flow::Jump(index + 1)
            }
            Token::Roll => {
                let count = self.program.count_operand(index)?;
                let value = self
                    .program
                    .stack
                    .remove_nth(count)
                    .ok_or(RuntimeError::StackUnderflow { index })?;
                self.program.stack.push(value);
                Flow::Jump(index + 1)
            }
            Token::Fin => Flow::Halt,
            Token::Add => self.binary(index, BinaryOp::Add)?,
            Token::Sub => self.binary(index, BinaryOp::Sub)?,
            Token::Mul => self.binary(index, BinaryOp::Mul)?,
            Token::Div => self.binary(index, BinaryOp::Div)?,
            Token::Hash => {
                let digest = match self.pop(index)? {
                    Value::String(s) => format!("{:x}", Sha256::digest(s.as_bytes())),
                    other => {
                        return Err(RuntimeError::TypeMismatch {
                            index,
                            msg: format!("HASH expects STRING, found {}", other.type_name()),
                        })
                    }
                };
                self.program.stack.push(Value::String(digest));
                Flow::Next
            }
            Token::Input => {
                self.program.stack.push(self.input.clone());
                Flow::Next
            }
            Token::Print => {
                let text = self.peek(index)?.to_string();
                self.write_output(index, &text, false)?;
                Flow::Next
            }
            Token::Println => {
                let text = self.peek(index)?.to_string();
                self.write_output(index, &text, true)?;
                Flow::Next
            }
        };
        Ok(flow)
    }

    /// Jump to the label named by the next token
    fn goto(&mut self, index: usize) -> Result<Flow, RuntimeError> {
        let label = self.program.label_operand(index)?;
        if let Some(&target) = self.program.labels.get(label) {
            return Ok(Flow::Jump(target));
        }

        if self.options.strict_labels {
            return Err(RuntimeError::UnresolvedLabel {
                index,
                label: label.to_string(),
            });
        }

        // Undefined labels behave like a jump to index 0, so execution
        // resumes at token 1. Warn once per label.
        if !self.reported_labels.contains(label) {
            tracing::warn!(index, %label, "GOTO to undefined label, jumping to index 0");
            let label = label.to_string();
            self.reported_labels.insert(label);
        }
        Ok(Flow::Jump(0))
    }

    /// Pop two operands and push `second op first`
    fn binary(&mut self, index: usize, op: BinaryOp) -> Result<Flow, RuntimeError> {
        let rhs = self.pop(index)?;
        let lhs = self.pop(index)?;
        let result = arith::apply(op, &lhs, &rhs).map_err(|e| match e {
            ArithError::NotNumeric { op, found } => RuntimeError::TypeMismatch {
                index,
                msg: format!("{} expects INT or FLOAT operands, found {}", op, found),
            },
            ArithError::DivisionByZero => RuntimeError::ArithmeticError {
                index,
                msg: "integer division by zero".to_string(),
            },
        })?;
        self.program.stack.push(result);
        Ok(Flow::Next)
    }

    fn pop(&mut self, index: usize) -> Result<Value, RuntimeError> {
        self.program
            .stack
            .pop()
            .ok_or(RuntimeError::StackUnderflow { index })
    }

    fn peek(&self, index: usize) -> Result<&Value, RuntimeError> {
        self.program
            .stack
            .peek()
            .ok_or(RuntimeError::StackUnderflow { index })
    }

    /// Write and flush so output interleaves in program order
    fn write_output(&self, index: usize, text: &str, newline: bool) -> Result<(), RuntimeError> {
        let mut out = self.output_writer.lock().unwrap_or_else(|e| e.into_inner());
        let result = if newline {
            writeln!(out, "{}", text)
        } else {
            write!(out, "{}", text)
        };
        result
            .and_then(|_| out.flush())
            .map_err(|e| RuntimeError::IoError {
                index,
                message: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{buffer_contents, buffer_writer};
    use crate::resolver::resolve;
    use pretty_assertions::assert_eq;

    fn execute(tokens: Vec<Token>) -> (Result<Option<Value>, RuntimeError>, String, Program) {
        let mut program = resolve(tokens).expect("resolution failed");
        let (writer, buffer) = buffer_writer();
        let result = {
            let mut vm = VM::new(&mut program, Value::Int(-1));
            vm.set_output_writer(writer);
            vm.run()
        };
        (result, buffer_contents(&buffer), program)
    }

    #[test]
    fn test_literal_is_result() {
        let (result, _, _) = execute(vec![Token::int(42)]);
        assert_eq!(result, Ok(Some(Value::Int(42))));
    }

    #[test]
    fn test_empty_program_returns_seed() {
        let (result, _, program) = execute(Vec::new());
        assert_eq!(result, Ok(Some(Value::Int(0))));
        assert!(program.stack.is_empty());
    }

    #[test]
    fn test_no_value_when_stack_emptied() {
        let (result, _, _) = execute(vec![Token::Drop]);
        assert_eq!(result, Ok(None));
    }

    #[test]
    fn test_drop_past_seed_underflows() {
        let (result, _, _) = execute(vec![Token::Drop, Token::Drop]);
        assert_eq!(result, Err(RuntimeError::StackUnderflow { index: 1 }));
    }

    #[test]
    fn test_sub_and_div_order() {
        let (result, _, _) = execute(vec![Token::int(10), Token::int(3), Token::Sub]);
        assert_eq!(result, Ok(Some(Value::Int(7))));
        let (result, _, _) = execute(vec![Token::int(10), Token::int(3), Token::Div]);
        assert_eq!(result, Ok(Some(Value::Int(3))));
    }

    #[test]
    fn test_division_by_zero() {
        let (result, _, _) = execute(vec![Token::int(1), Token::int(0), Token::Div]);
        assert!(matches!(
            result,
            Err(RuntimeError::ArithmeticError { index: 2, .. })
        ));
    }

    #[test]
    fn test_arithmetic_type_mismatch() {
        let (result, _, _) = execute(vec![Token::string("a"), Token::int(1), Token::Add]);
        assert!(matches!(result, Err(RuntimeError::TypeMismatch { index: 2, .. })));
    }

    #[test]
    fn test_hash_empty_string() {
        let (result, _, _) = execute(vec![Token::string(""), Token::Hash]);
        assert_eq!(
            result,
            Ok(Some(Value::string(
                "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
            )))
        );
    }

    #[test]
    fn test_hash_requires_string() {
        let (result, _, _) = execute(vec![Token::int(1), Token::Hash]);
        assert!(matches!(result, Err(RuntimeError::TypeMismatch { index: 1, .. })));
    }

    #[test]
    fn test_if_equal_runs_body() {
        let (result, output, _) = execute(vec![
            Token::int(1),
            Token::int(1),
            Token::If(None),
            Token::Println,
            Token::EndIf,
            Token::Fin,
        ]);
        // body prints the seed left under the popped operands
        assert_eq!(output, "0\n");
        assert_eq!(result, Ok(Some(Value::Int(0))));
    }

    #[test]
    fn test_if_unequal_skips_body() {
        let (_, output, _) = execute(vec![
            Token::int(1),
            Token::int(2),
            Token::If(None),
            Token::Println,
            Token::EndIf,
            Token::Fin,
        ]);
        assert_eq!(output, "");
    }

    #[test]
    fn test_if_compares_types() {
        let (_, output, _) = execute(vec![
            Token::int(1),
            Token::float(1.0),
            Token::If(None),
            Token::string("same"),
            Token::Println,
            Token::EndIf,
        ]);
        assert_eq!(output, "");
    }

    #[test]
    fn test_if_without_endif_fails_only_when_jumping() {
        let (result, _, _) = execute(vec![Token::int(1), Token::int(2), Token::If(None)]);
        assert_eq!(
            result,
            Err(RuntimeError::MissingControlTarget {
                index: 2,
                kind: TokenKind::If
            })
        );

        let (result, _, _) = execute(vec![Token::int(1), Token::int(1), Token::If(None)]);
        assert_eq!(result, Ok(Some(Value::Int(0))));
    }

    #[test]
    fn test_pick_and_roll() {
        let abc = || vec![Token::string("A"), Token::string("B"), Token::string("C")];

        let mut tokens = abc();
        tokens.extend([Token::Pick, Token::int(3), Token::Fin]);
        let (result, _, program) = execute(tokens);
        assert_eq!(result, Ok(Some(Value::string("A"))));
        assert_eq!(
            program.stack.as_slice(),
            &[
                Value::Int(0),
                Value::string("A"),
                Value::string("B"),
                Value::string("C"),
            ]
        );

        let mut tokens = abc();
        tokens.extend([Token::Roll, Token::int(3), Token::Println]);
        let (result, output, program) = execute(tokens);
        assert_eq!(output, "A\n");
        assert_eq!(result, Ok(Some(Value::string("A"))));
        assert_eq!(
            program.stack.as_slice(),
            &[Value::Int(0), Value::string("B"), Value::string("C")]
        );
    }

    #[test]
    fn test_pick_beyond_depth_underflows() {
        let (result, _, _) = execute(vec![Token::Pick, Token::int(5)]);
        assert_eq!(result, Err(RuntimeError::StackUnderflow { index: 0 }));
    }

    #[test]
    fn test_pick_requires_int_count() {
        let (result, _, _) = execute(vec![Token::Pick, Token::string("2")]);
        assert!(matches!(result, Err(RuntimeError::StructuralError { index: 0, .. })));
    }

    #[test]
    fn test_goto_skips_code() {
        let (result, output, _) = execute(vec![
            Token::Goto,
            Token::string("end"),
            Token::string("skipped"),
            Token::Println,
            Token::Mark,
            Token::string("end"),
            Token::int(5),
        ]);
        assert_eq!(output, "");
        assert_eq!(result, Ok(Some(Value::Int(5))));
    }

    #[test]
    fn test_goto_undefined_label_resumes_at_token_one() {
        // The literal at index 0 runs once; the fallback jump re-enters at 1.
        let (result, output, program) = execute(vec![
            Token::int(0),
            Token::int(1),
            Token::Add,
            Token::Println,
            Token::Dup,
            Token::int(3),
            Token::If(None),
            Token::Fin,
            Token::EndIf,
            Token::Goto,
            Token::string("x"),
        ]);
        assert_eq!(output, "1\n2\n3\n");
        assert_eq!(result, Ok(Some(Value::Int(3))));
        assert_eq!(program.stack.as_slice(), &[Value::Int(0)]);
    }

    #[test]
    fn test_undefined_label_reported_once() {
        let mut program = resolve(vec![
            Token::int(0),
            Token::int(1),
            Token::Add,
            Token::Dup,
            Token::int(4),
            Token::If(None),
            Token::Fin,
            Token::EndIf,
            Token::Goto,
            Token::string("x"),
        ])
        .unwrap();
        let (writer, _) = buffer_writer();
        let mut vm = VM::new(&mut program, Value::Int(-1));
        vm.set_output_writer(writer);
        assert_eq!(vm.run(), Ok(Some(Value::Int(4))));
        assert_eq!(vm.reported_labels.len(), 1);
        assert!(vm.reported_labels.contains("x"));
    }

    #[test]
    fn test_goto_undefined_label_strict() {
        let mut program = resolve(vec![Token::Goto, Token::string("missing")]).unwrap();
        let result = VM::new(&mut program, Value::Int(0))
            .with_options(ExecOptions {
                strict_labels: true,
                ..ExecOptions::default()
            })
            .run();
        assert_eq!(
            result,
            Err(RuntimeError::UnresolvedLabel {
                index: 0,
                label: "missing".to_string()
            })
        );
    }

    #[test]
    fn test_function_call_via_goto() {
        // FUNC body is skipped on fall-through and entered by GOTO.
        let (result, output, _) = execute(vec![
            Token::Func(None),
            Token::string("double"),
            Token::Dup,
            Token::Add,
            Token::Goto,
            Token::string("ret"),
            Token::EndFunc,
            Token::Drop,
            Token::int(21),
            Token::Goto,
            Token::string("double"),
            Token::Mark,
            Token::string("ret"),
            Token::Println,
        ]);
        assert_eq!(output, "42\n");
        assert_eq!(result, Ok(Some(Value::Int(42))));
    }

    #[test]
    fn test_mark_rewrites_label_at_runtime() {
        let (_, _, program) = execute(vec![Token::Mark, Token::string("here")]);
        assert_eq!(program.labels.get("here"), Some(&1));

        let mut program = resolve(vec![Token::Mark, Token::string("here")]).unwrap();
        program.labels.insert("here".to_string(), 99);
        VM::new(&mut program, Value::Int(0)).run().unwrap();
        assert_eq!(program.labels.get("here"), Some(&1));
    }

    #[test]
    fn test_loop_counts_down() {
        // 3 PRINTLNs: counter 3, 2, 1; stops when counter reaches 0
        let (_, output, _) = execute(vec![
            Token::Drop,
            Token::int(3),
            Token::Mark,
            Token::string("loop"),
            Token::Println,
            Token::int(1),
            Token::Sub,
            Token::Dup,
            Token::int(0),
            Token::If(None),
            Token::Fin,
            Token::EndIf,
            Token::Goto,
            Token::string("loop"),
        ]);
        assert_eq!(output, "3\n2\n1\n");
    }

    #[test]
    fn test_input_and_print() {
        let mut program = resolve(vec![Token::Input, Token::Print, Token::Print]).unwrap();
        let (writer, buffer) = buffer_writer();
        let mut vm = VM::new(&mut program, Value::string("hi"));
        vm.set_output_writer(writer);
        let result = vm.run();
        assert_eq!(result, Ok(Some(Value::string("hi"))));
        assert_eq!(buffer_contents(&buffer), "hihi");
    }

    #[test]
    fn test_print_on_empty_stack_underflows() {
        let (result, _, _) = execute(vec![Token::Drop, Token::Print]);
        assert_eq!(result, Err(RuntimeError::StackUnderflow { index: 1 }));
    }

    #[test]
    fn test_trace_does_not_change_results() {
        let tokens = vec![Token::int(2), Token::float(0.5), Token::Mul, Token::Println];
        let mut plain = resolve(tokens.clone()).unwrap();
        let mut traced = resolve(tokens).unwrap();
        let (writer, _) = buffer_writer();
        let mut vm = VM::new(&mut plain, Value::Int(0));
        vm.set_output_writer(writer.clone());
        let a = vm.run();
        let mut vm = VM::new(&mut traced, Value::Int(0)).with_options(ExecOptions {
            trace: true,
            strict_labels: false,
        });
        vm.set_output_writer(writer);
        let b = vm.run();
        assert_eq!(a, b);
        assert_eq!(a, Ok(Some(Value::Float(1.0))));
    }
}
