//! Splash runtime API for embedding

use crate::error::RuntimeError;
use crate::lexer::{self, LexError};
use crate::output::{stdout_writer, OutputWriter};
use crate::program::{CodecError, Program, PROGRAM_EXTENSION};
use crate::resolver::resolve;
use crate::value::Value;
use crate::vm::{ExecOptions, VM};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors surfaced by the embedding API
#[derive(Debug, Error)]
pub enum SplashError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
    #[error("invalid program file {}: {source}", path.display())]
    Codec {
        path: PathBuf,
        #[source]
        source: CodecError,
    },
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for runtime operations
pub type SplashResult<T> = Result<T, SplashError>;

/// Splash runtime instance
///
/// Provides a high-level API for embedding Splash in host applications.
///
/// # Examples
///
/// ```
/// use splash_runtime::{Splash, Value};
///
/// let runtime = Splash::new();
/// let result = runtime.eval("2, 3, MUL", Value::Int(-1)).unwrap();
/// assert_eq!(result, Some(Value::Int(6)));
/// ```
pub struct Splash {
    options: ExecOptions,
    output_writer: OutputWriter,
}

impl Splash {
    /// Create a runtime writing program output to stdout
    pub fn new() -> Self {
        Self {
            options: ExecOptions::default(),
            output_writer: stdout_writer(),
        }
    }

    /// Set execution options
    pub fn with_options(mut self, options: ExecOptions) -> Self {
        self.options = options;
        self
    }

    /// Redirect `PRINT` / `PRINTLN` output
    pub fn set_output_writer(&mut self, writer: OutputWriter) {
        self.output_writer = writer;
    }

    /// Tokenize and resolve source text
    pub fn compile(&self, source: &str) -> SplashResult<Program> {
        let tokens = lexer::tokenize(source)?;
        Ok(resolve(tokens)?)
    }

    /// Compile and run source text
    ///
    /// Returns the value left on top of the stack, if any.
    pub fn eval(&self, source: &str, input: Value) -> SplashResult<Option<Value>> {
        let mut program = self.compile(source)?;
        self.run_program(&mut program, input)
    }

    /// Run a resolved program in place
    ///
    /// The program's stack and label table are left in their final state.
    pub fn run_program(&self, program: &mut Program, input: Value) -> SplashResult<Option<Value>> {
        let mut vm = VM::new(program, input).with_options(self.options);
        vm.set_output_writer(self.output_writer.clone());
        Ok(vm.run()?)
    }

    /// Load a program from disk
    ///
    /// Files with the `.scb` extension are decoded; anything else is treated
    /// as source text.
    pub fn load_file(&self, path: &Path) -> SplashResult<Program> {
        if is_compiled(path) {
            let bytes = fs::read(path).map_err(|source| SplashError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            return Program::from_bytes(&bytes).map_err(|source| SplashError::Codec {
                path: path.to_path_buf(),
                source,
            });
        }

        let source = fs::read_to_string(path).map_err(|source| SplashError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.compile(&source)
    }

    /// Persist a program in the `.scb` format
    pub fn save_program(&self, program: &Program, path: &Path) -> SplashResult<()> {
        let bytes = program.to_bytes().map_err(|source| SplashError::Codec {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, bytes).map_err(|source| SplashError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl Default for Splash {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns true if the path names a persisted program
pub fn is_compiled(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some(PROGRAM_EXTENSION)
}
