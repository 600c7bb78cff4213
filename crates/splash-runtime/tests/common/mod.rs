//! Shared test utilities
//!
//! Helpers for running Splash source through the runtime with captured output.

#![allow(dead_code)]

use splash_runtime::output::{buffer_contents, buffer_writer};
use splash_runtime::{ExecOptions, Program, Splash, SplashError, Value};

// Re-export testing utilities
pub use pretty_assertions::{assert_eq, assert_ne};

/// Input value used when a test does not care about `INPUT`
pub const NO_INPUT: Value = Value::Int(-1);

/// Outcome of a captured run
#[derive(Debug)]
pub struct Run {
    pub result: Result<Option<Value>, SplashError>,
    pub output: String,
}

/// Run source with the given input and options, capturing output
pub fn run_with(source: &str, input: Value, options: ExecOptions) -> Run {
    let mut runtime = Splash::new().with_options(options);
    let (writer, buffer) = buffer_writer();
    runtime.set_output_writer(writer);
    let result = runtime.eval(source, input);
    Run {
        result,
        output: buffer_contents(&buffer),
    }
}

/// Run source with default options and no meaningful input
pub fn run(source: &str) -> Run {
    run_with(source, NO_INPUT, ExecOptions::default())
}

/// Run an already-resolved program, capturing output
pub fn run_program(program: &mut Program, input: Value) -> Run {
    let mut runtime = Splash::new();
    let (writer, buffer) = buffer_writer();
    runtime.set_output_writer(writer);
    let result = runtime.run_program(program, input);
    Run {
        result,
        output: buffer_contents(&buffer),
    }
}

/// Compile source, panicking on failure
pub fn compile(source: &str) -> Program {
    Splash::new()
        .compile(source)
        .unwrap_or_else(|e| panic!("compile failed: {}", e))
}

/// Assert that source evaluates to the given final value
///
/// # Example
/// ```
/// assert_eval("2, 3, ADD", Some(Value::Int(5)));
/// ```
pub fn assert_eval(source: &str, expected: Option<Value>) {
    match run(source).result {
        Ok(value) => assert_eq!(value, expected, "source: {}", source),
        Err(e) => panic!("Expected {:?}, got error: {}", expected, e),
    }
}

/// Assert that source prints exactly `expected`
pub fn assert_output(source: &str, expected: &str) {
    let run = run(source);
    if let Err(e) = &run.result {
        panic!("Expected output {:?}, got error: {}", expected, e);
    }
    assert_eq!(run.output, expected, "source: {}", source);
}

/// The runtime error raised by source
pub fn runtime_error(source: &str) -> splash_runtime::RuntimeError {
    match run(source).result {
        Err(SplashError::Runtime(e)) => e,
        other => panic!("Expected runtime error, got {:?}", other),
    }
}
