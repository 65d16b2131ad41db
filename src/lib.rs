//! Embeddable string templating and expression language.
//!
//! Templates are literal text with `{...}` expressions; the expression
//! language has arithmetic, comparison, ternaries, function calls, field
//! and index access, and `$` re-interpolation of string values. Source goes
//! through a lexer, a recursive-descent parser, and a tree-walking
//! evaluator over a dynamic [`Value`].
//!
//! # Quick start
//!
//! ## Render a template
//!
//! ```
//! use rift_rs::{Object, Value, format};
//!
//! let mut vars = Object::new();
//! vars.insert("name".to_string(), Value::from("World"));
//! assert_eq!(format("Hello, {name}!", &vars).unwrap(), "Hello, World!");
//! ```
//!
//! ## Compile once, run many times
//!
//! ```
//! use rift_rs::{Mode, Object, Registry, Value, compile};
//!
//! let script = compile("{count} item{count == 1 ? '' : 's'}", Mode::Template).unwrap();
//! let mut vars = Object::new();
//! for (count, expected) in [(1, "1 item"), (3, "3 items")] {
//!     vars.insert("count".to_string(), Value::from(count));
//!     assert_eq!(script.run(&vars, Registry::shared()).unwrap(), expected);
//! }
//! ```
//!
//! ## Evaluate an expression
//!
//! ```
//! use rift_rs::{Object, Value, evaluate};
//!
//! let value = evaluate("2 + 3 * 4", &Object::new()).unwrap();
//! assert_eq!(value, Value::Integer(14));
//! ```

// Allow noisy pedantic lints that don't add value for
// a library crate.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod ast;
pub mod builder;
mod builtins;
pub mod error;
pub mod evaluator;
pub mod formatter;
pub mod lexer;
pub mod parser;
pub mod registry;
pub mod script;
pub mod token;
pub mod value;

pub use ast::{BinaryOp, Node, NodeKind, UnaryOp};
pub use error::{CompileError, Error, RuntimeError, RuntimeErrorKind};
pub use evaluator::Evaluator;
pub use lexer::{LexError, LexErrorKind, Lexer, tokenize};
pub use parser::{ParseError, ParseErrorKind, Parser, parse};
pub use registry::{Function, Registry};
pub use script::{Mode, Script, compile};
pub use token::{Span, Token, TokenKind};
pub use value::{Array, Object, OperatorError, Value};

/// Render `source` as a template against the shared default registry.
pub fn format(source: &str, variables: &Object) -> Result<String, Error> {
    format_with(source, variables, Registry::shared())
}

/// Render `source` as a template against `registry`.
pub fn format_with(source: &str, variables: &Object, registry: &Registry) -> Result<String, Error> {
    let script = compile(source, Mode::Template)?;
    script
        .run(variables, registry)
        .map_err(|error| runtime(error, source))
}

/// Evaluate `source` as a single expression against the shared default
/// registry.
pub fn evaluate(source: &str, variables: &Object) -> Result<Value, Error> {
    evaluate_with(source, variables, Registry::shared())
}

/// Evaluate `source` as a single expression against `registry`.
pub fn evaluate_with(source: &str, variables: &Object, registry: &Registry) -> Result<Value, Error> {
    let script = compile(source, Mode::Direct)?;
    script
        .eval(variables, registry)
        .map_err(|error| runtime(error, source))
}

fn runtime(error: RuntimeError, source: &str) -> Error {
    Error::Runtime {
        error,
        input: source.to_string(),
    }
}
