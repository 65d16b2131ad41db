//! Compile-time and runtime errors, with caret diagnostics.

use std::fmt;

use crate::parser::ParseErrorKind;
use crate::token::Span;
use crate::value::OperatorError;

/// Lexical or syntactic failure. Carries a copy of the source, since no AST
/// exists yet to point into.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at index {}", span.start)]
pub struct CompileError {
    pub kind: ParseErrorKind,
    pub span: Span,
    pub input: String,
}

impl CompileError {
    /// Message, offending source line, and a caret underline of the span.
    #[must_use]
    pub fn pretty_print(&self) -> String {
        render_diagnostic(&self.to_string(), &self.input, self.span)
    }
}

/// Classifies a runtime error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeErrorKind {
    /// An arithmetic operator or negation rejected its operand types.
    Operator(OperatorError),
    /// Call to a name the registry does not know.
    FunctionNotFound(String),
    /// A registered function reported an error.
    Function { name: String, message: String },
    /// A `$` sub-template failed; the inner error keeps its own span,
    /// relative to the interpolated string.
    Interpolation(Box<Error>),
}

impl fmt::Display for RuntimeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Operator(err) => write!(f, "{err}"),
            Self::FunctionNotFound(name) => write!(f, "function '{name}' not found"),
            Self::Function { name, message } => write!(f, "{name}: {message}"),
            Self::Interpolation(inner) => write!(f, "in interpolated template: {inner}"),
        }
    }
}

/// Evaluation failure. Holds only a span: a compiled `Script` no longer
/// owns its source, so callers pass it back in to pretty-print.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at index {}", span.start)]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    pub span: Span,
}

impl RuntimeError {
    /// Diagnostic against `input`. Interpolation failures append the nested
    /// diagnostic for the sub-template.
    #[must_use]
    pub fn pretty_print(&self, input: &str) -> String {
        let mut out = render_diagnostic(&self.to_string(), input, self.span);
        if let RuntimeErrorKind::Interpolation(inner) = &self.kind {
            out.push('\n');
            out.push_str(&inner.pretty_print());
        }
        out
    }
}

/// Unified error returned by the one-shot entry points.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Compile(#[from] CompileError),
    /// A runtime error paired with the source it was raised against.
    #[error("{error}")]
    Runtime { error: RuntimeError, input: String },
}

impl Error {
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Compile(err) => err.span,
            Self::Runtime { error, .. } => error.span,
        }
    }

    /// Source text the error points into.
    #[must_use]
    pub fn input(&self) -> &str {
        match self {
            Self::Compile(err) => &err.input,
            Self::Runtime { input, .. } => input,
        }
    }

    #[must_use]
    pub fn pretty_print(&self) -> String {
        match self {
            Self::Compile(err) => err.pretty_print(),
            Self::Runtime { error, input } => error.pretty_print(input),
        }
    }
}

/// `"{message}\n{line}\n{carets}"` where `line` is the source line holding
/// `span.start` and the carets sit under the span, at least one wide and
/// clipped to the line.
pub(crate) fn render_diagnostic(message: &str, input: &str, span: Span) -> String {
    let mut start = span.start.min(input.len());
    while !input.is_char_boundary(start) {
        start -= 1;
    }
    let line_start = input[..start].rfind('\n').map_or(0, |i| i + 1);
    let line_end = input[start..].find('\n').map_or(input.len(), |i| start + i);
    let line = &input[line_start..line_end];

    let column = start - line_start;
    let width = span.end.min(line_end).saturating_sub(start).max(1);
    format!(
        "{message}\n{line}\n{}{}",
        " ".repeat(column),
        "^".repeat(width)
    )
}
