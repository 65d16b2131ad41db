use crate::ast::Node;
use crate::error::{CompileError, RuntimeError};
use crate::evaluator::Evaluator;
use crate::parser;
use crate::registry::Registry;
use crate::value::{Object, Value};

/// How source text is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Literal text with `{...}` expressions.
    #[default]
    Template,
    /// The whole input is one bare expression.
    Direct,
}

/// A compiled template or expression. Owns its AST, not its source.
#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    root: Node,
    mode: Mode,
}

/// Compile `source` into a reusable `Script`.
///
/// # Errors
///
/// Returns `CompileError` on the first lexical or syntax error.
pub fn compile(source: &str, mode: Mode) -> Result<Script, CompileError> {
    let root = parser::parse(source, mode)?;
    tracing::debug!(?mode, nodes = root.node_count(), "compiled script");
    Ok(Script { root, mode })
}

impl Script {
    /// Wrap an already-built AST, e.g. one from the `builder` module.
    #[must_use]
    pub const fn from_node(root: Node, mode: Mode) -> Self {
        Self { root, mode }
    }

    #[must_use]
    pub const fn root(&self) -> &Node {
        &self.root
    }

    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// Evaluate and convert the result to its string form.
    ///
    /// # Errors
    ///
    /// Returns `RuntimeError` on operator type mismatches, unknown or
    /// failing functions, and failed interpolations.
    pub fn run(&self, variables: &Object, registry: &Registry) -> Result<String, RuntimeError> {
        self.eval(variables, registry).map(|value| value.to_string())
    }

    /// Evaluate to a `Value`.
    ///
    /// # Errors
    ///
    /// See [`Script::run`].
    pub fn eval(&self, variables: &Object, registry: &Registry) -> Result<Value, RuntimeError> {
        Evaluator::new(variables, registry).visit(&self.root)
    }

    /// The AST as a debug tree, e.g. `Root(Segment("a"), Identifier(b))`.
    #[must_use]
    pub fn to_debug_string(&self) -> String {
        self.root.to_string()
    }
}
