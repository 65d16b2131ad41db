//! Build templates and expressions without going through source text.
//!
//! Built nodes carry empty spans.
//!
//! ```
//! use rift_rs::builder::{Template, binary, ident, int};
//! use rift_rs::{BinaryOp, formatter};
//!
//! let node = Template::new()
//!     .text("Next year: ")
//!     .expr(binary(ident("year"), BinaryOp::Add, int(1)))
//!     .build();
//! assert_eq!(formatter::format_template(&node), "Next year: {year + 1}");
//! ```

use crate::ast::{BinaryOp, Node, NodeKind, UnaryOp};
use crate::script::{Mode, Script};
use crate::token::Span;
use crate::value::Value;

/// A template under construction: a sequence of text and expressions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Template {
    pieces: Vec<Node>,
}

impl Template {
    /// Create an empty template.
    #[must_use]
    pub const fn new() -> Self {
        Self { pieces: Vec::new() }
    }

    /// Append literal text.
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.pieces.push(node(NodeKind::Segment(text.into())));
        self
    }

    /// Append an expression block.
    #[must_use]
    pub fn expr(mut self, expression: Node) -> Self {
        self.pieces.push(expression);
        self
    }

    /// Finish as a `Root` node.
    #[must_use]
    pub fn build(self) -> Node {
        node(NodeKind::Root(self.pieces))
    }

    /// Finish as a ready-to-run template script.
    #[must_use]
    pub fn into_script(self) -> Script {
        Script::from_node(self.build(), Mode::Template)
    }
}

const fn node(kind: NodeKind) -> Node {
    Node::new(kind, Span::new(0, 0))
}

#[must_use]
pub fn ident(name: impl Into<String>) -> Node {
    node(NodeKind::Identifier(name.into()))
}

#[must_use]
pub fn literal(value: impl Into<Value>) -> Node {
    node(NodeKind::Literal(value.into()))
}

#[must_use]
pub fn int(value: i64) -> Node {
    literal(value)
}

#[must_use]
pub fn float(value: f64) -> Node {
    literal(value)
}

#[must_use]
pub fn string(value: impl Into<String>) -> Node {
    literal(Value::String(value.into()))
}

#[must_use]
pub fn unary(op: UnaryOp, operand: Node) -> Node {
    node(NodeKind::Unary {
        op,
        operand: Box::new(operand),
    })
}

#[must_use]
pub fn binary(lhs: Node, op: BinaryOp, rhs: Node) -> Node {
    node(NodeKind::Binary {
        lhs: Box::new(lhs),
        op,
        rhs: Box::new(rhs),
    })
}

/// `condition ? then : otherwise`
#[must_use]
pub fn ternary(condition: Node, then: Node, otherwise: Node) -> Node {
    node(NodeKind::Ternary {
        condition: Box::new(condition),
        then: Box::new(then),
        otherwise: Some(Box::new(otherwise)),
    })
}

/// `condition ?? then`: `then` when the condition is truthy, else `""`.
#[must_use]
pub fn coalesce(condition: Node, then: Node) -> Node {
    node(NodeKind::Ternary {
        condition: Box::new(condition),
        then: Box::new(then),
        otherwise: None,
    })
}

/// Call a function by name.
#[must_use]
pub fn call(name: impl Into<String>, args: Vec<Node>) -> Node {
    node(NodeKind::Call {
        callee: Box::new(ident(name)),
        args,
    })
}

/// `object.name`
#[must_use]
pub fn field(object: Node, name: impl Into<String>) -> Node {
    node(NodeKind::Accessor {
        object: Box::new(object),
        field: name.into(),
    })
}

/// `object[index]`
#[must_use]
pub fn index(object: Node, index: Node) -> Node {
    node(NodeKind::Indexer {
        object: Box::new(object),
        index: Box::new(index),
    })
}

/// `$operand`
#[must_use]
pub fn interpolate(operand: Node) -> Node {
    unary(UnaryOp::Interpolate, operand)
}
