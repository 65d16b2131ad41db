use std::fmt;

use crate::token::{Span, TokenKind};
use crate::value::Value;

/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// `+x`, identity.
    Plus,
    /// `-x`
    Minus,
    /// `!x`
    Not,
    /// `$x`, re-run a string value as a nested template.
    Interpolate,
}

impl UnaryOp {
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Not => "!",
            Self::Interpolate => "$",
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Infix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    And,
    Or,
}

impl BinaryOp {
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rem => "%",
            Self::Pow => "^",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Ge => ">=",
            Self::And => "&&",
            Self::Or => "||",
        }
    }

    /// Binding strength, higher binds tighter.
    #[must_use]
    pub const fn precedence(self) -> u8 {
        match self {
            Self::And | Self::Or => 1,
            Self::Eq | Self::Ne | Self::Lt | Self::Gt | Self::Le | Self::Ge => 2,
            Self::Add | Self::Sub => 3,
            Self::Mul | Self::Div | Self::Rem => 4,
            Self::Pow => 5,
        }
    }

    #[must_use]
    pub const fn from_token(kind: TokenKind) -> Option<Self> {
        let op = match kind {
            TokenKind::Plus => Self::Add,
            TokenKind::Minus => Self::Sub,
            TokenKind::Star => Self::Mul,
            TokenKind::Slash => Self::Div,
            TokenKind::Percent => Self::Rem,
            TokenKind::Caret => Self::Pow,
            TokenKind::EqualEqual => Self::Eq,
            TokenKind::NotEqual => Self::Ne,
            TokenKind::Less => Self::Lt,
            TokenKind::Greater => Self::Gt,
            TokenKind::LessEqual => Self::Le,
            TokenKind::GreaterEqual => Self::Ge,
            TokenKind::And => Self::And,
            TokenKind::Or => Self::Or,
            _ => return None,
        };
        Some(op)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// AST node: a variant plus the source range it was parsed from.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
}

/// Node variants. Every node owns its children.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Literal template text.
    Segment(String),
    /// Sequence of segments and expressions, concatenated on evaluation.
    Root(Vec<Node>),
    /// Name resolved against the variables, then the registry constants.
    Identifier(String),
    /// Pre-evaluated literal.
    Literal(Value),
    Unary {
        op: UnaryOp,
        operand: Box<Node>,
    },
    Binary {
        lhs: Box<Node>,
        op: BinaryOp,
        rhs: Box<Node>,
    },
    /// `cond ? a : b`, or `cond ?? a` when `otherwise` is `None`.
    Ternary {
        condition: Box<Node>,
        then: Box<Node>,
        otherwise: Option<Box<Node>>,
    },
    Call {
        callee: Box<Node>,
        args: Vec<Node>,
    },
    /// `object.field`
    Accessor {
        object: Box<Node>,
        field: String,
    },
    /// `object[index]`
    Indexer {
        object: Box<Node>,
        index: Box<Node>,
    },
}

impl Node {
    #[must_use]
    pub const fn new(kind: NodeKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Number of nodes in this subtree, including `self`.
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self
            .children()
            .into_iter()
            .map(Self::node_count)
            .sum::<usize>()
    }

    /// Direct children in source order.
    #[must_use]
    pub fn children(&self) -> Vec<&Self> {
        match &self.kind {
            NodeKind::Segment(_) | NodeKind::Identifier(_) | NodeKind::Literal(_) => Vec::new(),
            NodeKind::Root(children) => children.iter().collect(),
            NodeKind::Unary { operand, .. } => vec![operand.as_ref()],
            NodeKind::Binary { lhs, rhs, .. } => vec![lhs.as_ref(), rhs.as_ref()],
            NodeKind::Ternary {
                condition,
                then,
                otherwise,
            } => {
                let mut children = vec![condition.as_ref(), then.as_ref()];
                children.extend(otherwise.as_deref());
                children
            }
            NodeKind::Call { callee, args } => std::iter::once(callee.as_ref()).chain(args).collect(),
            NodeKind::Accessor { object, .. } => vec![object.as_ref()],
            NodeKind::Indexer { object, index } => vec![object.as_ref(), index.as_ref()],
        }
    }
}

/// Debug tree, e.g. `Binary(Literal(2), +, Identifier(x))`.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            NodeKind::Segment(text) => write!(f, "Segment({text:?})"),
            NodeKind::Root(children) => {
                f.write_str("Root(")?;
                write_list(f, children)?;
                f.write_str(")")
            }
            NodeKind::Identifier(name) => write!(f, "Identifier({name})"),
            NodeKind::Literal(Value::String(s)) => write!(f, "Literal({s:?})"),
            NodeKind::Literal(value) => write!(f, "Literal({value})"),
            NodeKind::Unary { op, operand } => write!(f, "Unary({op}, {operand})"),
            NodeKind::Binary { lhs, op, rhs } => write!(f, "Binary({lhs}, {op}, {rhs})"),
            NodeKind::Ternary {
                condition,
                then,
                otherwise: Some(otherwise),
            } => write!(f, "Ternary({condition}, {then}, {otherwise})"),
            NodeKind::Ternary {
                condition,
                then,
                otherwise: None,
            } => write!(f, "Ternary({condition}, {then})"),
            NodeKind::Call { callee, args } => {
                write!(f, "Call({callee}, [")?;
                write_list(f, args)?;
                f.write_str("])")
            }
            NodeKind::Accessor { object, field } => write!(f, "Accessor({object}, {field})"),
            NodeKind::Indexer { object, index } => write!(f, "Indexer({object}, {index})"),
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, nodes: &[Node]) -> fmt::Result {
    for (i, node) in nodes.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{node}")?;
    }
    Ok(())
}
