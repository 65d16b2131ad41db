//! Pretty-printer that serializes an AST back into canonical source.
//!
//! Binary operators get single spaces, parentheses appear only where the
//! grammar needs them, and string literals are single-quoted. Formatting the
//! parse of a formatted string reproduces it exactly.

use std::fmt::Write;

use crate::ast::{BinaryOp, Node, NodeKind, UnaryOp};
use crate::value::Value;

// Binding levels, loosest first. The values for the logical through
// multiplicative levels match `BinaryOp::precedence`.
const TERNARY: u8 = 0;
const LOGICAL: u8 = 1;
const RELATIONAL: u8 = 2;
const ADDITIVE: u8 = 3;
const MULTIPLICATIVE: u8 = 4;
const PREFIX: u8 = 5;
const POWER: u8 = 6;
const INTERPOLATION: u8 = 7;
const POSTFIX: u8 = 8;
const ATOM: u8 = 9;

/// Format a node as template source: segments are written as escaped
/// text and everything else inside `{...}`.
///
/// Newlines and tabs in segments stay literal; backslashes, braces, and
/// other control characters are escaped.
#[must_use]
pub fn format_template(node: &Node) -> String {
    let mut out = String::new();
    match &node.kind {
        NodeKind::Root(children) => {
            for child in children {
                format_piece(&mut out, child);
            }
        }
        _ => format_piece(&mut out, node),
    }
    out
}

/// Format a node as a single direct-mode expression.
#[must_use]
pub fn format_expression(node: &Node) -> String {
    let mut out = String::new();
    format_expr(&mut out, node, TERNARY);
    out
}

fn format_piece(out: &mut String, node: &Node) {
    if let NodeKind::Segment(text) = &node.kind {
        escape_segment(out, text);
    } else {
        out.push('{');
        format_expr(out, node, TERNARY);
        out.push('}');
    }
}

/// Write `node`, parenthesized when it binds looser than `min`.
fn format_expr(out: &mut String, node: &Node, min: u8) {
    let parens = binding(node) < min;
    if parens {
        out.push('(');
    }
    format_node(out, node);
    if parens {
        out.push(')');
    }
}

fn binding(node: &Node) -> u8 {
    match &node.kind {
        NodeKind::Ternary { .. } => TERNARY,
        NodeKind::Binary {
            op: BinaryOp::Pow, ..
        } => POWER,
        NodeKind::Binary { op, .. } => op.precedence(),
        NodeKind::Unary {
            op: UnaryOp::Interpolate,
            ..
        }
        | NodeKind::Root(_) => INTERPOLATION,
        NodeKind::Unary { .. } => PREFIX,
        NodeKind::Call { .. } | NodeKind::Accessor { .. } | NodeKind::Indexer { .. } => POSTFIX,
        NodeKind::Literal(Value::Integer(i64::MIN)) => ADDITIVE,
        NodeKind::Literal(value) if is_negative(value) => PREFIX,
        NodeKind::Segment(_) | NodeKind::Identifier(_) | NodeKind::Literal(_) => ATOM,
    }
}

/// Minimum binding of the left and right operands.
const fn operand_bindings(op: BinaryOp) -> (u8, u8) {
    match op {
        BinaryOp::And | BinaryOp::Or => (RELATIONAL, RELATIONAL),
        BinaryOp::Eq
        | BinaryOp::Ne
        | BinaryOp::Lt
        | BinaryOp::Gt
        | BinaryOp::Le
        | BinaryOp::Ge => (ADDITIVE, ADDITIVE),
        BinaryOp::Add | BinaryOp::Sub => (ADDITIVE, MULTIPLICATIVE),
        BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => (MULTIPLICATIVE, PREFIX),
        BinaryOp::Pow => (INTERPOLATION, PREFIX),
    }
}

fn format_node(out: &mut String, node: &Node) {
    match &node.kind {
        NodeKind::Segment(text) => format_string(out, text),
        // A nested template evaluates to the same text as interpolating
        // its source.
        NodeKind::Root(_) => {
            out.push('$');
            format_string(out, &format_template(node));
        }
        NodeKind::Identifier(name) => out.push_str(name),
        NodeKind::Literal(value) => format_literal(out, value),
        NodeKind::Unary { op, operand } => {
            out.push_str(op.symbol());
            let min = if *op == UnaryOp::Interpolate {
                POSTFIX
            } else {
                PREFIX
            };
            format_expr(out, operand, min);
        }
        NodeKind::Binary { lhs, op, rhs } => {
            let (left, right) = operand_bindings(*op);
            format_expr(out, lhs, left);
            let _ = write!(out, " {op} ");
            format_expr(out, rhs, right);
        }
        NodeKind::Ternary {
            condition,
            then,
            otherwise,
        } => {
            format_expr(out, condition, LOGICAL);
            if let Some(otherwise) = otherwise {
                out.push_str(" ? ");
                format_expr(out, then, TERNARY);
                out.push_str(" : ");
                format_expr(out, otherwise, TERNARY);
            } else {
                out.push_str(" ?? ");
                format_expr(out, then, TERNARY);
            }
        }
        NodeKind::Call { callee, args } => {
            format_expr(out, callee, ATOM);
            out.push('(');
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                format_expr(out, arg, TERNARY);
            }
            out.push(')');
        }
        NodeKind::Accessor { object, field } => {
            format_expr(out, object, POSTFIX);
            out.push('.');
            out.push_str(field);
        }
        NodeKind::Indexer { object, index } => {
            format_expr(out, object, POSTFIX);
            out.push('[');
            format_expr(out, index, TERNARY);
            out.push(']');
        }
    }
}

fn is_negative(value: &Value) -> bool {
    match value {
        Value::Integer(n) => *n < 0,
        Value::Float(x) => !x.is_nan() && x.is_sign_negative(),
        _ => false,
    }
}

fn format_literal(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Boolean(b) => {
            let _ = write!(out, "{b}");
        }
        // The magnitude of `i64::MIN` is not a valid literal.
        Value::Integer(i64::MIN) => out.push_str("-9223372036854775807 - 1"),
        Value::Integer(n) => {
            let _ = write!(out, "{n}");
        }
        Value::Float(x) if x.is_nan() => out.push_str("nan"),
        Value::Float(x) if x.is_infinite() => {
            out.push_str(if *x > 0.0 { "inf" } else { "-inf" });
        }
        Value::Float(x) => {
            let text = x.to_string();
            out.push_str(&text);
            if !text.contains('.') {
                out.push_str(".0");
            }
        }
        Value::String(s) => format_string(out, s),
        // No literal syntax for composites; write their string form.
        Value::Array(_) | Value::Object(_) => format_string(out, &value.to_string()),
    }
}

const fn control_escape(ch: char) -> Option<char> {
    let escaped = match ch {
        '\n' => 'n',
        '\t' => 't',
        '\r' => 'r',
        '\u{0B}' => 'v',
        '\u{08}' => 'b',
        '\u{0C}' => 'f',
        '\u{07}' => 'a',
        _ => return None,
    };
    Some(escaped)
}

fn format_string(out: &mut String, s: &str) {
    out.push('\'');
    for ch in s.chars() {
        match ch {
            '\'' | '\\' => {
                out.push('\\');
                out.push(ch);
            }
            _ => match control_escape(ch) {
                Some(escaped) => {
                    out.push('\\');
                    out.push(escaped);
                }
                None => out.push(ch),
            },
        }
    }
    out.push('\'');
}

fn escape_segment(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '\\' | '{' | '}' => {
                out.push('\\');
                out.push(ch);
            }
            '\n' | '\t' => out.push(ch),
            _ => match control_escape(ch) {
                Some(escaped) => {
                    out.push('\\');
                    out.push(escaped);
                }
                None => out.push(ch),
            },
        }
    }
}
