use std::fmt::Write;

use crate::ast::{BinaryOp, Node, NodeKind, UnaryOp};
use crate::error::{Error, RuntimeError, RuntimeErrorKind};
use crate::registry::Registry;
use crate::script::{self, Mode};
use crate::token::Span;
use crate::value::{Object, OperatorError, Value};

/// Tree-walking evaluator over a borrowed variable scope and registry.
///
/// Identifiers resolve against `variables` first, then registry constants,
/// and fall back to `null`.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'a> {
    variables: &'a Object,
    registry: &'a Registry,
}

impl<'a> Evaluator<'a> {
    #[must_use]
    pub const fn new(variables: &'a Object, registry: &'a Registry) -> Self {
        Self {
            variables,
            registry,
        }
    }

    /// Evaluate `node` to a value.
    ///
    /// # Errors
    ///
    /// Returns the first `RuntimeError` raised in the subtree.
    pub fn visit(&self, node: &Node) -> Result<Value, RuntimeError> {
        match &node.kind {
            NodeKind::Segment(text) => Ok(Value::String(text.clone())),
            NodeKind::Root(children) => {
                let mut out = String::new();
                for child in children {
                    let value = self.visit(child)?;
                    let _ = write!(out, "{value}");
                }
                Ok(Value::String(out))
            }
            NodeKind::Identifier(name) => Ok(self.resolve(name)),
            NodeKind::Literal(value) => Ok(value.clone()),
            NodeKind::Unary { op, operand } => self.unary(*op, operand, node.span),
            NodeKind::Binary { lhs, op, rhs } => self.binary(lhs, *op, rhs, node.span),
            NodeKind::Ternary {
                condition,
                then,
                otherwise,
            } => {
                if self.visit(condition)?.is_truthy() {
                    self.visit(then)
                } else if let Some(otherwise) = otherwise {
                    self.visit(otherwise)
                } else {
                    Ok(Value::String(String::new()))
                }
            }
            NodeKind::Call { callee, args } => self.call(callee, args, node.span),
            NodeKind::Accessor { object, field } => Ok(self.visit(object)?.get(field)),
            NodeKind::Indexer { object, index } => {
                let target = self.visit(object)?;
                let key = self.visit(index)?;
                Ok(target.at(&key))
            }
        }
    }

    fn resolve(&self, name: &str) -> Value {
        if let Some(value) = self.variables.get(name) {
            return value.clone();
        }
        if let Some(value) = self.registry.constant(name) {
            return value.clone();
        }
        tracing::trace!(name, "unresolved identifier");
        Value::Null
    }

    fn unary(&self, op: UnaryOp, operand: &Node, span: Span) -> Result<Value, RuntimeError> {
        let value = self.visit(operand)?;
        match op {
            UnaryOp::Plus => Ok(value),
            UnaryOp::Minus => value.negate().map_err(|err| operator_error(err, span)),
            UnaryOp::Not => Ok(value.not()),
            UnaryOp::Interpolate => match value {
                Value::String(template) => {
                    self.interpolate(&template).map_err(|inner| RuntimeError {
                        kind: RuntimeErrorKind::Interpolation(Box::new(inner)),
                        span,
                    })
                }
                other => Ok(other),
            },
        }
    }

    /// Compile `template` and run it in the current scope.
    fn interpolate(&self, template: &str) -> Result<Value, Error> {
        tracing::trace!(template, "interpolating");
        let script = script::compile(template, Mode::Template)?;
        script
            .run(self.variables, self.registry)
            .map(Value::String)
            .map_err(|error| Error::Runtime {
                error,
                input: template.to_string(),
            })
    }

    // Both operands are always evaluated; `&&` and `||` do not short-circuit.
    fn binary(
        &self,
        lhs: &Node,
        op: BinaryOp,
        rhs: &Node,
        span: Span,
    ) -> Result<Value, RuntimeError> {
        let lhs = self.visit(lhs)?;
        let rhs = self.visit(rhs)?;
        let result = match op {
            BinaryOp::Add => lhs.add(&rhs),
            BinaryOp::Sub => lhs.sub(&rhs),
            BinaryOp::Mul => lhs.mul(&rhs),
            BinaryOp::Div => lhs.div(&rhs),
            BinaryOp::Rem => lhs.rem(&rhs),
            BinaryOp::Pow => lhs.pow(&rhs),
            BinaryOp::Eq => Ok(lhs.equals(&rhs)),
            BinaryOp::Ne => Ok(lhs.not_equals(&rhs)),
            BinaryOp::Lt => Ok(lhs.less(&rhs)),
            BinaryOp::Gt => Ok(lhs.greater(&rhs)),
            BinaryOp::Le => Ok(lhs.less_equal(&rhs)),
            BinaryOp::Ge => Ok(lhs.greater_equal(&rhs)),
            BinaryOp::And => Ok(lhs.and(&rhs)),
            BinaryOp::Or => Ok(lhs.or(&rhs)),
        };
        result.map_err(|err| operator_error(err, span))
    }

    /// The callee name is the identifier itself, or the string form of any
    /// other callee expression. Lookup happens before arguments are
    /// evaluated.
    fn call(&self, callee: &Node, args: &[Node], span: Span) -> Result<Value, RuntimeError> {
        let name = match &callee.kind {
            NodeKind::Identifier(name) => name.clone(),
            _ => self.visit(callee)?.to_string(),
        };
        let Some(function) = self.registry.function(&name) else {
            return Err(RuntimeError {
                kind: RuntimeErrorKind::FunctionNotFound(name),
                span,
            });
        };

        let args = args
            .iter()
            .map(|arg| self.visit(arg))
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(function = %name, argc = args.len(), "calling function");

        function(args.as_slice()).map_err(|message| RuntimeError {
            kind: RuntimeErrorKind::Function { name, message },
            span,
        })
    }
}

const fn operator_error(err: OperatorError, span: Span) -> RuntimeError {
    RuntimeError {
        kind: RuntimeErrorKind::Operator(err),
        span,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(source: &str, variables: &Object) -> Result<Value, RuntimeError> {
        let script = script::compile(source, Mode::Direct).expect("compile failed");
        script.eval(variables, &Registry::new())
    }

    fn vars(pairs: &[(&str, Value)]) -> Object {
        pairs
            .iter()
            .map(|(name, value)| ((*name).to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn variables_shadow_constants() {
        let scope = vars(&[("PI", Value::Integer(3))]);
        assert_eq!(eval("PI", &scope), Ok(Value::Integer(3)));
    }

    #[test]
    fn unknown_identifier_is_null() {
        assert_eq!(eval("missing", &Object::new()), Ok(Value::Null));
    }

    #[test]
    fn missing_function_is_reported_before_arguments() {
        let scope = vars(&[("obj", Value::Object(Object::new()))]);
        let err = eval("nope(obj + 1)", &scope).unwrap_err();
        assert_eq!(err.kind, RuntimeErrorKind::FunctionNotFound("nope".to_string()));

        let err = eval("len(obj + 1)", &scope).unwrap_err();
        assert!(matches!(err.kind, RuntimeErrorKind::Operator(_)));
    }

    #[test]
    fn ternary_without_else_yields_empty_string() {
        assert_eq!(eval("0 ?? 'x'", &Object::new()), Ok(Value::from("")));
        assert_eq!(eval("1 ?? 'x'", &Object::new()), Ok(Value::from("x")));
    }

    #[test]
    fn callee_may_be_an_expression() {
        assert_eq!(
            eval("('to' + 'Upper')('abc')", &Object::new()),
            Ok(Value::from("ABC"))
        );
    }

    #[test]
    fn function_errors_carry_the_name() {
        let err = eval("substr('x')", &Object::new()).unwrap_err();
        assert_eq!(
            err.kind,
            RuntimeErrorKind::Function {
                name: "substr".to_string(),
                message: "expected 2 or 3 arguments".to_string(),
            }
        );
        assert_eq!(err.span, Span::new(0, 11));
    }

    #[test]
    fn interpolation_uses_the_same_scope() {
        let scope = vars(&[
            ("name", Value::from("World")),
            ("greeting", Value::from("Hello, {name}!")),
        ]);
        assert_eq!(eval("$greeting", &scope), Ok(Value::from("Hello, World!")));
    }

    #[test]
    fn interpolating_a_non_string_is_identity() {
        let scope = vars(&[("n", Value::Integer(5))]);
        assert_eq!(eval("$n", &scope), Ok(Value::Integer(5)));
    }
}
