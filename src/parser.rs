use std::fmt;

use crate::ast::{BinaryOp, Node, NodeKind, UnaryOp};
use crate::error::CompileError;
use crate::lexer::{LexError, LexErrorKind, Lexer};
use crate::script::Mode;
use crate::token::{Span, Token, TokenKind};
use crate::value::Value;

/// Classifies a parser error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The lexer rejected the input.
    Lex(LexErrorKind),
    /// A specific token was required.
    Expected {
        expected: TokenKind,
        found: TokenKind,
    },
    /// No primary expression could start here.
    ExpectedExpression { found: TokenKind },
    /// Token that cannot appear at this position.
    UnexpectedToken(TokenKind),
    /// Integer literal out of range for `i64`.
    InvalidInteger(String),
    InvalidFloat(String),
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lex(kind) => write!(f, "{kind}"),
            Self::Expected { expected, found } => {
                write!(f, "expected {expected} but found {found}")
            }
            Self::ExpectedExpression { found } => {
                write!(f, "expected an expression but found {found}")
            }
            Self::UnexpectedToken(kind) => write!(f, "unexpected {kind}"),
            Self::InvalidInteger(text) => write!(f, "invalid integer literal '{text}'"),
            Self::InvalidFloat(text) => write!(f, "invalid float literal '{text}'"),
        }
    }
}

/// Error produced during parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at index {}", span.start)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        Self {
            kind: ParseErrorKind::Lex(err.kind),
            span: err.span,
        }
    }
}

type Operand<'a> = fn(&mut Parser<'a>) -> Result<Node, ParseError>;

/// Parse source text into an AST.
///
/// In template mode the result is a `Root` of segments and expressions; a
/// template made of exactly one piece yields that piece directly. In direct
/// mode the whole input must be a single expression.
///
/// # Errors
///
/// Returns `CompileError` on the first lexical or syntax error.
pub fn parse(source: &str, mode: Mode) -> Result<Node, CompileError> {
    Parser::new(source, mode).parse()
}

/// Recursive-descent parser pulling tokens from a `Lexer` one at a time.
///
/// Precedence, loosest first:
///
/// ```text
/// expression  := boolean ( '?' expression ':' expression | '??' expression )?
/// boolean     := comparison ( ('&&' | '||') comparison )?
/// comparison  := additive ( ('==' | '!=' | '<' | '>' | '<=' | '>=') additive )?
/// additive    := term ( ('+' | '-') term )*
/// term        := factor ( ('*' | '/' | '%') factor )*
/// factor      := ('+' | '-' | '!') factor | power
/// power       := interpolation ( '^' factor )?
/// interpolation := '$' accessor | accessor
/// accessor    := call ( '.' IDENT | '[' expression ']' )*
/// call        := atom ( '(' args? ')' )?
/// atom        := IDENT | STRING | INTEGER | FLOAT | '(' expression ')'
/// ```
///
/// Logical and relational operators apply at most once per level, so
/// `a < b < c` needs parentheses.
#[derive(Debug)]
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    prev_end: usize,
    mode: Mode,
}

impl<'a> Parser<'a> {
    #[must_use]
    pub const fn new(source: &'a str, mode: Mode) -> Self {
        Self {
            lexer: Lexer::new(source, mode),
            current: Token::eof(0),
            prev_end: 0,
            mode,
        }
    }

    /// Consume the parser and produce the AST.
    ///
    /// # Errors
    ///
    /// Returns `CompileError` carrying a copy of the source.
    pub fn parse(mut self) -> Result<Node, CompileError> {
        let source = self.lexer.source();
        self.parse_source().map_err(|err| CompileError {
            kind: err.kind,
            span: err.span,
            input: source.to_string(),
        })
    }

    fn parse_source(&mut self) -> Result<Node, ParseError> {
        self.advance()?;
        match self.mode {
            Mode::Direct => {
                let node = self.expression()?;
                self.expect(TokenKind::Eof)?;
                Ok(node)
            }
            Mode::Template => self.root(),
        }
    }

    /// Move to the next token and return the one just consumed.
    fn advance(&mut self) -> Result<Token, ParseError> {
        let next = self.lexer.next_token()?;
        let consumed = std::mem::replace(&mut self.current, next);
        self.prev_end = consumed.span.end;
        Ok(consumed)
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        if self.check(kind) {
            return self.advance();
        }
        Err(ParseError {
            kind: ParseErrorKind::Expected {
                expected: kind,
                found: self.current.kind,
            },
            span: self.current.span,
        })
    }

    /// Span from `start` to the end of the last consumed token.
    fn span_from(&self, start: usize) -> Span {
        Span::new(start, self.prev_end.max(start))
    }

    fn root(&mut self) -> Result<Node, ParseError> {
        let mut nodes = Vec::new();
        loop {
            match self.current.kind {
                TokenKind::Eof => break,
                TokenKind::Segment => {
                    let token = self.advance()?;
                    nodes.push(Node::new(NodeKind::Segment(token.text), token.span));
                }
                TokenKind::LeftBrace => {
                    self.advance()?;
                    nodes.push(self.expression()?);
                    self.expect(TokenKind::RightBrace)?;
                }
                other => {
                    return Err(ParseError {
                        kind: ParseErrorKind::UnexpectedToken(other),
                        span: self.current.span,
                    });
                }
            }
        }

        if nodes.len() == 1 {
            return Ok(nodes.swap_remove(0));
        }
        let span = Span::new(0, self.lexer.source().len());
        Ok(Node::new(NodeKind::Root(nodes), span))
    }

    fn expression(&mut self) -> Result<Node, ParseError> {
        let start = self.current.span.start;
        let condition = self.boolean()?;

        let has_else = match self.current.kind {
            TokenKind::Question => true,
            TokenKind::NullCoalesce => false,
            _ => return Ok(condition),
        };
        self.advance()?;

        let then = self.expression()?;
        let otherwise = if has_else {
            self.expect(TokenKind::Colon)?;
            Some(Box::new(self.expression()?))
        } else {
            None
        };

        Ok(Node::new(
            NodeKind::Ternary {
                condition: Box::new(condition),
                then: Box::new(then),
                otherwise,
            },
            self.span_from(start),
        ))
    }

    fn boolean(&mut self) -> Result<Node, ParseError> {
        let start = self.current.span.start;
        let lhs = self.comparison()?;
        if matches!(self.current.kind, TokenKind::And | TokenKind::Or) {
            return self.binary(start, lhs, Self::comparison);
        }
        Ok(lhs)
    }

    fn comparison(&mut self) -> Result<Node, ParseError> {
        let start = self.current.span.start;
        let lhs = self.additive()?;
        if matches!(
            self.current.kind,
            TokenKind::EqualEqual
                | TokenKind::NotEqual
                | TokenKind::Less
                | TokenKind::Greater
                | TokenKind::LessEqual
                | TokenKind::GreaterEqual
        ) {
            return self.binary(start, lhs, Self::additive);
        }
        Ok(lhs)
    }

    fn additive(&mut self) -> Result<Node, ParseError> {
        let start = self.current.span.start;
        let mut node = self.term()?;
        while matches!(self.current.kind, TokenKind::Plus | TokenKind::Minus) {
            node = self.binary(start, node, Self::term)?;
        }
        Ok(node)
    }

    fn term(&mut self) -> Result<Node, ParseError> {
        let start = self.current.span.start;
        let mut node = self.factor()?;
        while matches!(
            self.current.kind,
            TokenKind::Star | TokenKind::Slash | TokenKind::Percent
        ) {
            node = self.binary(start, node, Self::factor)?;
        }
        Ok(node)
    }

    fn factor(&mut self) -> Result<Node, ParseError> {
        let start = self.current.span.start;
        let op = match self.current.kind {
            TokenKind::Plus => UnaryOp::Plus,
            TokenKind::Minus => UnaryOp::Minus,
            TokenKind::Not => UnaryOp::Not,
            _ => return self.power(),
        };
        self.advance()?;
        let operand = self.factor()?;
        Ok(Node::new(
            NodeKind::Unary {
                op,
                operand: Box::new(operand),
            },
            self.span_from(start),
        ))
    }

    // The exponent goes back through `factor`, which makes `^` right
    // associative and lets it take a signed operand: `2^-1`.
    fn power(&mut self) -> Result<Node, ParseError> {
        let start = self.current.span.start;
        let base = self.interpolation()?;
        if self.check(TokenKind::Caret) {
            return self.binary(start, base, Self::factor);
        }
        Ok(base)
    }

    fn interpolation(&mut self) -> Result<Node, ParseError> {
        if !self.check(TokenKind::Dollar) {
            return self.accessor();
        }
        let start = self.current.span.start;
        self.advance()?;
        let operand = self.accessor()?;
        Ok(Node::new(
            NodeKind::Unary {
                op: UnaryOp::Interpolate,
                operand: Box::new(operand),
            },
            self.span_from(start),
        ))
    }

    fn accessor(&mut self) -> Result<Node, ParseError> {
        let start = self.current.span.start;
        let mut node = self.call()?;
        loop {
            match self.current.kind {
                TokenKind::Dot => {
                    self.advance()?;
                    let field = self.expect(TokenKind::Identifier)?;
                    node = Node::new(
                        NodeKind::Accessor {
                            object: Box::new(node),
                            field: field.text,
                        },
                        self.span_from(start),
                    );
                }
                TokenKind::LeftBracket => {
                    self.advance()?;
                    let index = self.expression()?;
                    self.expect(TokenKind::RightBracket)?;
                    node = Node::new(
                        NodeKind::Indexer {
                            object: Box::new(node),
                            index: Box::new(index),
                        },
                        self.span_from(start),
                    );
                }
                _ => return Ok(node),
            }
        }
    }

    fn call(&mut self) -> Result<Node, ParseError> {
        let start = self.current.span.start;
        let callee = self.atom()?;
        if !self.check(TokenKind::LeftParen) {
            return Ok(callee);
        }
        self.advance()?;

        let mut args = Vec::new();
        while !self.check(TokenKind::RightParen) {
            args.push(self.expression()?);
            if !self.check(TokenKind::Comma) {
                break;
            }
            self.advance()?;
        }
        self.expect(TokenKind::RightParen)?;

        Ok(Node::new(
            NodeKind::Call {
                callee: Box::new(callee),
                args,
            },
            self.span_from(start),
        ))
    }

    fn atom(&mut self) -> Result<Node, ParseError> {
        match self.current.kind {
            TokenKind::Identifier => {
                let token = self.advance()?;
                Ok(Node::new(NodeKind::Identifier(token.text), token.span))
            }
            TokenKind::String => {
                let token = self.advance()?;
                Ok(Node::new(
                    NodeKind::Literal(Value::String(token.text)),
                    token.span,
                ))
            }
            TokenKind::Integer => {
                let token = self.advance()?;
                let Ok(number) = token.text.parse::<i64>() else {
                    return Err(ParseError {
                        kind: ParseErrorKind::InvalidInteger(token.text),
                        span: token.span,
                    });
                };
                Ok(Node::new(
                    NodeKind::Literal(Value::Integer(number)),
                    token.span,
                ))
            }
            TokenKind::Float => {
                let token = self.advance()?;
                let Ok(number) = token.text.parse::<f64>() else {
                    return Err(ParseError {
                        kind: ParseErrorKind::InvalidFloat(token.text),
                        span: token.span,
                    });
                };
                Ok(Node::new(NodeKind::Literal(Value::Float(number)), token.span))
            }
            TokenKind::LeftParen => {
                self.advance()?;
                let node = self.expression()?;
                self.expect(TokenKind::RightParen)?;
                Ok(node)
            }
            found => Err(ParseError {
                kind: ParseErrorKind::ExpectedExpression { found },
                span: self.current.span,
            }),
        }
    }

    fn binary(
        &mut self,
        start: usize,
        lhs: Node,
        operand: Operand<'a>,
    ) -> Result<Node, ParseError> {
        let token = self.advance()?;
        let Some(op) = BinaryOp::from_token(token.kind) else {
            return Err(ParseError {
                kind: ParseErrorKind::UnexpectedToken(token.kind),
                span: token.span,
            });
        };
        let rhs = operand(self)?;
        Ok(Node::new(
            NodeKind::Binary {
                lhs: Box::new(lhs),
                op,
                rhs: Box::new(rhs),
            },
            self.span_from(start),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(input: &str, mode: Mode) -> String {
        parse(input, mode).expect("parse failed").to_string()
    }

    #[test]
    fn template_root_with_segments() {
        assert_eq!(
            tree("Hello, {name}!", Mode::Template),
            r#"Root(Segment("Hello, "), Identifier(name), Segment("!"))"#
        );
    }

    #[test]
    fn single_block_collapses() {
        assert_eq!(tree("{x}", Mode::Template), "Identifier(x)");
        assert_eq!(tree("just text", Mode::Template), r#"Segment("just text")"#);
    }

    #[test]
    fn empty_template_is_empty_root() {
        let node = parse("", Mode::Template).expect("parse failed");
        assert_eq!(node.kind, NodeKind::Root(Vec::new()));
        assert_eq!(node.span, Span::new(0, 0));
    }

    #[test]
    fn multiplication_binds_tighter() {
        assert_eq!(
            tree("1 + 2 * 3", Mode::Direct),
            "Binary(Literal(1), +, Binary(Literal(2), *, Literal(3)))"
        );
    }

    #[test]
    fn additive_is_left_associative() {
        assert_eq!(
            tree("1 - 2 - 3", Mode::Direct),
            "Binary(Binary(Literal(1), -, Literal(2)), -, Literal(3))"
        );
    }

    #[test]
    fn power_is_right_associative() {
        assert_eq!(
            tree("2 ^ 3 ^ 2", Mode::Direct),
            "Binary(Literal(2), ^, Binary(Literal(3), ^, Literal(2)))"
        );
    }

    #[test]
    fn unary_minus_binds_looser_than_power() {
        assert_eq!(
            tree("-2 ^ 2", Mode::Direct),
            "Unary(-, Binary(Literal(2), ^, Literal(2)))"
        );
    }

    #[test]
    fn ternary_and_coalesce() {
        assert_eq!(
            tree("a ? 1 : 2", Mode::Direct),
            "Ternary(Identifier(a), Literal(1), Literal(2))"
        );
        assert_eq!(
            tree("a ?? 'x'", Mode::Direct),
            r#"Ternary(Identifier(a), Literal("x"))"#
        );
    }

    #[test]
    fn postfix_chain() {
        assert_eq!(
            tree("user.tags[0]", Mode::Direct),
            "Indexer(Accessor(Identifier(user), tags), Literal(0))"
        );
        assert_eq!(
            tree("max(1, x)", Mode::Direct),
            "Call(Identifier(max), [Literal(1), Identifier(x)])"
        );
        assert_eq!(tree("f()", Mode::Direct), "Call(Identifier(f), [])");
    }

    #[test]
    fn interpolation_wraps_accessor() {
        assert_eq!(
            tree("$a.b", Mode::Direct),
            "Unary($, Accessor(Identifier(a), b))"
        );
    }

    #[test]
    fn spans_cover_source_tokens() {
        let node = parse("ab {x + 10} c", Mode::Template).expect("parse failed");
        let NodeKind::Root(children) = &node.kind else {
            panic!("expected root, got {node}");
        };
        assert_eq!(children[0].span, Span::new(0, 3));
        assert_eq!(children[1].span, Span::new(4, 10));
        assert_eq!(children[2].span, Span::new(11, 13));
        assert_eq!(node.span, Span::new(0, 13));
    }

    #[test]
    fn missing_operand() {
        let err = parse("{ 2 + }", Mode::Template).unwrap_err();
        assert_eq!(
            err.kind,
            ParseErrorKind::ExpectedExpression {
                found: TokenKind::RightBrace
            }
        );
        assert_eq!(err.span, Span::new(6, 7));
    }

    #[test]
    fn relational_operators_do_not_chain() {
        let err = parse("1 < 2 < 3", Mode::Direct).unwrap_err();
        assert_eq!(
            err.kind,
            ParseErrorKind::Expected {
                expected: TokenKind::Eof,
                found: TokenKind::Less,
            }
        );
    }

    #[test]
    fn integer_overflow_is_rejected() {
        let err = parse("99999999999999999999", Mode::Direct).unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::InvalidInteger(_)));
        assert_eq!(err.span, Span::new(0, 20));
    }

    #[test]
    fn lex_errors_surface_as_compile_errors() {
        let err = parse("{a = b}", Mode::Template).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::Lex(LexErrorKind::UnexpectedCharacter('=')));
        assert_eq!(err.input, "{a = b}");
    }
}
