use std::fmt;

use crate::script::Mode;
use crate::token::{Span, Token, TokenKind};

/// Classifies a lexer error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    /// Input ended inside an unterminated `{...}` expression.
    UnexpectedEof,
    /// String literal without its closing quote.
    UnterminatedString,
    /// Character that cannot start any token (including lone `=`, `&`, `|`).
    UnexpectedCharacter(char),
    /// `}` with no open expression.
    UnmatchedCloseBrace,
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEof => write!(f, "unexpected end of input"),
            Self::UnterminatedString => write!(f, "unterminated string literal"),
            Self::UnexpectedCharacter(ch) => write!(f, "unexpected character '{ch}'"),
            Self::UnmatchedCloseBrace => write!(f, "unexpected '}}'"),
        }
    }
}

/// Error produced during lexing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at index {}", span.start)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: Span,
}

/// Tokenize a whole source string. The trailing end-of-input token is not
/// included.
///
/// # Errors
///
/// Returns `LexError` on unterminated strings or expressions, stray
/// characters, or an unmatched `}`.
pub fn tokenize(input: &str, mode: Mode) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer::new(input, mode);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        if token.is_eof() {
            return Ok(tokens);
        }
        tokens.push(token);
    }
}

/// Decode the character following a backslash.
pub(crate) const fn unescape(ch: char) -> Option<char> {
    let decoded = match ch {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        'v' => '\u{0B}',
        'b' => '\u{08}',
        'f' => '\u{0C}',
        'a' => '\u{07}',
        '\\' => '\\',
        '\'' => '\'',
        '"' => '"',
        _ => return None,
    };
    Some(decoded)
}

/// Pull-based scanner.
///
/// Outside any `{...}` the lexer produces literal text segments; inside it
/// produces expression tokens. `depth` counts open braces. In direct mode the
/// whole input is scanned as an expression.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    depth: usize,
    direct: bool,
}

impl<'a> Lexer<'a> {
    #[must_use]
    pub const fn new(input: &'a str, mode: Mode) -> Self {
        Self {
            input,
            pos: 0,
            depth: 0,
            direct: matches!(mode, Mode::Direct),
        }
    }

    #[must_use]
    pub const fn source(&self) -> &'a str {
        self.input
    }

    /// Number of currently open `{`.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Produce the next token.
    ///
    /// # Errors
    ///
    /// Returns `LexError` for malformed input at the cursor.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        if self.direct || self.depth > 0 {
            self.next_expression()
        } else {
            Ok(self.next_segment())
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn eat(&mut self, expected: u8) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn token_from(&self, kind: TokenKind, start: usize) -> Token {
        Token {
            kind,
            text: self.input[start..self.pos].to_string(),
            span: Span::new(start, self.pos),
        }
    }

    fn next_segment(&mut self) -> Token {
        let start = self.pos;
        if start >= self.input.len() {
            return Token::eof(start);
        }

        // A brace at the very start opens an expression; one found after
        // some text ends the segment and is lexed on the next call.
        if self.eat(b'{') {
            self.depth += 1;
            return self.token_from(TokenKind::LeftBrace, start);
        }

        let mut text = String::new();
        while let Some(ch) = self.peek_char() {
            match ch {
                '{' => break,
                '\\' => {
                    self.read_escape(&mut text, true);
                }
                _ => {
                    text.push(ch);
                    self.pos += ch.len_utf8();
                }
            }
        }

        Token {
            kind: TokenKind::Segment,
            text,
            span: Span::new(start, self.pos),
        }
    }

    fn next_expression(&mut self) -> Result<Token, LexError> {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }

        let start = self.pos;
        let Some(ch) = self.peek_char() else {
            if self.direct {
                return Ok(Token::eof(start));
            }
            return Err(LexError {
                kind: LexErrorKind::UnexpectedEof,
                span: Span::at(start),
            });
        };

        if ch.is_ascii_digit() {
            return Ok(self.read_number());
        }
        if ch.is_ascii_alphabetic() || ch == '_' {
            return Ok(self.read_identifier());
        }
        if ch == '\'' || ch == '"' {
            return self.read_string(ch);
        }

        self.pos += ch.len_utf8();
        let kind = match ch {
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            '[' => TokenKind::LeftBracket,
            ']' => TokenKind::RightBracket,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '^' => TokenKind::Caret,
            '$' => TokenKind::Dollar,
            '.' => TokenKind::Dot,
            ',' => TokenKind::Comma,
            '?' if self.eat(b'?') => TokenKind::NullCoalesce,
            '?' => TokenKind::Question,
            ':' if self.eat(b'=') => TokenKind::Assign,
            ':' => TokenKind::Colon,
            '<' if self.eat(b'=') => TokenKind::LessEqual,
            '<' => TokenKind::Less,
            '>' if self.eat(b'=') => TokenKind::GreaterEqual,
            '>' => TokenKind::Greater,
            '=' if self.eat(b'=') => TokenKind::EqualEqual,
            '!' if self.eat(b'=') => TokenKind::NotEqual,
            '!' => TokenKind::Not,
            '&' if self.eat(b'&') => TokenKind::And,
            '|' if self.eat(b'|') => TokenKind::Or,
            '{' => {
                self.depth += 1;
                TokenKind::LeftBrace
            }
            '}' => {
                if self.depth == 0 {
                    return Err(LexError {
                        kind: LexErrorKind::UnmatchedCloseBrace,
                        span: Span::new(start, self.pos),
                    });
                }
                self.depth -= 1;
                TokenKind::RightBrace
            }
            _ => {
                return Err(LexError {
                    kind: LexErrorKind::UnexpectedCharacter(ch),
                    span: Span::new(start, self.pos),
                });
            }
        };

        Ok(self.token_from(kind, start))
    }

    fn read_number(&mut self) -> Token {
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }

        let fraction = self.peek() == Some(b'.')
            && self
                .input
                .as_bytes()
                .get(self.pos + 1)
                .is_some_and(u8::is_ascii_digit);
        if !fraction {
            return self.token_from(TokenKind::Integer, start);
        }

        self.pos += 1;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        self.token_from(TokenKind::Float, start)
    }

    fn read_identifier(&mut self) -> Token {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|b| b.is_ascii_alphanumeric() || b == b'_')
        {
            self.pos += 1;
        }
        self.token_from(TokenKind::Identifier, start)
    }

    fn read_string(&mut self, quote: char) -> Result<Token, LexError> {
        let start = self.pos;
        self.pos += 1; // opening quote

        let mut value = String::new();
        loop {
            match self.peek_char() {
                None => {
                    return Err(LexError {
                        kind: LexErrorKind::UnterminatedString,
                        span: Span::new(start, self.pos),
                    });
                }
                Some('\\') => {
                    if !self.read_escape(&mut value, false) {
                        return Err(LexError {
                            kind: LexErrorKind::UnterminatedString,
                            span: Span::new(start, self.pos),
                        });
                    }
                }
                Some(ch) if ch == quote => {
                    self.pos += 1;
                    break;
                }
                Some(ch) => {
                    value.push(ch);
                    self.pos += ch.len_utf8();
                }
            }
        }

        Ok(Token {
            kind: TokenKind::String,
            text: value,
            span: Span::new(start, self.pos),
        })
    }

    /// Consume a backslash escape at the cursor and append its decoded form.
    /// Returns `false` when the backslash is the last character of input.
    fn read_escape(&mut self, out: &mut String, in_segment: bool) -> bool {
        self.pos += 1; // backslash
        let Some(ch) = self.peek_char() else {
            out.push('\\');
            return false;
        };
        self.pos += ch.len_utf8();

        match unescape(ch) {
            Some(decoded) => out.push(decoded),
            None if in_segment && matches!(ch, '{' | '}') => out.push(ch),
            None => {
                out.push('\\');
                out.push(ch);
            }
        }
        true
    }
}
