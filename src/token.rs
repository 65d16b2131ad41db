use std::fmt;

/// Half-open byte range `start..end` into the source text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Zero-width span at `offset`.
    #[must_use]
    pub const fn at(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    #[must_use]
    pub const fn len(self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.end <= self.start
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Token kinds produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Literal template text outside `{...}`.
    Segment,
    Identifier,
    Integer,
    Float,
    /// Quoted string literal (`'...'` or `"..."`).
    String,

    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    LeftBrace,
    RightBrace,
    Dot,
    Comma,
    Colon,
    Question,
    /// `??`
    NullCoalesce,
    /// `:=`
    Assign,
    /// `$`
    Dollar,

    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    EqualEqual,
    NotEqual,
    Not,
    And,
    Or,

    /// End of input.
    Eof,
}

impl TokenKind {
    /// Fixed source text for punctuation and operators.
    #[must_use]
    pub const fn lexeme(self) -> Option<&'static str> {
        let text = match self {
            Self::LeftParen => "(",
            Self::RightParen => ")",
            Self::LeftBracket => "[",
            Self::RightBracket => "]",
            Self::LeftBrace => "{",
            Self::RightBrace => "}",
            Self::Dot => ".",
            Self::Comma => ",",
            Self::Colon => ":",
            Self::Question => "?",
            Self::NullCoalesce => "??",
            Self::Assign => ":=",
            Self::Dollar => "$",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::Slash => "/",
            Self::Percent => "%",
            Self::Caret => "^",
            Self::Less => "<",
            Self::Greater => ">",
            Self::LessEqual => "<=",
            Self::GreaterEqual => ">=",
            Self::EqualEqual => "==",
            Self::NotEqual => "!=",
            Self::Not => "!",
            Self::And => "&&",
            Self::Or => "||",
            Self::Segment
            | Self::Identifier
            | Self::Integer
            | Self::Float
            | Self::String
            | Self::Eof => return None,
        };
        Some(text)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(lexeme) = self.lexeme() {
            return write!(f, "'{lexeme}'");
        }
        let name = match self {
            Self::Segment => "text segment",
            Self::Identifier => "identifier",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::String => "string",
            _ => "end of input",
        };
        f.write_str(name)
    }
}

/// A single token with its kind, text, and source span.
///
/// `text` holds the decoded contents for segments and string literals and the
/// raw source slice for everything else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
}

impl Token {
    #[must_use]
    pub const fn eof(offset: usize) -> Self {
        Self {
            kind: TokenKind::Eof,
            text: String::new(),
            span: Span::at(offset),
        }
    }

    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }
}
