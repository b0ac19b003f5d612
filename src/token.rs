use std::fmt;

use serde::Serialize;

/// Source location of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    /// Byte offset into the input.
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Span {
    /// Location of the first byte of an input.
    pub const START: Self = Self {
        offset: 0,
        line: 1,
        column: 1,
    };
}

/// Token kinds produced by the lexer.
///
/// Serialized (and displayed) under their dotted highlighter names,
/// e.g. `Literal.String.Double`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    /// Comment (`# ...` through the end of the line).
    #[serde(rename = "Comment")]
    Comment,
    /// Reserved word, glob `*`, or expansion delimiter.
    #[serde(rename = "Keyword")]
    Keyword,
    /// Builtin command name (`echo`, `cd`, ...).
    #[serde(rename = "Name.Builtin")]
    NameBuiltin,
    /// Variable reference or assignment target.
    #[serde(rename = "Name.Variable")]
    NameVariable,
    #[serde(rename = "Operator")]
    Operator,
    #[serde(rename = "Punctuation")]
    Punctuation,
    /// Double-quoted string (`"..."`).
    #[serde(rename = "Literal.String.Double")]
    StringDouble,
    /// Single-quoted string (`'...'`).
    #[serde(rename = "Literal.String.Single")]
    StringSingle,
    /// Backtick command substitution delimiters.
    #[serde(rename = "Literal.String.Backtick")]
    StringBacktick,
    /// Heredoc marker, body, and terminator lines.
    #[serde(rename = "Literal.String.Heredoc")]
    StringHeredoc,
    /// Backslash escape or line continuation.
    #[serde(rename = "Literal.String.Escape")]
    StringEscape,
    #[serde(rename = "Literal.Number")]
    Number,
    /// Plain words and whitespace.
    #[serde(rename = "Text")]
    Text,
    /// Single character no rule could match.
    #[serde(rename = "Error")]
    Error,
}

impl TokenKind {
    /// Dotted highlighter name of this kind.
    #[must_use]
    pub const fn qualname(self) -> &'static str {
        match self {
            Self::Comment => "Comment",
            Self::Keyword => "Keyword",
            Self::NameBuiltin => "Name.Builtin",
            Self::NameVariable => "Name.Variable",
            Self::Operator => "Operator",
            Self::Punctuation => "Punctuation",
            Self::StringDouble => "Literal.String.Double",
            Self::StringSingle => "Literal.String.Single",
            Self::StringBacktick => "Literal.String.Backtick",
            Self::StringHeredoc => "Literal.String.Heredoc",
            Self::StringEscape => "Literal.String.Escape",
            Self::Number => "Literal.Number",
            Self::Text => "Text",
            Self::Error => "Error",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.qualname())
    }
}

/// A single token with its kind, exact source text, and location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
}

impl Token {
    /// Whether this token is the lexer's fallback for unmatched input.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self.kind, TokenKind::Error)
    }
}
