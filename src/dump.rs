//! Plain-text and JSON renderings of a token stream, for inspection.
//!
//! These are debugging views, one token per line, not highlighted
//! markup.

use std::fmt::Write;

use crate::token::Token;

/// Width of the kind column in [`format`].
const KIND_WIDTH: usize = 24;

/// Format tokens one per line as `Kind<padding>"text"`.
///
/// Text is printed with Rust debug escaping so newlines and tabs stay
/// on one line.
#[must_use]
pub fn format(tokens: &[Token]) -> String {
    let mut out = String::new();
    for token in tokens {
        let _ = writeln!(
            out,
            "{:<width$}{:?}",
            token.kind.qualname(),
            token.text,
            width = KIND_WIDTH
        );
    }
    out
}

/// Format tokens with their line and column, one per line.
#[must_use]
pub fn format_with_spans(tokens: &[Token]) -> String {
    let mut out = String::new();
    for token in tokens {
        let location = format!("{}:{}", token.span.line, token.span.column);
        let _ = writeln!(
            out,
            "{location:<8}{:<width$}{:?}",
            token.kind.qualname(),
            token.text,
            width = KIND_WIDTH
        );
    }
    out
}

/// Serialize tokens as a pretty JSON array.
///
/// # Errors
///
/// Propagates `serde_json` failures, which plain tokens do not produce
/// in practice.
pub fn to_json(tokens: &[Token]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(tokens)
}

/// Tokens no rule could match.
pub fn errors(tokens: &[Token]) -> impl Iterator<Item = &Token> {
    tokens.iter().filter(|t| t.is_error())
}

/// Concatenate token texts, reproducing the lexed input.
#[must_use]
pub fn reassemble(tokens: &[Token]) -> String {
    tokens.iter().map(|t| t.text.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{Span, TokenKind};

    fn token(kind: TokenKind, text: &str) -> Token {
        Token {
            kind,
            text: text.to_owned(),
            span: Span::START,
        }
    }

    #[test]
    fn format_escapes_newlines() {
        let out = format(&[token(TokenKind::Comment, "# hi\n")]);
        assert_eq!(out, format!("{:<24}\"# hi\\n\"\n", "Comment"));
    }

    #[test]
    fn spans_prefix_location() {
        let out = format_with_spans(&[token(TokenKind::Text, "x")]);
        assert!(out.starts_with("1:1     Text"));
        assert!(out.ends_with("\"x\"\n"));
    }

    #[test]
    fn reassemble_concatenates() {
        let tokens = [token(TokenKind::Keyword, "if "), token(TokenKind::Text, "x")];
        assert_eq!(reassemble(&tokens), "if x");
    }

    #[test]
    fn json_uses_qualnames() {
        let json = to_json(&[token(TokenKind::StringSingle, "'")]).expect("serialize");
        assert!(json.contains("\"Literal.String.Single\""));
        assert!(json.contains("\"line\": 1"));
    }

    #[test]
    fn errors_filters_fallback_tokens() {
        let tokens = [token(TokenKind::Text, "a"), token(TokenKind::Error, "$")];
        let found: Vec<_> = errors(&tokens).map(|t| t.text.as_str()).collect();
        assert_eq!(found, ["$"]);
    }
}
