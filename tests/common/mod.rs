#![allow(dead_code)]

use shellex::dump::reassemble;
use shellex::{Token, TokenKind, tokenize};

/// Lex `input`, check the stream reproduces it, and return the tokens.
pub fn lex_lossless(input: &str) -> Vec<Token> {
    let tokens = tokenize(input);
    let rebuilt = reassemble(&tokens);
    assert_eq!(
        rebuilt, input,
        "lossless mismatch:\n--- expected ---\n{input}\n--- got ---\n{rebuilt}"
    );
    tokens
}

/// Lex `input` and assert no character fell through to the fallback.
pub fn assert_no_errors(input: &str) -> Vec<Token> {
    let tokens = lex_lossless(input);
    let errors: Vec<_> = tokens.iter().filter(|t| t.is_error()).collect();
    assert!(
        errors.is_empty(),
        "unexpected error tokens {errors:?}\n--- input ---\n{input}"
    );
    tokens
}

/// `(kind, text)` pairs, for compact assertions.
pub fn pairs(tokens: &[Token]) -> Vec<(TokenKind, &str)> {
    tokens.iter().map(|t| (t.kind, t.text.as_str())).collect()
}

/// Kind of the first token whose text is exactly `text`.
pub fn kind_of(tokens: &[Token], text: &str) -> Option<TokenKind> {
    tokens.iter().find(|t| t.text == text).map(|t| t.kind)
}
