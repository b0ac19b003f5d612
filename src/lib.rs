//! Shell script lexer for syntax highlighting.
//!
//! Turns sh/bash/zsh/ksh source into a flat stream of labeled tokens.
//! The stream is lossless (token texts concatenate back to the input)
//! and total: malformed or incomplete input still lexes, with anything
//! no rule recognizes emitted one character at a time as
//! [`TokenKind::Error`].
//!
//! # Quick start
//!
//! ```
//! use shellex::{tokenize, TokenKind};
//!
//! let tokens = tokenize("foo=bar");
//! let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
//! assert_eq!(
//!     kinds,
//!     [TokenKind::NameVariable, TokenKind::Operator, TokenKind::Text]
//! );
//! ```
//!
//! ## Streaming
//!
//! ```
//! let mut lexer = shellex::lex("case $x in\n  a) echo hi ;;\nesac\n");
//! let count = lexer.by_ref().count();
//! assert!(count > 0);
//! assert_eq!(lexer.current_state(), "root");
//! ```

// Allow noisy pedantic lints that don't add value for
// a library crate.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod detect;
pub mod dump;
pub mod engine;
pub mod heredoc;
pub mod shell;
pub mod token;

use once_cell::sync::Lazy;

pub use detect::{Descriptor, SHELL, analyze_text, shebang};
pub use engine::{Grammar, GrammarError, GrammarErrorKind, Lexer};
pub use shell::{BUILTINS, KEYWORDS};
pub use token::{Span, Token, TokenKind};

static GRAMMAR: Lazy<Grammar> =
    Lazy::new(|| shell::build().expect("shell grammar rules are well-formed"));

/// The shell grammar, built on first use and shared by every session.
#[must_use]
pub fn grammar() -> &'static Grammar {
    &GRAMMAR
}

/// Start a lexing session over `input`.
#[must_use]
pub fn lex(input: &str) -> Lexer<'static, '_> {
    grammar().lex(input)
}

/// Lex a shell source string to completion.
#[must_use]
pub fn tokenize(input: &str) -> Vec<Token> {
    lex(input).collect()
}
