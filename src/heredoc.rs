//! Heredoc body states, built per terminator word.
//!
//! `<<EOF` pushes a state that exists only for that heredoc: one rule
//! closes it on a line holding exactly the terminator, another consumes
//! any other line whole. A last line with no newline is taken in one
//! piece, so an unfinished heredoc never falls back character by
//! character.

use regex::Captures;

use crate::engine::{Emit, GrammarError, Rule, State, Transition};
use crate::token::TokenKind;

/// Pattern of a heredoc opener. Groups 1 to 3 hold the terminator for
/// the single-quoted, double-quoted, and bare forms.
pub const OPENER: &str = r#"<<-?\s*(?:'\\?(\w+)'|"\\?(\w+)"|\\?(\w+))"#;

/// Terminator word of a matched [`OPENER`], quotes stripped.
#[must_use]
pub fn terminator<'h>(caps: &Captures<'h>) -> Option<&'h str> {
    (1..=3).find_map(|i| caps.get(i)).map(|m| m.as_str())
}

/// Body state for a heredoc ended by `word`.
///
/// # Errors
///
/// Returns a `GrammarError` if the escaped terminator does not compile.
pub fn body_state(word: &str) -> Result<State, GrammarError> {
    let name = format!("heredoc<{word}>");
    let escaped = regex::escape(word);

    let close = Rule::new(
        &format!(r"\s*{escaped}\s*\n"),
        Emit::Whole(TokenKind::StringHeredoc),
    )
    .map_err(|kind| kind.in_state(&name))?
    .with_transition(Transition::Pop);
    // non-greedy so a line never runs past its own newline
    let line = Rule::new(r".*?\n", Emit::Whole(TokenKind::StringHeredoc))
        .map_err(|kind| kind.in_state(&name))?;
    let tail = Rule::new(r".+\z", Emit::Whole(TokenKind::StringHeredoc))
        .map_err(|kind| kind.in_state(&name))?;

    Ok(State::new(name, vec![close, line, tail]))
}

/// [`StateBuilder`](crate::engine::StateBuilder) for the opener rule.
pub(crate) fn enter(caps: &Captures<'_>) -> Result<State, GrammarError> {
    body_state(terminator(caps).unwrap_or_default())
}
