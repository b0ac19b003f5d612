//! Lexical states of the shell grammar.
//!
//! Rule order inside each state is significant: the first rule that
//! matches wins. `root` is `basic` followed by `data`; most nested
//! contexts close on their own delimiter and otherwise lex as `root`.

use crate::engine::{Grammar, GrammarBuilder, GrammarError, Guard};
use crate::heredoc;
use crate::token::TokenKind::{
    Comment, Keyword, NameBuiltin, NameVariable, Number, Operator, Punctuation, StringBacktick,
    StringDouble, StringEscape, StringHeredoc, StringSingle, Text,
};

/// Reserved words. `case` is handled separately since it opens a state.
pub const KEYWORDS: &[&str] = &[
    "if", "fi", "else", "while", "do", "done", "for", "then", "return", "function", "select",
    "continue", "until", "esac", "elif", "in",
];

pub const BUILTINS: &[&str] = &[
    "alias", "bg", "bind", "break", "builtin", "caller", "cd", "command", "compgen", "complete",
    "declare", "dirs", "disown", "echo", "enable", "eval", "exec", "exit", "export", "false", "fc",
    "fg", "getopts", "hash", "help", "history", "jobs", "kill", "let", "local", "logout", "popd",
    "printf", "pushd", "pwd", "read", "readonly", "set", "shift", "shopt", "source", "suspend",
    "test", "time", "times", "trap", "true", "type", "typeset", "ulimit", "umask", "unalias",
    "unset", "wait",
];

/// Build the shell grammar.
///
/// # Errors
///
/// Fails only if a rule in this module is malformed.
pub fn build() -> Result<Grammar, GrammarError> {
    let mut g = GrammarBuilder::new("root");

    let s = g.state("basic");
    s.rule(r"#.*\n", Comment);
    s.rule(format!(r"(?:{})\s*\b", KEYWORDS.join("|")), Keyword)
        .guard(Guard::WordStart);
    s.rule(r"case\b", Keyword).guard(Guard::WordStart).push("case");
    s.rule(format!(r"(?:{})\s*\b", BUILTINS.join("|")), NameBuiltin)
        .guard(Guard::WordStart)
        .guard(Guard::NotFollowedBy('.'));
    s.groups(r"(\w+)(=)", &[NameVariable, Operator])
        .guard(Guard::WordStart);
    s.rule(r"[\[\]{}()=]", Operator);
    s.rule(r"&&|\|\|", Operator);
    s.rule(r"<<<", Operator);
    s.rule(heredoc::OPENER, StringHeredoc)
        .push_with(heredoc::enter);

    let s = g.state("double_quotes");
    // "abc$" is the literal string abc$, so a `$` right before the
    // closing quote must not start a variable
    s.rule(r#"(?:\$#?)?""#, StringDouble).pop();
    s.mixin("interp");
    s.rule(r#"[^"`\\$]+"#, StringDouble);

    let s = g.state("single_quotes");
    s.rule(r"'", StringSingle).pop();
    s.rule(r"[^']+", StringSingle);

    let s = g.state("data");
    s.rule(r"\s+", Text);
    s.rule(r"\\.", StringEscape);
    s.rule(r#"\$?""#, StringDouble).push("double_quotes");
    s.rule(r"\$?'", StringSingle).push("single_quotes");
    s.rule(r"\*", Keyword);
    s.rule(r";", Text);
    s.rule(r#"[^=*\s{}()$"'`\\<]+"#, Text);
    s.rule(r"\d+", Number).guard(Guard::FollowedBySpaceOrEnd);
    s.rule(r"<", Text);
    s.mixin("interp");

    let s = g.state("curly");
    s.rule(r"\}", Keyword).pop();
    s.rule(r":-", Keyword);
    s.rule(r"[a-zA-Z0-9_]+", NameVariable);
    s.rule(r#"[^}:"'`$]+"#, Punctuation);
    s.mixin("root");

    let s = g.state("paren");
    s.rule(r"\)", Keyword).pop();
    s.mixin("root");

    let s = g.state("math");
    s.rule(r"\)\)", Keyword).pop();
    s.rule(r"[-+*/%^|&]|\*\*|\|\|", Operator);
    s.rule(r"\d+", Number);
    s.mixin("root");

    let s = g.state("case");
    s.rule(r"esac\b", Keyword).guard(Guard::WordStart).pop();
    s.rule(r"\|", Punctuation);
    s.rule(r"\)", Punctuation).push("case_stanza");
    s.mixin("root");

    let s = g.state("case_stanza");
    s.rule(r";;", Punctuation).pop();
    s.mixin("root");

    let s = g.state("backticks");
    s.rule(r"`", StringBacktick).pop();
    s.mixin("root");

    let s = g.state("interp");
    // line continuation
    s.rule(r"\\(?m:$)", StringEscape);
    s.rule(r"\\.", StringEscape);
    s.rule(r"\$\(\(", Keyword).push("math");
    s.rule(r"\$\(", Keyword).push("paren");
    s.rule(r"\$\{#?", Keyword).push("curly");
    s.rule(r"`", StringBacktick).push("backticks");
    s.rule(r"\$#?(?:\w+|.)", NameVariable);

    g.state("root").mixin("basic").mixin("data");

    g.build()
}
