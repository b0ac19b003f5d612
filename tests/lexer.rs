//! Session behaviour: totality, losslessness, spans, and fallback.

mod common;

use common::{assert_no_errors, lex_lossless, pairs};
use shellex::{TokenKind, lex, tokenize};

// -----------------------------------------------------------
// Basic lexer behaviour.
// -----------------------------------------------------------

#[test]
fn lex_empty_input() {
    assert!(tokenize("").is_empty());
}

#[test]
fn lex_only_whitespace() {
    let tokens = assert_no_errors("   \t  \n\n  ");
    assert_eq!(pairs(&tokens), [(TokenKind::Text, "   \t  \n\n  ")]);
}

#[test]
fn lex_assignment() {
    let tokens = assert_no_errors("foo=bar");
    assert_eq!(
        pairs(&tokens),
        [
            (TokenKind::NameVariable, "foo"),
            (TokenKind::Operator, "="),
            (TokenKind::Text, "bar"),
        ]
    );
}

#[test]
fn lex_comment_line() {
    let tokens = assert_no_errors("# hello\necho hi");
    assert_eq!(
        pairs(&tokens),
        [
            (TokenKind::Comment, "# hello\n"),
            (TokenKind::NameBuiltin, "echo "),
            (TokenKind::Text, "hi"),
        ]
    );
}

#[test]
fn lex_multiple_comments() {
    let tokens = assert_no_errors("# comment 1\n# comment 2\n");
    let count = tokens
        .iter()
        .filter(|t| t.kind == TokenKind::Comment)
        .count();
    assert_eq!(count, 2);
}

#[test]
fn lex_tokens_are_never_empty() {
    let tokens = lex_lossless("if [ -n \"$x\" ]; then echo `date`; fi\n");
    assert!(tokens.iter().all(|t| !t.text.is_empty()));
}

// -----------------------------------------------------------
// Spans.
// -----------------------------------------------------------

#[test]
fn span_tracking() {
    let tokens = assert_no_errors("echo hi\nfoo=1");
    let foo = tokens.iter().find(|t| t.text == "foo").expect("foo token");
    assert_eq!(foo.span.offset, 8);
    assert_eq!(foo.span.line, 2);
    assert_eq!(foo.span.column, 1);
    let one = tokens.last().expect("tokens");
    assert_eq!(one.span.column, 5);
}

#[test]
fn span_offsets_are_contiguous() {
    let input = "x=$(( 1 + 2 ))\ncat <<EOF\nbody\nEOF\n";
    let tokens = lex_lossless(input);
    let mut expected = 0;
    for token in &tokens {
        assert_eq!(token.span.offset, expected, "gap before {token:?}");
        expected += token.text.len();
    }
    assert_eq!(expected, input.len());
}

#[test]
fn span_columns_count_chars() {
    let tokens = assert_no_errors("echo 'héllo' x");
    let x = tokens.last().expect("tokens");
    assert_eq!(x.text, "x");
    assert_eq!(x.span.column, 14);
}

// -----------------------------------------------------------
// Fallback and incomplete input.
// -----------------------------------------------------------

#[test]
fn lone_dollar_at_end_falls_back() {
    let tokens = lex_lossless("echo $");
    let last = tokens.last().expect("tokens");
    assert_eq!(last.kind, TokenKind::Error);
    assert_eq!(last.text, "$");
}

#[test]
fn unterminated_double_quote_stays_open() {
    let mut lexer = lex("echo \"abc");
    let tokens: Vec<_> = lexer.by_ref().collect();
    assert!(tokens.iter().all(|t| !t.is_error()));
    assert_eq!(lexer.current_state(), "double_quotes");
}

#[test]
fn unterminated_single_quote_stays_open() {
    let mut lexer = lex("echo 'abc\ndef");
    let tokens: Vec<_> = lexer.by_ref().collect();
    assert!(tokens.iter().all(|t| !t.is_error()));
    assert_eq!(lexer.stack(), ["root", "single_quotes"]);
}

#[test]
fn unterminated_substitutions_nest() {
    let mut lexer = lex("echo $(ls ${x");
    let count = lexer.by_ref().count();
    assert!(count > 0);
    assert_eq!(lexer.stack(), ["root", "paren", "curly"]);
}

#[test]
fn fallback_does_not_change_state() {
    let mut lexer = lex("\"$\n\"");
    let tokens: Vec<_> = lexer.by_ref().collect();
    // `$` before a newline matches nothing inside double quotes
    assert_eq!(
        pairs(&tokens),
        [
            (TokenKind::StringDouble, "\""),
            (TokenKind::Error, "$"),
            (TokenKind::StringDouble, "\n"),
            (TokenKind::StringDouble, "\""),
        ]
    );
    assert_eq!(lexer.current_state(), "root");
}

#[test]
fn crlf_input_is_lossless() {
    assert_no_errors("echo hi\r\nfoo=bar\r\n");
}

// -----------------------------------------------------------
// Sessions.
// -----------------------------------------------------------

#[test]
fn sessions_are_independent() {
    let mut first = lex("case x in a) ");
    let mut second = lex("echo \"");
    let _ = first.by_ref().count();
    let _ = second.by_ref().count();
    assert_eq!(first.stack(), ["root", "case", "case_stanza"]);
    assert_eq!(second.stack(), ["root", "double_quotes"]);
    assert_eq!(lex("echo").stack(), ["root"]);
}

#[test]
fn sessions_run_in_parallel() {
    let inputs = [
        "for f in *.sh; do echo \"$f\"; done\n",
        "x=${y:-$(pwd)}\n",
        "cat <<EOF\n$HOME\nEOF\n",
        "case $1 in start) run ;; esac\n",
    ];
    let expected: Vec<_> = inputs.iter().map(|i| tokenize(i)).collect();
    let results: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = inputs
            .iter()
            .map(|input| scope.spawn(move || tokenize(input)))
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("lexer thread panicked"))
            .collect()
    });
    assert_eq!(results, expected);
}

#[test]
fn offset_reaches_end_of_input() {
    let input = "echo ${a} $(b) `c`";
    let mut lexer = lex(input);
    let mut last = 0;
    while lexer.next().is_some() {
        assert!(lexer.offset() >= last);
        last = lexer.offset();
    }
    assert_eq!(lexer.offset(), input.len());
}
