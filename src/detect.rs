//! Registration metadata and shebang sniffing.
//!
//! Nothing here matches filenames or mimetypes; callers that route
//! files to lexers read the lists from [`SHELL`] and do that themselves.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Static description of a lexer, for whatever registry picks one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Descriptor {
    /// Unique identifier.
    pub tag: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub aliases: &'static [&'static str],
    /// Filename globs.
    pub filenames: &'static [&'static str],
    pub mimetypes: &'static [&'static str],
}

pub const SHELL: Descriptor = Descriptor {
    tag: "shell",
    title: "Shell",
    description: "Various shell languages, including sh and bash",
    aliases: &["bash", "zsh", "ksh", "sh"],
    filenames: &[
        "*.sh", "*.bash", "*.zsh", "*.ksh", ".bashrc", ".zshrc", ".kshrc", ".profile",
    ],
    mimetypes: &["application/x-sh", "application/x-shellscript"],
};

static SHEBANG: Lazy<Regex> = Lazy::new(|| Regex::new(r"\A\s*#!(.*)").unwrap());

static SHELL_INTERPRETER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:ba|z|k)?sh(?:\s|$)").unwrap());

/// Interpreter part of a leading `#!` line, if the text has one.
///
/// Whitespace before the marker is skipped, blank lines included.
#[must_use]
pub fn shebang(text: &str) -> Option<&str> {
    SHEBANG
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Confidence that `text` is a shell script: 1.0 when its shebang
/// runs sh, bash, zsh, or ksh, else 0.0.
#[must_use]
pub fn analyze_text(text: &str) -> f32 {
    match shebang(text) {
        Some(line) if SHELL_INTERPRETER.is_match(line) => 1.0,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shebang_strips_marker() {
        assert_eq!(shebang("#!/bin/sh\necho"), Some("/bin/sh"));
        assert_eq!(shebang("echo\n#!/bin/sh"), None);
    }

    #[test]
    fn leading_whitespace_allowed() {
        assert_eq!(shebang("   #!   /bin/bash"), Some("   /bin/bash"));
    }

    #[test]
    fn descriptor_lists() {
        assert_eq!(SHELL.tag, "shell");
        assert!(SHELL.aliases.contains(&"zsh"));
        assert!(SHELL.filenames.contains(&".profile"));
        assert!(SHELL.mimetypes.contains(&"application/x-shellscript"));
    }
}
