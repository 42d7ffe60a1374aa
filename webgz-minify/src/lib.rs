//! # webgz Minify
//!
//! Line-based whitespace and comment stripper for the text assets of an
//! embedded web UI.
//!
//! This is not a parser. A single pass over the characters with one
//! character of lookahead removes what is safe to remove:
//!
//! - runs of spaces and tabs collapse to one space, and spaces at the start
//!   and end of a line disappear
//! - spaces next to separators (`(`, `;`, `{`, ...) disappear in Default
//!   and CSS mode
//! - `/* ... */` comments are replaced by at most one space (not in HTML)
//! - JavaScript strings are kept verbatim and a space after a keyword such
//!   as `return` survives
//! - repeated blank lines collapse and leading blank lines are dropped
//! - CSS selector lists split after a comma are joined onto one line
//!
//! Lines always use `\n` as terminator.
//!
//! ## Example
//!
//! ```rust
//! use webgz_minify::{MinifyMode, minify_str};
//!
//! let css = "\n\nbody {\n    margin: 0;  /* reset */\n}\n";
//! assert_eq!(minify_str(css, MinifyMode::Css), "body{\nmargin:0;\n}\n");
//!
//! let js = "function f(x) {\n    return   x + ' ! ';\n}\n";
//! assert_eq!(
//!     minify_str(js, MinifyMode::JavaScript),
//!     "function f(x){\nreturn x+' ! ';\n}\n"
//! );
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod mode;
pub mod options;
pub mod scanner;

pub use mode::MinifyMode;
pub use options::{ARITHMETIC_SEPARATORS, BASE_SEPARATORS, JS_KEYWORDS, MinifyOptions};
pub use scanner::{ScanState, Scanner};

use log::debug;

/// Minify `lines` with the default keyword and separator sets.
pub fn minify<S: AsRef<str>>(lines: &[S], mode: MinifyMode) -> Vec<String> {
    minify_with(lines, mode, &MinifyOptions::default())
}

/// Minify `lines` with custom keyword and separator sets.
///
/// Each input line should carry its `\n` terminator (the last line may
/// lack one). Quote and comment state carries across lines; an
/// unterminated comment swallows the rest of the input.
pub fn minify_with<S: AsRef<str>>(
    lines: &[S],
    mode: MinifyMode,
    options: &MinifyOptions,
) -> Vec<String> {
    let mut scanner = Scanner::new(mode, options);
    let mut out: Vec<String> = Vec::with_capacity(lines.len());

    for line in lines {
        let reduced = scanner.scan_line(line.as_ref());

        let merge = mode == MinifyMode::Css && out.last().is_some_and(|p| p.trim().ends_with(','));

        if merge {
            if let Some(prev) = out.last_mut() {
                if prev.ends_with('\n') {
                    prev.pop();
                }
                prev.push_str(&reduced);
            }
        } else if out.last().is_some_and(|p| !p.trim().is_empty()) || !reduced.trim().is_empty() {
            out.push(reduced);
        }
    }

    if scanner.state() != ScanState::Normal {
        debug!("{mode} input ends inside {:?}", scanner.state());
    }
    debug!(
        "minified {} lines into {} lines ({mode} mode)",
        lines.len(),
        out.len()
    );

    out
}

/// Split text into lines that keep their terminator, turning `\r\n`
/// into `\n`.
pub fn split_lines(text: &str) -> Vec<String> {
    text.split_inclusive('\n')
        .map(|line| match line.strip_suffix("\r\n") {
            Some(body) => format!("{body}\n"),
            None => line.to_string(),
        })
        .collect()
}

/// Minify a whole text with the default sets.
pub fn minify_str(text: &str, mode: MinifyMode) -> String {
    minify_str_with(text, mode, &MinifyOptions::default())
}

/// Minify a whole text with custom sets.
pub fn minify_str_with(text: &str, mode: MinifyMode, options: &MinifyOptions) -> String {
    minify_with(&split_lines(text), mode, options).concat()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_lines() {
        assert_eq!(split_lines("a\r\nb\nc"), vec!["a\n", "b\n", "c"]);
        assert!(split_lines("").is_empty());
        assert_eq!(split_lines("\n\n"), vec!["\n", "\n"]);
    }

    #[test]
    fn test_blank_lines() {
        let lines = ["\n", "\n", "a\n", "\n", "  \n", "\t\n", "b\n"];
        assert_eq!(minify(&lines, MinifyMode::Default), vec!["a\n", "\n", "b\n"]);
    }

    #[test]
    fn test_css_comma_merge() {
        let lines = ["h1,\n", "h2 ,\n", "h3 {\n", "}\n"];
        assert_eq!(minify(&lines, MinifyMode::Css), vec!["h1,h2,h3{\n", "}\n"]);
        // Only CSS merges.
        assert_eq!(minify(&lines, MinifyMode::Default).len(), 4);
    }

    #[test]
    fn test_empty_input() {
        let lines: [&str; 0] = [];
        assert!(minify(&lines, MinifyMode::JavaScript).is_empty());
        assert_eq!(minify_str("", MinifyMode::Html), "");
    }
}
