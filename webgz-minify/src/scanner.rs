//! Single-pass character scanner.
//!
//! The scanner walks each line once with a one-character lookahead
//! (`pending`). A character only reaches the output once the next one has
//! been seen, which is what lets a space be dropped when a separator
//! follows it.
//!
//! Quote and comment state carries over from one line to the next; the
//! lookahead and the keyword run (`since_space`) start fresh on every line.
//! In JavaScript mode the keyword run also restarts after any
//! non-identifier character, so `=new Foo` keeps its space.

use crate::mode::MinifyMode;
use crate::options::MinifyOptions;

/// Whether the scanner is inside a string literal or a block comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanState {
    /// Regular text.
    #[default]
    Normal,
    /// Inside a JavaScript string opened by the given quote character.
    InQuote(char),
    /// Inside a `/* ... */` comment.
    InBlockComment,
}

/// Per-file scanner.
#[derive(Debug)]
pub struct Scanner<'a> {
    mode: MinifyMode,
    options: &'a MinifyOptions,
    state: ScanState,
}

impl<'a> Scanner<'a> {
    /// Create a scanner in the [`ScanState::Normal`] state.
    pub fn new(mode: MinifyMode, options: &'a MinifyOptions) -> Self {
        Self {
            mode,
            options,
            state: ScanState::Normal,
        }
    }

    /// Current quote/comment state.
    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Scan one line (including its terminator) and return the reduced line.
    pub fn scan_line(&mut self, line: &str) -> String {
        let mode = self.mode;
        let mut out = String::with_capacity(line.len());
        let mut pending: Option<char> = None;
        let mut since_space = String::new();

        for ch in line.chars() {
            let normal = self.state == ScanState::Normal;

            if normal && (ch == ' ' || ch == '\t') {
                if mode == MinifyMode::JavaScript && self.options.is_keyword(&since_space) {
                    if let Some(p) = pending.take() {
                        out.push(p);
                    }
                    out.push(' ');
                }
                since_space.clear();

                match pending {
                    None | Some(' ') => continue,
                    _ if mode == MinifyMode::JavaScript => continue,
                    Some(p)
                        if matches!(mode, MinifyMode::Default | MinifyMode::Css)
                            && self.options.is_separator(mode, p) =>
                    {
                        continue;
                    }
                    _ => {}
                }
            } else if mode == MinifyMode::JavaScript && normal && (ch == '\'' || ch == '"') {
                self.state = ScanState::InQuote(ch);
            } else if self.state == ScanState::InQuote(ch) {
                self.state = ScanState::Normal;
            } else if mode != MinifyMode::Html
                && ch == '/'
                && self.state == ScanState::InBlockComment
                && pending == Some('*')
            {
                // The comment becomes a single space unless one is already there.
                self.state = ScanState::Normal;
                pending = (!out.is_empty() && !out.ends_with(' ')).then_some(' ');
                continue;
            } else if mode != MinifyMode::Html && normal && ch == '*' && pending == Some('/') {
                if self.options.is_keyword(&since_space) {
                    if let Some(p) = pending.take() {
                        out.push(p);
                    }
                    out.push(' ');
                }
                since_space.clear();
                self.state = ScanState::InBlockComment;
            } else if pending == Some(' ') && self.collapses_before(ch) {
                pending = None;
            }

            if let Some(p) = pending {
                if self.state != ScanState::InBlockComment {
                    out.push(p);
                }
            }

            if mode == MinifyMode::JavaScript && !is_word_char(ch) {
                since_space.clear();
            } else {
                since_space.push(ch);
            }
            pending = Some(if ch == '\t' { ' ' } else { ch });
        }

        match pending {
            Some(' ') | None => {}
            Some('\n') => out.push('\n'),
            Some(p) if self.state != ScanState::InBlockComment => out.push(p),
            Some(_) => {}
        }

        if out.ends_with(" \n") {
            out.truncate(out.len() - 2);
            out.push('\n');
        } else if !line.ends_with('\n')
            && out.ends_with(' ')
            && !matches!(self.state, ScanState::InQuote(_))
        {
            out.pop();
        }

        out
    }

    /// Whether a pending space before `ch` is dropped.
    fn collapses_before(&self, ch: char) -> bool {
        match self.mode {
            MinifyMode::Default => self.options.is_separator(self.mode, ch),
            MinifyMode::Css => ch != '(' && self.options.is_separator(self.mode, ch),
            MinifyMode::Html | MinifyMode::JavaScript => false,
        }
    }
}

/// Identifier characters; anything else ends a JavaScript keyword run.
fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$'
}
