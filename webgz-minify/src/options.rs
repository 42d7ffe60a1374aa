//! Keyword and separator sets.

use crate::mode::MinifyMode;

/// JavaScript words that must keep a following space.
pub const JS_KEYWORDS: [&str; 20] = [
    "await",
    "case",
    "class",
    "const",
    "delete",
    "export",
    "extends",
    "function",
    "import",
    "in",
    "instanceof",
    "let",
    "new",
    "return",
    "static",
    "throw",
    "typeof",
    "var",
    "void",
    "yield",
];

/// Characters around which a space is insignificant.
pub const BASE_SEPARATORS: [char; 11] = ['(', ')', '[', ']', '{', '}', '<', '>', ':', ';', ','];

/// Extra separators in CSS mode.
pub const ARITHMETIC_SEPARATORS: [char; 4] = ['+', '-', '*', '/'];

/// Keyword and separator sets used by the scanner.
///
/// ```
/// use webgz_minify::{MinifyMode, MinifyOptions, minify_str_with};
///
/// // Treat '=' as a separator too.
/// let options = MinifyOptions::default().with_separator('=');
/// assert_eq!(minify_str_with("a = b\n", MinifyMode::Default, &options), "a=b\n");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinifyOptions {
    /// Words that keep a following space in JavaScript mode.
    pub keywords: Vec<String>,
    /// Separators in Default mode.
    pub separators: Vec<char>,
    /// Separators in CSS mode.
    pub css_separators: Vec<char>,
}

impl Default for MinifyOptions {
    fn default() -> Self {
        let mut css_separators = BASE_SEPARATORS.to_vec();
        css_separators.extend(ARITHMETIC_SEPARATORS);
        Self {
            keywords: JS_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            separators: BASE_SEPARATORS.to_vec(),
            css_separators,
        }
    }
}

impl MinifyOptions {
    /// Add a separator for both Default and CSS mode.
    pub fn with_separator(mut self, separator: char) -> Self {
        if !self.separators.contains(&separator) {
            self.separators.push(separator);
        }
        if !self.css_separators.contains(&separator) {
            self.css_separators.push(separator);
        }
        self
    }

    /// Use one separator set for both Default and CSS mode.
    pub fn with_separators(mut self, separators: impl IntoIterator<Item = char>) -> Self {
        self.separators = separators.into_iter().collect();
        self.css_separators = self.separators.clone();
        self
    }

    /// Whether `word` is a keyword.
    pub fn is_keyword(&self, word: &str) -> bool {
        self.keywords.iter().any(|k| k == word)
    }

    /// Whether `ch` is a separator in `mode`.
    pub fn is_separator(&self, mode: MinifyMode, ch: char) -> bool {
        match mode {
            MinifyMode::Css => self.css_separators.contains(&ch),
            _ => self.separators.contains(&ch),
        }
    }
}
