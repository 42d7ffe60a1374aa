//! Minification modes.

use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use webgz_core::error::{Result, WebgzError};

/// Tokenization rules to apply to an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MinifyMode {
    /// Generic text: separator collapsing and block comment removal.
    #[default]
    Default,
    /// HTML: whitespace collapsing only, `/* */` is kept.
    Html,
    /// CSS: like `Default` with arithmetic separators, but a space before
    /// `(` survives.
    Css,
    /// JavaScript: honors quotes and keeps a space after keywords.
    JavaScript,
}

impl MinifyMode {
    /// All modes.
    pub const ALL: [MinifyMode; 4] = [Self::Default, Self::Html, Self::Css, Self::JavaScript];

    /// Pick the mode from a file extension (without the dot).
    pub fn from_extension(extension: &str) -> Self {
        match extension.to_ascii_lowercase().as_str() {
            "html" | "htm" => Self::Html,
            "css" => Self::Css,
            "js" | "jsm" | "mjs" => Self::JavaScript,
            _ => Self::Default,
        }
    }

    /// Pick the mode from a file name.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        path.as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map_or(Self::Default, Self::from_extension)
    }

    /// Lowercase mode name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Html => "html",
            Self::Css => "css",
            Self::JavaScript => "javascript",
        }
    }
}

impl fmt::Display for MinifyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MinifyMode {
    type Err = WebgzError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "html" => Ok(Self::Html),
            "css" => Ok(Self::Css),
            "javascript" | "js" => Ok(Self::JavaScript),
            _ => Err(WebgzError::invalid_configuration(format!(
                "unknown minify mode '{s}'"
            ))),
        }
    }
}
