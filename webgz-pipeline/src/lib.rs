//! # webgz Pipeline
//!
//! Prepares the files an embedded web server serves from flash.
//!
//! Text assets (HTML, CSS, JavaScript, JSON, ...) are minified unless the
//! build is a debug build and copied to the data directory; binary assets
//! are left alone. Everything not on the exclusion list is then compressed
//! to `<data>/gzip/<name>.gz` with a small deflate window.
//!
//! ```text
//! src/html/index.html ──minify──▶ data/index.html ──gzip──▶ data/gzip/index.html.gz
//! src/favicon.ico ────────────────────────────────gzip──▶ data/gzip/favicon.ico.gz
//! ```
//!
//! Nothing is written when an asset is missing.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod pipeline;

pub use config::{GZIP_DIR, PipelineConfig};
pub use pipeline::{Artifact, AssetKind, PipelineReport, run_pipeline};
