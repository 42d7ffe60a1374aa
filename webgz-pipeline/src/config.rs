//! Pipeline configuration.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use webgz_core::error::{Result, WebgzError};
use webgz_gzip::GzipOptions;

/// Name of the directory below the data directory that holds `.gz` files.
pub const GZIP_DIR: &str = "gzip";

/// Which assets to prepare and how.
///
/// Deserialized from JSON with camelCase keys; every key is optional.
///
/// ```
/// use webgz_pipeline::PipelineConfig;
///
/// let config = PipelineConfig::from_json_str(r#"{
///     "textAssets": ["src/html/index.html"],
///     "binaryAssets": ["src/favicon.ico"],
///     "windowSize": -9
/// }"#).unwrap();
/// assert_eq!(config.compression_level, 9);
/// assert_eq!(config.gzip_options().unwrap().window.size(), 512);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Base directory for asset paths.
    pub project_dir: PathBuf,
    /// Output directory, relative to `project_dir` unless absolute.
    pub data_dir: PathBuf,
    /// Assets that are minified (release builds) and copied to the data
    /// directory before compression.
    pub text_assets: Vec<PathBuf>,
    /// Assets that are compressed as they are.
    pub binary_assets: Vec<PathBuf>,
    /// Text assets that are never compressed.
    pub gzip_excluded: Vec<PathBuf>,
    /// Copy text assets without minifying them.
    pub debug_build: bool,
    /// GZIP level, `0..=9`.
    pub compression_level: i64,
    /// Deflate window parameter, `[-15, -8]`.
    pub window_size: i32,
    /// Decode every artifact again with the window-checking inflater.
    pub verify: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            project_dir: PathBuf::from("."),
            data_dir: PathBuf::from("data"),
            text_assets: Vec::new(),
            binary_assets: Vec::new(),
            gzip_excluded: Vec::new(),
            debug_build: false,
            compression_level: 9,
            window_size: -10,
            verify: false,
        }
    }
}

impl PipelineConfig {
    /// Parse a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| WebgzError::invalid_configuration(e.to_string()))
    }

    /// Load a JSON configuration file.
    ///
    /// A relative `projectDir` is taken relative to the file's directory.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let mut config: Self = serde_json::from_str(&json).map_err(|e| {
            WebgzError::invalid_configuration(format!("{}: {e}", path.display()))
        })?;

        if config.project_dir.is_relative() {
            if let Some(parent) = path.parent() {
                config.project_dir = parent.join(&config.project_dir);
            }
        }
        Ok(config)
    }

    /// GZIP parameters, validated.
    pub fn gzip_options(&self) -> Result<GzipOptions> {
        GzipOptions::from_raw(self.compression_level, self.window_size, true)
    }

    /// Absolute or project-relative path of an asset.
    pub fn asset_path(&self, asset: &Path) -> PathBuf {
        self.project_dir.join(asset)
    }

    /// Output directory.
    pub fn data_path(&self) -> PathBuf {
        self.project_dir.join(&self.data_dir)
    }

    /// Directory for compressed artifacts.
    pub fn gzip_path(&self) -> PathBuf {
        self.data_path().join(GZIP_DIR)
    }

    /// Whether a text asset is excluded from compression.
    pub fn is_excluded(&self, asset: &Path) -> bool {
        self.gzip_excluded.iter().any(|e| e == asset)
    }

    /// Check parameters and that every configured asset exists.
    pub fn validate(&self) -> Result<()> {
        self.gzip_options()?;

        for asset in self.text_assets.iter().chain(&self.binary_assets) {
            let path = self.asset_path(asset);
            if !path.exists() {
                return Err(WebgzError::missing_asset(path));
            }
            if asset.file_name().is_none() {
                return Err(WebgzError::invalid_configuration(format!(
                    "asset {} has no file name",
                    asset.display()
                )));
            }
        }
        Ok(())
    }
}
